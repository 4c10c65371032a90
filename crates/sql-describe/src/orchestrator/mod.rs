//! Describe orchestrator - sequences the three describers for one table.

use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::core::schema::TableDescription;
use crate::core::traits::{CatalogConnection, SchemaDialect};
use crate::describe::{describe_columns, describe_foreign_keys, describe_indexes, QueryContext};
use crate::dialect::{ensure_field_maps, DialectKind};
use crate::drivers::{CatalogPool, DialectImpl};
use crate::error::Result;

/// Describe one table: columns, then foreign keys, then indexes.
///
/// Stops at the first failure; no partial description is returned alongside
/// an error.
pub async fn describe_table<C, D>(
    conn: &C,
    dialect: &D,
    table: &str,
    ctx: &QueryContext,
) -> Result<TableDescription>
where
    C: CatalogConnection + ?Sized,
    D: SchemaDialect + ?Sized,
{
    ensure_field_maps(dialect)?;
    let started = Instant::now();

    let columns = describe_columns(conn, dialect, table, ctx).await?;
    let foreign_keys = describe_foreign_keys(conn, dialect, table, ctx).await?;
    let indexes = describe_indexes(conn, dialect, table, ctx).await?;

    debug!(
        "{}: described {}.{} in {:?}",
        dialect.name(),
        conn.schema(),
        table,
        started.elapsed()
    );

    Ok(TableDescription {
        columns,
        foreign_keys,
        indexes,
    })
}

/// Result of a connection health check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub dialect: DialectKind,
    pub schema: String,
    pub connected: bool,
    pub latency_ms: u64,
    pub error: Option<String>,
    pub healthy: bool,
}

/// Table describer bound to one catalog connection.
///
/// The dialect is taken from the connection; it is never chosen by the
/// caller.
pub struct Describer<C: ?Sized = CatalogPool> {
    dialect: DialectImpl,
    conn: Arc<C>,
}

impl<C: ?Sized> Clone for Describer<C> {
    fn clone(&self) -> Self {
        Self {
            dialect: self.dialect.clone(),
            conn: Arc::clone(&self.conn),
        }
    }
}

impl<C: ?Sized> std::fmt::Debug for Describer<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Describer")
            .field("dialect", &self.dialect)
            .finish_non_exhaustive()
    }
}

impl Describer<CatalogPool> {
    /// Connect to the configured database.
    pub async fn connect(config: &Config) -> Result<Self> {
        let pool =
            CatalogPool::connect(&config.connection, config.describe.max_connections).await?;
        Ok(Self::new(Arc::new(pool)))
    }

    /// Connect under `ctx`, giving up when it is cancelled or its deadline
    /// passes.
    pub async fn connect_with(config: &Config, ctx: &QueryContext) -> Result<Self> {
        ctx.run(Self::connect(config)).await
    }

    /// Run `SELECT 1` and report connectivity and latency.
    pub async fn health_check(&self) -> HealthCheckResult {
        let started = Instant::now();
        let outcome = self.conn.test_connection().await;
        let latency_ms = started.elapsed().as_millis() as u64;

        let error = match outcome {
            Ok(()) => {
                info!("{} connection OK ({}ms)", self.dialect.name(), latency_ms);
                None
            }
            Err(e) => {
                warn!("{} connection failed: {}", self.dialect.name(), e);
                Some(e.to_string())
            }
        };

        HealthCheckResult {
            dialect: self.dialect.kind(),
            schema: self.conn.schema().to_string(),
            connected: error.is_none(),
            latency_ms,
            healthy: error.is_none(),
            error,
        }
    }

    /// Close the underlying pool.
    pub async fn close(&self) {
        self.conn.close().await;
    }
}

impl<C: CatalogConnection + ?Sized> Describer<C> {
    /// Wrap a connection.
    pub fn new(conn: Arc<C>) -> Self {
        Self {
            dialect: DialectImpl::for_kind(conn.dialect()),
            conn,
        }
    }

    pub fn dialect(&self) -> &DialectImpl {
        &self.dialect
    }

    pub fn schema(&self) -> &str {
        self.conn.schema()
    }

    pub fn connection(&self) -> &Arc<C> {
        &self.conn
    }

    /// Describe one table.
    pub async fn describe_table(&self, table: &str, ctx: &QueryContext) -> Result<TableDescription> {
        describe_table(&*self.conn, &self.dialect, table, ctx).await
    }

    /// Describe several tables, at most `concurrency` at a time.
    ///
    /// Each table gets its own result; one failure does not stop the others.
    /// Results are returned in input order.
    pub async fn describe_tables<S: AsRef<str>>(
        &self,
        tables: &[S],
        ctx: &QueryContext,
        concurrency: usize,
    ) -> Vec<(String, Result<TableDescription>)> {
        stream::iter(tables.iter().map(|t| t.as_ref()))
            .map(|table| async move {
                let result = self.describe_table(table, ctx).await;
                if let Err(ref e) = result {
                    warn!("{}: failed to describe {}: {}", self.dialect.name(), table, e);
                }
                (table.to_string(), result)
            })
            .buffered(concurrency.max(1))
            .collect()
            .await
    }
}

impl HealthCheckResult {
    /// Convert to JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::core::schema::{DeleteRule, KeyRole, SortDirection};
    use crate::dialect::QueryKind;
    use crate::error::DescribeError;
    use crate::testing::{column_row, foreign_key_row, index_row, FakeCatalog};
    use tokio_util::sync::CancellationToken;

    fn users_catalog(kind: DialectKind, schema: &str) -> FakeCatalog {
        FakeCatalog::new(kind, schema)
            .rows(
                QueryKind::Columns,
                "users",
                vec![
                    column_row("id", "NO", "PRI", "int", None, true, None),
                    column_row("org_id", "NO", "", "int", None, false, None),
                    column_row("email", "NO", "UNI", "varchar(255)", None, false, Some(255)),
                ],
            )
            .rows(
                QueryKind::ForeignKeys,
                "users",
                vec![foreign_key_row("users", "org_id", "fk_users_org", "CASCADE", "orgs", "id")],
            )
            .rows(
                QueryKind::Indexes,
                "users",
                vec![
                    index_row("users", "email", "index_users_email", 1, true, "asc"),
                    index_row("users", "org_id", "idx_adhoc", 1, false, "asc"),
                ],
            )
    }

    fn describer(fake: FakeCatalog) -> Describer<FakeCatalog> {
        Describer::new(Arc::new(fake))
    }

    #[tokio::test]
    async fn test_describe_table_runs_queries_in_order() {
        let d = describer(users_catalog(DialectKind::Mysql, "app"));
        let desc = d.describe_table("users", &QueryContext::new()).await.unwrap();

        assert_eq!(desc.columns.len(), 3);
        assert_eq!(desc.primary_key(), vec!["id"]);
        assert_eq!(desc.column("email").unwrap().key_role, KeyRole::Unique);
        assert_eq!(desc.foreign_keys[0].on_delete, DeleteRule::Cascade);
        assert_eq!(desc.indexes.len(), 1);
        assert_eq!(desc.indexes[0].sort, SortDirection::Asc);

        assert_eq!(
            d.connection().kinds(),
            vec![QueryKind::Columns, QueryKind::ForeignKeys, QueryKind::Indexes]
        );
    }

    #[tokio::test]
    async fn test_missing_table_fails_before_other_queries() {
        for kind in DialectKind::ALL {
            let d = describer(FakeCatalog::new(kind, "app"));
            let err = d.describe_table("ghost", &QueryContext::new()).await.unwrap_err();
            assert!(err.is_table_not_found(), "{}", kind);
            assert_eq!(d.connection().kinds(), vec![QueryKind::Columns]);
        }
    }

    #[tokio::test]
    async fn test_table_without_fks_or_indexes_succeeds() {
        for kind in DialectKind::ALL {
            let d = describer(FakeCatalog::new(kind, "app").rows(
                QueryKind::Columns,
                "plain",
                vec![column_row("id", "NO", "PRI", "int", None, false, None)],
            ));
            let desc = d.describe_table("plain", &QueryContext::new()).await.unwrap();
            assert_eq!(desc.columns.len(), 1, "{}", kind);
            assert!(desc.foreign_keys.is_empty());
            assert!(desc.indexes.is_empty());
        }
    }

    #[tokio::test]
    async fn test_fk_failure_stops_before_index_query() {
        let d = describer(
            users_catalog(DialectKind::Postgres, "public").fail(
                QueryKind::ForeignKeys,
                "users",
                "permission denied for table referential_constraints",
            ),
        );
        let err = d.describe_table("users", &QueryContext::new()).await.unwrap_err();
        assert!(err.is_query_execution());
        assert_eq!(
            d.connection().kinds(),
            vec![QueryKind::Columns, QueryKind::ForeignKeys]
        );
    }

    #[tokio::test]
    async fn test_bind_orders_per_dialect() {
        let d = describer(users_catalog(DialectKind::SqlServer, "sales"));
        d.describe_table("users", &QueryContext::new()).await.unwrap();

        let params: Vec<Vec<String>> = d.connection().calls().into_iter().map(|c| c.params).collect();
        assert_eq!(
            params,
            vec![
                vec!["users", "sales"],
                vec!["sales", "users", "users"],
                vec!["sales", "users"],
            ]
        );
    }

    #[tokio::test]
    async fn test_concurrent_describes_do_not_mix_records() {
        let fake = FakeCatalog::new(DialectKind::Mysql, "app")
            .rows(
                QueryKind::Columns,
                "a",
                vec![column_row("a_id", "NO", "PRI", "int", None, true, None)],
            )
            .rows(
                QueryKind::Columns,
                "b",
                vec![
                    column_row("b_id", "NO", "PRI", "int", None, true, None),
                    column_row("b_name", "YES", "", "varchar(10)", None, false, Some(10)),
                ],
            )
            .rows(
                QueryKind::Indexes,
                "b",
                vec![index_row("b", "b_name", "index_b_name", 1, false, "asc")],
            );
        let d = describer(fake);
        let ctx = QueryContext::new();

        let (a, b) = tokio::join!(d.describe_table("a", &ctx), d.describe_table("b", &ctx));
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_eq!(a.columns.len(), 1);
        assert_eq!(a.columns[0].name, "a_id");
        assert!(a.indexes.is_empty());
        assert_eq!(b.columns.len(), 2);
        assert!(b.columns.iter().all(|c| c.name.starts_with("b_")));
        assert_eq!(b.indexes[0].table, "b");
    }

    #[tokio::test]
    async fn test_describe_tables_keeps_input_order() {
        let d = describer(users_catalog(DialectKind::Mysql, "app"));
        let results = d
            .describe_tables(&["users", "ghost", "users"], &QueryContext::new(), 2)
            .await;

        let names: Vec<&str> = results.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["users", "ghost", "users"]);
        assert!(results[0].1.is_ok());
        assert!(results[1].1.as_ref().unwrap_err().is_table_not_found());
        assert!(results[2].1.is_ok());
    }

    #[tokio::test]
    async fn test_cancelled_context_issues_no_query() {
        let d = describer(users_catalog(DialectKind::Mysql, "app"));
        let token = CancellationToken::new();
        token.cancel();
        let ctx = QueryContext::new().with_cancel_token(token);

        let err = d.describe_table("users", &ctx).await.unwrap_err();
        assert!(matches!(err, DescribeError::Cancelled));
        assert!(d.connection().calls().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_connect_returns_cancelled() {
        let config = Config::from_yaml(
            "connection:\n  type: postgres\n  host: 127.0.0.1\n  database: app\n  user: svc\n",
        )
        .unwrap();
        let token = CancellationToken::new();
        token.cancel();
        let ctx = QueryContext::new().with_cancel_token(token);

        let err = Describer::connect_with(&config, &ctx).await.unwrap_err();
        assert!(matches!(err, DescribeError::Cancelled));
        assert_eq!(err.exit_code(), crate::error::EXIT_CANCELLED);
    }

    #[tokio::test]
    async fn test_cancel_aborts_in_flight_query() {
        let d = describer(users_catalog(DialectKind::Postgres, "public").hang(QueryKind::Indexes, "users"));
        let ctx = QueryContext::new();
        let token = ctx.cancel_token().clone();

        let task = {
            let d = d.clone();
            tokio::spawn(async move { d.describe_table("users", &ctx).await })
        };
        while d.connection().kinds().len() < 3 {
            tokio::task::yield_now().await;
        }
        token.cancel();

        let err = task.await.unwrap().unwrap_err();
        assert!(matches!(err, DescribeError::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_covers_whole_describe() {
        let d = describer(
            users_catalog(DialectKind::SqlServer, "dbo").hang(QueryKind::ForeignKeys, "users"),
        );
        let ctx = QueryContext::new().with_timeout(Duration::from_secs(30));

        let err = d.describe_table("users", &ctx).await.unwrap_err();
        assert!(matches!(err, DescribeError::Timeout(t) if t == Duration::from_secs(30)));
        assert_eq!(
            d.connection().kinds(),
            vec![QueryKind::Columns, QueryKind::ForeignKeys]
        );
    }

    #[test]
    fn test_health_check_result_json() {
        let result = HealthCheckResult {
            dialect: DialectKind::SqlServer,
            schema: "dbo".into(),
            connected: false,
            latency_ms: 12,
            error: Some("login failed".into()),
            healthy: false,
        };
        let json = result.to_json().unwrap();
        assert!(json.contains("\"dialect\": \"sqlserver\""));
        assert!(json.contains("login failed"));
    }
}
