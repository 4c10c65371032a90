//! Plain-text rendering of describe results.

use std::fmt::Write;

use sql_describe::{CatalogQuery, HealthCheckResult, SchemaDialect, TableDescription};

/// Render a table description as aligned text sections.
pub fn table_report(schema: &str, table: &str, desc: &TableDescription) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Table {}.{}", schema, table);

    let _ = writeln!(out, "\nColumns ({}):", desc.columns.len());
    let width = desc.columns.iter().map(|c| c.name.len()).max().unwrap_or(0);
    for c in &desc.columns {
        let mut flags = Vec::new();
        if !c.nullable {
            flags.push("NOT NULL".to_string());
        }
        if !c.key_role.as_str().is_empty() {
            flags.push(c.key_role.as_str().to_string());
        }
        if c.auto_increment {
            flags.push("AUTO".to_string());
        }
        if c.has_default() {
            flags.push(format!("DEFAULT {}", c.default));
        }
        let _ = writeln!(
            out,
            "  {:<width$}  {:<24} {}",
            c.name,
            c.data_type,
            flags.join(" "),
            width = width
        );
    }

    let _ = writeln!(out, "\nForeign keys ({}):", desc.foreign_keys.len());
    for (name, cols) in desc.foreign_keys_by_constraint() {
        let from: Vec<&str> = cols.iter().map(|fk| fk.column.as_str()).collect();
        let to: Vec<&str> = cols.iter().map(|fk| fk.referenced_column.as_str()).collect();
        let _ = writeln!(
            out,
            "  {} ({}) -> {} ({}) ON DELETE {}",
            name,
            from.join(", "),
            cols[0].referenced_table,
            to.join(", "),
            cols[0].on_delete
        );
    }

    let _ = writeln!(out, "\nIndexes ({}):", desc.indexes_by_name().len());
    for (name, entries) in desc.indexes_by_name() {
        let cols: Vec<String> = entries
            .iter()
            .map(|e| format!("{} {}", e.column, e.sort.as_str()))
            .collect();
        let unique = if entries[0].unique { "UNIQUE " } else { "" };
        let _ = writeln!(out, "  {}{} ({})", unique, name, cols.join(", "));
    }

    out
}

/// Render the health check result.
pub fn health_report(result: &HealthCheckResult) -> String {
    let mut out = String::from("Health Check Results:\n");
    let _ = writeln!(
        out,
        "  {} ({}): {} ({}ms)",
        result.dialect,
        result.schema,
        if result.connected { "OK" } else { "FAILED" },
        result.latency_ms
    );
    if let Some(ref err) = result.error {
        let _ = writeln!(out, "    Error: {}", err);
    }
    let _ = writeln!(
        out,
        "\n  Overall: {}",
        if result.healthy { "HEALTHY" } else { "UNHEALTHY" }
    );
    out
}

/// Render the catalog queries of one dialect.
pub fn queries_report<D: SchemaDialect + ?Sized>(dialect: &D) -> String {
    let mut out = String::new();
    for query in sql_describe::QueryKind::ALL.map(|k| dialect.query(k)) {
        let _ = writeln!(out, "-- {} query ({})", query.kind, dialect.name());
        let _ = writeln!(out, "-- bind order: {}", bind_order(query));
        let _ = writeln!(out, "{}\n", query.sql.trim());
    }
    out
}

pub fn bind_order(query: &CatalogQuery) -> String {
    query
        .params
        .iter()
        .enumerate()
        .map(|(i, p)| format!("{}={}", i + 1, p.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use sql_describe::{
        Column, DeleteRule, DialectImpl, DialectKind, ForeignKey, IndexEntry, KeyRole,
        SortDirection,
    };

    fn sample() -> TableDescription {
        TableDescription {
            columns: vec![
                Column {
                    name: "id".into(),
                    nullable: false,
                    key_role: KeyRole::Primary,
                    data_type: "int".into(),
                    default: String::new(),
                    auto_increment: true,
                    varchar_size: 50,
                },
                Column {
                    name: "org_id".into(),
                    nullable: true,
                    key_role: KeyRole::None,
                    data_type: "int".into(),
                    default: "0".into(),
                    auto_increment: false,
                    varchar_size: 50,
                },
            ],
            foreign_keys: vec![ForeignKey {
                table: "users".into(),
                column: "org_id".into(),
                constraint_name: "fk_users_org".into(),
                on_delete: DeleteRule::SetNull,
                referenced_table: "orgs".into(),
                referenced_column: "id".into(),
            }],
            indexes: vec![IndexEntry {
                table: "users".into(),
                column: "org_id".into(),
                index_name: "index_users_org".into(),
                sequence: 1,
                unique: false,
                sort: SortDirection::Desc,
            }],
        }
    }

    #[test]
    fn test_table_report_sections() {
        let text = table_report("app", "users", &sample());
        assert!(text.starts_with("Table app.users"));
        assert!(text.contains("Columns (2):"));
        assert!(text.contains("NOT NULL PRI AUTO"));
        assert!(text.contains("DEFAULT 0"));
        assert!(text.contains("fk_users_org (org_id) -> orgs (id) ON DELETE SET NULL"));
        assert!(text.contains("index_users_org (org_id desc)"));
    }

    #[test]
    fn test_queries_report_lists_bind_order() {
        let text = queries_report(&DialectImpl::for_kind(DialectKind::SqlServer));
        assert!(text.contains("-- foreign key query (sqlserver)"));
        assert!(text.contains("-- bind order: 1=schema, 2=table, 3=table"));
        assert!(text.contains("-- column query (sqlserver)\n-- bind order: 1=table, 2=schema"));
    }
}
