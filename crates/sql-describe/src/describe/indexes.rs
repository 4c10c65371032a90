//! Index describer and the index naming convention.

use tracing::debug;

use super::{fetch, QueryContext, RowReader};
use crate::core::schema::{IndexEntry, SortDirection};
use crate::core::traits::{CatalogConnection, SchemaDialect};
use crate::dialect::Field;
use crate::error::{DescribeError, Result};

/// Naming convention an index must follow to be reported.
///
/// Only indexes whose name starts with `index` (any case, with or without a
/// separator) are part of the described schema. Every dialect filters on the
/// same prefix in SQL (`LIKE 'index%'` on MySQL and SQL Server, `ILIKE 'index%'`
/// on PostgreSQL) and the describer checks it again after decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexNamingConvention;

impl IndexNamingConvention {
    /// Required name prefix.
    pub const PREFIX: &'static str = "index";

    /// Whether `name` follows the convention (case-insensitive prefix).
    pub fn matches(name: &str) -> bool {
        name.get(..Self::PREFIX.len())
            .is_some_and(|p| p.eq_ignore_ascii_case(Self::PREFIX))
    }
}

/// Describe the convention-named, non-primary indexes of `table`.
///
/// Entries are ordered by table, index name and sequence on every dialect.
pub async fn describe_indexes<C, D>(
    conn: &C,
    dialect: &D,
    table: &str,
    ctx: &QueryContext,
) -> Result<Vec<IndexEntry>>
where
    C: CatalogConnection + ?Sized,
    D: SchemaDialect + ?Sized,
{
    let query = dialect.index_query();
    let rows = fetch(conn, query, table, ctx).await?;
    let decode_err = |msg: String| DescribeError::decode(query.kind.as_str(), msg);

    let mut indexes = Vec::with_capacity(rows.len());
    for row in &rows {
        let row = RowReader::new(query, row);

        let index_name = row.text(Field::IndexName)?;
        if !IndexNamingConvention::matches(&index_name) {
            continue;
        }

        let raw_seq = row.int(Field::Sequence)?;
        let sequence = u32::try_from(raw_seq)
            .ok()
            .filter(|s| *s >= 1)
            .ok_or_else(|| decode_err(format!("index {} has sequence {}", index_name, raw_seq)))?;

        let raw_sort = row.opt_text(Field::Sort)?;
        let sort = match raw_sort.as_deref() {
            None => SortDirection::Asc,
            Some(s) => SortDirection::from_catalog(s)
                .ok_or_else(|| decode_err(format!("unknown sort direction '{}'", s)))?,
        };

        indexes.push(IndexEntry {
            table: row.text(Field::Table)?,
            column: row.text(Field::Column)?,
            index_name,
            sequence,
            unique: row.flag(Field::Unique)?,
            sort,
        });
    }

    indexes.sort_by(|a, b| {
        (&a.table, &a.index_name, a.sequence).cmp(&(&b.table, &b.index_name, b.sequence))
    });

    debug!(
        "{}: described {} index columns of {}",
        dialect.name(),
        indexes.len(),
        table
    );
    Ok(indexes)
}
