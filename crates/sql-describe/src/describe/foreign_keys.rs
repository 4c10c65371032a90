//! Foreign key describer.

use tracing::debug;

use super::{fetch, QueryContext, RowReader};
use crate::core::schema::{DeleteRule, ForeignKey};
use crate::core::traits::{CatalogConnection, SchemaDialect};
use crate::dialect::Field;
use crate::error::{DescribeError, Result};

/// Describe the foreign keys owned by `table`.
///
/// Composite keys yield one record per column. A table without foreign keys
/// yields an empty list.
pub async fn describe_foreign_keys<C, D>(
    conn: &C,
    dialect: &D,
    table: &str,
    ctx: &QueryContext,
) -> Result<Vec<ForeignKey>>
where
    C: CatalogConnection + ?Sized,
    D: SchemaDialect + ?Sized,
{
    let query = dialect.foreign_key_query();
    let rows = fetch(conn, query, table, ctx).await?;

    let foreign_keys = rows
        .iter()
        .map(|row| {
            let row = RowReader::new(query, row);
            let rule = row.text(Field::DeleteRule)?;
            let on_delete = rule
                .parse::<DeleteRule>()
                .map_err(|e| DescribeError::decode(query.kind.as_str(), e))?;

            Ok(ForeignKey {
                table: row.text(Field::Table)?,
                column: row.text(Field::Column)?,
                constraint_name: row.text(Field::ConstraintName)?,
                on_delete,
                referenced_table: row.text(Field::ReferencedTable)?,
                referenced_column: row.text(Field::ReferencedColumn)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(
        "{}: described {} foreign key columns of {}",
        dialect.name(),
        foreign_keys.len(),
        table
    );
    Ok(foreign_keys)
}
