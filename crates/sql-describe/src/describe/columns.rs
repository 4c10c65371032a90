//! Column describer.

use std::collections::HashMap;

use tracing::debug;

use super::{fetch, QueryContext, RowReader};
use crate::core::schema::{Column, KeyRole};
use crate::core::traits::{CatalogConnection, SchemaDialect};
use crate::dialect::{CatalogQuery, Field, NormalizationRules};
use crate::error::{DescribeError, Result};

/// Describe the columns of `table`, in ordinal order.
///
/// # Errors
///
/// [`DescribeError::TableNotFound`] when the catalog returns no rows. Query
/// and decode failures propagate unchanged.
pub async fn describe_columns<C, D>(
    conn: &C,
    dialect: &D,
    table: &str,
    ctx: &QueryContext,
) -> Result<Vec<Column>>
where
    C: CatalogConnection + ?Sized,
    D: SchemaDialect + ?Sized,
{
    let query = dialect.column_query();
    let rows = fetch(conn, query, table, ctx).await?;
    if rows.is_empty() {
        return Err(DescribeError::table_not_found(dialect.name(), table));
    }

    let rules = dialect.rules();
    let mut columns: Vec<Column> = Vec::with_capacity(rows.len());
    let mut by_name: HashMap<String, usize> = HashMap::with_capacity(rows.len());

    for row in &rows {
        let column = decode(query, rules, &RowReader::new(query, row))?;
        match by_name.get(&column.name) {
            // one row per constraint the column takes part in
            Some(&idx) => {
                let existing = &mut columns[idx];
                existing.key_role = existing.key_role.max(column.key_role);
            }
            None => {
                by_name.insert(column.name.clone(), columns.len());
                columns.push(column);
            }
        }
    }

    debug!(
        "{}: described {} columns of {} ({} catalog rows)",
        dialect.name(),
        columns.len(),
        table,
        rows.len()
    );
    Ok(columns)
}

fn decode(query: &CatalogQuery, rules: &NormalizationRules, row: &RowReader<'_>) -> Result<Column> {
    let name = row.text(Field::ColumnName)?;
    if name.is_empty() {
        return Err(DescribeError::decode(query.kind.as_str(), "empty column name"));
    }
    let data_type = row.text(Field::DataType)?;
    let key_role = row
        .opt_text(Field::KeyRole)?
        .map(|k| KeyRole::from_catalog(&k))
        .unwrap_or_default();
    let default = rules.default_value(row.opt_text(Field::Default)?.as_deref(), &data_type);

    Ok(Column {
        nullable: row.flag(Field::Nullable)?,
        key_role,
        default,
        auto_increment: rules.auto_increment(row.opt_flag(Field::AutoIncrement)?),
        varchar_size: rules.varchar_size(row.opt_int(Field::VarcharSize)?),
        data_type,
        name,
    })
}
