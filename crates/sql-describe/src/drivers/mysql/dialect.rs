//! MySQL/MariaDB catalog dialect (Strategy pattern).
//!
//! Reads `information_schema.columns`, `key_column_usage` joined with
//! `referential_constraints`, and `information_schema.statistics`.

use crate::core::traits::SchemaDialect;
use crate::dialect::{
    BindParam, CatalogQuery, DialectKind, NormalizationRules, QueryKind, COLUMN_ALIASES,
    FOREIGN_KEY_ALIASES, INDEX_ALIASES,
};

/// MySQL/MariaDB dialect implementation.
///
/// Compatible with MySQL 5.7+, 8.0+, and MariaDB 10.2+.
#[derive(Debug, Clone, Default)]
pub struct MysqlDialect;

impl MysqlDialect {
    /// Create a new MySQL dialect instance.
    pub fn new() -> Self {
        Self
    }
}

const COLUMN_SQL: &str = r#"SELECT
    COLUMN_NAME AS 'Field',
    IS_NULLABLE AS 'Null',
    COLUMN_KEY AS 'Key',
    CASE WHEN DATA_TYPE = 'varchar'
         THEN CONCAT(DATA_TYPE, '(', CHARACTER_MAXIMUM_LENGTH, ')')
         ELSE DATA_TYPE END AS 'Type',
    CASE
        WHEN COLUMN_DEFAULT = '1' THEN 'true'
        WHEN COLUMN_DEFAULT = '0' THEN 'false'
        ELSE COALESCE(COLUMN_DEFAULT, '')
    END AS 'Default',
    CASE WHEN EXTRA LIKE '%auto_increment%' THEN 'true' ELSE 'false' END AS 'AutoIncrement',
    COALESCE(CHARACTER_MAXIMUM_LENGTH, 50) AS 'VarcharSize'
FROM information_schema.columns
WHERE (TABLE_NAME, TABLE_SCHEMA) = (?, ?)
ORDER BY ORDINAL_POSITION"#;

const FOREIGN_KEY_SQL: &str = r#"SELECT
    KCU.TABLE_NAME AS TABLE_NAME,
    KCU.COLUMN_NAME AS COLUMN_NAME,
    KCU.CONSTRAINT_NAME AS CONSTRAINT_NAME,
    RC.DELETE_RULE AS DELETE_RULE,
    KCU.REFERENCED_TABLE_NAME AS REFERENCED_TABLE_NAME,
    KCU.REFERENCED_COLUMN_NAME AS REFERENCED_COLUMN_NAME
FROM INFORMATION_SCHEMA.KEY_COLUMN_USAGE AS KCU
    JOIN INFORMATION_SCHEMA.REFERENTIAL_CONSTRAINTS AS RC
        ON RC.CONSTRAINT_SCHEMA = KCU.CONSTRAINT_SCHEMA
       AND RC.CONSTRAINT_NAME = KCU.CONSTRAINT_NAME
WHERE KCU.REFERENCED_TABLE_SCHEMA = ? AND KCU.TABLE_NAME = ?
ORDER BY KCU.CONSTRAINT_NAME, KCU.ORDINAL_POSITION"#;

const INDEX_SQL: &str = r#"SELECT
    TABLE_NAME AS TABLE_NAME,
    COLUMN_NAME AS COLUMN_NAME,
    INDEX_NAME AS INDEX_NAME,
    SEQ_IN_INDEX AS SEQ_IN_INDEX,
    CASE WHEN NON_UNIQUE = 0 THEN 'yes' ELSE 'no' END AS IS_UNIQUE,
    CASE WHEN COLLATION = 'A' THEN 'asc' ELSE 'desc' END AS SORT
FROM INFORMATION_SCHEMA.STATISTICS
WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ? AND INDEX_NAME LIKE 'index%'
ORDER BY TABLE_NAME, INDEX_NAME, SEQ_IN_INDEX"#;

static COLUMN_QUERY: CatalogQuery = CatalogQuery {
    kind: QueryKind::Columns,
    sql: COLUMN_SQL,
    params: &[BindParam::Table, BindParam::Schema],
    fields: COLUMN_ALIASES,
};

static FOREIGN_KEY_QUERY: CatalogQuery = CatalogQuery {
    kind: QueryKind::ForeignKeys,
    sql: FOREIGN_KEY_SQL,
    params: &[BindParam::Schema, BindParam::Table],
    fields: FOREIGN_KEY_ALIASES,
};

static INDEX_QUERY: CatalogQuery = CatalogQuery {
    kind: QueryKind::Indexes,
    sql: INDEX_SQL,
    params: &[BindParam::Schema, BindParam::Table],
    fields: INDEX_ALIASES,
};

impl SchemaDialect for MysqlDialect {
    fn kind(&self) -> DialectKind {
        DialectKind::Mysql
    }

    fn param_placeholder(&self, _index: usize) -> String {
        // MySQL uses positional ? placeholders
        "?".to_string()
    }

    fn column_query(&self) -> &'static CatalogQuery {
        &COLUMN_QUERY
    }

    fn foreign_key_query(&self) -> &'static CatalogQuery {
        &FOREIGN_KEY_QUERY
    }

    fn index_query(&self) -> &'static CatalogQuery {
        &INDEX_QUERY
    }

    fn rules(&self) -> &'static NormalizationRules {
        &NormalizationRules::MYSQL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::validate_dialect;

    #[test]
    fn test_dialect_name() {
        let dialect = MysqlDialect::new();
        assert_eq!(dialect.name(), "mysql");
        assert_eq!(dialect.param_placeholder(1), "?");
        assert_eq!(dialect.param_placeholder(2), "?");
    }

    #[test]
    fn test_queries_match_field_maps() {
        assert_eq!(validate_dialect(&MysqlDialect::new()), Ok(()));
    }

    #[test]
    fn test_bind_orders() {
        let dialect = MysqlDialect::new();
        assert_eq!(dialect.column_query().bind("users", "app"), vec!["users", "app"]);
        assert_eq!(dialect.foreign_key_query().bind("users", "app"), vec!["app", "users"]);
        assert_eq!(dialect.index_query().bind("users", "app"), vec!["app", "users"]);
    }

    #[test]
    fn test_index_query_filters_naming_convention() {
        let sql = MysqlDialect::new().index_query().sql;
        assert!(sql.contains("INDEX_NAME LIKE 'index%'"));
        assert!(sql.contains("ORDER BY TABLE_NAME, INDEX_NAME, SEQ_IN_INDEX"));
    }
}
