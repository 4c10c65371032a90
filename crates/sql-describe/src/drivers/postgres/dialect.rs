//! PostgreSQL catalog dialect (Strategy pattern).
//!
//! Columns come from `information_schema`; foreign keys and indexes from the
//! `pg_catalog` system tables. Every output column is cast to `text` or `int`
//! so the driver never sees `information_schema` domain types.

use crate::core::traits::SchemaDialect;
use crate::dialect::{
    BindParam, CatalogQuery, DialectKind, NormalizationRules, QueryKind, COLUMN_ALIASES,
    FOREIGN_KEY_ALIASES, INDEX_ALIASES,
};

/// PostgreSQL dialect implementation.
#[derive(Debug, Clone, Default)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// Create a new PostgreSQL dialect instance.
    pub fn new() -> Self {
        Self
    }
}

// AutoIncrement is always 'false': serial columns are only recognisable by
// their nextval() default.
const COLUMN_SQL: &str = r#"SELECT
    isc.column_name::text AS "Field",
    SPLIT_PART(REPLACE(COALESCE(isc.column_default, ''), '''', ''), '::', 1) AS "Default",
    CASE WHEN isc.data_type = 'character varying' AND isc.character_maximum_length IS NOT NULL
         THEN isc.data_type || '(' || isc.character_maximum_length || ')'
         ELSE isc.data_type::text END AS "Type",
    isc.is_nullable::text AS "Null",
    CASE
        WHEN t.constraint_type = 'PRIMARY KEY' THEN 'PRI'
        WHEN t.constraint_type = 'UNIQUE' THEN 'UNI'
        ELSE ''
    END AS "Key",
    'false' AS "AutoIncrement",
    COALESCE(isc.character_maximum_length, 50)::int AS "VarcharSize"
FROM information_schema.columns isc
    LEFT JOIN (
        SELECT cu.table_schema, cu.table_name, cu.column_name, istc.constraint_type
        FROM information_schema.constraint_column_usage cu
            LEFT JOIN information_schema.table_constraints istc
                ON (istc.table_schema, istc.table_name, istc.constraint_name)
                 = (cu.table_schema, cu.table_name, cu.constraint_name)
        WHERE istc.constraint_type IN ('PRIMARY KEY', 'UNIQUE')
    ) t
        ON (t.table_schema, t.table_name, t.column_name)
         = (isc.table_schema, isc.table_name, isc.column_name)
WHERE (isc.table_schema, isc.table_name) = ($2, $1)
ORDER BY isc.ordinal_position"#;

// Read from pg_constraint rather than information_schema: a key referencing a
// column covered only by a unique index has no unique_constraint_name.
// unnest(conkey, confkey) pairs composite key columns by position.
const FOREIGN_KEY_SQL: &str = r#"SELECT
    t.relname::text AS "TABLE_NAME",
    a.attname::text AS "COLUMN_NAME",
    c.conname::text AS "CONSTRAINT_NAME",
    CASE c.confdeltype
        WHEN 'c' THEN 'CASCADE'
        WHEN 'n' THEN 'SET NULL'
        WHEN 'r' THEN 'RESTRICT'
        WHEN 'd' THEN 'SET DEFAULT'
        ELSE 'NO ACTION'
    END AS "DELETE_RULE",
    rt.relname::text AS "REFERENCED_TABLE_NAME",
    ra.attname::text AS "REFERENCED_COLUMN_NAME"
FROM pg_catalog.pg_constraint c
    JOIN pg_catalog.pg_class t ON t.oid = c.conrelid
    JOIN pg_catalog.pg_namespace n ON n.oid = t.relnamespace
    JOIN pg_catalog.pg_class rt ON rt.oid = c.confrelid
    CROSS JOIN LATERAL unnest(c.conkey, c.confkey) WITH ORDINALITY AS k(attnum, refnum, ord)
    JOIN pg_catalog.pg_attribute a ON a.attrelid = c.conrelid AND a.attnum = k.attnum
    JOIN pg_catalog.pg_attribute ra ON ra.attrelid = c.confrelid AND ra.attnum = k.refnum
WHERE c.contype = 'f' AND n.nspname = $1 AND t.relname = $2
ORDER BY c.conname, k.ord"#;

const INDEX_SQL: &str = r#"SELECT
    t.relname::text AS "TABLE_NAME",
    a.attname::text AS "COLUMN_NAME",
    i.relname::text AS "INDEX_NAME",
    (1 + array_position(ix.indkey, a.attnum))::int AS "SEQ_IN_INDEX",
    CASE WHEN ix.indisunique THEN 'yes' ELSE 'no' END AS "IS_UNIQUE",
    CASE WHEN (ix.indoption[array_position(ix.indkey, a.attnum)] & 1) = 1
         THEN 'desc' ELSE 'asc' END AS "SORT"
FROM pg_catalog.pg_class t
    JOIN pg_catalog.pg_attribute a ON t.oid = a.attrelid
    JOIN pg_catalog.pg_index ix ON t.oid = ix.indrelid
    JOIN pg_catalog.pg_class i ON a.attnum = ANY(ix.indkey) AND i.oid = ix.indexrelid
    JOIN pg_catalog.pg_namespace n ON n.oid = t.relnamespace
WHERE n.nspname = $1 AND t.relname = $2 AND i.relname ILIKE 'index%'
  AND t.relkind = 'r' AND NOT ix.indisprimary
ORDER BY t.relname, i.relname, array_position(ix.indkey, a.attnum)"#;

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

impl SchemaDialect for PostgresDialect {
    fn kind(&self) -> DialectKind {
        DialectKind::Postgres
    }

    fn param_placeholder(&self, index: usize) -> String {
        format!("${}", index)
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
        &NormalizationRules::POSTGRES
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::DeleteRule;
    use crate::dialect::validate_dialect;

    #[test]
    fn test_param_placeholder() {
        let dialect = PostgresDialect::new();
        assert_eq!(dialect.name(), "postgres");
        assert_eq!(dialect.param_placeholder(1), "$1");
        assert_eq!(dialect.param_placeholder(10), "$10");
    }

    #[test]
    fn test_queries_match_field_maps() {
        assert_eq!(validate_dialect(&PostgresDialect::new()), Ok(()));
    }

    #[test]
    fn test_column_query_binds_table_first() {
        let query = PostgresDialect::new().column_query();
        // $1 is the table, $2 the schema
        assert!(query.sql.contains("= ($2, $1)"));
        assert_eq!(query.bind("users", "public"), vec!["users", "public"]);
    }

    #[test]
    fn test_foreign_key_query_pairs_composite_columns() {
        let query = PostgresDialect::new().foreign_key_query();
        assert!(query.sql.contains("unnest(c.conkey, c.confkey) WITH ORDINALITY"));
        assert!(query.sql.contains("ORDER BY c.conname, k.ord"));
        assert_eq!(query.bind("orders", "public"), vec!["public", "orders"]);
    }

    #[test]
    fn test_foreign_key_query_keeps_keys_on_unique_indexes() {
        // A key referencing a column backed only by CREATE UNIQUE INDEX has a
        // NULL unique_constraint_name; nothing may join on it.
        let sql = PostgresDialect::new().foreign_key_query().sql;
        assert!(sql.contains("FROM pg_catalog.pg_constraint c"));
        assert!(!sql.contains("unique_constraint_name"));
        assert!(!sql.contains("referential_constraints"));
        assert!(!sql.contains("LEFT JOIN") && !sql.contains("INNER JOIN"));
    }

    #[test]
    fn test_foreign_key_delete_rules_parse() {
        let sql = PostgresDialect::new().foreign_key_query().sql;
        for (code, rule) in [
            ('c', DeleteRule::Cascade),
            ('n', DeleteRule::SetNull),
            ('r', DeleteRule::Restrict),
            ('d', DeleteRule::SetDefault),
        ] {
            let arm = format!("WHEN '{}' THEN '{}'", code, rule.as_str());
            assert!(sql.contains(&arm), "missing {}", arm);
            assert_eq!(rule.as_str().parse::<DeleteRule>(), Ok(rule));
        }
        assert!(sql.contains("ELSE 'NO ACTION'"));
    }

    #[test]
    fn test_index_query_excludes_primary_key() {
        let sql = PostgresDialect::new().index_query().sql;
        assert!(sql.contains("NOT ix.indisprimary"));
        assert!(sql.contains("i.relname ILIKE 'index%'"));
    }
}
