//! Microsoft SQL Server catalog dialect (Strategy pattern).
//!
//! Columns and foreign keys come from `INFORMATION_SCHEMA`, identity columns
//! and indexes from the `sys` catalog views.

use crate::core::traits::SchemaDialect;
use crate::dialect::{
    BindParam, CatalogQuery, DialectKind, NormalizationRules, QueryKind, COLUMN_ALIASES,
    FOREIGN_KEY_ALIASES, INDEX_ALIASES,
};

/// MSSQL dialect implementation.
#[derive(Debug, Clone, Default)]
pub struct MssqlDialect;

impl MssqlDialect {
    /// Create a new MSSQL dialect instance.
    pub fn new() -> Self {
        Self
    }
}

// A column taking part in several constraints yields one row per constraint;
// the describer keeps the strongest key role.
const COLUMN_SQL: &str = r#"SELECT DISTINCT
    C.COLUMN_NAME AS 'Field',
    C.IS_NULLABLE AS 'Null',
    CASE WHEN C.DATA_TYPE IN ('varchar', 'nvarchar')
         THEN CONCAT(C.DATA_TYPE, '(', REPLACE(C.CHARACTER_MAXIMUM_LENGTH, '-1', 'max'), ')')
         ELSE C.DATA_TYPE END AS 'Type',
    REPLACE(REPLACE(REPLACE(COALESCE(C.COLUMN_DEFAULT, ''), '''', ''), '(', ''), ')', '') AS 'Default',
    CASE
        WHEN TC.CONSTRAINT_TYPE = 'PRIMARY KEY' THEN 'PRI'
        WHEN TC.CONSTRAINT_TYPE = 'UNIQUE' THEN 'UNI'
        WHEN TC.CONSTRAINT_TYPE = 'FOREIGN KEY' THEN 'MUL'
        ELSE ISNULL(TC.CONSTRAINT_TYPE, '')
    END AS 'Key',
    COALESCE(C.CHARACTER_MAXIMUM_LENGTH, 50) AS 'VarcharSize',
    CASE WHEN I.NAME IS NOT NULL THEN 'true' ELSE 'false' END AS 'AutoIncrement',
    C.ORDINAL_POSITION AS 'ORDINAL_POSITION'
FROM INFORMATION_SCHEMA.COLUMNS AS C
    LEFT JOIN SYS.IDENTITY_COLUMNS AS I
        ON I.OBJECT_ID = OBJECT_ID(QUOTENAME(C.TABLE_SCHEMA) + '.' + QUOTENAME(C.TABLE_NAME))
       AND I.NAME = C.COLUMN_NAME
    LEFT JOIN INFORMATION_SCHEMA.CONSTRAINT_COLUMN_USAGE AS CC
        ON CC.TABLE_SCHEMA = C.TABLE_SCHEMA
       AND CC.TABLE_NAME = C.TABLE_NAME
       AND CC.COLUMN_NAME = C.COLUMN_NAME
    LEFT JOIN INFORMATION_SCHEMA.TABLE_CONSTRAINTS AS TC
        ON TC.CONSTRAINT_SCHEMA = CC.CONSTRAINT_SCHEMA
       AND TC.CONSTRAINT_NAME = CC.CONSTRAINT_NAME
WHERE C.TABLE_SCHEMA = @P2 AND C.TABLE_NAME = @P1
ORDER BY C.ORDINAL_POSITION"#;

// KCU walks the owning key, KCU2 the referenced unique key; both sides are
// paired by ordinal position.
const FOREIGN_KEY_SQL: &str = r#"SELECT
    CCU.TABLE_NAME AS 'TABLE_NAME',
    CCU.COLUMN_NAME AS 'COLUMN_NAME',
    CCU.CONSTRAINT_NAME AS 'CONSTRAINT_NAME',
    RC.DELETE_RULE AS 'DELETE_RULE',
    ISNULL(KCU2.TABLE_NAME, '') AS 'REFERENCED_TABLE_NAME',
    ISNULL(KCU2.COLUMN_NAME, '') AS 'REFERENCED_COLUMN_NAME'
FROM INFORMATION_SCHEMA.CONSTRAINT_COLUMN_USAGE AS CCU
    JOIN INFORMATION_SCHEMA.REFERENTIAL_CONSTRAINTS AS RC
        ON RC.CONSTRAINT_SCHEMA = CCU.CONSTRAINT_SCHEMA
       AND RC.CONSTRAINT_NAME = CCU.CONSTRAINT_NAME
    JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE AS KCU
        ON KCU.CONSTRAINT_SCHEMA = RC.CONSTRAINT_SCHEMA
       AND KCU.CONSTRAINT_NAME = RC.CONSTRAINT_NAME
       AND KCU.COLUMN_NAME = CCU.COLUMN_NAME
    LEFT JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE AS KCU2
        ON KCU2.CONSTRAINT_SCHEMA = RC.UNIQUE_CONSTRAINT_SCHEMA
       AND KCU2.CONSTRAINT_NAME = RC.UNIQUE_CONSTRAINT_NAME
       AND KCU2.ORDINAL_POSITION = KCU.ORDINAL_POSITION
WHERE CCU.TABLE_SCHEMA = @P1 AND CCU.TABLE_NAME = @P2 AND KCU.TABLE_NAME = @P3
ORDER BY CCU.CONSTRAINT_NAME, KCU.ORDINAL_POSITION"#;

const INDEX_SQL: &str = r#"SELECT
    TABLE_NAME = t.name,
    COLUMN_NAME = col.name,
    INDEX_NAME = ind.name,
    SEQ_IN_INDEX = CAST(ic.key_ordinal AS int),
    IS_UNIQUE = CASE WHEN ind.is_unique = 0 THEN 'no' ELSE 'yes' END,
    SORT = CASE WHEN ic.is_descending_key = 0 THEN 'asc' ELSE 'desc' END
FROM sys.indexes ind
    INNER JOIN sys.index_columns ic
        ON ind.object_id = ic.object_id AND ind.index_id = ic.index_id
    INNER JOIN sys.columns col
        ON ic.object_id = col.object_id AND ic.column_id = col.column_id
    INNER JOIN sys.tables t ON ind.object_id = t.object_id
    INNER JOIN sys.schemas s ON t.schema_id = s.schema_id
WHERE ind.is_primary_key = 0 AND ic.is_included_column = 0 AND ind.name LIKE 'index%'
  AND s.name = @P1 AND t.name = @P2
ORDER BY t.name, ind.name, ic.key_ordinal"#;

static COLUMN_QUERY: CatalogQuery = CatalogQuery {
    kind: QueryKind::Columns,
    sql: COLUMN_SQL,
    params: &[BindParam::Table, BindParam::Schema],
    fields: COLUMN_ALIASES,
};

static FOREIGN_KEY_QUERY: CatalogQuery = CatalogQuery {
    kind: QueryKind::ForeignKeys,
    sql: FOREIGN_KEY_SQL,
    params: &[BindParam::Schema, BindParam::Table, BindParam::Table],
    fields: FOREIGN_KEY_ALIASES,
};

static INDEX_QUERY: CatalogQuery = CatalogQuery {
    kind: QueryKind::Indexes,
    sql: INDEX_SQL,
    params: &[BindParam::Schema, BindParam::Table],
    fields: INDEX_ALIASES,
};

impl SchemaDialect for MssqlDialect {
    fn kind(&self) -> DialectKind {
        DialectKind::SqlServer
    }

    fn param_placeholder(&self, index: usize) -> String {
        format!("@P{}", index)
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
        &NormalizationRules::SQLSERVER
    }
}
