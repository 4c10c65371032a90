//! Canonicalization of decoded column values.
//!
//! Each catalog query already performs most of its dialect's normalization in
//! SQL (see `drivers/<db>/dialect.rs`). The rules here are applied again after
//! decoding, so a value reaching a [`Column`](crate::core::Column) is canonical
//! whatever the backend version actually emitted. Every rule is idempotent on
//! values the SQL already normalized.
//!
//! | Rule            | MySQL          | PostgreSQL               | SQL Server                 |
//! |-----------------|----------------|--------------------------|----------------------------|
//! | Auto-increment  | `extra` flag   | never                    | identity catalog entry     |
//! | Default quoting | verbatim       | strip `'`, cut at `::`   | strip `'`, `(` and `)`     |
//! | `1`/`0` default | every column   | boolean-like types only  | boolean-like types only    |

/// Size reported for character columns without a usable maximum length.
pub const UNBOUNDED_VARCHAR_SIZE: i64 = 50;

/// Where the auto-increment signal comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoIncrementSource {
    /// `information_schema.columns.extra` contains `auto_increment`.
    ExtraFlag,
    /// A matching row in the identity-columns catalog.
    IdentityCatalog,
    /// No catalog signal is consulted; always `false`.
    Unsupported,
}

/// How quoting is removed from catalog default expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultQuoting {
    /// Defaults are reported unquoted.
    Verbatim,
    /// `'draft'::character varying` becomes `draft`.
    StripQuotesAndCast,
    /// `(('draft'))` becomes `draft`.
    StripQuotesAndParens,
}

/// Which columns get `1`/`0` defaults rewritten to `true`/`false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanDefaults {
    AllColumns,
    BooleanTypesOnly,
}

/// Normalization rules of one dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizationRules {
    pub auto_increment: AutoIncrementSource,
    pub default_quoting: DefaultQuoting,
    pub boolean_defaults: BooleanDefaults,
}

impl NormalizationRules {
    pub const MYSQL: NormalizationRules = NormalizationRules {
        auto_increment: AutoIncrementSource::ExtraFlag,
        default_quoting: DefaultQuoting::Verbatim,
        boolean_defaults: BooleanDefaults::AllColumns,
    };

    pub const POSTGRES: NormalizationRules = NormalizationRules {
        auto_increment: AutoIncrementSource::Unsupported,
        default_quoting: DefaultQuoting::StripQuotesAndCast,
        boolean_defaults: BooleanDefaults::BooleanTypesOnly,
    };

    pub const SQLSERVER: NormalizationRules = NormalizationRules {
        auto_increment: AutoIncrementSource::IdentityCatalog,
        default_quoting: DefaultQuoting::StripQuotesAndParens,
        boolean_defaults: BooleanDefaults::BooleanTypesOnly,
    };

    /// Canonical default string for a column of `data_type`.
    ///
    /// A missing default becomes the empty string.
    pub fn default_value(&self, raw: Option<&str>, data_type: &str) -> String {
        let Some(raw) = raw else {
            return String::new();
        };

        let stripped = match self.default_quoting {
            DefaultQuoting::Verbatim => raw.to_string(),
            DefaultQuoting::StripQuotesAndCast => {
                let unquoted = raw.replace('\'', "");
                match unquoted.split_once("::") {
                    Some((value, _cast)) => value.to_string(),
                    None => unquoted,
                }
            }
            DefaultQuoting::StripQuotesAndParens => raw.replace(['\'', '(', ')'], ""),
        };

        let rewrite = match self.boolean_defaults {
            BooleanDefaults::AllColumns => true,
            BooleanDefaults::BooleanTypesOnly => is_boolean_like(data_type),
        };
        if rewrite {
            match stripped.as_str() {
                "1" => return "true".to_string(),
                "0" => return "false".to_string(),
                _ => {}
            }
        }

        stripped
    }

    /// Canonical auto-increment flag from the decoded catalog flag.
    pub fn auto_increment(&self, flag: Option<bool>) -> bool {
        match self.auto_increment {
            AutoIncrementSource::Unsupported => false,
            AutoIncrementSource::ExtraFlag | AutoIncrementSource::IdentityCatalog => {
                flag.unwrap_or(false)
            }
        }
    }

    /// Canonical varchar size; null and non-positive lengths are unbounded.
    pub fn varchar_size(&self, raw: Option<i64>) -> i64 {
        match raw {
            Some(n) if n > 0 => n,
            _ => UNBOUNDED_VARCHAR_SIZE,
        }
    }
}

/// Whether a catalog type name denotes a boolean-like column.
pub fn is_boolean_like(data_type: &str) -> bool {
    let t = data_type.trim().to_ascii_lowercase();
    t == "bit" || t == "bit(1)" || t.starts_with("bool") || t == "tinyint(1)"
}
