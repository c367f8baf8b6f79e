//! PostgreSQL dialect: catalog, options, and naming rules.
//!
//! Unlike SQLite, PostgreSQL carries a native boolean, so boolean fields map
//! straight to a column instead of falling back to an integer. Timestamps are
//! deliberately left out of the catalog and take the portable text fallback,
//! which keeps stored values byte-identical across backends.

use crate::core::field::{
    BinarySetting, IntegerSetting, RealBounds, RealSetting, Setting, StringSetting,
};
use crate::dialect::{ColumnFeatures, Dialect};

const PG_MAX_FIELD_BYTES: u64 = 1_073_741_824;
const MAX_BYTEA_BYTES: u64 = PG_MAX_FIELD_BYTES / 2;
// a code point is at most 4 bytes
const MAX_CODE_POINTS: u64 = MAX_BYTEA_BYTES / 4;

/// PostgreSQL dialect.
#[derive(Debug)]
pub struct PostgresDialect {
    features: ColumnFeatures,
}

impl PostgresDialect {
    pub fn new() -> Self {
        let mut features = ColumnFeatures::new();
        features.append(
            "TEXT",
            false,
            Setting::String(StringSetting {
                min_code_points: 0,
                max_code_points: MAX_CODE_POINTS,
                single_line: false,
            }),
        );
        features.append(
            "BYTEA",
            false,
            Setting::Binary(BinarySetting {
                min_bytes: 0,
                max_bytes: MAX_BYTEA_BYTES,
            }),
        );
        features.append("BOOLEAN", false, Setting::Boolean);
        features.append(
            "BIGINT",
            false,
            Setting::Integer(IntegerSetting {
                min: i128::from(i64::MIN),
                max: i128::from(i64::MAX),
                unit: None,
            }),
        );
        features.append(
            "DOUBLE PRECISION",
            false,
            Setting::Real(RealSetting {
                bounds: RealBounds::float64(),
                unit: None,
            }),
        );
        PostgresDialect { features }
    }
}

impl Default for PostgresDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn features(&self) -> &ColumnFeatures {
        &self.features
    }

    fn param_placeholder(&self, index: usize) -> String {
        format!("${index}")
    }

    fn table_options(&self, _auto_id_key: bool) -> Vec<String> {
        Vec::new()
    }

    fn auto_id_type(&self) -> &'static str {
        "BIGINT GENERATED BY DEFAULT AS IDENTITY"
    }

    fn auto_id_reference_type(&self) -> &'static str {
        "BIGINT"
    }

    fn is_reserved_word(&self, word: &str) -> bool {
        RESERVED_WORDS.contains(&word.to_ascii_lowercase().as_str())
    }
}

/// Fully reserved PostgreSQL keywords.
const RESERVED_WORDS: &[&str] = &[
    "all",
    "analyse",
    "analyze",
    "and",
    "any",
    "array",
    "as",
    "asc",
    "asymmetric",
    "authorization",
    "binary",
    "both",
    "case",
    "cast",
    "check",
    "collate",
    "collation",
    "column",
    "concurrently",
    "constraint",
    "create",
    "cross",
    "current_catalog",
    "current_date",
    "current_role",
    "current_schema",
    "current_time",
    "current_timestamp",
    "current_user",
    "default",
    "deferrable",
    "desc",
    "distinct",
    "do",
    "else",
    "end",
    "except",
    "false",
    "fetch",
    "for",
    "foreign",
    "freeze",
    "from",
    "full",
    "grant",
    "group",
    "having",
    "ilike",
    "in",
    "initially",
    "inner",
    "intersect",
    "into",
    "is",
    "isnull",
    "join",
    "lateral",
    "leading",
    "left",
    "like",
    "limit",
    "localtime",
    "localtimestamp",
    "natural",
    "not",
    "notnull",
    "null",
    "offset",
    "on",
    "only",
    "or",
    "order",
    "outer",
    "overlaps",
    "placing",
    "primary",
    "references",
    "returning",
    "right",
    "select",
    "session_user",
    "similar",
    "some",
    "symmetric",
    "table",
    "tablesample",
    "then",
    "to",
    "trailing",
    "true",
    "union",
    "unique",
    "user",
    "using",
    "variadic",
    "verbose",
    "when",
    "where",
    "window",
    "with",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::field::Field;

    #[test]
    fn boolean_is_native() {
        let dialect = PostgresDialect::new();
        let flag = Field::new("published", Setting::Boolean).unwrap();
        let feature = dialect.features().matched(&flag);
        assert_eq!(feature.map(|f| f.type_name.as_str()), Some("BOOLEAN"));
    }

    #[test]
    fn placeholders_are_positional() {
        let dialect = PostgresDialect::new();
        assert_eq!(dialect.param_placeholder(1), "$1");
        assert_eq!(dialect.param_placeholder(12), "$12");
        assert!(dialect.table_options(true).is_empty());
        assert!(dialect.table_options(false).is_empty());
    }

    #[test]
    fn reserved_words_get_escaped() {
        let dialect = PostgresDialect::new();
        assert_eq!(dialect.external_name("user"), "user_");
        assert_eq!(dialect.external_name("email"), "email");
    }
}
