//! SQLite dialect: catalog, options, and naming rules.
//!
//! SQLite with `STRICT` tables has four usable storage classes. Strings and
//! blobs share one size limit (`SQLITE_MAX_LENGTH`, 1e9 by default); the
//! catalog claims half of it as a safety buffer, and a quarter of that for
//! strings since a code point takes up to four bytes. There is no native
//! boolean or timestamp column, so those fall back to integer and text.

use crate::core::field::{
    BinarySetting, IntegerSetting, RealBounds, RealSetting, Setting, StringSetting,
};
use crate::dialect::{ColumnFeatures, Dialect};

const SQLITE_MAX_LENGTH: u64 = 1_000_000_000;
const MAX_BLOB_BYTES: u64 = SQLITE_MAX_LENGTH / 2;
// a code point is at most 4 bytes
const MAX_CODE_POINTS: u64 = MAX_BLOB_BYTES / 4;

/// SQLite dialect over STRICT tables.
#[derive(Debug)]
pub struct SqliteDialect {
    features: ColumnFeatures,
}

impl SqliteDialect {
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
            "BLOB",
            false,
            Setting::Binary(BinarySetting {
                min_bytes: 0,
                max_bytes: MAX_BLOB_BYTES,
            }),
        );
        features.append(
            "INTEGER",
            false,
            Setting::Integer(IntegerSetting {
                min: i128::from(i64::MIN),
                max: i128::from(i64::MAX),
                unit: None,
            }),
        );
        features.append(
            "REAL",
            false,
            Setting::Real(RealSetting {
                bounds: RealBounds::float64(),
                unit: None,
            }),
        );
        SqliteDialect { features }
    }
}

impl Default for SqliteDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn features(&self) -> &ColumnFeatures {
        &self.features
    }

    fn param_placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn table_options(&self, auto_id_key: bool) -> Vec<String> {
        if auto_id_key {
            vec!["STRICT".to_string()]
        } else {
            vec!["STRICT".to_string(), "WITHOUT ROWID".to_string()]
        }
    }

    fn auto_id_type(&self) -> &'static str {
        // INTEGER PRIMARY KEY aliases the rowid, giving auto-assignment
        "INTEGER"
    }

    fn is_reserved_word(&self, word: &str) -> bool {
        RESERVED_WORDS.contains(&word.to_ascii_lowercase().as_str())
    }
}

/// The SQLite keyword list.
const RESERVED_WORDS: &[&str] = &[
    "abort",
    "action",
    "add",
    "after",
    "all",
    "alter",
    "always",
    "analyze",
    "and",
    "as",
    "asc",
    "attach",
    "autoincrement",
    "before",
    "begin",
    "between",
    "by",
    "cascade",
    "case",
    "cast",
    "check",
    "collate",
    "column",
    "commit",
    "conflict",
    "constraint",
    "create",
    "cross",
    "current",
    "current_date",
    "current_time",
    "current_timestamp",
    "database",
    "default",
    "deferrable",
    "deferred",
    "delete",
    "desc",
    "detach",
    "distinct",
    "do",
    "drop",
    "each",
    "else",
    "end",
    "escape",
    "except",
    "exclude",
    "exclusive",
    "exists",
    "explain",
    "fail",
    "filter",
    "first",
    "following",
    "for",
    "foreign",
    "from",
    "full",
    "generated",
    "glob",
    "group",
    "groups",
    "having",
    "if",
    "ignore",
    "immediate",
    "in",
    "index",
    "indexed",
    "initially",
    "inner",
    "insert",
    "instead",
    "intersect",
    "into",
    "is",
    "isnull",
    "join",
    "key",
    "last",
    "left",
    "like",
    "limit",
    "match",
    "materialized",
    "natural",
    "no",
    "not",
    "nothing",
    "notnull",
    "null",
    "nulls",
    "of",
    "offset",
    "on",
    "or",
    "order",
    "others",
    "outer",
    "over",
    "partition",
    "plan",
    "pragma",
    "preceding",
    "primary",
    "query",
    "raise",
    "range",
    "recursive",
    "references",
    "regexp",
    "reindex",
    "release",
    "rename",
    "replace",
    "restrict",
    "returning",
    "right",
    "rollback",
    "row",
    "rows",
    "savepoint",
    "select",
    "set",
    "table",
    "temp",
    "temporary",
    "then",
    "ties",
    "to",
    "transaction",
    "trigger",
    "unbounded",
    "union",
    "unique",
    "update",
    "using",
    "vacuum",
    "values",
    "view",
    "virtual",
    "when",
    "where",
    "window",
    "with",
    "without",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::field::{Field, TimestampSetting};
    use chrono::{TimeZone, Utc};
    use std::time::Duration;

    fn make_test_field(name: &str, setting: Setting) -> Field {
        Field::new(name, setting).unwrap()
    }

    #[test]
    fn catalog_claims_the_four_storage_classes() {
        let dialect = SqliteDialect::new();
        let cases = [
            (
                make_test_field(
                    "note",
                    Setting::String(StringSetting {
                        min_code_points: 0,
                        max_code_points: 500,
                        single_line: true,
                    }),
                ),
                "TEXT",
            ),
            (
                make_test_field(
                    "payload",
                    Setting::Binary(BinarySetting {
                        min_bytes: 0,
                        max_bytes: 64,
                    }),
                ),
                "BLOB",
            ),
            (
                make_test_field(
                    "seats",
                    Setting::Integer(IntegerSetting {
                        min: 0,
                        max: 500,
                        unit: None,
                    }),
                ),
                "INTEGER",
            ),
            (
                make_test_field(
                    "score",
                    Setting::Real(RealSetting {
                        bounds: RealBounds::Float64 {
                            min: 0.0,
                            max: 10.0,
                        },
                        unit: None,
                    }),
                ),
                "REAL",
            ),
        ];
        for (field, expected) in cases {
            let feature = dialect.features().matched(&field);
            assert_eq!(
                feature.map(|f| f.type_name.as_str()),
                Some(expected),
                "field {}",
                field.name
            );
        }
    }

    #[test]
    fn catalog_rejects_what_sqlite_lacks() {
        let dialect = SqliteDialect::new();
        // no native boolean
        let flag = make_test_field("confirmed", Setting::Boolean);
        assert!(dialect.features().matched(&flag).is_none());
        // no native timestamp
        let when = make_test_field(
            "arrived",
            Setting::Timestamp(TimestampSetting {
                min: Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap(),
                max: Utc.with_ymd_and_hms(2100, 1, 1, 0, 0, 0).unwrap(),
                scale: Duration::from_secs(1),
                with_time_zone_offset: false,
            }),
        );
        assert!(dialect.features().matched(&when).is_none());
        // integers wider than 64 bits overflow the INTEGER class
        let wide = make_test_field(
            "big",
            Setting::Integer(IntegerSetting {
                min: 0,
                max: i128::from(i64::MAX) + 1,
                unit: None,
            }),
        );
        assert!(dialect.features().matched(&wide).is_none());
        // 32-bit floats widen into REAL
        let f32_field = make_test_field(
            "ratio",
            Setting::Real(RealSetting {
                bounds: RealBounds::float32(),
                unit: None,
            }),
        );
        assert!(dialect.features().matched(&f32_field).is_some());
    }

    #[test]
    fn reserved_words_get_escaped() {
        let dialect = SqliteDialect::new();
        assert_eq!(dialect.external_name("order"), "order_");
        assert_eq!(dialect.external_name("Transaction"), "Transaction_");
        assert_eq!(dialect.external_name("title"), "title");
        assert_eq!(dialect.internal_name("order_"), "order");
        assert_eq!(dialect.internal_name("title"), "title");
    }

    #[test]
    fn options_and_placeholders() {
        let dialect = SqliteDialect::new();
        assert_eq!(dialect.table_options(true), ["STRICT"]);
        assert_eq!(dialect.table_options(false), ["STRICT", "WITHOUT ROWID"]);
        assert_eq!(dialect.param_placeholder(1), "?");
        assert_eq!(dialect.param_placeholder(9), "?");
        assert_eq!(dialect.name(), "sqlite");
    }
}
