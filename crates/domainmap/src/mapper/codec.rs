//! Value codecs: turn one field value into SQL column values and back.
//!
//! A codec owns the validation of a single field. Width is fixed per codec;
//! most fields occupy one column, zoned timestamps occupy two, lists occupy
//! none in the owning row. The batch writer concatenates codec outputs in
//! declared field order, so the sum of widths always matches the table's
//! data column count.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};

use crate::core::field::{RealBounds, Setting};
use crate::core::names::CodeName;
use crate::core::value::{SqlValue, Value};
use crate::error::{MapError, Result};

/// Encodes one field value into SQL column values, and back.
pub trait ValueCodec: fmt::Debug + Send + Sync {
    /// Number of columns one value occupies.
    fn width(&self) -> usize;

    /// Encode a non-null value into exactly `width()` column values.
    fn encode(&self, value: &Value) -> Result<Vec<SqlValue>>;

    /// Decode `width()` column values back into one field value.
    fn decode(&self, row: &[SqlValue]) -> Result<Value>;
}

/// Direct mapping between a scalar field and one column.
pub(crate) struct ScalarCodec {
    field: CodeName,
    setting: Setting,
}

impl ScalarCodec {
    pub(crate) fn new(field: CodeName, setting: Setting) -> Self {
        ScalarCodec { field, setting }
    }

    fn wrong_kind(&self, value: &Value) -> MapError {
        MapError::value_not_supported(
            self.field.as_str(),
            format!(
                "expected {}, got {}",
                self.setting.field_type(),
                value.kind()
            ),
        )
    }
}

impl fmt::Debug for ScalarCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScalarCodec")
            .field("field", &self.field)
            .field("type", &self.setting.field_type())
            .finish()
    }
}

impl ValueCodec for ScalarCodec {
    fn width(&self) -> usize {
        1
    }

    fn encode(&self, value: &Value) -> Result<Vec<SqlValue>> {
        let cell = match &self.setting {
            Setting::String(setting) => {
                let Value::Text(text) = value else {
                    return Err(self.wrong_kind(value));
                };
                let points = text.chars().count() as u64;
                if points < setting.min_code_points || points > setting.max_code_points {
                    return Err(MapError::value_not_supported(
                        self.field.as_str(),
                        format!(
                            "{points} code points is outside the range [{}, {}]",
                            setting.min_code_points, setting.max_code_points
                        ),
                    ));
                }
                if setting.single_line && text.contains(['\n', '\r']) {
                    return Err(MapError::value_not_supported(
                        self.field.as_str(),
                        "line breaks are not allowed",
                    ));
                }
                SqlValue::Text(text.clone())
            }
            Setting::Binary(setting) => {
                let Value::Bytes(bytes) = value else {
                    return Err(self.wrong_kind(value));
                };
                let size = bytes.len() as u64;
                if size < setting.min_bytes || size > setting.max_bytes {
                    return Err(MapError::value_not_supported(
                        self.field.as_str(),
                        format!(
                            "{size} bytes is outside the range [{}, {}]",
                            setting.min_bytes, setting.max_bytes
                        ),
                    ));
                }
                SqlValue::Blob(bytes.clone())
            }
            Setting::Boolean => {
                let Value::Bool(flag) = value else {
                    return Err(self.wrong_kind(value));
                };
                SqlValue::Bool(*flag)
            }
            Setting::Timestamp(setting) => {
                let Value::Timestamp(at) = value else {
                    return Err(self.wrong_kind(value));
                };
                if at.offset().local_minus_utc() != 0 {
                    return Err(MapError::value_not_supported(
                        self.field.as_str(),
                        format!("time zone offset {} can not be stored", at.offset()),
                    ));
                }
                let utc = at.with_timezone(&Utc);
                if utc < setting.min || utc > setting.max {
                    return Err(MapError::value_not_supported(
                        self.field.as_str(),
                        format!(
                            "{utc} is outside the range [{}, {}]",
                            setting.min, setting.max
                        ),
                    ));
                }
                SqlValue::Timestamp(utc)
            }
            Setting::Integer(setting) => {
                let Value::Integer(number) = value else {
                    return Err(self.wrong_kind(value));
                };
                if *number < setting.min || *number > setting.max {
                    return Err(MapError::value_not_supported(
                        self.field.as_str(),
                        format!(
                            "{number} is outside the range [{}, {}]",
                            setting.min, setting.max
                        ),
                    ));
                }
                let narrow = i64::try_from(*number).map_err(|_| {
                    MapError::system(format!(
                        "integer {number} does not fit the column for field \"{}\"",
                        self.field
                    ))
                })?;
                SqlValue::Integer(narrow)
            }
            Setting::Real(setting) => {
                let Value::Real(number) = value else {
                    return Err(self.wrong_kind(value));
                };
                match setting.bounds {
                    RealBounds::Float64 { min, max } => {
                        // written so NaN fails the comparison
                        if !(*number >= min && *number <= max) {
                            return Err(MapError::value_not_supported(
                                self.field.as_str(),
                                format!("{number} is outside the range [{min}, {max}]"),
                            ));
                        }
                    }
                    RealBounds::Float32 { min, max } => {
                        if !(*number >= min && *number <= max) {
                            return Err(MapError::value_not_supported(
                                self.field.as_str(),
                                format!("{number} is outside the range [{min}, {max}]"),
                            ));
                        }
                        if number.is_finite() && (*number as f32).is_infinite() {
                            return Err(MapError::value_not_supported(
                                self.field.as_str(),
                                format!("{number} does not fit a 32-bit float"),
                            ));
                        }
                    }
                    RealBounds::Custom { .. } => {
                        return Err(MapError::system(format!(
                            "custom real bounds have no scalar encoding for field \"{}\"",
                            self.field
                        )));
                    }
                }
                SqlValue::Real(*number)
            }
            Setting::Reference(_) | Setting::List(_) | Setting::Combination(_) => {
                return Err(MapError::system(format!(
                    "no scalar encoding for {} field \"{}\"",
                    self.setting.field_type(),
                    self.field
                )));
            }
        };
        Ok(vec![cell])
    }

    fn decode(&self, row: &[SqlValue]) -> Result<Value> {
        let cell = single(&self.field, row)?;
        if cell.is_null() {
            return Ok(Value::Null);
        }
        match (&self.setting, cell) {
            (Setting::String(_), SqlValue::Text(text)) => Ok(Value::Text(text.clone())),
            (Setting::Binary(_), SqlValue::Blob(bytes)) => Ok(Value::Bytes(bytes.clone())),
            (Setting::Boolean, SqlValue::Bool(flag)) => Ok(Value::Bool(*flag)),
            (Setting::Timestamp(_), SqlValue::Timestamp(at)) => {
                Ok(Value::Timestamp(at.fixed_offset()))
            }
            (Setting::Integer(_), SqlValue::Integer(number)) => {
                Ok(Value::Integer(i128::from(*number)))
            }
            (Setting::Real(_), SqlValue::Real(number)) => Ok(Value::Real(*number)),
            (_, cell) => Err(MapError::system(format!(
                "stored value {cell:?} does not decode as {} for field \"{}\"",
                self.setting.field_type(),
                self.field
            ))),
        }
    }
}

/// Boolean stored in an integer column as 0 or 1.
#[derive(Debug)]
pub(crate) struct BoolAsIntCodec {
    field: CodeName,
    inner: Arc<dyn ValueCodec>,
}

impl BoolAsIntCodec {
    pub(crate) fn new(field: CodeName, inner: Arc<dyn ValueCodec>) -> Self {
        BoolAsIntCodec { field, inner }
    }
}

impl ValueCodec for BoolAsIntCodec {
    fn width(&self) -> usize {
        self.inner.width()
    }

    fn encode(&self, value: &Value) -> Result<Vec<SqlValue>> {
        match value {
            Value::Bool(flag) => self.inner.encode(&Value::Integer(i128::from(*flag))),
            other => Err(MapError::value_not_supported(
                self.field.as_str(),
                format!("expected boolean, got {}", other.kind()),
            )),
        }
    }

    fn decode(&self, row: &[SqlValue]) -> Result<Value> {
        match self.inner.decode(row)? {
            Value::Null => Ok(Value::Null),
            Value::Integer(0) => Ok(Value::Bool(false)),
            Value::Integer(1) => Ok(Value::Bool(true)),
            other => Err(MapError::system(format!(
                "stored value {other:?} does not decode as boolean for field \"{}\"",
                self.field
            ))),
        }
    }
}

/// Text layout for timestamps, chosen by the field's scale. All layouts are
/// fixed-width within years 0001 through 9999, so lexicographic order of the
/// stored text matches chronological order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TimestampLayout {
    Date,
    Seconds,
    Millis,
    Micros,
    Nanos,
}

impl TimestampLayout {
    pub(crate) fn for_scale(scale: Duration) -> Self {
        if scale >= Duration::from_secs(24 * 60 * 60) {
            TimestampLayout::Date
        } else if scale >= Duration::from_secs(1) {
            TimestampLayout::Seconds
        } else if scale >= Duration::from_millis(1) {
            TimestampLayout::Millis
        } else if scale >= Duration::from_micros(1) {
            TimestampLayout::Micros
        } else {
            TimestampLayout::Nanos
        }
    }

    fn pattern(self) -> &'static str {
        match self {
            TimestampLayout::Date => "%Y-%m-%d",
            TimestampLayout::Seconds => "%Y-%m-%dT%H:%M:%S",
            TimestampLayout::Millis => "%Y-%m-%dT%H:%M:%S%.3f",
            TimestampLayout::Micros => "%Y-%m-%dT%H:%M:%S%.6f",
            TimestampLayout::Nanos => "%Y-%m-%dT%H:%M:%S%.9f",
        }
    }

    /// Length in code points of a formatted value.
    pub(crate) fn text_width(self) -> u64 {
        match self {
            TimestampLayout::Date => 10,
            TimestampLayout::Seconds => 19,
            TimestampLayout::Millis => 23,
            TimestampLayout::Micros => 26,
            TimestampLayout::Nanos => 29,
        }
    }

    fn format(self, at: DateTime<Utc>) -> String {
        at.format(self.pattern()).to_string()
    }

    fn parse(self, text: &str) -> Option<DateTime<Utc>> {
        match self {
            TimestampLayout::Date => NaiveDate::parse_from_str(text, self.pattern())
                .ok()?
                .and_hms_opt(0, 0, 0)
                .map(|at| at.and_utc()),
            _ => NaiveDateTime::parse_from_str(text, self.pattern())
                .ok()
                .map(|at| at.and_utc()),
        }
    }
}

/// Timestamp stored as sortable ISO-8601 text. Values coarser than the
/// layout keep their extra precision out of the column; a day-scale field
/// stores only the date.
#[derive(Debug)]
pub(crate) struct TimestampTextCodec {
    field: CodeName,
    layout: TimestampLayout,
    min: DateTime<Utc>,
    max: DateTime<Utc>,
    inner: Arc<dyn ValueCodec>,
}

impl TimestampTextCodec {
    pub(crate) fn new(
        field: CodeName,
        layout: TimestampLayout,
        min: DateTime<Utc>,
        max: DateTime<Utc>,
        inner: Arc<dyn ValueCodec>,
    ) -> Self {
        TimestampTextCodec {
            field,
            layout,
            min,
            max,
            inner,
        }
    }
}

impl ValueCodec for TimestampTextCodec {
    fn width(&self) -> usize {
        self.inner.width()
    }

    fn encode(&self, value: &Value) -> Result<Vec<SqlValue>> {
        let Value::Timestamp(at) = value else {
            return Err(MapError::value_not_supported(
                self.field.as_str(),
                format!("expected timestamp, got {}", value.kind()),
            ));
        };
        if at.offset().local_minus_utc() != 0 {
            return Err(MapError::value_not_supported(
                self.field.as_str(),
                format!("time zone offset {} can not be stored", at.offset()),
            ));
        }
        let utc = at.with_timezone(&Utc);
        if utc < self.min || utc > self.max {
            return Err(MapError::value_not_supported(
                self.field.as_str(),
                format!("{utc} is outside the range [{}, {}]", self.min, self.max),
            ));
        }
        self.inner.encode(&Value::Text(self.layout.format(utc)))
    }

    fn decode(&self, row: &[SqlValue]) -> Result<Value> {
        match self.inner.decode(row)? {
            Value::Null => Ok(Value::Null),
            Value::Text(text) => {
                let at = self.layout.parse(&text).ok_or_else(|| {
                    MapError::system(format!(
                        "stored timestamp \"{text}\" does not parse for field \"{}\"",
                        self.field
                    ))
                })?;
                Ok(Value::Timestamp(at.fixed_offset()))
            }
            other => Err(MapError::system(format!(
                "stored value {other:?} does not decode as a timestamp for field \"{}\"",
                self.field
            ))),
        }
    }
}

/// Timestamp with its time zone offset kept: the instant goes through the
/// plain timestamp codec normalized to UTC, the offset in seconds east goes
/// into a trailing integer column.
#[derive(Debug)]
pub(crate) struct ZonedTimestampCodec {
    field: CodeName,
    utc: Arc<dyn ValueCodec>,
    offset: Arc<dyn ValueCodec>,
}

impl ZonedTimestampCodec {
    pub(crate) fn new(
        field: CodeName,
        utc: Arc<dyn ValueCodec>,
        offset: Arc<dyn ValueCodec>,
    ) -> Self {
        ZonedTimestampCodec { field, utc, offset }
    }
}

impl ValueCodec for ZonedTimestampCodec {
    fn width(&self) -> usize {
        self.utc.width() + self.offset.width()
    }

    fn encode(&self, value: &Value) -> Result<Vec<SqlValue>> {
        let Value::Timestamp(at) = value else {
            return Err(MapError::value_not_supported(
                self.field.as_str(),
                format!("expected timestamp, got {}", value.kind()),
            ));
        };
        let normalized = Value::Timestamp(at.with_timezone(&Utc).fixed_offset());
        let mut row = self.utc.encode(&normalized)?;
        let seconds = i128::from(at.offset().local_minus_utc());
        row.extend(self.offset.encode(&Value::Integer(seconds))?);
        Ok(row)
    }

    fn decode(&self, row: &[SqlValue]) -> Result<Value> {
        if row.len() != self.width() {
            return Err(MapError::system(format!(
                "can not decode field \"{}\" from {} columns, expected {}",
                self.field,
                row.len(),
                self.width()
            )));
        }
        let (instant, offset) = row.split_at(self.utc.width());
        match (self.utc.decode(instant)?, self.offset.decode(offset)?) {
            (Value::Null, Value::Null) => Ok(Value::Null),
            (Value::Timestamp(at), Value::Integer(seconds)) => {
                let zone = i32::try_from(seconds)
                    .ok()
                    .and_then(FixedOffset::east_opt)
                    .ok_or_else(|| {
                        MapError::system(format!(
                            "stored time zone offset {seconds} is invalid for field \"{}\"",
                            self.field
                        ))
                    })?;
                Ok(Value::Timestamp(at.with_timezone(&zone)))
            }
            (instant, offset) => Err(MapError::system(format!(
                "stored parts {instant:?} and {offset:?} do not decode as a zoned timestamp for field \"{}\"",
                self.field
            ))),
        }
    }
}

/// Codec for fields whose data lives outside the owning row, like lists.
#[derive(Debug)]
pub(crate) struct NoScalarCodec {
    field: CodeName,
}

impl NoScalarCodec {
    pub(crate) fn new(field: CodeName) -> Self {
        NoScalarCodec { field }
    }
}

impl ValueCodec for NoScalarCodec {
    fn width(&self) -> usize {
        0
    }

    fn encode(&self, _value: &Value) -> Result<Vec<SqlValue>> {
        Ok(Vec::new())
    }

    fn decode(&self, _row: &[SqlValue]) -> Result<Value> {
        Err(MapError::system(format!(
            "field \"{}\" stores no columns in its row",
            self.field
        )))
    }
}

fn single<'a>(field: &CodeName, row: &'a [SqlValue]) -> Result<&'a SqlValue> {
    match row {
        [cell] => Ok(cell),
        _ => Err(MapError::system(format!(
            "can not decode field \"{field}\" from {} columns, expected 1",
            row.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::field::{IntegerSetting, StringSetting, TimestampSetting};
    use chrono::TimeZone;

    fn name(raw: &str) -> CodeName {
        CodeName::new(raw).unwrap()
    }

    fn string_codec(min: u64, max: u64, single_line: bool) -> ScalarCodec {
        ScalarCodec::new(
            name("note"),
            Setting::String(StringSetting {
                min_code_points: min,
                max_code_points: max,
                single_line,
            }),
        )
    }

    #[test]
    fn test_string_bounds_and_lines() {
        let codec = string_codec(2, 5, true);
        assert_eq!(
            codec.encode(&Value::Text("héllo".into())).unwrap(),
            vec![SqlValue::Text("héllo".into())]
        );
        // code points, not bytes
        assert!(codec.encode(&Value::Text("ééééé".into())).is_ok());
        assert!(codec.encode(&Value::Text("x".into())).is_err());
        assert!(codec.encode(&Value::Text("toolong".into())).is_err());
        let err = codec.encode(&Value::Text("a\nb".into())).unwrap_err();
        assert!(err.to_string().contains("line breaks are not allowed"));
        let err = codec.encode(&Value::Integer(3)).unwrap_err();
        assert!(err.to_string().contains("expected string, got integer"));
    }

    #[test]
    fn test_integer_bounds() {
        let codec = ScalarCodec::new(
            name("party_size"),
            Setting::Integer(IntegerSetting {
                min: 1,
                max: 99,
                unit: None,
            }),
        );
        assert_eq!(
            codec.encode(&Value::Integer(42)).unwrap(),
            vec![SqlValue::Integer(42)]
        );
        assert!(codec.encode(&Value::Integer(0)).is_err());
        assert!(codec.encode(&Value::Integer(100)).is_err());
        assert_eq!(
            codec.decode(&[SqlValue::Integer(7)]).unwrap(),
            Value::Integer(7)
        );
        assert_eq!(codec.decode(&[SqlValue::Null]).unwrap(), Value::Null);
    }

    #[test]
    fn test_real_rejects_nan() {
        let codec = ScalarCodec::new(
            name("score"),
            Setting::Real(crate::core::field::RealSetting {
                bounds: RealBounds::Float64 {
                    min: 0.0,
                    max: 10.0,
                },
                unit: None,
            }),
        );
        assert!(codec.encode(&Value::Real(5.5)).is_ok());
        assert!(codec.encode(&Value::Real(f64::NAN)).is_err());
        assert!(codec.encode(&Value::Real(10.5)).is_err());
    }

    #[test]
    fn test_bool_as_int_round_trip() {
        let inner = Arc::new(ScalarCodec::new(
            name("confirmed"),
            Setting::Integer(IntegerSetting {
                min: 0,
                max: 1,
                unit: None,
            }),
        ));
        let codec = BoolAsIntCodec::new(name("confirmed"), inner);
        assert_eq!(
            codec.encode(&Value::Bool(true)).unwrap(),
            vec![SqlValue::Integer(1)]
        );
        assert_eq!(
            codec.encode(&Value::Bool(false)).unwrap(),
            vec![SqlValue::Integer(0)]
        );
        assert_eq!(
            codec.decode(&[SqlValue::Integer(1)]).unwrap(),
            Value::Bool(true)
        );
        assert!(codec.decode(&[SqlValue::Integer(2)]).is_err());
        assert!(codec.encode(&Value::Text("yes".into())).is_err());
    }

    #[test]
    fn test_layout_for_scale() {
        let day = Duration::from_secs(24 * 60 * 60);
        assert_eq!(TimestampLayout::for_scale(day), TimestampLayout::Date);
        assert_eq!(
            TimestampLayout::for_scale(day * 7),
            TimestampLayout::Date
        );
        assert_eq!(
            TimestampLayout::for_scale(Duration::from_secs(60)),
            TimestampLayout::Seconds
        );
        assert_eq!(
            TimestampLayout::for_scale(Duration::from_millis(250)),
            TimestampLayout::Millis
        );
        assert_eq!(
            TimestampLayout::for_scale(Duration::from_micros(5)),
            TimestampLayout::Micros
        );
        assert_eq!(
            TimestampLayout::for_scale(Duration::from_nanos(1)),
            TimestampLayout::Nanos
        );
    }

    fn text_timestamp_codec(layout: TimestampLayout) -> TimestampTextCodec {
        let inner = Arc::new(string_codec(1, layout.text_width(), false));
        TimestampTextCodec::new(
            name("arrived"),
            layout,
            Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2100, 1, 1, 0, 0, 0).unwrap(),
            inner,
        )
    }

    #[test]
    fn test_timestamp_text_round_trip() {
        let codec = text_timestamp_codec(TimestampLayout::Seconds);
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 30, 5).unwrap();
        let row = codec.encode(&Value::Timestamp(at.fixed_offset())).unwrap();
        assert_eq!(row, vec![SqlValue::Text("2024-03-09T14:30:05".into())]);
        assert_eq!(
            codec.decode(&row).unwrap(),
            Value::Timestamp(at.fixed_offset())
        );
    }

    #[test]
    fn test_timestamp_text_rejects_offsets_and_range() {
        let codec = text_timestamp_codec(TimestampLayout::Seconds);
        let zone = FixedOffset::east_opt(3600).unwrap();
        let local = zone.with_ymd_and_hms(2024, 3, 9, 15, 30, 5).unwrap();
        let err = codec.encode(&Value::Timestamp(local)).unwrap_err();
        assert!(err.to_string().contains("can not be stored"));
        let early = Utc.with_ymd_and_hms(1999, 12, 31, 23, 59, 59).unwrap();
        assert!(codec
            .encode(&Value::Timestamp(early.fixed_offset()))
            .is_err());
    }

    #[test]
    fn test_date_layout_truncates() {
        let codec = text_timestamp_codec(TimestampLayout::Date);
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 30, 5).unwrap();
        let row = codec.encode(&Value::Timestamp(at.fixed_offset())).unwrap();
        assert_eq!(row, vec![SqlValue::Text("2024-03-09".into())]);
        let midnight = Utc.with_ymd_and_hms(2024, 3, 9, 0, 0, 0).unwrap();
        assert_eq!(
            codec.decode(&row).unwrap(),
            Value::Timestamp(midnight.fixed_offset())
        );
    }

    #[test]
    fn test_zoned_timestamp_keeps_offset() {
        let utc = Arc::new(text_timestamp_codec(TimestampLayout::Seconds));
        let offset = Arc::new(ScalarCodec::new(
            name("arrived_tz"),
            Setting::Integer(IntegerSetting {
                min: -86_400,
                max: 86_400,
                unit: None,
            }),
        ));
        let codec = ZonedTimestampCodec::new(name("arrived"), utc, offset);
        assert_eq!(codec.width(), 2);

        let zone = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let local = zone.with_ymd_and_hms(2024, 3, 9, 20, 0, 5).unwrap();
        let row = codec.encode(&Value::Timestamp(local)).unwrap();
        assert_eq!(
            row,
            vec![
                SqlValue::Text("2024-03-09T14:30:05".into()),
                SqlValue::Integer(19_800),
            ]
        );
        let decoded = codec.decode(&row).unwrap();
        assert_eq!(decoded, Value::Timestamp(local));
        if let Value::Timestamp(at) = decoded {
            assert_eq!(at.offset().local_minus_utc(), 19_800);
        }
    }

    #[test]
    fn test_zoned_timestamp_null_pair() {
        let utc = Arc::new(text_timestamp_codec(TimestampLayout::Seconds));
        let offset = Arc::new(ScalarCodec::new(
            name("arrived_tz"),
            Setting::Integer(IntegerSetting {
                min: -86_400,
                max: 86_400,
                unit: None,
            }),
        ));
        let codec = ZonedTimestampCodec::new(name("arrived"), utc, offset);
        assert_eq!(
            codec.decode(&[SqlValue::Null, SqlValue::Null]).unwrap(),
            Value::Null
        );
        assert!(codec.decode(&[SqlValue::Null]).is_err());
    }

    #[test]
    fn test_no_scalar_codec_is_empty() {
        let codec = NoScalarCodec::new(name("tags"));
        assert_eq!(codec.width(), 0);
        assert!(codec.encode(&Value::Seq(Vec::new())).unwrap().is_empty());
        assert!(codec.decode(&[]).is_err());
    }
}
