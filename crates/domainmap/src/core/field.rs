//! Abstract field model: field types, value-range settings, and the
//! covers relation.
//!
//! A [`Setting`] describes the full range of values a field can hold.
//! [`Setting::covers`] decides whether one range can represent every value
//! of another; it is what the column catalogs use to match fields to native
//! column types, and what the fallback mapper uses to bound its synthetic
//! fields.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::names::CodeName;
use crate::error::Result;

/// The closed set of abstract field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    String,
    Binary,
    Boolean,
    Timestamp,
    Integer,
    Real,
    Reference,
    List,
    Combination,
}

impl FieldType {
    pub const COUNT: usize = 9;

    pub(crate) fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Binary => "binary",
            FieldType::Boolean => "boolean",
            FieldType::Timestamp => "timestamp",
            FieldType::Integer => "integer",
            FieldType::Real => "real",
            FieldType::Reference => "reference",
            FieldType::List => "list",
            FieldType::Combination => "combination",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A measurement unit attached to a numeric field.
///
/// Units take part in coverage: a range without a unit covers any unit,
/// a range with a unit covers only the identical unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub name: CodeName,
    pub symbol: String,
}

impl Unit {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>) -> Result<Self> {
        Ok(Unit {
            name: CodeName::new(name)?,
            symbol: symbol.into(),
        })
    }
}

fn unit_covers(unit: &Option<Unit>, other: &Option<Unit>) -> bool {
    match (unit, other) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(a), Some(b)) => a == b,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringSetting {
    /// Minimum length in unicode code points.
    pub min_code_points: u64,
    /// Maximum length in unicode code points.
    pub max_code_points: u64,
    /// If set, values can not contain line breaks.
    pub single_line: bool,
}

impl StringSetting {
    pub fn covers(&self, other: &StringSetting) -> bool {
        self.min_code_points <= other.min_code_points
            && self.max_code_points >= other.max_code_points
            && !(self.single_line && !other.single_line)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinarySetting {
    pub min_bytes: u64,
    pub max_bytes: u64,
}

impl BinarySetting {
    pub fn covers(&self, other: &BinarySetting) -> bool {
        self.min_bytes <= other.min_bytes && self.max_bytes >= other.max_bytes
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampSetting {
    pub min: DateTime<Utc>,
    pub max: DateTime<Utc>,
    /// Resolution of stored values: 24h and up keeps dates only, one second
    /// and up whole seconds, anything below fractional seconds.
    pub scale: Duration,
    /// Values carry their original UTC offset instead of being normalized.
    pub with_time_zone_offset: bool,
}

impl TimestampSetting {
    pub fn covers(&self, other: &TimestampSetting) -> bool {
        self.min <= other.min
            && self.max >= other.max
            && self.scale <= other.scale
            && !(!self.with_time_zone_offset && other.with_time_zone_offset)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegerSetting {
    pub min: i128,
    pub max: i128,
    pub unit: Option<Unit>,
}

impl IntegerSetting {
    pub fn covers(&self, other: &IntegerSetting) -> bool {
        self.min <= other.min && self.max >= other.max && unit_covers(&self.unit, &other.unit)
    }
}

/// The representable range of a real-number field: either a hardware float
/// type with optional value bounds, or a custom mantissa/exponent form for
/// exact decimal (or other base) arithmetic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RealBounds {
    Custom {
        base: u8,
        min_mantissa: i128,
        max_mantissa: i128,
        min_exponent: i64,
        max_exponent: i64,
    },
    Float32 {
        min: f64,
        max: f64,
    },
    Float64 {
        min: f64,
        max: f64,
    },
}

impl RealBounds {
    /// Full-range 32-bit float.
    pub fn float32() -> Self {
        RealBounds::Float32 {
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
        }
    }

    /// Full-range 64-bit float.
    pub fn float64() -> Self {
        RealBounds::Float64 {
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
        }
    }

    fn valid(&self) -> bool {
        match self {
            RealBounds::Custom { base, .. } => *base >= 2,
            RealBounds::Float32 { .. } | RealBounds::Float64 { .. } => true,
        }
    }

    fn covers(&self, other: &RealBounds) -> bool {
        if !self.valid() || !other.valid() {
            return false;
        }
        match (self, other) {
            (
                RealBounds::Custom {
                    base,
                    min_mantissa,
                    max_mantissa,
                    min_exponent,
                    max_exponent,
                },
                RealBounds::Custom {
                    base: base2,
                    min_mantissa: min_mantissa2,
                    max_mantissa: max_mantissa2,
                    min_exponent: min_exponent2,
                    max_exponent: max_exponent2,
                },
            ) => {
                base == base2
                    && min_mantissa <= min_mantissa2
                    && max_mantissa >= max_mantissa2
                    && min_exponent <= min_exponent2
                    && max_exponent >= max_exponent2
            }
            // a 64-bit float can hold any 32-bit float, never the other way
            (RealBounds::Float64 { min, max }, RealBounds::Float64 { min: min2, max: max2 })
            | (RealBounds::Float64 { min, max }, RealBounds::Float32 { min: min2, max: max2 })
            | (RealBounds::Float32 { min, max }, RealBounds::Float32 { min: min2, max: max2 }) => {
                min <= min2 && max >= max2
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealSetting {
    pub bounds: RealBounds,
    pub unit: Option<Unit>,
}

impl RealSetting {
    pub fn covers(&self, other: &RealSetting) -> bool {
        unit_covers(&self.unit, &other.unit) && self.bounds.covers(&other.bounds)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceSetting {
    /// Name of the referenced object; `None` in a catalog coverage means
    /// "any target object".
    pub target: Option<CodeName>,
}

impl ReferenceSetting {
    pub fn covers(&self, other: &ReferenceSetting) -> bool {
        match &self.target {
            None => true,
            Some(target) => other.target.as_ref() == Some(target),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListSetting {
    pub min_length: u64,
    pub max_length: u64,
    /// Item order is meaningful and must be preserved.
    pub ordered: bool,
    /// Repeated items are ignored.
    pub unique: bool,
    pub item: Box<Setting>,
}

impl ListSetting {
    pub fn covers(&self, other: &ListSetting) -> bool {
        self.min_length <= other.min_length
            && self.max_length >= other.max_length
            && !(!self.ordered && other.ordered)
            && !(self.unique && !other.unique)
            && self.item.covers(&other.item)
    }
}

/// Nested field group, reserved for future use. No mapping rule exists and
/// coverage is always false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinationSetting {
    pub fields: Vec<Field>,
}

/// The value-range description of a field, one variant per [`FieldType`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Setting {
    String(StringSetting),
    Binary(BinarySetting),
    Boolean,
    Timestamp(TimestampSetting),
    Integer(IntegerSetting),
    Real(RealSetting),
    Reference(ReferenceSetting),
    List(ListSetting),
    Combination(CombinationSetting),
}

impl Setting {
    pub fn field_type(&self) -> FieldType {
        match self {
            Setting::String(_) => FieldType::String,
            Setting::Binary(_) => FieldType::Binary,
            Setting::Boolean => FieldType::Boolean,
            Setting::Timestamp(_) => FieldType::Timestamp,
            Setting::Integer(_) => FieldType::Integer,
            Setting::Real(_) => FieldType::Real,
            Setting::Reference(_) => FieldType::Reference,
            Setting::List(_) => FieldType::List,
            Setting::Combination(_) => FieldType::Combination,
        }
    }

    /// True iff every value describable by `other` is describable by `self`.
    ///
    /// Reflexive for every mappable setting and transitive, but not total.
    /// Different field types never cover each other; the float64-over-float32
    /// widening lives inside the Real variant.
    pub fn covers(&self, other: &Setting) -> bool {
        match (self, other) {
            (Setting::String(a), Setting::String(b)) => a.covers(b),
            (Setting::Binary(a), Setting::Binary(b)) => a.covers(b),
            (Setting::Boolean, Setting::Boolean) => true,
            (Setting::Timestamp(a), Setting::Timestamp(b)) => a.covers(b),
            (Setting::Integer(a), Setting::Integer(b)) => a.covers(b),
            (Setting::Real(a), Setting::Real(b)) => a.covers(b),
            (Setting::Reference(a), Setting::Reference(b)) => a.covers(b),
            (Setting::List(a), Setting::List(b)) => a.covers(b),
            (Setting::Combination(_), Setting::Combination(_)) => false,
            _ => false,
        }
    }
}

/// A named field with its range setting and storage flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: CodeName,
    pub setting: Setting,
    /// Different values per locale are possible. Unsupported by the mapper;
    /// internationalized storage happens at a higher layer.
    pub is_i18n: bool,
    /// Null is distinct from the zero value.
    pub nullable: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, setting: Setting) -> Result<Self> {
        Ok(Field {
            name: CodeName::new(name)?,
            setting,
            is_i18n: false,
            nullable: false,
        })
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn with_i18n(mut self, is_i18n: bool) -> Self {
        self.is_i18n = is_i18n;
        self
    }

    pub fn field_type(&self) -> FieldType {
        self.setting.field_type()
    }
}
