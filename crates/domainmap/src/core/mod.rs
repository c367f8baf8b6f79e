//! Core abstractions of the mapping engine.
//!
//! This module defines the dialect-independent model everything else
//! consumes:
//!
//! - [`names`]: validated code names and the ambiguity-checking registry
//! - [`field`]: field types, value-range settings, and the covers relation
//! - [`domain`]: objects, identities, ranges, and domains
//! - [`value`]: abstract input values and physical column values
//!
//! Field settings form a small algebra: a column catalog entry claims a
//! field when its declared coverage setting covers the field's setting, and
//! the fallback mapper builds synthetic fields whose settings the catalog is
//! known to cover. Everything downstream (tables, DDL, inserts) is derived
//! from this model and never mutates it.

pub mod domain;
pub mod field;
pub mod names;
pub mod value;

// Re-export commonly used types for convenience
pub use domain::{Domain, Identity, Object, Range};
pub use field::{
    BinarySetting, CombinationSetting, Field, FieldType, IntegerSetting, ListSetting, RealBounds,
    RealSetting, ReferenceSetting, Setting, StringSetting, TimestampSetting, Unit,
};
pub use names::{CodeName, NameRegistry};
pub use value::{SqlValue, Value};
