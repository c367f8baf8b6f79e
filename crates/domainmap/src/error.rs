//! Error types for the mapping library.

use std::fmt;

use thiserror::Error;

/// What a rejected code name belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThingKind {
    Domain,
    Object,
    Field,
}

impl fmt::Display for ThingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThingKind::Domain => write!(f, "domain"),
            ThingKind::Object => write!(f, "object"),
            ThingKind::Field => write!(f, "field"),
        }
    }
}

/// The naming rule a code name failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameRule {
    /// Name is empty.
    Empty,
    /// Name starts or ends with an underscore, or contains a double underscore.
    Underscore,
    /// Name contains a character outside `[_a-zA-Z0-9]`, or does not start with a letter.
    Character,
    /// Name contains a version-like sequence anywhere but the end.
    Version,
    /// Trailing version number is outside the supported range or has a leading zero.
    VersionNumber,
}

impl fmt::Display for NameRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameRule::Empty => write!(f, "name can not be empty"),
            NameRule::Underscore => write!(
                f,
                "name can not start or end with \"_\", or contain \"__\""
            ),
            NameRule::Character => write!(
                f,
                "name must start with a letter and only contain letters, numbers, and \"_\""
            ),
            NameRule::Version => write!(
                f,
                "a version-like sequence can only appear at the end of a name"
            ),
            NameRule::VersionNumber => write!(
                f,
                "a version number must be between 2 and 99 without leading zeros"
            ),
        }
    }
}

/// Main error type for schema mapping and data writing.
#[derive(Error, Debug)]
pub enum MapError {
    /// Code name failed a naming rule
    #[error("code name \"{name}\" is not allowed: {rule}")]
    NameNotAllowed { name: String, rule: NameRule },

    /// Code name is ambiguous with an already registered name
    #[error("code name \"{short}\" is a prefix of \"{long}\"")]
    NameRepeated { short: String, long: String },

    /// Code name simplifies to a registered name with the same version
    #[error("code name \"{name}\" already exists as \"{existing}\" with the same version suffix")]
    NameVersionRepeated {
        name: String,
        existing: String,
        version: u8,
    },

    /// Domain or object registered twice under the same name
    #[error("name \"{name}\" in \"{kind}s\" already exists")]
    CodeNameExists { name: String, kind: ThingKind },

    /// Insert addressed a domain that was never registered
    #[error("domain \"{name}\" is not found")]
    DomainNotFound { name: String },

    /// Insert addressed an object the domain does not define
    #[error("object \"{name}\" is not found")]
    ObjectNotFound { name: String },

    /// A referenced field does not exist on the object
    #[error("field \"{name}\" is not found")]
    FieldNotFound { name: String },

    /// The field as a whole has no mapping for the active dialect
    #[error("field \"{name}\" of {field_type} is not supported")]
    FieldNotSupported { field_type: String, name: String },

    /// One specific setting of the field has no mapping for the active dialect
    #[error(
        "setting \"{path}\" to \"{value}\" in field \"{name}\" of {field_type} is not supported"
    )]
    SettingNotSupported {
        field_type: String,
        name: String,
        path: String,
        value: String,
    },

    /// A non-nullable field was absent or null in the input
    #[error("field \"{field}\" requires a value")]
    ValueRequired { field: String },

    /// A value does not fit the field it was given for
    #[error("field \"{field}\" was given an unsupported value: {reason}")]
    ValueNotSupported { field: String, reason: String },

    /// Table definition produced no columns
    #[error("\"{table}\" has an empty field list")]
    FieldsNotDefined { table: String },

    /// Broken internal invariant, never caused by user input
    #[error("system error: {0}")]
    System(String),

    /// Write was cancelled through the cancellation channel
    #[error("operation cancelled")]
    Cancelled,

    /// SQLite driver error
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// PostgreSQL driver error
    #[cfg(feature = "postgres")]
    #[error("postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    /// Connection pool error
    #[cfg(feature = "postgres")]
    #[error("pool error: {0}")]
    Pool(String),

    /// An error with location context attached
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<MapError>,
    },
}

impl MapError {
    pub(crate) fn name_not_allowed(name: impl Into<String>, rule: NameRule) -> Self {
        MapError::NameNotAllowed {
            name: name.into(),
            rule,
        }
    }

    pub(crate) fn name_repeated(short: impl Into<String>, long: impl Into<String>) -> Self {
        MapError::NameRepeated {
            short: short.into(),
            long: long.into(),
        }
    }

    pub(crate) fn name_version_repeated(
        name: impl Into<String>,
        existing: impl Into<String>,
        version: u8,
    ) -> Self {
        MapError::NameVersionRepeated {
            name: name.into(),
            existing: existing.into(),
            version,
        }
    }

    pub fn code_name_exists(name: impl Into<String>, kind: ThingKind) -> Self {
        MapError::CodeNameExists {
            name: name.into(),
            kind,
        }
    }

    pub fn domain_not_found(name: impl Into<String>) -> Self {
        MapError::DomainNotFound { name: name.into() }
    }

    pub fn object_not_found(name: impl Into<String>) -> Self {
        MapError::ObjectNotFound { name: name.into() }
    }

    pub fn field_not_found(name: impl Into<String>) -> Self {
        MapError::FieldNotFound { name: name.into() }
    }

    pub fn field_not_supported(field_type: impl Into<String>, name: impl Into<String>) -> Self {
        MapError::FieldNotSupported {
            field_type: field_type.into(),
            name: name.into(),
        }
    }

    pub fn setting_not_supported(
        field_type: impl Into<String>,
        name: impl Into<String>,
        path: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        MapError::SettingNotSupported {
            field_type: field_type.into(),
            name: name.into(),
            path: path.into(),
            value: value.into(),
        }
    }

    pub fn value_required(field: impl Into<String>) -> Self {
        MapError::ValueRequired {
            field: field.into(),
        }
    }

    pub fn value_not_supported(field: impl Into<String>, reason: impl Into<String>) -> Self {
        MapError::ValueNotSupported {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn fields_not_defined(table: impl Into<String>) -> Self {
        MapError::FieldsNotDefined {
            table: table.into(),
        }
    }

    pub fn system(message: impl Into<String>) -> Self {
        MapError::System(message.into())
    }

    /// Wrap the error with context about where it occurred.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        MapError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, unwrapping any context layers.
    pub fn root(&self) -> &MapError {
        match self {
            MapError::Context { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result type alias for mapping operations.
pub type Result<T> = std::result::Result<T, MapError>;
