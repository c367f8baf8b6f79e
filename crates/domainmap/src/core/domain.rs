//! Domains and objects: the abstract counterparts of databases and tables.

use crate::core::field::Field;
use crate::core::names::{CodeName, NameRegistry};
use crate::error::{MapError, Result, ThingKind};

/// A named group of fields whose values are jointly unique per object
/// instance. Candidate for the physical primary key.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub fields: Vec<CodeName>,
    pub ranges: Vec<Range>,
}

impl Identity {
    /// Identity over plain fields.
    pub fn over<I, S>(fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields = fields
            .into_iter()
            .map(CodeName::new)
            .collect::<Result<Vec<_>>>()?;
        Ok(Identity {
            fields,
            ranges: Vec::new(),
        })
    }

    /// Add a range constraint scoped to this identity.
    pub fn with_range(mut self, range: Range) -> Self {
        self.ranges.push(range);
        self
    }
}

/// Two fields of the same comparable type forming a start/end pair.
///
/// `include_end` false means `start < end` (the range can not be empty),
/// true means `start <= end`.
#[derive(Debug, Clone, PartialEq)]
pub struct Range {
    pub start: CodeName,
    pub end: CodeName,
    pub include_end: bool,
}

impl Range {
    pub fn new(start: impl Into<String>, end: impl Into<String>, include_end: bool) -> Result<Self> {
        Ok(Range {
            start: CodeName::new(start)?,
            end: CodeName::new(end)?,
            include_end,
        })
    }
}

/// An abstract object: named fields in declaration order plus identity and
/// range declarations. Maps to one main table and any number of helper
/// tables.
#[derive(Debug, Clone)]
pub struct Object {
    name: CodeName,
    fields: NameRegistry<Field>,
    identities: Vec<Identity>,
    ranges: Vec<Range>,
}

impl Object {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        Ok(Object {
            name: CodeName::new(name)?,
            fields: NameRegistry::new(),
            identities: Vec::new(),
            ranges: Vec::new(),
        })
    }

    /// Add a field; fails on any naming conflict with existing fields.
    pub fn with_field(mut self, field: Field) -> Result<Self> {
        self.fields.add(field.name.clone(), field)?;
        Ok(self)
    }

    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identities.push(identity);
        self
    }

    /// Declare a range outside of any identity.
    pub fn with_range(mut self, range: Range) -> Self {
        self.ranges.push(range);
        self
    }

    pub fn name(&self) -> &CodeName {
        &self.name
    }

    pub fn fields(&self) -> &NameRegistry<Field> {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    pub fn identities(&self) -> &[Identity] {
        &self.identities
    }

    pub fn ranges(&self) -> &[Range] {
        &self.ranges
    }
}

/// A collection of objects, equivalent to one database. Most applications
/// need exactly one.
#[derive(Debug, Clone)]
pub struct Domain {
    name: CodeName,
    objects: NameRegistry<Object>,
}

impl Domain {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        Ok(Domain {
            name: CodeName::new(name)?,
            objects: NameRegistry::new(),
        })
    }

    /// Add an object; an exact duplicate name is a [`MapError::CodeNameExists`],
    /// other naming conflicts surface as registry errors.
    pub fn with_object(mut self, object: Object) -> Result<Self> {
        if self.objects.contains(object.name.as_str()) {
            return Err(MapError::code_name_exists(
                object.name.as_str(),
                ThingKind::Object,
            ));
        }
        self.objects.add(object.name.clone(), object)?;
        Ok(self)
    }

    pub fn name(&self) -> &CodeName {
        &self.name
    }

    pub fn objects(&self) -> &NameRegistry<Object> {
        &self.objects
    }

    pub fn object(&self, name: &str) -> Option<&Object> {
        self.objects.get(name)
    }
}
