//! Code names and the insertion-ordered naming registry.
//!
//! Code names are long-term API names. The registry keeps them unambiguous
//! under a simplifying transform (case folding and underscore removal) so
//! that `full_name`, `fullname`, and `FullName` cannot coexist, and neither
//! can a name that is a strict prefix of another. A trailing `v2` .. `v99`
//! marks a version; versions of the same base name may coexist.

use std::borrow::Borrow;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{MapError, NameRule, Result};

/// A validated name for a domain, object, or field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CodeName(String);

impl CodeName {
    /// Validate `name` against the naming rules and wrap it.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        simplify(&name)?;
        Ok(CodeName(name))
    }

    /// Wrap without validation, for generated names and lookups.
    pub(crate) fn raw(name: impl Into<String>) -> Self {
        CodeName(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CodeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for CodeName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CodeName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Reduce a name for ambiguity checks.
///
/// Returns the lower-cased name with underscores removed and any trailing
/// version suffix stripped, plus the version number if one was present.
pub(crate) fn simplify(name: &str) -> Result<(String, Option<u8>)> {
    if name.is_empty() {
        return Err(MapError::name_not_allowed(name, NameRule::Empty));
    }
    if name.starts_with('_') || name.ends_with('_') || name.contains("__") {
        return Err(MapError::name_not_allowed(name, NameRule::Underscore));
    }
    let mut chars = name.chars();
    let first = chars.next().unwrap_or_default();
    if !first.is_ascii_alphabetic() {
        return Err(MapError::name_not_allowed(name, NameRule::Character));
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(MapError::name_not_allowed(name, NameRule::Character));
    }

    let simple: Vec<u8> = name
        .bytes()
        .filter(|b| *b != b'_')
        .map(|b| b.to_ascii_lowercase())
        .collect();

    // A version marker anywhere but the end makes the name ambiguous.
    let at_start = simple.len() >= 2 && simple[0] == b'v' && simple[1].is_ascii_digit();
    let in_middle = simple
        .windows(3)
        .any(|w| w[0] == b'v' && w[1].is_ascii_digit() && w[2].is_ascii_lowercase());
    if at_start || in_middle {
        return Err(MapError::name_not_allowed(name, NameRule::Version));
    }

    let mut digits_start = simple.len();
    while digits_start > 0 && simple[digits_start - 1].is_ascii_digit() {
        digits_start -= 1;
    }
    let version_at = (digits_start < simple.len() && digits_start > 0
        && simple[digits_start - 1] == b'v')
        .then(|| digits_start - 1);

    let Some(version_at) = version_at else {
        return Ok((String::from_utf8_lossy(&simple).into_owned(), None));
    };
    if simple[digits_start] == b'0' {
        return Err(MapError::name_not_allowed(name, NameRule::Version));
    }
    let digits = std::str::from_utf8(&simple[digits_start..]).unwrap_or_default();
    let version: u8 = match digits.parse() {
        Ok(n) if (2..=99).contains(&n) => n,
        _ => return Err(MapError::name_not_allowed(name, NameRule::VersionNumber)),
    };
    Ok((
        String::from_utf8_lossy(&simple[..version_at]).into_owned(),
        Some(version),
    ))
}

/// An insertion-ordered map from code name to value that rejects names
/// which are ambiguous with already registered ones.
#[derive(Debug, Clone)]
pub struct NameRegistry<V> {
    entries: IndexMap<CodeName, V>,
    // simplified base name -> registered names indexed by version, slot 0 unversioned
    simplified: IndexMap<String, Vec<Option<CodeName>>>,
}

impl<V> NameRegistry<V> {
    pub fn new() -> Self {
        NameRegistry {
            entries: IndexMap::new(),
            simplified: IndexMap::new(),
        }
    }

    /// Register `name`, failing on naming-rule, prefix, or version conflicts.
    pub fn add(&mut self, name: CodeName, value: V) -> Result<()> {
        let (simple, version) = simplify(name.as_str())?;
        let slot = version.map(usize::from).unwrap_or(0);
        if let Some(by_version) = self.simplified.get_mut(&simple) {
            if by_version.len() <= slot {
                by_version.resize(slot + 1, None);
            }
            match &by_version[slot] {
                Some(existing) => {
                    return Err(MapError::name_version_repeated(
                        name.as_str(),
                        existing.as_str(),
                        version.unwrap_or(0),
                    ));
                }
                // same base name, different version
                None => by_version[slot] = Some(name.clone()),
            }
        } else {
            for (other, by_version) in &self.simplified {
                if other.starts_with(simple.as_str()) {
                    if let Some(long) = first_registered(by_version) {
                        return Err(MapError::name_repeated(name.as_str(), long.as_str()));
                    }
                } else if simple.starts_with(other.as_str()) {
                    if let Some(short) = first_registered(by_version) {
                        return Err(MapError::name_repeated(short.as_str(), name.as_str()));
                    }
                }
            }
            let mut by_version = vec![None; slot + 1];
            by_version[slot] = Some(name.clone());
            self.simplified.insert(simple, by_version);
        }
        self.entries.insert(name, value);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&V> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Entries in registration order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, CodeName, V> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for NameRegistry<V> {
    fn default() -> Self {
        Self::new()
    }
}

fn first_registered(by_version: &[Option<CodeName>]) -> Option<&CodeName> {
    by_version.iter().flatten().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple_of(name: &str) -> (String, Option<u8>) {
        simplify(name).unwrap()
    }

    #[test]
    fn simplify_folds_case_and_underscores() {
        assert_eq!(simple_of("FullName"), ("fullname".into(), None));
        assert_eq!(simple_of("full_name"), ("fullname".into(), None));
        assert_eq!(simple_of("a1_b2"), ("a1b2".into(), None));
    }

    #[test]
    fn simplify_extracts_trailing_versions() {
        assert_eq!(simple_of("title_v2"), ("title".into(), Some(2)));
        assert_eq!(simple_of("titleV99"), ("title".into(), Some(99)));
        assert_eq!(simple_of("shelf23"), ("shelf23".into(), None));
    }

    #[test]
    fn simplify_rejects_bad_shapes() {
        let cases = [
            ("", NameRule::Empty),
            ("_lead", NameRule::Underscore),
            ("trail_", NameRule::Underscore),
            ("mid__dle", NameRule::Underscore),
            ("9lives", NameRule::Character),
            ("bad-char", NameRule::Character),
            ("über", NameRule::Character),
            ("v2", NameRule::Version),
            ("v2engine", NameRule::Version),
            ("api_v2_beta", NameRule::Version),
            ("title_v02", NameRule::Version),
            ("title_v1", NameRule::VersionNumber),
            ("title_v100", NameRule::VersionNumber),
        ];
        for (name, rule) in cases {
            match simplify(name) {
                Err(MapError::NameNotAllowed { rule: got, .. }) => {
                    assert_eq!(got, rule, "name {name:?}");
                }
                other => panic!("name {name:?} gave {other:?}"),
            }
        }
    }

    #[test]
    fn registry_keeps_insertion_order() {
        let mut reg = NameRegistry::new();
        for name in ["zulu", "echo", "mike"] {
            reg.add(CodeName::new(name).unwrap(), ()).unwrap();
        }
        let order: Vec<&str> = reg.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(order, ["zulu", "echo", "mike"]);
    }

    #[test]
    fn registry_rejects_ambiguous_names() {
        let mut reg = NameRegistry::new();
        reg.add(CodeName::new("full_name").unwrap(), 1).unwrap();

        let err = reg.add(CodeName::new("FullName").unwrap(), 2).unwrap_err();
        assert!(matches!(err, MapError::NameVersionRepeated { .. }), "{err}");

        // either direction of a prefix overlap is rejected
        let err = reg.add(CodeName::new("full").unwrap(), 3).unwrap_err();
        assert!(matches!(err, MapError::NameRepeated { .. }), "{err}");
        let err = reg
            .add(CodeName::new("full_name_suffix").unwrap(), 4)
            .unwrap_err();
        assert!(matches!(err, MapError::NameRepeated { .. }), "{err}");

        reg.add(CodeName::new("unrelated").unwrap(), 5).unwrap();
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn registry_allows_version_siblings() {
        let mut reg = NameRegistry::new();
        reg.add(CodeName::new("title").unwrap(), 0).unwrap();
        reg.add(CodeName::new("title_v2").unwrap(), 0).unwrap();
        reg.add(CodeName::new("title_v3").unwrap(), 0).unwrap();
        assert_eq!(reg.len(), 3);

        let err = reg.add(CodeName::new("TitleV2").unwrap(), 0).unwrap_err();
        match err {
            MapError::NameVersionRepeated {
                existing, version, ..
            } => {
                assert_eq!(existing, "title_v2");
                assert_eq!(version, 2);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn registry_lookup_by_str() {
        let mut reg = NameRegistry::new();
        reg.add(CodeName::new("visitor").unwrap(), 7).unwrap();
        assert_eq!(reg.get("visitor"), Some(&7));
        assert_eq!(reg.get("missing"), None);
        assert!(reg.contains("visitor"));
    }
}
