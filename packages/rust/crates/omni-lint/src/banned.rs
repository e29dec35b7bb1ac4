//! Primitive and common type names that must not be used as identifiers.

use std::collections::HashSet;

use once_cell::sync::Lazy;

/// Names flagged by the rule, lower-case.
pub const TYPE_NAMES: &[&str] = &[
    "bool", "boolean", "byte", "sbyte", "ubyte", "char", "wchar", "int8", "uint8", "short",
    "ushort", "int", "uint", "integer", "uinteger", "long", "ulong", "unsigned", "signed",
    "float", "float32", "float64", "int16", "int32", "int64", "uint16", "uint32", "uint64",
    "intptr", "uintptr", "ptr", "uptr", "pointer", "upointer", "single", "double", "decimal",
    "guid", "object", "obj", "string",
];

static STANDARD: Lazy<BannedNameSet> = Lazy::new(|| BannedNameSet::from_names(TYPE_NAMES.iter().copied()));

/// Immutable, case-insensitive set of banned identifiers.
#[derive(Debug, Clone, Default)]
pub struct BannedNameSet {
    names: HashSet<String>,
}

impl BannedNameSet {
    /// The process-wide set built from [`TYPE_NAMES`].
    #[must_use]
    pub fn standard() -> &'static Self {
        &STANDARD
    }

    /// Build a set from arbitrary names; casing is ignored.
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            names: names.into_iter().map(str::to_lowercase).collect(),
        }
    }

    /// Exact, case-insensitive membership.
    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        if token.bytes().any(|b| b.is_ascii_uppercase()) {
            self.names.contains(&token.to_lowercase())
        } else {
            self.names.contains(token)
        }
    }

    /// Number of names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_set() {
        let set = BannedNameSet::standard();
        assert_eq!(set.len(), 41);
        assert!(set.contains("int"));
        assert!(set.contains("Int32"));
        assert!(set.contains("STRING"));
        assert!(!set.contains("intValue"));
        assert!(!set.contains("in"));
    }
}
