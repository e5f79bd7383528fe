//! Build-time boolean variants (spec.md §3, §4.4).
//!
//! A [`Variant`] is a named on/off option (`+debug` / `~debug`). A
//! [`VariantMap`] holds at most one [`Variant`] per name and implements the
//! map-level `satisfies`/merge algebra the spec-level `constrain` builds on.

use crate::error::{SpecError, UnsatisfiableError};
use std::collections::BTreeMap;
use std::fmt;

/// A single named boolean build option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Variant {
    pub enabled: bool,
}

impl Variant {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

/// Named variants for one spec node, keyed by name.
///
/// Kept as a `BTreeMap` so iteration — and therefore printing — is always
/// in ascending name order (spec.md §5 "Ordering guarantees").
///
/// Values are `bool` today; the type is still structured as a map of small
/// value structs (not a `HashMap<String, bool>` directly) so that widening
/// `Variant` to carry string/enum values later (spec.md §9) doesn't change
/// the map's own API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct VariantMap {
    entries: BTreeMap<String, Variant>,
}

impl VariantMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<Variant> {
        self.entries.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Variant)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert a variant, failing if the name is already present
    /// (spec.md §4.2 "duplicates ... are hard errors").
    pub fn insert_new(&mut self, name: String, enabled: bool) -> Result<(), SpecError> {
        if self.entries.contains_key(&name) {
            return Err(SpecError::other(format!(
                "cannot specify variant '{name}' twice"
            )));
        }
        self.entries.insert(name, Variant::new(enabled));
        Ok(())
    }

    /// `self.satisfies(other)`: for every name shared by both maps,
    /// `enabled` must match. Names present on only one side impose no
    /// constraint (spec.md §4.4).
    pub fn satisfies(&self, other: &VariantMap) -> bool {
        other
            .entries
            .iter()
            .all(|(name, v)| self.entries.get(name).is_none_or_eq(v))
    }

    /// Merge `other`'s entries into `self`, failing if a shared name has
    /// conflicting `enabled` flags. Used by `Spec::constrain` (spec.md
    /// §4.5 step 3 checks conflicts before step 6 applies the merge).
    pub fn check_merge(&self, other: &VariantMap) -> Result<(), UnsatisfiableError> {
        for (name, ov) in &other.entries {
            if let Some(sv) = self.entries.get(name) {
                if sv.enabled != ov.enabled {
                    return Err(UnsatisfiableError::Variant {
                        name: name.clone(),
                        provided: bool_label(sv.enabled),
                        required: bool_label(ov.enabled),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn merge(&mut self, other: &VariantMap) {
        for (name, v) in &other.entries {
            self.entries.insert(name.clone(), *v);
        }
    }
}

fn bool_label(enabled: bool) -> &'static str {
    if enabled {
        "enabled"
    } else {
        "disabled"
    }
}

trait OptEq {
    fn is_none_or_eq(&self, other: &Variant) -> bool;
}

impl OptEq for Option<&Variant> {
    fn is_none_or_eq(&self, other: &Variant) -> bool {
        match self {
            None => true,
            Some(v) => v.enabled == other.enabled,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", if self.enabled { "+" } else { "~" })
    }
}

impl fmt::Display for VariantMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // entries is a BTreeMap, already name-sorted (spec.md §4.8).
        for (name, variant) in &self.entries {
            write!(f, "{variant}{name}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_new_rejects_duplicate() {
        let mut vm = VariantMap::new();
        vm.insert_new("debug".into(), true).unwrap();
        assert!(vm.insert_new("debug".into(), false).is_err());
    }

    #[test]
    fn satisfies_ignores_unshared_names() {
        let mut a = VariantMap::new();
        a.insert_new("debug".into(), true).unwrap();
        let b = VariantMap::new();
        assert!(a.satisfies(&b));
        assert!(b.satisfies(&a)); // b has no entries, so nothing to violate
    }

    #[test]
    fn satisfies_conflict() {
        let mut a = VariantMap::new();
        a.insert_new("debug".into(), true).unwrap();
        let mut b = VariantMap::new();
        b.insert_new("debug".into(), false).unwrap();
        assert!(!a.satisfies(&b));
    }

    #[test]
    fn check_merge_conflict_vs_clean() {
        let mut a = VariantMap::new();
        a.insert_new("debug".into(), true).unwrap();
        let mut clean = VariantMap::new();
        clean.insert_new("shared".into(), true).unwrap();
        assert!(a.check_merge(&clean).is_ok());

        let mut conflicting = VariantMap::new();
        conflicting.insert_new("debug".into(), false).unwrap();
        assert!(a.check_merge(&conflicting).is_err());
    }

    #[test]
    fn display_uses_plus_and_tilde_sorted() {
        let mut vm = VariantMap::new();
        vm.insert_new("zlib".into(), true).unwrap();
        vm.insert_new("debug".into(), false).unwrap();
        assert_eq!(vm.to_string(), "~debug+zlib");
    }
}
