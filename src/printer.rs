//! Canonical text rendering for a [`Spec`] (spec.md §4.8).
//!
//! `str_without_deps` renders one node's own attributes; the `Display` impl
//! wraps it with `^`-joined dependencies in name-sorted order (free, since
//! [`DependencyMap`](crate::spec::DependencyMap) iterates a `BTreeMap`);
//! `tree` renders the same information indented one level per depth.

use crate::spec::Spec;
use std::fmt;

/// Render `spec`'s own attributes, with no dependency suffix — the fragment
/// a full spec string is built out of (spec.md §4.8 `str_without_deps`).
pub fn str_without_deps(spec: &Spec) -> String {
    let mut out = spec.name.clone();

    if !spec.versions.is_open() {
        out.push_str(&format!("@{}", spec.versions));
    }

    let variants = spec.variants.to_string();
    out.push_str(&variants);

    if let Some(compiler) = &spec.compiler {
        out.push_str(&format!("%{compiler}"));
    }

    if let Some(arch) = &spec.architecture {
        out.push_str(&format!("={arch}"));
    }

    out
}

impl fmt::Display for Spec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", str_without_deps(self))?;
        for (_, dep) in self.dependencies.iter() {
            write!(f, " ^{dep}")?;
        }
        Ok(())
    }
}

/// Render `spec`'s full dependency tree, four spaces per depth level
/// (spec.md §4.8 `tree`).
pub fn tree(spec: &Spec) -> String {
    let mut out = String::new();
    tree_helper(spec, 0, &mut out);
    out
}

fn tree_helper(spec: &Spec, depth: usize, out: &mut String) {
    out.push_str(&"    ".repeat(depth));
    out.push_str(&str_without_deps(spec));
    out.push('\n');
    for (_, dep) in spec.dependencies.iter() {
        tree_helper(dep, depth + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MockCompilerRegistry;
    use crate::version::{Version, VersionRange, VersionTerm};

    #[test]
    fn bare_spec_prints_just_name() {
        let s = Spec::new("zlib");
        assert_eq!(s.to_string(), "zlib");
    }

    #[test]
    fn full_spec_prints_all_attributes_in_order() {
        let reg = MockCompilerRegistry::from_names(["intel"]);
        let mut s = Spec::new("mpileaks");
        s.versions = crate::version::VersionList::from_terms(vec![VersionTerm::Range(
            VersionRange::new(Some(Version::parse("1.2")), Some(Version::parse("1.4"))),
        )]);
        s.variants.insert_new("debug".into(), true).unwrap();
        s.compiler = Some(
            crate::compiler::Compiler::new(
                "intel".into(),
                crate::version::VersionList::open(),
                &reg,
            )
            .unwrap(),
        );
        s.architecture = Some("linux-x86_64".into());
        assert_eq!(s.to_string(), "mpileaks@1.2:1.4+debug%intel=linux-x86_64");
    }

    #[test]
    fn display_includes_sorted_dependencies() {
        let mut root = Spec::new("mpileaks");
        root.add_dependency(Spec::new("zlib")).unwrap();
        root.add_dependency(Spec::new("openmpi")).unwrap();
        assert_eq!(root.to_string(), "mpileaks ^openmpi ^zlib");
    }

    #[test]
    fn tree_indents_four_spaces_per_depth() {
        let mut root = Spec::new("mpileaks");
        let mut openmpi = Spec::new("openmpi");
        openmpi.add_dependency(Spec::new("zlib")).unwrap();
        root.add_dependency(openmpi).unwrap();

        assert_eq!(tree(&root), "mpileaks\n    openmpi\n        zlib\n");
    }
}
