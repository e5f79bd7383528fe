//! The spec DAG node and its dependency map (spec.md §3, §4.5).

use crate::compiler::Compiler;
use crate::error::{DuplicateError, SpecError, UnsatisfiableError};
use crate::variant::VariantMap;
use crate::version::VersionList;
use std::collections::BTreeMap;

/// Mapping from package name to child [`Spec`]. The key always equals the
/// child's own `name` (spec.md §3 invariant).
///
/// Backed by a `BTreeMap` so iteration is always ascending by name — the
/// printer and the normalizer both rely on this instead of sorting
/// themselves (spec.md §5 "Ordering guarantees").
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyMap {
    children: BTreeMap<String, Spec>,
}

impl DependencyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.children.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Spec> {
        self.children.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Spec> {
        self.children.get_mut(name)
    }

    pub fn insert(&mut self, spec: Spec) {
        self.children.insert(spec.name.clone(), spec);
    }

    pub fn remove(&mut self, name: &str) -> Option<Spec> {
        self.children.remove(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(|s| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Spec)> {
        self.children.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Spec> {
        self.children.values_mut()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn concrete(&self) -> bool {
        self.children.values().all(Spec::concrete)
    }

    /// `self.satisfies(other)`: for every name in both maps, the receiver's
    /// child satisfies the other's (spec.md §4.5).
    pub fn satisfies(&self, other: &DependencyMap) -> bool {
        self.children.iter().all(|(name, spec)| {
            other
                .children
                .get(name)
                .is_none_or(|other_spec| spec.satisfies(other_spec))
        })
    }
}

trait NoneOr<T> {
    fn is_none_or(self, f: impl FnOnce(T) -> bool) -> bool;
}

impl<T> NoneOr<T> for Option<T> {
    fn is_none_or(self, f: impl FnOnce(T) -> bool) -> bool {
        match self {
            None => true,
            Some(v) => f(v),
        }
    }
}

/// A node in the spec DAG: a package name together with constraints on its
/// version, variants, compiler, architecture, and dependencies (spec.md §3).
///
/// `parent` records only the parent's package name, not a true back-edge —
/// see SPEC_FULL.md §3 for why that's enough: spec.md is explicit that the
/// parent link is "never used for ownership or traversal correctness".
#[derive(Debug, Clone, PartialEq)]
pub struct Spec {
    pub name: String,
    pub versions: VersionList,
    pub variants: VariantMap,
    pub architecture: Option<String>,
    pub compiler: Option<Compiler>,
    pub dependencies: DependencyMap,
    pub parent: Option<String>,
}

impl Spec {
    /// A bare spec with the open version range and no other constraints —
    /// what the parser produces before any options are applied.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            versions: VersionList::open(),
            variants: VariantMap::new(),
            architecture: None,
            compiler: None,
            dependencies: DependencyMap::new(),
            parent: None,
        }
    }

    /// Add `dep` as a dependency, failing if one with the same name is
    /// already present (spec.md §7 `DuplicateDependencyError`).
    pub fn add_dependency(&mut self, mut dep: Spec) -> Result<(), SpecError> {
        if self.dependencies.contains(&dep.name) {
            return Err(SpecError::Duplicate(DuplicateError::Dependency {
                package: self.name.clone(),
                dependency: dep.name.clone(),
            }));
        }
        dep.parent = Some(self.name.clone());
        self.dependencies.insert(dep);
        Ok(())
    }

    /// spec.md §3 invariant 4: concrete iff the version is pinned,
    /// architecture and compiler are both present and the compiler is
    /// itself concrete, and every dependency is concrete. Variants are not
    /// part of concreteness today (spec.md §9).
    pub fn concrete(&self) -> bool {
        self.versions.concrete()
            && self.architecture.is_some()
            && self.compiler.as_ref().is_some_and(Compiler::concrete)
            && self.dependencies.concrete()
    }

    /// `self.satisfies(other)`: same package name, and for each of
    /// {versions, variants, compiler, architecture} either side may be
    /// absent (no constraint) or the attribute-level `satisfies` holds,
    /// plus dependency-map satisfaction (spec.md §4.5).
    pub fn satisfies(&self, other: &Spec) -> bool {
        if self.name != other.name {
            return false;
        }

        let versions_ok = self.versions.is_open() || other.versions.is_open() || {
            // An unconstrained side imposes nothing; otherwise containment
            // is overlap in the direction that matters: self must not claim
            // more than other allows. Mirrors the original "not s or not o
            // or s.satisfies(o)" rule applied to a VersionList.
            self.versions.overlaps(&other.versions)
        };

        let variants_ok = self.variants.satisfies(&other.variants);

        let compiler_ok = match (&self.compiler, &other.compiler) {
            (Some(s), Some(o)) => s.satisfies(o),
            _ => true,
        };

        let arch_ok = match (&self.architecture, &other.architecture) {
            (Some(s), Some(o)) => s == o,
            _ => true,
        };

        versions_ok
            && variants_ok
            && compiler_ok
            && arch_ok
            && self.dependencies.satisfies(&other.dependencies)
    }

    /// Tighten `self` by `other`'s constraints in place. Either every
    /// condition holds and the receiver is updated, or nothing is mutated
    /// (spec.md §4.5: "a partially applied constrain must not leave the
    /// receiver in a half-updated state").
    pub fn constrain(&mut self, other: &Spec) -> Result<(), SpecError> {
        // Phase 1: validate everything before mutating anything.
        if !self.versions.overlaps(&other.versions) {
            return Err(SpecError::Unsatisfiable(UnsatisfiableError::Version {
                provided: self.versions.to_string(),
                required: other.versions.to_string(),
            }));
        }

        self.variants
            .check_merge(&other.variants)
            .map_err(SpecError::from)?;

        if let (Some(sa), Some(oa)) = (&self.architecture, &other.architecture) {
            if sa != oa {
                return Err(SpecError::Unsatisfiable(UnsatisfiableError::Architecture {
                    provided: sa.clone(),
                    required: oa.clone(),
                }));
            }
        }

        if let (Some(sc), Some(oc)) = (&self.compiler, &other.compiler) {
            if !sc.satisfies(oc) {
                return Err(SpecError::Unsatisfiable(UnsatisfiableError::Compiler {
                    provided: sc.to_string(),
                    required: oc.to_string(),
                }));
            }
        }

        // Phase 2: everything validated, commit.
        if let Some(oc) = &other.compiler {
            match &mut self.compiler {
                Some(sc) => sc.constrain(oc)?,
                None => self.compiler = Some(oc.clone()),
            }
        }

        self.versions.intersect(&other.versions);
        self.variants.merge(&other.variants);
        self.architecture = self.architecture.clone().or_else(|| other.architecture.clone());

        Ok(())
    }

    /// Yield every node reachable from `self`, this node first, with a
    /// cycle guard keyed by package name (spec.md §4.2 `preorder_traversal`).
    pub fn preorder(&self) -> Vec<&Spec> {
        let mut visited = std::collections::HashSet::new();
        let mut out = Vec::new();
        self.preorder_helper(&mut visited, &mut out);
        out
    }

    fn preorder_helper<'a>(
        &'a self,
        visited: &mut std::collections::HashSet<String>,
        out: &mut Vec<&'a Spec>,
    ) {
        if !visited.insert(self.name.clone()) {
            return;
        }
        out.push(self);
        for (_, dep) in self.dependencies.iter() {
            dep.preorder_helper(visited, out);
        }
    }
}
