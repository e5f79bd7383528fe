//! External collaborator interfaces (spec.md §1, §6, §9).
//!
//! `PackageRepo`, `CompilerRegistry`, and `HostArch` are deliberately out of
//! scope for this crate's own logic — the normalizer and concretizer take
//! them as explicit `&dyn Trait` parameters (spec.md §9 design note)
//! instead of reaching for ambient globals. `MockRepo`, `MockCompilerRegistry`,
//! and `FixedHostArch` are minimal in-memory implementations used by tests,
//! doctests, and the CLI demo — they are not meant to be a real package
//! database.

use crate::spec::{DependencyMap, Spec};
use crate::version::Version;
use std::collections::{HashMap, HashSet};

/// A package-authored recipe: its declared dependency prototypes and
/// default version (spec.md §6).
#[derive(Debug, Clone)]
pub struct Recipe {
    pub name: String,
    pub version: Version,
    pub dependencies: DependencyMap,
}

impl Recipe {
    pub fn new(name: impl Into<String>, version: &str) -> Self {
        Self {
            name: name.into(),
            version: Version::parse(version),
            dependencies: DependencyMap::new(),
        }
    }

    pub fn with_dependency(mut self, dep: Spec) -> Self {
        self.dependencies.insert(dep);
        self
    }

    /// Validate that the recipe's own dependency graph is internally sane.
    ///
    /// Spec.md §6 calls this "a programmer error, not a user error" —
    /// without a real package corpus behind this trait there is nothing to
    /// check, so the default is a no-op success. A real `PackageRepo`
    /// backed by an actual package collection would check things like: every
    /// dependency name is itself a known package.
    pub fn validate_dependencies(&self) -> Result<(), crate::error::SpecError> {
        Ok(())
    }
}

/// Resolves package names to recipes (spec.md §6 `PackageRepo`).
pub trait PackageRepo {
    fn get(&self, name: &str) -> Result<&Recipe, crate::error::SpecError>;
}

/// The set of compiler names this system knows how to build with
/// (spec.md §6 `CompilerRegistry`).
pub trait CompilerRegistry {
    fn supports(&self, name: &str) -> bool;
}

/// Probes the host's architecture identifier (spec.md §6 `HostArch`).
pub trait HostArch {
    fn sys_type(&self) -> String;
}

/// An in-memory [`PackageRepo`] keyed by package name. Exists only to drive
/// tests, doctests, and the `buildspec` CLI demo — not part of the
/// constraint-algebra surface itself.
#[derive(Debug, Clone, Default)]
pub struct MockRepo {
    recipes: HashMap<String, Recipe>,
}

impl MockRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_recipe(mut self, recipe: Recipe) -> Self {
        self.recipes.insert(recipe.name.clone(), recipe);
        self
    }
}

impl PackageRepo for MockRepo {
    fn get(&self, name: &str) -> Result<&Recipe, crate::error::SpecError> {
        self.recipes
            .get(name)
            .ok_or_else(|| crate::error::SpecError::UnknownPackage { name: name.to_string() })
    }
}

/// An in-memory [`CompilerRegistry`] backed by a fixed name set.
#[derive(Debug, Clone, Default)]
pub struct MockCompilerRegistry {
    names: HashSet<String>,
}

impl MockCompilerRegistry {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl CompilerRegistry for MockCompilerRegistry {
    fn supports(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

/// A [`HostArch`] that always reports the same fixed identifier.
#[derive(Debug, Clone)]
pub struct FixedHostArch(pub String);

impl FixedHostArch {
    pub fn new(arch: impl Into<String>) -> Self {
        Self(arch.into())
    }
}

impl HostArch for FixedHostArch {
    fn sys_type(&self) -> String {
        self.0.clone()
    }
}
