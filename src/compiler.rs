//! The compiler term: name plus version list (spec.md §3, §4.3).

use crate::error::{SpecError, UnsatisfiableError};
use crate::registry::CompilerRegistry;
use crate::version::VersionList;
use std::fmt;

/// `(name, versions)` — the compiler a package should be built with.
///
/// Invariant: `name` is a member of the [`CompilerRegistry`] supplied at
/// construction time (spec.md §3). `concrete` mirrors `versions.concrete`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Compiler {
    pub name: String,
    pub versions: VersionList,
}

impl Compiler {
    /// Construct a compiler term, checking `name` against `registry`
    /// (spec.md §3 invariant, §7 `UnknownCompilerError`).
    pub fn new(
        name: String,
        versions: VersionList,
        registry: &dyn CompilerRegistry,
    ) -> Result<Self, SpecError> {
        if !registry.supports(&name) {
            return Err(SpecError::UnknownCompiler { name });
        }
        Ok(Self { name, versions })
    }

    pub fn satisfies(&self, other: &Compiler) -> bool {
        self.name == other.name && self.versions.overlaps(&other.versions)
    }

    pub fn constrain(&mut self, other: &Compiler) -> Result<(), SpecError> {
        if !self.satisfies(other) {
            return Err(SpecError::Unsatisfiable(UnsatisfiableError::Compiler {
                provided: self.to_string(),
                required: other.to_string(),
            }));
        }
        self.versions.intersect(&other.versions);
        Ok(())
    }

    pub fn concrete(&self) -> bool {
        self.versions.concrete()
    }

    /// Narrow an unconcrete version list to its highest representable
    /// version (spec.md §4.3). Fails if the list has no upper bound to
    /// resolve against — mirrors the external version algebra's failure
    /// mode described in spec.md §4.3.
    pub fn concretize(&mut self) -> Result<(), SpecError> {
        if self.versions.concrete() {
            return Ok(());
        }
        match self.versions.highest() {
            Some(v) => {
                self.versions = VersionList::from_terms(vec![crate::version::VersionTerm::Exact(v)]);
                Ok(())
            }
            None => Err(SpecError::other(format!(
                "no concrete version available for compiler '{}'",
                self.name
            ))),
        }
    }
}

impl fmt::Display for Compiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.versions.terms().is_empty() {
            write!(f, "@{}", self.versions)?;
        }
        Ok(())
    }
}
