//! buildspec: spec grammar and constraint algebra for a source-building
//! package manager.
//!
//! A Rust library for parsing build-spec text, reasoning about it with a
//! `satisfies`/`constrain` constraint algebra, normalizing it against
//! package recipes, and concretizing it into a fully pinned build plan.
//!
//! # Overview
//!
//! buildspec provides:
//!
//! - **Spec text parsing**: `mpileaks ^openmpi @1.2:1.4 +debug %intel @12.1`
//! - **A constraint algebra** over versions, variants, compilers, and
//!   architecture, with `satisfies` (is-at-least-as-specific-as) and
//!   `constrain` (atomic in-place narrowing)
//! - **Normalization** against package recipes (flatten, then complete)
//! - **Greedy, non-backtracking concretization** into one pinned spec
//! - **A Python API** (via PyO3) over the same `Spec` type
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      CLI (src/bin/main.rs)                   │
//! ├────────────┬─────────────┬─────────────┬─────────────────────┤
//! │   lexer    │   parser    │ normalizer  │    concretizer      │
//! ├────────────┴─────────────┴─────────────┴─────────────────────┤
//! │  spec  │  compiler  │  variant  │  version  │   registry      │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start (Rust)
//!
//! ```
//! use buildspec::registry::{MockCompilerRegistry, MockRepo, Recipe, FixedHostArch};
//! use buildspec::{parser, normalizer, concretizer};
//!
//! let compilers = MockCompilerRegistry::from_names(["gcc"]);
//! let repo = MockRepo::new().with_recipe(Recipe::new("zlib", "1.2.11"));
//! let host = FixedHostArch::new("linux-x86_64");
//!
//! let mut spec = parser::parse_one("zlib %gcc@9.1", &compilers).unwrap();
//! normalizer::normalize(&mut spec, &repo).unwrap();
//! concretizer::concretize(&mut spec, &repo, &compilers, &host).unwrap();
//! assert!(spec.concrete());
//! ```
//!
//! # Quick Start (Python)
//!
//! ```python
//! from buildspec import Spec
//!
//! spec = Spec.parse("mpileaks ^openmpi @1.2:1.4 +debug %intel @12.1", known_compilers=["intel"])
//! print(spec)
//! ```
//!
//! # Core Types
//!
//! - [`spec::Spec`] - A node in the spec DAG
//! - [`compiler::Compiler`] - Compiler name plus version list
//! - [`variant::VariantMap`] - Named boolean build options
//! - [`version::VersionList`] - Version union (exact versions and ranges)
//! - [`registry::PackageRepo`], [`registry::CompilerRegistry`], [`registry::HostArch`] -
//!   external collaborator interfaces
//!
//! # Modules
//!
//! - [`lexer`] - Spec text tokenizer
//! - [`parser`] - Recursive-descent spec parser
//! - [`version`] - Version ordering, ranges, lists
//! - [`variant`] - Boolean build options
//! - [`compiler`] - Compiler name plus version list
//! - [`spec`] - The spec DAG node itself
//! - [`registry`] - External collaborator traits and mocks
//! - [`normalizer`] - Recipe-guided normalization
//! - [`concretizer`] - Greedy concretization
//! - [`printer`] - Canonical text rendering
//! - [`config`] - Process configuration
//! - [`error`] - Error types
//!
//! # Features
//!
//! - `ext` - Build as a Python extension module via PyO3

pub mod compiler;
pub mod concretizer;
pub mod config;
pub mod error;
pub mod lexer;
pub mod normalizer;
pub mod parser;
pub mod printer;
pub mod py;
pub mod registry;
pub mod spec;
pub mod variant;
pub mod version;

pub use compiler::Compiler;
pub use error::SpecError;
pub use registry::{CompilerRegistry, HostArch, PackageRepo};
pub use spec::Spec;
pub use variant::{Variant, VariantMap};
pub use version::{Version, VersionList};

use pyo3::prelude::*;

/// Library version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[pyfunction]
fn version() -> &'static str {
    VERSION
}

/// Python module initialization.
///
/// Built via `maturin build` to produce a `.pyd` (Windows) or `.so` (Unix)
/// extension module.
///
/// # Usage
///
/// ```python
/// import buildspec
/// print(buildspec.version())
///
/// from buildspec import Spec
/// ```
#[pymodule]
fn buildspec(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(version, m)?)?;
    m.add_class::<py::PySpec>()?;
    m.add("__doc__", "buildspec: spec grammar and constraint algebra for a source-building package manager.")?;
    m.add("__version__", VERSION)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{FixedHostArch, MockCompilerRegistry, MockRepo, Recipe};

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn integration_parse_normalize_concretize() {
        let compilers = MockCompilerRegistry::from_names(["gcc"]);
        let repo = MockRepo::new()
            .with_recipe(
                Recipe::new("mpileaks", "2.3")
                    .with_dependency(parser::parse_one("openmpi %gcc@9.1", &compilers).unwrap()),
            )
            .with_recipe(Recipe::new("openmpi", "4.1"));
        let host = FixedHostArch::new("linux-x86_64");

        // Every node needs a compiler with an explicit version to reach
        // full-tree concreteness (concretize never invents a compiler, and
        // an unversioned compiler has no highest() to narrow to).
        let mut spec = parser::parse_one("mpileaks %gcc@9.1", &compilers).unwrap();
        normalizer::normalize(&mut spec, &repo).unwrap();
        concretizer::concretize(&mut spec, &repo, &compilers, &host).unwrap();

        assert!(spec.concrete());
        assert!(spec.dependencies.get("openmpi").unwrap().concrete());
        assert_eq!(spec.versions.to_string(), "2.3");
    }

    #[test]
    fn integration_constrain_two_specs() {
        let compilers = MockCompilerRegistry::from_names(["intel"]);
        let mut a = parser::parse_one("mpileaks @1.2:1.6", &compilers).unwrap();
        let b = parser::parse_one("mpileaks @1.4:1.8 %intel", &compilers).unwrap();
        a.constrain(&b).unwrap();
        assert_eq!(a.versions.to_string(), "1.4:1.6");
        assert_eq!(a.compiler.unwrap().name, "intel");
    }

    #[test]
    fn integration_normalize_rejects_unknown_package() {
        let repo = MockRepo::new();
        let spec = Spec::new("nonesuch");
        assert!(normalizer::validate_package_names(&spec, &repo).is_err());
    }
}
