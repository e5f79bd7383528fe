//! Error types for the buildspec library.
//!
//! Uses `thiserror` for `Display`/`Error` impls, grouped by the subsystem
//! that raises them (spec.md §7), with [`SpecError`] as the single
//! top-level enum most callers match on.

use thiserror::Error;

/// Top-level error type returned by parsing, constraint, normalization,
/// and concretization operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecError {
    #[error("lex error: {0}")]
    Lex(#[from] LexError),

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("identifier error: {0}")]
    Identifier(#[from] IdentifierError),

    #[error("duplicate: {0}")]
    Duplicate(#[from] DuplicateError),

    #[error("unknown package: {name}")]
    UnknownPackage { name: String },

    #[error("unknown compiler: {name}")]
    UnknownCompiler { name: String },

    #[error(transparent)]
    Unsatisfiable(#[from] UnsatisfiableError),

    #[error("{package} does not depend on {}", .extras.join(", "))]
    InvalidDependency { package: String, extras: Vec<String> },

    #[error("invalid spec DAG: {0}")]
    InconsistentSpec(String),

    #[error("{message}")]
    Other { message: String },
}

impl SpecError {
    pub fn other(message: impl Into<String>) -> Self {
        SpecError::Other {
            message: message.into(),
        }
    }
}

/// Errors raised while tokenizing spec text (spec.md §4.1).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("empty token at position {pos}")]
    EmptyToken { pos: usize },
}

/// Errors raised by the recursive-descent parser (spec.md §4.2).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String },

    #[error("unexpected token {found}, expected {expected}")]
    UnexpectedToken { found: String, expected: String },

    #[error("malformed construct near '{near}': {reason}")]
    LastTokenError { near: String, reason: String },

    #[error("look-ahead failed: {reason}")]
    NextTokenError { reason: String },

    #[error("dependency has no preceding package")]
    DanglingDependency,
}

/// A non-version identifier contained a '.' (spec.md §4.2 context-sensitive rule).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("identifier '{identifier}' cannot contain '.'")]
pub struct IdentifierError {
    pub identifier: String,
}

/// The same slot (compiler, architecture, variant, dependency) was set
/// twice within one spec (spec.md §4.2, §7).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DuplicateError {
    #[error("spec for '{package}' cannot have two compilers")]
    Compiler { package: String },

    #[error("spec for '{package}' cannot have two architectures")]
    Architecture { package: String },

    #[error("cannot specify variant '{variant}' twice in spec for '{package}'")]
    Variant { package: String, variant: String },

    #[error("cannot depend on '{dependency}' twice in spec for '{package}'")]
    Dependency { package: String, dependency: String },
}

/// One side of a `constrain` call could not be reconciled with the other
/// (spec.md §4.5, §7).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnsatisfiableError {
    #[error("version ranges {provided} and {required} do not overlap")]
    Version { provided: String, required: String },

    #[error("variant '{name}' is {provided} but required {required}")]
    Variant {
        name: String,
        provided: &'static str,
        required: &'static str,
    },

    #[error("compiler '{provided}' does not satisfy required compiler '{required}'")]
    Compiler { provided: String, required: String },

    #[error("architecture '{provided}' does not satisfy required architecture '{required}'")]
    Architecture { provided: String, required: String },
}

impl UnsatisfiableError {
    /// Re-annotate with the package/requirement context the normalizer has
    /// but the constraint algebra itself does not (spec.md §4.6 step 3,
    /// §7 policy: "Package X requires Y, but spec asked for Z").
    pub fn with_package_context(self, package: &str) -> SpecError {
        SpecError::other(format!(
            "invalid spec: package '{package}' requires a dependency that conflicts with what was asked for ({self})"
        ))
    }
}

// Lets `?` work directly inside `#[pymethods]` bodies that return `PyResult`.
impl From<SpecError> for pyo3::PyErr {
    fn from(err: SpecError) -> Self {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_roundtrips() {
        let err = SpecError::UnknownPackage {
            name: "zlib".into(),
        };
        assert_eq!(err.to_string(), "unknown package: zlib");
    }

    #[test]
    fn invalid_dependency_message() {
        let err = SpecError::InvalidDependency {
            package: "mpileaks".into(),
            extras: vec!["zlib".into()],
        };
        assert_eq!(err.to_string(), "mpileaks does not depend on zlib");
    }
}
