//! Python-facing facade over [`crate::spec::Spec`] (spec.md §9 Python bindings).
//!
//! Mirrors the shape of [`crate::dep::DepSpec`]'s `#[pyclass]`: a thin
//! wrapper with a `#[staticmethod] parse`, simple getters, and methods that
//! delegate straight to the Rust implementation. The DAG's internal maps
//! stay on the Rust side — Python only ever sees rendered strings and
//! booleans, not a `BTreeMap` it would have to marshal.

use crate::registry::MockCompilerRegistry;
use crate::spec::Spec;
use pyo3::prelude::*;

/// A parsed (and possibly concretized) spec.
#[pyclass(name = "Spec")]
#[derive(Debug, Clone)]
pub struct PySpec {
    pub(crate) inner: Spec,
}

#[pymethods]
impl PySpec {
    /// Parse `text` into a single spec.
    ///
    /// `known_compilers` defaults to empty, so a `%compiler` clause will
    /// raise `UnknownCompilerError` unless the caller lists it explicitly —
    /// there is no ambient compiler registry on the Python side.
    #[staticmethod]
    #[pyo3(signature = (text, known_compilers = None))]
    pub fn parse(text: &str, known_compilers: Option<Vec<String>>) -> PyResult<Self> {
        let registry = MockCompilerRegistry::from_names(known_compilers.unwrap_or_default());
        let inner = crate::parser::parse_one(text, &registry)?;
        Ok(Self { inner })
    }

    #[getter]
    pub fn name(&self) -> String {
        self.inner.name.clone()
    }

    pub fn concrete(&self) -> bool {
        self.inner.concrete()
    }

    pub fn satisfies(&self, other: &PySpec) -> bool {
        self.inner.satisfies(&other.inner)
    }

    pub fn constrain(&mut self, other: &PySpec) -> PyResult<()> {
        self.inner.constrain(&other.inner)?;
        Ok(())
    }

    pub fn tree(&self) -> String {
        crate::printer::tree(&self.inner)
    }

    pub fn __str__(&self) -> String {
        self.inner.to_string()
    }

    pub fn __repr__(&self) -> String {
        format!("Spec('{}')", self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_roundtrips_through_display() {
        let spec = PySpec::parse("mpileaks @1.2:1.4 +debug", None).unwrap();
        assert_eq!(spec.name(), "mpileaks");
        assert_eq!(spec.__str__(), "mpileaks@1.2:1.4+debug");
    }

    #[test]
    fn unknown_compiler_surfaces_as_py_value_error() {
        let err = PySpec::parse("mpileaks %msvc", None).unwrap_err();
        Python::with_gil(|py| {
            assert!(err.is_instance_of::<pyo3::exceptions::PyValueError>(py));
        });
    }
}
