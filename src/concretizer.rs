//! Greedy concretization: turn a normalized spec into a fully pinned one
//! (spec.md §4.7).
//!
//! No backtracking or SAT search — each attribute is resolved once, in a
//! fixed order (architecture, compiler, version, then dependencies in
//! name-sorted order), and a resolution that can't be satisfied is an
//! immediate error rather than a trigger to try something else.

use crate::error::SpecError;
use crate::normalizer;
use crate::registry::{CompilerRegistry, HostArch, PackageRepo};
use crate::spec::Spec;
use crate::version::{VersionList, VersionTerm};
use log::info;

/// Concretize `spec` in place: validate, then architecture, compiler,
/// version, and every dependency (spec.md §4.7 `_concretize`).
pub fn concretize(
    spec: &mut Spec,
    repo: &dyn PackageRepo,
    compilers: &dyn CompilerRegistry,
    host: &dyn HostArch,
) -> Result<(), SpecError> {
    normalizer::validate_package_names(spec, repo)?;

    concretize_architecture(spec, host);
    concretize_compiler(spec, compilers)?;
    concretize_version(spec, repo)?;

    let mut names: Vec<String> = spec.dependencies.names().map(str::to_string).collect();
    names.sort();
    for name in names {
        let dep = spec.dependencies.get_mut(&name).expect("name came from this map");
        concretize(dep, repo, compilers, host)?;
    }

    info!("concretized {}", spec.name);
    Ok(())
}

/// Adopt the host's architecture if the spec doesn't already pin one
/// (spec.md §4.7 step 2).
fn concretize_architecture(spec: &mut Spec, host: &dyn HostArch) {
    if spec.architecture.is_none() {
        spec.architecture = Some(host.sys_type());
    }
}

/// Narrow the spec's compiler to a single concrete version, defaulting to
/// the package's recipe-independent preferred compiler when none was named
/// (spec.md §4.7 step 2). There is no implicit "first supported compiler"
/// fallback — an unset compiler with nothing to infer from is left unset,
/// same as upstream spec.md leaves unresolved attributes for the caller to
/// notice via `concrete()`.
fn concretize_compiler(spec: &mut Spec, compilers: &dyn CompilerRegistry) -> Result<(), SpecError> {
    if let Some(compiler) = &mut spec.compiler {
        if !compilers.supports(&compiler.name) {
            return Err(SpecError::UnknownCompiler {
                name: compiler.name.clone(),
            });
        }
        compiler.concretize()?;
    }
    Ok(())
}

/// Narrow the spec's version list to a single concrete version: the
/// highest version the list can represent, falling back to the recipe's
/// own version when the list has no upper bound at all (spec.md §4.7 step
/// 4; `versions.highest() or recipe.version`).
fn concretize_version(spec: &mut Spec, repo: &dyn PackageRepo) -> Result<(), SpecError> {
    if spec.versions.concrete() {
        return Ok(());
    }

    if let Some(v) = spec.versions.highest() {
        spec.versions = VersionList::from_terms(vec![VersionTerm::Exact(v)]);
        return Ok(());
    }

    let recipe = repo.get(&spec.name)?;
    spec.versions = VersionList::from_terms(vec![VersionTerm::Exact(recipe.version.clone())]);
    Ok(())
}

/// Deep-copy `spec` and concretize the copy, leaving the original untouched
/// (spec.md §4.7 `concretized`).
pub fn concretized(
    spec: &Spec,
    repo: &dyn PackageRepo,
    compilers: &dyn CompilerRegistry,
    host: &dyn HostArch,
) -> Result<Spec, SpecError> {
    let mut copy = spec.clone();
    concretize(&mut copy, repo, compilers, host)?;
    Ok(copy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{FixedHostArch, MockCompilerRegistry, MockRepo, Recipe};
    use crate::version::{Version, VersionList, VersionRange};

    fn env() -> (MockRepo, MockCompilerRegistry, FixedHostArch) {
        let repo = MockRepo::new()
            .with_recipe(Recipe::new("zlib", "1.2.11"))
            .with_recipe(Recipe::new("openmpi", "4.1").with_dependency(Spec::new("zlib")));
        let compilers = MockCompilerRegistry::from_names(["gcc"]);
        let host = FixedHostArch::new("linux-x86_64");
        (repo, compilers, host)
    }

    #[test]
    fn concretize_adopts_host_architecture() {
        let (repo, compilers, host) = env();
        let mut spec = Spec::new("zlib");
        concretize(&mut spec, &repo, &compilers, &host).unwrap();
        assert_eq!(spec.architecture.as_deref(), Some("linux-x86_64"));
    }

    #[test]
    fn concretize_falls_back_to_recipe_version_when_list_is_open() {
        let (repo, compilers, host) = env();
        let mut spec = Spec::new("zlib");
        concretize(&mut spec, &repo, &compilers, &host).unwrap();
        assert_eq!(spec.versions.to_string(), "1.2.11");
    }

    #[test]
    fn concretize_narrows_a_bounded_range_to_its_highest() {
        let (repo, compilers, host) = env();
        let mut spec = Spec::new("zlib");
        spec.versions = VersionList::from_terms(vec![crate::version::VersionTerm::Range(
            VersionRange::new(Some(Version::parse("1.0")), Some(Version::parse("1.2.9"))),
        )]);
        concretize(&mut spec, &repo, &compilers, &host).unwrap();
        assert_eq!(spec.versions.to_string(), "1.2.9");
    }

    #[test]
    fn concretize_prefers_list_highest_over_recipe_version_when_bounded() {
        let (repo, compilers, host) = env();
        let mut spec = Spec::new("zlib");
        // Recipe version 1.2.11 falls inside this range, but a bounded
        // range's own highest() always wins over the recipe version.
        spec.versions = VersionList::from_terms(vec![crate::version::VersionTerm::Range(
            VersionRange::new(Some(Version::parse("1.2")), Some(Version::parse("1.2.20"))),
        )]);
        concretize(&mut spec, &repo, &compilers, &host).unwrap();
        assert_eq!(spec.versions.to_string(), "1.2.20");
    }

    #[test]
    fn concretize_rejects_unknown_compiler() {
        let (repo, compilers, host) = env();
        let mut spec = Spec::new("zlib");
        spec.compiler = Some(
            crate::compiler::Compiler::new(
                "gcc".into(),
                VersionList::open(),
                &MockCompilerRegistry::from_names(["gcc"]),
            )
            .unwrap(),
        );
        let unsupported = MockCompilerRegistry::from_names(["clang"]);
        let err = concretize(&mut spec, &repo, &unsupported, &host).unwrap_err();
        assert!(matches!(err, SpecError::UnknownCompiler { .. }));
    }

    #[test]
    fn concretize_recurses_into_dependencies() {
        let (repo, compilers, host) = env();
        let mut spec = Spec::new("openmpi");
        spec.add_dependency(Spec::new("zlib")).unwrap();
        concretize(&mut spec, &repo, &compilers, &host).unwrap();
        assert_eq!(
            spec.dependencies.get("zlib").unwrap().versions.to_string(),
            "1.2.11"
        );
    }

    #[test]
    fn concretized_leaves_original_untouched() {
        let (repo, compilers, host) = env();
        let spec = Spec::new("zlib");
        let result = concretized(&spec, &repo, &compilers, &host).unwrap();
        assert!(spec.architecture.is_none());
        assert!(result.architecture.is_some());
    }
}
