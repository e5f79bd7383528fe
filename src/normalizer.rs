//! Recipe-guided normalization: turn a parsed spec into the full dependency
//! shape its package recipes declare (spec.md §4.6).
//!
//! Normalization runs in three passes, mirroring the original `spec.py`'s
//! `normalize`/`flatten`/`_normalize_helper`:
//! 1. [`flatten`] walks the (possibly nested, possibly redundant) spec tree
//!    the parser produced and merges every node mentioning the same package
//!    name into one flat map, via `constrain`.
//! 2. [`normalize`] drives a recipe-guided walk off that *single* flat map
//!    (`spec_deps`), so that every node reachable under more than one name
//!    converges on the same merged values instead of each parent getting
//!    its own independently-constrained copy.
//! 3. Any flat-map entry never reached by the recipe walk is an extraneous
//!    user dependency and is rejected.

use crate::error::{SpecError, UnsatisfiableError};
use crate::registry::PackageRepo;
use crate::spec::{DependencyMap, Spec};
use log::debug;
use std::collections::{BTreeMap, HashSet};

/// Validate that every package name appearing in `spec`'s tree is known to
/// `repo` (spec.md §4.6 step 1, `validate_package_names`).
pub fn validate_package_names(spec: &Spec, repo: &dyn PackageRepo) -> Result<(), SpecError> {
    for node in spec.preorder() {
        repo.get(&node.name)?;
    }
    Ok(())
}

/// Preorder-walk `spec`'s tree and merge same-named nodes into one flat map
/// via `constrain` (spec.md §4.6 step 2 `flatten`).
///
/// Validates the recipe graph itself first, the way `spec.py`'s `flatten`
/// calls `self.package.validate_dependencies()` before touching any user
/// constraint — a failure there means the recipes are internally
/// inconsistent, not that the user wrote a bad spec. A `constrain` failure
/// while merging two occurrences of the same package means the *parser*
/// handed us two incompatible copies of the same name, which can't happen
/// from ordinary user input, so it's wrapped as [`SpecError::InconsistentSpec`]
/// rather than surfaced as a plain unsatisfiable-constraint error.
pub fn flatten(root: &Spec, repo: &dyn PackageRepo) -> Result<DependencyMap, SpecError> {
    let mut flat = DependencyMap::new();
    flatten_into(root, repo, &mut flat)?;
    Ok(flat)
}

fn flatten_into(node: &Spec, repo: &dyn PackageRepo, flat: &mut DependencyMap) -> Result<(), SpecError> {
    repo.get(&node.name)?.validate_dependencies()?;

    match flat.get_mut(&node.name) {
        Some(existing) => existing.constrain(node).map_err(|err| match err {
            SpecError::Unsatisfiable(u) => {
                SpecError::InconsistentSpec(format!("Invalid spec DAG: {u}"))
            }
            other => other,
        })?,
        None => {
            let mut bare = node.clone();
            bare.dependencies = DependencyMap::new();
            bare.parent = None;
            flat.insert(bare);
        }
    }
    for (_, dep) in node.dependencies.iter() {
        flatten_into(dep, repo, flat)?;
    }
    Ok(())
}

/// Complete `root`'s dependency tree against `repo`'s declared recipes
/// (spec.md §4.6 steps 3-4 `normalize`).
///
/// Seeds a working flat map (`spec_deps`) from [`flatten`], then walks it
/// recipe by recipe, merging every recipe-declared dependency into that one
/// shared map before rebuilding `root`'s tree from it. Because every
/// attachment point is cloned from the same finalized map entry, two
/// packages that each depend on a third with different constraints end up
/// with identical, fully-merged values rather than silently divergent
/// copies. A node naming a dependency its recipe never declared is an
/// error (spec.md §4.6 step 4, §7 `InvalidDependencyException`).
pub fn normalize(root: &mut Spec, repo: &dyn PackageRepo) -> Result<(), SpecError> {
    validate_package_names(root, repo)?;

    let mut spec_deps = flatten(root, repo)?;
    let mut visited = HashSet::new();
    let mut shape: BTreeMap<String, Vec<String>> = BTreeMap::new();

    normalize_node(&root.name.clone(), repo, &mut spec_deps, &mut visited, &mut shape)?;

    let extras: Vec<String> = spec_deps
        .names()
        .filter(|name| !visited.contains(*name))
        .map(str::to_string)
        .collect();
    if !extras.is_empty() {
        return Err(SpecError::InvalidDependency {
            package: root.name.clone(),
            extras,
        });
    }

    rebuild_tree(root, &spec_deps, &shape);
    Ok(())
}

fn normalize_node(
    name: &str,
    repo: &dyn PackageRepo,
    spec_deps: &mut DependencyMap,
    visited: &mut HashSet<String>,
    shape: &mut BTreeMap<String, Vec<String>>,
) -> Result<(), SpecError> {
    if !visited.insert(name.to_string()) {
        return Ok(());
    }

    let recipe = repo.get(name)?;
    debug!("normalize: {} against recipe {}", name, recipe.name);

    let mut children: Vec<String> = Vec::new();
    for (dep_name, recipe_dep) in recipe.dependencies.iter() {
        match spec_deps.get_mut(dep_name) {
            Some(existing) => existing.constrain(recipe_dep).map_err(|err| match err {
                SpecError::Unsatisfiable(u) => u.with_package_context(name),
                other => other,
            })?,
            None => {
                let mut fresh = recipe_dep.clone();
                fresh.dependencies = DependencyMap::new();
                spec_deps.insert(fresh);
            }
        }
        children.push(dep_name.to_string());
    }

    shape.insert(name.to_string(), children.clone());

    for child in children {
        normalize_node(&child, repo, spec_deps, visited, shape)?;
    }

    Ok(())
}

/// Rebuild `node`'s dependency map from the finalized flat map, following
/// the shape the recipe walk recorded. Every attachment is cloned from the
/// same `spec_deps` entry, so same-named nodes reached through different
/// parents always carry identical, fully-merged values.
fn rebuild_tree(node: &mut Spec, spec_deps: &DependencyMap, shape: &BTreeMap<String, Vec<String>>) {
    let mut deps = DependencyMap::new();
    if let Some(children) = shape.get(&node.name) {
        for child_name in children {
            if let Some(proto) = spec_deps.get(child_name) {
                let mut child = proto.clone();
                child.parent = Some(node.name.clone());
                rebuild_tree(&mut child, spec_deps, shape);
                deps.insert(child);
            }
        }
    }
    node.dependencies = deps;
}
