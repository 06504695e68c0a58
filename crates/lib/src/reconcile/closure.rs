//! Reachability over the dependency graph.
//!
//! A package is *required* when it is desired, or reachable from a desired package
//! through one or more dependency edges. Both entry points walk the graph with an
//! explicit worklist and a visited set, so cyclic dependency data terminates and
//! deep chains never grow the call stack.

use std::collections::{HashSet, VecDeque};

use crate::package::{DepsMap, Package};

/// The closure of the desired set under the dependency relation.
///
/// Computed once per reconciliation; membership checks are then constant time.
#[derive(Debug, Default, Clone)]
pub struct RequiredSet {
  desired: HashSet<Package>,
  reachable: HashSet<Package>,
}

impl RequiredSet {
  /// Walk the dependency graph breadth-first from every desired package.
  ///
  /// Packages missing from `deps` are kept in the closure but not expanded.
  pub fn compute(desired: &[Package], deps: &DepsMap) -> Self {
    let desired_set: HashSet<Package> = desired.iter().cloned().collect();
    let mut reachable: HashSet<Package> = HashSet::with_capacity(deps.len().max(desired.len()));
    let mut queue: VecDeque<&Package> = VecDeque::new();

    for pkg in desired {
      if reachable.insert(pkg.clone()) {
        queue.push_back(pkg);
      }
    }

    while let Some(pkg) = queue.pop_front() {
      for dep in deps.get(pkg).map(Vec::as_slice).unwrap_or_default() {
        if reachable.insert(dep.clone()) {
          queue.push_back(dep);
        }
      }
    }

    Self {
      desired: desired_set,
      reachable,
    }
  }

  /// True if `pkg` is desired or a transitive dependency of something desired.
  pub fn contains(&self, pkg: &Package) -> bool {
    self.reachable.contains(pkg)
  }

  /// True if `pkg` is listed in the desired set itself.
  pub fn is_desired(&self, pkg: &Package) -> bool {
    self.desired.contains(pkg)
  }

  pub fn len(&self) -> usize {
    self.reachable.len()
  }

  pub fn is_empty(&self) -> bool {
    self.reachable.is_empty()
  }
}

/// Answer a single "is this package required?" query.
///
/// Same semantics as [`RequiredSet::contains`], but stops as soon as `pkg` is found
/// and only allocates a visited set for this call. Prefer [`RequiredSet`] when
/// asking about many packages against the same desired set.
pub fn is_required(pkg: &Package, desired: &[Package], deps: &DepsMap) -> bool {
  if desired.contains(pkg) {
    return true;
  }

  let mut visited: HashSet<&Package> = HashSet::new();
  let mut queue: VecDeque<&Package> = VecDeque::new();

  for req in desired {
    if visited.insert(req) {
      queue.push_back(req);
    }
  }

  while let Some(current) = queue.pop_front() {
    for dep in deps.get(current).map(Vec::as_slice).unwrap_or_default() {
      if dep == pkg {
        return true;
      }
      if visited.insert(dep) {
        queue.push_back(dep);
      }
    }
  }

  false
}
