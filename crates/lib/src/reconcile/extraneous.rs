//! Extraneous package detection.
//!
//! Runs in two phases:
//!
//! 1. **Candidates**: every installed package outside the desired closure.
//! 2. **Minimization**: a candidate that is a direct dependency of another candidate
//!    is *shadowed*; removing the parent frees it, so only the unshadowed roots are
//!    reported.
//!
//! Candidate `B -> C` with both unneeded reports `[B]`. A cycle made only of
//! candidates (`X -> Y -> X`) leaves no root and is reported as
//! [`ReconcileError::MinimizationContradiction`]. Cycles among some candidates do not
//! hide roots found elsewhere.

use std::collections::{HashMap, HashSet};

use super::closure::RequiredSet;
use super::types::{ReconcileError, Verdict};
use crate::package::{DepsMap, Package};

/// Installed packages that nothing desired needs, minimized to removal roots.
pub fn extraneous(desired: &[Package], installed: &[Package], deps: &DepsMap) -> Result<Vec<Package>, ReconcileError> {
  let required = RequiredSet::compute(desired, deps);
  let candidates = candidates(&required, installed);
  minimize(&candidates, deps)
}

/// Drop every candidate that another candidate depends on directly.
///
/// Fails only when candidates exist but every one of them is shadowed.
pub fn minimize(candidates: &[Package], deps: &DepsMap) -> Result<Vec<Package>, ReconcileError> {
  let shadows = shadowed_by(candidates, deps);

  let roots: Vec<Package> = candidates
    .iter()
    .filter(|pkg| !shadows.contains_key(pkg))
    .cloned()
    .collect();

  if roots.is_empty() && !candidates.is_empty() {
    return Err(ReconcileError::MinimizationContradiction {
      candidates: candidates.to_vec(),
    });
  }

  Ok(roots)
}

/// Per installed package, why it is kept or reported.
///
/// Never fails: a candidate cycle shows up as mutually shadowed entries.
pub fn explain(desired: &[Package], installed: &[Package], deps: &DepsMap) -> Vec<(Package, Verdict)> {
  let required = RequiredSet::compute(desired, deps);
  let candidates = candidates(&required, installed);
  let shadows = shadowed_by(&candidates, deps);

  let mut seen: HashSet<&Package> = HashSet::new();
  installed
    .iter()
    .filter(|pkg| seen.insert(*pkg))
    .map(|pkg| {
      let verdict = if required.is_desired(pkg) {
        Verdict::Desired
      } else if required.contains(pkg) {
        Verdict::Dependency
      } else if let Some(parents) = shadows.get(pkg) {
        Verdict::Shadowed {
          by: parents.iter().map(|p| (*p).clone()).collect(),
        }
      } else {
        Verdict::Extraneous
      };
      (pkg.clone(), verdict)
    })
    .collect()
}

/// Installed packages outside the closure, deduplicated, in installed order.
fn candidates(required: &RequiredSet, installed: &[Package]) -> Vec<Package> {
  let mut seen: HashSet<&Package> = HashSet::new();
  installed
    .iter()
    .filter(|pkg| !required.contains(pkg) && seen.insert(*pkg))
    .cloned()
    .collect()
}

/// Maps each shadowed candidate to the candidates that depend on it.
///
/// Self-edges are ignored: a package cannot make its own removal redundant.
fn shadowed_by<'a>(candidates: &'a [Package], deps: &'a DepsMap) -> HashMap<&'a Package, Vec<&'a Package>> {
  let candidate_set: HashSet<&Package> = candidates.iter().collect();
  let mut shadows: HashMap<&Package, Vec<&Package>> = HashMap::new();

  for parent in candidates {
    for dep in deps.get(parent).map(Vec::as_slice).unwrap_or_default() {
      if dep != parent && candidate_set.contains(dep) {
        let parents = shadows.entry(dep).or_default();
        if !parents.contains(&parent) {
          parents.push(parent);
        }
      }
    }
  }

  shadows
}
