//! Property tests for the reconciler over random dependency graphs.

use std::collections::HashSet;

use pkgsync_lib::package::{ActualState, DepsMap, DesiredState, Package};
use pkgsync_lib::reconcile::{ReconcileError, RequiredSet, is_required, reconcile};
use proptest::prelude::*;

const UNIVERSE: usize = 10;

fn pkg(i: usize) -> Package {
  // Every fourth package is a cask so kind participates in identity.
  if i % 4 == 3 {
    Package::cask(format!("p{}", i))
  } else {
    Package::formula(format!("p{}", i))
  }
}

#[derive(Debug, Clone)]
struct Scenario {
  desired: DesiredState,
  actual: ActualState,
}

impl Scenario {
  /// Installed packages that nothing desired reaches.
  fn candidates(&self) -> Vec<&Package> {
    self
      .actual
      .packages
      .iter()
      .filter(|p| !is_required(p, &self.desired.packages, &self.actual.deps))
      .collect()
  }

  fn lists_as_dep(&self, holder: &Package, dep: &Package) -> bool {
    holder != dep && self.actual.deps.get(holder).is_some_and(|d| d.contains(dep))
  }
}

fn scenario() -> impl Strategy<Value = Scenario> {
  (
    prop::collection::btree_set(0..UNIVERSE, 0..6),
    prop::collection::btree_set(0..UNIVERSE, 0..UNIVERSE),
    prop::collection::vec(prop::collection::vec(0..UNIVERSE, 0..3), UNIVERSE),
  )
    .prop_map(|(desired, installed, edges)| {
      let installed: Vec<Package> = installed.into_iter().map(pkg).collect();
      let mut deps = DepsMap::new();
      for p in &installed {
        let idx: usize = p.name[1..].parse().unwrap_or_default();
        deps.insert(p.clone(), edges[idx].iter().copied().map(pkg).collect());
      }
      Scenario {
        desired: DesiredState::new(desired.into_iter().map(pkg).collect()),
        actual: ActualState::new(installed, deps),
      }
    })
}

proptest! {
  #![proptest_config(ProptestConfig { cases: 256, .. ProptestConfig::default() })]

  #[test]
  fn missing_is_desired_minus_installed(s in scenario()) {
    let installed: HashSet<&Package> = s.actual.packages.iter().collect();
    let expected: Vec<Package> = s
      .desired
      .packages
      .iter()
      .filter(|p| !installed.contains(p))
      .cloned()
      .collect();

    if let Ok(result) = reconcile(&s.desired, &s.actual) {
      prop_assert_eq!(result.missing, expected);
    }
  }

  #[test]
  fn extra_is_sound_and_minimal(s in scenario()) {
    let Ok(result) = reconcile(&s.desired, &s.actual) else {
      return Ok(());
    };
    let candidates = s.candidates();

    for extra in &result.extra {
      prop_assert!(s.actual.packages.contains(extra));
      prop_assert!(!is_required(extra, &s.desired.packages, &s.actual.deps));
      for other in &candidates {
        prop_assert!(!s.lists_as_dep(other, extra), "{} is a dependency of {}", extra, other);
      }
    }
  }

  #[test]
  fn extra_is_complete_modulo_minimization(s in scenario()) {
    let Ok(result) = reconcile(&s.desired, &s.actual) else {
      return Ok(());
    };
    let candidates = s.candidates();

    for candidate in &candidates {
      let reported = result.extra.contains(candidate);
      let shadowed = candidates.iter().any(|other| s.lists_as_dep(other, candidate));
      prop_assert!(reported || shadowed, "{} dropped without a shadowing candidate", candidate);
    }
  }

  #[test]
  fn contradiction_only_when_every_candidate_is_shadowed(s in scenario()) {
    if let Err(ReconcileError::MinimizationContradiction { candidates: reported }) = reconcile(&s.desired, &s.actual) {
      let candidates = s.candidates();
      prop_assert!(!candidates.is_empty());
      prop_assert_eq!(reported.len(), candidates.len());
      for candidate in &candidates {
        prop_assert!(candidates.iter().any(|other| s.lists_as_dep(other, candidate)));
      }
    }
  }

  #[test]
  fn reconcile_is_deterministic(s in scenario()) {
    prop_assert_eq!(reconcile(&s.desired, &s.actual), reconcile(&s.desired, &s.actual));
  }

  #[test]
  fn oracle_agrees_with_closure(s in scenario(), query in 0..UNIVERSE) {
    let required = RequiredSet::compute(&s.desired.packages, &s.actual.deps);
    let query = pkg(query);
    prop_assert_eq!(required.contains(&query), is_required(&query, &s.desired.packages, &s.actual.deps));
  }
}

#[test]
fn unneeded_root_hides_its_dependency() {
  let a = Package::formula("A");
  let b = Package::formula("B");
  let c = Package::formula("C");
  let mut deps = DepsMap::new();
  deps.insert(a.clone(), vec![]);
  deps.insert(b.clone(), vec![c.clone()]);
  deps.insert(c.clone(), vec![]);

  let result = reconcile(
    &DesiredState::new(vec![a.clone()]),
    &ActualState::new(vec![a, b.clone(), c], deps),
  )
  .unwrap();

  assert!(result.missing.is_empty());
  assert_eq!(result.extra, vec![b]);
}
