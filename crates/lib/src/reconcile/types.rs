//! Result and error types for reconciliation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::package::Package;

/// Errors raised by the reconciler itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
  /// Every extraneous candidate is a dependency of another candidate, so no root
  /// can be reported. Only a dependency cycle made entirely of unneeded packages
  /// produces this.
  #[error(
    "found {} extraneous package(s) but no removable root; the dependency data has a cycle among: {}",
    candidates.len(),
    join_names(candidates)
  )]
  MinimizationContradiction { candidates: Vec<Package> },
}

fn join_names(pkgs: &[Package]) -> String {
  pkgs.iter().map(|p| p.name.as_str()).collect::<Vec<_>>().join(", ")
}

/// What has to change to bring the installed set in line with the desired set.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
  /// Desired but not installed, in desired order.
  pub missing: Vec<Package>,

  /// Installed, not required, and not a dependency of another extraneous
  /// package, in installed order.
  pub extra: Vec<Package>,
}

impl Reconciliation {
  /// Returns true if nothing is missing or extraneous.
  pub fn is_empty(&self) -> bool {
    self.missing.is_empty() && self.extra.is_empty()
  }

  pub fn change_count(&self) -> usize {
    self.missing.len() + self.extra.len()
  }
}

/// Why an installed package was kept or reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
  /// Listed in the desired set.
  Desired,
  /// Reachable from the desired set through dependency edges.
  Dependency,
  /// Unneeded and reported for removal.
  Extraneous,
  /// Unneeded, but removing `by` already covers it.
  Shadowed { by: Vec<Package> },
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn reconciliation_is_empty() {
    assert!(Reconciliation::default().is_empty());

    let with_missing = Reconciliation {
      missing: vec![Package::formula("wget")],
      ..Default::default()
    };
    assert!(!with_missing.is_empty());
    assert_eq!(with_missing.change_count(), 1);
  }

  #[test]
  fn contradiction_message_names_candidates() {
    let err = ReconcileError::MinimizationContradiction {
      candidates: vec![Package::formula("x"), Package::formula("y")],
    };
    let msg = err.to_string();
    assert!(msg.starts_with("found 2 extraneous package(s)"));
    assert!(msg.ends_with("x, y"));
  }

  #[test]
  fn verdict_serializes_tagged() {
    let v = Verdict::Shadowed {
      by: vec![Package::formula("b")],
    };
    let json = serde_json::to_value(&v).unwrap();
    assert_eq!(json["verdict"], "shadowed");
    assert_eq!(json["by"][0]["name"], "b");
  }
}
