//! Desired/actual reconciliation.
//!
//! This module computes, for a desired package set and an installed inventory with
//! its dependency graph, which packages are missing and which installed packages
//! can be removed. It performs no I/O and emits no output; callers render the
//! [`Reconciliation`] however they like.

mod closure;
mod extraneous;
mod missing;
mod types;

pub use closure::{RequiredSet, is_required};
pub use extraneous::{explain as explain_packages, extraneous, minimize};
pub use missing::missing;
pub use types::{ReconcileError, Reconciliation, Verdict};

use crate::package::{ActualState, DesiredState, Package};

/// Compute missing and extraneous packages for one snapshot pair.
///
/// The dependency map is expected to have been checked for consistency by the
/// inventory provider; keys absent from it are treated as leaves.
pub fn reconcile(desired: &DesiredState, actual: &ActualState) -> Result<Reconciliation, ReconcileError> {
  Ok(Reconciliation {
    missing: missing(&desired.packages, &actual.packages),
    extra: extraneous(&desired.packages, &actual.packages, &actual.deps)?,
  })
}

/// Per installed package verdicts for verbose reporting.
pub fn explain(desired: &DesiredState, actual: &ActualState) -> Vec<(Package, Verdict)> {
  explain_packages(&desired.packages, &actual.packages, &actual.deps)
}
