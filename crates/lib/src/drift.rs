//! Whole-host drift: brew, asdf and npm compared against one resolved manifest host.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::inventory::{InventoryError, InventorySnapshot};
use crate::manifest::ResolvedConfig;
use crate::package::{ActualState, DepsMap, DesiredState, Package};
use crate::reconcile::{ReconcileError, Reconciliation, reconcile};
use crate::versions::{VersionReport, check_versions};

#[derive(Debug, Error)]
pub enum DriftError {
  #[error(transparent)]
  Reconcile(#[from] ReconcileError),

  #[error(transparent)]
  Inventory(#[from] InventoryError),
}

/// Missing and extraneous entries for a flat namespace (asdf plugins, npm packages).
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameDrift {
  pub missing: Vec<String>,
  pub extra: Vec<String>,
}

impl NameDrift {
  pub fn is_empty(&self) -> bool {
    self.missing.is_empty() && self.extra.is_empty()
  }

  /// Run names through the package reconciler with no dependency edges.
  fn compute(desired: &[String], installed: &[String]) -> Result<Self, ReconcileError> {
    let as_packages = |names: &[String]| names.iter().map(Package::formula).collect::<Vec<_>>();
    let installed = as_packages(installed);
    let deps: DepsMap = installed.iter().map(|pkg| (pkg.clone(), Vec::new())).collect();

    let result = reconcile(
      &DesiredState::new(as_packages(desired)),
      &ActualState::new(installed, deps),
    )?;
    let names = |pkgs: Vec<Package>| -> Vec<String> { pkgs.into_iter().map(|p| p.name).collect() };
    Ok(Self {
      missing: names(result.missing),
      extra: names(result.extra),
    })
  }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriftReport {
  pub host: String,
  pub brew: Reconciliation,
  pub asdf_plugins: NameDrift,
  /// One report per desired plugin that is installed. A missing plugin shows up in
  /// `asdf_plugins` only.
  pub asdf_versions: BTreeMap<String, VersionReport>,
  pub npm: NameDrift,
}

impl DriftReport {
  pub fn compute(resolved: &ResolvedConfig, inventory: &InventorySnapshot) -> Result<Self, DriftError> {
    let actual = inventory.to_actual()?;
    let brew = reconcile(&resolved.desired, &actual)?;

    let desired_plugins: Vec<String> = resolved.asdf.keys().cloned().collect();
    let installed_plugins: Vec<String> = inventory.asdf.keys().cloned().collect();
    let asdf_plugins = NameDrift::compute(&desired_plugins, &installed_plugins)?;

    let asdf_versions = resolved
      .asdf
      .iter()
      .filter_map(|(plugin, specs)| {
        let installed = inventory.asdf.get(plugin)?;
        Some((plugin.clone(), check_versions(specs, installed)))
      })
      .collect();

    let npm = NameDrift::compute(&resolved.npm, &inventory.npm)?;

    let report = Self {
      host: resolved.host.clone(),
      brew,
      asdf_plugins,
      asdf_versions,
      npm,
    };
    debug!(host = %report.host, clean = report.is_clean(), "computed drift report");
    Ok(report)
  }

  /// True when nothing needs installing or removing.
  ///
  /// `latest`/`lts` specs that could not be checked do not count as drift.
  pub fn is_clean(&self) -> bool {
    self.brew.is_empty()
      && self.asdf_plugins.is_empty()
      && self.asdf_versions.values().all(VersionReport::is_clean)
      && self.npm.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::manifest::Manifest;

  const MANIFEST: &str = r#"
hosts:
  galois:
    use: [base]
    asdf:
      nodejs: ["20", lts]
      python: ["3.12"]
    npm: [typescript]
shared:
  base:
    homebrew:
      formulae: [git]
      casks: [vlc]
"#;

  fn inventory() -> InventorySnapshot {
    serde_json::from_str(
      r#"{
        "version": 1,
        "brew": {
          "installed": [{"name": "git"}, {"name": "pcre2"}, {"name": "vlc", "is_cask": true}],
          "deps": [
            {"name": "git", "deps": [{"name": "pcre2"}]},
            {"name": "pcre2"},
            {"name": "vlc", "is_cask": true}
          ]
        },
        "asdf": {"nodejs": ["18.19.0", "20.11.1"], "ruby": ["3.3.0"]},
        "npm": ["corepack", "typescript"]
      }"#,
    )
    .unwrap()
  }

  #[test]
  fn report_covers_every_provider() {
    let resolved = Manifest::from_yaml(MANIFEST).unwrap().resolve("galois").unwrap();
    let report = DriftReport::compute(&resolved, &inventory()).unwrap();

    assert!(report.brew.is_empty());
    assert_eq!(report.asdf_plugins.missing, vec!["python"]);
    assert_eq!(report.asdf_plugins.extra, vec!["ruby"]);

    let node = &report.asdf_versions["nodejs"];
    assert_eq!(node.satisfied.len(), 1);
    // lts is unverified, so 18.19.0 is not flagged.
    assert!(node.extra.is_empty());

    // The missing plugin gets `plugin add`, not a version check.
    assert!(!report.asdf_versions.contains_key("python"));

    assert_eq!(report.npm.missing, Vec::<String>::new());
    assert_eq!(report.npm.extra, vec!["corepack"]);
    assert!(!report.is_clean());
  }

  #[test]
  fn matching_host_is_clean() {
    let manifest = "hosts:\n  solo:\n    homebrew:\n      formulae: [git]\n";
    let resolved = Manifest::from_yaml(manifest).unwrap().resolve("solo").unwrap();
    let inventory: InventorySnapshot = serde_json::from_str(
      r#"{"version": 1, "brew": {"installed": [{"name": "git"}], "deps": [{"name": "git"}]}}"#,
    )
    .unwrap();

    assert!(DriftReport::compute(&resolved, &inventory).unwrap().is_clean());
  }

  #[test]
  fn inconsistent_inventory_is_error() {
    let resolved = ResolvedConfig::default();
    let inventory: InventorySnapshot =
      serde_json::from_str(r#"{"version": 1, "brew": {"installed": [{"name": "git"}]}}"#).unwrap();

    assert!(matches!(
      DriftReport::compute(&resolved, &inventory),
      Err(DriftError::Inventory(InventoryError::DependencyMapInconsistency { .. }))
    ));
  }
}
