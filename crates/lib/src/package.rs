//! Package identity and the two state snapshots the reconciler compares.
//!
//! - [`Package`]: a brew formula or cask, identified by name and kind
//! - [`DesiredState`]: what the manifest asks for
//! - [`ActualState`]: what is installed, plus the dependency edges between installed packages

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// A formula or cask.
///
/// Equality and hashing cover both fields, so `wget` the formula and `wget` the cask
/// are distinct packages.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Package {
  pub name: String,
  #[serde(default)]
  pub is_cask: bool,
}

impl Package {
  pub fn formula(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      is_cask: false,
    }
  }

  pub fn cask(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      is_cask: true,
    }
  }

  /// Kind label used in brew flags and human output.
  pub fn kind(&self) -> &'static str {
    if self.is_cask { "cask" } else { "formula" }
  }
}

impl fmt::Display for Package {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.is_cask {
      write!(f, "{} (cask)", self.name)
    } else {
      write!(f, "{}", self.name)
    }
  }
}

/// Direct dependency edges, keyed by the depending package.
pub type DepsMap = HashMap<Package, Vec<Package>>;

/// Packages the manifest declares, in declaration order.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredState {
  pub packages: Vec<Package>,
}

impl DesiredState {
  /// Repeated packages keep their first position.
  pub fn new(packages: Vec<Package>) -> Self {
    let mut seen = HashSet::new();
    let packages = packages.into_iter().filter(|pkg| seen.insert(pkg.clone())).collect();
    Self { packages }
  }
}

/// Installed packages and their dependency edges.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActualState {
  pub packages: Vec<Package>,
  pub deps: DepsMap,
}

impl ActualState {
  pub fn new(packages: Vec<Package>, deps: DepsMap) -> Self {
    Self { packages, deps }
  }

  /// Installed packages that have no entry in the dependency map.
  ///
  /// An empty result means every installed package can be expanded during
  /// reconciliation.
  pub fn unmapped(&self) -> Vec<Package> {
    self
      .packages
      .iter()
      .filter(|pkg| !self.deps.contains_key(*pkg))
      .cloned()
      .collect()
  }
}
