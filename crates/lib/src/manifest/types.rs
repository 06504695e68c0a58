//! Manifest file types.
//!
//! The manifest is a YAML document describing, per host, which packages should be
//! present. Hosts may pull in named `shared` blocks with `use`.
//!
//! # Example
//!
//! ```yaml
//! hosts:
//!   galois:
//!     use: [base, node-dev]
//!     homebrew:
//!       formulae: [deno]
//!       casks: [docker, visual-studio-code]
//! shared:
//!   base:
//!     homebrew:
//!       formulae: [git, go]
//!       casks: [1password]
//!   node-dev:
//!     asdf:
//!       nodejs: ["20.0.0", lts]
//!     npm: [ts-node, typescript]
//! ```
//!
//! Maps use [`BTreeMap`] so iteration (and therefore violation reports and resolved
//! output) is deterministic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::package::DesiredState;
use crate::versions::VersionSpec;

/// The complete manifest file.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
  #[serde(default)]
  pub hosts: BTreeMap<String, HostConfig>,
  #[serde(default)]
  pub shared: BTreeMap<String, PackageConfig>,
}

/// Brew packages, split by kind.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HomebrewConfig {
  #[serde(default)]
  pub formulae: Vec<String>,
  #[serde(default)]
  pub casks: Vec<String>,
}

/// A reusable block of package declarations.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageConfig {
  #[serde(default)]
  pub homebrew: HomebrewConfig,
  /// Plugin name to version specs, in preference order.
  #[serde(default)]
  pub asdf: BTreeMap<String, Vec<String>>,
  #[serde(default)]
  pub npm: Vec<String>,
}

/// A host entry: its own packages plus the shared blocks it uses.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostConfig {
  #[serde(default, rename = "use")]
  pub uses: Vec<String>,
  #[serde(default)]
  pub homebrew: HomebrewConfig,
  #[serde(default)]
  pub asdf: BTreeMap<String, Vec<String>>,
  #[serde(default)]
  pub npm: Vec<String>,
}

impl HostConfig {
  /// The host's own declarations, without the shared blocks.
  pub fn own_packages(&self) -> PackageConfig {
    PackageConfig {
      homebrew: self.homebrew.clone(),
      asdf: self.asdf.clone(),
      npm: self.npm.clone(),
    }
  }
}

/// Everything one host wants, with shared blocks merged in.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedConfig {
  pub host: String,
  /// Formulae first, then casks, each in first-declared order.
  pub desired: DesiredState,
  pub asdf: BTreeMap<String, Vec<VersionSpec>>,
  /// Sorted by basename.
  pub npm: Vec<String>,
}
