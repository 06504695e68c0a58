//! Serializable inventory snapshots.
//!
//! A snapshot captures everything the live providers report so a check can run
//! later, or on another machine, without shelling out.
//!
//! # Format
//!
//! ```json
//! {
//!   "version": 1,
//!   "brew": {
//!     "installed": [{ "name": "git", "is_cask": false }],
//!     "deps": [{ "name": "git", "is_cask": false, "deps": [{ "name": "pcre2", "is_cask": false }] }]
//!   },
//!   "asdf": { "nodejs": ["20.11.1"] },
//!   "npm": ["typescript"]
//! }
//! ```
//!
//! Dependency edges are stored as a list because JSON object keys must be strings.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{InventoryError, asdf, brew, check_consistency, npm, optional};
use crate::package::{ActualState, DepsMap, Package};

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// One package and its direct dependencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepsEntry {
  #[serde(flatten)]
  pub package: Package,
  #[serde(default)]
  pub deps: Vec<Package>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrewSnapshot {
  #[serde(default)]
  pub installed: Vec<Package>,
  #[serde(default)]
  pub deps: Vec<DepsEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySnapshot {
  pub version: u32,
  #[serde(default)]
  pub brew: BrewSnapshot,
  /// Plugin name to installed versions.
  #[serde(default)]
  pub asdf: BTreeMap<String, Vec<String>>,
  #[serde(default)]
  pub npm: Vec<String>,
}

impl Default for InventorySnapshot {
  fn default() -> Self {
    Self {
      version: SNAPSHOT_VERSION,
      brew: BrewSnapshot::default(),
      asdf: BTreeMap::new(),
      npm: Vec::new(),
    }
  }
}

impl InventorySnapshot {
  pub fn from_parts(actual: &ActualState, asdf: BTreeMap<String, Vec<String>>, npm: Vec<String>) -> Self {
    let mut deps: Vec<DepsEntry> = actual
      .deps
      .iter()
      .map(|(package, deps)| DepsEntry {
        package: package.clone(),
        deps: deps.clone(),
      })
      .collect();
    deps.sort_by(|a, b| a.package.cmp(&b.package));

    Self {
      version: SNAPSHOT_VERSION,
      brew: BrewSnapshot {
        installed: actual.packages.clone(),
        deps,
      },
      asdf,
      npm,
    }
  }

  /// Query every provider.
  ///
  /// brew is required. asdf and npm are skipped with a warning when the tool is not
  /// installed.
  pub async fn collect() -> Result<Self, InventoryError> {
    let (actual, asdf, npm) = tokio::try_join!(brew::collect(), optional(asdf::collect()), optional(npm::collect()))?;
    Ok(Self::from_parts(&actual, asdf, npm))
  }

  /// The brew part as reconciler input, checked for consistency.
  pub fn to_actual(&self) -> Result<ActualState, InventoryError> {
    let deps: DepsMap = self
      .brew
      .deps
      .iter()
      .map(|entry| (entry.package.clone(), entry.deps.clone()))
      .collect();
    let actual = ActualState::new(self.brew.installed.clone(), deps);
    check_consistency(&actual)?;
    Ok(actual)
  }

  pub fn load(path: &Path) -> Result<Self, InventoryError> {
    let contents = fs::read_to_string(path).map_err(|source| InventoryError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    let snapshot: InventorySnapshot = serde_json::from_str(&contents).map_err(InventoryError::Json)?;
    if snapshot.version != SNAPSHOT_VERSION {
      return Err(InventoryError::UnsupportedVersion(snapshot.version));
    }
    Ok(snapshot)
  }

  /// Write pretty JSON, creating parent directories.
  pub fn save(&self, path: &Path) -> Result<(), InventoryError> {
    let write_err = |source| InventoryError::Write {
      path: path.to_path_buf(),
      source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
      fs::create_dir_all(parent).map_err(write_err)?;
    }
    let json = serde_json::to_string_pretty(self).map_err(InventoryError::Json)?;
    fs::write(path, json + "\n").map_err(write_err)?;
    info!(path = %path.display(), "wrote inventory snapshot");
    Ok(())
  }
}
