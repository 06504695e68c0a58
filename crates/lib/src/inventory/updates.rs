//! Available updates across package managers.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{InventoryError, brew, npm, optional};

/// Outdated brew and global npm packages.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutdatedReport {
  pub brew: brew::Outdated,
  #[serde(default)]
  pub npm: Vec<npm::OutdatedPackage>,
}

impl OutdatedReport {
  /// Query brew and npm concurrently. npm is skipped with a warning when not installed.
  pub async fn collect() -> Result<Self, InventoryError> {
    let (brew, npm) = tokio::try_join!(brew::outdated(), optional(npm::outdated()))?;
    let report = Self { brew, npm };
    info!(count = report.len(), "collected outdated packages");
    Ok(report)
  }

  pub fn is_empty(&self) -> bool {
    self.brew.is_empty() && self.npm.is_empty()
  }

  pub fn len(&self) -> usize {
    self.brew.len() + self.npm.len()
  }
}
