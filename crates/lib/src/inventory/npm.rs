//! Global npm packages.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{InventoryError, run_tool, run_tool_reporting};

const NPM: &str = "npm";

/// `npm outdated` exit status when updates exist.
const UPDATES_AVAILABLE: i32 = 1;

#[derive(Debug, Deserialize)]
struct NpmLs {
  #[serde(default)]
  dependencies: BTreeMap<String, serde_json::Value>,
}

/// Parse `npm ls -g --json --depth=0`, returning package names sorted.
pub fn parse_global(output: &str) -> Result<Vec<String>, InventoryError> {
  let parsed: NpmLs = serde_json::from_str(output).map_err(|err| InventoryError::Parse {
    cmd: "npm ls -g --json --depth=0".to_string(),
    message: err.to_string(),
  })?;
  Ok(parsed.dependencies.into_keys().collect())
}

pub async fn collect() -> Result<Vec<String>, InventoryError> {
  let output = run_tool(NPM, &["ls", "-g", "--json", "--depth=0"]).await?;
  let packages = parse_global(&output)?;
  info!(packages = packages.len(), "collected npm inventory");
  Ok(packages)
}

/// One entry of `npm outdated -g --json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutdatedPackage {
  pub name: String,
  /// Absent when npm lists a package it cannot find installed.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub current: Option<String>,
  #[serde(default)]
  pub wanted: String,
  #[serde(default)]
  pub latest: String,
}

#[derive(Debug, Deserialize)]
struct OutdatedEntry {
  #[serde(default)]
  current: Option<String>,
  #[serde(default)]
  wanted: String,
  #[serde(default)]
  latest: String,
}

/// Parse the `{name: {current, wanted, latest}}` map, sorted by name. Empty output
/// means nothing is outdated.
pub fn parse_outdated(output: &str) -> Result<Vec<OutdatedPackage>, InventoryError> {
  if output.trim().is_empty() {
    return Ok(Vec::new());
  }
  let parsed: BTreeMap<String, OutdatedEntry> = serde_json::from_str(output).map_err(|err| InventoryError::Parse {
    cmd: "npm outdated -g --json".to_string(),
    message: err.to_string(),
  })?;
  Ok(
    parsed
      .into_iter()
      .map(|(name, entry)| OutdatedPackage {
        name,
        current: entry.current,
        wanted: entry.wanted,
        latest: entry.latest,
      })
      .collect(),
  )
}

/// Global packages with a newer version published. Does not install anything.
pub async fn outdated() -> Result<Vec<OutdatedPackage>, InventoryError> {
  let output = run_tool_reporting(NPM, &["outdated", "-g", "--json"], UPDATES_AVAILABLE).await?;
  let outdated = parse_outdated(&output)?;
  info!(count = outdated.len(), "checked npm for outdated packages");
  Ok(outdated)
}
