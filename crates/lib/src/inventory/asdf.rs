//! asdf plugins and installed versions.

use std::collections::BTreeMap;

use tracing::{debug, info};

use super::{InventoryError, run_tool};

const ASDF: &str = "asdf";

/// Printed on stderr (with a failing exit) by newer asdf when a plugin has no versions.
const NO_VERSIONS_MARKERS: [&str; 2] = ["No compatible versions installed", "No versions installed"];

/// Parse `asdf plugin list`.
pub fn parse_plugins(output: &str) -> Vec<String> {
  output.split_whitespace().map(str::to_string).collect()
}

/// Parse `asdf list <plugin>`, dropping the `*` current-version marker.
pub fn parse_versions(output: &str) -> Vec<String> {
  if NO_VERSIONS_MARKERS.iter().any(|marker| output.contains(marker)) {
    return Vec::new();
  }
  let mut versions: Vec<String> = Vec::new();
  for token in output.split_whitespace() {
    let version = token.trim_start_matches('*');
    if !version.is_empty() && !versions.iter().any(|v| v == version) {
      versions.push(version.to_string());
    }
  }
  versions
}

pub async fn plugins() -> Result<Vec<String>, InventoryError> {
  let output = run_tool(ASDF, &["plugin", "list"]).await?;
  Ok(parse_plugins(&output))
}

pub async fn installed_versions(plugin: &str) -> Result<Vec<String>, InventoryError> {
  match run_tool(ASDF, &["list", plugin]).await {
    Ok(output) => Ok(parse_versions(&output)),
    Err(InventoryError::CmdFailed { stderr, .. })
      if NO_VERSIONS_MARKERS.iter().any(|marker| stderr.contains(marker)) =>
    {
      debug!(plugin, "no versions installed");
      Ok(Vec::new())
    }
    Err(err) => Err(err),
  }
}

/// Installed versions for every installed plugin.
pub async fn collect() -> Result<BTreeMap<String, Vec<String>>, InventoryError> {
  let mut installed = BTreeMap::new();
  for plugin in plugins().await? {
    let versions = installed_versions(&plugin).await?;
    installed.insert(plugin, versions);
  }
  info!(plugins = installed.len(), "collected asdf inventory");
  Ok(installed)
}
