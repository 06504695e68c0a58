//! Implementation of the `pkgsync snapshot` command.
//!
//! Queries brew, asdf and npm once and writes the result as JSON, for later use with
//! `pkgsync check --inventory`.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context as _, Result};

use pkgsync_lib::inventory::InventorySnapshot;
use pkgsync_lib::paths;

use super::runtime;
use crate::output::{print_stat, print_success};

pub fn cmd_snapshot(output: Option<&Path>) -> Result<ExitCode> {
  let path = output.map(Path::to_path_buf).unwrap_or_else(paths::snapshot_path);

  let snapshot = runtime()?
    .block_on(InventorySnapshot::collect())
    .context("Failed to query installed packages")?;
  snapshot.save(&path)?;

  print_success(&format!("Wrote {}", path.display()));
  print_stat("brew packages", &snapshot.brew.installed.len().to_string());
  print_stat("asdf plugins", &snapshot.asdf.len().to_string());
  print_stat("npm packages", &snapshot.npm.len().to_string());
  Ok(ExitCode::SUCCESS)
}
