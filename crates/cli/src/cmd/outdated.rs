//! Implementation of the `pkgsync outdated` command.

use std::process::ExitCode;

use anyhow::{Context as _, Result};

use pkgsync_lib::inventory::OutdatedReport;

use super::runtime;
use crate::output::{print_info, print_json, print_success, symbols};

/// List outdated brew and global npm packages. Informational only, so always exits 0.
pub fn cmd_outdated(json: bool) -> Result<ExitCode> {
  let report = runtime()?
    .block_on(OutdatedReport::collect())
    .context("Failed to check for outdated packages")?;

  if json {
    print_json(&report)?;
  } else if report.is_empty() {
    print_success("No updates available");
  } else {
    print_info(&format!("{} update(s) available:", report.len()));
    let brew = report
      .brew
      .formulae
      .iter()
      .map(|p| (p, ""))
      .chain(report.brew.casks.iter().map(|p| (p, " (cask)")));
    for (pkg, suffix) in brew {
      println!(
        "  {}{}: {} {} {}",
        pkg.name,
        suffix,
        pkg.installed_versions.join(", "),
        symbols::ARROW,
        pkg.current_version
      );
    }
    for pkg in &report.npm {
      println!(
        "  {} (npm): {} {} {}",
        pkg.name,
        pkg.current.as_deref().unwrap_or("not installed"),
        symbols::ARROW,
        pkg.latest
      );
    }
  }

  Ok(ExitCode::SUCCESS)
}
