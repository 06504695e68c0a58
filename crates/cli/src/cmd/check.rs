//! Implementation of the `pkgsync check` command.
//!
//! Resolves the selected host from the manifest, gathers the installed inventory
//! (live, or from a snapshot file) and reports what is missing or extraneous, along
//! with the commands that would fix it. Nothing is installed or removed.

use std::fmt::Display;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use serde::Serialize;
use tracing::info;

use pkgsync_lib::drift::DriftReport;
use pkgsync_lib::inventory::InventorySnapshot;
use pkgsync_lib::manifest::ResolvedConfig;
use pkgsync_lib::package::Package;
use pkgsync_lib::reconcile::{Verdict, explain};
use pkgsync_lib::suggest::{Action, Suggestions};

use super::{Context, runtime};
use crate::output::{
  format_list, print_command, print_drift, print_info, print_json, print_stat, print_success, print_warning, symbols,
};

#[derive(Serialize)]
struct CheckOutput<'a> {
  clean: bool,
  report: &'a DriftReport,
  /// Grouped commands.
  install: Vec<String>,
  uninstall: Vec<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  verdicts: Option<Vec<VerdictEntry>>,
}

#[derive(Serialize)]
struct VerdictEntry {
  #[serde(flatten)]
  package: Package,
  #[serde(flatten)]
  verdict: Verdict,
}

/// Fix commands for each part of a report.
struct Fixes {
  brew: (Suggestions, Suggestions),
  asdf_plugins: (Suggestions, Suggestions),
  asdf_versions: Vec<(String, (Suggestions, Suggestions))>,
  npm: (Suggestions, Suggestions),
}

impl Fixes {
  fn from_report(report: &DriftReport) -> Self {
    Self {
      brew: (
        Suggestions::brew(Action::Install, &report.brew.missing),
        Suggestions::brew(Action::Uninstall, &report.brew.extra),
      ),
      asdf_plugins: (
        Suggestions::asdf_plugins(Action::Install, &report.asdf_plugins.missing),
        Suggestions::asdf_plugins(Action::Uninstall, &report.asdf_plugins.extra),
      ),
      asdf_versions: report
        .asdf_versions
        .iter()
        .map(|(plugin, versions)| {
          (
            plugin.clone(),
            (
              Suggestions::asdf_install(plugin, &versions.missing),
              Suggestions::asdf_uninstall(plugin, &versions.extra),
            ),
          )
        })
        .collect(),
      npm: (
        Suggestions::npm(Action::Install, &report.npm.missing),
        Suggestions::npm(Action::Uninstall, &report.npm.extra),
      ),
    }
  }

  /// Grouped commands, installs then removals, in provider order.
  fn grouped(&self) -> (Vec<String>, Vec<String>) {
    let mut install = Vec::new();
    let mut uninstall = Vec::new();
    let pairs = [&self.brew, &self.asdf_plugins]
      .into_iter()
      .chain(self.asdf_versions.iter().map(|(_, pair)| pair))
      .chain(std::iter::once(&self.npm));
    for (i, u) in pairs {
      install.extend(i.grouped.iter().cloned());
      uninstall.extend(u.grouped.iter().cloned());
    }
    (install, uninstall)
  }
}

/// Execute the check command.
///
/// Returns [`ExitCode::SUCCESS`] when the host matches the manifest and
/// [`ExitCode::FAILURE`] when any drift is found.
pub fn cmd_check(ctx: &Context, inventory: Option<&Path>, json: bool) -> Result<ExitCode> {
  let (_, manifest) = ctx.load_manifest()?;
  let resolved = ctx.resolve(&manifest)?;
  info!(host = %resolved.host, "checking host");

  let snapshot = match inventory {
    Some(path) => InventorySnapshot::load(path)
      .with_context(|| format!("Failed to load inventory {}", path.display()))?,
    None => runtime()?
      .block_on(InventorySnapshot::collect())
      .context("Failed to query installed packages")?,
  };

  let report = DriftReport::compute(&resolved, &snapshot)?;
  let fixes = Fixes::from_report(&report);
  let verdicts = if ctx.verbose {
    Some(brew_verdicts(&resolved, &snapshot)?)
  } else {
    None
  };

  if json {
    let (install, uninstall) = fixes.grouped();
    print_json(&CheckOutput {
      clean: report.is_clean(),
      report: &report,
      install,
      uninstall,
      verdicts,
    })?;
  } else {
    print_report(&report, &fixes);
    if let Some(verdicts) = verdicts {
      print_verdicts(&verdicts);
    }
  }

  Ok(if report.is_clean() {
    ExitCode::SUCCESS
  } else {
    ExitCode::FAILURE
  })
}

fn brew_verdicts(resolved: &ResolvedConfig, snapshot: &InventorySnapshot) -> Result<Vec<VerdictEntry>> {
  let actual = snapshot.to_actual()?;
  Ok(
    explain(&resolved.desired, &actual)
      .into_iter()
      .map(|(package, verdict)| VerdictEntry { package, verdict })
      .collect(),
  )
}

fn print_report(report: &DriftReport, fixes: &Fixes) {
  println!("Host: {}", report.host);
  println!();

  print_section("brew", &report.brew.missing, &report.brew.extra, &fixes.brew);
  print_section(
    "asdf plugins",
    &report.asdf_plugins.missing,
    &report.asdf_plugins.extra,
    &fixes.asdf_plugins,
  );

  for (plugin, plugin_fixes) in &fixes.asdf_versions {
    let Some(versions) = report.asdf_versions.get(plugin) else {
      continue;
    };
    let title = format!("asdf {}", plugin);
    for spec in &versions.unverified {
      print_warning(&format!("{}: '{}' cannot be checked offline", title, spec));
    }
    print_section(&title, &versions.missing, &versions.extra, plugin_fixes);
    for (spec, version) in &versions.satisfied {
      print_stat(&spec.to_string(), &format!("{} {}", symbols::ARROW, version));
    }
  }

  print_section("npm", &report.npm.missing, &report.npm.extra, &fixes.npm);

  println!();
  if report.is_clean() {
    print_success("Everything matches the manifest");
  } else {
    print_drift("Drift found; run the commands above to fix it");
  }
}

fn print_section<M: Display, E: Display>(
  title: &str,
  missing: &[M],
  extra: &[E],
  (install, uninstall): &(Suggestions, Suggestions),
) {
  if missing.is_empty() && extra.is_empty() {
    print_success(&format!("{}: up to date", title));
    return;
  }
  if !missing.is_empty() {
    print_drift(&format!("{}: {} missing: {}", title, missing.len(), format_list(missing)));
    print_suggestions(install);
  }
  if !extra.is_empty() {
    print_drift(&format!("{}: {} extraneous: {}", title, extra.len(), format_list(extra)));
    print_suggestions(uninstall);
  }
}

fn print_suggestions(suggestions: &Suggestions) {
  for command in &suggestions.individual {
    print_command(command);
  }
  if suggestions.grouped.len() < suggestions.individual.len() {
    println!("  or all at once:");
    for command in &suggestions.grouped {
      print_command(command);
    }
  }
}

fn print_verdicts(verdicts: &[VerdictEntry]) {
  println!();
  print_info("brew package verdicts:");
  for entry in verdicts {
    let (symbol, reason) = match &entry.verdict {
      Verdict::Desired => (symbols::INFO, "desired".to_string()),
      Verdict::Dependency => (symbols::INFO, "dependency of a desired package".to_string()),
      Verdict::Extraneous => (symbols::REMOVE, "extraneous".to_string()),
      Verdict::Shadowed { by } => (symbols::REMOVE, format!("removed along with {}", format_list(by))),
    };
    println!("  {} {}: {}", symbol, entry.package, reason);
  }
}
