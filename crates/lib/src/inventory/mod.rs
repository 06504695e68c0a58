//! Actual-state providers.
//!
//! Each submodule wraps one package manager's read-only listing commands and parses
//! their output into plain data:
//! - [`brew`]: installed formulae/casks and their dependency edges
//! - [`asdf`]: plugins and installed versions
//! - [`npm`]: global packages
//! - [`snapshot`]: the aggregate, serializable to JSON for offline checks
//! - [`updates`]: packages with newer versions available (brew and npm)
//!
//! Parsing is kept separate from process execution so it can be tested without the
//! tools installed. Nothing here modifies the system.

pub mod asdf;
pub mod brew;
pub mod npm;
pub mod snapshot;
pub mod updates;

use std::io;
use std::path::PathBuf;
use std::process::Output;

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::package::{ActualState, Package};

pub use snapshot::{DepsEntry, InventorySnapshot, SNAPSHOT_VERSION};
pub use updates::OutdatedReport;

/// Errors raised while collecting or loading an inventory.
#[derive(Debug, Error)]
pub enum InventoryError {
  #[error("'{program}' not found on PATH")]
  ToolNotFound { program: String },

  #[error("failed to run '{program}': {source}")]
  Spawn {
    program: String,
    #[source]
    source: io::Error,
  },

  #[error("command '{cmd}' failed with exit code {code:?}: {stderr}")]
  CmdFailed {
    cmd: String,
    code: Option<i32>,
    stderr: String,
  },

  #[error("cannot parse output of '{cmd}': {message}")]
  Parse { cmd: String, message: String },

  #[error(
    "dependency data is incomplete: {} installed package(s) have no dependency entry: {}",
    missing.len(),
    missing.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
  )]
  DependencyMapInconsistency { missing: Vec<Package> },

  #[error("failed to read inventory snapshot {}: {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to write inventory snapshot {}: {source}", path.display())]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("invalid inventory snapshot: {0}")]
  Json(#[source] serde_json::Error),

  #[error("unsupported inventory snapshot version {0}, expected {SNAPSHOT_VERSION}")]
  UnsupportedVersion(u32),
}

/// Run a listing command and return its trimmed stdout.
///
/// A non-zero exit is [`InventoryError::CmdFailed`] carrying stderr, so callers can
/// recognise tool-specific "nothing installed" failures.
pub async fn run_tool(program: &str, args: &[&str]) -> Result<String, InventoryError> {
  let (cmd, output) = execute(program, args).await?;
  if !output.status.success() {
    return Err(cmd_failed(cmd, &output));
  }
  Ok(stdout_of(&cmd, &output))
}

/// Like [`run_tool`], for report commands that exit with `report_code` when they have
/// something to report (`npm outdated` exits 1 when updates exist).
///
/// `report_code` counts as success only when stdout is non-empty.
pub async fn run_tool_reporting(program: &str, args: &[&str], report_code: i32) -> Result<String, InventoryError> {
  let (cmd, output) = execute(program, args).await?;
  let reported = output.status.code() == Some(report_code) && !output.stdout.trim_ascii().is_empty();
  if !output.status.success() && !reported {
    return Err(cmd_failed(cmd, &output));
  }
  if reported {
    debug!(cmd = %cmd, code = report_code, "tool reported findings");
  }
  Ok(stdout_of(&cmd, &output))
}

async fn execute(program: &str, args: &[&str]) -> Result<(String, Output), InventoryError> {
  let cmd = std::iter::once(program).chain(args.iter().copied()).collect::<Vec<_>>().join(" ");
  debug!(cmd = %cmd, "running tool");

  let output = Command::new(program)
    .args(args)
    .kill_on_drop(true)
    .output()
    .await
    .map_err(|source| match source.kind() {
      io::ErrorKind::NotFound => InventoryError::ToolNotFound {
        program: program.to_string(),
      },
      _ => InventoryError::Spawn {
        program: program.to_string(),
        source,
      },
    })?;
  Ok((cmd, output))
}

fn cmd_failed(cmd: String, output: &Output) -> InventoryError {
  let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
  if !stderr.is_empty() {
    debug!(stderr = %stderr, "tool stderr");
  }
  InventoryError::CmdFailed {
    cmd,
    code: output.status.code(),
    stderr,
  }
}

fn stdout_of(cmd: &str, output: &Output) -> String {
  let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
  debug!(cmd = %cmd, bytes = stdout.len(), "tool finished");
  stdout
}

/// Run an optional provider, treating a tool missing from PATH as "nothing installed".
pub(crate) async fn optional<T: Default>(
  collect: impl Future<Output = Result<T, InventoryError>>,
) -> Result<T, InventoryError> {
  match collect.await {
    Err(InventoryError::ToolNotFound { program }) => {
      warn!(program = %program, "tool not installed, skipping");
      Ok(T::default())
    }
    other => other,
  }
}

/// Every installed package must have a dependency entry, even an empty one.
///
/// The reconciler treats absent keys as leaves; that is only sound when the provider
/// actually reported on every installed package.
pub fn check_consistency(actual: &ActualState) -> Result<(), InventoryError> {
  let missing = actual.unmapped();
  if missing.is_empty() {
    return Ok(());
  }
  for pkg in &missing {
    warn!(package = %pkg.name, kind = pkg.kind(), "installed package missing from dependency data");
  }
  Err(InventoryError::DependencyMapInconsistency { missing })
}

/// Non-empty lines, trimmed.
pub(crate) fn non_empty_lines(output: &str) -> impl Iterator<Item = &str> {
  output.lines().map(str::trim).filter(|line| !line.is_empty())
}
