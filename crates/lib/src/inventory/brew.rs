//! Homebrew inventory.
//!
//! Installed names come from `brew ls --full-name`, so tapped packages appear as
//! `tap/repo/name`. Dependency edges come from `brew deps --installed`, which prints
//! one `name: dep dep ...` line per installed package. Dependencies are always
//! formulae; casks never appear on the right-hand side.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{InventoryError, check_consistency, non_empty_lines, run_tool};
use crate::package::{ActualState, DepsMap, Package};

const BREW: &str = "brew";

fn kind_flag(is_cask: bool) -> &'static str {
  if is_cask { "--cask" } else { "--formula" }
}

/// Parse `brew ls --full-name` output for one kind.
pub fn parse_installed(output: &str, is_cask: bool) -> Vec<Package> {
  non_empty_lines(output)
    .map(|name| Package {
      name: name.to_string(),
      is_cask,
    })
    .collect()
}

/// Parse `brew deps --installed` output for one kind into `deps`.
pub fn parse_deps(output: &str, is_cask: bool, deps: &mut DepsMap) -> Result<(), InventoryError> {
  for line in non_empty_lines(output) {
    let (name, rest) = line.split_once(':').ok_or_else(|| InventoryError::Parse {
      cmd: format!("brew deps --installed {}", kind_flag(is_cask)),
      message: format!("expected 'name: deps', got '{}'", line),
    })?;
    let pkg = Package {
      name: name.trim().to_string(),
      is_cask,
    };
    deps.insert(pkg, rest.split_whitespace().map(Package::formula).collect());
  }
  Ok(())
}

/// Query brew for installed packages and dependency edges.
///
/// The four listing commands run concurrently. The result has passed
/// [`check_consistency`].
pub async fn collect() -> Result<ActualState, InventoryError> {
  let (formulae, casks, formula_deps, cask_deps) = tokio::try_join!(
    run_tool(BREW, &["ls", "--full-name", "--formula"]),
    run_tool(BREW, &["ls", "--full-name", "--cask"]),
    run_tool(BREW, &["deps", "--installed", "--formula"]),
    run_tool(BREW, &["deps", "--installed", "--cask"]),
  )?;

  let mut packages = parse_installed(&formulae, false);
  packages.extend(parse_installed(&casks, true));

  let mut deps = DepsMap::new();
  parse_deps(&formula_deps, false, &mut deps)?;
  parse_deps(&cask_deps, true, &mut deps)?;

  let actual = ActualState::new(packages, deps);
  check_consistency(&actual)?;
  info!(installed = actual.packages.len(), edges = actual.deps.len(), "collected brew inventory");
  Ok(actual)
}

/// One entry of `brew outdated --json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutdatedPackage {
  pub name: String,
  #[serde(default)]
  pub installed_versions: Vec<String>,
  pub current_version: String,
}

/// Parsed `brew outdated --json`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outdated {
  #[serde(default)]
  pub formulae: Vec<OutdatedPackage>,
  #[serde(default)]
  pub casks: Vec<OutdatedPackage>,
}

impl Outdated {
  pub fn is_empty(&self) -> bool {
    self.formulae.is_empty() && self.casks.is_empty()
  }

  pub fn len(&self) -> usize {
    self.formulae.len() + self.casks.len()
  }
}

pub fn parse_outdated(output: &str) -> Result<Outdated, InventoryError> {
  serde_json::from_str(output).map_err(|err| InventoryError::Parse {
    cmd: "brew outdated --json".to_string(),
    message: err.to_string(),
  })
}

/// Packages with a newer version available, from local brew metadata.
///
/// Does not run `brew update`; the answer is as fresh as the last update.
pub async fn outdated() -> Result<Outdated, InventoryError> {
  let output = run_tool(BREW, &["outdated", "--json"]).await?;
  let outdated = parse_outdated(&output)?;
  info!(count = outdated.len(), "checked brew for outdated packages");
  Ok(outdated)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn installed_keeps_full_names() {
    let output = "git\nhashicorp/tap/terraform\n\n";
    assert_eq!(
      parse_installed(output, false),
      vec![Package::formula("git"), Package::formula("hashicorp/tap/terraform")]
    );
    assert_eq!(parse_installed("vlc\n", true), vec![Package::cask("vlc")]);
  }

  #[test]
  fn deps_lines_keep_key_kind() {
    let mut deps = DepsMap::new();
    parse_deps("git: gettext pcre2\npcre2:\n", false, &mut deps).unwrap();
    parse_deps("wireshark: libpcap\nvlc:\n", true, &mut deps).unwrap();

    assert_eq!(
      deps[&Package::formula("git")],
      vec![Package::formula("gettext"), Package::formula("pcre2")]
    );
    assert!(deps[&Package::formula("pcre2")].is_empty());
    assert_eq!(deps[&Package::cask("wireshark")], vec![Package::formula("libpcap")]);
    assert!(deps.contains_key(&Package::cask("vlc")));
    assert!(!deps.contains_key(&Package::formula("vlc")));
  }

  #[test]
  fn deps_line_without_colon_is_error() {
    let mut deps = DepsMap::new();
    let err = parse_deps("git gettext\n", false, &mut deps).unwrap_err();
    assert!(matches!(err, InventoryError::Parse { .. }));
    assert!(err.to_string().contains("brew deps --installed --formula"));
  }

  #[test]
  fn outdated_json() {
    let output = r#"{
      "formulae": [
        {"name": "node", "installed_versions": ["21.7.3"], "current_version": "22.1.0", "pinned": false}
      ],
      "casks": []
    }"#;
    let outdated = parse_outdated(output).unwrap();
    assert_eq!(outdated.len(), 1);
    assert_eq!(outdated.formulae[0].name, "node");
    assert_eq!(outdated.formulae[0].current_version, "22.1.0");
  }

  #[test]
  fn outdated_garbage_is_parse_error() {
    assert!(matches!(parse_outdated("nope"), Err(InventoryError::Parse { .. })));
  }
}
