//! Shell commands that would fix a drift report.
//!
//! Commands are only rendered, never run. Each set comes in two shapes: one command
//! per package, and the same work grouped into as few commands as possible.

use serde::{Deserialize, Serialize};

use crate::package::Package;
use crate::versions::VersionSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
  Install,
  Uninstall,
}

impl Action {
  fn verb(self) -> &'static str {
    match self {
      Action::Install => "install",
      Action::Uninstall => "uninstall",
    }
  }
}

/// Individual and grouped forms of the same fix.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestions {
  pub individual: Vec<String>,
  pub grouped: Vec<String>,
}

impl Suggestions {
  pub fn is_empty(&self) -> bool {
    self.individual.is_empty()
  }

  /// brew commands, formulae before casks.
  pub fn brew(action: Action, packages: &[Package]) -> Self {
    let (casks, formulae): (Vec<&Package>, Vec<&Package>) = packages.iter().partition(|p| p.is_cask);
    let mut suggestions = Self::default();

    for (flag, group) in [("--formula", &formulae), ("--cask", &casks)] {
      if group.is_empty() {
        continue;
      }
      let names: Vec<&str> = group.iter().map(|p| p.name.as_str()).collect();
      for name in &names {
        suggestions
          .individual
          .push(format!("brew {} {} {}", action.verb(), flag, name));
      }
      suggestions
        .grouped
        .push(format!("brew {} {} {}", action.verb(), flag, names.join(" ")));
    }
    suggestions
  }

  /// `asdf plugin add|remove`.
  pub fn asdf_plugins(action: Action, plugins: &[String]) -> Self {
    let sub = match action {
      Action::Install => "add",
      Action::Uninstall => "remove",
    };
    let individual: Vec<String> = plugins.iter().map(|p| format!("asdf plugin {} {}", sub, p)).collect();
    Self {
      // asdf takes one plugin per call.
      grouped: individual.clone(),
      individual,
    }
  }

  /// `asdf install` for unsatisfied specs of one plugin.
  pub fn asdf_install(plugin: &str, specs: &[VersionSpec]) -> Self {
    let individual: Vec<String> = specs
      .iter()
      .map(|spec| format!("asdf install {} {}", plugin, spec.install_arg()))
      .collect();
    Self {
      grouped: individual.clone(),
      individual,
    }
  }

  /// `asdf uninstall` for installed versions no spec claims.
  pub fn asdf_uninstall(plugin: &str, versions: &[String]) -> Self {
    let individual: Vec<String> = versions
      .iter()
      .map(|version| format!("asdf uninstall {} {}", plugin, version))
      .collect();
    Self {
      grouped: individual.clone(),
      individual,
    }
  }

  /// `npm install -g` / `npm uninstall -g`.
  pub fn npm(action: Action, packages: &[String]) -> Self {
    if packages.is_empty() {
      return Self::default();
    }
    Self {
      individual: packages
        .iter()
        .map(|p| format!("npm {} -g {}", action.verb(), p))
        .collect(),
      grouped: vec![format!("npm {} -g {}", action.verb(), packages.join(" "))],
    }
  }
}
