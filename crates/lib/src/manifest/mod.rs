//! Desired-state manifest: loading, validation and per-host resolution.
//!
//! The manifest is the only source of the [`DesiredState`] fed to the reconciler.
//! Loading always validates; a manifest that parses but breaks a rule is rejected
//! with the full list of violations.

mod types;
mod validate;

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

pub use types::*;
pub use validate::{compare_by_basename, is_identifier, is_valid_brew_name, validate};

use crate::consts::HOST_ENV;
use crate::package::{DesiredState, Package};
use crate::versions::VersionSpec;

/// Errors that can occur while loading or resolving a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
  #[error("failed to read manifest {}: {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse manifest: {0}")]
  Parse(#[from] serde_yaml::Error),

  #[error("manifest validation failed:\n  {}", violations.join("\n  "))]
  Invalid { violations: Vec<String> },

  #[error("host '{name}' not found in manifest (available: {})", available.join(", "))]
  UnknownHost { name: String, available: Vec<String> },

  #[error("no host selected; pass --host or set {HOST_ENV} (available: {})", available.join(", "))]
  HostNotSelected { available: Vec<String> },
}

impl Manifest {
  /// Read, parse and validate a manifest file.
  pub fn load(path: &Path) -> Result<Self, ManifestError> {
    debug!(path = %path.display(), "loading manifest");
    let contents = fs::read_to_string(path).map_err(|source| ManifestError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    Self::from_yaml(&contents)
  }

  /// Parse and validate manifest text.
  pub fn from_yaml(contents: &str) -> Result<Self, ManifestError> {
    // An empty document is an empty manifest, not a parse error.
    let manifest: Manifest = if contents.trim().is_empty() {
      Manifest::default()
    } else {
      serde_yaml::from_str(contents)?
    };

    let violations = validate(&manifest);
    if !violations.is_empty() {
      return Err(ManifestError::Invalid { violations });
    }
    Ok(manifest)
  }

  /// Pick the host to resolve.
  ///
  /// Order: `requested`, then the `PKGSYNC_HOST` environment variable, then the
  /// only declared host if there is exactly one.
  pub fn select_host(&self, requested: Option<&str>) -> Result<String, ManifestError> {
    let available: Vec<String> = self.hosts.keys().cloned().collect();
    let from_env = std::env::var(HOST_ENV).ok().filter(|v| !v.is_empty());

    match requested.map(str::to_string).or(from_env) {
      Some(name) if self.hosts.contains_key(&name) => Ok(name),
      Some(name) => Err(ManifestError::UnknownHost { name, available }),
      None if available.len() == 1 => Ok(available[0].clone()),
      None => Err(ManifestError::HostNotSelected { available }),
    }
  }

  /// Merge a host with the shared blocks it uses.
  ///
  /// Shared blocks contribute first, in `use` order, then the host's own entries.
  /// Duplicates keep their first position.
  pub fn resolve(&self, host: &str) -> Result<ResolvedConfig, ManifestError> {
    let host_config = self.hosts.get(host).ok_or_else(|| ManifestError::UnknownHost {
      name: host.to_string(),
      available: self.hosts.keys().cloned().collect(),
    })?;

    let own = host_config.own_packages();
    let mut blocks: Vec<&PackageConfig> = Vec::with_capacity(host_config.uses.len() + 1);
    for used in &host_config.uses {
      // validate() guarantees every `use` exists; guard anyway for hand-built manifests.
      let block = self.shared.get(used).ok_or_else(|| ManifestError::Invalid {
        violations: vec![format!(
          "hosts.{}.use: host '{}' references non-existent shared config '{}'",
          host, host, used
        )],
      })?;
      blocks.push(block);
    }
    blocks.push(&own);

    let mut formulae = UniqueList::default();
    let mut casks = UniqueList::default();
    let mut npm = UniqueList::default();
    let mut asdf: BTreeMap<String, UniqueList<VersionSpec>> = BTreeMap::new();

    for block in &blocks {
      formulae.extend(block.homebrew.formulae.iter().map(Package::formula));
      casks.extend(block.homebrew.casks.iter().map(Package::cask));
      npm.extend(block.npm.iter().cloned());
      for (plugin, specs) in &block.asdf {
        let entry = asdf.entry(plugin.clone()).or_default();
        for spec in specs {
          let parsed = spec.parse::<VersionSpec>().map_err(|err| ManifestError::Invalid {
            violations: vec![format!("asdf.{}: {}", plugin, err)],
          })?;
          entry.push(parsed);
        }
      }
    }

    let mut packages = formulae.items;
    packages.extend(casks.items);
    let mut npm = npm.items;
    npm.sort_by(|a, b| compare_by_basename(a, b));

    let resolved = ResolvedConfig {
      host: host.to_string(),
      desired: DesiredState::new(packages),
      asdf: asdf.into_iter().map(|(k, v)| (k, v.items)).collect(),
      npm,
    };
    debug!(
      host,
      packages = resolved.desired.packages.len(),
      asdf_plugins = resolved.asdf.len(),
      npm = resolved.npm.len(),
      "resolved manifest"
    );
    Ok(resolved)
  }
}

/// Insertion-ordered list that drops repeats.
#[derive(Debug)]
struct UniqueList<T> {
  seen: HashSet<T>,
  items: Vec<T>,
}

impl<T> Default for UniqueList<T> {
  fn default() -> Self {
    Self {
      seen: HashSet::new(),
      items: Vec::new(),
    }
  }
}

impl<T: Clone + Eq + std::hash::Hash> UniqueList<T> {
  fn push(&mut self, item: T) {
    if self.seen.insert(item.clone()) {
      self.items.push(item);
    }
  }

  fn extend(&mut self, items: impl IntoIterator<Item = T>) {
    for item in items {
      self.push(item);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;

  const GALOIS: &str = r#"
hosts:
  galois:
    use: [base, node-dev]
    homebrew:
      formulae: [deno, git]
      casks: [docker, visual-studio-code]
    asdf:
      nodejs: ["22"]
shared:
  base:
    homebrew:
      formulae: [git, go]
      casks: [1password]
  node-dev:
    asdf:
      nodejs: ["20.0.0", lts]
    npm: [ts-node, typescript]
"#;

  #[test]
  fn resolve_merges_shared_then_host() {
    let manifest = Manifest::from_yaml(GALOIS).unwrap();
    let resolved = manifest.resolve("galois").unwrap();

    assert_eq!(
      resolved.desired.packages,
      vec![
        Package::formula("git"),
        Package::formula("go"),
        Package::formula("deno"),
        Package::cask("1password"),
        Package::cask("docker"),
        Package::cask("visual-studio-code"),
      ]
    );
    assert_eq!(
      resolved.asdf["nodejs"],
      vec![
        VersionSpec::Prefix("20.0.0".to_string()),
        VersionSpec::Lts,
        VersionSpec::Prefix("22".to_string()),
      ]
    );
    assert_eq!(resolved.npm, vec!["ts-node", "typescript"]);
  }

  #[test]
  fn empty_document_is_empty_manifest() {
    let manifest = Manifest::from_yaml("  \n").unwrap();
    assert!(manifest.hosts.is_empty());
  }

  #[test]
  fn unknown_fields_rejected() {
    let err = Manifest::from_yaml("hosts:\n  a:\n    brew: {}\n").unwrap_err();
    assert!(matches!(err, ManifestError::Parse(_)));
  }

  #[test]
  fn invalid_manifest_lists_violations() {
    let err = Manifest::from_yaml("shared:\n  base:\n    npm: [b, a]\n").unwrap_err();
    match err {
      ManifestError::Invalid { violations } => {
        assert_eq!(violations, vec!["shared.base.npm: 'a' should come before 'b'"]);
      }
      other => panic!("unexpected error: {other}"),
    }
  }

  #[test]
  fn load_missing_file() {
    let err = Manifest::load(Path::new("/nonexistent/pkgsync.yaml")).unwrap_err();
    assert!(matches!(err, ManifestError::Read { .. }));
  }

  #[test]
  fn load_from_disk() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("pkgsync.yaml");
    std::fs::write(&path, GALOIS).unwrap();
    assert!(Manifest::load(&path).unwrap().hosts.contains_key("galois"));
  }

  #[test]
  #[serial]
  fn select_host_prefers_explicit_request() {
    let manifest = Manifest::from_yaml("hosts:\n  a: {}\n  b: {}\n").unwrap();
    temp_env::with_var(HOST_ENV, Some("a"), || {
      assert_eq!(manifest.select_host(Some("b")).unwrap(), "b");
    });
  }

  #[test]
  #[serial]
  fn select_host_falls_back_to_env() {
    let manifest = Manifest::from_yaml("hosts:\n  a: {}\n  b: {}\n").unwrap();
    temp_env::with_var(HOST_ENV, Some("a"), || {
      assert_eq!(manifest.select_host(None).unwrap(), "a");
    });
  }

  #[test]
  #[serial]
  fn select_host_single_host_default() {
    let manifest = Manifest::from_yaml("hosts:\n  only: {}\n").unwrap();
    temp_env::with_var_unset(HOST_ENV, || {
      assert_eq!(manifest.select_host(None).unwrap(), "only");
    });
  }

  #[test]
  #[serial]
  fn select_host_ambiguous() {
    let manifest = Manifest::from_yaml("hosts:\n  a: {}\n  b: {}\n").unwrap();
    temp_env::with_var_unset(HOST_ENV, || {
      let err = manifest.select_host(None).unwrap_err();
      assert!(matches!(err, ManifestError::HostNotSelected { .. }));
    });
  }

  #[test]
  #[serial]
  fn select_unknown_host() {
    let manifest = Manifest::from_yaml("hosts:\n  a: {}\n").unwrap();
    temp_env::with_var_unset(HOST_ENV, || {
      let err = manifest.select_host(Some("zzz")).unwrap_err();
      assert_eq!(err.to_string(), "host 'zzz' not found in manifest (available: a)");
    });
  }
}
