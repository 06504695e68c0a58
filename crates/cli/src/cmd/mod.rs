mod check;
mod outdated;
mod snapshot;
mod validate;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use tracing::debug;

use pkgsync_lib::manifest::{Manifest, ResolvedConfig};
use pkgsync_lib::paths;

pub use check::cmd_check;
pub use outdated::cmd_outdated;
pub use snapshot::cmd_snapshot;
pub use validate::cmd_validate;

/// Global flags shared by every subcommand.
pub struct Context {
  pub config: Option<PathBuf>,
  pub host: Option<String>,
  pub verbose: bool,
}

impl Context {
  pub fn manifest_path(&self) -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    Ok(paths::manifest_path(self.config.as_deref(), &cwd))
  }

  pub fn load_manifest(&self) -> Result<(PathBuf, Manifest)> {
    let path = self.manifest_path()?;
    debug!(path = %path.display(), "using manifest");
    let manifest = Manifest::load(&path).with_context(|| format!("Failed to load {}", path.display()))?;
    Ok((path, manifest))
  }

  pub fn resolve(&self, manifest: &Manifest) -> Result<ResolvedConfig> {
    let host = manifest.select_host(self.host.as_deref())?;
    Ok(manifest.resolve(&host)?)
  }
}

pub(crate) fn runtime() -> Result<tokio::runtime::Runtime> {
  tokio::runtime::Runtime::new().context("Failed to create async runtime")
}
