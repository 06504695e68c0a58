//! Implementation of the `pkgsync validate` command.

use std::process::ExitCode;

use anyhow::Result;

use super::Context;
use crate::output::{print_stat, print_success};

/// Load and validate the manifest, then resolve the selected host if one is given.
///
/// Validation errors surface as the command's error, listing every violation.
pub fn cmd_validate(ctx: &Context) -> Result<ExitCode> {
  let (path, manifest) = ctx.load_manifest()?;
  print_success(&format!("{} is valid", path.display()));
  print_stat("Hosts", &manifest.hosts.keys().cloned().collect::<Vec<_>>().join(", "));
  print_stat("Shared", &manifest.shared.keys().cloned().collect::<Vec<_>>().join(", "));

  if ctx.host.is_some() || ctx.verbose {
    let resolved = ctx.resolve(&manifest)?;
    let casks = resolved.desired.packages.iter().filter(|p| p.is_cask).count();
    println!();
    print_success(&format!("Host '{}' resolves", resolved.host));
    print_stat("Formulae", &(resolved.desired.packages.len() - casks).to_string());
    print_stat("Casks", &casks.to_string());
    print_stat("asdf plugins", &resolved.asdf.len().to_string());
    print_stat("npm packages", &resolved.npm.len().to_string());
  }

  Ok(ExitCode::SUCCESS)
}
