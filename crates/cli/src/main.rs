mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cmd::{Context, cmd_check, cmd_outdated, cmd_snapshot, cmd_validate};
use crate::output::print_error;

/// Exit code for failures of the tool itself, as opposed to detected drift.
const EXIT_ERROR: u8 = 2;

/// pkgsync - report drift between a package manifest and what is installed
#[derive(Parser)]
#[command(name = "pkgsync")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output and debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Path to the manifest (default: $PKGSYNC_CONFIG, ./pkgsync.yaml, ~/.config/pkgsync/pkgsync.yaml)
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  /// Host entry to check (default: $PKGSYNC_HOST, or the only host in the manifest)
  #[arg(long, global = true)]
  host: Option<String>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Compare the manifest with installed packages (exits 1 on drift)
  Check {
    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Read installed packages from a snapshot file instead of querying the system
    #[arg(long, value_name = "FILE")]
    inventory: Option<PathBuf>,
  },

  /// Validate the manifest
  Validate,

  /// Record installed packages to a snapshot file
  Snapshot {
    /// Output path (default: ~/.local/share/pkgsync/inventory.json)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
  },

  /// List brew and global npm packages with newer versions available
  Outdated {
    /// Output as JSON
    #[arg(long)]
    json: bool,
  },
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let ctx = Context {
    config: cli.config,
    host: cli.host,
    verbose: cli.verbose,
  };

  let result = match cli.command {
    Commands::Check { json, inventory } => cmd_check(&ctx, inventory.as_deref(), json),
    Commands::Validate => cmd_validate(&ctx),
    Commands::Snapshot { output } => cmd_snapshot(output.as_deref()),
    Commands::Outdated { json } => cmd_outdated(json),
  };

  match result {
    Ok(code) => code,
    Err(err) => {
      print_error(&format!("{:#}", err));
      ExitCode::from(EXIT_ERROR)
    }
  }
}

/// `RUST_LOG` wins; otherwise warnings, or debug with `--verbose`.
fn init_tracing(verbose: bool) {
  let default = if verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}
