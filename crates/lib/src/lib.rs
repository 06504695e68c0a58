//! pkgsync-lib: package drift detection for Homebrew, asdf and npm.
//!
//! - `package`: package identity and the desired/actual snapshots
//! - `reconcile`: missing and extraneous package computation
//! - `manifest`: the YAML desired-state file
//! - `inventory`: read-only queries of installed packages
//! - `versions`: asdf version specs
//! - `drift`: all providers compared for one host
//! - `suggest`: commands that would resolve a drift

pub mod consts;
pub mod drift;
pub mod inventory;
pub mod manifest;
pub mod package;
pub mod paths;
pub mod reconcile;
pub mod suggest;
pub mod versions;
