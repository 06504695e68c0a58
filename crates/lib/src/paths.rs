//! Default file locations, following the XDG base directory layout.

use std::path::{Path, PathBuf};

use crate::consts::{APP_NAME, CONFIG_ENV, MANIFEST_FILENAME, SNAPSHOT_FILENAME};

/// The user's home directory, or the current directory when `HOME` is unset.
pub fn home_dir() -> PathBuf {
  std::env::var_os("HOME")
    .filter(|home| !home.is_empty())
    .map(PathBuf::from)
    .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns the directory for configuration files for the application
pub fn config_dir() -> PathBuf {
  xdg_dir("XDG_CONFIG_HOME", &[".config"])
}

/// Returns the directory for data files for the application
pub fn data_dir() -> PathBuf {
  xdg_dir("XDG_DATA_HOME", &[".local", "share"])
}

fn xdg_dir(var: &str, fallback: &[&str]) -> PathBuf {
  let base = std::env::var_os(var)
    .filter(|v| !v.is_empty())
    .map(PathBuf::from)
    .unwrap_or_else(|| fallback.iter().fold(home_dir(), |path, seg| path.join(seg)));
  base.join(APP_NAME)
}

/// Locate the manifest.
///
/// Precedence: `explicit` (the `--config` flag), `PKGSYNC_CONFIG`, `pkgsync.yaml` in
/// `cwd` if it exists, then the XDG config directory.
pub fn manifest_path(explicit: Option<&Path>, cwd: &Path) -> PathBuf {
  if let Some(path) = explicit {
    return path.to_path_buf();
  }
  if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
    return PathBuf::from(path);
  }
  let local = cwd.join(MANIFEST_FILENAME);
  if local.is_file() {
    return local;
  }
  config_dir().join(MANIFEST_FILENAME)
}

/// Default location for `pkgsync snapshot` output.
pub fn snapshot_path() -> PathBuf {
  data_dir().join(SNAPSHOT_FILENAME)
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;
  use tempfile::TempDir;

  #[test]
  #[serial]
  fn xdg_config_home_takes_precedence() {
    temp_env::with_vars(
      [
        ("XDG_CONFIG_HOME", Some("/custom/config")),
        ("HOME", Some("/home/user")),
      ],
      || {
        assert_eq!(config_dir(), PathBuf::from("/custom/config/pkgsync"));
      },
    );
  }

  #[test]
  #[serial]
  fn xdg_fallback_to_home_directories() {
    temp_env::with_vars(
      [
        ("XDG_CONFIG_HOME", None::<&str>),
        ("XDG_DATA_HOME", None::<&str>),
        ("HOME", Some("/home/user")),
      ],
      || {
        assert_eq!(config_dir(), PathBuf::from("/home/user/.config/pkgsync"));
        assert_eq!(data_dir(), PathBuf::from("/home/user/.local/share/pkgsync"));
        assert_eq!(snapshot_path(), PathBuf::from("/home/user/.local/share/pkgsync/inventory.json"));
      },
    );
  }

  #[test]
  #[serial]
  fn manifest_flag_wins() {
    let cwd = TempDir::new().unwrap();
    temp_env::with_var(CONFIG_ENV, Some("/env/pkgsync.yaml"), || {
      assert_eq!(
        manifest_path(Some(Path::new("/flag/pkgsync.yaml")), cwd.path()),
        PathBuf::from("/flag/pkgsync.yaml")
      );
    });
  }

  #[test]
  #[serial]
  fn manifest_env_beats_local_file() {
    let cwd = TempDir::new().unwrap();
    std::fs::write(cwd.path().join(MANIFEST_FILENAME), "").unwrap();
    temp_env::with_var(CONFIG_ENV, Some("/env/pkgsync.yaml"), || {
      assert_eq!(manifest_path(None, cwd.path()), PathBuf::from("/env/pkgsync.yaml"));
    });
  }

  #[test]
  #[serial]
  fn manifest_local_file_then_xdg() {
    let cwd = TempDir::new().unwrap();
    temp_env::with_vars(
      [
        (CONFIG_ENV, None::<&str>),
        ("XDG_CONFIG_HOME", Some("/custom/config")),
      ],
      || {
        assert_eq!(
          manifest_path(None, cwd.path()),
          PathBuf::from("/custom/config/pkgsync/pkgsync.yaml")
        );

        std::fs::write(cwd.path().join(MANIFEST_FILENAME), "").unwrap();
        assert_eq!(manifest_path(None, cwd.path()), cwd.path().join(MANIFEST_FILENAME));
      },
    );
  }
}
