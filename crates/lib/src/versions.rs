//! asdf version specs and matching against installed versions.
//!
//! A spec is one of:
//! - `latest`: the newest released version (needs `asdf latest`, so unchecked offline)
//! - `lts`: the current long-term-support release (nodejs only; needs network data)
//! - `X[.Y[.Z]]`: the newest version with that numeric prefix
//!
//! `latest` and `lts` count as missing only when no clean (`X.Y.Z`) version is installed;
//! otherwise they are unresolvable, since any installed version may or may not be the
//! current release.
//!
//! Examples for prefix `3.12` against
//! `["3.12-dev", "3.12.0", "3.12.1", "3.12.0-rc1", "3.13.0", "3.2.0"]`:
//! matches are `["3.12.0", "3.12.1"]`, resolving to `3.12.1`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
  #[error("invalid version spec '{0}': expected 'latest', 'lts' or X[.Y[.Z]]")]
  Invalid(String),

  #[error("no installed version matches '{0}'")]
  NoMatch(String),

  #[error("'{0}' cannot be resolved without release metadata")]
  Unresolvable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum VersionSpec {
  Latest,
  Lts,
  Prefix(String),
}

impl VersionSpec {
  /// Pick the version this spec selects from `available`.
  pub fn resolve<S: AsRef<str>>(&self, available: &[S]) -> Result<String, VersionError> {
    match self {
      VersionSpec::Latest | VersionSpec::Lts if !has_clean_version(available) => {
        Err(VersionError::NoMatch(self.to_string()))
      }
      VersionSpec::Latest | VersionSpec::Lts => Err(VersionError::Unresolvable(self.to_string())),
      VersionSpec::Prefix(prefix) => matching_versions(available, prefix)
        .into_iter()
        .next_back()
        .ok_or_else(|| VersionError::NoMatch(self.to_string())),
    }
  }

  /// Argument for `asdf install <plugin> <arg>`.
  pub fn install_arg(&self) -> String {
    match self {
      VersionSpec::Latest => "latest".to_string(),
      VersionSpec::Lts => "lts".to_string(),
      VersionSpec::Prefix(prefix) if prefix.split('.').count() == 3 => prefix.clone(),
      VersionSpec::Prefix(prefix) => format!("latest:{}", prefix),
    }
  }
}

impl FromStr for VersionSpec {
  type Err = VersionError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "latest" => Ok(VersionSpec::Latest),
      "lts" => Ok(VersionSpec::Lts),
      _ if is_version_prefix(s) => Ok(VersionSpec::Prefix(s.to_string())),
      _ => Err(VersionError::Invalid(s.to_string())),
    }
  }
}

impl TryFrom<String> for VersionSpec {
  type Error = VersionError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    value.parse()
  }
}

impl From<VersionSpec> for String {
  fn from(spec: VersionSpec) -> Self {
    spec.to_string()
  }
}

impl fmt::Display for VersionSpec {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      VersionSpec::Latest => write!(f, "latest"),
      VersionSpec::Lts => write!(f, "lts"),
      VersionSpec::Prefix(prefix) => write!(f, "{}", prefix),
    }
  }
}

/// True for one to three dot-separated numeric segments.
pub fn is_version_prefix(s: &str) -> bool {
  let segments: Vec<&str> = s.split('.').collect();
  (1..=3).contains(&segments.len()) && segments.iter().all(|seg| is_numeric(seg))
}

/// Versions equal to `prefix` or extending it with numeric segments, ascending.
pub fn matching_versions<S: AsRef<str>>(available: &[S], prefix: &str) -> Vec<String> {
  let mut matches: Vec<String> = available
    .iter()
    .map(AsRef::as_ref)
    .filter(|v| {
      *v == prefix
        || v
          .strip_prefix(prefix)
          .and_then(|rest| rest.strip_prefix('.'))
          .is_some_and(|rest| rest.split('.').all(is_numeric))
    })
    .map(str::to_string)
    .collect();
  matches.sort_by(|a, b| compare_versions(a, b));
  matches
}

/// Numeric segment-wise ordering; shorter wins a tie.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
  let parse = |v: &str| -> Vec<u64> { v.split('.').map(|seg| seg.parse().unwrap_or(0)).collect() };
  let (a, b) = (parse(a), parse(b));
  for (x, y) in a.iter().zip(b.iter()) {
    match x.cmp(y) {
      Ordering::Equal => continue,
      other => return other,
    }
  }
  a.len().cmp(&b.len())
}

fn has_clean_version<S: AsRef<str>>(available: &[S]) -> bool {
  available.iter().any(|v| v.as_ref().split('.').all(is_numeric))
}

fn is_numeric(seg: &str) -> bool {
  !seg.is_empty() && seg.bytes().all(|b| b.is_ascii_digit())
}

/// How the installed versions of one plugin line up with its specs.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionReport {
  /// Specs with an installed version, paired with that version.
  pub satisfied: Vec<(VersionSpec, String)>,

  /// Specs no installed version satisfies.
  pub missing: Vec<VersionSpec>,

  /// Specs that need release metadata to check (`latest`, `lts`).
  pub unverified: Vec<VersionSpec>,

  /// Installed versions no spec claims. Left empty while any spec is unverified,
  /// since the unverified spec may claim any of them.
  pub extra: Vec<String>,
}

impl VersionReport {
  pub fn is_clean(&self) -> bool {
    self.missing.is_empty() && self.extra.is_empty()
  }
}

/// Match one plugin's specs against its installed versions.
pub fn check_versions(specs: &[VersionSpec], installed: &[String]) -> VersionReport {
  let mut report = VersionReport::default();

  for spec in specs {
    match spec.resolve(installed) {
      Ok(version) => report.satisfied.push((spec.clone(), version)),
      Err(VersionError::Unresolvable(_)) => report.unverified.push(spec.clone()),
      Err(_) => report.missing.push(spec.clone()),
    }
  }

  if report.unverified.is_empty() {
    report.extra = installed
      .iter()
      .filter(|v| !report.satisfied.iter().any(|(_, claimed)| claimed == *v))
      .cloned()
      .collect();
  }

  report
}

#[cfg(test)]
mod tests {
  use super::*;

  fn spec(s: &str) -> VersionSpec {
    s.parse().unwrap()
  }

  #[test]
  fn parse_specs() {
    assert_eq!(spec("latest"), VersionSpec::Latest);
    assert_eq!(spec("lts"), VersionSpec::Lts);
    assert_eq!(spec("3.12"), VersionSpec::Prefix("3.12".to_string()));
    assert!("3.12.0.1".parse::<VersionSpec>().is_err());
    assert!("v3".parse::<VersionSpec>().is_err());
    assert!("3.".parse::<VersionSpec>().is_err());
    assert!("".parse::<VersionSpec>().is_err());
  }

  #[test]
  fn matching_python_minor() {
    let versions = ["3.12-dev", "3.12.0", "3.12.1", "3.12.0-rc1", "3.13.0"];
    assert_eq!(matching_versions(&versions, "3.12"), vec!["3.12.0", "3.12.1"]);
  }

  #[test]
  fn matching_major_only() {
    let versions = ["3.0.0", "3.1.0", "4.0.0", "3-dev", "30.1.0"];
    assert_eq!(matching_versions(&versions, "3"), vec!["3.0.0", "3.1.0"]);
  }

  #[test]
  fn matching_exact() {
    let versions = ["3.12.0", "3.12.1", "3.12.0-rc1"];
    assert_eq!(matching_versions(&versions, "3.12.0"), vec!["3.12.0"]);
  }

  #[test]
  fn matching_none() {
    let versions = ["3.11.0", "3.13.0", "3.12-dev"];
    assert!(matching_versions(&versions, "3.12").is_empty());
  }

  #[test]
  fn sorts_numerically() {
    let versions = ["20.10.0", "20.9.0", "20.2.1"];
    assert_eq!(matching_versions(&versions, "20"), vec!["20.2.1", "20.9.0", "20.10.0"]);
  }

  #[test]
  fn resolve_specs() {
    let installed = ["18.19.0", "20.11.1", "20.9.0", "21.0.0-nightly"];
    assert_eq!(spec("20").resolve(&installed).unwrap(), "20.11.1");
    assert_eq!(spec("22").resolve(&installed), Err(VersionError::NoMatch("22".to_string())));
    assert_eq!(
      spec("lts").resolve(&installed),
      Err(VersionError::Unresolvable("lts".to_string()))
    );
  }

  #[test]
  fn latest_is_not_assumed_from_installed_versions() {
    let installed = ["18.19.0", "21.0.0-nightly"];
    assert_eq!(
      spec("latest").resolve(&installed),
      Err(VersionError::Unresolvable("latest".to_string()))
    );

    let report = check_versions(&[spec("latest")], &["18.19.0".to_string()]);
    assert!(report.satisfied.is_empty());
    assert_eq!(report.unverified, vec![VersionSpec::Latest]);
    assert!(report.extra.is_empty());
  }

  #[test]
  fn release_specs_missing_without_clean_versions() {
    let installed = ["21.0.0-nightly"];
    assert_eq!(
      spec("latest").resolve(&installed),
      Err(VersionError::NoMatch("latest".to_string()))
    );
    assert_eq!(
      spec("lts").resolve::<&str>(&[]),
      Err(VersionError::NoMatch("lts".to_string()))
    );

    let report = check_versions(&[spec("latest")], &[]);
    assert_eq!(report.missing, vec![VersionSpec::Latest]);
    assert!(!report.is_clean());
  }

  #[test]
  fn install_args() {
    assert_eq!(spec("3.12").install_arg(), "latest:3.12");
    assert_eq!(spec("3.12.1").install_arg(), "3.12.1");
    assert_eq!(spec("latest").install_arg(), "latest");
  }

  #[test]
  fn check_versions_reports_missing_and_extra() {
    let installed = vec!["3.11.4".to_string(), "3.12.1".to_string()];
    let report = check_versions(&[spec("3.12"), spec("3.13")], &installed);

    assert_eq!(report.satisfied, vec![(spec("3.12"), "3.12.1".to_string())]);
    assert_eq!(report.missing, vec![spec("3.13")]);
    assert_eq!(report.extra, vec!["3.11.4".to_string()]);
    assert!(!report.is_clean());
  }

  #[test]
  fn unverified_spec_suppresses_extra() {
    let installed = vec!["20.11.1".to_string(), "18.19.0".to_string()];
    let report = check_versions(&[spec("20"), spec("lts")], &installed);

    assert_eq!(report.unverified, vec![VersionSpec::Lts]);
    assert!(report.extra.is_empty());
    assert!(report.is_clean());
  }

  #[test]
  fn spec_serde_round_trip_through_string() {
    let specs: Vec<VersionSpec> = serde_json::from_str(r#"["lts", "3.12"]"#).unwrap();
    assert_eq!(specs, vec![VersionSpec::Lts, spec("3.12")]);
    assert!(serde_json::from_str::<VersionSpec>(r#""nope""#).is_err());
  }
}
