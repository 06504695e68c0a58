//! Manifest validation rules.
//!
//! Every rule is checked and every violation collected, so one run reports all
//! problems in the file. Violations are prefixed with the dotted path of the
//! offending list, e.g. `shared.base.homebrew.formulae`.

use std::cmp::Ordering;
use std::collections::HashSet;

use super::types::{HomebrewConfig, Manifest};
use crate::versions::VersionSpec;

/// Collect every rule violation in `manifest`.
pub fn validate(manifest: &Manifest) -> Vec<String> {
  let mut violations = Vec::new();

  for (name, host) in &manifest.hosts {
    let path = format!("hosts.{}", name);
    check_identifier(&path, name, &mut violations);
    check_sorted_unique(&format!("{}.use", path), &host.uses, &mut violations);
    for used in &host.uses {
      if !manifest.shared.contains_key(used) {
        violations.push(format!(
          "{}.use: host '{}' references non-existent shared config '{}'",
          path, name, used
        ));
      }
    }
    check_homebrew(&path, &host.homebrew, &mut violations);
    check_asdf(&path, host.asdf.iter(), &mut violations);
    check_sorted_unique(&format!("{}.npm", path), &host.npm, &mut violations);
  }

  for (name, shared) in &manifest.shared {
    let path = format!("shared.{}", name);
    check_identifier(&path, name, &mut violations);
    check_homebrew(&path, &shared.homebrew, &mut violations);
    check_asdf(&path, shared.asdf.iter(), &mut violations);
    check_sorted_unique(&format!("{}.npm", path), &shared.npm, &mut violations);
  }

  violations
}

/// Orders by the last `/` segment, with the full name as tie-breaker.
///
/// `homebrew/cask-fonts/font-fira-code` sorts under `font-fira-code`.
pub fn compare_by_basename(a: &str, b: &str) -> Ordering {
  basename(a).cmp(basename(b)).then_with(|| a.cmp(b))
}

fn basename(name: &str) -> &str {
  name.rsplit('/').next().unwrap_or(name)
}

/// `name` or `tap/repo/name`, with no empty segments.
pub fn is_valid_brew_name(name: &str) -> bool {
  let parts: Vec<&str> = name.split('/').collect();
  (parts.len() == 1 || parts.len() == 3) && parts.iter().all(|p| !p.is_empty() && !p.contains(char::is_whitespace))
}

/// Starts with a letter, then letters, digits, `_` or `-`.
pub fn is_identifier(name: &str) -> bool {
  let mut chars = name.chars();
  match chars.next() {
    Some(c) if c.is_ascii_alphabetic() => chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'),
    _ => false,
  }
}

fn check_identifier(path: &str, name: &str, violations: &mut Vec<String>) {
  if !is_identifier(name) {
    violations.push(format!(
      "{}: invalid name '{}': must start with a letter and contain only letters, numbers, underscore, hyphen",
      path, name
    ));
  }
}

fn check_homebrew(path: &str, brew: &HomebrewConfig, violations: &mut Vec<String>) {
  for (field, names) in [("formulae", &brew.formulae), ("casks", &brew.casks)] {
    let list_path = format!("{}.homebrew.{}", path, field);
    for name in names {
      if !is_valid_brew_name(name) {
        violations.push(format!(
          "{}: invalid format '{}': must be 'name' or 'tap/repo/name'",
          list_path, name
        ));
      }
    }
    check_sorted_unique(&list_path, names, violations);
  }
}

fn check_asdf<'a>(
  path: &str,
  plugins: impl Iterator<Item = (&'a String, &'a Vec<String>)>,
  violations: &mut Vec<String>,
) {
  for (plugin, specs) in plugins {
    let list_path = format!("{}.asdf.{}", path, plugin);
    for spec in specs {
      if let Err(err) = spec.parse::<VersionSpec>() {
        violations.push(format!("{}: {}", list_path, err));
      }
    }
    check_unique(&list_path, specs, violations);
  }
}

fn check_unique(path: &str, items: &[String], violations: &mut Vec<String>) {
  let mut seen = HashSet::new();
  let duplicates: Vec<&str> = items
    .iter()
    .filter(|item| !seen.insert(item.as_str()))
    .map(String::as_str)
    .collect();
  if !duplicates.is_empty() {
    violations.push(format!("{}: duplicate entries: {}", path, duplicates.join(", ")));
  }
}

fn check_sorted_unique(path: &str, items: &[String], violations: &mut Vec<String>) {
  check_unique(path, items, violations);
  for pair in items.windows(2) {
    if compare_by_basename(&pair[0], &pair[1]) == Ordering::Greater {
      violations.push(format!("{}: '{}' should come before '{}'", path, pair[1], pair[0]));
    }
  }
}
