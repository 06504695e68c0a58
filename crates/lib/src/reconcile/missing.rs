use std::collections::HashSet;

use crate::package::Package;

/// Desired packages with no equal entry in `installed`, in desired order.
///
/// A package listed twice in `desired` is reported once.
pub fn missing(desired: &[Package], installed: &[Package]) -> Vec<Package> {
  let installed: HashSet<&Package> = installed.iter().collect();
  let mut seen = HashSet::new();
  desired
    .iter()
    .filter(|pkg| !installed.contains(pkg) && seen.insert(*pkg))
    .cloned()
    .collect()
}
