//! Planning of undeclared parent directories.

use super::ledger::Ledger;
use crate::types::archive_path::is_materializable;
use crate::types::archive_path::join;
use crate::types::archive_path::parent_dir;
use crate::types::clean_path;

/// Returns the directories from `dir` upwards that do not exist yet,
/// outermost first.
///
/// The walk stops at the first directory that already exists in the
/// output and never yields `.`, rooted names or names above the archive
/// root.
///
/// # Examples
///
/// ```
/// use metatar_core::apply::Ledger;
/// use metatar_core::apply::materialize::missing_ancestors;
///
/// let ledger = Ledger::new();
/// assert_eq!(missing_ancestors("usr/lib/x", &ledger), ["usr", "usr/lib", "usr/lib/x"]);
/// assert!(missing_ancestors("/etc", &ledger).is_empty());
/// ```
#[must_use]
pub fn missing_ancestors(dir: &str, ledger: &Ledger) -> Vec<String> {
    let mut chain = Vec::new();
    let mut current = clean_path(dir);
    while is_materializable(&current) && !ledger.exists(&current) {
        let parent = parent_dir(&current);
        chain.push(current);
        current = parent;
    }
    chain.reverse();
    chain
}

/// Returns the directory holding the target of a symlink at `link`.
///
/// Relative targets are resolved against the link's own directory.
#[must_use]
pub fn symlink_target_dir(link: &str, target: &str) -> String {
    let target_dir = parent_dir(target);
    if target.starts_with('/') {
        target_dir
    } else {
        join(&parent_dir(link), &target_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply::ledger::EntryStatus;

    #[test]
    fn test_stops_at_existing() {
        let mut ledger = Ledger::new();
        ledger.mark("usr/", EntryStatus::Emitted);
        assert_eq!(missing_ancestors("usr/lib/x", &ledger), ["usr/lib", "usr/lib/x"]);

        ledger.mark("usr/lib", EntryStatus::Materialized);
        assert_eq!(missing_ancestors("usr/lib/x", &ledger), ["usr/lib/x"]);
    }

    #[test]
    fn test_idempotent_once_recorded() {
        let mut ledger = Ledger::new();
        for dir in missing_ancestors("a/b", &ledger) {
            ledger.mark(&dir, EntryStatus::Materialized);
        }
        assert!(missing_ancestors("a/b", &ledger).is_empty());
        assert!(missing_ancestors("a", &ledger).is_empty());
    }

    #[test]
    fn test_excluded_roots() {
        let ledger = Ledger::new();
        assert!(missing_ancestors(".", &ledger).is_empty());
        assert!(missing_ancestors("/var/lib", &ledger).is_empty());
        assert!(missing_ancestors("../up", &ledger).is_empty());
        assert_eq!(missing_ancestors("a/../b", &ledger), ["b"]);
    }

    #[test]
    fn test_deep_chain() {
        let ledger = Ledger::new();
        let deep = vec!["d"; 500].join("/");
        assert_eq!(missing_ancestors(&deep, &ledger).len(), 500);
    }

    #[test]
    fn test_symlink_target_dir() {
        assert_eq!(symlink_target_dir("bin/sh", "busybox"), "bin");
        assert_eq!(symlink_target_dir("bin/sh", "../lib/ld.so"), "lib");
        assert_eq!(symlink_target_dir("etc/mtab", "/proc/mounts"), "/proc");
        assert_eq!(symlink_target_dir("lib", "usr/lib"), "usr");
    }
}
