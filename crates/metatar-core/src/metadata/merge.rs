//! Combining two metadata documents.

use std::collections::HashMap;

use tracing::debug;

use super::ArchiveMetadata;
use crate::Result;
use crate::apply::SkipResolver;
use crate::error::Notice;

/// Result of [`merge`].
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutput {
    /// The merged document.
    pub metadata: ArchiveMetadata,
    /// Observations made while merging.
    pub notices: Vec<Notice>,
}

/// Merges `overlay` into `base`; the overlay wins.
///
/// Base entries keep their order. Skipped entries and entries matched by
/// their own document's skip list are dropped, and a repeated path within
/// the base keeps its first entry. Each overlay entry replaces the base
/// entry with the same path in place; paths new in the overlay are
/// appended in overlay order. The skip lists are combined and the result
/// is stamped with the current format version.
///
/// # Errors
///
/// Returns [`MetatarError::InvalidPattern`](crate::MetatarError::InvalidPattern)
/// if either skip list holds a malformed glob.
///
/// # Examples
///
/// ```
/// use metatar_core::ArchiveMetadata;
/// use metatar_core::merge;
///
/// # fn main() -> Result<(), metatar_core::MetatarError> {
/// let base = ArchiveMetadata::from_yaml("Contents:\n- Filename: x\n  Mode: '0644'\n")?;
/// let overlay = ArchiveMetadata::from_yaml("Contents:\n- Filename: x\n  Mode: '0600'\n")?;
/// let merged = merge(&base, &overlay)?.metadata;
/// assert_eq!(merged.entries.len(), 1);
/// assert_eq!(merged.entries[0].mode.bits(), 0o600);
/// # Ok(())
/// # }
/// ```
pub fn merge(base: &ArchiveMetadata, overlay: &ArchiveMetadata) -> Result<MergeOutput> {
    let mut notices: Vec<Notice> = [base.version_notice(), overlay.version_notice()]
        .into_iter()
        .flatten()
        .collect();

    let mut merged = ArchiveMetadata::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    let base_skip = SkipResolver::new(&base.skip_list)?;
    for entry in &base.entries {
        if entry.skip || base_skip.should_skip(&entry.path) {
            debug!(path = %entry.path, "skipping");
            continue;
        }
        if index.contains_key(&entry.path) {
            notices.push(Notice::DuplicateFilename {
                path: entry.path.clone(),
            });
            continue;
        }
        index.insert(entry.path.clone(), merged.entries.len());
        merged.entries.push(entry.clone());
    }

    let overlay_skip = SkipResolver::new(&overlay.skip_list)?;
    for entry in &overlay.entries {
        if entry.skip || overlay_skip.should_skip(&entry.path) {
            debug!(path = %entry.path, "skipping");
            continue;
        }
        if let Some(&slot) = index.get(&entry.path) {
            debug!(path = %entry.path, "replaced by overlay");
            merged.entries[slot] = entry.clone();
        } else {
            debug!(path = %entry.path, "added by overlay");
            index.insert(entry.path.clone(), merged.entries.len());
            merged.entries.push(entry.clone());
        }
    }

    for item in base.skip_list.iter().chain(&overlay.skip_list) {
        if !merged.skip_list.contains(item) {
            merged.skip_list.push(item.clone());
        }
    }

    Ok(MergeOutput {
        metadata: merged,
        notices,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::metadata::Entry;
    use crate::metadata::FORMAT_VERSION;
    use crate::types::EntryKind;
    use crate::types::Mode;

    fn entry(path: &str, mode: u32) -> Entry {
        let mut e = Entry::new(path, EntryKind::Regular);
        e.mode = Mode::new(mode);
        e
    }

    fn doc(entries: Vec<Entry>) -> ArchiveMetadata {
        ArchiveMetadata {
            entries,
            ..ArchiveMetadata::new()
        }
    }

    #[test]
    fn test_overlay_wins_in_place() {
        let base = doc(vec![entry("a", 0o644), entry("x", 0o644), entry("z", 0o644)]);
        let overlay = doc(vec![entry("x", 0o600)]);
        let merged = merge(&base, &overlay).unwrap().metadata;

        let paths: Vec<&str> = merged.entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, ["a", "x", "z"]);
        assert_eq!(merged.entries[1].mode.bits(), 0o600);
    }

    #[test]
    fn test_new_overlay_entries_are_appended() {
        let base = doc(vec![entry("a", 0o644)]);
        let overlay = doc(vec![entry("b", 0o600), entry("c", 0o600)]);
        let merged = merge(&base, &overlay).unwrap().metadata;
        let paths: Vec<&str> = merged.entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, ["a", "b", "c"]);
    }

    #[test]
    fn test_base_duplicates_keep_first() {
        let base = doc(vec![entry("a", 0o644), entry("a", 0o600)]);
        let output = merge(&base, &ArchiveMetadata::new()).unwrap();
        assert_eq!(output.metadata.entries.len(), 1);
        assert_eq!(output.metadata.entries[0].mode.bits(), 0o644);
        assert_eq!(
            output.notices,
            vec![Notice::DuplicateFilename { path: "a".into() }]
        );
    }

    #[test]
    fn test_skipped_entries_are_dropped() {
        let mut skipped = entry("gone", 0o644);
        skipped.skip = true;
        let mut base = doc(vec![skipped, entry("keep", 0o644), entry("x.tmp", 0o644)]);
        base.skip_list.push("*.tmp".into());
        let mut overlay = doc(vec![entry("keep.orig", 0o600)]);
        overlay.skip_list.push("*.orig".into());
        overlay.skip_list.push("*.tmp".into());

        let merged = merge(&base, &overlay).unwrap().metadata;
        let paths: Vec<&str> = merged.entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, ["keep"]);
        assert_eq!(merged.skip_list, ["*.tmp", "*.orig"]);
    }

    #[test]
    fn test_version_stamp_and_future_notice() {
        let mut overlay = ArchiveMetadata::new();
        overlay.format_version = 9.0;
        let mut base = ArchiveMetadata::new();
        base.format_version = 1.0;
        let output = merge(&base, &overlay).unwrap();
        assert!((output.metadata.format_version - FORMAT_VERSION).abs() < f64::EPSILON);
        assert_eq!(output.notices, vec![Notice::FutureVersion { found: 9.0 }]);
    }
}
