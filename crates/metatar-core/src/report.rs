//! Apply operation reporting.

use std::time::Duration;

use crate::error::Notice;

/// Report of an apply or generate operation.
///
/// Contains statistics and the notices raised while building the output.
#[derive(Debug, Clone, Default)]
pub struct ApplyReport {
    /// Entries written with their own header, directories included.
    pub entries_written: usize,

    /// Parent directories synthesized because nothing declared them.
    pub directories_created: usize,

    /// Entries left out by `Skip`, the skip list or the empty-file policy.
    pub entries_skipped: usize,

    /// Entries ignored because their name was already written.
    pub duplicates: usize,

    /// Source members written without being named in the metadata.
    pub implicit_entries: usize,

    /// Total body bytes written.
    pub bytes_written: u64,

    /// Duration of the operation.
    pub duration: Duration,

    /// Non-fatal observations.
    pub notices: Vec<Notice>,
}

impl ApplyReport {
    /// Creates a new empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a notice to the report.
    pub fn add_notice(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    /// Returns total number of records in the output.
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.entries_written + self.directories_created
    }

    /// Returns whether any notices were raised.
    #[must_use]
    pub fn has_notices(&self) -> bool {
        !self.notices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_report() {
        let report = ApplyReport::new();
        assert_eq!(report.entries_written, 0);
        assert_eq!(report.directories_created, 0);
        assert_eq!(report.bytes_written, 0);
        assert!(!report.has_notices());
    }

    #[test]
    fn test_add_notice() {
        let mut report = ApplyReport::new();
        report.add_notice(Notice::EmptyRegularFile { path: "a".into() });
        assert!(report.has_notices());
        assert_eq!(report.notices.len(), 1);
    }

    #[test]
    fn test_total_items() {
        let mut report = ApplyReport::new();
        report.entries_written = 10;
        report.directories_created = 5;
        report.entries_skipped = 2;
        assert_eq!(report.total_items(), 15);
    }
}
