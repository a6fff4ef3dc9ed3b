//! Per-build bookkeeping of what happened to each path.

use std::collections::HashMap;

use crate::types::clean_path;

/// What a build has done with a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// Excluded by `Skip`, the skip list or the empty-file policy.
    Skipped,
    /// Received a body through a rename.
    RenamedInto,
    /// Synthesized as a missing parent directory.
    Materialized,
    /// Handled as the source name of a renamed entry. Nothing stands at
    /// this name in the output.
    RenamedAway,
    /// Written to the output under this name.
    Emitted,
}

impl EntryStatus {
    /// Returns `true` if the status puts a record at the path.
    #[must_use]
    pub const fn is_present(self) -> bool {
        matches!(self, Self::Emitted | Self::Materialized)
    }

    const fn replaces(self, current: Self) -> bool {
        matches!(self, Self::Emitted) || (self.is_present() && !current.is_present())
    }
}

/// Status of every path touched by one build, keyed by cleaned path.
///
/// The first status recorded for a path sticks, with two exceptions:
/// [`EntryStatus::Emitted`] replaces any earlier status, and
/// [`EntryStatus::Materialized`] replaces a status that put nothing in
/// the output.
#[derive(Debug, Default)]
pub struct Ledger {
    states: HashMap<String, EntryStatus>,
}

impl Ledger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a status for `path`.
    pub fn mark(&mut self, path: &str, status: EntryStatus) {
        let key = clean_path(path);
        match self.states.get(&key) {
            Some(current) if !status.replaces(*current) => {}
            _ => {
                self.states.insert(key, status);
            }
        }
    }

    /// Returns the recorded status of `path`.
    #[must_use]
    pub fn status(&self, path: &str) -> Option<EntryStatus> {
        self.states.get(&clean_path(path)).copied()
    }

    /// Returns `true` if `path` was written.
    #[must_use]
    pub fn is_emitted(&self, path: &str) -> bool {
        self.status(path) == Some(EntryStatus::Emitted)
    }

    /// Returns `true` if an entry for `path` was already handled, either
    /// written under that name or renamed away from it.
    #[must_use]
    pub fn is_done(&self, path: &str) -> bool {
        matches!(
            self.status(path),
            Some(EntryStatus::Emitted | EntryStatus::RenamedAway)
        )
    }

    /// Returns `true` if `path` was synthesized as a directory.
    #[must_use]
    pub fn is_materialized(&self, path: &str) -> bool {
        self.status(path) == Some(EntryStatus::Materialized)
    }

    /// Returns `true` if something already stands at `path` in the output.
    #[must_use]
    pub fn exists(&self, path: &str) -> bool {
        self.status(path).is_some_and(EntryStatus::is_present)
    }
}
