//! Carrying bodies and metadata across renames.

use super::ledger::EntryStatus;
use super::ledger::Ledger;
use super::source::SourceArchive;

/// What a rename did to the body map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameOutcome {
    /// The new name now aliases the old body.
    Aliased,
    /// The new name already had a body, which is kept.
    Collision,
    /// The old name has no body; nothing was aliased.
    NoBody,
}

/// Makes `to` an alias of `from` in the body map.
///
/// On success `to` is marked [`EntryStatus::RenamedInto`] and receives a
/// copy of the header metadata of `from`, so the unreferenced-member pass
/// does not pick either name up again. An existing body under `to` is
/// never replaced.
pub fn track_rename(
    source: &mut SourceArchive,
    ledger: &mut Ledger,
    from: &str,
    to: &str,
) -> RenameOutcome {
    if source.bodies.contains_key(to) {
        return RenameOutcome::Collision;
    }
    let Some(body) = source.bodies.get(from).cloned() else {
        return RenameOutcome::NoBody;
    };
    source.bodies.insert(to.to_string(), body);
    ledger.mark(to, EntryStatus::RenamedInto);
    if let Some(meta) = source.metadata.get(from).cloned() {
        source.metadata.insert(to.to_string(), meta);
    }
    RenameOutcome::Aliased
}
