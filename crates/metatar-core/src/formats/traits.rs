//! Common traits for archive writers.

use crate::Result;
use crate::metadata::Xattr;
use crate::types::EntryKind;

/// Header of one entry handed to an [`ArchiveSink`].
///
/// `kind` is already mapped into the sink's own kind set by
/// [`ArchiveSink::map_kind`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryHeader {
    /// Name written to the archive, including the directory suffix.
    pub name: String,
    /// Link target for symlinks and hard links.
    pub link_target: String,
    /// Entry kind.
    pub kind: EntryKind,
    /// Permission bits.
    pub mode: u32,
    /// Numeric owner.
    pub uid: u64,
    /// Numeric group.
    pub gid: u64,
    /// Owner name.
    pub user: String,
    /// Group name.
    pub group: String,
    /// Device major number.
    pub device_major: u32,
    /// Device minor number.
    pub device_minor: u32,
    /// Extended attributes.
    pub xattrs: Vec<Xattr>,
}

/// Trait for archive output formats.
///
/// A sink receives entries in their final order and produces the archive
/// bytes once every entry has been appended.
pub trait ArchiveSink {
    /// Returns the archive format name.
    fn format_name(&self) -> &'static str;

    /// Returns `true` if readers of this format rebuild the tree from the
    /// physical entry order, so parents and link targets must come first.
    fn requires_ordering(&self) -> bool;

    /// Maps an entry kind onto the kinds this format can store.
    ///
    /// # Errors
    ///
    /// Returns [`MetatarError::UnsupportedKind`](crate::MetatarError::UnsupportedKind)
    /// if the format has no equivalent.
    fn map_kind(&self, path: &str, kind: EntryKind) -> Result<EntryKind>;

    /// Appends one entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the header cannot be encoded.
    fn append(&mut self, header: &EntryHeader, body: &[u8]) -> Result<()>;

    /// Terminates the archive and returns its bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the trailer cannot be written.
    fn finish(self) -> Result<Vec<u8>>
    where
        Self: Sized;
}
