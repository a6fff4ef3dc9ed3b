//! The optional source archive an overlay is applied to.

use std::collections::BTreeMap;
use std::collections::HashMap;

use tracing::debug;

use crate::Result;
use crate::formats::detect::ArchiveType;
use crate::formats::tar;
use crate::metadata::Entry;

/// Bodies and header-derived metadata of a source archive, keyed by the
/// member name as stored.
///
/// When a name occurs more than once, the last member wins.
#[derive(Debug, Clone, Default)]
pub struct SourceArchive {
    /// Member data.
    pub bodies: BTreeMap<String, Vec<u8>>,
    /// Metadata taken from member headers.
    pub metadata: HashMap<String, Entry>,
}

impl SourceArchive {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a tar archive, decompressing it first if needed.
    ///
    /// With `root`, the derived metadata records every member as owned by
    /// `root:root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive cannot be decompressed or parsed.
    pub fn from_archive(bytes: &[u8], format: ArchiveType, root: bool) -> Result<Self> {
        let mut source = Self::new();
        for member in tar::read_members(tar::decoder(bytes, format)?)? {
            let mut entry = member.entry;
            if root {
                entry.set_root_owner();
            }
            source.insert(entry, member.body);
        }
        debug!(members = source.len(), "loaded source archive");
        Ok(source)
    }

    /// Adds a member.
    pub fn insert(&mut self, entry: Entry, body: Vec<u8>) {
        self.bodies.insert(entry.path.clone(), body);
        self.metadata.insert(entry.path.clone(), entry);
    }

    /// Returns the number of bodies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Returns `true` if there are no bodies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}
