//! Archive manifest types.

use crate::formats::detect::ArchiveType;

/// One member of a listed archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Member name as stored.
    pub path: String,
    /// Human-readable type name, such as `regular file` or `socket file`.
    pub kind: String,
    /// Permission bits.
    pub mode: u32,
    /// Numeric owner.
    pub uid: u64,
    /// Numeric group.
    pub gid: u64,
    /// Owner name, empty if the format does not store one.
    pub user: String,
    /// Group name, empty if the format does not store one.
    pub group: String,
    /// Device major number.
    pub device_major: u32,
    /// Device minor number.
    pub device_minor: u32,
    /// Data length in bytes.
    pub size: u64,
    /// Link target of symlinks and hard links.
    pub link_target: Option<String>,
}

impl ManifestEntry {
    /// Returns `user:group`, falling back to the numeric ids.
    #[must_use]
    pub fn owner_label(&self) -> String {
        let user = if self.user.is_empty() {
            self.uid.to_string()
        } else {
            self.user.clone()
        };
        let group = if self.group.is_empty() {
            self.gid.to_string()
        } else {
            self.group.clone()
        };
        format!("{user}:{group}")
    }
}

/// Contents of an archive, in stream order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveManifest {
    /// Detected container format.
    pub format: ArchiveType,
    /// Members in stream order.
    pub entries: Vec<ManifestEntry>,
    /// Number of members.
    pub total_entries: usize,
    /// Sum of member data lengths.
    pub total_size: u64,
}

impl ArchiveManifest {
    /// Creates an empty manifest.
    #[must_use]
    pub const fn new(format: ArchiveType) -> Self {
        Self {
            format,
            entries: Vec::new(),
            total_entries: 0,
            total_size: 0,
        }
    }

    /// Appends a member and updates the totals.
    pub fn add_entry(&mut self, entry: ManifestEntry) {
        self.total_entries += 1;
        self.total_size += entry.size;
        self.entries.push(entry);
    }
}
