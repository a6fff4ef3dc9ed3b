//! The metadata overlay: a YAML description of every archive member.
//!
//! An [`ArchiveMetadata`] document lists [`Entry`] records in archive order
//! together with a skip list. Documents are decoded leniently (unknown keys
//! are ignored, missing keys take their defaults) and encoded according to
//! an [`EmitPolicy`].
//!
//! # Examples
//!
//! ```
//! use metatar_core::ArchiveMetadata;
//! use metatar_core::EntryKind;
//!
//! # fn main() -> Result<(), metatar_core::MetatarError> {
//! let doc = r#"
//! MetaTAR Version: 2.0
//! Contents:
//! - Filename: etc/
//!   Type: directory
//!   Mode: "0755"
//! - Filename: etc/motd
//!   Mode: "0644"
//!   StripEmptyLines: true
//! SkipList:
//! - "*.orig"
//! "#;
//! let metadata = ArchiveMetadata::from_yaml(doc)?;
//! assert_eq!(metadata.entries.len(), 2);
//! assert_eq!(metadata.entries[0].kind, EntryKind::Directory);
//! assert!(metadata.entries[1].strip_blank_lines);
//! # Ok(())
//! # }
//! ```

pub mod emit;
pub mod extract;
pub mod merge;

pub use emit::EmitPolicy;
pub use extract::extract_metadata;
pub use merge::MergeOutput;
pub use merge::merge;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

use crate::Result;
use crate::error::Notice;
use crate::types::EntryKind;
use crate::types::Mode;

/// Version of the metadata format written by this engine.
pub const FORMAT_VERSION: f64 = 2.0;

/// One extended attribute of an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Xattr {
    /// Attribute name, e.g. `security.capability`.
    pub key: String,
    /// Attribute value.
    pub value: String,
}

impl Xattr {
    /// Creates an attribute.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// One declared archive member.
///
/// Field names follow the YAML document keys given in the serde
/// attributes. Every field is optional in a document except `Filename`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Entry {
    /// Archive-relative path of the member in the source archive.
    #[serde(rename = "Filename")]
    pub path: String,

    /// Leave the member out of the output.
    #[serde(rename = "Skip")]
    pub skip: bool,

    /// New name for the member in the output.
    #[serde(rename = "Rename", deserialize_with = "empty_as_none")]
    pub rename: Option<String>,

    /// Target of a symlink or hard link.
    #[serde(rename = "Linkname", deserialize_with = "null_as_default")]
    pub link_target: String,

    /// Collapse doubled newlines in the body.
    #[serde(rename = "StripEmptyLines")]
    pub strip_blank_lines: bool,

    /// Drop `#` comment lines from the body, keeping shebangs.
    #[serde(rename = "StripComments")]
    pub strip_comments: bool,

    /// Entry kind.
    #[serde(rename = "Type")]
    pub kind: EntryKind,

    /// Permission bits; unset means the policy default.
    #[serde(rename = "Mode")]
    pub mode: Mode,

    /// Numeric owner.
    #[serde(rename = "UID")]
    pub uid: u64,

    /// Numeric group.
    #[serde(rename = "GID")]
    pub gid: u64,

    /// Owner name.
    #[serde(rename = "Username", deserialize_with = "null_as_default")]
    pub user: String,

    /// Group name.
    #[serde(rename = "Groupname", deserialize_with = "null_as_default")]
    pub group: String,

    /// Device major number, only for device nodes.
    #[serde(rename = "Devmajor")]
    pub device_major: u32,

    /// Device minor number, only for device nodes.
    #[serde(rename = "Devminor")]
    pub device_minor: u32,

    /// Length of the decoded inline body, zero if unknown.
    #[serde(rename = "Size")]
    pub declared_size: u64,

    /// Inline body, base64 encoded.
    #[serde(rename = "Body", deserialize_with = "empty_as_none")]
    pub encoded_body: Option<String>,

    /// Extended attributes in document order.
    #[serde(rename = "Xattrs", deserialize_with = "null_as_default")]
    pub xattrs: Vec<Xattr>,
}

impl Entry {
    /// Creates an entry of the given kind with everything else defaulted.
    pub fn new(path: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            path: path.into(),
            kind,
            ..Self::default()
        }
    }

    /// Returns the name the entry will carry in the output.
    #[must_use]
    pub fn final_path(&self) -> &str {
        self.rename.as_deref().unwrap_or(&self.path)
    }

    /// Returns `true` if either device number is set.
    #[must_use]
    pub const fn has_device_numbers(&self) -> bool {
        self.device_major != 0 || self.device_minor != 0
    }

    /// Replaces the owner with `root:root` (0:0).
    pub fn set_root_owner(&mut self) {
        "root".clone_into(&mut self.user);
        "root".clone_into(&mut self.group);
        self.uid = 0;
        self.gid = 0;
    }

    /// Returns the owner for diagnostics, falling back to numeric ids.
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

/// A complete metadata document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ArchiveMetadata {
    /// Version of the engine that wrote the document.
    #[serde(rename = "MetaTAR Version", default)]
    pub format_version: f64,

    /// Entries in archive order.
    #[serde(rename = "Contents", default, deserialize_with = "null_as_default")]
    pub entries: Vec<Entry>,

    /// Exact names or glob patterns to leave out.
    #[serde(rename = "SkipList", default, deserialize_with = "null_as_default")]
    pub skip_list: Vec<String>,
}

impl Default for ArchiveMetadata {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveMetadata {
    /// Creates an empty document stamped with [`FORMAT_VERSION`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            format_version: FORMAT_VERSION,
            entries: Vec::new(),
            skip_list: Vec::new(),
        }
    }

    /// Decodes a YAML document.
    ///
    /// # Errors
    ///
    /// Returns [`MetatarError::Overlay`](crate::MetatarError::Overlay) if
    /// the document is not valid YAML or has ill-typed fields.
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Decodes a YAML document from raw bytes.
    pub fn from_yaml_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_yaml::from_slice(bytes)?)
    }

    /// Encodes the document as YAML.
    pub fn to_yaml(&self, policy: EmitPolicy) -> Result<String> {
        Ok(serde_yaml::to_string(&policy.view(self))?)
    }

    /// Returns a notice if the document was written by a newer engine.
    #[must_use]
    pub fn version_notice(&self) -> Option<Notice> {
        (self.format_version > FORMAT_VERSION).then_some(Notice::FutureVersion {
            found: self.format_version,
        })
    }
}

fn empty_as_none<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
