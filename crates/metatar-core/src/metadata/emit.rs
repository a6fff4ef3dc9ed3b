//! Encoding policy for metadata documents.

use serde::Serialize;
use serde::Serializer;
use serde::ser::SerializeMap;

use super::ArchiveMetadata;
use super::Entry;

/// Controls which fields are written when a document is encoded.
///
/// With `omit_defaults`, `Filename`, `Type`, `Mode` and the owner fields
/// are always written and every other field only when it differs from its
/// default. Without it, every field is written. `include_owner = false`
/// drops `UID`, `GID`, `Username` and `Groupname` in both modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmitPolicy {
    /// Leave out fields that hold their default value.
    pub omit_defaults: bool,
    /// Write the owner fields.
    pub include_owner: bool,
}

impl Default for EmitPolicy {
    fn default() -> Self {
        Self {
            omit_defaults: true,
            include_owner: true,
        }
    }
}

impl EmitPolicy {
    /// Policy writing every field.
    #[must_use]
    pub const fn expanded() -> Self {
        Self {
            omit_defaults: false,
            include_owner: true,
        }
    }

    pub(crate) const fn view(self, metadata: &ArchiveMetadata) -> DocumentView<'_> {
        DocumentView {
            metadata,
            policy: self,
        }
    }
}

pub(crate) struct DocumentView<'a> {
    metadata: &'a ArchiveMetadata,
    policy: EmitPolicy,
}

struct EntryView<'a> {
    entry: &'a Entry,
    policy: EmitPolicy,
}

struct EntriesView<'a> {
    entries: &'a [Entry],
    policy: EmitPolicy,
}

impl Serialize for DocumentView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("MetaTAR Version", &self.metadata.format_version)?;
        map.serialize_entry(
            "Contents",
            &EntriesView {
                entries: &self.metadata.entries,
                policy: self.policy,
            },
        )?;
        if !(self.policy.omit_defaults && self.metadata.skip_list.is_empty()) {
            map.serialize_entry("SkipList", &self.metadata.skip_list)?;
        }
        map.end()
    }
}

impl Serialize for EntriesView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entries.iter().map(|entry| EntryView {
            entry,
            policy: self.policy,
        }))
    }
}

impl Serialize for EntryView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let e = self.entry;
        let full = !self.policy.omit_defaults;
        let mut map = serializer.serialize_map(None)?;

        map.serialize_entry("Filename", &e.path)?;
        if full || e.skip {
            map.serialize_entry("Skip", &e.skip)?;
        }
        if full || e.rename.is_some() {
            map.serialize_entry("Rename", e.rename.as_deref().unwrap_or_default())?;
        }
        if full || !e.link_target.is_empty() {
            map.serialize_entry("Linkname", &e.link_target)?;
        }
        if full || e.strip_blank_lines {
            map.serialize_entry("StripEmptyLines", &e.strip_blank_lines)?;
        }
        if full || e.strip_comments {
            map.serialize_entry("StripComments", &e.strip_comments)?;
        }
        map.serialize_entry("Type", &e.kind)?;
        map.serialize_entry("Mode", &e.mode)?;
        if self.policy.include_owner {
            map.serialize_entry("UID", &e.uid)?;
            map.serialize_entry("GID", &e.gid)?;
            map.serialize_entry("Username", &e.user)?;
            map.serialize_entry("Groupname", &e.group)?;
        }
        if full || e.device_major != 0 {
            map.serialize_entry("Devmajor", &e.device_major)?;
        }
        if full || e.device_minor != 0 {
            map.serialize_entry("Devminor", &e.device_minor)?;
        }
        if full || e.declared_size != 0 {
            map.serialize_entry("Size", &e.declared_size)?;
        }
        if full || e.encoded_body.is_some() {
            map.serialize_entry("Body", e.encoded_body.as_deref().unwrap_or_default())?;
        }
        if full || !e.xattrs.is_empty() {
            map.serialize_entry("Xattrs", &e.xattrs)?;
        }
        map.end()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::metadata::Xattr;
    use crate::types::EntryKind;
    use crate::types::Mode;

    fn sample() -> ArchiveMetadata {
        let mut entry = Entry::new("etc/motd", EntryKind::Regular);
        entry.mode = Mode::new(0o644);
        entry.user = "root".into();
        entry.group = "root".into();
        let mut metadata = ArchiveMetadata::new();
        metadata.entries.push(entry);
        metadata
    }

    #[test]
    fn test_compact_omits_defaults() {
        let yaml = sample().to_yaml(EmitPolicy::default()).unwrap();
        assert!(yaml.contains("MetaTAR Version: 2.0"));
        assert!(yaml.contains("Filename: etc/motd"));
        assert!(yaml.contains("Type: regular file"));
        assert!(yaml.contains("Mode: '0644'"));
        assert!(yaml.contains("Username: root"));
        assert!(!yaml.contains("Skip"));
        assert!(!yaml.contains("Rename"));
        assert!(!yaml.contains("Devmajor"));
        assert!(!yaml.contains("Body"));
        assert!(!yaml.contains("SkipList"));
    }

    #[test]
    fn test_expanded_writes_everything() {
        let yaml = sample().to_yaml(EmitPolicy::expanded()).unwrap();
        for key in [
            "Skip: false",
            "Rename: ''",
            "Linkname: ''",
            "StripEmptyLines: false",
            "StripComments: false",
            "Devmajor: 0",
            "Devminor: 0",
            "Size: 0",
            "Body: ''",
            "Xattrs: []",
            "SkipList: []",
        ] {
            assert!(yaml.contains(key), "missing {key} in:\n{yaml}");
        }
    }

    #[test]
    fn test_without_owner() {
        let policy = EmitPolicy {
            omit_defaults: true,
            include_owner: false,
        };
        let yaml = sample().to_yaml(policy).unwrap();
        assert!(!yaml.contains("UID"));
        assert!(!yaml.contains("GID"));
        assert!(!yaml.contains("Username"));
        assert!(!yaml.contains("Groupname"));
    }

    #[test]
    fn test_encode_decode_preserves_entries() {
        let mut metadata = sample();
        let entry = &mut metadata.entries[0];
        entry.rename = Some("etc/issue".into());
        entry.xattrs.push(Xattr::new("user.a", "b"));
        entry.encoded_body = Some("aGk=".into());
        entry.declared_size = 2;
        metadata.skip_list.push("*.tmp".into());

        for policy in [EmitPolicy::default(), EmitPolicy::expanded()] {
            let yaml = metadata.to_yaml(policy).unwrap();
            assert_eq!(ArchiveMetadata::from_yaml(&yaml).unwrap(), metadata);
        }
    }
}
