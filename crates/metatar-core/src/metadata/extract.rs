//! Building a metadata document from an existing archive.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;
use tracing::info;

use super::ArchiveMetadata;
use crate::Result;
use crate::SaveConfig;
use crate::formats::detect::ArchiveType;
use crate::formats::tar;

/// Describes every member of a tar archive as a metadata document.
///
/// Entries appear in archive order. With `config.with_body`, member data is
/// stored base64 encoded together with its length.
///
/// # Errors
///
/// Returns an error if the archive cannot be decompressed or parsed.
/// Cpio input is rejected with
/// [`MetatarError::UnsupportedFormat`](crate::MetatarError::UnsupportedFormat).
///
/// # Examples
///
/// ```
/// use metatar_core::SaveConfig;
/// use metatar_core::extract_metadata;
/// use metatar_core::formats::ArchiveType;
/// use metatar_core::test_utils::TarTestBuilder;
///
/// # fn main() -> Result<(), metatar_core::MetatarError> {
/// let archive = TarTestBuilder::new().add_file("motd", b"hi").build();
/// let config = SaveConfig::default().with_body(true);
/// let metadata = extract_metadata(&archive, ArchiveType::Tar, &config)?;
/// assert_eq!(metadata.entries[0].encoded_body.as_deref(), Some("aGk="));
/// assert_eq!(metadata.entries[0].declared_size, 2);
/// # Ok(())
/// # }
/// ```
pub fn extract_metadata(
    bytes: &[u8],
    format: ArchiveType,
    config: &SaveConfig,
) -> Result<ArchiveMetadata> {
    let members = tar::read_members(tar::decoder(bytes, format)?)?;

    let mut metadata = ArchiveMetadata::new();
    metadata.entries.reserve(members.len());
    for member in members {
        let mut entry = member.entry;
        if config.root {
            entry.set_root_owner();
        }
        if config.with_body {
            if member.body.is_empty() {
                debug!(path = %entry.path, "empty, body not written");
            } else {
                entry.declared_size = member.body.len() as u64;
                entry.encoded_body = Some(STANDARD.encode(&member.body));
            }
        }
        metadata.entries.push(entry);
    }

    info!(
        entries = metadata.entries.len(),
        format = format.name(),
        "extracted metadata"
    );
    Ok(metadata)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::metadata::Xattr;
    use crate::test_utils::TarTestBuilder;
    use crate::types::EntryKind;

    fn archive() -> Vec<u8> {
        TarTestBuilder::new()
            .add_directory("etc/")
            .add_file_with_owner("etc/motd", b"hello", (1000, "alice"), (100, "users"))
            .add_char_device("dev/console", 5, 1)
            .add_file("empty", b"")
            .build()
    }

    #[test]
    fn test_entries_follow_archive() {
        let metadata = extract_metadata(&archive(), ArchiveType::Tar, &SaveConfig::default())
            .unwrap();
        let paths: Vec<&str> = metadata.entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, ["etc/", "etc/motd", "dev/console", "empty"]);

        let motd = &metadata.entries[1];
        assert_eq!(motd.user, "alice");
        assert_eq!(motd.gid, 100);
        assert!(motd.encoded_body.is_none());

        let console = &metadata.entries[2];
        assert_eq!(console.kind, EntryKind::CharDevice);
        assert_eq!((console.device_major, console.device_minor), (5, 1));
    }

    #[test]
    fn test_root_and_body() {
        let config = SaveConfig::default().with_root(true).with_body(true);
        let metadata = extract_metadata(&archive(), ArchiveType::Tar, &config).unwrap();

        let motd = &metadata.entries[1];
        assert_eq!(motd.owner_label(), "root:root");
        assert_eq!(motd.uid, 0);
        assert_eq!(motd.encoded_body.as_deref(), Some("aGVsbG8="));
        assert_eq!(motd.declared_size, 5);

        let empty = &metadata.entries[3];
        assert!(empty.encoded_body.is_none());
        assert_eq!(empty.declared_size, 0);
    }

    #[test]
    fn test_xattrs_are_recorded() {
        let bytes = TarTestBuilder::new()
            .add_file_with_xattrs("bin/ping", b"\x7fELF", &[("security.capability", "net")])
            .build();
        let metadata = extract_metadata(&bytes, ArchiveType::Tar, &SaveConfig::default()).unwrap();
        assert_eq!(
            metadata.entries[0].xattrs,
            vec![Xattr::new("security.capability", "net")]
        );
    }

    #[test]
    fn test_version_is_current() {
        let metadata = extract_metadata(&archive(), ArchiveType::Tar, &SaveConfig::default())
            .unwrap();
        assert!(metadata.version_notice().is_none());
        assert!((metadata.format_version - crate::metadata::FORMAT_VERSION).abs() < f64::EPSILON);
    }
}
