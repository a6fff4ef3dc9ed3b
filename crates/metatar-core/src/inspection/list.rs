//! Archive listing implementation.

use tracing::debug;

use crate::Result;
use crate::formats::cpio;
use crate::formats::cpio::CpioHeader;
use crate::formats::detect::ArchiveType;
use crate::formats::tar;
use crate::formats::tar::TarMember;
use crate::inspection::manifest::ArchiveManifest;
use crate::inspection::manifest::ManifestEntry;

/// Lists the members of an archive held in memory.
///
/// Compressed tar archives are decompressed on the fly. Nothing is written
/// anywhere.
///
/// # Errors
///
/// Returns an error if the archive cannot be decompressed or parsed.
pub fn list_archive(bytes: &[u8], format: ArchiveType) -> Result<ArchiveManifest> {
    let mut manifest = ArchiveManifest::new(format);
    if format.is_tar() {
        for member in tar::read_members(tar::decoder(bytes, format)?)? {
            manifest.add_entry(from_tar(member));
        }
    } else {
        for (header, data) in cpio::read_all(bytes)? {
            manifest.add_entry(from_cpio(&header, data.len()));
        }
    }
    debug!(
        format = format.name(),
        entries = manifest.total_entries,
        "listed archive"
    );
    Ok(manifest)
}

fn from_tar(member: TarMember) -> ManifestEntry {
    let entry = member.entry;
    let link_target = (!entry.link_target.is_empty()).then_some(entry.link_target);
    ManifestEntry {
        path: entry.path,
        kind: entry.kind.to_string(),
        mode: entry.mode.bits(),
        uid: entry.uid,
        gid: entry.gid,
        user: entry.user,
        group: entry.group,
        device_major: entry.device_major,
        device_minor: entry.device_minor,
        size: member.body.len() as u64,
        link_target,
    }
}

fn from_cpio(header: &CpioHeader, data_len: usize) -> ManifestEntry {
    ManifestEntry {
        path: header.name.clone(),
        kind: header.type_name(),
        mode: header.permissions(),
        uid: u64::from(header.uid),
        gid: u64::from(header.gid),
        user: String::new(),
        group: String::new(),
        device_major: header.rdev_major,
        device_minor: header.rdev_minor,
        size: data_len as u64,
        link_target: None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use flate2::Compression;
    use flate2::write::GzEncoder;

    use super::*;
    use crate::ApplyConfig;
    use crate::ArchiveMetadata;
    use crate::OutputFormat;
    use crate::test_utils::TarTestBuilder;

    #[test]
    fn test_list_empty_tar() {
        let bytes = TarTestBuilder::new().build();
        let manifest = list_archive(&bytes, ArchiveType::Tar).unwrap();
        assert_eq!(manifest.total_entries, 0);
        assert_eq!(manifest.total_size, 0);
        assert_eq!(manifest.format, ArchiveType::Tar);
    }

    #[test]
    fn test_list_tar_gz() {
        let tar_data = TarTestBuilder::new()
            .add_file("file.txt", b"test content")
            .add_symlink("link", "file.txt")
            .add_char_device("dev/null", 1, 3)
            .build();
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&tar_data).unwrap();
        let compressed = encoder.finish().unwrap();

        let manifest = list_archive(&compressed, ArchiveType::TarGz).unwrap();
        assert_eq!(manifest.total_entries, 3);
        assert_eq!(manifest.total_size, 12);
        assert_eq!(manifest.entries[0].owner_label(), "root:root");
        assert_eq!(manifest.entries[1].kind, "symlink");
        assert_eq!(manifest.entries[1].link_target.as_deref(), Some("file.txt"));
        assert_eq!(manifest.entries[2].kind, "character device node");
        assert_eq!(
            (manifest.entries[2].device_major, manifest.entries[2].device_minor),
            (1, 3)
        );
    }

    #[test]
    fn test_list_cpio() {
        let metadata = ArchiveMetadata::from_yaml(
            "Contents:\n- Filename: etc/motd\n  Mode: \"0644\"\n  Body: aGk=\n",
        )
        .unwrap();
        let output =
            crate::generate(&metadata, OutputFormat::Cpio, &ApplyConfig::default()).unwrap();

        let manifest = list_archive(&output.bytes, ArchiveType::Cpio).unwrap();
        let names: Vec<_> = manifest.entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(names, ["etc/", "etc/motd"]);
        assert_eq!(manifest.entries[0].kind, "directory");
        assert_eq!(manifest.entries[0].mode, 0o555);
        assert_eq!(manifest.entries[1].mode, 0o644);
        assert_eq!(manifest.entries[1].size, 2);
    }

    #[test]
    fn test_list_garbage() {
        assert!(list_archive(&[b'x'; 200], ArchiveType::Cpio).is_err());
    }
}
