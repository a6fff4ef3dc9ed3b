//! Tar archive reading and writing.
//!
//! Reading goes through the `tar` crate, which folds GNU long names and PAX
//! records into the entries it yields. Writing fills the raw header fields
//! directly: member names are taken verbatim from the metadata, including
//! absolute names and `..` components the crate's path setters refuse.

use std::io;
use std::io::Read;

use flate2::read::GzDecoder;
use tracing::debug;

use crate::MetatarError;
use crate::Result;
use crate::formats::detect::ArchiveType;
use crate::formats::traits::ArchiveSink;
use crate::formats::traits::EntryHeader;
use crate::metadata::Entry;
use crate::metadata::Xattr;
use crate::types::EntryKind;
use crate::types::Mode;

const XATTR_PREFIX: &str = "SCHILY.xattr.";
const LONG_LINK_NAME: &[u8] = b"././@LongLink";
const NAME_FIELD_LEN: usize = 100;

/// One member of a tar stream.
#[derive(Debug, Clone, PartialEq)]
pub struct TarMember {
    /// Metadata derived from the member header. The body fields are unset.
    pub entry: Entry,
    /// Member data.
    pub body: Vec<u8>,
}

/// Returns a reader yielding the plain tar stream of a possibly compressed
/// archive.
///
/// # Errors
///
/// Returns [`MetatarError::UnsupportedFormat`] for cpio input.
pub fn decoder<'a>(bytes: &'a [u8], format: ArchiveType) -> Result<Box<dyn Read + 'a>> {
    Ok(match format {
        ArchiveType::Tar => Box::new(bytes),
        ArchiveType::TarGz => Box::new(GzDecoder::new(bytes)),
        ArchiveType::TarBz2 => Box::new(bzip2::read::BzDecoder::new(bytes)),
        ArchiveType::TarXz => Box::new(xz2::read::XzDecoder::new(bytes)),
        ArchiveType::TarZst => Box::new(zstd::stream::read::Decoder::new(bytes)?),
        ArchiveType::Cpio => return Err(MetatarError::UnsupportedFormat),
    })
}

fn invalid(context: &str, e: impl std::fmt::Display) -> MetatarError {
    MetatarError::InvalidArchive(format!("{context}: {e}"))
}

/// Reads every member of a tar stream, in archive order.
///
/// # Errors
///
/// Returns [`MetatarError::InvalidArchive`] if a header cannot be parsed.
pub fn read_members<R: Read>(reader: R) -> Result<Vec<TarMember>> {
    let mut archive = tar::Archive::new(reader);
    let entries = archive
        .entries()
        .map_err(|e| invalid("failed to read tar entries", e))?;

    let mut members = Vec::new();
    let mut previous = String::new();
    for entry_result in entries {
        let mut member = entry_result.map_err(|e| {
            invalid(&format!("failed to read tar entry after {previous:?}"), e)
        })?;
        let entry = member_entry(&mut member)?;
        let mut body = Vec::new();
        member.read_to_end(&mut body)?;
        previous.clone_from(&entry.path);
        members.push(TarMember { entry, body });
    }
    debug!(count = members.len(), "read tar members");
    Ok(members)
}

fn member_entry<R: Read>(member: &mut tar::Entry<'_, R>) -> Result<Entry> {
    let path = String::from_utf8_lossy(&member.path_bytes()).into_owned();
    let link_target = member
        .link_name_bytes()
        .map(|b| String::from_utf8_lossy(&b).into_owned())
        .unwrap_or_default();

    let header = member.header();
    let kind = EntryKind::from_tar_byte(header.as_old().linkflag[0]);
    let mode = header.mode().map_err(|e| invalid(&path, e))?;
    let uid = header.uid().map_err(|e| invalid(&path, e))?;
    let gid = header.gid().map_err(|e| invalid(&path, e))?;
    let user = header
        .username()
        .map_err(|e| invalid(&path, e))?
        .unwrap_or_default()
        .to_string();
    let group = header
        .groupname()
        .map_err(|e| invalid(&path, e))?
        .unwrap_or_default()
        .to_string();
    let device_major = header
        .device_major()
        .ok()
        .flatten()
        .unwrap_or_default();
    let device_minor = header
        .device_minor()
        .ok()
        .flatten()
        .unwrap_or_default();

    let mut xattrs = Vec::new();
    if let Some(extensions) = member.pax_extensions().map_err(|e| invalid(&path, e))? {
        for extension in extensions {
            let extension = extension.map_err(|e| invalid(&path, e))?;
            let Ok(key) = extension.key() else { continue };
            if let Some(name) = key.strip_prefix(XATTR_PREFIX) {
                let value = String::from_utf8_lossy(extension.value_bytes()).into_owned();
                xattrs.push(Xattr::new(name, value));
            }
        }
    }

    Ok(Entry {
        path,
        link_target,
        kind,
        mode: Mode::new(mode),
        uid,
        gid,
        user,
        group,
        device_major,
        device_minor,
        xattrs,
        ..Entry::default()
    })
}

/// Order-independent output format writing GNU tar.
pub struct TarSink {
    builder: tar::Builder<Vec<u8>>,
    mtime: u64,
}

impl TarSink {
    /// Creates a sink stamping every member with `mtime`.
    #[must_use]
    pub fn new(mtime: u64) -> Self {
        Self {
            builder: tar::Builder::new(Vec::new()),
            mtime,
        }
    }

    /// Emits a GNU `L` or `K` record carrying a name that does not fit the
    /// 100 byte header field.
    fn append_long_name(&mut self, flag: u8, name: &[u8]) -> io::Result<()> {
        let mut data = Vec::with_capacity(name.len() + 1);
        data.extend_from_slice(name);
        data.push(0);

        let mut header = tar::Header::new_gnu();
        header.as_old_mut().name[..LONG_LINK_NAME.len()].copy_from_slice(LONG_LINK_NAME);
        header.set_mode(0o644);
        header.set_uid(0);
        header.set_gid(0);
        header.set_mtime(0);
        header.set_size(data.len() as u64);
        header.as_old_mut().linkflag = [flag];
        header.set_cksum();
        self.builder.append(&header, data.as_slice())
    }
}

fn fill_name(field: &mut [u8; NAME_FIELD_LEN], name: &[u8]) {
    let len = name.len().min(NAME_FIELD_LEN);
    field[..len].copy_from_slice(&name[..len]);
}

/// Returns `true` if members of this kind carry data in a tar stream.
const fn carries_data(kind: EntryKind) -> bool {
    !matches!(
        kind,
        EntryKind::Hardlink
            | EntryKind::Symlink
            | EntryKind::CharDevice
            | EntryKind::BlockDevice
            | EntryKind::Directory
            | EntryKind::Fifo
    )
}

impl ArchiveSink for TarSink {
    fn format_name(&self) -> &'static str {
        "tar"
    }

    fn requires_ordering(&self) -> bool {
        false
    }

    fn map_kind(&self, path: &str, kind: EntryKind) -> Result<EntryKind> {
        match kind {
            EntryKind::ExtendedHeader | EntryKind::LongName | EntryKind::LongLink => {
                Err(MetatarError::UnsupportedKind {
                    path: path.to_string(),
                    kind,
                    format: "tar",
                })
            }
            _ => Ok(kind),
        }
    }

    fn append(&mut self, header: &EntryHeader, body: &[u8]) -> Result<()> {
        let name = header.name.as_bytes();
        let link = header.link_target.as_bytes();
        if name.len() > NAME_FIELD_LEN {
            self.append_long_name(b'L', name)?;
        }
        if link.len() > NAME_FIELD_LEN {
            self.append_long_name(b'K', link)?;
        }

        if !header.xattrs.is_empty() {
            let keys: Vec<String> = header
                .xattrs
                .iter()
                .map(|x| format!("{XATTR_PREFIX}{}", x.key))
                .collect();
            self.builder.append_pax_extensions(
                keys.iter()
                    .map(String::as_str)
                    .zip(header.xattrs.iter().map(|x| x.value.as_bytes())),
            )?;
        }

        let data = if carries_data(header.kind) { body } else { &[] };

        let mut raw = tar::Header::new_gnu();
        fill_name(&mut raw.as_old_mut().name, name);
        fill_name(&mut raw.as_old_mut().linkname, link);
        raw.as_old_mut().linkflag = [header.kind.tar_byte()];
        raw.set_mode(header.mode);
        raw.set_uid(header.uid);
        raw.set_gid(header.gid);
        raw.set_mtime(self.mtime);
        raw.set_username(&header.user)?;
        raw.set_groupname(&header.group)?;
        raw.set_device_major(header.device_major)?;
        raw.set_device_minor(header.device_minor)?;
        raw.set_size(data.len() as u64);
        raw.set_cksum();

        debug!(name = %header.name, kind = %header.kind, size = data.len(), "tar member");
        self.builder.append(&raw, data)?;
        Ok(())
    }

    fn finish(self) -> Result<Vec<u8>> {
        Ok(self.builder.into_inner()?)
    }
}
