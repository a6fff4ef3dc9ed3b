//! Archive format detection.

use std::path::Path;

use crate::MetatarError;
use crate::Result;

const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];
const BZIP2_MAGIC: [u8; 3] = *b"BZh";
const XZ_MAGIC: [u8; 6] = [0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00];
const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];
const CPIO_NEWC_MAGIC: &[u8; 6] = b"070701";
const CPIO_CRC_MAGIC: &[u8; 6] = b"070702";

/// Supported archive formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveType {
    /// Tar archive (uncompressed).
    Tar,
    /// Gzip-compressed tar archive.
    TarGz,
    /// Bzip2-compressed tar archive.
    TarBz2,
    /// XZ-compressed tar archive.
    TarXz,
    /// Zstd-compressed tar archive.
    TarZst,
    /// newc cpio archive.
    Cpio,
}

impl ArchiveType {
    /// Returns `true` for the tar family, compressed or not.
    #[must_use]
    pub const fn is_tar(self) -> bool {
        !matches!(self, Self::Cpio)
    }

    /// Returns a short human-readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Tar => "tar",
            Self::TarGz => "tar.gz",
            Self::TarBz2 => "tar.bz2",
            Self::TarXz => "tar.xz",
            Self::TarZst => "tar.zst",
            Self::Cpio => "cpio",
        }
    }
}

/// Detects the archive type from a file path.
///
/// # Errors
///
/// Returns an error if the format cannot be determined.
pub fn detect_format(path: &Path) -> Result<ArchiveType> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .ok_or(MetatarError::UnsupportedFormat)?;

    let ext_lower = extension.to_ascii_lowercase();
    match ext_lower.as_str() {
        "tar" => Ok(ArchiveType::Tar),
        "gz" | "tgz" => Ok(ArchiveType::TarGz),
        "bz2" | "tbz" | "tbz2" => Ok(ArchiveType::TarBz2),
        "xz" | "txz" => Ok(ArchiveType::TarXz),
        "zst" | "tzst" => Ok(ArchiveType::TarZst),
        "cpio" => Ok(ArchiveType::Cpio),
        _ => Err(MetatarError::UnsupportedFormat),
    }
}

/// Detects the archive type from its leading bytes.
///
/// Anything that carries no known magic is assumed to be a plain tar
/// stream; the tar reader reports a proper error if it is not.
#[must_use]
pub fn detect_from_magic(bytes: &[u8]) -> ArchiveType {
    if bytes.starts_with(&GZIP_MAGIC) {
        ArchiveType::TarGz
    } else if bytes.starts_with(&BZIP2_MAGIC) {
        ArchiveType::TarBz2
    } else if bytes.starts_with(&XZ_MAGIC) {
        ArchiveType::TarXz
    } else if bytes.starts_with(&ZSTD_MAGIC) {
        ArchiveType::TarZst
    } else if bytes.starts_with(CPIO_NEWC_MAGIC) || bytes.starts_with(CPIO_CRC_MAGIC) {
        ArchiveType::Cpio
    } else {
        ArchiveType::Tar
    }
}

/// Detects the archive type from the path if it has a known extension,
/// otherwise from the content.
pub fn detect(path: Option<&Path>, bytes: &[u8]) -> ArchiveType {
    path.and_then(|p| detect_format(p).ok())
        .unwrap_or_else(|| detect_from_magic(bytes))
}
