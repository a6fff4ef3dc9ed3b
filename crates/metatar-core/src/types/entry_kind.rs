//! Archive entry kind enumeration.

use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde::de;

/// Type of an entry, as recorded in the metadata document.
///
/// The variants follow the tar type flags, since tar is the richest of the
/// two formats. Each kind has a stable human-readable name used in the YAML
/// `Type` field.
///
/// # Examples
///
/// ```
/// use metatar_core::EntryKind;
///
/// assert_eq!(EntryKind::from_name("symlink"), EntryKind::Symlink);
/// assert_eq!(EntryKind::CharDevice.to_string(), "character device node");
/// assert!(EntryKind::BlockDevice.is_device());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EntryKind {
    /// Regular file (`'0'`).
    #[default]
    Regular,
    /// Old-style regular file (`'\0'`).
    RegularA,
    /// Hard link (`'1'`).
    Hardlink,
    /// Symbolic link (`'2'`).
    Symlink,
    /// Character device node (`'3'`).
    CharDevice,
    /// Block device node (`'4'`).
    BlockDevice,
    /// Directory (`'5'`).
    Directory,
    /// Named pipe (`'6'`).
    Fifo,
    /// Reserved / contiguous file (`'7'`).
    Reserved,
    /// PAX extended header (`'x'`).
    ExtendedHeader,
    /// PAX global extended header (`'g'`).
    GlobalExtendedHeader,
    /// GNU long name marker (`'L'`).
    LongName,
    /// GNU long link name marker (`'K'`).
    LongLink,
    /// GNU sparse file (`'S'`).
    Sparse,
    /// Any other raw tar type flag.
    Other(u8),
}

const NAMES: &[(EntryKind, &str)] = &[
    (EntryKind::Regular, "regular file"),
    (EntryKind::RegularA, "regular file (A)"),
    (EntryKind::Hardlink, "hard link"),
    (EntryKind::Symlink, "symlink"),
    (EntryKind::CharDevice, "character device node"),
    (EntryKind::BlockDevice, "block device node"),
    (EntryKind::Directory, "directory"),
    (EntryKind::Fifo, "fifo node"),
    (EntryKind::Reserved, "reserved"),
    (EntryKind::ExtendedHeader, "extended header"),
    (EntryKind::GlobalExtendedHeader, "global extended header"),
    (EntryKind::LongName, "next file has a long name"),
    (EntryKind::LongLink, "next file symlinks to a file with a long name"),
    (EntryKind::Sparse, "sparse file"),
];

impl EntryKind {
    /// Parses a kind from its document name.
    ///
    /// A decimal number is taken as a raw tar type flag. Anything else that
    /// is not a known name is read as a regular file.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        if let Some((kind, _)) = NAMES.iter().find(|(_, n)| *n == name) {
            return *kind;
        }
        name.trim()
            .parse::<u8>()
            .map_or(Self::Regular, Self::from_tar_byte)
    }

    /// Converts a raw tar type flag.
    #[must_use]
    pub const fn from_tar_byte(byte: u8) -> Self {
        match byte {
            b'0' => Self::Regular,
            b'\0' => Self::RegularA,
            b'1' => Self::Hardlink,
            b'2' => Self::Symlink,
            b'3' => Self::CharDevice,
            b'4' => Self::BlockDevice,
            b'5' => Self::Directory,
            b'6' => Self::Fifo,
            b'7' => Self::Reserved,
            b'x' => Self::ExtendedHeader,
            b'g' => Self::GlobalExtendedHeader,
            b'L' => Self::LongName,
            b'K' => Self::LongLink,
            b'S' => Self::Sparse,
            other => Self::Other(other),
        }
    }

    /// Returns the raw tar type flag.
    #[must_use]
    pub const fn tar_byte(self) -> u8 {
        match self {
            Self::Regular => b'0',
            Self::RegularA => b'\0',
            Self::Hardlink => b'1',
            Self::Symlink => b'2',
            Self::CharDevice => b'3',
            Self::BlockDevice => b'4',
            Self::Directory => b'5',
            Self::Fifo => b'6',
            Self::Reserved => b'7',
            Self::ExtendedHeader => b'x',
            Self::GlobalExtendedHeader => b'g',
            Self::LongName => b'L',
            Self::LongLink => b'K',
            Self::Sparse => b'S',
            Self::Other(byte) => byte,
        }
    }

    /// Returns `true` for both regular file flavours.
    #[must_use]
    pub const fn is_regular(self) -> bool {
        matches!(self, Self::Regular | Self::RegularA)
    }

    /// Returns `true` if this is a directory.
    #[must_use]
    pub const fn is_directory(self) -> bool {
        matches!(self, Self::Directory)
    }

    /// Returns `true` if this is a symlink.
    #[must_use]
    pub const fn is_symlink(self) -> bool {
        matches!(self, Self::Symlink)
    }

    /// Returns `true` if this is a hard link.
    #[must_use]
    pub const fn is_hardlink(self) -> bool {
        matches!(self, Self::Hardlink)
    }

    /// Returns `true` for character and block device nodes.
    #[must_use]
    pub const fn is_device(self) -> bool {
        matches!(self, Self::CharDevice | Self::BlockDevice)
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match NAMES.iter().find(|(kind, _)| kind == self) {
            Some((_, name)) => f.write_str(name),
            None => write!(f, "{}", self.tar_byte()),
        }
    }
}

impl Serialize for EntryKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EntryKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct KindVisitor;

        impl de::Visitor<'_> for KindVisitor {
            type Value = EntryKind;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an entry type name or a tar type flag number")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<EntryKind, E> {
                Ok(EntryKind::from_name(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<EntryKind, E> {
                u8::try_from(v)
                    .map(EntryKind::from_tar_byte)
                    .map_err(|_| E::custom(format!("type flag out of range: {v}")))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<EntryKind, E> {
                u8::try_from(v)
                    .map(EntryKind::from_tar_byte)
                    .map_err(|_| E::custom(format!("type flag out of range: {v}")))
            }

            fn visit_unit<E: de::Error>(self) -> Result<EntryKind, E> {
                Ok(EntryKind::Regular)
            }
        }

        deserializer.deserialize_any(KindVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_roundtrip() {
        for (kind, name) in NAMES {
            assert_eq!(EntryKind::from_name(name), *kind);
            assert_eq!(kind.to_string(), *name);
        }
    }

    #[test]
    fn test_unknown_name_is_regular() {
        assert_eq!(EntryKind::from_name("socket"), EntryKind::Regular);
        assert_eq!(EntryKind::from_name(""), EntryKind::Regular);
    }

    #[test]
    fn test_numeric_name_is_raw_flag() {
        assert_eq!(EntryKind::from_name("53"), EntryKind::Directory);
        assert_eq!(EntryKind::from_name("65"), EntryKind::Other(b'A'));
        assert_eq!(EntryKind::Other(b'A').to_string(), "65");
    }

    #[test]
    fn test_tar_byte_roundtrip() {
        for byte in [b'0', b'\0', b'1', b'2', b'5', b'x', b'g', b'S', b'Z'] {
            assert_eq!(EntryKind::from_tar_byte(byte).tar_byte(), byte);
        }
    }

    #[test]
    fn test_predicates() {
        assert!(EntryKind::RegularA.is_regular());
        assert!(!EntryKind::Hardlink.is_regular());
        assert!(EntryKind::CharDevice.is_device());
        assert!(!EntryKind::Fifo.is_device());
        assert!(EntryKind::Directory.is_directory());
        assert!(EntryKind::Symlink.is_symlink());
        assert!(EntryKind::Hardlink.is_hardlink());
    }

    #[test]
    fn test_default_is_regular() {
        assert_eq!(EntryKind::default(), EntryKind::Regular);
    }
}
