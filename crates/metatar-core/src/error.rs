//! Error and notice types for metadata operations.

use thiserror::Error;

use crate::types::EntryKind;

/// Result type alias using `MetatarError`.
pub type Result<T> = std::result::Result<T, MetatarError>;

/// Errors that abort an apply, generate, save, merge or list operation.
///
/// Every variant is fatal: the operation that returned it produced no
/// output on permanent storage.
#[derive(Error, Debug)]
pub enum MetatarError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Archive could not be parsed.
    #[error("invalid archive: {0}")]
    InvalidArchive(String),

    /// Archive format is unsupported or unrecognized.
    #[error("unsupported archive format")]
    UnsupportedFormat,

    /// The YAML overlay could not be decoded or encoded.
    #[error("invalid metadata document: {0}")]
    Overlay(#[from] serde_yaml::Error),

    /// A skip list pattern is not a valid glob.
    #[error("invalid skip pattern {pattern:?}: {reason}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Parser message.
        reason: String,
    },

    /// An inline base64 body could not be decoded.
    #[error("could not decode base64 body for {path}")]
    MalformedBody {
        /// Entry path.
        path: String,
    },

    /// Declared body size disagrees with the decoded body length.
    #[error("size is wrong for {path}: {actual} != {declared}")]
    SizeMismatch {
        /// Entry path.
        path: String,
        /// Size declared in the overlay.
        declared: u64,
        /// Length of the decoded body.
        actual: u64,
    },

    /// Device numbers were given for an entry that is not a device node.
    #[error(
        "{path}: major and minor device numbers only apply to character and block device files"
    )]
    InvalidDeviceFields {
        /// Entry path.
        path: String,
    },

    /// The entry kind has no equivalent in the output format.
    #[error("{path}: {format} has no equivalent for entry type \"{kind}\"")]
    UnsupportedKind {
        /// Entry path.
        path: String,
        /// Offending kind.
        kind: EntryKind,
        /// Output format name.
        format: &'static str,
    },

    /// A body was consumed but no metadata exists for it.
    #[error("{path} is listed in the metadata, but the file itself is missing")]
    MissingMetadata {
        /// Path present in the body map.
        path: String,
    },

    /// A non-directory name ends with a slash.
    #[error("filename is not a directory but ends with a slash: {path}")]
    DirectorySuffix {
        /// Entry path.
        path: String,
    },

    /// Refused to overwrite an existing output file.
    #[error("{path} already exists")]
    OutputExists {
        /// Output path.
        path: String,
    },
}

impl MetatarError {
    /// Returns `true` if the error was caused by the overlay or the source
    /// archive contents rather than by the environment.
    ///
    /// # Examples
    ///
    /// ```
    /// use metatar_core::MetatarError;
    ///
    /// let err = MetatarError::MalformedBody { path: "a.txt".into() };
    /// assert!(err.is_input_error());
    ///
    /// let err = MetatarError::Io(std::io::Error::other("disk full"));
    /// assert!(!err.is_input_error());
    /// ```
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidArchive(_)
                | Self::Overlay(_)
                | Self::InvalidPattern { .. }
                | Self::MalformedBody { .. }
                | Self::SizeMismatch { .. }
                | Self::InvalidDeviceFields { .. }
                | Self::UnsupportedKind { .. }
                | Self::MissingMetadata { .. }
                | Self::DirectorySuffix { .. }
        )
    }

    /// Returns the archive path the error is about, if any.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::MalformedBody { path }
            | Self::SizeMismatch { path, .. }
            | Self::InvalidDeviceFields { path }
            | Self::UnsupportedKind { path, .. }
            | Self::MissingMetadata { path }
            | Self::DirectorySuffix { path }
            | Self::OutputExists { path } => Some(path),
            _ => None,
        }
    }
}

/// Non-fatal observations made while processing metadata.
///
/// Notices are collected in reports and logged; they never stop an
/// operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// The overlay was written by a newer engine.
    FutureVersion {
        /// Version found in the document.
        found: f64,
    },
    /// An entry for an already emitted path was ignored.
    DuplicateFilename {
        /// The duplicated path.
        path: String,
    },
    /// A rename targeted a path that already has a body.
    RenameCollision {
        /// Declared path.
        from: String,
        /// Rename target.
        to: String,
    },
    /// A zero-length regular file was written.
    EmptyRegularFile {
        /// Entry path.
        path: String,
    },
    /// A hard link was written as a symlink.
    HardlinkAsSymlink {
        /// Entry path.
        path: String,
    },
    /// An entry had no mode and received the default.
    DefaultMode {
        /// Entry path.
        path: String,
        /// Mode that was used.
        mode: u32,
    },
    /// A source archive path was not referenced by the overlay.
    Unreferenced {
        /// Source path.
        path: String,
    },
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FutureVersion { found } => {
                write!(f, "metadata is from the future, from metatar {found}")
            }
            Self::DuplicateFilename { path } => write!(f, "skipping duplicate filename: {path}"),
            Self::RenameCollision { from, to } => {
                write!(f, "rename {from} -> {to}: {to} already exists")
            }
            Self::EmptyRegularFile { path } => write!(f, "size of {path} is 0"),
            Self::HardlinkAsSymlink { path } => {
                write!(f, "hard link {path} is stored as a symlink in cpio")
            }
            Self::DefaultMode { path, mode } => {
                write!(f, "using default file permissions for {path}: {mode:04o}")
            }
            Self::Unreferenced { path } => write!(f, "{path} from the source archive was skipped"),
        }
    }
}
