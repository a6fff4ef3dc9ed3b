//! Error conversion utilities for CLI.
//!
//! Converts metatar-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::Result;
use anyhow::anyhow;
use metatar_core::MetatarError;
use std::path::Path;

/// Converts `MetatarError` to user-friendly anyhow error with context.
///
/// `input` is the file the failing operation was reading.
pub fn convert_metatar_error(err: MetatarError, input: &Path) -> anyhow::Error {
    match err {
        MetatarError::OutputExists { path } => {
            anyhow!(
                "Refusing to overwrite '{path}'\n\
                 HINT: Use --force to replace the existing file."
            )
        }
        MetatarError::SizeMismatch {
            path,
            declared,
            actual,
        } => {
            anyhow!(
                "Size of '{path}' in '{}' is {declared} but its body holds {actual} bytes\n\
                 HINT: Remove the Size field or save the metadata again with --data.",
                input.display()
            )
        }
        MetatarError::MalformedBody { path } => {
            anyhow!(
                "Body of '{path}' in '{}' is not valid base64\n\
                 HINT: Bodies use the standard alphabet with padding.",
                input.display()
            )
        }
        MetatarError::InvalidDeviceFields { path } => {
            anyhow!(
                "'{path}' in '{}' has device numbers but is not a device node\n\
                 HINT: Set Type to \"character device node\" or \"block device node\", \
                 or remove Devmajor and Devminor.",
                input.display()
            )
        }
        MetatarError::UnsupportedKind { path, kind, format } => {
            anyhow!(
                "'{path}' has type \"{kind}\", which {format} output cannot store\n\
                 HINT: Mark the entry with Skip: true or add it to the SkipList."
            )
        }
        MetatarError::MissingMetadata { path } => {
            anyhow!(
                "'{path}' was written but has no entry in '{}'\n\
                 HINT: The metadata may be corrupted. Save it again from the source archive.",
                input.display()
            )
        }
        MetatarError::DirectorySuffix { path } => {
            anyhow!(
                "'{path}' ends with a slash but is not a directory\n\
                 HINT: Set Type to directory or drop the trailing slash."
            )
        }
        MetatarError::InvalidPattern { pattern, reason } => {
            anyhow!(
                "Invalid SkipList pattern {pattern:?} in '{}': {reason}\n\
                 HINT: Patterns use shell glob syntax: *, ? and [...].",
                input.display()
            )
        }
        MetatarError::Overlay(yaml_err) => {
            anyhow!(
                "Invalid metadata file '{}': {yaml_err}\n\
                 HINT: Check the YAML syntax and the field names.",
                input.display()
            )
        }
        MetatarError::Io(io_err) => {
            anyhow!("I/O error while processing '{}': {}", input.display(), io_err)
        }
        MetatarError::UnsupportedFormat => {
            anyhow!(
                "Archive format not supported: {}\n\
                 HINT: Supported formats: tar, tar.gz, tar.bz2, tar.xz, tar.zst, cpio",
                input.display()
            )
        }
        MetatarError::InvalidArchive(reason) => {
            anyhow!(
                "Invalid archive '{}': {}\n\
                 HINT: The archive may be corrupted or malformed.",
                input.display(),
                reason
            )
        }
    }
}

/// Adds context to the result of a metatar-core operation.
pub fn add_input_context<T>(result: Result<T, MetatarError>, input: &Path) -> anyhow::Result<T> {
    result.map_err(|e| convert_metatar_error(e, input))
}
