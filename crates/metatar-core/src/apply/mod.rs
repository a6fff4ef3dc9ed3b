//! Building archives from a metadata overlay.
//!
//! [`apply`] combines an overlay with the bodies of an optional source
//! archive and writes a new tar or cpio archive. [`generate`] builds an
//! archive from inline bodies alone.

pub mod body;
pub mod ledger;
pub mod materialize;
pub mod reconcile;
pub mod rename;
pub mod skip;
pub mod source;
pub mod transform;

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

pub use ledger::EntryStatus;
pub use ledger::Ledger;
pub use reconcile::Reconciler;
pub use skip::SkipResolver;
pub use source::SourceArchive;

use crate::ApplyConfig;
use crate::OutputFormat;
use crate::Result;
use crate::formats::CpioSink;
use crate::formats::TarSink;
use crate::metadata::ArchiveMetadata;
use crate::report::ApplyReport;

/// A built archive together with the report of how it was built.
#[derive(Debug, Clone)]
pub struct ApplyOutput {
    /// Archive bytes.
    pub bytes: Vec<u8>,
    /// Build statistics and notices.
    pub report: ApplyReport,
}

/// Builds an archive from `metadata` and the bodies of `source`.
///
/// Entries are written in overlay order. For cpio output, missing parent
/// directories are synthesized before their children and source members
/// the overlay does not mention are appended in name order.
///
/// # Errors
///
/// Returns an error if the skip list is invalid, an inline body cannot be
/// decoded or has the wrong size, an entry cannot be represented in the
/// output format, or a device entry is malformed.
///
/// # Examples
///
/// ```
/// use metatar_core::ApplyConfig;
/// use metatar_core::ArchiveMetadata;
/// use metatar_core::OutputFormat;
/// use metatar_core::apply;
/// use metatar_core::apply::SourceArchive;
/// use metatar_core::formats::ArchiveType;
/// use metatar_core::test_utils::TarTestBuilder;
///
/// # fn main() -> Result<(), metatar_core::MetatarError> {
/// let tar = TarTestBuilder::new().add_file("etc/motd", b"hello\n").build();
/// let source = SourceArchive::from_archive(&tar, ArchiveType::Tar, false)?;
/// let metadata = ArchiveMetadata::from_yaml(
///     "Contents:\n- Filename: etc/motd\n  Mode: \"0644\"\n",
/// )?;
///
/// let output = apply(&metadata, Some(source), OutputFormat::Cpio, &ApplyConfig::default())?;
/// assert_eq!(output.report.directories_created, 1);
/// # Ok(())
/// # }
/// ```
pub fn apply(
    metadata: &ArchiveMetadata,
    source: Option<SourceArchive>,
    format: OutputFormat,
    config: &ApplyConfig,
) -> Result<ApplyOutput> {
    let source = source.unwrap_or_default();
    let (bytes, report) = match format {
        OutputFormat::Tar => {
            let sink = TarSink::new(config.mtime.unwrap_or(0));
            Reconciler::new(&metadata.skip_list, source, sink, config)?.run(metadata)?
        }
        OutputFormat::Cpio => {
            let sink = CpioSink::new(cpio_mtime(config.mtime));
            Reconciler::new(&metadata.skip_list, source, sink, config)?.run(metadata)?
        }
    };
    Ok(ApplyOutput { bytes, report })
}

/// Builds an archive from the inline bodies of `metadata` alone.
///
/// Inline bodies are always used, whatever `config.with_body` says.
///
/// # Errors
///
/// Same as [`apply`].
pub fn generate(
    metadata: &ArchiveMetadata,
    format: OutputFormat,
    config: &ApplyConfig,
) -> Result<ApplyOutput> {
    let config = config.clone().with_body(true);
    apply(metadata, None, format, &config)
}

/// cpio stores a 32-bit mtime; the current time is used unless one is
/// configured.
fn cpio_mtime(configured: Option<u64>) -> u32 {
    let secs = configured.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs())
    });
    u32::try_from(secs).unwrap_or(u32::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::cpio_body;
    use crate::test_utils::tar_names;

    #[test]
    fn test_generate_uses_inline_bodies() {
        let metadata = ArchiveMetadata::from_yaml(
            "Contents:\n- Filename: bin/hello\n  Mode: \"0755\"\n  Body: aGVsbG8=\n  Size: 5\n",
        )
        .unwrap();
        let output = generate(&metadata, OutputFormat::Cpio, &ApplyConfig::default()).unwrap();
        assert_eq!(cpio_body(&output.bytes, "bin/hello").unwrap(), b"hello");
    }

    #[test]
    fn test_apply_without_source_skips_files() {
        let metadata =
            ArchiveMetadata::from_yaml("Contents:\n- Filename: a\n- Filename: d/\n  Type: directory\n")
                .unwrap();
        let output = apply(&metadata, None, OutputFormat::Tar, &ApplyConfig::default()).unwrap();
        assert_eq!(tar_names(&output.bytes), ["d/"]);
    }

    #[test]
    fn test_invalid_skip_pattern() {
        let mut metadata = ArchiveMetadata::new();
        metadata.skip_list = vec!["[".into()];
        assert!(apply(&metadata, None, OutputFormat::Tar, &ApplyConfig::default()).is_err());
    }

    #[test]
    fn test_cpio_mtime() {
        assert_eq!(cpio_mtime(Some(42)), 42);
        assert_eq!(cpio_mtime(Some(u64::MAX)), u32::MAX);
        assert!(cpio_mtime(None) > 0);
    }
}
