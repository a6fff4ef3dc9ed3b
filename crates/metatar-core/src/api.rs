//! File-level API for saving, applying, generating, merging and listing.
//!
//! Every function that writes a file builds its output in memory first and
//! then writes it through a temporary file in the destination directory,
//! so a failed operation never leaves a partial file behind. Existing
//! files are only replaced with `force`. A destination of `-` writes to
//! standard output.

use std::fs;
use std::io;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::ApplyConfig;
use crate::MetatarError;
use crate::OutputFormat;
use crate::Result;
use crate::SaveConfig;
use crate::apply::ApplyOutput;
use crate::apply::SourceArchive;
use crate::formats::detect::ArchiveType;
use crate::formats::detect::detect;
use crate::inspection::ArchiveManifest;
use crate::metadata::ArchiveMetadata;
use crate::metadata::EmitPolicy;
use crate::metadata::MergeOutput;
use crate::report::ApplyReport;

/// Destination name meaning standard output.
pub const STDOUT: &str = "-";

/// Reads and decodes a metadata document.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid document.
pub fn read_metadata<P: AsRef<Path>>(path: P) -> Result<ArchiveMetadata> {
    let bytes = fs::read(path.as_ref())?;
    ArchiveMetadata::from_yaml_slice(&bytes)
}

/// Extracts the metadata of an archive file.
///
/// The compression is detected from the file extension, or from the
/// content if the extension is not recognized.
///
/// # Errors
///
/// Returns an error if the archive cannot be read or parsed.
pub fn extract_metadata_from_file<P: AsRef<Path>>(
    archive_path: P,
    config: &SaveConfig,
) -> Result<ArchiveMetadata> {
    let archive_path = archive_path.as_ref();
    let bytes = fs::read(archive_path)?;
    let format = detect(Some(archive_path), &bytes);
    crate::extract_metadata(&bytes, format, config)
}

/// Extracts the metadata of an archive file and writes it as YAML.
///
/// # Errors
///
/// Returns [`MetatarError::OutputExists`] if `yaml_path` exists and
/// `force` is not set, or any error of [`extract_metadata_from_file`].
///
/// # Examples
///
/// ```no_run
/// use metatar_core::SaveConfig;
/// use metatar_core::api::save_metadata;
///
/// # fn main() -> Result<(), metatar_core::MetatarError> {
/// let config = SaveConfig::default().with_root(true);
/// let metadata = save_metadata("rootfs.tar.gz", "rootfs.yml", &config, false)?;
/// println!("saved {} entries", metadata.entries.len());
/// # Ok(())
/// # }
/// ```
pub fn save_metadata<P: AsRef<Path>, Q: AsRef<Path>>(
    archive_path: P,
    yaml_path: Q,
    config: &SaveConfig,
    force: bool,
) -> Result<ArchiveMetadata> {
    let yaml_path = yaml_path.as_ref();
    refuse_existing(yaml_path, force)?;
    let metadata = extract_metadata_from_file(archive_path, config)?;
    let yaml = metadata.to_yaml(config.emit_policy())?;
    write_output(yaml_path, yaml.as_bytes(), force)?;
    Ok(metadata)
}

/// Applies a metadata file to an optional source archive and writes the
/// resulting archive.
///
/// # Errors
///
/// Returns [`MetatarError::OutputExists`] if `output` exists and `force`
/// is not set, or any error of [`apply`](crate::apply()).
pub fn apply_file<P: AsRef<Path>, Q: AsRef<Path>>(
    yaml_path: P,
    source_path: Option<&Path>,
    output: Q,
    format: OutputFormat,
    config: &ApplyConfig,
    force: bool,
) -> Result<ApplyReport> {
    let output = output.as_ref();
    refuse_existing(output, force)?;
    let metadata = read_metadata(yaml_path)?;
    let source = source_path.map(|p| load_source(p, config.root)).transpose()?;
    let ApplyOutput { bytes, report } = crate::apply(&metadata, source, format, config)?;
    write_output(output, &bytes, force)?;
    Ok(report)
}

/// Builds an archive from a metadata file with inline bodies only.
///
/// # Errors
///
/// Same as [`apply_file`].
pub fn generate_file<P: AsRef<Path>, Q: AsRef<Path>>(
    yaml_path: P,
    output: Q,
    format: OutputFormat,
    config: &ApplyConfig,
    force: bool,
) -> Result<ApplyReport> {
    let output = output.as_ref();
    refuse_existing(output, force)?;
    let metadata = read_metadata(yaml_path)?;
    let ApplyOutput { bytes, report } = crate::generate(&metadata, format, config)?;
    write_output(output, &bytes, force)?;
    Ok(report)
}

/// Merges two metadata files and writes the result as YAML.
///
/// # Errors
///
/// Returns [`MetatarError::OutputExists`] if `output` exists and `force`
/// is not set, or an error if either input cannot be read.
pub fn merge_files<P: AsRef<Path>, Q: AsRef<Path>, R: AsRef<Path>>(
    base_path: P,
    overlay_path: Q,
    output: R,
    policy: EmitPolicy,
    force: bool,
) -> Result<MergeOutput> {
    let output = output.as_ref();
    refuse_existing(output, force)?;
    let base = read_metadata(base_path)?;
    let overlay = read_metadata(overlay_path)?;
    let merged = crate::merge(&base, &overlay)?;
    let yaml = merged.metadata.to_yaml(policy)?;
    write_output(output, yaml.as_bytes(), force)?;
    Ok(merged)
}

/// Lists the members of an archive file.
///
/// With `force_cpio` the file is read as newc cpio whatever its name.
///
/// # Errors
///
/// Returns an error if the archive cannot be read or parsed.
pub fn list_file<P: AsRef<Path>>(archive_path: P, force_cpio: bool) -> Result<ArchiveManifest> {
    let archive_path = archive_path.as_ref();
    let bytes = fs::read(archive_path)?;
    let format = if force_cpio {
        ArchiveType::Cpio
    } else {
        detect(Some(archive_path), &bytes)
    };
    crate::list_archive(&bytes, format)
}

fn load_source(path: &Path, root: bool) -> Result<SourceArchive> {
    let bytes = fs::read(path)?;
    let format = detect(Some(path), &bytes);
    debug!(path = %path.display(), format = format.name(), "reading source archive");
    SourceArchive::from_archive(&bytes, format, root)
}

fn is_stdout(path: &Path) -> bool {
    path.as_os_str() == STDOUT
}

fn refuse_existing(path: &Path, force: bool) -> Result<()> {
    if !force && !is_stdout(path) && path.exists() {
        return Err(MetatarError::OutputExists {
            path: path.display().to_string(),
        });
    }
    Ok(())
}

/// Writes `bytes` to `path` atomically, or to standard output for `-`.
///
/// # Errors
///
/// Returns [`MetatarError::OutputExists`] if `path` exists and `force` is
/// not set, or an I/O error.
pub fn write_output(path: &Path, bytes: &[u8], force: bool) -> Result<()> {
    if is_stdout(path) {
        let mut stdout = io::stdout().lock();
        stdout.write_all(bytes)?;
        stdout.flush()?;
        return Ok(());
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;

    if force {
        temp.persist(path).map_err(|e| e.error)?;
    } else {
        temp.persist_noclobber(path).map_err(|e| {
            if e.error.kind() == io::ErrorKind::AlreadyExists {
                MetatarError::OutputExists {
                    path: path.display().to_string(),
                }
            } else {
                MetatarError::Io(e.error)
            }
        })?;
    }
    debug!(path = %path.display(), bytes = bytes.len(), "wrote output");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::TarTestBuilder;
    use crate::test_utils::cpio_names;
    use tempfile::TempDir;

    fn fixture(dir: &TempDir) -> std::path::PathBuf {
        let tar = TarTestBuilder::new()
            .add_directory("etc/")
            .add_file("etc/motd", b"hello\n")
            .build();
        let path = dir.path().join("rootfs.tar");
        fs::write(&path, tar).unwrap();
        path
    }

    #[test]
    fn test_save_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        let archive = fixture(&dir);
        let yaml = dir.path().join("rootfs.yml");
        fs::write(&yaml, "keep").unwrap();

        let err = save_metadata(&archive, &yaml, &SaveConfig::default(), false).unwrap_err();
        assert!(matches!(err, MetatarError::OutputExists { .. }));
        assert_eq!(fs::read_to_string(&yaml).unwrap(), "keep");

        save_metadata(&archive, &yaml, &SaveConfig::default(), true).unwrap();
        assert!(fs::read_to_string(&yaml).unwrap().contains("etc/motd"));
    }

    #[test]
    fn test_apply_file_cpio() {
        let dir = TempDir::new().unwrap();
        let archive = fixture(&dir);
        let yaml = dir.path().join("rootfs.yml");
        save_metadata(&archive, &yaml, &SaveConfig::default(), false).unwrap();

        let output = dir.path().join("rootfs.cpio");
        let config = ApplyConfig::default().with_mtime(Some(0));
        let report = apply_file(
            &yaml,
            Some(archive.as_path()),
            &output,
            OutputFormat::Cpio,
            &config,
            false,
        )
        .unwrap();
        assert_eq!(report.entries_written, 2);
        assert_eq!(cpio_names(&fs::read(&output).unwrap()), ["etc/", "etc/motd"]);
    }

    #[test]
    fn test_failed_build_leaves_nothing() {
        let dir = TempDir::new().unwrap();
        let yaml = dir.path().join("bad.yml");
        fs::write(
            &yaml,
            "Contents:\n- Filename: a\n  Body: aGk=\n  Size: 9\n",
        )
        .unwrap();
        let output = dir.path().join("out.tar");

        let err = generate_file(
            &yaml,
            &output,
            OutputFormat::Tar,
            &ApplyConfig::default(),
            false,
        )
        .unwrap_err();
        assert!(matches!(err, MetatarError::SizeMismatch { .. }));
        assert!(!output.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_list_file_detects_cpio() {
        let dir = TempDir::new().unwrap();
        let yaml = dir.path().join("gen.yml");
        fs::write(&yaml, "Contents:\n- Filename: x\n  Body: eA==\n").unwrap();
        let output = dir.path().join("initrd.img");
        generate_file(
            &yaml,
            &output,
            OutputFormat::Cpio,
            &ApplyConfig::default(),
            false,
        )
        .unwrap();

        let manifest = list_file(&output, false).unwrap();
        assert_eq!(manifest.format, ArchiveType::Cpio);
        assert_eq!(manifest.total_entries, 1);
    }

    #[test]
    fn test_write_output_force() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.bin");
        write_output(&path, b"data", false).unwrap();
        assert!(matches!(
            write_output(&path, b"other", false),
            Err(MetatarError::OutputExists { .. })
        ));
        write_output(&path, b"other", true).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"other");
    }
}
