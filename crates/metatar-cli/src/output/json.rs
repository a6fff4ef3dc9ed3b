//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use metatar_core::ApplyReport;
use metatar_core::ArchiveManifest;
use metatar_core::ArchiveMetadata;
use metatar_core::ManifestEntry;
use metatar_core::MergeOutput;
use metatar_core::Notice;
use metatar_core::OutputFormat;
use serde::Serialize;
use std::io::Write;
use std::io::{self};
use std::path::Path;

pub struct JsonFormatter;

#[derive(Serialize)]
struct MemberOutput<'a> {
    path: &'a str,
    kind: &'a str,
    mode: String,
    uid: u64,
    gid: u64,
    #[serde(skip_serializing_if = "str::is_empty")]
    user: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    group: &'a str,
    size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    device: Option<(u32, u32)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    link_target: Option<&'a str>,
}

impl<'a> From<&'a ManifestEntry> for MemberOutput<'a> {
    fn from(entry: &'a ManifestEntry) -> Self {
        let is_device = entry.device_major != 0 || entry.device_minor != 0;
        Self {
            path: &entry.path,
            kind: &entry.kind,
            mode: format!("{:04o}", entry.mode),
            uid: entry.uid,
            gid: entry.gid,
            user: &entry.user,
            group: &entry.group,
            size: entry.size,
            device: is_device.then_some((entry.device_major, entry.device_minor)),
            link_target: entry.link_target.as_deref(),
        }
    }
}

#[derive(Serialize)]
struct ManifestOutput<'a> {
    format: &'static str,
    total_entries: usize,
    total_size: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    entries: Vec<MemberOutput<'a>>,
}

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }

    fn notice_strings(notices: &[Notice]) -> Vec<String> {
        notices.iter().map(ToString::to_string).collect()
    }

    fn manifest(manifest: &ArchiveManifest, long: bool) -> ManifestOutput<'_> {
        ManifestOutput {
            format: manifest.format.name(),
            total_entries: manifest.total_entries,
            total_size: manifest.total_size,
            entries: if long {
                manifest.entries.iter().map(MemberOutput::from).collect()
            } else {
                Vec::new()
            },
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_build_result(
        &self,
        operation: &str,
        output: &Path,
        format: OutputFormat,
        report: &ApplyReport,
    ) -> Result<()> {
        #[derive(Serialize)]
        struct BuildOutput {
            output_path: String,
            format: &'static str,
            entries_written: usize,
            directories_created: usize,
            entries_skipped: usize,
            duplicates: usize,
            implicit_entries: usize,
            bytes_written: u64,
            duration_ms: u128,
            notices: Vec<String>,
        }

        let data = BuildOutput {
            output_path: output.display().to_string(),
            format: format.name(),
            entries_written: report.entries_written,
            directories_created: report.directories_created,
            entries_skipped: report.entries_skipped,
            duplicates: report.duplicates,
            implicit_entries: report.implicit_entries,
            bytes_written: report.bytes_written,
            duration_ms: report.duration.as_millis(),
            notices: Self::notice_strings(&report.notices),
        };

        Self::output(&JsonOutput::success(operation, data))
    }

    fn format_save_result(&self, output: &Path, metadata: &ArchiveMetadata) -> Result<()> {
        #[derive(Serialize)]
        struct SaveOutput {
            output_path: String,
            entries: usize,
            format_version: f64,
        }

        let data = SaveOutput {
            output_path: output.display().to_string(),
            entries: metadata.entries.len(),
            format_version: metadata.format_version,
        };

        Self::output(&JsonOutput::success("save", data))
    }

    fn format_merge_result(&self, output: &Path, merged: &MergeOutput) -> Result<()> {
        #[derive(Serialize)]
        struct MergeData {
            output_path: String,
            entries: usize,
            skip_patterns: usize,
            notices: Vec<String>,
        }

        let data = MergeData {
            output_path: output.display().to_string(),
            entries: merged.metadata.entries.len(),
            skip_patterns: merged.metadata.skip_list.len(),
            notices: Self::notice_strings(&merged.notices),
        };

        Self::output(&JsonOutput::success("merge", data))
    }

    fn format_manifest_short(&self, manifest: &ArchiveManifest) -> Result<()> {
        #[derive(Serialize)]
        struct ShortOutput<'a> {
            format: &'static str,
            total_entries: usize,
            paths: Vec<&'a str>,
        }

        let data = ShortOutput {
            format: manifest.format.name(),
            total_entries: manifest.total_entries,
            paths: manifest.entries.iter().map(|e| e.path.as_str()).collect(),
        };

        Self::output(&JsonOutput::success("list", data))
    }

    fn format_manifest_long(
        &self,
        manifest: &ArchiveManifest,
        _human_readable: bool,
    ) -> Result<()> {
        Self::output(&JsonOutput::success("list", Self::manifest(manifest, true)))
    }

    fn format_error(&self, operation: &str, error: &anyhow::Error) {
        let output = JsonOutput::error(operation, format!("{error:?}"));
        let _ = Self::output(&output);
    }

    fn format_success(&self, message: &str) {
        #[derive(Serialize)]
        struct SuccessData {
            message: String,
        }

        let output = JsonOutput::success(
            "unknown",
            SuccessData {
                message: message.to_string(),
            },
        );
        let _ = Self::output(&output);
    }

    fn format_warning(&self, message: &str) {
        #[derive(Serialize)]
        struct WarningData {
            message: String,
        }

        let output = JsonOutput::success(
            "warning",
            WarningData {
                message: message.to_string(),
            },
        );
        let _ = Self::output(&output);
    }
}
