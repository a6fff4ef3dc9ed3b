//! Output formatter trait for CLI results.

use anyhow::Result;
use metatar_core::ApplyReport;
use metatar_core::ArchiveManifest;
use metatar_core::ArchiveMetadata;
use metatar_core::MergeOutput;
use metatar_core::OutputFormat;
use serde::Serialize;
use std::path::Path;

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format the result of `apply` or `generate`
    fn format_build_result(
        &self,
        operation: &str,
        output: &Path,
        format: OutputFormat,
        report: &ApplyReport,
    ) -> Result<()>;

    /// Format the result of `save`
    fn format_save_result(&self, output: &Path, metadata: &ArchiveMetadata) -> Result<()>;

    /// Format the result of `merge`
    fn format_merge_result(&self, output: &Path, merged: &MergeOutput) -> Result<()>;

    /// Format archive listing (paths only)
    fn format_manifest_short(&self, manifest: &ArchiveManifest) -> Result<()>;

    /// Format archive listing with member details
    fn format_manifest_long(&self, manifest: &ArchiveManifest, human_readable: bool)
    -> Result<()>;

    /// Format error message
    fn format_error(&self, operation: &str, error: &anyhow::Error);

    /// Format success message
    #[allow(dead_code)]
    fn format_success(&self, message: &str);

    /// Format warning message
    fn format_warning(&self, message: &str);
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data: Some(data),
            error: None,
        }
    }
}

impl JsonOutput<()> {
    pub fn error(operation: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Error,
            data: None,
            error: Some(error.into()),
        }
    }
}
