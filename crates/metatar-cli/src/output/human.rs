//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use anyhow::Result;
use console::Term;
use console::style;
use metatar_core::ApplyReport;
use metatar_core::ArchiveManifest;
use metatar_core::ArchiveMetadata;
use metatar_core::ManifestEntry;
use metatar_core::MergeOutput;
use metatar_core::Notice;
use metatar_core::OutputFormat;
use std::path::Path;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
    err: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
            err: Term::stderr(),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.1} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{bytes} B")
        }
    }

    fn format_number(n: usize) -> String {
        let s = n.to_string();
        let mut result = String::new();

        for (count, c) in s.chars().rev().enumerate() {
            if count > 0 && count % 3 == 0 {
                result.push(',');
            }
            result.push(c);
        }

        result.chars().rev().collect()
    }

    /// `tar tv` style type letter.
    fn type_char(kind: &str) -> char {
        match kind {
            "directory" => 'd',
            "symlink" => 'l',
            "hard link" => 'h',
            "character device node" => 'c',
            "block device node" => 'b',
            "fifo node" => 'p',
            "socket file" => 's',
            _ => '-',
        }
    }

    fn long_line(entry: &ManifestEntry, human_readable: bool) -> String {
        let size = if entry.device_major != 0 || entry.device_minor != 0 {
            format!("{},{}", entry.device_major, entry.device_minor)
        } else if human_readable {
            Self::format_size(entry.size)
        } else {
            entry.size.to_string()
        };

        let line = format!(
            "{}{:04o} {:<16} {:>10}  {}",
            Self::type_char(&entry.kind),
            entry.mode,
            entry.owner_label(),
            size,
            entry.path
        );
        match &entry.link_target {
            Some(target) if entry.kind == "hard link" => format!("{line} link to {target}"),
            Some(target) => format!("{line} -> {target}"),
            None => line,
        }
    }

    fn header(&self, message: &str) {
        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {message}", style("✓").green().bold()));
        } else {
            let _ = self.term.write_line(message);
        }
    }

    /// Lists notices in verbose mode unless the core already logged them.
    fn notices(&self, notices: &[Notice], logged: bool) {
        if notices.is_empty() {
            return;
        }
        if self.verbose && logged {
            let _ = self.term.write_line(&format!(
                "  Notices:          {}",
                Self::format_number(notices.len())
            ));
        } else if self.verbose {
            for notice in notices {
                self.format_warning(&notice.to_string());
            }
        } else {
            let _ = self.term.write_line(&format!(
                "  Notices:          {} (use --verbose to show them)",
                Self::format_number(notices.len())
            ));
        }
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_build_result(
        &self,
        _operation: &str,
        output: &Path,
        format: OutputFormat,
        report: &ApplyReport,
    ) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.header(&format!(
            "Archive written: {} ({})",
            output.display(),
            format.name()
        ));

        let _ = self.term.write_line("");
        let _ = self.term.write_line(&format!(
            "  Entries written:  {}",
            Self::format_number(report.entries_written)
        ));
        let _ = self.term.write_line(&format!(
            "  Directories made: {}",
            Self::format_number(report.directories_created)
        ));
        let _ = self.term.write_line(&format!(
            "  Total size:       {}",
            Self::format_size(report.bytes_written)
        ));

        if report.entries_skipped > 0 {
            let _ = self.term.write_line(&format!(
                "  Skipped:          {}",
                Self::format_number(report.entries_skipped)
            ));
        }

        if self.verbose {
            let _ = self.term.write_line(&format!(
                "  Duplicates:       {}",
                Self::format_number(report.duplicates)
            ));
            let _ = self.term.write_line(&format!(
                "  Not in metadata:  {}",
                Self::format_number(report.implicit_entries)
            ));
            let _ = self
                .term
                .write_line(&format!("  Duration:         {:?}", report.duration));
        }

        self.notices(&report.notices, true);
        Ok(())
    }

    fn format_save_result(&self, output: &Path, metadata: &ArchiveMetadata) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.header(&format!("Metadata saved: {}", output.display()));
        let _ = self.term.write_line(&format!(
            "  Entries:          {}",
            Self::format_number(metadata.entries.len())
        ));
        Ok(())
    }

    fn format_merge_result(&self, output: &Path, merged: &MergeOutput) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.header(&format!("Metadata merged: {}", output.display()));
        let _ = self.term.write_line(&format!(
            "  Entries:          {}",
            Self::format_number(merged.metadata.entries.len())
        ));
        if !merged.metadata.skip_list.is_empty() {
            let _ = self.term.write_line(&format!(
                "  Skip patterns:    {}",
                Self::format_number(merged.metadata.skip_list.len())
            ));
        }
        self.notices(&merged.notices, false);
        Ok(())
    }

    fn format_manifest_short(&self, manifest: &ArchiveManifest) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        for entry in &manifest.entries {
            let _ = self.term.write_line(&entry.path);
        }

        Ok(())
    }

    fn format_manifest_long(&self, manifest: &ArchiveManifest, human_readable: bool) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        for entry in &manifest.entries {
            let _ = self.term.write_line(&Self::long_line(entry, human_readable));
        }

        let _ = self.term.write_line("");
        let _ = self.term.write_line(&format!(
            "Total: {} entries, {} ({})",
            Self::format_number(manifest.total_entries),
            Self::format_size(manifest.total_size),
            manifest.format.name()
        ));

        Ok(())
    }

    fn format_error(&self, _operation: &str, error: &anyhow::Error) {
        // Always show errors, even in quiet mode
        if self.use_colors {
            let _ = self
                .err
                .write_line(&format!("{} {error:?}", style("ERROR:").red().bold()));
        } else {
            let _ = self.err.write_line(&format!("ERROR: {error:?}"));
        }
    }

    fn format_success(&self, message: &str) {
        if self.quiet {
            return;
        }
        self.header(message);
    }

    fn format_warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        if self.use_colors {
            let _ = self
                .err
                .write_line(&format!("{} {message}", style("⚠").yellow().bold()));
        } else {
            let _ = self.err.write_line(&format!("WARNING: {message}"));
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn entry(kind: &str) -> ManifestEntry {
        ManifestEntry {
            path: "dev/console".into(),
            kind: kind.into(),
            mode: 0o600,
            uid: 0,
            gid: 5,
            user: "root".into(),
            group: String::new(),
            device_major: 0,
            device_minor: 0,
            size: 2048,
            link_target: None,
        }
    }

    #[test]
    fn test_format_size() {
        assert_eq!(HumanFormatter::format_size(0), "0 B");
        assert_eq!(HumanFormatter::format_size(1023), "1023 B");
        assert_eq!(HumanFormatter::format_size(1536), "1.5 KB");
        assert_eq!(HumanFormatter::format_size(2 * 1024 * 1024), "2.0 MB");
        assert_eq!(HumanFormatter::format_size(1024 * 1024 * 1024), "1.0 GB");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(HumanFormatter::format_number(0), "0");
        assert_eq!(HumanFormatter::format_number(999), "999");
        assert_eq!(HumanFormatter::format_number(1000), "1,000");
        assert_eq!(HumanFormatter::format_number(1_234_567), "1,234,567");
    }

    #[test]
    fn test_type_char() {
        assert_eq!(HumanFormatter::type_char("directory"), 'd');
        assert_eq!(HumanFormatter::type_char("character device node"), 'c');
        assert_eq!(HumanFormatter::type_char("socket file"), 's');
        assert_eq!(HumanFormatter::type_char("regular file"), '-');
    }

    #[test]
    fn test_long_line_device() {
        let mut device = entry("character device node");
        device.device_major = 5;
        device.device_minor = 1;
        let line = HumanFormatter::long_line(&device, false);
        assert!(line.starts_with("c0600 root:5"));
        assert!(line.contains("5,1"));
        assert!(line.ends_with("dev/console"));
    }

    #[test]
    fn test_long_line_links() {
        let mut link = entry("symlink");
        link.link_target = Some("tty0".into());
        assert!(HumanFormatter::long_line(&link, false).ends_with("dev/console -> tty0"));

        let mut hard = entry("hard link");
        hard.link_target = Some("dev/tty".into());
        assert!(HumanFormatter::long_line(&hard, true).ends_with("link to dev/tty"));
        assert!(HumanFormatter::long_line(&hard, true).contains("2.0 KB"));
    }
}
