//! Ordered emission of overlay entries into an archive sink.
//!
//! The reconciler walks the overlay once, resolving each entry against the
//! source bodies, the skip list and the build ledger before handing it to
//! the sink. Sinks that need parents before children also get a second
//! pass over source members the overlay never named.

use std::collections::HashMap;
use std::collections::HashSet;
use std::time::Instant;

use tracing::debug;
use tracing::info;
use tracing::warn;

use super::body::ResolvedBody;
use super::body::decode_inline;
use super::ledger::EntryStatus;
use super::ledger::Ledger;
use super::materialize::missing_ancestors;
use super::materialize::symlink_target_dir;
use super::rename::RenameOutcome;
use super::rename::track_rename;
use super::skip::SkipResolver;
use super::source::SourceArchive;
use super::transform::apply_transforms;
use crate::ApplyConfig;
use crate::MetatarError;
use crate::Result;
use crate::config::DEFAULT_DIR_MODE;
use crate::config::DEFAULT_FILE_MODE;
use crate::config::MATERIALIZED_DIR_MODE;
use crate::error::Notice;
use crate::formats::ArchiveSink;
use crate::formats::EntryHeader;
use crate::metadata::ArchiveMetadata;
use crate::metadata::Entry;
use crate::report::ApplyReport;
use crate::types::EntryKind;
use crate::types::archive_path::parent_dir;
use crate::types::archive_path::with_dir_suffix;
use crate::types::clean_path;

/// Drives one build from an overlay into a sink.
pub struct Reconciler<'a, S: ArchiveSink> {
    config: &'a ApplyConfig,
    skip: SkipResolver,
    source: SourceArchive,
    ledger: Ledger,
    sink: S,
    report: ApplyReport,
    /// Declared directories by cleaned final path, until they are written.
    declared_dirs: HashMap<String, Entry>,
    /// Declared directories written ahead of their place in the overlay.
    written_early: HashSet<String>,
}

impl<'a, S: ArchiveSink> Reconciler<'a, S> {
    /// Creates a reconciler for the given skip list and source bodies.
    ///
    /// # Errors
    ///
    /// Returns [`MetatarError::InvalidPattern`] if a skip list pattern is
    /// not a valid glob.
    pub fn new(
        skip_list: &[String],
        source: SourceArchive,
        sink: S,
        config: &'a ApplyConfig,
    ) -> Result<Self> {
        Ok(Self {
            config,
            skip: SkipResolver::new(skip_list)?,
            source,
            ledger: Ledger::new(),
            sink,
            report: ApplyReport::new(),
            declared_dirs: HashMap::new(),
            written_early: HashSet::new(),
        })
    }

    /// Emits every entry of `metadata` and terminates the archive.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error; nothing written so far is returned.
    pub fn run(mut self, metadata: &ArchiveMetadata) -> Result<(Vec<u8>, ApplyReport)> {
        let started = Instant::now();
        if let Some(notice) = metadata.version_notice() {
            self.notice(notice);
        }

        for entry in &metadata.entries {
            if entry.kind.is_directory() && !entry.skip {
                self.declared_dirs
                    .entry(clean_path(entry.final_path()))
                    .or_insert_with(|| entry.clone());
            }
        }

        for entry in &metadata.entries {
            if entry.kind.is_directory() {
                let key = clean_path(entry.final_path());
                if self.written_early.remove(&key) {
                    continue;
                }
                self.declared_dirs.remove(&key);
            }
            self.process(entry.clone(), true)?;
        }

        if self.sink.requires_ordering() {
            self.include_unreferenced()?;
        } else {
            self.report_unreferenced();
        }

        let Self { sink, mut report, .. } = self;
        let format = sink.format_name();
        let bytes = sink.finish()?;
        report.duration = started.elapsed();

        info!(
            format,
            entries = report.entries_written,
            directories = report.directories_created,
            skipped = report.entries_skipped,
            bytes = bytes.len(),
            "archive built"
        );
        Ok((bytes, report))
    }

    fn process(&mut self, mut entry: Entry, declared: bool) -> Result<()> {
        if self.config.root {
            entry.set_root_owner();
        }

        if entry.skip || self.skip.should_skip(&entry.path) {
            self.narrate(format_args!("skipping {}", entry.path));
            self.ledger.mark(&entry.path, EntryStatus::Skipped);
            self.report.entries_skipped += 1;
            return Ok(());
        }

        let final_path = entry.final_path().to_string();
        if self.ledger.is_done(&entry.path) || self.ledger.is_done(&final_path) {
            if declared {
                self.notice(Notice::DuplicateFilename { path: final_path });
            }
            self.report.duplicates += 1;
            return Ok(());
        }

        let mut body_key = entry.path.clone();
        if let Some(target) = entry.rename.clone() {
            match track_rename(&mut self.source, &mut self.ledger, &entry.path, &target) {
                RenameOutcome::Collision => {
                    self.notice(Notice::RenameCollision {
                        from: entry.path.clone(),
                        to: target.clone(),
                    });
                    body_key = target;
                }
                RenameOutcome::Aliased => {
                    self.narrate(format_args!("rename {} -> {}", entry.path, target));
                }
                RenameOutcome::NoBody => {}
            }
        }

        let inline = if self.config.with_body {
            decode_inline(&entry)?
        } else {
            None
        };
        let bytes = match inline {
            Some(decoded) => {
                self.source
                    .bodies
                    .insert(entry.path.clone(), decoded.clone());
                self.source
                    .metadata
                    .insert(entry.path.clone(), entry.clone());
                Some(decoded)
            }
            None => self.source.bodies.get(&body_key).cloned(),
        };

        let body = ResolvedBody::new(&entry, bytes);
        if body.empty_regular && self.config.skip_empty_files {
            self.narrate(format_args!("skipping empty file {}", entry.path));
            self.ledger.mark(&entry.path, EntryStatus::Skipped);
            self.report.entries_skipped += 1;
            return Ok(());
        }

        let data = if entry.strip_blank_lines || entry.strip_comments {
            apply_transforms(
                body.as_slice(),
                entry.strip_blank_lines,
                entry.strip_comments,
            )
        } else {
            body.bytes.unwrap_or_default()
        };

        if entry.has_device_numbers() && !entry.kind.is_device() {
            return Err(MetatarError::InvalidDeviceFields { path: entry.path });
        }

        let kind = self.sink.map_kind(&final_path, entry.kind)?;
        if entry.kind.is_hardlink() && kind.is_symlink() {
            self.notice(Notice::HardlinkAsSymlink {
                path: final_path.clone(),
            });
        }

        let name = if kind.is_directory() {
            with_dir_suffix(&final_path)
        } else if final_path.ends_with('/') {
            return Err(MetatarError::DirectorySuffix { path: final_path });
        } else {
            final_path.clone()
        };

        let mode = if entry.mode.is_unset() {
            let mode = if kind.is_directory() {
                DEFAULT_DIR_MODE
            } else {
                DEFAULT_FILE_MODE
            };
            self.notice(Notice::DefaultMode {
                path: final_path.clone(),
                mode,
            });
            mode
        } else {
            entry.mode.bits()
        };

        self.materialize(&parent_dir(&final_path), &entry)?;
        if entry.kind.is_symlink() && !entry.link_target.is_empty() {
            let target_dir = symlink_target_dir(&final_path, &entry.link_target);
            self.materialize(&target_dir, &entry)?;
        }

        if kind.is_directory() && self.ledger.is_materialized(&final_path) {
            self.narrate(format_args!("directory {name} already created"));
            return Ok(());
        }

        if kind.is_regular() && data.is_empty() {
            self.notice(Notice::EmptyRegularFile {
                path: final_path.clone(),
            });
        }

        self.narrate(format_args!(
            "create {name} ({}, mode {mode:04o})",
            entry.owner_label()
        ));
        let header = EntryHeader {
            name,
            link_target: entry.link_target,
            kind,
            mode,
            uid: entry.uid,
            gid: entry.gid,
            user: entry.user,
            group: entry.group,
            device_major: entry.device_major,
            device_minor: entry.device_minor,
            xattrs: entry.xattrs,
        };
        self.sink.append(&header, &data)?;

        self.ledger.mark(&final_path, EntryStatus::Emitted);
        if clean_path(&entry.path) != clean_path(&final_path) {
            self.ledger.mark(&entry.path, EntryStatus::RenamedAway);
        }
        self.report.entries_written += 1;
        self.report.bytes_written += data.len() as u64;
        if !declared {
            self.report.implicit_entries += 1;
        }
        Ok(())
    }

    /// Writes every missing directory from the archive root down to `dir`.
    ///
    /// A directory the overlay declares later is written from its declared
    /// entry. Other directories are synthesized with the owner of `owner`.
    fn materialize(&mut self, dir: &str, owner: &Entry) -> Result<()> {
        for missing in missing_ancestors(dir, &self.ledger) {
            if self.ledger.exists(&missing) {
                continue;
            }
            let name = with_dir_suffix(&missing);
            if self.skip.should_skip(&missing) || self.skip.should_skip(&name) {
                self.narrate(format_args!("not creating skipped directory {name}"));
                continue;
            }
            if let Some(declared) = self.declared_dirs.remove(&missing) {
                self.narrate(format_args!("create declared directory {name} early"));
                self.process(declared, true)?;
                if self.ledger.exists(&missing) {
                    self.written_early.insert(missing);
                    continue;
                }
            }
            self.narrate(format_args!("create missing directory {name}"));
            let header = EntryHeader {
                name,
                kind: EntryKind::Directory,
                mode: MATERIALIZED_DIR_MODE,
                uid: owner.uid,
                gid: owner.gid,
                user: owner.user.clone(),
                group: owner.group.clone(),
                ..EntryHeader::default()
            };
            self.sink.append(&header, &[])?;
            self.ledger.mark(&missing, EntryStatus::Materialized);
            self.report.directories_created += 1;
        }
        Ok(())
    }

    /// Emits source members the overlay never mentioned, in name order.
    fn include_unreferenced(&mut self) -> Result<()> {
        let paths: Vec<String> = self.source.bodies.keys().cloned().collect();
        for path in paths {
            match self.ledger.status(&path) {
                Some(EntryStatus::Emitted | EntryStatus::RenamedAway) => {
                    if self.source_entry(&path).is_none() {
                        return Err(MetatarError::MissingMetadata { path });
                    }
                }
                Some(_) => {}
                None => {
                    let entry = self
                        .source_entry(&path)
                        .cloned()
                        .ok_or_else(|| MetatarError::MissingMetadata { path: path.clone() })?;
                    self.narrate(format_args!("including unlisted member {path}"));
                    self.process(entry, false)?;
                }
            }
        }
        Ok(())
    }

    fn report_unreferenced(&mut self) {
        let unreferenced: Vec<String> = self
            .source
            .bodies
            .keys()
            .filter(|path| self.ledger.status(path).is_none())
            .cloned()
            .collect();
        for path in unreferenced {
            self.notice(Notice::Unreferenced { path });
        }
    }

    fn source_entry(&self, path: &str) -> Option<&Entry> {
        self.source
            .metadata
            .get(path)
            .or_else(|| self.source.metadata.get(&clean_path(path)))
    }

    fn notice(&mut self, notice: Notice) {
        if self.config.verbose {
            warn!("{notice}");
        } else {
            debug!("{notice}");
        }
        self.report.add_notice(notice);
    }

    fn narrate(&self, message: std::fmt::Arguments<'_>) {
        if self.config.verbose {
            info!("{message}");
        } else {
            debug!("{message}");
        }
    }
}
