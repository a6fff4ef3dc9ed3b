//! Keep the metadata of tar archives in diffable YAML and rebuild archives
//! from it.
//!
//! `metatar-core` extracts an [`ArchiveMetadata`] overlay from a tar archive,
//! lets it be edited or merged as plain text, and applies it back to the
//! archive's bodies to produce a new tar or newc cpio archive. Entries can
//! be renamed, skipped, re-owned or filtered, and bodies can be carried
//! inline so an archive can be generated from the overlay alone.
//!
//! # Examples
//!
//! ```
//! use metatar_core::ApplyConfig;
//! use metatar_core::Mode;
//! use metatar_core::OutputFormat;
//! use metatar_core::SaveConfig;
//! use metatar_core::apply;
//! use metatar_core::apply::SourceArchive;
//! use metatar_core::extract_metadata;
//! use metatar_core::formats::ArchiveType;
//! use metatar_core::test_utils::TarTestBuilder;
//!
//! # fn main() -> Result<(), metatar_core::MetatarError> {
//! let tar = TarTestBuilder::new().add_file("bin/hello", b"#!/bin/sh\n").build();
//!
//! let mut metadata = extract_metadata(&tar, ArchiveType::Tar, &SaveConfig::default())?;
//! metadata.entries[0].mode = Mode::new(0o755);
//!
//! let source = SourceArchive::from_archive(&tar, ArchiveType::Tar, false)?;
//! let output = apply(&metadata, Some(source), OutputFormat::Cpio, &ApplyConfig::default())?;
//! println!("wrote {} entries", output.report.total_items());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod apply;
pub mod config;
pub mod error;
pub mod formats;
pub mod inspection;
pub mod metadata;
pub mod report;
pub mod test_utils;
pub mod types;

pub use apply::ApplyOutput;
pub use apply::apply;
pub use apply::generate;
pub use config::ApplyConfig;
pub use config::OutputFormat;
pub use config::SaveConfig;
pub use error::MetatarError;
pub use error::Notice;
pub use error::Result;
pub use inspection::ArchiveManifest;
pub use inspection::ManifestEntry;
pub use inspection::list_archive;
pub use metadata::ArchiveMetadata;
pub use metadata::Entry;
pub use metadata::FORMAT_VERSION;
pub use metadata::MergeOutput;
pub use metadata::extract_metadata;
pub use metadata::merge;
pub use report::ApplyReport;
pub use types::EntryKind;
pub use types::Mode;
