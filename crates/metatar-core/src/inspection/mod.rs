//! Archive inspection without building anything.
//!
//! # Examples
//!
//! ```
//! use metatar_core::formats::ArchiveType;
//! use metatar_core::list_archive;
//! use metatar_core::test_utils::TarTestBuilder;
//!
//! # fn main() -> Result<(), metatar_core::MetatarError> {
//! let tar = TarTestBuilder::new().add_file("a.txt", b"hi").build();
//! let manifest = list_archive(&tar, ArchiveType::Tar)?;
//! assert_eq!(manifest.total_entries, 1);
//! assert_eq!(manifest.entries[0].kind, "regular file");
//! # Ok(())
//! # }
//! ```

pub mod list;
pub mod manifest;

pub use list::list_archive;
pub use manifest::ArchiveManifest;
pub use manifest::ManifestEntry;
