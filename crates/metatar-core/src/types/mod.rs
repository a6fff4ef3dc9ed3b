//! Value types shared by the metadata model and the archive codecs.

pub mod archive_path;
pub mod entry_kind;
pub mod mode;

pub use archive_path::clean_path;
pub use entry_kind::EntryKind;
pub use mode::Mode;
