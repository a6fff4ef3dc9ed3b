//! Archive format implementations.

pub mod cpio;
pub mod detect;
pub mod tar;
pub mod traits;

// Re-export main types for convenience
pub use cpio::CpioSink;
pub use detect::ArchiveType;
pub use tar::TarSink;
pub use traits::ArchiveSink;
pub use traits::EntryHeader;
