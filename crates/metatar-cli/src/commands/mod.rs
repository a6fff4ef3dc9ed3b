//! Subcommand implementations.

pub mod apply;
pub mod completion;
pub mod generate;
pub mod list;
pub mod merge;
pub mod save;
pub mod yaml;

use metatar_core::api::STDOUT;
use std::path::Path;

/// Returns `true` if `path` names standard output, in which case no
/// summary may be printed there.
pub fn is_stdout(path: &Path) -> bool {
    path.as_os_str() == STDOUT
}
