//! List command implementation

use crate::cli::ListArgs;
use crate::error::add_input_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use metatar_core::api::list_file;

pub fn execute(args: &ListArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let manifest = add_input_context(list_file(&args.archive, args.cpio), &args.archive)?;

    if args.long {
        formatter.format_manifest_long(&manifest, args.human_readable)
    } else {
        formatter.format_manifest_short(&manifest)
    }
}
