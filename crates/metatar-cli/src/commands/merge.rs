//! Merge command implementation

use crate::cli::MergeArgs;
use crate::error::add_input_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use metatar_core::api::merge_files;
use metatar_core::metadata::EmitPolicy;

pub fn execute(args: &MergeArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let policy = if args.expand {
        EmitPolicy::expanded()
    } else {
        EmitPolicy::default()
    };

    let merged = add_input_context(
        merge_files(&args.base, &args.overlay, &args.output, policy, args.force),
        &args.overlay,
    )?;

    if super::is_stdout(&args.output) {
        return Ok(());
    }
    formatter.format_merge_result(&args.output, &merged)
}
