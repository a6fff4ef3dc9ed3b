//! Save command implementation

use crate::cli::SaveArgs;
use crate::error::add_input_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use metatar_core::api::save_metadata;

pub fn execute(args: &SaveArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let config = args.options.save_config();
    let metadata = add_input_context(
        save_metadata(&args.archive, &args.yaml, &config, args.force),
        &args.archive,
    )?;

    if super::is_stdout(&args.yaml) {
        return Ok(());
    }
    formatter.format_save_result(&args.yaml, &metadata)
}
