//! Apply command implementation

use crate::cli::ApplyArgs;
use crate::error::add_input_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use metatar_core::api::apply_file;

pub fn execute(args: &ApplyArgs, formatter: &dyn OutputFormatter, verbose: bool) -> Result<()> {
    let format = args.options.format();
    let config = args
        .options
        .apply_config(verbose)
        .with_body(args.data)
        .with_root(args.root);

    let report = add_input_context(
        apply_file(
            &args.yaml,
            Some(args.archive.as_path()),
            &args.output,
            format,
            &config,
            args.options.force,
        ),
        &args.yaml,
    )?;

    if super::is_stdout(&args.output) {
        return Ok(());
    }
    formatter.format_build_result("apply", &args.output, format, &report)
}
