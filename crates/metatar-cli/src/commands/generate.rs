//! Generate command implementation
//!
//! Builds an archive from inline bodies only; no source archive is read.

use crate::cli::GenerateArgs;
use crate::error::add_input_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use metatar_core::api::generate_file;

pub fn execute(args: &GenerateArgs, formatter: &dyn OutputFormatter, verbose: bool) -> Result<()> {
    let format = args.options.format();
    let config = args.options.apply_config(verbose).with_root(args.root);

    let report = add_input_context(
        generate_file(&args.yaml, &args.output, format, &config, args.options.force),
        &args.yaml,
    )?;

    if super::is_stdout(&args.output) {
        return Ok(());
    }
    formatter.format_build_result("generate", &args.output, format, &report)
}
