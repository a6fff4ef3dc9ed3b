//! Yaml command implementation
//!
//! Prints the metadata document to standard output.

use crate::cli::YamlArgs;
use crate::error::add_input_context;
use anyhow::Result;
use metatar_core::api::STDOUT;
use metatar_core::api::extract_metadata_from_file;
use metatar_core::api::write_output;
use std::path::Path;

pub fn execute(args: &YamlArgs) -> Result<()> {
    let config = args.options.save_config();
    let metadata = add_input_context(
        extract_metadata_from_file(&args.archive, &config),
        &args.archive,
    )?;
    let yaml = add_input_context(metadata.to_yaml(config.emit_policy()), &args.archive)?;
    add_input_context(
        write_output(Path::new(STDOUT), yaml.as_bytes(), true),
        &args.archive,
    )
}
