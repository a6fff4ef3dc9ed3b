//! metatar - keep the metadata of tar archives in diffable YAML and
//! rebuild tar or cpio archives from it.

mod cli;
mod commands;
mod error;
mod output;

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Installs the stderr log subscriber. `RUST_LOG` takes precedence over
/// the verbosity flags.
fn init_logging(verbose: bool, quiet: bool) {
    let default = if verbose {
        "metatar_core=debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn run(cli: &cli::Cli, formatter: &dyn output::OutputFormatter) -> Result<()> {
    match &cli.command {
        cli::Commands::Save(args) => commands::save::execute(args, formatter),
        cli::Commands::Yaml(args) => commands::yaml::execute(args),
        cli::Commands::Apply(args) => commands::apply::execute(args, formatter, cli.verbose),
        cli::Commands::Generate(args) => {
            commands::generate::execute(args, formatter, cli.verbose)
        }
        cli::Commands::Merge(args) => commands::merge::execute(args, formatter),
        cli::Commands::List(args) => commands::list::execute(args, formatter),
        cli::Commands::Completion(args) => {
            commands::completion::execute(args.shell);
            Ok(())
        }
    }
}

fn operation(command: &cli::Commands) -> &'static str {
    match command {
        cli::Commands::Save(_) => "save",
        cli::Commands::Yaml(_) => "yaml",
        cli::Commands::Apply(_) => "apply",
        cli::Commands::Generate(_) => "generate",
        cli::Commands::Merge(_) => "merge",
        cli::Commands::List(_) => "list",
        cli::Commands::Completion(_) => "completion",
    }
}

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let formatter = output::create_formatter(&cli);

    match run(&cli, &*formatter) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            formatter.format_error(operation(&cli.command), &err);
            ExitCode::FAILURE
        }
    }
}
