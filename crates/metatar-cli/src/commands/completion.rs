//! Shell completion generation command.

use crate::cli::Cli;
use clap::CommandFactory;
use clap_complete::Shell;
use std::io;
use std::io::Write;

const BIN_NAME: &str = "metatar";

/// Writes completions for `shell` to `out`.
pub fn generate<W: Write>(shell: Shell, out: &mut W) {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, BIN_NAME, out);
}

/// Prints completions for `shell` to standard output.
pub fn execute(shell: Shell) {
    generate(shell, &mut io::stdout());
}
