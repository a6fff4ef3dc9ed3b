//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;
use metatar_core::ApplyConfig;
use metatar_core::OutputFormat;
use metatar_core::SaveConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "metatar")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Save the metadata of an archive to a YAML file
    Save(SaveArgs),
    /// Print the metadata of an archive as YAML
    Yaml(YamlArgs),
    /// Apply a YAML file to an archive and write a new archive
    Apply(ApplyArgs),
    /// Build an archive from the inline bodies of a YAML file
    Generate(GenerateArgs),
    /// Merge a second YAML file into a first one
    Merge(MergeArgs),
    /// List the members of a tar or cpio archive
    List(ListArgs),
    /// Generate shell completions
    Completion(CompletionArgs),
}

/// Options shared by `save` and `yaml`.
#[derive(clap::Args)]
pub struct ExtractOptions {
    /// Store file contents inline as base64
    #[arg(short = 'd', long = "data")]
    pub data: bool,

    /// Write every field, including default values
    #[arg(short = 'e', long)]
    pub expand: bool,

    /// Record every entry as owned by root
    #[arg(short = 'r', long)]
    pub root: bool,

    /// Leave out user and group fields
    #[arg(short = 'n', long = "nouser")]
    pub no_user: bool,
}

impl ExtractOptions {
    pub fn save_config(&self) -> SaveConfig {
        SaveConfig::default()
            .with_body(self.data)
            .with_omit_defaults(!self.expand)
            .with_root(self.root)
            .with_include_owner(!self.no_user)
    }
}

#[derive(clap::Args)]
pub struct SaveArgs {
    /// Path to the source archive
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Path of the YAML file to write
    #[arg(value_name = "YAML")]
    pub yaml: PathBuf,

    #[command(flatten)]
    pub options: ExtractOptions,

    /// Overwrite the YAML file if it exists
    #[arg(short = 'f', long)]
    pub force: bool,
}

#[derive(clap::Args)]
pub struct YamlArgs {
    /// Path to the source archive
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    #[command(flatten)]
    pub options: ExtractOptions,
}

/// Options shared by `apply` and `generate`.
#[derive(clap::Args)]
pub struct BuildOptions {
    /// Write a newc cpio archive instead of tar
    #[arg(short = 'c', long)]
    pub cpio: bool,

    /// Keep regular files that have no contents
    #[arg(short = 'o', long = "noskip")]
    pub no_skip: bool,

    /// Modification time for every record, in seconds since the epoch
    #[arg(long, value_name = "SECONDS")]
    pub mtime: Option<u64>,

    /// Overwrite the output file if it exists
    #[arg(short = 'f', long)]
    pub force: bool,
}

impl BuildOptions {
    pub const fn format(&self) -> OutputFormat {
        if self.cpio {
            OutputFormat::Cpio
        } else {
            OutputFormat::Tar
        }
    }

    pub fn apply_config(&self, verbose: bool) -> ApplyConfig {
        ApplyConfig::default()
            .with_skip_empty_files(!self.no_skip)
            .with_mtime(self.mtime)
            .with_verbose(verbose)
    }
}

#[derive(clap::Args)]
pub struct ApplyArgs {
    /// Path to the source archive
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Path to the YAML file
    #[arg(value_name = "YAML")]
    pub yaml: PathBuf,

    /// Path of the archive to write
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    #[command(flatten)]
    pub options: BuildOptions,

    /// Use file contents stored inline in the YAML file
    #[arg(short = 'd', long = "data")]
    pub data: bool,

    /// Write every entry as owned by root
    #[arg(short = 'r', long)]
    pub root: bool,
}

#[derive(clap::Args)]
pub struct GenerateArgs {
    /// Path to the YAML file
    #[arg(value_name = "YAML")]
    pub yaml: PathBuf,

    /// Path of the archive to write
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    #[command(flatten)]
    pub options: BuildOptions,

    /// Write every entry as owned by root
    #[arg(short = 'r', long)]
    pub root: bool,
}

#[derive(clap::Args)]
pub struct MergeArgs {
    /// Base YAML file
    #[arg(value_name = "BASE")]
    pub base: PathBuf,

    /// YAML file whose entries take precedence
    #[arg(value_name = "OVERLAY")]
    pub overlay: PathBuf,

    /// Path of the merged YAML file
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Write every field, including default values
    #[arg(short = 'e', long)]
    pub expand: bool,

    /// Overwrite the output file if it exists
    #[arg(short = 'f', long)]
    pub force: bool,
}

#[derive(clap::Args)]
pub struct ListArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Read the archive as newc cpio whatever its name
    #[arg(short = 'p', long)]
    pub cpio: bool,

    /// Show type, mode, owner and size of each member
    #[arg(short, long)]
    pub long: bool,

    /// Show sizes in human-readable format
    #[arg(short = 'H', long)]
    pub human_readable: bool,
}

#[derive(clap::Args)]
pub struct CompletionArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}
