use clap::Parser;
use std::path::PathBuf;

use super::RegistryArgs;

/// Arguments for the new command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                   Generate a project:\n    architech new genome.yaml\n\n\
                   Use a custom module registry:\n    architech new genome.yaml --modules-dir ./modules\n\n\
                   Skip dependency installation:\n    architech new genome.yaml --no-install\n\n\
                   Run every module one at a time:\n    architech new genome.yaml --sequential")]
pub struct NewArgs {
    /// Genome file describing the project
    #[arg(value_name = "GENOME")]
    pub genome: PathBuf,

    #[command(flatten)]
    pub registry: RegistryArgs,

    /// Do not run the package manager after generation
    #[arg(long)]
    pub no_install: bool,

    /// Execute modules of parallel batches one at a time
    #[arg(long)]
    pub sequential: bool,
}
