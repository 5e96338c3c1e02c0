use clap::Parser;
use std::path::PathBuf;

use super::RegistryArgs;

/// Arguments for the validate command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                   Validate a genome:\n    architech validate genome.yaml")]
pub struct ValidateArgs {
    /// Genome file describing the project
    #[arg(value_name = "GENOME")]
    pub genome: PathBuf,

    #[command(flatten)]
    pub registry: RegistryArgs,
}
