use clap::Parser;

use super::RegistryArgs;

/// Arguments for the modules command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                   List every module:\n    architech modules\n\n\
                   List only adapters:\n    architech modules --category adapter")]
pub struct ModulesArgs {
    /// Only list modules of this category
    #[arg(long, value_parser = ["framework", "adapter", "integration", "feature"])]
    pub category: Option<String>,

    #[command(flatten)]
    pub registry: RegistryArgs,
}
