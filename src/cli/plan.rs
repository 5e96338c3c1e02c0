use clap::Parser;
use std::path::PathBuf;

use super::RegistryArgs;

/// Arguments for the plan command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                   Show the execution plan:\n    architech plan genome.yaml\n\n\
                   Use a custom module registry:\n    architech plan genome.yaml --modules-dir ./modules")]
pub struct PlanArgs {
    /// Genome file describing the project
    #[arg(value_name = "GENOME")]
    pub genome: PathBuf,

    #[command(flatten)]
    pub registry: RegistryArgs,
}

#[cfg(test)]
mod tests {
    use super::super::{Cli, Commands};
    use super::*;

    #[test]
    fn test_cli_parsing_plan() {
        let cli = Cli::try_parse_from(["architech", "plan", "app.yaml", "--modules-dir", "mods"]).unwrap();
        match cli.command {
            Commands::Plan(args) => {
                assert_eq!(args.genome, PathBuf::from("app.yaml"));
                assert_eq!(args.registry.modules_dir, Some(PathBuf::from("mods")));
            }
            _ => panic!("Expected Plan command"),
        }
    }
}
