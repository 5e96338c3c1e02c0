//! CLI definitions using clap derive API
//!
//! This module is organized into submodules for each command's argument types:
//! - new: New command arguments
//! - plan: Plan command arguments
//! - validate: Validate command arguments
//! - modules: Modules command arguments
//! - cache: Cache command arguments

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod cache;
pub mod modules;
pub mod new;
pub mod plan;
pub mod validate;

pub use cache::{CacheArgs, CacheSubcommand, ClearCacheArgs};
pub use modules::ModulesArgs;
pub use new::NewArgs;
pub use plan::PlanArgs;
pub use validate::ValidateArgs;

/// Architech - genome-driven project generator
///
/// Resolve the modules a genome asks for and generate the project they describe.
#[derive(Parser, Debug)]
#[command(
    name = "architech",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Genome-driven project generator",
    long_about = "Architech reads a genome (a declarative project description), resolves the \
                  modules it needs through their capabilities, and executes their blueprints \
                  in dependency order to generate the project.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  architech new genome.yaml                 \x1b[90m# Generate the project\x1b[0m\n   \
                  architech new genome.yaml --no-install    \x1b[90m# Skip the package manager\x1b[0m\n   \
                  architech plan genome.yaml                \x1b[90m# Show the execution plan\x1b[0m\n   \
                  architech validate genome.yaml            \x1b[90m# Check genome and resolution\x1b[0m\n   \
                  architech modules --category adapter      \x1b[90m# List adapter modules\x1b[0m\n   \
                  architech cache clear                     \x1b[90m# Drop cached blueprints\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Engine configuration file (defaults to <config dir>/architech/config.yaml)
    #[arg(long, short = 'c', global = true, value_name = "FILE", env = "ARCHITECH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a project from a genome
    New(NewArgs),

    /// Resolve a genome and print its execution plan
    Plan(PlanArgs),

    /// Validate a genome and report resolution conflicts
    Validate(ValidateArgs),

    /// List the modules in the registry
    Modules(ModulesArgs),

    /// Manage the blueprint cache
    #[command(name = "cache")]
    Cache(CacheArgs),
}

/// Registry location shared by the commands that read modules
#[derive(Args, Debug, Clone, Default)]
pub struct RegistryArgs {
    /// Module registry directory (overrides the configuration)
    #[arg(long, value_name = "DIR", env = "ARCHITECH_MODULES_DIR")]
    pub modules_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_modules() {
        let cli = Cli::try_parse_from(["architech", "modules"]).unwrap();
        assert!(matches!(cli.command, Commands::Modules(_)));
    }

    #[test]
    fn test_cli_global_options() {
        let cli = Cli::try_parse_from(["architech", "-v", "--config", "/tmp/config.yaml", "modules"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/config.yaml")));
    }

    #[test]
    fn test_cli_global_options_after_subcommand() {
        let cli = Cli::try_parse_from(["architech", "plan", "genome.yaml", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Plan(_)));
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["architech"]).is_err());
    }

    #[test]
    fn test_cli_rejects_unknown_subcommand() {
        assert!(Cli::try_parse_from(["architech", "install"]).is_err());
    }
}
