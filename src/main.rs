//! Architech - genome-driven project generator
//!
//! Reads a genome (a declarative project description), resolves the modules it
//! needs through their capabilities, plans them into dependency-ordered batches
//! and executes their blueprints to generate the project.

use clap::Parser;
use miette::Diagnostic;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod cache;
mod cli;
mod commands;
mod config;
mod domain;
mod error;
mod executor;
mod hash;
mod loader;
mod observer;
mod operations;
mod progress;
mod registry;
mod resolver;
mod ui;

use cli::{Cli, Commands};

/// Log filter when `RUST_LOG` is unset
fn default_filter(verbose: bool) -> &'static str {
    if verbose { "architech=debug" } else { "warn" }
}

/// Initialize logging to stderr
///
/// `RUST_LOG` takes precedence over `--verbose`.
fn init_logging(verbose: bool) {
    let env_filter = match std::env::var("RUST_LOG") {
        Ok(_) => EnvFilter::from_default_env(),
        Err(_) => EnvFilter::new(default_filter(verbose)),
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose)
                .with_ansi(std::env::var_os("NO_COLOR").is_none()),
        )
        .with(env_filter)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::New(args) => commands::new::run(cli.config, args),
        Commands::Plan(args) => commands::plan::run(cli.config, args),
        Commands::Validate(args) => commands::validate::run(cli.config, args),
        Commands::Modules(args) => commands::modules::run(cli.config, args),
        Commands::Cache(args) => commands::cache::run(cli.config, args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        if let Some(help) = e.help() {
            eprintln!("  help: {help}");
        }
        std::process::exit(1);
    }
}
