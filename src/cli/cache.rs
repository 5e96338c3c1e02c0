use clap::{Parser, Subcommand};

/// Arguments for cache command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Show cache statistics:\n    architech cache\n\n\
                  List cached blueprints:\n    architech cache list\n\n\
                  Clear all cached blueprints:\n    architech cache clear\n\n\
                  Remove one module's blueprints:\n    architech cache clear --only adapter/drizzle")]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: Option<CacheSubcommand>,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheSubcommand {
    /// List cached blueprints
    List,

    /// Clear cached blueprints
    Clear(ClearCacheArgs),
}

/// Arguments for cache clear command
#[derive(Parser, Debug)]
pub struct ClearCacheArgs {
    /// Remove only the blueprints of one module (e.g., adapter/drizzle)
    #[arg(long, value_name = "MODULE")]
    pub only: Option<String>,
}
