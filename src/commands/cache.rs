//! Cache command implementation

use std::path::PathBuf;

use crate::cache::{CacheStore, format_size};
use crate::cli::{CacheArgs, CacheSubcommand, RegistryArgs};
use crate::error::Result;

use super::helpers::{cache_store, load_config};

pub fn run(config_path: Option<PathBuf>, args: CacheArgs) -> Result<()> {
    let config = load_config(config_path.as_deref(), &RegistryArgs::default())?;
    let store = cache_store(&config)?;

    match args.command {
        Some(CacheSubcommand::List) => list_cached_blueprints(&store),
        Some(CacheSubcommand::Clear(clear_args)) => match clear_args.only {
            Some(module_id) => clean_specific_module(&store, &module_id),
            None => clean_all_cache(&store),
        },
        // Default: show only cache statistics
        None => show_cache_stats(&store),
    }
}

fn print_stats(store: &CacheStore) -> Result<usize> {
    let stats = store.stats()?;
    println!("Cache Statistics:");
    println!("  Location: {}", store.root().display());
    println!("  Modules: {}", stats.modules);
    println!("  Versions: {}", stats.entries);
    println!(
        "  Size: {} of {} ({:.1}%)",
        stats.formatted_size(),
        format_size(stats.max_size),
        stats.usage_percent()
    );
    Ok(stats.entries)
}

fn show_cache_stats(store: &CacheStore) -> Result<()> {
    if print_stats(store)? == 0 {
        println!("\nCache is empty.");
    } else {
        println!("\nRun 'architech cache list' to list cached blueprints.");
        println!("Run 'architech cache clear' to remove everything from cache.");
        println!("Run 'architech cache clear --only <module>' to remove one module.");
    }
    Ok(())
}

fn list_cached_blueprints(store: &CacheStore) -> Result<()> {
    print_stats(store)?;
    println!();

    let entries = store.list()?;
    if entries.is_empty() {
        println!("No cached blueprints.");
        return Ok(());
    }

    println!("Cached blueprints ({}):", entries.len());
    for entry in &entries {
        println!(
            "  {}@{} ({}, {})",
            entry.module_id,
            entry.version,
            format_size(entry.size),
            &entry.content_hash[..entry.content_hash.len().min(12)]
        );
    }
    Ok(())
}

fn clean_all_cache(store: &CacheStore) -> Result<()> {
    store.clear()?;
    println!("Cache cleared successfully.");
    Ok(())
}

fn clean_specific_module(store: &CacheStore, module_id: &str) -> Result<()> {
    let removed = store.remove(module_id)?;
    println!(
        "Removed {removed} cached blueprint{} of {module_id}",
        if removed == 1 { "" } else { "s" }
    );
    Ok(())
}
