//! Plan command implementation
//!
//! Runs every step up to planning without touching the filesystem and prints
//! the resulting batches.

use std::path::PathBuf;

use crate::cli::PlanArgs;
use crate::domain::Conflict;
use crate::error::Result;
use crate::observer::TracingObserver;
use crate::operations::generate::{Pipeline, prepare};
use crate::ui;

use super::helpers::{load_config, load_genome, load_registry};

/// Run plan command
pub fn run(config_path: Option<PathBuf>, args: PlanArgs) -> Result<()> {
    let config = load_config(config_path.as_deref(), &args.registry)?;
    let registry = load_registry(&config)?;
    let genome = load_genome(&args.genome)?;

    let mut pipeline = Pipeline::new(&TracingObserver);
    pipeline.start();
    let preparation = prepare(&registry, &genome, &mut pipeline, None)?;

    let warnings: Vec<Conflict> = preparation.resolution.warnings().into_iter().cloned().collect();
    if !warnings.is_empty() {
        ui::display_conflicts(&warnings);
        println!();
    }
    ui::display_plan(&preparation.plan, &preparation.resolution);
    Ok(())
}
