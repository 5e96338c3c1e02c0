//! Validate command implementation

use std::path::PathBuf;

use console::Style;

use crate::cli::ValidateArgs;
use crate::domain::Conflict;
use crate::error::Result;
use crate::observer::TracingObserver;
use crate::operations::generate::{Pipeline, prepare};
use crate::ui;

use super::helpers::{load_config, load_genome, load_registry};

/// Run validate command
///
/// Fails with the aggregated errors of the first failing step.
pub fn run(config_path: Option<PathBuf>, args: ValidateArgs) -> Result<()> {
    let config = load_config(config_path.as_deref(), &args.registry)?;
    let registry = load_registry(&config)?;
    let genome = load_genome(&args.genome)?;

    let mut pipeline = Pipeline::new(&TracingObserver);
    pipeline.start();
    let preparation = prepare(&registry, &genome, &mut pipeline, None)?;

    let warnings: Vec<Conflict> = preparation.resolution.warnings().into_iter().cloned().collect();
    ui::display_conflicts(&warnings);
    println!(
        "{} Genome '{}' is valid: {} modules resolved into {} batches",
        Style::new().green().bold().apply_to("✔"),
        genome.project.name,
        preparation.plan.total_modules(),
        preparation.plan.batches.len()
    );
    for id in preparation.plan.module_order() {
        let Some(resolved) = preparation.resolution.get(id) else {
            continue;
        };
        println!(
            "    {} {}",
            Style::new().cyan().apply_to(id),
            Style::new().dim().apply_to(format!(
                "batch {}, {} origin, confidence {}%",
                preparation.plan.batch_of(id).unwrap_or_default(),
                format!("{:?}", resolved.origin).to_lowercase(),
                resolved.confidence
            ))
        );
    }
    Ok(())
}
