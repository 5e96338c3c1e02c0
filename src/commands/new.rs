//! New command implementation
//!
//! Generates the project a genome describes: resolve, plan, execute every
//! batch, then install package dependencies.

use std::path::PathBuf;
use std::sync::Arc;

use crate::cli::NewArgs;
use crate::error::Result;
use crate::executor::{BlueprintExecutor, ShellCommandRunner};
use crate::loader::{FsBlueprintSource, ModuleLoader};
use crate::observer::{CompositeObserver, PipelineObserver, TracingObserver};
use crate::operations::generate::{GenerateOperation, GenerateOptions, PackageManagerInstaller};
use crate::progress::ProgressObserver;
use crate::ui;

use super::helpers::{
    cache_store, current_dir, is_non_empty_dir, load_config, load_genome, load_registry,
};

/// Run new command
pub fn run(config_path: Option<PathBuf>, args: NewArgs) -> Result<()> {
    let config = load_config(config_path.as_deref(), &args.registry)?;
    let registry = load_registry(&config)?;
    let genome = load_genome(&args.genome)?;
    let root = genome.project_root(&current_dir()?);
    if is_non_empty_dir(&root) {
        tracing::warn!(root = %root.display(), "project directory is not empty");
        ui::display_existing_root(&root);
    }

    let loader = ModuleLoader::new(Box::new(FsBlueprintSource), Some(cache_store(&config)?));
    let executor = BlueprintExecutor::with_defaults(loader, config.command_timeout());
    let installer = PackageManagerInstaller::new(Arc::new(ShellCommandRunner), config.command_timeout());
    let options = GenerateOptions {
        install: !args.no_install,
        parallel: config.parallel && !args.sequential,
        package_manager: config.package_manager.clone(),
    };
    let operation = GenerateOperation::new(&registry, &executor, &installer, options);

    let progress = ProgressObserver::new();
    let observer = CompositeObserver::new(vec![&TracingObserver as &dyn PipelineObserver, &progress]);
    let result = operation.execute(&genome, &root, &observer);

    ui::display_result(&result, &root);
    if result.success {
        return Ok(());
    }
    match result.errors.into_iter().next() {
        Some(error) => Err(error),
        None => Ok(()),
    }
}
