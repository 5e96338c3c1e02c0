//! Modules command implementation

use std::path::PathBuf;

use crate::cli::ModulesArgs;
use crate::domain::ModuleCategory;
use crate::error::{Result, config::invalid as config_invalid};
use crate::ui;

use super::helpers::{load_config, load_registry};

/// Run modules command
pub fn run(config_path: Option<PathBuf>, args: ModulesArgs) -> Result<()> {
    let config = load_config(config_path.as_deref(), &args.registry)?;
    let registry = load_registry(&config)?;

    let modules = match args.category.as_deref() {
        Some(name) => {
            let category = ModuleCategory::parse(name)
                .ok_or_else(|| config_invalid(format!("unknown module category '{name}'")))?;
            registry.by_category(category)
        }
        None => registry.modules(),
    };
    ui::display_modules(&modules);
    Ok(())
}
