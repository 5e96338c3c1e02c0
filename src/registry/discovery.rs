//! Module manifest discovery

use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::domain::Module;
use crate::error::{
    Result,
    config::parse_failed as config_parse_failed,
    fs::{not_found as file_not_found, read_failed as file_read_failed},
};

/// Manifest file name inside a module directory
pub const MANIFEST_FILE: &str = "module.yaml";

/// Blueprint file name next to the manifest
pub const BLUEPRINT_FILE: &str = "blueprint.yaml";

/// Walk `root` and parse every module manifest, sorted by path
pub fn discover_modules(root: &Path) -> Result<Vec<Module>> {
    if !root.is_dir() {
        return Err(file_not_found(root));
    }

    let mut manifests: Vec<_> = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && e.file_name() == MANIFEST_FILE)
        .map(|e| e.into_path())
        .collect();
    manifests.sort();

    let mut modules = Vec::with_capacity(manifests.len());
    for manifest in manifests {
        let content = fs::read_to_string(&manifest).map_err(|e| file_read_failed(&manifest, e))?;
        let mut module: Module = serde_yaml::from_str(&content)
            .map_err(|e| config_parse_failed(manifest.display().to_string(), e.to_string()))?;
        module.source_dir = manifest.parent().map(Path::to_path_buf);
        tracing::debug!(module = %module.id, path = %manifest.display(), "discovered module");
        modules.push(module);
    }
    Ok(modules)
}
