//! Everything that happens before the first file is written
//!
//! Validating → ResolvingFeatures → ResolvingDependencies → BuildingGraph →
//! SettingUpFramework → Planning. Each step aggregates the problems of its
//! own class and stops the pipeline on error. Cycles and conflicts are
//! therefore always detected before any module executes.

use std::fs;
use std::path::Path;

use crate::config::Genome;
use crate::domain::{Conflict, ConflictKind, ExecutionPlan, ModuleCategory, ModuleOrigin};
use crate::error::{ArchitechError, Result, fs::write_failed, validation};
use crate::observer::{PipelineEvent, PipelineState};
use crate::registry::ModuleRegistry;
use crate::resolver::{
    CapabilityResolver, DependencyGraph, Resolution, Seed, features, genome_seeds, planner,
};

use super::pipeline::Pipeline;

/// Resolved module set and the plan to execute it
#[derive(Debug)]
pub struct Preparation {
    pub resolution: Resolution,
    pub plan: ExecutionPlan,
}

impl Preparation {
    /// Warning conflicts, formatted
    pub fn warnings(&self) -> Vec<String> {
        self.resolution
            .warnings()
            .into_iter()
            .map(Conflict::describe)
            .collect()
    }
}

/// Run the pre-execution steps
///
/// With `setup_root` the framework setup creates the project directory and
/// the framework's directory structure; without it the run is dry.
pub fn prepare(
    registry: &ModuleRegistry,
    genome: &Genome,
    pipeline: &mut Pipeline<'_>,
    setup_root: Option<&Path>,
) -> Result<Preparation> {
    pipeline.transition(PipelineState::Validating);
    genome.validate()?;
    let framework = genome.project.framework.as_str();

    pipeline.transition(PipelineState::ResolvingFeatures);
    let mut conflicts = Vec::new();
    let mut seeds = genome_seeds(genome);
    if let Some(conflict) = ensure_framework_seed(registry, framework, &mut seeds) {
        conflicts.push(conflict);
    }
    let expansion = features::expand_features(registry, genome, &seeds);
    seeds.extend(expansion.seeds);
    conflicts.extend(expansion.conflicts);

    pipeline.transition(PipelineState::ResolvingDependencies);
    let mut resolution = CapabilityResolver::new(registry).resolve(framework, seeds);
    conflicts.append(&mut resolution.conflicts);
    resolution.conflicts = conflicts;
    for conflict in &resolution.conflicts {
        pipeline.observer().on_event(PipelineEvent::Conflict(conflict));
    }
    resolution.ensure_no_errors()?;
    tracing::debug!(modules = ?resolution.execution_order(), "module set resolved");

    pipeline.transition(PipelineState::BuildingGraph);
    let graph = DependencyGraph::build(&resolution)?;

    pipeline.transition(PipelineState::SettingUpFramework);
    setup_framework(genome, &resolution, setup_root)?;

    pipeline.transition(PipelineState::Planning);
    let plan = planner::plan(&graph)?;
    pipeline.observer().on_event(PipelineEvent::PlanReady(&plan));

    Ok(Preparation { resolution, plan })
}

/// Seed `framework/<name>` when the genome lists no framework module
fn ensure_framework_seed(registry: &ModuleRegistry, framework: &str, seeds: &mut Vec<Seed>) -> Option<Conflict> {
    let has_framework = seeds.iter().any(|seed| {
        registry
            .get(&seed.id)
            .is_some_and(|m| m.category == ModuleCategory::Framework)
    });
    if has_framework {
        return None;
    }

    let id = format!("{}/{framework}", ModuleCategory::Framework.as_str());
    if registry.contains(&id) {
        tracing::debug!(module = %id, "adding framework module for project framework");
        seeds.insert(
            0,
            Seed::new(id, ModuleOrigin::Framework, 100, "added for project framework"),
        );
        None
    } else {
        Some(
            Conflict::warning(
                ConflictKind::UnknownModule,
                id.as_str(),
                format!("no module in the registry provides the '{framework}' framework"),
            )
            .with_suggestions([format!("add a framework/{framework} module to the registry")]),
        )
    }
}

fn setup_framework(genome: &Genome, resolution: &Resolution, setup_root: Option<&Path>) -> Result<()> {
    let framework = resolution
        .modules
        .iter()
        .find(|m| m.category() == ModuleCategory::Framework)
        .ok_or(ArchitechError::MissingFramework)?;

    if framework.module.name() != genome.project.framework {
        return Err(validation::failed(vec![format!(
            "framework module '{}' does not match project.framework '{}'",
            framework.id(),
            genome.project.framework
        )]));
    }

    let Some(root) = setup_root else {
        return Ok(());
    };
    fs::create_dir_all(root).map_err(|e| write_failed(root, e))?;
    for dir in &framework.module.directories {
        let path = root.join(dir);
        fs::create_dir_all(&path).map_err(|e| write_failed(&path, e))?;
    }
    tracing::info!(
        framework = %framework.id(),
        root = %root.display(),
        directories = framework.module.directories.len(),
        "framework directories ready"
    );
    Ok(())
}
