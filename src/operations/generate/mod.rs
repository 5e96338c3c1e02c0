//! Generate operation
//!
//! Drives a genome through the whole pipeline:
//!
//! ```text
//! Validating → ResolvingFeatures → ResolvingDependencies → BuildingGraph
//!   → SettingUpFramework → Planning → Executing(1..n) → InstallingDependencies → Done
//! ```
//!
//! Any error moves the pipeline to `Failed`. Pre-execution errors are
//! aggregated per class ([`preparation`]); execution errors stop at the first
//! failing batch ([`execution`]). Modules that committed before a failure stay
//! on disk; there is no rollback across modules.

pub mod execution;
pub mod install;
pub mod pipeline;
pub mod preparation;


use std::path::{Path, PathBuf};

use crate::config::Genome;
use crate::domain::ExecutionPlan;
use crate::error::ArchitechError;
use crate::executor::BlueprintExecutor;
use crate::observer::{PipelineObserver, PipelineState};
use crate::registry::ModuleRegistry;

pub use execution::BatchRunner;
pub use install::{DependencyInstaller, PackageManagerInstaller};
pub use pipeline::Pipeline;
pub use preparation::{Preparation, prepare};

const PACKAGE_MANIFEST: &str = "package.json";

/// Configuration options for generation
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Run the package manager after execution
    pub install: bool,
    /// Run parallel batches on worker threads
    pub parallel: bool,
    /// Package manager when the genome names none
    pub package_manager: String,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            install: true,
            parallel: true,
            package_manager: "npm".to_string(),
        }
    }
}

/// Outcome of a generate run
#[derive(Debug)]
pub struct ExecutionResult {
    pub success: bool,
    /// Number of modules committed to disk
    pub modules_executed: usize,
    pub errors: Vec<ArchitechError>,
    pub warnings: Vec<String>,
    pub final_state: PipelineState,
    /// Ids of the committed modules, in commit order
    pub committed: Vec<String>,
    pub files: Vec<PathBuf>,
    pub plan: Option<ExecutionPlan>,
}

impl ExecutionResult {
    fn new() -> Self {
        Self {
            success: false,
            modules_executed: 0,
            errors: Vec::new(),
            warnings: Vec::new(),
            final_state: PipelineState::Validating,
            committed: Vec::new(),
            files: Vec::new(),
            plan: None,
        }
    }
}

/// High-level generate operation
pub struct GenerateOperation<'a> {
    registry: &'a ModuleRegistry,
    executor: &'a BlueprintExecutor,
    installer: &'a dyn DependencyInstaller,
    options: GenerateOptions,
}

impl<'a> GenerateOperation<'a> {
    pub fn new(
        registry: &'a ModuleRegistry,
        executor: &'a BlueprintExecutor,
        installer: &'a dyn DependencyInstaller,
        options: GenerateOptions,
    ) -> Self {
        Self {
            registry,
            executor,
            installer,
            options,
        }
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    /// Generate the project described by `genome` under `project_root`
    pub fn execute(&self, genome: &Genome, project_root: &Path, observer: &dyn PipelineObserver) -> ExecutionResult {
        let mut pipeline = Pipeline::new(observer);
        pipeline.start();
        let mut result = ExecutionResult::new();

        match self.drive(genome, project_root, &mut pipeline, &mut result) {
            Ok(()) => {
                pipeline.transition(PipelineState::Done);
                result.success = true;
            }
            Err(error) => {
                tracing::error!(state = %pipeline.state(), error = %error, "generation failed");
                result.errors.insert(0, error);
                pipeline.fail();
            }
        }
        result.final_state = pipeline.state();
        result
    }

    fn drive(
        &self,
        genome: &Genome,
        project_root: &Path,
        pipeline: &mut Pipeline<'_>,
        result: &mut ExecutionResult,
    ) -> crate::error::Result<()> {
        let preparation = prepare(self.registry, genome, pipeline, Some(project_root))?;
        result.warnings.extend(preparation.warnings());

        let runner = BatchRunner {
            executor: self.executor,
            resolution: &preparation.resolution,
            project: &genome.project,
            root: project_root,
            parallel: self.options.parallel,
        };
        let progress = runner.run(&preparation.plan, pipeline);
        result.plan = Some(preparation.plan);
        result.modules_executed = progress.committed.len();
        result.committed = progress.committed;
        result.files = progress.files;
        result.warnings.extend(progress.warnings);

        let mut errors = progress.errors.into_iter();
        if let Some(first) = errors.next() {
            result.errors.extend(errors);
            return Err(first);
        }

        pipeline.transition(PipelineState::InstallingDependencies);
        if !self.options.install {
            tracing::info!("dependency installation skipped");
        } else if project_root.join(PACKAGE_MANIFEST).is_file() {
            let package_manager = genome.package_manager(&self.options.package_manager);
            self.installer.install(package_manager, project_root)?;
        } else {
            tracing::debug!("no {PACKAGE_MANIFEST}, nothing to install");
        }
        Ok(())
    }
}
