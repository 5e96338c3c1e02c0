//! Batch execution
//!
//! Batches run strictly in order. Modules of a parallel batch run on scoped
//! worker threads, each with its own VFS; flushes go through one shared
//! [`FlushGate`]. The first failing batch stops the run: later batches never
//! start, and modules that already committed stay on disk.

use std::path::{Path, PathBuf};
use std::thread;

use crate::config::ProjectSpec;
use crate::domain::{ExecutionBatch, ExecutionPlan};
use crate::error::{ArchitechError, Result};
use crate::executor::{BlueprintExecutor, ExecutionTarget, FlushGate, ModuleReport};
use crate::observer::{PipelineEvent, PipelineObserver, PipelineState};
use crate::resolver::Resolution;

use super::pipeline::Pipeline;

/// What executing the plan achieved
#[derive(Debug, Default)]
pub struct ExecutionProgress {
    pub committed: Vec<String>,
    pub files: Vec<PathBuf>,
    pub warnings: Vec<String>,
    pub errors: Vec<ArchitechError>,
}

pub struct BatchRunner<'a> {
    pub executor: &'a BlueprintExecutor,
    pub resolution: &'a Resolution,
    pub project: &'a ProjectSpec,
    pub root: &'a Path,
    /// Allow parallel batches to use worker threads
    pub parallel: bool,
}

impl BatchRunner<'_> {
    /// Execute every batch in order, stopping at the first failing one
    pub fn run(&self, plan: &ExecutionPlan, pipeline: &mut Pipeline<'_>) -> ExecutionProgress {
        let gate = FlushGate::new();
        let mut progress = ExecutionProgress::default();
        let total = plan.batches.len();

        for batch in &plan.batches {
            pipeline.transition(PipelineState::Executing { batch: batch.number });
            let observer = pipeline.observer();
            observer.on_event(PipelineEvent::BatchStarted {
                number: batch.number,
                total,
                modules: &batch.modules,
                parallel: batch.can_execute_in_parallel && self.parallel,
            });

            let results = self.run_batch(batch, &gate, observer);
            for (id, result) in batch.modules.iter().zip(results) {
                match result {
                    Ok(report) => {
                        observer.on_event(PipelineEvent::ModuleCommitted(&report));
                        progress.committed.push(report.module_id);
                        progress.files.extend(report.files);
                        progress.warnings.extend(report.warnings);
                    }
                    Err(error) => {
                        observer.on_event(PipelineEvent::ModuleFailed {
                            module: id,
                            error: &error.to_string(),
                        });
                        progress.errors.push(error);
                    }
                }
            }

            if !progress.errors.is_empty() {
                tracing::error!(
                    batch = batch.number,
                    remaining = total - batch.number,
                    "batch failed, stopping execution"
                );
                break;
            }
        }
        progress
    }

    /// Results in batch module order
    fn run_batch(
        &self,
        batch: &ExecutionBatch,
        gate: &FlushGate,
        observer: &dyn PipelineObserver,
    ) -> Vec<Result<ModuleReport>> {
        if batch.can_execute_in_parallel && self.parallel && batch.modules.len() > 1 {
            thread::scope(|scope| {
                let handles: Vec<_> = batch
                    .modules
                    .iter()
                    .map(|id| scope.spawn(move || self.run_module(id, gate, observer)))
                    .collect();
                batch
                    .modules
                    .iter()
                    .zip(handles)
                    .map(|(id, handle)| {
                        handle.join().unwrap_or_else(|_| {
                            Err(ArchitechError::IoError {
                                message: format!("worker for module '{id}' panicked"),
                            })
                        })
                    })
                    .collect()
            })
        } else {
            let mut results = Vec::with_capacity(batch.modules.len());
            for id in &batch.modules {
                let result = self.run_module(id, gate, observer);
                let failed = result.is_err();
                results.push(result);
                if failed {
                    break;
                }
            }
            results
        }
    }

    fn run_module(&self, id: &str, gate: &FlushGate, observer: &dyn PipelineObserver) -> Result<ModuleReport> {
        observer.on_event(PipelineEvent::ModuleStarted(id));
        let module = self
            .resolution
            .get(id)
            .ok_or_else(|| crate::error::module::not_found(id))?;
        let target = ExecutionTarget {
            project: self.project,
            root: self.root,
        };
        self.executor.execute_module(module, target, gate)
    }
}
