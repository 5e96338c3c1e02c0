//! Pipeline observation
//!
//! The orchestrator reports every state transition and execution milestone to
//! an injected [`PipelineObserver`]. [`TracingObserver`] forwards events to
//! `tracing`; the CLI layers a progress display on top.

use std::fmt;

use crate::domain::{Conflict, ExecutionPlan};
use crate::executor::ModuleReport;

/// Orchestrator states
///
/// ```text
/// Validating → ResolvingFeatures → ResolvingDependencies → BuildingGraph
///   → SettingUpFramework → Planning → Executing(1..n) → InstallingDependencies → Done
/// ```
///
/// `Failed` is reachable from any state and is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Validating,
    ResolvingFeatures,
    ResolvingDependencies,
    BuildingGraph,
    SettingUpFramework,
    Planning,
    Executing { batch: usize },
    InstallingDependencies,
    Done,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Validating => f.write_str("validating"),
            PipelineState::ResolvingFeatures => f.write_str("resolving features"),
            PipelineState::ResolvingDependencies => f.write_str("resolving dependencies"),
            PipelineState::BuildingGraph => f.write_str("building graph"),
            PipelineState::SettingUpFramework => f.write_str("setting up framework"),
            PipelineState::Planning => f.write_str("planning"),
            PipelineState::Executing { batch } => write!(f, "executing batch {batch}"),
            PipelineState::InstallingDependencies => f.write_str("installing dependencies"),
            PipelineState::Done => f.write_str("done"),
            PipelineState::Failed => f.write_str("failed"),
        }
    }
}

/// Something the orchestrator did
#[derive(Debug, Clone, Copy)]
pub enum PipelineEvent<'a> {
    StateChanged {
        from: PipelineState,
        to: PipelineState,
    },
    Conflict(&'a Conflict),
    PlanReady(&'a ExecutionPlan),
    BatchStarted {
        number: usize,
        total: usize,
        modules: &'a [String],
        parallel: bool,
    },
    ModuleStarted(&'a str),
    ModuleCommitted(&'a ModuleReport),
    ModuleFailed {
        module: &'a str,
        error: &'a str,
    },
}

/// Sink for pipeline events; called from worker threads during parallel batches
pub trait PipelineObserver: Send + Sync {
    fn on_event(&self, event: PipelineEvent<'_>);
}

/// Forwards pipeline events to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn on_event(&self, event: PipelineEvent<'_>) {
        match event {
            PipelineEvent::StateChanged { from, to } => {
                tracing::info!(%from, %to, "pipeline state changed");
            }
            PipelineEvent::Conflict(conflict) if conflict.is_error() => {
                tracing::error!(module = %conflict.module_id, conflict = %conflict.describe(), "resolution conflict");
            }
            PipelineEvent::Conflict(conflict) => {
                tracing::warn!(module = %conflict.module_id, conflict = %conflict.describe(), "resolution warning");
            }
            PipelineEvent::PlanReady(plan) => {
                tracing::info!(batches = plan.batches.len(), modules = plan.total_modules(), "execution plan ready");
            }
            PipelineEvent::BatchStarted {
                number,
                total,
                modules,
                parallel,
            } => {
                tracing::info!(number, total, modules = %modules.join(", "), parallel, "batch started");
            }
            PipelineEvent::ModuleStarted(module) => tracing::debug!(module, "module started"),
            PipelineEvent::ModuleCommitted(report) => {
                tracing::info!(module = %report.module_id, files = report.files.len(), "module committed");
            }
            PipelineEvent::ModuleFailed { module, error } => {
                tracing::error!(module, error, "module failed");
            }
        }
    }
}

/// Fans events out to several observers
pub struct CompositeObserver<'a> {
    observers: Vec<&'a dyn PipelineObserver>,
}

impl<'a> CompositeObserver<'a> {
    pub fn new(observers: Vec<&'a dyn PipelineObserver>) -> Self {
        Self { observers }
    }
}

impl PipelineObserver for CompositeObserver<'_> {
    fn on_event(&self, event: PipelineEvent<'_>) {
        for observer in &self.observers {
            observer.on_event(event);
        }
    }
}

/// Records states and a one-line summary of every event
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingObserver {
    states: std::sync::Mutex<Vec<PipelineState>>,
    events: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl RecordingObserver {
    pub fn states(&self) -> Vec<PipelineState> {
        self.states.lock().unwrap().clone()
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl PipelineObserver for RecordingObserver {
    fn on_event(&self, event: PipelineEvent<'_>) {
        let line = match event {
            PipelineEvent::StateChanged { to, .. } => {
                self.states.lock().unwrap().push(to);
                format!("state {to}")
            }
            PipelineEvent::Conflict(conflict) => format!("conflict {}", conflict.module_id),
            PipelineEvent::PlanReady(plan) => format!("plan {}", plan.batches.len()),
            PipelineEvent::BatchStarted { number, .. } => format!("batch {number}"),
            PipelineEvent::ModuleStarted(module) => format!("start {module}"),
            PipelineEvent::ModuleCommitted(report) => format!("commit {}", report.module_id),
            PipelineEvent::ModuleFailed { module, .. } => format!("fail {module}"),
        };
        self.events.lock().unwrap().push(line);
    }
}
