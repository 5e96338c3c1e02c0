//! Progress bar display for generate runs

use indicatif::{ProgressBar, ProgressStyle};

use crate::observer::{PipelineEvent, PipelineObserver, PipelineState};

const TEMPLATE: &str = "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}";

/// Pipeline observer drawing one bar over every planned module
///
/// Indicatif hides the bar when stderr is not a terminal, so this observer is
/// safe to use unconditionally.
pub struct ProgressObserver {
    bar: ProgressBar,
}

impl ProgressObserver {
    pub fn new() -> Self {
        Self::with_bar(ProgressBar::new(0))
    }

    fn with_bar(bar: ProgressBar) -> Self {
        let style = ProgressStyle::default_bar()
            .template(TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        bar.set_style(style);
        Self { bar }
    }

    #[cfg(test)]
    fn hidden() -> Self {
        Self::with_bar(ProgressBar::hidden())
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineObserver for ProgressObserver {
    fn on_event(&self, event: PipelineEvent<'_>) {
        match event {
            PipelineEvent::StateChanged { to, .. } => match to {
                PipelineState::Done => self.bar.finish_with_message("done"),
                PipelineState::Failed => self.bar.abandon_with_message("failed"),
                PipelineState::Executing { .. } => {}
                other => self.bar.set_message(other.to_string()),
            },
            PipelineEvent::PlanReady(plan) => self.bar.set_length(plan.total_modules() as u64),
            PipelineEvent::BatchStarted { number, total, .. } => {
                self.bar.set_message(format!("batch {number}/{total}"));
            }
            PipelineEvent::ModuleStarted(module) => self.bar.set_message(module.to_string()),
            PipelineEvent::ModuleCommitted(_) => self.bar.inc(1),
            PipelineEvent::ModuleFailed { module, .. } => {
                self.bar.set_message(format!("{module} failed"));
            }
            PipelineEvent::Conflict(_) => {}
        }
    }
}
