//! Orchestrator state machine

use crate::observer::{PipelineEvent, PipelineObserver, PipelineState};

/// Current pipeline state plus the observer every transition is reported to
pub struct Pipeline<'a> {
    state: PipelineState,
    observer: &'a dyn PipelineObserver,
}

impl<'a> Pipeline<'a> {
    pub fn new(observer: &'a dyn PipelineObserver) -> Self {
        Self {
            state: PipelineState::Validating,
            observer,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn observer(&self) -> &'a dyn PipelineObserver {
        self.observer
    }

    /// Move to `to` and report it; terminal states never change
    pub fn transition(&mut self, to: PipelineState) {
        if self.state.is_terminal() || self.state == to {
            return;
        }
        let from = self.state;
        self.state = to;
        self.observer.on_event(PipelineEvent::StateChanged { from, to });
    }

    pub fn fail(&mut self) {
        self.transition(PipelineState::Failed);
    }

    /// Report the initial state
    pub fn start(&self) {
        self.observer.on_event(PipelineEvent::StateChanged {
            from: self.state,
            to: self.state,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::RecordingObserver;

    #[test]
    fn test_failed_is_irreversible() {
        let observer = RecordingObserver::default();
        let mut pipeline = Pipeline::new(&observer);
        pipeline.transition(PipelineState::ResolvingFeatures);
        pipeline.fail();
        pipeline.transition(PipelineState::Planning);
        pipeline.transition(PipelineState::Done);

        assert_eq!(pipeline.state(), PipelineState::Failed);
        assert_eq!(
            observer.states(),
            vec![PipelineState::ResolvingFeatures, PipelineState::Failed]
        );
    }

    #[test]
    fn test_done_is_terminal() {
        let observer = RecordingObserver::default();
        let mut pipeline = Pipeline::new(&observer);
        pipeline.transition(PipelineState::Done);
        pipeline.fail();
        assert_eq!(pipeline.state(), PipelineState::Done);
    }
}
