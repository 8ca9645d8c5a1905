//! Per-run state machine.
//!
//! ```text
//! NotStarted --Start--> Running --Done--> Completed
//!                          |
//!                          +--(worker error)--> Failed
//! ```
//!
//! `Start` and `Done` come from the run's own events. `Failed` is never
//! signalled by the run itself; whoever owns the worker records it when
//! the worker returns an error or dies.

use crate::signals::RunEventKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RunState {
    #[default]
    NotStarted,
    Running,
    Completed,
    Failed,
}

impl RunState {
    /// Apply an event; out-of-order events leave the state unchanged
    pub fn on_event(self, kind: RunEventKind) -> Self {
        match (self, kind) {
            (RunState::NotStarted, RunEventKind::Start) => RunState::Running,
            (RunState::Running, RunEventKind::Done) => RunState::Completed,
            (state, _) => state,
        }
    }

    /// Record a worker failure. A completed run stays completed.
    pub fn fail(self) -> Self {
        match self {
            RunState::Completed => RunState::Completed,
            _ => RunState::Failed,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Completed | RunState::Failed)
    }
}
