use std::fmt;

use serde::{Deserialize, Serialize};

use super::decision::{Decision, SagaOutcome};

/// Intermediate states of an accept/reject saga.
///
/// Accept walks MARKED → COMMITTED_DISCARD_PENDING → DISCARDED → RELOADED;
/// reject skips the commit and goes MARKED → DISCARDED → RELOADED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SagaState {
    /// The item is marked as processing; no remote call made yet.
    Marked,
    /// The catalog item carries the new text; the pending record still exists.
    CommittedDiscardPending,
    /// The pending record is gone; the decision is final.
    Discarded,
    /// The pending set has been reloaded.
    Reloaded,
}

impl fmt::Display for SagaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SagaState::Marked => write!(f, "MARKED"),
            SagaState::CommittedDiscardPending => write!(f, "COMMITTED_DISCARD_PENDING"),
            SagaState::Discarded => write!(f, "DISCARDED"),
            SagaState::Reloaded => write!(f, "RELOADED"),
        }
    }
}

/// Result of running the remote step that belongs to the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Success,
    Failure(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Advance to the next state.
    Next(SagaState),
    /// The saga has terminated.
    Complete(SagaOutcome),
}

/// Drives one review decision through its steps.
#[derive(Debug, Clone)]
pub struct ReviewSaga {
    decision: Decision,
    state: SagaState,
    history: Vec<SagaState>,
    failure: Option<String>,
}

impl ReviewSaga {
    pub fn new(decision: Decision) -> Self {
        Self {
            decision,
            state: SagaState::Marked,
            history: Vec::new(),
            failure: None,
        }
    }

    pub fn state(&self) -> SagaState {
        self.state
    }

    /// States visited so far, including the current one.
    pub fn transitions(&self) -> Vec<SagaState> {
        let mut transitions = self.history.clone();
        transitions.push(self.state);
        transitions
    }

    /// Reason given by the step that ended the saga, if it failed.
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Compute and apply the transition for the outcome of the current step.
    ///
    /// - `Marked` runs the commit (accept) or the discard (reject).
    /// - `CommittedDiscardPending` runs the discard; failing here leaves the
    ///   catalog already updated.
    /// - `Discarded` runs the reload. Reload failures are reported by the load
    ///   itself and do not undo a decision that is already final.
    /// - `Reloaded` is terminal and always completes.
    pub fn next(&mut self, outcome: StepOutcome) -> Transition {
        let ok = match outcome {
            StepOutcome::Success => true,
            StepOutcome::Failure(reason) => {
                self.failure = Some(reason);
                false
            }
        };
        let transition = match (self.state, self.decision) {
            (SagaState::Marked, Decision::Accept) if ok => {
                Transition::Next(SagaState::CommittedDiscardPending)
            }
            (SagaState::Marked, Decision::Accept) => {
                Transition::Complete(SagaOutcome::FailedAtCommit)
            }
            (SagaState::Marked, Decision::Reject) if ok => Transition::Next(SagaState::Discarded),
            (SagaState::Marked, Decision::Reject) => {
                Transition::Complete(SagaOutcome::FailedAtDiscard)
            }
            (SagaState::CommittedDiscardPending, _) if ok => Transition::Next(SagaState::Discarded),
            (SagaState::CommittedDiscardPending, _) => {
                Transition::Complete(SagaOutcome::FailedAtDiscardAfterCommit)
            }
            (SagaState::Discarded, _) => Transition::Next(SagaState::Reloaded),
            (SagaState::Reloaded, _) => Transition::Complete(SagaOutcome::Completed),
        };

        if let Transition::Next(next_state) = transition {
            self.history.push(self.state);
            self.state = next_state;
        }

        transition
    }
}
