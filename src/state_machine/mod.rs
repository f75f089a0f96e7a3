mod decision;
mod state;

pub use decision::{Decision, ReviewRecord, SagaOutcome};
pub use state::{ReviewSaga, SagaState, StepOutcome, Transition};
