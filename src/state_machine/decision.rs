use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::state::SagaState;
use crate::store::PendingDescription;

/// The operator's verdict on a pending description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    /// Commit the text to the catalog item, then discard the pending record.
    Accept,
    /// Discard the pending record without touching the catalog.
    Reject,
}

impl Decision {
    pub fn success_message(self) -> &'static str {
        match self {
            Decision::Accept => "Description accepted and updated successfully.",
            Decision::Reject => "Description rejected and removed successfully.",
        }
    }

    pub fn error_prefix(self) -> &'static str {
        match self {
            Decision::Accept => "Error accepting description: ",
            Decision::Reject => "Error rejecting description: ",
        }
    }

    /// Shown when the failure carries no description of its own.
    pub fn fallback_message(self) -> &'static str {
        match self {
            Decision::Accept => "An unexpected error occurred while accepting the description",
            Decision::Reject => "An unexpected error occurred while rejecting the description",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Accept => write!(f, "accept"),
            Decision::Reject => write!(f, "reject"),
        }
    }
}

/// Terminal outcome of one accept/reject saga.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SagaOutcome {
    /// Every step succeeded and the pending set was reloaded.
    Completed,
    /// The commit was rejected; nothing changed remotely.
    FailedAtCommit,
    /// A reject's discard failed; nothing changed remotely.
    FailedAtDiscard,
    /// The catalog item was updated but the pending record survived.
    /// No rollback is attempted.
    FailedAtDiscardAfterCommit,
    /// Another item was already being processed; no call was made.
    Refused,
}

impl SagaOutcome {
    pub fn is_success(self) -> bool {
        self == SagaOutcome::Completed
    }
}

impl fmt::Display for SagaOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SagaOutcome::Completed => write!(f, "COMPLETED"),
            SagaOutcome::FailedAtCommit => write!(f, "FAILED_AT_COMMIT"),
            SagaOutcome::FailedAtDiscard => write!(f, "FAILED_AT_DISCARD"),
            SagaOutcome::FailedAtDiscardAfterCommit => write!(f, "FAILED_AT_DISCARD_AFTER_COMMIT"),
            SagaOutcome::Refused => write!(f, "REFUSED"),
        }
    }
}

/// Audit record produced when a saga terminates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub review_id: String,
    pub item_id: String,
    pub item_key: String,
    pub decision: Decision,
    pub outcome: SagaOutcome,
    pub state_transitions: Vec<SagaState>,
    /// Operator-facing error, if the saga failed.
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: i64,
}

impl ReviewRecord {
    pub fn new(
        item: &PendingDescription,
        decision: Decision,
        outcome: SagaOutcome,
        state_transitions: Vec<SagaState>,
        error: Option<String>,
        started_at: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            review_id: Uuid::new_v4().to_string(),
            item_id: item.id.clone(),
            item_key: item.key.clone(),
            decision,
            outcome,
            state_transitions,
            error,
            started_at,
            completed_at: now,
            duration_ms: (now - started_at).num_milliseconds(),
        }
    }
}
