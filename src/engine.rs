use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::filter::{self, LoadState};
use crate::state_machine::{
    Decision, ReviewRecord, ReviewSaga, SagaOutcome, SagaState, StepOutcome, Transition,
};
use crate::store::{DescriptionStore, PendingDescription, StoreError};

/// How long a success message stays visible.
pub const SUCCESS_MESSAGE_TTL: Duration = Duration::from_secs(3);

const LOAD_ERROR_PREFIX: &str = "Error: ";
const LOAD_FALLBACK: &str = "An unexpected error occurred while fetching descriptions";

/// Everything the presentation layer needs to render the review screen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowViewState {
    /// Pending descriptions in backend order, replaced on every load.
    pub items: Vec<PendingDescription>,
    /// Whether a fetch has succeeded at least once.
    pub loaded: bool,
    pub loading: bool,
    /// Whether the most recent fetch failed. Cleared when the next one starts.
    pub fetch_failed: bool,
    /// The single item currently being accepted or rejected.
    pub processing_id: Option<String>,
    pub error: Option<String>,
    pub success_message: Option<String>,
    pub search_term: String,
    pub selected_image_preview_url: Option<String>,
}

impl WorkflowViewState {
    /// Result of the last successful fetch, if any.
    pub fn last_fetch(&self) -> Option<&[PendingDescription]> {
        self.loaded.then_some(self.items.as_slice())
    }

    pub fn load_state(&self) -> LoadState {
        if self.fetch_failed && !self.loading {
            return LoadState::Failed;
        }
        filter::load_state(self.loading, self.last_fetch())
    }

    /// Items matching the current search term.
    pub fn visible_items(&self) -> Vec<&PendingDescription> {
        filter::filter_items(&self.items, &self.search_term)
    }

    pub fn is_processing(&self, id: &str) -> bool {
        self.processing_id.as_deref() == Some(id)
    }
}

/// Reduces a store failure to one operator-facing line.
pub fn normalize_error(prefix: &str, fallback: &str, err: Option<&StoreError>) -> String {
    match err.and_then(StoreError::describe) {
        Some(message) => format!("{prefix}{message}"),
        None => fallback.to_string(),
    }
}

/// Owns the review state and runs accept/reject decisions against the store.
///
/// State changes are published through a `watch` channel: front ends call
/// [`subscribe`](ReviewEngine::subscribe) and re-render on each change.
pub struct ReviewEngine<S> {
    store: S,
    state: Arc<watch::Sender<WorkflowViewState>>,
    message_timer: Mutex<Option<JoinHandle<()>>>,
    message_generation: Arc<AtomicU64>,
}

impl<S: DescriptionStore> ReviewEngine<S> {
    pub fn new(store: S) -> Self {
        let (tx, _rx) = watch::channel(WorkflowViewState::default());
        Self {
            store,
            state: Arc::new(tx),
            message_timer: Mutex::new(None),
            message_generation: Arc::new(AtomicU64::new(0)),
        }
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn snapshot(&self) -> WorkflowViewState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<WorkflowViewState> {
        self.state.subscribe()
    }

    /// Owned copy of the items matching the current search term.
    pub fn visible_items(&self) -> Vec<PendingDescription> {
        self.state
            .borrow()
            .visible_items()
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn set_search_term(&self, term: impl Into<String>) {
        let term = term.into();
        self.state.send_if_modified(|s| {
            if s.search_term == term {
                return false;
            }
            s.search_term = term;
            true
        });
    }

    /// Opens the image preview for `url`, or closes it with `None`.
    pub fn set_selected_image_preview_url(&self, url: Option<String>) {
        self.state.send_if_modified(|s| {
            if s.selected_image_preview_url == url {
                return false;
            }
            s.selected_image_preview_url = url;
            true
        });
    }

    /// Replaces the pending set with a fresh snapshot from the store.
    pub async fn load(&self) {
        self.state.send_modify(|s| {
            s.loading = true;
            s.fetch_failed = false;
            s.error = None;
        });

        match self.store.fetch_all().await {
            Ok(items) => {
                info!(count = items.len(), "pending descriptions loaded");
                self.state.send_modify(|s| {
                    s.items = items;
                    s.loaded = true;
                    s.loading = false;
                });
            }
            Err(err) => {
                warn!(error = %err, "failed to load pending descriptions");
                let message = normalize_error(LOAD_ERROR_PREFIX, LOAD_FALLBACK, Some(&err));
                self.state.send_modify(|s| {
                    s.error = Some(message);
                    s.fetch_failed = true;
                    s.loading = false;
                });
            }
        }
    }

    /// Commits the item's text to its catalog item, discards the pending
    /// record and reloads.
    pub async fn accept(&self, item: &PendingDescription) -> ReviewRecord {
        self.review(Decision::Accept, item).await
    }

    /// Discards the pending record and reloads.
    pub async fn reject(&self, item: &PendingDescription) -> ReviewRecord {
        self.review(Decision::Reject, item).await
    }

    async fn review(&self, decision: Decision, item: &PendingDescription) -> ReviewRecord {
        let started_at = Utc::now();
        let span = info_span!("review", %decision, id = %item.id, key = %item.key);

        if !self.try_mark_processing(&item.id) {
            let _enter = span.enter();
            warn!(
                busy = ?self.state.borrow().processing_id,
                "another description is being processed, refusing"
            );
            return ReviewRecord::new(
                item,
                decision,
                SagaOutcome::Refused,
                Vec::new(),
                None,
                started_at,
            );
        }

        let (outcome, transitions, failure) = self
            .run_saga(decision, item)
            .instrument(span.clone())
            .await;

        let error = match outcome {
            SagaOutcome::Completed => {
                span.in_scope(|| info!("review completed"));
                self.show_success(decision.success_message());
                None
            }
            _ => {
                let message = normalize_error(
                    decision.error_prefix(),
                    decision.fallback_message(),
                    failure.as_ref(),
                );
                self.state.send_modify(|s| s.error = Some(message.clone()));
                Some(message)
            }
        };

        self.state.send_modify(|s| s.processing_id = None);
        ReviewRecord::new(item, decision, outcome, transitions, error, started_at)
    }

    /// Runs the remote steps in order, stopping at the first failure.
    async fn run_saga(
        &self,
        decision: Decision,
        item: &PendingDescription,
    ) -> (SagaOutcome, Vec<SagaState>, Option<StoreError>) {
        let mut saga = ReviewSaga::new(decision);
        let mut failure = None;

        let outcome = loop {
            let step = match saga.state() {
                SagaState::Marked => match decision {
                    Decision::Accept => {
                        self.store
                            .commit_description(&item.key, item.description_text())
                            .await
                    }
                    Decision::Reject => self.store.discard(&item.id, item.version).await,
                },
                SagaState::CommittedDiscardPending => {
                    self.store.discard(&item.id, item.version).await
                }
                SagaState::Discarded => {
                    self.load().await;
                    Ok(())
                }
                SagaState::Reloaded => Ok(()),
            };

            let step_outcome = match step {
                Ok(()) => StepOutcome::Success,
                Err(err) => {
                    let outcome = StepOutcome::Failure(err.to_string());
                    failure = Some(err);
                    outcome
                }
            };

            let from = saga.state();
            match saga.next(step_outcome) {
                Transition::Next(state) => debug!(%from, to = %state, "review step complete"),
                Transition::Complete(outcome) => break outcome,
            }
        };

        match outcome {
            SagaOutcome::FailedAtDiscardAfterCommit => error!(
                error = saga.failure(),
                "description committed but pending record was not discarded"
            ),
            SagaOutcome::FailedAtCommit | SagaOutcome::FailedAtDiscard => {
                warn!(%outcome, error = saga.failure(), "review failed")
            }
            _ => {}
        }

        (outcome, saga.transitions(), failure)
    }

    fn try_mark_processing(&self, id: &str) -> bool {
        self.state.send_if_modified(|s| {
            if s.processing_id.is_some() {
                return false;
            }
            s.processing_id = Some(id.to_string());
            true
        })
    }

    /// Shows `message` and schedules it to clear after [`SUCCESS_MESSAGE_TTL`].
    /// A newer message cancels the pending clear of the previous one.
    pub(crate) fn show_success(&self, message: &str) {
        let generation = self.message_generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state
            .send_modify(|s| s.success_message = Some(message.to_string()));

        let state = Arc::clone(&self.state);
        let current = Arc::clone(&self.message_generation);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(SUCCESS_MESSAGE_TTL).await;
            state.send_if_modified(|s| {
                if current.load(Ordering::SeqCst) != generation || s.success_message.is_none() {
                    return false;
                }
                s.success_message = None;
                true
            });
        });

        let mut timer = self
            .message_timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = timer.replace(handle) {
            previous.abort();
        }
    }
}

impl<S> Drop for ReviewEngine<S> {
    fn drop(&mut self) {
        let timer = self
            .message_timer
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = timer.take() {
            handle.abort();
        }
    }
}
