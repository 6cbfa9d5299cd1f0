//! Debounced text edits
//!
//! Keystroke-level edits to a question's title or hint are collected per
//! question and written once the author pauses. A newer edit to the same
//! question restarts the wait and folds into the pending patch.
//!
//! Storage calls are synchronous, so a due write runs on Tokio's blocking
//! pool rather than on the task that waited for it.

use crate::builder::FormBuilder;
use crate::ids::Clock;
use fb_model::{QuestionId, QuestionPatch};
use fb_store::KvBackend;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Debug)]
struct Pending {
    patch: QuestionPatch,
    generation: u64,
    handle: JoinHandle<()>,
}

#[derive(Debug, Default)]
struct State {
    pending: HashMap<QuestionId, Pending>,
    next_generation: u64,
}

/// Per-question debounce in front of [`FormBuilder::update_question`]
#[derive(Debug)]
pub struct Autosave<B, C> {
    builder: Arc<FormBuilder<B, C>>,
    delay: Duration,
    state: Arc<Mutex<State>>,
}

impl<B, C> Clone for Autosave<B, C> {
    fn clone(&self) -> Self {
        Self {
            builder: Arc::clone(&self.builder),
            delay: self.delay,
            state: Arc::clone(&self.state),
        }
    }
}

impl<B, C> Autosave<B, C>
where
    B: KvBackend + 'static,
    C: Clock + 'static,
{
    /// Debouncer using the builder's configured delay
    pub fn new(builder: Arc<FormBuilder<B, C>>) -> Self {
        let delay = builder.config().autosave_delay();
        Self::with_delay(builder, delay)
    }

    /// Debouncer with an explicit delay
    pub fn with_delay(builder: Arc<FormBuilder<B, C>>, delay: Duration) -> Self {
        Self {
            builder,
            delay,
            state: Arc::default(),
        }
    }

    /// Queue `patch` for `question_id`, restarting its timer
    ///
    /// Must be called inside a Tokio runtime.
    pub fn schedule(&self, question_id: QuestionId, patch: QuestionPatch) {
        let mut state = self.state.lock();
        state.next_generation += 1;
        let generation = state.next_generation;

        let patch = match state.pending.remove(&question_id) {
            Some(previous) => {
                previous.handle.abort();
                previous.patch.merge(patch)
            }
            None => patch,
        };

        // The task cannot observe the map before the insert below: it takes
        // the same lock, which is held until this function returns.
        let handle = tokio::spawn({
            let builder = Arc::clone(&self.builder);
            let shared = Arc::clone(&self.state);
            let question_id = question_id.clone();
            let delay = self.delay;
            async move {
                tokio::time::sleep(delay).await;
                let due = {
                    let mut state = shared.lock();
                    match state.pending.get(&question_id) {
                        Some(p) if p.generation == generation => {
                            state.pending.remove(&question_id).map(|p| p.patch)
                        }
                        _ => None,
                    }
                };
                if let Some(patch) = due {
                    let written = tokio::task::spawn_blocking(move || {
                        write(&builder, &question_id, &patch)
                    })
                    .await;
                    if let Err(error) = written {
                        tracing::error!(%error, "autosave task failed");
                    }
                }
            }
        });

        state.pending.insert(
            question_id,
            Pending {
                patch,
                generation,
                handle,
            },
        );
    }

    /// Drop the pending edit for a question
    pub fn cancel(&self, question_id: &QuestionId) -> bool {
        let removed = self.state.lock().pending.remove(question_id);
        removed.map(|p| p.handle.abort()).is_some()
    }

    /// Write every pending edit now; returns how many succeeded
    ///
    /// Writes on the calling thread. Meant for shutdown and tests.
    pub fn flush(&self) -> usize {
        let drained: Vec<(QuestionId, Pending)> = self.state.lock().pending.drain().collect();
        drained
            .into_iter()
            .filter(|(question_id, pending)| {
                pending.handle.abort();
                write(&self.builder, question_id, &pending.patch)
            })
            .count()
    }

    /// Number of edits waiting for their timer
    pub fn pending_count(&self) -> usize {
        self.state.lock().pending.len()
    }

    /// Debounce delay
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

fn write<B: KvBackend, C: Clock>(
    builder: &FormBuilder<B, C>,
    question_id: &QuestionId,
    patch: &QuestionPatch,
) -> bool {
    match builder.update_question(question_id, patch) {
        Ok(_) => {
            tracing::debug!(question = %question_id, "autosaved");
            true
        }
        Err(error) => {
            tracing::warn!(question = %question_id, %error, "autosave failed");
            false
        }
    }
}
