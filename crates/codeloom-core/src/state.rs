//! Observable engine state.
//!
//! UI-observable state is published through a single-writer
//! `tokio::sync::watch` channel: the orchestrator owns the sender, any
//! number of observers read snapshots without additional synchronization,
//! and publication is synchronous with the mutation.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::artifact::CodeLanguage;
use crate::model::{Backend, ModelInfo};

/// A point-in-time snapshot of everything the presentation layer can observe.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EngineState {
    /// Models discovered from the catalog.
    pub available_models: Vec<ModelInfo>,
    /// Model selected for loading/generation, if any.
    pub selected_model: Option<ModelInfo>,
    /// Backend selected for the next load.
    pub selected_backend: Backend,
    /// A model load/unload is in flight.
    pub is_loading: bool,
    /// A model is resident in the runtime.
    pub is_model_loaded: bool,
    /// The architect sub-phase is running. Only ever true while
    /// `is_processing` is also true.
    pub is_planning: bool,
    /// A generation cycle is active.
    pub is_processing: bool,
    /// Current prompt text as edited by the user.
    pub prompt: String,
    /// Live generated-code buffer (raw during streaming, cleaned after
    /// extraction).
    pub generated_code: String,
    /// Classified language of `generated_code`.
    pub language: CodeLanguage,
    /// At most one pending user-visible error message.
    pub error: Option<String>,
}

/// Single-writer publisher for [`EngineState`].
///
/// Wraps a `watch` channel so mutation and publication are one step:
/// `update` clones the current snapshot, applies the closure, and sends the
/// result. The sender half never closes while the cell is alive, so
/// `send` cannot fail even with zero subscribers.
#[derive(Debug)]
pub struct StateCell {
    tx: watch::Sender<EngineState>,
}

impl StateCell {
    pub fn new(initial: EngineState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Registers a new observer. The receiver immediately sees the current
    /// snapshot and is notified on every publish.
    pub fn subscribe(&self) -> watch::Receiver<EngineState> {
        self.tx.subscribe()
    }

    /// Returns a clone of the current snapshot.
    pub fn snapshot(&self) -> EngineState {
        self.tx.borrow().clone()
    }

    /// Applies `mutate` to a copy of the current state and publishes it.
    pub fn update(&self, mutate: impl FnOnce(&mut EngineState)) {
        let mut next = self.tx.borrow().clone();
        mutate(&mut next);
        // watch::Sender::send only errors when all receivers are dropped;
        // send_replace sidesteps that and keeps publish infallible.
        self.tx.send_replace(next);
    }
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new(EngineState::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_update_publishes_synchronously() {
        let cell = StateCell::default();
        let rx = cell.subscribe();

        cell.update(|state| state.prompt = "a snake game".to_string());

        assert_eq!(rx.borrow().prompt, "a snake game");
        assert_eq!(cell.snapshot().prompt, "a snake game");
    }

    #[tokio::test]
    async fn test_update_without_subscribers_does_not_panic() {
        let cell = StateCell::default();
        cell.update(|state| state.is_processing = true);
        assert!(cell.snapshot().is_processing);
    }

    #[tokio::test]
    async fn test_multiple_readers_see_same_snapshot() {
        let cell = StateCell::default();
        let rx_a = cell.subscribe();
        let rx_b = cell.subscribe();

        cell.update(|state| state.generated_code = "<p>x</p>".to_string());

        assert_eq!(rx_a.borrow().generated_code, rx_b.borrow().generated_code);
    }
}
