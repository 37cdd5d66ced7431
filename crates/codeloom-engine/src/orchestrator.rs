//! Two-phase generation orchestration.
//!
//! Drives one generation cycle through its phases: precondition checks,
//! a timeout-bounded architect (planning) pass, an unconditional session
//! reset with a settle pause, the coder (implementation) pass streaming
//! into the observable artifact buffer, and a single extraction step.
//!
//! One engine instance runs at most one cycle at a time (single-flight);
//! starting a new cycle cancels the previous one cooperatively and waits
//! for its cleanup to finish before publishing anything.

use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use codeloom_core::creator::Creator;
use codeloom_core::{
    Backend, CodeLanguage, EngineConfig, EngineState, GenerationParameters, GenerationRequest,
    InferenceGateway, LoomError, ModelInfo, Result, SessionId, StateCell,
};

use crate::{extract, params, prompt, stream};

/// Error-message markers for expected, recoverable runtime conditions.
/// Matching failures are logged but must never populate the error slot:
/// cancellation races, the runtime's inter-invocation race, and failures
/// re-reported through the gateway's internal stream-driver task.
const BENIGN_ERROR_MARKERS: [&str; 3] = [
    "cancelled",
    "Previous invocation still processing",
    "StreamDriver",
];

struct CycleHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// The generation engine exposed to the presentation layer.
///
/// State is observable through [`subscribe`](Self::subscribe); all
/// mutations go through the imperative operations below. Thread-safe:
/// hold it as `Arc<GenerationEngine>`.
pub struct GenerationEngine {
    gateway: Arc<dyn InferenceGateway>,
    config: EngineConfig,
    state: StateCell,
    /// The in-flight cycle, if any. Guarded by an async mutex so
    /// single-flight handoff can await the previous task.
    current_cycle: Mutex<Option<CycleHandle>>,
    /// Specification produced by the most recent cycle, retained only as
    /// context for revisions.
    current_spec: StdMutex<Option<String>>,
    /// Style directives of the selected creator, if any.
    creator_style: StdMutex<Option<String>>,
}

impl GenerationEngine {
    pub fn new(gateway: Arc<dyn InferenceGateway>, config: EngineConfig) -> Arc<Self> {
        Arc::new(Self {
            gateway,
            config,
            state: StateCell::default(),
            current_cycle: Mutex::new(None),
            current_spec: StdMutex::new(None),
            creator_style: StdMutex::new(None),
        })
    }

    /// Registers an observer of the engine state.
    pub fn subscribe(&self) -> watch::Receiver<EngineState> {
        self.state.subscribe()
    }

    /// Returns the current state snapshot.
    pub fn state_snapshot(&self) -> EngineState {
        self.state.snapshot()
    }

    /// The specification retained from the most recent cycle, if any.
    pub fn current_spec(&self) -> Option<String> {
        self.current_spec.lock().expect("spec lock poisoned").clone()
    }

    /// Publishes the catalog's model list.
    pub fn set_available_models(&self, models: Vec<ModelInfo>) {
        self.state.update(|s| s.available_models = models);
    }

    /// Selects the model for the next load. Selecting a different model
    /// invalidates the loaded flag until the next load completes.
    pub fn select_model(&self, model: ModelInfo) {
        self.state.update(|s| {
            if s.selected_model.as_ref() != Some(&model) {
                s.is_model_loaded = false;
            }
            s.selected_model = Some(model);
        });
    }

    pub fn select_backend(&self, backend: Backend) {
        self.state.update(|s| s.selected_backend = backend);
    }

    pub fn set_prompt(&self, text: impl Into<String>) {
        let text = text.into();
        self.state.update(|s| s.prompt = text);
    }

    /// Applies a creator's style to subsequent implementation prompts.
    pub fn set_creator(&self, creator: Option<&Creator>) {
        *self.creator_style.lock().expect("style lock poisoned") =
            creator.map(|c| c.style.clone());
    }

    pub fn clear_code(&self) {
        self.state.update(|s| {
            s.generated_code.clear();
            s.language = CodeLanguage::Unknown;
        });
        *self.current_spec.lock().expect("spec lock poisoned") = None;
    }

    pub fn clear_error(&self) {
        self.state.update(|s| s.error = None);
    }

    /// Loads the selected model on the selected backend.
    ///
    /// Vision and audio towers stay disabled; code generation is text-only.
    pub async fn load_model(&self) {
        let snapshot = self.state.snapshot();
        let Some(model) = snapshot.selected_model else {
            self.state
                .update(|s| s.error = Some("Select a model first".to_string()));
            return;
        };

        self.state.update(|s| {
            s.is_loading = true;
            s.error = None;
        });

        match self
            .gateway
            .load_model(&model, snapshot.selected_backend, true, true)
            .await
        {
            Ok(()) => {
                tracing::info!("[Orchestrator] model '{}' loaded", model.id);
                self.state.update(|s| {
                    s.is_loading = false;
                    s.is_model_loaded = true;
                });
            }
            Err(err) => {
                tracing::error!("[Orchestrator] model load failed: {err}");
                self.state.update(|s| {
                    s.is_loading = false;
                    s.is_model_loaded = false;
                    s.error = Some(format!("Failed to load model: {err}"));
                });
            }
        }
    }

    /// Cancels any in-flight cycle and unloads the resident model.
    pub async fn unload_model(&self) {
        self.cancel().await;
        self.state.update(|s| s.is_loading = true);
        if let Err(err) = self.gateway.unload_model().await {
            tracing::warn!("[Orchestrator] model unload failed: {err}");
        }
        self.state.update(|s| {
            s.is_loading = false;
            s.is_model_loaded = false;
        });
    }

    /// Starts one generation cycle for `request`.
    ///
    /// Preconditions (non-blank prompt, selected and loaded model) are
    /// checked before any gateway call and fail fast into the error slot.
    /// A previous in-flight cycle is cancelled and drained first, so its
    /// cleanup runs before the new cycle publishes anything.
    pub async fn generate(self: &Arc<Self>, request: impl Into<String>) {
        let request = request.into();
        let snapshot = self.state.snapshot();

        if request.trim().is_empty() {
            self.state.update(|s| {
                s.error = Some("Describe what you want to build first".to_string());
            });
            return;
        }
        let Some(model) = snapshot.selected_model else {
            self.state
                .update(|s| s.error = Some("Select a model first".to_string()));
            return;
        };
        if !snapshot.is_model_loaded || self.gateway.loaded_model().await.is_none() {
            self.state
                .update(|s| s.error = Some("Load a model before generating".to_string()));
            return;
        }

        let mut guard = self.current_cycle.lock().await;
        if let Some(previous) = guard.take() {
            tracing::info!("[Orchestrator] cancelling previous in-flight generation");
            previous.cancel.cancel();
            let _ = previous.task.await;
        }

        let cancel = CancellationToken::new();
        let task = tokio::spawn(Self::run_cycle(
            Arc::clone(self),
            request,
            model,
            cancel.clone(),
        ));
        *guard = Some(CycleHandle { cancel, task });
    }

    /// Requests cancellation of the in-flight cycle and waits until its
    /// cleanup has run. Never populates the error slot.
    pub async fn cancel(&self) {
        let handle = self.current_cycle.lock().await.take();
        if let Some(handle) = handle {
            handle.cancel.cancel();
            let _ = handle.task.await;
        }
    }

    /// Waits for the in-flight cycle, if any, to finish.
    pub async fn wait_for_idle(&self) {
        let handle = self.current_cycle.lock().await.take();
        if let Some(handle) = handle {
            let _ = handle.task.await;
        }
    }

    /// One full generation cycle. Cleanup (parameter reset, flag reset)
    /// runs on every exit path; the task is only ever cancelled
    /// cooperatively, never aborted, so this is guaranteed.
    async fn run_cycle(
        self: Arc<Self>,
        request: String,
        model: ModelInfo,
        cancel: CancellationToken,
    ) {
        let prior_code = self.state.snapshot().generated_code;
        self.state.update(|s| {
            s.is_processing = true;
            s.is_planning = true;
            s.error = None;
        });

        let derived = params::derive_parameters(&request, &self.config);
        let outcome = match self.gateway.set_generation_parameters(derived).await {
            Ok(()) => self.run_phases(&request, &prior_code, &model, &cancel).await,
            Err(err) => Err(err),
        };

        if let Err(err) = self
            .gateway
            .set_generation_parameters(GenerationParameters::default())
            .await
        {
            tracing::warn!("[Orchestrator] failed to reset generation parameters: {err}");
        }
        self.state.update(|s| {
            s.is_processing = false;
            s.is_planning = false;
        });

        if let Err(err) = outcome {
            self.surface_failure(&err);
        } else {
            tracing::info!("[Orchestrator] generation cycle completed");
        }
    }

    /// Planning → HandoffReset → Implementing → Extracting.
    async fn run_phases(
        &self,
        request: &str,
        prior_code: &str,
        model: &ModelInfo,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let spec_session = SessionId::new();
        let spec_text = self
            .run_planning(request, prior_code, model, &spec_session, cancel)
            .await?;

        // Handoff reset runs even when planning succeeded, so the coder
        // phase never observes residual architect state. The settle pause
        // mitigates the runtime's inter-invocation race and must stay.
        if let Err(err) = self.gateway.reset_session(&spec_session).await {
            tracing::warn!("[Orchestrator] handoff session reset failed: {err}");
        }
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(LoomError::Cancelled),
            _ = tokio::time::sleep(self.config.handoff_settle) => {}
        }

        self.state.update(|s| {
            s.is_planning = false;
            s.generated_code.clear();
            s.language = CodeLanguage::Unknown;
        });

        let style = self
            .creator_style
            .lock()
            .expect("style lock poisoned")
            .clone();
        let revision = prompt::is_revision(request, prior_code);
        let coder = if spec_text.trim().is_empty() {
            tracing::info!("[Orchestrator] empty specification, using direct prompt fallback");
            prompt::direct_prompt(request, style.as_deref())?
        } else {
            prompt::coder_prompt(&spec_text, request, revision, style.as_deref())?
        };
        *self.current_spec.lock().expect("spec lock poisoned") = if spec_text.trim().is_empty() {
            None
        } else {
            Some(spec_text)
        };

        let code_session = SessionId::new();
        let token_stream = self
            .gateway
            .generate_stream(GenerationRequest::new(coder, model.id.clone(), code_session))
            .await?;

        let mut buffer = String::new();
        let state = &self.state;
        stream::accumulate(token_stream, cancel, &mut buffer, |full| {
            state.update(|s| s.generated_code = full.to_string());
        })
        .await?;

        let artifact = extract::extract(&buffer);
        self.state.update(|s| {
            s.generated_code = artifact.code;
            s.language = artifact.language;
        });
        Ok(())
    }

    /// Architect pass under the planning time budget.
    ///
    /// Timeout and runtime failures here are expected, recoverable
    /// conditions: the cycle continues with an empty specification and the
    /// stuck session is reset best-effort. Cancellation propagates.
    async fn run_planning(
        &self,
        request: &str,
        prior_code: &str,
        model: &ModelInfo,
        session: &SessionId,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let prior = if prompt::is_revision(request, prior_code) {
            Some(prior_code)
        } else {
            None
        };
        let architect = prompt::architect_prompt(request, prior)?;

        let drive = async {
            let token_stream = self
                .gateway
                .generate_stream(GenerationRequest::new(
                    architect,
                    model.id.clone(),
                    session.clone(),
                ))
                .await?;
            let mut scratch = String::new();
            stream::accumulate(token_stream, cancel, &mut scratch, |_| {}).await?;
            Ok::<String, LoomError>(scratch)
        };

        match tokio::time::timeout(self.config.plan_timeout, drive).await {
            Ok(Ok(spec_text)) => {
                tracing::debug!(
                    "[Orchestrator] planning produced {} chars of specification",
                    spec_text.len()
                );
                Ok(spec_text)
            }
            Ok(Err(err)) if err.is_cancellation() => Err(LoomError::Cancelled),
            Ok(Err(err)) => {
                tracing::warn!("[Orchestrator] planning failed, continuing without spec: {err}");
                self.best_effort_reset(session).await;
                Ok(String::new())
            }
            Err(_elapsed) => {
                tracing::warn!(
                    "[Orchestrator] planning exceeded {:?}, continuing without spec",
                    self.config.plan_timeout
                );
                self.best_effort_reset(session).await;
                Ok(String::new())
            }
        }
    }

    async fn best_effort_reset(&self, session: &SessionId) {
        if let Err(err) = self.gateway.reset_session(session).await {
            tracing::warn!("[Orchestrator] session reset after failed planning: {err}");
        }
    }

    /// Applies the failure taxonomy: cancellation and benign runtime races
    /// are logged only; everything else is surfaced verbatim, with a
    /// generic fallback for blank messages.
    fn surface_failure(&self, err: &LoomError) {
        if err.is_cancellation() {
            tracing::debug!("[Orchestrator] generation cancelled");
            return;
        }
        // Runtime failures are surfaced with their own message, verbatim.
        let message = match err {
            LoomError::Gateway(inner) => inner.clone(),
            other => other.to_string(),
        };
        if BENIGN_ERROR_MARKERS
            .iter()
            .any(|marker| message.contains(marker))
        {
            tracing::warn!("[Orchestrator] suppressed benign generation error: {message}");
            return;
        }
        let shown = if message.trim().is_empty() {
            "Generation failed".to_string()
        } else {
            message
        };
        self.state.update(|s| s.error = Some(shown));
    }
}
