//! The inference gateway seam.
//!
//! The engine treats the on-device runtime as an opaque collaborator behind
//! this trait: model lifecycle, sampling configuration, streamed single-turn
//! generation keyed by a session id, and session reset.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::Result;
use crate::model::{Backend, GenerationParameters, GenerationRequest, ModelInfo, SessionId};

/// A finite, non-restartable sequence of streamed text fragments.
///
/// Terminates when generation completes; yields an error item on runtime
/// failure or cancellation of the underlying invocation.
pub type TokenStream = BoxStream<'static, Result<String>>;

/// Operations the core requires from the inference runtime.
///
/// Implementations must be safe to share across tasks (`Arc<dyn
/// InferenceGateway>`); the engine serializes actively-generating access
/// itself, one phase at a time.
#[async_trait]
pub trait InferenceGateway: Send + Sync {
    /// Loads `model` on `backend`. Fails with a gateway error when the
    /// runtime rejects the load.
    async fn load_model(
        &self,
        model: &ModelInfo,
        backend: Backend,
        disable_vision: bool,
        disable_audio: bool,
    ) -> Result<()>;

    /// Unloads the currently loaded model, if any.
    async fn unload_model(&self) -> Result<()>;

    /// Pushes sampling parameters. Absent values clear to runtime defaults,
    /// so `GenerationParameters::default()` restores the unset state.
    async fn set_generation_parameters(&self, params: GenerationParameters) -> Result<()>;

    /// Starts a streamed generation for `request` and returns the live
    /// token sequence.
    async fn generate_stream(&self, request: GenerationRequest) -> Result<TokenStream>;

    /// Clears internal runtime state associated with `session`.
    async fn reset_session(&self, session: &SessionId) -> Result<()>;

    /// The currently loaded model, if one is resident.
    async fn loaded_model(&self) -> Option<ModelInfo>;
}
