//! InferenceGateway implementation for llama.cpp-style HTTP servers.
//!
//! Talks to a local `llama-server` exposing the `/completion` streaming
//! endpoint (SSE `data:` lines). The server owns the actual model weights;
//! load here means verifying the server is up and recording which catalog
//! entry it serves. Sampling parameters are held locally and attached to
//! every completion request; unset parameters are omitted so the server
//! applies its own defaults.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use codeloom_core::{
    Backend, GenerationParameters, GenerationRequest, InferenceGateway, LoomError, ModelInfo,
    Result, SessionId, TokenStream,
};

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";

pub struct LlamaServerGateway {
    client: Client,
    base_url: String,
    loaded: RwLock<Option<ModelInfo>>,
    parameters: RwLock<GenerationParameters>,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    prompt: &'a str,
    stream: bool,
    cache_prompt: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    n_predict: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
}

#[derive(Deserialize)]
struct CompletionChunk {
    #[serde(default)]
    content: String,
    #[serde(default)]
    stop: bool,
}

impl LlamaServerGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            loaded: RwLock::new(None),
            parameters: RwLock::new(GenerationParameters::default()),
        }
    }

    pub fn new_default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait]
impl InferenceGateway for LlamaServerGateway {
    /// Verifies the server is healthy and records `model` as loaded.
    ///
    /// The backend is fixed at server startup, so the selection is only
    /// logged here; vision/audio flags have no server-side counterpart for
    /// text-only models.
    async fn load_model(
        &self,
        model: &ModelInfo,
        backend: Backend,
        _disable_vision: bool,
        _disable_audio: bool,
    ) -> Result<()> {
        let url = format!("{}/health", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| LoomError::gateway(format!("server unreachable: {err}")))?;
        if !response.status().is_success() {
            return Err(LoomError::gateway(format!(
                "server not ready (status {})",
                response.status()
            )));
        }

        tracing::info!(
            "[LlamaGateway] serving '{}' (requested backend: {backend})",
            model.id
        );
        *self.loaded.write().await = Some(model.clone());
        Ok(())
    }

    async fn unload_model(&self) -> Result<()> {
        *self.loaded.write().await = None;
        Ok(())
    }

    async fn set_generation_parameters(&self, params: GenerationParameters) -> Result<()> {
        *self.parameters.write().await = params;
        Ok(())
    }

    async fn generate_stream(&self, request: GenerationRequest) -> Result<TokenStream> {
        let params = *self.parameters.read().await;
        let body = CompletionRequest {
            prompt: &request.prompt,
            stream: true,
            cache_prompt: true,
            n_predict: params.max_tokens,
            temperature: params.temperature,
            top_k: params.top_k,
            top_p: params.top_p,
        };

        let url = format!("{}/completion", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|err| LoomError::gateway(format!("completion request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(LoomError::gateway(format!(
                "completion rejected (status {status}): {detail}"
            )));
        }

        let body = response.bytes_stream().boxed();
        // Fold the byte stream into SSE `data:` lines and decode each into
        // a token fragment. A chunk flagged `stop` may still carry the
        // final fragment.
        let stream = futures::stream::unfold(
            (body, String::new(), false),
            move |(mut body, mut buffer, done)| async move {
                if done {
                    return None;
                }
                loop {
                    if let Some(pos) = buffer.find('\n') {
                        let line: String = buffer.drain(..=pos).collect();
                        let line = line.trim();
                        if line.is_empty() {
                            continue;
                        }
                        let Some(payload) = line.strip_prefix("data: ") else {
                            continue;
                        };
                        match serde_json::from_str::<CompletionChunk>(payload) {
                            Ok(chunk) if chunk.stop => {
                                if chunk.content.is_empty() {
                                    return None;
                                }
                                return Some((Ok(chunk.content), (body, buffer, true)));
                            }
                            Ok(chunk) => {
                                return Some((Ok(chunk.content), (body, buffer, false)));
                            }
                            Err(err) => {
                                return Some((
                                    Err(LoomError::gateway(format!(
                                        "malformed stream chunk: {err}"
                                    ))),
                                    (body, buffer, true),
                                ));
                            }
                        }
                    }
                    match body.next().await {
                        Some(Ok(bytes)) => buffer.push_str(&String::from_utf8_lossy(&bytes)),
                        Some(Err(err)) => {
                            return Some((
                                Err(LoomError::gateway(format!("stream read failed: {err}"))),
                                (body, buffer, true),
                            ));
                        }
                        None => return None,
                    }
                }
            },
        );

        tracing::debug!(
            "[LlamaGateway] streaming completion for session {}",
            request.session
        );
        Ok(Box::pin(stream))
    }

    /// Best-effort: erases the server's single slot so the next prompt
    /// starts from a clean cache. Servers without slot management return an
    /// error, which callers treat as non-fatal.
    async fn reset_session(&self, session: &SessionId) -> Result<()> {
        let url = format!("{}/slots/0?action=erase", self.base_url);
        let response = self
            .client
            .post(&url)
            .send()
            .await
            .map_err(|err| LoomError::gateway(format!("session reset failed: {err}")))?;
        if !response.status().is_success() {
            return Err(LoomError::gateway(format!(
                "session reset for {session} rejected (status {})",
                response.status()
            )));
        }
        Ok(())
    }

    async fn loaded_model(&self) -> Option<ModelInfo> {
        self.loaded.read().await.clone()
    }
}
