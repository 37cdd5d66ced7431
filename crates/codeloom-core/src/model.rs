//! Model catalog and generation-request domain types.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

/// Inference backend a model can be loaded on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Cpu,
    Gpu,
}

/// A model known to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Stable identifier used in settings and gateway calls.
    pub id: String,
    /// Human-readable name for display surfaces.
    pub display_name: String,
    /// Local path or download URL of the model weights.
    pub path_or_url: String,
    /// Context window in tokens.
    #[serde(default = "default_context_window")]
    pub context_window: u32,
}

fn default_context_window() -> u32 {
    8192
}

/// Identifier scoping one generation call's runtime state.
///
/// A single user action produces up to two sessions (spec session, code
/// session); a session is never reused across phases.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sampling parameters pushed to the gateway before a generation.
///
/// All fields are optional; `None` clears the corresponding parameter back
/// to the runtime's default. `GenerationParameters::default()` therefore
/// represents the fully-unset state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct GenerationParameters {
    pub max_tokens: Option<u32>,
    pub top_k: Option<u32>,
    pub top_p: Option<f32>,
    pub temperature: Option<f32>,
}

impl GenerationParameters {
    /// True when every parameter is unset (the runtime-default state).
    pub fn is_unset(&self) -> bool {
        self.max_tokens.is_none()
            && self.top_k.is_none()
            && self.top_p.is_none()
            && self.temperature.is_none()
    }
}

/// One streamed generation call against the gateway.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Fully-built prompt text.
    pub prompt: String,
    /// Id of the model expected to serve the request.
    pub model_id: String,
    /// Session scoping this call's runtime state.
    pub session: SessionId,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, model_id: impl Into<String>, session: SessionId) -> Self {
        Self {
            prompt: prompt.into(),
            model_id: model_id.into(),
            session,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_ids_are_unique() {
        assert_ne!(SessionId::new(), SessionId::new());
    }

    #[test]
    fn test_default_parameters_are_unset() {
        assert!(GenerationParameters::default().is_unset());
        let params = GenerationParameters {
            temperature: Some(0.2),
            ..Default::default()
        };
        assert!(!params.is_unset());
    }

    #[test]
    fn test_backend_parse() {
        use std::str::FromStr;
        assert_eq!(Backend::from_str("gpu").unwrap(), Backend::Gpu);
        assert_eq!(Backend::default(), Backend::Cpu);
    }
}
