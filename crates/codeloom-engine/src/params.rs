//! Generation parameter policy.
//!
//! Classifies the user prompt as creative vs. utility and derives the
//! sampling parameters pushed to the gateway for the cycle. The derived
//! parameters must always be cleared back to defaults once the cycle ends,
//! whatever the outcome; the orchestrator owns that cleanup.

use codeloom_core::{EngineConfig, GenerationParameters};

/// Keywords that mark a prompt as creative intent.
const CREATIVE_KEYWORDS: [&str; 4] = ["game", "story", "art", "creative"];

/// True when the prompt contains any creative keyword (case-insensitive
/// substring match).
pub fn is_creative_prompt(prompt: &str) -> bool {
    let lower = prompt.to_lowercase();
    CREATIVE_KEYWORDS
        .iter()
        .any(|keyword| lower.contains(keyword))
}

/// Derives the sampling parameters for one generation cycle.
///
/// Creative prompts get a higher temperature; top-k, top-p and max-tokens
/// are fixed.
pub fn derive_parameters(prompt: &str, config: &EngineConfig) -> GenerationParameters {
    let temperature = if is_creative_prompt(prompt) {
        config.creative_temperature
    } else {
        config.utility_temperature
    };

    GenerationParameters {
        max_tokens: Some(config.max_tokens),
        top_k: Some(config.top_k),
        top_p: Some(config.top_p),
        temperature: Some(temperature),
    }
}
