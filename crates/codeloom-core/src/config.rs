//! Engine configuration.

use std::time::Duration;

/// Tunables for the two-phase generation engine.
///
/// Production defaults match the shipped behavior; tests shrink the
/// durations to keep runs fast.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Time budget for the architect (planning) phase. On expiry the cycle
    /// falls back to direct-prompt implementation.
    pub plan_timeout: Duration,
    /// Settle pause between the inter-phase session reset and the coder
    /// prompt. Mitigates the runtime's "previous invocation still
    /// processing" race.
    pub handoff_settle: Duration,
    /// Temperature applied to prompts classified as creative.
    pub creative_temperature: f32,
    /// Temperature applied to utility prompts.
    pub utility_temperature: f32,
    /// Fixed top-k for all generations.
    pub top_k: u32,
    /// Fixed top-p for all generations.
    pub top_p: f32,
    /// Fixed max-tokens for all generations.
    pub max_tokens: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            plan_timeout: Duration::from_secs(30),
            handoff_settle: Duration::from_millis(500),
            creative_temperature: 0.6,
            utility_temperature: 0.2,
            top_k: 40,
            top_p: 0.95,
            max_tokens: 8192,
        }
    }
}
