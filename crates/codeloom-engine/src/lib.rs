//! Codeloom generation engine: parameter policy, prompt templates, the
//! two-phase orchestrator, streamed accumulation, and code extraction.

pub mod extract;
pub mod orchestrator;
pub mod params;
pub mod prompt;
pub mod stream;

pub use orchestrator::GenerationEngine;
