//! Codeloom core domain: shared error type, model/catalog types, the
//! inference gateway seam, observable engine state, and the creator domain.

pub mod artifact;
pub mod config;
pub mod creator;
pub mod error;
pub mod gateway;
pub mod model;
pub mod state;

// Re-export common error type
pub use error::{LoomError, Result};

pub use artifact::{CodeLanguage, GeneratedArtifact};
pub use config::EngineConfig;
pub use gateway::{InferenceGateway, TokenStream};
pub use model::{Backend, GenerationParameters, GenerationRequest, ModelInfo, SessionId};
pub use state::{EngineState, StateCell};
