//! Codeloom infrastructure: TOML-backed persistence (settings, model
//! catalog, creators) and the llama-server gateway implementation.

pub mod atomic_toml;
pub mod catalog;
pub mod creator_repository;
pub mod llama_gateway;
pub mod settings;

pub use catalog::ModelCatalog;
pub use creator_repository::TomlDirCreatorRepository;
pub use llama_gateway::LlamaServerGateway;
pub use settings::{Settings, SettingsStore};
