//! Creator domain module.
//!
//! A creator is a saved authoring persona that flavors the implementation
//! prompt (tone, stack preferences, visual style). Persistence is simple
//! CRUD over [`CreatorRepository`].

mod model;
mod preset;
mod repository;

pub use model::Creator;
pub use preset::default_creators;
pub use repository::CreatorRepository;
