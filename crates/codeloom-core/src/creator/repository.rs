//! Repository trait for creator persistence.

use async_trait::async_trait;

use super::Creator;
use crate::error::Result;

/// Persistence seam for creators.
///
/// Implementations live in the infrastructure crate; tests use in-memory
/// mocks.
#[async_trait]
pub trait CreatorRepository: Send + Sync {
    async fn get_all(&self) -> Result<Vec<Creator>>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Creator>>;

    async fn save(&self, creator: &Creator) -> Result<()>;

    async fn delete(&self, id: &str) -> Result<()>;
}
