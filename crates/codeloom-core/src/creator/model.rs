//! Creator domain model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A saved authoring persona applied to the implementation prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
    /// Stable UUID identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Short role description ("arcade game designer").
    pub role: String,
    /// Style directives injected verbatim into the coder prompt.
    pub style: String,
    /// RFC3339 creation timestamp.
    pub created_at: String,
}

impl Creator {
    /// Creates a new creator with a fresh UUID and current timestamp.
    pub fn new(
        name: impl Into<String>,
        role: impl Into<String>,
        style: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            role: role.into(),
            style: style.into(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_creator_has_unique_id() {
        let a = Creator::new("Pixel", "game designer", "retro 8-bit palette");
        let b = Creator::new("Pixel", "game designer", "retro 8-bit palette");
        assert_ne!(a.id, b.id);
        assert!(!a.created_at.is_empty());
    }
}
