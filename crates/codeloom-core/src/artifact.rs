//! Generated-code artifact types.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Language classification of an extracted code artifact.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CodeLanguage {
    Html,
    Python,
    Javascript,
    #[default]
    Unknown,
}

impl CodeLanguage {
    /// File extension conventionally used when saving an artifact of this language.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Python => "py",
            Self::Javascript => "js",
            Self::Unknown => "txt",
        }
    }

    /// Whether the artifact can be previewed directly in an embedded browser view.
    pub fn is_browser_renderable(&self) -> bool {
        matches!(self, Self::Html | Self::Javascript)
    }
}

/// The final classified result of one generation cycle.
///
/// During streaming the artifact exists in raw form (accumulating text,
/// language `Unknown`); the extraction step classifies it exactly once after
/// the stream completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GeneratedArtifact {
    /// Extracted (or raw, pre-extraction) source text.
    pub code: String,
    /// Classified language of `code`.
    pub language: CodeLanguage,
}

impl GeneratedArtifact {
    pub fn new(code: impl Into<String>, language: CodeLanguage) -> Self {
        Self {
            code: code.into(),
            language,
        }
    }

    /// Raw, unclassified artifact as it exists while tokens are streaming in.
    pub fn raw(code: impl Into<String>) -> Self {
        Self::new(code, CodeLanguage::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_display() {
        assert_eq!(CodeLanguage::Html.to_string(), "html");
        assert_eq!(CodeLanguage::Python.to_string(), "python");
        assert_eq!(CodeLanguage::Unknown.to_string(), "unknown");
    }

    #[test]
    fn test_raw_artifact_is_unknown() {
        let artifact = GeneratedArtifact::raw("print(1)");
        assert_eq!(artifact.language, CodeLanguage::Unknown);
        assert_eq!(artifact.code, "print(1)");
    }
}
