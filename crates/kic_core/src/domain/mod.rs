use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// One retrieved passage that an answer may cite.
///
/// Sources are addressed only by their 1-based position in the list handed to the resolver;
/// `[doc1]` refers to the first element. There is no id-based lookup.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceDocument {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    /// Passage content. Only used when building prompts; the resolver ignores it.
    #[serde(default)]
    pub text: String,
}

impl SourceDocument {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            title: Some(title.into()),
            text: String::new(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Non-empty URL, if any.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.trim().is_empty())
    }

    /// Non-empty title, if any.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.trim().is_empty())
    }
}

/// Parse a JSON array of sources. Order is preserved: element `i` answers to `[doc{i+1}]`.
pub fn parse_sources_json(raw: &str) -> Result<Vec<SourceDocument>, AppError> {
    serde_json::from_str(raw).map_err(|e| {
        AppError::new("SOURCES_INVALID", "Failed to parse source list")
            .with_details(e.to_string())
    })
}

pub fn load_sources(path: &Path) -> Result<Vec<SourceDocument>, AppError> {
    let raw = fs::read_to_string(path).map_err(|e| {
        AppError::new("SOURCES_NOT_FOUND", "Failed to read source list")
            .with_details(format!("path={}; err={}", path.display(), e))
    })?;
    let sources = parse_sources_json(&raw)?;
    tracing::debug!(path = %path.display(), count = sources.len(), "loaded sources");
    Ok(sources)
}
