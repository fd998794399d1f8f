use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Titles longer than this many characters are cut and suffixed with [`DEFAULT_ELLIPSIS`].
pub const MAX_TITLE_LENGTH: usize = 50;
pub const DEFAULT_ELLIPSIS: &str = "...";
/// Upper bound for the `<SOURCES>` block placed in the answer prompt.
pub const DEFAULT_MAX_CONTEXT_CHARS: usize = 8000;

const PLACEHOLDERS: [&str; 4] = ["{url}", "{title}", "{index}", "{source}"];

/// Markup used for a rendered citation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TemplateConfig {
    /// `Title (url)`
    #[default]
    Plain,
    /// `[Title](url)`
    Markdown,
    /// `<a href="url">Title</a>`
    Html,
    /// `<a href="url"><sup>[n]</sup></a>`
    Superscript,
    /// Free-form format with `{url}`, `{title}`, `{index}` and `{source}` placeholders.
    Custom { format: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CitationConfig {
    pub max_title_length: usize,
    pub ellipsis: String,
    pub template: TemplateConfig,
    pub dedupe_by_url: bool,
    pub require_citations: bool,
    pub max_context_chars: usize,
}

impl Default for CitationConfig {
    fn default() -> Self {
        Self {
            max_title_length: MAX_TITLE_LENGTH,
            ellipsis: DEFAULT_ELLIPSIS.to_string(),
            template: TemplateConfig::default(),
            dedupe_by_url: false,
            require_citations: false,
            max_context_chars: DEFAULT_MAX_CONTEXT_CHARS,
        }
    }
}

impl CitationConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.max_title_length == 0 {
            return Err(AppError::new(
                "CONFIG_INVALID",
                "max_title_length must be at least 1",
            ));
        }
        if self.max_context_chars == 0 {
            return Err(AppError::new(
                "CONFIG_INVALID",
                "max_context_chars must be at least 1",
            ));
        }
        if let TemplateConfig::Custom { format } = &self.template {
            if !PLACEHOLDERS.iter().any(|p| format.contains(p)) {
                return Err(AppError::new(
                    "CONFIG_INVALID",
                    "Custom citation template must use at least one placeholder",
                )
                .with_details(format!("format={format}; allowed={}", PLACEHOLDERS.join(","))));
            }
        }
        Ok(())
    }
}

pub fn parse_config_json(raw: &str) -> Result<CitationConfig, AppError> {
    let cfg: CitationConfig = serde_json::from_str(raw).map_err(|e| {
        AppError::new("CONFIG_INVALID", "Failed to parse citation config")
            .with_details(e.to_string())
    })?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn load_config(path: &Path) -> Result<CitationConfig, AppError> {
    if !path.is_file() {
        return Err(AppError::new("CONFIG_NOT_FOUND", "Citation config file not found")
            .with_details(path.display().to_string()));
    }
    let raw = fs::read_to_string(path).map_err(|e| {
        AppError::new("CONFIG_READ_FAILED", "Failed to read citation config")
            .with_details(format!("path={}; err={}", path.display(), e))
    })?;
    let cfg = parse_config_json(&raw)?;
    tracing::debug!(path = %path.display(), "loaded citation config");
    Ok(cfg)
}

pub fn save_config(path: &Path, cfg: &CitationConfig) -> Result<(), AppError> {
    cfg.validate()?;
    let json = serde_json::to_string_pretty(cfg).map_err(|e| {
        AppError::new("CONFIG_WRITE_FAILED", "Failed to serialize citation config")
            .with_details(e.to_string())
    })?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            AppError::new("CONFIG_WRITE_FAILED", "Failed to create config directory")
                .with_details(e.to_string())
        })?;
    }
    fs::write(path, json).map_err(|e| {
        AppError::new("CONFIG_WRITE_FAILED", "Failed to write citation config")
            .with_details(format!("path={}; err={}", path.display(), e))
    })
}
