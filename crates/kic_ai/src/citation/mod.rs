//! Rewrites `[docN]` markers in model answers into rendered citations.
//!
//! One left-to-right pass: [`scan_markers`] finds candidate spans, [`classify`] decides each one
//! against the source list and the per-call [`ResolutionState`], and the engine below copies the
//! text between spans verbatim while substituting a citation or nothing for each span.

use std::collections::BTreeSet;

use kic_core::config::{CitationConfig, DEFAULT_ELLIPSIS, MAX_TITLE_LENGTH};
use kic_core::domain::SourceDocument;
use serde::{Deserialize, Serialize};

mod render;
mod resolver;
mod scan;

pub use render::{
    display_text, template_from_config, CitationTemplate, CitationView, FormatTemplate,
    HtmlTemplate, MarkdownTemplate, PlainTemplate, SuperscriptTemplate,
};
pub use resolver::{classify, parse_index, ResolutionState, Verdict};
pub use scan::{scan_markers, Marker, MarkerScanner};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveOptions {
    pub max_title_length: usize,
    pub ellipsis: String,
    /// Drop a citation whose URL was already rendered earlier in the pass.
    pub dedupe_by_url: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            max_title_length: MAX_TITLE_LENGTH,
            ellipsis: DEFAULT_ELLIPSIS.to_string(),
            dedupe_by_url: false,
        }
    }
}

impl From<&CitationConfig> for ResolveOptions {
    fn from(cfg: &CitationConfig) -> Self {
        Self {
            max_title_length: cfg.max_title_length,
            ellipsis: cfg.ellipsis.clone(),
            dedupe_by_url: cfg.dedupe_by_url,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    Invalid,
    Duplicate,
    SameUrl,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DroppedMarker {
    /// The full marker text, brackets included.
    pub raw: String,
    /// Byte offset in the input text.
    pub start: usize,
    pub reason: DropReason,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CitedSource {
    pub source_index: usize,
    pub ordinal: usize,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Resolution {
    pub text: String,
    pub cited: Vec<CitedSource>,
    pub dropped: Vec<DroppedMarker>,
}

/// Resolve with the plain `Title (url)` template and default options.
pub fn resolve(text: &str, sources: &[SourceDocument]) -> String {
    resolve_with(text, sources, &PlainTemplate, &ResolveOptions::default())
}

pub fn resolve_with(
    text: &str,
    sources: &[SourceDocument],
    template: &dyn CitationTemplate,
    options: &ResolveOptions,
) -> String {
    resolve_with_report(text, sources, template, options).text
}

pub fn resolve_with_report(
    text: &str,
    sources: &[SourceDocument],
    template: &dyn CitationTemplate,
    options: &ResolveOptions,
) -> Resolution {
    let mut state = ResolutionState::new(sources.len());
    let mut seen_urls: BTreeSet<&str> = BTreeSet::new();
    let mut out = String::with_capacity(text.len());
    let mut cited: Vec<CitedSource> = Vec::new();
    let mut dropped: Vec<DroppedMarker> = Vec::new();
    let mut cursor = 0usize;

    for marker in scan_markers(text) {
        out.push_str(&text[cursor..marker.start]);
        cursor = marker.end;

        let reason = match classify(marker.raw_token, sources, &mut state) {
            Verdict::Resolved { index, source } => {
                let url = source.url();
                let repeated_url = options.dedupe_by_url
                    && url.map(|u| !seen_urls.insert(u)).unwrap_or(false);
                if !repeated_url {
                    let ordinal = cited.len() + 1;
                    let display = display_text(
                        url,
                        source.title(),
                        index,
                        options.max_title_length,
                        &options.ellipsis,
                    );
                    out.push_str(&template.render(&CitationView {
                        url: url.unwrap_or(""),
                        display: &display,
                        ordinal,
                        source_index: index,
                    }));
                    cited.push(CitedSource {
                        source_index: index,
                        ordinal,
                        url: url.map(str::to_string),
                    });
                    continue;
                }
                DropReason::SameUrl
            }
            Verdict::Duplicate { .. } => DropReason::Duplicate,
            Verdict::Invalid => DropReason::Invalid,
        };

        tracing::debug!(
            marker = %&text[marker.span()],
            start = marker.start,
            ?reason,
            "dropped citation marker"
        );
        dropped.push(DroppedMarker {
            raw: text[marker.span()].to_string(),
            start: marker.start,
            reason,
        });
    }
    out.push_str(&text[cursor..]);

    tracing::debug!(
        cited = cited.len(),
        dropped = dropped.len(),
        sources = sources.len(),
        "resolved citation markers"
    );

    Resolution {
        text: out,
        cited,
        dropped,
    }
}
