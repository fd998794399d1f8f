use kic_core::config::TemplateConfig;

/// Everything a template may use to format one accepted citation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CitationView<'a> {
    /// Source URL, empty when the source has none.
    pub url: &'a str,
    /// Truncated title, or the fallback derived from the URL.
    pub display: &'a str,
    /// 1-based counter over citations rendered so far in this pass.
    pub ordinal: usize,
    /// 1-based position of the source in the list (`N` in `[docN]`).
    pub source_index: usize,
}

/// Formats an accepted citation. Injected by the caller; closures work too.
pub trait CitationTemplate {
    fn render(&self, citation: &CitationView<'_>) -> String;
}

impl<F> CitationTemplate for F
where
    F: Fn(&CitationView<'_>) -> String,
{
    fn render(&self, citation: &CitationView<'_>) -> String {
        self(citation)
    }
}

/// Display text for a source: title cut to `max_len` characters plus `ellipsis`, else the URL,
/// else a positional label. Never the marker text itself.
pub fn display_text(
    url: Option<&str>,
    title: Option<&str>,
    source_index: usize,
    max_len: usize,
    ellipsis: &str,
) -> String {
    if let Some(title) = title {
        return truncate_chars(title, max_len, ellipsis);
    }
    match url {
        Some(url) => url.to_string(),
        None => format!("Source {source_index}"),
    }
}

fn truncate_chars(text: &str, max_len: usize, ellipsis: &str) -> String {
    match text.char_indices().nth(max_len) {
        Some((cut, _)) => {
            let mut s = text[..cut].to_string();
            s.push_str(ellipsis);
            s
        }
        None => text.to_string(),
    }
}

/// `Title (url)`; just the display text when there is no URL or it already is the URL.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTemplate;

impl CitationTemplate for PlainTemplate {
    fn render(&self, c: &CitationView<'_>) -> String {
        if c.url.is_empty() || c.url == c.display {
            c.display.to_string()
        } else {
            format!("{} ({})", c.display, c.url)
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownTemplate;

impl CitationTemplate for MarkdownTemplate {
    fn render(&self, c: &CitationView<'_>) -> String {
        if c.url.is_empty() {
            return c.display.to_string();
        }
        let display = c.display.replace('[', "\\[").replace(']', "\\]");
        let url = c.url.replace('(', "%28").replace(')', "%29");
        format!("[{display}]({url})")
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlTemplate;

impl CitationTemplate for HtmlTemplate {
    fn render(&self, c: &CitationView<'_>) -> String {
        if c.url.is_empty() {
            return escape_html(c.display);
        }
        format!(
            "<a href=\"{}\">{}</a>",
            escape_html(c.url),
            escape_html(c.display)
        )
    }
}

/// Numbered superscript link, numbered by order of appearance. Without a URL there is nothing to
/// link, so the display text stands alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuperscriptTemplate;

impl CitationTemplate for SuperscriptTemplate {
    fn render(&self, c: &CitationView<'_>) -> String {
        if c.url.is_empty() {
            return escape_html(c.display);
        }
        format!(
            "<a href=\"{}\"><sup>[{}]</sup></a>",
            escape_html(c.url),
            c.ordinal
        )
    }
}

/// User-supplied format with `{url}`, `{title}`, `{index}` and `{source}` placeholders.
///
/// Substitution is single-pass, so placeholder-like text inside a title is emitted literally.
#[derive(Debug, Clone)]
pub struct FormatTemplate {
    format: String,
}

impl FormatTemplate {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
        }
    }
}

impl CitationTemplate for FormatTemplate {
    fn render(&self, c: &CitationView<'_>) -> String {
        let mut out = String::with_capacity(self.format.len() + c.display.len() + c.url.len());
        let mut rest = self.format.as_str();
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let tail = &rest[open..];
            let (value, consumed) = if tail.starts_with("{url}") {
                (c.url.to_string(), 5)
            } else if tail.starts_with("{title}") {
                (c.display.to_string(), 7)
            } else if tail.starts_with("{index}") {
                (c.ordinal.to_string(), 7)
            } else if tail.starts_with("{source}") {
                (c.source_index.to_string(), 8)
            } else {
                ("{".to_string(), 1)
            };
            out.push_str(&value);
            rest = &tail[consumed..];
        }
        out.push_str(rest);
        out
    }
}

pub fn template_from_config(cfg: &TemplateConfig) -> Box<dyn CitationTemplate> {
    match cfg {
        TemplateConfig::Plain => Box::new(PlainTemplate),
        TemplateConfig::Markdown => Box::new(MarkdownTemplate),
        TemplateConfig::Html => Box::new(HtmlTemplate),
        TemplateConfig::Superscript => Box::new(SuperscriptTemplate),
        TemplateConfig::Custom { format } => Box::new(FormatTemplate::new(format.clone())),
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
