use std::fs;
use std::io::Read;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use kic_ai::citation::{resolve_with_report, template_from_config, ResolveOptions};
use kic_core::config::{load_config, CitationConfig, TemplateConfig};
use kic_core::domain::load_sources;
use kic_core::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TemplateArg {
    Plain,
    Markdown,
    Html,
    Superscript,
}

impl From<TemplateArg> for TemplateConfig {
    fn from(arg: TemplateArg) -> Self {
        match arg {
            TemplateArg::Plain => TemplateConfig::Plain,
            TemplateArg::Markdown => TemplateConfig::Markdown,
            TemplateArg::Html => TemplateConfig::Html,
            TemplateArg::Superscript => TemplateConfig::Superscript,
        }
    }
}

/// Replace `[docN]` markers in a model answer with citations to the given sources.
#[derive(Debug, Parser)]
#[command(name = "kic-cite", version, about)]
pub struct Cli {
    /// JSON array of sources in retrieval order (`[docN]` is element N).
    #[arg(long)]
    pub sources: PathBuf,

    /// Answer text file; reads stdin when omitted.
    #[arg(long)]
    pub answer: Option<PathBuf>,

    /// Citation config (JSON).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Overrides the template from the config file.
    #[arg(long, value_enum)]
    pub template: Option<TemplateArg>,

    /// Print the JSON resolution report instead of the rewritten text.
    #[arg(long)]
    pub report: bool,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long)]
    pub verbose: bool,
}

fn effective_config(cli: &Cli) -> Result<CitationConfig, AppError> {
    let mut cfg = match &cli.config {
        Some(path) => load_config(path)?,
        None => CitationConfig::default(),
    };
    if let Some(t) = cli.template {
        cfg.template = t.into();
    }
    Ok(cfg)
}

fn read_answer(cli: &Cli) -> Result<String, AppError> {
    match &cli.answer {
        Some(path) => fs::read_to_string(path).map_err(|e| {
            AppError::new("ANSWER_READ_FAILED", "Failed to read answer file")
                .with_details(format!("path={}; err={}", path.display(), e))
        }),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).map_err(|e| {
                AppError::new("ANSWER_READ_FAILED", "Failed to read answer from stdin")
                    .with_details(e.to_string())
            })?;
            Ok(buf)
        }
    }
}

/// Resolve `answer` and return what the binary prints.
pub fn render_output(cli: &Cli, answer: &str) -> Result<String, AppError> {
    let cfg = effective_config(cli)?;
    let sources = load_sources(&cli.sources)?;
    let template = template_from_config(&cfg.template);
    let resolution =
        resolve_with_report(answer, &sources, template.as_ref(), &ResolveOptions::from(&cfg));

    if cli.report {
        return serde_json::to_string_pretty(&resolution).map_err(|e| {
            AppError::new("REPORT_ENCODE_FAILED", "Failed to encode resolution report")
                .with_details(e.to_string())
        });
    }
    Ok(resolution.text)
}

pub fn run(cli: &Cli) -> Result<String, AppError> {
    let answer = read_answer(cli)?;
    render_output(cli, &answer)
}
