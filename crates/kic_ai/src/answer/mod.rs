use kic_core::config::CitationConfig;
use kic_core::domain::SourceDocument;
use kic_core::error::AppError;
use serde::{Deserialize, Serialize};

use crate::citation::{resolve_with_report, template_from_config, CitedSource, ResolveOptions};
use crate::guardrails::enforce_citation_markers;
use crate::llm::Llm;

mod prompts;

pub use prompts::{answer_prompt, format_sources};

/// Sentinel the model returns when the sources do not cover the question.
pub const NO_ANSWER: &str = "NO ANSWER FOUND";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRequest {
    pub question: String,
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnsweredQuestion {
    /// Model answer after JSON unwrapping, markers untouched.
    pub answer_raw: String,
    /// Answer with markers resolved into citations.
    pub answer_rendered: String,
    pub cited: Vec<CitedSource>,
    pub no_answer: bool,
}

#[derive(Debug, Deserialize)]
struct ModelAnswer {
    answer: String,
}

/// Extract the answer text from a model reply.
///
/// Accepts `{"answer": ...}`, optionally wrapped in a ```json fence; anything else is taken
/// verbatim (trimmed).
pub fn parse_model_answer(raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|s| s.trim_end().strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed);

    let answer = match serde_json::from_str::<ModelAnswer>(unfenced) {
        Ok(parsed) => parsed.answer.trim().to_string(),
        Err(_) => trimmed.to_string(),
    };
    if answer.is_empty() {
        return Err(AppError::new("AI_ANSWER_EMPTY", "Model returned an empty answer"));
    }
    Ok(answer)
}

pub fn is_no_answer(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case(NO_ANSWER)
}

pub fn answer_with_citations(
    llm: &dyn Llm,
    model: &str,
    req: &AnswerRequest,
    sources: &[SourceDocument],
    cfg: &CitationConfig,
) -> Result<AnsweredQuestion, AppError> {
    let question = req.question.trim();
    if question.is_empty() {
        return Err(AppError::new("AI_QUESTION_EMPTY", "Question must not be empty"));
    }
    cfg.validate()?;

    let (sources_block, included) = format_sources(sources, cfg.max_context_chars);
    if included < sources.len() {
        tracing::debug!(
            included,
            total = sources.len(),
            "source block truncated to fit context budget"
        );
    }
    let prompt = answer_prompt(question, &req.language, &sources_block);

    let raw = llm.generate(model, &prompt)?;
    let answer = parse_model_answer(&raw)?;

    if is_no_answer(&answer) {
        tracing::info!(model, "model found no answer in sources");
        return Ok(AnsweredQuestion {
            answer_rendered: answer.clone(),
            answer_raw: answer,
            cited: Vec::new(),
            no_answer: true,
        });
    }

    if cfg.require_citations {
        enforce_citation_markers(&answer)?;
    }

    // Only sources the model actually saw can be cited.
    let template = template_from_config(&cfg.template);
    let resolution = resolve_with_report(
        &answer,
        &sources[..included],
        template.as_ref(),
        &ResolveOptions::from(cfg),
    );

    Ok(AnsweredQuestion {
        answer_raw: answer,
        answer_rendered: resolution.text,
        cited: resolution.cited,
        no_answer: false,
    })
}
