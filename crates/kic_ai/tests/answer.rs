use std::cell::RefCell;

use pretty_assertions::assert_eq;

use kic_ai::answer::{
    answer_with_citations, format_sources, parse_model_answer, AnswerRequest, NO_ANSWER,
};
use kic_ai::llm::Llm;
use kic_core::config::{CitationConfig, TemplateConfig};
use kic_core::domain::SourceDocument;
use kic_core::error::AppError;

struct MockLlm {
    out: String,
    seen_prompt: RefCell<Option<String>>,
}

impl MockLlm {
    fn new(out: impl Into<String>) -> Self {
        Self {
            out: out.into(),
            seen_prompt: RefCell::new(None),
        }
    }
}

impl Llm for MockLlm {
    fn generate(&self, _model: &str, prompt: &str) -> Result<String, AppError> {
        *self.seen_prompt.borrow_mut() = Some(prompt.to_string());
        Ok(self.out.clone())
    }
}

struct FailingLlm;

impl Llm for FailingLlm {
    fn generate(&self, _model: &str, _prompt: &str) -> Result<String, AppError> {
        Err(AppError::new("AI_GENERATE_FAILED", "backend down").with_retryable(true))
    }
}

fn sources() -> Vec<SourceDocument> {
    vec![
        SourceDocument::new("https://ki-campus.org/kurs/ml", "Machine Learning Grundlagen")
            .with_text("Der Kurs dauert sechs Wochen."),
        SourceDocument::new("https://ki-campus.org/blog/llm", "LLMs im Alltag")
            .with_text("Ein Blogbeitrag über Sprachmodelle."),
    ]
}

fn request() -> AnswerRequest {
    AnswerRequest {
        question: "Wie lange dauert der Kurs?".to_string(),
        language: "German".to_string(),
    }
}

fn markdown_config() -> CitationConfig {
    CitationConfig {
        template: TemplateConfig::Markdown,
        ..CitationConfig::default()
    }
}

#[test]
fn answer_resolves_markers_from_json_reply() {
    let llm = MockLlm::new(r#"{"answer": "Sechs Wochen [doc1][doc7][doc1]."}"#);
    let res = answer_with_citations(&llm, "mock", &request(), &sources(), &markdown_config())
        .expect("answer");

    assert_eq!(res.answer_raw, "Sechs Wochen [doc1][doc7][doc1].");
    assert_eq!(
        res.answer_rendered,
        "Sechs Wochen [Machine Learning Grundlagen](https://ki-campus.org/kurs/ml)."
    );
    assert_eq!(res.cited.len(), 1);
    assert_eq!(res.cited[0].source_index, 1);
    assert!(!res.no_answer);

    let prompt = llm.seen_prompt.borrow().clone().expect("prompt");
    assert!(prompt.contains("[doc1]\nContent: Der Kurs dauert sechs Wochen."));
    assert!(prompt.contains("[doc2]\nContent: Ein Blogbeitrag"));
    assert!(prompt.contains("Wie lange dauert der Kurs?"));
    assert!(prompt.contains(NO_ANSWER));
}

#[test]
fn answer_accepts_fenced_json_and_plain_text() {
    assert_eq!(
        parse_model_answer("```json\n{\"answer\": \"Ja [doc2]\"}\n```").expect("fenced"),
        "Ja [doc2]"
    );
    assert_eq!(
        parse_model_answer("  Nur Text [doc1]  ").expect("plain"),
        "Nur Text [doc1]"
    );
    let err = parse_model_answer(r#"{"answer": "   "}"#).expect_err("empty");
    assert_eq!(err.code, "AI_ANSWER_EMPTY");
}

#[test]
fn no_answer_sentinel_short_circuits() {
    let llm = MockLlm::new(format!(r#"{{"answer": "{NO_ANSWER}"}}"#));
    let cfg = CitationConfig {
        require_citations: true,
        ..CitationConfig::default()
    };
    let res = answer_with_citations(&llm, "mock", &request(), &sources(), &cfg).expect("answer");
    assert!(res.no_answer);
    assert_eq!(res.answer_rendered, NO_ANSWER);
    assert!(res.cited.is_empty());
}

#[test]
fn require_citations_rejects_uncited_answer() {
    let llm = MockLlm::new(r#"{"answer": "Sechs Wochen."}"#);
    let cfg = CitationConfig {
        require_citations: true,
        ..CitationConfig::default()
    };
    let err = answer_with_citations(&llm, "mock", &request(), &sources(), &cfg)
        .expect_err("should error");
    assert_eq!(err.code, "CITE_REQUIRED");
    assert_eq!(err.message, "Answer must reference at least one source as [docN]");
    assert_eq!(err.details, None);

    // Without the flag the same answer passes through untouched.
    let res = answer_with_citations(
        &llm,
        "mock",
        &request(),
        &sources(),
        &CitationConfig::default(),
    )
    .expect("answer");
    assert_eq!(res.answer_rendered, "Sechs Wochen.");
}

#[test]
fn empty_question_is_rejected_before_calling_model() {
    let llm = MockLlm::new("unused");
    let req = AnswerRequest {
        question: "   ".to_string(),
        language: "German".to_string(),
    };
    let err = answer_with_citations(&llm, "mock", &req, &sources(), &CitationConfig::default())
        .expect_err("should error");
    assert_eq!(err.code, "AI_QUESTION_EMPTY");
    assert!(llm.seen_prompt.borrow().is_none());
}

#[test]
fn model_errors_propagate() {
    let err = answer_with_citations(
        &FailingLlm,
        "mock",
        &request(),
        &sources(),
        &CitationConfig::default(),
    )
    .expect_err("should error");
    assert_eq!(err.code, "AI_GENERATE_FAILED");
    assert!(err.retryable);
}

#[test]
fn sources_beyond_context_budget_are_not_citable() {
    let all = sources();
    let (block, included) = format_sources(&all, 150);
    assert_eq!(included, 1);
    assert!(block.starts_with("<SOURCES>:\n[doc1]"));
    assert!(!block.contains("[doc2]"));

    let llm = MockLlm::new(r#"{"answer": "A [doc1] B [doc2]"}"#);
    let cfg = CitationConfig {
        max_context_chars: 150,
        ..markdown_config()
    };
    let res = answer_with_citations(&llm, "mock", &request(), &all, &cfg).expect("answer");
    assert_eq!(
        res.answer_rendered,
        "A [Machine Learning Grundlagen](https://ki-campus.org/kurs/ml) B "
    );
}

#[test]
fn context_budget_covers_the_whole_block_including_header() {
    let one = vec![SourceDocument::new("a.url", "A").with_text("kurz")];
    let (full, included) = format_sources(&one, usize::MAX);
    assert_eq!(included, 1);
    let exact = full.chars().count();

    let (block, included) = format_sources(&one, exact);
    assert_eq!(included, 1);
    assert_eq!(block, full);
    assert_eq!(block.chars().count(), exact);

    let (block, included) = format_sources(&one, exact - 1);
    assert_eq!(included, 0);
    assert_eq!(block, "<SOURCES>:\n");
}

#[test]
fn context_budget_counts_characters_not_bytes() {
    let umlauts = vec![SourceDocument::new("u.url", "Ü").with_text("ü".repeat(60))];
    let (full, _) = format_sources(&umlauts, usize::MAX);
    let chars = full.chars().count();
    assert!(full.len() > chars);

    let (block, included) = format_sources(&umlauts, chars);
    assert_eq!(included, 1);
    assert!(block.chars().count() <= chars);
    assert!(block.contains(&"ü".repeat(60)));
}

#[test]
fn context_budget_separates_entries_and_never_exceeds_cap() {
    let all = sources();
    let (full, included) = format_sources(&all, usize::MAX);
    assert_eq!(included, 2);
    assert!(full.contains("}\n\n[doc2]"));
    assert!(!full.ends_with('\n'));

    for cap in [20, 100, 150, 200, full.chars().count()] {
        let (block, _) = format_sources(&all, cap);
        assert!(block.chars().count() <= cap, "cap {cap} exceeded");
    }
}
