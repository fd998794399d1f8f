use kic_core::domain::SourceDocument;
use serde_json::json;

const SOURCES_HEADER: &str = "<SOURCES>:\n";
const ENTRY_SEPARATOR: &str = "\n\n";

/// Render sources as `[docN]` blocks for the prompt.
///
/// `max_chars` caps the whole returned block, header included, counted in characters. Stops before
/// the first block that would overflow it; returns the block and how many sources made it in, so
/// markers beyond that count can be treated as out of range.
pub fn format_sources(sources: &[SourceDocument], max_chars: usize) -> (String, usize) {
    let mut block = SOURCES_HEADER.to_string();
    let mut used = SOURCES_HEADER.chars().count();
    let mut included = 0usize;
    for (i, source) in sources.iter().enumerate() {
        let metadata = json!({
            "title": source.title(),
            "url": source.url(),
        });
        let entry = format!(
            "[doc{}]\nContent: {}\nMetadata: {}",
            i + 1,
            source.text.trim(),
            metadata
        );
        let separator = if included == 0 { "" } else { ENTRY_SEPARATOR };
        let cost = separator.chars().count() + entry.chars().count();
        if used + cost > max_chars {
            break;
        }
        block.push_str(separator);
        block.push_str(&entry);
        used += cost;
        included += 1;
    }
    (block, included)
}

pub fn answer_prompt(question: &str, language: &str, sources_block: &str) -> String {
    // The reply contract is what the resolver and `parse_model_answer` rely on:
    // - markers exactly as [docN], one per bracket pair
    // - JSON {"answer": ...}
    // - the NO ANSWER FOUND sentinel
    format!(
        r#"You answer questions from learners using ONLY the sources below.

Rules (non-negotiable):
1) Use ONLY the sources provided below. Do not invent facts or use outside knowledge.
2) Every statement taken from a source MUST reference it inline as [docN], where N is the number shown in the source label.
3) When a statement uses several sources, list each separately, e.g. [doc1][doc3]. Never write ranges or decimals such as [doc1-3] or [doc1.2].
4) If the sources do not answer the question, set "answer" to "{no_answer}".
5) Answer in {language}. Keep it under 500 characters.

Question:
{question}

{sources_block}

Output:
Respond with JSON only, in the form {{"answer": "<text with [docN] references>"}}.
"#,
        no_answer = super::NO_ANSWER,
    )
}
