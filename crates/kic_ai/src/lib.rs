pub mod answer;
pub mod citation;
pub mod guardrails;
pub mod llm;
