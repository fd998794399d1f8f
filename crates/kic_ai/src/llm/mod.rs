use kic_core::error::AppError;

/// Text generation backend that produces the raw, marker-bearing answer.
pub trait Llm {
    fn generate(&self, model: &str, prompt: &str) -> Result<String, AppError>;
}
