use crate::error::CoachError;

/// A one-shot text-completion provider. Holds no conversation state between calls.
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    /// Send one prompt and return the completion text.
    ///
    /// A response without completion text is a `MalformedOutput` error, never an empty string.
    async fn generate(&self, prompt: &str) -> Result<String, CoachError>;
}

/// Sampling parameters shared by every provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_output_tokens: 1000,
        }
    }
}
