//! Translation between the chat wire format and a one-shot text-completion provider.

mod prompt;
mod wire;

pub use prompt::{PromptBuilder, DEFAULT_INSTRUCTIONS, HISTORY_HEADER};
pub use wire::{
    ChatCompletion, ChatMessage, ChatRequest, ChatRole, CompletionChoice, CompletionMessage,
    ErrorBody,
};

use std::sync::Arc;
use tracing::debug;

use crate::error::{CoachError, Result};
use crate::llm::LlmClient;

/// Stateless: every call builds its prompt from the request alone.
pub struct ProviderAdapter {
    client: Arc<dyn LlmClient>,
    instructions: String,
}

impl ProviderAdapter {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            client,
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    /// Render the request as a single prompt. The last message is always the user's question.
    pub fn build_prompt(&self, request: &ChatRequest) -> Result<String> {
        let (last, prior) = request
            .messages
            .split_last()
            .ok_or_else(|| CoachError::InvalidRequest("Messages array is required".into()))?;

        Ok(PromptBuilder::new()
            .with_instructions(self.instructions.clone())
            .with_problem(request.problem_context.clone())
            .with_history(prior.to_vec())
            .with_question(last.content.clone())
            .build())
    }

    pub async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion> {
        let prompt = self.build_prompt(request)?;
        debug!(
            messages = request.messages.len(),
            has_problem = request.problem_context.is_some(),
            prompt_chars = prompt.len(),
            "sending prompt to provider"
        );

        let text = self.client.generate(&prompt).await?;
        Ok(ChatCompletion::from_text(text))
    }
}
