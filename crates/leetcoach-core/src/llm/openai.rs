use serde::Serialize;
use std::time::Duration;

use crate::adapter::{ChatCompletion, ChatMessage};
use crate::error::{CoachError, Result};
use crate::llm::traits::*;

/// OpenAI-compatible `chat/completions` backend. The prompt goes out as one user message.
pub struct OpenAIClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    generation: GenerationConfig,
}

impl OpenAIClient {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder().timeout(timeout).build()?,
            api_key: api_key.into(),
            model: "gpt-4o".to_string(),
            base_url: "https://api.openai.com".to_string(),
            generation: GenerationConfig::default(),
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_generation(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }
}

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[async_trait::async_trait]
impl LlmClient for OpenAIClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'));

        let request_body = OpenAIRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user(prompt)],
            temperature: self.generation.temperature,
            max_tokens: self.generation.max_output_tokens,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            return Err(CoachError::provider(format!(
                "OpenAI API error ({}): {}",
                status, response_text
            )));
        }

        let completion: ChatCompletion = serde_json::from_str(&response_text)
            .map_err(|e| CoachError::malformed(format!("Failed to parse response: {e}")))?;

        completion
            .text()
            .map(str::to_string)
            .ok_or_else(|| CoachError::malformed("No response from API"))
    }
}
