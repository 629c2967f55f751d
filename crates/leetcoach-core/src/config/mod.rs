use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::error::{CoachError, Result};
use crate::llm::{GeminiClient, GenerationConfig, LlmClient, OpenAIClient};
use crate::problem::{BuiltinCatalog, LeetCodeCatalog, ProblemCatalog};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub provider: ProviderSettings,
    #[serde(default)]
    pub client: ClientSettings,
    #[serde(default)]
    pub lookup: LookupSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    pub model: String,
    pub api_key_env: String,
    pub base_url: Option<String>,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Gemini,
    OpenAI,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Base URL of the chat service. The only place the client learns where to connect.
    pub endpoint: String,
    pub timeout_secs: u64,
    pub context_detection: bool,
    pub show_contacts: bool,
    pub theme: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupSettings {
    pub site: String,
    pub resource: String,
    pub source: LookupSource,
    pub synthesize_unknown: bool,
    pub graphql_url: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LookupSource {
    Builtin,
    LeetCode,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Gemini,
            model: "gemini-1.5-pro".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            base_url: None,
            temperature: 0.7,
            max_output_tokens: 1000,
            timeout_secs: 30,
        }
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8000".to_string(),
            timeout_secs: 30,
            context_detection: true,
            show_contacts: true,
            theme: "light".to_string(),
        }
    }
}

impl Default for LookupSettings {
    fn default() -> Self {
        Self {
            site: "leetcode.com".to_string(),
            resource: "leetcode".to_string(),
            source: LookupSource::Builtin,
            synthesize_unknown: true,
            graphql_url: "https://leetcode.com/graphql".to_string(),
        }
    }
}

impl ProviderSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn generation(&self) -> GenerationConfig {
        GenerationConfig {
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
        }
    }
}

impl ClientSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Settings {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("leetcoach")
            .join("config.toml")
    }

    /// Load from the default location. Falls back to defaults when the file is
    /// missing or unreadable.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => warn!(path = %path.display(), error = %e, "ignoring invalid config"),
                },
                Err(e) => warn!(path = %path.display(), error = %e, "cannot read config"),
            }
        }
        Self::default()
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| CoachError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply environment overrides. Only `PORT` is honored.
    pub fn apply_env(&mut self) {
        if let Ok(port) = std::env::var("PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!(port = %port, "ignoring invalid PORT"),
            }
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Get the API key from the environment variable named in settings.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.provider.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }

    pub fn build_llm_client(&self) -> Result<Arc<dyn LlmClient>> {
        let api_key = self.api_key().ok_or_else(|| {
            CoachError::Config(format!(
                "no API key found in ${}",
                self.provider.api_key_env
            ))
        })?;
        let provider = &self.provider;

        let client: Arc<dyn LlmClient> = match provider.kind {
            ProviderKind::Gemini => {
                let mut client = GeminiClient::new(api_key, provider.timeout())?
                    .with_model(&provider.model)
                    .with_generation(provider.generation());
                if let Some(ref url) = provider.base_url {
                    client = client.with_base_url(url);
                }
                Arc::new(client)
            }
            ProviderKind::OpenAI => {
                let mut client = OpenAIClient::new(api_key, provider.timeout())?
                    .with_model(&provider.model)
                    .with_generation(provider.generation());
                if let Some(ref url) = provider.base_url {
                    client = client.with_base_url(url);
                }
                Arc::new(client)
            }
        };
        Ok(client)
    }

    pub fn build_catalog(&self) -> Result<Arc<dyn ProblemCatalog>> {
        let catalog: Arc<dyn ProblemCatalog> = match self.lookup.source {
            LookupSource::Builtin => Arc::new(
                BuiltinCatalog::new().with_synthesized_unknown(self.lookup.synthesize_unknown),
            ),
            LookupSource::LeetCode => Arc::new(LeetCodeCatalog::new(
                &self.lookup.graphql_url,
                self.provider.timeout(),
            )?),
        };
        Ok(catalog)
    }
}
