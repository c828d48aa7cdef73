//! LLM client integration using siumai
//!
//! The synthesizer talks to a [`TextGenerator`]; [`SiumaiTextGenerator`] is
//! the production implementation and supports several providers through the
//! siumai framework.

use async_trait::async_trait;
use scrivener_core::{
    config_error, synthesis_error, with_timeout, ErrorKind, LlmConfig, ScrivenerResult,
};
use siumai::prelude::*;
use std::time::Instant;
use tracing::{debug, info};

const COMPONENT: &str = "llm_client";

/// Single-prompt text generation backend
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Fail before any network traffic when a required credential is missing
    fn ensure_credentials(&self) -> ScrivenerResult<()> {
        Ok(())
    }

    /// Send one prompt and return the generated text verbatim
    async fn generate(&self, prompt: &str) -> ScrivenerResult<String>;

    /// Provider/model summary for logs
    fn describe(&self) -> String;
}

/// Text generator backed by a siumai client
pub struct SiumaiTextGenerator {
    config: LlmConfig,
}

impl SiumaiTextGenerator {
    pub fn new(config: LlmConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn api_key(&self) -> ScrivenerResult<Option<String>> {
        if !self.config.requires_api_key() {
            return Ok(None);
        }

        match self.config.resolved_api_key() {
            Some(key) => Ok(Some(key)),
            None => Err(config_error!(
                format!(
                    "{} API key not found; set {} or llm.api_key",
                    self.config.provider,
                    self.config.api_key_env_var().unwrap_or("llm.api_key_env")
                ),
                COMPONENT
            )
            .with_operation("resolve_api_key")),
        }
    }

    /// Build the appropriate siumai client based on configuration
    async fn build_client(&self, api_key: Option<String>) -> ScrivenerResult<Box<dyn LlmClient>> {
        let config = &self.config;
        let api_key = api_key.unwrap_or_default();

        let build_failed = |provider: &str, e: LlmError| {
            synthesis_error!(
                format!("Failed to build {} client: {}", provider, e),
                COMPONENT,
                e
            )
            .with_operation("build_client")
        };

        match config.provider.as_str() {
            "gemini" => {
                let mut builder = LlmBuilder::new()
                    .gemini()
                    .api_key(&api_key)
                    .model(&config.model)
                    .temperature(config.temperature);

                // The Gemini builder takes a signed token count
                if let Some(max_tokens) = signed_max_tokens(config.max_tokens)? {
                    builder = builder.max_tokens(max_tokens);
                }

                let client = builder
                    .build()
                    .await
                    .map_err(|e| build_failed("Gemini", e))?;

                Ok(Box::new(client))
            }
            "openai" => {
                let mut builder = LlmBuilder::new()
                    .openai()
                    .api_key(&api_key)
                    .model(&config.model)
                    .temperature(config.temperature);

                if let Some(max_tokens) = config.max_tokens {
                    builder = builder.max_tokens(max_tokens);
                }

                if let Some(base_url) = &config.base_url {
                    builder = builder.base_url(base_url);
                }

                let client = builder
                    .build()
                    .await
                    .map_err(|e| build_failed("OpenAI", e))?;

                Ok(Box::new(client))
            }
            "anthropic" => {
                let mut builder = LlmBuilder::new()
                    .anthropic()
                    .api_key(&api_key)
                    .model(&config.model)
                    .temperature(config.temperature);

                if let Some(max_tokens) = config.max_tokens {
                    builder = builder.max_tokens(max_tokens);
                }

                let client = builder
                    .build()
                    .await
                    .map_err(|e| build_failed("Anthropic", e))?;

                Ok(Box::new(client))
            }
            "groq" => {
                let mut builder = LlmBuilder::new()
                    .groq()
                    .api_key(&api_key)
                    .model(&config.model)
                    .temperature(config.temperature);

                if let Some(max_tokens) = config.max_tokens {
                    builder = builder.max_tokens(max_tokens);
                }

                let client = builder
                    .build()
                    .await
                    .map_err(|e| build_failed("Groq", e))?;

                Ok(Box::new(client))
            }
            "ollama" => {
                let base_url = config
                    .base_url
                    .clone()
                    .unwrap_or_else(|| "http://localhost:11434".to_string());

                let mut builder = LlmBuilder::new()
                    .ollama()
                    .model(&config.model)
                    .base_url(&base_url)
                    .temperature(config.temperature);

                if let Some(max_tokens) = config.max_tokens {
                    builder = builder.max_tokens(max_tokens);
                }

                let client = builder
                    .build()
                    .await
                    .map_err(|e| build_failed("Ollama", e))?;

                Ok(Box::new(client))
            }
            provider => Err(config_error!(
                format!("Unsupported LLM provider: {}", provider),
                COMPONENT
            )
            .with_operation("build_client")),
        }
    }
}

fn signed_max_tokens(max_tokens: Option<u32>) -> ScrivenerResult<Option<i32>> {
    max_tokens
        .map(|tokens| {
            i32::try_from(tokens).map_err(|e| {
                config_error!(
                    format!("llm.max_tokens {} is out of range for this provider", tokens),
                    COMPONENT,
                    e
                )
                .with_operation("build_client")
            })
        })
        .transpose()
}

#[async_trait]
impl TextGenerator for SiumaiTextGenerator {
    fn ensure_credentials(&self) -> ScrivenerResult<()> {
        self.api_key().map(|_| ())
    }

    async fn generate(&self, prompt: &str) -> ScrivenerResult<String> {
        let api_key = self.api_key()?;
        let client = self.build_client(api_key).await?;

        let start_time = Instant::now();
        debug!("Generating response for a {} char prompt", prompt.len());

        let messages = vec![ChatMessage::user(prompt).build()];
        let response = with_timeout(
            client.chat(messages),
            self.config.timeout_seconds * 1000,
            "llm_chat",
            ErrorKind::Synthesis,
        )
        .await?
        .map_err(|e| {
            synthesis_error!(format!("Article generation failed: {}", e), COMPONENT, e)
                .with_operation("chat")
        })?;

        match response.content_text() {
            Some(content) if !content.trim().is_empty() => {
                info!(
                    "Generated response in {:?} ({} chars)",
                    start_time.elapsed(),
                    content.len()
                );
                Ok(content.to_string())
            }
            _ => Err(
                synthesis_error!("Generation API returned an empty response", COMPONENT)
                    .with_operation("chat"),
            ),
        }
    }

    fn describe(&self) -> String {
        format!(
            "{}/{} (temp: {:.1})",
            self.config.provider, self.config.model, self.config.temperature
        )
    }
}
