//! Configuration management

use crate::error::{ErrorContext, ScrivenerError, ScrivenerResult};
use crate::types::{LlmConfig, OutputConfig, ScrivenerConfig, SearchConfig};

use std::path::Path;
use tracing::{debug, info};

pub const DEFAULT_SEARCH_URL: &str = "https://api.tavily.com/search";
pub const DEFAULT_OUTPUT_DIR: &str = "articles";
pub const DEFAULT_CONFIG_FILE: &str = "scrivener.toml";

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_SEARCH_URL.to_string(),
            api_key: None,
            api_key_env: "TAVILY_API_KEY".to_string(),
            timeout_seconds: 30,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-1.5-flash".to_string(),
            api_key: None,
            api_key_env: None,
            base_url: None,
            temperature: 0.7,
            max_tokens: None,
            timeout_seconds: 120,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: DEFAULT_OUTPUT_DIR.to_string(),
        }
    }
}

/// Explicit key first, then the environment; blank values count as absent.
fn resolve_credential(explicit: Option<&str>, env_var: Option<&str>) -> Option<String> {
    explicit
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .or_else(|| {
            env_var
                .and_then(|name| std::env::var(name).ok())
                .map(|key| key.trim().to_string())
                .filter(|key| !key.is_empty())
        })
}

impl SearchConfig {
    pub fn resolved_api_key(&self) -> Option<String> {
        resolve_credential(self.api_key.as_deref(), Some(&self.api_key_env))
    }
}

impl LlmConfig {
    /// Conventional credential variable for a provider, `None` for keyless providers
    pub fn default_api_key_env(provider: &str) -> Option<&'static str> {
        match provider {
            "gemini" => Some("GOOGLE_AI_API_KEY"),
            "openai" => Some("OPENAI_API_KEY"),
            "anthropic" => Some("ANTHROPIC_API_KEY"),
            "groq" => Some("GROQ_API_KEY"),
            _ => None,
        }
    }

    pub fn requires_api_key(&self) -> bool {
        self.provider != "ollama"
    }

    pub fn api_key_env_var(&self) -> Option<&str> {
        self.api_key_env
            .as_deref()
            .or_else(|| Self::default_api_key_env(&self.provider))
    }

    pub fn resolved_api_key(&self) -> Option<String> {
        resolve_credential(self.api_key.as_deref(), self.api_key_env_var())
    }
}

impl ScrivenerConfig {
    /// Load configuration from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> ScrivenerResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ScrivenerError::Configuration {
            message: format!("Failed to read config file {}: {}", path.display(), e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        let config: ScrivenerConfig =
            toml::from_str(&content).map_err(|e| ScrivenerError::Configuration {
                message: format!("Failed to parse config: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("config")
                    .with_operation("parse_toml")
                    .with_suggestion("Check TOML syntax in config file"),
            })?;

        config.validate()?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Use the given file, or the first existing candidate, or defaults
    pub fn load(path: Option<&Path>, candidates: &[&Path]) -> ScrivenerResult<Self> {
        if let Some(path) = path {
            info!("Loading configuration from {}", path.display());
            return Self::from_file(path);
        }

        for candidate in candidates {
            if candidate.exists() {
                info!("Loading configuration from {}", candidate.display());
                return Self::from_file(candidate);
            }
        }

        info!("No configuration file found, using defaults");
        Ok(Self::default())
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> ScrivenerResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ScrivenerError::Configuration {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config").with_operation("serialize_toml"),
        })?;

        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| ScrivenerError::Configuration {
                    message: format!("Failed to create config directory: {}", e),
                    source: Some(Box::new(e)),
                    context: ErrorContext::new("config").with_operation("create_dir"),
                })?;
            }
        }

        std::fs::write(path, content).map_err(|e| ScrivenerError::Configuration {
            message: format!("Failed to write config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("write_file")
                .with_suggestion("Check if the directory exists and is writable"),
        })?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> ScrivenerResult<()> {
        let invalid = |message: &str, suggestion: &str| ScrivenerError::Configuration {
            message: message.to_string(),
            source: None,
            context: ErrorContext::new("config")
                .with_operation("validate")
                .with_suggestion(suggestion),
        };

        if self.search.api_url.trim().is_empty() {
            return Err(invalid(
                "search.api_url must not be empty",
                "Set search.api_url to the search endpoint",
            ));
        }

        if self.search.timeout_seconds == 0 || self.llm.timeout_seconds == 0 {
            return Err(invalid(
                "Timeouts must be greater than 0",
                "Set search.timeout_seconds and llm.timeout_seconds to positive values",
            ));
        }

        if self.llm.model.trim().is_empty() {
            return Err(invalid("llm.model must not be empty", "Set llm.model"));
        }

        if !matches!(
            self.llm.provider.as_str(),
            "gemini" | "openai" | "anthropic" | "groq" | "ollama"
        ) {
            return Err(invalid(
                &format!("Unsupported LLM provider: {}", self.llm.provider),
                "Use one of: gemini, openai, anthropic, groq, ollama",
            ));
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(invalid(
                "llm.temperature must be between 0.0 and 2.0",
                "Set llm.temperature to a value in range",
            ));
        }

        if self
            .llm
            .max_tokens
            .is_some_and(|tokens| tokens == 0 || tokens > i32::MAX as u32)
        {
            return Err(invalid(
                "llm.max_tokens must be between 1 and 2147483647",
                "Lower llm.max_tokens or remove it to use the provider default",
            ));
        }

        if self.output.directory.trim().is_empty() {
            return Err(invalid(
                "output.directory must not be empty",
                "Set output.directory, e.g. \"articles\"",
            ));
        }

        Ok(())
    }
}
