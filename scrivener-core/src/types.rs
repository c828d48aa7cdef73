//! Core data type definitions

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};

/// Number of sources used both when building the prompt and when citing.
/// The synthesizer and the citation appender must read the same cap.
pub const SOURCE_LIMIT: usize = 3;

/// Result of a single search call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResearchResult {
    /// Direct answer returned by the search API, if any
    pub answer: Option<String>,
    /// Source documents in the API's relevance order
    pub sources: Vec<SourceDocument>,
    /// Upstream processing time
    pub response_time_seconds: Option<f64>,
}

impl ResearchResult {
    /// The sources that feed the prompt and the citation list
    pub fn cited_sources(&self) -> &[SourceDocument] {
        let end = self.sources.len().min(SOURCE_LIMIT);
        &self.sources[..end]
    }
}

/// A single ranked search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDocument {
    pub title: String,
    pub url: String,
    pub content: String,
    pub relevance_score: Option<f64>,
}

impl SourceDocument {
    pub fn new(title: impl Into<String>, url: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            content: content.into(),
            relevance_score: None,
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.relevance_score = Some(score);
        self
    }
}

/// Synthesized article with its Sources section already appended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedDocument {
    pub topic: String,
    pub body: String,
    pub sources: Vec<SourceDocument>,
}

impl GeneratedDocument {
    /// Append exactly one Sources section to the prose, citing the capped
    /// sources in their original order.
    pub fn assemble(topic: &str, prose: &str, research: &ResearchResult) -> Self {
        let sources = research.cited_sources().to_vec();
        let mut body = String::with_capacity(prose.len() + 64 * sources.len() + 16);
        body.push_str(prose);
        body.push_str(&Self::render_sources(&sources));

        Self {
            topic: topic.to_string(),
            body,
            sources,
        }
    }

    /// Render the Sources section, including its leading blank line
    pub fn render_sources(sources: &[SourceDocument]) -> String {
        let mut section = String::from("\n\n## Sources\n");
        for (index, source) in sources.iter().enumerate() {
            section.push_str(&format!("[{}] [{}]({})\n", index + 1, source.title, source.url));
        }
        section
    }
}

/// Search API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    /// Environment variable consulted when `api_key` is unset
    pub api_key_env: String,
    pub timeout_seconds: u64,
}

/// Generative API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: String,
    pub model: String,
    pub api_key: Option<String>,
    /// Environment variable consulted when `api_key` is unset.
    /// Defaults to the provider's conventional variable.
    pub api_key_env: Option<String>,
    pub base_url: Option<String>,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub timeout_seconds: u64,
}

/// Where archived articles are written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: String,
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrivenerConfig {
    pub search: SearchConfig,
    pub llm: LlmConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(title: &str) -> SourceDocument {
        SourceDocument::new(title, format!("https://example.com/{}", title), "content")
    }

    #[test]
    fn test_cited_sources_are_capped() {
        let research = ResearchResult {
            sources: (0..5).map(|i| source(&i.to_string())).collect(),
            ..Default::default()
        };
        let cited = research.cited_sources();
        assert_eq!(cited.len(), SOURCE_LIMIT);
        assert_eq!(cited[0].title, "0");
        assert_eq!(cited[2].title, "2");

        let short = ResearchResult {
            sources: vec![source("only")],
            ..Default::default()
        };
        assert_eq!(short.cited_sources().len(), 1);
    }

    #[test]
    fn test_assemble_appends_sources_section() {
        let research = ResearchResult {
            answer: None,
            sources: vec![
                SourceDocument::new("A", "urlA", "a"),
                SourceDocument::new("B", "urlB", "b"),
            ],
            response_time_seconds: None,
        };

        let document = GeneratedDocument::assemble("ai trends", "BODY", &research);
        assert_eq!(
            document.body,
            "BODY\n\n## Sources\n[1] [A](urlA)\n[2] [B](urlB)\n"
        );
        assert_eq!(document.sources.len(), 2);
        assert_eq!(document.topic, "ai trends");
    }

    #[test]
    fn test_assemble_without_sources() {
        let document = GeneratedDocument::assemble("t", "BODY", &ResearchResult::default());
        assert_eq!(document.body, "BODY\n\n## Sources\n");
        assert!(document.sources.is_empty());
    }
}
