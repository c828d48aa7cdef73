//! Article synthesis
//!
//! Builds a bounded research summary, renders the chosen prompt template and
//! hands it to a [`TextGenerator`]. The generated prose is returned untouched.

use crate::llm_client::TextGenerator;
use crate::prompts::PromptRegistry;
use scrivener_core::{synthesis_error, validation_error, ResearchResult, ScrivenerResult};
use std::sync::Arc;
use tracing::{debug, info};

/// Characters of each source's content embedded in the prompt
pub const CONTENT_PREVIEW_CHARS: usize = 300;

const COMPONENT: &str = "article_synthesizer";

/// Render the research summary substituted for `{researchData}`.
///
/// Only the cited sources are included and each source's content is cut to
/// [`CONTENT_PREVIEW_CHARS`] characters.
pub fn format_research(topic: &str, research: &ResearchResult) -> String {
    let mut formatted = format!("# Research on: {}\n\n", topic);

    if let Some(answer) = research.answer.as_deref().filter(|a| !a.trim().is_empty()) {
        formatted.push_str(&format!("## Key Answer\n{}\n\n", answer));
    }

    formatted.push_str("## Research Sources\n");
    for (index, source) in research.cited_sources().iter().enumerate() {
        let preview: String = source.content.chars().take(CONTENT_PREVIEW_CHARS).collect();
        formatted.push_str(&format!("{}. {}\n", index + 1, source.title));
        formatted.push_str(&format!("   Content: {}...\n", preview));
        formatted.push_str(&format!("   URL: {}\n\n", source.url));
    }

    formatted
}

/// Research synthesizer that turns search results into article prose
pub struct ArticleSynthesizer {
    generator: Arc<dyn TextGenerator>,
    registry: PromptRegistry,
}

impl ArticleSynthesizer {
    /// Create a synthesizer with the built-in prompt templates
    pub fn new(generator: Arc<dyn TextGenerator>) -> ScrivenerResult<Self> {
        Ok(Self::with_registry(generator, PromptRegistry::builtin()?))
    }

    pub fn with_registry(generator: Arc<dyn TextGenerator>, registry: PromptRegistry) -> Self {
        Self {
            generator,
            registry,
        }
    }

    pub fn registry(&self) -> &PromptRegistry {
        &self.registry
    }

    /// Assemble the full prompt for a topic and style
    pub fn build_prompt(
        &self,
        topic: &str,
        research: &ResearchResult,
        style: &str,
    ) -> ScrivenerResult<String> {
        let template = self.registry.resolve(style)?;
        debug!("Using '{}' prompt template", template.style());
        Ok(template.render(topic, &format_research(topic, research)))
    }

    /// Generate article prose for a topic
    pub async fn synthesize(
        &self,
        topic: &str,
        research: &ResearchResult,
        style: &str,
    ) -> ScrivenerResult<String> {
        if topic.trim().is_empty() {
            return Err(validation_error!("Topic must not be empty", "topic", COMPONENT));
        }

        // Checked before the prompt is built so a missing key never reaches the network
        self.generator.ensure_credentials()?;

        let prompt = self.build_prompt(topic, research, style)?;

        info!(
            "Synthesizing article for '{}' with {} ({} sources)",
            topic,
            self.generator.describe(),
            research.cited_sources().len()
        );

        let prose = self.generator.generate(&prompt).await?;
        if prose.trim().is_empty() {
            return Err(
                synthesis_error!("Generation API returned an empty response", COMPONENT)
                    .with_operation("synthesize"),
            );
        }

        Ok(prose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrivener_core::SourceDocument;

    fn research_with(sources: Vec<SourceDocument>, answer: Option<&str>) -> ResearchResult {
        ResearchResult {
            answer: answer.map(str::to_string),
            sources,
            response_time_seconds: None,
        }
    }

    #[test]
    fn test_format_research_truncates_content() {
        let long = "x".repeat(1000);
        let research = research_with(vec![SourceDocument::new("Long", "https://l", long)], None);

        let formatted = format_research("topic", &research);
        let expected = format!("   Content: {}...\n", "x".repeat(CONTENT_PREVIEW_CHARS));
        assert!(formatted.contains(&expected));
        assert!(!formatted.contains(&"x".repeat(CONTENT_PREVIEW_CHARS + 1)));
    }

    #[test]
    fn test_format_research_truncates_on_char_boundaries() {
        let research = research_with(
            vec![SourceDocument::new("Accents", "https://a", "é".repeat(400))],
            None,
        );

        let formatted = format_research("topic", &research);
        assert!(formatted.contains(&format!("Content: {}...", "é".repeat(300))));
    }

    #[test]
    fn test_format_research_caps_sources_and_includes_answer() {
        let sources = (1..=5)
            .map(|i| SourceDocument::new(format!("Title {}", i), format!("https://{}", i), "c"))
            .collect();
        let research = research_with(sources, Some("The short answer"));

        let formatted = format_research("ai trends", &research);
        assert!(formatted.starts_with("# Research on: ai trends\n\n## Key Answer\nThe short answer\n\n"));
        assert!(formatted.contains("3. Title 3\n"));
        assert!(!formatted.contains("Title 4"));
        assert!(formatted.contains("   URL: https://1\n\n"));
    }

    #[test]
    fn test_format_research_omits_missing_answer() {
        let formatted = format_research("t", &research_with(Vec::new(), None));
        assert_eq!(formatted, "# Research on: t\n\n## Research Sources\n");
    }
}
