//! Pipeline orchestration: search, synthesize, cite
//!
//! Each stage feeds the next and the first failure ends the run. The
//! orchestrator itself never touches the disk; persisting is a separate step
//! taken only after a complete run.

use crate::search::WebSearcher;
use crate::storage::{ArticleArchive, OutputFormat};
use crate::synthesizer::ArticleSynthesizer;
use scrivener_core::{
    log_operation_error, log_operation_start, log_operation_success, performance, validation_error,
    GeneratedDocument, ScrivenerResult,
};
use std::path::PathBuf;
use std::sync::Arc;

const COMPONENT: &str = "article_pipeline";

/// A generated document and where it was saved
#[derive(Debug, Clone)]
pub struct PersistedArticle {
    pub document: GeneratedDocument,
    pub path: PathBuf,
}

/// Search -> synthesize -> cite
pub struct ArticlePipeline {
    searcher: Arc<dyn WebSearcher>,
    synthesizer: ArticleSynthesizer,
}

impl ArticlePipeline {
    pub fn new(searcher: Arc<dyn WebSearcher>, synthesizer: ArticleSynthesizer) -> Self {
        Self {
            searcher,
            synthesizer,
        }
    }

    pub fn synthesizer(&self) -> &ArticleSynthesizer {
        &self.synthesizer
    }

    /// Run the whole pipeline for one topic
    pub async fn run(&self, topic: &str, style: &str) -> ScrivenerResult<GeneratedDocument> {
        let topic = validate_topic(topic)?;
        log_operation_start!("generate_article", topic = %topic, style = %style);

        let research = performance::measure_async(
            "search",
            self.searcher.search(topic),
        )
        .await
        .map_err(|e| {
            log_operation_error!("search", e, backend = %self.searcher.name());
            e
        })?;

        let prose = performance::measure_async(
            "synthesize",
            self.synthesizer.synthesize(topic, &research, style),
        )
        .await
        .map_err(|e| {
            log_operation_error!("synthesize", e);
            e
        })?;

        let document = GeneratedDocument::assemble(topic, &prose, &research);

        log_operation_success!(
            "generate_article",
            topic = %topic,
            sources = document.sources.len(),
            chars = document.body.len()
        );
        Ok(document)
    }

    /// Run the pipeline and persist the result; nothing is written on failure
    pub async fn generate_and_persist(
        &self,
        topic: &str,
        style: &str,
        format: OutputFormat,
        archive: &ArticleArchive,
    ) -> ScrivenerResult<PersistedArticle> {
        let document = self.run(topic, style).await?;
        let path = archive.persist(&document.topic, &document, format).await?;
        Ok(PersistedArticle { document, path })
    }
}

fn validate_topic(topic: &str) -> ScrivenerResult<&str> {
    let trimmed = topic.trim();
    if trimmed.is_empty() {
        return Err(validation_error!(
            "Topic must not be empty or whitespace",
            "topic",
            COMPONENT
        )
        .with_operation("validate_topic"));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrivener_core::ErrorKind;

    #[test]
    fn test_validate_topic() {
        assert_eq!(validate_topic("  ai trends ").unwrap(), "ai trends");
        assert_eq!(validate_topic("").unwrap_err().kind(), ErrorKind::Validation);
        assert_eq!(
            validate_topic(" \t\n").unwrap_err().kind(),
            ErrorKind::Validation
        );
    }
}
