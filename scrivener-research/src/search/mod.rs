//! Search clients
//!
//! A search client turns a topic into a [`ResearchResult`] with a single
//! outbound call. Failures are reported as `Search` errors and never retried.

use async_trait::async_trait;
use scrivener_core::{ResearchResult, ScrivenerResult};

pub mod tavily;

pub use tavily::TavilySearchClient;

/// Web search backend used by the pipeline
#[async_trait]
pub trait WebSearcher: Send + Sync {
    /// Research a topic
    async fn search(&self, topic: &str) -> ScrivenerResult<ResearchResult>;

    /// Short name used in logs
    fn name(&self) -> &str;
}
