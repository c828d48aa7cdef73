//! Scrivener Research - research-backed article generation
//!
//! The pipeline searches the web for a topic, asks an LLM to write an
//! article from the findings and appends the cited sources:
//!
//! - [`search`]: web search backends ([`WebSearcher`], Tavily)
//! - [`synthesizer`] and [`prompts`]: prompt assembly and generation
//! - [`storage`] and [`history`]: the on-disk article archive
//! - [`pipeline`]: orchestration of the stages above

pub mod history;
pub mod llm_client;
pub mod pipeline;
pub mod prompts;
pub mod search;
pub mod storage;
pub mod synthesizer;

pub use history::{parse_archive_filename, HistoryEntry};
pub use llm_client::{SiumaiTextGenerator, TextGenerator};
pub use pipeline::{ArticlePipeline, PersistedArticle};
pub use prompts::{PromptRegistry, PromptStyle, PromptTemplate};
pub use search::{TavilySearchClient, WebSearcher};
pub use storage::{archive_filename, slugify, ArticleArchive, OutputFormat};
pub use synthesizer::{format_research, ArticleSynthesizer};
