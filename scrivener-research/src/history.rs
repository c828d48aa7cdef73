//! Research history read back from the article archive
//!
//! Reading history is best effort: any I/O failure yields an empty list.

use crate::storage::{ArticleArchive, OutputFormat, FILE_PREFIX};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, warn};

/// One archived article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub filename: String,
    /// Topic reconstructed from the slug, underscores read back as spaces
    pub query: String,
    pub timestamp_millis: i64,
    pub format: OutputFormat,
}

impl HistoryEntry {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp_millis).single()
    }
}

/// Parse `research_<slug>_<millis>.<ext>`.
///
/// The timestamp is the segment after the last underscore and must be an
/// integer; anything else is not an archive file. The original topic's case
/// and punctuation are not recoverable.
pub fn parse_archive_filename(filename: &str) -> Option<HistoryEntry> {
    let rest = filename.strip_prefix(FILE_PREFIX)?;
    let (stem, extension) = rest.rsplit_once('.')?;
    let format = OutputFormat::from_extension(extension)?;
    let (slug, timestamp) = stem.rsplit_once('_')?;

    if timestamp.is_empty() || !timestamp.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let timestamp_millis = timestamp.parse().ok()?;

    Some(HistoryEntry {
        filename: filename.to_string(),
        query: slug.split('_').collect::<Vec<_>>().join(" "),
        timestamp_millis,
        format,
    })
}

impl ArticleArchive {
    /// List archived articles, newest first. Never fails.
    pub async fn list_history(&self) -> Vec<HistoryEntry> {
        let mut entries = match fs::read_dir(self.root()).await {
            Ok(entries) => entries,
            Err(e) => {
                debug!(
                    "No research history available at {}: {}",
                    self.root().display(),
                    e
                );
                return Vec::new();
            }
        };

        let mut history = Vec::new();
        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => {
                    let Some(filename) = entry.file_name().to_str().map(str::to_string) else {
                        continue;
                    };
                    match parse_archive_filename(&filename) {
                        Some(record) => history.push(record),
                        None => debug!("Skipping non-archive file: {}", filename),
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("Failed to read research history: {}", e);
                    return Vec::new();
                }
            }
        }

        history.sort_by(|a, b| {
            b.timestamp_millis
                .cmp(&a.timestamp_millis)
                .then_with(|| a.filename.cmp(&b.filename))
        });
        history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_multi_word_slug() {
        let entry = parse_archive_filename("research_ai_trends_in_2024_1700000000123.md").unwrap();
        assert_eq!(entry.query, "ai trends in 2024");
        assert_eq!(entry.timestamp_millis, 1700000000123);
        assert_eq!(entry.format, OutputFormat::Markdown);
        assert_eq!(
            entry.created_at().unwrap().timestamp_millis(),
            1700000000123
        );
    }

    #[test]
    fn test_parse_rejects_foreign_files() {
        assert!(parse_archive_filename("notes.md").is_none());
        assert!(parse_archive_filename("research_topic_abc.md").is_none());
        assert!(parse_archive_filename("research_topic_123.pdf").is_none());
        assert!(parse_archive_filename("research_123").is_none());
        assert!(parse_archive_filename("research_topic_.md").is_none());
    }

    #[test]
    fn test_parse_keeps_html_and_text() {
        let html = parse_archive_filename("research_web_1.html").unwrap();
        assert_eq!(html.format, OutputFormat::Html);
        let text = parse_archive_filename("research_web_2.txt").unwrap();
        assert_eq!(text.format, OutputFormat::Text);
        assert_eq!(text.query, "web");
    }
}
