//! Article archive on the local filesystem
//!
//! Files are named `research_<slug>_<epoch millis>.<ext>` and written once.

use chrono::Utc;
use scrivener_core::{
    persistence_error, validation_error, GeneratedDocument, ScrivenerResult,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::fs;
use tracing::{debug, info};

pub const FILE_PREFIX: &str = "research_";

const COMPONENT: &str = "article_archive";

/// Output format of an archived article
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Markdown,
    Html,
    Text,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Markdown, OutputFormat::Html, OutputFormat::Text];

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Html => "html",
            OutputFormat::Text => "txt",
        }
    }

    pub fn from_extension(extension: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.extension() == extension)
    }

    /// Render the article body for this format.
    ///
    /// Markdown and text pass through unchanged. HTML wraps the raw body in a
    /// fixed page, turning every newline into a `<br>`.
    pub fn render(&self, topic: &str, body: &str) -> String {
        match self {
            OutputFormat::Markdown | OutputFormat::Text => body.to_string(),
            OutputFormat::Html => format!(
                r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{}</title>
    <style>
        body {{ font-family: Arial, sans-serif; line-height: 1.6; max-width: 800px; margin: 0 auto; padding: 20px; }}
        h1, h2, h3 {{ color: #333; }}
        a {{ color: #0066cc; }}
    </style>
</head>
<body>
{}
</body>
</html>
"#,
                escape_html(topic),
                body.replace('\n', "<br>")
            ),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "md" | "markdown" => Ok(OutputFormat::Markdown),
            "html" => Ok(OutputFormat::Html),
            "txt" | "text" => Ok(OutputFormat::Text),
            other => Err(format!("unknown output format: {} (expected md, html or txt)", other)),
        }
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Lowercase the topic and collapse every run of non-alphanumeric ASCII
/// characters into a single underscore.
pub fn slugify(topic: &str) -> String {
    let mut slug = String::with_capacity(topic.len());
    let mut in_separator = false;

    for c in topic.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            in_separator = false;
        } else if !in_separator {
            slug.push('_');
            in_separator = true;
        }
    }

    slug
}

/// Compose the archive filename for a topic
pub fn archive_filename(topic: &str, timestamp_millis: i64, format: OutputFormat) -> String {
    format!(
        "{}{}_{}.{}",
        FILE_PREFIX,
        slugify(topic),
        timestamp_millis,
        format.extension()
    )
}

/// Filesystem archive of generated articles
#[derive(Debug, Clone)]
pub struct ArticleArchive {
    root: PathBuf,
}

impl ArticleArchive {
    /// The directory is created lazily on first write
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist a document using the current time
    pub async fn persist(
        &self,
        topic: &str,
        document: &GeneratedDocument,
        format: OutputFormat,
    ) -> ScrivenerResult<PathBuf> {
        self.persist_at(topic, document, format, Utc::now().timestamp_millis())
            .await
    }

    /// Persist a document under an explicit timestamp
    pub async fn persist_at(
        &self,
        topic: &str,
        document: &GeneratedDocument,
        format: OutputFormat,
        timestamp_millis: i64,
    ) -> ScrivenerResult<PathBuf> {
        if topic.trim().is_empty() {
            return Err(
                persistence_error!("Cannot save an article without a topic", COMPONENT)
                    .with_operation("persist"),
            );
        }
        if document.body.trim().is_empty() {
            return Err(
                persistence_error!("Cannot save an empty article", COMPONENT)
                    .with_operation("persist"),
            );
        }

        let filename = archive_filename(topic, timestamp_millis, format);
        let path = self.root.join(&filename);
        let content = format.render(topic, &document.body);

        fs::create_dir_all(&self.root).await.map_err(|e| {
            persistence_error!(
                format!(
                    "Failed to create output directory {}: {}",
                    self.root.display(),
                    e
                ),
                COMPONENT,
                e
            )
            .with_operation("create_dir")
        })?;

        fs::write(&path, content).await.map_err(|e| {
            persistence_error!(
                format!("Failed to save article to {}: {}", path.display(), e),
                COMPONENT,
                e
            )
            .with_operation("write_file")
        })?;

        info!("Saved article to {}", path.display());
        Ok(path)
    }

    /// Path of an archived file, refusing anything outside the archive
    pub fn path_for(&self, filename: &str) -> ScrivenerResult<PathBuf> {
        let filename = filename.trim();
        if filename.is_empty()
            || filename.contains('/')
            || filename.contains('\\')
            || filename.contains("..")
        {
            return Err(validation_error!(
                format!("Invalid article filename: '{}'", filename),
                "filename",
                COMPONENT
            ));
        }

        Ok(self.root.join(filename))
    }

    /// Read an archived article back (the `view` operation)
    pub async fn read_article(&self, filename: &str) -> ScrivenerResult<String> {
        let path = self.path_for(filename)?;
        debug!("Reading article from {}", path.display());

        fs::read_to_string(&path).await.map_err(|e| {
            persistence_error!(
                format!("Failed to read article {}: {}", path.display(), e),
                COMPONENT,
                e
            )
            .with_operation("read_file")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_collapses_runs() {
        assert_eq!(slugify("AI Trends"), "ai_trends");
        assert_eq!(slugify("test@topic#1"), "test_topic_1");
        assert_eq!(slugify("rust -- async / await"), "rust_async_await");
        assert_eq!(slugify("  padded  "), "_padded_");
        assert_eq!(slugify("Café"), "caf_");
    }

    #[test]
    fn test_archive_filename() {
        assert_eq!(
            archive_filename("ai trends", 1700000000123, OutputFormat::Html),
            "research_ai_trends_1700000000123.html"
        );
    }

    #[test]
    fn test_html_render() {
        let html = OutputFormat::Html.render("ai trends", "line1\nline2");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<meta charset=\"UTF-8\">"));
        assert!(html.contains("<title>ai trends</title>"));
        assert!(html.contains("line1<br>line2"));
        assert!(html.contains("<style>"));
    }

    #[test]
    fn test_html_title_is_escaped() {
        let html = OutputFormat::Html.render("R&D <2024>", "body");
        assert!(html.contains("<title>R&amp;D &lt;2024&gt;</title>"));
    }

    #[test]
    fn test_plain_formats_pass_through() {
        let body = "# Title\n\nSome *markdown*\n";
        assert_eq!(OutputFormat::Markdown.render("t", body), body);
        assert_eq!(OutputFormat::Text.render("t", body), body);
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("MD".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!("pdf".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::from_extension("html"), Some(OutputFormat::Html));
        assert_eq!(OutputFormat::from_extension("json"), None);
    }

    #[test]
    fn test_path_for_rejects_traversal() {
        let archive = ArticleArchive::new("articles");
        assert!(archive.path_for("../secret.md").is_err());
        assert!(archive.path_for("nested/file.md").is_err());
        assert!(archive.path_for("").is_err());
        assert_eq!(
            archive.path_for("research_a_1.md").unwrap(),
            PathBuf::from("articles").join("research_a_1.md")
        );
    }
}
