//! Article archive and research history tests

use regex::Regex;
use scrivener_core::{ErrorKind, GeneratedDocument, ResearchResult, SourceDocument};
use scrivener_research::{slugify, ArticleArchive, OutputFormat};
use tempfile::TempDir;

fn document(topic: &str) -> GeneratedDocument {
    let research = ResearchResult {
        answer: None,
        sources: vec![SourceDocument::new("A", "urlA", "content")],
        response_time_seconds: None,
    };
    GeneratedDocument::assemble(topic, "Line one\nLine two", &research)
}

#[test]
fn test_slug_shape() {
    let pattern = Regex::new(r"^[a-z0-9_]*$").unwrap();
    let repeated = Regex::new(r"__").unwrap();

    for topic in [
        "AI Trends 2024",
        "What's new in Rust?!",
        "C++ vs. Go: a comparison",
        "émigré café",
        "a/b\\c..d",
    ] {
        let slug = slugify(topic);
        assert!(pattern.is_match(&slug), "bad slug {:?} for {:?}", slug, topic);
        assert!(!repeated.is_match(&slug), "repeated separator in {:?}", slug);
    }
}

#[tokio::test]
async fn test_persist_creates_directory_and_names_file() {
    let temp_dir = TempDir::new().unwrap();
    let archive = ArticleArchive::new(temp_dir.path().join("nested").join("articles"));

    let path = archive
        .persist_at("Test@Topic#1", &document("Test@Topic#1"), OutputFormat::Markdown, 1700000000000)
        .await
        .unwrap();

    assert_eq!(
        path.file_name().unwrap().to_str().unwrap(),
        "research_test_topic_1_1700000000000.md"
    );
    assert!(path.exists());
}

#[tokio::test]
async fn test_persist_html_wraps_body() {
    let temp_dir = TempDir::new().unwrap();
    let archive = ArticleArchive::new(temp_dir.path());

    let path = archive
        .persist_at("web topic", &document("web topic"), OutputFormat::Html, 42)
        .await
        .unwrap();

    let content = tokio::fs::read_to_string(&path).await.unwrap();
    assert!(path.to_str().unwrap().ends_with("research_web_topic_42.html"));
    assert!(content.contains("<title>web topic</title>"));
    assert!(content.contains("Line one<br>Line two"));
    assert!(content.contains("## Sources<br>[1] [A](urlA)"));
}

#[tokio::test]
async fn test_empty_body_is_persistence_error() {
    let temp_dir = TempDir::new().unwrap();
    let archive = ArticleArchive::new(temp_dir.path());
    let empty = GeneratedDocument {
        topic: "topic".to_string(),
        body: "  ".to_string(),
        sources: Vec::new(),
    };

    let error = archive
        .persist("topic", &empty, OutputFormat::Text)
        .await
        .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Persistence);
}

#[tokio::test]
async fn test_unwritable_directory_is_persistence_error() {
    let temp_dir = TempDir::new().unwrap();
    let blocker = temp_dir.path().join("not_a_dir");
    std::fs::write(&blocker, "file").unwrap();
    let archive = ArticleArchive::new(&blocker);

    let error = archive
        .persist("topic", &document("topic"), OutputFormat::Markdown)
        .await
        .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Persistence);
    assert!(!error.cause_chain().is_empty());
}

#[tokio::test]
async fn test_history_is_empty_without_directory() {
    let temp_dir = TempDir::new().unwrap();
    let archive = ArticleArchive::new(temp_dir.path().join("missing"));

    assert!(archive.list_history().await.is_empty());
}

#[tokio::test]
async fn test_history_lists_newest_first_and_skips_foreign_files() {
    let temp_dir = TempDir::new().unwrap();
    let archive = ArticleArchive::new(temp_dir.path());

    archive
        .persist_at("older topic", &document("older topic"), OutputFormat::Markdown, 1000)
        .await
        .unwrap();
    archive
        .persist_at("Newer Topic!", &document("Newer Topic!"), OutputFormat::Text, 2000)
        .await
        .unwrap();
    std::fs::write(temp_dir.path().join("notes.md"), "unrelated").unwrap();
    std::fs::write(temp_dir.path().join("research_broken_name.md"), "unrelated").unwrap();

    let history = archive.list_history().await;

    assert_eq!(history.len(), 2);
    assert_eq!(history[0].query, "newer topic ");
    assert_eq!(history[0].timestamp_millis, 2000);
    assert_eq!(history[0].format, OutputFormat::Text);
    assert_eq!(history[1].query, "older topic");
    assert_eq!(history[1].filename, "research_older_topic_1000.md");
}

#[tokio::test]
async fn test_read_article_round_trip_and_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let archive = ArticleArchive::new(temp_dir.path());
    let doc = document("round trip");

    let path = archive
        .persist("round trip", &doc, OutputFormat::Markdown)
        .await
        .unwrap();
    let filename = path.file_name().unwrap().to_str().unwrap();

    assert_eq!(archive.read_article(filename).await.unwrap(), doc.body);

    let missing = archive.read_article("research_nothing_1.md").await.unwrap_err();
    assert_eq!(missing.kind(), ErrorKind::Persistence);

    let escape = archive.read_article("../etc/passwd").await.unwrap_err();
    assert_eq!(escape.kind(), ErrorKind::Validation);
}
