//! Prompt template registry
//!
//! Templates are plain data with two placeholders, `{topic}` and
//! `{researchData}`. Each must appear exactly once; this is checked when a
//! template is loaded rather than when it is rendered.

use scrivener_core::{config_error, ScrivenerResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

pub const TOPIC_PLACEHOLDER: &str = "{topic}";
pub const RESEARCH_PLACEHOLDER: &str = "{researchData}";

const COMPONENT: &str = "prompt_registry";

/// Named article style
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PromptStyle {
    #[default]
    Default,
    Academic,
    Blog,
    News,
}

impl PromptStyle {
    pub const ALL: [PromptStyle; 4] = [
        PromptStyle::Default,
        PromptStyle::Academic,
        PromptStyle::Blog,
        PromptStyle::News,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PromptStyle::Default => "default",
            PromptStyle::Academic => "academic",
            PromptStyle::Blog => "blog",
            PromptStyle::News => "news",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PromptStyle::Default => "Comprehensive, well-structured article",
            PromptStyle::Academic => "Scholarly article with abstract and literature review",
            PromptStyle::Blog => "Engaging blog post with actionable tips",
            PromptStyle::News => "News article in inverted pyramid structure",
        }
    }

    /// Unknown names fall back to [`PromptStyle::Default`]
    pub fn from_name_or_default(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            warn!("Unknown prompt style '{}', falling back to default", name);
            PromptStyle::Default
        })
    }
}

impl fmt::Display for PromptStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PromptStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(PromptStyle::Default),
            "academic" => Ok(PromptStyle::Academic),
            "blog" => Ok(PromptStyle::Blog),
            "news" => Ok(PromptStyle::News),
            other => Err(format!("unknown prompt style: {}", other)),
        }
    }
}

/// A validated prompt template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    style: PromptStyle,
    body: String,
    topic_at: usize,
    research_at: usize,
}

impl PromptTemplate {
    /// Validate and build a template; each placeholder must occur exactly once
    pub fn new(style: PromptStyle, body: impl Into<String>) -> ScrivenerResult<Self> {
        let body = body.into();
        let topic_at = single_occurrence(&body, TOPIC_PLACEHOLDER, style)?;
        let research_at = single_occurrence(&body, RESEARCH_PLACEHOLDER, style)?;

        Ok(Self {
            style,
            body,
            topic_at,
            research_at,
        })
    }

    pub fn style(&self) -> PromptStyle {
        self.style
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Substitute both placeholders once each.
    ///
    /// Substitution works on the template's recorded offsets, so placeholder
    /// text inside `topic` or `research_data` is never expanded again.
    pub fn render(&self, topic: &str, research_data: &str) -> String {
        let mut slots = [
            (self.topic_at, TOPIC_PLACEHOLDER, topic),
            (self.research_at, RESEARCH_PLACEHOLDER, research_data),
        ];
        slots.sort_by_key(|(at, _, _)| *at);

        let mut rendered =
            String::with_capacity(self.body.len() + topic.len() + research_data.len());
        let mut cursor = 0;
        for (at, placeholder, value) in slots {
            rendered.push_str(&self.body[cursor..at]);
            rendered.push_str(value);
            cursor = at + placeholder.len();
        }
        rendered.push_str(&self.body[cursor..]);
        rendered
    }
}

fn single_occurrence(body: &str, placeholder: &str, style: PromptStyle) -> ScrivenerResult<usize> {
    let mut positions = body.match_indices(placeholder).map(|(at, _)| at);
    match (positions.next(), positions.next()) {
        (Some(at), None) => Ok(at),
        (None, _) => Err(config_error!(
            format!("Prompt template '{}' is missing {}", style, placeholder),
            COMPONENT
        )
        .with_operation("validate_template")),
        (Some(_), Some(_)) => Err(config_error!(
            format!(
                "Prompt template '{}' contains {} more than once",
                style, placeholder
            ),
            COMPONENT
        )
        .with_operation("validate_template")),
    }
}

/// Registry of prompt templates, keyed by style
#[derive(Debug, Clone)]
pub struct PromptRegistry {
    templates: BTreeMap<PromptStyle, PromptTemplate>,
}

impl PromptRegistry {
    /// Load and validate the built-in templates
    pub fn builtin() -> ScrivenerResult<Self> {
        let mut registry = Self {
            templates: BTreeMap::new(),
        };
        registry.add_template(PromptTemplate::new(PromptStyle::Default, DEFAULT_PROMPT)?);
        registry.add_template(PromptTemplate::new(PromptStyle::Academic, ACADEMIC_PROMPT)?);
        registry.add_template(PromptTemplate::new(PromptStyle::Blog, BLOG_PROMPT)?);
        registry.add_template(PromptTemplate::new(PromptStyle::News, NEWS_PROMPT)?);
        Ok(registry)
    }

    /// Replace the template for its style
    pub fn add_template(&mut self, template: PromptTemplate) {
        self.templates.insert(template.style(), template);
    }

    pub fn get(&self, style: PromptStyle) -> Option<&PromptTemplate> {
        self.templates.get(&style)
    }

    /// Look up a template by name, falling back to the default style
    pub fn resolve(&self, name: &str) -> ScrivenerResult<&PromptTemplate> {
        let style = PromptStyle::from_name_or_default(name);
        self.get(style)
            .or_else(|| self.get(PromptStyle::Default))
            .ok_or_else(|| {
                config_error!("No default prompt template is registered", COMPONENT)
                    .with_operation("resolve")
            })
    }

    pub fn styles(&self) -> Vec<PromptStyle> {
        self.templates.keys().copied().collect()
    }
}

const DEFAULT_PROMPT: &str = r#"
You are an expert AI article writer. Using the research data below, create a comprehensive article on "{topic}".

RESEARCH DATA:
{researchData}

INSTRUCTIONS:
Write a complete, well-structured article that:
1. Has a compelling title
2. Includes an informative introduction
3. Provides detailed analysis in 3-4 main sections
4. Discusses real-world applications and examples
5. Addresses challenges and opportunities
6. Concludes with actionable insights
7. Is approximately 1000-1500 words
8. Uses professional but accessible language
9. Cites sources as [1], [2], [3]

FORMAT YOUR RESPONSE AS A COMPLETE MARKDOWN ARTICLE WITH PROPER HEADINGS.
"#;

const ACADEMIC_PROMPT: &str = r#"
You are an academic researcher. Using the research data below, create a scholarly article on "{topic}".

RESEARCH DATA:
{researchData}

INSTRUCTIONS:
Write a scholarly article that:
1. Has a formal academic title
2. Includes an abstract
3. Provides literature review based on sources
4. Presents analysis in 3-4 sections with theoretical framework
5. Discusses implications for future research
6. Concludes with recommendations
7. Is approximately 1500-2000 words
8. Uses formal academic language
9. Cites sources in APA format as (Author, Year)

FORMAT YOUR RESPONSE AS A COMPLETE MARKDOWN ARTICLE WITH PROPER HEADINGS.
"#;

const BLOG_PROMPT: &str = r#"
You are a professional blogger. Using the research data below, create an engaging blog post on "{topic}".

RESEARCH DATA:
{researchData}

INSTRUCTIONS:
Write an engaging blog post that:
1. Has a catchy, click-worthy title
2. Opens with a compelling hook
3. Provides value through actionable tips
4. Includes 3-4 main sections with practical examples
5. Uses subheadings, bullet points, and numbered lists
6. Discusses real-world applications
7. Concludes with a strong call-to-action
8. Is approximately 800-1200 words
9. Uses conversational but professional language
10. Cites sources as [1], [2], [3]

FORMAT YOUR RESPONSE AS A COMPLETE MARKDOWN ARTICLE WITH PROPER HEADINGS.
"#;

const NEWS_PROMPT: &str = r#"
You are a news journalist. Using the research data below, create a news article on "{topic}".

RESEARCH DATA:
{researchData}

INSTRUCTIONS:
Write a news article that:
1. Has a compelling headline
2. Opens with a strong lead paragraph
3. Follows the inverted pyramid structure
4. Includes quotes from relevant sources
5. Provides context and background information
6. Discusses impact and implications
7. Concludes with future outlook
8. Is approximately 600-1000 words
9. Uses clear, concise, and objective language
10. Cites sources as [1], [2], [3]

FORMAT YOUR RESPONSE AS A COMPLETE MARKDOWN ARTICLE WITH PROPER HEADINGS.
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use scrivener_core::ErrorKind;

    #[test]
    fn test_builtin_registry_has_all_styles() {
        let registry = PromptRegistry::builtin().unwrap();
        assert_eq!(registry.styles(), PromptStyle::ALL.to_vec());
    }

    #[test]
    fn test_unknown_style_falls_back_to_default() {
        let registry = PromptRegistry::builtin().unwrap();
        let template = registry.resolve("limerick").unwrap();
        assert_eq!(template.style(), PromptStyle::Default);

        let template = registry.resolve("  Academic ").unwrap();
        assert_eq!(template.style(), PromptStyle::Academic);
    }

    #[test]
    fn test_render_substitutes_each_placeholder_once() {
        let template =
            PromptTemplate::new(PromptStyle::Blog, "On {topic}:\n{researchData}\nend").unwrap();
        let rendered = template.render("rust", "DATA");
        assert_eq!(rendered, "On rust:\nDATA\nend");
    }

    #[test]
    fn test_render_does_not_expand_placeholders_in_values() {
        let template =
            PromptTemplate::new(PromptStyle::News, "{researchData} | {topic}").unwrap();
        let rendered = template.render("{researchData}", "{topic}");
        assert_eq!(rendered, "{topic} | {researchData}");
    }

    #[test]
    fn test_missing_placeholder_rejected_at_load() {
        let error = PromptTemplate::new(PromptStyle::Default, "no placeholders").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_duplicate_placeholder_rejected_at_load() {
        let error =
            PromptTemplate::new(PromptStyle::Default, "{topic} {topic} {researchData}").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Configuration);
        assert!(error.message().contains("more than once"));
    }

    #[test]
    fn test_style_parsing() {
        assert_eq!("BLOG".parse::<PromptStyle>().unwrap(), PromptStyle::Blog);
        assert!("poem".parse::<PromptStyle>().is_err());
        assert_eq!(PromptStyle::from_name_or_default("poem"), PromptStyle::Default);
        assert_eq!(PromptStyle::News.to_string(), "news");
    }
}
