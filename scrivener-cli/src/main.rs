//! Scrivener CLI - research-backed article generation from the command line
//!
//! Thin presentation layer over the research pipeline. Pipeline errors are
//! reported to the operator and never terminate the process with a failure.

use clap::{Parser, Subcommand};
use scrivener_core::{
    init_logging, validation_error, ErrorKind, ScrivenerConfig, ScrivenerError, ScrivenerResult,
    DEFAULT_CONFIG_FILE,
};
use scrivener_research::{
    ArticleArchive, ArticlePipeline, ArticleSynthesizer, OutputFormat, PersistedArticle,
    PromptRegistry, PromptStyle, SiumaiTextGenerator, TavilySearchClient,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Characters of the generated article shown after a run
const PREVIEW_CHARS: usize = 1000;

#[derive(Parser)]
#[command(name = "scrivener")]
#[command(about = "Generate research-backed articles from a topic")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Research a topic and write an article about it
    Generate {
        /// Topic to research
        topic: String,

        /// Output format (md, html, txt)
        #[arg(short, long, default_value = "md")]
        format: String,

        /// Prompt style (default, academic, blog, news)
        #[arg(short, long, default_value = "default")]
        prompt: String,
    },

    /// List previously generated articles
    List,

    /// Print a generated article
    View {
        /// Archive filename as shown by `list`
        filename: String,
    },

    /// List available prompt styles
    Prompts,

    /// Configuration management
    Config {
        /// Write a default configuration file
        #[arg(long)]
        init: bool,

        /// Show the effective configuration
        #[arg(long)]
        show: bool,

        /// Validate the configuration
        #[arg(long)]
        validate: bool,
    },
}

#[tokio::main]
async fn main() -> ScrivenerResult<()> {
    // A missing .env file is fine; the environment may already be set up
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = match (&cli.command, cli.config.as_deref()) {
        // `config --init --config <new file>` must not require the file to exist yet
        (Commands::Config { init: true, .. }, Some(path)) if !path.exists() => {
            ScrivenerConfig::default()
        }
        (_, path) => load_config(path)?,
    };

    let mut logging_config = config.logging.clone();
    if cli.verbose {
        logging_config.level = "debug".to_string();
    }
    init_logging(&logging_config)?;

    info!("Starting Scrivener CLI v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Generate {
            topic,
            format,
            prompt,
        } => handle_generate(&topic, &format, &prompt, &config).await,
        Commands::List => handle_list(&config).await,
        Commands::View { filename } => handle_view(&filename, &config).await,
        Commands::Prompts => handle_prompts(),
        Commands::Config {
            init,
            show,
            validate,
        } => handle_config(cli.config.as_deref(), init, show, validate, &config)?,
    }

    Ok(())
}

/// Load configuration from the given file or the usual locations
fn load_config(config_path: Option<&Path>) -> ScrivenerResult<ScrivenerConfig> {
    let candidates: Vec<PathBuf> = [
        Some(PathBuf::from(DEFAULT_CONFIG_FILE)),
        dirs::config_dir().map(|d| d.join("scrivener").join("config.toml")),
        dirs::home_dir().map(|d| d.join(".scrivener").join("config.toml")),
    ]
    .into_iter()
    .flatten()
    .collect();
    let candidates: Vec<&Path> = candidates.iter().map(PathBuf::as_path).collect();

    ScrivenerConfig::load(config_path, &candidates)
}

fn build_pipeline(config: &ScrivenerConfig) -> ScrivenerResult<ArticlePipeline> {
    let searcher = TavilySearchClient::new(config.search.clone())?;
    let generator = SiumaiTextGenerator::new(config.llm.clone());
    let synthesizer = ArticleSynthesizer::new(Arc::new(generator))?;
    Ok(ArticlePipeline::new(Arc::new(searcher), synthesizer))
}

async fn handle_generate(topic: &str, format: &str, prompt: &str, config: &ScrivenerConfig) {
    let format = match format.parse::<OutputFormat>() {
        Ok(format) => format,
        Err(message) => {
            report_error(&validation_error!(message, "format", "cli"));
            return;
        }
    };
    let style = PromptStyle::from_name_or_default(prompt);

    println!("📝 Topic: {}", topic.trim());
    println!("🎨 Prompt style: {}", style);
    println!("📄 Format: {}", format);
    println!();

    match generate(topic, style, format, config).await {
        Ok(saved) => {
            println!("\n✅ Article generated successfully!");
            println!("📁 Saved to: {}", saved.path.display());
            println!("📚 Sources cited: {}", saved.document.sources.len());

            let preview: String = saved.document.body.chars().take(PREVIEW_CHARS).collect();
            println!("\n📖 Preview:\n");
            println!("{}", preview);
            if saved.document.body.chars().count() > PREVIEW_CHARS {
                println!("...");
            }
        }
        Err(e) => report_error(&e),
    }
}

async fn generate(
    topic: &str,
    style: PromptStyle,
    format: OutputFormat,
    config: &ScrivenerConfig,
) -> ScrivenerResult<PersistedArticle> {
    let pipeline = build_pipeline(config)?;
    let archive = ArticleArchive::new(&config.output.directory);

    println!("🔍 Researching the topic and writing the article...");
    pipeline
        .generate_and_persist(topic, style.as_str(), format, &archive)
        .await
}

async fn handle_list(config: &ScrivenerConfig) {
    let archive = ArticleArchive::new(&config.output.directory);
    let history = archive.list_history().await;

    if history.is_empty() {
        println!("📭 No research history found in {}", archive.root().display());
        return;
    }

    println!("📚 Research history ({} articles):\n", history.len());
    for (index, entry) in history.iter().enumerate() {
        let date = entry
            .created_at()
            .map(|d| d.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "unknown date".to_string());

        println!("{}. {}", index + 1, entry.query);
        println!("   📄 {}", entry.filename);
        println!("   📅 {}", date);
    }
}

async fn handle_view(filename: &str, config: &ScrivenerConfig) {
    let archive = ArticleArchive::new(&config.output.directory);
    match archive.read_article(filename).await {
        Ok(content) => println!("{}", content),
        Err(e) => report_error(&e),
    }
}

fn handle_prompts() {
    match PromptRegistry::builtin() {
        Ok(registry) => {
            println!("🎨 Available prompt styles:\n");
            for style in registry.styles() {
                println!("  {:<10} {}", style.as_str(), style.description());
            }
        }
        Err(e) => report_error(&e),
    }
}

fn handle_config(
    config_path: Option<&Path>,
    init: bool,
    show: bool,
    validate: bool,
    config: &ScrivenerConfig,
) -> ScrivenerResult<()> {
    if init {
        let path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        if path.exists() {
            println!("⚠️  Configuration already exists at: {}", path.display());
        } else {
            ScrivenerConfig::default().save_to_file(&path)?;
            println!("✅ Configuration initialized at: {}", path.display());
            println!("📝 API keys are read from TAVILY_API_KEY and GOOGLE_AI_API_KEY unless set in the file.");
        }
    }

    if show {
        let mut shown = config.clone();
        if shown.search.api_key.is_some() {
            shown.search.api_key = Some("***".to_string());
        }
        if shown.llm.api_key.is_some() {
            shown.llm.api_key = Some("***".to_string());
        }

        match toml::to_string_pretty(&shown) {
            Ok(content) => {
                println!("📋 Current configuration:");
                println!("{}", content);
            }
            Err(e) => println!("❌ Failed to render configuration: {}", e),
        }
    }

    if validate {
        match config.validate() {
            Ok(()) => println!("✅ Configuration is valid"),
            Err(e) => report_error(&e),
        }
    }

    if !init && !show && !validate {
        println!("Use --init, --show or --validate");
    }

    Ok(())
}

/// Report an error to the operator without terminating
fn report_error(error: &ScrivenerError) {
    error.log();

    println!("\n❌ {}", error);
    for cause in error.cause_chain() {
        println!("   caused by: {}", cause);
    }

    println!("💡 {}", hint(error.kind()));
    for suggestion in &error.context().recovery_suggestions {
        println!("   • {}", suggestion);
    }
}

fn hint(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Validation => "Check the command arguments, e.g. provide a non-empty topic",
        ErrorKind::Search => "The search API could not be reached or rejected the request",
        ErrorKind::Synthesis => "The generation API failed or returned no text",
        ErrorKind::Persistence => "Check that the output directory is writable",
        ErrorKind::Configuration => {
            "Set the required API keys in the environment or run `scrivener config --init`"
        }
    }
}
