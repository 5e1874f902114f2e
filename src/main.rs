//! Main entry point for the Thai comment translator CLI

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use thai_comment_translator::cli::commands::{self, Commands};
use thai_comment_translator::TranslatorConfig;

/// Thai Comment Translator - batch Thai to English translation of CSV datasets
#[derive(Parser, Debug)]
#[command(name = "thai-comment-translator", version, about, long_about = None)]
struct Args {
    /// API key for Gemini (optional, defaults to GEMINI_API_KEY env var)
    #[arg(long)]
    api_key: Option<String>,

    /// Generation model (optional, defaults to GEMINI_MODEL env var)
    #[arg(long)]
    model: Option<String>,

    /// JSON or TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Successful rows between progress milestones
    #[arg(long)]
    progress_interval: Option<usize>,

    /// Disable the live progress bar
    #[arg(long)]
    no_progress: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl Args {
    /// Config from file or environment, with CLI overrides applied
    fn resolve_config(&self) -> anyhow::Result<TranslatorConfig> {
        let mut config = match &self.config {
            Some(path) => TranslatorConfig::load(Some(path.as_path()))?,
            None if self.api_key.is_some() => TranslatorConfig::default(),
            None => TranslatorConfig::load(None)?,
        };

        if let Some(api_key) = &self.api_key {
            config.api_key = api_key.clone();
        }

        if let Some(model) = &self.model {
            config.model = model.clone();
        }

        if let Some(interval) = self.progress_interval {
            config.progress_interval = interval;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new(format!("{}=debug", env!("CARGO_CRATE_NAME")))
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("{}=info", env!("CARGO_CRATE_NAME"))))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Debug lines would tear through a live bar
    let show_progress = !args.no_progress && !tracing::enabled!(tracing::Level::DEBUG);

    // Execute command
    match args.command {
        Some(Commands::Translate {
            ref file,
            ref output,
            ref column,
            ref output_column,
        }) => {
            let config = args.resolve_config()?;
            commands::handle_translate(
                config,
                file.clone(),
                output.clone(),
                column.clone(),
                output_column.clone(),
                show_progress,
            )
            .await?;
        }
        Some(Commands::Batch {
            ref files,
            ref output_dir,
            ref column,
            ref output_column,
        }) => {
            let config = args.resolve_config()?;
            commands::handle_batch(
                config,
                files.clone(),
                output_dir.clone(),
                column.clone(),
                output_column.clone(),
                show_progress,
            )
            .await?;
        }
        Some(Commands::Prompt { ref text }) => {
            // Rendering needs no API key
            let config = match &args.config {
                Some(path) => TranslatorConfig::from_file(path)?,
                None => TranslatorConfig::default(),
            };
            commands::handle_prompt(&config, text)?;
        }
        None => {
            println!("Please specify a command. Use --help for more information.");
        }
    }

    Ok(())
}
