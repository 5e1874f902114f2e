//! CLI command definitions and handlers

use anyhow::Context;
use clap::Subcommand;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

use crate::core::config::TranslatorConfig;
use crate::core::progress::{BarProgress, LogProgress, ProgressObserver};
use crate::processors::comments::{
    default_output_path, CommentProcessor, FileReport, OUTPUT_COLUMN, SOURCE_COLUMN,
};

/// Commands for the Thai comment translator
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Translate the comment column of one CSV file
    Translate {
        /// Input CSV file (required)
        #[arg(short, long)]
        file: PathBuf,

        /// Output file (default: <stem>_translated.csv next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Column holding the Thai text
        #[arg(long, default_value = SOURCE_COLUMN)]
        column: String,

        /// Column to write the English text to
        #[arg(long, default_value = OUTPUT_COLUMN)]
        output_column: String,
    },

    /// Translate several CSV files in order, stopping at the first failure
    Batch {
        /// Input CSV files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Directory for translated files (default: next to each input)
        #[arg(short = 'd', long)]
        output_dir: Option<PathBuf>,

        /// Column holding the Thai text
        #[arg(long, default_value = SOURCE_COLUMN)]
        column: String,

        /// Column to write the English text to
        #[arg(long, default_value = OUTPUT_COLUMN)]
        output_column: String,
    },

    /// Print the prompt that would be sent for a text
    Prompt {
        /// Thai text to embed
        text: String,
    },
}

fn observer_for(path: &Path, show_progress: bool) -> Box<dyn ProgressObserver> {
    let label = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    if show_progress {
        Box::new(BarProgress::new(label))
    } else {
        Box::new(LogProgress::new(label))
    }
}

fn print_report(report: &FileReport) {
    println!("   {} -> {}", report.input.display(), report.output.display());
    println!("   Rows: {}", report.rows);
    println!("   Tokens: {}", report.tokens_used);
}

/// Handle single-file translation command
pub async fn handle_translate(
    config: TranslatorConfig,
    file: PathBuf,
    output: Option<PathBuf>,
    column: String,
    output_column: String,
    show_progress: bool,
) -> anyhow::Result<()> {
    let start_time = Instant::now();
    let output = output.unwrap_or_else(|| default_output_path(&file, None));

    info!("Input: {}", file.display());
    info!("Output: {}", output.display());
    info!("Column: {} -> {}", column, output_column);

    let processor = CommentProcessor::from_config(config)?.with_columns(column, output_column);

    let mut observer = observer_for(&file, show_progress);
    let report = processor
        .translate_file(&file, &output, observer.as_mut())
        .await
        .with_context(|| format!("Failed to translate {}", file.display()))?;

    println!("\n✅ Translation completed!");
    print_report(&report);
    println!("   Time: {:?}", start_time.elapsed());

    Ok(())
}

/// Handle multi-file translation command
pub async fn handle_batch(
    config: TranslatorConfig,
    files: Vec<PathBuf>,
    output_dir: Option<PathBuf>,
    column: String,
    output_column: String,
    show_progress: bool,
) -> anyhow::Result<()> {
    let start_time = Instant::now();

    info!("Translating {} datasets", files.len());

    let processor = CommentProcessor::from_config(config)?.with_columns(column, output_column);

    let mut reports = Vec::with_capacity(files.len());
    for file in &files {
        let output = default_output_path(file, output_dir.as_deref());
        let mut observer = observer_for(file, show_progress);

        let report = processor
            .translate_file(file, &output, observer.as_mut())
            .await
            .with_context(|| {
                format!(
                    "Failed to translate {} ({} of {} datasets done)",
                    file.display(),
                    reports.len(),
                    files.len()
                )
            })?;

        reports.push(report);
    }

    println!("\n✅ Batch translation completed!");
    for report in &reports {
        print_report(report);
    }
    println!("   Time: {:?}", start_time.elapsed());

    Ok(())
}

/// Handle prompt preview command
pub fn handle_prompt(config: &TranslatorConfig, text: &str) -> anyhow::Result<()> {
    let template = config.prompt_template()?;
    println!("{}", template.render(text));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(subcommand)]
        command: Commands,
    }

    #[test]
    fn test_translate_defaults() {
        let cli = TestCli::try_parse_from(["test", "translate", "-f", "train.csv"]).unwrap();
        match cli.command {
            Commands::Translate {
                file,
                output,
                column,
                output_column,
            } => {
                assert_eq!(file, PathBuf::from("train.csv"));
                assert_eq!(output, None);
                assert_eq!(column, "comment_text");
                assert_eq!(output_column, "english_comment_text");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_batch_requires_files() {
        assert!(TestCli::try_parse_from(["test", "batch"]).is_err());

        let cli =
            TestCli::try_parse_from(["test", "batch", "train.csv", "test.csv", "-d", "out"]).unwrap();
        match cli.command {
            Commands::Batch {
                files, output_dir, ..
            } => {
                assert_eq!(files.len(), 2);
                assert_eq!(output_dir, Some(PathBuf::from("out")));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_handle_prompt_rejects_bad_template() {
        let config = TranslatorConfig {
            prompt_template: Some("nothing to fill".to_string()),
            ..Default::default()
        };
        assert!(handle_prompt(&config, "สวัสดี").is_err());
    }
}
