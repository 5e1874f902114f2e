//! Thai Comment Translator - batch Thai to English translation of CSV comment datasets
//!
//! Each row of a text column is rendered into a one-shot prompt, sent to a
//! hosted generation model, and the trimmed answers are appended as a new
//! column aligned with the input rows.

#![forbid(unsafe_code)]

pub mod cli;
pub mod core;
pub mod processors;

// Re-export key types for convenience
pub use self::core::{
    client::{GeminiClient, GenerationService},
    config::TranslatorConfig,
    errors::TranslationError,
    models::{
        BlockThreshold, GenerationOutput, HarmCategory, SafetyPolicy, SafetySetting,
        TranslatedColumn, TranslationRequest, TranslationResult,
    },
    progress::{BarProgress, LogProgress, NoProgress, ProgressObserver},
    prompt::PromptTemplate,
    translator::{BatchFailure, ColumnTranslator},
};

pub use processors::{comments::CommentProcessor, dataset::Dataset};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
