//! Row-wise column translation driver

use std::fmt;
use tracing::debug;

use crate::core::client::GenerationService;
use crate::core::config::DEFAULT_PROGRESS_INTERVAL;
use crate::core::errors::TranslationError;
use crate::core::models::{SafetyPolicy, TranslatedColumn, TranslationResult};
use crate::core::progress::ProgressObserver;
use crate::core::prompt::PromptTemplate;
use crate::processors::dataset::Dataset;

/// A translation run that did not produce a full column
///
/// Nothing translated before the failure is returned.
#[derive(Debug)]
pub struct BatchFailure {
    /// Row whose request failed, `None` for precondition failures
    pub row_index: Option<usize>,
    /// Rows translated successfully before the abort
    pub completed: usize,
    /// Underlying error
    pub source: TranslationError,
}

impl fmt::Display for BatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.row_index {
            Some(row) => write!(
                f,
                "translation aborted at row {} after {} rows: {}",
                row, self.completed, self.source
            ),
            None => write!(f, "translation not started: {}", self.source),
        }
    }
}

impl std::error::Error for BatchFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

impl BatchFailure {
    fn precondition(source: TranslationError) -> Self {
        Self {
            row_index: None,
            completed: 0,
            source,
        }
    }
}

/// Translates one text column row by row through a generation service
pub struct ColumnTranslator<S> {
    service: S,
    template: PromptTemplate,
    policy: SafetyPolicy,
    progress_interval: usize,
}

impl<S: GenerationService> ColumnTranslator<S> {
    /// Create a translator with the given template and safety policy
    pub fn new(service: S, template: PromptTemplate, policy: SafetyPolicy) -> Self {
        Self {
            service,
            template,
            policy,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    /// Successful rows between two milestone notifications (minimum 1)
    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval.max(1);
        self
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }

    /// Translate every value of `column`, in order, one request at a time
    ///
    /// The first failing row aborts the run. Empty cells are rejected before
    /// any request is sent.
    pub async fn translate(
        &self,
        dataset: &Dataset,
        column: &str,
        observer: &mut dyn ProgressObserver,
    ) -> Result<TranslatedColumn, BatchFailure> {
        let texts = match check_column(dataset, column) {
            Ok(texts) => texts,
            Err(e) => {
                observer.on_aborted(None, 0);
                return Err(BatchFailure::precondition(e));
            }
        };

        // Start and finish are reported by the observer
        debug!(
            "Translating {} rows of {} with {}",
            texts.len(),
            column,
            self.service.model_name()
        );
        observer.on_started(texts.len());

        let mut translated = TranslatedColumn::with_capacity(texts.len());

        for (row_index, text) in texts.into_iter().enumerate() {
            let request = self.template.request(row_index, text);
            debug!("Row {}: {} chars", request.row_index, request.source_text.len());

            let output = match self.service.generate(&request.prompt, &self.policy).await {
                Ok(output) => output,
                Err(e) => {
                    let completed = translated.len();
                    observer.on_aborted(Some(row_index), completed);
                    return Err(BatchFailure {
                        row_index: Some(row_index),
                        completed,
                        source: e,
                    });
                }
            };

            translated.push(
                TranslationResult {
                    row_index,
                    translation: output.text.trim().to_string(),
                },
                output.tokens_used,
            );

            let completed = translated.len();
            observer.on_row_translated(row_index, completed);
            if completed % self.progress_interval == 0 {
                observer.on_milestone(completed);
            }
        }

        observer.on_finished(translated.len());
        debug!(
            "Translated {} rows ({} tokens)",
            translated.len(),
            translated.tokens_used()
        );

        Ok(translated)
    }
}

fn check_column<'a>(dataset: &'a Dataset, column: &str) -> Result<Vec<&'a str>, TranslationError> {
    let texts = dataset.column(column)?;

    if let Some(row_index) = texts.iter().position(|t| t.trim().is_empty()) {
        return Err(TranslationError::EmptyCell {
            column: column.to_string(),
            row_index,
        });
    }

    Ok(texts)
}
