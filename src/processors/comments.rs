//! Comment dataset processor: load, translate one column, save

use std::path::{Path, PathBuf};
use tracing::info;

use crate::core::client::{GeminiClient, GenerationService};
use crate::core::config::TranslatorConfig;
use crate::core::errors::Result;
use crate::core::progress::ProgressObserver;
use crate::core::translator::ColumnTranslator;
use crate::processors::dataset::Dataset;

/// Column holding the Thai comments
pub const SOURCE_COLUMN: &str = "comment_text";

/// Column appended with the English translations
pub const OUTPUT_COLUMN: &str = "english_comment_text";

/// Outcome of one translated file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub rows: usize,
    pub tokens_used: usize,
}

/// Translates the comment column of CSV datasets
pub struct CommentProcessor<S> {
    translator: ColumnTranslator<S>,
    column: String,
    output_column: String,
}

impl CommentProcessor<GeminiClient> {
    /// Build a Gemini-backed processor from configuration
    pub fn from_config(config: TranslatorConfig) -> Result<Self> {
        let template = config.prompt_template()?;
        let policy = config.safety_policy.clone();
        let interval = config.progress_interval;
        let client = GeminiClient::new(config)?;

        let translator =
            ColumnTranslator::new(client, template, policy).with_progress_interval(interval);
        Ok(Self::new(translator))
    }
}

impl<S: GenerationService> CommentProcessor<S> {
    /// Create a processor using the default column names
    pub fn new(translator: ColumnTranslator<S>) -> Self {
        Self {
            translator,
            column: SOURCE_COLUMN.to_string(),
            output_column: OUTPUT_COLUMN.to_string(),
        }
    }

    pub fn with_columns(mut self, column: impl Into<String>, output_column: impl Into<String>) -> Self {
        self.column = column.into();
        self.output_column = output_column.into();
        self
    }

    pub fn translator(&self) -> &ColumnTranslator<S> {
        &self.translator
    }

    /// Translate one file; the output is written only if every row succeeded
    pub async fn translate_file(
        &self,
        input: &Path,
        output: &Path,
        observer: &mut dyn ProgressObserver,
    ) -> Result<FileReport> {
        info!("Translating {} -> {}", input.display(), output.display());

        let mut dataset = Dataset::load(input)?;
        let translated = self
            .translator
            .translate(&dataset, &self.column, observer)
            .await?;

        let tokens_used = translated.tokens_used();
        dataset.set_column(&self.output_column, translated.into_values())?;
        dataset.save(output)?;

        Ok(FileReport {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            rows: dataset.len(),
            tokens_used,
        })
    }
}

/// `<stem>_translated.<ext>` next to the input, or inside `output_dir`
pub fn default_output_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dataset".to_string());
    let ext = input
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "csv".to_string());
    let file_name = format!("{}_translated.{}", stem, ext);

    match output_dir {
        Some(dir) => dir.join(file_name),
        None => input.with_file_name(file_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::TranslationError;
    use crate::core::models::SafetyPolicy;
    use crate::core::prompt::PromptTemplate;
    use crate::core::translator::tests::{FakeService, RecordingObserver};

    fn processor(service: FakeService) -> CommentProcessor<FakeService> {
        CommentProcessor::new(ColumnTranslator::new(
            service,
            PromptTemplate::default(),
            SafetyPolicy::block_none(),
        ))
    }

    fn write_input(dir: &Path) -> PathBuf {
        let path = dir.join("train.csv");
        std::fs::write(
            &path,
            "id,comment_text,label\n\
             10,ก็สมควรติดแหละ...,1\n\
             11,\"อร่อยมาก, แนะนำเลย\",0\n\
             12,ไม่ไหวจริงๆ,1\n",
        )
        .unwrap();
        path
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("data/train.csv"), None),
            PathBuf::from("data/train_translated.csv")
        );
        assert_eq!(
            default_output_path(Path::new("data/test.tsv"), Some(Path::new("out"))),
            PathBuf::from("out/test_translated.tsv")
        );
    }

    #[tokio::test]
    async fn test_translate_file_appends_column() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path());
        let output = default_output_path(&input, None);

        let processor = processor(FakeService::default());
        let mut observer = RecordingObserver::default();
        let report = processor
            .translate_file(&input, &output, &mut observer)
            .await
            .unwrap();

        assert_eq!(report.rows, 3);
        assert_eq!(observer.finished, Some(3));

        let original = Dataset::load(&input).unwrap();
        let written = Dataset::load(&output).unwrap();
        assert_eq!(written.len(), original.len());
        assert_eq!(
            written.headers(),
            &["id", "comment_text", "label", "english_comment_text"]
        );
        assert_eq!(written.column("id").unwrap(), vec!["10", "11", "12"]);

        let english = written.column(OUTPUT_COLUMN).unwrap();
        assert_eq!(english[0], "EN(ก็สมควรติดแหละ...)");
        assert!(english.iter().all(|t| !t.is_empty() && t.trim() == *t));
    }

    #[tokio::test]
    async fn test_tsv_input_written_as_tsv() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("test.tsv");
        std::fs::write(&input, "id\tcomment_text\n1\tดีมาก, จริงๆ\n").unwrap();
        let output = default_output_path(&input, None);

        processor(FakeService::default())
            .translate_file(&input, &output, &mut RecordingObserver::default())
            .await
            .unwrap();

        let written = std::fs::read_to_string(&output).unwrap();
        assert_eq!(
            written,
            "id\tcomment_text\tenglish_comment_text\n1\tดีมาก, จริงๆ\tEN(ดีมาก, จริงๆ)\n"
        );
    }

    #[tokio::test]
    async fn test_failed_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path());
        let output = dir.path().join("out.csv");

        let processor = processor(FakeService::failing_on(1));
        let err = processor
            .translate_file(&input, &output, &mut RecordingObserver::default())
            .await
            .unwrap_err();

        match err {
            TranslationError::BatchAborted(failure) => {
                assert_eq!(failure.row_index, Some(1));
                assert_eq!(failure.completed, 1);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_custom_columns() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("posts.csv");
        std::fs::write(&input, "body\nสวัสดี\n").unwrap();
        let output = dir.path().join("posts_en.csv");

        let processor = processor(FakeService::default()).with_columns("body", "body_en");
        processor
            .translate_file(&input, &output, &mut RecordingObserver::default())
            .await
            .unwrap();

        let written = Dataset::load(&output).unwrap();
        assert_eq!(written.column("body_en").unwrap(), vec!["EN(สวัสดี)"]);
    }

    #[tokio::test]
    async fn test_missing_input_file() {
        let dir = tempfile::tempdir().unwrap();
        let processor = processor(FakeService::default());

        let err = processor
            .translate_file(
                &dir.path().join("absent.csv"),
                &dir.path().join("out.csv"),
                &mut RecordingObserver::default(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, TranslationError::FileError { .. }));
        assert_eq!(processor.translator().service().calls(), 0);
    }
}
