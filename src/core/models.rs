//! Core data models for translation

use serde::{Deserialize, Serialize};
use std::fmt;

/// Content category the generation service may filter on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HarmCategory {
    /// Harassment
    #[serde(rename = "HARM_CATEGORY_HARASSMENT")]
    Harassment,
    /// Hate speech
    #[serde(rename = "HARM_CATEGORY_HATE_SPEECH")]
    HateSpeech,
    /// Sexually explicit content
    #[serde(rename = "HARM_CATEGORY_SEXUALLY_EXPLICIT")]
    SexuallyExplicit,
    /// Dangerous content
    #[serde(rename = "HARM_CATEGORY_DANGEROUS_CONTENT")]
    DangerousContent,
}

impl fmt::Display for HarmCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HarmCategory::Harassment => write!(f, "harassment"),
            HarmCategory::HateSpeech => write!(f, "hate_speech"),
            HarmCategory::SexuallyExplicit => write!(f, "sexually_explicit"),
            HarmCategory::DangerousContent => write!(f, "dangerous_content"),
        }
    }
}

/// Probability level at which a category gets blocked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockThreshold {
    /// Never block
    BlockNone,
    /// Block only high-probability content
    BlockOnlyHigh,
    /// Block medium and high
    BlockMediumAndAbove,
    /// Block low, medium and high
    BlockLowAndAbove,
}

/// One category→threshold pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetySetting {
    pub category: HarmCategory,
    pub threshold: BlockThreshold,
}

/// Static safety configuration sent unchanged with every request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SafetyPolicy {
    settings: Vec<SafetySetting>,
}

impl SafetyPolicy {
    pub fn new(settings: Vec<SafetySetting>) -> Self {
        Self { settings }
    }

    /// Every category set to `BLOCK_NONE`
    pub fn block_none() -> Self {
        Self::uniform(BlockThreshold::BlockNone)
    }

    /// Every known category set to the same threshold
    pub fn uniform(threshold: BlockThreshold) -> Self {
        let settings = [
            HarmCategory::Harassment,
            HarmCategory::HateSpeech,
            HarmCategory::SexuallyExplicit,
            HarmCategory::DangerousContent,
        ]
        .into_iter()
        .map(|category| SafetySetting {
            category,
            threshold,
        })
        .collect();

        Self { settings }
    }

    pub fn settings(&self) -> &[SafetySetting] {
        &self.settings
    }

    /// Threshold configured for a category, if any
    pub fn threshold_for(&self, category: HarmCategory) -> Option<BlockThreshold> {
        self.settings
            .iter()
            .find(|s| s.category == category)
            .map(|s| s.threshold)
    }
}

impl Default for SafetyPolicy {
    fn default() -> Self {
        Self::block_none()
    }
}

/// Translation request for a single row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    pub row_index: usize,
    pub source_text: String,
    pub prompt: String,
}

/// Translation result for a single row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationResult {
    pub row_index: usize,
    pub translation: String,
}

/// Raw answer of the generation service
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GenerationOutput {
    pub text: String,
    pub tokens_used: usize,
}

impl GenerationOutput {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tokens_used: 0,
        }
    }

    pub fn with_tokens(mut self, tokens_used: usize) -> Self {
        self.tokens_used = tokens_used;
        self
    }
}

/// Fully translated column, aligned 1:1 with the input rows
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TranslatedColumn {
    values: Vec<String>,
    tokens_used: usize,
}

impl TranslatedColumn {
    pub(crate) fn with_capacity(rows: usize) -> Self {
        Self {
            values: Vec::with_capacity(rows),
            tokens_used: 0,
        }
    }

    pub(crate) fn push(&mut self, result: TranslationResult, tokens_used: usize) {
        debug_assert_eq!(result.row_index, self.values.len());
        self.values.push(result.translation);
        self.tokens_used += tokens_used;
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Translation for a row
    pub fn get(&self, row_index: usize) -> Option<&str> {
        self.values.get(row_index).map(String::as_str)
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Total tokens reported by the service for the run
    pub fn tokens_used(&self) -> usize {
        self.tokens_used
    }

    pub fn into_values(self) -> Vec<String> {
        self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_blocks_nothing() {
        let policy = SafetyPolicy::default();
        assert_eq!(policy.settings().len(), 4);
        assert!(policy
            .settings()
            .iter()
            .all(|s| s.threshold == BlockThreshold::BlockNone));
        assert_eq!(
            policy.threshold_for(HarmCategory::HateSpeech),
            Some(BlockThreshold::BlockNone)
        );
    }

    #[test]
    fn test_policy_wire_names() {
        let policy = SafetyPolicy::new(vec![SafetySetting {
            category: HarmCategory::DangerousContent,
            threshold: BlockThreshold::BlockOnlyHigh,
        }]);
        let json = serde_json::to_value(&policy).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "category": "HARM_CATEGORY_DANGEROUS_CONTENT",
                "threshold": "BLOCK_ONLY_HIGH"
            }])
        );
    }

    #[test]
    fn test_translated_column_accumulates() {
        let mut column = TranslatedColumn::with_capacity(2);
        column.push(
            TranslationResult {
                row_index: 0,
                translation: "hello".to_string(),
            },
            12,
        );
        column.push(
            TranslationResult {
                row_index: 1,
                translation: "world".to_string(),
            },
            8,
        );

        assert_eq!(column.len(), 2);
        assert_eq!(column.get(1), Some("world"));
        assert_eq!(column.tokens_used(), 20);
    }
}
