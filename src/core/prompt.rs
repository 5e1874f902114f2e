//! One-shot prompt template for Thai comment translation

use crate::core::errors::{Result, TranslationError};
use crate::core::models::TranslationRequest;

/// Marker replaced by the row's text
pub const PLACEHOLDER: &str = "{text}";

/// Default template: instruction, one worked example, then the row slot
pub const DEFAULT_TEMPLATE: &str = "Translate the following Thai social media comment into natural English. \
Keep slang, tone and emoji. Reply with the English translation only.

Thai: ร้านนี้อร่อยมาก แต่รอคิวนานไปหน่อยนะ 555
English: This place is really delicious, but the queue was a bit too long haha

Thai: {text}
English:";

/// Prompt template split around its single placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    prefix: String,
    suffix: String,
}

impl PromptTemplate {
    /// Parse a template that contains exactly one `{text}` placeholder
    pub fn parse(template: &str) -> Result<Self> {
        let count = template.matches(PLACEHOLDER).count();
        if count != 1 {
            return Err(TranslationError::ConfigError {
                message: format!(
                    "prompt template must contain exactly one {} placeholder, found {}",
                    PLACEHOLDER, count
                ),
            });
        }

        // count == 1 guarantees the split succeeds
        let (prefix, suffix) = template
            .split_once(PLACEHOLDER)
            .unwrap_or((template, ""));

        Ok(Self {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
        })
    }

    /// Insert the text verbatim at the placeholder
    pub fn render(&self, text: &str) -> String {
        let mut prompt = String::with_capacity(self.prefix.len() + text.len() + self.suffix.len());
        prompt.push_str(&self.prefix);
        prompt.push_str(text);
        prompt.push_str(&self.suffix);
        prompt
    }

    /// Build the request for one row
    pub fn request(&self, row_index: usize, source_text: &str) -> TranslationRequest {
        TranslationRequest {
            row_index,
            source_text: source_text.to_string(),
            prompt: self.render(source_text),
        }
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        let (prefix, suffix) = DEFAULT_TEMPLATE
            .split_once(PLACEHOLDER)
            .unwrap_or((DEFAULT_TEMPLATE, ""));
        Self {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_parses() {
        let parsed = PromptTemplate::parse(DEFAULT_TEMPLATE).unwrap();
        assert_eq!(parsed, PromptTemplate::default());
    }

    #[test]
    fn test_render_is_idempotent() {
        let template = PromptTemplate::default();
        let text = "ก็สมควรติดแหละ...";
        assert_eq!(template.render(text), template.render(text));
        assert!(template.render(text).ends_with("Thai: ก็สมควรติดแหละ...\nEnglish:"));
    }

    #[test]
    fn test_render_is_verbatim() {
        let template = PromptTemplate::parse("<{text}>").unwrap();
        assert_eq!(template.render("a\nb \"c\" {text}\t"), "<a\nb \"c\" {text}\t>");
    }

    #[test]
    fn test_rejects_bad_placeholder_count() {
        assert!(PromptTemplate::parse("no slot").is_err());
        assert!(PromptTemplate::parse("{text} and {text}").is_err());
    }

    #[test]
    fn test_request_carries_row() {
        let template = PromptTemplate::parse("T: {text}").unwrap();
        let request = template.request(3, "สวัสดี");
        assert_eq!(request.row_index, 3);
        assert_eq!(request.source_text, "สวัสดี");
        assert_eq!(request.prompt, "T: สวัสดี");
    }
}
