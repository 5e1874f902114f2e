//! Generation service seam and the Gemini HTTP client

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::core::config::TranslatorConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::models::{GenerationOutput, SafetyPolicy, SafetySetting};

/// Remote text generation: submit a prompt plus policy, get text or a failure
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Generate a completion for one prompt
    async fn generate(&self, prompt: &str, policy: &SafetyPolicy) -> Result<GenerationOutput>;

    /// Name of the backing model, for logs
    fn model_name(&self) -> &str;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    safety_settings: &'a [SafetySetting],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

impl<'a> GenerateContentRequest<'a> {
    fn new(prompt: &'a str, policy: &'a SafetyPolicy) -> Self {
        Self {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            safety_settings: policy.settings(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct GenerateContentResponse {
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CandidateContent {
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct UsageMetadata {
    total_token_count: u64,
}

impl GenerateContentResponse {
    fn into_output(self) -> Result<GenerationOutput> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(TranslationError::Blocked { reason });
        }

        let candidate = self.candidates.into_iter().next().ok_or_else(|| {
            TranslationError::InvalidResponseError {
                message: "No candidates in response".to_string(),
            }
        })?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            let message = match candidate.finish_reason {
                Some(reason) => format!("Empty candidate text (finish reason {})", reason),
                None => "Empty candidate text".to_string(),
            };
            return Err(TranslationError::InvalidResponseError { message });
        }

        let tokens_used = self
            .usage_metadata
            .map(|u| u.total_token_count as usize)
            .unwrap_or(0);

        Ok(GenerationOutput { text, tokens_used })
    }
}

/// Gemini `generateContent` client
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    config: Arc<TranslatorConfig>,
}

impl GeminiClient {
    /// Create a new client
    pub fn new(config: TranslatorConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .pool_idle_timeout(Some(Duration::from_secs(30)))
            .build()?;

        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    /// Create from environment
    pub fn from_env() -> Result<Self> {
        Self::new(TranslatorConfig::from_env()?)
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.api_endpoint.trim_end_matches('/'),
            self.config.model
        )
    }
}

fn transport_error(e: reqwest::Error) -> TranslationError {
    if e.is_timeout() {
        TranslationError::TimeoutError
    } else {
        TranslationError::NetworkError {
            message: e.to_string(),
        }
    }
}

/// Map a finished HTTP exchange to generated text or an error
fn classify(status: StatusCode, retry_after: Option<u64>, body: &str) -> Result<GenerationOutput> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        debug!("Quota exhausted; request a higher limit for the API key");
        return Err(TranslationError::RateLimitError { retry_after });
    }

    if !status.is_success() {
        return Err(TranslationError::ApiError {
            status: status.as_u16(),
            message: body.to_string(),
        });
    }

    let parsed: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| TranslationError::InvalidResponseError {
            message: e.to_string(),
        })?;

    parsed.into_output()
}

#[async_trait]
impl GenerationService for GeminiClient {
    async fn generate(&self, prompt: &str, policy: &SafetyPolicy) -> Result<GenerationOutput> {
        let body = GenerateContentRequest::new(prompt, policy);

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let text = response.text().await.map_err(transport_error)?;

        let output = classify(status, retry_after, &text)?;
        debug!("Generated {} chars ({} tokens)", output.text.len(), output.tokens_used);
        Ok(output)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
