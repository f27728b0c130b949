use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

use super::{prompt, GeneratedReview, LlmClient, ProviderError};
use crate::db::SubmissionKind;

const GEMINI_MODEL: &str = "gemini-2.0-flash";
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageMetadata {
    #[serde(rename = "promptTokenCount")]
    prompt_token_count: Option<i32>,
    #[serde(rename = "candidatesTokenCount")]
    candidates_token_count: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: Option<String>,
}

/// Gemini-backed review generator. One request per review, no retries; any
/// transport or API failure surfaces as `ProviderError`.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    max_code_chars: usize,
}

impl GeminiClient {
    pub fn new(api_key: String, max_code_chars: usize) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_key,
            max_code_chars,
        }
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn generate_review(
        &self,
        exercise_instructions: &str,
        submission_content: &str,
        kind: SubmissionKind,
    ) -> Result<GeneratedReview, ProviderError> {
        let user_prompt = prompt::build_user_prompt(
            exercise_instructions,
            submission_content,
            kind,
            self.max_code_chars,
        );

        info!(
            model = GEMINI_MODEL,
            prompt_chars = user_prompt.chars().count(),
            "generating review"
        );

        let body = GenerateRequest {
            system_instruction: Content {
                parts: vec![Part {
                    text: prompt::SYSTEM_PROMPT,
                }],
            },
            contents: vec![Content {
                parts: vec![Part { text: &user_prompt }],
            }],
        };

        let url = format!("{}/{}:generateContent", GEMINI_BASE_URL, GEMINI_MODEL);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError(format!("Request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError(format!("Response read failed: {}", e)))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorResponse>(&text)
                .ok()
                .and_then(|e| e.error)
                .and_then(|e| e.message)
                .unwrap_or(text);
            return Err(ProviderError(format!(
                "Gemini API error ({}): {}",
                status, message
            )));
        }

        let parsed: GenerateResponse = serde_json::from_str(&text)
            .map_err(|e| ProviderError(format!("Parse error: {}", e)))?;

        let review_content = parsed
            .candidates
            .and_then(|mut c| c.drain(..).next())
            .and_then(|c| c.content)
            .and_then(|c| c.parts)
            .and_then(|mut p| p.drain(..).next())
            .and_then(|p| p.text)
            .ok_or_else(|| ProviderError("No text in response".to_string()))?;

        let overall_score = prompt::parse_overall_score(&review_content);
        let usage = parsed.usage_metadata;

        info!(model = GEMINI_MODEL, ?overall_score, "review generated");

        Ok(GeneratedReview {
            review_content,
            overall_score,
            model_used: GEMINI_MODEL.to_string(),
            prompt_tokens: usage.as_ref().and_then(|u| u.prompt_token_count),
            completion_tokens: usage.as_ref().and_then(|u| u.candidates_token_count),
        })
    }
}
