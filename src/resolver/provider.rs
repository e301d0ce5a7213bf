// File: src/resolver/provider.rs
//! Extraction-service boundary: the black-box completion backend the
//! intent resolver talks to, plus a deterministic stub for tests.
use crate::config::Config;
use crate::model::{SuggestionKind, SuggestionValue};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("extraction service returned HTTP {status}")]
    Api { status: u16 },
    #[error("malformed extractor output: {0}")]
    MalformedOutput(String),
}

/// Pre-negotiation shape the extraction service must return. Anything
/// that fails to parse into this is a [`ExtractError::MalformedOutput`]
/// and never flows deeper into the system.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawExtraction {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub urgency: Option<f32>,
    #[serde(default)]
    pub suggestions: Vec<RawSuggestion>,
}

/// A candidate value the extractor may propose; validated and repaired
/// before it becomes a [`crate::model::Suggestion`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSuggestion {
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub value: SuggestionValue,
    pub display_text: String,
}

/// Abstract interface to the completion backend. Any provider that can
/// honor the instruction/output contract is substitutable.
#[async_trait]
pub trait TaskExtractor: Send + Sync {
    async fn extract(
        &self,
        text: &str,
        reference: NaiveDateTime,
    ) -> Result<RawExtraction, ExtractError>;
}

/// OpenAI-compatible chat-completions provider.
pub struct HttpExtractor {
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f64,
    client: reqwest::Client,
}

impl HttpExtractor {
    pub fn new(config: &Config) -> Result<Self, ExtractError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            endpoint: config.endpoint.clone(),
            api_key: config.resolved_api_key(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            client,
        })
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

#[async_trait]
impl TaskExtractor for HttpExtractor {
    async fn extract(
        &self,
        text: &str,
        reference: NaiveDateTime,
    ) -> Result<RawExtraction, ExtractError> {
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": build_instructions(reference)},
                {"role": "user", "content": text},
            ],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        });
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ExtractError::Api {
                status: status.as_u16(),
            });
        }
        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| ExtractError::MalformedOutput(e.to_string()))?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ExtractError::MalformedOutput("completion had no choices".into()))?;
        parse_extraction(&content)
    }
}

/// Embeds the reference instant and its calendar decomposition so the
/// extractor resolves "tomorrow" / "next friday" against the caller's
/// clock instead of its own notion of today.
pub fn build_instructions(reference: NaiveDateTime) -> String {
    format!(
        "You extract structured task fields from a short free-text note.\n\
         The current local date is {date}, a {weekday}, and the time is {time}.\n\
         Resolve every relative expression (\"tomorrow\", \"next friday\", \"in two hours\") \
         against that instant. A due date must never lie in the past.\n\
         Respond with ONLY a JSON object, no prose, with exactly these keys:\n\
         \"title\": the task description stripped of date, time and urgency wording, or null;\n\
         \"dueDate\": the due instant formatted \"YYYY-MM-DDTHH:MM:SS\", or null when the text \
         names no date or time;\n\
         \"urgency\": a number from 1 to 5, or null when the text expresses no urgency.",
        date = reference.format("%Y-%m-%d"),
        weekday = reference.format("%A"),
        time = reference.format("%H:%M"),
    )
}

/// Locates and strictly parses the JSON object inside a completion, which
/// may be wrapped in prose or code fences.
pub fn parse_extraction(completion: &str) -> Result<RawExtraction, ExtractError> {
    let block = json_block(completion)
        .ok_or_else(|| ExtractError::MalformedOutput("no JSON object in completion".into()))?;
    serde_json::from_str(block).map_err(|e| ExtractError::MalformedOutput(e.to_string()))
}

/// First balanced top-level `{...}` block in a text blob, string-aware.
fn json_block(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (idx, ch) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + idx + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Deterministic extractor for tests and offline development: returns a
/// canned extraction, or a malformed-output error when constructed with
/// [`StubExtractor::failing`].
pub struct StubExtractor {
    extraction: Option<RawExtraction>,
}

impl StubExtractor {
    pub fn returning(extraction: RawExtraction) -> Self {
        Self {
            extraction: Some(extraction),
        }
    }

    pub fn failing() -> Self {
        Self { extraction: None }
    }
}

#[async_trait]
impl TaskExtractor for StubExtractor {
    async fn extract(
        &self,
        _text: &str,
        _reference: NaiveDateTime,
    ) -> Result<RawExtraction, ExtractError> {
        self.extraction
            .clone()
            .ok_or_else(|| ExtractError::MalformedOutput("stub extractor failure".into()))
    }
}
