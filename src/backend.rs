//! The four language-model operations behind the assistant.
//!
//! Each operation is a stateless request/response call against the Anthropic
//! messages API: translate a request into a command, assess its danger,
//! explain it, or revise it. Domain failures (the model produced nothing
//! usable) are typed separately from transport failures so callers can choose
//! what is fatal.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{AssessError, BackendError, EditError, TranslateError};
use crate::http::HttpClient;
use crate::session::DangerAssessment;

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const MODEL: &str = "claude-3-haiku-20240307";
const MAX_TOKENS: u32 = 500;

/// The language-model operations the interaction loop depends on.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Translates a natural-language request into one shell command.
    async fn translate(&self, prompt: &str) -> Result<String, TranslateError>;

    /// Asks whether running the command could have harmful consequences.
    async fn assess_danger(&self, command: &str) -> Result<DangerAssessment, AssessError>;

    /// Produces a natural-language explanation of the command.
    async fn explain(&self, command: &str) -> Result<String, BackendError>;

    /// Revises the command according to a free-text instruction.
    async fn edit(&self, command: &str, instruction: &str) -> Result<String, EditError>;
}

#[derive(Debug, Deserialize)]
struct TranslationPayload {
    shell_command: String,
}

#[derive(Debug, Deserialize)]
struct AssessmentPayload {
    dangerous_to_run: bool,
    #[serde(default)]
    dangerous_consequences: String,
}

#[derive(Debug, Deserialize)]
struct EditPayload {
    edited_shell_command: String,
}

/// Production backend talking to the Anthropic messages API.
pub struct LlmBackend {
    http: Arc<dyn HttpClient>,
    api_key: String,
}

impl LlmBackend {
    pub fn new(http: Arc<dyn HttpClient>, api_key: String) -> Self {
        Self { http, api_key }
    }

    /// Sends one prompt and returns the model's reply text.
    async fn complete(&self, prompt: &str) -> Result<String, BackendError> {
        let body = json!({
            "model": MODEL,
            "max_tokens": MAX_TOKENS,
            "messages": [
                {
                    "role": "user",
                    "content": prompt
                }
            ]
        });

        let response = self
            .http
            .post_json(
                API_URL,
                &[
                    ("x-api-key", self.api_key.as_str()),
                    ("content-type", "application/json"),
                    ("anthropic-version", API_VERSION),
                ],
                &body,
            )
            .await?;

        let body = response.into_body()?;
        extract_reply_text(&body)
    }
}

/// Pulls `content[0].text` out of a messages-API response envelope.
fn extract_reply_text(body: &str) -> Result<String, BackendError> {
    let envelope: serde_json::Value = serde_json::from_str(body)
        .map_err(|_| BackendError::Unknown(format!("unparseable API response: {body}")))?;

    envelope
        .get("content")
        .and_then(|c| c.as_array())
        .and_then(|arr| arr.first())
        .and_then(|item| item.get("text"))
        .and_then(|text| text.as_str())
        .map(|text| text.trim().to_string())
        .ok_or_else(|| BackendError::Unknown(format!("API response had no text content: {body}")))
}

/// Strips a Markdown code fence if the model wrapped its JSON in one.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

#[async_trait]
impl Backend for LlmBackend {
    async fn translate(&self, prompt: &str) -> Result<String, TranslateError> {
        info!("Translating request into a shell command");
        let reply = self
            .complete(&format!(
                "You translate natural language into a single shell command for a \
                 POSIX shell.\n\n\
                 Request: \"{prompt}\"\n\n\
                 RESPOND WITH EXACTLY THIS JSON, NO OTHER TEXT:\n\
                 {{\"shell_command\": \"the command\"}}\n\n\
                 If no shell command can fulfil the request, use an empty string."
            ))
            .await?;

        let payload: TranslationPayload = serde_json::from_str(strip_code_fence(&reply))
            .map_err(|_| {
                warn!("Unparseable translation reply: {}", reply);
                TranslateError::NoCommand
            })?;

        let command = payload.shell_command.trim().to_string();
        if command.is_empty() {
            return Err(TranslateError::NoCommand);
        }
        Ok(command)
    }

    async fn assess_danger(&self, command: &str) -> Result<DangerAssessment, AssessError> {
        let reply = self
            .complete(&format!(
                "Decide whether this shell command is potentially dangerous to run \
                 (data loss, security risk, system damage, hard to undo):\n\n\
                 {command}\n\n\
                 RESPOND WITH EXACTLY THIS JSON, NO OTHER TEXT:\n\
                 {{\"dangerous_to_run\": true or false, \
                 \"dangerous_consequences\": \"short description, empty if safe\"}}"
            ))
            .await?;

        let payload: AssessmentPayload = serde_json::from_str(strip_code_fence(&reply))
            .map_err(|_| {
                warn!("Unparseable danger assessment: {}", reply);
                AssessError::Unrecognized
            })?;

        Ok(DangerAssessment {
            is_dangerous: payload.dangerous_to_run,
            consequences: payload.dangerous_consequences.trim().to_string(),
        })
    }

    async fn explain(&self, command: &str) -> Result<String, BackendError> {
        self.complete(&format!(
            "Explain what this shell command does, part by part, in a few short \
             bullet points a non-expert can follow. Respond with plain text only, \
             no JSON and no code fences:\n\n{command}"
        ))
        .await
    }

    async fn edit(&self, command: &str, instruction: &str) -> Result<String, EditError> {
        info!("Revising command from user instruction");
        let reply = self
            .complete(&format!(
                "Revise this shell command according to the instruction.\n\n\
                 Command: {command}\n\
                 Instruction: {instruction}\n\n\
                 RESPOND WITH EXACTLY THIS JSON, NO OTHER TEXT:\n\
                 {{\"edited_shell_command\": \"the revised command\"}}\n\n\
                 If the instruction cannot be applied, use an empty string."
            ))
            .await?;

        let payload: EditPayload =
            serde_json::from_str(strip_code_fence(&reply)).map_err(|_| {
                warn!("Unparseable edit reply: {}", reply);
                EditError::Unusable
            })?;

        let edited = payload.edited_shell_command.trim().to_string();
        if edited.is_empty() {
            return Err(EditError::Unusable);
        }
        Ok(edited)
    }
}
