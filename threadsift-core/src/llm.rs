//! Optional LLM refinement via a local Ollama server.
//!
//! The pipeline never depends on the LLM being present: refinement failures
//! are logged and the rule-based brief stands. [`TextCompletion`] is the seam
//! tests use to inject fake completions.

use crate::config::LlmConfig;
use crate::error::{Error, Result};
use crate::format::clip_chars;
use crate::signals::Signals;
use crate::types::Message;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Character budget for the transcript portion of the refinement prompt.
const PROMPT_CONTEXT_CHARS: usize = 4000;

/// Single-shot text completion.
pub trait TextCompletion {
    /// Complete `prompt`, returning the generated text.
    fn complete(&self, prompt: &str) -> Result<String>;
}

// ============================================
// Ollama client
// ============================================

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
}

/// Blocking client for Ollama's `/api/generate` endpoint.
pub struct OllamaClient {
    config: LlmConfig,
    client: reqwest::blocking::Client,
}

impl OllamaClient {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Llm(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }
}

impl TextCompletion for OllamaClient {
    fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.config.endpoint);
        let request = GenerateRequest {
            model: &self.config.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                num_predict: self.config.max_tokens,
            },
        };

        tracing::debug!(model = %self.config.model, url = %url, "Requesting completion");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .map_err(|e| Error::Llm(format!("request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| Error::Llm(format!("server error: {}", e)))?;

        let body: GenerateResponse = response
            .json()
            .map_err(|e| Error::Llm(format!("invalid response body: {}", e)))?;

        Ok(body.response.unwrap_or_default().trim().to_string())
    }
}

/// Null refiner for pipelines running without a local model.
///
/// Always fails, which the summary path absorbs, so wiring this in is
/// equivalent to skipping refinement.
pub struct NoRefinement;

impl TextCompletion for NoRefinement {
    fn complete(&self, _prompt: &str) -> Result<String> {
        Err(Error::Llm("refinement disabled".to_string()))
    }
}

// ============================================
// Refinement prompt
// ============================================

/// Build the handoff-brief prompt from the transcript and extracted signals.
///
/// The transcript is clipped to a fixed character budget so the prompt stays
/// within small local model context windows.
pub fn refinement_prompt(messages: &[Message], signals: &Signals, max_brief_words: usize) -> String {
    let transcript = messages
        .iter()
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    let context = clip_chars(&transcript, PROMPT_CONTEXT_CHARS);

    format!(
        "You are creating a concise handoff brief for a new assistant. Keep it under {max_brief_words} words.\n\
         Use short bullet-style sentences. Include: brief context, key decisions, action items, open questions, constraints.\n\
         \n\
         Extracted signals (may be incomplete):\n\
         Decisions: {:?}\n\
         Actions: {:?}\n\
         Open questions: {:?}\n\
         Constraints: {:?}\n\
         \n\
         Transcript:\n\
         {context}\n\
         \n\
         Provide only the brief text.",
        signals.decisions, signals.actions, signals.open_questions, signals.constraints,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    #[test]
    fn test_prompt_includes_signals_and_transcript() {
        let messages = [Message::new(1, Role::User, "We will use Postgres")];
        let signals = Signals {
            decisions: vec!["We will use Postgres".to_string()],
            ..Default::default()
        };
        let prompt = refinement_prompt(&messages, &signals, 180);
        assert!(prompt.contains("under 180 words"));
        assert!(prompt.contains("We will use Postgres"));
        assert!(prompt.contains("Decisions:"));
    }

    #[test]
    fn test_prompt_clips_long_transcripts() {
        let long = "x".repeat(10_000);
        let messages = [Message::new(1, Role::User, long)];
        let prompt = refinement_prompt(&messages, &Signals::default(), 180);
        assert!(prompt.len() < 6000);
    }
}
