// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Generative tips collaborator.
//!
//! Handles:
//! - The provider contract (summary in, tips out)
//! - A Google Generative Language client asking for three tips as JSON
//! - Lenient parsing of the model's JSON reply

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Request sent to a tips provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TipsRequest {
    pub activity_summary: String,
    /// Cache buster only; carries no meaning
    #[serde(skip_serializing_if = "Option::is_none")]
    pub randomizer: Option<f64>,
}

/// Tips returned by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TipsResponse {
    pub tips: Vec<String>,
}

/// Tips provider errors.
#[derive(Debug, thiserror::Error)]
pub enum TipsError {
    #[error("Tips request failed: {0}")]
    Http(String),

    #[error("Tips API returned HTTP {0}: {1}")]
    Status(u16, String),

    #[error("Invalid tips response: {0}")]
    InvalidResponse(String),
}

/// Source of personalized tips.
#[async_trait]
pub trait TipsProvider: Send + Sync {
    async fn suggest(&self, request: TipsRequest) -> Result<TipsResponse, TipsError>;
}

// ─── Gemini Client ───────────────────────────────────────────

/// Google Generative Language API client.
#[derive(Clone)]
pub struct GeminiTipsClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GeminiTipsClient {
    pub fn new(base_url: &str, model: &str, api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[async_trait]
impl TipsProvider for GeminiTipsClient {
    async fn suggest(&self, request: TipsRequest) -> Result<TipsResponse, TipsError> {
        let body = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": build_prompt(&request) }]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "temperature": 0.9
            }
        });

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| TipsError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TipsError::Status(status.as_u16(), body));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| TipsError::InvalidResponse(e.to_string()))?;

        let text = parsed
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .find_map(|p| p.text)
            .ok_or_else(|| TipsError::InvalidResponse("no candidate text".to_string()))?;

        parse_tips_payload(&text)
    }
}

fn build_prompt(request: &TipsRequest) -> String {
    let hint = request
        .randomizer
        .map(|r| r.to_string())
        .unwrap_or_default();

    format!(
        "You help people reduce their carbon footprint.\n\n\
         Based on the summary below of the user's recent activities and their CO2e \
         emissions, give 3 specific, actionable and encouraging tips.\n\
         Reply with JSON only: {{\"tips\": [\"...\", \"...\", \"...\"]}}\n\n\
         Activity Summary: {}\n\
         Regeneration Hint: {}",
        request.activity_summary, hint
    )
}

/// Parse `{"tips": [...]}` from model output, tolerating a fenced block or
/// surrounding prose.
pub fn parse_tips_payload(content: &str) -> Result<TipsResponse, TipsError> {
    let extracted = extract_json_block(content);
    let parsed: TipsResponse = serde_json::from_str(&extracted)
        .map_err(|e| TipsError::InvalidResponse(format!("{}: {}", e, content)))?;

    let tips = parsed
        .tips
        .into_iter()
        .map(|tip| tip.trim().to_string())
        .filter(|tip| !tip.is_empty())
        .collect();

    Ok(TipsResponse { tips })
}

fn extract_json_block(content: &str) -> String {
    let fenced = content.split("```").map(str::trim).find_map(|block| {
        block
            .strip_prefix("json")
            .map(str::trim)
            .or_else(|| block.starts_with('{').then_some(block))
    });

    match fenced {
        Some(block) => block.to_string(),
        None => {
            let first = content.find('{');
            let last = content.rfind('}');

            match (first, last) {
                (Some(start), Some(end)) if end > start => content[start..=end].to_string(),
                _ => content.trim().to_string(),
            }
        }
    }
}
