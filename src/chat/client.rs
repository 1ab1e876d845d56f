//! Gemini `generateContent` client.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_MODEL: &str = "gemini-pro";

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("No API key configured")]
    MissingApiKey,
    #[error("API Error: {0}")]
    Service(String),
    #[error("Invalid API response format")]
    InvalidResponse,
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ServiceError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ServiceError {
    message: String,
}

/// Connection settings for the completion endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http_client: Client,
    settings: ClientSettings,
}

impl GeminiClient {
    pub fn new(settings: ClientSettings) -> Result<Self, ChatError> {
        let http_client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self {
            http_client,
            settings,
        })
    }

    fn url(&self, api_key: &str) -> String {
        format!(
            "{}/{}:generateContent?key={}",
            self.settings.endpoint.trim_end_matches('/'),
            self.settings.model,
            api_key
        )
    }

    /// Send a single-turn query and return the first candidate's text.
    pub async fn complete(&self, query: &str) -> Result<String, ChatError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ChatError::MissingApiKey)?;

        info!(model = %self.settings.model, chars = query.len(), "Sending chat query");
        let response = self
            .http_client
            .post(self.url(api_key))
            .json(&request_body(query))
            .send()
            .await?;

        let status = response.status();
        debug!(status = status.as_u16(), "Chat response received");
        let body = response.text().await?;

        parse_response(&body).inspect_err(|e| {
            error!(status = status.as_u16(), "Chat call failed: {e}");
        })
    }
}

fn request_body(query: &str) -> GenerateRequest<'_> {
    GenerateRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![Part { text: query }],
        }],
    }
}

/// Extract `candidates[0].content.parts[0].text`, or the service error.
pub fn parse_response(body: &str) -> Result<String, ChatError> {
    let parsed: GenerateResponse =
        serde_json::from_str(body).map_err(|_| ChatError::InvalidResponse)?;

    let text = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text);

    match (text, parsed.error) {
        (Some(text), _) => Ok(text),
        (None, Some(service)) => Err(ChatError::Service(service.message)),
        (None, None) => Err(ChatError::InvalidResponse),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(request_body("status?")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": "status?"}]}]
            })
        );
    }

    #[test]
    fn test_parse_success() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"All systems nominal."}]}}]}"#;
        assert_eq!(parse_response(body).unwrap(), "All systems nominal.");
    }

    #[test]
    fn test_parse_service_error() {
        let body = r#"{"error":{"code":400,"message":"API key not valid"}}"#;
        let err = parse_response(body).unwrap_err();
        assert_eq!(err.to_string(), "API Error: API key not valid");
    }

    #[test]
    fn test_parse_invalid_shapes() {
        for body in ["not json", "{}", r#"{"candidates":[]}"#, r#"{"candidates":[{"content":{"parts":[]}}]}"#] {
            assert!(matches!(
                parse_response(body),
                Err(ChatError::InvalidResponse)
            ));
        }
    }

    #[test]
    fn test_url_includes_model_and_key() {
        let client = GeminiClient::new(ClientSettings::default()).unwrap();
        assert_eq!(
            client.url("abc"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent?key=abc"
        );
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_network() {
        let client = GeminiClient::new(ClientSettings::default()).unwrap();
        assert!(matches!(
            client.complete("hello").await,
            Err(ChatError::MissingApiKey)
        ));
    }
}
