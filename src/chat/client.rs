//! Completion endpoint client.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

/// Reply used when the endpoint answers with an unexpected payload shape.
pub const FALLBACK_REPLY: &str = "Sorry, I could not generate a response.";

/// Default endpoint host.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default model.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// One completion round trip.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send `prompt` and return the reply text.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the endpoint answers with a
    /// non-success status.
    async fn complete(&self, prompt: &str, credential: &str) -> Result<String, ChatError>;
}

/// Failure of one completion round trip.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// Connection, TLS or body transfer failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("Request failed: {status} - {message}")]
    Api { status: u16, message: String },

    /// The response body was not JSON.
    #[error("Parse error: {0}")]
    Parse(String),
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [GenerateContent<'a>; 1],
}

#[derive(Serialize)]
struct GenerateContent<'a> {
    parts: [GeneratePart<'a>; 1],
}

#[derive(Serialize)]
struct GeneratePart<'a> {
    text: &'a str,
}

/// Client for the `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    base_url: String,
    model: String,
}

impl GeminiClient {
    /// Client for `model` at `base_url`. A trailing slash on the URL is ignored.
    #[must_use]
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_http(Client::new(), base_url, model)
    }

    /// Use a preconfigured HTTP client (proxy, timeouts).
    #[must_use]
    pub fn with_http(http: Client, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

impl Default for GeminiClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, DEFAULT_MODEL)
    }
}

#[async_trait]
impl CompletionClient for GeminiClient {
    async fn complete(&self, prompt: &str, credential: &str) -> Result<String, ChatError> {
        let body = GenerateRequest {
            contents: [GenerateContent {
                parts: [GeneratePart { text: prompt }],
            }],
        };

        let resp = self
            .http
            .post(self.endpoint())
            .query(&[("key", credential)])
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(ChatError::Api { status, message });
        }

        let text = resp.text().await?;
        let data: Value =
            serde_json::from_str(&text).map_err(|e| ChatError::Parse(e.to_string()))?;
        Ok(extract_reply(&data))
    }
}

/// Pull `candidates[0].content.parts[0].text`, or the fallback when the
/// field is missing, not a string, or empty.
#[must_use]
pub fn extract_reply(data: &Value) -> String {
    data.pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map_or_else(|| FALLBACK_REPLY.to_string(), str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_first_candidate_text() {
        let data = json!({
            "candidates": [
                {"content": {"parts": [{"text": "Focus on X"}, {"text": "ignored"}]}},
                {"content": {"parts": [{"text": "second candidate"}]}}
            ]
        });
        assert_eq!(extract_reply(&data), "Focus on X");
    }

    #[test]
    fn missing_candidates_falls_back() {
        assert_eq!(extract_reply(&json!({})), FALLBACK_REPLY);
        assert_eq!(extract_reply(&json!({"candidates": []})), FALLBACK_REPLY);
    }

    #[test]
    fn wrong_shape_falls_back() {
        let data = json!({"candidates": [{"content": {"parts": [{"text": 42}]}}]});
        assert_eq!(extract_reply(&data), FALLBACK_REPLY);

        let data = json!({"candidates": [{"finishReason": "SAFETY"}]});
        assert_eq!(extract_reply(&data), FALLBACK_REPLY);
    }

    #[test]
    fn empty_text_falls_back() {
        let data = json!({"candidates": [{"content": {"parts": [{"text": ""}]}}]});
        assert_eq!(extract_reply(&data), FALLBACK_REPLY);
    }

    #[test]
    fn request_body_shape() {
        let body = GenerateRequest {
            contents: [GenerateContent {
                parts: [GeneratePart { text: "hello" }],
            }],
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"contents": [{"parts": [{"text": "hello"}]}]})
        );
    }

    #[test]
    fn endpoint_trims_trailing_slash() {
        let client = GeminiClient::new("http://127.0.0.1:9/", "test-model");
        assert_eq!(
            client.endpoint(),
            "http://127.0.0.1:9/v1beta/models/test-model:generateContent"
        );
    }
}
