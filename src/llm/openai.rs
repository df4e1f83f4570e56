//! OpenAI-compatible chat-completion client with automatic retry for
//! transient errors.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::error::{classify_http_status, LlmError, LlmErrorKind, RetryConfig};
use super::{ChatMessage, ChatOptions, ChatResponse, LlmClient, TokenUsage};

const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// HTTP client for OpenAI-compatible chat-completion endpoints.
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    api_url: String,
    timeout: Duration,
    retry_config: RetryConfig,
}

impl OpenAiClient {
    /// Create a client against the default OpenAI endpoint with default
    /// timeout and retry configuration.
    pub fn new(api_key: String) -> Self {
        Self::with_config(
            api_key,
            DEFAULT_API_URL.to_string(),
            DEFAULT_TIMEOUT,
            RetryConfig::default(),
        )
    }

    /// Create a client with an explicit endpoint, timeout, and retry policy.
    pub fn with_config(
        api_key: String,
        api_url: String,
        timeout: Duration,
        retry_config: RetryConfig,
    ) -> Self {
        Self {
            client: Client::new(),
            api_key,
            api_url,
            timeout,
            retry_config,
        }
    }

    /// Parse Retry-After header if present (seconds form only).
    fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
        headers
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok().map(Duration::from_secs))
    }

    /// Create an LlmError from HTTP response status and body.
    fn create_error(
        status: reqwest::StatusCode,
        body: &str,
        retry_after: Option<Duration>,
    ) -> LlmError {
        let status_code = status.as_u16();
        match classify_http_status(status_code) {
            LlmErrorKind::RateLimited => LlmError::rate_limited(body, retry_after),
            LlmErrorKind::ServerError => LlmError::server_error(status_code, body),
            _ => LlmError::client_error(status_code, body),
        }
    }

    /// Execute a single request without retry.
    async fn execute_request(&self, request: &CompletionRequest<'_>) -> Result<ChatResponse, LlmError> {
        let response = match self
            .client
            .post(&self.api_url)
            .timeout(self.timeout)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                if e.is_timeout() {
                    return Err(LlmError::network_error(format!("request timeout: {}", e)));
                } else if e.is_connect() {
                    return Err(LlmError::network_error(format!("connection failed: {}", e)));
                } else {
                    return Err(LlmError::network_error(format!("request failed: {}", e)));
                }
            }
        };

        let status = response.status();
        let retry_after = Self::parse_retry_after(response.headers());
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(Self::create_error(status, &body, retry_after));
        }

        Self::parse_response_body(&body, request.model)
    }

    /// Decode a success-status response body.
    ///
    /// An unparseable body is logged in full; the returned error carries
    /// only a generic message, since it can end up in a caller-facing
    /// error shape.
    fn parse_response_body(body: &str, request_model: &str) -> Result<ChatResponse, LlmError> {
        let parsed: CompletionResponse = serde_json::from_str(body).map_err(|e| {
            tracing::error!(error = %e, body = %body, "unparseable completion response body");
            LlmError::parse_error(format!("failed to parse completion response: {}", e))
        })?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::parse_error("no choices in completion response"))?;

        Ok(ChatResponse {
            content: choice.message.content,
            finish_reason: choice.finish_reason,
            usage: parsed
                .usage
                .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens)),
            model: parsed.model.or_else(|| Some(request_model.to_string())),
        })
    }

    /// Execute a request with automatic retry for transient errors.
    async fn execute_with_retry(
        &self,
        request: &CompletionRequest<'_>,
    ) -> Result<ChatResponse, LlmError> {
        let start = Instant::now();
        let mut attempt = 0;

        loop {
            match self.execute_request(request).await {
                Ok(response) => {
                    if attempt > 0 {
                        tracing::info!(
                            "completion succeeded after {} retries (total time: {:?})",
                            attempt,
                            start.elapsed()
                        );
                    }
                    return Ok(response);
                }
                Err(error) => {
                    let should_retry = self.retry_config.should_retry(&error)
                        && attempt < self.retry_config.max_retries;

                    if !should_retry {
                        if attempt > 0 {
                            tracing::error!(
                                "completion failed after {} retries (total time: {:?}): {}",
                                attempt,
                                start.elapsed(),
                                error
                            );
                        } else {
                            tracing::error!("completion failed (non-retryable): {}", error);
                        }
                        return Err(error);
                    }

                    let delay = error.suggested_delay(attempt);
                    let remaining = self
                        .retry_config
                        .max_retry_duration
                        .saturating_sub(start.elapsed());
                    let actual_delay = delay.min(remaining);

                    if actual_delay.is_zero() {
                        tracing::warn!(
                            "retry attempt {} failed, no time remaining: {}",
                            attempt + 1,
                            error
                        );
                        return Err(error);
                    }

                    tracing::warn!(
                        "retry attempt {} failed with {}, retrying in {:?}: {}",
                        attempt + 1,
                        error.kind,
                        actual_delay,
                        error.message
                    );

                    tokio::time::sleep(actual_delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn chat_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: ChatOptions,
    ) -> Result<ChatResponse, LlmError> {
        let request = CompletionRequest {
            model,
            messages,
            temperature: options.temperature,
            top_p: options.top_p,
            max_tokens: options.max_tokens,
        };

        tracing::debug!(model, url = %self.api_url, "sending completion request");

        self.execute_with_retry(&request).await
    }
}

/// Chat-completions request payload.
#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u64>,
}

/// Chat-completions response payload.
#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
    #[serde(default)]
    usage: Option<CompletionUsage>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    /// Absent for e.g. pure tool-call responses; the pipeline treats a
    /// missing content field as a malformed upstream response.
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
    #[serde(rename = "total_tokens")]
    _total_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Role;

    #[test]
    fn request_serializes_sampling_params() {
        let messages = vec![
            ChatMessage::system("only JSON"),
            ChatMessage::user("generate tasks"),
        ];
        let request = CompletionRequest {
            model: "gpt-4o-mini",
            messages: &messages,
            temperature: Some(0.7),
            top_p: None,
            max_tokens: Some(1000),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["temperature"], 0.7);
        assert_eq!(json["max_tokens"], 1000);
        assert!(json.get("top_p").is_none());
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "generate tasks");
    }

    #[test]
    fn response_without_content_deserializes_to_none() {
        let body = r#"{"choices":[{"message":{},"finish_reason":"stop"}]}"#;
        let parsed: CompletionResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.choices[0].message.content.is_none());
    }

    #[test]
    fn response_with_usage_deserializes() {
        let body = r#"{
            "model": "gpt-4o-mini",
            "choices": [{"message": {"content": "[]"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
        }"#;
        let parsed: CompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("[]"));
        assert_eq!(parsed.usage.unwrap().prompt_tokens, 12);
    }

    #[test]
    fn unparseable_body_stays_out_of_the_error_message() {
        let err = OpenAiClient::parse_response_body("<html>upstream went sideways</html>", "gpt-4o-mini")
            .unwrap_err();
        assert_eq!(err.kind, LlmErrorKind::ParseError);
        assert!(err.message.contains("failed to parse completion response"));
        assert!(!err.message.contains("upstream went sideways"));
    }

    #[test]
    fn parsed_body_falls_back_to_request_model() {
        let body = r#"{"choices":[{"message":{"content":"[]"},"finish_reason":"stop"}]}"#;
        let response = OpenAiClient::parse_response_body(body, "gpt-4o-mini").unwrap();
        assert_eq!(response.model.as_deref(), Some("gpt-4o-mini"));
    }

    #[test]
    fn message_roles_round_trip() {
        let msg = ChatMessage::system("s");
        assert_eq!(msg.role, Role::System);
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"role":"system","content":"s"}"#);
    }
}
