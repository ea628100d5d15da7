// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! OpenAI Responses API provider.
//!
//! Sends one composed prompt as `input` with the fixed system instruction as
//! `instructions`, and returns the concatenated output text. Works with any
//! endpoint that speaks the `/responses` shape.
//!
//! # API Reference
//!
//! See [OpenAI Responses API](https://platform.openai.com/docs/api-reference/responses)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[cfg(feature = "telemetry")]
use std::time::Instant;
#[cfg(feature = "telemetry")]
use tracing::debug;

use crate::error::ProviderError;
use crate::types::{CodeModel, CompletionRequest, CompletionResponse, ProviderConfig, TokenUsage};

/// Default OpenAI API base URL.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Provider for the OpenAI Responses API.
pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    base_url: String,
    timeout_ms: u64,
    max_output_tokens: Option<u32>,
    provider_name: String,
}

impl std::fmt::Debug for OpenAIProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIProvider")
            .field("base_url", &self.base_url)
            .field("timeout_ms", &self.timeout_ms)
            .field("provider_name", &self.provider_name)
            .finish_non_exhaustive()
    }
}

impl OpenAIProvider {
    /// Create a new provider from connection settings.
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let api_key = config
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ProviderError::NotConfigured("API key required for OpenAI".to_string()))?;

        let timeout_ms = config.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_SECS * 1000);

        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("Failed to build HTTP client: {e}")))?;

        let base_url = config
            .base_url
            .unwrap_or_else(|| OPENAI_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let provider_name = Self::detect_provider_name(&base_url);

        Ok(Self {
            client,
            api_key,
            base_url,
            timeout_ms,
            max_output_tokens: config.max_output_tokens,
            provider_name,
        })
    }

    /// Create a provider for api.openai.com with default settings.
    pub fn openai(api_key: impl Into<String>) -> Result<Self, ProviderError> {
        Self::new(ProviderConfig::new(api_key))
    }

    /// Detect provider name from base URL.
    fn detect_provider_name(base_url: &str) -> String {
        if base_url.contains("openai.com") {
            "OpenAI".to_string()
        } else if base_url.contains("azure") {
            "Azure OpenAI".to_string()
        } else if base_url.contains("localhost") || base_url.contains("127.0.0.1") {
            "Local".to_string()
        } else {
            "OpenAI-Compatible".to_string()
        }
    }

    /// Build the request body for the Responses API.
    fn build_request(&self, request: &CompletionRequest) -> ResponsesRequest {
        ResponsesRequest {
            model: request.model.clone(),
            instructions: request.instructions.clone(),
            input: request.input.clone(),
            max_output_tokens: self.max_output_tokens,
        }
    }

    /// Handle an error response from the API.
    fn handle_error_response(&self, status_code: u16, body: &str) -> ProviderError {
        if let Ok(error) = serde_json::from_str::<ApiError>(body) {
            let message = error.error.message;
            match (status_code, error.error.error_type.as_deref(), error.error.code.as_deref()) {
                (401, _, _) | (_, Some("authentication_error"), _) | (_, _, Some("invalid_api_key")) => {
                    ProviderError::AuthError(message)
                }
                (429, _, _) | (_, Some("rate_limit_error"), _) | (_, _, Some("rate_limit_exceeded")) => {
                    ProviderError::RateLimited(message)
                }
                (_, _, Some("model_not_found")) => ProviderError::ModelNotFound(message),
                _ => ProviderError::api(message, status_code),
            }
        } else {
            ProviderError::api(body.to_string(), status_code)
        }
    }

    fn map_send_error(&self, err: reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::Timeout(self.timeout_ms)
        } else {
            ProviderError::NetworkError(err.to_string())
        }
    }
}

#[async_trait]
impl CodeModel for OpenAIProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        let body = self.build_request(request);

        #[cfg(feature = "telemetry")]
        let start = Instant::now();
        #[cfg(feature = "telemetry")]
        debug!(model = %request.model, input_len = request.input.len(), "Sending responses request");

        let response = self
            .client
            .post(format!("{}/responses", self.base_url))
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(self.handle_error_response(status.as_u16(), &error_text));
        }

        let api_response: ResponsesResponse = response
            .json()
            .await
            .map_err(|e| if e.is_timeout() {
                ProviderError::Timeout(self.timeout_ms)
            } else {
                ProviderError::ParseError(e.to_string())
            })?;

        let completion: CompletionResponse = api_response.into();

        #[cfg(feature = "telemetry")]
        debug!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            output_len = completion.text.len(),
            "Responses request complete"
        );

        Ok(completion)
    }

    fn name(&self) -> &str {
        &self.provider_name
    }
}

// ============================================================================
// API Types
// ============================================================================

/// Request body for the Responses API.
#[derive(Debug, Serialize)]
struct ResponsesRequest {
    model: String,
    instructions: String,
    input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

/// Response body for the Responses API.
#[derive(Debug, Deserialize)]
struct ResponsesResponse {
    /// Convenience aggregate some gateways include.
    #[serde(default)]
    output_text: Option<String>,
    #[serde(default)]
    output: Vec<OutputItem>,
    #[serde(default)]
    usage: Option<ResponsesUsage>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(rename = "type")]
    item_type: String,
    #[serde(default)]
    content: Vec<OutputContent>,
}

#[derive(Debug, Deserialize)]
struct OutputContent {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponsesUsage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

/// API error response.
#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

// ============================================================================
// Type Conversions
// ============================================================================

impl From<ResponsesResponse> for CompletionResponse {
    fn from(response: ResponsesResponse) -> Self {
        let text = match response.output_text.filter(|t| !t.is_empty()) {
            Some(text) => text,
            None => response
                .output
                .iter()
                .filter(|item| item.item_type == "message")
                .flat_map(|item| item.content.iter())
                .filter(|c| c.content_type == "output_text")
                .filter_map(|c| c.text.as_deref())
                .collect::<Vec<_>>()
                .join(""),
        };

        CompletionResponse {
            text,
            usage: response.usage.map(|u| TokenUsage {
                input_tokens: u.input_tokens,
                output_tokens: u.output_tokens,
            }),
        }
    }
}
