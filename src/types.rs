// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Core types shared between the pipeline and model providers.
//!
//! The model endpoint is an external collaborator: given one composed prompt
//! it returns one text response. [`CodeModel`] is the seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::ProviderError;

// ============================================================================
// Request / Response
// ============================================================================

/// A single completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Model identifier selected for the conversation.
    pub model: String,
    /// System-level instruction.
    pub instructions: String,
    /// The composed prompt.
    pub input: String,
}

impl CompletionRequest {
    pub fn new(
        model: impl Into<String>,
        instructions: impl Into<String>,
        input: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            instructions: instructions.into(),
            input: input.into(),
        }
    }
}

/// Token usage reported by the endpoint, when available.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Raw text response from the model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Concatenated output text.
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

impl CompletionResponse {
    /// Create a response with text content only.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: None,
        }
    }
}

// ============================================================================
// Provider
// ============================================================================

/// Connection settings for a model provider.
#[derive(Debug, Clone, Default)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_ms: Option<u64>,
    pub max_output_tokens: Option<u32>,
}

impl ProviderConfig {
    /// Create a config with an API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Default::default()
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }
}

/// A text completion backend.
#[async_trait]
pub trait CodeModel: Send + Sync {
    /// Send one prompt and return the raw text response.
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, ProviderError>;

    /// Provider name for display and logging.
    fn name(&self) -> &str;
}

/// Shared, thread-safe model handle.
pub type SharedModel = Arc<dyn CodeModel>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_request_new() {
        let req = CompletionRequest::new("gpt-5", "system", "prompt");
        assert_eq!(req.model, "gpt-5");
        assert_eq!(req.instructions, "system");
        assert_eq!(req.input, "prompt");
    }

    #[test]
    fn test_provider_config_builder() {
        let config = ProviderConfig::new("sk-test")
            .with_base_url("http://localhost:8080/v1")
            .with_timeout_ms(5_000);
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:8080/v1"));
        assert_eq!(config.timeout_ms, Some(5_000));
    }

    #[test]
    fn test_response_serialization_skips_missing_usage() {
        let json = serde_json::to_string(&CompletionResponse::text("hi")).unwrap();
        assert!(!json.contains("usage"));
    }
}
