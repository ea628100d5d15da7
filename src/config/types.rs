// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration type definitions.
//!
//! Defines the structure of file-based and resolved configuration,
//! supporting JSON and YAML formats. Credentials never come from config
//! files; they arrive through the environment or CLI flags.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "gpt-5";

/// Default output root for version history.
pub const DEFAULT_OUTPUT_DIR: &str = "/data/out";

/// Default model request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Diffs up to this many characters are sent inline; longer ones as a file.
pub const DEFAULT_DIFF_INLINE_LIMIT: usize = 3500;

/// File-based configuration.
/// Can be defined in .codesmith.json, .codesmith/config.json or codesmith.config.yaml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceConfig {
    /// Model identifier used when a conversation has not picked one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,

    /// Closed list of models a conversation may select
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_models: Option<Vec<String>>,

    /// Root directory for per-conversation version history
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,

    /// Custom base URL for the Responses endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Model request timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,

    /// Cap on generated tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,

    /// Maximum diff length sent inline
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_inline_limit: Option<usize>,
}

/// Fully resolved configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedConfig {
    /// Chat transport authentication token
    #[serde(skip)]
    pub chat_token: Option<String>,
    /// Model API key
    #[serde(skip)]
    pub api_key: Option<String>,
    pub default_model: String,
    pub allowed_models: Option<Vec<String>>,
    pub output_dir: PathBuf,
    pub base_url: Option<String>,
    pub request_timeout_secs: u64,
    pub max_output_tokens: Option<u32>,
    pub diff_inline_limit: usize,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            chat_token: None,
            api_key: None,
            default_model: DEFAULT_MODEL.to_string(),
            allowed_models: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            base_url: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_output_tokens: None,
            diff_inline_limit: DEFAULT_DIFF_INLINE_LIMIT,
        }
    }
}

/// Credentials required to start serving.
#[derive(Clone)]
pub struct Credentials {
    pub chat_token: Option<String>,
    pub api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("chat_token", &self.chat_token.as_ref().map(|_| "<redacted>"))
            .field("api_key", &"<redacted>")
            .finish()
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl ResolvedConfig {
    /// Check that the credentials needed at startup are present.
    ///
    /// The model API key is always required. The chat token is required
    /// only for transports that authenticate against a chat service.
    pub fn credentials(&self, require_chat_token: bool) -> Result<Credentials, ConfigError> {
        let api_key = non_blank(&self.api_key)
            .ok_or_else(|| ConfigError::MissingField("OPENAI_API_KEY".to_string()))?;

        let chat_token = non_blank(&self.chat_token);
        if require_chat_token && chat_token.is_none() {
            return Err(ConfigError::MissingField("TELEGRAM_TOKEN".to_string()));
        }

        Ok(Credentials { chat_token, api_key })
    }

    /// Validate settings that have a restricted range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_model.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "defaultModel".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "requestTimeoutSecs".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if let Some(allowed) = &self.allowed_models {
            if !allowed.iter().any(|m| m == &self.default_model) {
                return Err(ConfigError::InvalidValue {
                    field: "allowedModels".to_string(),
                    message: format!("must include the default model {:?}", self.default_model),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_defaults() {
        let config = ResolvedConfig::default();
        assert_eq!(config.default_model, "gpt-5");
        assert_eq!(config.output_dir, PathBuf::from("/data/out"));
        assert_eq!(config.request_timeout_secs, 300);
        assert_eq!(config.diff_inline_limit, 3500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_credentials_require_api_key() {
        let config = ResolvedConfig {
            chat_token: Some("123:abc".to_string()),
            api_key: Some("  ".to_string()),
            ..Default::default()
        };
        match config.credentials(true) {
            Err(ConfigError::MissingField(field)) => assert_eq!(field, "OPENAI_API_KEY"),
            other => panic!("expected missing api key, got {other:?}"),
        }
    }

    #[test]
    fn test_credentials_chat_token_optional_for_local() {
        let config = ResolvedConfig {
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        };
        let creds = config.credentials(false).unwrap();
        assert_eq!(creds.api_key, "sk-test");
        assert!(creds.chat_token.is_none());

        match config.credentials(true) {
            Err(ConfigError::MissingField(field)) => assert_eq!(field, "TELEGRAM_TOKEN"),
            other => panic!("expected missing chat token, got {other:?}"),
        }
    }

    #[test]
    fn test_credentials_with_chat_token() {
        let config = ResolvedConfig {
            api_key: Some("sk-test".to_string()),
            chat_token: Some("123:abc".to_string()),
            ..Default::default()
        };
        let creds = config.credentials(true).unwrap();
        assert_eq!(creds.chat_token.as_deref(), Some("123:abc"));
    }

    #[test]
    fn test_credentials_debug_redacts() {
        let creds = Credentials {
            chat_token: Some("secret-token".to_string()),
            api_key: "sk-secret".to_string(),
        };
        let debug = format!("{creds:?}");
        assert!(!debug.contains("secret-token"));
        assert!(!debug.contains("sk-secret"));
    }

    #[test]
    fn test_secrets_not_serialized() {
        let config = ResolvedConfig {
            api_key: Some("sk-secret".to_string()),
            chat_token: Some("tok".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("sk-secret"));
        assert!(json.contains("defaultModel"));
    }

    #[test]
    fn test_validate_allow_list_must_contain_default() {
        let config = ResolvedConfig {
            allowed_models: Some(vec!["gpt-4.1".to_string()]),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_validate_zero_timeout() {
        let config = ResolvedConfig {
            request_timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
