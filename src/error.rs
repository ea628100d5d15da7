// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Error types for codesmith.
//!
//! Each layer gets its own `thiserror` enum. The request-handling boundary
//! folds everything into [`GenerationError`] and renders it as a single
//! user-facing message; `anyhow` is used for top-level glue in the binary.

use thiserror::Error;

/// Errors that can occur while talking to the model endpoint.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("API error: {message}")]
    ApiError {
        message: String,
        status_code: Option<u16>,
    },

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Response parsing error: {0}")]
    ParseError(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Timeout after {0}ms")]
    Timeout(u64),
}

impl ProviderError {
    /// Create an API error with status code.
    pub fn api(message: impl Into<String>, status_code: u16) -> Self {
        Self::ApiError {
            message: message.into(),
            status_code: Some(status_code),
        }
    }

    /// Create an API error without status code.
    pub fn api_message(message: impl Into<String>) -> Self {
        Self::ApiError {
            message: message.into(),
            status_code: None,
        }
    }
}

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Missing required setting: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("IO error reading config: {0}")]
    IoError(String),

    #[error("YAML parsing error: {0}")]
    YamlError(String),

    #[error("JSON parsing error: {0}")]
    JsonError(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(err.to_string()),
            _ => Self::IoError(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError(err.to_string())
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::YamlError(err.to_string())
    }
}

/// Errors raised by the on-disk version store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid conversation id: {0:?}")]
    InvalidConversation(String),

    #[error("Invalid filename: {0:?}")]
    InvalidFilename(String),

    #[error("Version already exists: {0}")]
    VersionExists(String),

    #[error("IO error at {path}: {message}")]
    Io { path: String, message: String },
}

impl StoreError {
    /// Wrap an IO error with the path it happened on.
    pub fn io(path: &std::path::Path, err: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}

/// Errors surfaced by the generation pipeline.
///
/// All of these are caught at the request-handling boundary; none of them
/// terminate the serving process.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Instruction is empty. Send some text or a .txt document.")]
    EmptyInstruction,

    #[error("Model returned an empty artifact.")]
    EmptyArtifact,

    #[error("Unsupported attachment {0:?}: send a .txt document with the instruction.")]
    UnsupportedAttachment(String),

    #[error("Model {model:?} is not allowed (choose one of: {allowed})")]
    ModelNotAllowed { model: String, allowed: String },

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type alias using anyhow for flexible error handling.
pub type Result<T> = anyhow::Result<T>;
