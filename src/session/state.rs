// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Per-conversation session types.

use serde::{Deserialize, Serialize};

use crate::codegen::request::is_safe_filename;
use crate::config::ResolvedConfig;
use crate::error::{GenerationError, StoreError};

/// Mutable per-conversation state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// Model used for the next generation.
    pub model: String,
    /// Explicit target filename. `None` means infer from the instruction.
    pub active_filename: Option<String>,
}

impl SessionState {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            active_filename: None,
        }
    }
}

/// Which model ids a conversation may select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPolicy {
    default_model: String,
    allowed: Option<Vec<String>>,
}

impl ModelPolicy {
    /// Accept any non-empty model id.
    pub fn open(default_model: impl Into<String>) -> Self {
        Self {
            default_model: default_model.into(),
            allowed: None,
        }
    }

    /// Accept only the listed ids.
    pub fn closed(default_model: impl Into<String>, allowed: Vec<String>) -> Self {
        Self {
            default_model: default_model.into(),
            allowed: Some(allowed),
        }
    }

    pub fn from_config(config: &ResolvedConfig) -> Self {
        match &config.allowed_models {
            Some(allowed) => Self::closed(&config.default_model, allowed.clone()),
            None => Self::open(&config.default_model),
        }
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// The allow-list, if one is configured.
    pub fn allowed(&self) -> Option<&[String]> {
        self.allowed.as_deref()
    }

    /// Validate a requested model id, returning it trimmed.
    pub fn check(&self, model: &str) -> Result<String, GenerationError> {
        let model = model.trim();
        let permitted = !model.is_empty()
            && self
                .allowed
                .as_ref()
                .map_or(true, |allowed| allowed.iter().any(|m| m == model));

        if permitted {
            return Ok(model.to_string());
        }

        Err(GenerationError::ModelNotAllowed {
            model: model.to_string(),
            allowed: match &self.allowed {
                Some(allowed) => allowed.join(", "),
                None => "any non-empty model id".to_string(),
            },
        })
    }
}

/// Validate a filename for use as the active target.
pub fn check_active_filename(filename: &str) -> Result<String, StoreError> {
    let filename = filename.trim();
    if is_safe_filename(filename) {
        Ok(filename.to_string())
    } else {
        Err(StoreError::InvalidFilename(filename.to_string()))
    }
}
