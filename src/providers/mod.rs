// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Model provider implementations.
//!
//! - [`openai::OpenAIProvider`] - OpenAI Responses API and compatible gateways
//!
//! ```rust,ignore
//! use codesmith::providers::create_provider_from_config;
//!
//! let model = create_provider_from_config(&config)?;
//! let response = model.complete(&request).await?;
//! ```

pub mod openai;

pub use openai::OpenAIProvider;

use std::sync::Arc;

use crate::config::ResolvedConfig;
use crate::error::ProviderError;
use crate::types::{ProviderConfig, SharedModel};

/// Build provider settings from resolved configuration.
pub fn provider_config(config: &ResolvedConfig) -> ProviderConfig {
    ProviderConfig {
        api_key: config.api_key.clone(),
        base_url: config.base_url.clone(),
        timeout_ms: Some(config.request_timeout_secs.saturating_mul(1000)),
        max_output_tokens: config.max_output_tokens,
    }
}

/// Create the shared model handle from resolved configuration.
pub fn create_provider_from_config(config: &ResolvedConfig) -> Result<SharedModel, ProviderError> {
    let provider = OpenAIProvider::new(provider_config(config))?;
    Ok(Arc::new(provider))
}
