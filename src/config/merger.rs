// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration merging.
//!
//! Handles merging configurations from different sources with proper precedence.

use std::path::PathBuf;

use super::types::{ResolvedConfig, WorkspaceConfig};

/// CLI / environment options that can override configuration.
#[derive(Debug, Clone, Default)]
pub struct CliOptions {
    pub chat_token: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

/// Default configuration values.
pub fn default_config() -> ResolvedConfig {
    ResolvedConfig::default()
}

/// Merge multiple configurations with precedence.
///
/// Precedence (highest to lowest):
/// 1. CLI options and environment
/// 2. Local config (.codesmith.local.json)
/// 3. Workspace config (.codesmith.json)
/// 4. Global config (~/.codesmith/config.json)
/// 5. Default values
pub fn merge_config(
    global: Option<WorkspaceConfig>,
    workspace: Option<WorkspaceConfig>,
    local: Option<WorkspaceConfig>,
    cli: CliOptions,
) -> ResolvedConfig {
    let mut result = default_config();

    for config in [global, workspace, local].into_iter().flatten() {
        apply_workspace_config(&mut result, &config);
    }

    apply_cli_options(&mut result, &cli);

    result
}

fn apply_workspace_config(result: &mut ResolvedConfig, config: &WorkspaceConfig) {
    if let Some(ref model) = config.default_model {
        result.default_model = model.clone();
    }

    if config.allowed_models.is_some() {
        result.allowed_models = config.allowed_models.clone();
    }

    if let Some(ref dir) = config.output_dir {
        result.output_dir = dir.clone();
    }

    if config.base_url.is_some() {
        result.base_url = config.base_url.clone();
    }

    if let Some(timeout) = config.request_timeout_secs {
        result.request_timeout_secs = timeout;
    }

    if config.max_output_tokens.is_some() {
        result.max_output_tokens = config.max_output_tokens;
    }

    if let Some(limit) = config.diff_inline_limit {
        result.diff_inline_limit = limit;
    }
}

fn apply_cli_options(result: &mut ResolvedConfig, cli: &CliOptions) {
    if cli.chat_token.is_some() {
        result.chat_token = cli.chat_token.clone();
    }

    if cli.api_key.is_some() {
        result.api_key = cli.api_key.clone();
    }

    if let Some(ref model) = cli.model {
        result.default_model = model.trim().to_string();
    }

    if let Some(ref dir) = cli.output_dir {
        result.output_dir = dir.clone();
    }

    if cli.base_url.is_some() {
        result.base_url = cli.base_url.clone();
    }

    if let Some(timeout) = cli.request_timeout_secs {
        result.request_timeout_secs = timeout;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = default_config();
        assert_eq!(config.default_model, "gpt-5");
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_merge_config_precedence() {
        let global = WorkspaceConfig {
            default_model: Some("global-model".to_string()),
            diff_inline_limit: Some(10),
            ..Default::default()
        };
        let workspace = WorkspaceConfig {
            default_model: Some("workspace-model".to_string()),
            output_dir: Some(PathBuf::from("/srv/out")),
            ..Default::default()
        };
        let local = WorkspaceConfig {
            default_model: Some("local-model".to_string()),
            ..Default::default()
        };

        let config = merge_config(Some(global), Some(workspace), Some(local), CliOptions::default());
        assert_eq!(config.default_model, "local-model");
        assert_eq!(config.output_dir, PathBuf::from("/srv/out"));
        assert_eq!(config.diff_inline_limit, 10);
    }

    #[test]
    fn test_cli_options_override() {
        let workspace = WorkspaceConfig {
            default_model: Some("workspace-model".to_string()),
            request_timeout_secs: Some(60),
            ..Default::default()
        };
        let cli = CliOptions {
            api_key: Some("sk-cli".to_string()),
            model: Some(" gpt-4.1 ".to_string()),
            request_timeout_secs: Some(5),
            ..Default::default()
        };

        let config = merge_config(None, Some(workspace), None, cli);
        assert_eq!(config.default_model, "gpt-4.1");
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.api_key.as_deref(), Some("sk-cli"));
    }
}
