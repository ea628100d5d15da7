// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration module for codesmith.
//!
//! Handles loading, merging, and validation of configuration from multiple sources:
//! - Global config: ~/.codesmith/config.json
//! - Workspace config: .codesmith.json, .codesmith/config.json, or codesmith.config.yaml
//! - Local config: .codesmith.local.json (gitignored, for personal overrides)
//! - CLI options and environment (`TELEGRAM_TOKEN`, `OPENAI_API_KEY`,
//!   `DEFAULT_MODEL`, `OUTPUT_DIR`, `OPENAI_REQUEST_TIMEOUT`)
//!
//! Configuration is merged with precedence (CLI/env > local > workspace > global > defaults).

mod loader;
mod merger;
mod types;

pub use loader::{
    get_example_config, get_global_config_path, init_config, load_config_file,
    load_global_config, load_local_config, load_workspace_config, CONFIG_FILES,
    LOCAL_CONFIG_FILE,
};

pub use merger::{default_config, merge_config, CliOptions};

pub use types::{
    Credentials, ResolvedConfig, WorkspaceConfig, DEFAULT_DIFF_INLINE_LIMIT, DEFAULT_MODEL,
    DEFAULT_OUTPUT_DIR, DEFAULT_REQUEST_TIMEOUT_SECS,
};

use crate::error::ConfigError;
use std::path::Path;

/// Load and merge all configuration sources for a workspace, then validate.
pub fn load_config(
    workspace_root: &Path,
    cli_options: CliOptions,
) -> Result<ResolvedConfig, ConfigError> {
    let global = load_global_config()?;
    let workspace = load_workspace_config(workspace_root)?;
    let local = load_local_config(workspace_root)?;

    let resolved = merge_config(global, workspace, local, cli_options);
    resolved.validate()?;
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_config_with_workspace_and_local() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(".codesmith.json"),
            r#"{"defaultModel": "gpt-4.1", "outputDir": "/srv/out"}"#,
        )
        .unwrap();
        std::fs::write(
            temp.path().join(".codesmith.local.json"),
            r#"{"outputDir": "/home/me/out"}"#,
        )
        .unwrap();

        let config = load_config(temp.path(), CliOptions::default()).unwrap();
        assert_eq!(config.default_model, "gpt-4.1");
        assert_eq!(config.output_dir, Path::new("/home/me/out"));
    }

    #[test]
    fn test_load_config_cli_override() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(".codesmith.json"), r#"{"defaultModel": "gpt-4.1"}"#).unwrap();

        let cli = CliOptions {
            model: Some("gpt-5-mini".to_string()),
            ..Default::default()
        };

        let config = load_config(temp.path(), cli).unwrap();
        assert_eq!(config.default_model, "gpt-5-mini");
    }

    #[test]
    fn test_load_config_rejects_invalid_values() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(".codesmith.json"), r#"{"requestTimeoutSecs": 0}"#).unwrap();

        let cli = CliOptions {
            request_timeout_secs: None,
            ..Default::default()
        };
        assert!(matches!(
            load_config(temp.path(), cli),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
