// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration loading from files.
//!
//! Handles loading configuration from JSON and YAML files in various locations.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

use super::types::WorkspaceConfig;

/// Config file names to search for (in order).
pub const CONFIG_FILES: &[&str] = &[
    ".codesmith.json",
    ".codesmith/config.json",
    "codesmith.config.yaml",
];

/// Local config file name (for per-directory overrides).
pub const LOCAL_CONFIG_FILE: &str = ".codesmith.local.json";

/// Global config directory name.
pub const GLOBAL_CONFIG_DIR: &str = ".codesmith";

/// Global config file name.
pub const GLOBAL_CONFIG_FILE: &str = "config.json";

/// Get the global config file path.
pub fn get_global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(GLOBAL_CONFIG_DIR).join(GLOBAL_CONFIG_FILE))
}

/// Load global configuration from ~/.codesmith/config.json.
pub fn load_global_config() -> Result<Option<WorkspaceConfig>, ConfigError> {
    let path = match get_global_config_path() {
        Some(p) => p,
        None => return Ok(None),
    };

    if !path.exists() {
        return Ok(None);
    }

    load_config_file(&path).map(Some)
}

/// Load workspace configuration, first match in [`CONFIG_FILES`] wins.
pub fn load_workspace_config(workspace_root: &Path) -> Result<Option<WorkspaceConfig>, ConfigError> {
    for filename in CONFIG_FILES {
        let path = workspace_root.join(filename);
        if path.exists() {
            return load_config_file(&path).map(Some);
        }
    }
    Ok(None)
}

/// Load local configuration from .codesmith.local.json.
pub fn load_local_config(workspace_root: &Path) -> Result<Option<WorkspaceConfig>, ConfigError> {
    let path = workspace_root.join(LOCAL_CONFIG_FILE);
    if !path.exists() {
        return Ok(None);
    }
    load_config_file(&path).map(Some)
}

/// Load a configuration file (JSON or YAML).
pub fn load_config_file(path: &Path) -> Result<WorkspaceConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");

    match extension.to_lowercase().as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&content).map_err(ConfigError::from),
        _ => serde_json::from_str(&content).map_err(ConfigError::from),
    }
}

/// Write a starter config file into the workspace.
pub fn init_config(workspace_root: &Path) -> Result<PathBuf, ConfigError> {
    let path = workspace_root.join(CONFIG_FILES[0]);
    let content = serde_json::to_string_pretty(&get_example_config())?;
    std::fs::write(&path, content)?;
    Ok(path)
}

/// Get an example configuration.
pub fn get_example_config() -> WorkspaceConfig {
    WorkspaceConfig {
        default_model: Some("gpt-5".to_string()),
        allowed_models: Some(vec![
            "gpt-5".to_string(),
            "gpt-5-mini".to_string(),
            "gpt-4.1".to_string(),
        ]),
        output_dir: Some(PathBuf::from("./out")),
        request_timeout_secs: Some(300),
        diff_inline_limit: Some(3500),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_json_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".codesmith.json");
        std::fs::write(&path, r#"{"defaultModel": "gpt-4.1", "diffInlineLimit": 100}"#).unwrap();

        let config = load_config_file(&path).unwrap();
        assert_eq!(config.default_model, Some("gpt-4.1".to_string()));
        assert_eq!(config.diff_inline_limit, Some(100));
    }

    #[test]
    fn test_load_yaml_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("codesmith.config.yaml");
        std::fs::write(&path, "outputDir: /tmp/out\nallowedModels:\n  - gpt-5\n").unwrap();

        let config = load_config_file(&path).unwrap();
        assert_eq!(config.output_dir, Some(PathBuf::from("/tmp/out")));
        assert_eq!(config.allowed_models, Some(vec!["gpt-5".to_string()]));
    }

    #[test]
    fn test_workspace_config_search_order() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(".codesmith.json"), r#"{"defaultModel": "first"}"#).unwrap();
        std::fs::write(temp.path().join("codesmith.config.yaml"), "defaultModel: last\n").unwrap();

        let config = load_workspace_config(temp.path()).unwrap().unwrap();
        assert_eq!(config.default_model, Some("first".to_string()));
    }

    #[test]
    fn test_missing_configs_are_none() {
        let temp = TempDir::new().unwrap();
        assert!(load_workspace_config(temp.path()).unwrap().is_none());
        assert!(load_local_config(temp.path()).unwrap().is_none());
    }

    #[test]
    fn test_invalid_json_reports_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".codesmith.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(load_config_file(&path), Err(ConfigError::JsonError(_))));
    }

    #[test]
    fn test_init_config_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = init_config(temp.path()).unwrap();
        let loaded = load_config_file(&path).unwrap();
        assert_eq!(loaded.default_model, Some("gpt-5".to_string()));
    }
}
