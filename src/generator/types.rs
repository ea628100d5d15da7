// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Generation result types.

use std::time::Duration;

use crate::codegen::diff::DiffSummary;
use crate::codegen::prompt::PromptMode;
use crate::codegen::request::TargetSpec;
use crate::store::Version;
use crate::types::TokenUsage;

/// Unified diff between the base and the new artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffReport {
    /// Rendered unified diff. Empty when nothing changed.
    pub text: String,
    pub summary: DiffSummary,
}

impl DiffReport {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Everything produced by one successful generation.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub target: TargetSpec,
    pub mode: PromptMode,
    /// Model id the request was sent to.
    pub model: String,
    /// The committed version.
    pub version: Version,
    /// Extracted code, exactly as committed.
    pub artifact: String,
    /// Base code the edit started from, if any.
    pub base: Option<String>,
    /// Present only when a base existed.
    pub diff: Option<DiffReport>,
    pub usage: Option<TokenUsage>,
    pub duration: Duration,
}

impl GenerationOutcome {
    /// Name to present the artifact under: filename without stamp or path.
    pub fn display_name(&self) -> &str {
        self.target.display_name()
    }

    /// Attachment name for an oversized diff: `<version stem>.diff.txt`.
    pub fn diff_attachment_name(&self) -> String {
        let file_name = self.version.file_name();
        let stem = std::path::Path::new(&file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_string)
            .unwrap_or(file_name);
        format!("{stem}.diff.txt")
    }
}
