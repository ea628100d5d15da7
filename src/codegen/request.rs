// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Instruction parsing and target inference.
//!
//! An instruction may start with header lines:
//!
//! ```text
//! filename: my_app.py
//! language: python
//! Build a CLI that ...
//! ```
//!
//! and may carry base code in a fenced block. Parsing splits the base code
//! out; inference decides the target file and language. Inference is pure
//! and reports how confident it is through [`Confidence`].

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use super::extract::find_fenced_span;

/// Filename used when nothing else names the target.
pub const DEFAULT_FILENAME: &str = "code.py";

/// Language used when no hint is present.
pub const DEFAULT_LANGUAGE: &str = "python";

/// Language tag for files with an unrecognized extension.
pub const PLAIN_TEXT_LANGUAGE: &str = "text";

/// Keyword that triggers the alternate target when nothing was declared.
const HEURISTIC_KEYWORD: &str = "javascript";
const HEURISTIC_FILENAME: &str = "app.js";
const HEURISTIC_LANGUAGE: &str = "javascript";

/// How many leading lines may carry a language hint.
const LANGUAGE_HINT_LINES: usize = 3;

static FILENAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*filename\s*:\s*([A-Za-z0-9._/\-]+)\s*$").expect("filename pattern is valid")
});

static LANGUAGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*lang(?:uage)?\s*:\s*([A-Za-z0-9_\-]+)\s*$").expect("language pattern is valid")
});

static SAFE_FILENAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._/\-]+$").expect("safe filename pattern is valid"));

/// An instruction split into its text and optional embedded base code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRequest {
    /// Instruction text with the first fenced block removed, trimmed.
    pub instruction: String,
    /// Trimmed content of that block, if present and non-empty.
    pub embedded_code: Option<String>,
}

/// Split the first fenced block out of an instruction.
pub fn split_embedded_code(text: &str) -> ParsedRequest {
    match find_fenced_span(text) {
        None => ParsedRequest {
            instruction: text.trim().to_string(),
            embedded_code: None,
        },
        Some(span) => {
            let mut rest = String::with_capacity(text.len() - span.range.len());
            rest.push_str(&text[..span.range.start]);
            rest.push_str(&text[span.range.end..]);

            let code = span.content.trim();
            ParsedRequest {
                instruction: rest.trim().to_string(),
                embedded_code: (!code.is_empty()).then(|| code.to_string()),
            }
        }
    }
}

/// How a target was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
    /// Supplied by an active-filename override.
    Explicit,
    /// Read from header lines or filled with defaults.
    Inferred,
    /// Rewritten by the keyword heuristic. May be wrong.
    HeuristicOverride,
}

/// The file and language a generation targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSpec {
    pub filename: String,
    pub language: String,
    pub confidence: Confidence,
}

impl TargetSpec {
    /// Final path component of the filename.
    pub fn display_name(&self) -> &str {
        storage_name(&self.filename).unwrap_or(&self.filename)
    }

    /// Dotted extension used to label diffs, `.txt` when there is none.
    pub fn extension_hint(&self) -> String {
        match Path::new(self.display_name()).extension().and_then(|e| e.to_str()) {
            Some(ext) if !ext.is_empty() => format!(".{ext}"),
            _ => ".txt".to_string(),
        }
    }
}

/// Infer the target from the instruction header lines.
///
/// The filename comes from the first line only; the language from any of
/// the first three. When neither is declared and the text mentions
/// `javascript`, the default Python pair is swapped for `app.js`. That
/// swap is a guess and is reported as [`Confidence::HeuristicOverride`].
pub fn infer_target(instruction: &str) -> TargetSpec {
    let mut lines = instruction.lines();

    let declared_filename = lines
        .next()
        .and_then(|first| FILENAME_RE.captures(first))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string());

    let declared_language = instruction
        .lines()
        .take(LANGUAGE_HINT_LINES)
        .find_map(|line| LANGUAGE_RE.captures(line))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_lowercase());

    if declared_filename.is_none()
        && declared_language.is_none()
        && instruction.to_lowercase().contains(HEURISTIC_KEYWORD)
    {
        return TargetSpec {
            filename: HEURISTIC_FILENAME.to_string(),
            language: HEURISTIC_LANGUAGE.to_string(),
            confidence: Confidence::HeuristicOverride,
        };
    }

    TargetSpec {
        filename: declared_filename.unwrap_or_else(|| DEFAULT_FILENAME.to_string()),
        language: declared_language.unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        confidence: Confidence::Inferred,
    }
}

/// Target for an explicit filename; the language follows the extension.
pub fn target_for_override(filename: &str) -> TargetSpec {
    let language = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(language_for_extension)
        .unwrap_or(PLAIN_TEXT_LANGUAGE);

    TargetSpec {
        filename: filename.to_string(),
        language: language.to_string(),
        confidence: Confidence::Explicit,
    }
}

/// Pick the target: an active filename wins over inference entirely.
pub fn resolve_target(instruction: &str, active_filename: Option<&str>) -> TargetSpec {
    match active_filename {
        Some(filename) => target_for_override(filename),
        None => infer_target(instruction),
    }
}

/// Map a file extension to a language tag.
pub fn language_for_extension(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "py" | "pyw" => "python",
        "js" | "mjs" | "cjs" | "jsx" => "javascript",
        "ts" | "tsx" => "typescript",
        "rs" => "rust",
        "go" => "go",
        "java" => "java",
        "kt" | "kts" => "kotlin",
        "c" | "h" => "c",
        "cc" | "cpp" | "cxx" | "hpp" => "cpp",
        "cs" => "csharp",
        "rb" => "ruby",
        "php" => "php",
        "swift" => "swift",
        "sh" | "bash" => "bash",
        "sql" => "sql",
        "html" | "htm" => "html",
        "css" => "css",
        "json" => "json",
        "yaml" | "yml" => "yaml",
        "toml" => "toml",
        "md" => "markdown",
        _ => PLAIN_TEXT_LANGUAGE,
    }
}

/// Final path component used to key storage, or `None` if the name has
/// no usable component (empty, `.`, `..`).
pub fn storage_name(filename: &str) -> Option<&str> {
    filename
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
}

/// Check that a filename uses the safe charset and names a real file.
pub fn is_safe_filename(filename: &str) -> bool {
    SAFE_FILENAME_RE.is_match(filename) && storage_name(filename).is_some()
}
