// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Fenced code span extraction.
//!
//! Used on both sides of the model call: to pull embedded base code out of a
//! user instruction and to pull the generated artifact out of a raw model
//! response.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::GenerationError;

/// Opening fence with an optional language tag, a newline, then the body up
/// to the next closing fence.
static FENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"```([A-Za-z0-9_+\-]*)\r?\n((?s:.*?))```").expect("fence pattern is valid")
});

/// The first fenced span found in a text blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FencedSpan<'a> {
    /// Byte range of the whole span, fences included.
    pub range: Range<usize>,
    /// Language tag on the opening fence, if any.
    pub language: Option<&'a str>,
    /// Raw inner content (untrimmed).
    pub content: &'a str,
}

/// Locate the first fenced span in `text`.
pub fn find_fenced_span(text: &str) -> Option<FencedSpan<'_>> {
    let caps = FENCE_RE.captures(text)?;
    let whole = caps.get(0)?;
    let language = caps.get(1).map(|m| m.as_str()).filter(|s| !s.is_empty());
    let content = caps.get(2).map(|m| m.as_str()).unwrap_or("");

    Some(FencedSpan {
        range: whole.range(),
        language,
        content,
    })
}

/// Return the trimmed content of the first fenced span, or the whole text
/// trimmed when there is none.
pub fn extract_artifact(text: &str) -> String {
    match find_fenced_span(text) {
        Some(span) => span.content.trim().to_string(),
        None => text.trim().to_string(),
    }
}

/// Extract the artifact from a raw model response.
///
/// An empty result is a hard failure; nothing is retried.
pub fn extract_model_artifact(response: &str) -> Result<String, GenerationError> {
    let artifact = extract_artifact(response);
    if artifact.is_empty() {
        return Err(GenerationError::EmptyArtifact);
    }
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_first_fenced_block() {
        let text = "Here you go:\n```python\nprint(\"hello\")\n```\nand\n```\nsecond\n```";
        assert_eq!(extract_artifact(text), "print(\"hello\")");
    }

    #[test]
    fn test_language_tag_is_ignored_for_content() {
        let span = find_fenced_span("```c++\nint main() {}\n```").unwrap();
        assert_eq!(span.language, Some("c++"));
        assert_eq!(span.content.trim(), "int main() {}");
    }

    #[test]
    fn test_untagged_fence() {
        let span = find_fenced_span("```\n  x = 1  \n```").unwrap();
        assert_eq!(span.language, None);
        assert_eq!(extract_artifact("```\n  x = 1  \n```"), "x = 1");
    }

    #[test]
    fn test_crlf_fence() {
        assert_eq!(extract_artifact("```js\r\nlet a = 1;\r\n```"), "let a = 1;");
    }

    #[test]
    fn test_no_fence_returns_whole_text_trimmed() {
        assert_eq!(extract_artifact("  print(1)\n\n"), "print(1)");
    }

    #[test]
    fn test_unclosed_fence_is_not_a_span() {
        let text = "```python\nprint(1)\n";
        assert!(find_fenced_span(text).is_none());
        assert_eq!(extract_artifact(text), text.trim());
    }

    #[test]
    fn test_span_range_covers_fences() {
        let text = "before\n```rs\nfn a() {}\n```\nafter";
        let span = find_fenced_span(text).unwrap();
        assert_eq!(&text[span.range.clone()], "```rs\nfn a() {}\n```");
    }

    #[test]
    fn test_model_artifact_empty_is_error() {
        assert!(matches!(
            extract_model_artifact("```python\n   \n```"),
            Err(GenerationError::EmptyArtifact)
        ));
        assert!(matches!(extract_model_artifact("   "), Err(GenerationError::EmptyArtifact)));
    }

    #[test]
    fn test_model_artifact_ok() {
        let response = "```python\nprint(\"hello\")\n```";
        assert_eq!(extract_model_artifact(response).unwrap(), "print(\"hello\")");
    }

    #[test]
    fn test_extraction_over_many_spans() {
        for body in ["a", "line1\nline2", "  indented\n", "fn main() {\n    todo!()\n}"] {
            for tag in ["", "python", "rust"] {
                let text = format!("intro text\n```{tag}\n{body}\n```\ntrailer");
                assert_eq!(extract_artifact(&text), body.trim());
            }
        }
    }
}
