// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Composition of the single outbound prompt.
//!
//! Two modes:
//!
//! - **create**: no base code, ask for a complete new file.
//! - **edit**: base code present, embedded between explicit markers so the
//!   model can tell the code to modify from the instructions about it:
//!
//! ````text
//! <<BEGIN_BASE_CODE filename=app.py version=latest>>
//! ```python
//! ...
//! ```
//! <<END_BASE_CODE>>
//! ````
//!
//! Output depends only on the inputs: no timestamps, no randomness.

use super::request::storage_name;

/// System-level instruction sent with every request.
pub const SYSTEM_INSTRUCTION: &str = "You are a strict, production-grade code generator.\n\
Return only the COMPLETE code in a single fenced block. No explanations.";

/// Opening marker prefix for embedded base code.
pub const BEGIN_BASE_MARKER: &str = "<<BEGIN_BASE_CODE";

/// Closing marker for embedded base code.
pub const END_BASE_MARKER: &str = "<<END_BASE_CODE>>";

/// Version tag written into the opening marker.
const BASE_VERSION_TAG: &str = "latest";

const RULES: &str = "Rules:\n\
- Return ONLY code in exactly one fenced block ```...```.\n\
- Be deterministic and self-contained.\n\
- If details are missing, choose sensible production defaults.\n\
- Do not embed secrets, keys or credentials.\n";

const CREATE_TASK: &str =
    "Task: Generate a single, complete, production-ready code file strictly matching the specification.";

const EDIT_TASK: &str =
    "Task: Update the existing code according to the specification and return the FULL updated file.";

const EDIT_LEAD_IN: &str = "Apply the requested changes and additions to the code below.";

/// Which framing a composed prompt uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptMode {
    Create,
    Edit,
}

/// Compose the prompt for one generation.
///
/// `base_code` selects the mode: `None` (or blank) composes a create prompt,
/// anything else an edit prompt embedding it.
pub fn compose_prompt(
    instruction: &str,
    language: &str,
    filename: &str,
    base_code: Option<&str>,
) -> String {
    let base_code = base_code.filter(|code| !code.trim().is_empty());

    let mut out = String::with_capacity(
        RULES.len() + instruction.len() + base_code.map_or(0, str::len) + 256,
    );

    out.push_str("Language: ");
    out.push_str(language);
    out.push('\n');
    out.push_str(match base_code {
        None => CREATE_TASK,
        Some(_) => EDIT_TASK,
    });
    out.push('\n');
    out.push_str(RULES);
    out.push_str("\nSpecification:\n");
    out.push_str(instruction);
    out.push('\n');

    if let Some(code) = base_code {
        let marker_name = storage_name(filename).unwrap_or(filename);
        out.push('\n');
        out.push_str(EDIT_LEAD_IN);
        out.push_str("\n\n");
        out.push_str(&begin_marker(marker_name));
        out.push('\n');
        out.push_str("```");
        out.push_str(language);
        out.push('\n');
        out.push_str(code);
        if !code.ends_with('\n') {
            out.push('\n');
        }
        out.push_str("```\n");
        out.push_str(END_BASE_MARKER);
        out.push('\n');
    }

    out
}

/// Mode a prompt for these inputs would use.
pub fn prompt_mode(base_code: Option<&str>) -> PromptMode {
    match base_code.filter(|code| !code.trim().is_empty()) {
        Some(_) => PromptMode::Edit,
        None => PromptMode::Create,
    }
}

fn begin_marker(filename: &str) -> String {
    format!("{BEGIN_BASE_MARKER} filename={filename} version={BASE_VERSION_TAG}>>")
}
