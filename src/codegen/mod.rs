// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Pure text transformations around the model call.
//!
//! - [`extract`] - first fenced span out of an instruction or a response
//! - [`request`] - instruction splitting and target inference
//! - [`prompt`] - create/edit prompt composition
//! - [`diff`] - unified diff between base and new code
//!
//! Nothing here touches the filesystem or the network.

pub mod diff;
pub mod extract;
pub mod prompt;
pub mod request;

pub use diff::{unified_diff, DiffSummary, UnifiedDiff};
pub use extract::{extract_artifact, extract_model_artifact, find_fenced_span, FencedSpan};
pub use prompt::{
    compose_prompt, prompt_mode, PromptMode, BEGIN_BASE_MARKER, END_BASE_MARKER,
    SYSTEM_INSTRUCTION,
};
pub use request::{
    infer_target, is_safe_filename, language_for_extension, resolve_target, split_embedded_code,
    storage_name, target_for_override, Confidence, ParsedRequest, TargetSpec, DEFAULT_FILENAME,
    DEFAULT_LANGUAGE,
};
