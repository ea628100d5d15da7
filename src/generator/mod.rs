// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The generation pipeline.
//!
//! One instruction in, one committed version out:
//!
//! ```text
//! split embedded code -> resolve target -> resolve base -> compose prompt
//!   -> model call -> extract artifact -> commit -> diff against base
//! ```
//!
//! The model call is the only suspension point that leaves the process.
//! Nothing is written unless the model returns a non-empty artifact.
//!
//! # Example
//!
//! ```rust,ignore
//! use codesmith::generator::Generator;
//! use codesmith::session::SessionState;
//! use codesmith::store::{ConversationId, VersionStore};
//!
//! let generator = Generator::new(model, VersionStore::new("/data/out"));
//! let session = SessionState::new("gpt-5");
//! let outcome = generator
//!     .generate(&ConversationId::from(42), &session, "filename: hello.py\nPrint hello world")
//!     .await?;
//! println!("{} -> {}", outcome.display_name(), outcome.version.file_name());
//! ```

mod types;

pub use types::{DiffReport, GenerationOutcome};

use std::time::Instant;

use tracing::{info, warn};

#[cfg(feature = "telemetry")]
use tracing::{debug, instrument};

use crate::codegen::diff::{generate_unified_diff, render_diff_to_string, DEFAULT_CONTEXT_LINES};
use crate::codegen::extract::extract_model_artifact;
use crate::codegen::prompt::{compose_prompt, prompt_mode, SYSTEM_INSTRUCTION};
use crate::codegen::request::{resolve_target, split_embedded_code, Confidence};
use crate::error::GenerationError;
use crate::session::SessionState;
use crate::store::{ConversationId, VersionStore};
use crate::types::{CompletionRequest, SharedModel};

/// Runs instructions through the model and records the results.
pub struct Generator {
    model: SharedModel,
    store: VersionStore,
}

impl Generator {
    pub fn new(model: SharedModel, store: VersionStore) -> Self {
        Self { model, store }
    }

    pub fn store(&self) -> &VersionStore {
        &self.store
    }

    /// Run one instruction for a conversation.
    #[cfg_attr(
        feature = "telemetry",
        instrument(skip(self, session, raw_instruction), fields(conversation = %conversation, model = %session.model))
    )]
    pub async fn generate(
        &self,
        conversation: &ConversationId,
        session: &SessionState,
        raw_instruction: &str,
    ) -> Result<GenerationOutcome, GenerationError> {
        let started = Instant::now();

        let parsed = split_embedded_code(raw_instruction);
        if parsed.instruction.is_empty() {
            return Err(GenerationError::EmptyInstruction);
        }

        let target = resolve_target(&parsed.instruction, session.active_filename.as_deref());
        if target.confidence == Confidence::HeuristicOverride {
            warn!(
                filename = %target.filename,
                language = %target.language,
                "Target chosen by keyword heuristic"
            );
        }

        let base = self
            .store
            .resolve_base(conversation, &target.filename, parsed.embedded_code)
            .await?;
        let mode = prompt_mode(base.as_deref());

        let prompt = compose_prompt(
            &parsed.instruction,
            &target.language,
            &target.filename,
            base.as_deref(),
        );

        #[cfg(feature = "telemetry")]
        debug!(
            filename = %target.filename,
            ?mode,
            prompt_bytes = prompt.len(),
            "Sending generation request"
        );

        let request = CompletionRequest::new(&session.model, SYSTEM_INSTRUCTION, prompt);
        let response = self.model.complete(&request).await?;
        let artifact = extract_model_artifact(&response.text)?;

        let version = self
            .store
            .commit(conversation, &target.filename, &artifact)
            .await?;

        let diff = base.as_deref().map(|before| {
            let diff = generate_unified_diff(
                before,
                &artifact,
                &format!("before{}", target.extension_hint()),
                &format!("after{}", target.extension_hint()),
                DEFAULT_CONTEXT_LINES,
            );
            DiffReport {
                text: render_diff_to_string(&diff),
                summary: diff.summary(),
            }
        });

        let duration = started.elapsed();
        info!(
            conversation = %conversation,
            filename = %target.filename,
            model = %session.model,
            version = %version.file_name(),
            artifact_bytes = artifact.len(),
            duration_ms = duration.as_millis() as u64,
            "Generation committed"
        );

        Ok(GenerationOutcome {
            target,
            mode,
            model: session.model.clone(),
            version,
            artifact,
            base,
            diff,
            usage: response.usage,
            duration,
        })
    }
}
