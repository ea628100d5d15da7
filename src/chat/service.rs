// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Transport-agnostic request handling.

use tokio::sync::Mutex;
use tracing::warn;

#[cfg(feature = "telemetry")]
use tracing::instrument;

use crate::config::{ResolvedConfig, DEFAULT_DIFF_INLINE_LIMIT};
use crate::error::GenerationError;
use crate::generator::{GenerationOutcome, Generator};
use crate::session::{ModelPolicy, SessionRegistry};
use crate::store::ConversationId;

use super::commands::{execute, parse_command};
use super::{Inbound, Reply};

const DONE_CAPTION: &str = "✅ Done";
const DIFF_CAPTION: &str = "Changes (diff)";
const FAILURE_PREFIX: &str = "Generation failed: ";

/// How replies are shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyPolicy {
    /// Diffs up to this many characters are sent inline, longer ones as a file.
    pub diff_inline_limit: usize,
}

impl Default for ReplyPolicy {
    fn default() -> Self {
        Self {
            diff_inline_limit: DEFAULT_DIFF_INLINE_LIMIT,
        }
    }
}

impl ReplyPolicy {
    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self {
            diff_inline_limit: config.diff_inline_limit,
        }
    }
}

/// Maps inbound messages to replies for any number of conversations.
///
/// Session state is locked only while it is read or changed, never across
/// the model call, so different conversations proceed concurrently.
pub struct ChatService {
    generator: Generator,
    sessions: Mutex<SessionRegistry>,
    policy: ReplyPolicy,
}

impl ChatService {
    pub fn new(generator: Generator, models: ModelPolicy, policy: ReplyPolicy) -> Self {
        Self {
            generator,
            sessions: Mutex::new(SessionRegistry::new(models)),
            policy,
        }
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    /// Handle one inbound message. Never fails: errors become text replies.
    #[cfg_attr(feature = "telemetry", instrument(skip(self, inbound), fields(conversation = %conversation)))]
    pub async fn handle(&self, conversation: &ConversationId, inbound: Inbound) -> Vec<Reply> {
        if let Inbound::Text(text) = &inbound {
            if let Some(command) = parse_command(text) {
                return execute(command, conversation, &self.sessions, self.generator.store()).await;
            }
        }

        match self.generate(conversation, inbound).await {
            Ok(outcome) => self.render(&outcome),
            Err(e) => {
                warn!(conversation = %conversation, error = %e, "Generation failed");
                vec![Reply::Text(format!("{FAILURE_PREFIX}{e}"))]
            }
        }
    }

    async fn generate(
        &self,
        conversation: &ConversationId,
        inbound: Inbound,
    ) -> Result<GenerationOutcome, GenerationError> {
        let instruction = inbound.into_instruction()?;
        let session = self.sessions.lock().await.session(conversation).clone();
        self.generator.generate(conversation, &session, &instruction).await
    }

    /// Artifact first, then the diff when a base existed.
    fn render(&self, outcome: &GenerationOutcome) -> Vec<Reply> {
        let caption = match &outcome.diff {
            Some(diff) => format!("{DONE_CAPTION} ({})", diff.summary),
            None => DONE_CAPTION.to_string(),
        };
        let mut replies = vec![Reply::file(
            outcome.display_name(),
            outcome.artifact.clone(),
            Some(caption),
        )];

        if let Some(diff) = outcome.diff.as_ref().filter(|d| !d.is_empty()) {
            if diff.text.chars().count() <= self.policy.diff_inline_limit {
                replies.push(Reply::Text(format!("Changes:\n{}", diff.text)));
            } else {
                replies.push(Reply::file(
                    outcome.diff_attachment_name(),
                    diff.text.clone(),
                    Some(DIFF_CAPTION.to_string()),
                ));
            }
        }

        replies
    }
}
