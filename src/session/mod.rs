// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Per-conversation session state.
//!
//! Each conversation carries a selected model and an optional active
//! filename. State lives in memory only and is lost on restart; generated
//! files survive in the [`VersionStore`](crate::store::VersionStore).
//!
//! # Example
//!
//! ```rust,ignore
//! use codesmith::session::{ModelPolicy, SessionRegistry};
//! use codesmith::store::ConversationId;
//!
//! let mut sessions = SessionRegistry::new(ModelPolicy::open("gpt-5"));
//! let id = ConversationId::from(42);
//!
//! sessions.set_active_filename(&id, "hello.py")?;
//! assert_eq!(sessions.session(&id).active_filename.as_deref(), Some("hello.py"));
//! ```

mod state;

pub use state::{check_active_filename, ModelPolicy, SessionState};

use std::collections::HashMap;

use crate::error::{GenerationError, StoreError};
use crate::store::ConversationId;

/// In-memory session table keyed by conversation.
#[derive(Debug)]
pub struct SessionRegistry {
    policy: ModelPolicy,
    sessions: HashMap<ConversationId, SessionState>,
}

impl SessionRegistry {
    pub fn new(policy: ModelPolicy) -> Self {
        Self {
            policy,
            sessions: HashMap::new(),
        }
    }

    pub fn policy(&self) -> &ModelPolicy {
        &self.policy
    }

    /// State for a conversation, created with defaults on first access.
    pub fn session(&mut self, id: &ConversationId) -> &mut SessionState {
        let default_model = self.policy.default_model();
        self.sessions
            .entry(id.clone())
            .or_insert_with(|| SessionState::new(default_model))
    }

    /// Select a model for a conversation.
    pub fn set_model(&mut self, id: &ConversationId, model: &str) -> Result<&SessionState, GenerationError> {
        let model = self.policy.check(model)?;
        tracing::info!(conversation = %id, %model, "Model selected");
        let session = self.session(id);
        session.model = model;
        Ok(session)
    }

    /// Pin the target filename for a conversation.
    pub fn set_active_filename(&mut self, id: &ConversationId, filename: &str) -> Result<&SessionState, StoreError> {
        let filename = check_active_filename(filename)?;
        let session = self.session(id);
        session.active_filename = Some(filename);
        Ok(session)
    }

    /// Return to filename inference.
    pub fn clear_active_filename(&mut self, id: &ConversationId) {
        self.session(id).active_filename = None;
    }

    /// Restore the default model and clear the active filename.
    pub fn reset(&mut self, id: &ConversationId) -> &SessionState {
        let default_model = self.policy.default_model().to_string();
        let session = self.session(id);
        *session = SessionState::new(default_model);
        session
    }
}
