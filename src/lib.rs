// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Codesmith - chat-driven code generation with version history.
//!
//! A conversation sends an instruction (text or a `.txt` document); the
//! model returns one complete file; the file is stored as a new immutable
//! version and sent back, together with a diff when an earlier version
//! served as the base.
//!
//! # Architecture
//!
//! - [`types`] - Model request/response types and the [`CodeModel`] trait
//! - [`error`] - Error types and result aliases
//! - [`config`] - Configuration loading and merging
//! - [`providers`] - OpenAI Responses API client
//! - [`telemetry`] - Logging setup
//! - [`codegen`] - Extraction, target inference, prompt composition, diffs
//! - [`store`] - Append-only version store on the filesystem
//! - [`session`] - Per-conversation model and target selection
//! - [`generator`] - The instruction-to-version pipeline
//! - [`chat`] - Commands, the transport-agnostic service, and the console
//!
//! # Example
//!
//! ```rust,ignore
//! use codesmith::chat::{ChatService, Inbound, ReplyPolicy};
//! use codesmith::config::{load_config, CliOptions};
//! use codesmith::generator::Generator;
//! use codesmith::providers::create_provider_from_config;
//! use codesmith::session::ModelPolicy;
//! use codesmith::store::{ConversationId, VersionStore};
//!
//! let config = load_config(".", CliOptions::default())?;
//! let model = create_provider_from_config(&config)?;
//! let generator = Generator::new(model, VersionStore::new(&config.output_dir));
//! let service = ChatService::new(
//!     generator,
//!     ModelPolicy::from_config(&config),
//!     ReplyPolicy::from_config(&config),
//! );
//!
//! let replies = service
//!     .handle(&ConversationId::from(42), Inbound::text("filename: hello.py\nPrint hello world"))
//!     .await;
//! ```

pub mod chat;
pub mod codegen;
pub mod config;
pub mod error;
pub mod generator;
pub mod providers;
pub mod session;
pub mod store;
pub mod telemetry;
pub mod types;

// Re-export commonly used types at crate root
pub use chat::{ChatService, Inbound, Reply, ReplyPolicy};
pub use error::{ConfigError, GenerationError, ProviderError, Result, StoreError};
pub use generator::{GenerationOutcome, Generator};
pub use providers::{create_provider_from_config, OpenAIProvider};
pub use session::{ModelPolicy, SessionRegistry, SessionState};
pub use store::{ConversationId, Version, VersionStore};
pub use types::{CodeModel, CompletionRequest, CompletionResponse, ProviderConfig, SharedModel, TokenUsage};

/// Codesmith version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
