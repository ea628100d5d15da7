// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Chat surface: inbound messages, outbound replies, and the handler
//! between them.
//!
//! Transports convert their native updates into [`Inbound`] values and
//! deliver the [`Reply`] values back. The [`ChatService`] knows nothing about
//! any particular transport; [`console`] is the local one.

pub mod commands;
pub mod console;
pub mod service;

pub use commands::{parse_command, Command, FileArg, HELP_TEXT};
pub use service::{ChatService, ReplyPolicy};

use crate::error::GenerationError;

/// Document extension accepted as an instruction.
pub const INSTRUCTION_DOCUMENT_EXT: &str = ".txt";

/// A message received from a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// Plain text: a command or an instruction.
    Text(String),
    /// An uploaded document carrying an instruction.
    Document { file_name: String, bytes: Vec<u8> },
}

impl Inbound {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn document(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self::Document {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    /// Turn the message into instruction text.
    ///
    /// Documents must be `.txt` (any case). Invalid UTF-8 is decoded
    /// lossily rather than rejected.
    pub fn into_instruction(self) -> Result<String, GenerationError> {
        match self {
            Self::Text(text) => Ok(text),
            Self::Document { file_name, bytes } => {
                if !file_name.to_lowercase().ends_with(INSTRUCTION_DOCUMENT_EXT) {
                    return Err(GenerationError::UnsupportedAttachment(file_name));
                }
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
        }
    }
}

/// A message to send back to the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    /// A file attachment.
    File {
        name: String,
        content: String,
        caption: Option<String>,
    },
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn file(name: impl Into<String>, content: impl Into<String>, caption: Option<String>) -> Self {
        Self::File {
            name: name.into(),
            content: content.into(),
            caption,
        }
    }

    /// Text body, if this is a text reply.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::File { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_passes_through() {
        assert_eq!(Inbound::text("hi").into_instruction().unwrap(), "hi");
    }

    #[test]
    fn test_txt_document_accepted_case_insensitive() {
        let doc = Inbound::document("PROMPT.TXT", b"Print hello".to_vec());
        assert_eq!(doc.into_instruction().unwrap(), "Print hello");
    }

    #[test]
    fn test_other_documents_rejected() {
        let err = Inbound::document("prompt.pdf", b"x".to_vec()).into_instruction().unwrap_err();
        assert!(matches!(err, GenerationError::UnsupportedAttachment(name) if name == "prompt.pdf"));
    }

    #[test]
    fn test_invalid_utf8_is_decoded_lossily() {
        let doc = Inbound::document("p.txt", vec![b'o', b'k', 0xff, b'!']);
        assert_eq!(doc.into_instruction().unwrap(), "ok\u{fffd}!");
    }

    #[test]
    fn test_reply_as_text() {
        assert_eq!(Reply::text("x").as_text(), Some("x"));
        assert_eq!(Reply::file("a.py", "x", None).as_text(), None);
    }
}
