// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Version store types.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Longest accepted conversation id.
const MAX_CONVERSATION_ID_LEN: usize = 128;

/// Opaque conversation identifier, safe to use as a path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ConversationId(String);

impl ConversationId {
    /// Validate and wrap a raw id. Allowed: ASCII letters, digits, `_`, `-`.
    pub fn new(raw: impl Into<String>) -> Result<Self, StoreError> {
        let raw = raw.into();
        let valid = !raw.is_empty()
            && raw.len() <= MAX_CONVERSATION_ID_LEN
            && raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if valid {
            Ok(Self(raw))
        } else {
            Err(StoreError::InvalidConversation(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<i64> for ConversationId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl TryFrom<String> for ConversationId {
    type Error = StoreError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<ConversationId> for String {
    fn from(id: ConversationId) -> Self {
        id.0
    }
}

impl std::str::FromStr for ConversationId {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Length of a version stamp: `YYYYMMDD-HHMMSS-mmm`.
pub const STAMP_LEN: usize = 19;

/// Format a version stamp. Lexicographic order equals time order.
pub fn format_stamp(at: DateTime<Utc>) -> String {
    format!(
        "{}-{:03}",
        at.format("%Y%m%d-%H%M%S"),
        at.timestamp_subsec_millis().min(999)
    )
}

/// Parse a stamp produced by [`format_stamp`].
pub fn parse_stamp(stamp: &str) -> Option<DateTime<Utc>> {
    if stamp.len() != STAMP_LEN || !stamp.is_ascii() {
        return None;
    }
    let (seconds, millis) = stamp.split_at(15);
    let millis: i64 = millis.strip_prefix('-')?.parse().ok()?;
    let naive = NaiveDateTime::parse_from_str(seconds, "%Y%m%d-%H%M%S").ok()?;
    Some(Utc.from_utc_datetime(&naive) + chrono::Duration::milliseconds(millis))
}

/// One immutable snapshot of a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    /// Storage filename (final path component).
    pub filename: String,
    /// Sortable stamp prefix.
    pub stamp: String,
    pub created_at: DateTime<Utc>,
    pub path: PathBuf,
}

impl Version {
    /// On-disk name: `<stamp>-<filename>`.
    pub fn file_name(&self) -> String {
        format!("{}-{}", self.stamp, self.filename)
    }
}

/// A file known to a conversation, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub filename: String,
    /// Size of the latest content in bytes.
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
    /// Number of versions in history.
    pub versions: usize,
}
