// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Append-only version history on the filesystem.
//!
//! Layout, partitioned by conversation:
//!
//! ```text
//! <root>/<conversation>/<YYYYMMDD-HHMMSS-mmm>-<filename>   one per version
//! <root>/<conversation>/latest-<filename>                  current content
//! ```
//!
//! A commit writes the version first, then replaces `latest-` through a
//! temp file and rename, so readers never see a truncated latest. If the
//! process dies between the two steps, latest lags one version behind; the
//! next edit uses the lagging content as its base. Nothing reconciles this.
//!
//! Versions are never deleted.

mod types;

pub use types::{format_stamp, parse_stamp, ConversationId, FileEntry, Version, STAMP_LEN};

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SubsecRound, Utc};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::warn;

#[cfg(feature = "telemetry")]
use tracing::{debug, instrument};

use crate::codegen::request::{is_safe_filename, storage_name};
use crate::error::StoreError;

/// Prefix of the latest-pointer file.
pub const LATEST_PREFIX: &str = "latest-";

/// How many millisecond bumps to try when a version stamp is taken.
const MAX_STAMP_ATTEMPTS: i64 = 1000;

/// Filesystem-backed version store.
#[derive(Debug, Clone)]
pub struct VersionStore {
    root: PathBuf,
}

impl VersionStore {
    /// Create a store rooted at `root`. Directories are created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding one conversation's files.
    pub fn conversation_dir(&self, conversation: &ConversationId) -> PathBuf {
        self.root.join(conversation.as_str())
    }

    /// Path of the latest pointer for a file.
    pub fn latest_path(&self, conversation: &ConversationId, filename: &str) -> Result<PathBuf, StoreError> {
        let name = checked_name(filename)?;
        Ok(self.conversation_dir(conversation).join(format!("{LATEST_PREFIX}{name}")))
    }

    /// Read the latest content for a file, `None` if it was never committed.
    pub async fn read_latest(
        &self,
        conversation: &ConversationId,
        filename: &str,
    ) -> Result<Option<String>, StoreError> {
        let path = self.latest_path(conversation, filename)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(&path, e)),
        }
    }

    /// Pick the base code for a generation.
    ///
    /// The filename is validated first, even when embedded code makes the
    /// latest irrelevant. Embedded code wins; otherwise the latest content,
    /// if any. An unreadable latest is logged and treated as absent, which
    /// turns the request into a fresh generation.
    #[cfg_attr(feature = "telemetry", instrument(skip(self, embedded_code), fields(conversation = %conversation)))]
    pub async fn resolve_base(
        &self,
        conversation: &ConversationId,
        filename: &str,
        embedded_code: Option<String>,
    ) -> Result<Option<String>, StoreError> {
        checked_name(filename)?;
        if let Some(code) = embedded_code {
            return Ok(Some(code));
        }

        match self.read_latest(conversation, filename).await {
            Ok(latest) => Ok(latest),
            Err(StoreError::Io { path, message }) => {
                warn!(%path, %message, "Latest version unreadable, generating from scratch");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Record `content` as a new version and make it the latest.
    #[cfg_attr(
        feature = "telemetry",
        instrument(skip(self, content), fields(conversation = %conversation, bytes = content.len()))
    )]
    pub async fn commit(
        &self,
        conversation: &ConversationId,
        filename: &str,
        content: &str,
    ) -> Result<Version, StoreError> {
        let name = checked_name(filename)?.to_string();
        let dir = self.conversation_dir(conversation);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| StoreError::io(&dir, e))?;

        let version = self.write_version(&dir, &name, content).await?;
        self.replace_latest(&dir, &name, &version.stamp, content).await?;

        #[cfg(feature = "telemetry")]
        debug!(version = %version.file_name(), "Committed version");

        Ok(version)
    }

    /// Files known to a conversation, sorted by name.
    pub async fn list_files(&self, conversation: &ConversationId) -> Result<Vec<FileEntry>, StoreError> {
        let dir = self.conversation_dir(conversation);
        let names = read_dir_names(&dir).await?;

        let mut version_counts: HashMap<&str, usize> = HashMap::new();
        for name in &names {
            if let Some((_, filename)) = split_version_name(name) {
                *version_counts.entry(filename).or_default() += 1;
            }
        }

        let mut entries = Vec::new();
        for name in &names {
            let Some(filename) = name.strip_prefix(LATEST_PREFIX) else {
                continue;
            };
            let path = dir.join(name);
            let metadata = match fs::metadata(&path).await {
                Ok(m) => m,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(StoreError::io(&path, e)),
            };
            entries.push(FileEntry {
                filename: filename.to_string(),
                size: metadata.len(),
                modified: metadata.modified().ok().map(DateTime::<Utc>::from),
                versions: version_counts.get(filename).copied().unwrap_or(0),
            });
        }

        entries.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(entries)
    }

    /// Version lineage for a file, oldest first.
    pub async fn history(&self, conversation: &ConversationId, filename: &str) -> Result<Vec<Version>, StoreError> {
        let name = checked_name(filename)?;
        let dir = self.conversation_dir(conversation);

        let mut versions: Vec<Version> = read_dir_names(&dir)
            .await?
            .iter()
            .filter_map(|entry| {
                let (stamp, file) = split_version_name(entry)?;
                if file != name {
                    return None;
                }
                Some(Version {
                    filename: name.to_string(),
                    stamp: stamp.to_string(),
                    created_at: parse_stamp(stamp)?,
                    path: dir.join(entry),
                })
            })
            .collect();

        versions.sort_by(|a, b| a.stamp.cmp(&b.stamp));
        Ok(versions)
    }

    /// Read the content of a stored version.
    pub async fn read_version(&self, version: &Version) -> Result<String, StoreError> {
        let bytes = fs::read(&version.path)
            .await
            .map_err(|e| StoreError::io(&version.path, e))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Create the version file. Never overwrites: a taken stamp is bumped
    /// by a millisecond.
    async fn write_version(&self, dir: &Path, name: &str, content: &str) -> Result<Version, StoreError> {
        // stamps only carry milliseconds
        let now = Utc::now().trunc_subsecs(3);

        for bump in 0..MAX_STAMP_ATTEMPTS {
            let created_at = now + chrono::Duration::milliseconds(bump);
            let stamp = format_stamp(created_at);
            let path = dir.join(format!("{stamp}-{name}"));

            let mut file = match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(StoreError::io(&path, e)),
            };

            file.write_all(content.as_bytes())
                .await
                .map_err(|e| StoreError::io(&path, e))?;
            file.sync_all().await.map_err(|e| StoreError::io(&path, e))?;

            return Ok(Version {
                filename: name.to_string(),
                stamp,
                created_at,
                path,
            });
        }

        Err(StoreError::VersionExists(format!("{}/{name}", dir.display())))
    }

    /// Atomically replace `latest-<name>` with `content`.
    async fn replace_latest(&self, dir: &Path, name: &str, stamp: &str, content: &str) -> Result<(), StoreError> {
        let latest = dir.join(format!("{LATEST_PREFIX}{name}"));
        let tmp = dir.join(format!(".{LATEST_PREFIX}{name}.{stamp}.tmp"));

        let written = async {
            let mut file = fs::File::create(&tmp).await?;
            file.write_all(content.as_bytes()).await?;
            file.sync_all().await?;
            drop(file);
            fs::rename(&tmp, &latest).await
        }
        .await;

        if let Err(e) = written {
            let _ = fs::remove_file(&tmp).await;
            return Err(StoreError::io(&latest, e));
        }
        Ok(())
    }
}

/// Validate a filename and return its storage component.
fn checked_name(filename: &str) -> Result<&str, StoreError> {
    if !is_safe_filename(filename) {
        return Err(StoreError::InvalidFilename(filename.to_string()));
    }
    storage_name(filename).ok_or_else(|| StoreError::InvalidFilename(filename.to_string()))
}

/// Split `<stamp>-<filename>` into its parts.
fn split_version_name(entry: &str) -> Option<(&str, &str)> {
    if entry.len() <= STAMP_LEN + 1 || !entry.is_char_boundary(STAMP_LEN) {
        return None;
    }
    let (stamp, rest) = entry.split_at(STAMP_LEN);
    let filename = rest.strip_prefix('-')?;
    parse_stamp(stamp)?;
    Some((stamp, filename))
}

/// File names in a directory; a missing directory is empty.
async fn read_dir_names(dir: &Path) -> Result<Vec<String>, StoreError> {
    let mut reader = match fs::read_dir(dir).await {
        Ok(r) => r,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(StoreError::io(dir, e)),
    };

    let mut names = Vec::new();
    while let Some(entry) = reader.next_entry().await.map_err(|e| StoreError::io(dir, e))? {
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        }
    }
    Ok(names)
}
