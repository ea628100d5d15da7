// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Slash commands.
//!
//! Commands only touch session state or read the version store; they never
//! call the model. The session table is locked only while it is read or
//! changed, never across a store scan.

use tokio::sync::Mutex;

use crate::session::SessionRegistry;
use crate::store::{ConversationId, VersionStore};

use super::Reply;

/// Usage text for `/start` and `/help`.
pub const HELP_TEXT: &str = "Send text or a .txt document and get back a COMPLETE code file.\n\
• The first line may set the filename:  filename: my_app.py\n\
• One of the first three lines may set the language:  language: python\n\
• To edit, just send a new instruction: the latest version is used as the base.\n\
• Base code can be attached in a ``` fenced block; edits then apply to it.\n\n\
/model [id]      show or select the model\n\
/file [name]     show or pin the target file (/file - to unpin)\n\
/files           list generated files\n\
/history [name]  list versions of a file\n\
/reset           restore the default model and unpin the file";

/// Argument to `/file`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileArg {
    Show,
    Clear,
    Set(String),
}

/// A parsed slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Model(Option<String>),
    File(FileArg),
    Files,
    History(Option<String>),
    Reset,
    Unknown(String),
}

/// Parse a slash command. `None` when the text is not a command.
///
/// A `@botname` suffix on the command word is ignored.
pub fn parse_command(text: &str) -> Option<Command> {
    let text = text.trim();
    let rest = text.strip_prefix('/')?;

    let (word, args) = match rest.split_once(char::is_whitespace) {
        Some((word, args)) => (word, args.trim()),
        None => (rest, ""),
    };
    let word = word.split('@').next().unwrap_or(word).to_lowercase();
    let arg = (!args.is_empty()).then(|| args.to_string());

    let command = match word.as_str() {
        "start" => Command::Start,
        "help" | "h" | "?" => Command::Help,
        "model" => Command::Model(arg),
        "file" => Command::File(match arg.as_deref() {
            None => FileArg::Show,
            Some("-") => FileArg::Clear,
            Some(name) => FileArg::Set(name.to_string()),
        }),
        "files" => Command::Files,
        "history" => Command::History(arg),
        "reset" => Command::Reset,
        _ => Command::Unknown(format!("/{word}")),
    };
    Some(command)
}

/// Run a command for a conversation.
pub async fn execute(
    command: Command,
    conversation: &ConversationId,
    sessions: &Mutex<SessionRegistry>,
    store: &VersionStore,
) -> Vec<Reply> {
    let reply = match command {
        Command::Start | Command::Help => HELP_TEXT.to_string(),

        Command::Model(None) => {
            let mut sessions = sessions.lock().await;
            let current = &sessions.session(conversation).model;
            let mut text = format!("Current model: {current}\nUsage: /model <id>");
            if let Some(allowed) = sessions.policy().allowed() {
                text.push_str(&format!("\nAvailable: {}", allowed.join(", ")));
            }
            text
        }
        Command::Model(Some(model)) => match sessions.lock().await.set_model(conversation, &model) {
            Ok(session) => format!("OK. Model for this chat: {}", session.model),
            Err(e) => e.to_string(),
        },

        Command::File(FileArg::Show) => match &sessions.lock().await.session(conversation).active_filename {
            Some(name) => format!("Target file: {name}\nUse /file - to infer it from each instruction."),
            None => "Target file is inferred from each instruction.\nUsage: /file <name>".to_string(),
        },
        Command::File(FileArg::Clear) => {
            sessions.lock().await.clear_active_filename(conversation);
            "OK. Target file will be inferred from each instruction.".to_string()
        }
        Command::File(FileArg::Set(name)) => match sessions.lock().await.set_active_filename(conversation, &name) {
            Ok(session) => format!(
                "OK. Target file: {}",
                session.active_filename.as_deref().unwrap_or_default()
            ),
            Err(e) => e.to_string(),
        },

        Command::Files => match store.list_files(conversation).await {
            Ok(files) if files.is_empty() => "No files yet.".to_string(),
            Ok(files) => {
                let mut text = String::from("Files:");
                for file in files {
                    let modified = file
                        .modified
                        .map(|m| m.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                        .unwrap_or_else(|| "-".to_string());
                    text.push_str(&format!(
                        "\n• {} ({} bytes, {} versions, {})",
                        file.filename, file.size, file.versions, modified
                    ));
                }
                text
            }
            Err(e) => format!("Could not list files: {e}"),
        },

        Command::History(name) => {
            let name = match name {
                Some(name) => Some(name),
                None => sessions.lock().await.session(conversation).active_filename.clone(),
            };
            match name {
                None => "Usage: /history <filename>".to_string(),
                Some(name) => match store.history(conversation, &name).await {
                    Ok(versions) if versions.is_empty() => format!("No versions of {name}."),
                    Ok(versions) => {
                        let mut text = format!("Versions of {name}:");
                        for version in versions {
                            text.push_str(&format!(
                                "\n• {} ({})",
                                version.file_name(),
                                version.created_at.format("%Y-%m-%d %H:%M:%S%.3f UTC")
                            ));
                        }
                        text
                    }
                    Err(e) => format!("Could not read history: {e}"),
                },
            }
        }

        Command::Reset => {
            let mut sessions = sessions.lock().await;
            let session = sessions.reset(conversation);
            format!(
                "Session reset. Model: {}. Target file is inferred from each instruction.",
                session.model
            )
        }

        Command::Unknown(word) => format!("Unknown command {word}. Send /help for usage."),
    };

    vec![Reply::Text(reply)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ModelPolicy;
    use tempfile::TempDir;

    #[test]
    fn test_parse_plain_text_is_not_a_command() {
        assert_eq!(parse_command("Print hello"), None);
        assert_eq!(parse_command("filename: /etc/x"), None);
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("/start"), Some(Command::Start));
        assert_eq!(parse_command("/HELP"), Some(Command::Help));
        assert_eq!(parse_command("/model"), Some(Command::Model(None)));
        assert_eq!(
            parse_command("/model   gpt-5-mini "),
            Some(Command::Model(Some("gpt-5-mini".to_string())))
        );
        assert_eq!(parse_command("/model@codesmith_bot gpt-5"), Some(Command::Model(Some("gpt-5".to_string()))));
        assert_eq!(parse_command("/file"), Some(Command::File(FileArg::Show)));
        assert_eq!(parse_command("/file -"), Some(Command::File(FileArg::Clear)));
        assert_eq!(
            parse_command("/file hello.py"),
            Some(Command::File(FileArg::Set("hello.py".to_string())))
        );
        assert_eq!(parse_command("/files"), Some(Command::Files));
        assert_eq!(parse_command("/history a.py"), Some(Command::History(Some("a.py".to_string()))));
        assert_eq!(parse_command("/reset"), Some(Command::Reset));
        assert_eq!(parse_command("/nope"), Some(Command::Unknown("/nope".to_string())));
    }

    fn text(replies: Vec<Reply>) -> String {
        assert_eq!(replies.len(), 1);
        replies[0].as_text().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_model_show_and_set() {
        let temp = TempDir::new().unwrap();
        let store = VersionStore::new(temp.path());
        let sessions = Mutex::new(SessionRegistry::new(ModelPolicy::closed(
            "gpt-5",
            vec!["gpt-5".into(), "o3".into()],
        )));
        let c = ConversationId::from(42);

        let shown = text(execute(Command::Model(None), &c, &sessions, &store).await);
        assert!(shown.contains("Current model: gpt-5"));
        assert!(shown.contains("Available: gpt-5, o3"));

        let set = text(execute(Command::Model(Some("o3".into())), &c, &sessions, &store).await);
        assert_eq!(set, "OK. Model for this chat: o3");

        let rejected = text(execute(Command::Model(Some("x".into())), &c, &sessions, &store).await);
        assert!(rejected.contains("not allowed"));
        assert_eq!(sessions.lock().await.session(&c).model, "o3");
    }

    #[tokio::test]
    async fn test_file_commands() {
        let temp = TempDir::new().unwrap();
        let store = VersionStore::new(temp.path());
        let sessions = Mutex::new(SessionRegistry::new(ModelPolicy::open("gpt-5")));
        let c = ConversationId::from(42);

        execute(Command::File(FileArg::Set("hello.py".into())), &c, &sessions, &store).await;
        assert_eq!(sessions.lock().await.session(&c).active_filename.as_deref(), Some("hello.py"));

        let bad = text(execute(Command::File(FileArg::Set("a b".into())), &c, &sessions, &store).await);
        assert!(bad.contains("Invalid filename"));

        execute(Command::File(FileArg::Clear), &c, &sessions, &store).await;
        assert!(sessions.lock().await.session(&c).active_filename.is_none());
    }

    #[tokio::test]
    async fn test_files_and_history() {
        let temp = TempDir::new().unwrap();
        let store = VersionStore::new(temp.path());
        let sessions = Mutex::new(SessionRegistry::new(ModelPolicy::open("gpt-5")));
        let c = ConversationId::from(42);

        let empty = text(execute(Command::Files, &c, &sessions, &store).await);
        assert_eq!(empty, "No files yet.");

        store.commit(&c, "a.py", "one").await.unwrap();
        store.commit(&c, "a.py", "two").await.unwrap();

        let files = text(execute(Command::Files, &c, &sessions, &store).await);
        assert!(files.contains("a.py (3 bytes, 2 versions"));

        let history = text(execute(Command::History(Some("a.py".into())), &c, &sessions, &store).await);
        assert!(history.starts_with("Versions of a.py:"));
        assert_eq!(history.matches("-a.py (").count(), 2);

        let usage = text(execute(Command::History(None), &c, &sessions, &store).await);
        assert_eq!(usage, "Usage: /history <filename>");
    }

    #[tokio::test]
    async fn test_history_releases_session_lock() {
        let temp = TempDir::new().unwrap();
        let store = VersionStore::new(temp.path());
        let sessions = Mutex::new(SessionRegistry::new(ModelPolicy::open("gpt-5")));
        let c = ConversationId::from(42);
        store.commit(&c, "a.py", "one").await.unwrap();
        sessions.lock().await.set_active_filename(&c, "a.py").unwrap();

        let history = text(execute(Command::History(None), &c, &sessions, &store).await);
        assert!(history.starts_with("Versions of a.py:"));
        text(execute(Command::Files, &c, &sessions, &store).await);
        assert!(sessions.try_lock().is_ok());
    }

    #[tokio::test]
    async fn test_reset() {
        let temp = TempDir::new().unwrap();
        let store = VersionStore::new(temp.path());
        let sessions = Mutex::new(SessionRegistry::new(ModelPolicy::open("gpt-5")));
        let c = ConversationId::from(42);
        sessions.lock().await.set_model(&c, "o3").unwrap();
        sessions.lock().await.set_active_filename(&c, "a.py").unwrap();

        let reply = text(execute(Command::Reset, &c, &sessions, &store).await);
        assert!(reply.contains("Model: gpt-5"));
        assert!(sessions.lock().await.session(&c).active_filename.is_none());
    }
}
