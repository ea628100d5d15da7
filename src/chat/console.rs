// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Local console transport.
//!
//! A readline loop acting as a single conversation. Lines starting with
//! `@` upload a local file as a document, so `@prompt.txt` behaves like
//! sending `prompt.txt` from a chat client.

use std::path::Path;

use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use crate::store::ConversationId;

use super::{ChatService, Inbound, Reply};

const PROMPT: &str = "codesmith> ";

const COMMANDS: &[&str] = &[
    "/start", "/help", "/model", "/file", "/files", "/history", "/reset", "/quit",
];

/// Completion and hints for slash commands.
struct ConsoleHelper;

impl Helper for ConsoleHelper {}

impl Completer for ConsoleHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if !line.starts_with('/') || line.contains(' ') {
            return Ok((0, Vec::new()));
        }
        let candidates = COMMANDS
            .iter()
            .filter(|cmd| cmd.starts_with(line))
            .map(|cmd| Pair {
                display: cmd.to_string(),
                replacement: cmd.to_string(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Hinter for ConsoleHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if !line.starts_with('/') || line.contains(' ') {
            return None;
        }
        COMMANDS
            .iter()
            .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
            .map(|cmd| cmd[line.len()..].to_string())
    }
}

impl Highlighter for ConsoleHelper {}

impl Validator for ConsoleHelper {}

/// What one input line asks for.
#[derive(Debug, PartialEq, Eq)]
enum ConsoleInput {
    Quit,
    Skip,
    Upload(String),
    Message(String),
}

fn classify(line: &str) -> ConsoleInput {
    let trimmed = line.trim();
    match trimmed {
        "" => ConsoleInput::Skip,
        "/quit" | "/exit" | "quit" | "exit" => ConsoleInput::Quit,
        _ => match trimmed.strip_prefix('@') {
            Some(path) if !path.trim().is_empty() => ConsoleInput::Upload(path.trim().to_string()),
            _ => ConsoleInput::Message(line.to_string()),
        },
    }
}

/// Read a local file into a document message.
async fn upload(path: &str) -> std::io::Result<Inbound> {
    let bytes = tokio::fs::read(path).await?;
    let file_name = Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
        .to_string();
    Ok(Inbound::Document { file_name, bytes })
}

/// Color a unified diff line by line.
fn colorize_diff(diff: &str) -> String {
    diff.lines()
        .map(|line| {
            if line.starts_with("+++") || line.starts_with("---") {
                line.bold().to_string()
            } else if line.starts_with("@@") {
                line.cyan().to_string()
            } else if line.starts_with('+') {
                line.green().to_string()
            } else if line.starts_with('-') {
                line.red().to_string()
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render a reply for the terminal.
fn render_reply(reply: &Reply) -> String {
    match reply {
        Reply::Text(text) => match text.strip_prefix("Changes:\n") {
            Some(diff) => format!("{}\n{}", "Changes:".bright_yellow(), colorize_diff(diff)),
            None => text.bright_blue().to_string(),
        },
        Reply::File { name, content, caption } => {
            let mut header = format!("── {name} ──").bright_magenta().bold().to_string();
            if let Some(caption) = caption {
                header.push(' ');
                header.push_str(&caption.bright_black().to_string());
            }
            let body = if name.ends_with(".diff.txt") {
                colorize_diff(content)
            } else {
                content.clone()
            };
            format!("{header}\n{body}")
        }
    }
}

/// Run the console until EOF or `/quit`.
pub async fn run_console(service: &ChatService, conversation: ConversationId) -> anyhow::Result<()> {
    let mut rl: Editor<ConsoleHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(ConsoleHelper));

    println!("{}", format!("=== codesmith v{} ===", crate::VERSION).bright_magenta().bold());
    println!(
        "{}",
        format!(
            "Conversation {conversation}, files under {}. /help for usage, @file.txt to upload, /quit to exit.",
            service.generator().store().root().display()
        )
        .bright_black()
    );
    println!();

    loop {
        let line = match rl.readline(PROMPT) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type /quit to exit.".yellow());
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };

        let inbound = match classify(&line) {
            ConsoleInput::Skip => continue,
            ConsoleInput::Quit => break,
            ConsoleInput::Upload(path) => match upload(&path).await {
                Ok(inbound) => inbound,
                Err(e) => {
                    eprintln!("{}", format!("Cannot read {path}: {e}").red());
                    continue;
                }
            },
            ConsoleInput::Message(text) => Inbound::Text(text),
        };
        let _ = rl.add_history_entry(line.as_str());

        if matches!(inbound, Inbound::Document { .. }) || !line.trim_start().starts_with('/') {
            println!("{}", "Generating...".bright_black());
        }

        for reply in service.handle(&conversation, inbound).await {
            println!("{}", render_reply(&reply));
            println!();
        }
    }

    println!("{}", "Goodbye!".bright_green());
    Ok(())
}
