// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Codesmith main entry point - CLI, one-shot commands, and console.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use colored::Colorize;

use codesmith::chat::console::run_console;
use codesmith::chat::{ChatService, Inbound, ReplyPolicy};
use codesmith::config::{self, CliOptions, ResolvedConfig};
use codesmith::generator::Generator;
use codesmith::providers::create_provider_from_config;
use codesmith::session::{check_active_filename, ModelPolicy, SessionState};
use codesmith::store::{ConversationId, VersionStore};
use codesmith::telemetry::{init_telemetry, TelemetryConfig};

/// Codesmith - chat-driven code generation with version history.
#[derive(Parser)]
#[command(name = "codesmith")]
#[command(author, version, about = "Chat-driven code generator", long_about = None)]
struct Cli {
    /// Chat transport token. Only needed by transports that log in to a chat
    /// service; the console and one-shot commands run without it
    #[arg(long, env = "TELEGRAM_TOKEN", hide_env_values = true)]
    chat_token: Option<String>,

    /// Model API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Default model for new conversations
    #[arg(short, long, env = "DEFAULT_MODEL")]
    model: Option<String>,

    /// Root directory for generated files
    #[arg(short, long, env = "OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Model request timeout in seconds
    #[arg(long, env = "OPENAI_REQUEST_TIMEOUT")]
    request_timeout: Option<u64>,

    /// Base URL for the model API
    #[arg(long, env = "OPENAI_BASE_URL")]
    base_url: Option<String>,

    /// Show info-level logs
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Show debug logs with span timings
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Subcommands for codesmith.
#[derive(Subcommand)]
enum Commands {
    /// Interactive console acting as one conversation (default)
    Repl {
        /// Conversation id to use
        #[arg(short, long, default_value = "console")]
        conversation: String,
    },

    /// Run a single instruction and print the artifact
    Generate {
        /// Conversation id
        #[arg(short, long, default_value = "console")]
        conversation: String,
        /// Read the instruction from a .txt document
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,
        /// Instruction text
        #[arg(short, long)]
        text: Option<String>,
        /// Pin the target filename instead of inferring it
        #[arg(long)]
        target: Option<String>,
    },

    /// List files generated in a conversation
    Files {
        conversation: String,
    },

    /// List versions of a file in a conversation
    History {
        conversation: String,
        filename: String,
    },

    /// Show or initialize configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

/// Config subcommand actions.
#[derive(Subcommand)]
enum ConfigAction {
    /// Show resolved configuration (secrets omitted)
    Show,
    /// Write a starter config file in the current directory
    Init,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_telemetry(
        &TelemetryConfig::from_flags(cli.verbose, cli.debug).with_ansi(std::io::stderr().is_terminal()),
    )?;

    let cli_options = CliOptions {
        chat_token: cli.chat_token,
        api_key: cli.api_key,
        model: cli.model,
        output_dir: cli.output_dir,
        base_url: cli.base_url,
        request_timeout_secs: cli.request_timeout,
    };

    let workspace_root = std::env::current_dir()?;
    let command = cli.command.unwrap_or(Commands::Repl {
        conversation: "console".to_string(),
    });

    if let Commands::Config { action } = &command {
        return handle_config(&workspace_root, action.as_ref(), cli_options);
    }

    let config = config::load_config(&workspace_root, cli_options)?;

    match command {
        Commands::Repl { conversation } => {
            let conversation = parse_conversation(&conversation)?;
            let service = build_service(&config)?;
            run_console(&service, conversation).await
        }
        Commands::Generate {
            conversation,
            file,
            text,
            target,
        } => {
            let conversation = parse_conversation(&conversation)?;
            handle_generate(&config, conversation, file.as_deref(), text, target).await
        }
        Commands::Files { conversation } => {
            let conversation = parse_conversation(&conversation)?;
            handle_files(&config, &conversation).await
        }
        Commands::History { conversation, filename } => {
            let conversation = parse_conversation(&conversation)?;
            handle_history(&config, &conversation, &filename).await
        }
        Commands::Config { .. } => Ok(()),
    }
}

fn parse_conversation(raw: &str) -> anyhow::Result<ConversationId> {
    Ok(ConversationId::new(raw)?)
}

/// Model handle and generator. Fails fast when the API key is missing.
fn build_generator(config: &ResolvedConfig) -> anyhow::Result<Generator> {
    config.credentials(false)?;
    let model = create_provider_from_config(config)?;
    tracing::info!(
        provider = model.name(),
        model = %config.default_model,
        output_dir = %config.output_dir.display(),
        "Model configured"
    );
    Ok(Generator::new(model, VersionStore::new(&config.output_dir)))
}

fn build_service(config: &ResolvedConfig) -> anyhow::Result<ChatService> {
    Ok(ChatService::new(
        build_generator(config)?,
        ModelPolicy::from_config(config),
        ReplyPolicy::from_config(config),
    ))
}

async fn handle_generate(
    config: &ResolvedConfig,
    conversation: ConversationId,
    file: Option<&Path>,
    text: Option<String>,
    target: Option<String>,
) -> anyhow::Result<()> {
    let instruction = match (file, text) {
        (Some(path), _) => {
            let bytes = tokio::fs::read(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            Inbound::document(file_name, bytes).into_instruction()?
        }
        (None, Some(text)) => text,
        (None, None) => bail!("Provide an instruction with --text or --file"),
    };

    let generator = build_generator(config)?;
    let mut session = SessionState::new(&config.default_model);
    if let Some(target) = target {
        session.active_filename = Some(check_active_filename(&target)?);
    }

    eprintln!("{} Generating...", "→".cyan());
    let outcome = generator.generate(&conversation, &session, &instruction).await?;

    println!("{}", outcome.artifact);

    eprintln!(
        "{} {} -> {}",
        "✓".green(),
        outcome.display_name().bright_white(),
        outcome.version.path.display()
    );
    if let Some(diff) = outcome.diff.as_ref().filter(|d| !d.is_empty()) {
        eprintln!("{} {}", "Changes:".bright_yellow(), diff.summary);
        for line in diff.text.lines() {
            let colored = if line.starts_with("+++") || line.starts_with("---") {
                line.bold()
            } else if line.starts_with('+') {
                line.green()
            } else if line.starts_with('-') {
                line.red()
            } else if line.starts_with("@@") {
                line.cyan()
            } else {
                line.normal()
            };
            eprintln!("{colored}");
        }
    }
    if let Some(usage) = outcome.usage {
        tracing::info!(
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            "Token usage"
        );
    }
    Ok(())
}

async fn handle_files(config: &ResolvedConfig, conversation: &ConversationId) -> anyhow::Result<()> {
    let store = VersionStore::new(&config.output_dir);
    let files = store.list_files(conversation).await?;
    if files.is_empty() {
        println!("{}", format!("No files in conversation {conversation}").dimmed());
        return Ok(());
    }
    for file in files {
        let modified = file
            .modified
            .map(|m| m.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<32} {:>8} bytes  {:>3} versions  {}",
            file.filename.bright_white(),
            file.size,
            file.versions,
            modified.dimmed()
        );
    }
    Ok(())
}

async fn handle_history(
    config: &ResolvedConfig,
    conversation: &ConversationId,
    filename: &str,
) -> anyhow::Result<()> {
    let store = VersionStore::new(&config.output_dir);
    let versions = store.history(conversation, filename).await?;
    if versions.is_empty() {
        println!("{}", format!("No versions of {filename}").dimmed());
        return Ok(());
    }
    for version in versions {
        println!(
            "{}  {}",
            version.created_at.format("%Y-%m-%d %H:%M:%S%.3f").to_string().cyan(),
            version.path.display()
        );
    }
    Ok(())
}

fn handle_config(
    workspace_root: &Path,
    action: Option<&ConfigAction>,
    cli_options: CliOptions,
) -> anyhow::Result<()> {
    match action {
        Some(ConfigAction::Show) | None => {
            let config = config::load_config(workspace_root, cli_options)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
            let key_state = if config.credentials(false).is_ok() { "set" } else { "missing" };
            println!("{}", format!("OPENAI_API_KEY: {key_state}").dimmed());
            let token_state = if config.credentials(true).is_ok() {
                "set"
            } else {
                "missing (not needed by the console)"
            };
            println!("{}", format!("TELEGRAM_TOKEN: {token_state}").dimmed());
        }
        Some(ConfigAction::Init) => {
            let path = config::init_config(workspace_root)?;
            println!("Created config file: {}", path.display());
        }
    }
    Ok(())
}
