// SPDX-FileCopyrightText: 2026 Aware Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `aware chat` command implementation.
//!
//! Launches an interactive REPL with colored prompt, streaming output,
//! and readline history. Assembles the full turn-engine stack from
//! configuration and drives it one turn per input line.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use aware_channel::WebSocketChannel;
use aware_chat::{
    ChatContext, FsAttachmentStore, HttpRetriever, TurnEngine, TurnEvent, TurnEvents,
    TurnRequest,
};
use aware_config::model::AwareConfig;
use aware_core::types::{BackendKind, ChatSettings, EmbeddingsProvider, HostedProvider};
use aware_core::types::{Profile, ProcessId, Workspace};
use aware_core::{Adapter, AwareError, GenerationBackend, PushChannel};
use aware_hosted::{resolve_provider, HostedBackend};
use aware_ollama::OllamaBackend;
use aware_store::SqliteStore;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{info, warn};

/// System prompt applied when the configuration does not override it.
const DEFAULT_PROMPT: &str = "You are a friendly, helpful AI assistant.";

/// Hosted provider endpoints registered at startup.
const HOSTED_PROVIDERS: [HostedProvider; 7] = [
    HostedProvider::OpenAi,
    HostedProvider::Azure,
    HostedProvider::Google,
    HostedProvider::Anthropic,
    HostedProvider::Mistral,
    HostedProvider::Perplexity,
    HostedProvider::Aware,
];

fn attachments_root() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("aware")
        .join("files")
}

/// Builds the conversation context from configuration.
fn build_context(config: &AwareConfig) -> ChatContext {
    let embeddings_provider = config
        .chat
        .embeddings_provider
        .parse()
        .unwrap_or(EmbeddingsProvider::OpenAi);

    ChatContext {
        settings: Some(ChatSettings {
            model: config.chat.model.clone(),
            prompt: DEFAULT_PROMPT.to_string(),
            temperature: config.chat.temperature,
            context_length: config.chat.context_length,
            include_profile_context: true,
            include_workspace_instructions: true,
            embeddings_provider,
        }),
        model: Some(crate::models::resolve(&config.chat.model)),
        profile: Some(Profile {
            user_id: "local".to_string(),
            display_name: config.agent.name.clone(),
            use_azure_openai: config.hosted.use_azure_openai,
            assistant_agent_id: None,
            profile_context: None,
        }),
        workspace: Some(Workspace {
            id: "local".to_string(),
            name: "Home".to_string(),
            instructions: None,
        }),
    }
}

/// Assembles the turn engine with every configured backend.
async fn build_engine(config: &AwareConfig) -> Result<(Arc<TurnEngine>, Arc<SqliteStore>), AwareError> {
    let store = SqliteStore::new(config.storage.clone());
    store.initialize().await?;
    let store = Arc::new(store);

    let attachments = Arc::new(FsAttachmentStore::new(attachments_root()));
    let mut engine = TurnEngine::new(store.clone(), attachments, TurnEvents::default());

    let local: Arc<dyn GenerationBackend> = Arc::new(OllamaBackend::new(&config.ollama)?);
    engine = engine.with_backend(BackendKind::Local, local);

    // The azure override collapses at registration: a request addressed to
    // `openai` reaches the `azure` endpoint when the profile opts in.
    for provider in HOSTED_PROVIDERS {
        let resolved = resolve_provider(provider, config.hosted.use_azure_openai);
        let backend: Arc<dyn GenerationBackend> =
            Arc::new(HostedBackend::new(&config.hosted, resolved)?);
        engine = engine.with_backend(BackendKind::Hosted(provider), backend);
    }

    if config.chat.use_retrieval {
        let retriever = Arc::new(HttpRetriever::new(config.retrieval.url.clone())?);
        engine = engine.with_retriever(retriever, config.retrieval.source_count);
    }

    Ok((Arc::new(engine), store))
}

/// Connects the push channel and routes inbound frames to the engine.
async fn connect_channel(
    config: &AwareConfig,
    engine: Arc<TurnEngine>,
    current_process: Arc<Mutex<Option<ProcessId>>>,
) -> Option<WebSocketChannel> {
    if !config.channel.enabled {
        return None;
    }
    match WebSocketChannel::connect(&config.channel).await {
        Ok(channel) => {
            channel.set_callback(Arc::new(move |content: String| {
                let target = current_process
                    .lock()
                    .ok()
                    .and_then(|guard| guard.clone());
                let Some(process_id) = target else {
                    warn!("push received with no active conversation, dropping");
                    return;
                };
                let engine = engine.clone();
                tokio::spawn(async move {
                    if let Err(e) = engine.handle_push(&process_id, content).await {
                        warn!("failed to apply push: {e}");
                    }
                });
            }));
            info!(url = %config.channel.url, "push channel connected");
            Some(channel)
        }
        Err(e) => {
            warn!("push channel unavailable, continuing without it: {e}");
            None
        }
    }
}

/// Runs the `aware chat` interactive REPL.
pub async fn run_chat(config: AwareConfig) -> Result<(), AwareError> {
    let (engine, store) = build_engine(&config).await?;
    let ctx = build_context(&config);
    let current_process: Arc<Mutex<Option<ProcessId>>> = Arc::new(Mutex::new(None));
    let channel = connect_channel(&config, engine.clone(), current_process.clone()).await;

    let mut rl = DefaultEditor::new()
        .map_err(|e| AwareError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", "aware chat".bold().green());
    println!("model: {}", ctx.settings.as_ref().map(|s| s.model.as_str()).unwrap_or("?").cyan());
    println!(
        "Type {} to exit, {} for a fresh conversation, {} to edit a turn.\n",
        "/quit".yellow(),
        "/new".yellow(),
        "/edit <seq> <text>".yellow()
    );

    let prompt = format!("{}> ", "aware".green());
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed == "/quit" || trimmed == "/exit" {
                    break;
                }
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                if trimmed == "/new" {
                    if let Ok(mut guard) = current_process.lock() {
                        *guard = None;
                    }
                    println!("{}", "started a new conversation".dimmed());
                    continue;
                }

                let request = match parse_input(trimmed, &current_process) {
                    Ok(Some(request)) => request,
                    Ok(None) => continue,
                    Err(message) => {
                        eprintln!("{}: {message}", "error".red());
                        continue;
                    }
                };

                if let Some((process_id, sequence_number)) = request.edit {
                    match engine.edit_and_regenerate(&process_id, sequence_number).await {
                        Ok(_) => {}
                        Err(e) => {
                            eprintln!("{}: {e}", "error".red());
                            continue;
                        }
                    }
                }

                if let Err(e) = run_turn(&engine, &ctx, &current_process, request.turn).await {
                    eprintln!("{}: {e}", "error".red());
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    if let Some(channel) = channel {
        if let Err(e) = channel.close().await {
            warn!("failed to close push channel: {e}");
        }
    }
    store.shutdown().await?;
    println!("{}", "goodbye".dimmed());
    Ok(())
}

#[derive(Debug)]
struct ParsedInput {
    /// Pending truncation for an `/edit` command.
    edit: Option<(ProcessId, i64)>,
    turn: TurnRequest,
}

/// Parses one REPL line into a turn request, handling `/edit`.
fn parse_input(
    input: &str,
    current_process: &Arc<Mutex<Option<ProcessId>>>,
) -> Result<Option<ParsedInput>, String> {
    let process_id = current_process.lock().ok().and_then(|guard| guard.clone());

    if let Some(rest) = input.strip_prefix("/edit ") {
        let Some(process_id) = process_id else {
            return Err("no conversation to edit".to_string());
        };
        let mut parts = rest.splitn(2, ' ');
        let sequence_number: i64 = parts
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| "usage: /edit <seq> <text>".to_string())?;
        let text = parts
            .next()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| "usage: /edit <seq> <text>".to_string())?;
        return Ok(Some(ParsedInput {
            edit: Some((process_id.clone(), sequence_number)),
            turn: TurnRequest {
                process_id: Some(process_id),
                user_text: text.to_string(),
                attachments: Vec::new(),
                file_ids: Vec::new(),
            },
        }));
    }
    if input.starts_with('/') {
        return Err(format!("unknown command: {input}"));
    }

    Ok(Some(ParsedInput {
        edit: None,
        turn: TurnRequest {
            process_id,
            user_text: input.to_string(),
            attachments: Vec::new(),
            file_ids: Vec::new(),
        },
    }))
}

/// Drives one turn, streaming output to stdout. Ctrl+C while streaming
/// stops the generation instead of exiting.
async fn run_turn(
    engine: &Arc<TurnEngine>,
    ctx: &ChatContext,
    current_process: &Arc<Mutex<Option<ProcessId>>>,
    request: TurnRequest,
) -> Result<(), AwareError> {
    let mut events = engine.events().subscribe();
    let turn_engine = engine.clone();
    let turn_ctx = ctx.clone();
    let mut turn = tokio::spawn(async move { turn_engine.send_message(&turn_ctx, request).await });

    let mut printed = 0usize;
    let mut active: Option<ProcessId> = None;
    let result = loop {
        tokio::select! {
            joined = &mut turn => {
                break joined
                    .map_err(|e| AwareError::Internal(format!("turn task failed: {e}")))?;
            }
            event = events.recv() => {
                let Ok(event) = event else { continue };
                match event {
                    TurnEvent::TurnStarted { process_id } => {
                        active = Some(process_id.clone());
                        if let Ok(mut guard) = current_process.lock() {
                            *guard = Some(process_id);
                        }
                    }
                    TurnEvent::TranscriptUpdated { transcript, .. } => {
                        // Print only the unseen tail of the accumulating
                        // placeholder.
                        if let Some(last) = transcript.last() {
                            if last.on_buffer {
                                if let Some(content) = last.content.as_deref() {
                                    if content.len() > printed {
                                        print!("{}", &content[printed..]);
                                        use std::io::Write;
                                        let _ = std::io::stdout().flush();
                                        printed = content.len();
                                    }
                                }
                            }
                        }
                    }
                    _ => {}
                }
            }
            _ = tokio::signal::ctrl_c() => {
                if let Some(process_id) = active.as_ref() {
                    engine.stop(process_id);
                    eprintln!("\n{}", "stopping...".yellow());
                }
            }
        }
    };

    match result {
        Ok(_) => {
            println!();
            Ok(())
        }
        Err(e) => Err(e),
    }
}
