// SPDX-FileCopyrightText: 2026 Aware Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `aware status` command implementation.
//!
//! Runs a health check against every configured adapter and prints the
//! results. Falls back gracefully when a service is not running.

use aware_channel::WebSocketChannel;
use aware_chat::HttpRetriever;
use aware_config::model::AwareConfig;
use aware_core::types::{HealthStatus, HostedProvider};
use aware_core::{Adapter, AwareError, PushChannel};
use aware_hosted::{resolve_provider, HostedBackend};
use aware_ollama::OllamaBackend;
use aware_store::SqliteStore;
use colored::Colorize;
use serde::Serialize;

/// One adapter's health, in `--json` mode.
#[derive(Debug, Serialize)]
struct AdapterStatus {
    name: String,
    healthy: bool,
    detail: Option<String>,
}

fn to_status(name: &str, result: Result<HealthStatus, AwareError>) -> AdapterStatus {
    match result {
        Ok(HealthStatus::Healthy) => AdapterStatus {
            name: name.to_string(),
            healthy: true,
            detail: None,
        },
        Ok(HealthStatus::Degraded(detail)) | Ok(HealthStatus::Unhealthy(detail)) => {
            AdapterStatus {
                name: name.to_string(),
                healthy: false,
                detail: Some(detail),
            }
        }
        Err(e) => AdapterStatus {
            name: name.to_string(),
            healthy: false,
            detail: Some(e.to_string()),
        },
    }
}

/// Run the `aware status` command.
pub async fn run_status(config: &AwareConfig, json: bool) -> Result<(), AwareError> {
    let mut statuses = Vec::new();

    let store = SqliteStore::new(config.storage.clone());
    let store_health = match store.initialize().await {
        Ok(()) => store.health_check().await,
        Err(e) => Err(e),
    };
    statuses.push(to_status("sqlite", store_health));

    match OllamaBackend::new(&config.ollama) {
        Ok(backend) => statuses.push(to_status("ollama", backend.health_check().await)),
        Err(e) => statuses.push(to_status("ollama", Err(e))),
    }

    let provider = resolve_provider(HostedProvider::Aware, config.hosted.use_azure_openai);
    match HostedBackend::new(&config.hosted, provider) {
        Ok(backend) => statuses.push(to_status("hosted", backend.health_check().await)),
        Err(e) => statuses.push(to_status("hosted", Err(e))),
    }

    if config.chat.use_retrieval {
        match HttpRetriever::new(config.retrieval.url.clone()) {
            Ok(retriever) => {
                statuses.push(to_status("retrieval", retriever.health_check().await));
            }
            Err(e) => statuses.push(to_status("retrieval", Err(e))),
        }
    }

    if config.channel.enabled {
        match WebSocketChannel::connect(&config.channel).await {
            Ok(channel) => {
                let health = channel.health_check().await;
                let _ = channel.close().await;
                statuses.push(to_status("channel", health));
            }
            Err(e) => statuses.push(to_status("channel", Err(e))),
        }
    }

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&statuses)
                .map_err(|e| AwareError::Internal(format!("failed to render status: {e}")))?
        );
        return Ok(());
    }

    for status in &statuses {
        let marker = if status.healthy {
            "ok".green()
        } else {
            "unavailable".red()
        };
        match &status.detail {
            Some(detail) => println!("{:<10} {marker}  {}", status.name, detail.dimmed()),
            None => println!("{:<10} {marker}", status.name),
        }
    }
    Ok(())
}
