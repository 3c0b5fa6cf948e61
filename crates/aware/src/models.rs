// SPDX-FileCopyrightText: 2026 Aware Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model catalog: maps a model identifier from configuration to the
//! backend that serves it.

use aware_core::types::{BackendKind, HostedProvider, ModelDescriptor};

/// Resolves a model identifier to its descriptor.
///
/// Well-known hosted model families route to their provider endpoint;
/// anything unrecognized is treated as a local model name.
pub fn resolve(model_id: &str) -> ModelDescriptor {
    if model_id == "aware-1.0" {
        return ModelDescriptor::aware();
    }

    let (backend, model_name, supports_images) = if model_id.starts_with("gpt-") {
        (
            BackendKind::Hosted(HostedProvider::OpenAi),
            "GPT",
            model_id.contains("4"),
        )
    } else if model_id.starts_with("claude-") {
        (BackendKind::Hosted(HostedProvider::Anthropic), "Claude", true)
    } else if model_id.starts_with("gemini-") {
        (BackendKind::Hosted(HostedProvider::Google), "Gemini", true)
    } else if model_id.starts_with("mistral-") || model_id.starts_with("mixtral-") {
        (BackendKind::Hosted(HostedProvider::Mistral), "Mistral", false)
    } else if model_id.starts_with("sonar") || model_id.starts_with("pplx-") {
        (
            BackendKind::Hosted(HostedProvider::Perplexity),
            "Perplexity",
            false,
        )
    } else {
        (BackendKind::Local, model_id, false)
    };

    ModelDescriptor {
        model_id: model_id.to_string(),
        model_name: model_name.to_string(),
        backend,
        hosted_id: match backend {
            BackendKind::Hosted(_) => Some(model_id.to_string()),
            BackendKind::Local => None,
        },
        supports_images,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hosted_families_route_to_their_provider() {
        assert_eq!(
            resolve("gpt-4o").backend,
            BackendKind::Hosted(HostedProvider::OpenAi)
        );
        assert_eq!(
            resolve("claude-3-5-sonnet").backend,
            BackendKind::Hosted(HostedProvider::Anthropic)
        );
        assert_eq!(
            resolve("gemini-1.5-pro").backend,
            BackendKind::Hosted(HostedProvider::Google)
        );
        assert_eq!(
            resolve("mistral-large").backend,
            BackendKind::Hosted(HostedProvider::Mistral)
        );
    }

    #[test]
    fn unknown_identifiers_are_local_models() {
        let descriptor = resolve("llama3:8b");
        assert_eq!(descriptor.backend, BackendKind::Local);
        assert!(descriptor.hosted_id.is_none());
    }

    #[test]
    fn first_party_model_resolves_to_aware() {
        let descriptor = resolve("aware-1.0");
        assert_eq!(
            descriptor.backend,
            BackendKind::Hosted(HostedProvider::Aware)
        );
    }
}
