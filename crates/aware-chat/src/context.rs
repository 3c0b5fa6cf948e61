// SPDX-FileCopyrightText: 2026 Aware Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-turn prerequisite state and its validation.

use aware_core::error::Prerequisite;
use aware_core::types::{ChatSettings, ModelDescriptor, Profile, Workspace};
use aware_core::AwareError;

/// Everything a turn needs resolved before any network call.
///
/// The caller assembles this from its own state layer; the engine only
/// checks presence. Checks run in a fixed order -- settings, model,
/// profile, workspace, then message content -- and fail with the first
/// missing prerequisite.
#[derive(Debug, Clone, Default)]
pub struct ChatContext {
    pub settings: Option<ChatSettings>,
    pub model: Option<ModelDescriptor>,
    pub profile: Option<Profile>,
    pub workspace: Option<Workspace>,
}

/// Borrowed view of a fully validated context.
#[derive(Debug)]
pub struct ResolvedContext<'a> {
    pub settings: &'a ChatSettings,
    pub model: &'a ModelDescriptor,
    pub profile: &'a Profile,
    pub workspace: &'a Workspace,
}

impl ChatContext {
    /// Validates all prerequisites in their fixed order.
    pub fn resolve(&self, user_text: &str) -> Result<ResolvedContext<'_>, AwareError> {
        let settings = self
            .settings
            .as_ref()
            .ok_or(AwareError::Validation(Prerequisite::Settings))?;
        let model = self
            .model
            .as_ref()
            .ok_or(AwareError::Validation(Prerequisite::Model))?;
        let profile = self
            .profile
            .as_ref()
            .ok_or(AwareError::Validation(Prerequisite::Profile))?;
        let workspace = self
            .workspace
            .as_ref()
            .ok_or(AwareError::Validation(Prerequisite::Workspace))?;
        if user_text.trim().is_empty() {
            return Err(AwareError::Validation(Prerequisite::MessageContent));
        }
        Ok(ResolvedContext {
            settings,
            model,
            profile,
            workspace,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aware_core::types::EmbeddingsProvider;

    fn full_context() -> ChatContext {
        ChatContext {
            settings: Some(ChatSettings {
                model: "aware-1.0".into(),
                prompt: "You are a helpful assistant.".into(),
                temperature: 0.5,
                context_length: 4096,
                include_profile_context: false,
                include_workspace_instructions: false,
                embeddings_provider: EmbeddingsProvider::OpenAi,
            }),
            model: Some(ModelDescriptor::aware()),
            profile: Some(Profile {
                user_id: "user-1".into(),
                display_name: "Tester".into(),
                use_azure_openai: false,
                assistant_agent_id: None,
                profile_context: None,
            }),
            workspace: Some(Workspace {
                id: "ws-1".into(),
                name: "Home".into(),
                instructions: None,
            }),
        }
    }

    #[test]
    fn full_context_resolves() {
        assert!(full_context().resolve("Hello").is_ok());
    }

    #[test]
    fn missing_prerequisites_fail_in_fixed_order() {
        let mut ctx = full_context();
        ctx.settings = None;
        ctx.model = None;
        // Settings is reported first even though model is also missing.
        match ctx.resolve("Hello") {
            Err(AwareError::Validation(p)) => assert_eq!(p, Prerequisite::Settings),
            other => panic!("expected validation error, got {other:?}"),
        }

        let mut ctx = full_context();
        ctx.model = None;
        match ctx.resolve("Hello") {
            Err(AwareError::Validation(p)) => assert_eq!(p, Prerequisite::Model),
            other => panic!("expected validation error, got {other:?}"),
        }

        let mut ctx = full_context();
        ctx.profile = None;
        match ctx.resolve("Hello") {
            Err(AwareError::Validation(p)) => assert_eq!(p, Prerequisite::Profile),
            other => panic!("expected validation error, got {other:?}"),
        }

        let mut ctx = full_context();
        ctx.workspace = None;
        match ctx.resolve("Hello") {
            Err(AwareError::Validation(p)) => assert_eq!(p, Prerequisite::Workspace),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn blank_message_content_is_rejected_last() {
        match full_context().resolve("   ") {
            Err(AwareError::Validation(p)) => assert_eq!(p, Prerequisite::MessageContent),
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
