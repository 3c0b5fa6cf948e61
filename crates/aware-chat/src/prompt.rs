// SPDX-FileCopyrightText: 2026 Aware Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! History assembly for generation requests.
//!
//! Folds the base prompt, optional profile context, optional workspace
//! instructions, and retrieval snippets into one system entry, then maps
//! the active transcript into role/content pairs. Messages still on the
//! buffer (the placeholder) are excluded.

use aware_core::types::{ChatSettings, FileItem, HistoryMessage, Message, Profile, Role, Workspace};

/// Builds the message history for one generation request.
pub fn build_history(
    settings: &ChatSettings,
    profile: &Profile,
    workspace: &Workspace,
    transcript: &[Message],
    retrieval: &[FileItem],
) -> Vec<HistoryMessage> {
    let mut system = settings.prompt.clone();

    if settings.include_profile_context {
        if let Some(context) = profile.profile_context.as_deref() {
            if !context.is_empty() {
                system.push_str("\n\nUser info:\n");
                system.push_str(context);
            }
        }
    }

    if settings.include_workspace_instructions {
        if let Some(instructions) = workspace.instructions.as_deref() {
            if !instructions.is_empty() {
                system.push_str("\n\nInstructions:\n");
                system.push_str(instructions);
            }
        }
    }

    if !retrieval.is_empty() {
        system.push_str("\n\nUse the following sources if needed:\n");
        for item in retrieval {
            system.push_str("<source>\n");
            system.push_str(&item.content);
            system.push_str("\n</source>\n");
        }
    }

    let mut history = vec![HistoryMessage {
        role: Role::System,
        content: system,
    }];

    for message in transcript {
        if message.on_buffer {
            continue;
        }
        history.push(HistoryMessage {
            role: message.role,
            content: message.content.clone().unwrap_or_default(),
        });
    }

    history
}
