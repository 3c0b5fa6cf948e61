// SPDX-FileCopyrightText: 2026 Aware Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turn progress events.
//!
//! The engine publishes state transitions instead of mutating caller-owned
//! state. Subscribers (a terminal UI, tests) receive every event on a
//! broadcast channel; a lagging subscriber loses old events, never new ones.

use tokio::sync::broadcast;

use aware_core::types::{Message, ProcessId, ToolInUse};

/// One observable step of a conversation turn.
#[derive(Debug, Clone)]
pub enum TurnEvent {
    /// Validation passed and the user message is persisted.
    TurnStarted { process_id: ProcessId },
    /// The first streamed token arrived.
    FirstToken { process_id: ProcessId },
    /// The tool indicator changed.
    ToolChanged { process_id: ProcessId, tool: ToolInUse },
    /// The visible transcript was rewritten. Carries the whole active list;
    /// conversations are small, so a full rewrite beats a diff protocol.
    TranscriptUpdated {
        process_id: ProcessId,
        transcript: Vec<Message>,
    },
    /// The turn finished and the assistant message is persisted.
    GenerationComplete {
        process_id: ProcessId,
        message: Message,
    },
    /// The turn was cancelled by the user.
    GenerationStopped { process_id: ProcessId },
    /// The turn failed; `message` is user-visible.
    GenerationFailed {
        process_id: ProcessId,
        message: String,
    },
}

/// Broadcast hub for [`TurnEvent`]s.
#[derive(Debug, Clone)]
pub struct TurnEvents {
    sender: broadcast::Sender<TurnEvent>,
}

impl TurnEvents {
    /// Creates a hub buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribes to all events emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<TurnEvent> {
        self.sender.subscribe()
    }

    /// Emits an event. Events with no live subscriber are dropped.
    pub fn emit(&self, event: TurnEvent) {
        let _ = self.sender.send(event);
    }
}

impl Default for TurnEvents {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_emitted_events() {
        let events = TurnEvents::new(8);
        let mut rx = events.subscribe();
        events.emit(TurnEvent::FirstToken {
            process_id: ProcessId("proc-1".into()),
        });
        let event = rx.recv().await.unwrap();
        assert!(matches!(event, TurnEvent::FirstToken { .. }));
    }

    #[test]
    fn emit_without_subscribers_is_ok() {
        let events = TurnEvents::new(8);
        events.emit(TurnEvent::GenerationStopped {
            process_id: ProcessId("proc-1".into()),
        });
    }
}
