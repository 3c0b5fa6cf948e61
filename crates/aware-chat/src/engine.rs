// SPDX-FileCopyrightText: 2026 Aware Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The turn engine: one user turn from validation to finalization.
//!
//! The engine owns the per-process generation locks and cancellation
//! tokens, routes requests to the registered backends, and publishes
//! [`TurnEvent`]s as the turn progresses. All collaborators come in
//! through constructor injection; the engine holds no global state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use aware_core::types::{
    BackendKind, ChatMessage, ChatSettings, ChunkCodec, FileItem, GenerationRequest,
    GenerationStream, HistoryMessage, Message, MessagePatch, ModelDescriptor, NewMessage,
    Process, ProcessId, Role, ToolInUse,
};
use aware_core::{
    AttachmentStore, AwareError, GenerationBackend, MessageStore, RetrievalQuery, Retriever,
};

use crate::consume::consume;
use crate::context::ChatContext;
use crate::events::{TurnEvent, TurnEvents};
use crate::prompt;

/// One image attachment carried on a turn request.
#[derive(Debug, Clone)]
pub struct Attachment {
    /// Storage-relative path, e.g. `user-1/image.png`.
    pub path: String,
    pub bytes: Vec<u8>,
}

/// Caller input for one turn.
#[derive(Debug, Clone, Default)]
pub struct TurnRequest {
    /// Target process; `None` starts a fresh conversation.
    pub process_id: Option<ProcessId>,
    pub user_text: String,
    pub attachments: Vec<Attachment>,
    /// Retrieval file ids newly attached with this turn.
    pub file_ids: Vec<String>,
}

/// A turn past validation: user message and placeholder are persisted and
/// the process's generation lock is held until finalization or failure.
pub struct StartedTurn {
    pub process: Process,
    pub settings: ChatSettings,
    pub model: ModelDescriptor,
    pub user_message: Message,
    pub placeholder: Message,
    pub new_file_ids: Vec<String>,
    cancel: CancellationToken,
}

/// Drives conversation turns against injected collaborators.
pub struct TurnEngine {
    store: Arc<dyn MessageStore>,
    attachments: Arc<dyn AttachmentStore>,
    events: TurnEvents,
    backends: HashMap<BackendKind, Arc<dyn GenerationBackend>>,
    retriever: Option<Arc<dyn Retriever>>,
    retrieval_source_count: usize,
    in_flight: Mutex<HashMap<ProcessId, CancellationToken>>,
    file_items: Mutex<HashMap<ProcessId, Vec<FileItem>>>,
}

impl TurnEngine {
    pub fn new(
        store: Arc<dyn MessageStore>,
        attachments: Arc<dyn AttachmentStore>,
        events: TurnEvents,
    ) -> Self {
        Self {
            store,
            attachments,
            events,
            backends: HashMap::new(),
            retriever: None,
            retrieval_source_count: 4,
            in_flight: Mutex::new(HashMap::new()),
            file_items: Mutex::new(HashMap::new()),
        }
    }

    /// Registers the backend serving `kind`.
    pub fn with_backend(mut self, kind: BackendKind, backend: Arc<dyn GenerationBackend>) -> Self {
        self.backends.insert(kind, backend);
        self
    }

    /// Enables retrieval with the given per-query snippet limit.
    pub fn with_retriever(mut self, retriever: Arc<dyn Retriever>, source_count: usize) -> Self {
        self.retriever = Some(retriever);
        self.retrieval_source_count = source_count;
        self
    }

    /// The event hub turns publish to.
    pub fn events(&self) -> &TurnEvents {
        &self.events
    }

    /// Validates prerequisites, resolves or creates the process, uploads
    /// attachments, and persists the user message plus the assistant
    /// placeholder. Holds the process's generation lock on success.
    pub async fn start_turn(
        &self,
        ctx: &ChatContext,
        request: TurnRequest,
    ) -> Result<StartedTurn, AwareError> {
        let resolved = ctx.resolve(&request.user_text)?;
        let settings = resolved.settings.clone();
        let model = resolved.model.clone();
        let user_id = resolved.profile.user_id.clone();

        let process = self
            .resolve_process(request.process_id.as_ref(), &user_id, resolved.profile)
            .await?;

        let cancel = self.acquire(&process.id)?;
        match self
            .start_turn_locked(&process, &settings, &model, &user_id, &request)
            .await
        {
            Ok((user_message, placeholder)) => {
                self.events.emit(TurnEvent::TurnStarted {
                    process_id: process.id.clone(),
                });
                self.emit_transcript(&process.id).await;
                Ok(StartedTurn {
                    process,
                    settings,
                    model,
                    user_message,
                    placeholder,
                    new_file_ids: request.file_ids,
                    cancel,
                })
            }
            Err(e) => {
                self.release(&process.id);
                Err(e)
            }
        }
    }

    async fn start_turn_locked(
        &self,
        process: &Process,
        settings: &ChatSettings,
        model: &ModelDescriptor,
        user_id: &str,
        request: &TurnRequest,
    ) -> Result<(Message, Message), AwareError> {
        let mut image_paths = Vec::new();
        for attachment in &request.attachments {
            match self
                .attachments
                .upload(&attachment.path, attachment.bytes.clone())
                .await
            {
                Ok(stored) => image_paths.push(stored),
                Err(e) => {
                    // A failed upload drops that attachment, not the turn.
                    warn!(path = %attachment.path, "attachment upload failed: {e}");
                }
            }
        }

        let user_message = self
            .append_with_retry(NewMessage {
                id: None,
                user_id: user_id.to_string(),
                process_id: process.id.clone(),
                model: Some(settings.model.clone()),
                message_type: None,
                role: Role::User,
                name: None,
                content: Some(request.user_text.clone()),
                image_paths,
                tool_calls: None,
                tool_call_id: None,
                on_buffer: false,
            })
            .await?;

        let placeholder = self
            .append_with_retry(NewMessage {
                id: None,
                user_id: user_id.to_string(),
                process_id: process.id.clone(),
                model: Some(model.model_id.clone()),
                message_type: None,
                role: Role::Assistant,
                name: None,
                content: None,
                image_paths: Vec::new(),
                tool_calls: None,
                tool_call_id: None,
                on_buffer: true,
            })
            .await?;

        Ok((user_message, placeholder))
    }

    /// Issues the streaming request for the turn.
    ///
    /// A transport failure or missing local model rolls back the user
    /// message and placeholder, releases the lock, and publishes a
    /// user-visible failure event.
    pub async fn dispatch_generation(
        &self,
        turn: &StartedTurn,
        history: Vec<HistoryMessage>,
    ) -> Result<GenerationStream, AwareError> {
        let backend = self
            .backends
            .get(&turn.model.backend)
            .ok_or_else(|| AwareError::Provider {
                message: format!("no backend registered for model {}", turn.model.model_id),
                source: None,
            })?;

        let request = GenerationRequest {
            settings: turn.settings.clone(),
            messages: history,
        };

        match backend.stream(request, turn.cancel.clone()).await {
            Ok(stream) => Ok(stream),
            Err(e) => {
                if matches!(
                    e,
                    AwareError::Transport { .. } | AwareError::ModelNotAvailable(_)
                ) {
                    // Roll back the optimistic user message + placeholder.
                    if let Err(rollback) = self
                        .store
                        .truncate_from(&turn.process.id, turn.user_message.sequence_number)
                        .await
                    {
                        warn!(process_id = %turn.process.id, "rollback failed: {rollback}");
                    }
                    self.emit_transcript(&turn.process.id).await;
                }
                self.release(&turn.process.id);
                self.events.emit(TurnEvent::GenerationFailed {
                    process_id: turn.process.id.clone(),
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Accumulates the stream into the placeholder message, persisting and
    /// republishing the transcript on every chunk. Returns the full text.
    ///
    /// Malformed local-backend chunks are logged and skipped. A missing
    /// body fails the turn with a stream error.
    pub async fn reconcile_stream(
        &self,
        turn: &StartedTurn,
        stream: GenerationStream,
    ) -> Result<String, AwareError> {
        let GenerationStream { codec, body } = stream;
        let Some(body) = body else {
            self.release(&turn.process.id);
            let err = AwareError::Stream("Response body is null".into());
            self.events.emit(TurnEvent::GenerationFailed {
                process_id: turn.process.id.clone(),
                message: err.to_string(),
            });
            return Err(err);
        };

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<String>();
        let consume_fut = async {
            let result = consume(body, &turn.cancel, |chunk| {
                for delta in decode_chunk(codec, chunk) {
                    let _ = tx.send(delta);
                }
            })
            .await;
            drop(tx);
            result
        };

        let apply_fut = async {
            let mut accumulated = String::new();
            let mut first = true;
            while let Some(delta) = rx.recv().await {
                if first {
                    first = false;
                    self.events.emit(TurnEvent::FirstToken {
                        process_id: turn.process.id.clone(),
                    });
                    self.events.emit(TurnEvent::ToolChanged {
                        process_id: turn.process.id.clone(),
                        tool: ToolInUse::None,
                    });
                }
                accumulated.push_str(&delta);
                self.store
                    .update(
                        &turn.placeholder.id,
                        MessagePatch {
                            content: Some(accumulated.clone()),
                            ..Default::default()
                        },
                    )
                    .await?;
                self.emit_transcript(&turn.process.id).await;
            }
            Ok::<String, AwareError>(accumulated)
        };

        let (consume_result, apply_result) = tokio::join!(consume_fut, apply_fut);
        let failed = match (consume_result, apply_result) {
            (Ok(()), Ok(accumulated)) => return Ok(accumulated),
            (Err(e), _) => e,
            (Ok(()), Err(e)) => e,
        };
        self.release(&turn.process.id);
        self.events.emit(TurnEvent::GenerationFailed {
            process_id: turn.process.id.clone(),
            message: failed.to_string(),
        });
        Err(failed)
    }

    /// Fetches retrieval context for the turn. Failures are logged and
    /// yield an empty result set; they never abort the turn.
    pub async fn retrieve_context(&self, turn: &StartedTurn) -> Vec<FileItem> {
        let Some(retriever) = self.retriever.as_ref() else {
            return Vec::new();
        };

        // Newly attached ids first, then everything already known.
        let mut file_ids = turn.new_file_ids.clone();
        if let Ok(known) = self.file_items.lock() {
            if let Some(items) = known.get(&turn.process.id) {
                for item in items {
                    if !file_ids.contains(&item.file_id) {
                        file_ids.push(item.file_id.clone());
                    }
                }
            }
        }
        if file_ids.is_empty() {
            return Vec::new();
        }

        self.events.emit(TurnEvent::ToolChanged {
            process_id: turn.process.id.clone(),
            tool: ToolInUse::Retrieval,
        });

        let query = RetrievalQuery {
            user_input: turn.user_message.content.clone().unwrap_or_default(),
            file_ids,
            embeddings_provider: turn.settings.embeddings_provider,
            source_count: self.retrieval_source_count,
        };
        match retriever.retrieve(&query).await {
            Ok(items) => items,
            Err(e) => {
                warn!("retrieval failed, continuing without context: {e}");
                Vec::new()
            }
        }
    }

    /// Persists the final assistant content, merges retrieval results into
    /// the process's known file items, and releases the generation lock.
    pub async fn finalize_turn(
        &self,
        turn: &StartedTurn,
        final_text: String,
        retrieval_results: Vec<FileItem>,
    ) -> Result<ChatMessage, AwareError> {
        let mut item_ids: Vec<String> = Vec::new();
        for item in &retrieval_results {
            if !item_ids.contains(&item.id) {
                item_ids.push(item.id.clone());
            }
        }
        if let Ok(mut known) = self.file_items.lock() {
            let items = known.entry(turn.process.id.clone()).or_default();
            for item in retrieval_results {
                if !items.iter().any(|existing| existing.id == item.id) {
                    items.push(item);
                }
            }
        }

        let result = self
            .store
            .update(
                &turn.placeholder.id,
                MessagePatch {
                    content: Some(final_text),
                    on_buffer: Some(false),
                    ..Default::default()
                },
            )
            .await;
        self.release(&turn.process.id);

        let message = result?;
        self.emit_transcript(&turn.process.id).await;
        self.events.emit(TurnEvent::GenerationComplete {
            process_id: turn.process.id.clone(),
            message: message.clone(),
        });
        debug!(process_id = %turn.process.id, "turn finalized");
        Ok(ChatMessage {
            message,
            file_items: item_ids,
        })
    }

    /// The whole pipeline: start, retrieval, dispatch, reconcile, finalize.
    pub async fn send_message(
        &self,
        ctx: &ChatContext,
        request: TurnRequest,
    ) -> Result<ChatMessage, AwareError> {
        let turn = self.start_turn(ctx, request).await?;

        let retrieval_results = self.retrieve_context(&turn).await;

        let history = match self.build_turn_history(ctx, &turn, &retrieval_results).await {
            Ok(history) => history,
            Err(e) => {
                self.release(&turn.process.id);
                self.events.emit(TurnEvent::GenerationFailed {
                    process_id: turn.process.id.clone(),
                    message: e.to_string(),
                });
                return Err(e);
            }
        };

        let stream = self.dispatch_generation(&turn, history).await?;
        let final_text = self.reconcile_stream(&turn, stream).await?;

        if turn.cancel.is_cancelled() {
            self.events.emit(TurnEvent::GenerationStopped {
                process_id: turn.process.id.clone(),
            });
        }
        self.finalize_turn(&turn, final_text, retrieval_results).await
    }

    async fn build_turn_history(
        &self,
        ctx: &ChatContext,
        turn: &StartedTurn,
        retrieval_results: &[FileItem],
    ) -> Result<Vec<HistoryMessage>, AwareError> {
        let resolved = ctx.resolve(turn.user_message.content.as_deref().unwrap_or_default())?;
        let transcript = self.store.active_transcript(&turn.process.id).await?;
        Ok(prompt::build_history(
            &turn.settings,
            resolved.profile,
            resolved.workspace,
            &transcript,
            retrieval_results,
        ))
    }

    /// Truncates persisted history at `sequence_number` and returns the
    /// surviving transcript. The caller re-issues the turn with the edited
    /// content via [`TurnEngine::send_message`].
    pub async fn edit_and_regenerate(
        &self,
        process_id: &ProcessId,
        sequence_number: i64,
    ) -> Result<Vec<Message>, AwareError> {
        if self.is_in_flight(process_id) {
            return Err(AwareError::GenerationInFlight(process_id.clone()));
        }
        self.store
            .truncate_from(process_id, sequence_number)
            .await?;
        let transcript = self.emit_transcript(process_id).await;
        Ok(transcript)
    }

    /// Cancels the in-flight generation for the process, if any.
    pub fn stop(&self, process_id: &ProcessId) {
        if let Ok(in_flight) = self.in_flight.lock() {
            if let Some(token) = in_flight.get(process_id) {
                token.cancel();
                return;
            }
        }
        debug!(%process_id, "stop with no generation in flight");
    }

    /// Applies an out-of-band push of backend-generated content.
    ///
    /// A push arriving while a generation is in flight for the process is
    /// dropped: the streaming path already owns the placeholder.
    pub async fn handle_push(
        &self,
        process_id: &ProcessId,
        content: String,
    ) -> Result<(), AwareError> {
        if self.is_in_flight(process_id) {
            warn!(%process_id, "dropping push during in-flight generation");
            return Ok(());
        }
        let process = self
            .store
            .get_process(process_id)
            .await?
            .ok_or_else(|| AwareError::Internal(format!("unknown process {process_id}")))?;

        self.append_with_retry(NewMessage {
            id: None,
            user_id: process.user_id,
            process_id: process_id.clone(),
            model: None,
            message_type: None,
            role: Role::Assistant,
            name: None,
            content: Some(content),
            image_paths: Vec::new(),
            tool_calls: None,
            tool_call_id: None,
            on_buffer: false,
        })
        .await?;
        self.emit_transcript(process_id).await;
        Ok(())
    }

    // --- internals ---

    async fn resolve_process(
        &self,
        process_id: Option<&ProcessId>,
        user_id: &str,
        profile: &aware_core::types::Profile,
    ) -> Result<Process, AwareError> {
        if let Some(id) = process_id {
            if let Some(process) = self.store.get_process(id).await? {
                return Ok(process);
            }
        }

        let process = Process {
            id: process_id
                .cloned()
                .unwrap_or_else(|| ProcessId(uuid::Uuid::new_v4().to_string())),
            user_id: user_id.to_string(),
            agent_id: profile.assistant_agent_id.clone(),
            created_at: chrono::Utc::now()
                .format("%Y-%m-%dT%H:%M:%S%.3fZ")
                .to_string(),
        };
        self.store.create_process(&process).await?;
        debug!(process_id = %process.id, "process created");
        Ok(process)
    }

    /// One conflict retry: the store never retries on its own.
    async fn append_with_retry(&self, message: NewMessage) -> Result<Message, AwareError> {
        match self.store.append(message.clone()).await {
            Err(AwareError::Conflict { .. }) => self.store.append(message).await,
            other => other,
        }
    }

    fn acquire(&self, process_id: &ProcessId) -> Result<CancellationToken, AwareError> {
        let mut in_flight = self
            .in_flight
            .lock()
            .map_err(|_| AwareError::Internal("generation lock poisoned".into()))?;
        if in_flight.contains_key(process_id) {
            return Err(AwareError::GenerationInFlight(process_id.clone()));
        }
        let token = CancellationToken::new();
        in_flight.insert(process_id.clone(), token.clone());
        Ok(token)
    }

    fn release(&self, process_id: &ProcessId) {
        if let Ok(mut in_flight) = self.in_flight.lock() {
            in_flight.remove(process_id);
        }
    }

    fn is_in_flight(&self, process_id: &ProcessId) -> bool {
        self.in_flight
            .lock()
            .map(|m| m.contains_key(process_id))
            .unwrap_or(false)
    }

    async fn emit_transcript(&self, process_id: &ProcessId) -> Vec<Message> {
        match self.store.active_transcript(process_id).await {
            Ok(transcript) => {
                self.events.emit(TurnEvent::TranscriptUpdated {
                    process_id: process_id.clone(),
                    transcript: transcript.clone(),
                });
                transcript
            }
            Err(e) => {
                warn!(%process_id, "failed to load transcript: {e}");
                Vec::new()
            }
        }
    }
}

/// Decodes one transport chunk into zero or more text deltas.
///
/// Local chunks arrive as newline-delimited JSON; a line that fails to
/// parse is logged and skipped without aborting the stream.
fn decode_chunk(codec: ChunkCodec, chunk: &str) -> Vec<String> {
    match codec {
        ChunkCodec::RawText => {
            if chunk.is_empty() {
                Vec::new()
            } else {
                vec![chunk.to_string()]
            }
        }
        ChunkCodec::JsonLines => chunk
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match codec.decode(line) {
                Ok(text) => Some(text),
                Err(e) => {
                    warn!("skipping malformed chunk: {e}");
                    None
                }
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use aware_config::model::StorageConfig;
    use aware_core::types::{EmbeddingsProvider, HealthStatus, Profile, Workspace};
    use aware_core::{Adapter, AdapterType};
    use aware_store::SqliteStore;
    use bytes::Bytes;
    use futures::stream;
    use std::sync::Mutex as StdMutex;
    use tempfile::tempdir;

    struct ScriptedBackend {
        codec: ChunkCodec,
        script: StdMutex<Vec<Result<GenerationStream, AwareError>>>,
    }

    impl ScriptedBackend {
        fn raw(chunks: &[&str]) -> Self {
            Self::with_stream(ChunkCodec::RawText, text_stream(chunks))
        }

        fn with_stream(codec: ChunkCodec, stream: GenerationStream) -> Self {
            Self {
                codec,
                script: StdMutex::new(vec![Ok(stream)]),
            }
        }

        fn failing(error: AwareError) -> Self {
            Self {
                codec: ChunkCodec::RawText,
                script: StdMutex::new(vec![Err(error)]),
            }
        }
    }

    fn text_stream(chunks: &[&str]) -> GenerationStream {
        let items: Vec<Result<Bytes, AwareError>> = chunks
            .iter()
            .map(|c| Ok(Bytes::copy_from_slice(c.as_bytes())))
            .collect();
        GenerationStream {
            codec: ChunkCodec::RawText,
            body: Some(Box::pin(stream::iter(items))),
        }
    }

    fn json_stream(lines: &[&str]) -> GenerationStream {
        let items: Vec<Result<Bytes, AwareError>> = lines
            .iter()
            .map(|c| Ok(Bytes::copy_from_slice(c.as_bytes())))
            .collect();
        GenerationStream {
            codec: ChunkCodec::JsonLines,
            body: Some(Box::pin(stream::iter(items))),
        }
    }

    #[async_trait]
    impl Adapter for ScriptedBackend {
        fn name(&self) -> &str {
            "scripted"
        }
        fn version(&self) -> semver::Version {
            semver::Version::new(0, 1, 0)
        }
        fn adapter_type(&self) -> AdapterType {
            AdapterType::Backend
        }
        async fn health_check(&self) -> Result<HealthStatus, AwareError> {
            Ok(HealthStatus::Healthy)
        }
        async fn shutdown(&self) -> Result<(), AwareError> {
            Ok(())
        }
    }

    #[async_trait]
    impl GenerationBackend for ScriptedBackend {
        fn codec(&self) -> ChunkCodec {
            self.codec
        }
        async fn stream(
            &self,
            _request: GenerationRequest,
            _cancel: CancellationToken,
        ) -> Result<GenerationStream, AwareError> {
            self.script
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(AwareError::Internal("script exhausted".into())))
        }
    }

    struct NoAttachments;

    #[async_trait]
    impl AttachmentStore for NoAttachments {
        async fn upload(&self, path: &str, _bytes: Vec<u8>) -> Result<String, AwareError> {
            Ok(path.to_string())
        }
    }

    struct FailingAttachments;

    #[async_trait]
    impl AttachmentStore for FailingAttachments {
        async fn upload(&self, _path: &str, _bytes: Vec<u8>) -> Result<String, AwareError> {
            Err(AwareError::Internal("disk full".into()))
        }
    }

    fn hosted_context() -> ChatContext {
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

    async fn sqlite_store(dir: &tempfile::TempDir) -> Arc<SqliteStore> {
        let store = SqliteStore::new(StorageConfig {
            database_path: dir
                .path()
                .join("engine.db")
                .to_string_lossy()
                .into_owned(),
            wal_mode: true,
        });
        store.initialize().await.unwrap();
        Arc::new(store)
    }

    fn engine_with(store: Arc<SqliteStore>, backend: ScriptedBackend) -> TurnEngine {
        let kind = BackendKind::Hosted(aware_core::types::HostedProvider::Aware);
        TurnEngine::new(store, Arc::new(NoAttachments), TurnEvents::new(64))
            .with_backend(kind, Arc::new(backend))
    }

    fn hello_request() -> TurnRequest {
        TurnRequest {
            process_id: None,
            user_text: "Hello".into(),
            attachments: Vec::new(),
            file_ids: Vec::new(),
        }
    }

    #[tokio::test]
    async fn end_to_end_hello_turn() {
        let dir = tempdir().unwrap();
        let store = sqlite_store(&dir).await;
        let engine = engine_with(store.clone(), ScriptedBackend::raw(&["Hi", " there"]));
        let mut events = engine.events().subscribe();

        let result = engine
            .send_message(&hosted_context(), hello_request())
            .await
            .unwrap();
        assert_eq!(result.message.content.as_deref(), Some("Hi there"));
        assert_eq!(result.message.role, Role::Assistant);
        assert_eq!(result.message.sequence_number, 1);
        assert!(!result.message.on_buffer);

        let transcript = store
            .active_transcript(&result.message.process_id)
            .await
            .unwrap();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].role, Role::User);
        assert_eq!(transcript[0].sequence_number, 0);
        assert_eq!(transcript[0].content.as_deref(), Some("Hello"));
        assert_eq!(transcript[1].sequence_number, 1);

        // First token fired exactly once.
        let mut first_tokens = 0;
        while let Ok(event) = events.try_recv() {
            if matches!(event, TurnEvent::FirstToken { .. }) {
                first_tokens += 1;
            }
        }
        assert_eq!(first_tokens, 1);
    }

    #[tokio::test]
    async fn placeholder_accumulates_in_order() {
        let dir = tempdir().unwrap();
        let store = sqlite_store(&dir).await;
        let engine = engine_with(
            store.clone(),
            ScriptedBackend::raw(&["Hel", "lo, ", "world"]),
        );

        let result = engine
            .send_message(&hosted_context(), hello_request())
            .await
            .unwrap();
        assert_eq!(result.message.content.as_deref(), Some("Hello, world"));
    }

    #[tokio::test]
    async fn malformed_local_chunk_is_skipped() {
        let dir = tempdir().unwrap();
        let store = sqlite_store(&dir).await;
        let stream = json_stream(&[
            "{\"message\":{\"content\":\"Hi\"}}\n",
            "not json\n",
            "{\"message\":{\"content\":\" there\"}}\n",
        ]);
        let engine = engine_with(
            store.clone(),
            ScriptedBackend::with_stream(ChunkCodec::JsonLines, stream),
        );

        let result = engine
            .send_message(&hosted_context(), hello_request())
            .await
            .unwrap();
        assert_eq!(result.message.content.as_deref(), Some("Hi there"));
    }

    #[tokio::test]
    async fn transport_failure_rolls_back_optimistic_messages() {
        let dir = tempdir().unwrap();
        let store = sqlite_store(&dir).await;
        let engine = engine_with(
            store.clone(),
            ScriptedBackend::failing(AwareError::Transport {
                status: 400,
                message: "API key not found".into(),
            }),
        );
        let mut events = engine.events().subscribe();

        let err = engine
            .send_message(&hosted_context(), hello_request())
            .await
            .unwrap_err();
        assert!(matches!(err, AwareError::Transport { status: 400, .. }));

        // Both optimistic messages are gone.
        let process_id = loop {
            match events.try_recv() {
                Ok(TurnEvent::TurnStarted { process_id }) => break process_id,
                Ok(_) => continue,
                Err(_) => panic!("no TurnStarted event"),
            }
        };
        let transcript = store.active_transcript(&process_id).await.unwrap();
        assert!(transcript.is_empty());
    }

    #[tokio::test]
    async fn lock_is_released_after_failure() {
        let dir = tempdir().unwrap();
        let store = sqlite_store(&dir).await;
        let kind = BackendKind::Hosted(aware_core::types::HostedProvider::Aware);
        let backend = ScriptedBackend {
            codec: ChunkCodec::RawText,
            script: StdMutex::new(vec![
                // Popped last-to-first: failure, then success.
                Ok(text_stream(&["recovered"])),
                Err(AwareError::Transport {
                    status: 500,
                    message: "boom".into(),
                }),
            ]),
        };
        let engine = TurnEngine::new(store, Arc::new(NoAttachments), TurnEvents::new(64))
            .with_backend(kind, Arc::new(backend));

        let err = engine
            .send_message(&hosted_context(), hello_request())
            .await;
        assert!(err.is_err());

        let result = engine
            .send_message(&hosted_context(), hello_request())
            .await
            .unwrap();
        assert_eq!(result.message.content.as_deref(), Some("recovered"));
    }

    #[tokio::test]
    async fn missing_body_is_a_stream_error() {
        let dir = tempdir().unwrap();
        let store = sqlite_store(&dir).await;
        let engine = engine_with(
            store.clone(),
            ScriptedBackend::with_stream(
                ChunkCodec::RawText,
                GenerationStream {
                    codec: ChunkCodec::RawText,
                    body: None,
                },
            ),
        );

        let err = engine
            .send_message(&hosted_context(), hello_request())
            .await
            .unwrap_err();
        match err {
            AwareError::Stream(message) => assert_eq!(message, "Response body is null"),
            other => panic!("expected Stream, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn validation_failure_creates_no_process() {
        let dir = tempdir().unwrap();
        let store = sqlite_store(&dir).await;
        let engine = engine_with(store.clone(), ScriptedBackend::raw(&["unused"]));

        let mut ctx = hosted_context();
        ctx.settings = None;
        let err = engine.send_message(&ctx, hello_request()).await.unwrap_err();
        assert!(matches!(err, AwareError::Validation(_)));
    }

    #[tokio::test]
    async fn failed_attachment_upload_drops_the_attachment() {
        let dir = tempdir().unwrap();
        let store = sqlite_store(&dir).await;
        let kind = BackendKind::Hosted(aware_core::types::HostedProvider::Aware);
        let engine = TurnEngine::new(
            store.clone(),
            Arc::new(FailingAttachments),
            TurnEvents::new(64),
        )
        .with_backend(kind, Arc::new(ScriptedBackend::raw(&["ok"])));

        let request = TurnRequest {
            attachments: vec![Attachment {
                path: "user-1/img.png".into(),
                bytes: vec![1, 2, 3],
            }],
            ..hello_request()
        };
        let result = engine
            .send_message(&hosted_context(), request)
            .await
            .unwrap();

        let transcript = store
            .active_transcript(&result.message.process_id)
            .await
            .unwrap();
        assert!(transcript[0].image_paths.is_empty());
    }

    #[tokio::test]
    async fn edit_truncates_history_at_sequence_number() {
        let dir = tempdir().unwrap();
        let store = sqlite_store(&dir).await;
        let engine = engine_with(store.clone(), ScriptedBackend::raw(&["unused"]));
        let process_id = ProcessId("proc-edit".into());
        store
            .create_process(&Process {
                id: process_id.clone(),
                user_id: "user-1".into(),
                agent_id: None,
                created_at: "2026-01-01T00:00:00.000Z".into(),
            })
            .await
            .unwrap();
        for i in 0..5 {
            store
                .append(NewMessage {
                    id: None,
                    user_id: "user-1".into(),
                    process_id: process_id.clone(),
                    model: None,
                    message_type: None,
                    role: if i % 2 == 0 { Role::User } else { Role::Assistant },
                    name: None,
                    content: Some(format!("msg {i}")),
                    image_paths: Vec::new(),
                    tool_calls: None,
                    tool_call_id: None,
                    on_buffer: false,
                })
                .await
                .unwrap();
        }

        let transcript = engine.edit_and_regenerate(&process_id, 3).await.unwrap();
        assert_eq!(transcript.len(), 3);
        assert!(transcript.iter().all(|m| m.sequence_number < 3));

        // Idempotent.
        let transcript = engine.edit_and_regenerate(&process_id, 3).await.unwrap();
        assert_eq!(transcript.len(), 3);
    }

    #[tokio::test]
    async fn push_appends_when_idle() {
        let dir = tempdir().unwrap();
        let store = sqlite_store(&dir).await;
        let engine = engine_with(store.clone(), ScriptedBackend::raw(&["Hi"]));

        let result = engine
            .send_message(&hosted_context(), hello_request())
            .await
            .unwrap();
        let process_id = result.message.process_id.clone();

        engine
            .handle_push(&process_id, "out-of-band update".into())
            .await
            .unwrap();
        let transcript = store.active_transcript(&process_id).await.unwrap();
        assert_eq!(transcript.len(), 3);
        assert_eq!(
            transcript[2].content.as_deref(),
            Some("out-of-band update")
        );
        assert_eq!(transcript[2].role, Role::Assistant);
    }

    #[tokio::test]
    async fn stop_without_in_flight_generation_is_a_noop() {
        let dir = tempdir().unwrap();
        let store = sqlite_store(&dir).await;
        let engine = engine_with(store, ScriptedBackend::raw(&["unused"]));
        engine.stop(&ProcessId("nobody".into()));
    }

    #[tokio::test]
    async fn finalize_deduplicates_file_items_first_seen() {
        let dir = tempdir().unwrap();
        let store = sqlite_store(&dir).await;
        let engine = engine_with(store.clone(), ScriptedBackend::raw(&["one"]));

        let turn = engine
            .start_turn(&hosted_context(), hello_request())
            .await
            .unwrap();
        let items = vec![
            FileItem {
                id: "fi-1".into(),
                file_id: "f-1".into(),
                content: "a".into(),
                tokens: 1,
            },
            FileItem {
                id: "fi-1".into(),
                file_id: "f-1".into(),
                content: "a".into(),
                tokens: 1,
            },
            FileItem {
                id: "fi-2".into(),
                file_id: "f-2".into(),
                content: "b".into(),
                tokens: 1,
            },
        ];
        let result = engine
            .finalize_turn(&turn, "done".into(), items)
            .await
            .unwrap();
        assert_eq!(result.file_items, vec!["fi-1", "fi-2"]);

        let known = engine.file_items.lock().unwrap();
        let stored = known.get(&turn.process.id).unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].id, "fi-1");
        assert_eq!(stored[1].id, "fi-2");
    }
}
