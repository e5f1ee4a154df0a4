//! Chat engine - one conversational turn: retrieve, prompt, generate, remember

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::StreamExt;
use tokio::sync::{mpsc, RwLock};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

use crate::domain::chat::{
    build_prompt, elapsed_ms, format_context, SessionStore, SUGGESTIONS, SYSTEM_PROMPT,
};
use crate::domain::llm::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use crate::domain::{
    ChatEvent, ChatReply, GenerateRequest, KnowledgeIndex, LlmProvider, Message, SearchResult,
    StreamFragment, StreamSummary,
};

const EVENT_BUFFER: usize = 32;

/// Events of one streamed turn
pub type ChatEventStream = ReceiverStream<ChatEvent>;

/// Tunables for conversational turns
#[derive(Debug, Clone, PartialEq)]
pub struct ChatSettings {
    /// Completed turns kept per session; memory holds twice as many messages
    pub max_history: usize,
    /// Documents retrieved per turn
    pub top_k: usize,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            max_history: 10,
            top_k: 6,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// Retrieval-augmented chat over a shared knowledge index.
///
/// Turns on the same session are serialised; different sessions run
/// independently.
pub struct ChatEngine {
    llm: Arc<dyn LlmProvider>,
    index: RwLock<Option<Arc<KnowledgeIndex>>>,
    sessions: SessionStore,
    settings: ChatSettings,
}

impl std::fmt::Debug for ChatEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatEngine")
            .field("provider", &self.llm.provider_name())
            .field("model", &self.llm.model())
            .field("settings", &self.settings)
            .finish()
    }
}

fn retrieve(index: Option<&KnowledgeIndex>, message: &str, top_k: usize) -> Vec<SearchResult> {
    index.map(|i| i.query(message, top_k)).unwrap_or_default()
}

impl ChatEngine {
    pub fn new(llm: Arc<dyn LlmProvider>, index: Option<KnowledgeIndex>) -> Self {
        Self::with_settings(llm, index, ChatSettings::default())
    }

    pub fn with_settings(
        llm: Arc<dyn LlmProvider>,
        index: Option<KnowledgeIndex>,
        settings: ChatSettings,
    ) -> Self {
        Self {
            llm,
            index: RwLock::new(index.map(Arc::new)),
            sessions: SessionStore::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    pub fn provider(&self) -> &Arc<dyn LlmProvider> {
        &self.llm
    }

    /// Swap in a freshly built index; turns already running keep the old one
    pub async fn replace_index(&self, index: KnowledgeIndex) {
        let documents = index.len();
        *self.index.write().await = Some(Arc::new(index));
        info!(documents, "Knowledge index replaced");
    }

    /// Number of indexed documents, `None` when no knowledge base is loaded
    pub async fn index_size(&self) -> Option<usize> {
        self.index.read().await.as_ref().map(|i| i.len())
    }

    async fn current_index(&self) -> Option<Arc<KnowledgeIndex>> {
        self.index.read().await.clone()
    }

    fn request(&self, prompt: String) -> GenerateRequest {
        GenerateRequest::new(prompt)
            .with_system(SYSTEM_PROMPT)
            .with_temperature(self.settings.temperature)
            .with_max_tokens(self.settings.max_tokens)
    }

    /// Blocking turn. Backend failures become the response text.
    pub async fn chat(&self, message: &str, session_id: &str) -> ChatReply {
        let start = Instant::now();
        let handle = self.sessions.acquire(session_id).await;
        let mut session = handle.lock().await;

        let index = self.current_index().await;
        let hits = retrieve(index.as_deref(), message, self.settings.top_k);
        let context = format_context(&hits);
        let prompt = build_prompt(message, &context, session.history(), self.settings.max_history);

        let response = match self.llm.generate(self.request(prompt)).await {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    session_id = %session_id,
                    provider = self.llm.provider_name(),
                    error = %e,
                    "Generation failed, returning error as response"
                );
                e.to_string()
            }
        };

        session.record_turn(message, response.clone(), self.settings.max_history);

        let reply = ChatReply {
            response,
            context_used: !context.is_empty(),
            chunks_retrieved: hits.len(),
            inference_ms: elapsed_ms(start),
            model: self.llm.model().to_string(),
            provider: self.llm.provider_name().to_string(),
        };
        info!(
            session_id = %session_id,
            chunks = reply.chunks_retrieved,
            inference_ms = reply.inference_ms,
            "Chat turn completed"
        );
        reply
    }

    /// Streaming turn: tokens as they arrive, at most one error, then `Done`.
    ///
    /// Dropping the returned stream stops generation; an abandoned turn is
    /// not recorded in memory.
    pub async fn stream_chat(&self, message: &str, session_id: &str) -> ChatEventStream {
        let (tx, rx) = mpsc::channel::<ChatEvent>(EVENT_BUFFER);

        let handle = self.sessions.acquire(session_id).await;
        let index = self.current_index().await;
        let llm = Arc::clone(&self.llm);
        let settings = self.settings.clone();
        let message = message.to_string();
        let session_id = session_id.to_string();
        let request_base = self.request(String::new());

        tokio::spawn(async move {
            let start = Instant::now();
            let mut session = handle.lock_owned().await;

            let hits = retrieve(index.as_deref(), &message, settings.top_k);
            let context = format_context(&hits);
            let prompt = build_prompt(&message, &context, session.history(), settings.max_history);
            let request = GenerateRequest {
                prompt,
                ..request_base
            };

            let mut fragments = llm.stream(request).await;
            let mut response = String::new();

            loop {
                let next = tokio::select! {
                    next = fragments.next() => next,
                    _ = tx.closed() => {
                        debug!(session_id = %session_id, "Client went away while backend was silent");
                        return;
                    }
                };
                let Some(fragment) = next else {
                    break;
                };

                let event = match fragment {
                    StreamFragment::Text(text) => {
                        response.push_str(&text);
                        ChatEvent::Token(text)
                    }
                    StreamFragment::Error(text) => {
                        warn!(session_id = %session_id, error = %text, "Stream ended with error");
                        response.push_str(&text);
                        ChatEvent::Error(text)
                    }
                };
                let is_error = matches!(event, ChatEvent::Error(_));

                if tx.send(event).await.is_err() {
                    debug!(session_id = %session_id, "Client went away, stopping generation");
                    return;
                }
                if is_error {
                    break;
                }
            }
            drop(fragments);

            session.record_turn(message, response, settings.max_history);
            drop(session);

            let summary = StreamSummary {
                inference_ms: elapsed_ms(start),
                model: llm.model().to_string(),
                provider: llm.provider_name().to_string(),
            };
            info!(
                session_id = %session_id,
                chunks = hits.len(),
                inference_ms = summary.inference_ms,
                "Streamed chat turn completed"
            );
            let _ = tx.send(ChatEvent::Done(summary)).await;
        });

        ReceiverStream::new(rx)
    }

    /// Forget a session. Unknown ids are ignored.
    pub async fn clear_history(&self, session_id: &str) {
        if self.sessions.remove(session_id).await {
            debug!(session_id = %session_id, "Session cleared");
        }
    }

    pub async fn history(&self, session_id: &str) -> Vec<Message> {
        self.sessions.history(session_id).await.unwrap_or_default()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.len().await
    }

    /// Drop sessions idle for longer than `ttl`
    pub async fn purge_idle(&self, ttl: Duration) -> usize {
        let removed = self.sessions.purge_idle(ttl).await;
        if removed > 0 {
            info!(removed, "Purged idle chat sessions");
        }
        removed
    }

    pub fn get_suggestions(&self) -> Vec<String> {
        SUGGESTIONS.iter().map(|s| s.to_string()).collect()
    }
}
