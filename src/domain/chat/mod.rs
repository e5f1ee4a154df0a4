//! Conversation domain: session memory, prompt assembly and chat events

mod event;
mod prompt;
mod session;

pub use event::{elapsed_ms, ChatEvent, ChatReply, StreamSummary};
pub use prompt::{build_prompt, format_context, ASSISTANT_NAME, SUGGESTIONS, SYSTEM_PROMPT};
pub use session::{ConversationSession, SessionHandle, SessionStore};
