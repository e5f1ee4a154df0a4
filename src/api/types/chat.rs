//! Chat endpoint payloads

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::ChatEvent;

pub const MAX_MESSAGE_CHARS: u64 = 2000;

fn default_session_id() -> String {
    "default".to_string()
}

/// Body of `POST /chat`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChatRequestBody {
    #[validate(length(min = 1, max = MAX_MESSAGE_CHARS, message = "message must be 1 to 2000 characters"))]
    pub message: String,
    #[serde(default = "default_session_id")]
    pub session_id: String,
    #[serde(default)]
    pub stream: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<String>,
}

/// One `data:` payload of the SSE stream.
///
/// Backend errors travel as ordinary tokens so clients render them inline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StreamFrame {
    Token {
        token: String,
    },
    Done {
        done: bool,
        inference_ms: f64,
        model: String,
    },
}

impl From<ChatEvent> for StreamFrame {
    fn from(event: ChatEvent) -> Self {
        match event {
            ChatEvent::Token(token) | ChatEvent::Error(token) => Self::Token { token },
            ChatEvent::Done(summary) => Self::Done {
                done: true,
                inference_ms: summary.inference_ms,
                model: summary.model,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StreamSummary;

    #[test]
    fn test_request_defaults() {
        let body: ChatRequestBody = serde_json::from_str(r#"{"message": "hi"}"#).unwrap();
        assert_eq!(body.session_id, "default");
        assert!(!body.stream);
        assert!(body.validate().is_ok());
    }

    #[test]
    fn test_message_length_bounds() {
        let empty = ChatRequestBody {
            message: String::new(),
            session_id: default_session_id(),
            stream: false,
        };
        assert!(empty.validate().is_err());

        let longest = ChatRequestBody {
            message: "é".repeat(MAX_MESSAGE_CHARS as usize),
            ..empty.clone()
        };
        assert!(longest.validate().is_ok());

        let too_long = ChatRequestBody {
            message: "a".repeat(MAX_MESSAGE_CHARS as usize + 1),
            ..empty
        };
        assert!(too_long.validate().is_err());
    }

    #[test]
    fn test_stream_frame_wire_format() {
        let token = StreamFrame::from(ChatEvent::Token("Great".to_string()));
        assert_eq!(serde_json::to_string(&token).unwrap(), r#"{"token":"Great"}"#);

        let error = StreamFrame::from(ChatEvent::Error("[Error] boom".to_string()));
        assert_eq!(
            serde_json::to_string(&error).unwrap(),
            r#"{"token":"[Error] boom"}"#
        );

        let done = StreamFrame::from(ChatEvent::Done(StreamSummary {
            inference_ms: 12.5,
            model: "llama3.2:3b".to_string(),
            provider: "ollama".to_string(),
        }));
        assert_eq!(
            serde_json::to_string(&done).unwrap(),
            r#"{"done":true,"inference_ms":12.5,"model":"llama3.2:3b"}"#
        );
    }
}
