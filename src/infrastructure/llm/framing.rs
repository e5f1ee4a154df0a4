//! Incremental decoding of streamed generation responses

use std::collections::VecDeque;

use futures::{stream, StreamExt};
use serde::Deserialize;

use super::http_client::ByteStream;
use crate::domain::{DomainError, LlmStream, StreamFragment};

/// Reassembles newline-terminated lines across arbitrary chunk boundaries
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: Vec<u8>,
}

impl LineBuffer {
    /// Feed a chunk and return every line it completed
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.buf.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.buf.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw[..raw.len() - 1])
                .trim_end_matches('\r')
                .to_string();
            if !line.trim().is_empty() {
                lines.push(line);
            }
        }
        lines
    }

    /// Remaining unterminated text, if any
    pub fn finish(&mut self) -> Option<String> {
        let rest = String::from_utf8_lossy(&self.buf).trim().to_string();
        self.buf.clear();
        (!rest.is_empty()).then_some(rest)
    }
}

/// One decoded wire frame
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame {
    pub token: Option<String>,
    pub done: bool,
}

impl Frame {
    fn token(text: String) -> Self {
        Self {
            token: Some(text),
            done: false,
        }
    }

    fn done() -> Self {
        Self {
            token: None,
            done: true,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OllamaChunk {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    done: bool,
}

/// Parse one newline-delimited JSON event from Ollama. `None` for malformed lines.
pub fn parse_ndjson_line(line: &str) -> Option<Frame> {
    let chunk: OllamaChunk = serde_json::from_str(line).ok()?;
    Some(Frame {
        token: chunk.response.filter(|t| !t.is_empty()),
        done: chunk.done,
    })
}

#[derive(Debug, Deserialize)]
struct SseChunk {
    choices: Vec<SseChoice>,
}

#[derive(Debug, Deserialize)]
struct SseChoice {
    #[serde(default)]
    delta: Option<SseDelta>,
}

#[derive(Debug, Deserialize)]
struct SseDelta {
    content: Option<String>,
}

/// Parse one `data:` line of an OpenAI-compatible event stream.
/// `None` for comments, other fields and malformed payloads.
pub fn parse_sse_line(line: &str) -> Option<Frame> {
    let data = line.strip_prefix("data:")?.trim();

    if data == "[DONE]" {
        return Some(Frame::done());
    }

    let chunk: SseChunk = serde_json::from_str(data).ok()?;
    let content = chunk
        .choices
        .into_iter()
        .next()?
        .delta?
        .content
        .filter(|c| !c.is_empty())?;
    Some(Frame::token(content))
}

struct DecodeState<P, D> {
    bytes: ByteStream,
    buffer: LineBuffer,
    pending: VecDeque<StreamFragment>,
    parse: P,
    describe: D,
    finished: bool,
}

impl<P, D> DecodeState<P, D>
where
    P: Fn(&str) -> Option<Frame>,
{
    fn absorb(&mut self, line: &str) {
        let Some(frame) = (self.parse)(line) else {
            tracing::debug!(line = %line, "Skipping malformed stream frame");
            return;
        };
        if let Some(token) = frame.token {
            self.pending.push_back(StreamFragment::Text(token));
        }
        if frame.done {
            self.finished = true;
        }
    }
}

/// Turn a raw byte stream into text fragments using a line parser.
///
/// Decoding stops at the first `done` frame, at end of input, or after a
/// transport error, which is reported once through `describe`.
pub fn decode_stream<P, D>(bytes: ByteStream, parse: P, describe: D) -> LlmStream
where
    P: Fn(&str) -> Option<Frame> + Send + 'static,
    D: Fn(&DomainError) -> String + Send + 'static,
{
    let state = DecodeState {
        bytes,
        buffer: LineBuffer::default(),
        pending: VecDeque::new(),
        parse,
        describe,
        finished: false,
    };

    let fragments = stream::unfold(state, |mut state| async move {
        loop {
            if let Some(fragment) = state.pending.pop_front() {
                return Some((fragment, state));
            }
            if state.finished {
                return None;
            }

            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    for line in state.buffer.push(&chunk) {
                        state.absorb(&line);
                        if state.finished {
                            break;
                        }
                    }
                }
                Some(Err(e)) => {
                    let message = (state.describe)(&e);
                    state.pending.push_back(StreamFragment::Error(message));
                    state.finished = true;
                }
                None => {
                    if let Some(line) = state.buffer.finish() {
                        state.absorb(&line);
                    }
                    state.finished = true;
                }
            }
        }
    });

    Box::pin(fragments)
}
