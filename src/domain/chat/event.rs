use serde::Serialize;

/// Result of a blocking chat turn
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReply {
    pub response: String,
    pub context_used: bool,
    pub chunks_retrieved: usize,
    pub inference_ms: f64,
    pub model: String,
    pub provider: String,
}

/// Metadata carried by the terminal event of a streamed turn
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamSummary {
    pub inference_ms: f64,
    pub model: String,
    pub provider: String,
}

/// Events produced by a streamed chat turn.
///
/// A stream is any number of `Token`s, at most one `Error`, then exactly one
/// `Done`.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    Token(String),
    Error(String),
    Done(StreamSummary),
}

impl ChatEvent {
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }
}

/// Milliseconds rounded to one decimal place
pub fn elapsed_ms(start: std::time::Instant) -> f64 {
    (start.elapsed().as_secs_f64() * 10_000.0).round() / 10.0
}
