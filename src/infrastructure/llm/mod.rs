//! LLM provider implementations

mod factory;
mod framing;
mod http_client;
mod ollama;
mod openai_compatible;

pub use factory::{LlmConfig, LlmProviderFactory, ProviderKind, ResolvedLlm};
pub use framing::{decode_stream, parse_ndjson_line, parse_sse_line, Frame, LineBuffer};
pub use http_client::{ByteStream, HttpClient, HttpClientTrait};
#[cfg(test)]
pub use http_client::mock::MockHttpClient;
pub use ollama::{OllamaProvider, DEFAULT_OLLAMA_BASE_URL, DEFAULT_OLLAMA_MODEL};
pub use openai_compatible::{
    OpenAiCompatibleProvider, DEFAULT_GROQ_BASE_URL, DEFAULT_GROQ_MODEL, DEFAULT_OPENAI_BASE_URL,
    DEFAULT_OPENAI_MODEL,
};
