use async_trait::async_trait;
use futures::stream;
use serde::Deserialize;

use super::framing::{decode_stream, parse_ndjson_line};
use super::http_client::HttpClientTrait;
use crate::domain::llm::with_system;
use crate::domain::{ChatRequest, DomainError, GenerateRequest, LlmProvider, LlmStream, StreamFragment};

pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2:3b";

const PROVIDER: &str = "ollama";
const STREAM_UNAVAILABLE: &str =
    "[Error] Ollama is not running. Install from https://ollama.com and run: ollama serve";

/// Local Ollama server provider
#[derive(Debug)]
pub struct OllamaProvider<C: HttpClientTrait> {
    client: C,
    base_url: String,
    model: String,
}

impl<C: HttpClientTrait> OllamaProvider<C> {
    pub fn new(client: C, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn remediation(&self) -> String {
        format!(
            "Ollama is not running. Start it:\n  1. Install: https://ollama.com/download\n  2. Run: ollama serve\n  3. Pull model: ollama pull {}",
            self.model
        )
    }

    /// Replace raw connection errors with instructions for the operator
    fn explain(&self, error: DomainError) -> DomainError {
        if error.is_backend_unavailable() {
            tracing::warn!(base_url = %self.base_url, error = %error, "Ollama unreachable");
            DomainError::backend_unavailable(PROVIDER, self.remediation())
        } else {
            error
        }
    }

    fn generate_body(&self, request: &GenerateRequest, stream: bool) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "prompt": request.prompt,
            "system": request.system,
            "stream": stream,
            "options": {
                "temperature": request.temperature,
                "num_predict": request.max_tokens,
            },
        })
    }

    async fn tags(&self) -> Result<TagsResponse, DomainError> {
        let json = self.client.get_json(&self.url("/api/tags"), vec![]).await?;
        serde_json::from_value(json).map_err(|e| {
            DomainError::provider(PROVIDER, format!("Failed to parse model list: {}", e))
        })
    }
}

fn describe_stream_error(error: &DomainError) -> String {
    if error.is_backend_unavailable() {
        STREAM_UNAVAILABLE.to_string()
    } else {
        format!("[Error] {}", error)
    }
}

#[async_trait]
impl<C: HttpClientTrait + 'static> LlmProvider for OllamaProvider<C> {
    async fn generate(&self, request: GenerateRequest) -> Result<String, DomainError> {
        let body = self.generate_body(&request, false);
        let json = self
            .client
            .post_json(&self.url("/api/generate"), vec![], &body)
            .await
            .map_err(|e| self.explain(e))?;

        let response: GenerateResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider(PROVIDER, format!("Failed to parse response: {}", e))
        })?;

        Ok(response.response.trim().to_string())
    }

    async fn stream(&self, request: GenerateRequest) -> LlmStream {
        let body = self.generate_body(&request, true);
        match self
            .client
            .post_json_stream(&self.url("/api/generate"), vec![], &body)
            .await
        {
            Ok(bytes) => decode_stream(bytes, parse_ndjson_line, describe_stream_error),
            Err(e) => {
                tracing::warn!(error = %e, "Ollama stream request failed");
                let fragment = StreamFragment::Error(describe_stream_error(&e));
                Box::pin(stream::iter(vec![fragment]))
            }
        }
    }

    async fn chat(&self, request: ChatRequest) -> Result<String, DomainError> {
        let messages = with_system(&request.system, &request.messages);

        let body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "stream": false,
            "options": { "temperature": request.temperature },
        });

        let json = self
            .client
            .post_json(&self.url("/api/chat"), vec![], &body)
            .await
            .map_err(|e| self.explain(e))?;

        let response: ChatResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider(PROVIDER, format!("Failed to parse response: {}", e))
        })?;

        Ok(response
            .message
            .map(|m| m.content.trim().to_string())
            .unwrap_or_default())
    }

    async fn is_available(&self) -> bool {
        self.client
            .get_json(&self.url("/api/tags"), vec![])
            .await
            .is_ok()
    }

    async fn list_models(&self) -> Vec<String> {
        match self.tags().await {
            Ok(tags) => tags.models.into_iter().map(|m| m.name).collect(),
            Err(e) => {
                tracing::debug!(error = %e, "Could not list Ollama models");
                Vec::new()
            }
        }
    }

    async fn ensure_model(&self) -> Result<bool, DomainError> {
        let installed = self.list_models().await;
        if installed.iter().any(|name| name.contains(&self.model)) {
            return Ok(true);
        }

        tracing::info!(model = %self.model, "Pulling model, this may take a few minutes on first run");
        let body = serde_json::json!({ "name": self.model, "stream": false });
        match self.client.post_json(&self.url("/api/pull"), vec![], &body).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_backend_unavailable() => Err(self.explain(e)),
            Err(e) => {
                tracing::warn!(model = %self.model, error = %e, "Model pull failed");
                Ok(false)
            }
        }
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    message: Option<ChatResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Message;
    use crate::infrastructure::llm::http_client::mock::MockHttpClient;
    use crate::infrastructure::llm::http_client::HttpClient;
    use futures::StreamExt;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const BASE: &str = "http://ollama.test";

    fn provider(client: MockHttpClient) -> OllamaProvider<MockHttpClient> {
        OllamaProvider::new(client, BASE, DEFAULT_OLLAMA_MODEL)
    }

    #[tokio::test]
    async fn test_generate_trims_response() {
        let client = MockHttpClient::new().with_response(
            format!("{}/api/generate", BASE),
            serde_json::json!({"response": "  Do squats.\n", "done": true}),
        );
        let provider = provider(client);

        let text = provider
            .generate(GenerateRequest::new("legs?").with_system("coach"))
            .await
            .unwrap();
        assert_eq!(text, "Do squats.");
    }

    #[tokio::test]
    async fn test_generate_body_shape() {
        let client = MockHttpClient::new()
            .with_response(format!("{}/api/generate", BASE), serde_json::json!({"response": "ok"}));
        let provider = provider(client);

        provider
            .generate(GenerateRequest::new("hello").with_system("sys").with_max_tokens(64))
            .await
            .unwrap();

        let bodies = provider.client.bodies();
        assert_eq!(bodies.len(), 1);
        let body = &bodies[0].1;
        assert_eq!(body["model"], "llama3.2:3b");
        assert_eq!(body["prompt"], "hello");
        assert_eq!(body["system"], "sys");
        assert_eq!(body["stream"], false);
        assert_eq!(body["options"]["num_predict"], 64);
    }

    #[tokio::test]
    async fn test_generate_unreachable_gives_remediation() {
        let client = MockHttpClient::new()
            .with_unreachable(format!("{}/api/generate", BASE), "connection refused");
        let provider = provider(client);

        let err = provider.generate(GenerateRequest::new("hi")).await.unwrap_err();
        assert!(err.is_backend_unavailable());
        let text = err.to_string();
        assert!(text.contains("ollama serve"));
        assert!(text.contains("ollama pull llama3.2:3b"));
    }

    /// Serves one chunked NDJSON response, pausing `gap` between lines
    async fn spawn_slow_ndjson_server(lines: Vec<String>, gap: Duration) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();

            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request).to_lowercase();
                if let Some(end) = text.find("\r\n\r\n") {
                    let length = text
                        .lines()
                        .find_map(|l| l.strip_prefix("content-length:"))
                        .and_then(|v| v.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if request.len() >= end + 4 + length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }

            socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\ncontent-type: application/x-ndjson\r\ntransfer-encoding: chunked\r\n\r\n",
                )
                .await
                .unwrap();
            for line in lines {
                tokio::time::sleep(gap).await;
                let chunk = format!("{:x}\r\n{}\r\n", line.len(), line);
                socket.write_all(chunk.as_bytes()).await.unwrap();
                socket.flush().await.unwrap();
            }
            socket.write_all(b"0\r\n\r\n").await.unwrap();
        });

        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_slow_stream_outlives_read_timeout() {
        let mut lines: Vec<String> = (0..6)
            .map(|i| format!("{{\"response\":\"t{}\",\"done\":false}}\n", i))
            .collect();
        lines.push("{\"response\":\"\",\"done\":true}\n".to_string());
        let base = spawn_slow_ndjson_server(lines, Duration::from_millis(500)).await;

        // Whole response takes ~3.5s, longer than the 2s silence allowance.
        let client = HttpClient::with_read_timeout(Duration::from_secs(2)).unwrap();
        let provider = OllamaProvider::new(client, base, DEFAULT_OLLAMA_MODEL);

        let fragments: Vec<StreamFragment> =
            provider.stream(GenerateRequest::new("hi")).await.collect().await;

        let expected: Vec<StreamFragment> = (0..6)
            .map(|i| StreamFragment::Text(format!("t{}", i)))
            .collect();
        assert_eq!(fragments, expected);
    }

    #[tokio::test]
    async fn test_stream_yields_tokens_in_order() {
        let client = MockHttpClient::new().with_stream_response(
            format!("{}/api/generate", BASE),
            vec![
                "{\"response\":\"Great\",\"done\":false}\n{\"resp",
                "onse\":\" workout\",\"done\":false}\n",
                "{\"response\":\"!\",\"done\":false}\n{\"response\":\"\",\"done\":true}\n",
            ],
        );
        let provider = provider(client);

        let fragments: Vec<StreamFragment> =
            provider.stream(GenerateRequest::new("hi")).await.collect().await;
        let text: Vec<&str> = fragments.iter().map(|f| f.text()).collect();
        assert_eq!(text, vec!["Great", " workout", "!"]);
    }

    #[tokio::test]
    async fn test_stream_unreachable_yields_single_error() {
        let client = MockHttpClient::new()
            .with_unreachable(format!("{}/api/generate", BASE), "connection refused");
        let provider = provider(client);

        let fragments: Vec<StreamFragment> =
            provider.stream(GenerateRequest::new("hi")).await.collect().await;
        assert_eq!(fragments.len(), 1);
        assert!(matches!(&fragments[0], StreamFragment::Error(t) if t.contains("ollama serve")));
    }

    #[tokio::test]
    async fn test_chat_prepends_system_message() {
        let client = MockHttpClient::new().with_response(
            format!("{}/api/chat", BASE),
            serde_json::json!({"message": {"role": "assistant", "content": " Rest well. "}}),
        );
        let provider = provider(client);

        let request = ChatRequest::new(vec![Message::user("tired")]).with_system("coach");
        let text = provider.chat(request).await.unwrap();
        assert_eq!(text, "Rest well.");

        let body = &provider.client.bodies()[0].1;
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "tired");
    }

    #[tokio::test]
    async fn test_availability_and_models() {
        let client = MockHttpClient::new().with_response(
            format!("{}/api/tags", BASE),
            serde_json::json!({"models": [{"name": "llama3.2:3b"}, {"name": "mistral:latest"}]}),
        );
        let provider = provider(client);

        assert!(provider.is_available().await);
        assert_eq!(
            provider.list_models().await,
            vec!["llama3.2:3b".to_string(), "mistral:latest".to_string()]
        );
        assert!(provider.ensure_model().await.unwrap());
        assert!(provider.client.bodies().is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_when_tags_fail() {
        let client = MockHttpClient::new()
            .with_unreachable(format!("{}/api/tags", BASE), "connection refused");
        let provider = provider(client);

        assert!(!provider.is_available().await);
        assert!(provider.list_models().await.is_empty());
    }

    #[tokio::test]
    async fn test_ensure_model_pulls_missing_model() {
        let client = MockHttpClient::new()
            .with_response(
                format!("{}/api/tags", BASE),
                serde_json::json!({"models": [{"name": "mistral:latest"}]}),
            )
            .with_response(format!("{}/api/pull", BASE), serde_json::json!({"status": "success"}));
        let provider = provider(client);

        assert!(provider.ensure_model().await.unwrap());
        let bodies = provider.client.bodies();
        assert_eq!(bodies[0].0, format!("{}/api/pull", BASE));
        assert_eq!(bodies[0].1, serde_json::json!({"name": "llama3.2:3b", "stream": false}));
    }

    #[tokio::test]
    async fn test_streaming_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(serde_json::json!({"stream": true})))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "{\"response\":\"Zone\",\"done\":false}\nnot-json\n{\"response\":\" 2\",\"done\":false}\n{\"done\":true}\n",
            ))
            .mount(&server)
            .await;

        let provider = OllamaProvider::new(HttpClient::new(), server.uri(), "llama3.2:3b");
        let fragments: Vec<StreamFragment> =
            provider.stream(GenerateRequest::new("hr")).await.collect().await;
        let text: String = fragments.iter().map(|f| f.text()).collect();
        assert_eq!(text, "Zone 2");
    }

    #[tokio::test]
    async fn test_refused_connection_over_http() {
        let provider = OllamaProvider::new(HttpClient::new(), "http://127.0.0.1:1", "llama3.2:3b");

        let err = provider.generate(GenerateRequest::new("hi")).await.unwrap_err();
        assert!(err.is_backend_unavailable());
        assert!(err.to_string().contains("ollama serve"));
        assert!(!provider.is_available().await);
    }
}
