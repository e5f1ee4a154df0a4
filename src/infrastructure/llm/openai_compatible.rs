use async_trait::async_trait;
use futures::stream;
use serde::Deserialize;

use super::framing::{decode_stream, parse_sse_line};
use super::http_client::HttpClientTrait;
use crate::domain::llm::with_system;
use crate::domain::{
    ChatRequest, DomainError, GenerateRequest, LlmProvider, LlmStream, Message, StreamFragment,
};

pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Hosted chat-completions provider (Groq, OpenAI)
#[derive(Debug)]
pub struct OpenAiCompatibleProvider<C: HttpClientTrait> {
    client: C,
    name: &'static str,
    api_key: String,
    auth_header: String,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl<C: HttpClientTrait> OpenAiCompatibleProvider<C> {
    pub fn new(
        client: C,
        name: &'static str,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        let api_key = api_key.into();
        let auth_header = format!("Bearer {}", api_key);
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            name,
            api_key,
            auth_header,
            base_url,
            model: model.into(),
            max_tokens: crate::domain::llm::DEFAULT_MAX_TOKENS,
        }
    }

    pub fn groq(client: C, api_key: impl Into<String>) -> Self {
        Self::new(client, "groq", api_key, DEFAULT_GROQ_BASE_URL, DEFAULT_GROQ_MODEL)
    }

    pub fn openai(client: C, api_key: impl Into<String>) -> Self {
        Self::new(client, "openai", api_key, DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL)
    }

    /// Completion budget for `chat`, which carries no per-request limit
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    fn build_request(
        &self,
        messages: &[Message],
        temperature: f32,
        max_tokens: u32,
        stream: bool,
    ) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "temperature": temperature,
            "max_tokens": max_tokens,
        });

        if stream {
            body["stream"] = serde_json::json!(true);
        }

        body
    }

    fn prompt_messages(request: &GenerateRequest) -> Vec<Message> {
        with_system(&request.system, &[Message::user(request.prompt.clone())])
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<String, DomainError> {
        let response: CompletionResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider(self.name, format!("Failed to parse response: {}", e))
        })?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::provider(self.name, "No choices in response"))?;

        Ok(choice
            .message
            .content
            .unwrap_or_default()
            .trim()
            .to_string())
    }

    async fn complete(&self, body: serde_json::Value) -> Result<String, DomainError> {
        let json = self
            .client
            .post_json(&self.chat_completions_url(), self.headers(), &body)
            .await?;
        self.parse_response(json)
    }
}

fn describe_stream_error(error: &DomainError) -> String {
    format!("[Error] {}", error)
}

#[async_trait]
impl<C: HttpClientTrait + 'static> LlmProvider for OpenAiCompatibleProvider<C> {
    async fn generate(&self, request: GenerateRequest) -> Result<String, DomainError> {
        let messages = Self::prompt_messages(&request);
        let body = self.build_request(&messages, request.temperature, request.max_tokens, false);
        self.complete(body).await
    }

    async fn stream(&self, request: GenerateRequest) -> LlmStream {
        let messages = Self::prompt_messages(&request);
        let body = self.build_request(&messages, request.temperature, request.max_tokens, true);

        match self
            .client
            .post_json_stream(&self.chat_completions_url(), self.headers(), &body)
            .await
        {
            Ok(bytes) => decode_stream(bytes, parse_sse_line, describe_stream_error),
            Err(e) => {
                tracing::warn!(provider = self.name, error = %e, "Stream request failed");
                Box::pin(stream::iter(vec![StreamFragment::Error(
                    describe_stream_error(&e),
                )]))
            }
        }
    }

    async fn chat(&self, request: ChatRequest) -> Result<String, DomainError> {
        let messages = with_system(&request.system, &request.messages);
        let body = self.build_request(&messages, request.temperature, self.max_tokens, false);
        self.complete(body).await
    }

    async fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn list_models(&self) -> Vec<String> {
        vec![self.model.clone()]
    }

    async fn ensure_model(&self) -> Result<bool, DomainError> {
        Ok(true)
    }

    fn provider_name(&self) -> &'static str {
        self.name
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::llm::http_client::mock::MockHttpClient;
    use crate::infrastructure::llm::http_client::HttpClient;
    use futures::StreamExt;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn completion(content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-1",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }]
        })
    }

    #[tokio::test]
    async fn test_groq_generate() {
        let client = MockHttpClient::new().with_response(
            "https://api.groq.com/openai/v1/chat/completions",
            completion("  Try intervals.  "),
        );
        let provider = OpenAiCompatibleProvider::groq(client, "gsk-test");

        let text = provider
            .generate(GenerateRequest::new("cardio?").with_system("coach"))
            .await
            .unwrap();
        assert_eq!(text, "Try intervals.");
        assert_eq!(provider.provider_name(), "groq");
        assert_eq!(provider.model(), "llama-3.1-8b-instant");

        let body = &provider.client.bodies()[0].1;
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "cardio?");
        assert_eq!(body["max_tokens"], 1024);
        assert!(body.get("stream").is_none());
    }

    #[tokio::test]
    async fn test_generate_without_system_prompt() {
        let client = MockHttpClient::new()
            .with_response("https://api.openai.com/v1/chat/completions", completion("ok"));
        let provider = OpenAiCompatibleProvider::openai(client, "sk-test");

        provider.generate(GenerateRequest::new("hi")).await.unwrap();
        let body = &provider.client.bodies()[0].1;
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["model"], "gpt-4o-mini");
    }

    #[tokio::test]
    async fn test_empty_choices_is_provider_error() {
        let client = MockHttpClient::new().with_response(
            "https://api.openai.com/v1/chat/completions",
            serde_json::json!({"choices": []}),
        );
        let provider = OpenAiCompatibleProvider::openai(client, "sk-test");

        let err = provider.generate(GenerateRequest::new("hi")).await.unwrap_err();
        assert!(matches!(err, DomainError::Provider { .. }));
    }

    #[tokio::test]
    async fn test_stream_parses_deltas_until_done() {
        let client = MockHttpClient::new().with_stream_response(
            "https://api.groq.com/openai/v1/chat/completions",
            vec![
                "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n",
                "data: {\"choices\":[{\"delta\":{\"content\":\"Great\"}}]}\n\ndata: {\"choi",
                "ces\":[{\"delta\":{\"content\":\" workout\"}}]}\n\n",
                "data: garbage\n\ndata: {\"choices\":[{\"delta\":{\"content\":\"!\"}}]}\n\n",
                "data: [DONE]\n\ndata: {\"choices\":[{\"delta\":{\"content\":\"extra\"}}]}\n\n",
            ],
        );
        let provider = OpenAiCompatibleProvider::groq(client, "gsk-test");

        let fragments: Vec<StreamFragment> =
            provider.stream(GenerateRequest::new("hi")).await.collect().await;
        let text: Vec<&str> = fragments.iter().map(|f| f.text()).collect();
        assert_eq!(text, vec!["Great", " workout", "!"]);
        assert_eq!(provider.client.bodies()[0].1["stream"], true);
    }

    #[tokio::test]
    async fn test_stream_failure_yields_error_fragment() {
        let client = MockHttpClient::new().with_unreachable(
            "https://api.groq.com/openai/v1/chat/completions",
            "dns error",
        );
        let provider = OpenAiCompatibleProvider::groq(client, "gsk-test");

        let fragments: Vec<StreamFragment> =
            provider.stream(GenerateRequest::new("hi")).await.collect().await;
        assert_eq!(fragments, vec![StreamFragment::Error("[Error] dns error".to_string())]);
    }

    #[tokio::test]
    async fn test_availability_follows_credential() {
        let with_key = OpenAiCompatibleProvider::groq(MockHttpClient::new(), "gsk-test");
        let without_key = OpenAiCompatibleProvider::openai(MockHttpClient::new(), "");

        assert!(with_key.is_available().await);
        assert!(!without_key.is_available().await);
        assert_eq!(with_key.list_models().await, vec!["llama-3.1-8b-instant".to_string()]);
        assert!(without_key.ensure_model().await.unwrap());
    }

    #[tokio::test]
    async fn test_chat_over_http_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("Hydrate.")))
            .mount(&server)
            .await;

        let provider = OpenAiCompatibleProvider::new(
            HttpClient::new(),
            "openai",
            "sk-test",
            format!("{}/v1/", server.uri()),
            "gpt-4o-mini",
        );
        let request = ChatRequest::new(vec![Message::user("water?")]);
        assert_eq!(provider.chat(request).await.unwrap(), "Hydrate.");
    }

    #[tokio::test]
    async fn test_http_error_status_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid key"))
            .mount(&server)
            .await;

        let provider =
            OpenAiCompatibleProvider::new(HttpClient::new(), "groq", "bad", server.uri(), "m");
        let err = provider.generate(GenerateRequest::new("hi")).await.unwrap_err();
        assert!(!err.is_backend_unavailable());
        assert!(err.to_string().contains("401"));
    }
}
