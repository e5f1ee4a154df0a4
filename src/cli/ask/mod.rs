//! Ask command - one streamed chat turn in the terminal

use std::io::Write;

use clap::Args;
use futures::StreamExt;

use crate::domain::ChatEvent;
use crate::infrastructure::services::ChatEventStream;

#[derive(Args, Debug)]
pub struct AskArgs {
    /// The question to ask
    pub message: String,

    #[arg(long, default_value = "cli")]
    pub session_id: String,
}

pub async fn run(args: AskArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let engine = crate::create_chat_engine(&config).await?;

    let events = engine.stream_chat(&args.message, &args.session_id).await;
    let mut stdout = std::io::stdout();
    write_events(events, &mut stdout).await?;

    Ok(())
}

/// Print tokens as they arrive; the summary goes to stderr
async fn write_events(mut events: ChatEventStream, out: &mut impl Write) -> std::io::Result<()> {
    while let Some(event) = events.next().await {
        match event {
            ChatEvent::Token(text) | ChatEvent::Error(text) => {
                out.write_all(text.as_bytes())?;
                out.flush()?;
            }
            ChatEvent::Done(summary) => {
                writeln!(out)?;
                eprintln!(
                    "({} via {}, {:.1} ms)",
                    summary.model, summary.provider, summary.inference_ms
                );
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::llm::MockLlmProvider;
    use crate::infrastructure::services::ChatEngine;

    #[tokio::test]
    async fn test_tokens_are_written_in_order() {
        let provider = MockLlmProvider::new("mock").with_tokens(["Great", " workout", "!"]);
        let engine = ChatEngine::new(Arc::new(provider), None);

        let events = engine.stream_chat("Motivate me", "cli").await;
        let mut out = Vec::new();
        write_events(events, &mut out).await.unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "Great workout!\n");
    }

    #[tokio::test]
    async fn test_backend_error_is_printed() {
        let provider = MockLlmProvider::new("mock").unavailable("[Error] Ollama is not running");
        let engine = ChatEngine::new(Arc::new(provider), None);

        let events = engine.stream_chat("hi", "cli").await;
        let mut out = Vec::new();
        write_events(events, &mut out).await.unwrap();

        assert!(String::from_utf8(out).unwrap().starts_with("[Error] Ollama is not running"));
    }
}
