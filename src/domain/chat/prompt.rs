//! Prompt assembly for retrieval-augmented turns

use crate::domain::knowledge_base::SearchResult;
use crate::domain::llm::{Message, MessageRole};

pub const ASSISTANT_NAME: &str = "FitFlex AI";

pub const SYSTEM_PROMPT: &str = "\
You are **FitFlex AI**, an expert fitness and gym management assistant powered by real gym data.

Your capabilities:
- Personalized workout recommendations based on actual member demographics and performance data
- Calorie burn predictions grounded in real exercise data
- Progress analysis using body performance benchmarks
- Attendance and churn risk insights from membership patterns
- Nutrition and recovery advice backed by sports science

Guidelines:
- Always be encouraging, data-driven, and specific
- When you reference statistics, mention they come from gym data
- Give actionable advice with numbers (sets, reps, durations, calories)
- If asked about a specific member, use the data context provided
- For medical concerns, recommend consulting a healthcare professional
- Keep responses concise but thorough, aiming for 2-4 paragraphs
- Use formatting (bold, bullets) for readability
";

const CONTEXT_OPEN: &str = "━━━ GYM DATA CONTEXT ━━━";
const CONTEXT_CLOSE: &str = "━━━ END CONTEXT ━━━\n";
const HISTORY_OPEN: &str = "━━━ CONVERSATION HISTORY ━━━";
const HISTORY_CLOSE: &str = "━━━ END HISTORY ━━━\n";
const INSTRUCTION_SUFFIX: &str = "\nRespond helpfully based on the gym data context above:";

pub const SUGGESTIONS: [&str; 8] = [
    "What workout should a beginner do on their first day?",
    "How many calories does a typical HIIT session burn?",
    "What's the average member profile at this gym?",
    "Which members are at risk of leaving the gym?",
    "Give me a 4-week workout plan for muscle building",
    "How does heart rate affect calorie burn?",
    "What are the top performance benchmarks in this gym?",
    "Compare yoga vs strength training for weight loss",
];

/// Render retrieved documents as `[category] text` paragraphs
pub fn format_context(results: &[SearchResult]) -> String {
    results
        .iter()
        .map(|r| format!("[{}] {}", r.category(), r.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Assemble the full prompt: context block, history block, then the message.
///
/// Empty blocks are omitted. At most `max_history` history entries are shown.
pub fn build_prompt(
    message: &str,
    context: &str,
    history: &[Message],
    max_history: usize,
) -> String {
    let mut parts: Vec<String> = Vec::new();

    if !context.is_empty() {
        parts.push(CONTEXT_OPEN.to_string());
        parts.push(context.to_string());
        parts.push(CONTEXT_CLOSE.to_string());
    }

    if !history.is_empty() {
        parts.push(HISTORY_OPEN.to_string());
        let start = history.len().saturating_sub(max_history);
        for msg in &history[start..] {
            let speaker = match msg.role {
                MessageRole::User => "User",
                _ => ASSISTANT_NAME,
            };
            parts.push(format!("{}: {}", speaker, msg.content_text()));
        }
        parts.push(HISTORY_CLOSE.to_string());
    }

    parts.push(format!("User: {}", message));
    parts.push(INSTRUCTION_SUFFIX.to_string());
    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::knowledge_base::Document;

    #[test]
    fn test_prompt_without_context_or_history() {
        let prompt = build_prompt("Hi", "", &[], 10);
        assert!(!prompt.contains(CONTEXT_OPEN));
        assert!(!prompt.contains(HISTORY_OPEN));
        assert!(prompt.starts_with("User: Hi"));
        assert!(prompt.ends_with(INSTRUCTION_SUFFIX.trim_start()));
    }

    #[test]
    fn test_prompt_block_order() {
        let history = vec![Message::user("q1"), Message::assistant("a1")];
        let prompt = build_prompt("q2", "[calories] avg 450 kcal", &history, 10);

        let context_at = prompt.find(CONTEXT_OPEN).unwrap();
        let history_at = prompt.find(HISTORY_OPEN).unwrap();
        let message_at = prompt.find("User: q2").unwrap();
        assert!(context_at < history_at && history_at < message_at);
        assert!(prompt.contains("FitFlex AI: a1"));
    }

    #[test]
    fn test_prompt_caps_history_entries() {
        let history: Vec<Message> = (0..6)
            .flat_map(|i| [Message::user(format!("q{}", i)), Message::assistant(format!("a{}", i))])
            .collect();
        let prompt = build_prompt("next", "", &history, 4);
        assert!(!prompt.contains("User: q3\n"));
        assert!(prompt.contains("User: q4"));
        assert!(prompt.contains("FitFlex AI: a5"));
    }

    #[test]
    fn test_format_context() {
        let a = Document::new("avg 450 kcal", "calories", "overview");
        let b = Document::new("HIIT burns fat", "fitness_knowledge", "knowledge_0");
        let context = format_context(&[SearchResult::new(&a, 0.5), SearchResult::new(&b, 0.3)]);
        assert_eq!(context, "[calories] avg 450 kcal\n\n[fitness_knowledge] HIIT burns fat");
    }
}
