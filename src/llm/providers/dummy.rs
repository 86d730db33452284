//! Dummy LLM provider — echoes the last user message back prefixed with
//! `[echo]`. Used for testing the full chat round-trip without a real API
//! key. Usage numbers are synthesised (one token per whitespace-separated
//! word) so token accounting is exercised deterministically offline.

use crate::chat::{ChatMessage, Role};
use crate::llm::{LlmResponse, LlmUsage, ProviderError};

#[derive(Debug, Clone)]
pub struct DummyProvider;

impl DummyProvider {
    pub async fn complete(&self, transcript: &[ChatMessage]) -> Result<LlmResponse, ProviderError> {
        let last_user = transcript
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or("");

        let text = format!("[echo] {last_user}");
        let prompt_tokens: u64 = transcript
            .iter()
            .map(|m| m.content.split_whitespace().count() as u64)
            .sum();
        let completion_tokens = text.split_whitespace().count() as u64;

        Ok(LlmResponse {
            text,
            usage: Some(LlmUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript(user: &str) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system("be brief"),
            ChatMessage::user(user),
        ]
    }

    #[tokio::test]
    async fn complete_prefixes_echo() {
        let p = DummyProvider;
        let resp = p.complete(&transcript("hello")).await.unwrap();
        assert_eq!(resp.text, "[echo] hello");
    }

    #[tokio::test]
    async fn complete_echoes_last_user_message() {
        let p = DummyProvider;
        let mut t = transcript("first");
        t.push(ChatMessage::assistant("[echo] first"));
        t.push(ChatMessage::user("second"));
        let resp = p.complete(&t).await.unwrap();
        assert_eq!(resp.text, "[echo] second");
    }

    #[tokio::test]
    async fn usage_counts_words() {
        let p = DummyProvider;
        let resp = p.complete(&transcript("two words")).await.unwrap();
        let usage = resp.usage.unwrap();
        // "be brief" + "two words" = 4 prompt tokens; "[echo] two words" = 3.
        assert_eq!(usage.prompt_tokens, 4);
        assert_eq!(usage.completion_tokens, 3);
        assert_eq!(usage.total_tokens, 7);
    }
}
