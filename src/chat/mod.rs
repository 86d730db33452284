//! Chat session — append-only transcript plus running token totals.
//!
//! The session owns the conversation state; the provider is stateless. Every
//! call to [`ChatSession::send`] resends the full transcript (no truncation
//! or windowing), appends the reply, and accumulates the reported usage.

use tracing::{debug, info};

use crate::llm::{LlmProvider, ProviderError};

// ── Messages ─────────────────────────────────────────────────────────────────

/// Message author, in OpenAI role terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One transcript entry.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

// ── Session ──────────────────────────────────────────────────────────────────

/// Result of one successful turn.
#[derive(Debug, Clone)]
pub struct Turn {
    pub reply: String,
    /// Total tokens reported for this call (0 when the backend omits usage).
    pub turn_tokens: u64,
    /// Running total across the whole session.
    pub total_tokens: u64,
}

/// A single conversation: transcript, provider handle, token accounting.
pub struct ChatSession {
    provider: LlmProvider,
    transcript: Vec<ChatMessage>,
    total_tokens: u64,
}

impl ChatSession {
    /// Start a session seeded with the system prompt.
    pub fn new(provider: LlmProvider, system_prompt: &str) -> Self {
        Self {
            provider,
            transcript: vec![ChatMessage::system(system_prompt)],
            total_tokens: 0,
        }
    }

    /// Send one user message and return the assistant reply with totals.
    ///
    /// On provider failure the user message is rolled back so the transcript
    /// never holds a user turn with no reply. The error propagates — there is
    /// no retry here.
    pub async fn send(&mut self, user_input: &str) -> Result<Turn, ProviderError> {
        self.transcript.push(ChatMessage::user(user_input));

        let response = match self.provider.complete(&self.transcript).await {
            Ok(r) => r,
            Err(e) => {
                self.transcript.pop();
                return Err(e);
            }
        };

        self.transcript.push(ChatMessage::assistant(&response.text));

        let turn_tokens = response.usage.map(|u| u.total_tokens).unwrap_or(0);
        self.total_tokens += turn_tokens;
        debug!(turn_tokens, total_tokens = self.total_tokens, "turn complete");

        Ok(Turn {
            reply: response.text,
            turn_tokens,
            total_tokens: self.total_tokens,
        })
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn total_tokens(&self) -> u64 {
        self.total_tokens
    }

    /// Log the final total on the way out.
    pub fn finish(self) -> u64 {
        info!(total_tokens = self.total_tokens, "session ended");
        self.total_tokens
    }
}

/// True iff the input is the exit command ("quit", case/whitespace-insensitive).
pub fn is_quit(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case("quit")
}
