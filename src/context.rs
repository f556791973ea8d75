//! Context assembly: bounded prior-turn window for provider calls.
//!
//! Providers are stateless per call, so short-term conversational memory is
//! emulated by replaying the most recent interactions ahead of each new
//! prompt. The window is bounded two ways: by pair count and by a character
//! budget (oldest pairs dropped first), so a long-running session can't blow
//! past a provider's input limit.

use crate::config::ContextConfig;
use crate::error::DatabaseError;
use crate::history::HistoryStore;
use crate::llm::ChatMessage;

/// Builds role-tagged message windows from the history store.
pub struct ContextAssembler {
    config: ContextConfig,
}

impl ContextAssembler {
    pub fn new(config: ContextConfig) -> Self {
        Self { config }
    }

    /// Fetch the prior-turn window, oldest first.
    pub async fn build_context(
        &self,
        store: &HistoryStore,
    ) -> Result<Vec<(String, String)>, DatabaseError> {
        let interactions = store.recent_chronological(self.config.window_size).await?;
        Ok(interactions
            .into_iter()
            .map(|i| (i.request, i.response))
            .collect())
    }

    /// Assemble the full message list for a conversational provider call:
    /// each prior pair becomes a user turn followed by an assistant turn, in
    /// chronological order, with the new prompt appended last.
    pub async fn assemble_messages(
        &self,
        store: &HistoryStore,
        prompt: String,
    ) -> Result<Vec<ChatMessage>, DatabaseError> {
        let pairs = self.build_context(store).await?;
        Ok(self.render(pairs, prompt))
    }

    /// Pure assembly step, separated from storage for testing.
    fn render(&self, pairs: Vec<(String, String)>, prompt: String) -> Vec<ChatMessage> {
        let pairs = self.truncate_to_budget(pairs, prompt.len());

        let mut messages = Vec::with_capacity(pairs.len() * 2 + 1);
        for (request, response) in pairs {
            messages.push(ChatMessage::user(request));
            messages.push(ChatMessage::assistant(response));
        }
        messages.push(ChatMessage::user(prompt));
        messages
    }

    /// Drop oldest pairs until the window fits the character budget. The new
    /// prompt always survives, even when it alone exceeds the budget.
    fn truncate_to_budget(
        &self,
        mut pairs: Vec<(String, String)>,
        prompt_len: usize,
    ) -> Vec<(String, String)> {
        let budget = self.config.max_chars.saturating_sub(prompt_len);
        let mut total: usize = pairs.iter().map(|(q, a)| q.len() + a.len()).sum();
        let mut dropped = 0;
        while total > budget && !pairs.is_empty() {
            let (q, a) = pairs.remove(0);
            total -= q.len() + a.len();
            dropped += 1;
        }
        if dropped > 0 {
            tracing::debug!("dropped {} oldest context pairs to fit budget", dropped);
        }
        pairs
    }
}
