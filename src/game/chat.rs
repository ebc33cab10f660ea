//! Append-only chat history for a room session.

use std::sync::Mutex;

use crate::protocol::ChatMessageEvent;

/// Thread-safe chat log. Entries persist for the session and are replayed in
/// full to rehydrating clients.
#[derive(Debug, Default)]
pub struct ChatLog {
    messages: Mutex<Vec<ChatMessageEvent>>,
}

impl ChatLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, message: ChatMessageEvent) {
        self.messages
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(message);
    }

    /// Stable snapshot copy of the full history.
    #[must_use]
    pub fn snapshot(&self) -> Vec<ChatMessageEvent> {
        self.messages
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    pub fn clear(&self) {
        self.messages
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clear();
    }
}
