//! Explicit session context.
//!
//! A [`Session`] owns the conversation history and the vector index once
//! it has been loaded. Callers create one per chat and pass it into the
//! router and RAG pipeline; nothing here is global.

use crate::models::ConversationTurn;
use crate::store::VectorIndex;

/// Number of trailing turns given to the language model as context.
pub const HISTORY_WINDOW: usize = 6;

#[derive(Default)]
pub struct Session {
    history: Vec<ConversationTurn>,
    pub(crate) index: Option<VectorIndex>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> &[ConversationTurn] {
        &self.history
    }

    /// The last `n` turns, oldest first.
    pub fn recent(&self, n: usize) -> &[ConversationTurn] {
        recent(&self.history, n)
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.history.push(ConversationTurn::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.history.push(ConversationTurn::assistant(content));
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    pub fn index(&self) -> Option<&VectorIndex> {
        self.index.as_ref()
    }

    pub fn set_index(&mut self, index: VectorIndex) {
        self.index = Some(index);
    }
}

/// Trailing window of a history slice.
pub fn recent(history: &[ConversationTurn], n: usize) -> &[ConversationTurn] {
    &history[history.len().saturating_sub(n)..]
}
