//! Response formatter.
//!
//! Turns a structured tool payload plus the user's question into a
//! natural-language answer through one completion call. When the call
//! fails the raw payload is returned as pretty JSON with a visible note,
//! so the caller always gets something to show.

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::error::Result;
use crate::llm::{with_history, CompletionProvider};
use crate::models::ConversationTurn;
use crate::session::{recent, HISTORY_WINDOW};

const FORMATTER_SYSTEM_PROMPT: &str = r#"You are a friendly personal finance assistant.

Guidelines:
- Answer the user's question using ONLY the data provided.
- Present numbers clearly; use bullet points for breakdowns.
- If the data reports an error or has no results, say so plainly and suggest what the user can try instead.
- When the data comes from a web search, summarise the most relevant findings and mention their sources.
- Keep it concise. Outputs are best-effort and are not financial advice."#;

pub struct ResponseFormatter {
    llm: Arc<dyn CompletionProvider>,
}

impl ResponseFormatter {
    pub fn new(llm: Arc<dyn CompletionProvider>) -> Self {
        Self { llm }
    }

    /// Format `data`, degrading to the raw payload on completion failure.
    pub async fn format(&self, query: &str, data: &Value, history: &[ConversationTurn]) -> String {
        match self.try_format(query, data, history).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!(error = %e, "Formatter fell back to raw data");
                raw_with_note(data, &e.to_string())
            }
        }
    }

    pub async fn try_format(
        &self,
        query: &str,
        data: &Value,
        history: &[ConversationTurn],
    ) -> Result<String> {
        let payload = serde_json::to_string_pretty(data)?;
        let prompt = format!(
            "User question:\n{}\n\nData:\n```json\n{}\n```\n\nWrite the answer.",
            query, payload
        );
        let messages = with_history(
            Some(FORMATTER_SYSTEM_PROMPT),
            recent(history, HISTORY_WINDOW),
            &prompt,
        );
        self.llm.complete(&messages).await
    }
}

/// Raw payload plus a visible formatting-failure note.
pub fn raw_with_note(data: &Value, reason: &str) -> String {
    let raw = serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string());
    format!("{}\n\n(Formatting unavailable: {})", raw, reason)
}
