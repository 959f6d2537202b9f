//! Conversation history store trait

use async_trait::async_trait;

use crate::{ConversationTurn, Result, SessionKey};

/// Trait for per-session conversation logs
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Load every turn of the session, oldest first; empty when nothing was saved yet
    async fn load(&self, session: &SessionKey) -> Result<Vec<ConversationTurn>>;

    /// Durably append a turn before returning
    async fn append(&self, session: &SessionKey, turn: ConversationTurn) -> Result<()>;

    /// Append several turns in order
    async fn append_all(&self, session: &SessionKey, turns: Vec<ConversationTurn>) -> Result<()> {
        for turn in turns {
            self.append(session, turn).await?;
        }
        Ok(())
    }
}
