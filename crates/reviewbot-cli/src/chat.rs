//! Question answering pipeline: retrieve, assemble, generate, remember

use std::sync::Arc;

use reviewbot_core::{
    ConversationTurn, Error, HistoryStore, LLMProvider, Result, Retriever, SessionKey,
};
use reviewbot_rag::assemble;

/// Answers questions about the review corpus, optionally remembering the conversation
pub struct ReviewChat<R: Retriever, L: LLMProvider> {
    retriever: R,
    llm: L,
    history: Option<Arc<dyn HistoryStore>>,
    session: SessionKey,
}

impl<R: Retriever, L: LLMProvider> ReviewChat<R, L> {
    /// Create a stateless chat: every question is answered on its own
    pub fn new(retriever: R, llm: L) -> Self {
        Self {
            retriever,
            llm,
            history: None,
            session: SessionKey::default(),
        }
    }

    /// Remember the conversation of `session` in `history`
    pub fn with_history(mut self, history: Arc<dyn HistoryStore>, session: SessionKey) -> Self {
        self.history = Some(history);
        self.session = session;
        self
    }

    pub fn has_history(&self) -> bool {
        self.history.is_some()
    }

    pub fn session(&self) -> &SessionKey {
        &self.session
    }

    pub fn model_id(&self) -> &str {
        self.llm.model_id()
    }

    /// Answer one question
    ///
    /// The turn pair is appended to the history only after the model answered.
    pub async fn ask(&self, question: &str) -> Result<String> {
        let retrieved = self.retriever.retrieve(question).await?;

        let previous = match &self.history {
            Some(history) => history.load(&self.session).await?,
            None => Vec::new(),
        };

        let prompt = assemble(&previous, &retrieved, question);
        let answer = self
            .llm
            .generate(&prompt)
            .await
            .map_err(|e| match e {
                Error::Generation(_) => e,
                other => Error::Generation(other.to_string()),
            })?
            .text;

        if let Some(history) = &self.history {
            let turns = vec![
                ConversationTurn::human(question),
                ConversationTurn::ai(answer.clone()),
            ];
            if let Err(e) = history.append_all(&self.session, turns).await {
                tracing::warn!(
                    session = %self.session,
                    error = %e,
                    "could not save conversation turn"
                );
            }
        }

        Ok(answer)
    }
}
