//! File-backed conversation history, one JSON file per session

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

use reviewbot_core::{ConversationTurn, Error, HistoryStore, Result, SessionKey};

/// History store writing `naruto_chat_history_<session>.json` files into a directory
pub struct FileHistoryStore {
    dir: PathBuf,
    // Serialises read-modify-write cycles so concurrent appends cannot drop turns.
    write_lock: Mutex<()>,
}

impl FileHistoryStore {
    /// Create the store, creating `dir` if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| {
            Error::History(format!("cannot create {}: {}", dir.display(), e))
        })?;

        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    /// Path of the log file for `session`
    pub fn session_file(&self, session: &SessionKey) -> Result<PathBuf> {
        let key = session.as_str();
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(Error::History(format!("invalid session key: {:?}", key)));
        }

        Ok(self.dir.join(format!("naruto_chat_history_{}.json", key)))
    }

    async fn read_turns(path: &Path) -> Result<Vec<ConversationTurn>> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::History(format!("cannot read {}: {}", path.display(), e))),
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content)
            .map_err(|e| Error::History(format!("corrupt history {}: {}", path.display(), e)))
    }

    async fn write_turns(path: &Path, turns: &[ConversationTurn]) -> Result<()> {
        let json = serde_json::to_string_pretty(turns)?;
        let tmp = path.with_extension("json.tmp");

        fs::write(&tmp, json).await?;
        fs::rename(&tmp, path).await?;
        Ok(())
    }
}

#[async_trait]
impl HistoryStore for FileHistoryStore {
    async fn load(&self, session: &SessionKey) -> Result<Vec<ConversationTurn>> {
        let path = self.session_file(session)?;
        Self::read_turns(&path).await
    }

    async fn append(&self, session: &SessionKey, turn: ConversationTurn) -> Result<()> {
        self.append_all(session, vec![turn]).await
    }

    async fn append_all(&self, session: &SessionKey, turns: Vec<ConversationTurn>) -> Result<()> {
        let path = self.session_file(session)?;
        let _guard = self.write_lock.lock().await;

        let mut all = Self::read_turns(&path).await?;
        let added = turns.len();
        all.extend(turns);

        Self::write_turns(&path, &all)
            .await
            .map_err(|e| Error::History(format!("cannot write {}: {}", path.display(), e)))?;

        tracing::debug!(session = %session, added, total = all.len(), "history saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_load_missing_session_is_empty() {
        let dir = tempdir().unwrap();
        let store = FileHistoryStore::new(dir.path()).unwrap();

        let turns = store.load(&SessionKey::default()).await.unwrap();
        assert!(turns.is_empty());
    }

    #[tokio::test]
    async fn test_append_then_load() {
        let dir = tempdir().unwrap();
        let store = FileHistoryStore::new(dir.path()).unwrap();
        let session = SessionKey::default();

        let turn = ConversationTurn::human("Who is the best ninja?");
        store.append(&session, turn.clone()).await.unwrap();

        let turns = store.load(&session).await.unwrap();
        assert_eq!(turns.last(), Some(&turn));
        assert!(dir.path().join("naruto_chat_history_default.json").exists());
    }

    #[tokio::test]
    async fn test_history_survives_restart() {
        let dir = tempdir().unwrap();
        let session = SessionKey::default();

        {
            let store = FileHistoryStore::new(dir.path()).unwrap();
            store
                .append_all(
                    &session,
                    vec![ConversationTurn::human("q1"), ConversationTurn::ai("a1")],
                )
                .await
                .unwrap();
        }

        let store = FileHistoryStore::new(dir.path()).unwrap();
        let turn = ConversationTurn::human("q2");
        store.append(&session, turn.clone()).await.unwrap();

        let turns = store.load(&session).await.unwrap();
        let contents: Vec<&str> = turns.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["q1", "a1", "q2"]);
        assert_eq!(turns.last(), Some(&turn));
    }

    #[tokio::test]
    async fn test_sessions_do_not_share_state() {
        let dir = tempdir().unwrap();
        let store = FileHistoryStore::new(dir.path()).unwrap();

        store
            .append(&SessionKey::new("a"), ConversationTurn::human("only in a"))
            .await
            .unwrap();

        assert!(store.load(&SessionKey::new("b")).await.unwrap().is_empty());
        assert_eq!(store.load(&SessionKey::new("a")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_session_key_rejected() {
        let dir = tempdir().unwrap();
        let store = FileHistoryStore::new(dir.path()).unwrap();

        let err = store.load(&SessionKey::new("../escape")).await.unwrap_err();
        assert!(matches!(err, Error::History(_)));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported() {
        let dir = tempdir().unwrap();
        let store = FileHistoryStore::new(dir.path()).unwrap();
        std::fs::write(dir.path().join("naruto_chat_history_default.json"), "{not json").unwrap();

        let err = store.load(&SessionKey::default()).await.unwrap_err();
        assert!(matches!(err, Error::History(_)));
    }
}
