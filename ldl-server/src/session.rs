//! In-memory per-user conversation state.
//!
//! The store maps an opaque user identifier to a [`UserSession`] holding the
//! bounded chat history and the most recently uploaded document's text. All
//! state lives in process memory; a restart discards everything.
//!
//! Each session sits behind its own async mutex so that concurrent requests
//! for the same user serialize instead of racing on read-then-append, while
//! requests for different users proceed in parallel.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Maximum number of history entries kept per user. Once the limit is
/// reached, the single oldest entry is evicted on each append.
pub const MAX_HISTORY: usize = 5;

/// User identifier applied when the caller supplies none. All unidentified
/// callers share one conversation.
pub const DEFAULT_USER_ID: &str = "default_user";

/// Message role in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Wire representation used by the completion API.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One exchange entry: a user message or an assistant reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Conversation state for a single user.
#[derive(Debug, Default)]
pub struct UserSession {
    history: VecDeque<Message>,
    document: Option<String>,
}

impl UserSession {
    /// Append an exchange entry, evicting the oldest entry when the history
    /// would exceed [`MAX_HISTORY`].
    pub fn record_exchange(&mut self, role: Role, content: impl Into<String>) {
        self.history.push_back(Message::new(role, content));
        if self.history.len() > MAX_HISTORY {
            self.history.pop_front();
        }
    }

    /// Stored history, oldest first.
    pub fn history(&self) -> &VecDeque<Message> {
        &self.history
    }

    /// Text of the most recently uploaded document, if any.
    pub fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }

    /// Replace the stored document text. Each upload overwrites the previous
    /// one; documents are never merged.
    pub fn set_document(&mut self, text: String) {
        self.document = Some(text);
    }
}

/// Process-wide session store, shared across handlers via axum state.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Arc<Mutex<UserSession>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the session handle for a user, creating it on first reference.
    ///
    /// Callers that need the whole read-generate-record sequence to be
    /// atomic for one user hold the returned mutex across the sequence.
    pub async fn session(&self, user_id: &str) -> Arc<Mutex<UserSession>> {
        if let Some(session) = self.sessions.read().await.get(user_id) {
            return session.clone();
        }

        let mut sessions = self.sessions.write().await;
        sessions
            .entry(user_id.to_string())
            .or_default()
            .clone()
    }

    /// Append an exchange entry to a user's history.
    pub async fn record_exchange(&self, user_id: &str, role: Role, content: impl Into<String>) {
        let session = self.session(user_id).await;
        let mut session = session.lock().await;
        session.record_exchange(role, content);
    }

    /// Snapshot of a user's history, oldest first. Unknown users get an
    /// empty history and no entry is created for them.
    pub async fn history(&self, user_id: &str) -> Vec<Message> {
        match self.sessions.read().await.get(user_id) {
            Some(session) => session.lock().await.history.iter().cloned().collect(),
            None => Vec::new(),
        }
    }

    /// Store extracted document text for a user, replacing any previous one.
    pub async fn set_document(&self, user_id: &str, text: String) {
        let session = self.session(user_id).await;
        let mut session = session.lock().await;
        session.set_document(text);
    }

    /// Extracted document text for a user, if one has been uploaded. Unknown
    /// users get `None` and no entry is created for them.
    pub async fn document(&self, user_id: &str) -> Option<String> {
        match self.sessions.read().await.get(user_id) {
            Some(session) => session.lock().await.document.clone(),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_history_bounded_to_last_five_in_order() {
        let store = SessionStore::new();
        for i in 0..8 {
            store
                .record_exchange("alice", Role::User, format!("message {i}"))
                .await;
        }

        let history = store.history("alice").await;
        assert_eq!(history.len(), MAX_HISTORY);
        let contents: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(
            contents,
            ["message 3", "message 4", "message 5", "message 6", "message 7"]
        );
    }

    #[tokio::test]
    async fn test_eviction_is_single_oldest_not_batch() {
        let store = SessionStore::new();
        for i in 0..MAX_HISTORY + 1 {
            store
                .record_exchange("bob", Role::User, format!("m{i}"))
                .await;
        }
        // Exactly MAX_HISTORY entries remain, never fewer.
        assert_eq!(store.history("bob").await.len(), MAX_HISTORY);
    }

    #[tokio::test]
    async fn test_unknown_user_is_empty_and_absent() {
        let store = SessionStore::new();
        assert!(store.history("never-seen").await.is_empty());
        assert!(store.document("never-seen").await.is_none());
        // Pure reads must not create entries.
        assert!(store.sessions.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_document_replaced_not_merged() {
        let store = SessionStore::new();
        store.set_document("carol", "first document".into()).await;
        store.set_document("carol", "second document".into()).await;

        let doc = store.document("carol").await.unwrap();
        assert_eq!(doc, "second document");
        assert!(!doc.contains("first"));
    }

    #[tokio::test]
    async fn test_document_and_history_are_independent() {
        let store = SessionStore::new();
        store.set_document("dave", "notes".into()).await;
        assert!(store.history("dave").await.is_empty());

        store.record_exchange("dave", Role::User, "hi").await;
        store.record_exchange("dave", Role::Assistant, "hello").await;
        assert_eq!(store.document("dave").await.as_deref(), Some("notes"));
        assert_eq!(store.history("dave").await.len(), 2);
    }

    #[test]
    fn test_role_wire_format() {
        assert_eq!(Role::User.as_str(), "user");
        assert_eq!(Role::Assistant.as_str(), "assistant");
        assert_eq!(
            serde_json::to_string(&Role::System).unwrap(),
            r#""system""#
        );
    }
}
