//! In-memory login sessions keyed by an opaque token, with one-shot flash messages.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "admin";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Message {
    pub kind: String,
    pub text: String,
}

#[derive(Debug, Default)]
pub struct Session {
    pub username: String,
    messages: Vec<Message>,
}

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        SessionStore::default()
    }

    // A poisoned lock still holds a usable map.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Session>> {
        self.sessions.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Session>> {
        self.sessions.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Start a session and return its token.
    pub fn create(&self, username: &str) -> String {
        let token = uuid::Uuid::new_v4().to_string();
        self.write().insert(
            token.clone(),
            Session {
                username: username.to_string(),
                messages: Vec::new(),
            },
        );
        tracing::info!(username = %username, "session started");
        token
    }

    pub fn contains(&self, token: &str) -> bool {
        self.read().contains_key(token)
    }

    pub fn username(&self, token: &str) -> Option<String> {
        self.read().get(token).map(|s| s.username.clone())
    }

    /// End a session. Returns false when the token was unknown.
    pub fn remove(&self, token: &str) -> bool {
        self.write().remove(token).is_some()
    }

    /// Queue a flash message. Returns false when the token was unknown.
    pub fn add_message(&self, token: &str, kind: &str, text: impl Into<String>) -> bool {
        match self.write().get_mut(token) {
            Some(session) => {
                session.messages.push(Message {
                    kind: kind.to_string(),
                    text: text.into(),
                });
                true
            }
            None => false,
        }
    }

    /// Drain queued flash messages, oldest first.
    pub fn take_messages(&self, token: &str) -> Vec<Message> {
        self.write()
            .get_mut(token)
            .map(|s| std::mem::take(&mut s.messages))
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_unique_and_removable() {
        let store = SessionStore::new();
        let a = store.create("admin");
        let b = store.create("admin");
        assert_ne!(a, b);
        assert!(store.contains(&a));
        assert!(store.remove(&a));
        assert!(!store.contains(&a));
        assert!(!store.remove(&a));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn messages_are_drained_once() {
        let store = SessionStore::new();
        let token = store.create("admin");
        assert!(store.add_message(&token, "success", "Person has been saved."));
        assert!(store.add_message(&token, "info", "second"));
        let messages = store.take_messages(&token);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].text, "Person has been saved.");
        assert!(store.take_messages(&token).is_empty());
        assert!(!store.add_message("missing", "success", "x"));
    }
}
