use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::models::session::{ Message, Session };
use crate::store::{ SessionStore, StoreError };

// Same contract as the Redis backend, without infrastructure.
#[derive(Default)]
pub struct MemorySessionStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    sessions: HashMap<String, Session>,
    messages: HashMap<String, Vec<Message>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create_session(&self, session: Session) -> Result<Session, StoreError> {
        let mut inner = self.inner.lock().await;
        inner.sessions.insert(session.id.clone(), session.clone());
        Ok(session)
    }

    async fn find_session(&self, session_id: &str) -> Result<Option<Session>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.sessions.get(session_id).cloned())
    }

    async fn update_session_context(
        &self,
        session_id: &str,
        context: &str,
        updated_at: i64
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        match inner.sessions.get_mut(session_id) {
            Some(session) => {
                session.context = context.to_string();
                session.updated_at = updated_at;
                Ok(())
            }
            None => Err(StoreError::NotFound(session_id.to_string())),
        }
    }

    async fn touch_session(&self, session_id: &str, updated_at: i64) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        match inner.sessions.get_mut(session_id) {
            Some(session) => {
                session.updated_at = updated_at;
                Ok(())
            }
            None => Err(StoreError::NotFound(session_id.to_string())),
        }
    }

    async fn deactivate_session(&self, session_id: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        match inner.sessions.get_mut(session_id) {
            Some(session) => {
                session.active = false;
                Ok(())
            }
            None => Err(StoreError::NotFound(session_id.to_string())),
        }
    }

    async fn sessions_for_owner(&self, owner_id: &str) -> Result<Vec<Session>, StoreError> {
        let inner = self.inner.lock().await;
        let mut sessions: Vec<Session> = inner.sessions
            .values()
            .filter(|s| s.active && s.owner_id == owner_id)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(sessions)
    }

    async fn append_message(&self, mut message: Message) -> Result<Message, StoreError> {
        let mut inner = self.inner.lock().await;
        let log = inner.messages.entry(message.session_id.clone()).or_default();
        if let Some(last) = log.last() {
            if message.created_at <= last.created_at {
                message.created_at = last.created_at + 1;
            }
        }
        log.push(message.clone());
        Ok(message)
    }

    async fn recent_messages(
        &self,
        session_id: &str,
        limit: usize
    ) -> Result<Vec<Message>, StoreError> {
        let inner = self.inner.lock().await;
        let log = match inner.messages.get(session_id) {
            Some(log) => log,
            None => return Ok(Vec::new()),
        };
        let start = log.len().saturating_sub(limit);
        Ok(log[start..].to_vec())
    }

    async fn session_messages(&self, session_id: &str) -> Result<Vec<Message>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.messages.get(session_id).cloned().unwrap_or_default())
    }
}
