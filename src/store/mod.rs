mod memory;
mod redis;

pub use self::memory::MemorySessionStore;
pub use self::redis::RedisSessionStore;

use async_trait::async_trait;
use log::info;
use std::sync::Arc;
use thiserror::Error;

use crate::cli::Args;
use crate::models::session::{ Message, Session };

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(String),

    #[error("stored record serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("session not found: {0}")]
    NotFound(String),

    #[error("unsupported session store type: {0}")]
    UnsupportedType(String),
}

// Sessions soft-delete; messages are append-only.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create_session(&self, session: Session) -> Result<Session, StoreError>;

    async fn find_session(&self, session_id: &str) -> Result<Option<Session>, StoreError>;

    async fn update_session_context(
        &self,
        session_id: &str,
        context: &str,
        updated_at: i64
    ) -> Result<(), StoreError>;

    async fn touch_session(&self, session_id: &str, updated_at: i64) -> Result<(), StoreError>;

    async fn deactivate_session(&self, session_id: &str) -> Result<(), StoreError>;

    // Active sessions only, most recently updated first.
    async fn sessions_for_owner(&self, owner_id: &str) -> Result<Vec<Session>, StoreError>;

    // Clamps the stored timestamp strictly above the session's last entry.
    async fn append_message(&self, message: Message) -> Result<Message, StoreError>;

    // The most recent `limit` entries, oldest first.
    async fn recent_messages(
        &self,
        session_id: &str,
        limit: usize
    ) -> Result<Vec<Message>, StoreError>;

    // Full log, oldest first; still readable after a soft delete.
    async fn session_messages(&self, session_id: &str) -> Result<Vec<Message>, StoreError>;
}

pub fn create_session_store(args: &Args) -> Result<Arc<dyn SessionStore>, StoreError> {
    match args.store_type.to_lowercase().as_str() {
        "redis" => {
            let store = RedisSessionStore::new(args)?;
            Ok(Arc::new(store))
        }
        "memory" => Ok(Arc::new(MemorySessionStore::new())),
        other => Err(StoreError::UnsupportedType(other.to_string())),
    }
}

pub fn initialize_session_store(args: &Args) -> Result<Arc<dyn SessionStore>, StoreError> {
    info!("Sessions will be stored in: {} at {}", args.store_type, args.store_host);
    create_session_store(args)
}
