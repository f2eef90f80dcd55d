use async_trait::async_trait;
use log::{ error, warn };
use redis::{ AsyncCommands, Client, RedisError };

use crate::cli::Args;
use crate::models::session::{ Message, Session };
use crate::store::{ SessionStore, StoreError };

impl From<RedisError> for StoreError {
    fn from(err: RedisError) -> Self {
        StoreError::Backend(err.to_string())
    }
}

// Sessions as JSON under {prefix}session:{id}, owner index as a set under
// {prefix}owner:{owner_id}, message log under {prefix}messages:{session_id}
// with the newest entry at the head.
pub struct RedisSessionStore {
    client: Client,
    key_prefix: String,
}

impl RedisSessionStore {
    pub fn new(args: &Args) -> Result<Self, StoreError> {
        Ok(Self {
            client: Client::open(args.store_host.as_str())?,
            key_prefix: args.store_redis_prefix.clone(),
        })
    }

    async fn get_connection(&self) -> Result<redis::aio::MultiplexedConnection, RedisError> {
        self.client.get_multiplexed_async_connection().await
    }

    fn session_key(&self, session_id: &str) -> String {
        format!("{}session:{}", self.key_prefix, session_id)
    }

    fn owner_key(&self, owner_id: &str) -> String {
        format!("{}owner:{}", self.key_prefix, owner_id)
    }

    fn messages_key(&self, session_id: &str) -> String {
        format!("{}messages:{}", self.key_prefix, session_id)
    }

    async fn write_session(&self, session: &Session) -> Result<(), StoreError> {
        let mut conn = self.get_connection().await?;
        let json = serde_json::to_string(session)?;
        let _: () = conn.set(self.session_key(&session.id), json).await?;
        Ok(())
    }

    async fn load_session(&self, session_id: &str) -> Result<Session, StoreError> {
        self.find_session(session_id).await?
            .ok_or_else(|| StoreError::NotFound(session_id.to_string()))
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn create_session(&self, session: Session) -> Result<Session, StoreError> {
        self.write_session(&session).await?;
        let mut conn = self.get_connection().await?;
        let _: i64 = conn.sadd(self.owner_key(&session.owner_id), &session.id).await?;
        Ok(session)
    }

    async fn find_session(&self, session_id: &str) -> Result<Option<Session>, StoreError> {
        let mut conn = self.get_connection().await?;
        let raw: Option<String> = conn.get(self.session_key(session_id)).await?;
        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn update_session_context(
        &self,
        session_id: &str,
        context: &str,
        updated_at: i64
    ) -> Result<(), StoreError> {
        let mut session = self.load_session(session_id).await?;
        session.context = context.to_string();
        session.updated_at = updated_at;
        self.write_session(&session).await
    }

    async fn touch_session(&self, session_id: &str, updated_at: i64) -> Result<(), StoreError> {
        let mut session = self.load_session(session_id).await?;
        session.updated_at = updated_at;
        self.write_session(&session).await
    }

    async fn deactivate_session(&self, session_id: &str) -> Result<(), StoreError> {
        let mut session = self.load_session(session_id).await?;
        session.active = false;
        self.write_session(&session).await
    }

    async fn sessions_for_owner(&self, owner_id: &str) -> Result<Vec<Session>, StoreError> {
        let mut conn = self.get_connection().await?;
        let ids: Vec<String> = conn.smembers(self.owner_key(owner_id)).await?;
        let mut sessions = Vec::new();
        for id in &ids {
            match self.find_session(id).await {
                Ok(Some(session)) if session.active => sessions.push(session),
                Ok(_) => {}
                Err(e) => warn!("Skipping unreadable session {}: {}", id, e),
            }
        }
        sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(sessions)
    }

    async fn append_message(&self, mut message: Message) -> Result<Message, StoreError> {
        let mut conn = self.get_connection().await?;
        let key = self.messages_key(&message.session_id);

        // Clamp against the newest stored entry so per-session creation
        // timestamps stay strictly increasing.
        let head: Option<String> = conn.lindex(&key, 0).await?;
        if let Some(json) = head {
            match serde_json::from_str::<Message>(&json) {
                Ok(last) => {
                    if message.created_at <= last.created_at {
                        message.created_at = last.created_at + 1;
                    }
                }
                Err(e) => error!("Error parsing log head entry: {}", e),
            }
        }

        let json = serde_json::to_string(&message)?;
        let _: i64 = conn.lpush(&key, &json).await?;
        Ok(message)
    }

    async fn recent_messages(
        &self,
        session_id: &str,
        limit: usize
    ) -> Result<Vec<Message>, StoreError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let mut conn = self.get_connection().await?;
        let key = self.messages_key(session_id);
        let json_entries: Vec<String> = conn.lrange(&key, 0, (limit as isize) - 1).await?;
        let mut messages = Vec::new();
        for json_entry in &json_entries {
            match serde_json::from_str::<Message>(json_entry) {
                Ok(msg) => messages.push(msg),
                Err(e) => error!("Error parsing log entry: {}", e),
            }
        }
        messages.reverse();
        Ok(messages)
    }

    async fn session_messages(&self, session_id: &str) -> Result<Vec<Message>, StoreError> {
        let mut conn = self.get_connection().await?;
        let key = self.messages_key(session_id);
        let json_entries: Vec<String> = conn.lrange(&key, 0, -1).await?;
        let mut messages = Vec::new();
        for json_entry in &json_entries {
            match serde_json::from_str::<Message>(json_entry) {
                Ok(msg) => messages.push(msg),
                Err(e) => error!("Error parsing log entry: {}", e),
            }
        }
        messages.reverse();
        Ok(messages)
    }
}
