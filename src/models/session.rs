use chrono::Utc;
use serde::{ Serialize, Deserialize };
use uuid::Uuid;

pub const ROLE_USER: &str = "user";
pub const ROLE_ASSISTANT: &str = "assistant";
pub const ROLE_SYSTEM: &str = "system";

// context is a free-form blob owned by the memory layer. Sessions are
// soft-deleted by clearing active, never removed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub title: String,
    pub context: String,
    pub active: bool,
    pub owner_id: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Session {
    pub fn new(owner_id: &str, title: &str, context: &str) -> Self {
        let now = Utc::now().timestamp_millis();
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            context: context.to_string(),
            active: true,
            owner_id: owner_id.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

// metadata is serialized JSON; for assistant messages it records which
// provider (or the offline generator) and which persona produced the reply.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub session_id: String,
    pub owner_id: String,
    pub role: String,
    pub content: String,
    pub metadata: String,
    pub created_at: i64,
}

impl Message {
    pub fn new(session_id: &str, owner_id: &str, role: &str, content: &str, metadata: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            owner_id: owner_id.to_string(),
            role: role.to_string(),
            content: content.to_string(),
            metadata: metadata.to_string(),
            created_at: Utc::now().timestamp_millis(),
        }
    }
}
