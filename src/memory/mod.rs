pub mod topics;

use chrono::Utc;
use log::warn;
use serde::{ Deserialize, Serialize };
use std::collections::HashMap;
use std::sync::Arc;

use crate::models::chat::ChatMessage;
use crate::store::SessionStore;

pub const TRIMMED_HISTORY_CAP: usize = 15;

// Every field defaults so partially written blobs still parse.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ConversationMemory {
    #[serde(default)]
    pub preferences: HashMap<String, String>,
    #[serde(default)]
    pub mentioned_topics: Vec<String>,
    #[serde(default)]
    pub user_goals: Vec<String>,
    #[serde(default)]
    pub trimmed_history: Vec<ChatMessage>,
    #[serde(default)]
    pub personality_insights: HashMap<String, String>,
    #[serde(default)]
    pub last_updated: i64,
}

impl ConversationMemory {
    pub fn record_turn(&mut self, role: &str, content: &str, timestamp: i64) {
        self.trimmed_history.push(ChatMessage {
            role: role.to_string(),
            content: content.to_string(),
            timestamp,
        });
        if self.trimmed_history.len() > TRIMMED_HISTORY_CAP {
            let excess = self.trimmed_history.len() - TRIMMED_HISTORY_CAP;
            self.trimmed_history.drain(..excess);
        }
    }

    pub fn note_topics(&mut self, topics: impl IntoIterator<Item = String>) {
        for topic in topics {
            if !self.mentioned_topics.contains(&topic) {
                self.mentioned_topics.push(topic);
            }
        }
    }

    pub fn note_goal(&mut self, goal: String) {
        if !goal.is_empty() && !self.user_goals.contains(&goal) {
            self.user_goals.push(goal);
        }
    }

    pub fn note_persona(&mut self, persona_key: &str) {
        self.personality_insights
            .insert("last_persona".to_string(), persona_key.to_string());
        let counter_key = format!("{}_selections", persona_key);
        let count = self.personality_insights
            .get(&counter_key)
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(0);
        self.personality_insights.insert(counter_key, (count + 1).to_string());
    }
}

// Phrases that introduce a user-stated goal; the clause up to the next
// punctuation break is captured.
static GOAL_MARKERS: &[&str] = &["my goal", "i want to", "i plan to", "i hope to", "i aim to"];

pub fn extract_goals(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut goals = Vec::new();
    for marker in GOAL_MARKERS {
        if let Some(pos) = lowered.find(marker) {
            let rest = &lowered[pos + marker.len()..];
            let mut clause = rest
                .split(['.', '!', '?', ',', ';'])
                .next()
                .unwrap_or("")
                .trim_matches(|c: char| c.is_whitespace() || c == ':' || c == '-');
            // "my goal" also matches "my goals are ..."; drop the leftover
            // plural and linking verb.
            for filler in ["s", "is", "are"] {
                if clause == filler {
                    clause = "";
                } else if let Some(stripped) = clause.strip_prefix(filler) {
                    if stripped.starts_with(' ') {
                        clause = stripped.trim_start();
                    }
                }
            }
            if !clause.is_empty() && !goals.contains(&clause.to_string()) {
                goals.push(clause.to_string());
            }
        }
    }
    goals
}

// (phrase, preference key, preference value)
static PREFERENCE_RULES: &[(&str, &str, &str)] = &[
    ("keep it short", "response_style", "concise"),
    ("be brief", "response_style", "concise"),
    ("short answer", "response_style", "concise"),
    ("in detail", "response_style", "detailed"),
    ("step by step", "response_style", "detailed"),
    ("with examples", "examples", "preferred"),
    ("an example", "examples", "preferred"),
];

pub fn detect_preferences(text: &str) -> Vec<(&'static str, &'static str)> {
    let lowered = text.to_lowercase();
    let mut detected = Vec::new();
    for (phrase, key, value) in PREFERENCE_RULES {
        if lowered.contains(phrase) && !detected.iter().any(|(k, _)| k == key) {
            detected.push((*key, *value));
        }
    }
    detected
}

// Serialization of memory happens only at this boundary.
pub struct MemoryStore {
    sessions: Arc<dyn SessionStore>,
}

impl MemoryStore {
    pub fn new(sessions: Arc<dyn SessionStore>) -> Self {
        Self { sessions }
    }

    // Absent, unreadable, or corrupt memory all degrade to empty.
    pub async fn load(&self, session_id: &str) -> ConversationMemory {
        let session = match self.sessions.find_session(session_id).await {
            Ok(Some(session)) => session,
            Ok(None) => return ConversationMemory::default(),
            Err(e) => {
                warn!("Memory load for session {} failed: {}", session_id, e);
                return ConversationMemory::default();
            }
        };
        if session.context.trim().is_empty() {
            return ConversationMemory::default();
        }
        match serde_json::from_str(&session.context) {
            Ok(memory) => memory,
            Err(e) => {
                warn!("Malformed memory for session {}, starting fresh: {}", session_id, e);
                ConversationMemory::default()
            }
        }
    }

    // Best effort; a failed save never blocks message delivery.
    pub async fn save(&self, session_id: &str, memory: &mut ConversationMemory) {
        memory.last_updated = Utc::now().timestamp_millis();
        let blob = match serde_json::to_string(memory) {
            Ok(blob) => blob,
            Err(e) => {
                warn!("Memory serialization for session {} failed: {}", session_id, e);
                return;
            }
        };
        if let Err(e) = self.sessions
            .update_session_context(session_id, &blob, memory.last_updated).await
        {
            warn!("Memory save for session {} failed: {}", session_id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::session::Session;
    use crate::store::MemorySessionStore;

    #[test]
    fn trimmed_history_never_exceeds_cap() {
        let mut memory = ConversationMemory::default();
        for i in 0..40 {
            memory.record_turn("user", &format!("turn {}", i), i as i64);
        }
        assert_eq!(memory.trimmed_history.len(), TRIMMED_HISTORY_CAP);
        // Oldest entries dropped first; the most recent survive in order.
        assert_eq!(memory.trimmed_history[0].content, "turn 25");
        assert_eq!(memory.trimmed_history[TRIMMED_HISTORY_CAP - 1].content, "turn 39");
        for pair in memory.trimmed_history.windows(2) {
            assert!(pair[0].timestamp < pair[1].timestamp);
        }
    }

    #[test]
    fn topics_are_deduplicated() {
        let mut memory = ConversationMemory::default();
        memory.note_topics(vec!["career".to_string(), "salary".to_string()]);
        memory.note_topics(vec!["career".to_string()]);
        assert_eq!(memory.mentioned_topics, vec!["career", "salary"]);
    }

    #[test]
    fn goal_markers_capture_the_trailing_clause() {
        let goals = extract_goals("My goal is to become a data engineer, eventually.");
        assert_eq!(goals, vec!["to become a data engineer"]);

        let goals = extract_goals("I want to switch into product management! Can you help?");
        assert_eq!(goals, vec!["switch into product management"]);

        assert!(extract_goals("nothing stated here").is_empty());
    }

    #[test]
    fn goal_markers_match_without_a_linking_verb() {
        let goals = extract_goals("My goal: land a PM role");
        assert_eq!(goals, vec!["land a pm role"]);

        let goals = extract_goals("My goals are to break into fintech.");
        assert_eq!(goals, vec!["to break into fintech"]);

        // A marker with nothing after it yields no goal.
        assert!(extract_goals("My goal is.").is_empty());
    }

    #[test]
    fn preference_phrases_map_to_keys() {
        let prefs = detect_preferences("Please keep it short.");
        assert_eq!(prefs, vec![("response_style", "concise")]);

        let prefs = detect_preferences("Walk me through it step by step with examples");
        assert!(prefs.contains(&("response_style", "detailed")));
        assert!(prefs.contains(&("examples", "preferred")));
    }

    #[test]
    fn persona_insights_track_counts() {
        let mut memory = ConversationMemory::default();
        memory.note_persona("coach");
        memory.note_persona("coach");
        memory.note_persona("expert");
        assert_eq!(memory.personality_insights.get("last_persona").map(String::as_str), Some("expert"));
        assert_eq!(memory.personality_insights.get("coach_selections").map(String::as_str), Some("2"));
        assert_eq!(memory.personality_insights.get("expert_selections").map(String::as_str), Some("1"));
    }

    #[test]
    fn partial_blobs_still_parse() {
        let memory: ConversationMemory =
            serde_json::from_str(r#"{"mentioned_topics":["career"]}"#).unwrap();
        assert_eq!(memory.mentioned_topics, vec!["career"]);
        assert!(memory.trimmed_history.is_empty());
        assert_eq!(memory.last_updated, 0);
    }

    #[tokio::test]
    async fn corrupt_context_is_masked_as_empty_memory() {
        let store = Arc::new(MemorySessionStore::new());
        let session = store
            .create_session(Session::new("owner-1", "t", "this is {not json"))
            .await
            .unwrap();

        let memory_store = MemoryStore::new(store);
        let memory = memory_store.load(&session.id).await;
        assert!(memory.mentioned_topics.is_empty());
        assert!(memory.trimmed_history.is_empty());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let store = Arc::new(MemorySessionStore::new());
        let session = store
            .create_session(Session::new("owner-1", "t", ""))
            .await
            .unwrap();

        let memory_store = MemoryStore::new(Arc::clone(&store) as Arc<dyn SessionStore>);
        let mut memory = ConversationMemory::default();
        memory.note_topics(vec!["career".to_string()]);
        memory.record_turn("user", "hello", 1);
        memory_store.save(&session.id, &mut memory).await;
        assert!(memory.last_updated > 0);

        let loaded = memory_store.load(&session.id).await;
        assert_eq!(loaded.mentioned_topics, vec!["career"]);
        assert_eq!(loaded.trimmed_history.len(), 1);
        assert_eq!(loaded.last_updated, memory.last_updated);
    }

    #[tokio::test]
    async fn load_of_unknown_session_is_empty() {
        let store = Arc::new(MemorySessionStore::new());
        let memory_store = MemoryStore::new(store);
        let memory = memory_store.load("missing").await;
        assert!(memory.trimmed_history.is_empty());
    }
}
