use std::error::Error;
use std::str::FromStr;
use std::sync::Arc;

use log::{ info, warn };
use serde_json::json;

use crate::cli::Args;
use crate::llm::fallback::FallbackGenerator;
use crate::llm::ProviderPreference;
use crate::memory::{ detect_preferences, extract_goals, ConversationMemory, MemoryStore };
use crate::memory::topics::{ extract_topics, extract_topics_batch };
use crate::models::chat::ChatMessage;
use crate::models::session::{ Message, Session, ROLE_ASSISTANT, ROLE_USER };
use crate::persona::{ select_persona, Persona };
use crate::prompt::{ assemble_turns, build_system_prompt, history_window, ProfileContext };
use crate::store::{ initialize_session_store, SessionStore, StoreError };

// Trailing log entries fetched when memory holds no trimmed history.
const RECENT_LOG_FOR_PROMPT: usize = 10;

const ANONYMOUS_OWNER: &str = "anonymous";
const DEFAULT_SESSION_TITLE: &str = "New conversation";
const TITLE_MAX_CHARS: usize = 40;

#[derive(Debug, Clone, Default)]
pub struct SendMessageRequest {
    pub owner_id: Option<String>,
    pub session_id: Option<String>,
    pub message: String,
    pub profile: Option<ProfileContext>,
    pub context_prompt: Option<String>,
    // deepseek | gpt-oss | openai | anthropic | auto
    pub provider: Option<String>,
}

pub struct MentorAgent {
    store: Arc<dyn SessionStore>,
    memory_store: MemoryStore,
    generator: FallbackGenerator,
    default_preference: ProviderPreference,
}

fn normalize_owner(owner_id: Option<&str>) -> String {
    match owner_id {
        Some(owner) if !owner.trim().is_empty() => owner.trim().to_string(),
        _ => ANONYMOUS_OWNER.to_string(),
    }
}

fn derive_title(message: &str) -> String {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        return DEFAULT_SESSION_TITLE.to_string();
    }
    if trimmed.chars().count() <= TITLE_MAX_CHARS {
        return trimmed.to_string();
    }
    let head: String = trimmed.chars().take(TITLE_MAX_CHARS).collect();
    format!("{}...", head.trim_end())
}

impl MentorAgent {
    pub fn new(args: &Args) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let store = initialize_session_store(args)?;
        let generator = FallbackGenerator::from_args(args)?;
        let default_preference = ProviderPreference::from_str(&args.default_provider)?;
        info!("Default provider preference: {:?}", default_preference);
        Ok(Self::assemble(store, generator, default_preference))
    }

    // Direct wiring, used by tests to inject stores and providers.
    pub fn assemble(
        store: Arc<dyn SessionStore>,
        generator: FallbackGenerator,
        default_preference: ProviderPreference
    ) -> Self {
        let memory_store = MemoryStore::new(Arc::clone(&store));
        Self {
            store,
            memory_store,
            generator,
            default_preference,
        }
    }

    pub async fn send_message(&self, request: SendMessageRequest) -> Result<Message, StoreError> {
        let owner = normalize_owner(request.owner_id.as_deref());
        let session = self.resolve_session(
            &owner,
            request.session_id.as_deref(),
            &request.message
        ).await?;

        // Fetched before the live message is appended, so it holds only
        // prior turns.
        let prior_log = match
            self.store.recent_messages(&session.id, RECENT_LOG_FOR_PROMPT).await
        {
            Ok(log) => log,
            Err(e) => {
                warn!("Could not load recent messages for {}: {}", session.id, e);
                Vec::new()
            }
        };

        let mut memory = self.memory_store.load(&session.id).await;
        if memory.trimmed_history.is_empty() && !prior_log.is_empty() {
            // Memory was lost or never written; reseed the topic set from
            // the surviving log.
            memory.note_topics(
                extract_topics_batch(prior_log.iter().map(|m| m.content.as_str()))
            );
        }

        let user_message = self.store.append_message(
            Message::new(&session.id, &owner, ROLE_USER, &request.message, "{}")
        ).await?;

        let persona = select_persona(&request.message);
        let preference = self.resolve_preference(request.provider.as_deref());

        let window_source: Vec<ChatMessage> = if memory.trimmed_history.is_empty() {
            prior_log
                .iter()
                .map(|m| ChatMessage {
                    role: m.role.clone(),
                    content: m.content.clone(),
                    timestamp: m.created_at,
                })
                .collect()
        } else {
            memory.trimmed_history.clone()
        };

        let system_prompt = build_system_prompt(persona, &memory, request.profile.as_ref());
        let window = history_window(&window_source);
        let turns = assemble_turns(
            &system_prompt,
            &window,
            &request.message,
            request.context_prompt.as_deref()
        );

        let reply = self.generator.generate(
            &turns,
            preference,
            persona,
            &memory,
            &request.message
        ).await;

        let metadata = match reply.provider {
            Some(kind) =>
                json!({ "source": "provider", "provider": kind.as_str(), "persona": persona.key }),
            None => json!({ "source": "offline", "persona": persona.key }),
        };
        let assistant_message = self.store.append_message(
            Message::new(&session.id, &owner, ROLE_ASSISTANT, &reply.text, &metadata.to_string())
        ).await?;

        if let Err(e) = self.store.touch_session(&session.id, assistant_message.created_at).await {
            warn!("Could not bump session {}: {}", session.id, e);
        }

        // Memory only advances on real provider replies; offline templates
        // would otherwise pollute topics and history with their own text.
        if reply.provider.is_some() {
            self.refresh_memory(
                &session.id,
                &mut memory,
                &user_message,
                &assistant_message,
                persona
            ).await;
        }

        Ok(assistant_message)
    }

    async fn resolve_session(
        &self,
        owner: &str,
        requested: Option<&str>,
        message: &str
    ) -> Result<Session, StoreError> {
        if let Some(id) = requested {
            match self.store.find_session(id).await {
                Ok(Some(session)) if session.active && session.owner_id == owner => {
                    return Ok(session);
                }
                Ok(Some(_)) => {
                    info!("Session {} is inactive or owned elsewhere, starting a new one", id);
                }
                Ok(None) => {
                    info!("Session {} not found, starting a new one", id);
                }
                Err(e) => {
                    warn!("Session lookup for {} failed: {}, starting a new one", id, e);
                }
            }
        }
        self.store.create_session(Session::new(owner, &derive_title(message), "")).await
    }

    fn resolve_preference(&self, token: Option<&str>) -> ProviderPreference {
        match token {
            Some(token) =>
                match ProviderPreference::from_str(token) {
                    Ok(preference) => preference,
                    Err(e) => {
                        // A bad token degrades to auto order, not to the
                        // configured default.
                        warn!("{}, using the auto provider order", e);
                        ProviderPreference::Auto
                    }
                }
            None => self.default_preference,
        }
    }

    async fn refresh_memory(
        &self,
        session_id: &str,
        memory: &mut ConversationMemory,
        user_message: &Message,
        assistant_message: &Message,
        persona: &Persona
    ) {
        memory.record_turn(ROLE_USER, &user_message.content, user_message.created_at);
        memory.record_turn(
            ROLE_ASSISTANT,
            &assistant_message.content,
            assistant_message.created_at
        );
        memory.note_topics(extract_topics(&user_message.content));
        for goal in extract_goals(&user_message.content) {
            memory.note_goal(goal);
        }
        for (key, value) in detect_preferences(&user_message.content) {
            memory.preferences.insert(key.to_string(), value.to_string());
        }
        memory.note_persona(persona.key);
        self.memory_store.save(session_id, memory).await;
    }

    pub async fn create_session(
        &self,
        owner_id: Option<&str>,
        title: Option<&str>,
        context: Option<&str>
    ) -> Result<Session, StoreError> {
        let owner = normalize_owner(owner_id);
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_SESSION_TITLE);
        self.store.create_session(Session::new(&owner, title, context.unwrap_or(""))).await
    }

    pub async fn user_sessions(&self, owner_id: Option<&str>) -> Result<Vec<Session>, StoreError> {
        self.store.sessions_for_owner(&normalize_owner(owner_id)).await
    }

    pub async fn session_messages(&self, session_id: &str) -> Result<Vec<Message>, StoreError> {
        self.store.session_messages(session_id).await
    }

    // Soft delete; the log stays readable by session id.
    pub async fn delete_session(&self, session_id: &str) -> Result<(), StoreError> {
        self.store.deactivate_session(session_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_defaults_to_anonymous() {
        assert_eq!(normalize_owner(None), ANONYMOUS_OWNER);
        assert_eq!(normalize_owner(Some("")), ANONYMOUS_OWNER);
        assert_eq!(normalize_owner(Some("  ")), ANONYMOUS_OWNER);
        assert_eq!(normalize_owner(Some(" zara ")), "zara");
    }

    #[test]
    fn titles_come_from_the_first_message() {
        assert_eq!(derive_title("Short question"), "Short question");
        assert_eq!(derive_title("   "), DEFAULT_SESSION_TITLE);
        let long = "a".repeat(60);
        let title = derive_title(&long);
        assert!(title.ends_with("..."));
        assert_eq!(title.chars().count(), TITLE_MAX_CHARS + 3);
    }
}
