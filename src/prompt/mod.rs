use serde::{ Deserialize, Serialize };

use crate::memory::ConversationMemory;
use crate::models::chat::{ ChatMessage, ChatTurn };
use crate::models::session::{ ROLE_SYSTEM, ROLE_USER };
use crate::persona::Persona;

pub const RECENT_TOPIC_LIMIT: usize = 5;

pub const HISTORY_WINDOW_LEN: usize = 6;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileContext {
    #[serde(default)]
    pub education_level: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub goals: Vec<String>,
}

pub fn build_system_prompt(
    persona: &Persona,
    memory: &ConversationMemory,
    profile: Option<&ProfileContext>
) -> String {
    let mut prompt = String::new();
    prompt.push_str(&format!(
        "You are {}, an assistant for career mentorship conversations.\n",
        persona.name
    ));
    prompt.push_str(&format!("Traits: {}.\n", persona.traits.join(", ")));
    prompt.push_str(&format!("Response style: {}.\n", persona.style));
    prompt.push_str(&format!("Specializations: {}.\n", persona.specializations.join(", ")));

    if let Some(profile) = profile {
        if let Some(level) = &profile.education_level {
            prompt.push_str(&format!("The user's education level: {}.\n", level));
        }
        if !profile.interests.is_empty() {
            prompt.push_str(&format!("The user's interests: {}.\n", profile.interests.join(", ")));
        }
        if !profile.goals.is_empty() {
            prompt.push_str(&format!("The user's stated goals: {}.\n", profile.goals.join("; ")));
        }
    }

    let topics = recent_topics(memory);
    if !topics.is_empty() {
        prompt.push_str(&format!("Topics discussed so far: {}.\n", topics.join(", ")));
    }
    if !memory.user_goals.is_empty() {
        prompt.push_str(&format!(
            "Goals the user has mentioned: {}.\n",
            memory.user_goals.join("; ")
        ));
    }
    if !memory.preferences.is_empty() {
        if let Ok(preferences) = serde_json::to_string(&memory.preferences) {
            prompt.push_str(&format!("User preferences: {}\n", preferences));
        }
    }

    prompt
}

fn recent_topics(memory: &ConversationMemory) -> Vec<String> {
    let start = memory.mentioned_topics.len().saturating_sub(RECENT_TOPIC_LIMIT);
    memory.mentioned_topics[start..].to_vec()
}

pub fn history_window(history: &[ChatMessage]) -> Vec<ChatTurn> {
    let non_system: Vec<&ChatMessage> = history
        .iter()
        .filter(|m| m.role != ROLE_SYSTEM)
        .collect();
    let start = non_system.len().saturating_sub(HISTORY_WINDOW_LEN);
    non_system[start..].iter().map(|m| ChatTurn::from(*m)).collect()
}

// System block first, then the window, then the live user message.
pub fn assemble_turns(
    system_prompt: &str,
    window: &[ChatTurn],
    message: &str,
    context_prompt: Option<&str>
) -> Vec<ChatTurn> {
    let mut turns = Vec::with_capacity(window.len() + 2);
    turns.push(ChatTurn::new(ROLE_SYSTEM, system_prompt));
    turns.extend_from_slice(window);
    let live = match context_prompt {
        Some(prefix) if !prefix.trim().is_empty() => format!("{}\n\n{}", prefix, message),
        _ => message.to_string(),
    };
    turns.push(ChatTurn::new(ROLE_USER, live));
    turns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::session::ROLE_ASSISTANT;
    use crate::persona::select_persona;

    fn entry(role: &str, content: &str, timestamp: i64) -> ChatMessage {
        ChatMessage {
            role: role.to_string(),
            content: content.to_string(),
            timestamp,
        }
    }

    #[test]
    fn system_block_carries_persona_fields() {
        let persona = select_persona("motivate me");
        let prompt = build_system_prompt(persona, &ConversationMemory::default(), None);
        assert!(prompt.contains(persona.name));
        assert!(prompt.contains(persona.style));
        for t in persona.traits {
            assert!(prompt.contains(t));
        }
        for s in persona.specializations {
            assert!(prompt.contains(s));
        }
    }

    #[test]
    fn system_block_cites_only_recent_topics() {
        let mut memory = ConversationMemory::default();
        memory.note_topics(
            ["resume", "salary", "interview", "networking", "leadership", "promotion", "startup"]
                .iter()
                .map(|t| t.to_string())
        );
        let prompt = build_system_prompt(select_persona(""), &memory, None);
        // Seven topics known, only the last five cited.
        assert!(!prompt.contains("resume"));
        assert!(!prompt.contains("salary"));
        assert!(prompt.contains("interview"));
        assert!(prompt.contains("startup"));
    }

    #[test]
    fn system_block_serializes_preferences_verbatim() {
        let mut memory = ConversationMemory::default();
        memory.preferences.insert("response_style".to_string(), "concise".to_string());
        let prompt = build_system_prompt(select_persona(""), &memory, None);
        assert!(prompt.contains(r#""response_style":"concise""#));
    }

    #[test]
    fn system_block_includes_profile_facts() {
        let profile = ProfileContext {
            education_level: Some("bachelor's".to_string()),
            interests: vec!["robotics".to_string()],
            goals: vec!["land a research role".to_string()],
        };
        let prompt = build_system_prompt(select_persona(""), &ConversationMemory::default(), Some(&profile));
        assert!(prompt.contains("bachelor's"));
        assert!(prompt.contains("robotics"));
        assert!(prompt.contains("land a research role"));
    }

    #[test]
    fn window_keeps_last_six_non_system_turns_in_order() {
        let mut history = Vec::new();
        history.push(entry(ROLE_SYSTEM, "instructions", 0));
        for i in 0..9 {
            let role = if i % 2 == 0 { ROLE_USER } else { ROLE_ASSISTANT };
            history.push(entry(role, &format!("turn {}", i), i + 1));
        }

        let window = history_window(&history);
        assert_eq!(window.len(), HISTORY_WINDOW_LEN);
        let contents: Vec<&str> = window.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["turn 3", "turn 4", "turn 5", "turn 6", "turn 7", "turn 8"]);
        assert!(window.iter().all(|t| t.role != ROLE_SYSTEM));
    }

    #[test]
    fn short_history_passes_through_whole() {
        let history = vec![entry(ROLE_USER, "only turn", 1)];
        let window = history_window(&history);
        assert_eq!(window.len(), 1);
    }

    #[test]
    fn assembly_puts_system_first_and_live_message_last() {
        let window = vec![ChatTurn::new(ROLE_USER, "earlier")];
        let turns = assemble_turns("be helpful", &window, "and now?", None);
        assert_eq!(turns.first().map(|t| t.role.as_str()), Some(ROLE_SYSTEM));
        assert_eq!(turns.last().map(|t| t.content.as_str()), Some("and now?"));
        assert_eq!(turns.len(), 3);
    }

    #[test]
    fn context_prompt_prefixes_the_live_message() {
        let turns = assemble_turns("sys", &[], "question", Some("Answer as a pirate"));
        let live = &turns.last().unwrap().content;
        assert!(live.starts_with("Answer as a pirate"));
        assert!(live.ends_with("question"));
    }

    #[test]
    fn blank_context_prompt_is_ignored() {
        let turns = assemble_turns("sys", &[], "question", Some("   "));
        assert_eq!(turns.last().map(|t| t.content.as_str()), Some("question"));
    }
}
