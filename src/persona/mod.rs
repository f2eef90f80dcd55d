use once_cell::sync::Lazy;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona {
    pub key: &'static str,
    pub name: &'static str,
    pub traits: &'static [&'static str],
    pub style: &'static str,
    pub specializations: &'static [&'static str],
}

pub const DEFAULT_PERSONA: &str = "mentor";

static MENTOR: Persona = Persona {
    key: "mentor",
    name: "Career Mentor",
    traits: &["supportive", "practical", "patient"],
    style: "warm, structured guidance that breaks big decisions into concrete next steps",
    specializations: &["career planning", "skill development", "job search strategy"],
};

static COACH: Persona = Persona {
    key: "coach",
    name: "Motivational Coach",
    traits: &["energetic", "encouraging", "direct"],
    style: "high-energy encouragement that reframes setbacks and builds confidence",
    specializations: &["confidence building", "interview preparation", "goal setting"],
};

static EXPERT: Persona = Persona {
    key: "expert",
    name: "Industry Expert",
    traits: &["analytical", "current", "precise"],
    style: "matter-of-fact analysis grounded in market trends and hiring data",
    specializations: &["industry trends", "market analysis", "compensation benchmarks"],
};

static COUNSELOR: Persona = Persona {
    key: "counselor",
    name: "Career Counselor",
    traits: &["reflective", "thorough", "objective"],
    style: "measured, question-driven assessment of strengths and fit",
    specializations: &["self-assessment", "career transitions", "strengths evaluation"],
};

static PERSONAS: Lazy<HashMap<&'static str, &'static Persona>> = Lazy::new(|| {
    [&MENTOR, &COACH, &EXPERT, &COUNSELOR]
        .iter()
        .map(|p| (p.key, *p))
        .collect()
});

// Keyword groups evaluated top to bottom against the lower-cased message;
// the first group with a substring hit decides the persona.
static SELECTION_RULES: &[(&[&str], &str)] = &[
    (&["motivat", "confidence", "inspir"], "coach"),
    (&["industry", "trend", "market"], "expert"),
    (&["assess", "evaluat"], "counselor"),
];

pub fn persona_by_key(key: &str) -> Option<&'static Persona> {
    PERSONAS.get(key).copied()
}

// Ordered rules, first match wins; no match falls through to the mentor.
pub fn select_persona(message: &str) -> &'static Persona {
    let lowered = message.to_lowercase();
    let key = SELECTION_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(_, key)| *key)
        .unwrap_or(DEFAULT_PERSONA);
    persona_by_key(key).unwrap_or(&MENTOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn motivation_keywords_select_coach() {
        assert_eq!(select_persona("I need to stay motivated during my job hunt").key, "coach");
        assert_eq!(select_persona("how do I build confidence for interviews?").key, "coach");
        assert_eq!(select_persona("something inspiring please").key, "coach");
    }

    #[test]
    fn industry_keywords_select_expert() {
        assert_eq!(select_persona("what are the industry trends this year?").key, "expert");
        assert_eq!(select_persona("is the job market improving?").key, "expert");
    }

    #[test]
    fn assessment_keywords_select_counselor() {
        assert_eq!(select_persona("can you assess my skills?").key, "counselor");
        assert_eq!(select_persona("help me evaluate my options").key, "counselor");
    }

    #[test]
    fn unmatched_text_falls_back_to_mentor() {
        assert_eq!(select_persona("hello there").key, "mentor");
        assert_eq!(select_persona("").key, "mentor");
    }

    #[test]
    fn selection_is_case_insensitive() {
        assert_eq!(select_persona("I FEEL SO MOTIVATED").key, "coach");
    }

    #[test]
    fn selection_is_deterministic() {
        let text = "what should I do about the market?";
        let first = select_persona(text);
        for _ in 0..10 {
            assert_eq!(select_persona(text).key, first.key);
        }
    }

    #[test]
    fn earlier_rule_wins_on_overlap() {
        // Contains both a coaching and an expert keyword; coaching is listed first.
        assert_eq!(select_persona("motivate me to study industry trends").key, "coach");
    }

    #[test]
    fn every_rule_targets_a_known_persona() {
        for (_, key) in SELECTION_RULES {
            assert!(persona_by_key(key).is_some(), "rule points at unknown persona {}", key);
        }
        assert!(persona_by_key(DEFAULT_PERSONA).is_some());
    }
}
