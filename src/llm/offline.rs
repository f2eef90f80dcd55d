use crate::memory::ConversationMemory;
use crate::persona::Persona;

type Matcher = fn(&str) -> bool;
type Responder = fn(&Persona, &ConversationMemory) -> String;

// Ordered (predicate, generator) pairs over the lower-cased message; first
// match wins, same dispatch shape as persona selection. Runs when no hosted
// provider is configured or every attempt failed, so it must always answer.
static OFFLINE_RULES: &[(Matcher, Responder)] = &[
    (is_greeting, greeting_reply),
    (mentions_ai, ai_reply),
    (mentions_healthcare, healthcare_reply),
    (mentions_finance, finance_reply),
    (mentions_programming, programming_reply),
    (mentions_remote_work, remote_work_reply),
    (mentions_entrepreneurship, entrepreneurship_reply),
    (mentions_career_change, career_change_reply),
    (is_short, clarify_reply),
];

pub fn generate_reply(persona: &Persona, memory: &ConversationMemory, message: &str) -> String {
    let lowered = message.trim().to_lowercase();
    let responder = OFFLINE_RULES.iter()
        .find(|(matches, _)| matches(&lowered))
        .map(|(_, respond)| *respond)
        .unwrap_or(default_reply);
    responder(persona, memory)
}

fn contains_word(text: &str, word: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric()).any(|token| token == word)
}

fn is_greeting(text: &str) -> bool {
    let first = text.split_whitespace().next().unwrap_or("");
    matches!(first, "hi" | "hello" | "hey" | "greetings") ||
        text.starts_with("good morning") ||
        text.starts_with("good afternoon") ||
        text.starts_with("good evening")
}

fn mentions_ai(text: &str) -> bool {
    text.contains("machine learning") ||
        text.contains("artificial intelligence") ||
        text.contains("data science") ||
        contains_word(text, "ai") ||
        contains_word(text, "ml")
}

fn mentions_healthcare(text: &str) -> bool {
    text.contains("healthcare") ||
        text.contains("health care") ||
        contains_word(text, "nursing") ||
        contains_word(text, "medical") ||
        contains_word(text, "medicine")
}

fn mentions_finance(text: &str) -> bool {
    contains_word(text, "finance") ||
        contains_word(text, "financial") ||
        contains_word(text, "accounting") ||
        contains_word(text, "banking") ||
        contains_word(text, "investment")
}

fn mentions_programming(text: &str) -> bool {
    text.contains("programming") ||
        text.contains("software") ||
        contains_word(text, "coding") ||
        contains_word(text, "developer") ||
        text.contains("web development")
}

fn mentions_remote_work(text: &str) -> bool {
    text.contains("remote work") ||
        text.contains("work from home") ||
        contains_word(text, "remote") ||
        contains_word(text, "freelance")
}

fn mentions_entrepreneurship(text: &str) -> bool {
    text.contains("entrepreneur") ||
        text.contains("startup") ||
        text.contains("start a business") ||
        text.contains("my own business")
}

fn mentions_career_change(text: &str) -> bool {
    text.contains("career change") ||
        text.contains("change career") ||
        text.contains("switch career") ||
        text.contains("new career") ||
        text.contains("transition")
}

fn is_short(text: &str) -> bool {
    text.len() < 12
}

fn lead_specialization(persona: &Persona) -> &'static str {
    persona.specializations.first().copied().unwrap_or("career guidance")
}

// Closes the reply with the user's first recorded goal, when one exists.
fn goal_note(memory: &ConversationMemory) -> String {
    match memory.user_goals.first() {
        Some(goal) => format!(" I'm keeping your goal to {} in mind as we talk.", goal),
        None => String::new(),
    }
}

fn greeting_reply(persona: &Persona, memory: &ConversationMemory) -> String {
    format!(
        "Hello! I'm your {}, and I'm glad you're here. My focus is {}, so tell me where \
         you are in your career journey and what you'd like to work on.{}",
        persona.name,
        lead_specialization(persona),
        goal_note(memory)
    )
}

fn ai_reply(persona: &Persona, memory: &ConversationMemory) -> String {
    format!(
        "AI and machine learning roles are growing fast, and as your {} I'd start with \
         fundamentals: statistics, Python, and a portfolio of small end-to-end projects. \
         Data analyst and junior ML engineer positions are common entry points, and public \
         datasets give you practice material long before your first interview.{}",
        persona.name,
        goal_note(memory)
    )
}

fn healthcare_reply(persona: &Persona, memory: &ConversationMemory) -> String {
    format!(
        "Healthcare careers range from hands-on clinical roles like nursing to health \
         informatics and administration. As your {} I'd look first at which certifications \
         your region requires, since those gate most clinical paths, while technology-facing \
         roles tend to value transferable skills you may already have.{}",
        persona.name,
        goal_note(memory)
    )
}

fn finance_reply(persona: &Persona, memory: &ConversationMemory) -> String {
    format!(
        "Finance rewards credentials and demonstrated rigor. Speaking as your {}, the \
         classic routes are accounting qualifications, analyst programs, or fintech roles \
         that blend finance with software. A clear picture of which of those three appeals \
         most will shape everything else, so that's the first thing to pin down.{}",
        persona.name,
        goal_note(memory)
    )
}

fn programming_reply(persona: &Persona, memory: &ConversationMemory) -> String {
    format!(
        "Software careers care more about what you've built than where you studied. As \
         your {} my standard advice is to pick one language, build three real projects you \
         can demo, and practice explaining your decisions out loud. That combination covers \
         both the portfolio and the interview.{}",
        persona.name,
        goal_note(memory)
    )
}

fn remote_work_reply(persona: &Persona, memory: &ConversationMemory) -> String {
    format!(
        "Remote work opens the job map but raises the bar on written communication and \
         self-management. As your {} I'd highlight those two skills in your applications, \
         and target companies that are remote-first rather than remote-tolerant, since the \
         day-to-day experience differs a lot.{}",
        persona.name,
        goal_note(memory)
    )
}

fn entrepreneurship_reply(persona: &Persona, memory: &ConversationMemory) -> String {
    format!(
        "Starting something of your own is a career path with its own skill set. As your \
         {} I'd begin by validating the idea with real potential customers before building \
         anything, and keep your runway honest: income, savings, and the date you'd need \
         revenue by. Small paid pilots beat big unlaunched plans.{}",
        persona.name,
        goal_note(memory)
    )
}

fn career_change_reply(persona: &Persona, memory: &ConversationMemory) -> String {
    format!(
        "Career transitions go smoothest when you move through an overlap rather than a \
         leap. As your {} I'd map the skills your current role shares with the target one, \
         then close the gap with one visible project or certification while you're still \
         employed. That keeps the story coherent for interviewers.{}",
        persona.name,
        goal_note(memory)
    )
}

fn clarify_reply(persona: &Persona, memory: &ConversationMemory) -> String {
    format!(
        "I want to point you somewhere useful, but I need a little more to go on. I'm \
         your {}, strongest on {}. Could you say a bit more about your situation or what \
         you'd like to figure out?{}",
        persona.name,
        lead_specialization(persona),
        goal_note(memory)
    )
}

fn default_reply(persona: &Persona, memory: &ConversationMemory) -> String {
    let topics = match memory.mentioned_topics.last() {
        Some(topic) => format!(" Earlier we touched on {}, and we can pick that back up anytime.", topic),
        None => String::new(),
    };
    format!(
        "That's worth digging into. As your {} with a focus on {}, here's how I'd frame \
         it: get specific about the outcome you want, list what's in your control this \
         month, and pick the single step with the best effort-to-impact ratio.{}{}",
        persona.name,
        lead_specialization(persona),
        topics,
        goal_note(memory)
    )
}
