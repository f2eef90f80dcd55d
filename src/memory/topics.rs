// Substring containment, so "careers" hits "career" and "entrepreneurship"
// hits "entrepreneur".
pub static TOPIC_VOCABULARY: &[&str] = &[
    "career",
    "job",
    "interview",
    "resume",
    "salary",
    "skill",
    "promotion",
    "leadership",
    "networking",
    "machine learning",
    "artificial intelligence",
    "data science",
    "software",
    "programming",
    "web development",
    "cybersecurity",
    "healthcare",
    "nursing",
    "finance",
    "accounting",
    "banking",
    "marketing",
    "design",
    "education",
    "teaching",
    "remote work",
    "freelance",
    "entrepreneur",
    "startup",
    "management",
    "certification",
    "internship",
    "mentorship",
    "work-life balance",
    "graduate",
];

pub fn extract_topics(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOPIC_VOCABULARY
        .iter()
        .copied()
        .filter(|topic| lowered.contains(*topic))
        .map(|topic| topic.to_string())
        .collect()
}

pub fn extract_topics_batch<'a>(texts: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut topics = Vec::new();
    for text in texts {
        for topic in extract_topics(text) {
            if !topics.contains(&topic) {
                topics.push(topic);
            }
        }
    }
    topics
}
