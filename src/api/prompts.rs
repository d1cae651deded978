//! Prompt texts for the three commentary touchpoints.

use crate::libs::record::Category;
use crate::libs::session::Preference;

pub fn analysis_prompt(category: Category, color_tag: &str, duration_seconds: u64, notes: &str) -> String {
    let notes = if notes.trim().is_empty() { "none" } else { notes.trim() };
    format!(
        "I just finished a bowel movement. Acting as a humorous but professional gut-health assistant, \
give me a short health analysis and some advice.\n\
Data:\n\
- Bristol stool scale: type {category}\n\
- Color: {color_tag}\n\
- Duration: {duration_seconds} seconds\n\
- Notes/diet: {notes}\n\
\n\
Reply in a light, funny tone, nothing dry, in no more than 100 words.",
        category = category.value(),
    )
}

pub fn entertainment_prompt(preference: Preference) -> String {
    match preference {
        Preference::Study => {
            "Tell me an obscure fact about history, science or literature. Keep it very short and fun, something I can read in under a minute."
        }
        Preference::Work => "Give me one darkly funny piece of workplace survival wisdom or a genuinely useful productivity tip. Short and punchy.",
        Preference::Home => "Tell me a very short groan-worthy joke or a handy household trick.",
    }
    .to_string()
}

pub fn chat_prompt(message: &str, history: &[String]) -> String {
    format!(
        "You are a stranger in the next toilet stall and we are chatting through the partition. \
You are a bit of a gossip, funny, and now and then you say something that sounds profound but means nothing.\n\
Conversation so far:\n{history}\n\
I say: {message}\n\
Reply briefly:",
        history = history.join("\n"),
    )
}
