use serde_json::Value;
use std::collections::BTreeMap;

pub const SUMMARY_MAX_WORDS: usize = 100;

pub fn summary_prompt(text: &str) -> String {
    format!(
        "You are an expert in content analysis. Your task is to write a professional, \
         concise summary of no more than {SUMMARY_MAX_WORDS} words of the following text: \
         TEXT: {text}"
    )
}

pub fn recommendation_prompt(answers: &BTreeMap<String, Value>) -> String {
    format!(
        r#"You are a professional, Netflix-style film recommender.
Based on the user's answers below, produce:

1) One recommended movie with a detailed explanation.
2) A description of the user's cinematic profile.
3) Three very fitting alternatives.

User answers:
{answers}

Output format:
### MOVIE
Title: ...
Explanation: ...

### PROFILE
Description: ...

### ALTERNATIVES
- ...
- ...
- ...
"#,
        answers = render_answers(answers)
    )
}

pub const TITLE_SYSTEM_INSTRUCTION: &str =
    "You are a video marketing assistant. Always answer with a single valid JSON object.";

pub fn title_prompt(description: &str) -> String {
    format!(
        "Suggest a catchy title, a short engaging description (at most 50 words) and \
         five hashtags for a video described as follows.\n\
         Answer with a JSON object with the string fields \"title\", \"description\" and \
         \"tags\" (hashtags separated by spaces).\n\
         VIDEO: {description}"
    )
}

/// One `- question: answer` line per entry, in key order.
fn render_answers(answers: &BTreeMap<String, Value>) -> String {
    answers
        .iter()
        .map(|(question, answer)| format!("- {}: {}", question, render_value(answer)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "(no answer)".to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(render_value)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}
