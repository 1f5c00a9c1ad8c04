use serde_json::Value;

use crate::models::ChatMessage;

const PERSONA: &str = "You are a helpful Laravel assistant. ";
const ERROR_LOG_INSTRUCTION: &str = "The user has pasted a Laravel error log. Please analyze it, explain the cause, and provide step-by-step resolving steps.";
const GENERAL_INSTRUCTION: &str = "Help the user with their queries about Laravel development.";
const ERROR_MARKERS: [&str; 3] = ["error", "exception", "stack trace"];

/**
 * \brief Whether the message looks like a pasted error log.
 */
pub fn is_error_log(message: &str) -> bool {
    let lowered = message.to_ascii_lowercase();
    ERROR_MARKERS.iter().any(|marker| lowered.contains(marker))
}

/**
 * \brief Picks the system prompt for a user message.
 */
pub fn system_prompt(message: &str) -> String {
    let instruction = if is_error_log(message) {
        ERROR_LOG_INSTRUCTION
    } else {
        GENERAL_INSTRUCTION
    };
    format!("{}{}", PERSONA, instruction)
}

/**
 * \brief Builds the outbound message list: system prompt, history, then the new user turn.
 *
 * History entries may carry their text under `content` or `message`; missing
 * roles become `user` and missing text becomes an empty string.
 */
pub fn assemble_messages(system: &str, history: &[Value], message: &str) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(system));
    messages.extend(history.iter().map(history_entry));
    messages.push(ChatMessage::user(message));
    messages
}

fn history_entry(entry: &Value) -> ChatMessage {
    let field = |key: &str| entry.get(key).and_then(as_text);
    ChatMessage {
        role: field("role").unwrap_or_else(|| "user".to_string()),
        content: field("content")
            .or_else(|| field("message"))
            .unwrap_or_default(),
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn detects_error_markers_case_insensitively() {
        assert!(is_error_log("I got an Exception: null pointer"));
        assert!(is_error_log("ERROR 500 on /login"));
        assert!(is_error_log("here is the Stack Trace you asked for"));
        assert!(is_error_log("SQLSTATE[HY000]: General error: 1364"));
        assert!(!is_error_log("How do I make a route?"));
        assert!(!is_error_log("stack\ntrace"));
    }

    #[test]
    fn picks_one_of_two_prompts() {
        assert_eq!(
            system_prompt("I got an Exception: null pointer"),
            "You are a helpful Laravel assistant. The user has pasted a Laravel error log. Please analyze it, explain the cause, and provide step-by-step resolving steps."
        );
        assert_eq!(
            system_prompt("How do I make a route?"),
            "You are a helpful Laravel assistant. Help the user with their queries about Laravel development."
        );
    }

    #[test]
    fn frames_history_between_system_and_user() {
        let history = vec![
            json!({"role": "user", "content": "hi"}),
            json!({"role": "assistant", "content": "hello"}),
        ];
        let messages = assemble_messages("sys", &history, "next");
        assert_eq!(
            messages,
            vec![
                ChatMessage::system("sys"),
                ChatMessage::user("hi"),
                ChatMessage::assistant("hello"),
                ChatMessage::user("next"),
            ]
        );
    }

    #[test]
    fn fills_defaults_for_malformed_entries() {
        let history = vec![
            json!({"message": "legacy shape"}),
            json!({"role": "assistant"}),
            json!({"role": null, "content": null, "message": "fallback"}),
            json!({"content": "wins", "message": "loses"}),
            json!("not an object"),
            json!({"role": "assistant", "content": 42}),
        ];
        let messages = assemble_messages("sys", &history, "q");
        assert_eq!(messages.len(), history.len() + 2);
        assert_eq!(messages[1], ChatMessage::user("legacy shape"));
        assert_eq!(messages[2], ChatMessage::assistant(""));
        assert_eq!(messages[3], ChatMessage::user("fallback"));
        assert_eq!(messages[4], ChatMessage::user("wins"));
        assert_eq!(messages[5], ChatMessage::user(""));
        assert_eq!(messages[6], ChatMessage::assistant("42"));
    }

    #[test]
    fn keeps_caller_roles_verbatim() {
        let history = vec![json!({"role": "tool", "content": "{}"})];
        let messages = assemble_messages("sys", &history, "q");
        assert_eq!(messages[1].role, "tool");
    }
}
