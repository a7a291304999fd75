use serde::{Deserialize, Deserializer, Serialize};

/// Opaque ID types for type safety
pub type ConnectionId = String;
pub type MessageId = String;

/// Display names are trimmed and cut to this many characters
pub const MAX_USERNAME_CHARS: usize = 30;

/// Message bodies are trimmed and cut to this many characters
pub const MAX_MESSAGE_CHARS: usize = 500;

/// Number of messages retained in history (oldest evicted first)
pub const HISTORY_LIMIT: usize = 200;

/// A chat message as broadcast to clients and persisted to disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    #[serde(deserialize_with = "deserialize_message_id")]
    pub id: MessageId,
    pub username: String,
    pub message: String,
    pub timestamp: String, // ISO8601, millisecond precision
}

impl ChatMessage {
    /// Create a new message stamped with a fresh ID and the current time
    pub fn new(username: String, message: String) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            username,
            message,
            timestamp: now_iso(),
        }
    }
}

/// Payload of `user_connected` / `user_disconnected`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PresenceNotice {
    pub username: String,
    pub timestamp: String,
}

impl PresenceNotice {
    pub fn now(username: String) -> Self {
        Self {
            username,
            timestamp: now_iso(),
        }
    }
}

/// Payload of `user_typing` / `user_stop_typing`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TypingNotice {
    pub username: String,
}

/// Generate a new connection identifier
pub fn new_connection_id() -> ConnectionId {
    ulid::Ulid::new().to_string()
}

/// Current UTC time formatted like `2024-05-01T12:30:00.123Z`
pub fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Trim surrounding whitespace and keep at most `max_chars` characters.
pub fn sanitize(raw: &str, max_chars: usize) -> String {
    raw.trim().chars().take(max_chars).collect()
}

/// History files written by older servers stored numeric IDs
/// (`Date.now() + Math.random()`); accept those as well as strings.
fn deserialize_message_id<'de, D>(deserializer: D) -> Result<MessageId, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number for message id, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_trims_and_truncates() {
        assert_eq!(sanitize("  Alice  ", MAX_USERNAME_CHARS), "Alice");
        assert_eq!(sanitize("   ", MAX_USERNAME_CHARS), "");

        let long = "x".repeat(40);
        assert_eq!(sanitize(&long, MAX_USERNAME_CHARS).len(), 30);
    }

    #[test]
    fn test_sanitize_counts_characters_not_bytes() {
        let name = "é".repeat(35);
        let sanitized = sanitize(&name, MAX_USERNAME_CHARS);
        assert_eq!(sanitized.chars().count(), 30);
    }

    #[test]
    fn test_sanitize_truncates_after_trimming() {
        let body = format!("   {}   ", "a".repeat(600));
        let sanitized = sanitize(&body, MAX_MESSAGE_CHARS);
        assert_eq!(sanitized, "a".repeat(500));
    }

    #[test]
    fn test_timestamp_format() {
        let ts = now_iso();
        assert!(ts.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
        // 2024-05-01T12:30:00.123Z
        assert_eq!(ts.len(), 24);
    }

    #[test]
    fn test_new_message_ids_are_distinct() {
        let a = ChatMessage::new("A".to_string(), "one".to_string());
        let b = ChatMessage::new("A".to_string(), "two".to_string());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_message_accepts_numeric_id() {
        let json = r#"{"id":1715000000000.123,"username":"Bob","message":"hi","timestamp":"2024-05-06T12:53:20.000Z"}"#;
        let msg: ChatMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.id, "1715000000000.123");
        assert_eq!(msg.username, "Bob");
    }

    #[test]
    fn test_message_rejects_object_id() {
        let json = r#"{"id":{},"username":"Bob","message":"hi","timestamp":"t"}"#;
        assert!(serde_json::from_str::<ChatMessage>(json).is_err());
    }
}
