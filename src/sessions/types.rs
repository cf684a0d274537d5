use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// One turn of a conversation, as stored and as sent over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// A persisted conversation about one website, keyed by user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub website_url: String,
    pub website_title: String,
    pub language: String,
    pub messages: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_serializes_camel_case_lowercase_role() {
        let message = ChatMessage {
            role: MessageRole::Assistant,
            content: "hello".into(),
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["role"], "assistant");
        assert!(json.get("timestamp").is_some());
    }

    #[test]
    fn session_wire_shape_uses_camel_case() {
        let session = Session {
            id: "s1".into(),
            user_id: "u1".into(),
            website_url: "https://acme.example".into(),
            website_title: "Acme".into(),
            language: "en".into(),
            messages: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["userId"], "u1");
        assert_eq!(json["websiteUrl"], "https://acme.example");
        assert!(json.get("updatedAt").is_some());
    }
}
