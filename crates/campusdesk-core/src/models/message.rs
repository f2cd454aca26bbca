use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message addressed to a student, as served by `/api/messages`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    /// Recipient email address the message was delivered to
    pub email: String,
    pub message: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Confirmation body from `POST /api/messages`.
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageResponse {
    pub status: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_message() {
        let json = r#"{"id":12,"email":"ada@example.edu","message":"Welcome to the program","createdAt":"2025-09-14T08:30:00Z"}"#;
        let msg: Message = serde_json::from_str(json).expect("Failed to parse message JSON");
        assert_eq!(msg.id, 12);
        assert_eq!(msg.message, "Welcome to the program");
        assert_eq!(msg.created_at.to_rfc3339(), "2025-09-14T08:30:00+00:00");
    }

    #[test]
    fn test_parse_send_confirmation() {
        let json = r#"{"status":"success","message":"message sent successfully"}"#;
        let resp: SendMessageResponse = serde_json::from_str(json).expect("Failed to parse confirmation");
        assert_eq!(resp.status, "success");
    }
}
