use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::account::models::EmailMessage;

/// Serializable outbox record consumed by the external mailer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmailOutboxMessage {
    pub message_id: String,
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl EmailOutboxMessage {
    pub fn new(sender: &str, message: EmailMessage, created_at: DateTime<Utc>) -> Self {
        Self {
            message_id: Uuid::new_v4().to_string(),
            from: sender.to_string(),
            to: message.to,
            subject: message.subject,
            body: message.body,
            created_at,
        }
    }
}
