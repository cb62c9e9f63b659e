use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::modules::{message::schema::MessageEntity, user::model::UserResponse};
use crate::utils::PageMeta;

#[derive(Debug, Clone)]
pub struct InsertMessage {
    pub sender_id: i64,
    pub receiver_id: i64,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendMessageBody {
    #[validate(range(min = 1, message = "The receiver id must be a positive integer"))]
    pub receiver_id: i64,
    #[validate(length(min = 1, max = 5000, message = "The message must be between 1 and 5000 characters"))]
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ListMessagesQuery {
    #[validate(range(min = 1, message = "Page must be at least 1"))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 100, message = "Per page must be between 1 and 100"))]
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub id: i64,
    pub sender: UserResponse,
    pub receiver: UserResponse,
    pub message: String,
    pub read_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl MessageResponse {
    pub fn new(message: MessageEntity, sender: UserResponse, receiver: UserResponse) -> Self {
        MessageResponse {
            id: message.id,
            sender,
            receiver,
            message: message.message,
            read_at: message.read_at,
            created_at: message.created_at,
            updated_at: message.updated_at,
        }
    }
}

/// A message joined with both parties.
#[derive(sqlx::FromRow)]
pub struct MessageRow {
    #[sqlx(flatten)]
    pub message: MessageEntity,
    pub sender_name: String,
    pub sender_email: String,
    pub sender_email_verified_at: Option<chrono::DateTime<chrono::Utc>>,
    pub sender_created_at: chrono::DateTime<chrono::Utc>,
    pub receiver_name: String,
    pub receiver_email: String,
    pub receiver_email_verified_at: Option<chrono::DateTime<chrono::Utc>>,
    pub receiver_created_at: chrono::DateTime<chrono::Utc>,
}

impl From<MessageRow> for MessageResponse {
    fn from(r: MessageRow) -> Self {
        let sender = UserResponse {
            id: r.message.sender_id,
            name: r.sender_name,
            email: r.sender_email,
            email_verified_at: r.sender_email_verified_at,
            created_at: r.sender_created_at,
        };
        let receiver = UserResponse {
            id: r.message.receiver_id,
            name: r.receiver_name,
            email: r.receiver_email,
            email_verified_at: r.receiver_email_verified_at,
            created_at: r.receiver_created_at,
        };
        MessageResponse::new(r.message, sender, receiver)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessagePage {
    pub messages: Vec<MessageResponse>,
    pub meta: PageMeta,
}
