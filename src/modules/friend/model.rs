use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::modules::{
    friend::schema::{FriendRequestEntity, FriendRequestStatus},
    user::model::UserResponse,
};

#[derive(Debug, Clone, Serialize)]
pub struct FriendRequestResponse {
    pub id: i64,
    pub sender: UserResponse,
    pub receiver: UserResponse,
    pub status: FriendRequestStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl FriendRequestResponse {
    pub fn new(request: FriendRequestEntity, sender: UserResponse, receiver: UserResponse) -> Self {
        FriendRequestResponse {
            id: request.id,
            sender,
            receiver,
            status: request.status,
            created_at: request.created_at,
            updated_at: request.updated_at,
        }
    }
}

/// Pending request joined with both parties, as returned by the listing query.
#[derive(sqlx::FromRow)]
pub struct FriendRequestRow {
    pub id: i64,
    pub status: FriendRequestStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub sender_id: i64,
    pub sender_name: String,
    pub sender_email: String,
    pub sender_email_verified_at: Option<chrono::DateTime<chrono::Utc>>,
    pub sender_created_at: chrono::DateTime<chrono::Utc>,
    pub receiver_id: i64,
    pub receiver_name: String,
    pub receiver_email: String,
    pub receiver_email_verified_at: Option<chrono::DateTime<chrono::Utc>>,
    pub receiver_created_at: chrono::DateTime<chrono::Utc>,
}

impl From<FriendRequestRow> for FriendRequestResponse {
    fn from(r: FriendRequestRow) -> Self {
        FriendRequestResponse {
            id: r.id,
            sender: UserResponse {
                id: r.sender_id,
                name: r.sender_name,
                email: r.sender_email,
                email_verified_at: r.sender_email_verified_at,
                created_at: r.sender_created_at,
            },
            receiver: UserResponse {
                id: r.receiver_id,
                name: r.receiver_name,
                email: r.receiver_email,
                email_verified_at: r.receiver_email_verified_at,
                created_at: r.receiver_created_at,
            },
            status: r.status,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct FriendRequestBody {
    #[validate(range(min = 1, message = "The receiver id must be a positive integer"))]
    pub receiver_id: i64,
}
