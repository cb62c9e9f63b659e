use crate::api::error;
use crate::modules::friend::model::FriendRequestResponse;
use crate::modules::friend::schema::{FriendRequestEntity, FriendRequestStatus, FriendshipEntity};
use crate::modules::user::schema::UserEntity;

#[async_trait::async_trait]
pub trait FriendshipRepository {
    /// The directed row `(user_id, friend_id)`.
    async fn find_friendship(
        &self,
        user_id: i64,
        friend_id: i64,
    ) -> Result<Option<FriendshipEntity>, error::SystemError>;

    async fn find_friends(&self, user_id: i64) -> Result<Vec<UserEntity>, error::SystemError>;
}

#[async_trait::async_trait]
pub trait FriendRequestRepository {
    /// Pending request between the two users, in either direction.
    async fn find_pending_between(
        &self,
        user_a: i64,
        user_b: i64,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError>;

    /// Newest first.
    async fn find_pending_to_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<FriendRequestResponse>, error::SystemError>;

    async fn create_friend_request(
        &self,
        sender_id: i64,
        receiver_id: i64,
    ) -> Result<FriendRequestEntity, error::SystemError>;
}

#[async_trait::async_trait]
pub trait FriendRepo: FriendshipRepository + FriendRequestRepository + Send + Sync {
    /// Locks the request, checks the acting user against it and applies `target`.
    /// Accepting writes both friendship rows in the same unit of work.
    async fn transition_friend_request_atomic(
        &self,
        request_id: i64,
        acting_user_id: i64,
        target: FriendRequestStatus,
    ) -> Result<FriendRequestEntity, error::SystemError>;
}
