use std::sync::Arc;

use log::info;

use crate::{
    api::error,
    constants::PENDING_FRIEND_REQUEST_CONSTRAINT,
    modules::{
        friend::{
            model::FriendRequestResponse,
            repository::FriendRepo,
            schema::{FriendRequestEntity, FriendRequestStatus},
        },
        user::{model::UserResponse, repository::UserRepository},
    },
};

#[derive(Clone)]
pub struct FriendService<R, U>
where
    R: FriendRepo + Send + Sync,
    U: UserRepository + Send + Sync,
{
    friend_repo: Arc<R>,
    user_repo: Arc<U>,
}

impl<R, U> FriendService<R, U>
where
    R: FriendRepo + Send + Sync,
    U: UserRepository + Send + Sync,
{
    pub fn with_dependencies(friend_repo: Arc<R>, user_repo: Arc<U>) -> Self {
        FriendService { friend_repo, user_repo }
    }

    pub async fn are_friends(&self, user_id: i64, friend_id: i64) -> Result<bool, error::SystemError> {
        let friendship = self.friend_repo.find_friendship(user_id, friend_id).await?;
        Ok(friendship.is_some())
    }

    pub async fn get_friends(&self, user_id: i64) -> Result<Vec<UserResponse>, error::SystemError> {
        let friends = self.friend_repo.find_friends(user_id).await?;
        Ok(friends.into_iter().map(UserResponse::from).collect())
    }

    pub async fn send_friend_request(
        &self,
        sender_id: i64,
        receiver_id: i64,
    ) -> Result<FriendRequestResponse, error::SystemError> {
        if receiver_id == sender_id {
            return Err(error::SystemError::unprocessable(
                "You cannot send a friend request to yourself.",
            ));
        }

        let (sender, receiver) = tokio::try_join!(
            self.user_repo.find_by_id(sender_id),
            self.user_repo.find_active_by_id(receiver_id),
        )?;

        let receiver = receiver.ok_or_else(|| {
            error::SystemError::not_found("The user you are trying to add is not active.")
        })?;
        let sender = sender.ok_or_else(|| error::SystemError::not_found("User not found"))?;

        let (friendship, pending) = tokio::try_join!(
            self.friend_repo.find_friendship(sender_id, receiver_id),
            self.friend_repo.find_pending_between(sender_id, receiver_id),
        )?;

        if friendship.is_some() {
            return Err(error::SystemError::conflict("Users are already friends."));
        }

        if pending.is_some() {
            return Err(error::SystemError::conflict(
                "A pending friend request already exists with this user.",
            ));
        }

        let request = self
            .friend_repo
            .create_friend_request(sender_id, receiver_id)
            .await
            .map_err(|e| {
                if e.violates(PENDING_FRIEND_REQUEST_CONSTRAINT) {
                    error::SystemError::conflict(
                        "A pending friend request already exists with this user.",
                    )
                } else {
                    e
                }
            })?;

        info!("User {} sent friend request {} to user {}", sender_id, request.id, receiver_id);

        Ok(FriendRequestResponse::new(
            request,
            UserResponse::from(sender),
            UserResponse::from(receiver),
        ))
    }

    pub async fn accept_friend_request(
        &self,
        request_id: i64,
        acting_user_id: i64,
    ) -> Result<(), error::SystemError> {
        let request = self.transition(request_id, acting_user_id, FriendRequestStatus::Accepted).await?;
        info!("Users {} and {} are now friends", request.sender_id, request.receiver_id);
        Ok(())
    }

    pub async fn reject_friend_request(
        &self,
        request_id: i64,
        acting_user_id: i64,
    ) -> Result<(), error::SystemError> {
        self.transition(request_id, acting_user_id, FriendRequestStatus::Rejected).await?;
        Ok(())
    }

    pub async fn get_pending_requests(
        &self,
        user_id: i64,
    ) -> Result<Vec<FriendRequestResponse>, error::SystemError> {
        self.friend_repo.find_pending_to_user(user_id).await
    }

    async fn transition(
        &self,
        request_id: i64,
        acting_user_id: i64,
        target: FriendRequestStatus,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        let request = self
            .friend_repo
            .transition_friend_request_atomic(request_id, acting_user_id, target)
            .await?;
        info!("Friend request {} is now {:?}", request.id, request.status);
        Ok(request)
    }
}
