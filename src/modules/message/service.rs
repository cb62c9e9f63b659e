/// Message Service
///
/// Direct messages between friends. Every send and every history read is
/// gated on the friendship row `(user, other)`; there is no other
/// authorization path for messages.
use log::info;
use std::sync::Arc;

use crate::api::error;
use crate::constants::{DEFAULT_MESSAGES_PER_PAGE, MAX_PER_PAGE};
use crate::modules::friend::repository::FriendshipRepository;
use crate::modules::message::model::{
    InsertMessage, ListMessagesQuery, MessagePage, MessageResponse,
};
use crate::modules::message::repository::MessageRepository;
use crate::utils::PageMeta;

#[derive(Clone)]
pub struct MessageService<M, F>
where
    M: MessageRepository + Send + Sync,
    F: FriendshipRepository + Send + Sync,
{
    message_repo: Arc<M>,
    friend_repo: Arc<F>,
}

impl<M, F> MessageService<M, F>
where
    M: MessageRepository + Send + Sync,
    F: FriendshipRepository + Send + Sync,
{
    pub fn with_dependencies(message_repo: Arc<M>, friend_repo: Arc<F>) -> Self {
        MessageService { message_repo, friend_repo }
    }

    /// A user is never their own friend, so messaging yourself fails here too.
    async fn ensure_friends(
        &self,
        user_id: i64,
        other_id: i64,
        denied: &'static str,
    ) -> Result<(), error::SystemError> {
        if self.friend_repo.find_friendship(user_id, other_id).await?.is_none() {
            return Err(error::SystemError::forbidden(denied));
        }
        Ok(())
    }

    pub async fn send_message(
        &self,
        sender_id: i64,
        receiver_id: i64,
        text: String,
    ) -> Result<MessageResponse, error::SystemError> {
        self.ensure_friends(sender_id, receiver_id, "You can only send messages to your friends.")
            .await?;

        let message = self
            .message_repo
            .create(&InsertMessage { sender_id, receiver_id, message: text })
            .await?;

        info!("User {} sent message {} to user {}", sender_id, message.id, receiver_id);
        Ok(message)
    }

    pub async fn list_conversation(
        &self,
        user_id: i64,
        friend_id: i64,
        query: ListMessagesQuery,
    ) -> Result<MessagePage, error::SystemError> {
        self.ensure_friends(user_id, friend_id, "You can only view messages with your friends.")
            .await?;

        let page = query.page.unwrap_or(1);
        let per_page = query.per_page.unwrap_or(DEFAULT_MESSAGES_PER_PAGE).clamp(1, MAX_PER_PAGE);

        let (messages, total) =
            self.message_repo.find_between_users(user_id, friend_id, page, per_page).await?;

        Ok(MessagePage { messages, meta: PageMeta::new(page, per_page, total) })
    }
}
