use crate::api::error;
use crate::modules::message::model::{InsertMessage, MessageResponse};

#[async_trait::async_trait]
pub trait MessageRepository {
    async fn create(&self, message: &InsertMessage) -> Result<MessageResponse, error::SystemError>;

    /// Both directions of the thread, most recent first, with the total row count.
    async fn find_between_users(
        &self,
        user_a: i64,
        user_b: i64,
        page: u32,
        per_page: u32,
    ) -> Result<(Vec<MessageResponse>, i64), error::SystemError>;
}
