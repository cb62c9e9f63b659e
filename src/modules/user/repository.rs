use crate::{
    api::error,
    modules::user::{
        model::{InsertUser, UserFilter},
        schema::UserEntity,
    },
};

#[async_trait::async_trait]
pub trait UserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<UserEntity>, error::SystemError>;

    /// Only users with a verified email address.
    async fn find_active_by_id(&self, id: i64) -> Result<Option<UserEntity>, error::SystemError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, error::SystemError>;

    async fn create(&self, user: &InsertUser) -> Result<UserEntity, error::SystemError>;

    /// Returns false when the address was already verified.
    async fn mark_email_verified(&self, id: i64) -> Result<bool, error::SystemError>;

    async fn find_active_users(
        &self,
        filter: &UserFilter,
        page: u32,
        per_page: u32,
    ) -> Result<(Vec<UserEntity>, i64), error::SystemError>;
}
