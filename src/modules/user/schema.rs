use sqlx::prelude::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub hash_password: String,
    pub email_verified_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl UserEntity {
    /// A user is active once their email address has been verified.
    pub fn is_active(&self) -> bool {
        self.email_verified_at.is_some()
    }
}
