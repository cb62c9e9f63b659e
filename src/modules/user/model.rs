use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::modules::user::schema::UserEntity;
use crate::utils::PageMeta;

#[derive(Deserialize, Validate)]
pub struct SignUpModel {
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    pub name: String,
    #[validate(
        email(message = "Invalid email format"),
        length(max = 255, message = "Email must not exceed 255 characters")
    )]
    pub email: String,
    #[validate(length(min = 8, max = 255, message = "Password must be at least 8 characters long"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Password confirmation does not match"))]
    pub password_confirmation: String,
}

#[derive(Deserialize, Validate)]
pub struct SignInModel {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password cannot be empty"))]
    pub password: String,
}

#[derive(Deserialize, Validate)]
pub struct ResendVerificationModel {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

#[derive(Deserialize, Validate)]
pub struct VerifyEmailQuery {
    #[validate(length(min = 1, message = "Verification token cannot be empty"))]
    pub token: String,
}

#[derive(Deserialize, Validate, Default)]
pub struct ListUsersQuery {
    #[validate(length(max = 255))]
    pub name: Option<String>,
    #[validate(length(max = 255))]
    pub email: Option<String>,
    #[validate(range(min = 1, message = "Page must be at least 1"))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 100, message = "Per page must be between 1 and 100"))]
    pub per_page: Option<u32>,
}

pub struct InsertUser {
    pub name: String,
    pub email: String,
    pub hash_password: String,
}

#[derive(Debug, Default)]
pub struct UserFilter {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub email_verified_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<UserEntity> for UserResponse {
    fn from(entity: UserEntity) -> Self {
        UserResponse {
            id: entity.id,
            name: entity.name,
            email: entity.email,
            email_verified_at: entity.email_verified_at,
            created_at: entity.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct SignInResponse {
    pub user: UserResponse,
    pub token: String,
}

#[derive(Serialize)]
pub struct UserPage {
    pub users: Vec<UserResponse>,
    pub meta: PageMeta,
}
