use actix_web::{HttpRequest, get, post, web};

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::user::{model, service::UserService},
    utils::{ValidatedJson, ValidatedQuery},
};

#[post("/register")]
pub async fn register(
    user_service: web::Data<UserService>,
    user_data: ValidatedJson<model::SignUpModel>,
) -> Result<success::Success<model::UserResponse>, error::Error> {
    let user = user_service.sign_up(user_data.0).await?;
    Ok(success::Success::created(Some(user))
        .message("Registration successful. Please check your email to verify your account."))
}

#[post("/login")]
pub async fn login(
    user_service: web::Data<UserService>,
    user_data: ValidatedJson<model::SignInModel>,
) -> Result<success::Success<model::SignInResponse>, error::Error> {
    let response = user_service.sign_in(user_data.0).await?;
    Ok(success::Success::ok(Some(response)).message("Login successful."))
}

/// Mounted as a plain resource so it can sit behind authentication inside the public `/auth` scope.
pub async fn logout(
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let claims = get_claims(&req)?;
    user_service.sign_out(&claims).await?;
    Ok(success::Success::ok(None).message("Logout successful."))
}

#[get("/verify")]
pub async fn verify_email(
    user_service: web::Data<UserService>,
    query: ValidatedQuery<model::VerifyEmailQuery>,
) -> Result<success::Success<()>, error::Error> {
    let message = user_service.verify_email(&query.0.token).await?;
    Ok(success::Success::ok(None).message(message))
}

#[post("/resend-verification")]
pub async fn resend_verification(
    user_service: web::Data<UserService>,
    body: ValidatedJson<model::ResendVerificationModel>,
) -> Result<success::Success<()>, error::Error> {
    let message = user_service.resend_verification(&body.0.email).await?;
    Ok(success::Success::ok(None).message(message))
}

#[get("")]
pub async fn list_users(
    user_service: web::Data<UserService>,
    query: ValidatedQuery<model::ListUsersQuery>,
) -> Result<success::Success<model::UserPage>, error::Error> {
    let users = user_service.list_active_users(query.0).await?;
    Ok(success::Success::ok(Some(users)))
}
