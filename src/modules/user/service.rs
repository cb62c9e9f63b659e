use log::{info, warn};
use std::sync::Arc;
use uuid::Uuid;

use crate::ENV;
use crate::api::error;
use crate::configs::RedisCache;
use crate::constants::{ACCESS_TOKEN_PREFIX, DEFAULT_USERS_PER_PAGE, MAX_PER_PAGE};
use crate::modules::user::model::{
    InsertUser, ListUsersQuery, SignInModel, SignInResponse, SignUpModel, UserFilter, UserPage,
    UserResponse,
};
use crate::modules::user::repository::UserRepository;
use crate::modules::user::schema::UserEntity;
use crate::utils::{Claims, PageMeta, TypeClaims, hash_password, verify_password};

#[derive(Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub access_token_expiration: u64,
    pub email_verification_expiration: u64,
    pub app_url: String,
}

impl AuthSettings {
    pub fn from_env() -> Self {
        AuthSettings {
            jwt_secret: ENV.jwt_secret.clone(),
            access_token_expiration: ENV.access_token_expiration,
            email_verification_expiration: ENV.email_verification_expiration,
            app_url: ENV.app_url.clone(),
        }
    }
}

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository + Send + Sync>,
    cache: Arc<RedisCache>,
    settings: Arc<AuthSettings>,
}

impl UserService {
    pub fn with_dependencies(
        repo: Arc<dyn UserRepository + Send + Sync>,
        cache: Arc<RedisCache>,
        settings: AuthSettings,
    ) -> Self {
        info!("UserService initialized with dependencies");
        UserService { repo, cache, settings: Arc::new(settings) }
    }

    pub async fn sign_up(&self, user: SignUpModel) -> Result<UserResponse, error::SystemError> {
        let hash_password = hash_password(&user.password)?;

        let new_user = InsertUser {
            name: user.name,
            email: user.email.trim().to_lowercase(),
            hash_password,
        };

        let created = self.repo.create(&new_user).await?;
        info!("User {} registered", created.id);

        self.send_verification_link(&created)?;
        Ok(UserResponse::from(created))
    }

    pub async fn sign_in(&self, user: SignInModel) -> Result<SignInResponse, error::SystemError> {
        let user_entity = self
            .repo
            .find_by_email(&user.email)
            .await?
            .ok_or_else(|| error::SystemError::unauthorized("Invalid credentials."))?;

        let valid = verify_password(&user_entity.hash_password, &user.password)?;
        if !valid {
            return Err(error::SystemError::unauthorized("Invalid credentials."));
        }

        if !user_entity.is_active() {
            return Err(error::SystemError::forbidden(
                "Your email address is not verified. Please check your email for a verification link.",
            ));
        }

        let jti = Uuid::new_v7(uuid::Timestamp::now(uuid::NoContext));
        let token = Claims::new(user_entity.id, self.settings.access_token_expiration)
            .with_jti(jti)
            .with_type(TypeClaims::AccessToken)
            .encode(self.settings.jwt_secret.as_bytes())?;

        self.cache
            .set(
                &format!("{ACCESS_TOKEN_PREFIX}{jti}"),
                &user_entity.id,
                self.settings.access_token_expiration,
            )
            .await?;

        Ok(SignInResponse { user: UserResponse::from(user_entity), token })
    }

    pub async fn sign_out(&self, claims: &Claims) -> Result<(), error::SystemError> {
        if let Some(jti) = claims.jti {
            self.cache.delete(&format!("{ACCESS_TOKEN_PREFIX}{jti}")).await?;
            info!("User {} signed out", claims.sub);
        }
        Ok(())
    }

    /// Decodes an access token and checks it has not been revoked.
    pub async fn authenticate(&self, token: &str) -> Result<Claims, error::SystemError> {
        let claims = Claims::decode(token, self.settings.jwt_secret.as_bytes())
            .map_err(|_| error::SystemError::unauthorized("Token Invalid or Expired"))?;

        let jti = match (claims.is(TypeClaims::AccessToken), claims.jti) {
            (true, Some(jti)) => jti,
            _ => return Err(error::SystemError::unauthorized("Token Invalid or Expired")),
        };

        if !self.cache.exists(&format!("{ACCESS_TOKEN_PREFIX}{jti}")).await? {
            return Err(error::SystemError::unauthorized("Token Invalid or Expired"));
        }

        Ok(claims)
    }

    pub async fn ensure_active(&self, id: i64) -> Result<UserEntity, error::SystemError> {
        self.repo
            .find_active_by_id(id)
            .await?
            .ok_or_else(|| error::SystemError::forbidden("Your email address is not verified."))
    }

    pub async fn verify_email(&self, token: &str) -> Result<&'static str, error::SystemError> {
        let invalid = || error::SystemError::forbidden("Invalid verification link.");

        let claims = Claims::decode(token, self.settings.jwt_secret.as_bytes()).map_err(|_| invalid())?;
        if !claims.is(TypeClaims::EmailVerification) {
            return Err(invalid());
        }

        let user = self
            .repo
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| error::SystemError::not_found("User not found"))?;

        if claims.email.as_deref() != Some(user.email.as_str()) {
            warn!("Verification token for user {} does not match current email", user.id);
            return Err(invalid());
        }

        if user.is_active() || !self.repo.mark_email_verified(user.id).await? {
            return Ok("Email already verified.");
        }

        info!("User {} verified their email", user.id);
        Ok("Email verified successfully.")
    }

    pub async fn resend_verification(&self, email: &str) -> Result<&'static str, error::SystemError> {
        let user = self
            .repo
            .find_by_email(email)
            .await?
            .ok_or_else(|| error::SystemError::not_found("User not found"))?;

        if user.is_active() {
            return Ok("Email already verified.");
        }

        self.send_verification_link(&user)?;
        Ok("Verification email sent.")
    }

    pub async fn list_active_users(
        &self,
        query: ListUsersQuery,
    ) -> Result<UserPage, error::SystemError> {
        let page = query.page.unwrap_or(1);
        let per_page = query.per_page.unwrap_or(DEFAULT_USERS_PER_PAGE).clamp(1, MAX_PER_PAGE);
        let filter = UserFilter { name: query.name, email: query.email };

        let (users, total) = self.repo.find_active_users(&filter, page, per_page).await?;

        Ok(UserPage {
            users: users.into_iter().map(UserResponse::from).collect(),
            meta: PageMeta::new(page, per_page, total),
        })
    }

    pub fn verification_token(&self, user: &UserEntity) -> Result<String, error::SystemError> {
        Claims::new(user.id, self.settings.email_verification_expiration)
            .with_email(user.email.clone())
            .with_type(TypeClaims::EmailVerification)
            .encode(self.settings.jwt_secret.as_bytes())
    }

    // Mail delivery lives outside this service; the link is handed to the log.
    fn send_verification_link(&self, user: &UserEntity) -> Result<(), error::SystemError> {
        let token = self.verification_token(user)?;
        info!(
            "Verification link for user {}: {}/api/email/verify?token={}",
            user.id, self.settings.app_url, token
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{InMemoryStore, offline_cache, settings};

    fn service(store: &InMemoryStore) -> UserService {
        UserService::with_dependencies(Arc::new(store.clone()), offline_cache(), settings())
    }

    fn sign_up_model(email: &str) -> SignUpModel {
        SignUpModel {
            name: "Alice".to_string(),
            email: email.to_string(),
            password: "secret-password".to_string(),
            password_confirmation: "secret-password".to_string(),
        }
    }

    #[actix_web::test]
    async fn sign_up_creates_an_inactive_user() {
        let store = InMemoryStore::default();
        let user = service(&store).sign_up(sign_up_model("alice@example.com")).await.unwrap();

        assert_eq!(user.email, "alice@example.com");
        assert!(user.email_verified_at.is_none());
        assert!(store.find_active_by_id(user.id).await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn duplicate_email_is_a_conflict() {
        let store = InMemoryStore::default();
        let svc = service(&store);
        svc.sign_up(sign_up_model("alice@example.com")).await.unwrap();

        let err = svc.sign_up(sign_up_model("alice@example.com")).await.unwrap_err();
        assert!(err.violates("users_email_key"));
    }

    #[actix_web::test]
    async fn emails_differing_only_in_case_belong_to_one_account() {
        let store = InMemoryStore::default();
        let svc = service(&store);
        let user = svc.sign_up(sign_up_model(" Bob@Example.com")).await.unwrap();
        assert_eq!(user.email, "bob@example.com");

        let err = svc.sign_up(sign_up_model("bob@example.com")).await.unwrap_err();
        assert!(err.violates("users_email_key"));

        let found = store.find_by_email("BOB@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
    }

    #[actix_web::test]
    async fn verification_token_activates_the_user_once() {
        let store = InMemoryStore::default();
        let svc = service(&store);
        let user = svc.sign_up(sign_up_model("bob@example.com")).await.unwrap();
        let entity = store.find_by_id(user.id).await.unwrap().unwrap();
        let token = svc.verification_token(&entity).unwrap();

        assert_eq!(svc.verify_email(&token).await.unwrap(), "Email verified successfully.");
        assert_eq!(svc.verify_email(&token).await.unwrap(), "Email already verified.");
        assert!(svc.ensure_active(user.id).await.is_ok());
    }

    #[actix_web::test]
    async fn verification_rejects_foreign_tokens() {
        let store = InMemoryStore::default();
        let svc = service(&store);
        let user = svc.sign_up(sign_up_model("carol@example.com")).await.unwrap();

        let access = Claims::new(user.id, 60)
            .with_type(TypeClaims::AccessToken)
            .encode(settings().jwt_secret.as_bytes())
            .unwrap();

        assert!(matches!(
            svc.verify_email(&access).await,
            Err(error::SystemError::Forbidden(_))
        ));
        assert!(matches!(
            svc.verify_email("not-a-token").await,
            Err(error::SystemError::Forbidden(_))
        ));
    }

    #[actix_web::test]
    async fn unverified_user_cannot_sign_in() {
        let store = InMemoryStore::default();
        let svc = service(&store);
        svc.sign_up(sign_up_model("dave@example.com")).await.unwrap();

        let wrong = svc
            .sign_in(SignInModel {
                email: "dave@example.com".to_string(),
                password: "nope-nope".to_string(),
            })
            .await;
        assert!(matches!(wrong, Err(error::SystemError::Unauthorized(_))));

        let unverified = svc
            .sign_in(SignInModel {
                email: "dave@example.com".to_string(),
                password: "secret-password".to_string(),
            })
            .await;
        assert!(matches!(unverified, Err(error::SystemError::Forbidden(_))));
    }

    #[actix_web::test]
    async fn resend_verification_for_unknown_email_is_not_found() {
        let store = InMemoryStore::default();
        let result = service(&store).resend_verification("ghost@example.com").await;
        assert!(matches!(result, Err(error::SystemError::NotFound(_))));
    }

    #[actix_web::test]
    async fn active_users_are_listed_by_name() {
        let store = InMemoryStore::default();
        store.add_user("Zed", true);
        store.add_user("Amy", true);
        store.add_user("Hidden", false);

        let page = service(&store).list_active_users(ListUsersQuery::default()).await.unwrap();
        let names: Vec<_> = page.users.iter().map(|u| u.name.as_str()).collect();

        assert_eq!(names, vec!["Amy", "Zed"]);
        assert_eq!(page.meta.total, 2);
        assert_eq!(page.meta.per_page, DEFAULT_USERS_PER_PAGE);
    }
}
