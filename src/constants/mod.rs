pub const DEFAULT_MESSAGES_PER_PAGE: u32 = 20;
pub const DEFAULT_USERS_PER_PAGE: u32 = 15;
pub const MAX_PER_PAGE: u32 = 100;

pub const ACCESS_TOKEN_PREFIX: &str = "access_token:";

pub const PENDING_FRIEND_REQUEST_CONSTRAINT: &str = "friend_requests_pending_pair_key";
pub const FRIENDSHIP_PAIR_CONSTRAINT: &str = "friendships_user_id_friend_id_key";
pub const USER_EMAIL_CONSTRAINT: &str = "users_email_key";

pub struct Env {
    pub jwt_secret: String,
    pub access_token_expiration: u64,
    pub email_verification_expiration: u64,
    pub database_url: String,
    pub db_max_connections: u32,
    pub redis_url: String,
    pub frontend_url: String,
    pub app_url: String,
    pub ip: String,
    pub port: u16,
}

impl Env {
    fn new() -> Self {
        let jwt_secret = std::env::var("SECRET_KEY")
            .expect("SECRET_KEY must be set in .env file or environment variable");

        let access_token_expiration = std::env::var("ACCESS_TOKEN_EXPIRATION")
            .unwrap_or_else(|_| "900".to_string())
            .parse::<u64>()
            .expect("ACCESS_TOKEN_EXPIRATION must be a valid u64 integer");
        let email_verification_expiration = std::env::var("EMAIL_VERIFICATION_EXPIRATION")
            .unwrap_or_else(|_| "3600".to_string())
            .parse::<u64>()
            .expect("EMAIL_VERIFICATION_EXPIRATION must be a valid u64 integer");

        let database_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set in .env file or environment variable");
        let db_max_connections = std::env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()
            .expect("DB_MAX_CONNECTIONS must be a valid u32 integer");
        let redis_url = std::env::var("REDIS_URL")
            .expect("REDIS_URL must be set in .env file or environment variable");

        let frontend_url =
            std::env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5173".to_string());
        let ip = std::env::var("IP").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .expect("PORT must be a valid u16 integer");
        let app_url =
            std::env::var("APP_URL").unwrap_or_else(|_| format!("http://{}:{}", ip, port));
        Env {
            jwt_secret,
            access_token_expiration,
            email_verification_expiration,
            database_url,
            db_max_connections,
            redis_url,
            frontend_url,
            app_url,
            ip,
            port,
        }
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}
