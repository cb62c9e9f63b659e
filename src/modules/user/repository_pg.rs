use crate::{
    api::error,
    modules::user::{
        model::{InsertUser, UserFilter},
        repository::UserRepository,
        schema::UserEntity,
    },
    utils::page_offset,
};

#[derive(Clone)]
pub struct UserRepositoryPg {
    pool: sqlx::PgPool,
}

impl UserRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

fn like_pattern(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| format!("%{}%", v.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")))
}

#[async_trait::async_trait]
impl UserRepository for UserRepositoryPg {
    async fn find_by_id(&self, id: i64) -> Result<Option<UserEntity>, error::SystemError> {
        let user = sqlx::query_as::<_, UserEntity>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_active_by_id(&self, id: i64) -> Result<Option<UserEntity>, error::SystemError> {
        let user = sqlx::query_as::<_, UserEntity>(
            "SELECT * FROM users WHERE id = $1 AND email_verified_at IS NOT NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, error::SystemError> {
        let user =
            sqlx::query_as::<_, UserEntity>("SELECT * FROM users WHERE lower(email) = lower($1)")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        Ok(user)
    }

    async fn create(&self, user: &InsertUser) -> Result<UserEntity, error::SystemError> {
        let user = sqlx::query_as::<_, UserEntity>(
            "INSERT INTO users (name, email, hash_password) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.hash_password)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn mark_email_verified(&self, id: i64) -> Result<bool, error::SystemError> {
        let rows = sqlx::query(
            r#"
            UPDATE users
            SET email_verified_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND email_verified_at IS NULL
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows > 0)
    }

    async fn find_active_users(
        &self,
        filter: &UserFilter,
        page: u32,
        per_page: u32,
    ) -> Result<(Vec<UserEntity>, i64), error::SystemError> {
        let name = like_pattern(&filter.name);
        let email = like_pattern(&filter.email);

        let (users, total) = tokio::try_join!(
            sqlx::query_as::<_, UserEntity>(
                r#"
                SELECT * FROM users
                WHERE email_verified_at IS NOT NULL
                AND ($1::text IS NULL OR lower(name) LIKE lower($1))
                AND ($2::text IS NULL OR lower(email) LIKE lower($2))
                ORDER BY name, id
                LIMIT $3 OFFSET $4
                "#,
            )
            .bind(&name)
            .bind(&email)
            .bind(per_page as i64)
            .bind(page_offset(page, per_page))
            .fetch_all(&self.pool),
            sqlx::query_scalar::<_, i64>(
                r#"
                SELECT COUNT(*) FROM users
                WHERE email_verified_at IS NOT NULL
                AND ($1::text IS NULL OR lower(name) LIKE lower($1))
                AND ($2::text IS NULL OR lower(email) LIKE lower($2))
                "#,
            )
            .bind(&name)
            .bind(&email)
            .fetch_one(&self.pool),
        )?;

        Ok((users, total))
    }
}
