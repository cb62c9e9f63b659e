use crate::{
    api::error,
    modules::message::{
        model::{InsertMessage, MessageResponse, MessageRow},
        repository::MessageRepository,
    },
    utils::page_offset,
};

#[derive(Clone)]
pub struct MessageRepositoryPg {
    pool: sqlx::PgPool,
}

impl MessageRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl MessageRepository for MessageRepositoryPg {
    async fn create(&self, message: &InsertMessage) -> Result<MessageResponse, error::SystemError> {
        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            WITH m AS (
                INSERT INTO messages (sender_id, receiver_id, message)
                VALUES ($1, $2, $3)
                RETURNING *
            )
            SELECT
                m.*,
                s.name AS sender_name,
                s.email AS sender_email,
                s.email_verified_at AS sender_email_verified_at,
                s.created_at AS sender_created_at,
                r.name AS receiver_name,
                r.email AS receiver_email,
                r.email_verified_at AS receiver_email_verified_at,
                r.created_at AS receiver_created_at
            FROM m
            JOIN users s
                ON s.id = m.sender_id
            JOIN users r
                ON r.id = m.receiver_id
            "#,
        )
        .bind(message.sender_id)
        .bind(message.receiver_id)
        .bind(&message.message)
        .fetch_one(&self.pool)
        .await?;

        Ok(MessageResponse::from(row))
    }

    async fn find_between_users(
        &self,
        user_a: i64,
        user_b: i64,
        page: u32,
        per_page: u32,
    ) -> Result<(Vec<MessageResponse>, i64), error::SystemError> {
        // index on (sender_id, receiver_id, created_at DESC) serves both branches
        let (rows, total) = tokio::try_join!(
            sqlx::query_as::<_, MessageRow>(
                r#"
                SELECT
                    m.*,
                    s.name AS sender_name,
                    s.email AS sender_email,
                    s.email_verified_at AS sender_email_verified_at,
                    s.created_at AS sender_created_at,
                    r.name AS receiver_name,
                    r.email AS receiver_email,
                    r.email_verified_at AS receiver_email_verified_at,
                    r.created_at AS receiver_created_at
                FROM messages m
                JOIN users s
                    ON s.id = m.sender_id
                JOIN users r
                    ON r.id = m.receiver_id
                WHERE (m.sender_id = $1 AND m.receiver_id = $2)
                   OR (m.sender_id = $2 AND m.receiver_id = $1)
                ORDER BY m.created_at DESC, m.id DESC
                LIMIT $3 OFFSET $4
                "#,
            )
            .bind(user_a)
            .bind(user_b)
            .bind(per_page as i64)
            .bind(page_offset(page, per_page))
            .fetch_all(&self.pool),
            sqlx::query_scalar::<_, i64>(
                r#"
                SELECT COUNT(*)
                FROM messages
                WHERE (sender_id = $1 AND receiver_id = $2)
                   OR (sender_id = $2 AND receiver_id = $1)
                "#,
            )
            .bind(user_a)
            .bind(user_b)
            .fetch_one(&self.pool),
        )?;

        Ok((rows.into_iter().map(MessageResponse::from).collect(), total))
    }
}
