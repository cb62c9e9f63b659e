use crate::{
    api::error,
    modules::{
        friend::{
            model::{FriendRequestResponse, FriendRequestRow},
            policy,
            repository::{FriendRepo, FriendRequestRepository, FriendshipRepository},
            schema::{FriendRequestEntity, FriendRequestStatus, FriendshipEntity},
        },
        user::schema::UserEntity,
    },
};

#[derive(Clone)]
pub struct FriendRepositoryPg {
    pool: sqlx::PgPool,
}

impl FriendRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl FriendshipRepository for FriendRepositoryPg {
    async fn find_friendship(
        &self,
        user_id: i64,
        friend_id: i64,
    ) -> Result<Option<FriendshipEntity>, error::SystemError> {
        let friendship = sqlx::query_as::<_, FriendshipEntity>(
            "SELECT * FROM friendships WHERE user_id = $1 AND friend_id = $2",
        )
        .bind(user_id)
        .bind(friend_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(friendship)
    }

    async fn find_friends(&self, user_id: i64) -> Result<Vec<UserEntity>, error::SystemError> {
        let friends = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT u.*
            FROM friendships f
            JOIN users u
                ON u.id = f.friend_id
            WHERE f.user_id = $1
            ORDER BY u.name, u.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(friends)
    }
}

#[async_trait::async_trait]
impl FriendRequestRepository for FriendRepositoryPg {
    async fn find_pending_between(
        &self,
        user_a: i64,
        user_b: i64,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        let request = sqlx::query_as::<_, FriendRequestEntity>(
            r#"
            SELECT *
            FROM friend_requests
            WHERE status = 'pending'
            AND (
                (sender_id = $1 AND receiver_id = $2)
                OR (sender_id = $2 AND receiver_id = $1)
            )
            LIMIT 1
            "#,
        )
        .bind(user_a)
        .bind(user_b)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    async fn find_pending_to_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<FriendRequestResponse>, error::SystemError> {
        let rows = sqlx::query_as::<_, FriendRequestRow>(
            r#"
            SELECT
                fr.id,
                fr.status,
                fr.created_at,
                fr.updated_at,
                s.id AS sender_id,
                s.name AS sender_name,
                s.email AS sender_email,
                s.email_verified_at AS sender_email_verified_at,
                s.created_at AS sender_created_at,
                r.id AS receiver_id,
                r.name AS receiver_name,
                r.email AS receiver_email,
                r.email_verified_at AS receiver_email_verified_at,
                r.created_at AS receiver_created_at
            FROM friend_requests fr
            JOIN users s
                ON s.id = fr.sender_id
            JOIN users r
                ON r.id = fr.receiver_id
            WHERE fr.receiver_id = $1
            AND fr.status = 'pending'
            ORDER BY fr.created_at DESC, fr.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(FriendRequestResponse::from).collect())
    }

    async fn create_friend_request(
        &self,
        sender_id: i64,
        receiver_id: i64,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        // friend_requests_pending_pair_key rejects a concurrent duplicate with 23505
        let request = sqlx::query_as::<_, FriendRequestEntity>(
            r#"
            INSERT INTO friend_requests (sender_id, receiver_id, status)
            VALUES ($1, $2, 'pending')
            RETURNING *
            "#,
        )
        .bind(sender_id)
        .bind(receiver_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(request)
    }
}

#[async_trait::async_trait]
impl FriendRepo for FriendRepositoryPg {
    async fn transition_friend_request_atomic(
        &self,
        request_id: i64,
        acting_user_id: i64,
        target: FriendRequestStatus,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        let mut tx = self.pool.begin().await?;

        let request = sqlx::query_as::<_, FriendRequestEntity>(
            "SELECT * FROM friend_requests WHERE id = $1 FOR UPDATE",
        )
        .bind(request_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| error::SystemError::not_found("Friend request not found"))?;

        if let Err(e) = policy::ensure_transition(acting_user_id, &request, target) {
            tx.rollback().await?;
            return Err(e);
        }

        let updated = sqlx::query_as::<_, FriendRequestEntity>(
            r#"
            UPDATE friend_requests
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(request_id)
        .bind(target)
        .fetch_one(&mut *tx)
        .await?;

        if target == FriendRequestStatus::Accepted {
            sqlx::query(
                r#"
                INSERT INTO friendships (user_id, friend_id)
                VALUES ($1, $2), ($2, $1)
                "#,
            )
            .bind(request.sender_id)
            .bind(request.receiver_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(updated)
    }
}
