//! In-memory repositories for service tests. One mutex guards the whole
//! store, so a transition holds it for its full read-check-write sequence
//! the same way the row lock does in Postgres.
use std::sync::{Arc, Mutex, MutexGuard};

use crate::{
    api::error,
    configs::RedisCache,
    constants::{FRIENDSHIP_PAIR_CONSTRAINT, PENDING_FRIEND_REQUEST_CONSTRAINT, USER_EMAIL_CONSTRAINT},
    modules::{
        friend::{
            model::FriendRequestResponse,
            policy,
            repository::{FriendRepo, FriendRequestRepository, FriendshipRepository},
            schema::{FriendRequestEntity, FriendRequestStatus, FriendshipEntity},
        },
        message::{
            model::{InsertMessage, MessageResponse},
            repository::MessageRepository,
            schema::MessageEntity,
        },
        user::{
            model::{InsertUser, UserFilter, UserResponse},
            repository::UserRepository,
            schema::UserEntity,
        },
        user::service::AuthSettings,
    },
};

type Timestamp = chrono::DateTime<chrono::Utc>;

#[derive(Default)]
struct State {
    users: Vec<UserEntity>,
    requests: Vec<FriendRequestEntity>,
    friendships: Vec<FriendshipEntity>,
    messages: Vec<MessageEntity>,
    clock: i64,
}

impl State {
    // Every write gets a distinct, increasing timestamp.
    fn tick(&mut self) -> Timestamp {
        self.clock += 1;
        chrono::DateTime::from_timestamp(1_700_000_000 + self.clock, 0).unwrap_or_default()
    }

    fn user(&self, id: i64) -> Option<&UserEntity> {
        self.users.iter().find(|u| u.id == id)
    }

    fn pending_between(&self, a: i64, b: i64) -> Option<&FriendRequestEntity> {
        self.requests.iter().find(|r| {
            r.status.is_pending()
                && ((r.sender_id == a && r.receiver_id == b)
                    || (r.sender_id == b && r.receiver_id == a))
        })
    }

    fn has_friendship(&self, user_id: i64, friend_id: i64) -> bool {
        self.friendships.iter().any(|f| f.user_id == user_id && f.friend_id == friend_id)
    }

    fn message_response(&self, message: &MessageEntity) -> Option<MessageResponse> {
        let sender = UserResponse::from(self.user(message.sender_id)?.clone());
        let receiver = UserResponse::from(self.user(message.receiver_id)?.clone());
        Some(MessageResponse::new(message.clone(), sender, receiver))
    }

    fn insert_friendship(&mut self, user_id: i64, friend_id: i64) {
        let created_at = self.tick();
        let id = self.friendships.len() as i64 + 1;
        self.friendships.push(FriendshipEntity { id, user_id, friend_id, created_at });
    }
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn add_user(&self, name: &str, active: bool) -> i64 {
        let mut state = self.lock();
        let now = state.tick();
        let id = state.users.len() as i64 + 1;
        state.users.push(UserEntity {
            id,
            name: name.to_string(),
            email: format!("{}-{}@example.com", name.to_lowercase(), id),
            hash_password: String::new(),
            email_verified_at: active.then_some(now),
            created_at: now,
            updated_at: now,
        });
        id
    }

    pub fn befriend(&self, a: i64, b: i64) {
        let mut state = self.lock();
        state.insert_friendship(a, b);
        state.insert_friendship(b, a);
    }

    pub fn pending_count_between(&self, a: i64, b: i64) -> usize {
        let state = self.lock();
        state
            .requests
            .iter()
            .filter(|r| {
                r.status.is_pending()
                    && ((r.sender_id == a && r.receiver_id == b)
                        || (r.sender_id == b && r.receiver_id == a))
            })
            .count()
    }

    pub fn friendship_rows_between(&self, a: i64, b: i64) -> usize {
        let state = self.lock();
        state
            .friendships
            .iter()
            .filter(|f| (f.user_id == a && f.friend_id == b) || (f.user_id == b && f.friend_id == a))
            .count()
    }

    pub fn request_status(&self, request_id: i64) -> Option<FriendRequestStatus> {
        self.lock().requests.iter().find(|r| r.id == request_id).map(|r| r.status)
    }

    pub fn message_count(&self) -> usize {
        self.lock().messages.len()
    }
}

pub fn settings() -> AuthSettings {
    AuthSettings {
        jwt_secret: "test-secret".to_string(),
        access_token_expiration: 900,
        email_verification_expiration: 3600,
        app_url: "http://localhost:8080".to_string(),
    }
}

/// A pool that is never connected; fine for code paths that skip redis.
pub fn offline_cache() -> Arc<RedisCache> {
    Arc::new(RedisCache::from_url("redis://127.0.0.1:1").expect("valid redis url"))
}

fn page_slice<T: Clone>(items: &[T], page: u32, per_page: u32) -> Vec<T> {
    let start = (page.max(1) as usize - 1) * per_page as usize;
    items.iter().skip(start).take(per_page as usize).cloned().collect()
}

#[async_trait::async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<UserEntity>, error::SystemError> {
        Ok(self.lock().user(id).cloned())
    }

    async fn find_active_by_id(&self, id: i64) -> Result<Option<UserEntity>, error::SystemError> {
        Ok(self.lock().user(id).filter(|u| u.is_active()).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, error::SystemError> {
        Ok(self.lock().users.iter().find(|u| u.email.eq_ignore_ascii_case(email)).cloned())
    }

    async fn create(&self, user: &InsertUser) -> Result<UserEntity, error::SystemError> {
        let mut state = self.lock();
        if state.users.iter().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(error::SystemError::unique_violation(USER_EMAIL_CONSTRAINT));
        }
        let now = state.tick();
        let entity = UserEntity {
            id: state.users.len() as i64 + 1,
            name: user.name.clone(),
            email: user.email.clone(),
            hash_password: user.hash_password.clone(),
            email_verified_at: None,
            created_at: now,
            updated_at: now,
        };
        state.users.push(entity.clone());
        Ok(entity)
    }

    async fn mark_email_verified(&self, id: i64) -> Result<bool, error::SystemError> {
        let mut state = self.lock();
        let now = state.tick();
        match state.users.iter_mut().find(|u| u.id == id && u.email_verified_at.is_none()) {
            Some(user) => {
                user.email_verified_at = Some(now);
                user.updated_at = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_active_users(
        &self,
        filter: &UserFilter,
        page: u32,
        per_page: u32,
    ) -> Result<(Vec<UserEntity>, i64), error::SystemError> {
        let contains = |value: &str, needle: &Option<String>| {
            needle.as_ref().map_or(true, |n| value.to_lowercase().contains(&n.to_lowercase()))
        };

        let mut users: Vec<UserEntity> = self
            .lock()
            .users
            .iter()
            .filter(|u| u.is_active())
            .filter(|u| contains(&u.name, &filter.name) && contains(&u.email, &filter.email))
            .cloned()
            .collect();
        users.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        let total = users.len() as i64;
        Ok((page_slice(&users, page, per_page), total))
    }
}

#[async_trait::async_trait]
impl FriendshipRepository for InMemoryStore {
    async fn find_friendship(
        &self,
        user_id: i64,
        friend_id: i64,
    ) -> Result<Option<FriendshipEntity>, error::SystemError> {
        Ok(self
            .lock()
            .friendships
            .iter()
            .find(|f| f.user_id == user_id && f.friend_id == friend_id)
            .cloned())
    }

    async fn find_friends(&self, user_id: i64) -> Result<Vec<UserEntity>, error::SystemError> {
        let state = self.lock();
        let mut friends: Vec<UserEntity> = state
            .friendships
            .iter()
            .filter(|f| f.user_id == user_id)
            .filter_map(|f| state.user(f.friend_id).cloned())
            .collect();
        friends.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(friends)
    }
}

#[async_trait::async_trait]
impl FriendRequestRepository for InMemoryStore {
    async fn find_pending_between(
        &self,
        user_a: i64,
        user_b: i64,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        Ok(self.lock().pending_between(user_a, user_b).cloned())
    }

    async fn find_pending_to_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<FriendRequestResponse>, error::SystemError> {
        let state = self.lock();
        let mut pending: Vec<&FriendRequestEntity> = state
            .requests
            .iter()
            .filter(|r| r.receiver_id == user_id && r.status.is_pending())
            .collect();
        pending.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(pending
            .into_iter()
            .filter_map(|r| {
                let sender = state.user(r.sender_id)?.clone();
                let receiver = state.user(r.receiver_id)?.clone();
                Some(FriendRequestResponse::new(
                    r.clone(),
                    UserResponse::from(sender),
                    UserResponse::from(receiver),
                ))
            })
            .collect())
    }

    async fn create_friend_request(
        &self,
        sender_id: i64,
        receiver_id: i64,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        let mut state = self.lock();
        if sender_id == receiver_id {
            return Err(error::SystemError::unprocessable("The given data was invalid."));
        }
        if state.pending_between(sender_id, receiver_id).is_some() {
            return Err(error::SystemError::unique_violation(PENDING_FRIEND_REQUEST_CONSTRAINT));
        }

        let now = state.tick();
        let request = FriendRequestEntity {
            id: state.requests.len() as i64 + 1,
            sender_id,
            receiver_id,
            status: FriendRequestStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        state.requests.push(request.clone());
        Ok(request)
    }
}

#[async_trait::async_trait]
impl FriendRepo for InMemoryStore {
    async fn transition_friend_request_atomic(
        &self,
        request_id: i64,
        acting_user_id: i64,
        target: FriendRequestStatus,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        let mut state = self.lock();

        let request = state
            .requests
            .iter()
            .find(|r| r.id == request_id)
            .cloned()
            .ok_or_else(|| error::SystemError::not_found("Friend request not found"))?;

        policy::ensure_transition(acting_user_id, &request, target)?;

        if target == FriendRequestStatus::Accepted {
            if state.has_friendship(request.sender_id, request.receiver_id)
                || state.has_friendship(request.receiver_id, request.sender_id)
            {
                return Err(error::SystemError::unique_violation(FRIENDSHIP_PAIR_CONSTRAINT));
            }
            state.insert_friendship(request.sender_id, request.receiver_id);
            state.insert_friendship(request.receiver_id, request.sender_id);
        }

        let now = state.tick();
        let stored = state
            .requests
            .iter_mut()
            .find(|r| r.id == request_id)
            .ok_or_else(|| error::SystemError::not_found("Friend request not found"))?;
        stored.status = target;
        stored.updated_at = now;

        Ok(stored.clone())
    }
}

#[async_trait::async_trait]
impl MessageRepository for InMemoryStore {
    async fn create(&self, message: &InsertMessage) -> Result<MessageResponse, error::SystemError> {
        let mut state = self.lock();
        let now = state.tick();
        let entity = MessageEntity {
            id: state.messages.len() as i64 + 1,
            sender_id: message.sender_id,
            receiver_id: message.receiver_id,
            message: message.message.clone(),
            read_at: None,
            created_at: now,
            updated_at: now,
        };
        let response = state
            .message_response(&entity)
            .ok_or_else(|| error::SystemError::not_found("Related resource not found"))?;
        state.messages.push(entity);
        Ok(response)
    }

    async fn find_between_users(
        &self,
        user_a: i64,
        user_b: i64,
        page: u32,
        per_page: u32,
    ) -> Result<(Vec<MessageResponse>, i64), error::SystemError> {
        let state = self.lock();
        let mut thread: Vec<&MessageEntity> = state
            .messages
            .iter()
            .filter(|m| {
                (m.sender_id == user_a && m.receiver_id == user_b)
                    || (m.sender_id == user_b && m.receiver_id == user_a)
            })
            .collect();
        thread.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = thread.len() as i64;
        let messages = page_slice(&thread, page, per_page)
            .into_iter()
            .filter_map(|m| state.message_response(m))
            .collect();
        Ok((messages, total))
    }
}
