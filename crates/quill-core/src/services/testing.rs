//! In-process fakes for the ports, shared by the service tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::domain::{AuthEvent, AuthUser, NewPost, Post, PostChanges, PostId, Session};
use crate::error::{StoreError, StoreErrorCode};
use crate::ports::{AuthBackend, AuthError, PostStore};

#[derive(Default)]
pub struct FakePostStore {
    rows: Mutex<Vec<Post>>,
    next_error: Mutex<Option<StoreError>>,
    pub mutation_calls: AtomicUsize,
}

impl FakePostStore {
    pub fn sample_post(id: PostId, owner: Uuid, slug: &str) -> Post {
        let at = Utc::now() - TimeDelta::seconds(1000 - id);
        Post {
            id,
            title: format!("Post {id}"),
            slug: slug.to_string(),
            content: "Body".to_string(),
            cover_url: String::new(),
            user_id: owner,
            created_at: at,
            updated_at: at,
        }
    }

    pub fn with_posts(posts: Vec<Post>) -> Self {
        Self {
            rows: Mutex::new(posts),
            ..Default::default()
        }
    }

    pub fn fail_next_with(&self, err: StoreError) {
        *self.next_error.lock().unwrap() = Some(err);
    }

    pub fn fail_next_with_transport(&self) {
        self.fail_next_with(StoreError::Transport("connection reset".to_string()));
    }

    pub fn snapshot(&self, id: PostId) -> Option<Post> {
        self.rows.lock().unwrap().iter().find(|p| p.id == id).cloned()
    }

    fn take_error(&self) -> Result<(), StoreError> {
        match self.next_error.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PostStore for FakePostStore {
    async fn insert(&self, post: NewPost) -> Result<Post, StoreError> {
        self.mutation_calls.fetch_add(1, Ordering::SeqCst);
        self.take_error()?;
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|p| p.slug == post.slug.as_str()) {
            return Err(StoreError::rejected(
                StoreErrorCode::UniqueViolation,
                "duplicate key value violates unique constraint \"posts_slug_key\"",
            ));
        }
        let id = rows.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        let stored = Post {
            id,
            title: post.title,
            slug: post.slug.into_inner(),
            content: post.content,
            cover_url: post.cover_url,
            user_id: post.user_id,
            created_at: post.created_at,
            updated_at: post.updated_at,
        };
        rows.push(stored.clone());
        Ok(stored)
    }

    async fn update_owned(
        &self,
        id: PostId,
        owner: Uuid,
        changes: PostChanges,
    ) -> Result<Option<Post>, StoreError> {
        self.mutation_calls.fetch_add(1, Ordering::SeqCst);
        self.take_error()?;
        let mut rows = self.rows.lock().unwrap();
        if let Some(slug) = &changes.slug {
            if rows
                .iter()
                .any(|p| p.slug == slug.as_str() && p.id != id)
            {
                return Err(StoreError::rejected(
                    StoreErrorCode::UniqueViolation,
                    "duplicate key value violates unique constraint \"posts_slug_key\"",
                ));
            }
        }
        Ok(rows
            .iter_mut()
            .find(|p| p.id == id && p.user_id == owner)
            .map(|post| {
                changes.apply_to(post);
                post.clone()
            }))
    }

    async fn delete_owned(&self, id: PostId, owner: Uuid) -> Result<u64, StoreError> {
        self.mutation_calls.fetch_add(1, Ordering::SeqCst);
        self.take_error()?;
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|p| !(p.id == id && p.user_id == owner));
        Ok((before - rows.len()) as u64)
    }

    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, StoreError> {
        self.take_error()?;
        Ok(self.snapshot(id))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, StoreError> {
        self.take_error()?;
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.slug == slug)
            .cloned())
    }

    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<Post>, StoreError> {
        let mut posts = self.list_all().await?;
        posts.retain(|p| p.user_id == owner);
        Ok(posts)
    }

    async fn list_all(&self) -> Result<Vec<Post>, StoreError> {
        self.take_error()?;
        let mut posts = self.rows.lock().unwrap().clone();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }
}

pub struct FakeAuth {
    passwords: HashMap<String, (Uuid, String)>,
    sessions: Mutex<HashMap<String, Session>>,
    rate_limit_next: AtomicBool,
    pub sign_in_calls: AtomicUsize,
    pub signed_out: Mutex<Vec<String>>,
    events: broadcast::Sender<AuthEvent>,
}

impl FakeAuth {
    pub fn with_accounts(accounts: &[(&str, &str)]) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            passwords: accounts
                .iter()
                .map(|(email, password)| {
                    (email.to_string(), (Uuid::new_v4(), password.to_string()))
                })
                .collect(),
            sessions: Mutex::new(HashMap::new()),
            rate_limit_next: AtomicBool::new(false),
            sign_in_calls: AtomicUsize::new(0),
            signed_out: Mutex::new(Vec::new()),
            events,
        }
    }

    /// The next sign-in or sign-up is rejected as rate limited.
    pub fn rate_limit_next_call(&self) {
        self.rate_limit_next.store(true, Ordering::SeqCst);
    }

    /// Open a session without going through `sign_in`.
    pub fn open_session(&self, email: &str) -> Session {
        let session = Session {
            id: Uuid::new_v4(),
            user_id: self
                .passwords
                .get(email)
                .map(|(id, _)| *id)
                .unwrap_or_else(Uuid::new_v4),
            email: email.to_string(),
            access_token: format!("token-{}", Uuid::new_v4()),
            expires_at: Utc::now() + TimeDelta::hours(1),
        };
        self.sessions
            .lock()
            .unwrap()
            .insert(session.access_token.clone(), session.clone());
        session
    }

    pub fn emit(&self, event: AuthEvent) {
        let _ = self.events.send(event);
    }

    pub fn is_live(&self, token: &str) -> bool {
        self.sessions.lock().unwrap().contains_key(token)
    }
}

#[async_trait]
impl AuthBackend for FakeAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        self.sign_in_calls.fetch_add(1, Ordering::SeqCst);
        if self.rate_limit_next.swap(false, Ordering::SeqCst) {
            return Err(AuthError::RateLimited {
                retry_after: Duration::from_secs(60),
            });
        }
        match self.passwords.get(email) {
            Some((_, expected)) if expected == password => Ok(self.open_session(email)),
            _ => Err(AuthError::InvalidCredentials),
        }
    }

    async fn sign_up(&self, email: &str, _password: &str) -> Result<AuthUser, AuthError> {
        if self.rate_limit_next.swap(false, Ordering::SeqCst) {
            return Err(AuthError::RateLimited {
                retry_after: Duration::from_secs(60),
            });
        }
        if self.passwords.contains_key(email) {
            return Err(AuthError::AlreadyRegistered);
        }
        Ok(AuthUser {
            id: Uuid::new_v4(),
            email: email.to_string(),
        })
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        self.sessions.lock().unwrap().remove(access_token);
        self.signed_out
            .lock()
            .unwrap()
            .push(access_token.to_string());
        Ok(())
    }

    async fn get_session(&self, access_token: &str) -> Result<Option<Session>, AuthError> {
        Ok(self.sessions.lock().unwrap().get(access_token).cloned())
    }

    async fn get_user(&self, access_token: &str) -> Result<Option<AuthUser>, AuthError> {
        Ok(self.get_session(access_token).await?.map(|s| s.user()))
    }

    async fn refresh_session(&self, access_token: &str) -> Result<Session, AuthError> {
        self.get_session(access_token)
            .await?
            .ok_or(AuthError::SessionExpired)
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}
