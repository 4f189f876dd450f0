//! Identity provider: sign-in, current-session lookup, sign-out, and a
//! broadcast of every auth transition.

use crate::config::{AuthConfig, UserAccount};
use crate::error::{Result, SlotError};
use crate::types::{SessionToken, UserId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::future::Future;
use tokio::sync::{broadcast, RwLock};

/// Capacity of the auth-event channel. Slow receivers see `Lagged` and must
/// re-resolve.
const EVENT_CAPACITY: usize = 64;

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    #[serde(skip)]
    pub token: SessionToken,
    pub user_id: UserId,
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Whole seconds until expiry, for the cookie `Max-Age`.
    pub fn seconds_left(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds().max(0)
    }

    pub fn max_age(&self) -> i64 {
        self.seconds_left(Utc::now())
    }
}

/// One auth transition. `session` is `None` when the token stopped being
/// valid (sign-out or expiry).
#[derive(Debug, Clone)]
pub struct AuthEvent {
    pub token: SessionToken,
    pub session: Option<Session>,
}

// ---------------------------------------------------------------------------
// SessionStore
// ---------------------------------------------------------------------------

pub trait SessionStore: Send + Sync + 'static {
    fn sign_in(
        &self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<Session>> + Send;

    /// The live session for `token`, or `None` if it never existed, was
    /// signed out, or expired.
    fn current(&self, token: &SessionToken)
        -> impl Future<Output = Result<Option<Session>>> + Send;

    /// Best-effort; signing out an unknown token is not an error.
    fn sign_out(&self, token: &SessionToken) -> impl Future<Output = Result<()>> + Send;

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}

pub fn hash_password(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

// ---------------------------------------------------------------------------
// MemorySessionStore
// ---------------------------------------------------------------------------

/// In-process identity provider backed by the accounts in `slotdesk.yaml`.
pub struct MemorySessionStore {
    accounts: Vec<UserAccount>,
    ttl: chrono::Duration,
    sessions: RwLock<HashMap<SessionToken, Session>>,
    events: broadcast::Sender<AuthEvent>,
}

impl MemorySessionStore {
    pub fn new(accounts: Vec<UserAccount>, ttl: chrono::Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            accounts,
            ttl,
            sessions: RwLock::new(HashMap::new()),
            events,
        }
    }

    pub fn from_config(auth: &AuthConfig) -> Result<Self> {
        Ok(Self::new(auth.users.clone(), auth.session_ttl()?))
    }

    fn emit(&self, token: SessionToken, session: Option<Session>) {
        // No receivers is fine: nobody is listening yet.
        let _ = self.events.send(AuthEvent { token, session });
    }

    /// Drop every expired session and announce each one. Returns how many
    /// were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let expired: Vec<SessionToken> = {
            let mut sessions = self.sessions.write().await;
            let tokens: Vec<SessionToken> = sessions
                .iter()
                .filter(|(_, s)| s.is_expired(now))
                .map(|(t, _)| t.clone())
                .collect();
            for t in &tokens {
                sessions.remove(t);
            }
            tokens
        };
        for token in &expired {
            tracing::debug!(?token, "session expired");
            self.emit(token.clone(), None);
        }
        expired.len()
    }

    pub async fn active_sessions(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl SessionStore for MemorySessionStore {
    async fn sign_in(&self, username: &str, password: &str) -> Result<Session> {
        let hash = hash_password(password);
        let account = self
            .accounts
            .iter()
            .find(|a| a.username == username && a.password_sha256 == hash)
            .ok_or(SlotError::InvalidCredentials)?;

        let expires_at = Utc::now()
            .checked_add_signed(self.ttl)
            .ok_or_else(|| SlotError::Session("session expiry is out of range".to_string()))?;
        let session = Session {
            token: SessionToken::generate(),
            user_id: account.user_id.clone(),
            username: account.username.clone(),
            expires_at,
        };
        self.sessions
            .write()
            .await
            .insert(session.token.clone(), session.clone());
        tracing::info!(username = %session.username, "signed in");
        self.emit(session.token.clone(), Some(session.clone()));
        Ok(session)
    }

    async fn current(&self, token: &SessionToken) -> Result<Option<Session>> {
        let found = self.sessions.read().await.get(token).cloned();
        match found {
            Some(s) if s.is_expired(Utc::now()) => {
                self.sessions.write().await.remove(token);
                self.emit(token.clone(), None);
                Ok(None)
            }
            other => Ok(other),
        }
    }

    async fn sign_out(&self, token: &SessionToken) -> Result<()> {
        let removed = self.sessions.write().await.remove(token);
        if let Some(session) = removed {
            tracing::info!(username = %session.username, "signed out");
            self.emit(token.clone(), None);
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn store_with(username: &str, password: &str) -> MemorySessionStore {
        let account = UserAccount {
            username: username.to_string(),
            user_id: UserId::new(format!("id-{username}")),
            password_sha256: hash_password(password),
        };
        MemorySessionStore::new(vec![account], chrono::Duration::minutes(30))
    }

    #[test]
    fn hash_password_is_sha256_hex() {
        assert_eq!(
            hash_password("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[tokio::test]
    async fn sign_in_with_good_password() {
        let store = store_with("ada", "pw");
        let session = store.sign_in("ada", "pw").await.unwrap();
        assert_eq!(session.user_id, UserId::new("id-ada"));
        let current = store.current(&session.token).await.unwrap();
        assert_eq!(current, Some(session));
    }

    #[tokio::test]
    async fn sign_in_with_bad_password_fails() {
        let store = store_with("ada", "pw");
        assert!(matches!(
            store.sign_in("ada", "wrong").await,
            Err(SlotError::InvalidCredentials)
        ));
        assert!(matches!(
            store.sign_in("nobody", "pw").await,
            Err(SlotError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn sign_out_emits_event_and_clears_session() {
        let store = store_with("ada", "pw");
        let session = store.sign_in("ada", "pw").await.unwrap();
        let mut rx = store.subscribe();

        store.sign_out(&session.token).await.unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.token, session.token);
        assert!(event.session.is_none());
        assert_eq!(store.current(&session.token).await.unwrap(), None);
    }

    #[tokio::test]
    async fn sign_out_unknown_token_is_quiet() {
        let store = store_with("ada", "pw");
        let mut rx = store.subscribe();
        store.sign_out(&SessionToken::new("nope")).await.unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn sign_in_with_overflowing_ttl_is_an_error() {
        let account = UserAccount {
            username: "ada".into(),
            user_id: UserId::new("id-ada"),
            password_sha256: hash_password("pw"),
        };
        let store = MemorySessionStore::new(vec![account], chrono::Duration::MAX);
        assert!(matches!(
            store.sign_in("ada", "pw").await,
            Err(SlotError::Session(_))
        ));
        assert_eq!(store.active_sessions().await, 0);
    }

    #[test]
    fn from_config_rejects_out_of_range_ttl() {
        let mut auth = AuthConfig::default();
        auth.session_ttl_minutes = 10_000_000_000_000;
        assert!(matches!(
            MemorySessionStore::from_config(&auth),
            Err(SlotError::Session(_))
        ));
        auth.session_ttl_minutes = 30;
        assert!(MemorySessionStore::from_config(&auth).is_ok());
    }

    #[test]
    fn seconds_left_never_negative() {
        let now = Utc::now();
        let session = Session {
            token: SessionToken::new("t"),
            user_id: UserId::new("u"),
            username: "ada".into(),
            expires_at: now + chrono::Duration::seconds(90),
        };
        assert_eq!(session.seconds_left(now), 90);
        assert_eq!(session.seconds_left(now + chrono::Duration::hours(1)), 0);
    }

    #[tokio::test]
    async fn expired_session_is_gone() {
        let account = UserAccount {
            username: "ada".into(),
            user_id: UserId::new("id-ada"),
            password_sha256: hash_password("pw"),
        };
        let store = MemorySessionStore::new(vec![account], chrono::Duration::zero());
        let session = store.sign_in("ada", "pw").await.unwrap();
        let mut rx = store.subscribe();

        assert_eq!(store.current(&session.token).await.unwrap(), None);
        let event = rx.recv().await.unwrap();
        assert!(event.session.is_none());
    }

    #[tokio::test]
    async fn purge_expired_removes_and_announces() {
        let account = UserAccount {
            username: "ada".into(),
            user_id: UserId::new("id-ada"),
            password_sha256: hash_password("pw"),
        };
        let store = MemorySessionStore::new(vec![account], chrono::Duration::zero());
        store.sign_in("ada", "pw").await.unwrap();
        store.sign_in("ada", "pw").await.unwrap();
        let mut rx = store.subscribe();

        assert_eq!(store.purge_expired().await, 2);
        assert_eq!(store.active_sessions().await, 0);
        assert!(rx.recv().await.unwrap().session.is_none());
        assert!(rx.recv().await.unwrap().session.is_none());
    }
}
