//! Process-wide session context.
//!
//! The context owns the only subscription to the [`SessionStore`] and fans
//! each auth event out to every consumer (guards, navigation, SSE streams).
//! Resolved sessions are cached so repeated lookups for the same token do
//! not hit the store again until an event invalidates them.

use crate::error::Result;
use crate::session::{AuthEvent, Session, SessionStore};
use crate::types::{SessionToken, UserId};
use chrono::Utc;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Weak};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, RwLock};

const FANOUT_CAPACITY: usize = 64;

struct Inner<S> {
    store: S,
    cache: RwLock<HashMap<SessionToken, Session>>,
    events: broadcast::Sender<AuthEvent>,
}

pub struct SessionContext<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for SessionContext<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: SessionStore> SessionContext<S> {
    /// Wrap `store` and start forwarding its events.
    ///
    /// Must be called inside a Tokio runtime for events to flow; without one
    /// lookups still work but subscribers never hear anything.
    pub fn new(store: S) -> Self {
        let upstream = store.subscribe();
        let (events, _) = broadcast::channel(FANOUT_CAPACITY);
        let inner = Arc::new(Inner {
            store,
            cache: RwLock::new(HashMap::new()),
            events,
        });

        if tokio::runtime::Handle::try_current().is_ok() {
            tokio::spawn(forward(Arc::downgrade(&inner), upstream));
        }

        Self { inner }
    }

    pub fn store(&self) -> &S {
        &self.inner.store
    }

    pub async fn sign_in(&self, username: &str, password: &str) -> Result<Session> {
        let session = self.inner.store.sign_in(username, password).await?;
        self.inner
            .cache
            .write()
            .await
            .insert(session.token.clone(), session.clone());
        Ok(session)
    }

    pub async fn current(&self, token: &SessionToken) -> Result<Option<Session>> {
        let cached = self.inner.cache.read().await.get(token).cloned();
        if let Some(session) = cached {
            if !session.is_expired(Utc::now()) {
                return Ok(Some(session));
            }
            self.inner.cache.write().await.remove(token);
        }

        let resolved = self.inner.store.current(token).await?;
        if let Some(ref session) = resolved {
            self.inner
                .cache
                .write()
                .await
                .insert(token.clone(), session.clone());
        }
        Ok(resolved)
    }

    pub async fn sign_out(&self, token: &SessionToken) -> Result<()> {
        self.inner.cache.write().await.remove(token);
        self.inner.store.sign_out(token).await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.inner.events.subscribe()
    }

    /// Live consumers of the fan-out channel.
    pub fn subscriber_count(&self) -> usize {
        self.inner.events.receiver_count()
    }

    /// Session source bound to one caller's token.
    pub fn bind(&self, token: Option<SessionToken>) -> BoundSession<S> {
        BoundSession {
            context: self.clone(),
            token,
        }
    }
}

async fn forward<S: SessionStore>(
    inner: Weak<Inner<S>>,
    mut upstream: broadcast::Receiver<AuthEvent>,
) {
    loop {
        match upstream.recv().await {
            Ok(event) => {
                let Some(inner) = inner.upgrade() else { break };
                // Only invalidate here. Inserting would race with a sign-out
                // that already cleared the entry.
                if event.session.is_none() {
                    inner.cache.write().await.remove(&event.token);
                }
                let _ = inner.events.send(event);
            }
            Err(RecvError::Lagged(skipped)) => {
                // Missed events may include sign-outs; forget everything.
                tracing::warn!(skipped, "session context lagged, clearing cache");
                let Some(inner) = inner.upgrade() else { break };
                inner.cache.write().await.clear();
            }
            Err(RecvError::Closed) => break,
        }
    }
}

// ---------------------------------------------------------------------------
// SessionSource
// ---------------------------------------------------------------------------

/// "Who is the current user?" as asked by pages that assume the guard has
/// already run.
pub trait SessionSource: Send + Sync {
    fn current_user(&self) -> impl Future<Output = Option<UserId>> + Send;
}

/// A context plus the caller's token.
pub struct BoundSession<S> {
    context: SessionContext<S>,
    token: Option<SessionToken>,
}

impl<S: SessionStore> SessionSource for BoundSession<S> {
    async fn current_user(&self) -> Option<UserId> {
        let token = self.token.as_ref()?;
        match self.context.current(token).await {
            Ok(session) => session.map(|s| s.user_id),
            Err(e) => {
                tracing::warn!(error = %e, "session lookup failed");
                None
            }
        }
    }
}

/// A fixed identity, used by the CLI where the user is named on the command line.
#[derive(Debug, Clone)]
pub struct LocalUser(pub Option<UserId>);

impl SessionSource for LocalUser {
    async fn current_user(&self) -> Option<UserId> {
        self.0.clone()
    }
}
