//! Auth guard: render a page only while a session exists.
//!
//! A guard subscribes to the session context when it is mounted and keeps
//! the subscription until it is dropped, so unmounting (including while a
//! resolution is still pending) always unsubscribes.

use crate::context::SessionContext;
use crate::route::LOGIN_PATH;
use crate::session::{AuthEvent, Session, SessionStore};
use crate::types::SessionToken;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardState {
    /// Session not resolved yet; show a placeholder.
    Loading,
    Authenticated(Session),
    /// Render nothing and navigate here.
    Redirect(&'static str),
}

impl GuardState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            GuardState::Authenticated(s) => Some(s),
            _ => None,
        }
    }
}

pub struct AuthGuard<S> {
    context: SessionContext<S>,
    token: Option<SessionToken>,
    events: broadcast::Receiver<AuthEvent>,
    state: GuardState,
}

impl<S: SessionStore> AuthGuard<S> {
    pub fn mount(context: &SessionContext<S>, token: Option<SessionToken>) -> Self {
        Self {
            events: context.subscribe(),
            context: context.clone(),
            token,
            state: GuardState::Loading,
        }
    }

    pub fn state(&self) -> &GuardState {
        &self.state
    }

    /// Ask the context for the current session. Lookup errors count as
    /// "no session".
    pub async fn resolve(&mut self) -> &GuardState {
        self.state = self.lookup().await;
        &self.state
    }

    /// Wait for the next auth transition that concerns this guard's token
    /// and return the new state. `None` once the context is gone.
    pub async fn next_change(&mut self) -> Option<GuardState> {
        loop {
            match self.events.recv().await {
                Ok(event) => {
                    if self.token.as_ref() != Some(&event.token) {
                        continue;
                    }
                    self.state = match event.session {
                        Some(session) => GuardState::Authenticated(session),
                        None => GuardState::Redirect(LOGIN_PATH),
                    };
                    return Some(self.state.clone());
                }
                Err(RecvError::Lagged(_)) => {
                    // Our event may be among the skipped ones.
                    let next = self.lookup().await;
                    if next != self.state {
                        self.state = next;
                        return Some(self.state.clone());
                    }
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    async fn lookup(&self) -> GuardState {
        let Some(token) = self.token.as_ref() else {
            return GuardState::Redirect(LOGIN_PATH);
        };
        match self.context.current(token).await {
            Ok(Some(session)) => GuardState::Authenticated(session),
            Ok(None) => GuardState::Redirect(LOGIN_PATH),
            Err(e) => {
                tracing::warn!(error = %e, "session lookup failed, redirecting to login");
                GuardState::Redirect(LOGIN_PATH)
            }
        }
    }
}
