use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Extension;
use slotdesk_core::guard::{AuthGuard, GuardState};
use std::convert::Infallible;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt as _;

use crate::auth::CurrentSession;
use crate::state::AppState;

/// GET /api/events: SSE stream that emits one `auth` event when the
/// caller's session ends, then closes.
///
/// The stream owns an [`AuthGuard`]; when the client disconnects the guard
/// is dropped and its subscription with it.
pub async fn sse_events(
    State(app): State<AppState>,
    Extension(current): Extension<CurrentSession>,
) -> impl axum::response::IntoResponse {
    let (tx, rx) = mpsc::channel::<Event>(4);
    let mut guard = AuthGuard::mount(&app.sessions, current.token());
    tracing::debug!(
        listeners = app.sessions.subscriber_count(),
        "auth event stream opened"
    );

    tokio::spawn(async move {
        if let GuardState::Redirect(path) = guard.resolve().await.clone() {
            let _ = tx.send(auth_event(path)).await;
            return;
        }
        loop {
            tokio::select! {
                _ = tx.closed() => break,
                change = guard.next_change() => match change {
                    Some(GuardState::Redirect(path)) => {
                        let _ = tx.send(auth_event(path)).await;
                        break;
                    }
                    Some(_) => continue,
                    None => break,
                },
            }
        }
        tracing::debug!("auth event stream closed");
    });

    let stream = ReceiverStream::new(rx).map(Ok::<Event, Infallible>);
    Sse::new(stream).keep_alive(KeepAlive::default())
}

fn auth_event(redirect: &str) -> Event {
    Event::default().event("auth").data(
        serde_json::json!({ "authenticated": false, "redirect": redirect }).to_string(),
    )
}

