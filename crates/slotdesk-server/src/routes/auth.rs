use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::Deserialize;
use slotdesk_core::nav::NavShell;
use slotdesk_core::notify::ToastLog;

use crate::auth::{self as session_auth, CurrentSession};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LoginBody {
    username: String,
    password: String,
}

/// POST /api/auth/login: sign in and set the session cookie.
pub async fn login(
    State(app): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<Response, AppError> {
    let session = app.sessions.sign_in(&body.username, &body.password).await?;
    let max_age = session.max_age();
    let cookie = session_auth::session_cookie(&session.token, max_age);
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(serde_json::json!({
            "user_id": session.user_id,
            "username": session.username,
            "expires_at": session.expires_at,
        })),
    )
        .into_response())
}

/// POST /api/auth/logout: always answers with the sign-in page as the
/// next location; a failed sign-out only shows up in `notifications` when
/// the logout error policy surfaces it.
pub async fn logout(
    State(app): State<AppState>,
    Extension(current): Extension<CurrentSession>,
) -> Response {
    let log = ToastLog::new();
    let token = current.token();
    let target =
        NavShell::logout(&app.sessions, token.as_ref(), &log, app.config.errors.logout).await;
    (
        [(header::SET_COOKIE, session_auth::clear_session_cookie())],
        Json(serde_json::json!({
            "redirect": target,
            "notifications": log.take(),
        })),
    )
        .into_response()
}

/// GET /api/auth/session: who the caller is, if anyone.
pub async fn session(Extension(current): Extension<CurrentSession>) -> Json<serde_json::Value> {
    match current.session() {
        Some(s) => Json(serde_json::json!({
            "authenticated": true,
            "user_id": s.user_id,
            "username": s.username,
            "expires_at": s.expires_at,
        })),
        None => Json(serde_json::json!({ "authenticated": false })),
    }
}
