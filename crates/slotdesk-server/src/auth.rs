use axum::{
    body::Body,
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use slotdesk_core::guard::{AuthGuard, GuardState};
use slotdesk_core::route::{Route, LOGIN_PATH};
use slotdesk_core::session::Session;
use slotdesk_core::types::SessionToken;

use crate::state::AppState;

pub const SESSION_COOKIE: &str = "slotdesk_session";
pub const NAV_COOKIE: &str = "slotdesk_nav";

/// The session resolved for this request, if any. Inserted by
/// [`session_middleware`] on every request it sees.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Option<Session>);

impl CurrentSession {
    pub fn session(&self) -> Option<&Session> {
        self.0.as_ref()
    }

    pub fn token(&self) -> Option<SessionToken> {
        self.0.as_ref().map(|s| s.token.clone())
    }
}

/// Axum middleware that resolves the caller's session and guards pages.
///
/// Flow:
/// 1. Read `slotdesk_session` and resolve it through an [`AuthGuard`].
/// 2. Public paths (`/auth`, `/api/auth/*` except logout, `/assets/*`,
///    unknown pages) pass through with whatever session was found.
/// 3. Guarded paths without a session get `302 /auth` (pages) or
///    `401` JSON (`/api/*`).
pub async fn session_middleware(
    State(app): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = read_cookie(req.headers(), SESSION_COOKIE).map(SessionToken::new);

    let mut guard = AuthGuard::mount(&app.sessions, token);
    let state = guard.resolve().await.clone();
    drop(guard);

    let path = req.uri().path().to_string();
    let current = CurrentSession(state.session().cloned());
    req.extensions_mut().insert(current);

    if is_public(&path) {
        return next.run(req).await;
    }

    match state {
        GuardState::Authenticated(_) => next.run(req).await,
        GuardState::Loading | GuardState::Redirect(_) if path.starts_with("/api/") => {
            Response::builder()
                .status(401)
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"error":"unauthorized"}"#))
                .unwrap_or_default()
        }
        GuardState::Redirect(target) => redirect(target),
        GuardState::Loading => redirect(LOGIN_PATH),
    }
}

fn is_public(path: &str) -> bool {
    if let Some(api) = path.strip_prefix("/api/") {
        return matches!(api, "auth/login" | "auth/session");
    }
    if path.starts_with("/assets/") {
        return true;
    }
    !Route::owning(path).requires_session()
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub fn redirect(location: &str) -> Response {
    Response::builder()
        .status(302)
        .header("Location", location)
        .body(Body::empty())
        .unwrap_or_default()
}

pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookies = headers.get("cookie").and_then(|v| v.to_str().ok())?;
    cookies.split(';').find_map(|part| {
        let (key, value) = part.trim().split_once('=')?;
        (key == name && !value.is_empty()).then(|| value.to_string())
    })
}

pub fn session_cookie(token: &SessionToken, max_age_secs: i64) -> String {
    format!(
        "{SESSION_COOKIE}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age_secs}",
        token.as_str()
    )
}

pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::{http::Request, middleware, routing::get, Extension, Router};
    use slotdesk_core::config::Config;
    use tempfile::TempDir;
    use tower::ServiceExt;

    async fn whoami(Extension(current): Extension<CurrentSession>) -> String {
        current
            .session()
            .map(|s| s.username.clone())
            .unwrap_or_else(|| "anonymous".into())
    }

    fn test_app(dir: &TempDir) -> (Router, AppState) {
        let mut config = Config::new();
        config.add_user("ada", "pw").unwrap();
        let state = AppState::new(dir.path().to_path_buf(), config).unwrap();
        let router = Router::new()
            .route("/", get(whoami))
            .route("/auth", get(whoami))
            .route("/api/pages/flutter-webview/slots", get(whoami))
            .route("/assets/style.css", get(whoami))
            .layer(middleware::from_fn_with_state(
                state.clone(),
                session_middleware,
            ))
            .with_state(state.clone());
        (router, state)
    }

    fn request(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(c) = cookie {
            builder = builder.header("cookie", c);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn page_without_session_redirects_to_login() {
        let dir = TempDir::new().unwrap();
        let (app, _) = test_app(&dir);
        let resp = app.oneshot(request("/", None)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers().get("location").unwrap(), "/auth");
    }

    #[tokio::test]
    async fn api_without_session_returns_401_json() {
        let dir = TempDir::new().unwrap();
        let (app, _) = test_app(&dir);
        let resp = app
            .oneshot(request("/api/pages/flutter-webview/slots", None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let ct = resp.headers().get("content-type").unwrap().to_str().unwrap();
        assert!(ct.contains("application/json"));
    }

    #[tokio::test]
    async fn stale_cookie_redirects() {
        let dir = TempDir::new().unwrap();
        let (app, _) = test_app(&dir);
        let resp = app
            .oneshot(request("/", Some("slotdesk_session=stale")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FOUND);
    }

    #[tokio::test]
    async fn valid_cookie_passes_through() {
        let dir = TempDir::new().unwrap();
        let (app, state) = test_app(&dir);
        let session = state.sessions.sign_in("ada", "pw").await.unwrap();
        let cookie = format!("theme=dark; slotdesk_session={}", session.token.as_str());
        let resp = app.oneshot(request("/", Some(&cookie))).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn login_page_and_assets_are_public() {
        let dir = TempDir::new().unwrap();
        let (app, _) = test_app(&dir);
        let resp = app.clone().oneshot(request("/auth", None)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let resp = app.oneshot(request("/assets/style.css", None)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[test]
    fn read_cookie_finds_named_value() {
        let mut headers = HeaderMap::new();
        headers.insert("cookie", "a=1; slotdesk_session=tok; b=2".parse().unwrap());
        assert_eq!(read_cookie(&headers, SESSION_COOKIE).as_deref(), Some("tok"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn empty_cookie_value_is_absent() {
        let mut headers = HeaderMap::new();
        headers.insert("cookie", "slotdesk_session=".parse().unwrap());
        assert_eq!(read_cookie(&headers, SESSION_COOKIE), None);
    }

    #[test]
    fn public_paths() {
        assert!(is_public("/auth"));
        assert!(is_public("/api/auth/login"));
        assert!(is_public("/api/auth/session"));
        assert!(is_public("/no-such-page"));
        assert!(!is_public("/api/auth/logout"));
        assert!(!is_public("/api/events"));
        assert!(!is_public("/"));
        assert!(!is_public("/flutter-webview"));
        assert!(!is_public("/pages/lovable-prompts/slots/1/save"));
    }
}
