pub mod auth;
pub mod embed;
pub mod error;
pub mod pages;
pub mod routes;
pub mod state;

use axum::routing::{get, post, put};
use axum::{middleware, Router};
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Build the axum Router with all pages, API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Pages
        .route("/", get(pages::show_page))
        .route("/{page}", get(pages::show_page))
        .route("/auth", get(pages::login_page).post(pages::login_submit))
        .route("/logout", post(pages::logout))
        .route("/nav/toggle", post(pages::toggle_nav))
        // Editor forms
        .route("/pages/{page}/slots/{n}/save", post(pages::save_slot))
        .route("/pages/{page}/slots/{n}/label", post(pages::label_slot))
        .route("/pages/{page}/slots/{n}/copy", post(pages::copy_slot))
        // Auth API
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/logout", post(routes::auth::logout))
        .route("/api/auth/session", get(routes::auth::session))
        // Events (SSE)
        .route("/api/events", get(routes::events::sse_events))
        // Navigation
        .route("/api/nav", get(routes::nav::get_nav))
        // Slots
        .route("/api/pages/{page}/slots", get(routes::slots::list_slots))
        .route("/api/pages/{page}/slots/{n}", put(routes::slots::save_text))
        .route(
            "/api/pages/{page}/slots/{n}/label",
            put(routes::slots::save_label),
        )
        // Static assets
        .route("/assets/{*path}", get(embed::asset_handler))
        .fallback(pages::not_found)
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth::session_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Start the slotdesk web server.
///
/// Loads `slotdesk.yaml` from `root`, opens the slot database and serves
/// pages, API and embedded assets on `0.0.0.0:{port}`.
pub async fn serve(root: PathBuf, port: u16, open_browser: bool) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(root, listener, open_browser).await
}

/// Start the slotdesk web server on a pre-bound listener.
///
/// Unlike `serve`, this accepts a `TcpListener` that was already bound so the
/// caller can read the actual port before starting (useful when `port = 0` and
/// the OS picks a free port).
pub async fn serve_on(
    root: PathBuf,
    listener: tokio::net::TcpListener,
    open_browser: bool,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app = build_router(AppState::load(root)?);

    tracing::info!("slotdesk listening on http://localhost:{actual_port}");

    if open_browser {
        let url = format!("http://localhost:{actual_port}");
        if let Err(e) = open::that(&url) {
            tracing::warn!(error = %e, "could not open browser");
        }
    }

    axum::serve(listener, app).await?;
    Ok(())
}
