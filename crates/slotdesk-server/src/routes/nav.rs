use axum::extract::Query;
use axum::{Extension, Json};
use serde::Deserialize;
use slotdesk_core::nav::{NavShell, NavView};

use crate::auth::CurrentSession;

#[derive(Deserialize)]
pub struct NavQuery {
    #[serde(default = "default_path")]
    path: String,
    #[serde(default)]
    expanded: bool,
}

fn default_path() -> String {
    "/".to_string()
}

/// GET /api/nav?path=&expanded=: the menu as it renders at `path`.
pub async fn get_nav(
    Extension(current): Extension<CurrentSession>,
    Query(query): Query<NavQuery>,
) -> Json<NavView> {
    let shell = NavShell::new(query.expanded);
    Json(shell.render(&query.path, current.session()))
}
