use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::Deserialize;
use slotdesk_core::notify::ToastLog;
use slotdesk_core::route::Route;
use slotdesk_core::types::{Collection, SlotIndex};
use slotdesk_core::{Result, SlotError};

use crate::auth::CurrentSession;
use crate::error::{status_for, AppError};
use crate::state::AppState;

/// Resolve a page slug and 1-based slot number to an editor target.
pub(crate) fn editor_target(page: &str, number: usize) -> Result<(Route, Collection, SlotIndex)> {
    let route = Route::from_slug(page).ok_or_else(|| SlotError::UnknownPage(page.to_string()))?;
    let collection = route
        .collection()
        .ok_or_else(|| SlotError::UnknownPage(page.to_string()))?;
    let index = SlotIndex::from_number(number)?;
    Ok((route, collection, index))
}

#[derive(Deserialize)]
pub struct SaveTextBody {
    text: String,
}

#[derive(Deserialize)]
pub struct SaveLabelBody {
    #[serde(default)]
    label: String,
}

/// GET /api/pages/{page}/slots: all twenty slots for the current user.
pub async fn list_slots(
    State(app): State<AppState>,
    Extension(current): Extension<CurrentSession>,
    Path(page): Path<String>,
) -> std::result::Result<Json<serde_json::Value>, AppError> {
    let (route, collection, _) = editor_target(&page, 1)?;
    let log = ToastLog::new();
    let mut editor = app.editor(collection, current.token(), &log);
    let loaded = editor.load().await;

    Ok(Json(serde_json::json!({
        "page": route.slug(),
        "collection": collection.table_name(),
        "loaded": loaded.is_ok(),
        "slots": editor.views(),
        "notifications": log.take(),
    })))
}

/// PUT /api/pages/{page}/slots/{n}: save one slot's text.
pub async fn save_text(
    State(app): State<AppState>,
    Extension(current): Extension<CurrentSession>,
    Path((page, number)): Path<(String, usize)>,
    Json(body): Json<SaveTextBody>,
) -> std::result::Result<Response, AppError> {
    let (_, collection, index) = editor_target(&page, number)?;
    let log = ToastLog::new();
    let mut editor = app.editor(collection, current.token(), &log);
    let _ = editor.load().await;
    editor.edit_text(index, body.text);
    let result = editor.save_text(index).await;

    Ok(slot_response(result, editor.view(index), &log))
}

/// PUT /api/pages/{page}/slots/{n}/label: save one slot's label. A blank
/// label clears it.
pub async fn save_label(
    State(app): State<AppState>,
    Extension(current): Extension<CurrentSession>,
    Path((page, number)): Path<(String, usize)>,
    Json(body): Json<SaveLabelBody>,
) -> std::result::Result<Response, AppError> {
    let (_, collection, index) = editor_target(&page, number)?;
    let log = ToastLog::new();
    let mut editor = app.editor(collection, current.token(), &log);
    let _ = editor.load().await;
    editor.begin_label_edit(index);
    editor.set_temp_label(body.label);
    let result = editor.save_label(index).await;

    Ok(slot_response(result, editor.view(index), &log))
}

/// The slot view plus the notifications the operation raised. Failures keep
/// the same shape with an `error` field and the mapped status.
fn slot_response(
    result: Result<()>,
    slot: slotdesk_core::editor::SlotView,
    log: &ToastLog,
) -> Response {
    let notifications = log.take();
    match result {
        Ok(()) => Json(serde_json::json!({
            "slot": slot,
            "notifications": notifications,
        }))
        .into_response(),
        Err(e) => {
            let status = status_for(&e);
            let body = serde_json::json!({
                "error": e.to_string(),
                "slot": slot,
                "notifications": notifications,
            });
            (status, Json(body)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn editor_target_resolves_editor_pages() {
        let (route, collection, index) = editor_target("flutter-webview", 3).unwrap();
        assert_eq!(route, Route::FlutterWebview);
        assert_eq!(collection, Collection::FlutterWebviewConfigs);
        assert_eq!(index.number(), 3);
    }

    #[test]
    fn editor_target_rejects_non_editor_pages() {
        assert!(matches!(
            editor_target("git-replace", 1),
            Err(SlotError::UnknownPage(_))
        ));
        assert!(matches!(
            editor_target("nope", 1),
            Err(SlotError::UnknownPage(_))
        ));
    }

    #[test]
    fn editor_target_rejects_out_of_range_slots() {
        assert!(matches!(
            editor_target("lovable-prompts", 0),
            Err(SlotError::InvalidSlot(_))
        ));
        assert!(matches!(
            editor_target("lovable-prompts", 21),
            Err(SlotError::InvalidSlot(_))
        ));
        assert_eq!(status_for(&SlotError::InvalidSlot("21".into())), StatusCode::BAD_REQUEST);
    }
}
