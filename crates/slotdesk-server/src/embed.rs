use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use rust_embed::Embed;

#[derive(Embed)]
#[folder = "assets/"]
struct Assets;

/// GET /assets/{*path}: stylesheet and page script compiled into the binary.
pub async fn asset_handler(Path(path): Path<String>) -> Response {
    match <Assets as Embed>::get(&path) {
        Some(content) => {
            let mime = mime_guess::from_path(&path).first_or_octet_stream();
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, mime.as_ref().to_string()),
                    (header::CACHE_CONTROL, "public, max-age=300".to_string()),
                ],
                content.data.to_vec(),
            )
                .into_response()
        }
        None => (StatusCode::NOT_FOUND, "asset not found").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_assets_are_present() {
        assert!(<Assets as Embed>::get("app.js").is_some());
        assert!(<Assets as Embed>::get("style.css").is_some());
        assert!(<Assets as Embed>::get("missing.txt").is_none());
    }
}
