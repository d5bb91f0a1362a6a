//! JSON API routes.
//!
//! Mirrors the gallery page for programmatic clients: listing, upload and
//! the navigation entries.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

use super::routes_gallery::{load_listing, run_ingest};
use super::{read_uploads, AppContext};
use crate::gallery::{layout, UploadOutcome};
use crate::pages::Page;

/// Create API routes.
pub fn api_routes() -> Router<AppContext> {
    Router::new()
        .route("/images", get(list_images).post(upload_images))
        .route("/pages", get(list_pages))
}

async fn list_images(State(ctx): State<AppContext>) -> Response {
    let listing = match load_listing(ctx.store.clone()).await {
        Ok(listing) => listing,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": e.to_string()})),
            )
                .into_response()
        }
    };

    let grid = layout(listing.entries.iter().map(|e| e.card()));
    let images: Vec<serde_json::Value> = grid
        .cells()
        .into_iter()
        .map(|cell| {
            json!({
                "id": cell.item.id,
                "name": cell.item.name,
                "width": cell.item.width,
                "height": cell.item.height,
                "mode": cell.item.mode,
                "row": cell.row,
                "column": cell.column,
            })
        })
        .collect();

    Json(json!({
        "images": images,
        "skipped": listing.skipped,
    }))
    .into_response()
}

async fn upload_images(State(ctx): State<AppContext>, multipart: Multipart) -> Response {
    let form = read_uploads(multipart).await;
    let stream_error = form.error.as_ref().map(|e| e.body_text());

    if form.files.is_empty() {
        return match form.error {
            Some(e) => (e.status(), Json(json!({"error": e.body_text()}))).into_response(),
            None => (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "No files in upload"})),
            )
                .into_response(),
        };
    }

    match run_ingest(&ctx, form.files).await {
        Ok(outcomes) => {
            let notifications: Vec<_> = outcomes.iter().map(UploadOutcome::notification).collect();
            let saved = outcomes.iter().filter(|o| o.is_saved()).count();
            Json(json!({
                "saved": saved,
                "outcomes": outcomes,
                "notifications": notifications,
                "error": stream_error,
            }))
            .into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": e.to_string()})),
        )
            .into_response(),
    }
}

async fn list_pages() -> impl IntoResponse {
    let pages: Vec<_> = Page::ALL.iter().map(|page| page.nav_entry()).collect();
    Json(json!({ "pages": pages }))
}
