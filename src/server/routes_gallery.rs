//! Gallery page, upload handling and stored image serving.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use maud::Markup;
use portfolio_common::ImageId;
use serde::Deserialize;

use super::{read_uploads, AppContext};
use crate::gallery::{
    ingest_batch, layout, GridLayout, ImageCard, ImageStore, Listing, Notification, StorageError,
    UploadOutcome, UploadedFile,
};
use crate::pages::render;

/// Create gallery routes.
pub fn gallery_routes() -> Router<AppContext> {
    Router::new()
        .route("/gallery", get(show_gallery).post(upload))
        .route("/gallery/images/:image_id", get(serve_image))
}

/// Query parameters for the gallery page.
#[derive(Debug, Default, Deserialize)]
pub struct GalleryQuery {
    /// Load and display the stored images.
    #[serde(default)]
    pub show: bool,
}

/// Run `list_all` off the async runtime.
pub(crate) async fn load_listing(store: ImageStore) -> Result<Listing, StorageError> {
    tokio::task::spawn_blocking(move || store.list_all())
        .await
        .map_err(|e| StorageError::internal(format!("Listing task failed: {}", e)))?
}

/// Run a batch through the ingest pipeline off the async runtime.
pub(crate) async fn run_ingest(
    ctx: &AppContext,
    files: Vec<UploadedFile>,
) -> Result<Vec<UploadOutcome>, StorageError> {
    let store = ctx.store.clone();
    let limits = ctx.upload_limits();
    tokio::task::spawn_blocking(move || ingest_batch(&store, files, limits))
        .await
        .map_err(|e| StorageError::internal(format!("Upload task failed: {}", e)))
}

/// Error notifications for rows that could not be shown.
pub(crate) fn skipped_notifications(skipped: &[ImageId]) -> Vec<Notification> {
    skipped
        .iter()
        .map(|id| {
            Notification::error(format!(
                "Image {} could not be displayed: stored data is corrupt.",
                id
            ))
        })
        .collect()
}

async fn show_gallery(
    State(ctx): State<AppContext>,
    Query(query): Query<GalleryQuery>,
) -> Markup {
    if !query.show {
        return render::gallery(&[], None);
    }

    match load_listing(ctx.store.clone()).await {
        Ok(listing) => {
            let notices = skipped_notifications(&listing.skipped);
            let grid: GridLayout<ImageCard> = layout(listing.entries.iter().map(|e| e.card()));
            render::gallery(&notices, Some(&grid))
        }
        Err(e) => {
            tracing::warn!("Failed to load gallery: {}", e);
            let notices = [Notification::error(format!(
                "An error occurred while loading images: {}",
                e
            ))];
            render::gallery(&notices, None)
        }
    }
}

async fn upload(State(ctx): State<AppContext>, multipart: Multipart) -> Response {
    let form = read_uploads(multipart).await;
    let stream_error = form.error_notification();

    // Nothing arrived intact: report the stream error with its own status.
    if form.files.is_empty() {
        if let Some(e) = &form.error {
            let notices: Vec<Notification> = stream_error.into_iter().collect();
            return (e.status(), render::gallery(&notices, None)).into_response();
        }
    }

    let mut notices: Vec<Notification> = match run_ingest(&ctx, form.files).await {
        Ok(outcomes) => outcomes.iter().map(UploadOutcome::notification).collect(),
        Err(e) => vec![Notification::error(e.to_string())],
    };
    notices.extend(stream_error);

    render::gallery(&notices, None).into_response()
}

/// Serve the stored JPEG bytes of an image.
async fn serve_image(State(ctx): State<AppContext>, Path(image_id): Path<String>) -> Response {
    let Ok(id) = image_id.parse::<ImageId>() else {
        return (StatusCode::BAD_REQUEST, "Invalid image ID").into_response();
    };

    let store = ctx.store.clone();
    let result = tokio::task::spawn_blocking(move || store.get(id)).await;

    match result {
        Ok(Ok(Some(stored))) => (
            [
                (header::CONTENT_TYPE, "image/jpeg"),
                (header::CACHE_CONTROL, "public, max-age=31536000, immutable"),
            ],
            stored.image,
        )
            .into_response(),
        Ok(Ok(None)) => (StatusCode::NOT_FOUND, "Image not found").into_response(),
        Ok(Err(e)) => {
            tracing::warn!("Failed to read image {}: {}", id, e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
        Err(e) => {
            tracing::error!("Image task failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
