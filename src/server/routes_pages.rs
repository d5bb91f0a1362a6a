//! Static page routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use maud::Markup;

use super::AppContext;
use crate::pages::{render, Page};

/// Create routes for the pages that only show profile text.
///
/// `/{slug}` resolves any page by slug or title; the gallery keeps its own
/// routes and wins over the slug match.
pub fn page_routes() -> Router<AppContext> {
    Router::new()
        .route("/", get(home))
        .route("/:slug", get(page_by_slug))
}

async fn home(State(ctx): State<AppContext>) -> Markup {
    render::static_page(Page::Home, &ctx.config.profile)
}

async fn page_by_slug(State(ctx): State<AppContext>, Path(slug): Path<String>) -> Response {
    match slug.parse::<Page>() {
        Ok(page) => render::static_page(page, &ctx.config.profile).into_response(),
        Err(e) => {
            tracing::debug!("{}", e);
            (StatusCode::NOT_FOUND, render::not_found(&format!("/{}", slug))).into_response()
        }
    }
}
