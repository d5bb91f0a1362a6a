use crate::config::Config;
use crate::gallery::{ImageStore, Notification, UploadLimits, UploadedFile};
use crate::pages::render;
use anyhow::{Context, Result};
use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart},
    http::{header, Method, StatusCode, Uri},
    response::IntoResponse,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

pub mod routes_api;
pub mod routes_gallery;
pub mod routes_pages;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub store: ImageStore,
    pub config: Arc<Config>,
}

impl AppContext {
    pub fn new(store: ImageStore, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    pub fn upload_limits(&self) -> UploadLimits {
        UploadLimits::from(&self.config.upload)
    }
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let body_limit = ctx.config.upload.max_request_size_bytes();
    let static_dir = ctx.config.server.static_dir.clone();

    let mut app = Router::new()
        // Health check
        .route("/health", get(health_check))
        .merge(routes_pages::page_routes())
        .merge(routes_gallery::gallery_routes())
        .nest("/api", routes_api::api_routes());

    // Serve static files if directory is provided
    if let Some(dir) = static_dir {
        app = static_routes(app, dir);
    }

    app.fallback(not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

fn static_routes(app: Router<AppContext>, dir: PathBuf) -> Router<AppContext> {
    if dir.exists() {
        tracing::info!("Serving static files from {:?}", dir);
        app.nest_service("/static", ServeDir::new(dir))
    } else {
        tracing::warn!("Static directory {:?} not found, /static disabled", dir);
        app
    }
}

async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

async fn not_found(uri: Uri) -> impl IntoResponse {
    (StatusCode::NOT_FOUND, render::not_found(uri.path()))
}

/// File parts read from an upload form.
///
/// A stream error stops reading but keeps the files that were complete
/// before it, so they can still be ingested.
pub(crate) struct UploadForm {
    pub files: Vec<UploadedFile>,
    pub error: Option<MultipartError>,
}

impl UploadForm {
    /// Notification for the stream error, if reading stopped early.
    pub fn error_notification(&self) -> Option<Notification> {
        self.error.as_ref().map(|e| {
            Notification::error(format!("The upload could not be read: {}", e.body_text()))
        })
    }
}

/// Collect the file parts of an upload form.
///
/// Parts named `files` or `file` are taken; a file input left empty by the
/// browser (no filename, no bytes) is ignored.
pub(crate) async fn read_uploads(mut multipart: Multipart) -> UploadForm {
    let mut files = Vec::new();

    let error = loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break None,
            Err(e) => break Some(e),
        };

        if !matches!(field.name(), Some("files") | Some("file")) {
            continue;
        }

        let name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = match field.bytes().await {
            Ok(data) => data,
            Err(e) => break Some(e),
        };

        if name.is_empty() && data.is_empty() {
            continue;
        }

        tracing::debug!(
            "Received {} ({}, {} bytes)",
            name,
            content_type.as_deref().unwrap_or("no content type"),
            data.len()
        );
        files.push(UploadedFile::new(name, content_type, data));
    };

    if let Some(e) = &error {
        tracing::warn!(
            "Upload stream failed after {} complete files: {}",
            files.len(),
            e
        );
    }

    UploadForm { files, error }
}

/// Start the HTTP server
pub async fn start_server(config: Config, store: ImageStore) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let ctx = AppContext::new(store, config);
    let app = create_router(ctx);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
