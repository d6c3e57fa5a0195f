use axum::{
    extract::{
        multipart::MultipartRejection, rejection::FormRejection, DefaultBodyLimit, Form, Multipart,
        Path as AxumPath, Request, State,
    },
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use bytes::Bytes;
use futures::TryStreamExt;
use serde::Deserialize;
use std::{io, path::PathBuf, sync::Arc};
use tokio_util::io::StreamReader;
use tower::ServiceExt;
use tower_http::{services::ServeFile, trace::TraceLayer};
use tracing::{debug, info, warn};

use crate::{
    config::{ControlUpdate, ServerConfig, SharedConfig},
    error::AppError,
    listing::list_dir,
    resolve::{resolve_target, ResolvedTarget},
    upload::store_upload,
    view::{render_page, PageView},
};

// --- State ---
pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: SharedConfig,
    /// Body limit for `/upload`, in bytes.
    pub max_upload: usize,
}

impl AppState {
    pub fn new(config: ServerConfig, max_upload: usize) -> SharedState {
        Arc::new(AppState {
            config: SharedConfig::new(config),
            max_upload,
        })
    }
}

// --- Request Payloads ---
#[derive(Deserialize, Debug)]
struct ControlForm {
    port: Option<String>,
    directory: Option<String>,
}

pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(root_handler).post(control_handler))
        .route(
            "/upload",
            post(upload_handler).layer(DefaultBodyLimit::max(state.max_upload)),
        )
        .route("/*path", get(browse_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// --- Handlers ---

/// `GET /`: the control page.
async fn root_handler(
    State(state): State<SharedState>,
    request: Request,
) -> Result<Response, AppError> {
    respond(&state, "/", request).await
}

/// `GET /<path>`: serve a file or list a directory.
async fn browse_handler(
    State(state): State<SharedState>,
    AxumPath(path): AxumPath<String>,
    request: Request,
) -> Result<Response, AppError> {
    respond(&state, &path, request).await
}

/// `POST /`: apply port/directory changes, then show the root again.
async fn control_handler(
    State(state): State<SharedState>,
    form: Result<Form<ControlForm>, FormRejection>,
) -> Result<Response, AppError> {
    let Form(form) = form.map_err(|e| {
        warn!("Malformed control form: {}", e);
        AppError::BadRequest("Error parsing form".to_string())
    })?;

    let update = ControlUpdate::new(form.port, form.directory);
    let config = if update.is_empty() {
        state.config.snapshot().await
    } else {
        state.config.apply(update).await?
    };

    render_listing(config, ".".to_string()).await
}

/// `POST /upload`: store the `file` field under the current root.
async fn upload_handler(
    State(state): State<SharedState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Redirect, AppError> {
    let mut multipart = multipart.map_err(|e| AppError::BadRequest(e.body_text()))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Error parsing form: {}", e)))?
    {
        if field.name() != Some("file") {
            debug!("Ignoring multipart field {:?}", field.name());
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_owned)
            .ok_or_else(|| AppError::BadRequest("Error retrieving file".to_string()))?;
        let root = state.config.source_dir().await;

        let stream = field.map_err(|e| io::Error::new(io::ErrorKind::Other, e));
        let reader = StreamReader::<_, Bytes>::new(stream);
        tokio::pin!(reader);

        let stored = store_upload(&root, &filename, &mut reader).await?;
        info!("Upload {:?} saved as {}", filename, stored.name);

        return Ok(Redirect::to("/"));
    }

    Err(AppError::BadRequest("Error retrieving file".to_string()))
}

// --- Helpers ---

async fn respond(
    state: &AppState,
    request_path: &str,
    request: Request,
) -> Result<Response, AppError> {
    let config = state.config.snapshot().await;

    match resolve_target(&config.source_dir, request_path).await {
        ResolvedTarget::ServeFile(path) => Ok(serve_file(path, request).await),
        ResolvedTarget::RootPage => render_listing(config, ".".to_string()).await,
        ResolvedTarget::ListDirectory(rel) => render_listing(config, rel).await,
    }
}

async fn render_listing(config: ServerConfig, rel: String) -> Result<Response, AppError> {
    let files = list_dir(&config.source_dir, &rel).await?;

    let view = PageView {
        port: config.port,
        source_dir: config.source_dir,
        ip_addresses: config.ip_addresses,
        current_path: rel,
        files,
    };
    Ok(render_page(&view).into_response())
}

/// Content type, `Last-Modified` and conditional requests come from tower-http.
async fn serve_file(path: PathBuf, request: Request) -> Response {
    match ServeFile::new(path).oneshot(request).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}
