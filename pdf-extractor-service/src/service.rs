use axum::{
    Form, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::{HeaderMap, HeaderValue, Request, StatusCode, header},
    middleware::{Next, from_fn},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
};
use page_flow::InMemorySessionStorage;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{Instrument, error, info};
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppError;
use crate::genai::{GeminiClient, GenerativeBackend};
use crate::intent::IntentForm;
use crate::models::UploadedDocument;
use crate::session::SessionState;
use crate::upload::{MULTIPART_OVERHEAD, accept_pdf};
use crate::view::{PageView, render_page};
use crate::workflow::{CycleRunner, Interaction};

pub const SESSION_COOKIE: &str = "pdfx_session";

/// Sessions idle this long are dropped when no other timeout is configured
pub const DEFAULT_SESSION_IDLE: Duration = Duration::from_secs(30 * 60);

/// How often idle sessions are swept
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct AppState {
    pub runner: CycleRunner,
    pub sessions: Arc<InMemorySessionStorage<SessionState>>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        backend: Arc<dyn GenerativeBackend>,
        staging_dir: PathBuf,
        max_upload_bytes: usize,
    ) -> Self {
        Self::with_session_idle(backend, staging_dir, max_upload_bytes, DEFAULT_SESSION_IDLE)
    }

    pub fn with_session_idle(
        backend: Arc<dyn GenerativeBackend>,
        staging_dir: PathBuf,
        max_upload_bytes: usize,
        session_idle: Duration,
    ) -> Self {
        let sessions = Arc::new(InMemorySessionStorage::<SessionState>::with_idle_timeout(
            session_idle,
        ));
        Self {
            runner: CycleRunner::new(sessions.clone(), backend, staging_dir),
            sessions,
            max_upload_bytes,
        }
    }
}

/// Build the app from configuration and start the idle-session sweeper.
///
/// Must be called from within a tokio runtime.
pub fn create_app(config: &Config) -> Router {
    let client = GeminiClient::new(&config.api_key, &config.model, &config.api_base_url);
    info!(model = %client.model(), "Model client initialized");

    let state = AppState::with_session_idle(
        Arc::new(client),
        config.staging_dir.clone(),
        config.max_upload_bytes,
        config.session_idle_timeout,
    );
    spawn_session_sweeper(state.sessions.clone(), SESSION_SWEEP_INTERVAL);
    build_router(state)
}

/// Periodically drop idle sessions and the documents they hold
pub fn spawn_session_sweeper(
    sessions: Arc<InMemorySessionStorage<SessionState>>,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let evicted = sessions.evict_idle();
            if evicted > 0 {
                info!(evicted, remaining = sessions.len(), "Evicted idle sessions");
            }
        }
    })
}

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route("/", get(index))
        .route("/upload", post(upload))
        .route("/intent", post(submit_intent))
        .route("/extract", post(extract))
        .route("/reset", post(reset))
        .route("/export", get(export))
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            ServiceBuilder::new()
                .layer(from_fn(correlation_id_middleware))
                .layer(TraceLayer::new_for_http()),
        )
        .with_state(state)
}

/// Middleware to add correlation ID to all requests
async fn correlation_id_middleware(request: Request<axum::body::Body>, next: Next) -> Response {
    let correlation_id = Uuid::new_v4().to_string();
    let span = tracing::info_span!("http_request", correlation_id = %correlation_id);

    let mut response = next.run(request).instrument(span).await;
    if let Ok(value) = HeaderValue::from_str(&correlation_id) {
        response.headers_mut().insert("x-correlation-id", value);
    }
    response
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    run_page_cycle(&state, &headers, Interaction::View).await
}

async fn upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let outcome = read_single_pdf(&mut multipart).await;
    run_page_cycle(&state, &headers, Interaction::Upload(outcome)).await
}

async fn submit_intent(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<IntentForm>,
) -> Response {
    run_page_cycle(&state, &headers, Interaction::SubmitIntent(form)).await
}

async fn extract(State(state): State<AppState>, headers: HeaderMap) -> Response {
    run_page_cycle(&state, &headers, Interaction::Extract).await
}

async fn reset(State(state): State<AppState>, headers: HeaderMap) -> Response {
    run_page_cycle(&state, &headers, Interaction::Reset).await
}

async fn export(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(session_id) = session_id_from_headers(&headers) else {
        return (StatusCode::NOT_FOUND, "Nothing to export yet").into_response();
    };

    let artifact = match state.runner.session(&session_id).await {
        Ok(session) => session.and_then(|s| s.last_export),
        Err(e) => {
            error!(session_id = %session_id, error = %e, "Failed to load session");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load session").into_response();
        }
    };

    let Some(artifact) = artifact else {
        return (StatusCode::NOT_FOUND, "Nothing to export yet").into_response();
    };

    info!(session_id = %session_id, file_name = %artifact.file_name, "Serving export");
    let disposition = format!("attachment; filename=\"{}\"", artifact.file_name);
    (
        [
            (
                header::CONTENT_TYPE,
                format!("{}; charset=utf-8", artifact.mime_type),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        artifact.body,
    )
        .into_response()
}

/// Read the `file` field of an upload; exactly one file is accepted
async fn read_single_pdf(multipart: &mut Multipart) -> Result<UploadedDocument, AppError> {
    let mut document = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Upload(format!("Failed to read upload: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        if document.is_some() {
            return Err(AppError::Upload(
                "Only one PDF file can be processed at a time.".to_string(),
            ));
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Upload(format!("Failed to read file data: {e}")))?;

        document = Some(accept_pdf(
            file_name.as_deref(),
            content_type.as_deref(),
            bytes,
        )?);
    }

    document.ok_or_else(|| AppError::Upload("Please choose a PDF file to upload.".to_string()))
}

async fn run_page_cycle(state: &AppState, headers: &HeaderMap, interaction: Interaction) -> Response {
    let (session_id, is_new) = match session_id_from_headers(headers) {
        Some(id) => (id, false),
        None => (Uuid::new_v4().to_string(), true),
    };

    let (status, view) = match state.runner.run(&session_id, interaction).await {
        Ok(view) => (StatusCode::OK, view),
        Err(e) => {
            error!(session_id = %session_id, error = %e, "Page cycle failed");
            let mut view = PageView::default();
            view.error(format!("❌ An error occurred: {e}"));
            (StatusCode::INTERNAL_SERVER_ERROR, view)
        }
    };

    let mut response = (status, Html(render_page(&view))).into_response();
    if is_new {
        let cookie = format!("{SESSION_COOKIE}={session_id}; Path=/; HttpOnly; SameSite=Lax");
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
    }
    response
}

/// Session id from the request's cookie, if it holds a valid UUID
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
        .map(|id| id.to_string())
}
