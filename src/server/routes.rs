//! HTTP handlers
//!
//! - `GET /output/*parms` renders a view page
//! - `GET /api/view/generation?view=` is polled by pages to detect new renders
//! - `POST /api/view/retry?view=&back=` re-runs a view's render pipeline
//! - `GET /api/files/file`, `/api/etherpad/pad-revs`, `/api/etherpad/pad`
//!   expose the configured content source as JSON

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode, Uri},
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use super::state::AppState;
use crate::error::SourceError;
use crate::params::PageParams;
use crate::shell::{theme, PageContext, Retry};
use crate::source::{ContentResponse, RevisionResponse};

pub const RETRY_PATH: &str = "/api/view/retry";

// =============================================================================
// Views
// =============================================================================

pub async fn output_page(
    State(state): State<AppState>,
    Path(parms): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
    uri: Uri,
) -> Response {
    render_view(&state, &parms, &pairs, &uri).await
}

/// `/output` with no segments: an idle view with nothing to fetch
pub async fn output_root(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
    uri: Uri,
) -> Response {
    render_view(&state, "", &pairs, &uri).await
}

async fn render_view(
    state: &AppState,
    path: &str,
    pairs: &[(String, String)],
    uri: &Uri,
) -> Response {
    let params = match PageParams::from_request(path, pairs) {
        Ok(params) => params,
        Err(e) => {
            tracing::warn!(path, error = %e, "Rejected view request");
            return error_response(
                state,
                StatusCode::BAD_REQUEST,
                &e.to_string(),
                &Retry::Reload(uri.to_string()),
            );
        }
    };

    let key = params.view_key();
    let format = params.format;
    let controller = state.views.mount(params).await;
    let view = controller.state().read().await;

    let ctx = PageContext {
        view_key: &key,
        format,
        generation: view.generation,
    };
    match state.shell.present(ctx, view.render.as_ref(), &state.components) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!(view = %key, error = %e, "Failed to present view");
            error_response(
                state,
                StatusCode::INTERNAL_SERVER_ERROR,
                &e.to_string(),
                &Retry::Rerender(retry_href(&key, uri)),
            )
        }
    }
}

/// Error page, or plain text if even that cannot be rendered
fn error_response(state: &AppState, status: StatusCode, message: &str, retry: &Retry) -> Response {
    match state.shell.error_page(message, retry) {
        Ok(page) => (status, Html(page)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render error page");
            (status, format!("Something went wrong: {message}")).into_response()
        }
    }
}

fn retry_href(key: &str, uri: &Uri) -> String {
    let query: String = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("view", key)
        .append_pair("back", &uri.to_string())
        .finish();
    format!("{RETRY_PATH}?{query}")
}

#[derive(Debug, Deserialize)]
pub struct ViewQuery {
    pub view: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub generation: u64,
    pub revision: u64,
}

pub async fn view_generation(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
) -> Result<Json<GenerationResponse>, StatusCode> {
    let controller = state
        .views
        .get(&query.view)
        .await
        .ok_or(StatusCode::NOT_FOUND)?;
    let view = controller.state().read().await;
    Ok(Json(GenerationResponse {
        generation: view.generation,
        revision: view.revision.last_seen_revision,
    }))
}

#[derive(Debug, Deserialize)]
pub struct RetryQuery {
    pub view: String,
    pub back: Option<String>,
}

pub async fn retry_view(
    State(state): State<AppState>,
    Query(query): Query<RetryQuery>,
) -> Result<Redirect, StatusCode> {
    let controller = state
        .views
        .get(&query.view)
        .await
        .ok_or(StatusCode::NOT_FOUND)?;
    controller.rerender().await;
    tracing::info!(view = %query.view, "Manual retry");

    // Only redirect back into the viewer
    let back = query
        .back
        .filter(|b| b.starts_with("/output"))
        .unwrap_or_else(|| "/output".to_string());
    Ok(Redirect::to(&back))
}

// =============================================================================
// Content API
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct FileQuery {
    #[serde(rename = "filePath")]
    pub file_path: String,
}

#[derive(Debug, Deserialize)]
pub struct PadQuery {
    pub pad: String,
    pub rev: Option<u64>,
}

fn source_status(e: &SourceError) -> StatusCode {
    match e {
        SourceError::InvalidLocation(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::BAD_GATEWAY,
    }
}

pub async fn file_content(
    State(state): State<AppState>,
    Query(query): Query<FileQuery>,
) -> Result<Json<ContentResponse>, StatusCode> {
    let content = state
        .source
        .file_content(&query.file_path)
        .await
        .map_err(|e| {
            tracing::warn!(file = %query.file_path, error = %e, "File lookup failed");
            source_status(&e)
        })?;
    Ok(Json(ContentResponse { content }))
}

pub async fn pad_revisions(
    State(state): State<AppState>,
    Query(query): Query<PadQuery>,
) -> Result<Json<RevisionResponse>, StatusCode> {
    let rev = state.source.pad_revision(&query.pad).await.map_err(|e| {
        tracing::warn!(pad = %query.pad, error = %e, "Revision lookup failed");
        source_status(&e)
    })?;
    Ok(Json(RevisionResponse { rev: Some(rev) }))
}

/// Pad text at `rev`, or at the current revision when `rev` is omitted
pub async fn pad_content(
    State(state): State<AppState>,
    Query(query): Query<PadQuery>,
) -> Result<Json<ContentResponse>, StatusCode> {
    let content = pad_text(&state, &query).await.map_err(|e| {
        tracing::warn!(pad = %query.pad, error = %e, "Pad lookup failed");
        source_status(&e)
    })?;
    Ok(Json(ContentResponse { content }))
}

async fn pad_text(state: &AppState, query: &PadQuery) -> Result<Option<String>, SourceError> {
    let rev = match query.rev {
        Some(rev) => rev,
        None => state.source.pad_revision(&query.pad).await?,
    };
    state.source.pad_content(&query.pad, rev).await
}

// =============================================================================
// Misc
// =============================================================================

pub async fn health() -> impl IntoResponse {
    #[derive(Serialize)]
    struct HealthResponse {
        status: &'static str,
    }

    Json(HealthResponse { status: "ok" })
}

pub async fn print_stylesheet() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css")], theme::PRINT_CSS)
}
