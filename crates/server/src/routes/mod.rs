use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
};
use serde_json::{json, Value};
use shared::{Annotation, AppendResponse, AskRequest, AskResponse};

use crate::ai;
use crate::error::GalleryError;
use crate::pages;
use crate::AppState;

/// Health check
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let lister = state.datasets.clone();
    let datasets = tokio::task::spawn_blocking(move || lister.list().len())
        .await
        .unwrap_or(0);
    Json(json!({
        "status": "ok",
        "ai_enabled": state.gateway.is_some(),
        "datasets": datasets,
    }))
}

/// Gallery of completed tile pyramids
pub async fn gallery(State(state): State<AppState>) -> Html<String> {
    let lister = state.datasets.clone();
    let datasets = tokio::task::spawn_blocking(move || lister.list())
        .await
        .unwrap_or_else(|e| {
            tracing::error!("dataset scan failed: {}", e);
            Vec::new()
        });
    Html(pages::gallery(&datasets, &state.pairs))
}

/// Viewer page for one dataset
pub async fn viewer(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Html<String>, GalleryError> {
    require_dataset(&state, &name).await?;
    tracing::info!("viewer requested dataset={}", name);
    Ok(Html(pages::viewer(
        &name,
        &state.datasets.manifest_url(&name),
        state.pairs.partner(&name),
    )))
}

/// Side-by-side view of two datasets
pub async fn compare(
    State(state): State<AppState>,
    Path((left, right)): Path<(String, String)>,
) -> Result<Html<String>, GalleryError> {
    require_datasets(&state, &[left.as_str(), right.as_str()]).await?;
    Ok(Html(pages::compare(
        &left,
        &right,
        &state.datasets.manifest_url(&left),
        &state.datasets.manifest_url(&right),
    )))
}

/// Annotations for a dataset, never cached by the browser
pub async fn get_annotations(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, GalleryError> {
    require_dataset(&state, &name).await?;
    let store = state.annotations.clone();
    let annotations = tokio::task::spawn_blocking(move || store.get(&name))
        .await
        .map_err(|e| GalleryError::Storage(std::io::Error::other(e)))?;

    Ok((
        [(header::CACHE_CONTROL, "no-store, no-cache, must-revalidate")],
        Json(annotations),
    )
        .into_response())
}

/// Append one annotation
pub async fn add_annotation(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<AppendResponse>), GalleryError> {
    require_dataset(&state, &name).await?;

    let annotation = if body.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        Annotation::from_value(serde_json::from_slice(&body)?)
    };

    let store = state.annotations.clone();
    tokio::task::spawn_blocking(move || store.append(&name, annotation))
        .await
        .map_err(|e| GalleryError::Storage(std::io::Error::other(e)))??;

    Ok((StatusCode::CREATED, Json(AppendResponse { success: true })))
}

/// Ask the vision model about a captured region of a dataset
pub async fn ask(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Json<AskResponse>, GalleryError> {
    answer_visual_query(&state, Some(&name), &body).await
}

/// Same as [`ask`], without a dataset in the path
pub async fn query_visual_rag(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<AskResponse>, GalleryError> {
    answer_visual_query(&state, None, &body).await
}

async fn answer_visual_query(
    state: &AppState,
    dataset: Option<&str>,
    body: &[u8],
) -> Result<Json<AskResponse>, GalleryError> {
    let gateway = state.gateway.as_ref().ok_or(GalleryError::AiUnavailable)?;

    let request: AskRequest = serde_json::from_slice(body)?;
    let question = request
        .question
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| GalleryError::InvalidInput("Missing question".to_string()))?;
    let raw_image = request
        .image
        .as_deref()
        .filter(|i| !i.trim().is_empty())
        .ok_or_else(|| GalleryError::InvalidInput("Missing image".to_string()))?;

    let image = ai::decode_image(raw_image)?;
    tracing::info!(
        "visual query dataset={} question_len={}",
        dataset.unwrap_or("-"),
        question.len()
    );

    let answer = gateway.ask(question, &image).await?;
    Ok(Json(AskResponse { answer }))
}

async fn require_dataset(state: &AppState, name: &str) -> Result<(), GalleryError> {
    require_datasets(state, &[name]).await
}

/// Checks every name against a single scan of the tiles root.
async fn require_datasets(state: &AppState, names: &[&str]) -> Result<(), GalleryError> {
    let lister = state.datasets.clone();
    let known = tokio::task::spawn_blocking(move || lister.list())
        .await
        .unwrap_or_default();
    for name in names {
        if !known.iter().any(|k| k.as_str() == *name) {
            return Err(GalleryError::NotFound(name.to_string()));
        }
    }
    Ok(())
}
