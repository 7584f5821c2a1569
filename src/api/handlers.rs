use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::AppResult;
use crate::models::{Card, Genre, MediaKind, SearchResult, TitleDetail, TrackedRecord, WatchStatus};

use super::identity::Identity;
use super::AppState;

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub kind: MediaKind,
    pub q: String,
}

/// Title search against the metadata provider.
///
/// A blank query is answered with an empty list without an upstream call.
pub async fn search_titles(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<SearchResult>>> {
    if params.q.trim().is_empty() {
        return Ok(Json(Vec::new()));
    }

    let results = state.provider.search_titles(params.kind, &params.q).await?;
    Ok(Json(results))
}

/// Full title detail for the detail modal
pub async fn get_title_detail(
    State(state): State<AppState>,
    Path((kind, id)): Path<(MediaKind, i64)>,
) -> AppResult<Json<TitleDetail>> {
    let detail = state.provider.get_title_detail(kind, id).await?;
    Ok(Json(detail))
}

/// Everything the caller tracks; the board hydrates from this once per session
pub async fn list_board(
    State(state): State<AppState>,
    Identity(user): Identity,
) -> AppResult<Json<Vec<TrackedRecord>>> {
    let records = state.store.list_tracked(&user).await?;
    Ok(Json(records))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCardRequest {
    pub id: i64,
    pub media_kind: MediaKind,
    pub status: WatchStatus,
    pub title: String,
    #[serde(default)]
    pub poster_path: String,
    #[serde(default)]
    pub genres: Vec<Genre>,
}

impl From<AddCardRequest> for Card {
    fn from(req: AddCardRequest) -> Self {
        Card {
            id: req.id,
            media_kind: req.media_kind,
            title: req.title,
            poster_path: req.poster_path,
            genres: req.genres,
            status: req.status,
            order: 0,
        }
    }
}

/// Adds a title to the caller's board; 409 when already tracked
pub async fn add_card(
    State(state): State<AppState>,
    Identity(user): Identity,
    Json(request): Json<AddCardRequest>,
) -> AppResult<(StatusCode, Json<TrackedRecord>)> {
    let card = Card::from(request);
    let record = state.store.create_tracked(&user, &card).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: WatchStatus,
}

/// Moves a card to another lane; 404 when the caller does not track it
pub async fn set_card_status(
    State(state): State<AppState>,
    Identity(user): Identity,
    Path(id): Path<i64>,
    Json(request): Json<SetStatusRequest>,
) -> AppResult<Json<TrackedRecord>> {
    let record = state.store.set_status(&user, id, request.status).await?;
    Ok(Json(record))
}

/// Removes a card from the caller's board; 404 when absent
pub async fn delete_card(
    State(state): State<AppState>,
    Identity(user): Identity,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.store.delete_tracked(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
