//! Uploaded client documents. Files arrive base64-encoded in the JSON
//! body and live under the media root; the row stores the relative
//! path, so record deletion also removes the file.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use serde_json::json;

use crate::AppState;
use crate::error::{ApiError, require};
use crate::models::{Document, DocumentType};

#[derive(Debug, Deserialize)]
pub struct DocumentPayload {
    #[serde(rename = "client")]
    pub client_id: Option<i64>,
    pub document_type: Option<DocumentType>,
    pub file_name: Option<String>,
    pub content_base64: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DocumentListQuery {
    pub client: Option<i64>,
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DocumentListQuery>,
) -> Result<Json<Vec<Document>>, ApiError> {
    Ok(Json(state.db.get_documents(query.client).await?))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<DocumentPayload>,
) -> Result<(StatusCode, Json<Document>), ApiError> {
    let client_id = require(payload.client_id, "client")?;
    let document_type = require(payload.document_type, "document_type")?;
    let file_name = require(payload.file_name, "file_name")?;
    let content = require(payload.content_base64, "content_base64")?;

    state
        .db
        .get_client(client_id)
        .await?
        .ok_or_else(|| ApiError::not_found("client"))?;

    let bytes = BASE64
        .decode(content.as_bytes())
        .map_err(|e| ApiError::InvalidFormat(format!("invalid base64 content: {e}")))?;

    let file_path = state.media.save(&file_name, &bytes)?;
    let id = state
        .db
        .create_document(client_id, document_type, &file_path, &file_name)
        .await?;
    let document = state
        .db
        .get_document(id)
        .await?
        .ok_or_else(|| ApiError::not_found("document"))?;

    tracing::info!(document_id = id, client_id, "stored document {file_path}");

    Ok((StatusCode::CREATED, Json(document)))
}

pub async fn retrieve(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Document>, ApiError> {
    let document = state
        .db
        .get_document(id)
        .await?
        .ok_or_else(|| ApiError::not_found("document"))?;
    Ok(Json(document))
}

/// Metadata-only update: the stored file never changes here, so the
/// body carries no content and `file_path` stays as uploaded.
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<DocumentPayload>,
) -> Result<Json<Document>, ApiError> {
    let document_type = require(payload.document_type, "document_type")?;
    let file_name = require(payload.file_name, "file_name")?;

    let updated = state.db.update_document(id, document_type, &file_name).await?;
    if updated == 0 {
        return Err(ApiError::not_found("document"));
    }

    let document = state
        .db
        .get_document(id)
        .await?
        .ok_or_else(|| ApiError::not_found("document"))?;
    Ok(Json(document))
}

/// Remove the stored file first, then the record.
pub async fn destroy(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let document = state
        .db
        .get_document(id)
        .await?
        .ok_or_else(|| ApiError::not_found("document"))?;

    state.media.delete(&document.file_path)?;
    state.db.delete_document(id).await?;

    Ok(Json(json!({ "success": true })))
}
