use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::AppState;
use crate::error::{ApiError, require};
use crate::models::{
    Client, Document, HealthInsurance, InsuranceType, LeadConversion, Note, Quote,
    VehicleInsurance,
};

#[derive(Debug, Deserialize)]
pub struct ClientPayload {
    pub name: Option<String>,
    pub mobile: Option<String>,
    #[serde(default)]
    pub place: String,
    pub insurance_type: Option<InsuranceType>,
}

#[derive(Debug, Deserialize)]
pub struct ClientListQuery {
    pub insurance_type: Option<InsuranceType>,
}

/// Client row plus its insurance detail records, the shape the list
/// view returns.
#[derive(Debug, Serialize)]
pub struct ClientWithDetails {
    #[serde(flatten)]
    pub client: Client,
    pub vehicle_details: Option<VehicleInsurance>,
    pub health_details: Option<HealthInsurance>,
}

/// Full client view: details plus every owned collection.
#[derive(Debug, Serialize)]
pub struct ClientDetail {
    #[serde(flatten)]
    pub client: Client,
    pub vehicle_details: Option<VehicleInsurance>,
    pub health_details: Option<HealthInsurance>,
    pub quotes: Vec<Quote>,
    pub notes: Vec<Note>,
    pub documents: Vec<Document>,
    pub conversions: Vec<LeadConversion>,
}

async fn with_details(state: &AppState, client: Client) -> Result<ClientWithDetails, ApiError> {
    let vehicle_details = state.db.get_vehicle_by_client(client.id).await?;
    let health_details = state.db.get_health_by_client(client.id).await?;
    Ok(ClientWithDetails {
        client,
        vehicle_details,
        health_details,
    })
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ClientListQuery>,
) -> Result<Json<Vec<ClientWithDetails>>, ApiError> {
    let clients = state.db.get_clients(query.insurance_type).await?;

    let mut out = Vec::with_capacity(clients.len());
    for client in clients {
        out.push(with_details(&state, client).await?);
    }

    Ok(Json(out))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ClientPayload>,
) -> Result<(StatusCode, Json<ClientWithDetails>), ApiError> {
    let name = require(payload.name, "name")?;
    let mobile = require(payload.mobile, "mobile")?;
    let insurance_type = require(payload.insurance_type, "insurance_type")?;

    let id = state
        .db
        .create_client(&name, &mobile, &payload.place, insurance_type)
        .await?;
    let client = state
        .db
        .get_client(id)
        .await?
        .ok_or_else(|| ApiError::not_found("client"))?;

    tracing::info!(client_id = id, "created client");

    Ok((StatusCode::CREATED, Json(with_details(&state, client).await?)))
}

pub async fn retrieve(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ClientDetail>, ApiError> {
    let client = state
        .db
        .get_client(id)
        .await?
        .ok_or_else(|| ApiError::not_found("client"))?;

    let vehicle_details = state.db.get_vehicle_by_client(id).await?;
    let health_details = state.db.get_health_by_client(id).await?;
    let quotes = state.db.get_quotes(Some(id)).await?;
    let notes = state.db.get_notes(Some(id)).await?;
    let documents = state.db.get_documents(Some(id)).await?;
    let conversions = state.db.get_conversions(id).await?;

    Ok(Json(ClientDetail {
        client,
        vehicle_details,
        health_details,
        quotes,
        notes,
        documents,
        conversions,
    }))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<ClientPayload>,
) -> Result<Json<ClientWithDetails>, ApiError> {
    let name = require(payload.name, "name")?;
    let mobile = require(payload.mobile, "mobile")?;
    let insurance_type = require(payload.insurance_type, "insurance_type")?;

    let updated = state
        .db
        .update_client(id, &name, &mobile, &payload.place, insurance_type)
        .await?;
    if updated == 0 {
        return Err(ApiError::not_found("client"));
    }

    let client = state
        .db
        .get_client(id)
        .await?
        .ok_or_else(|| ApiError::not_found("client"))?;

    Ok(Json(with_details(&state, client).await?))
}

/// Cascade delete via the standard collection endpoint.
pub async fn destroy(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    delete_client_and_files(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Cascade delete with an explicit confirmation body.
pub async fn full_delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    delete_client_and_files(&state, id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Client deleted fully",
    })))
}

async fn delete_client_and_files(state: &AppState, id: i64) -> Result<(), ApiError> {
    let file_paths = state
        .db
        .delete_client(id)
        .await?
        .ok_or_else(|| ApiError::not_found("client"))?;

    // Rows are gone; best-effort removal of the files they pointed at.
    for path in &file_paths {
        if let Err(e) = state.media.delete(path) {
            tracing::warn!("failed to remove document file {path}: {e}");
        }
    }

    tracing::info!(client_id = id, "deleted client and owned records");
    Ok(())
}

/// Follow-up history for one client, latest first.
pub async fn history(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Note>>, ApiError> {
    state
        .db
        .get_client(id)
        .await?
        .ok_or_else(|| ApiError::not_found("client"))?;

    let notes = state.db.get_client_history(id).await?;
    Ok(Json(notes))
}
