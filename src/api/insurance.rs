//! CRUD for the per-client vehicle and health detail records. The
//! schema allows a client to hold both kinds regardless of its declared
//! insurance_type; nothing here enforces a pairing.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::AppState;
use crate::error::{ApiError, require};
use crate::models::{FloaterType, HealthInsurance, InsuranceCover, VehicleInsurance};
use crate::renewals::parse_renewal_date;

#[derive(Debug, Deserialize)]
pub struct VehiclePayload {
    #[serde(rename = "client")]
    pub client_id: Option<i64>,
    pub vehicle_type: Option<String>,
    pub insurance_cover: Option<InsuranceCover>,
    pub renewal_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HealthPayload {
    #[serde(rename = "client")]
    pub client_id: Option<i64>,
    pub floater_type: Option<FloaterType>,
    #[serde(default)]
    pub ages: String,
    #[serde(default)]
    pub ped: String,
    pub renewal_date: Option<String>,
    pub renewal_dismissed: Option<bool>,
}

fn parse_optional_date(raw: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    raw.map(parse_renewal_date).transpose()
}

// Vehicle insurance

pub async fn list_vehicle(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<VehicleInsurance>>, ApiError> {
    Ok(Json(state.db.get_vehicle_list().await?))
}

pub async fn create_vehicle(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<VehiclePayload>,
) -> Result<(StatusCode, Json<VehicleInsurance>), ApiError> {
    let client_id = require(payload.client_id, "client")?;
    let vehicle_type = require(payload.vehicle_type, "vehicle_type")?;
    let insurance_cover = require(payload.insurance_cover, "insurance_cover")?;
    let renewal_date = parse_optional_date(payload.renewal_date.as_deref())?;

    state
        .db
        .get_client(client_id)
        .await?
        .ok_or_else(|| ApiError::not_found("client"))?;

    let id = state
        .db
        .create_vehicle(client_id, &vehicle_type, insurance_cover, renewal_date)
        .await?;
    let row = state
        .db
        .get_vehicle(id)
        .await?
        .ok_or_else(|| ApiError::not_found("vehicle insurance"))?;

    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn retrieve_vehicle(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<VehicleInsurance>, ApiError> {
    let row = state
        .db
        .get_vehicle(id)
        .await?
        .ok_or_else(|| ApiError::not_found("vehicle insurance"))?;
    Ok(Json(row))
}

pub async fn update_vehicle(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<VehiclePayload>,
) -> Result<Json<VehicleInsurance>, ApiError> {
    let vehicle_type = require(payload.vehicle_type, "vehicle_type")?;
    let insurance_cover = require(payload.insurance_cover, "insurance_cover")?;
    let renewal_date = parse_optional_date(payload.renewal_date.as_deref())?;

    let updated = state
        .db
        .update_vehicle(id, &vehicle_type, insurance_cover, renewal_date)
        .await?;
    if updated == 0 {
        return Err(ApiError::not_found("vehicle insurance"));
    }

    let row = state
        .db
        .get_vehicle(id)
        .await?
        .ok_or_else(|| ApiError::not_found("vehicle insurance"))?;
    Ok(Json(row))
}

pub async fn destroy_vehicle(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let deleted = state.db.delete_vehicle(id).await?;
    if deleted == 0 {
        return Err(ApiError::not_found("vehicle insurance"));
    }
    Ok(StatusCode::NO_CONTENT)
}

// Health insurance

pub async fn list_health(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<HealthInsurance>>, ApiError> {
    Ok(Json(state.db.get_health_list().await?))
}

pub async fn create_health(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<HealthPayload>,
) -> Result<(StatusCode, Json<HealthInsurance>), ApiError> {
    let client_id = require(payload.client_id, "client")?;
    let floater_type = require(payload.floater_type, "floater_type")?;
    let renewal_date = parse_optional_date(payload.renewal_date.as_deref())?;

    state
        .db
        .get_client(client_id)
        .await?
        .ok_or_else(|| ApiError::not_found("client"))?;

    let id = state
        .db
        .create_health(client_id, floater_type, &payload.ages, &payload.ped, renewal_date)
        .await?;
    let row = state
        .db
        .get_health(id)
        .await?
        .ok_or_else(|| ApiError::not_found("health insurance"))?;

    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn retrieve_health(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<HealthInsurance>, ApiError> {
    let row = state
        .db
        .get_health(id)
        .await?
        .ok_or_else(|| ApiError::not_found("health insurance"))?;
    Ok(Json(row))
}

/// Full update of a health record. This is also how a renewal gets
/// dismissed: the caller flips renewal_dismissed here.
pub async fn update_health(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<HealthPayload>,
) -> Result<Json<HealthInsurance>, ApiError> {
    let floater_type = require(payload.floater_type, "floater_type")?;
    let renewal_date = parse_optional_date(payload.renewal_date.as_deref())?;
    let renewal_dismissed = payload.renewal_dismissed.unwrap_or(false);

    let updated = state
        .db
        .update_health(
            id,
            floater_type,
            &payload.ages,
            &payload.ped,
            renewal_date,
            renewal_dismissed,
        )
        .await?;
    if updated == 0 {
        return Err(ApiError::not_found("health insurance"));
    }

    let row = state
        .db
        .get_health(id)
        .await?
        .ok_or_else(|| ApiError::not_found("health insurance"))?;
    Ok(Json(row))
}

pub async fn destroy_health(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let deleted = state.db.delete_health(id).await?;
    if deleted == 0 {
        return Err(ApiError::not_found("health insurance"));
    }
    Ok(StatusCode::NO_CONTENT)
}
