//! Renewal summary, listing, and renew endpoints for both lines of
//! business. The month interval restricts the rows in SQL; the
//! pending/missed/dismissed split happens in `crate::renewals`.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::AppState;
use crate::error::{ApiError, require};
use crate::renewals::{
    HealthRenewalEntry, HealthSummary, RenewalStatus, VehicleRenewalEntry, VehicleSummary,
    month_range, parse_renewal_date, summarize_health, summarize_vehicle,
};

#[derive(Debug, Deserialize)]
pub struct RenewalQuery {
    pub month: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RenewPayload {
    pub next_renewal_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetRenewalPayload {
    pub renewal_date: Option<String>,
}

fn requested_status(raw: Option<String>) -> Result<RenewalStatus, ApiError> {
    match raw {
        Some(s) => s.parse(),
        None => Ok(RenewalStatus::Pending),
    }
}

pub async fn health_summary(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RenewalQuery>,
) -> Result<Json<HealthSummary>, ApiError> {
    let month = require(query.month, "month")?;
    let (start, end) = month_range(&month)?;
    let today = Utc::now().date_naive();

    let rows = state.db.health_renewals_between(start, end).await?;
    Ok(Json(summarize_health(&rows, today, &month)))
}

pub async fn health_list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RenewalQuery>,
) -> Result<Json<Vec<HealthRenewalEntry>>, ApiError> {
    let month = require(query.month, "month")?;
    let status = requested_status(query.status)?;
    let (start, end) = month_range(&month)?;
    let today = Utc::now().date_naive();

    let rows = state.db.health_renewals_between(start, end).await?;
    let entries: Vec<_> = rows
        .into_iter()
        .filter(|row| row.status(today) == status)
        .map(|row| row.into_entry())
        .collect();

    Ok(Json(entries))
}

pub async fn health_renew(
    State(state): State<Arc<AppState>>,
    Path(client_id): Path<i64>,
    Json(payload): Json<RenewPayload>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let raw = require(payload.next_renewal_date, "next_renewal_date")?;
    let next_date = parse_renewal_date(&raw)?;

    let updated = state.db.renew_health(client_id, next_date).await?;
    if updated == 0 {
        return Err(ApiError::not_found("health insurance for this client"));
    }

    tracing::info!(client_id, %next_date, "renewed health policy");

    Ok(Json(json!({
        "success": true,
        "client_id": client_id,
        "next_renewal_date": next_date,
    })))
}

pub async fn vehicle_summary(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RenewalQuery>,
) -> Result<Json<VehicleSummary>, ApiError> {
    let month = require(query.month, "month")?;
    let (start, end) = month_range(&month)?;
    let today = Utc::now().date_naive();

    let rows = state.db.vehicle_renewals_between(start, end).await?;
    Ok(Json(summarize_vehicle(&rows, today, &month)))
}

pub async fn vehicle_list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RenewalQuery>,
) -> Result<Json<Vec<VehicleRenewalEntry>>, ApiError> {
    let month = require(query.month, "month")?;
    let status = requested_status(query.status)?;
    let (start, end) = month_range(&month)?;
    let today = Utc::now().date_naive();

    let rows = state.db.vehicle_renewals_between(start, end).await?;
    let entries: Vec<_> = rows
        .into_iter()
        .filter(|row| row.status(today) == status)
        .map(|row| row.into_entry())
        .collect();

    Ok(Json(entries))
}

pub async fn vehicle_renew(
    State(state): State<Arc<AppState>>,
    Path(client_id): Path<i64>,
    Json(payload): Json<RenewPayload>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let raw = require(payload.next_renewal_date, "next_renewal_date")?;
    let next_date = parse_renewal_date(&raw)?;

    let updated = state.db.renew_vehicle(client_id, next_date).await?;
    if updated == 0 {
        return Err(ApiError::not_found("vehicle insurance for this client"));
    }

    tracing::info!(client_id, %next_date, "renewed vehicle policy");

    Ok(Json(json!({
        "success": true,
        "client_id": client_id,
        "next_renewal_date": next_date,
    })))
}

/// Same mutation as renew but with the field name the scheduling form
/// sends.
pub async fn vehicle_set(
    State(state): State<Arc<AppState>>,
    Path(client_id): Path<i64>,
    Json(payload): Json<SetRenewalPayload>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let raw = require(payload.renewal_date, "renewal_date")?;
    let renewal_date = parse_renewal_date(&raw)?;

    let updated = state.db.renew_vehicle(client_id, renewal_date).await?;
    if updated == 0 {
        return Err(ApiError::not_found("vehicle insurance for this client"));
    }

    Ok(Json(json!({
        "success": true,
        "client_id": client_id,
        "renewal_date": renewal_date,
    })))
}
