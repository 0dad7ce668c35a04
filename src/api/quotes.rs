use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;

use crate::AppState;
use crate::error::{ApiError, require};
use crate::models::Quote;

#[derive(Debug, Deserialize)]
pub struct QuotePayload {
    #[serde(rename = "client")]
    pub client_id: Option<i64>,
    pub company_name: Option<String>,
    pub premium_amount: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct QuoteListQuery {
    pub client: Option<i64>,
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<QuoteListQuery>,
) -> Result<Json<Vec<Quote>>, ApiError> {
    Ok(Json(state.db.get_quotes(query.client).await?))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<QuotePayload>,
) -> Result<(StatusCode, Json<Quote>), ApiError> {
    let client_id = require(payload.client_id, "client")?;
    let company_name = require(payload.company_name, "company_name")?;
    let premium_amount = require(payload.premium_amount, "premium_amount")?;

    state
        .db
        .get_client(client_id)
        .await?
        .ok_or_else(|| ApiError::not_found("client"))?;

    let id = state
        .db
        .create_quote(client_id, &company_name, premium_amount)
        .await?;
    let quote = state
        .db
        .get_quote(id)
        .await?
        .ok_or_else(|| ApiError::not_found("quote"))?;

    Ok((StatusCode::CREATED, Json(quote)))
}

pub async fn retrieve(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Quote>, ApiError> {
    let quote = state
        .db
        .get_quote(id)
        .await?
        .ok_or_else(|| ApiError::not_found("quote"))?;
    Ok(Json(quote))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<QuotePayload>,
) -> Result<Json<Quote>, ApiError> {
    let company_name = require(payload.company_name, "company_name")?;
    let premium_amount = require(payload.premium_amount, "premium_amount")?;

    let updated = state.db.update_quote(id, &company_name, premium_amount).await?;
    if updated == 0 {
        return Err(ApiError::not_found("quote"));
    }

    let quote = state
        .db
        .get_quote(id)
        .await?
        .ok_or_else(|| ApiError::not_found("quote"))?;
    Ok(Json(quote))
}

pub async fn destroy(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let deleted = state.db.delete_quote(id).await?;
    if deleted == 0 {
        return Err(ApiError::not_found("quote"));
    }
    Ok(StatusCode::NO_CONTENT)
}
