use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;

use crate::AppState;
use crate::error::ApiError;
use crate::models::{LeadConversion, NewLeadConversion};

#[derive(Debug, Deserialize)]
pub struct ConversionPayload {
    pub posp_code: Option<String>,
    pub customer_name: Option<String>,
    pub company_name: Option<String>,
    pub premium_amount: Option<f64>,
    pub policy_number: Option<String>,
    pub customer_mobile: Option<String>,
}

impl ConversionPayload {
    fn validate(self) -> Result<NewLeadConversion, ApiError> {
        fn field<T>(value: Option<T>, name: &str) -> Result<T, ApiError> {
            value.ok_or_else(|| ApiError::Validation(format!("{name} is required")))
        }

        Ok(NewLeadConversion {
            posp_code: field(self.posp_code, "posp_code")?,
            customer_name: field(self.customer_name, "customer_name")?,
            company_name: field(self.company_name, "company_name")?,
            premium_amount: field(self.premium_amount, "premium_amount")?,
            policy_number: field(self.policy_number, "policy_number")?,
            customer_mobile: field(self.customer_mobile, "customer_mobile")?,
        })
    }
}

/// Turn a prospect into a customer: records the conversion and flips
/// `is_converted`. Converting again just adds another record.
pub async fn convert(
    State(state): State<Arc<AppState>>,
    Path(client_id): Path<i64>,
    Json(payload): Json<ConversionPayload>,
) -> Result<Json<LeadConversion>, ApiError> {
    state
        .db
        .get_client(client_id)
        .await?
        .ok_or_else(|| ApiError::not_found("client"))?;

    let conversion = payload.validate()?;
    let id = state.db.create_conversion(client_id, &conversion).await?;

    let created = state
        .db
        .get_conversion(id)
        .await?
        .ok_or_else(|| ApiError::not_found("lead conversion"))?;

    tracing::info!(client_id, conversion_id = id, "converted client");

    Ok(Json(created))
}
