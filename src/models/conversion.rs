use chrono::{DateTime, Utc};
use serde::Serialize;

/// Validated conversion details ready to be inserted.
#[derive(Debug, Clone)]
pub struct NewLeadConversion {
    pub posp_code: String,
    pub customer_name: String,
    pub company_name: String,
    pub premium_amount: f64,
    pub policy_number: String,
    pub customer_mobile: String,
}

/// Recorded when a prospect becomes a paying customer. Creating one
/// flips the owning client's `is_converted` flag; it never reverts.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct LeadConversion {
    pub id: i64,
    #[serde(rename = "client")]
    pub client_id: i64,
    pub posp_code: String,
    pub customer_name: String,
    pub company_name: String,
    pub premium_amount: f64,
    pub policy_number: String,
    pub customer_mobile: String,
    pub created_at: DateTime<Utc>,
}
