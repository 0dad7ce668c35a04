use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct Quote {
    pub id: i64,
    #[serde(rename = "client")]
    pub client_id: i64,
    pub company_name: String,
    pub premium_amount: f64,
    pub created_at: DateTime<Utc>,
}
