use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(sqlx::Type, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum InsuranceCover {
    Full,
    ThirdParty,
}

/// Vehicle policy details, one per client. A null renewal_date means
/// no renewal is scheduled and the record stays out of renewal queries.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct VehicleInsurance {
    pub id: i64,
    #[serde(rename = "client")]
    pub client_id: i64,
    pub vehicle_type: String,
    pub insurance_cover: InsuranceCover,
    pub renewal_date: Option<NaiveDate>,
}
