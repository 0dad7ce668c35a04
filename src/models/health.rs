use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(sqlx::Type, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FloaterType {
    Individual,
    Family,
}

/// Health policy details, one per client. `ages` is a free-text,
/// comma-separated list; `ped` holds pre-existing disease notes.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct HealthInsurance {
    pub id: i64,
    #[serde(rename = "client")]
    pub client_id: i64,
    pub floater_type: FloaterType,
    pub ages: String,
    pub ped: String,
    pub renewal_date: Option<NaiveDate>,
    pub renewal_dismissed: bool,
}
