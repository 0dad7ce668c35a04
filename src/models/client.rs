use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which line of business a prospect came in for.
#[derive(sqlx::Type, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum InsuranceType {
    Vehicle,
    Health,
}

impl std::fmt::Display for InsuranceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InsuranceType::Vehicle => write!(f, "vehicle"),
            InsuranceType::Health => write!(f, "health"),
        }
    }
}

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct Client {
    pub id: i64,
    pub name: String,
    pub mobile: String,
    pub place: String,
    pub insurance_type: InsuranceType,
    pub created_at: DateTime<Utc>,
    pub is_converted: bool,
}
