use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// A follow-up note. Notes with `reminder` set feed the today/overdue/
/// upcoming views until they are completed.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct Note {
    pub id: i64,
    #[serde(rename = "client")]
    pub client_id: i64,
    pub text: String,
    pub follow_up_date: NaiveDate,
    pub reminder: bool,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}
