use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(sqlx::Type, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Rc,
    Aadhaar,
    Policy,
}

/// An uploaded client document. `file_path` is relative to the media
/// root; deleting the record also removes the file.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct Document {
    pub id: i64,
    #[serde(rename = "client")]
    pub client_id: i64,
    pub document_type: DocumentType,
    pub file_path: String,
    pub file_name: String,
    pub uploaded_at: DateTime<Utc>,
}
