//! Follow-up notes and the reminder views built over them.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::AppState;
use crate::error::{ApiError, require};
use crate::models::Note;

/// The listing window for upcoming follow-ups.
const UPCOMING_LIST_DAYS: i64 = 30;
/// The dashboard summary uses a tighter window than the listing.
const UPCOMING_SUMMARY_DAYS: i64 = 7;

#[derive(Debug, Deserialize)]
pub struct NotePayload {
    #[serde(rename = "client")]
    pub client_id: Option<i64>,
    pub text: Option<String>,
    pub follow_up_date: Option<String>,
    pub reminder: Option<bool>,
    pub completed: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct NoteListQuery {
    pub client: Option<i64>,
}

fn parse_follow_up_date(raw: &str) -> Result<chrono::NaiveDate, ApiError> {
    chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        ApiError::InvalidFormat(format!("invalid follow_up_date '{raw}', expected YYYY-MM-DD"))
    })
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NoteListQuery>,
) -> Result<Json<Vec<Note>>, ApiError> {
    Ok(Json(state.db.get_notes(query.client).await?))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NotePayload>,
) -> Result<(StatusCode, Json<Note>), ApiError> {
    let client_id = require(payload.client_id, "client")?;
    let text = require(payload.text, "text")?;
    let follow_up_date = parse_follow_up_date(&require(payload.follow_up_date, "follow_up_date")?)?;
    let reminder = payload.reminder.unwrap_or(true);

    state
        .db
        .get_client(client_id)
        .await?
        .ok_or_else(|| ApiError::not_found("client"))?;

    let id = state
        .db
        .create_note(client_id, &text, follow_up_date, reminder)
        .await?;
    let note = state
        .db
        .get_note(id)
        .await?
        .ok_or_else(|| ApiError::not_found("note"))?;

    Ok((StatusCode::CREATED, Json(note)))
}

pub async fn retrieve(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Note>, ApiError> {
    let note = state
        .db
        .get_note(id)
        .await?
        .ok_or_else(|| ApiError::not_found("note"))?;
    Ok(Json(note))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<NotePayload>,
) -> Result<Json<Note>, ApiError> {
    let text = require(payload.text, "text")?;
    let follow_up_date = parse_follow_up_date(&require(payload.follow_up_date, "follow_up_date")?)?;
    let reminder = payload.reminder.unwrap_or(true);
    let completed = payload.completed.unwrap_or(false);

    let updated = state
        .db
        .update_note(id, &text, follow_up_date, reminder, completed)
        .await?;
    if updated == 0 {
        return Err(ApiError::not_found("note"));
    }

    let note = state
        .db
        .get_note(id)
        .await?
        .ok_or_else(|| ApiError::not_found("note"))?;
    Ok(Json(note))
}

pub async fn destroy(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let deleted = state.db.delete_note(id).await?;
    if deleted == 0 {
        return Err(ApiError::not_found("note"));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Open reminders due today.
pub async fn today(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Note>>, ApiError> {
    let today = Utc::now().date_naive();
    Ok(Json(state.db.notes_on(today).await?))
}

/// Open reminders whose follow-up date has already passed.
pub async fn overdue(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Note>>, ApiError> {
    let today = Utc::now().date_naive();
    Ok(Json(state.db.notes_overdue(today).await?))
}

/// Open reminders in the next thirty days.
pub async fn upcoming(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Note>>, ApiError> {
    let today = Utc::now().date_naive();
    let until = today + Duration::days(UPCOMING_LIST_DAYS);
    Ok(Json(state.db.notes_upcoming(today, until).await?))
}

/// Reminder counts for the dashboard.
pub async fn summary(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let today = Utc::now().date_naive();
    let until = today + Duration::days(UPCOMING_SUMMARY_DAYS);
    let (today_count, overdue, upcoming) = state.db.note_summary_counts(today, until).await?;

    Ok(Json(json!({
        "today": today_count,
        "overdue": overdue,
        "upcoming": upcoming,
    })))
}

pub async fn complete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let updated = state.db.complete_note(id).await?;
    if updated == 0 {
        return Err(ApiError::not_found("note"));
    }
    Ok(Json(json!({ "status": "completed" })))
}
