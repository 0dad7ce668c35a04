//! End-to-end tests through the router against a throwaway SQLite
//! database and media directory.

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header::CONTENT_TYPE};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::util::ServiceExt;

use agency_manager::db::Database;
use agency_manager::media::MediaStore;
use agency_manager::{AppState, app};

struct TestApp {
    app: Router,
    media_root: PathBuf,
    _tmp: TempDir,
}

async fn spawn() -> TestApp {
    let tmp = tempfile::tempdir().unwrap();
    let db_url = format!("sqlite:{}?mode=rwc", tmp.path().join("test.db").display());
    let db = Database::new(&db_url).await.unwrap();
    let media_root = tmp.path().join("media");
    let media = MediaStore::new(&media_root).unwrap();

    TestApp {
        app: app(Arc::new(AppState { db, media })),
        media_root,
        _tmp: tmp,
    }
}

async fn request(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(v) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, value)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    request(app, Method::GET, uri, None).await
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    request(app, Method::POST, uri, Some(body)).await
}

async fn create_client(app: &Router, name: &str, insurance_type: &str) -> i64 {
    let (status, body) = post(
        app,
        "/clients/",
        json!({
            "name": name,
            "mobile": "9876543210",
            "place": "Kochi",
            "insurance_type": insurance_type,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_i64().unwrap()
}

async fn create_health(app: &Router, client_id: i64, renewal_date: Option<&str>) -> i64 {
    let (status, body) = post(
        app,
        "/health-insurance/",
        json!({
            "client": client_id,
            "floater_type": "family",
            "ages": "41,39,12",
            "ped": "",
            "renewal_date": renewal_date,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_i64().unwrap()
}

async fn create_vehicle(app: &Router, client_id: i64, renewal_date: Option<&str>) -> i64 {
    let (status, body) = post(
        app,
        "/vehicle-insurance/",
        json!({
            "client": client_id,
            "vehicle_type": "car",
            "insurance_cover": "full",
            "renewal_date": renewal_date,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_i64().unwrap()
}

async fn dismiss_health(app: &Router, health_id: i64, client_id: i64, renewal_date: &str) {
    let (status, body) = request(
        app,
        Method::PUT,
        &format!("/health-insurance/{health_id}/"),
        Some(json!({
            "client": client_id,
            "floater_type": "family",
            "ages": "41,39,12",
            "ped": "",
            "renewal_date": renewal_date,
            "renewal_dismissed": true,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
}

#[tokio::test]
async fn health_probe_answers() {
    let t = spawn().await;
    let (status, _) = get(&t.app, "/health").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn month_parameter_is_required_and_validated() {
    let t = spawn().await;

    for uri in [
        "/renewals/health/summary/",
        "/renewals/health/",
        "/renewals/vehicle/summary/",
        "/renewals/vehicle/",
    ] {
        let (status, body) = get(&t.app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["error"].as_str().unwrap().contains("month"));
    }

    let (status, body) = get(&t.app, "/renewals/health/summary/?month=june-2024").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("june-2024"));
}

#[tokio::test]
async fn health_summary_partitions_a_future_month() {
    let t = spawn().await;

    // Two pending, one dismissed, all inside 2099-06.
    for (date, dismissed) in [
        ("2099-06-05", false),
        ("2099-06-20", false),
        ("2099-06-10", true),
    ] {
        let client = create_client(&t.app, "prospect", "health").await;
        let health = create_health(&t.app, client, Some(date)).await;
        if dismissed {
            dismiss_health(&t.app, health, client, date).await;
        }
    }
    // Outside the interval and with no date at all: never counted.
    let outside = create_client(&t.app, "other month", "health").await;
    create_health(&t.app, outside, Some("2099-07-01")).await;
    let unscheduled = create_client(&t.app, "no date", "health").await;
    create_health(&t.app, unscheduled, None).await;

    let (status, body) = get(&t.app, "/renewals/health/summary/?month=2099-06").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["month"], "2099-06");
    assert_eq!(body["pending"], 2);
    assert_eq!(body["missed"], 0);
    assert_eq!(body["dismissed"], 1);
}

#[tokio::test]
async fn past_month_renewals_are_missed() {
    let t = spawn().await;

    let client = create_client(&t.app, "lapsed", "health").await;
    create_health(&t.app, client, Some("2020-06-15")).await;

    let (status, body) = get(&t.app, "/renewals/health/summary/?month=2020-06").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pending"], 0);
    assert_eq!(body["missed"], 1);
    assert_eq!(body["dismissed"], 0);

    let (status, body) = get(&t.app, "/renewals/health/?month=2020-06&status=missed").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["client"]["name"], "lapsed");
}

#[tokio::test]
async fn health_list_defaults_to_pending_and_orders_by_date() {
    let t = spawn().await;

    let a = create_client(&t.app, "later", "health").await;
    create_health(&t.app, a, Some("2099-06-20")).await;
    let b = create_client(&t.app, "sooner", "health").await;
    create_health(&t.app, b, Some("2099-06-05")).await;

    let (status, body) = get(&t.app, "/renewals/health/?month=2099-06").await;
    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["renewal_date"], "2099-06-05");
    assert_eq!(entries[1]["renewal_date"], "2099-06-20");
    assert_eq!(entries[0]["client"]["name"], "sooner");
    assert_eq!(entries[0]["client"]["mobile"], "9876543210");
}

#[tokio::test]
async fn vehicle_summary_has_no_dismissed_bucket() {
    let t = spawn().await;

    let a = create_client(&t.app, "future car", "vehicle").await;
    create_vehicle(&t.app, a, Some("2099-06-10")).await;
    let b = create_client(&t.app, "no schedule", "vehicle").await;
    create_vehicle(&t.app, b, None).await;

    let (status, body) = get(&t.app, "/renewals/vehicle/summary/?month=2099-06").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pending"], 1);
    assert_eq!(body["missed"], 0);
    assert!(body.get("dismissed").is_none());

    // The unscheduled vehicle shows up in no month at all.
    let (_, list) = get(&t.app, "/renewals/vehicle/?month=2099-06").await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn renewing_health_clears_dismissal() {
    let t = spawn().await;

    let client = create_client(&t.app, "declined once", "health").await;
    let health = create_health(&t.app, client, Some("2099-06-10")).await;
    dismiss_health(&t.app, health, client, "2099-06-10").await;

    let (status, body) = post(
        &t.app,
        &format!("/renewals/health/{client}/renew/"),
        json!({ "next_renewal_date": "2100-06-10" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["client_id"], client);
    assert_eq!(body["next_renewal_date"], "2100-06-10");

    let (_, row) = get(&t.app, &format!("/health-insurance/{health}/")).await;
    assert_eq!(row["renewal_date"], "2100-06-10");
    assert_eq!(row["renewal_dismissed"], false);
}

#[tokio::test]
async fn renew_with_bad_date_leaves_record_unchanged() {
    let t = spawn().await;

    let client = create_client(&t.app, "careful", "health").await;
    let health = create_health(&t.app, client, Some("2099-06-10")).await;

    // Missing field.
    let (status, body) = post(
        &t.app,
        &format!("/renewals/health/{client}/renew/"),
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("next_renewal_date"));

    // Unparseable date.
    let (status, _) = post(
        &t.app,
        &format!("/renewals/health/{client}/renew/"),
        json!({ "next_renewal_date": "soonish" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, row) = get(&t.app, &format!("/health-insurance/{health}/")).await;
    assert_eq!(row["renewal_date"], "2099-06-10");
}

#[tokio::test]
async fn renew_unknown_client_is_404() {
    let t = spawn().await;

    for uri in [
        "/renewals/health/999/renew/",
        "/renewals/vehicle/999/renew/",
    ] {
        let (status, _) = post(&t.app, uri, json!({ "next_renewal_date": "2099-01-01" })).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
    }
}

#[tokio::test]
async fn vehicle_set_updates_renewal_date() {
    let t = spawn().await;

    let client = create_client(&t.app, "scheduler", "vehicle").await;
    let vehicle = create_vehicle(&t.app, client, None).await;

    let (status, body) = post(
        &t.app,
        &format!("/renewals/vehicle/{client}/set/"),
        json!({ "renewal_date": "2099-03-15" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["renewal_date"], "2099-03-15");

    let (_, row) = get(&t.app, &format!("/vehicle-insurance/{vehicle}/")).await;
    assert_eq!(row["renewal_date"], "2099-03-15");
}

#[tokio::test]
async fn full_delete_cascades_to_everything_owned() {
    let t = spawn().await;

    let client = create_client(&t.app, "leaving", "vehicle").await;
    let vehicle = create_vehicle(&t.app, client, Some("2099-06-10")).await;
    let health = create_health(&t.app, client, None).await;

    let (_, quote) = post(
        &t.app,
        "/quotes/",
        json!({ "client": client, "company_name": "Acme General", "premium_amount": 5400.0 }),
    )
    .await;
    let quote_id = quote["id"].as_i64().unwrap();

    let (_, note) = post(
        &t.app,
        "/notes/",
        json!({ "client": client, "text": "call back", "follow_up_date": "2099-01-05" }),
    )
    .await;
    let note_id = note["id"].as_i64().unwrap();

    let (_, document) = post(
        &t.app,
        "/documents/",
        json!({
            "client": client,
            "document_type": "rc",
            "file_name": "rc.pdf",
            "content_base64": "aGVsbG8=",
        }),
    )
    .await;
    let document_id = document["id"].as_i64().unwrap();
    let file_path = document["file_path"].as_str().unwrap().to_string();
    assert!(t.media_root.join(&file_path).exists());

    post(
        &t.app,
        &format!("/convert-client/{client}/"),
        json!({
            "posp_code": "P-77",
            "customer_name": "Leaving Soon",
            "company_name": "Acme General",
            "premium_amount": 5400.0,
            "policy_number": "PN-1",
            "customer_mobile": "9876543210",
        }),
    )
    .await;

    let (status, body) =
        request(&t.app, Method::DELETE, &format!("/clients/{client}/full-delete/"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    for uri in [
        format!("/clients/{client}/"),
        format!("/vehicle-insurance/{vehicle}/"),
        format!("/health-insurance/{health}/"),
        format!("/quotes/{quote_id}/"),
        format!("/notes/{note_id}/"),
        format!("/documents/{document_id}/"),
    ] {
        let (status, _) = get(&t.app, &uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
    }

    // The uploaded file went with the record.
    assert!(!t.media_root.join(&file_path).exists());

    // Renewals no longer see the deleted vehicle policy.
    let (_, summary) = get(&t.app, "/renewals/vehicle/summary/?month=2099-06").await;
    assert_eq!(summary["pending"], 0);
}

#[tokio::test]
async fn converting_twice_keeps_the_flag_and_both_rows() {
    let t = spawn().await;

    let client = create_client(&t.app, "repeat buyer", "vehicle").await;
    let payload = json!({
        "posp_code": "P-12",
        "customer_name": "Repeat Buyer",
        "company_name": "Acme General",
        "premium_amount": 9100.5,
        "policy_number": "PN-9",
        "customer_mobile": "9876543210",
    });

    let (status, first) = post(&t.app, &format!("/convert-client/{client}/"), payload.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["client"], client);

    let (status, _) = post(&t.app, &format!("/convert-client/{client}/"), payload).await;
    assert_eq!(status, StatusCode::OK);

    let (_, detail) = get(&t.app, &format!("/clients/{client}/")).await;
    assert_eq!(detail["is_converted"], true);
    assert_eq!(detail["conversions"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn conversion_with_missing_fields_is_rejected() {
    let t = spawn().await;

    let client = create_client(&t.app, "incomplete", "vehicle").await;
    let (status, body) = post(
        &t.app,
        &format!("/convert-client/{client}/"),
        json!({ "posp_code": "P-12" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("customer_name"));

    let (status, _) = post(&t.app, "/convert-client/999/", json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, detail) = get(&t.app, &format!("/clients/{client}/")).await;
    assert_eq!(detail["is_converted"], false);
}

#[tokio::test]
async fn client_list_filters_by_insurance_type() {
    let t = spawn().await;

    create_client(&t.app, "driver", "vehicle").await;
    create_client(&t.app, "patient", "health").await;

    let (_, all) = get(&t.app, "/clients/").await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (_, vehicles) = get(&t.app, "/clients/?insurance_type=vehicle").await;
    let vehicles = vehicles.as_array().unwrap();
    assert_eq!(vehicles.len(), 1);
    assert_eq!(vehicles[0]["name"], "driver");
}

#[tokio::test]
async fn note_reminder_views_filter_by_date_and_flags() {
    let t = spawn().await;
    let client = create_client(&t.app, "follow ups", "health").await;

    let today = chrono::Utc::now().date_naive();
    let yesterday = (today - chrono::Duration::days(1)).to_string();
    let in_three_days = (today + chrono::Duration::days(3)).to_string();
    let today = today.to_string();

    let mk = |text: &str, date: &str| {
        json!({ "client": client, "text": text, "follow_up_date": date })
    };
    let (_, due_today) = post(&t.app, "/notes/", mk("due today", &today)).await;
    post(&t.app, "/notes/", mk("overdue", &yesterday)).await;
    post(&t.app, "/notes/", mk("upcoming", &in_three_days)).await;
    // Reminder off: invisible to every view.
    post(
        &t.app,
        "/notes/",
        json!({ "client": client, "text": "silent", "follow_up_date": &today, "reminder": false }),
    )
    .await;

    let (_, todays) = get(&t.app, "/notes/today/").await;
    assert_eq!(todays.as_array().unwrap().len(), 1);
    assert_eq!(todays[0]["text"], "due today");

    let (_, overdue) = get(&t.app, "/notes/overdue/").await;
    assert_eq!(overdue.as_array().unwrap().len(), 1);

    let (_, upcoming) = get(&t.app, "/notes/upcoming/").await;
    assert_eq!(upcoming.as_array().unwrap().len(), 1);
    assert_eq!(upcoming[0]["text"], "upcoming");

    let (_, summary) = get(&t.app, "/notes/summary/").await;
    assert_eq!(summary["today"], 1);
    assert_eq!(summary["overdue"], 1);
    assert_eq!(summary["upcoming"], 1);

    // Completing the note removes it from the listing views.
    let note_id = due_today["id"].as_i64().unwrap();
    let (status, body) = post(&t.app, &format!("/notes/{note_id}/complete/"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");

    let (_, todays) = get(&t.app, "/notes/today/").await;
    assert!(todays.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn client_history_lists_notes_latest_first() {
    let t = spawn().await;
    let client = create_client(&t.app, "chatty", "health").await;

    for date in ["2024-01-10", "2024-03-05", "2024-02-01"] {
        post(
            &t.app,
            "/notes/",
            json!({ "client": client, "text": date, "follow_up_date": date }),
        )
        .await;
    }

    let (status, history) = get(&t.app, &format!("/clients/{client}/history/")).await;
    assert_eq!(status, StatusCode::OK);
    let dates: Vec<&str> = history
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["follow_up_date"].as_str().unwrap())
        .collect();
    assert_eq!(dates, ["2024-03-05", "2024-02-01", "2024-01-10"]);
}

#[tokio::test]
async fn document_delete_removes_file_and_record() {
    let t = spawn().await;
    let client = create_client(&t.app, "paperwork", "vehicle").await;

    let (status, document) = post(
        &t.app,
        "/documents/",
        json!({
            "client": client,
            "document_type": "aadhaar",
            "file_name": "card.jpg",
            "content_base64": "aW1hZ2U=",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = document["id"].as_i64().unwrap();
    let file_path = document["file_path"].as_str().unwrap().to_string();
    assert!(t.media_root.join(&file_path).exists());

    let (status, body) =
        request(&t.app, Method::DELETE, &format!("/documents/{id}/delete/"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(!t.media_root.join(&file_path).exists());

    let (status, _) = get(&t.app, &format!("/documents/{id}/")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Garbage uploads never touch the disk.
    let (status, _) = post(
        &t.app,
        "/documents/",
        json!({
            "client": client,
            "document_type": "policy",
            "file_name": "bad.bin",
            "content_base64": "not base64!!!",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn document_update_changes_metadata_only() {
    let t = spawn().await;
    let client = create_client(&t.app, "relabeler", "vehicle").await;

    let (_, document) = post(
        &t.app,
        "/documents/",
        json!({
            "client": client,
            "document_type": "rc",
            "file_name": "scan.pdf",
            "content_base64": "aGVsbG8=",
        }),
    )
    .await;
    let id = document["id"].as_i64().unwrap();
    let file_path = document["file_path"].as_str().unwrap().to_string();

    let (status, updated) = request(
        &t.app,
        Method::PUT,
        &format!("/documents/{id}/"),
        Some(json!({ "document_type": "policy", "file_name": "policy-2025.pdf" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{updated}");
    assert_eq!(updated["document_type"], "policy");
    assert_eq!(updated["file_name"], "policy-2025.pdf");

    // The stored file is untouched by a metadata update.
    assert_eq!(updated["file_path"], file_path.as_str());
    assert!(t.media_root.join(&file_path).exists());

    let (status, body) = request(
        &t.app,
        Method::PUT,
        &format!("/documents/{id}/"),
        Some(json!({ "file_name": "typeless.pdf" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("document_type"));

    let (status, _) = request(
        &t.app,
        Method::PUT,
        "/documents/999/",
        Some(json!({ "document_type": "policy", "file_name": "ghost.pdf" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn vehicle_renew_with_bad_date_leaves_record_unchanged() {
    let t = spawn().await;

    let client = create_client(&t.app, "cautious", "vehicle").await;
    let vehicle = create_vehicle(&t.app, client, Some("2099-06-10")).await;

    // Missing field.
    let (status, body) = post(
        &t.app,
        &format!("/renewals/vehicle/{client}/renew/"),
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("next_renewal_date"));

    // Unparseable dates, on both the renew and set endpoints.
    let (status, _) = post(
        &t.app,
        &format!("/renewals/vehicle/{client}/renew/"),
        json!({ "next_renewal_date": "never" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(
        &t.app,
        &format!("/renewals/vehicle/{client}/set/"),
        json!({ "renewal_date": "13/01/2099" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, row) = get(&t.app, &format!("/vehicle-insurance/{vehicle}/")).await;
    assert_eq!(row["renewal_date"], "2099-06-10");
}

#[tokio::test]
async fn database_failures_surface_as_500_with_error_body() {
    let tmp = tempfile::tempdir().unwrap();
    let db_url = format!("sqlite:{}?mode=rwc", tmp.path().join("test.db").display());
    let db = Database::new(&db_url).await.unwrap();
    let media = MediaStore::new(tmp.path().join("media")).unwrap();
    let app = app(Arc::new(AppState { db, media }));

    // A second handle to the same file lets the test break the schema
    // out from under the router.
    let side_channel = Database::new(&db_url).await.unwrap();
    sqlx::query("DROP TABLE clients")
        .execute(side_channel.get_pool())
        .await
        .unwrap();

    let (status, body) = get(&app, "/clients/").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("database error"));
}

#[tokio::test]
async fn client_create_requires_core_fields() {
    let t = spawn().await;

    let (status, body) = post(&t.app, "/clients/", json!({ "name": "nameless" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("mobile"));
}
