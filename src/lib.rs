//! Back-office record keeping for an insurance sales agency: clients,
//! policy details, quotes, follow-up notes, documents, and renewal
//! tracking, served over HTTP.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod media;
pub mod models;
pub mod renewals;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::db::Database;
use crate::media::MediaStore;

/// Shared per-request state: the connection pool and the media root.
pub struct AppState {
    pub db: Database,
    pub media: MediaStore,
}

/// Build the full route table. Paths keep their trailing slashes to
/// match the API the frontend already speaks.
pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(api::health_check))
        // Clients
        .route("/clients/", get(api::clients::list).post(api::clients::create))
        .route(
            "/clients/:id/",
            get(api::clients::retrieve)
                .put(api::clients::update)
                .delete(api::clients::destroy),
        )
        .route("/clients/:id/history/", get(api::clients::history))
        .route("/clients/:id/full-delete/", delete(api::clients::full_delete))
        .route("/convert-client/:id/", post(api::conversions::convert))
        // Insurance details
        .route(
            "/vehicle-insurance/",
            get(api::insurance::list_vehicle).post(api::insurance::create_vehicle),
        )
        .route(
            "/vehicle-insurance/:id/",
            get(api::insurance::retrieve_vehicle)
                .put(api::insurance::update_vehicle)
                .delete(api::insurance::destroy_vehicle),
        )
        .route(
            "/health-insurance/",
            get(api::insurance::list_health).post(api::insurance::create_health),
        )
        .route(
            "/health-insurance/:id/",
            get(api::insurance::retrieve_health)
                .put(api::insurance::update_health)
                .delete(api::insurance::destroy_health),
        )
        // Quotes
        .route("/quotes/", get(api::quotes::list).post(api::quotes::create))
        .route(
            "/quotes/:id/",
            get(api::quotes::retrieve)
                .put(api::quotes::update)
                .delete(api::quotes::destroy),
        )
        // Notes and reminder views
        .route("/notes/", get(api::notes::list).post(api::notes::create))
        .route("/notes/today/", get(api::notes::today))
        .route("/notes/overdue/", get(api::notes::overdue))
        .route("/notes/upcoming/", get(api::notes::upcoming))
        .route("/notes/summary/", get(api::notes::summary))
        .route(
            "/notes/:id/",
            get(api::notes::retrieve)
                .put(api::notes::update)
                .delete(api::notes::destroy),
        )
        .route("/notes/:id/complete/", post(api::notes::complete))
        // Documents
        .route(
            "/documents/",
            get(api::documents::list).post(api::documents::create),
        )
        .route(
            "/documents/:id/",
            get(api::documents::retrieve).put(api::documents::update),
        )
        .route("/documents/:id/delete/", delete(api::documents::destroy))
        // Renewals
        .route("/renewals/health/summary/", get(api::renewals::health_summary))
        .route("/renewals/health/", get(api::renewals::health_list))
        .route(
            "/renewals/health/:client_id/renew/",
            post(api::renewals::health_renew),
        )
        .route("/renewals/vehicle/summary/", get(api::renewals::vehicle_summary))
        .route("/renewals/vehicle/", get(api::renewals::vehicle_list))
        .route(
            "/renewals/vehicle/:client_id/renew/",
            post(api::renewals::vehicle_renew),
        )
        .route(
            "/renewals/vehicle/:client_id/set/",
            post(api::renewals::vehicle_set),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
