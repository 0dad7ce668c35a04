//! HTTP handlers, one module per resource.

pub mod clients;
pub mod conversions;
pub mod documents;
pub mod insurance;
pub mod notes;
pub mod quotes;
pub mod renewals;

/// Liveness probe.
pub async fn health_check() -> &'static str {
    "OK"
}
