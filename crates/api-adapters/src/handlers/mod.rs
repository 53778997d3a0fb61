//! HTTP handlers, grouped by portal surface.

pub mod admin;
pub mod flagged;
pub mod records;
pub mod views;

/// Liveness probe.
pub async fn healthz() -> &'static str {
    "ok"
}
