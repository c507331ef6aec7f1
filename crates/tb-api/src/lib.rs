//! # tb-api
//!
//! The web routing and orchestration layer for Tabula.

pub mod handlers;
pub mod middleware;

use actix_web::web;

/// Configures the routes for the table backend.
///
/// Scoped so the main binary can mount the API under a prefix
/// (e.g., /api/v1/) without touching the handlers.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    handlers::configure(cfg);
}
