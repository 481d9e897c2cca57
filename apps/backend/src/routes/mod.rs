//! HTTP route wiring.

pub mod commands;
pub mod health;

use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health))
        .route("/api/commands", web::post().to(commands::execute))
        .route("/ws/sessions/{code}", web::get().to(crate::ws::upgrade));
}
