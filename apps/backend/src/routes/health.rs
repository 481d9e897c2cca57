//! Liveness endpoint.

use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::state::app_state::AppState;

pub async fn health(app_state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "sessions": app_state.registry().session_count(),
    }))
}
