//! POST /api/commands: the single command endpoint.
//!
//! The body is one wire `Command`; the dispatcher owns all semantics and the
//! HTTP status mirrors the error kind.

use actix_web::{web, HttpResponse};

use crate::dispatch::CommandDispatcher;
use crate::extractors::ValidatedJson;
use crate::protocol::Command;
use crate::state::app_state::AppState;

pub async fn execute(
    app_state: web::Data<AppState>,
    command: ValidatedJson<Command>,
) -> HttpResponse {
    let dispatcher = CommandDispatcher::new(app_state.registry().clone());
    let (status, response) = dispatcher.execute(command.into_inner()).await;
    HttpResponse::build(status).json(response)
}
