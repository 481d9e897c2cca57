//! WebSocket bridge from the per-session event bus to one connected client.

use std::sync::Arc;
use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use serde::Serialize;
use serde_json::to_string;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::{EventBus, EventEnvelope};
use crate::error::AppError;
use crate::errors::ErrorKind;
use crate::state::app_state::AppState;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(40);

#[derive(Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum ControlMessage {
    Ack { message: &'static str },
    /// Sent when the bus shed this subscriber; the client should reconnect
    /// and resynchronize via `getGameState`.
    Reconnect { message: &'static str },
}

/// GET /ws/sessions/{code}: upgrade and subscribe to the session's events.
pub async fn upgrade(
    req: HttpRequest,
    stream: web::Payload,
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let code = path.into_inner();
    let handle = app_state.registry().lookup(&code).ok_or_else(|| {
        Error::from(AppError::not_found(
            ErrorKind::GameNotFound,
            format!("no session under {code}"),
        ))
    })?;

    let bus = handle.bus().clone();
    let (token, rx) = bus.subscribe();
    let session = EventStreamSession::new(handle.code().to_string(), bus, token, rx);

    ws::start(session, &req, stream)
}

pub struct EventStreamSession {
    session_code: String,
    bus: Arc<EventBus>,
    token: Uuid,
    events: Option<mpsc::Receiver<Arc<EventEnvelope>>>,
    last_heartbeat: Instant,
}

impl EventStreamSession {
    fn new(
        session_code: String,
        bus: Arc<EventBus>,
        token: Uuid,
        events: mpsc::Receiver<Arc<EventEnvelope>>,
    ) -> Self {
        Self {
            session_code,
            bus,
            token,
            events: Some(events),
            last_heartbeat: Instant::now(),
        }
    }

    fn start_heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |actor, ctx| {
            if Instant::now().duration_since(actor.last_heartbeat) > CLIENT_TIMEOUT {
                warn!(
                    session_code = %actor.session_code,
                    token = %actor.token,
                    "Websocket client heartbeat timed out"
                );
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Normal)));
                ctx.stop();
                return;
            }

            ctx.ping(b"keepalive");
        });
    }

    fn send_control(&self, ctx: &mut ws::WebsocketContext<Self>, message: &ControlMessage) {
        match to_string(message) {
            Ok(payload) => ctx.text(payload),
            Err(err) => warn!(
                session_code = %self.session_code,
                error = %err,
                "Failed to serialize websocket control message"
            ),
        }
    }
}

impl Actor for EventStreamSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!(
            session_code = %self.session_code,
            token = %self.token,
            "Websocket session started"
        );

        self.start_heartbeat(ctx);
        self.send_control(ctx, &ControlMessage::Ack { message: "connected" });

        if let Some(events) = self.events.take() {
            ctx.add_stream(ReceiverStream::new(events));
        }
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        self.bus.unsubscribe(self.token);
        info!(
            session_code = %self.session_code,
            token = %self.token,
            "Websocket session stopped"
        );
    }
}

/// Events flowing from the bus to this client.
impl StreamHandler<Arc<EventEnvelope>> for EventStreamSession {
    fn handle(&mut self, envelope: Arc<EventEnvelope>, ctx: &mut Self::Context) {
        match to_string(envelope.as_ref()) {
            Ok(payload) => ctx.text(payload),
            Err(err) => warn!(
                session_code = %self.session_code,
                seq = envelope.seq,
                error = %err,
                "Failed to serialize event"
            ),
        }
    }

    fn finished(&mut self, ctx: &mut Self::Context) {
        // The bus dropped us (slow consumer or session gone): tell the client
        // to reconnect rather than leaving it on a silent stream.
        self.send_control(
            ctx,
            &ControlMessage::Reconnect {
                message: "event stream closed, reconnect and resync",
            },
        );
        ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Again)));
        ctx.stop();
    }
}

/// Control frames from the client.
impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for EventStreamSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(payload)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&payload);
            }
            Ok(ws::Message::Pong(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                // The event stream is read-only; commands go over HTTP.
                warn!(
                    session_code = %self.session_code,
                    text = %text,
                    "Unexpected websocket text message"
                );
            }
            Ok(ws::Message::Binary(_)) => {}
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) => {}
            Ok(ws::Message::Nop) => {}
            Err(err) => {
                warn!(
                    session_code = %self.session_code,
                    error = %err,
                    "Websocket protocol error"
                );
                ctx.stop();
            }
        }
    }
}
