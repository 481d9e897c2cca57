//! Realtime multiplayer back-end for Cultura Chupística.
//!
//! Clients create short-lived sessions identified by an alphanumeric code and
//! take turns drawing from a shuffled 52-card deck. The authoritative engine
//! lives in `domain` (pure model) and `engine` (one actor per session, event
//! fan-out, registry); `dispatch` validates and routes wire commands, and the
//! thin `routes`/`ws` layer binds everything to HTTP and WebSocket.

pub mod config;
pub mod dispatch;
pub mod domain;
pub mod engine;
pub mod error;
pub mod errors;
pub mod extractors;
pub mod protocol;
pub mod routes;
pub mod state;
pub mod telemetry;
pub mod utils;
pub mod ws;
