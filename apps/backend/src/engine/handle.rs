//! Clonable handle to a live session actor.

use std::sync::atomic::{AtomicI64, AtomicU8, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::bus::EventBus;
use super::command::{CommandEnvelope, CommandOutput, SessionCommand};
use crate::domain::SessionStatus;
use crate::error::AppError;
use crate::errors::ErrorKind;

// Status mirror values shared with the reaper.
pub(crate) const STATUS_WAITING: u8 = 0;
pub(crate) const STATUS_PLAYING: u8 = 1;
pub(crate) const STATUS_ENDED: u8 = 2;

pub(crate) fn status_code(status: SessionStatus) -> u8 {
    match status {
        SessionStatus::Waiting => STATUS_WAITING,
        SessionStatus::Playing => STATUS_PLAYING,
        SessionStatus::Ended => STATUS_ENDED,
    }
}

/// Liveness data the actor mirrors for the registry's reaper, so sweeping
/// never has to enqueue into a session.
#[derive(Debug)]
pub(crate) struct SessionVitals {
    pub last_activity_ms: AtomicI64,
    pub status: AtomicU8,
    pub ended_at_ms: AtomicI64,
}

impl SessionVitals {
    pub fn new(now_ms: i64) -> Self {
        Self {
            last_activity_ms: AtomicI64::new(now_ms),
            status: AtomicU8::new(STATUS_WAITING),
            ended_at_ms: AtomicI64::new(0),
        }
    }
}

/// Handle through which the dispatcher (and tests) talk to one session.
#[derive(Clone, Debug)]
pub struct SessionHandle {
    code: String,
    tx: mpsc::Sender<CommandEnvelope>,
    bus: Arc<EventBus>,
    vitals: Arc<SessionVitals>,
    shutdown: CancellationToken,
}

impl SessionHandle {
    pub(crate) fn new(
        code: String,
        tx: mpsc::Sender<CommandEnvelope>,
        bus: Arc<EventBus>,
        vitals: Arc<SessionVitals>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            code,
            tx,
            bus,
            vitals,
            shutdown,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// Enqueue a command and wait for its typed result.
    ///
    /// Blocks on a full queue (bounded backpressure towards the client). The
    /// deadline is enforced by the actor at dequeue time.
    pub async fn send(
        &self,
        command: SessionCommand,
        deadline: Instant,
    ) -> Result<CommandOutput, AppError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let envelope = CommandEnvelope {
            command,
            deadline,
            reply: reply_tx,
        };

        self.tx.send(envelope).await.map_err(|_| {
            AppError::not_found(
                ErrorKind::GameNotFound,
                format!("session {} is no longer running", self.code),
            )
        })?;

        reply_rx
            .await
            .map_err(|_| AppError::internal("session actor dropped the reply channel"))?
    }

    pub fn status(&self) -> SessionStatus {
        match self.vitals.status.load(Ordering::Relaxed) {
            STATUS_PLAYING => SessionStatus::Playing,
            STATUS_ENDED => SessionStatus::Ended,
            _ => SessionStatus::Waiting,
        }
    }

    pub fn last_activity_ms(&self) -> i64 {
        self.vitals.last_activity_ms.load(Ordering::Relaxed)
    }

    pub fn ended_at_ms(&self) -> Option<i64> {
        match self.vitals.ended_at_ms.load(Ordering::Relaxed) {
            0 => None,
            ms => Some(ms),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.bus.subscriber_count()
    }

    /// Stop the actor. Idempotent; used by the reaper and shutdown.
    pub(crate) fn cancel(&self) {
        self.shutdown.cancel();
    }
}
