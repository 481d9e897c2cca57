//! Per-session event fan-out.
//!
//! Subscribers get their own bounded queue. Delivery never blocks the session
//! actor: a subscriber whose queue is full is dropped on the spot (its
//! receiver stream ends, which clients treat as a reconnect signal).

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};
use uuid::Uuid;

use super::event::EventEnvelope;

#[derive(Debug)]
pub struct EventBus {
    session_code: String,
    buffer: usize,
    subscribers: DashMap<Uuid, mpsc::Sender<Arc<EventEnvelope>>>,
}

impl EventBus {
    pub fn new(session_code: String, buffer: usize) -> Self {
        Self {
            session_code,
            buffer,
            subscribers: DashMap::new(),
        }
    }

    /// Attach a subscriber; the returned receiver yields events in publish
    /// order until the subscriber is dropped or sheds.
    pub fn subscribe(&self) -> (Uuid, mpsc::Receiver<Arc<EventEnvelope>>) {
        let token = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(self.buffer);
        self.subscribers.insert(token, tx);
        debug!(
            session_code = %self.session_code,
            token = %token,
            subscribers = self.subscribers.len(),
            "Subscriber attached"
        );
        (token, rx)
    }

    pub fn unsubscribe(&self, token: Uuid) {
        if self.subscribers.remove(&token).is_some() {
            debug!(
                session_code = %self.session_code,
                token = %token,
                subscribers = self.subscribers.len(),
                "Subscriber detached"
            );
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Deliver one event to every subscriber, shedding the slow ones.
    pub fn publish(&self, envelope: EventEnvelope) {
        let envelope = Arc::new(envelope);
        let mut shed = Vec::new();

        for entry in self.subscribers.iter() {
            match entry.value().try_send(envelope.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    warn!(
                        session_code = %self.session_code,
                        token = %entry.key(),
                        seq = envelope.seq,
                        "Subscriber buffer full, shedding slow consumer"
                    );
                    shed.push(*entry.key());
                }
                Err(TrySendError::Closed(_)) => shed.push(*entry.key()),
            }
        }

        for token in shed {
            self.subscribers.remove(&token);
        }
    }
}
