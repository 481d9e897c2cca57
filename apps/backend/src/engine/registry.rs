//! Process-wide directory from session code to session actor.
//!
//! The only shared mutable structure in the process. Lookups are lock-striped
//! reads; writes (create, reap) are rare. Registry mutation never happens
//! while holding a session's queue.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use time::OffsetDateTime;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::actor::{epoch_ms, SessionActor};
use super::bus::EventBus;
use super::event::{EventEnvelope, SessionEvent};
use super::handle::{SessionHandle, SessionVitals};
use crate::config::AppConfig;
use crate::domain::seed_derivation::derive_deck_seed;
use crate::domain::{Deck, Session, SessionStatus};
use crate::error::AppError;
use crate::errors::ErrorKind;
use crate::utils::join_code::{generate_session_code, normalize_code};

pub struct SessionRegistry {
    config: Arc<AppConfig>,
    sessions: DashMap<String, SessionHandle>,
}

impl SessionRegistry {
    pub fn new(config: Arc<AppConfig>) -> Arc<Self> {
        Arc::new(Self {
            config,
            sessions: DashMap::new(),
        })
    }

    pub fn config(&self) -> &Arc<AppConfig> {
        &self.config
    }

    /// Create a session and spawn its actor.
    ///
    /// With a custom code the insert is atomic and collides with `CodeTaken`;
    /// otherwise codes are sampled until a free one is found, bounded by the
    /// configured attempt limit.
    pub fn create(
        &self,
        host: &str,
        custom_code: Option<&str>,
    ) -> Result<SessionHandle, AppError> {
        if self.sessions.len() >= self.config.max_sessions {
            return Err(AppError::capacity(
                ErrorKind::CapacityExceeded,
                format!("session cap of {} reached", self.config.max_sessions),
            ));
        }

        if let Some(raw) = custom_code {
            let code = normalize_code(raw).ok_or_else(|| {
                AppError::validation(
                    ErrorKind::InvalidGameCode,
                    format!("code {raw:?} is not 4-10 chars of [A-Z0-9]"),
                )
            })?;
            return match self.sessions.entry(code.clone()) {
                Entry::Occupied(_) => Err(AppError::conflict(
                    ErrorKind::CodeTaken,
                    format!("code {code} is already in use"),
                )),
                Entry::Vacant(slot) => {
                    let handle = self.spawn_session(code, host)?;
                    slot.insert(handle.clone());
                    Ok(handle)
                }
            };
        }

        for _ in 0..self.config.code_attempts {
            let code = generate_session_code();
            match self.sessions.entry(code.clone()) {
                Entry::Occupied(_) => continue,
                Entry::Vacant(slot) => {
                    let handle = self.spawn_session(code, host)?;
                    slot.insert(handle.clone());
                    return Ok(handle);
                }
            }
        }

        warn!(
            attempts = self.config.code_attempts,
            sessions = self.sessions.len(),
            "Exhausted code generation attempts"
        );
        Err(AppError::capacity(
            ErrorKind::CodeSpaceExhausted,
            "could not allocate a free session code".to_string(),
        ))
    }

    /// Case-insensitive lookup.
    pub fn lookup(&self, code: &str) -> Option<SessionHandle> {
        let code = code.trim().to_ascii_uppercase();
        self.sessions.get(&code).map(|entry| entry.value().clone())
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Sweep idle sessions: Ended past the grace period, or Waiting/Playing
    /// with no accepted command and no subscriber for the idle timeout.
    /// Returns the number of sessions removed.
    pub fn reap(&self) -> usize {
        let now = epoch_ms();
        let grace_ms = self.config.ended_grace.as_millis() as i64;
        let idle_ms = self.config.idle_timeout.as_millis() as i64;

        let mut expired: Vec<(String, &'static str)> = Vec::new();
        for entry in self.sessions.iter() {
            let handle = entry.value();
            let reason = if handle.status() == SessionStatus::Ended {
                match handle.ended_at_ms() {
                    Some(ended) if now - ended > grace_ms => Some("ended_grace_elapsed"),
                    _ => None,
                }
            } else if now - handle.last_activity_ms() > idle_ms && handle.subscriber_count() == 0 {
                Some("idle_timeout")
            } else {
                None
            };
            if let Some(reason) = reason {
                expired.push((entry.key().clone(), reason));
            }
        }

        let mut removed = 0;
        for (code, reason) in expired {
            if let Some((_, handle)) = self.sessions.remove(&code) {
                handle.cancel();
                removed += 1;
                info!(code = %code, reason, "Session reaped");
            }
        }
        removed
    }

    fn spawn_session(&self, code: String, host: &str) -> Result<SessionHandle, AppError> {
        let seed = derive_deck_seed(&self.config.process_seed, &code);
        let deck = Deck::shuffled(seed);
        let session = Session::new(code.clone(), host, deck, OffsetDateTime::now_utc())?;

        let (tx, rx) = mpsc::channel(self.config.queue_capacity);
        let bus = Arc::new(EventBus::new(code.clone(), self.config.subscriber_buffer));
        let vitals = Arc::new(SessionVitals::new(epoch_ms()));
        let shutdown = CancellationToken::new();

        // seq 1 goes out before the actor exists so the numbering is settled
        // by the time any subscriber can attach.
        bus.publish(EventEnvelope {
            session_code: code.clone(),
            seq: 1,
            event: SessionEvent::GameCreated {
                code: code.clone(),
                host: session.host.clone(),
                participants: session.participants.clone(),
            },
            t: OffsetDateTime::now_utc(),
        });

        let actor = SessionActor::new(
            session,
            rx,
            bus.clone(),
            vitals.clone(),
            shutdown.clone(),
            self.config.saved_card_policy,
        );
        tokio::spawn(actor.run());

        info!(code = %code, host, sessions = self.sessions.len() + 1, "Session created");
        Ok(SessionHandle::new(code, tx, bus, vitals, shutdown))
    }
}

/// Periodic sweep of idle sessions.
pub fn spawn_reaper(registry: Arc<SessionRegistry>) -> JoinHandle<()> {
    let interval = registry.config.reap_interval;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            registry.reap();
        }
    })
}
