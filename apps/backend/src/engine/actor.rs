//! The session actor: single task owning one `Session`.
//!
//! All mutation happens on this task; commands drain from a bounded queue in
//! FIFO order, so no field of the session is ever touched concurrently. The
//! actor never awaits external I/O while holding state.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use time::OffsetDateTime;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::bus::EventBus;
use super::command::{CommandEnvelope, CommandOutput, SessionCommand};
use super::event::{EventEnvelope, SessionEvent};
use super::handle::{status_code, SessionVitals};
use crate::domain::rules::SavedCardPolicy;
use crate::domain::{drawing, lifecycle, saved_cards, snapshot, stats, venganza};
use crate::domain::{Session, SessionStatus};
use crate::error::AppError;

/// Milliseconds since the Unix epoch, for the liveness mirror.
pub(crate) fn epoch_ms() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

pub struct SessionActor {
    session: Session,
    rx: mpsc::Receiver<CommandEnvelope>,
    bus: Arc<EventBus>,
    vitals: Arc<SessionVitals>,
    shutdown: CancellationToken,
    saved_card_policy: SavedCardPolicy,
    seq: u64,
}

impl SessionActor {
    pub(crate) fn new(
        session: Session,
        rx: mpsc::Receiver<CommandEnvelope>,
        bus: Arc<EventBus>,
        vitals: Arc<SessionVitals>,
        shutdown: CancellationToken,
        saved_card_policy: SavedCardPolicy,
    ) -> Self {
        Self {
            session,
            rx,
            bus,
            vitals,
            shutdown,
            saved_card_policy,
            // seq 1 is the gameCreated event, published by the registry
            // before this actor is spawned.
            seq: 1,
        }
    }

    /// Drain the queue until cancelled or all handles are gone.
    pub async fn run(mut self) {
        info!(code = %self.session.code, "Session actor started");

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                maybe = self.rx.recv() => match maybe {
                    Some(envelope) => self.handle(envelope),
                    None => break,
                },
            }
        }

        info!(code = %self.session.code, "Session actor stopped");
    }

    fn handle(&mut self, envelope: CommandEnvelope) {
        // Deadline is checked at dequeue time: a command that waited out its
        // deadline in the queue is short-circuited without touching state.
        if Instant::now() >= envelope.deadline {
            debug!(code = %self.session.code, "Command cancelled past deadline");
            let _ = envelope.reply.send(Err(AppError::Cancelled));
            return;
        }

        self.vitals
            .last_activity_ms
            .store(epoch_ms(), Ordering::Relaxed);

        let result = self.execute(envelope.command);
        self.mirror_vitals();

        // A caller that stopped waiting does not affect the session: the
        // mutation already happened and its events were broadcast.
        let _ = envelope.reply.send(result);
    }

    fn execute(&mut self, command: SessionCommand) -> Result<CommandOutput, AppError> {
        let now = OffsetDateTime::now_utc();
        let session = &mut self.session;

        match command {
            SessionCommand::Join { participant } => {
                lifecycle::join(session, &participant)?;
                let joined = session
                    .participants
                    .last()
                    .cloned()
                    .unwrap_or(participant);
                let participants = session.participants.clone();
                self.publish(SessionEvent::PlayerJoined {
                    participant: joined,
                    participants: participants.clone(),
                });
                Ok(CommandOutput::Joined { participants })
            }

            SessionCommand::Leave { participant } => {
                let outcome = lifecycle::leave(session, &participant, now)?;
                let participants = session.participants.clone();
                let host = session.host.clone();
                self.publish(SessionEvent::PlayerLeft {
                    participant,
                    participants: participants.clone(),
                    host,
                });
                if outcome.session_ended {
                    self.publish_game_ended(lifecycle::EndReason::Abandoned.as_str(), now);
                }
                Ok(CommandOutput::Left {
                    participants,
                    host: outcome.new_host,
                    session_ended: outcome.session_ended,
                })
            }

            SessionCommand::Start { participant } => {
                lifecycle::start(session, &participant, now)?;
                let current_turn = session
                    .current_participant()
                    .cloned()
                    .unwrap_or_else(|| session.host.clone());
                self.publish(SessionEvent::GameStarted {
                    started_at: now,
                    current_turn: current_turn.clone(),
                });
                Ok(CommandOutput::Started { current_turn })
            }

            SessionCommand::Draw { participant } => {
                let result =
                    drawing::draw_card(session, &participant, self.saved_card_policy, now)?;
                let ended = result.end_reason.is_some();

                self.publish(SessionEvent::CardDrawn {
                    participant: participant.clone(),
                    card: result.card,
                    card_id: result.card.id(),
                    outcome: result.outcome.clone(),
                    ended,
                });
                if let Some(stage) = result.outcome.king_stage {
                    self.publish(SessionEvent::KingsCupProgressed {
                        participant: participant.clone(),
                        king_number: stage,
                    });
                }
                if result.turn_advanced {
                    if let Some(current) = self.session.current_participant().cloned() {
                        let turn_index = self.session.turn_index;
                        let direction = self.session.direction.delta();
                        self.publish(SessionEvent::TurnChanged {
                            turn_index,
                            current_turn: current,
                            direction,
                        });
                    }
                }
                if let Some(reason) = result.end_reason {
                    self.publish_game_ended(reason.as_str(), now);
                }

                Ok(CommandOutput::Drawn {
                    card: result.card,
                    outcome: result.outcome,
                    ended,
                    current_turn: self.session.current_participant().cloned(),
                    direction: self.session.direction.delta(),
                })
            }

            SessionCommand::Activate {
                participant,
                card_id,
            } => {
                let entry = saved_cards::activate_saved_card(session, &participant, &card_id, now)?;
                let message = session.rule_text(entry.card.rank);
                self.publish(SessionEvent::CardActivated {
                    participant,
                    card_id: card_id.clone(),
                    message,
                });
                Ok(CommandOutput::Activated { card_id })
            }

            SessionCommand::ConsumeVenganza {
                participant,
                target,
            } => {
                let (card, remaining) =
                    venganza::consume_venganza(session, &participant, &target, now)?;
                let card_id = card.id();
                self.publish(SessionEvent::VenganzaConsumed {
                    participant,
                    target: target.clone(),
                    card_id: card_id.clone(),
                    remaining,
                });
                Ok(CommandOutput::VenganzaConsumed {
                    target,
                    card_id,
                    remaining,
                })
            }

            SessionCommand::End {
                participant,
                reason,
            } => {
                let lifecycle_reason = lifecycle::end(session, &participant, now)?;
                let reason = reason
                    .as_deref()
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| lifecycle_reason.as_str().to_string());
                let stats = self.publish_game_ended(&reason, now);
                Ok(CommandOutput::Ended { reason, stats })
            }

            SessionCommand::UpdateRules {
                participant,
                rules,
            } => {
                lifecycle::update_rules(session, &participant, rules)?;
                let rules = session.rules.clone();
                self.publish(SessionEvent::RulesUpdated {
                    rules: rules.clone(),
                });
                Ok(CommandOutput::RulesUpdated { rules })
            }

            SessionCommand::ResetRules { participant } => {
                lifecycle::reset_rules(session, &participant)?;
                let rules = session.rules.clone();
                self.publish(SessionEvent::RulesUpdated {
                    rules: rules.clone(),
                });
                Ok(CommandOutput::RulesUpdated { rules })
            }

            SessionCommand::Snapshot => {
                Ok(CommandOutput::Snapshot(Box::new(snapshot::export(session))))
            }
        }
    }

    fn publish_game_ended(&mut self, reason: &str, now: OffsetDateTime) -> stats::SessionStats {
        let export = snapshot::export(&self.session);
        let stats = stats::session_stats(&export, now);
        self.publish(SessionEvent::GameEnded {
            reason: reason.to_string(),
            ended_at: self.session.ended_at.unwrap_or(now),
            stats: stats.clone(),
        });
        stats
    }

    fn publish(&mut self, event: SessionEvent) {
        self.seq += 1;
        self.bus.publish(EventEnvelope {
            session_code: self.session.code.clone(),
            seq: self.seq,
            event,
            t: OffsetDateTime::now_utc(),
        });
    }

    fn mirror_vitals(&self) {
        self.vitals
            .status
            .store(status_code(self.session.status), Ordering::Relaxed);
        if self.session.status == SessionStatus::Ended {
            let _ = self.vitals.ended_at_ms.compare_exchange(
                0,
                epoch_ms(),
                Ordering::Relaxed,
                Ordering::Relaxed,
            );
        }
    }
}
