//! Session lifecycle transitions: join, leave, start, end, rule edits.
//!
//! Status only ever moves forward: Waiting -> Playing -> Ended.

use std::collections::BTreeMap;

use time::OffsetDateTime;

use super::cards::Rank;
use super::rules::{default_rules, MAX_PARTICIPANTS, MIN_PARTICIPANTS_TO_START};
use super::state::{validate_participant_id, Direction, Session, SessionStatus};
use crate::errors::domain::DomainError;

/// Reason a session reached Ended, carried on the end event and summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    HostEnded,
    HostAborted,
    KingsCupComplete,
    DeckExhausted,
    Abandoned,
}

impl EndReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndReason::HostEnded => "host_ended",
            EndReason::HostAborted => "host_aborted",
            EndReason::KingsCupComplete => "kings_cup_complete",
            EndReason::DeckExhausted => "deck_exhausted",
            EndReason::Abandoned => "abandoned",
        }
    }
}

/// Add a participant to a Waiting session.
pub fn join(state: &mut Session, participant: &str) -> Result<(), DomainError> {
    state.require_status(SessionStatus::Waiting)?;
    let participant = validate_participant_id(participant)?;

    if state.contains(&participant) {
        return Err(DomainError::PlayerAlreadyInSession(participant));
    }
    if state.participants.len() >= MAX_PARTICIPANTS {
        return Err(DomainError::SessionFull);
    }

    state.saved_cards.insert(participant.clone(), Vec::new());
    state.participants.push(participant);
    Ok(())
}

/// Outcome of a leave: whether the host moved and whether the session ended
/// because nobody is left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveOutcome {
    pub new_host: Option<String>,
    pub session_ended: bool,
}

/// Remove a participant. Allowed in Waiting and Playing.
///
/// The leaver forfeits saved cards (they can no longer activate them); accrued
/// venganzas are kept so the ace accounting stays intact. When the host leaves
/// the list head becomes host; when the last participant leaves the session
/// ends so the reaper can collect it.
pub fn leave(
    state: &mut Session,
    participant: &str,
    now: OffsetDateTime,
) -> Result<LeaveOutcome, DomainError> {
    if state.status == SessionStatus::Ended {
        return Err(DomainError::WrongState {
            current: state.status.as_str(),
        });
    }
    state.require_member(participant)?;

    state.participants.retain(|p| p != participant);
    state.saved_cards.remove(participant);

    if state.participants.is_empty() {
        state.status = SessionStatus::Ended;
        state.ended_at = Some(now);
        return Ok(LeaveOutcome {
            new_host: None,
            session_ended: true,
        });
    }

    let mut new_host = None;
    if state.host == participant {
        state.host = state.participants[0].clone();
        new_host = Some(state.host.clone());
    }
    if state.turn_index >= state.participants.len() {
        state.turn_index = 0;
    }

    Ok(LeaveOutcome {
        new_host,
        session_ended: false,
    })
}

/// Host starts the game with at least two participants seated.
pub fn start(
    state: &mut Session,
    participant: &str,
    now: OffsetDateTime,
) -> Result<(), DomainError> {
    state.require_status(SessionStatus::Waiting)?;
    state.require_host(participant)?;
    if state.participants.len() < MIN_PARTICIPANTS_TO_START {
        return Err(DomainError::WrongState {
            current: "waiting for more participants",
        });
    }

    state.status = SessionStatus::Playing;
    state.started_at = Some(now);
    state.turn_index = 0;
    state.direction = Direction::Forward;
    Ok(())
}

/// Host ends a Playing session, or aborts one still Waiting.
pub fn end(
    state: &mut Session,
    participant: &str,
    now: OffsetDateTime,
) -> Result<EndReason, DomainError> {
    if state.status == SessionStatus::Ended {
        return Err(DomainError::WrongState {
            current: state.status.as_str(),
        });
    }
    state.require_host(participant)?;

    let reason = match state.status {
        SessionStatus::Waiting => EndReason::HostAborted,
        _ => EndReason::HostEnded,
    };
    state.status = SessionStatus::Ended;
    state.ended_at = Some(now);
    Ok(reason)
}

/// Merge rule edits into the table. Waiting + host only; values must be
/// non-empty after trim.
pub fn update_rules(
    state: &mut Session,
    participant: &str,
    new_rules: BTreeMap<Rank, String>,
) -> Result<(), DomainError> {
    state.require_status(SessionStatus::Waiting)?;
    state.require_host(participant)?;

    let mut cleaned: BTreeMap<Rank, String> = BTreeMap::new();
    for (rank, text) in new_rules {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidRules(format!(
                "empty rule text for rank {}",
                rank.token()
            )));
        }
        cleaned.insert(rank, trimmed.to_string());
    }

    state.rules.extend(cleaned);
    Ok(())
}

/// Restore the default rules table. Waiting + host only.
pub fn reset_rules(state: &mut Session, participant: &str) -> Result<(), DomainError> {
    state.require_status(SessionStatus::Waiting)?;
    state.require_host(participant)?;
    state.rules = default_rules();
    Ok(())
}
