//! Activation of saved rank-5/9 cards.

use time::OffsetDateTime;

use super::rules::{RuleOutcome, RuleOutcomeKind};
use super::state::{HistoryKind, HistoryRecord, SavedCard, Session, SessionStatus};
use crate::errors::domain::DomainError;

/// Activate a previously saved card, removing it from the holder's pile.
///
/// Only valid while Playing; does not advance the turn. The activation is
/// recorded in history with the card's rule text so the effect is auditable.
pub fn activate_saved_card(
    state: &mut Session,
    participant: &str,
    card_id: &str,
    now: OffsetDateTime,
) -> Result<SavedCard, DomainError> {
    state.require_status(SessionStatus::Playing)?;
    state.require_member(participant)?;

    let saved = state
        .saved_cards
        .get_mut(participant)
        .ok_or_else(|| DomainError::SavedCardNotFound(card_id.to_string()))?;
    let position = saved
        .iter()
        .position(|entry| entry.card.id() == card_id)
        .ok_or_else(|| DomainError::SavedCardNotFound(card_id.to_string()))?;
    let entry = saved.remove(position);

    let outcome = RuleOutcome {
        kind: RuleOutcomeKind::SaveCard,
        target_participant: None,
        saved_card_rank: Some(entry.card.rank),
        king_stage: None,
        choose_options: None,
        message: state.rule_text(entry.card.rank),
        ends_session: false,
    };

    let index = state.history.len() as u32;
    state.history.push(HistoryRecord {
        index,
        kind: HistoryKind::SavedActivate,
        actor: participant.to_string(),
        card: entry.card,
        outcome,
        target: None,
        at: now,
    });

    Ok(entry)
}
