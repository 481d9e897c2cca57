//! Post-game consumption of accrued venganza aces.

use time::OffsetDateTime;

use super::cards::{Card, Rank};
use super::rules::{RuleOutcome, RuleOutcomeKind};
use super::state::{HistoryKind, HistoryRecord, Session, SessionStatus};
use crate::errors::domain::DomainError;

/// Spend one venganza against `target`. Only valid once the session has
/// Ended; removes the consumer's oldest accrued ace.
///
/// The consumer does not need to still be seated (leavers keep their aces),
/// but the target must be a participant.
pub fn consume_venganza(
    state: &mut Session,
    participant: &str,
    target: &str,
    now: OffsetDateTime,
) -> Result<(Card, usize), DomainError> {
    state.require_status(SessionStatus::Ended)?;

    let position = state
        .venganza_cards
        .iter()
        .position(|v| v.owner == participant)
        .ok_or_else(|| DomainError::NoVenganzaAvailable(participant.to_string()))?;

    if !state.contains(target) {
        return Err(DomainError::InvalidTargetPlayer(target.to_string()));
    }

    let entry = state.venganza_cards.remove(position);
    let remaining = state
        .venganza_cards
        .iter()
        .filter(|v| v.owner == participant)
        .count();

    let outcome = RuleOutcome {
        kind: RuleOutcomeKind::VenganzaAccrued,
        target_participant: Some(target.to_string()),
        saved_card_rank: None,
        king_stage: None,
        choose_options: None,
        message: state.rule_text(Rank::Ace),
        ends_session: false,
    };

    let index = state.history.len() as u32;
    state.history.push(HistoryRecord {
        index,
        kind: HistoryKind::VenganzaConsume,
        actor: participant.to_string(),
        card: entry.card,
        outcome,
        target: Some(target.to_string()),
        at: now,
    });

    Ok((entry.card, remaining))
}
