//! The draw operation: pop a card, apply its rule, keep the books.

use time::OffsetDateTime;

use super::cards::Rank;
use super::lifecycle::EndReason;
use super::rules::{
    outcome_for_draw, RuleOutcome, SavedCardPolicy, MAX_SAVED_PER_PARTICIPANT,
};
use super::state::{
    CupEntry, HistoryKind, HistoryRecord, SavedCard, Session, SessionStatus, VenganzaCard,
};
use crate::errors::domain::DomainError;

/// Result of one successful draw.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawResult {
    pub card: super::cards::Card,
    pub outcome: RuleOutcome,
    /// Set when this draw terminated the session (fourth king or empty deck).
    pub end_reason: Option<EndReason>,
    /// False exactly when the session ended on this draw.
    pub turn_advanced: bool,
}

/// Draw the next card for `participant` and apply its rule.
///
/// Fails without mutating on any precondition violation, including the
/// saved-card cap under [`SavedCardPolicy::Reject`]. On success: bookkeeping
/// is applied, a Draw record is appended, and the turn advances unless the
/// draw ended the session. A rank 7 toggles direction before the advance.
pub fn draw_card(
    state: &mut Session,
    participant: &str,
    policy: SavedCardPolicy,
    now: OffsetDateTime,
) -> Result<DrawResult, DomainError> {
    state.require_status(SessionStatus::Playing)?;
    state.require_member(participant)?;

    let holder = state
        .current_participant()
        .cloned()
        .ok_or(DomainError::NotYourTurn)?;
    if holder != participant {
        return Err(DomainError::NotYourTurn);
    }

    // Capacity is checked against the peeked card so a rejected save leaves
    // the deck untouched.
    let upcoming = state.deck.peek().ok_or(DomainError::DeckEmpty)?;
    if matches!(upcoming.rank, Rank::Five | Rank::Nine)
        && policy == SavedCardPolicy::Reject
        && state.saved_for(participant).len() >= MAX_SAVED_PER_PARTICIPANT
    {
        return Err(DomainError::SaveCapacity);
    }

    let card = state.deck.draw()?;
    let outcome = outcome_for_draw(state, card);
    let draw_index = state.history.len() as u32;

    match card.rank {
        Rank::Ace => {
            state.venganza_cards.push(VenganzaCard {
                owner: holder.clone(),
                card,
            });
        }
        Rank::Five | Rank::Nine => {
            let saved = state.saved_cards.entry(holder.clone()).or_default();
            saved.push(SavedCard { card, draw_index });
            if saved.len() > MAX_SAVED_PER_PARTICIPANT {
                // Drop-oldest policy: the earliest save is silently discarded.
                saved.remove(0);
            }
        }
        Rank::King => {
            state.kings_count += 1;
            state.cup_content.push(CupEntry {
                participant: holder.clone(),
                king_number: state.kings_count,
                at: now,
            });
        }
        _ => {}
    }

    state.history.push(HistoryRecord {
        index: draw_index,
        kind: HistoryKind::Draw,
        actor: holder,
        card,
        outcome: outcome.clone(),
        target: outcome.target_participant.clone(),
        at: now,
    });

    let end_reason = if outcome.ends_session {
        Some(EndReason::KingsCupComplete)
    } else if state.deck.is_empty() {
        Some(EndReason::DeckExhausted)
    } else {
        None
    };

    if card.rank == Rank::Seven {
        state.direction = state.direction.toggled();
    }

    let turn_advanced = match end_reason {
        Some(_) => {
            state.status = SessionStatus::Ended;
            state.ended_at = Some(now);
            false
        }
        None => {
            state.turn_index = state.next_turn_index();
            true
        }
    };

    Ok(DrawResult {
        card,
        outcome,
        end_reason,
        turn_advanced,
    })
}
