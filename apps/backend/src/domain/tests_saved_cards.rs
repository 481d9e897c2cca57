#![cfg(test)]

use super::drawing::draw_card;
use super::rules::{SavedCardPolicy, MAX_SAVED_PER_PARTICIPANT};
use super::saved_cards::activate_saved_card;
use super::test_helpers::*;
use crate::errors::domain::DomainError;

#[test]
fn save_eligible_draw_goes_to_the_pile_not_the_discard() {
    let mut session = playing_with_draws(&["p", "q"], &["5_hearts"]);
    draw_card(&mut session, "p", SavedCardPolicy::DropOldest, ts()).unwrap();

    let saved = session.saved_for("p");
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].card, card("5_hearts"));
    assert_eq!(saved[0].draw_index, 0);
    session.check_invariants().unwrap();
}

#[test]
fn activate_removes_card_and_keeps_turn() {
    // Scenario: p draws the 5 of hearts, then activates it next turn.
    let mut session = playing_with_draws(&["p", "q"], &["5_hearts", "3_clubs"]);
    draw_card(&mut session, "p", SavedCardPolicy::DropOldest, ts()).unwrap();
    draw_card(&mut session, "q", SavedCardPolicy::DropOldest, ts()).unwrap();

    let turn_before = session.turn_index;
    let entry = activate_saved_card(&mut session, "p", "5_hearts", ts()).unwrap();

    assert_eq!(entry.card, card("5_hearts"));
    assert!(session.saved_for("p").is_empty());
    assert_eq!(session.turn_index, turn_before, "activation must not advance the turn");

    let last = session.history.last().unwrap();
    assert_eq!(last.kind, super::state::HistoryKind::SavedActivate);
    assert_eq!(last.actor, "p");
    session.check_invariants().unwrap();
}

#[test]
fn activating_an_unheld_card_fails() {
    let mut session = playing_with_draws(&["p", "q"], &["5_hearts"]);
    draw_card(&mut session, "p", SavedCardPolicy::DropOldest, ts()).unwrap();

    assert_eq!(
        activate_saved_card(&mut session, "p", "9_spades", ts()).unwrap_err(),
        DomainError::SavedCardNotFound("9_spades".to_string())
    );
    // Another participant cannot spend p's card either.
    assert_eq!(
        activate_saved_card(&mut session, "q", "5_hearts", ts()).unwrap_err(),
        DomainError::SavedCardNotFound("5_hearts".to_string())
    );
}

#[test]
fn activation_requires_playing() {
    let mut session = waiting_session(&["p", "q"]);
    assert!(matches!(
        activate_saved_card(&mut session, "p", "5_hearts", ts()).unwrap_err(),
        DomainError::WrongState { .. }
    ));
}

#[test]
fn drop_oldest_policy_evicts_the_earliest_save() {
    // p draws four save-eligible cards (q draws junk in between).
    let mut session = playing_with_draws(
        &["p", "q"],
        &[
            "5_hearts", "3_clubs", "9_hearts", "3_spades", "5_diamonds", "3_diamonds", "9_clubs",
        ],
    );
    for actor in ["p", "q", "p", "q", "p", "q", "p"] {
        draw_card(&mut session, actor, SavedCardPolicy::DropOldest, ts()).unwrap();
    }

    let held: Vec<String> = session.saved_for("p").iter().map(|s| s.card.id()).collect();
    assert_eq!(session.saved_for("p").len(), MAX_SAVED_PER_PARTICIPANT);
    // 5_hearts was the oldest and is silently gone.
    assert_eq!(held, vec!["9_hearts", "5_diamonds", "9_clubs"]);
    session.check_invariants().unwrap();
}

#[test]
fn reject_policy_fails_the_fourth_save_without_mutating() {
    let mut session = playing_with_draws(
        &["p", "q"],
        &[
            "5_hearts", "3_clubs", "9_hearts", "3_spades", "5_diamonds", "3_diamonds", "9_clubs",
        ],
    );
    for actor in ["p", "q", "p", "q", "p", "q"] {
        draw_card(&mut session, actor, SavedCardPolicy::Reject, ts()).unwrap();
    }

    let deck_before = session.deck.remaining();
    let turn_before = session.turn_index;
    assert_eq!(
        draw_card(&mut session, "p", SavedCardPolicy::Reject, ts()).unwrap_err(),
        DomainError::SaveCapacity
    );
    assert_eq!(session.deck.remaining(), deck_before, "failed draw must not pop the deck");
    assert_eq!(session.turn_index, turn_before);
    assert_eq!(session.saved_for("p").len(), MAX_SAVED_PER_PARTICIPANT);
}
