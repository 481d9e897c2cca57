#![cfg(test)]

use super::drawing::draw_card;
use super::lifecycle::{end, leave};
use super::rules::SavedCardPolicy;
use super::test_helpers::*;
use super::venganza::consume_venganza;
use crate::errors::domain::DomainError;

fn ended_session_with_ace() -> super::state::Session {
    let mut session = playing_with_draws(&["p", "q"], &["a_spades"]);
    draw_card(&mut session, "p", SavedCardPolicy::DropOldest, ts()).unwrap();
    end(&mut session, "p", ts()).unwrap();
    session
}

#[test]
fn full_venganza_lifecycle() {
    // Scenario: p accrues the ace of spades, the game ends, p spends it on q.
    let mut session = ended_session_with_ace();
    assert_eq!(session.venganza_cards.len(), 1);

    let (spent, remaining) = consume_venganza(&mut session, "p", "q", ts()).unwrap();
    assert_eq!(spent, card("a_spades"));
    assert_eq!(remaining, 0);
    assert!(session.venganza_cards.is_empty());

    let last = session.history.last().unwrap();
    assert_eq!(last.kind, super::state::HistoryKind::VenganzaConsume);
    assert_eq!(last.target.as_deref(), Some("q"));
    session.check_invariants().unwrap();

    // A second consumption has nothing left to spend.
    assert_eq!(
        consume_venganza(&mut session, "p", "q", ts()).unwrap_err(),
        DomainError::NoVenganzaAvailable("p".to_string())
    );
}

#[test]
fn venganza_only_after_end() {
    let mut session = playing_with_draws(&["p", "q"], &["a_spades"]);
    draw_card(&mut session, "p", SavedCardPolicy::DropOldest, ts()).unwrap();

    assert!(matches!(
        consume_venganza(&mut session, "p", "q", ts()).unwrap_err(),
        DomainError::WrongState { .. }
    ));
}

#[test]
fn venganza_target_must_be_a_participant() {
    let mut session = ended_session_with_ace();
    assert_eq!(
        consume_venganza(&mut session, "p", "ghost", ts()).unwrap_err(),
        DomainError::InvalidTargetPlayer("ghost".to_string())
    );
}

#[test]
fn consumer_without_accrual_has_none() {
    let mut session = ended_session_with_ace();
    assert_eq!(
        consume_venganza(&mut session, "q", "p", ts()).unwrap_err(),
        DomainError::NoVenganzaAvailable("q".to_string())
    );
}

#[test]
fn leaver_keeps_accrued_venganza() {
    let mut session = playing_with_draws(&["p", "q", "r"], &["a_spades"]);
    draw_card(&mut session, "p", SavedCardPolicy::DropOldest, ts()).unwrap();
    leave(&mut session, "p", ts()).unwrap();
    end(&mut session, "q", ts()).unwrap();

    // p is gone from the seats but the ace is still spendable.
    let (spent, _) = consume_venganza(&mut session, "p", "q", ts()).unwrap();
    assert_eq!(spent, card("a_spades"));
}

#[test]
fn oldest_ace_is_spent_first() {
    let mut session = playing_with_draws(&["p", "q"], &["a_spades", "3_clubs", "a_hearts"]);
    for actor in ["p", "q", "p"] {
        draw_card(&mut session, actor, SavedCardPolicy::DropOldest, ts()).unwrap();
    }
    end(&mut session, "p", ts()).unwrap();

    let (spent, remaining) = consume_venganza(&mut session, "p", "q", ts()).unwrap();
    assert_eq!(spent, card("a_spades"));
    assert_eq!(remaining, 1);
}
