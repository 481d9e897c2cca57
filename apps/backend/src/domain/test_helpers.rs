//! Shared fixtures for domain tests: deterministic decks and pre-built
//! sessions.

use time::macros::datetime;
use time::OffsetDateTime;

use super::cards::Card;
use super::deck::{full_deck, Deck};
use super::lifecycle;
use super::state::Session;

pub(super) fn ts() -> OffsetDateTime {
    datetime!(2025-06-01 12:00:00 UTC)
}

pub(super) fn card(id: &str) -> Card {
    id.parse().unwrap()
}

/// Full 52-card deck arranged so the named cards draw first, in order.
pub(super) fn stacked_deck(draw_order: &[&str]) -> Deck {
    let planned: Vec<Card> = draw_order.iter().map(|s| card(s)).collect();
    let mut rest: Vec<Card> = full_deck()
        .into_iter()
        .filter(|c| !planned.contains(c))
        .collect();
    // Draws pop from the tail, so the first planned draw goes last.
    rest.extend(planned.iter().rev().copied());
    Deck::from_cards(rest)
}

pub(super) fn waiting_session_with_deck(participants: &[&str], deck: Deck) -> Session {
    let mut session = Session::new("ABC123".to_string(), participants[0], deck, ts()).unwrap();
    for p in &participants[1..] {
        lifecycle::join(&mut session, p).unwrap();
    }
    session
}

pub(super) fn waiting_session(participants: &[&str]) -> Session {
    waiting_session_with_deck(participants, Deck::shuffled(42))
}

pub(super) fn playing_session_with_deck(participants: &[&str], deck: Deck) -> Session {
    let mut session = waiting_session_with_deck(participants, deck);
    lifecycle::start(&mut session, participants[0], ts()).unwrap();
    session
}

pub(super) fn playing_session(participants: &[&str]) -> Session {
    playing_session_with_deck(participants, Deck::shuffled(42))
}

/// Playing session whose next draws are exactly `draw_order`.
pub(super) fn playing_with_draws(participants: &[&str], draw_order: &[&str]) -> Session {
    playing_session_with_deck(participants, stacked_deck(draw_order))
}
