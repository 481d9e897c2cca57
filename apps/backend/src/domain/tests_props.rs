#![cfg(test)]

use std::collections::HashSet;

use proptest::prelude::*;

use super::deck::{Deck, DECK_SIZE};
use super::drawing::draw_card;
use super::rules::SavedCardPolicy;
use super::state::SessionStatus;
use super::test_helpers::*;

proptest! {
    #[test]
    fn shuffled_deck_is_always_a_permutation(seed in any::<u64>()) {
        let deck = Deck::shuffled(seed);
        prop_assert_eq!(deck.remaining(), DECK_SIZE);
        let unique: HashSet<String> = deck.cards().iter().map(|c| c.id()).collect();
        prop_assert_eq!(unique.len(), DECK_SIZE);
    }

    #[test]
    fn same_seed_same_order(seed in any::<u64>()) {
        prop_assert_eq!(Deck::shuffled(seed), Deck::shuffled(seed));
    }

    #[test]
    fn turn_index_stays_in_range_under_any_draw_sequence(
        n in 2usize..=8,
        seed in any::<u64>(),
        draws in 1usize..=40,
    ) {
        let names: Vec<String> = (0..n).map(|i| format!("p{i}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut session = playing_session_with_deck(&refs, Deck::shuffled(seed));

        for _ in 0..draws {
            if session.status != SessionStatus::Playing {
                break;
            }
            let holder = session.current_participant().unwrap().clone();
            draw_card(&mut session, &holder, SavedCardPolicy::DropOldest, ts()).unwrap();
            prop_assert!(session.turn_index < session.participants.len());
        }

        session.check_invariants().unwrap();
    }

    #[test]
    fn deck_accounting_holds_for_the_whole_game(seed in any::<u64>()) {
        let mut session = playing_session_with_deck(&["a", "b", "c"], Deck::shuffled(seed));

        // Play until the engine ends the session (fourth king or exhaustion).
        while session.status == SessionStatus::Playing {
            let holder = session.current_participant().unwrap().clone();
            draw_card(&mut session, &holder, SavedCardPolicy::DropOldest, ts()).unwrap();
            prop_assert_eq!(
                session.deck.remaining() + session.cards_drawn(),
                DECK_SIZE
            );
        }

        prop_assert!(session.kings_count <= 4);
        session.check_invariants().unwrap();
    }
}
