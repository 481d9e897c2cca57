#![cfg(test)]

use std::collections::BTreeMap;

use super::cards::Rank;
use super::lifecycle::{end, join, leave, reset_rules, start, update_rules, EndReason};
use super::rules::MAX_PARTICIPANTS;
use super::state::{SessionStatus, MAX_PARTICIPANT_ID_LEN};
use super::test_helpers::*;
use crate::errors::domain::DomainError;

#[test]
fn join_appends_and_initializes_saved_cards() {
    let mut session = waiting_session(&["h"]);
    join(&mut session, "p2").unwrap();

    assert_eq!(session.participants, vec!["h", "p2"]);
    assert!(session.saved_cards.contains_key("p2"));
    session.check_invariants().unwrap();
}

#[test]
fn join_trims_participant_ids() {
    let mut session = waiting_session(&["h"]);
    join(&mut session, "  p2  ").unwrap();
    assert!(session.contains("p2"));
}

#[test]
fn duplicate_join_is_rejected() {
    let mut session = waiting_session(&["h", "p2"]);
    assert_eq!(
        join(&mut session, "p2").unwrap_err(),
        DomainError::PlayerAlreadyInSession("p2".to_string())
    );
}

#[test]
fn eighth_join_succeeds_ninth_is_full() {
    let mut session = waiting_session(&["h"]);
    for i in 2..=MAX_PARTICIPANTS {
        join(&mut session, &format!("p{i}")).unwrap();
    }
    assert_eq!(session.participants.len(), MAX_PARTICIPANTS);
    assert_eq!(join(&mut session, "p9").unwrap_err(), DomainError::SessionFull);
}

#[test]
fn join_after_start_is_wrong_state() {
    let mut session = playing_session(&["h", "p2"]);
    assert!(matches!(
        join(&mut session, "p3").unwrap_err(),
        DomainError::WrongState { .. }
    ));
}

#[test]
fn invalid_participant_ids_are_rejected() {
    let mut session = waiting_session(&["h"]);
    assert!(matches!(
        join(&mut session, "   ").unwrap_err(),
        DomainError::InvalidPlayerId(_)
    ));
    let too_long = "x".repeat(MAX_PARTICIPANT_ID_LEN + 1);
    assert!(matches!(
        join(&mut session, &too_long).unwrap_err(),
        DomainError::InvalidPlayerId(_)
    ));
}

#[test]
fn start_requires_host_and_two_participants() {
    let mut session = waiting_session(&["h"]);
    assert!(matches!(
        start(&mut session, "h", ts()).unwrap_err(),
        DomainError::WrongState { .. }
    ));

    join(&mut session, "p2").unwrap();
    assert_eq!(
        start(&mut session, "p2", ts()).unwrap_err(),
        DomainError::NotHost("p2".to_string())
    );

    start(&mut session, "h", ts()).unwrap();
    assert_eq!(session.status, SessionStatus::Playing);
    assert_eq!(session.started_at, Some(ts()));
    assert_eq!(session.current_participant().unwrap().as_str(), "h");
}

#[test]
fn host_leave_reassigns_host_to_list_head() {
    let mut session = waiting_session(&["h", "p2", "p3"]);
    let outcome = leave(&mut session, "h", ts()).unwrap();

    assert_eq!(outcome.new_host.as_deref(), Some("p2"));
    assert_eq!(session.host, "p2");
    assert_eq!(session.participants, vec!["p2", "p3"]);
    session.check_invariants().unwrap();
}

#[test]
fn leave_clamps_turn_index() {
    let mut session = playing_session(&["h", "p2", "p3"]);
    session.turn_index = 2;
    leave(&mut session, "p3", ts()).unwrap();
    assert_eq!(session.turn_index, 0);
}

#[test]
fn last_leave_ends_the_session() {
    let mut session = waiting_session(&["h"]);
    let outcome = leave(&mut session, "h", ts()).unwrap();
    assert!(outcome.session_ended);
    assert_eq!(session.status, SessionStatus::Ended);
    assert_eq!(session.ended_at, Some(ts()));
}

#[test]
fn leave_by_non_member_fails() {
    let mut session = waiting_session(&["h", "p2"]);
    assert_eq!(
        leave(&mut session, "ghost", ts()).unwrap_err(),
        DomainError::PlayerNotInSession("ghost".to_string())
    );
}

#[test]
fn leave_after_end_is_wrong_state() {
    let mut session = playing_session(&["h", "p2"]);
    end(&mut session, "h", ts()).unwrap();
    assert!(matches!(
        leave(&mut session, "p2", ts()).unwrap_err(),
        DomainError::WrongState { .. }
    ));
}

#[test]
fn end_from_waiting_is_abort() {
    let mut session = waiting_session(&["h", "p2"]);
    assert_eq!(end(&mut session, "h", ts()).unwrap(), EndReason::HostAborted);
    assert_eq!(session.status, SessionStatus::Ended);
}

#[test]
fn end_from_playing_requires_host() {
    let mut session = playing_session(&["h", "p2"]);
    assert_eq!(
        end(&mut session, "p2", ts()).unwrap_err(),
        DomainError::NotHost("p2".to_string())
    );
    assert_eq!(end(&mut session, "h", ts()).unwrap(), EndReason::HostEnded);

    // Transitions only move forward.
    assert!(matches!(
        end(&mut session, "h", ts()).unwrap_err(),
        DomainError::WrongState { .. }
    ));
}

#[test]
fn update_rules_merges_and_validates() {
    let mut session = waiting_session(&["h", "p2"]);
    let original_two = session.rule_text(Rank::Two);

    let mut edits = BTreeMap::new();
    edits.insert(Rank::Ace, "venganza doble".to_string());
    update_rules(&mut session, "h", edits).unwrap();

    assert_eq!(session.rule_text(Rank::Ace), "venganza doble");
    assert_eq!(session.rule_text(Rank::Two), original_two);
    assert_eq!(session.rules.len(), 13);
}

#[test]
fn update_rules_rejects_empty_text_and_non_host() {
    let mut session = waiting_session(&["h", "p2"]);

    let mut empty = BTreeMap::new();
    empty.insert(Rank::Ace, "   ".to_string());
    assert!(matches!(
        update_rules(&mut session, "h", empty).unwrap_err(),
        DomainError::InvalidRules(_)
    ));

    let mut edits = BTreeMap::new();
    edits.insert(Rank::Ace, "algo".to_string());
    assert_eq!(
        update_rules(&mut session, "p2", edits).unwrap_err(),
        DomainError::NotHost("p2".to_string())
    );
}

#[test]
fn rules_are_frozen_once_playing() {
    let mut session = playing_session(&["h", "p2"]);
    let mut edits = BTreeMap::new();
    edits.insert(Rank::Ace, "algo".to_string());
    assert!(matches!(
        update_rules(&mut session, "h", edits).unwrap_err(),
        DomainError::WrongState { .. }
    ));
}

#[test]
fn reset_rules_restores_defaults() {
    let mut session = waiting_session(&["h", "p2"]);
    let defaults = session.rules.clone();

    let mut edits = BTreeMap::new();
    edits.insert(Rank::Ace, "venganza doble".to_string());
    update_rules(&mut session, "h", edits).unwrap();
    assert_ne!(session.rules, defaults);

    reset_rules(&mut session, "h").unwrap();
    assert_eq!(session.rules, defaults);
}
