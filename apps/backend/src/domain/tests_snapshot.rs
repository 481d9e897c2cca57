#![cfg(test)]

use super::drawing::draw_card;
use super::lifecycle::end;
use super::rules::SavedCardPolicy;
use super::snapshot::{export, from_json, restore, to_json, EXPORT_VERSION};
use super::test_helpers::*;

fn played_session() -> super::state::Session {
    let mut session = playing_with_draws(
        &["h", "p2", "p3"],
        &["5_hearts", "a_spades", "7_clubs", "k_diamonds"],
    );
    draw_card(&mut session, "h", SavedCardPolicy::DropOldest, ts()).unwrap();
    draw_card(&mut session, "p2", SavedCardPolicy::DropOldest, ts()).unwrap();
    draw_card(&mut session, "p3", SavedCardPolicy::DropOldest, ts()).unwrap();
    // 7 reversed direction: p2 holds the turn again.
    draw_card(&mut session, "p2", SavedCardPolicy::DropOldest, ts()).unwrap();
    session
}

#[test]
fn export_restore_round_trip_is_byte_identical() {
    let session = played_session();
    let exported = export(&session);
    assert_eq!(exported.version, EXPORT_VERSION);

    let json = to_json(&exported).unwrap();
    let reimported = from_json(&json).unwrap();
    let restored = restore(reimported).unwrap();
    let json_again = to_json(&export(&restored)).unwrap();

    assert_eq!(json, json_again);
    assert_eq!(session, restored);
}

#[test]
fn round_trip_preserves_an_ended_session() {
    let mut session = played_session();
    end(&mut session, "h", ts()).unwrap();

    let json = to_json(&export(&session)).unwrap();
    let restored = restore(from_json(&json).unwrap()).unwrap();
    assert_eq!(session, restored);
}

#[test]
fn export_uses_card_identifiers_and_camel_case() {
    let session = played_session();
    let json = to_json(&export(&session)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["version"], 1);
    assert_eq!(value["code"], "ABC123");
    assert_eq!(value["turnIndex"], session.turn_index);
    assert_eq!(value["kingsCount"], 1);
    assert_eq!(value["direction"], -1);
    assert_eq!(value["savedCards"]["h"][0]["card"], "5_hearts");
    assert_eq!(value["venganzaCards"][0]["card"], "a_spades");
    assert!(value["createdAt"].as_str().unwrap().contains('T'));
}

#[test]
fn restored_replica_replays_draws_identically() {
    let mut session = played_session();
    let checkpoint = export(&session);
    let mut shadow = restore(checkpoint.clone()).unwrap();

    // The same draw on the live session and on the restored replica
    // produces identical state; reverting the live one via the checkpoint
    // recovers the pre-draw export exactly.
    let holder = session.current_participant().unwrap().clone();
    draw_card(&mut session, &holder, SavedCardPolicy::DropOldest, ts()).unwrap();
    draw_card(&mut shadow, &holder, SavedCardPolicy::DropOldest, ts()).unwrap();
    assert_eq!(export(&session), export(&shadow));

    let reverted = restore(checkpoint.clone()).unwrap();
    assert_eq!(export(&reverted), checkpoint);
}

#[test]
fn restore_rejects_unknown_versions() {
    let mut exported = export(&played_session());
    exported.version = 2;
    assert!(restore(exported).is_err());
}

#[test]
fn restore_rejects_tampered_invariants() {
    let mut exported = export(&played_session());
    exported.kings_count = 3;
    assert!(restore(exported).is_err());

    let mut exported = export(&played_session());
    exported.host = "ghost".to_string();
    assert!(restore(exported).is_err());

    let mut exported = export(&played_session());
    exported.deck.pop();
    assert!(restore(exported).is_err());
}
