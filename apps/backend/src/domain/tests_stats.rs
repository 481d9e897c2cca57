#![cfg(test)]

use time::ext::NumericalDuration;

use super::drawing::draw_card;
use super::lifecycle::end;
use super::rules::SavedCardPolicy;
use super::snapshot::export;
use super::stats::{
    distribution_by_color, distribution_by_rank, distribution_by_suit, participant_stats,
    rule_applications, session_stats, turn_stats,
};
use super::summary::{final_summary, timeline};
use super::test_helpers::*;
use super::venganza::consume_venganza;

fn played_session() -> super::state::Session {
    // h: 5♥ (save), k♦; p2: a♠ (venganza), 2♣
    let mut session = playing_with_draws(
        &["h", "p2"],
        &["5_hearts", "a_spades", "k_diamonds", "2_clubs"],
    );
    for actor in ["h", "p2", "h", "p2"] {
        draw_card(&mut session, actor, SavedCardPolicy::DropOldest, ts()).unwrap();
    }
    session
}

#[test]
fn session_stats_count_the_basics() {
    let session = played_session();
    let stats = session_stats(&export(&session), ts() + 30.seconds());

    assert_eq!(stats.participant_count, 2);
    assert_eq!(stats.cards_drawn, 4);
    assert_eq!(stats.cards_remaining, 48);
    assert!((stats.progress_pct - (4.0 / 52.0) * 100.0).abs() < 1e-9);
    assert_eq!(stats.duration_secs, Some(30));
    assert_eq!(stats.current_turn.as_deref(), Some("h"));
    assert_eq!(stats.kings_count, 1);
    assert_eq!(stats.venganzas_available, 1);
}

#[test]
fn participant_stats_split_by_actor() {
    let session = played_session();
    let stats = participant_stats(&export(&session));

    let h = stats.iter().find(|s| s.participant == "h").unwrap();
    assert_eq!(h.turn_index, 0);
    assert_eq!(h.cards_drawn, 2);
    assert_eq!(h.saved_cards_held, 1);
    assert_eq!(h.kings_drawn, 1);
    assert_eq!(h.venganzas_earned, 0);
    // 5 and K: mean of 5 and 13.
    assert!((h.avg_card_value - 9.0).abs() < 1e-9);

    let p2 = stats.iter().find(|s| s.participant == "p2").unwrap();
    assert_eq!(p2.venganzas_earned, 1);
    assert_eq!(p2.venganzas_remaining, 1);
    // Ace and 2: mean of 1 and 2.
    assert!((p2.avg_card_value - 1.5).abs() < 1e-9);
}

#[test]
fn distributions_account_for_all_cards() {
    let session = played_session();
    let exported = export(&session);

    let by_rank = distribution_by_rank(&exported);
    assert_eq!(by_rank.len(), 13);
    let fives = by_rank.iter().find(|e| e.key == "5").unwrap();
    assert_eq!(fives.drawn, 1);
    assert_eq!(fives.remaining, 3);

    let by_suit = distribution_by_suit(&exported);
    assert_eq!(by_suit.len(), 4);
    let total_drawn: u32 = by_suit.iter().map(|e| e.drawn).sum();
    let total_remaining: u32 = by_suit.iter().map(|e| e.remaining).sum();
    assert_eq!(total_drawn, 4);
    assert_eq!(total_drawn + total_remaining, 52);

    let by_color = distribution_by_color(&exported);
    assert_eq!(by_color.len(), 2);
    let red = by_color.iter().find(|e| e.key == "red").unwrap();
    // 5♥ and K♦ drawn.
    assert_eq!(red.drawn, 2);
    assert_eq!(red.remaining, 24);
}

#[test]
fn turn_stats_track_distribution_and_streaks() {
    let session = played_session();
    let stats = turn_stats(&export(&session));

    assert_eq!(stats.total_draws, 4);
    assert_eq!(stats.min_draws, 2);
    assert_eq!(stats.max_draws, 2);
    assert!((stats.avg_draws - 2.0).abs() < 1e-9);
    assert!((stats.variance - 0.0).abs() < 1e-9);
    // Alternating actors: longest streak is one.
    assert_eq!(stats.longest_streak, 1);
}

#[test]
fn streaks_survive_direction_reversals() {
    // b's 7 sends play back to a: draw order a, b, a.
    let mut session = playing_with_draws(&["a", "b", "c"], &["3_hearts", "7_clubs", "3_spades"]);
    for actor in ["a", "b", "a"] {
        draw_card(&mut session, actor, SavedCardPolicy::DropOldest, ts()).unwrap();
    }

    let stats = turn_stats(&export(&session));
    assert_eq!(stats.total_draws, 3);
    assert_eq!(stats.longest_streak, 1);
    assert_eq!(stats.per_participant[0].draws, 2);
}

#[test]
fn rule_applications_count_per_message() {
    let session = played_session();
    let apps = rule_applications(&export(&session));

    let total: u32 = apps.iter().map(|a| a.count).sum();
    assert_eq!(total, 4);
    // Four distinct rules were hit once each.
    assert!(apps.iter().all(|a| a.count == 1));
}

#[test]
fn timeline_marks_first_draw_kings_and_venganzas() {
    let mut session = played_session();
    end(&mut session, "h", ts()).unwrap();
    consume_venganza(&mut session, "p2", "h", ts()).unwrap();

    let events = timeline(&export(&session));
    let labels: Vec<&str> = events.iter().map(|e| e.label.as_str()).collect();

    assert_eq!(labels[0], "first_draw");
    assert!(labels.contains(&"first_king"));
    assert!(labels.contains(&"venganza_consumed"));
    assert_eq!(*labels.last().unwrap(), "game_ended");
}

#[test]
fn final_summary_bundles_everything() {
    let mut session = played_session();
    end(&mut session, "h", ts()).unwrap();

    let summary = final_summary(&export(&session), ts() + 1.minutes());
    assert_eq!(summary.session.cards_drawn, 4);
    assert_eq!(summary.participants.len(), 2);
    assert_eq!(summary.by_rank.len(), 13);
    assert_eq!(summary.cup_content.len(), 1);
    assert!(!summary.timeline.is_empty());

    // Summary serializes for the wire.
    let value = serde_json::to_value(&summary).unwrap();
    assert!(value["session"]["cardsDrawn"].is_number());
    assert!(value["byColor"].is_array());
}
