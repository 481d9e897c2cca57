//! Pure statistical projections over a session export.
//!
//! Every function here is O(history length) and mutation-free; the dispatcher
//! runs them over the snapshot a session actor handed back.

use std::collections::BTreeMap;

use serde::Serialize;
use time::OffsetDateTime;

use super::cards::{Color, Rank, Suit};
use super::deck::DECK_SIZE;
use super::snapshot::SessionExport;
use super::state::{HistoryKind, ParticipantId, SessionStatus};

/// Headline numbers for one session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub participant_count: usize,
    pub cards_drawn: usize,
    pub cards_remaining: usize,
    pub progress_pct: f64,
    /// Seconds since start, until the end for finished sessions. None before
    /// the first start.
    pub duration_secs: Option<i64>,
    pub current_turn: Option<ParticipantId>,
    pub kings_count: u8,
    pub venganzas_available: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantStats {
    pub participant: ParticipantId,
    pub turn_index: usize,
    pub cards_drawn: usize,
    pub activations: usize,
    pub venganzas_earned: usize,
    pub venganzas_remaining: usize,
    pub saved_cards_held: usize,
    pub kings_drawn: usize,
    /// Mean numeric value (A=1..K=13) of the participant's draws; 0 when none.
    pub avg_card_value: f64,
}

/// Drawn-versus-remaining tally for one key of a distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionEntry {
    pub key: String,
    pub drawn: u32,
    pub remaining: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnStats {
    pub total_draws: usize,
    pub per_participant: Vec<ParticipantDraws>,
    pub min_draws: usize,
    pub max_draws: usize,
    pub avg_draws: f64,
    pub variance: f64,
    pub longest_streak: usize,
    pub longest_streak_participant: Option<ParticipantId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDraws {
    pub participant: ParticipantId,
    pub draws: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleApplication {
    pub message: String,
    pub count: u32,
}

pub fn session_stats(export: &SessionExport, now: OffsetDateTime) -> SessionStats {
    let cards_drawn = draws(export).count();
    let cards_remaining = export.deck.len();

    let duration_secs = export.started_at.map(|started| {
        let until = match export.status {
            SessionStatus::Ended => export.ended_at.unwrap_or(now),
            _ => now,
        };
        (until - started).whole_seconds()
    });

    let current_turn = match export.status {
        SessionStatus::Playing => export.participants.get(export.turn_index).cloned(),
        _ => None,
    };

    SessionStats {
        participant_count: export.participants.len(),
        cards_drawn,
        cards_remaining,
        progress_pct: (cards_drawn as f64 / DECK_SIZE as f64) * 100.0,
        duration_secs,
        current_turn,
        kings_count: export.kings_count,
        venganzas_available: export.venganza_cards.len(),
    }
}

pub fn participant_stats(export: &SessionExport) -> Vec<ParticipantStats> {
    export
        .participants
        .iter()
        .enumerate()
        .map(|(turn_index, participant)| {
            let drawn: Vec<_> = draws(export).filter(|h| &h.actor == participant).collect();
            let value_sum: u32 = drawn.iter().map(|h| h.card.value() as u32).sum();
            let avg_card_value = if drawn.is_empty() {
                0.0
            } else {
                value_sum as f64 / drawn.len() as f64
            };

            ParticipantStats {
                participant: participant.clone(),
                turn_index,
                cards_drawn: drawn.len(),
                activations: export
                    .history
                    .iter()
                    .filter(|h| h.kind == HistoryKind::SavedActivate && &h.actor == participant)
                    .count(),
                venganzas_earned: drawn.iter().filter(|h| h.card.rank == Rank::Ace).count(),
                venganzas_remaining: export
                    .venganza_cards
                    .iter()
                    .filter(|v| &v.owner == participant)
                    .count(),
                saved_cards_held: export
                    .saved_cards
                    .get(participant)
                    .map(Vec::len)
                    .unwrap_or(0),
                kings_drawn: drawn.iter().filter(|h| h.card.rank == Rank::King).count(),
                avg_card_value,
            }
        })
        .collect()
}

pub fn distribution_by_rank(export: &SessionExport) -> Vec<DistributionEntry> {
    distribution(export, Rank::ALL.iter().map(|r| r.token().to_string()), |c| {
        c.rank.token().to_string()
    })
}

pub fn distribution_by_suit(export: &SessionExport) -> Vec<DistributionEntry> {
    distribution(export, Suit::ALL.iter().map(|s| s.token().to_string()), |c| {
        c.suit.token().to_string()
    })
}

pub fn distribution_by_color(export: &SessionExport) -> Vec<DistributionEntry> {
    distribution(
        export,
        ["red".to_string(), "black".to_string()].into_iter(),
        |c| match c.color() {
            Color::Red => "red".to_string(),
            Color::Black => "black".to_string(),
        },
    )
}

pub fn turn_stats(export: &SessionExport) -> TurnStats {
    let mut counts: BTreeMap<&ParticipantId, usize> = BTreeMap::new();
    for participant in &export.participants {
        counts.insert(participant, 0);
    }

    let mut longest_streak = 0usize;
    let mut longest_streak_participant: Option<ParticipantId> = None;
    let mut current_streak = 0usize;
    let mut current_actor: Option<&ParticipantId> = None;
    let mut total_draws = 0usize;

    for record in draws(export) {
        total_draws += 1;
        *counts.entry(&record.actor).or_insert(0) += 1;

        if current_actor == Some(&record.actor) {
            current_streak += 1;
        } else {
            current_actor = Some(&record.actor);
            current_streak = 1;
        }
        if current_streak > longest_streak {
            longest_streak = current_streak;
            longest_streak_participant = Some(record.actor.clone());
        }
    }

    let values: Vec<usize> = counts.values().copied().collect();
    let min_draws = values.iter().copied().min().unwrap_or(0);
    let max_draws = values.iter().copied().max().unwrap_or(0);
    let avg_draws = if values.is_empty() {
        0.0
    } else {
        total_draws as f64 / values.len() as f64
    };
    let variance = if values.is_empty() {
        0.0
    } else {
        values
            .iter()
            .map(|&v| {
                let diff = v as f64 - avg_draws;
                diff * diff
            })
            .sum::<f64>()
            / values.len() as f64
    };

    TurnStats {
        total_draws,
        per_participant: export
            .participants
            .iter()
            .map(|p| ParticipantDraws {
                participant: p.clone(),
                draws: counts.get(p).copied().unwrap_or(0),
            })
            .collect(),
        min_draws,
        max_draws,
        avg_draws,
        variance,
        longest_streak,
        longest_streak_participant,
    }
}

/// Count rule applications per human-readable message, most frequent first.
pub fn rule_applications(export: &SessionExport) -> Vec<RuleApplication> {
    let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
    for record in &export.history {
        *counts.entry(record.outcome.message.as_str()).or_insert(0) += 1;
    }

    let mut out: Vec<RuleApplication> = counts
        .into_iter()
        .map(|(message, count)| RuleApplication {
            message: message.to_string(),
            count,
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then(a.message.cmp(&b.message)));
    out
}

fn draws(export: &SessionExport) -> impl Iterator<Item = &super::state::HistoryRecord> {
    export
        .history
        .iter()
        .filter(|h| h.kind == HistoryKind::Draw)
}

fn distribution<I, F>(export: &SessionExport, keys: I, key_of: F) -> Vec<DistributionEntry>
where
    I: Iterator<Item = String>,
    F: Fn(&super::cards::Card) -> String,
{
    let mut drawn: BTreeMap<String, u32> = BTreeMap::new();
    let mut remaining: BTreeMap<String, u32> = BTreeMap::new();

    for record in draws(export) {
        *drawn.entry(key_of(&record.card)).or_insert(0) += 1;
    }
    for card in &export.deck {
        *remaining.entry(key_of(card)).or_insert(0) += 1;
    }

    keys.map(|key| DistributionEntry {
        drawn: drawn.get(&key).copied().unwrap_or(0),
        remaining: remaining.get(&key).copied().unwrap_or(0),
        key,
    })
    .collect()
}
