//! End-of-game summary: the full projection handed out when a session ends.

use serde::Serialize;
use time::OffsetDateTime;

use super::cards::Rank;
use super::deck::DECK_SIZE;
use super::snapshot::SessionExport;
use super::state::{CupEntry, HistoryKind, ParticipantId};
use super::stats::{
    distribution_by_color, distribution_by_rank, distribution_by_suit, participant_stats,
    rule_applications, session_stats, turn_stats, DistributionEntry, ParticipantStats,
    RuleApplication, SessionStats, TurnStats,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    #[serde(with = "time::serde::rfc3339")]
    pub at: OffsetDateTime,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant: Option<ParticipantId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card: Option<String>,
}

/// Everything a client needs to render the post-game screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalSummary {
    pub session: SessionStats,
    pub participants: Vec<ParticipantStats>,
    pub by_rank: Vec<DistributionEntry>,
    pub by_suit: Vec<DistributionEntry>,
    pub by_color: Vec<DistributionEntry>,
    pub turns: TurnStats,
    pub rule_applications: Vec<RuleApplication>,
    pub cup_content: Vec<CupEntry>,
    pub timeline: Vec<TimelineEvent>,
}

pub fn final_summary(export: &SessionExport, now: OffsetDateTime) -> FinalSummary {
    FinalSummary {
        session: session_stats(export, now),
        participants: participant_stats(export),
        by_rank: distribution_by_rank(export),
        by_suit: distribution_by_suit(export),
        by_color: distribution_by_color(export),
        turns: turn_stats(export),
        rule_applications: rule_applications(export),
        cup_content: export.cup_content.clone(),
        timeline: timeline(export),
    }
}

/// Significant moments in draw order: first draw, each king, the halfway
/// draw, venganza consumptions, deck exhaustion, and the end of the game.
pub fn timeline(export: &SessionExport) -> Vec<TimelineEvent> {
    let mut events = Vec::new();
    let mut draw_no = 0usize;
    let mut kings_seen = 0u8;

    for record in &export.history {
        match record.kind {
            HistoryKind::Draw => {
                draw_no += 1;
                if draw_no == 1 {
                    events.push(TimelineEvent {
                        at: record.at,
                        label: "first_draw".to_string(),
                        participant: Some(record.actor.clone()),
                        card: Some(record.card.id()),
                    });
                }
                if record.card.rank == Rank::King {
                    kings_seen += 1;
                    let label = if kings_seen == 1 {
                        "first_king".to_string()
                    } else {
                        format!("king_{kings_seen}")
                    };
                    events.push(TimelineEvent {
                        at: record.at,
                        label,
                        participant: Some(record.actor.clone()),
                        card: Some(record.card.id()),
                    });
                }
                if draw_no == DECK_SIZE / 2 {
                    events.push(TimelineEvent {
                        at: record.at,
                        label: "halfway".to_string(),
                        participant: Some(record.actor.clone()),
                        card: None,
                    });
                }
                if draw_no == DECK_SIZE {
                    events.push(TimelineEvent {
                        at: record.at,
                        label: "deck_exhausted".to_string(),
                        participant: Some(record.actor.clone()),
                        card: None,
                    });
                }
            }
            HistoryKind::VenganzaConsume => {
                events.push(TimelineEvent {
                    at: record.at,
                    label: "venganza_consumed".to_string(),
                    participant: Some(record.actor.clone()),
                    card: Some(record.card.id()),
                });
            }
            HistoryKind::SavedActivate => {}
        }
    }

    if let Some(ended_at) = export.ended_at {
        events.push(TimelineEvent {
            at: ended_at,
            label: "game_ended".to_string(),
            participant: None,
            card: None,
        });
    }

    events
}
