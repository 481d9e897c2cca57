//! Public projection of a session for clients.
//!
//! Unlike the version-1 export this never reveals the remaining deck order;
//! upcoming draws stay server-side.

use std::collections::BTreeMap;

use serde::Serialize;
use time::OffsetDateTime;

use crate::domain::{ParticipantId, Rank, SessionExport, SessionStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateView {
    pub code: String,
    pub host: ParticipantId,
    pub participants: Vec<ParticipantId>,
    pub status: SessionStatus,
    pub turn_index: usize,
    pub direction: i8,
    pub current_turn: Option<ParticipantId>,
    pub cards_drawn: usize,
    pub cards_remaining: usize,
    pub kings_count: u8,
    /// Saved cards are table-visible in the game, so ids are public.
    pub saved_cards: BTreeMap<ParticipantId, Vec<String>>,
    pub venganza_counts: BTreeMap<ParticipantId, usize>,
    pub rules: BTreeMap<Rank, String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub started_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub ended_at: Option<OffsetDateTime>,
}

pub fn game_state_view(export: &SessionExport) -> GameStateView {
    let current_turn = match export.status {
        SessionStatus::Playing => export.participants.get(export.turn_index).cloned(),
        _ => None,
    };

    let mut venganza_counts: BTreeMap<ParticipantId, usize> = BTreeMap::new();
    for entry in &export.venganza_cards {
        *venganza_counts.entry(entry.owner.clone()).or_insert(0) += 1;
    }

    GameStateView {
        code: export.code.clone(),
        host: export.host.clone(),
        participants: export.participants.clone(),
        status: export.status,
        turn_index: export.turn_index,
        direction: export.direction.delta(),
        current_turn,
        cards_drawn: export.history.iter().filter(|h| h.kind == crate::domain::HistoryKind::Draw).count(),
        cards_remaining: export.deck.len(),
        kings_count: export.kings_count,
        saved_cards: export
            .saved_cards
            .iter()
            .map(|(participant, saved)| {
                (
                    participant.clone(),
                    saved.iter().map(|s| s.card.id()).collect(),
                )
            })
            .collect(),
        venganza_counts,
        rules: export.rules.clone(),
        created_at: export.created_at,
        started_at: export.started_at,
        ended_at: export.ended_at,
    }
}
