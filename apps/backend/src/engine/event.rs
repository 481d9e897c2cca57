//! Events emitted by session actors onto the per-session bus.

use std::collections::BTreeMap;

use serde::Serialize;
use time::OffsetDateTime;

use crate::domain::rules::RuleOutcome;
use crate::domain::stats::SessionStats;
use crate::domain::{Card, ParticipantId, Rank};

/// Wire envelope: session-local monotonic `seq` lets clients detect gaps.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope {
    pub session_code: String,
    pub seq: u64,
    #[serde(flatten)]
    pub event: SessionEvent,
    #[serde(with = "time::serde::rfc3339")]
    pub t: OffsetDateTime,
}

/// Smallest-sufficient-diff payloads, tagged for the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
#[serde(rename_all_fields = "camelCase")]
pub enum SessionEvent {
    GameCreated {
        code: String,
        host: ParticipantId,
        participants: Vec<ParticipantId>,
    },
    PlayerJoined {
        participant: ParticipantId,
        participants: Vec<ParticipantId>,
    },
    PlayerLeft {
        participant: ParticipantId,
        participants: Vec<ParticipantId>,
        host: ParticipantId,
    },
    GameStarted {
        #[serde(with = "time::serde::rfc3339")]
        started_at: OffsetDateTime,
        current_turn: ParticipantId,
    },
    CardDrawn {
        participant: ParticipantId,
        card: Card,
        card_id: String,
        outcome: RuleOutcome,
        ended: bool,
    },
    CardActivated {
        participant: ParticipantId,
        card_id: String,
        message: String,
    },
    VenganzaConsumed {
        participant: ParticipantId,
        target: ParticipantId,
        card_id: String,
        remaining: usize,
    },
    KingsCupProgressed {
        participant: ParticipantId,
        king_number: u8,
    },
    TurnChanged {
        turn_index: usize,
        current_turn: ParticipantId,
        direction: i8,
    },
    RulesUpdated {
        rules: BTreeMap<Rank, String>,
    },
    GameEnded {
        reason: String,
        #[serde(with = "time::serde::rfc3339")]
        ended_at: OffsetDateTime,
        stats: SessionStats,
    },
}

impl SessionEvent {
    /// Event type label as it appears on the wire.
    pub fn type_name(&self) -> &'static str {
        match self {
            SessionEvent::GameCreated { .. } => "gameCreated",
            SessionEvent::PlayerJoined { .. } => "playerJoined",
            SessionEvent::PlayerLeft { .. } => "playerLeft",
            SessionEvent::GameStarted { .. } => "gameStarted",
            SessionEvent::CardDrawn { .. } => "cardDrawn",
            SessionEvent::CardActivated { .. } => "cardActivated",
            SessionEvent::VenganzaConsumed { .. } => "venganzaConsumed",
            SessionEvent::KingsCupProgressed { .. } => "kingsCupProgressed",
            SessionEvent::TurnChanged { .. } => "turnChanged",
            SessionEvent::RulesUpdated { .. } => "rulesUpdated",
            SessionEvent::GameEnded { .. } => "gameEnded",
        }
    }
}
