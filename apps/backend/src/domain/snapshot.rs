//! Versioned export/import of a full session.
//!
//! The export is the optional persistence format (version 1): everything
//! needed to rebuild the session byte-for-byte, including the remaining deck
//! order. It must never be handed to clients; the public projection lives in
//! `protocol::game_state`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::cards::{Card, Rank};
use super::deck::Deck;
use super::state::{
    CupEntry, Direction, HistoryRecord, ParticipantId, SavedCard, Session, SessionStatus,
    VenganzaCard,
};
use crate::errors::domain::DomainError;

pub const EXPORT_VERSION: u32 = 1;

/// Complete persisted form of one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionExport {
    pub version: u32,
    pub code: String,
    pub host: ParticipantId,
    pub participants: Vec<ParticipantId>,
    /// Remaining cards in draw order (tail draws first).
    pub deck: Vec<Card>,
    pub status: SessionStatus,
    pub turn_index: usize,
    pub direction: Direction,
    pub history: Vec<HistoryRecord>,
    pub saved_cards: BTreeMap<ParticipantId, Vec<SavedCard>>,
    pub venganza_cards: Vec<VenganzaCard>,
    pub kings_count: u8,
    pub cup_content: Vec<CupEntry>,
    pub rules: BTreeMap<Rank, String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub started_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub ended_at: Option<OffsetDateTime>,
}

/// Produce the version-1 export of a session.
pub fn export(state: &Session) -> SessionExport {
    SessionExport {
        version: EXPORT_VERSION,
        code: state.code.clone(),
        host: state.host.clone(),
        participants: state.participants.clone(),
        deck: state.deck.cards().to_vec(),
        status: state.status,
        turn_index: state.turn_index,
        direction: state.direction,
        history: state.history.clone(),
        saved_cards: state.saved_cards.clone(),
        venganza_cards: state.venganza_cards.clone(),
        kings_count: state.kings_count,
        cup_content: state.cup_content.clone(),
        rules: state.rules.clone(),
        created_at: state.created_at,
        started_at: state.started_at,
        ended_at: state.ended_at,
    }
}

/// Rebuild a session from an export, re-checking every structural invariant.
pub fn restore(export: SessionExport) -> Result<Session, DomainError> {
    if export.version != EXPORT_VERSION {
        return Err(DomainError::Other(format!(
            "unsupported export version {}",
            export.version
        )));
    }

    let session = Session {
        code: export.code,
        host: export.host,
        participants: export.participants,
        deck: Deck::from_cards(export.deck),
        status: export.status,
        turn_index: export.turn_index,
        direction: export.direction,
        history: export.history,
        saved_cards: export.saved_cards,
        venganza_cards: export.venganza_cards,
        kings_count: export.kings_count,
        cup_content: export.cup_content,
        rules: export.rules,
        created_at: export.created_at,
        started_at: export.started_at,
        ended_at: export.ended_at,
    };
    session.check_invariants()?;
    Ok(session)
}

pub fn to_json(export: &SessionExport) -> Result<String, DomainError> {
    serde_json::to_string(export)
        .map_err(|e| DomainError::Other(format!("export serialization failed: {e}")))
}

pub fn from_json(json: &str) -> Result<SessionExport, DomainError> {
    serde_json::from_str(json)
        .map_err(|e| DomainError::Other(format!("export deserialization failed: {e}")))
}
