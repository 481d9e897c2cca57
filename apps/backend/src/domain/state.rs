//! Session aggregate: the pure data model of one game and its invariants.
//!
//! Mutations happen through the operation modules (`lifecycle`, `drawing`,
//! `saved_cards`, `venganza`) driven by the session actor; this module owns
//! the types, constructors, and inspection helpers.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::OffsetDateTime;

use super::cards::{Card, Rank};
use super::deck::{Deck, DECK_SIZE};
use super::rules::{default_rules, RuleOutcome, KINGS_TO_END, MAX_PARTICIPANTS};
use crate::errors::domain::DomainError;

pub type ParticipantId = String;

pub const MAX_PARTICIPANT_ID_LEN: usize = 50;

/// Overall session progression. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Created, accepting joins and rule edits.
    Waiting,
    /// Turns in progress; the deck shrinks monotonically.
    Playing,
    /// Terminal. Only venganza consumption is still accepted.
    Ended,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Waiting => "waiting",
            SessionStatus::Playing => "playing",
            SessionStatus::Ended => "ended",
        }
    }
}

/// Direction of turn rotation. Toggled by every rank-7 draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

impl Direction {
    pub fn delta(&self) -> i8 {
        match self {
            Direction::Forward => 1,
            Direction::Reverse => -1,
        }
    }

    pub fn toggled(&self) -> Direction {
        match self {
            Direction::Forward => Direction::Reverse,
            Direction::Reverse => Direction::Forward,
        }
    }
}

// Serialized as the signed step (+1 / -1) so exports stay language-neutral.
impl Serialize for Direction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i8(self.delta())
    }
}

impl<'de> Deserialize<'de> for Direction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match i8::deserialize(deserializer)? {
            1 => Ok(Direction::Forward),
            -1 => Ok(Direction::Reverse),
            other => Err(serde::de::Error::custom(format!(
                "invalid direction: {other}"
            ))),
        }
    }
}

/// Kind of an append-only history record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HistoryKind {
    Draw,
    SavedActivate,
    VenganzaConsume,
}

/// One history entry. Never mutated after append.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    /// 0-based in-order index.
    pub index: u32,
    pub kind: HistoryKind,
    pub actor: ParticipantId,
    pub card: Card,
    pub outcome: RuleOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<ParticipantId>,
    #[serde(with = "time::serde::rfc3339")]
    pub at: OffsetDateTime,
}

/// A rank-5 or rank-9 card retained for later activation. Carries the history
/// index of the draw that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedCard {
    pub card: Card,
    pub draw_index: u32,
}

/// An ace accrued during play, spendable only after the session ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VenganzaCard {
    pub owner: ParticipantId,
    pub card: Card,
}

/// One pour into the Kings' Cup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CupEntry {
    pub participant: ParticipantId,
    pub king_number: u8,
    #[serde(with = "time::serde::rfc3339")]
    pub at: OffsetDateTime,
}

/// One live game: participants, deck, turn state, and the deferred-card
/// subsystems. Owned exclusively by a single session actor.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// 4-10 char uppercase [A-Z0-9] code, unique while the session is alive.
    pub code: String,
    /// Always the first participant; reassigned to the list head on leave.
    pub host: ParticipantId,
    /// Ordered, unique, 1..=8 entries.
    pub participants: Vec<ParticipantId>,
    pub deck: Deck,
    pub status: SessionStatus,
    /// Index into `participants`; meaningful while Playing.
    pub turn_index: usize,
    pub direction: Direction,
    /// Append-only event log.
    pub history: Vec<HistoryRecord>,
    /// Per-participant saved rank-5/9 cards, at most 3 each.
    pub saved_cards: BTreeMap<ParticipantId, Vec<SavedCard>>,
    /// One entry per ace drawn, minus post-end consumptions.
    pub venganza_cards: Vec<VenganzaCard>,
    /// 0..=4; the fourth king ends the session.
    pub kings_count: u8,
    /// One entry per king drawn; len == kings_count.
    pub cup_content: Vec<CupEntry>,
    /// Complete over all 13 ranks; editable only while Waiting.
    pub rules: BTreeMap<Rank, String>,
    pub created_at: OffsetDateTime,
    pub started_at: Option<OffsetDateTime>,
    pub ended_at: Option<OffsetDateTime>,
}

impl Session {
    /// Create a session in Waiting with the host as sole participant.
    pub fn new(
        code: String,
        host: &str,
        deck: Deck,
        now: OffsetDateTime,
    ) -> Result<Self, DomainError> {
        let host = validate_participant_id(host)?;
        let mut saved_cards = BTreeMap::new();
        saved_cards.insert(host.clone(), Vec::new());

        Ok(Self {
            code,
            host: host.clone(),
            participants: vec![host],
            deck,
            status: SessionStatus::Waiting,
            turn_index: 0,
            direction: Direction::Forward,
            history: Vec::new(),
            saved_cards,
            venganza_cards: Vec::new(),
            kings_count: 0,
            cup_content: Vec::new(),
            rules: default_rules(),
            created_at: now,
            started_at: None,
            ended_at: None,
        })
    }

    /// The participant whose turn it is, while Playing.
    pub fn current_participant(&self) -> Option<&ParticipantId> {
        match self.status {
            SessionStatus::Playing => self.participants.get(self.turn_index),
            _ => None,
        }
    }

    pub fn contains(&self, participant: &str) -> bool {
        self.participants.iter().any(|p| p == participant)
    }

    pub fn is_host(&self, participant: &str) -> bool {
        self.host == participant
    }

    /// Rule text for a rank. The rules table is complete by construction.
    pub fn rule_text(&self, rank: Rank) -> String {
        self.rules.get(&rank).cloned().unwrap_or_default()
    }

    pub fn saved_for(&self, participant: &str) -> &[SavedCard] {
        self.saved_cards
            .get(participant)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn venganzas_for(&self, participant: &str) -> usize {
        self.venganza_cards
            .iter()
            .filter(|v| v.owner == participant)
            .count()
    }

    pub fn cards_drawn(&self) -> usize {
        self.history
            .iter()
            .filter(|h| h.kind == HistoryKind::Draw)
            .count()
    }

    /// Next turn index after one step in the current direction.
    pub fn next_turn_index(&self) -> usize {
        let n = self.participants.len() as i64;
        let step = self.direction.delta() as i64;
        ((self.turn_index as i64 + step + n) % n) as usize
    }

    pub fn require_status(&self, expected: SessionStatus) -> Result<(), DomainError> {
        if self.status != expected {
            return Err(DomainError::WrongState {
                current: self.status.as_str(),
            });
        }
        Ok(())
    }

    pub fn require_member(&self, participant: &str) -> Result<(), DomainError> {
        if !self.contains(participant) {
            return Err(DomainError::PlayerNotInSession(participant.to_string()));
        }
        Ok(())
    }

    pub fn require_host(&self, participant: &str) -> Result<(), DomainError> {
        self.require_member(participant)?;
        if !self.is_host(participant) {
            return Err(DomainError::NotHost(participant.to_string()));
        }
        Ok(())
    }

    /// Check every structural invariant of the aggregate.
    ///
    /// Used on snapshot restore and in tests; operations uphold these
    /// incrementally.
    pub fn check_invariants(&self) -> Result<(), DomainError> {
        let n = self.participants.len();
        if n == 0 || n > MAX_PARTICIPANTS {
            return Err(DomainError::Other(format!(
                "participant count {n} outside 1..={MAX_PARTICIPANTS}"
            )));
        }
        let unique: HashSet<&ParticipantId> = self.participants.iter().collect();
        if unique.len() != n {
            return Err(DomainError::Other("duplicate participants".into()));
        }
        if !self.contains(&self.host) {
            return Err(DomainError::Other("host not in participants".into()));
        }
        if self.status == SessionStatus::Playing && self.turn_index >= n {
            return Err(DomainError::Other(format!(
                "turn index {} out of range for {n} participants",
                self.turn_index
            )));
        }

        let draws = self.cards_drawn();
        if self.deck.remaining() + draws != DECK_SIZE {
            return Err(DomainError::Other(format!(
                "deck accounting broken: {} remaining + {draws} drawn != {DECK_SIZE}",
                self.deck.remaining()
            )));
        }

        let kings_drawn = self
            .history
            .iter()
            .filter(|h| h.kind == HistoryKind::Draw && h.card.rank == Rank::King)
            .count() as u8;
        if self.kings_count != kings_drawn
            || self.cup_content.len() as u8 != self.kings_count
            || self.kings_count > KINGS_TO_END
        {
            return Err(DomainError::Other(format!(
                "kings bookkeeping broken: count={} drawn={kings_drawn} cup={}",
                self.kings_count,
                self.cup_content.len()
            )));
        }

        let aces_drawn = self
            .history
            .iter()
            .filter(|h| h.kind == HistoryKind::Draw && h.card.rank == Rank::Ace)
            .count();
        let consumed = self
            .history
            .iter()
            .filter(|h| h.kind == HistoryKind::VenganzaConsume)
            .count();
        if aces_drawn.checked_sub(consumed) != Some(self.venganza_cards.len()) {
            return Err(DomainError::Other(format!(
                "venganza accounting broken: {} held, {aces_drawn} accrued, {consumed} consumed",
                self.venganza_cards.len()
            )));
        }

        for (participant, saved) in &self.saved_cards {
            if saved.len() > super::rules::MAX_SAVED_PER_PARTICIPANT {
                return Err(DomainError::Other(format!(
                    "{participant} holds {} saved cards, cap is {}",
                    saved.len(),
                    super::rules::MAX_SAVED_PER_PARTICIPANT
                )));
            }
            for entry in saved {
                let drawn_by_owner = self.history.iter().any(|h| {
                    h.index == entry.draw_index
                        && h.kind == HistoryKind::Draw
                        && h.actor == *participant
                        && h.card == entry.card
                });
                if !drawn_by_owner {
                    return Err(DomainError::Other(format!(
                        "saved card {} has no matching draw by {participant}",
                        entry.card.id()
                    )));
                }
            }
        }

        for (i, record) in self.history.iter().enumerate() {
            if record.index as usize != i {
                return Err(DomainError::Other("history indices not contiguous".into()));
            }
        }

        Ok(())
    }
}

/// Validate and normalize a participant id: non-empty after trim, bounded
/// length. Returns the trimmed id.
pub fn validate_participant_id(raw: &str) -> Result<ParticipantId, DomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidPlayerId("empty after trim".into()));
    }
    if trimmed.len() > MAX_PARTICIPANT_ID_LEN {
        return Err(DomainError::InvalidPlayerId(format!(
            "longer than {MAX_PARTICIPANT_ID_LEN} chars"
        )));
    }
    Ok(trimmed.to_string())
}
