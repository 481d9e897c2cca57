//! Rank-to-effect mapping and the editable rules table.
//!
//! The card-rank to effect mapping lives in this one table; everything else
//! (actor, stats, clients) consumes the produced [`RuleOutcome`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::cards::{Card, Rank};
use super::state::{ParticipantId, Session};

pub const MAX_PARTICIPANTS: usize = 8;
pub const MIN_PARTICIPANTS_TO_START: usize = 2;
pub const MAX_SAVED_PER_PARTICIPANT: usize = 3;
pub const KINGS_TO_END: u8 = 4;

/// Options offered by the three "choose" ranks.
pub const CHOOSE_OPTIONS_FOUR: [&str; 2] = ["más gato", "mi barquito"];
pub const CHOOSE_OPTIONS_EIGHT: [&str; 2] = ["más joven", "colores"];
pub const CHOOSE_OPTIONS_TEN: [&str; 2] = ["al juez", "historia"];

/// What happens when a saved-card draw would exceed the per-participant cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SavedCardPolicy {
    /// Silently drop the oldest saved card of that participant.
    #[default]
    DropOldest,
    /// Refuse the draw with `SaveCapacity`.
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleOutcomeKind {
    DrinkSelf,
    DrinkLeft,
    DrinkRight,
    DrinkFirstSeen,
    YoNuncaNunca,
    SieteBomb,
    ChooseRule,
    SaveCard,
    VenganzaAccrued,
    KingsCup,
    EndTriggered,
}

/// Tagged result of applying a card's rule, consumed by clients and by the
/// session's own bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleOutcome {
    pub kind: RuleOutcomeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_participant: Option<ParticipantId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_card_rank: Option<Rank>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub king_stage: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choose_options: Option<Vec<String>>,
    pub message: String,
    pub ends_session: bool,
}

impl RuleOutcome {
    fn informational(kind: RuleOutcomeKind, message: String) -> Self {
        Self {
            kind,
            target_participant: None,
            saved_card_rank: None,
            king_stage: None,
            choose_options: None,
            message,
            ends_session: false,
        }
    }
}

/// Default human-readable rule text for every rank.
pub fn default_rules() -> BTreeMap<Rank, String> {
    let texts: [(Rank, &str); 13] = [
        (
            Rank::Ace,
            "Venganza: acumulas una venganza para el final del juego",
        ),
        (Rank::Two, "Yo tomo: el que sacó la carta toma"),
        (
            Rank::Three,
            "Yo nunca nunca: di algo que nunca hayas hecho, quien lo haya hecho toma",
        ),
        (Rank::Four, "Elige: más gato o mi barquito"),
        (Rank::Five, "Guarda esta carta y actívala cuando quieras"),
        (Rank::Six, "El primero que veas toma"),
        (Rank::Seven, "Siete bomba: se invierte el sentido del juego"),
        (Rank::Eight, "Elige: más joven o colores"),
        (Rank::Nine, "Guarda esta carta y actívala cuando quieras"),
        (Rank::Ten, "Elige: al juez o historia"),
        (Rank::Jack, "El de tu izquierda toma"),
        (Rank::Queen, "El de tu derecha toma"),
        (
            Rank::King,
            "Copa de reyes: sirve a la copa; el que saque el cuarto rey se la toma",
        ),
    ];
    texts
        .into_iter()
        .map(|(rank, text)| (rank, text.to_string()))
        .collect()
}

/// Compute the rule outcome for drawing `card` in the session's current state.
///
/// Pure with respect to the session: bookkeeping (venganza accrual, saved
/// cards, Kings' Cup) is applied by the draw operation afterwards. Drink
/// targets for J/Q are resolved against the turn index before it advances.
pub fn outcome_for_draw(state: &Session, card: Card) -> RuleOutcome {
    let message = state.rule_text(card.rank);
    let n = state.participants.len();

    match card.rank {
        Rank::Ace => RuleOutcome {
            kind: RuleOutcomeKind::VenganzaAccrued,
            target_participant: None,
            saved_card_rank: None,
            king_stage: None,
            choose_options: None,
            message,
            ends_session: false,
        },
        Rank::Two => RuleOutcome {
            kind: RuleOutcomeKind::DrinkSelf,
            target_participant: state.participants.get(state.turn_index).cloned(),
            saved_card_rank: None,
            king_stage: None,
            choose_options: None,
            message,
            ends_session: false,
        },
        Rank::Three => RuleOutcome::informational(RuleOutcomeKind::YoNuncaNunca, message),
        Rank::Four => choose(message, &CHOOSE_OPTIONS_FOUR),
        Rank::Five => save(message, Rank::Five),
        Rank::Six => RuleOutcome::informational(RuleOutcomeKind::DrinkFirstSeen, message),
        Rank::Seven => RuleOutcome::informational(RuleOutcomeKind::SieteBomb, message),
        Rank::Eight => choose(message, &CHOOSE_OPTIONS_EIGHT),
        Rank::Nine => save(message, Rank::Nine),
        Rank::Ten => choose(message, &CHOOSE_OPTIONS_TEN),
        Rank::Jack => RuleOutcome {
            kind: RuleOutcomeKind::DrinkLeft,
            target_participant: state.participants.get((state.turn_index + 1) % n).cloned(),
            saved_card_rank: None,
            king_stage: None,
            choose_options: None,
            message,
            ends_session: false,
        },
        Rank::Queen => RuleOutcome {
            kind: RuleOutcomeKind::DrinkRight,
            target_participant: state
                .participants
                .get((state.turn_index + n - 1) % n)
                .cloned(),
            saved_card_rank: None,
            king_stage: None,
            choose_options: None,
            message,
            ends_session: false,
        },
        Rank::King => {
            let stage = state.kings_count + 1;
            let ends = stage >= KINGS_TO_END;
            RuleOutcome {
                kind: if ends {
                    RuleOutcomeKind::EndTriggered
                } else {
                    RuleOutcomeKind::KingsCup
                },
                target_participant: None,
                saved_card_rank: None,
                king_stage: Some(stage),
                choose_options: None,
                message,
                ends_session: ends,
            }
        }
    }
}

fn choose(message: String, options: &[&str; 2]) -> RuleOutcome {
    RuleOutcome {
        kind: RuleOutcomeKind::ChooseRule,
        target_participant: None,
        saved_card_rank: None,
        king_stage: None,
        choose_options: Some(options.iter().map(|s| s.to_string()).collect()),
        message,
        ends_session: false,
    }
}

fn save(message: String, rank: Rank) -> RuleOutcome {
    RuleOutcome {
        kind: RuleOutcomeKind::SaveCard,
        target_participant: None,
        saved_card_rank: Some(rank),
        king_stage: None,
        choose_options: None,
        message,
        ends_session: false,
    }
}
