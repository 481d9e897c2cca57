//! Domain layer: pure game model, rule engine, and projections.

pub mod cards;
pub mod cards_parsing;
pub mod cards_serde;
pub mod deck;
pub mod drawing;
pub mod lifecycle;
pub mod rules;
pub mod saved_cards;
pub mod seed_derivation;
pub mod snapshot;
pub mod state;
pub mod stats;
pub mod summary;
pub mod venganza;

#[cfg(test)]
mod test_helpers;
#[cfg(test)]
mod tests_lifecycle;
#[cfg(test)]
mod tests_props;
#[cfg(test)]
mod tests_saved_cards;
#[cfg(test)]
mod tests_snapshot;
#[cfg(test)]
mod tests_stats;
#[cfg(test)]
mod tests_venganza;

// Re-exports for ergonomics
pub use cards::{Card, Color, Rank, Suit};
pub use cards_parsing::try_parse_cards;
pub use deck::{full_deck, Deck, DECK_SIZE};
pub use lifecycle::EndReason;
pub use rules::{
    default_rules, outcome_for_draw, RuleOutcome, RuleOutcomeKind, SavedCardPolicy,
    KINGS_TO_END, MAX_PARTICIPANTS, MAX_SAVED_PER_PARTICIPANT, MIN_PARTICIPANTS_TO_START,
};
pub use seed_derivation::{derive_deck_seed, require_seed_32};
pub use snapshot::{export, restore, SessionExport, EXPORT_VERSION};
pub use state::{
    validate_participant_id, Direction, HistoryKind, HistoryRecord, ParticipantId, SavedCard,
    Session, SessionStatus, VenganzaCard, MAX_PARTICIPANT_ID_LEN,
};
pub use summary::{final_summary, timeline, FinalSummary};
