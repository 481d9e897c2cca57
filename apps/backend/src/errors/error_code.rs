//! Error kinds for the Cultura Chupística backend API.
//!
//! This module defines all error kinds surfaced in responses. Add new kinds
//! here; never pass ad-hoc strings as error kinds.
//!
//! Kinds map 1:1 to the stable identifiers that appear in the `error.kind`
//! field of wire responses.

use core::fmt;

/// Centralized error kinds for the backend API.
///
/// This enum ensures type safety and prevents the use of ad-hoc error kinds.
/// Each variant maps to a canonical identifier that appears in responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    // Request validation (stateless, produced by the dispatcher)
    /// Session code outside the 4-10 char [A-Z0-9] format
    InvalidGameCode,
    /// Participant id empty after trim, too long, or malformed
    InvalidPlayerId,
    /// Malformed card identifier
    InvalidCard,
    /// Malformed activation type
    InvalidCardType,
    /// Rules payload has unknown ranks or empty values
    InvalidRules,
    /// Malformed command envelope or unknown command type
    InvalidCommand,

    // Resource resolution
    /// No live session under the given code
    GameNotFound,

    // Session-state conflicts (stateful, produced by the session actor)
    /// Join attempted with eight participants already seated
    SessionFull,
    /// Duplicate join
    PlayerAlreadyInSession,
    /// Command from a non-member
    PlayerNotInSession,
    /// Operation invalid in the session's current status
    WrongState,
    /// Draw by a participant who does not hold the turn
    NotYourTurn,
    /// Draw with no cards remaining
    DeckEmpty,
    /// Host-only operation attempted by another participant
    NotHost,
    /// Activation of a card id not held by the participant
    SavedCardNotFound,
    /// Saved-card cap reached under the reject policy
    SaveCapacity,
    /// Venganza consumption with none owned
    NoVenganzaAvailable,
    /// Venganza target is not a participant
    InvalidTargetPlayer,

    // Registry
    /// Requested custom code already in use
    CodeTaken,
    /// Code generation exhausted its retry attempts
    CodeSpaceExhausted,
    /// Process-wide session cap hit
    CapacityExceeded,

    // System
    /// Command deadline elapsed before execution
    Cancelled,
    /// Unexpected failure; details stay in the server log
    Internal,
}

impl ErrorKind {
    /// Canonical string identifier, stable across releases.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidGameCode => "InvalidGameCode",
            ErrorKind::InvalidPlayerId => "InvalidPlayerId",
            ErrorKind::InvalidCard => "InvalidCard",
            ErrorKind::InvalidCardType => "InvalidCardType",
            ErrorKind::InvalidRules => "InvalidRules",
            ErrorKind::InvalidCommand => "InvalidCommand",
            ErrorKind::GameNotFound => "GameNotFound",
            ErrorKind::SessionFull => "SessionFull",
            ErrorKind::PlayerAlreadyInSession => "PlayerAlreadyInSession",
            ErrorKind::PlayerNotInSession => "PlayerNotInSession",
            ErrorKind::WrongState => "WrongState",
            ErrorKind::NotYourTurn => "NotYourTurn",
            ErrorKind::DeckEmpty => "DeckEmpty",
            ErrorKind::NotHost => "NotHost",
            ErrorKind::SavedCardNotFound => "SavedCardNotFound",
            ErrorKind::SaveCapacity => "SaveCapacity",
            ErrorKind::NoVenganzaAvailable => "NoVenganzaAvailable",
            ErrorKind::InvalidTargetPlayer => "InvalidTargetPlayer",
            ErrorKind::CodeTaken => "CodeTaken",
            ErrorKind::CodeSpaceExhausted => "CodeSpaceExhausted",
            ErrorKind::CapacityExceeded => "CapacityExceeded",
            ErrorKind::Cancelled => "Cancelled",
            ErrorKind::Internal => "Internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
