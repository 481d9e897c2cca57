use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::errors::ErrorKind;

/// Domain-level error type produced by session operations.
///
/// HTTP-agnostic. Handlers return `Result<T, crate::error::AppError>` and
/// convert from `DomainError` via the provided `From` implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Operation not valid while the session is in `current` status.
    WrongState { current: &'static str },
    NotYourTurn,
    DeckEmpty,
    SessionFull,
    PlayerAlreadyInSession(String),
    PlayerNotInSession(String),
    NotHost(String),
    SavedCardNotFound(String),
    SaveCapacity,
    NoVenganzaAvailable(String),
    InvalidTargetPlayer(String),
    InvalidRules(String),
    InvalidPlayerId(String),
    Other(String),
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DomainError::WrongState { current } => {
                write!(f, "operation not allowed while session is {current}")
            }
            DomainError::NotYourTurn => write!(f, "not your turn"),
            DomainError::DeckEmpty => write!(f, "no cards left in the deck"),
            DomainError::SessionFull => write!(f, "session already has 8 participants"),
            DomainError::PlayerAlreadyInSession(p) => {
                write!(f, "participant {p} is already in the session")
            }
            DomainError::PlayerNotInSession(p) => {
                write!(f, "participant {p} is not in the session")
            }
            DomainError::NotHost(p) => write!(f, "participant {p} is not the host"),
            DomainError::SavedCardNotFound(id) => write!(f, "saved card {id} not held"),
            DomainError::SaveCapacity => write!(f, "saved-card capacity reached"),
            DomainError::NoVenganzaAvailable(p) => {
                write!(f, "participant {p} has no venganza available")
            }
            DomainError::InvalidTargetPlayer(p) => {
                write!(f, "target {p} is not a participant")
            }
            DomainError::InvalidRules(detail) => write!(f, "invalid rules: {detail}"),
            DomainError::InvalidPlayerId(detail) => write!(f, "invalid participant id: {detail}"),
            DomainError::Other(detail) => write!(f, "domain error: {detail}"),
        }
    }
}

impl Error for DomainError {}

impl DomainError {
    /// Stable error kind surfaced in responses.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::WrongState { .. } => ErrorKind::WrongState,
            DomainError::NotYourTurn => ErrorKind::NotYourTurn,
            DomainError::DeckEmpty => ErrorKind::DeckEmpty,
            DomainError::SessionFull => ErrorKind::SessionFull,
            DomainError::PlayerAlreadyInSession(_) => ErrorKind::PlayerAlreadyInSession,
            DomainError::PlayerNotInSession(_) => ErrorKind::PlayerNotInSession,
            DomainError::NotHost(_) => ErrorKind::NotHost,
            DomainError::SavedCardNotFound(_) => ErrorKind::SavedCardNotFound,
            DomainError::SaveCapacity => ErrorKind::SaveCapacity,
            DomainError::NoVenganzaAvailable(_) => ErrorKind::NoVenganzaAvailable,
            DomainError::InvalidTargetPlayer(_) => ErrorKind::InvalidTargetPlayer,
            DomainError::InvalidRules(_) => ErrorKind::InvalidRules,
            DomainError::InvalidPlayerId(_) => ErrorKind::InvalidPlayerId,
            DomainError::Other(_) => ErrorKind::Internal,
        }
    }
}
