//! Commands accepted by session actors and their typed results.

use std::collections::BTreeMap;

use tokio::sync::oneshot;
use tokio::time::Instant;

use crate::domain::rules::RuleOutcome;
use crate::domain::stats::SessionStats;
use crate::domain::{Card, ParticipantId, Rank, SessionExport};
use crate::error::AppError;

/// Mutations and reads serialized through one session's queue.
///
/// Stateless shape validation happens in the dispatcher before enqueue; the
/// actor re-validates everything against current state.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Join { participant: ParticipantId },
    Leave { participant: ParticipantId },
    Start { participant: ParticipantId },
    Draw { participant: ParticipantId },
    Activate {
        participant: ParticipantId,
        card_id: String,
    },
    ConsumeVenganza {
        participant: ParticipantId,
        target: ParticipantId,
    },
    End {
        participant: ParticipantId,
        /// Optional client-supplied reason; defaults to the lifecycle one.
        reason: Option<String>,
    },
    UpdateRules {
        participant: ParticipantId,
        rules: BTreeMap<Rank, String>,
    },
    ResetRules { participant: ParticipantId },
    Snapshot,
}

/// Successful command result returned on the reply channel.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutput {
    Joined {
        participants: Vec<ParticipantId>,
    },
    Left {
        participants: Vec<ParticipantId>,
        host: Option<ParticipantId>,
        session_ended: bool,
    },
    Started {
        current_turn: ParticipantId,
    },
    Drawn {
        card: Card,
        outcome: RuleOutcome,
        ended: bool,
        current_turn: Option<ParticipantId>,
        direction: i8,
    },
    Activated {
        card_id: String,
    },
    VenganzaConsumed {
        target: ParticipantId,
        card_id: String,
        remaining: usize,
    },
    Ended {
        reason: String,
        stats: SessionStats,
    },
    RulesUpdated {
        rules: BTreeMap<Rank, String>,
    },
    Snapshot(Box<SessionExport>),
}

/// One queued unit of work: the command, its absolute deadline, and the
/// one-shot reply channel back to the caller.
pub struct CommandEnvelope {
    pub command: SessionCommand,
    pub deadline: Instant,
    pub reply: oneshot::Sender<Result<CommandOutput, AppError>>,
}
