//! Command dispatcher: stateless validation, session resolution, enqueue.
//!
//! Everything checkable without session state is rejected here (shape, code
//! format, participant-id format, card validity). Stateful checks (turn
//! ownership, status, membership) belong to the session actor, which is the
//! source of truth. A stateless failure never touches an actor.

use std::collections::BTreeMap;
use std::sync::Arc;

use actix_web::http::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use time::OffsetDateTime;
use tokio::time::Instant;
use tracing::debug;

use crate::domain::state::validate_participant_id;
use crate::domain::{
    final_summary, stats, Card, Rank, SessionExport, SessionStatus,
};
use crate::engine::{CommandOutput, SessionCommand, SessionHandle, SessionRegistry};
use crate::error::AppError;
use crate::errors::domain::DomainError;
use crate::errors::ErrorKind;
use crate::protocol::game_state::game_state_view;
use crate::protocol::{
    ActivateCardPayload, Command, CreateGamePayload, EndGamePayload, PlayerPayload, Response,
    UpdateRulesPayload, VenganzaPayload,
};
use crate::utils::join_code::normalize_code;

#[derive(Clone)]
pub struct CommandDispatcher {
    registry: Arc<SessionRegistry>,
}

impl CommandDispatcher {
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self { registry }
    }

    /// Execute one wire command, always producing a response envelope.
    pub async fn execute(&self, command: Command) -> (StatusCode, Response) {
        let type_ = command.type_.clone();
        match self.route(command).await {
            Ok(data) => (StatusCode::OK, Response::success(&type_, data)),
            Err(err) => {
                debug!(command = %type_, kind = %err.kind(), "Command failed");
                (err.status(), Response::failure(&type_, &err))
            }
        }
    }

    async fn route(&self, command: Command) -> Result<Value, AppError> {
        let deadline = self.deadline(command.deadline_ms);

        match command.type_.as_str() {
            "createGame" => {
                let payload: CreateGamePayload =
                    parse_payload(command.payload, ErrorKind::InvalidPlayerId)?;
                let player = validate_participant_id(&payload.player_id)?;
                let custom_code = match payload.code.as_deref() {
                    Some(raw) => Some(normalize_code(raw).ok_or_else(|| {
                        AppError::validation(
                            ErrorKind::InvalidGameCode,
                            format!("code {raw:?} is not 4-10 chars of [A-Z0-9]"),
                        )
                    })?),
                    None => None,
                };

                let handle = self
                    .registry
                    .create(&player, custom_code.as_deref())?;
                let export = self.snapshot(&handle, deadline).await?;
                Ok(json!({
                    "code": handle.code(),
                    "state": game_state_view(&export),
                }))
            }

            "joinGame" => {
                let handle = self.resolve(command.code.as_deref())?;
                let payload: PlayerPayload =
                    parse_payload(command.payload, ErrorKind::InvalidPlayerId)?;
                let player = validate_participant_id(&payload.player_id)?;
                match handle.send(SessionCommand::Join { participant: player }, deadline).await? {
                    CommandOutput::Joined { participants } => {
                        Ok(json!({ "participants": participants }))
                    }
                    other => Err(unexpected_output("joinGame", &other)),
                }
            }

            "leaveGame" => {
                let handle = self.resolve(command.code.as_deref())?;
                let payload: PlayerPayload =
                    parse_payload(command.payload, ErrorKind::InvalidPlayerId)?;
                let player = validate_participant_id(&payload.player_id)?;
                match handle.send(SessionCommand::Leave { participant: player }, deadline).await? {
                    CommandOutput::Left {
                        participants,
                        host,
                        session_ended,
                    } => Ok(json!({
                        "participants": participants,
                        "newHost": host,
                        "sessionEnded": session_ended,
                    })),
                    other => Err(unexpected_output("leaveGame", &other)),
                }
            }

            "startGame" => {
                let handle = self.resolve(command.code.as_deref())?;
                let payload: PlayerPayload =
                    parse_payload(command.payload, ErrorKind::InvalidPlayerId)?;
                let player = validate_participant_id(&payload.player_id)?;
                match handle.send(SessionCommand::Start { participant: player }, deadline).await? {
                    CommandOutput::Started { current_turn } => {
                        Ok(json!({ "currentTurn": current_turn }))
                    }
                    other => Err(unexpected_output("startGame", &other)),
                }
            }

            "drawCard" => {
                let handle = self.resolve(command.code.as_deref())?;
                let payload: PlayerPayload =
                    parse_payload(command.payload, ErrorKind::InvalidPlayerId)?;
                let player = validate_participant_id(&payload.player_id)?;
                match handle.send(SessionCommand::Draw { participant: player }, deadline).await? {
                    CommandOutput::Drawn {
                        card,
                        outcome,
                        ended,
                        current_turn,
                        direction,
                    } => Ok(json!({
                        "card": card,
                        "cardId": card.id(),
                        "outcome": outcome,
                        "ended": ended,
                        "currentTurn": current_turn,
                        "direction": direction,
                    })),
                    other => Err(unexpected_output("drawCard", &other)),
                }
            }

            "activateCard" => {
                let handle = self.resolve(command.code.as_deref())?;
                let payload: ActivateCardPayload =
                    parse_payload(command.payload, ErrorKind::InvalidCard)?;
                let player = validate_participant_id(&payload.player_id)?;
                let card: Card = payload.card_id.parse().map_err(|_| {
                    AppError::validation(
                        ErrorKind::InvalidCard,
                        format!("malformed card id {:?}", payload.card_id),
                    )
                })?;
                if let Some(card_type) = payload.card_type.as_deref() {
                    if card_type != "saved" {
                        return Err(AppError::validation(
                            ErrorKind::InvalidCardType,
                            format!("unknown activation type {card_type:?}"),
                        ));
                    }
                }

                let sent = SessionCommand::Activate {
                    participant: player,
                    card_id: card.id(),
                };
                match handle.send(sent, deadline).await? {
                    CommandOutput::Activated { card_id } => Ok(json!({ "cardId": card_id })),
                    other => Err(unexpected_output("activateCard", &other)),
                }
            }

            "useVenganza" => {
                let handle = self.resolve(command.code.as_deref())?;
                let payload: VenganzaPayload =
                    parse_payload(command.payload, ErrorKind::InvalidTargetPlayer)?;
                let player = validate_participant_id(&payload.player_id)?;
                let target = validate_participant_id(&payload.target_player_id)?;
                let sent = SessionCommand::ConsumeVenganza {
                    participant: player,
                    target,
                };
                match handle.send(sent, deadline).await? {
                    CommandOutput::VenganzaConsumed {
                        target,
                        card_id,
                        remaining,
                    } => Ok(json!({
                        "target": target,
                        "cardId": card_id,
                        "remaining": remaining,
                    })),
                    other => Err(unexpected_output("useVenganza", &other)),
                }
            }

            "endGame" => {
                let handle = self.resolve(command.code.as_deref())?;
                let payload: EndGamePayload =
                    parse_payload(command.payload, ErrorKind::InvalidPlayerId)?;
                let player = validate_participant_id(&payload.player_id)?;
                let sent = SessionCommand::End {
                    participant: player,
                    reason: payload.reason,
                };
                match handle.send(sent, deadline).await? {
                    CommandOutput::Ended { reason, stats } => Ok(json!({
                        "reason": reason,
                        "stats": stats,
                    })),
                    other => Err(unexpected_output("endGame", &other)),
                }
            }

            "updateRules" => {
                let handle = self.resolve(command.code.as_deref())?;
                let payload: UpdateRulesPayload =
                    parse_payload(command.payload, ErrorKind::InvalidRules)?;
                let player = validate_participant_id(&payload.player_id)?;
                let rules = parse_rules(payload.rules)?;
                let sent = SessionCommand::UpdateRules {
                    participant: player,
                    rules,
                };
                match handle.send(sent, deadline).await? {
                    CommandOutput::RulesUpdated { rules } => Ok(json!({ "rules": rules })),
                    other => Err(unexpected_output("updateRules", &other)),
                }
            }

            "resetRules" => {
                let handle = self.resolve(command.code.as_deref())?;
                let payload: PlayerPayload =
                    parse_payload(command.payload, ErrorKind::InvalidPlayerId)?;
                let player = validate_participant_id(&payload.player_id)?;
                match handle.send(SessionCommand::ResetRules { participant: player }, deadline).await? {
                    CommandOutput::RulesUpdated { rules } => Ok(json!({ "rules": rules })),
                    other => Err(unexpected_output("resetRules", &other)),
                }
            }

            "getRules" => {
                let handle = self.resolve(command.code.as_deref())?;
                let export = self.snapshot(&handle, deadline).await?;
                Ok(json!({ "rules": export.rules }))
            }

            "getGameState" => {
                let handle = self.resolve(command.code.as_deref())?;
                let export = self.snapshot(&handle, deadline).await?;
                Ok(serde_json::to_value(game_state_view(&export)).map_err(json_fail)?)
            }

            "getHistory" => {
                let handle = self.resolve(command.code.as_deref())?;
                let export = self.snapshot(&handle, deadline).await?;
                Ok(json!({ "history": export.history }))
            }

            "getStats" => {
                let handle = self.resolve(command.code.as_deref())?;
                let export = self.snapshot(&handle, deadline).await?;
                let now = OffsetDateTime::now_utc();
                Ok(json!({
                    "session": stats::session_stats(&export, now),
                    "participants": stats::participant_stats(&export),
                    "byRank": stats::distribution_by_rank(&export),
                    "bySuit": stats::distribution_by_suit(&export),
                    "byColor": stats::distribution_by_color(&export),
                    "turns": stats::turn_stats(&export),
                    "ruleApplications": stats::rule_applications(&export),
                }))
            }

            "getFinalSummary" => {
                let handle = self.resolve(command.code.as_deref())?;
                let export = self.snapshot(&handle, deadline).await?;
                if export.status != SessionStatus::Ended {
                    return Err(DomainError::WrongState {
                        current: export.status.as_str(),
                    }
                    .into());
                }
                let summary = final_summary(&export, OffsetDateTime::now_utc());
                Ok(serde_json::to_value(summary).map_err(json_fail)?)
            }

            other => Err(AppError::validation(
                ErrorKind::InvalidCommand,
                format!("unknown command type {other:?}"),
            )),
        }
    }

    /// Resolve the target session from the envelope's code.
    fn resolve(&self, code: Option<&str>) -> Result<SessionHandle, AppError> {
        let raw = code.ok_or_else(|| {
            AppError::validation(ErrorKind::InvalidGameCode, "missing session code")
        })?;
        let code = normalize_code(raw).ok_or_else(|| {
            AppError::validation(
                ErrorKind::InvalidGameCode,
                format!("code {raw:?} is not 4-10 chars of [A-Z0-9]"),
            )
        })?;
        self.registry.lookup(&code).ok_or_else(|| {
            AppError::not_found(ErrorKind::GameNotFound, format!("no session under {code}"))
        })
    }

    async fn snapshot(
        &self,
        handle: &SessionHandle,
        deadline: Instant,
    ) -> Result<SessionExport, AppError> {
        match handle.send(SessionCommand::Snapshot, deadline).await? {
            CommandOutput::Snapshot(export) => Ok(*export),
            other => Err(unexpected_output("snapshot", &other)),
        }
    }

    /// Absolute deadline: the client's request clamped to the configured
    /// maximum, or the default when absent.
    fn deadline(&self, requested_ms: Option<u64>) -> Instant {
        let config = self.registry.config();
        let duration = match requested_ms {
            Some(ms) => std::time::Duration::from_millis(ms).min(config.max_deadline),
            None => config.default_deadline,
        };
        Instant::now() + duration
    }
}

fn parse_payload<T: DeserializeOwned>(payload: Value, kind: ErrorKind) -> Result<T, AppError> {
    serde_json::from_value(payload)
        .map_err(|e| AppError::validation(kind, format!("invalid payload: {e}")))
}

fn parse_rules(raw: BTreeMap<String, String>) -> Result<BTreeMap<Rank, String>, AppError> {
    let mut rules = BTreeMap::new();
    for (key, text) in raw {
        let rank: Rank = key.parse().map_err(|_| {
            AppError::validation(ErrorKind::InvalidRules, format!("unknown rank {key:?}"))
        })?;
        if text.trim().is_empty() {
            return Err(AppError::validation(
                ErrorKind::InvalidRules,
                format!("empty rule text for rank {key:?}"),
            ));
        }
        rules.insert(rank, text);
    }
    Ok(rules)
}

fn unexpected_output(command: &str, output: &CommandOutput) -> AppError {
    AppError::internal(format!(
        "unexpected actor output for {command}: {output:?}"
    ))
}

fn json_fail(e: serde_json::Error) -> AppError {
    AppError::internal(format!("response serialization failed: {e}"))
}
