//! Transport-agnostic wire envelopes and command payloads.

pub mod game_state;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Inbound command envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub payload: serde_json::Value,
    #[serde(default)]
    pub deadline_ms: Option<u64>,
}

/// Outbound response envelope.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub ok: bool,
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub kind: &'static str,
    pub message: String,
}

impl Response {
    pub fn success(type_: &str, data: serde_json::Value) -> Self {
        Self {
            ok: true,
            type_: type_.to_string(),
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(type_: &str, err: &AppError) -> Self {
        Self {
            ok: false,
            type_: type_.to_string(),
            data: None,
            error: Some(ErrorInfo {
                kind: err.kind().as_str(),
                message: err.public_message(),
            }),
        }
    }
}

// Command payloads. Stateless shape validation happens in the dispatcher.

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGamePayload {
    pub player_id: String,
    #[serde(default)]
    pub code: Option<String>,
}

/// Shared payload for commands that only identify the acting participant.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerPayload {
    pub player_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateCardPayload {
    pub player_id: String,
    pub card_id: String,
    /// Activation type; only "saved" cards can be activated.
    #[serde(default)]
    pub card_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VenganzaPayload {
    pub player_id: String,
    pub target_player_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndGamePayload {
    pub player_id: String,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRulesPayload {
    pub player_id: String,
    pub rules: BTreeMap<String, String>,
}
