//! Shared fixtures for engine and HTTP integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use backend::config::AppConfig;
use backend::engine::{CommandOutput, SessionCommand, SessionHandle, SessionRegistry};
use tokio::time::{Duration, Instant};

pub const TEST_SEED: [u8; 32] = [0x42; 32];

pub fn init() {
    backend_test_support::test_logging::init();
}

pub fn test_config() -> AppConfig {
    AppConfig::for_tests(TEST_SEED)
}

pub fn test_registry() -> Arc<SessionRegistry> {
    init();
    SessionRegistry::new(Arc::new(test_config()))
}

/// Comfortable absolute deadline for commands that should run.
pub fn deadline() -> Instant {
    Instant::now() + Duration::from_secs(5)
}

/// Deadline that has already elapsed, for cancellation tests.
pub fn expired_deadline() -> Instant {
    Instant::now() - Duration::from_millis(1)
}

pub async fn join(handle: &SessionHandle, participant: &str) -> CommandOutput {
    handle
        .send(
            SessionCommand::Join {
                participant: participant.to_string(),
            },
            deadline(),
        )
        .await
        .expect("join should succeed")
}

pub async fn start(handle: &SessionHandle, host: &str) -> CommandOutput {
    handle
        .send(
            SessionCommand::Start {
                participant: host.to_string(),
            },
            deadline(),
        )
        .await
        .expect("start should succeed")
}

pub async fn draw(handle: &SessionHandle, participant: &str) -> CommandOutput {
    handle
        .send(
            SessionCommand::Draw {
                participant: participant.to_string(),
            },
            deadline(),
        )
        .await
        .expect("draw should succeed")
}

/// Spin up a Playing session with the given participants.
pub async fn playing_session(
    registry: &Arc<SessionRegistry>,
    code: &str,
    participants: &[&str],
) -> SessionHandle {
    let handle = registry
        .create(participants[0], Some(code))
        .expect("create should succeed");
    for participant in &participants[1..] {
        join(&handle, participant).await;
    }
    start(&handle, participants[0]).await;
    handle
}

pub async fn snapshot(handle: &SessionHandle) -> backend::domain::SessionExport {
    match handle
        .send(SessionCommand::Snapshot, deadline())
        .await
        .expect("snapshot should succeed")
    {
        CommandOutput::Snapshot(export) => *export,
        other => panic!("unexpected snapshot output: {other:?}"),
    }
}
