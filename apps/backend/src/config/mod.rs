//! Environment-based application configuration.
//!
//! Every knob has a default so the server runs with an empty environment;
//! `APP_*` variables override individual values.

use std::str::FromStr;
use std::time::Duration;

use rand::rngs::OsRng;
use rand::RngCore;
use tracing::warn;

use crate::domain::rules::SavedCardPolicy;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_address: String,
    pub port: u16,
    /// Process-wide cap on live sessions; `createGame` past it fails with
    /// `CapacityExceeded`.
    pub max_sessions: usize,
    /// Bounded command queue per session actor.
    pub queue_capacity: usize,
    /// Bounded outbound buffer per event-bus subscriber.
    pub subscriber_buffer: usize,
    /// Retry attempts for generated-code collisions.
    pub code_attempts: u32,
    /// Waiting/Playing sessions with no traffic and no subscribers for this
    /// long are reaped.
    pub idle_timeout: Duration,
    /// Ended sessions linger this long for venganza consumption.
    pub ended_grace: Duration,
    pub reap_interval: Duration,
    /// Deadline applied to commands that do not carry one.
    pub default_deadline: Duration,
    /// Upper bound on client-supplied deadlines.
    pub max_deadline: Duration,
    pub saved_card_policy: SavedCardPolicy,
    /// Root seed for per-session deck shuffles. Random unless pinned via
    /// `APP_PROCESS_SEED` (64 hex chars) for reproducible games.
    pub process_seed: [u8; 32],
}

impl AppConfig {
    pub fn from_env() -> Self {
        let process_seed = match std::env::var("APP_PROCESS_SEED") {
            Ok(hex) => parse_seed_hex(&hex).unwrap_or_else(|| {
                warn!("APP_PROCESS_SEED is not 64 hex chars, using a random seed");
                random_seed()
            }),
            Err(_) => random_seed(),
        };

        Self {
            bind_address: env_or("APP_BIND_ADDRESS", "127.0.0.1".to_string()),
            port: env_or("APP_PORT", 3001),
            max_sessions: env_or("APP_MAX_SESSIONS", 1024),
            queue_capacity: env_or("APP_QUEUE_CAPACITY", 64),
            subscriber_buffer: env_or("APP_SUBSCRIBER_BUFFER", 32),
            code_attempts: env_or("APP_CODE_ATTEMPTS", 16),
            idle_timeout: Duration::from_secs(env_or("APP_IDLE_TIMEOUT_SECS", 1800)),
            ended_grace: Duration::from_secs(env_or("APP_ENDED_GRACE_SECS", 300)),
            reap_interval: Duration::from_secs(env_or("APP_REAP_INTERVAL_SECS", 60)),
            default_deadline: Duration::from_millis(env_or("APP_DEFAULT_DEADLINE_MS", 10_000)),
            max_deadline: Duration::from_millis(env_or("APP_MAX_DEADLINE_MS", 30_000)),
            saved_card_policy: saved_card_policy_from_env(),
            process_seed,
        }
    }

    /// Deterministic config for tests: pinned seed, tight timeouts.
    pub fn for_tests(process_seed: [u8; 32]) -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 0,
            max_sessions: 64,
            queue_capacity: 64,
            subscriber_buffer: 32,
            code_attempts: 16,
            idle_timeout: Duration::from_millis(200),
            ended_grace: Duration::from_millis(200),
            reap_interval: Duration::from_millis(50),
            default_deadline: Duration::from_secs(5),
            max_deadline: Duration::from_secs(10),
            saved_card_policy: SavedCardPolicy::DropOldest,
            process_seed,
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                warn!(key, raw = %raw, "Unparseable config value, using default");
                default
            }
        },
        Err(_) => default,
    }
}

fn saved_card_policy_from_env() -> SavedCardPolicy {
    match std::env::var("APP_SAVED_CARD_POLICY").as_deref() {
        Ok("reject") => SavedCardPolicy::Reject,
        Ok("drop_oldest") | Err(_) => SavedCardPolicy::DropOldest,
        Ok(other) => {
            warn!(value = other, "Unknown saved-card policy, using drop_oldest");
            SavedCardPolicy::DropOldest
        }
    }
}

fn random_seed() -> [u8; 32] {
    let mut seed = [0u8; 32];
    OsRng.fill_bytes(&mut seed);
    seed
}

fn parse_seed_hex(hex: &str) -> Option<[u8; 32]> {
    let hex = hex.trim();
    if hex.len() != 64 {
        return None;
    }
    let mut seed = [0u8; 32];
    for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
        let pair = std::str::from_utf8(chunk).ok()?;
        seed[i] = u8::from_str_radix(pair, 16).ok()?;
    }
    Some(seed)
}
