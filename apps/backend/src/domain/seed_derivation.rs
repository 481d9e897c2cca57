use crate::errors::domain::DomainError;

/// Validate that a seed is exactly 32 bytes and return it as a fixed-size array.
///
/// Centralized validation point for converting env-provided byte strings to
/// the `[u8; 32]` process seed.
pub fn require_seed_32(seed: &[u8]) -> Result<[u8; 32], DomainError> {
    seed.try_into().map_err(|_| {
        DomainError::Other(format!(
            "process seed must be exactly 32 bytes, got {}",
            seed.len()
        ))
    })
}

/// Derive the deck-shuffle seed for one session.
///
/// Creates a unique u64 seed per (process seed, session code) combination so
/// that:
/// - the same process seed + code always yields the same shuffle (testability)
/// - different sessions shuffle independently
pub fn derive_deck_seed(process_seed: &[u8; 32], session_code: &str) -> u64 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"chupistica/deck/v1");
    hasher.update(process_seed);
    hasher.update(session_code.as_bytes());
    let hash = hasher.finalize();
    let bytes: [u8; 8] = hash.as_bytes()[..8]
        .try_into()
        .expect("blake3 output is at least 8 bytes");
    u64::from_le_bytes(bytes)
}
