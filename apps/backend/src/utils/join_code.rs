//! Session code generation and normalization.
//!
//! Codes are 4-10 character [A-Z0-9] strings; generated codes are 6
//! characters sampled with the OS's cryptographically secure RNG.

use rand::distributions::Uniform;
use rand::prelude::*;
use rand::rngs::OsRng;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub const GENERATED_CODE_LEN: usize = 6;
pub const MIN_CODE_LEN: usize = 4;
pub const MAX_CODE_LEN: usize = 10;

/// Generate a random session code.
///
/// Creates a 6-character code by sampling [A-Z0-9] uniformly. Uniqueness is
/// enforced by the registry's atomic insert, not here.
pub fn generate_session_code() -> String {
    let mut rng = OsRng;
    let dist = Uniform::from(0..CODE_ALPHABET.len());

    let mut s = String::with_capacity(GENERATED_CODE_LEN);
    for _ in 0..GENERATED_CODE_LEN {
        s.push(CODE_ALPHABET[dist.sample(&mut rng)] as char);
    }
    s
}

/// Normalize a client-supplied code: trim, uppercase, and validate the
/// 4-10 char [A-Z0-9] format. Returns None when the format is invalid.
pub fn normalize_code(raw: &str) -> Option<String> {
    let code = raw.trim().to_ascii_uppercase();
    if !(MIN_CODE_LEN..=MAX_CODE_LEN).contains(&code.len()) {
        return None;
    }
    if !code.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()) {
        return None;
    }
    Some(code)
}
