//! Card parsing from identifier strings (e.g. "5_hearts", "a_spades")

use std::str::FromStr;

use super::cards::{Card, Rank, Suit};
use crate::errors::domain::DomainError;

impl FromStr for Card {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let (rank_tok, suit_tok) = lower
            .split_once('_')
            .ok_or_else(|| DomainError::Other(format!("malformed card id: {s}")))?;

        let rank = Rank::ALL
            .into_iter()
            .find(|r| r.token() == rank_tok)
            .ok_or_else(|| DomainError::Other(format!("invalid rank in card id: {s}")))?;
        let suit = Suit::ALL
            .into_iter()
            .find(|su| su.token() == suit_tok)
            .ok_or_else(|| DomainError::Other(format!("invalid suit in card id: {s}")))?;

        Ok(Card { suit, rank })
    }
}

impl FromStr for Rank {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Rank::ALL
            .into_iter()
            .find(|r| r.token() == lower)
            .ok_or_else(|| DomainError::Other(format!("invalid rank: {s}")))
    }
}

/// Non-panicking helper to parse card id tokens into Card instances.
/// Fails if any token is invalid.
pub fn try_parse_cards<I, S>(tokens: I) -> Result<Vec<Card>, DomainError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tokens
        .into_iter()
        .map(|s| s.as_ref().parse::<Card>())
        .collect()
}
