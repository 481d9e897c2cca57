//! Deck construction, deterministic shuffling, and draw mechanics.

use super::cards::{Card, Rank, Suit};
use crate::errors::domain::DomainError;

pub const DECK_SIZE: usize = 52;

/// Generate the full 52-card deck in standard order.
pub fn full_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(DECK_SIZE);
    for suit in Suit::ALL {
        for rank in Rank::ALL {
            deck.push(Card { suit, rank });
        }
    }
    deck
}

/// Simple deterministic RNG for shuffling.
///
/// Uses a SplitMix64-style generator for good statistical properties while
/// remaining fast and deterministic given a seed.
struct SimpleLcg {
    state: u64,
}

impl SimpleLcg {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next(&mut self) -> u64 {
        // SplitMix64: well-distributed 64-bit generator.
        self.state = self.state.wrapping_add(0x9E3779B97F4A7C15);
        let mut z = self.state;
        z ^= z >> 30;
        z = z.wrapping_mul(0xBF58476D1CE4E5B9);
        z ^= z >> 27;
        z = z.wrapping_mul(0x94D049BB133111EB);
        z ^ (z >> 31)
    }

    fn next_range(&mut self, max: usize) -> usize {
        let m = max as u64;
        // Largest multiple of m that fits in u64; values >= limit are
        // discarded with rejection sampling to avoid modulo bias.
        let limit = u64::MAX - (u64::MAX % m);

        loop {
            let x = self.next();
            if x < limit {
                return (x % m) as usize;
            }
        }
    }
}

/// Fisher-Yates shuffle using deterministic RNG.
fn shuffle_with_seed(cards: &mut [Card], seed: u64) {
    let mut rng = SimpleLcg::new(seed);
    for i in (1..cards.len()).rev() {
        let j = rng.next_range(i + 1);
        cards.swap(i, j);
    }
}

/// Ordered pile of remaining cards. Draws pop from the tail; the deck is
/// never refilled during a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Build a full deck shuffled deterministically from `seed`.
    pub fn shuffled(seed: u64) -> Self {
        let mut cards = full_deck();
        shuffle_with_seed(&mut cards, seed);
        Self { cards }
    }

    /// Rebuild a deck from an explicit card order (snapshot restore).
    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    /// Remove and return the tail card.
    pub fn draw(&mut self) -> Result<Card, DomainError> {
        self.cards.pop().ok_or(DomainError::DeckEmpty)
    }

    /// The card the next draw would return, if any.
    pub fn peek(&self) -> Option<Card> {
        self.cards.last().copied()
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}
