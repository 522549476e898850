use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

use crate::cards::{full_deck, Card, DURAK_DECK_SIZE};
use crate::errors::GameError;

/// Ordered draw pile. Index 0 is the top (next card drawn); the last card is
/// the face-up trump card, drawn last.
///
/// Every drawing operation takes `&self` and returns the remaining deck, so a
/// deck value is never shared between games.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Shuffled 36-card deck. `None` draws a fresh seed.
    pub fn new_shuffled(seed: Option<u64>) -> Self {
        Self::new_with_seed(seed.unwrap_or_else(rand::random))
    }

    pub fn new_with_seed(seed: u64) -> Self {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let mut cards = full_deck();
        // Fisher-Yates
        cards.shuffle(&mut rng);
        Self { cards }
    }

    /// Builds a deck from an explicit order. The cards must be exactly the
    /// 36-card universe.
    pub fn from_cards(cards: Vec<Card>) -> Result<Self, GameError> {
        let unique: HashSet<Card> = cards.iter().copied().collect();
        let universe: HashSet<Card> = full_deck().into_iter().collect();
        if cards.len() != DURAK_DECK_SIZE || unique != universe {
            return Err(GameError::InvalidSetup(format!(
                "deck must hold the {DURAK_DECK_SIZE} distinct Durak cards, got {} ({} distinct)",
                cards.len(),
                unique.len()
            )));
        }
        Ok(Self { cards })
    }

    /// Arranged deck: `top` is dealt first, `trump` goes to the bottom and the
    /// rest of the universe fills the middle in canonical order.
    pub fn stacked(top: &[Card], trump: Card) -> Result<Self, GameError> {
        let mut cards: Vec<Card> = top.to_vec();
        cards.extend(
            full_deck()
                .into_iter()
                .filter(|c| *c != trump && !top.contains(c)),
        );
        cards.push(trump);
        Self::from_cards(cards)
    }

    /// Removes exactly `count` cards from the top.
    pub fn deal(&self, count: usize) -> Result<(Vec<Card>, Deck), GameError> {
        if count > self.cards.len() {
            return Err(GameError::InsufficientCards {
                requested: count,
                remaining: self.cards.len(),
            });
        }
        let (taken, rest) = self.cards.split_at(count);
        Ok((taken.to_vec(), Deck { cards: rest.to_vec() }))
    }

    /// Removes up to `count` cards from the top; used for refills where a
    /// short deck is expected.
    pub fn draw_up_to(&self, count: usize) -> (Vec<Card>, Deck) {
        let n = count.min(self.cards.len());
        let (taken, rest) = self.cards.split_at(n);
        (taken.to_vec(), Deck { cards: rest.to_vec() })
    }

    /// The face-up bottom card while the deck is non-empty.
    pub fn bottom(&self) -> Option<Card> {
        self.cards.last().copied()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Rank, Suit};

    #[test]
    fn deal_is_a_functional_update() {
        let deck = Deck::new_with_seed(7);
        let (cards, rest) = deck.deal(6).expect("deal");
        assert_eq!(cards.len(), 6);
        assert_eq!(rest.remaining(), 30);
        assert_eq!(deck.remaining(), 36, "original deck must be untouched");
        assert_eq!(&deck.cards()[..6], cards.as_slice());
    }

    #[test]
    fn deal_rejects_underflow() {
        let deck = Deck::new_with_seed(1);
        let (_, rest) = deck.deal(34).expect("deal");
        assert_eq!(
            rest.deal(3),
            Err(GameError::InsufficientCards {
                requested: 3,
                remaining: 2
            })
        );
        let (cards, empty) = rest.draw_up_to(3);
        assert_eq!(cards.len(), 2);
        assert!(empty.is_empty());
    }

    #[test]
    fn stacked_deck_places_trump_at_bottom() {
        let top = [
            Card::new(Rank::Six, Suit::Spades),
            Card::new(Rank::Seven, Suit::Diamonds),
        ];
        let trump = Card::new(Rank::Ace, Suit::Hearts);
        let deck = Deck::stacked(&top, trump).expect("stack");
        assert_eq!(deck.cards()[0], top[0]);
        assert_eq!(deck.cards()[1], top[1]);
        assert_eq!(deck.bottom(), Some(trump));
        assert_eq!(deck.remaining(), DURAK_DECK_SIZE);
    }

    #[test]
    fn from_cards_rejects_duplicates() {
        let mut cards = full_deck();
        cards[1] = cards[0];
        assert!(matches!(
            Deck::from_cards(cards),
            Err(GameError::InvalidSetup(_))
        ));
    }
}
