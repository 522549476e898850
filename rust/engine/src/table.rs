use serde::{Deserialize, Serialize};

use crate::cards::{Card, Rank};

/// One attack card and the card that beat it, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TablePair {
    pub attack: Card,
    pub defense: Option<Card>,
}

/// Public cards of the current round plus the discard pile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableState {
    pairs: Vec<TablePair>,
    discard: Vec<Card>,
}

impl TableState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pairs(&self) -> &[TablePair] {
        &self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn attack_count(&self) -> usize {
        self.pairs.len()
    }

    pub fn attack_cards(&self) -> Vec<Card> {
        self.pairs.iter().map(|p| p.attack).collect()
    }

    /// Defence cards aligned with `attack_cards`; `None` marks an unbeaten attack.
    pub fn defense_cards(&self) -> Vec<Option<Card>> {
        self.pairs.iter().map(|p| p.defense).collect()
    }

    pub fn undefended(&self) -> Vec<Card> {
        self.pairs
            .iter()
            .filter(|p| p.defense.is_none())
            .map(|p| p.attack)
            .collect()
    }

    pub fn undefended_count(&self) -> usize {
        self.pairs.iter().filter(|p| p.defense.is_none()).count()
    }

    pub fn has_defense(&self) -> bool {
        self.pairs.iter().any(|p| p.defense.is_some())
    }

    /// Whether `rank` appears among any attack or defence card this round.
    pub fn contains_rank(&self, rank: Rank) -> bool {
        self.pairs
            .iter()
            .any(|p| p.attack.rank == rank || p.defense.is_some_and(|d| d.rank == rank))
    }

    pub fn pair_for(&self, attack: Card) -> Option<&TablePair> {
        self.pairs.iter().find(|p| p.attack == attack)
    }

    pub fn discard_pile(&self) -> &[Card] {
        &self.discard
    }

    /// Every card currently on the table (attacks and defences).
    pub fn table_cards(&self) -> Vec<Card> {
        self.pairs
            .iter()
            .flat_map(|p| std::iter::once(p.attack).chain(p.defense))
            .collect()
    }

    pub(crate) fn add_attack(&mut self, card: Card) {
        self.pairs.push(TablePair {
            attack: card,
            defense: None,
        });
    }

    /// Places `defense` on `attack`; `false` if `attack` is not an unbeaten card.
    pub(crate) fn cover(&mut self, attack: Card, defense: Card) -> bool {
        match self
            .pairs
            .iter_mut()
            .find(|p| p.attack == attack && p.defense.is_none())
        {
            Some(pair) => {
                pair.defense = Some(defense);
                true
            }
            None => false,
        }
    }

    /// Clears the round and returns its cards.
    pub(crate) fn sweep(&mut self) -> Vec<Card> {
        let cards = self.table_cards();
        self.pairs.clear();
        cards
    }

    pub(crate) fn discard(&mut self, cards: impl IntoIterator<Item = Card>) {
        self.discard.extend(cards);
    }
}
