use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cards::{Card, Suit};
use crate::table::TableState;

/// Most attack cards a single round may hold.
pub const MAX_ATTACK_CARDS: usize = 6;

/// Durak sub-mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurakMode {
    /// Only the primary attacker adds cards; no transfers.
    Classic,
    /// Every non-defending player may throw in (podkidnoy).
    ThrowIn,
    /// Throw-ins plus transfers to the next player (perevodnoy).
    Transfer,
}

impl DurakMode {
    pub fn allows_transfer(self) -> bool {
        matches!(self, DurakMode::Transfer)
    }

    pub fn allows_throw_in(self) -> bool {
        !matches!(self, DurakMode::Classic)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PokerMode {
    TexasHoldem,
    Omaha,
}

/// Game family plus sub-mode, as chosen when a room is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "game", content = "mode", rename_all = "snake_case")]
pub enum GameVariant {
    Durak(DurakMode),
    Poker(PokerMode),
}

impl GameVariant {
    pub fn is_durak(&self) -> bool {
        matches!(self, GameVariant::Durak(_))
    }
}

impl Default for GameVariant {
    fn default() -> Self {
        GameVariant::Durak(DurakMode::Classic)
    }
}

impl fmt::Display for GameVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GameVariant::Durak(DurakMode::Classic) => "durak-classic",
            GameVariant::Durak(DurakMode::ThrowIn) => "durak-throw-in",
            GameVariant::Durak(DurakMode::Transfer) => "durak-transfer",
            GameVariant::Poker(PokerMode::TexasHoldem) => "poker-holdem",
            GameVariant::Poker(PokerMode::Omaha) => "poker-omaha",
        };
        f.write_str(s)
    }
}

impl FromStr for GameVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "durak" | "classic" | "durak-classic" => Ok(GameVariant::Durak(DurakMode::Classic)),
            "throw-in" | "podkidnoy" | "durak-throw-in" => {
                Ok(GameVariant::Durak(DurakMode::ThrowIn))
            }
            "transfer" | "perevodnoy" | "durak-transfer" => {
                Ok(GameVariant::Durak(DurakMode::Transfer))
            }
            "holdem" | "poker-holdem" | "texas-holdem" => {
                Ok(GameVariant::Poker(PokerMode::TexasHoldem))
            }
            "omaha" | "poker-omaha" => Ok(GameVariant::Poker(PokerMode::Omaha)),
            other => Err(format!("Unknown game variant: {other}")),
        }
    }
}

/// Whether `card` beats `target` under `trump`.
///
/// A trump beats every non-trump card. Within one suit the higher rank wins.
/// A non-trump never beats a card of another suit.
///
/// # Examples
///
/// ```
/// use deckflow_engine::cards::{Card, Rank, Suit};
/// use deckflow_engine::rules::beats;
///
/// let six_of_hearts = Card::new(Rank::Six, Suit::Hearts);
/// let ace_of_spades = Card::new(Rank::Ace, Suit::Spades);
/// assert!(beats(six_of_hearts, ace_of_spades, Suit::Hearts));
/// assert!(!beats(ace_of_spades, six_of_hearts, Suit::Hearts));
/// ```
pub fn beats(card: Card, target: Card, trump: Suit) -> bool {
    if card.suit == target.suit {
        card.rank > target.rank
    } else {
        card.suit == trump
    }
}

/// How many more attack cards the round can take.
///
/// Bounded by [`MAX_ATTACK_CARDS`] in total and by the defender's hand for the
/// cards still unbeaten.
pub fn attack_capacity(table: &TableState, defender_hand: usize) -> usize {
    let by_total = MAX_ATTACK_CARDS.saturating_sub(table.attack_count());
    let by_hand = defender_hand.saturating_sub(table.undefended_count());
    by_total.min(by_hand)
}

/// Cards from `hand` that may be added to the attack.
///
/// On an empty table any card opens the round. Afterwards only ranks already
/// on the table may be thrown in. Empty once the attack cap is reached.
pub fn can_attack(hand: &[Card], table: &TableState, defender_hand: usize) -> Vec<Card> {
    if attack_capacity(table, defender_hand) == 0 {
        return Vec::new();
    }
    if table.is_empty() {
        return hand.to_vec();
    }
    hand.iter()
        .copied()
        .filter(|c| table.contains_rank(c.rank))
        .collect()
}

/// Cards from `hand` that beat `attack`.
pub fn can_defend(hand: &[Card], attack: Card, trump: Suit) -> Vec<Card> {
    hand.iter()
        .copied()
        .filter(|c| beats(*c, attack, trump))
        .collect()
}

/// Cards the defender may use to pass the attack on.
///
/// Requires a transfer mode, an attack with no defence placed yet, a card of
/// the attack rank, and room for one more card against the next defender.
pub fn can_transfer(
    hand: &[Card],
    table: &TableState,
    mode: DurakMode,
    next_defender_hand: usize,
) -> Vec<Card> {
    if !mode.allows_transfer() || table.has_defense() {
        return Vec::new();
    }
    let Some(incoming) = table.undefended().first().copied() else {
        return Vec::new();
    };
    let room_total = table.attack_count() < MAX_ATTACK_CARDS;
    let room_hand = table.undefended_count() < next_defender_hand;
    if !(room_total && room_hand) {
        return Vec::new();
    }
    hand.iter()
        .copied()
        .filter(|c| c.rank == incoming.rank)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(s: &str) -> Card {
        s.parse().expect("card")
    }

    #[test]
    fn same_suit_compares_rank() {
        assert!(beats(c("7s"), c("6s"), Suit::Hearts));
        assert!(!beats(c("6s"), c("7s"), Suit::Hearts));
        assert!(!beats(c("6s"), c("6s"), Suit::Hearts));
    }

    #[test]
    fn off_suit_non_trump_never_beats() {
        assert!(!beats(c("Ad"), c("6s"), Suit::Hearts));
    }

    #[test]
    fn throw_in_requires_rank_on_table() {
        let mut table = TableState::new();
        table.add_attack(c("6s"));
        table.cover(c("6s"), c("9s"));
        let hand = [c("6d"), c("9h"), c("Kc")];
        assert_eq!(can_attack(&hand, &table, 6), vec![c("6d"), c("9h")]);
    }

    #[test]
    fn attack_cap_follows_defender_hand() {
        let mut table = TableState::new();
        table.add_attack(c("6s"));
        table.add_attack(c("6d"));
        assert_eq!(attack_capacity(&table, 2), 0);
        assert!(can_attack(&[c("6h")], &table, 2).is_empty());
        assert_eq!(attack_capacity(&table, 6), 4);
    }

    #[test]
    fn transfer_only_in_transfer_mode_before_defence() {
        let mut table = TableState::new();
        table.add_attack(c("8s"));
        let hand = [c("8h"), c("9s")];
        assert!(can_transfer(&hand, &table, DurakMode::Classic, 6).is_empty());
        assert_eq!(
            can_transfer(&hand, &table, DurakMode::Transfer, 6),
            vec![c("8h")]
        );
        assert!(can_transfer(&hand, &table, DurakMode::Transfer, 1).is_empty());
        table.add_attack(c("8d"));
        table.cover(c("8d"), c("Td"));
        assert!(can_transfer(&hand, &table, DurakMode::Transfer, 6).is_empty());
    }

    #[test]
    fn variant_names_parse() {
        assert_eq!(
            "perevodnoy".parse::<GameVariant>(),
            Ok(GameVariant::Durak(DurakMode::Transfer))
        );
        let v = GameVariant::Poker(PokerMode::Omaha);
        assert_eq!(v.to_string().parse::<GameVariant>(), Ok(v));
        assert!(!v.is_durak());
    }
}
