use serde::{Deserialize, Serialize};

use crate::cards::{Card, Rank, Suit};

pub type PlayerId = String;

/// Cards a player holds at the start of each round while the deck lasts.
pub const HAND_SIZE: usize = 6;

/// An action submitted to a game. Cards are played one per action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlayerAction {
    /// Opening attack, or a throw-in of a rank already on the table
    Attack { card: Card },
    /// Beat the unbeaten `attack` card with `card`
    Defend { attack: Card, card: Card },
    /// Pass the attack on to the next player by adding a card of the same rank
    Transfer { card: Card },
    /// Give up defending and collect the table
    Take,
    /// Decline to add more cards this round
    Pass,
    /// Leave the game; accepted in any phase
    Forfeit,
}

impl PlayerAction {
    pub fn kind(&self) -> &'static str {
        match self {
            PlayerAction::Attack { .. } => "attack",
            PlayerAction::Defend { .. } => "defend",
            PlayerAction::Transfer { .. } => "transfer",
            PlayerAction::Take => "take",
            PlayerAction::Pass => "pass",
            PlayerAction::Forfeit => "forfeit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerStatus {
    Active,
    /// Emptied their hand after the deck ran out
    Out,
    Forfeited,
}

/// A seated participant. The hand behaves as a set: no duplicates, kept
/// sorted so views are stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    id: PlayerId,
    display_name: String,
    is_bot: bool,
    hand: Vec<Card>,
    seat: usize,
    balance: u64,
    status: PlayerStatus,
}

impl Player {
    pub fn new(
        id: impl Into<PlayerId>,
        display_name: impl Into<String>,
        is_bot: bool,
        seat: usize,
        balance: u64,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            is_bot,
            hand: Vec::new(),
            seat,
            balance,
            status: PlayerStatus::Active,
        }
    }

    pub fn id(&self) -> &PlayerId {
        &self.id
    }
    pub fn display_name(&self) -> &str {
        &self.display_name
    }
    pub fn is_bot(&self) -> bool {
        self.is_bot
    }
    pub fn seat(&self) -> usize {
        self.seat
    }
    pub fn balance(&self) -> u64 {
        self.balance
    }
    pub fn status(&self) -> PlayerStatus {
        self.status
    }
    pub fn is_active(&self) -> bool {
        self.status == PlayerStatus::Active
    }

    pub fn hand(&self) -> &[Card] {
        &self.hand
    }
    pub fn card_count(&self) -> usize {
        self.hand.len()
    }
    pub fn holds(&self, card: Card) -> bool {
        self.hand.contains(&card)
    }

    pub(crate) fn give_cards(&mut self, cards: impl IntoIterator<Item = Card>) {
        for c in cards {
            if !self.hand.contains(&c) {
                self.hand.push(c);
            }
        }
        self.hand.sort_unstable();
    }

    /// Removes `card` from the hand; `false` if it was not there.
    pub(crate) fn play_card(&mut self, card: Card) -> bool {
        match self.hand.iter().position(|c| *c == card) {
            Some(idx) => {
                self.hand.remove(idx);
                true
            }
            None => false,
        }
    }

    pub(crate) fn empty_hand(&mut self) -> Vec<Card> {
        std::mem::take(&mut self.hand)
    }

    pub(crate) fn set_status(&mut self, status: PlayerStatus) {
        self.status = status;
    }

    /// Lowest trump in hand, used to pick the first attacker.
    pub fn lowest_trump(&self, trump: Suit) -> Option<Rank> {
        self.hand
            .iter()
            .filter(|c| c.suit == trump)
            .map(|c| c.rank)
            .min()
    }
}
