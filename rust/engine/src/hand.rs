//! Poker hand ranking for the Texas Hold'em and Omaha room variants.
//!
//! Hands are ranked by evaluating every 5-card subset and keeping the best.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::cards::{Card, Rank};
use crate::errors::GameError;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Category {
    HighCard = 0,
    OnePair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
}

/// Category plus tiebreak ranks, high to low. The derived ordering is the
/// showdown ordering.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct HandStrength {
    pub category: Category,
    pub kickers: [u8; 5],
}

/// Best 5-card hand out of 5 to 7 distinct cards.
pub fn evaluate_hand(cards: &[Card]) -> Result<HandStrength, GameError> {
    if !(5..=7).contains(&cards.len()) {
        return Err(GameError::InvalidSetup(format!(
            "hand evaluation needs 5 to 7 cards, got {}",
            cards.len()
        )));
    }
    ensure_distinct(cards)?;
    best_of(combinations(cards, 5).iter())
}

pub fn compare_hands(a: &HandStrength, b: &HandStrength) -> Ordering {
    a.cmp(b)
}

/// Hold'em: any five of the two hole cards and the board.
pub fn best_holdem_hand(hole: &[Card; 2], board: &[Card]) -> Result<HandStrength, GameError> {
    check_board(board)?;
    let mut all = hole.to_vec();
    all.extend_from_slice(board);
    evaluate_hand(&all)
}

/// Omaha: exactly two of the four hole cards with exactly three board cards.
pub fn best_omaha_hand(hole: &[Card; 4], board: &[Card]) -> Result<HandStrength, GameError> {
    check_board(board)?;
    let mut all = hole.to_vec();
    all.extend_from_slice(board);
    ensure_distinct(&all)?;

    let mut fives = Vec::new();
    for pair in combinations(hole, 2) {
        for trio in combinations(board, 3) {
            let mut five = pair.clone();
            five.extend(trio);
            fives.push(five);
        }
    }
    best_of(fives.iter())
}

fn check_board(board: &[Card]) -> Result<(), GameError> {
    if (3..=5).contains(&board.len()) {
        Ok(())
    } else {
        Err(GameError::InvalidSetup(format!(
            "board must hold 3 to 5 cards, got {}",
            board.len()
        )))
    }
}

fn ensure_distinct(cards: &[Card]) -> Result<(), GameError> {
    let unique: HashSet<&Card> = cards.iter().collect();
    if unique.len() == cards.len() {
        Ok(())
    } else {
        Err(GameError::InvalidSetup("duplicate card in hand".into()))
    }
}

fn best_of<'a>(fives: impl Iterator<Item = &'a Vec<Card>>) -> Result<HandStrength, GameError> {
    fives
        .map(|five| rank_five(five))
        .max()
        .ok_or_else(|| GameError::Internal("no 5-card combination to rank".into()))
}

fn combinations(cards: &[Card], k: usize) -> Vec<Vec<Card>> {
    if k == 0 {
        return vec![Vec::new()];
    }
    if cards.len() < k {
        return Vec::new();
    }
    let (head, tail) = (cards[0], &cards[1..]);
    let mut out: Vec<Vec<Card>> = combinations(tail, k - 1)
        .into_iter()
        .map(|mut rest| {
            rest.insert(0, head);
            rest
        })
        .collect();
    out.extend(combinations(tail, k));
    out
}

fn rank_five(five: &[Card]) -> HandStrength {
    let mut counts = [0u8; 15];
    let mut mask: u16 = 0;
    for c in five {
        let r = c.rank as usize;
        counts[r] += 1;
        mask |= 1 << r;
    }
    let flush = five.iter().all(|c| c.suit == five[0].suit);
    let straight = straight_high(mask);

    // (count, rank) groups, biggest group first, then higher rank
    let mut groups: Vec<(u8, u8)> = (2..=14u8)
        .rev()
        .filter(|r| counts[*r as usize] > 0)
        .map(|r| (counts[r as usize], r))
        .collect();
    groups.sort_unstable_by(|a, b| b.cmp(a));

    let mut kickers = [0u8; 5];
    for (slot, (_, r)) in kickers.iter_mut().zip(groups.iter()) {
        *slot = *r;
    }

    let category = match (straight, flush, groups[0].0, groups.get(1).map(|g| g.0)) {
        (Some(_), true, _, _) => Category::StraightFlush,
        (_, _, 4, _) => Category::FourOfAKind,
        (_, _, 3, Some(2)) => Category::FullHouse,
        (_, true, _, _) => Category::Flush,
        (Some(_), false, _, _) => Category::Straight,
        (_, _, 3, _) => Category::ThreeOfAKind,
        (_, _, 2, Some(2)) => Category::TwoPair,
        (_, _, 2, _) => Category::OnePair,
        _ => Category::HighCard,
    };

    if let (Some(high), Category::Straight | Category::StraightFlush) = (straight, category) {
        kickers = [high, 0, 0, 0, 0];
    }
    HandStrength { category, kickers }
}

/// High card of a 5-card straight in `mask`; the wheel (A-2-3-4-5) is 5-high.
fn straight_high(mask: u16) -> Option<u8> {
    let ace = Rank::Ace as u16;
    let mask = if mask & (1 << ace) != 0 { mask | 0b10 } else { mask };
    (5..=14u8).rev().find(|high| {
        let window = 0b11111u16 << (high - 4);
        mask & window == window
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cards(s: &str) -> Vec<Card> {
        s.split_whitespace().map(|c| c.parse().expect("card")).collect()
    }

    #[test]
    fn wheel_is_five_high_straight() {
        let h = evaluate_hand(&cards("Ah 2d 3c 4s 5h Kd")).expect("eval");
        assert_eq!(h.category, Category::Straight);
        assert_eq!(h.kickers[0], 5);
    }

    #[test]
    fn full_house_beats_flush() {
        let boat = evaluate_hand(&cards("Kh Kd Kc 2s 2h")).expect("eval");
        let flush = evaluate_hand(&cards("Ah Jh 9h 5h 3h")).expect("eval");
        assert_eq!(compare_hands(&boat, &flush), Ordering::Greater);
    }

    #[test]
    fn rejects_bad_sizes_and_duplicates() {
        assert!(evaluate_hand(&cards("Ah Kd Qc Js")).is_err());
        assert!(evaluate_hand(&cards("Ah Ah Qc Js Td")).is_err());
    }
}
