use deckflow_engine::cards::{durak_ranks, Card, Rank as R, Suit as S};
use deckflow_engine::rules::{beats, can_defend};
use proptest::prelude::*;

fn suit() -> impl Strategy<Value = S> {
    prop_oneof![
        Just(S::Clubs),
        Just(S::Diamonds),
        Just(S::Hearts),
        Just(S::Spades),
    ]
}

fn rank() -> impl Strategy<Value = R> {
    proptest::sample::select(durak_ranks().to_vec())
}

proptest! {
    /// Any trump beats any non-trump regardless of rank.
    #[test]
    fn trump_beats_every_non_trump(
        trump in suit(),
        other in suit(),
        trump_rank in rank(),
        other_rank in rank(),
    ) {
        prop_assume!(trump != other);
        let t = Card::new(trump_rank, trump);
        let o = Card::new(other_rank, other);
        prop_assert!(beats(t, o, trump));
        prop_assert!(!beats(o, t, trump));
    }

    /// `beats` is a strict relation: never both ways, never on itself.
    #[test]
    fn beats_is_asymmetric(
        trump in suit(),
        a in (rank(), suit()),
        b in (rank(), suit()),
    ) {
        let a = Card::new(a.0, a.1);
        let b = Card::new(b.0, b.1);
        prop_assert!(!(beats(a, b, trump) && beats(b, a, trump)));
        prop_assert!(!beats(a, a, trump));
    }
}

#[test]
fn off_suit_defender_has_no_answer() {
    let attack = Card::new(R::Six, S::Spades);
    let hand = [Card::new(R::Seven, S::Diamonds)];
    assert!(can_defend(&hand, attack, S::Hearts).is_empty());
}

#[test]
fn low_trump_answers_high_plain_card() {
    let attack = Card::new(R::Six, S::Spades);
    let six_of_hearts = Card::new(R::Six, S::Hearts);
    let hand = [Card::new(R::Seven, S::Diamonds), six_of_hearts];
    assert_eq!(can_defend(&hand, attack, S::Hearts), vec![six_of_hearts]);
    assert_eq!(
        can_defend(&hand, Card::new(R::Ace, S::Clubs), S::Hearts),
        vec![six_of_hearts]
    );
}

#[test]
fn trump_against_trump_needs_higher_rank() {
    let hand = [Card::new(R::Seven, S::Hearts), Card::new(R::King, S::Hearts)];
    assert_eq!(
        can_defend(&hand, Card::new(R::Queen, S::Hearts), S::Hearts),
        vec![Card::new(R::King, S::Hearts)]
    );
}
