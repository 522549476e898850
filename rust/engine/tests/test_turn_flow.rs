use deckflow_engine::cards::Card;
use deckflow_engine::deck::Deck;
use deckflow_engine::errors::{GameError, RuleViolation};
use deckflow_engine::game::{Game, GameConfig};
use deckflow_engine::machine::{Phase, RoundOutcome, TurnEvent};
use deckflow_engine::player::{Player, PlayerAction, PlayerStatus};
use deckflow_engine::rules::DurakMode;

fn c(s: &str) -> Card {
    s.parse().expect("card")
}

fn cards(s: &str) -> Vec<Card> {
    s.split_whitespace().map(c).collect()
}

fn seats(n: usize) -> Vec<Player> {
    (0..n)
        .map(|i| Player::new(format!("p{i}"), format!("Player {i}"), false, i, 1_000))
        .collect()
}

/// Hands are dealt six at a time in seat order from the top of `top`.
fn stacked_game(mode: DurakMode, top: &str, trump: &str, n: usize) -> Game {
    let deck = Deck::stacked(&cards(top), c(trump)).expect("deck");
    let config = GameConfig {
        mode,
        stake: 100,
        seed: None,
    };
    Game::with_deck("t", config, deck, seats(n)).expect("game")
}

fn attack(card: &str) -> PlayerAction {
    PlayerAction::Attack { card: c(card) }
}

fn defend(attack: &str, card: &str) -> PlayerAction {
    PlayerAction::Defend {
        attack: c(attack),
        card: c(card),
    }
}

#[test]
fn trump_defence_resolves_after_attacker_declines() {
    // trump hearts; p1 holds the 6h so p1 opens
    let mut g = stacked_game(
        DurakMode::Classic,
        "6s 6d 8d 9c Tc Jc 6h 7d 9d Td Jd Qd",
        "Ah",
        2,
    );
    assert_eq!(g.current_actor().as_deref(), Some("p1"));

    g.apply_action("p1", attack("7d")).expect("open");
    let snap = g.apply_action("p0", defend("7d", "8d")).expect("beat");
    // nobody can add a 7 or an 8: beaten round resolves on its own
    assert_eq!(snap.phase, Phase::Attack);
    assert_eq!(snap.attacker_id, "p0");
    assert_eq!(snap.discard_count, 2);

    g.apply_action("p0", attack("6s")).expect("attack");
    let hand = g.hand_of("p1").expect("hand");
    let defences: Vec<_> = g
        .legal_actions("p1")
        .expect("seated")
        .into_iter()
        .filter(|a| matches!(a, PlayerAction::Defend { .. }))
        .collect();
    assert!(hand.contains(&c("6h")));
    assert_eq!(defences, vec![defend("6s", "6h")]);

    let snap = g.apply_action("p1", defend("6s", "6h")).expect("trump beats");
    assert_eq!(snap.phase, Phase::Attack);
    // p0 could still throw in the 6d
    assert_eq!(snap.current_actor_id.as_deref(), Some("p0"));

    let snap = g.apply_action("p0", PlayerAction::Pass).expect("pass");
    let events = g.last_events();
    assert!(events.contains(&TurnEvent::PhaseChanged {
        from: Phase::Attack,
        to: Phase::RoundResolution,
    }));
    assert!(events.iter().any(|e| matches!(
        e,
        TurnEvent::RoundResolved {
            outcome: RoundOutcome::Beaten,
            ..
        }
    )));
    assert_eq!(snap.phase, Phase::Attack);
    assert_eq!(snap.attacker_id, "p1");
    assert_eq!(snap.discard_count, 4);
}

#[test]
fn non_beating_defence_is_rejected_and_table_unchanged() {
    let mut g = stacked_game(
        DurakMode::Classic,
        "6s 7s 8s 9c Tc Jc 7d 8d 9d Td Jd Qd",
        "Ah",
        2,
    );
    g.apply_action("p0", attack("6s")).expect("attack");
    let before = g.snapshot();
    let err = g
        .apply_action("p1", defend("6s", "7d"))
        .expect_err("off-suit card cannot beat");
    match err {
        GameError::IllegalMove { rule, phase, .. } => {
            assert_eq!(rule, RuleViolation::DoesNotBeat);
            assert_eq!(phase, Phase::Defend);
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(g.snapshot(), before);
    // the session stays usable
    g.apply_action("p1", PlayerAction::Take).expect("take");
}

#[test]
fn defender_actions_require_the_defender() {
    let mut g = stacked_game(
        DurakMode::Classic,
        "6s 7s 8s 9c Tc Jc 7d 8d 9d Td Jd Qd",
        "Ah",
        2,
    );
    g.apply_action("p0", attack("6s")).expect("attack");
    assert!(matches!(
        g.apply_action("p0", PlayerAction::Take),
        Err(GameError::NotYourTurn { .. })
    ));
}

#[test]
fn classic_mode_refuses_third_party_throw_in() {
    // p0: spades, p1: diamonds, p2: another six
    let mut g = stacked_game(
        DurakMode::Classic,
        "6s 7s 8s 9s Ts Js 7d 8d 9d Td Jd Qd 6c 7c 8c 9c Tc Jc",
        "Ah",
        3,
    );
    g.apply_action("p0", attack("6s")).expect("attack");
    let err = g.apply_action("p2", attack("6c")).expect_err("classic");
    assert!(matches!(
        err,
        GameError::IllegalMove {
            rule: RuleViolation::ThrowInNotAllowed,
            ..
        }
    ));
}

#[test]
fn throw_in_mode_lets_neighbours_add_matching_ranks() {
    let mut g = stacked_game(
        DurakMode::ThrowIn,
        "6s 7s 8s 9s Ts Js 7d 8d 9d Td Jd Qd 6c 7c 8c 9c Tc Jc",
        "Ah",
        3,
    );
    g.apply_action("p0", attack("6s")).expect("attack");
    let snap = g.apply_action("p2", attack("6c")).expect("throw in");
    assert_eq!(snap.attack_cards, cards("6s 6c"));
    assert_eq!(snap.phase, Phase::Defend);
    let err = g.apply_action("p2", attack("Tc")).expect_err("rank not on table");
    assert!(matches!(
        err,
        GameError::IllegalMove {
            rule: RuleViolation::RankNotOnTable,
            ..
        }
    ));
}

#[test]
fn take_then_follow_up_throw_in_before_collecting() {
    let mut g = stacked_game(
        DurakMode::Classic,
        "6s 6c 8s 9s Ts Js 7d 8d 9d Td Jd Qd",
        "Ah",
        2,
    );
    g.apply_action("p0", attack("6s")).expect("attack");
    let snap = g.apply_action("p1", PlayerAction::Take).expect("take");
    assert_eq!(snap.phase, Phase::RoundResolution);
    assert_eq!(snap.current_actor_id.as_deref(), Some("p0"));

    // the follow-up leaves p0 without another six, so the defender collects
    let snap = g.apply_action("p0", attack("6c")).expect("follow-up");
    assert_eq!(snap.phase, Phase::Attack);
    assert_eq!(snap.attacker_id, "p0");
    let hand = g.hand_of("p1").expect("hand");
    assert_eq!(hand.len(), 8);
    assert!(hand.contains(&c("6c")));
}

#[test]
fn transfer_passes_the_attack_to_the_next_seat() {
    // trump clubs and nobody holds one: p0 opens
    let mut g = stacked_game(
        DurakMode::Transfer,
        "8s 9s Ts Js Qs Ks 8h 9h Th Jh Qh Kh 6d 7d 8d 9d Td Jd",
        "Ac",
        3,
    );
    g.apply_action("p0", attack("8s")).expect("attack");
    let snap = g
        .apply_action("p1", PlayerAction::Transfer { card: c("8h") })
        .expect("transfer");
    assert_eq!(snap.phase, Phase::Transfer);
    assert_eq!(snap.attacker_id, "p1");
    assert_eq!(snap.defender_id, "p2");
    assert_eq!(snap.attack_cards, cards("8s 8h"));

    let legal = g.legal_actions("p2").expect("seated");
    assert!(legal.contains(&PlayerAction::Transfer { card: c("8d") }));
    assert!(legal.contains(&PlayerAction::Take));

    let snap = g.apply_action("p2", PlayerAction::Take).expect("take");
    assert_eq!(snap.phase, Phase::Attack);
    assert_eq!(g.hand_of("p2").expect("hand").len(), 8);
    assert_eq!(snap.attacker_id, "p0");
    assert_eq!(snap.defender_id, "p1");
}

#[test]
fn transfer_after_defending_is_refused() {
    let mut g = stacked_game(
        DurakMode::Transfer,
        "8s 8d Ts Js Qs Ks 9s 8h Th Jh Qh Kh 6d 7d 9d Td Jd Qd",
        "Ac",
        3,
    );
    g.apply_action("p0", attack("8s")).expect("attack");
    g.apply_action("p1", defend("8s", "9s")).expect("beat");
    g.apply_action("p0", attack("8d")).expect("throw in");
    assert!(!g
        .legal_actions("p1")
        .expect("seated")
        .contains(&PlayerAction::Transfer { card: c("8h") }));
    let err = g
        .apply_action("p1", PlayerAction::Transfer { card: c("8h") })
        .expect_err("already defended");
    assert!(matches!(
        err,
        GameError::IllegalMove {
            rule: RuleViolation::TransferAfterDefense,
            ..
        }
    ));
}

#[test]
fn forfeit_during_defence_continues_then_finishes_without_loser() {
    let config = GameConfig {
        mode: DurakMode::Classic,
        stake: 90,
        seed: Some(11),
    };
    let mut g = Game::new("f", config, seats(3)).expect("game");
    let attacker = g.current_actor().expect("attacker");
    let opening = g.legal_actions(&attacker).expect("seated")[0].clone();
    let snap = g.apply_action(&attacker, opening).expect("open");
    assert_eq!(snap.phase, Phase::Defend);
    let defender = snap.defender_id.clone();

    let snap = g.apply_action(&defender, PlayerAction::Forfeit).expect("forfeit");
    assert_eq!(snap.phase, Phase::Attack);
    assert!(snap.attack_cards.is_empty());
    assert_eq!(
        snap.players.iter().filter(|p| p.status == PlayerStatus::Active).count(),
        2
    );
    assert!(!g.is_finished());

    let next = g.current_actor().expect("game goes on");
    let snap = g.apply_action(&next, PlayerAction::Forfeit).expect("forfeit");
    assert_eq!(snap.phase, Phase::Finished);
    assert_eq!(snap.loser_id, None);
    assert_eq!(snap.winner_id, None);
    assert!(snap.current_actor_id.is_none());

    let settlement = g.settlement().expect("finished");
    assert_eq!(settlement.total(), 0);
    assert_eq!(settlement.delta_for(&defender), -90);
    assert_eq!(settlement.delta_for(&next), -90);

    assert_eq!(
        g.apply_action(&next, PlayerAction::Pass),
        Err(GameError::GameFinished)
    );
}

#[test]
fn snapshot_is_idempotent() {
    let g = Game::new("i", GameConfig { seed: Some(8), ..Default::default() }, seats(4))
        .expect("game");
    assert_eq!(g.snapshot(), g.snapshot());
}
