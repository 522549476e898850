//! Durak turn sequencing.
//!
//! [`TurnMachine`] owns the deck, the players and the table of one game and
//! moves through [`Phase`]s as actions arrive. Every action is validated
//! against the rules table first; a rejected action leaves the machine
//! untouched.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::cards::{full_deck, Card, Suit, DURAK_DECK_SIZE};
use crate::deck::Deck;
use crate::errors::{GameError, RuleViolation};
use crate::player::{Player, PlayerAction, PlayerId, PlayerStatus, HAND_SIZE};
use crate::rules::{
    attack_capacity, beats, can_attack, can_defend, can_transfer, DurakMode, MAX_ATTACK_CARDS,
};
use crate::table::TableState;

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Waiting for the opening card, or every attack is beaten and attackers
    /// may add more or pass.
    Attack,
    /// At least one attack card is unbeaten.
    Defend,
    /// The attack was just passed on; the new defender responds.
    Transfer,
    /// The defender is taking; attackers may still throw in.
    RoundResolution,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundOutcome {
    /// All attacks beaten; table goes to the discard pile.
    Beaten,
    /// The defender collected the table.
    Taken,
    /// Attacker or defender forfeited mid-round.
    Abandoned,
}

/// What happened while applying one action, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TurnEvent {
    Played {
        player_id: PlayerId,
        action: PlayerAction,
    },
    PhaseChanged {
        from: Phase,
        to: Phase,
    },
    RoundResolved {
        outcome: RoundOutcome,
        defender_id: PlayerId,
        cards: usize,
    },
    CardsDrawn {
        player_id: PlayerId,
        count: usize,
    },
    PlayerOut {
        player_id: PlayerId,
    },
    Finished {
        loser_id: Option<PlayerId>,
    },
}

#[derive(Debug, Clone)]
pub struct TurnMachine {
    mode: DurakMode,
    trump_card: Card,
    deck: Deck,
    players: Vec<Player>,
    table: TableState,
    attacker: usize,
    defender: usize,
    phase: Phase,
    passed: BTreeSet<usize>,
    loser: Option<usize>,
}

impl TurnMachine {
    /// Deals six cards to each player from `deck` and picks the first
    /// attacker: the holder of the lowest trump, or seat 0.
    ///
    /// Players must be listed in seat order with seats `0..n`.
    pub fn new(mode: DurakMode, deck: Deck, mut players: Vec<Player>) -> Result<Self, GameError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&players.len()) {
            return Err(GameError::InvalidSetup(format!(
                "Durak needs {MIN_PLAYERS} to {MAX_PLAYERS} players, got {}",
                players.len()
            )));
        }
        let ids: HashSet<&PlayerId> = players.iter().map(|p| p.id()).collect();
        if ids.len() != players.len() {
            return Err(GameError::InvalidSetup("duplicate player id".into()));
        }
        if let Some((pos, misplaced)) = players.iter().enumerate().find(|(i, p)| p.seat() != *i) {
            return Err(GameError::InvalidSetup(format!(
                "player {} listed at position {pos} but seated at {}",
                misplaced.id(),
                misplaced.seat()
            )));
        }
        if deck.remaining() != DURAK_DECK_SIZE {
            return Err(GameError::InvalidSetup(format!(
                "a game starts from a full deck, got {} cards",
                deck.remaining()
            )));
        }
        let trump_card = deck
            .bottom()
            .ok_or_else(|| GameError::Internal("empty deck at setup".into()))?;

        let mut deck = deck;
        for p in players.iter_mut() {
            let (cards, rest) = deck.deal(HAND_SIZE)?;
            p.give_cards(cards);
            deck = rest;
        }

        let attacker = players
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.lowest_trump(trump_card.suit).map(|r| (r, i)))
            .min()
            .map(|(_, i)| i)
            .unwrap_or(0);
        let defender = (attacker + 1) % players.len();

        let machine = Self {
            mode,
            trump_card,
            deck,
            players,
            table: TableState::new(),
            attacker,
            defender,
            phase: Phase::Attack,
            passed: BTreeSet::new(),
            loser: None,
        };
        machine.check_invariants()?;
        Ok(machine)
    }

    pub fn mode(&self) -> DurakMode {
        self.mode
    }
    pub fn trump(&self) -> Suit {
        self.trump_card.suit
    }
    pub fn trump_card(&self) -> Card {
        self.trump_card
    }
    pub fn deck(&self) -> &Deck {
        &self.deck
    }
    pub fn players(&self) -> &[Player] {
        &self.players
    }
    pub fn table(&self) -> &TableState {
        &self.table
    }
    pub fn phase(&self) -> Phase {
        self.phase
    }
    pub fn attacker(&self) -> usize {
        self.attacker
    }
    pub fn defender(&self) -> usize {
        self.defender
    }
    pub fn loser(&self) -> Option<usize> {
        self.loser
    }
    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn seat_of(&self, id: &str) -> Option<usize> {
        self.players.iter().position(|p| p.id() == id)
    }

    pub fn active_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_active()).count()
    }

    /// The seat expected to act next, `None` once finished.
    ///
    /// During throw-in windows other attackers may still act out of turn.
    pub fn current_actor(&self) -> Option<usize> {
        match self.phase {
            Phase::Finished => None,
            Phase::Defend | Phase::Transfer => Some(self.defender),
            Phase::Attack if self.table.is_empty() => Some(self.attacker),
            Phase::Attack | Phase::RoundResolution => self.pending_throwers().first().copied(),
        }
    }

    /// Turn ownership check without rule validation.
    pub fn ensure_turn(&self, seat: usize, action: &PlayerAction) -> Result<(), GameError> {
        if self.is_finished() {
            return Err(GameError::GameFinished);
        }
        let player = self
            .players
            .get(seat)
            .ok_or_else(|| GameError::UnknownPlayer(format!("seat {seat}")))?;
        if !player.is_active() {
            return Err(GameError::PlayerOut(player.id().clone()));
        }
        let expected = match action {
            PlayerAction::Attack { .. } if self.table.is_empty() => Some(self.attacker),
            PlayerAction::Defend { .. } | PlayerAction::Transfer { .. } | PlayerAction::Take => {
                Some(self.defender)
            }
            _ => None,
        };
        match expected {
            Some(e) if e != seat => Err(GameError::NotYourTurn {
                expected: Some(self.players[e].id().clone()),
                actual: player.id().clone(),
                phase: self.phase,
            }),
            _ => Ok(()),
        }
    }

    /// Applies `action` for the player at `seat`.
    ///
    /// Works on a copy and commits only if the action and the card accounting
    /// check both succeed.
    pub fn apply(&mut self, seat: usize, action: PlayerAction) -> Result<Vec<TurnEvent>, GameError> {
        self.ensure_turn(seat, &action)?;
        let mut next = self.clone();
        let events = next.step(seat, action)?;
        next.check_invariants()?;
        *self = next;
        Ok(events)
    }

    /// Every action the rules accept from `seat` right now, except `Forfeit`,
    /// which is always available to an active player.
    pub fn legal_actions(&self, seat: usize) -> Vec<PlayerAction> {
        let mut actions = Vec::new();
        let Some(player) = self.players.get(seat) else {
            return actions;
        };
        if self.is_finished() || !player.is_active() {
            return actions;
        }

        actions.extend(
            self.throwable(seat)
                .into_iter()
                .map(|card| PlayerAction::Attack { card }),
        );

        if seat == self.defender && matches!(self.phase, Phase::Defend | Phase::Transfer) {
            for attack in self.table.undefended() {
                actions.extend(
                    can_defend(player.hand(), attack, self.trump())
                        .into_iter()
                        .map(|card| PlayerAction::Defend { attack, card }),
                );
            }
            actions.extend(
                can_transfer(
                    player.hand(),
                    &self.table,
                    self.mode,
                    self.next_defender_hand(),
                )
                .into_iter()
                .map(|card| PlayerAction::Transfer { card }),
            );
            actions.push(PlayerAction::Take);
        }

        if self.pass_window() && self.pending_throwers().contains(&seat) {
            actions.push(PlayerAction::Pass);
        }
        actions
    }

    /// Card conservation: deck, hands, table and discard together hold the
    /// 36-card universe exactly once.
    pub fn check_invariants(&self) -> Result<(), GameError> {
        let mut all: Vec<Card> = self.deck.cards().to_vec();
        for p in &self.players {
            all.extend_from_slice(p.hand());
        }
        all.extend(self.table.table_cards());
        all.extend_from_slice(self.table.discard_pile());

        let unique: HashSet<Card> = all.iter().copied().collect();
        let universe: HashSet<Card> = full_deck().into_iter().collect();
        if all.len() != DURAK_DECK_SIZE || unique != universe {
            return Err(GameError::Internal(format!(
                "{} cards tracked, {} distinct",
                all.len(),
                unique.len()
            )));
        }
        if self.table.undefended_count() > 0
            && self.table.undefended_count() > self.players[self.defender].card_count()
            && self.phase != Phase::RoundResolution
        {
            return Err(GameError::Internal(
                "more unbeaten attacks than defender cards".into(),
            ));
        }
        if self.table.attack_count() > MAX_ATTACK_CARDS {
            return Err(GameError::Internal("attack cap exceeded".into()));
        }
        Ok(())
    }

    fn step(&mut self, seat: usize, action: PlayerAction) -> Result<Vec<TurnEvent>, GameError> {
        let mut events = vec![TurnEvent::Played {
            player_id: self.players[seat].id().clone(),
            action: action.clone(),
        }];
        match action.clone() {
            PlayerAction::Attack { card } => self.attack(seat, card, &action, &mut events)?,
            PlayerAction::Defend { attack, card } => {
                self.defend(seat, attack, card, &action, &mut events)?
            }
            PlayerAction::Transfer { card } => self.transfer(seat, card, &action, &mut events)?,
            PlayerAction::Take => self.take(&action, &mut events)?,
            PlayerAction::Pass => self.pass(seat, &action, &mut events)?,
            PlayerAction::Forfeit => self.forfeit(seat, &mut events)?,
        }
        tracing::debug!(
            seat,
            action = action.kind(),
            phase = ?self.phase,
            table = self.table.attack_count(),
            "action applied"
        );
        Ok(events)
    }

    fn illegal(&self, rule: RuleViolation, action: &PlayerAction) -> GameError {
        GameError::IllegalMove {
            rule,
            action: action.clone(),
            phase: self.phase,
        }
    }

    fn attack(
        &mut self,
        seat: usize,
        card: Card,
        action: &PlayerAction,
        events: &mut Vec<TurnEvent>,
    ) -> Result<(), GameError> {
        if seat == self.defender {
            return Err(self.illegal(RuleViolation::DefenderCannotAttack, action));
        }
        if !self.table.is_empty() && !self.mode.allows_throw_in() && seat != self.attacker {
            return Err(self.illegal(RuleViolation::ThrowInNotAllowed, action));
        }
        if !self.players[seat].holds(card) {
            return Err(self.illegal(RuleViolation::CardNotInHand, action));
        }
        if attack_capacity(&self.table, self.players[self.defender].card_count()) == 0 {
            return Err(self.illegal(RuleViolation::AttackLimitReached, action));
        }
        if !self.table.is_empty() && !self.table.contains_rank(card.rank) {
            return Err(self.illegal(RuleViolation::RankNotOnTable, action));
        }

        self.players[seat].play_card(card);
        self.table.add_attack(card);
        self.passed.clear();
        match self.phase {
            Phase::Attack => self.set_phase(Phase::Defend, events),
            Phase::RoundResolution => self.resolve_if_settled(events)?,
            _ => {}
        }
        Ok(())
    }

    fn defend(
        &mut self,
        seat: usize,
        attack: Card,
        card: Card,
        action: &PlayerAction,
        events: &mut Vec<TurnEvent>,
    ) -> Result<(), GameError> {
        self.require_defending(action, RuleViolation::NothingToDefend)?;
        if !self.players[seat].holds(card) {
            return Err(self.illegal(RuleViolation::CardNotInHand, action));
        }
        match self.table.pair_for(attack) {
            None => return Err(self.illegal(RuleViolation::AttackCardNotOnTable, action)),
            Some(pair) if pair.defense.is_some() => {
                return Err(self.illegal(RuleViolation::AttackCardAlreadyBeaten, action))
            }
            Some(_) => {}
        }
        if !beats(card, attack, self.trump()) {
            return Err(self.illegal(RuleViolation::DoesNotBeat, action));
        }

        self.players[seat].play_card(card);
        self.table.cover(attack, card);
        if self.table.undefended_count() == 0 {
            self.passed.clear();
            self.set_phase(Phase::Attack, events);
            self.resolve_if_settled(events)?;
        } else if self.phase == Phase::Transfer {
            self.set_phase(Phase::Defend, events);
        }
        Ok(())
    }

    fn transfer(
        &mut self,
        seat: usize,
        card: Card,
        action: &PlayerAction,
        events: &mut Vec<TurnEvent>,
    ) -> Result<(), GameError> {
        if !self.mode.allows_transfer() {
            return Err(self.illegal(RuleViolation::TransferNotAllowed, action));
        }
        self.require_defending(action, RuleViolation::NothingToDefend)?;
        if self.table.has_defense() {
            return Err(self.illegal(RuleViolation::TransferAfterDefense, action));
        }
        if !self.players[seat].holds(card) {
            return Err(self.illegal(RuleViolation::CardNotInHand, action));
        }
        let incoming = self.table.undefended().first().copied();
        if incoming.map(|c| c.rank) != Some(card.rank) {
            return Err(self.illegal(RuleViolation::TransferRankMismatch, action));
        }
        if self.table.attack_count() >= MAX_ATTACK_CARDS {
            return Err(self.illegal(RuleViolation::AttackLimitReached, action));
        }
        let next = self.next_active(self.defender)?;
        if self.table.undefended_count() + 1 > self.players[next].card_count() {
            return Err(self.illegal(RuleViolation::TransferTargetTooFewCards, action));
        }

        self.players[seat].play_card(card);
        self.table.add_attack(card);
        self.attacker = self.defender;
        self.defender = next;
        self.passed.clear();
        self.set_phase(Phase::Transfer, events);
        Ok(())
    }

    fn take(&mut self, action: &PlayerAction, events: &mut Vec<TurnEvent>) -> Result<(), GameError> {
        self.require_defending(action, RuleViolation::NothingToTake)?;
        self.passed.clear();
        self.set_phase(Phase::RoundResolution, events);
        self.resolve_if_settled(events)
    }

    fn pass(
        &mut self,
        seat: usize,
        action: &PlayerAction,
        events: &mut Vec<TurnEvent>,
    ) -> Result<(), GameError> {
        if !self.pass_window() || !self.pending_throwers().contains(&seat) {
            return Err(self.illegal(RuleViolation::CannotPassNow, action));
        }
        self.passed.insert(seat);
        self.resolve_if_settled(events)
    }

    fn forfeit(&mut self, seat: usize, events: &mut Vec<TurnEvent>) -> Result<(), GameError> {
        let hand = self.players[seat].empty_hand();
        self.table.discard(hand);
        self.players[seat].set_status(PlayerStatus::Forfeited);
        self.passed.remove(&seat);
        events.push(TurnEvent::PlayerOut {
            player_id: self.players[seat].id().clone(),
        });
        tracing::info!(player_id = %self.players[seat].id(), phase = ?self.phase, "player forfeited");

        if self.active_count() < MIN_PLAYERS {
            let swept = self.table.sweep();
            self.table.discard(swept);
            self.finish(None, events);
            return Ok(());
        }
        if seat == self.attacker || seat == self.defender {
            return self.resolve(RoundOutcome::Abandoned, Some(seat), events);
        }
        self.resolve_if_settled(events)
    }

    fn require_defending(
        &self,
        action: &PlayerAction,
        rule: RuleViolation,
    ) -> Result<(), GameError> {
        if matches!(self.phase, Phase::Defend | Phase::Transfer) {
            Ok(())
        } else {
            Err(self.illegal(rule, action))
        }
    }

    fn set_phase(&mut self, to: Phase, events: &mut Vec<TurnEvent>) {
        if self.phase != to {
            events.push(TurnEvent::PhaseChanged {
                from: self.phase,
                to,
            });
            self.phase = to;
        }
    }

    fn pass_window(&self) -> bool {
        match self.phase {
            Phase::Attack => !self.table.is_empty(),
            Phase::RoundResolution => true,
            _ => false,
        }
    }

    /// Cards `seat` could add to the attack right now.
    fn throwable(&self, seat: usize) -> Vec<Card> {
        let Some(player) = self.players.get(seat) else {
            return Vec::new();
        };
        if seat == self.defender || !player.is_active() {
            return Vec::new();
        }
        if self.table.is_empty() {
            if seat != self.attacker || self.phase != Phase::Attack {
                return Vec::new();
            }
        } else if !self.mode.allows_throw_in() && seat != self.attacker {
            return Vec::new();
        }
        can_attack(
            player.hand(),
            &self.table,
            self.players[self.defender].card_count(),
        )
    }

    /// Attackers who have not passed and could still add a card, attacker
    /// first then in seat order.
    fn pending_throwers(&self) -> Vec<usize> {
        let n = self.players.len();
        (0..n)
            .map(|i| (self.attacker + i) % n)
            .filter(|s| !self.passed.contains(s) && !self.throwable(*s).is_empty())
            .collect()
    }

    fn resolve_if_settled(&mut self, events: &mut Vec<TurnEvent>) -> Result<(), GameError> {
        if !self.pass_window() || !self.pending_throwers().is_empty() {
            return Ok(());
        }
        let outcome = if self.phase == Phase::RoundResolution {
            RoundOutcome::Taken
        } else {
            RoundOutcome::Beaten
        };
        self.resolve(outcome, None, events)
    }

    fn next_active(&self, from: usize) -> Result<usize, GameError> {
        let n = self.players.len();
        (1..n)
            .map(|i| (from + i) % n)
            .find(|s| self.players[*s].is_active())
            .ok_or_else(|| GameError::Internal(format!("no active player after seat {from}")))
    }

    fn next_defender_hand(&self) -> usize {
        self.next_active(self.defender)
            .map(|s| self.players[s].card_count())
            .unwrap_or(0)
    }

    fn resolve(
        &mut self,
        outcome: RoundOutcome,
        forfeiter: Option<usize>,
        events: &mut Vec<TurnEvent>,
    ) -> Result<(), GameError> {
        self.set_phase(Phase::RoundResolution, events);
        let cards = self.table.sweep();
        let count = cards.len();
        match outcome {
            RoundOutcome::Taken => self.players[self.defender].give_cards(cards),
            RoundOutcome::Beaten | RoundOutcome::Abandoned => self.table.discard(cards),
        }
        events.push(TurnEvent::RoundResolved {
            outcome,
            defender_id: self.players[self.defender].id().clone(),
            cards: count,
        });
        tracing::info!(
            outcome = ?outcome,
            defender = %self.players[self.defender].id(),
            cards = count,
            deck = self.deck.remaining(),
            "round resolved"
        );

        self.refill(events);

        if self.deck.is_empty() {
            for p in self.players.iter_mut() {
                if p.is_active() && p.card_count() == 0 {
                    p.set_status(PlayerStatus::Out);
                    events.push(TurnEvent::PlayerOut {
                        player_id: p.id().clone(),
                    });
                }
            }
        }

        if self.active_count() < MIN_PLAYERS {
            let loser = self.players.iter().position(|p| p.is_active());
            self.finish(loser, events);
            return Ok(());
        }

        let next_attacker = match outcome {
            RoundOutcome::Beaten if self.players[self.defender].is_active() => self.defender,
            RoundOutcome::Beaten | RoundOutcome::Taken => self.next_active(self.defender)?,
            RoundOutcome::Abandoned => self.next_active(forfeiter.unwrap_or(self.attacker))?,
        };
        self.attacker = next_attacker;
        self.defender = self.next_active(next_attacker)?;
        self.passed.clear();
        self.set_phase(Phase::Attack, events);
        Ok(())
    }

    /// Draws up to six: attacker first, other attackers in seat order, the
    /// defender last.
    fn refill(&mut self, events: &mut Vec<TurnEvent>) {
        let n = self.players.len();
        let order: Vec<usize> = (0..n)
            .map(|i| (self.attacker + i) % n)
            .filter(|s| *s != self.defender)
            .chain(std::iter::once(self.defender))
            .collect();
        for seat in order {
            if self.deck.is_empty() {
                break;
            }
            let player = &mut self.players[seat];
            if !player.is_active() {
                continue;
            }
            let need = HAND_SIZE.saturating_sub(player.card_count());
            if need == 0 {
                continue;
            }
            let (drawn, rest) = self.deck.draw_up_to(need);
            let count = drawn.len();
            player.give_cards(drawn);
            self.deck = rest;
            events.push(TurnEvent::CardsDrawn {
                player_id: player.id().clone(),
                count,
            });
        }
    }

    fn finish(&mut self, loser: Option<usize>, events: &mut Vec<TurnEvent>) {
        self.loser = loser;
        self.passed.clear();
        self.set_phase(Phase::Finished, events);
        let loser_id = loser.map(|s| self.players[s].id().clone());
        tracing::info!(loser = ?loser_id, "game finished");
        events.push(TurnEvent::Finished { loser_id });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(s: &str) -> Card {
        s.parse().expect("card")
    }

    fn seats(n: usize) -> Vec<Player> {
        (0..n)
            .map(|i| Player::new(format!("p{i}"), format!("Player {i}"), false, i, 1_000))
            .collect()
    }

    /// Two players, trump hearts. p0 gets 6s 7s 8s 9c Tc Jc, p1 gets
    /// 7d 8d 9d Td Jd Qd: nobody holds a trump so p0 attacks first.
    fn two_player() -> TurnMachine {
        let top: Vec<Card> = ["6s", "7s", "8s", "9c", "Tc", "Jc", "7d", "8d", "9d", "Td", "Jd", "Qd"]
            .iter()
            .map(|s| c(s))
            .collect();
        let deck = Deck::stacked(&top, c("Ah")).expect("deck");
        TurnMachine::new(DurakMode::Classic, deck, seats(2)).expect("machine")
    }

    #[test]
    fn setup_deals_six_each_and_reveals_trump() {
        let m = two_player();
        assert_eq!(m.trump(), Suit::Hearts);
        assert_eq!(m.deck().remaining(), 24);
        assert!(m.players().iter().all(|p| p.card_count() == HAND_SIZE));
        assert_eq!(m.current_actor(), Some(0));
    }

    #[test]
    fn lowest_trump_holder_attacks_first() {
        let top: Vec<Card> = ["6s", "7s", "8s", "9c", "Tc", "Kh", "7d", "8d", "9d", "Td", "Jd", "6h"]
            .iter()
            .map(|s| c(s))
            .collect();
        let deck = Deck::stacked(&top, c("Ah")).expect("deck");
        let m = TurnMachine::new(DurakMode::Classic, deck, seats(2)).expect("machine");
        assert_eq!(m.attacker(), 1);
        assert_eq!(m.defender(), 0);
    }

    #[test]
    fn defender_without_answer_has_only_take() {
        let mut m = two_player();
        m.apply(0, PlayerAction::Attack { card: c("6s") }).expect("attack");
        assert_eq!(m.phase(), Phase::Defend);
        assert_eq!(m.legal_actions(1), vec![PlayerAction::Take]);
    }

    #[test]
    fn rejected_action_leaves_state_unchanged() {
        let mut m = two_player();
        m.apply(0, PlayerAction::Attack { card: c("6s") }).expect("attack");
        let before = format!("{m:?}");
        let err = m
            .apply(1, PlayerAction::Defend { attack: c("6s"), card: c("7d") })
            .expect_err("7d cannot beat 6s");
        assert!(matches!(
            err,
            GameError::IllegalMove { rule: RuleViolation::DoesNotBeat, .. }
        ));
        assert_eq!(format!("{m:?}"), before);
    }

    #[test]
    fn opening_attack_belongs_to_attacker() {
        let mut m = two_player();
        let err = m
            .apply(1, PlayerAction::Attack { card: c("7d") })
            .expect_err("defender cannot open");
        assert!(matches!(err, GameError::NotYourTurn { .. }));
    }

    #[test]
    fn take_collects_table_and_attacker_keeps_turn() {
        let mut m = two_player();
        m.apply(0, PlayerAction::Attack { card: c("6s") }).expect("attack");
        m.apply(1, PlayerAction::Take).expect("take");
        // p0 has nothing of rank 6 left, so the round resolves at once
        assert_eq!(m.phase(), Phase::Attack);
        assert_eq!(m.players()[1].card_count(), 7);
        assert_eq!(m.players()[0].card_count(), 6);
        assert_eq!(m.attacker(), 0);
        assert_eq!(m.deck().remaining(), 23);
    }
}
