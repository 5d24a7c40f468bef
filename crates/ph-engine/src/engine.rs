use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use ph_cards::{Card, Deck, GameKind};
use ph_core::{marker, Chips, Error, HandNumber, Result, Seat, ID};

use crate::action::Action;
use crate::event::{HandEvent, HandSummary, Ring};
use crate::player::{Player, PlayerId};
use crate::runout::RunoutNegotiation;
use crate::showdown::{self, Payout};
use crate::street::Street;
use crate::timer::Timer;

pub const DEFAULT_MAX_SEATS: usize = 9;
const RECENT_HANDS_CAPACITY: usize = 50;
const HAND_LOG_CAPACITY: usize = 200;

/// Static per-table parameters, set once at hydration and not mutated by play.
#[derive(Debug, Clone)]
pub struct TableConfig {
    pub game_kind: GameKind,
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub max_seats: Seat,
    pub bomb_pot_every_n_hands: Option<u64>,
    pub bomb_pot_amount: Chips,
    pub action_time_limit: Duration,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            game_kind: GameKind::Holdem,
            small_blind: 1,
            big_blind: 2,
            max_seats: DEFAULT_MAX_SEATS,
            bomb_pot_every_n_hands: None,
            bomb_pot_amount: 0,
            action_time_limit: Timer::DEFAULT_ACTION_TIME,
        }
    }
}

/// The outcome of a finished hand: who was owed what, and on which board(s).
#[derive(Debug, Clone)]
pub struct Settlement {
    pub payouts: Vec<Payout>,
    pub boards: Vec<Vec<Card>>,
}

/// Authoritative per-table state machine. Every method here assumes the
/// caller already holds the table's lock; nothing in this type blocks on
/// I/O or touches a clock other than `tokio::time::Instant`.
#[derive(Debug, Clone)]
pub struct Table {
    pub id: ID<marker::Table>,
    config: TableConfig,
    players: Vec<Player>,
    next_player_id: PlayerId,
    button: Option<Seat>,
    hand_number: HandNumber,
    street: Street,
    board: Vec<Card>,
    deck: Deck,
    current_bet: Chips,
    last_raise_increment: Chips,
    next_to_act: Option<Seat>,
    action_closing_seat: Option<Seat>,
    timer: Timer,
    pending_leave_user_ids: HashSet<ID<marker::User>>,
    runout: Option<RunoutNegotiation>,
    agreed_runout_count: Option<u8>,
    hand_log: Vec<HandEvent>,
    recent_hands: Ring<HandSummary>,
    last_settlement: Option<Settlement>,
}

impl Table {
    pub fn new(id: ID<marker::Table>, config: TableConfig) -> Self {
        let last_raise_increment = config.big_blind;
        Self {
            id,
            config,
            players: Vec::new(),
            next_player_id: 0,
            button: None,
            hand_number: 0,
            street: Street::PreHand,
            board: Vec::new(),
            deck: Deck::new(),
            current_bet: 0,
            last_raise_increment,
            next_to_act: None,
            action_closing_seat: None,
            timer: Timer::default(),
            pending_leave_user_ids: HashSet::new(),
            runout: None,
            agreed_runout_count: None,
            hand_log: Vec::new(),
            recent_hands: Ring::new(RECENT_HANDS_CAPACITY),
            last_settlement: None,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn players(&self) -> &[Player] {
        &self.players
    }
    pub fn street(&self) -> Street {
        self.street
    }
    pub fn board(&self) -> &[Card] {
        &self.board
    }
    pub fn hand_number(&self) -> HandNumber {
        self.hand_number
    }
    pub fn button(&self) -> Option<Seat> {
        self.button
    }
    pub fn current_bet(&self) -> Chips {
        self.current_bet
    }
    pub fn next_to_act(&self) -> Option<Seat> {
        self.next_to_act
    }
    pub fn action_closing_seat(&self) -> Option<Seat> {
        self.action_closing_seat
    }
    pub fn action_deadline(&self) -> Option<tokio::time::Instant> {
        self.timer.deadline()
    }
    pub fn hand_log(&self) -> &[HandEvent] {
        &self.hand_log
    }
    pub fn recent_hands(&self) -> &Ring<HandSummary> {
        &self.recent_hands
    }
    /// The settlement of the most recently finalized hand, however it
    /// finalized: full showdown, all-in runout, or everyone-but-one
    /// folding. `None` before the first hand ever completes.
    pub fn last_settlement(&self) -> Option<&Settlement> {
        self.last_settlement.as_ref()
    }
    pub fn pot(&self) -> Chips {
        self.players.iter().map(|p| p.total_committed).sum()
    }
    pub fn player_by_id(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// All remaining (non-folded) players are all-in: no one can act, but
    /// more than one of them is still live, so the hand isn't decided yet.
    pub fn all_players_all_in(&self) -> bool {
        self.street != Street::Showdown
            && self.players.iter().filter(|p| p.is_live()).count() > 1
            && self.players.iter().filter(|p| p.can_act()).count() == 0
    }

    // ------------------------------------------------------------------
    // Seating
    // ------------------------------------------------------------------

    pub fn add_player(
        &mut self,
        name: String,
        stack: Chips,
        user_id: Option<ID<marker::User>>,
        avatar: Option<String>,
        seat: Option<Seat>,
    ) -> Result<Player> {
        let seat = match seat {
            Some(seat) => {
                if seat >= self.config.max_seats {
                    return Err(Error::invalid("invalid seat"));
                }
                if self.players.iter().any(|p| p.seat == seat) {
                    return Err(Error::conflict("seat taken"));
                }
                seat
            }
            None => (0..self.config.max_seats)
                .find(|s| !self.players.iter().any(|p| p.seat == *s))
                .ok_or_else(|| Error::conflict("table full"))?,
        };
        let id = self.next_player_id;
        self.next_player_id += 1;
        let player = Player::new(id, seat, name, stack, user_id, avatar);
        self.players.push(player.clone());
        Ok(player)
    }

    pub fn move_to_seat(&mut self, user_id: ID<marker::User>, seat: Seat) -> Result<Player> {
        if !matches!(self.street, Street::PreHand | Street::Showdown) {
            return Err(Error::conflict("hand in progress"));
        }
        if self.players.iter().any(|p| p.seat == seat && p.user_id != Some(user_id)) {
            return Err(Error::conflict("seat taken"));
        }
        let idx = self.index_by_user(user_id)?;
        self.players[idx].seat = seat;
        Ok(self.players[idx].clone())
    }

    pub fn remove_by_user(&mut self, user_id: ID<marker::User>) -> Result<Player> {
        let idx = self.index_by_user(user_id)?;
        let removed = self.players.remove(idx);
        self.clear_position_markers_for(removed.seat);
        Ok(removed)
    }

    /// Leaves immediately when safe (no hand in progress, or already folded
    /// out of this one); otherwise defers removal until the hand finalizes.
    pub fn leave(&mut self, user_id: ID<marker::User>) -> Result<Option<Player>> {
        let idx = self.index_by_user(user_id)?;
        if self.players[idx].is_live() && !matches!(self.street, Street::PreHand | Street::Showdown) {
            self.pending_leave_user_ids.insert(user_id);
            return Ok(None);
        }
        Ok(Some(self.remove_by_user(user_id)?))
    }

    /// Removes every seat recorded in `pending_leave_user_ids` and returns
    /// them; called by the session layer once a hand has finalized so it can
    /// credit their remaining stacks.
    pub fn take_pending_leaves(&mut self) -> Vec<Player> {
        let user_ids: Vec<_> = self.pending_leave_user_ids.drain().collect();
        user_ids
            .into_iter()
            .filter_map(|uid| self.remove_by_user(uid).ok())
            .collect()
    }

    pub fn sit_out(&mut self, player_id: PlayerId) -> Result<()> {
        let idx = self.index_by_id(player_id)?;
        self.players[idx].sitting_out = true;
        self.players[idx].sat_out_since = Some(tokio::time::Instant::now());
        let seat = self.players[idx].seat;
        if self.next_to_act == Some(seat) {
            self.act(player_id, Action::Fold)?;
        }
        Ok(())
    }

    pub fn return_to_play(&mut self, player_id: PlayerId) -> Result<()> {
        let idx = self.index_by_id(player_id)?;
        self.players[idx].sitting_out = false;
        self.players[idx].sat_out_since = None;
        Ok(())
    }

    fn clear_position_markers_for(&mut self, seat: Seat) {
        if self.button == Some(seat) {
            self.button = None;
        }
        if self.next_to_act == Some(seat) {
            self.next_to_act = None;
        }
        if self.action_closing_seat == Some(seat) {
            self.action_closing_seat = None;
        }
    }

    fn index_by_user(&self, user_id: ID<marker::User>) -> Result<usize> {
        self.players
            .iter()
            .position(|p| p.user_id == Some(user_id))
            .ok_or_else(|| Error::not_found("player not seated"))
    }

    fn index_by_id(&self, player_id: PlayerId) -> Result<usize> {
        self.players
            .iter()
            .position(|p| p.id == player_id)
            .ok_or_else(|| Error::not_found("player not seated"))
    }

    // ------------------------------------------------------------------
    // Hand lifecycle
    // ------------------------------------------------------------------

    pub fn start_new_hand(&mut self) -> Result<()> {
        let eligible_count = self.players.iter().filter(|p| p.is_eligible_for_hand()).count();
        if eligible_count < 2 {
            return Err(Error::invalid("fewer than two eligible players"));
        }

        self.hand_number += 1;
        self.deck.reset();
        self.board.clear();
        self.hand_log.clear();
        self.last_settlement = None;
        self.current_bet = 0;
        self.last_raise_increment = self.config.big_blind;

        for p in &mut self.players {
            let dealt_in = p.is_eligible_for_hand();
            p.reset_for_hand(dealt_in);
        }

        self.advance_button();
        self.apply_bomb_pot();

        for _ in 0..2 {
            for seat in self.live_seats() {
                let card = self.deck.deal_one()?;
                if let Some(p) = self.player_by_seat_mut(seat) {
                    p.hole.push(card);
                }
            }
        }

        self.post_blinds()?;
        self.current_bet = self.current_bet.max(self.config.big_blind);
        self.street = Street::Preflop;
        Ok(())
    }

    fn advance_button(&mut self) {
        let mut occupied: Vec<Seat> = self.players.iter().map(|p| p.seat).collect();
        occupied.sort_unstable();
        if occupied.is_empty() {
            return;
        }
        self.button = Some(match self.button {
            Some(prev) if occupied.contains(&prev) => Self::next_in(&occupied, prev),
            _ => occupied[0],
        });
    }

    fn apply_bomb_pot(&mut self) {
        let Some(n) = self.config.bomb_pot_every_n_hands else {
            return;
        };
        if n == 0 || self.hand_number % n != 0 {
            return;
        }
        let amount = self.config.bomb_pot_amount;
        for p in &mut self.players {
            if p.is_eligible_for_hand() {
                p.commit(amount);
            }
        }
        self.current_bet = self.current_bet.max(amount);
    }

    fn post_blinds(&mut self) -> Result<()> {
        let button = self.button.ok_or_else(|| Error::illegal("no button assigned"))?;
        let live = self.live_seats();
        if live.len() < 2 {
            return Err(Error::invalid("fewer than two eligible players"));
        }
        let heads_up = live.len() == 2;
        let sb_seat = if heads_up && live.contains(&button) {
            button
        } else {
            Self::next_in(&live, button)
        };
        let bb_seat = Self::next_in(&live, sb_seat);

        let small_blind = self.config.small_blind;
        let big_blind = self.config.big_blind;
        if let Some(p) = self.player_by_seat_mut(sb_seat) {
            p.commit(small_blind);
        }
        if let Some(p) = self.player_by_seat_mut(bb_seat) {
            p.commit(big_blind);
        }

        self.action_closing_seat = Some(bb_seat);
        self.next_to_act = Some(Self::next_in(&live, bb_seat));
        self.timer.start(self.config.action_time_limit);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Betting
    // ------------------------------------------------------------------

    pub fn act(&mut self, player_id: PlayerId, action: Action) -> Result<()> {
        let seat = self.seat_on_turn_for(player_id)?;
        let idx = self.index_by_id(player_id)?;
        let previous_current_bet = self.current_bet;

        let mut reopened_by_this_raise = false;

        match action {
            Action::Fold => {
                self.players[idx].folded = true;
                self.players[idx].in_hand = false;
            }
            Action::Check => {
                if self.players[idx].committed != self.current_bet {
                    return Err(Error::invalid("cannot check facing a bet"));
                }
            }
            Action::Call => {
                let owed = self.current_bet - self.players[idx].committed;
                if owed > 0 {
                    self.players[idx].commit(owed);
                }
            }
            Action::RaiseTo(to) => {
                if to <= self.current_bet {
                    return Err(Error::invalid("raise_to must exceed the current bet"));
                }
                let max_to = self.players[idx].committed + self.players[idx].stack;
                if to > max_to {
                    return Err(Error::invalid("raise_to exceeds the player's stack"));
                }
                let increment = to - previous_current_bet;
                let is_all_in = to == max_to;
                if increment < self.last_raise_increment && !is_all_in {
                    return Err(Error::invalid("raise below the minimum raise increment"));
                }
                let put_in = to - self.players[idx].committed;
                self.players[idx].commit(put_in);
                self.current_bet = to;
                if increment >= self.last_raise_increment {
                    self.action_closing_seat = Some(seat);
                    self.last_raise_increment = increment;
                    reopened_by_this_raise = true;
                }
            }
        }

        self.hand_log.push(HandEvent::Action {
            street: self.street,
            seat,
            action,
            committed: self.players[idx].committed,
            stack_after: self.players[idx].stack,
            auto: false,
        });
        self.bound_hand_log();

        // A short (non-qualifying) all-in never closes action on itself; but a
        // full qualifying raise that happens to exhaust the stack just set
        // `action_closing_seat` above and must not be walked back here.
        if self.action_closing_seat == Some(seat)
            && (action == Action::Fold || (self.players[idx].all_in && !reopened_by_this_raise))
        {
            self.action_closing_seat = self.previous_live_seat(seat);
        }

        self.timer.clear();

        if self.try_close_on_single_survivor() {
            return Ok(());
        }
        self.advance_turn(seat);
        Ok(())
    }

    fn seat_on_turn_for(&self, player_id: PlayerId) -> Result<Seat> {
        let player = self
            .players
            .iter()
            .find(|p| p.id == player_id)
            .ok_or_else(|| Error::not_found("player not seated"))?;
        let next = self
            .next_to_act
            .ok_or_else(|| Error::illegal("no player currently has the action"))?;
        if player.seat != next {
            return Err(Error::forbidden("not your turn"));
        }
        if !player.can_act() {
            return Err(Error::illegal("player cannot act"));
        }
        Ok(player.seat)
    }

    fn try_close_on_single_survivor(&mut self) -> bool {
        let live: Vec<Seat> = self.players.iter().filter(|p| p.is_live()).map(|p| p.seat).collect();
        if live.len() != 1 {
            return false;
        }
        self.next_to_act = None;
        self.finalize_showdown(vec![self.board.clone()]);
        true
    }

    fn advance_turn(&mut self, from_seat: Seat) {
        let actionable = self.players.iter().filter(|p| p.can_act()).count();
        if actionable == 0 {
            self.next_to_act = None;
            return;
        }
        let candidate = self.next_live_seat(from_seat);
        if candidate == self.action_closing_seat && self.round_settled() {
            self.next_to_act = None;
            return;
        }
        self.next_to_act = self.next_actionable_seat(from_seat);
        if self.next_to_act.is_some() {
            self.timer.start(self.config.action_time_limit);
        }
    }

    fn round_settled(&self) -> bool {
        self.players
            .iter()
            .filter(|p| p.can_act())
            .all(|p| p.committed == self.current_bet)
    }

    // ------------------------------------------------------------------
    // Street transitions
    // ------------------------------------------------------------------

    pub fn deal_flop(&mut self) -> Result<()> {
        self.require_round_closed(Street::Preflop)?;
        self.deal_cards(3)?;
        self.street = Street::Flop;
        self.open_new_betting_round()?;
        self.log_street_transition();
        Ok(())
    }

    pub fn deal_turn(&mut self) -> Result<()> {
        self.require_round_closed(Street::Flop)?;
        self.deal_cards(1)?;
        self.street = Street::Turn;
        self.open_new_betting_round()?;
        self.log_street_transition();
        Ok(())
    }

    pub fn deal_river(&mut self) -> Result<()> {
        self.require_round_closed(Street::Turn)?;
        self.deal_cards(1)?;
        self.street = Street::River;
        self.open_new_betting_round()?;
        self.log_street_transition();
        Ok(())
    }

    fn require_round_closed(&self, expected: Street) -> Result<()> {
        if self.street != expected {
            return Err(Error::invalid("wrong street"));
        }
        if self.next_to_act.is_some() {
            return Err(Error::invalid("betting round still open"));
        }
        Ok(())
    }

    fn deal_cards(&mut self, count: usize) -> Result<()> {
        for _ in 0..count {
            let card = self.deck.deal_one()?;
            self.board.push(card);
        }
        Ok(())
    }

    fn open_new_betting_round(&mut self) -> Result<()> {
        for p in &mut self.players {
            p.committed = 0;
        }
        self.current_bet = 0;
        self.last_raise_increment = self.config.big_blind;
        let button = self.button.ok_or_else(|| Error::illegal("no button assigned"))?;

        let Some(first_to_act) = self.next_live_seat(button) else {
            self.next_to_act = None;
            self.action_closing_seat = None;
            return Ok(());
        };
        self.action_closing_seat = self.previous_live_seat(first_to_act);
        match self.next_actionable_seat_inclusive(first_to_act) {
            Some(seat) => {
                self.next_to_act = Some(seat);
                self.timer.start(self.config.action_time_limit);
            }
            None => self.next_to_act = None,
        }
        Ok(())
    }

    fn log_street_transition(&mut self) {
        self.hand_log.push(HandEvent::StreetTransition {
            street: self.street,
            board: self.board.clone(),
        });
        self.bound_hand_log();
    }

    // ------------------------------------------------------------------
    // Showdown
    // ------------------------------------------------------------------

    pub fn showdown(&mut self) -> Result<Settlement> {
        if self.street == Street::Showdown {
            return self
                .last_settlement
                .clone()
                .ok_or_else(|| Error::illegal("hand already finalized with no settlement on record"));
        }
        if self.street != Street::River || self.next_to_act.is_some() {
            return Err(Error::invalid("wrong street for showdown"));
        }
        Ok(self.finalize_showdown(vec![self.board.clone()]))
    }

    fn cards_to_complete(&self) -> usize {
        match self.street {
            Street::Preflop => 5,
            Street::Flop => 2,
            Street::Turn => 1,
            Street::River | Street::Showdown | Street::PreHand => 0,
        }
    }

    /// Deals the rest of the board (once, or `count` independent times if a
    /// run-it-twice agreement is on record) and settles the pot. Used in
    /// place of `deal_flop`/`deal_turn`/`deal_river`/`showdown` once no
    /// remaining player can act.
    pub fn resolve_all_in_showdown(&mut self) -> Result<Settlement> {
        if !self.all_players_all_in() {
            return Err(Error::invalid("no all-in spot to resolve"));
        }
        let count = self.agreed_runout_count.take().unwrap_or(1) as usize;
        let needed = self.cards_to_complete();
        let base_board = self.board.clone();
        let mut boards = Vec::with_capacity(count);
        for _ in 0..count {
            let mut board = base_board.clone();
            for _ in 0..needed {
                board.push(self.deck.deal_one()?);
            }
            boards.push(board);
        }
        self.board = boards[0].clone();
        self.runout = None;
        Ok(self.finalize_showdown(boards))
    }

    fn finalize_showdown(&mut self, boards: Vec<Vec<Card>>) -> Settlement {
        let button = self.button.unwrap_or(0);
        let payouts = showdown::settle(&mut self.players, &boards, self.config.game_kind, button);
        self.street = Street::Showdown;
        self.next_to_act = None;
        self.timer.clear();
        self.hand_log.push(HandEvent::StreetTransition {
            street: self.street,
            board: boards[0].clone(),
        });
        self.bound_hand_log();
        self.recent_hands.push(HandSummary {
            hand_number: self.hand_number,
            board: boards[0].clone(),
            winners: payouts.iter().map(|p| (p.seat, p.amount)).collect(),
        });
        let settlement = Settlement { payouts, boards };
        self.last_settlement = Some(settlement.clone());
        settlement
    }

    fn bound_hand_log(&mut self) {
        if self.hand_log.len() > HAND_LOG_CAPACITY {
            let excess = self.hand_log.len() - HAND_LOG_CAPACITY;
            self.hand_log.drain(0..excess);
        }
    }

    // ------------------------------------------------------------------
    // Turn timer
    // ------------------------------------------------------------------

    /// Idempotent and re-entrant: folds whoever is on the clock and has an
    /// expired deadline, repeating until the clock clears or the remaining
    /// deadline is in the future. Returns whether any auto-fold applied.
    pub fn enforce_action_timeout(&mut self) -> Result<bool> {
        let mut applied = false;
        while self.timer.expired() {
            let Some(seat) = self.next_to_act else {
                break;
            };
            let Some(player_id) = self.players.iter().find(|p| p.seat == seat).map(|p| p.id) else {
                break;
            };
            self.act(player_id, Action::Fold)?;
            if let Some(HandEvent::Action { auto, .. }) = self.hand_log.last_mut() {
                *auto = true;
            }
            applied = true;
        }
        Ok(applied)
    }

    // ------------------------------------------------------------------
    // Run-it-twice
    // ------------------------------------------------------------------

    pub fn request_runouts(&mut self, player_id: PlayerId, count: u8) -> Result<()> {
        if !self.config.game_kind.is_holdem() {
            return Err(Error::invalid("run-it-twice requires hold'em"));
        }
        if !self.all_players_all_in() {
            return Err(Error::invalid("not an all-in spot"));
        }
        if self.street == Street::River {
            return Err(Error::invalid("no further streets to run"));
        }
        if !(2..=3).contains(&count) {
            return Err(Error::invalid("run-it count must be 2 or 3"));
        }
        let participants: Vec<PlayerId> = self
            .players
            .iter()
            .filter(|p| p.is_live())
            .map(|p| p.id)
            .collect();
        if !participants.contains(&player_id) {
            return Err(Error::forbidden("not a participant in this pot"));
        }
        let mut negotiation = RunoutNegotiation::propose(count, &participants);
        negotiation.accept(player_id);
        self.runout = Some(negotiation);
        Ok(())
    }

    pub fn respond_runouts(&mut self, player_id: PlayerId, accept: bool) -> Result<()> {
        let negotiation = self
            .runout
            .as_mut()
            .ok_or_else(|| Error::illegal("no pending run-it-twice negotiation"))?;
        if !negotiation.is_participant(player_id) {
            return Err(Error::forbidden("not a participant in this negotiation"));
        }
        if !accept {
            self.runout = None;
            return Ok(());
        }
        let count = negotiation.count;
        if negotiation.accept(player_id) {
            self.agreed_runout_count = Some(count);
            self.runout = None;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Seat rotation helpers
    // ------------------------------------------------------------------

    fn live_seats(&self) -> Vec<Seat> {
        let mut seats: Vec<Seat> = self.players.iter().filter(|p| p.is_live()).map(|p| p.seat).collect();
        seats.sort_unstable();
        seats
    }

    fn player_by_seat_mut(&mut self, seat: Seat) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.seat == seat)
    }

    fn next_live_seat(&self, from: Seat) -> Option<Seat> {
        let seats = self.live_seats();
        if seats.is_empty() {
            return None;
        }
        Some(Self::next_in(&seats, from))
    }

    fn previous_live_seat(&self, from: Seat) -> Option<Seat> {
        let seats = self.live_seats();
        let last = *seats.last()?;
        Some(seats.iter().rev().copied().find(|&s| s < from).unwrap_or(last))
    }

    fn next_actionable_seat(&self, from: Seat) -> Option<Seat> {
        let mut seats: Vec<Seat> = self.players.iter().filter(|p| p.can_act()).map(|p| p.seat).collect();
        seats.sort_unstable();
        if seats.is_empty() {
            return None;
        }
        Some(Self::next_in(&seats, from))
    }

    fn next_actionable_seat_inclusive(&self, from: Seat) -> Option<Seat> {
        if let Some(p) = self.players.iter().find(|p| p.seat == from) {
            if p.can_act() {
                return Some(from);
            }
        }
        self.next_actionable_seat(from)
    }

    /// First element of `seats` strictly greater than `after`, wrapping
    /// around to the smallest when `after` is the maximum. `seats` must be
    /// sorted ascending and non-empty.
    fn next_in(seats: &[Seat], after: Seat) -> Seat {
        seats.iter().copied().find(|&s| s > after).unwrap_or(seats[0])
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "table {} hand #{} street={:?} pot={} players={}",
            self.id,
            self.hand_number,
            self.street,
            self.pot(),
            self.players.len(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heads_up_table() -> (Table, PlayerId, PlayerId) {
        let mut table = Table::new(ID::default(), TableConfig::default());
        let a = table.add_player("a".into(), 200, None, None, Some(0)).unwrap().id;
        let b = table.add_player("b".into(), 200, None, None, Some(1)).unwrap().id;
        table.start_new_hand().unwrap();
        (table, a, b)
    }

    #[test]
    fn heads_up_button_posts_small_blind() {
        let (table, a, b) = heads_up_table();
        let button = table.button().unwrap();
        let button_player = table.players().iter().find(|p| p.seat == button).unwrap();
        assert_eq!(button_player.committed, table.config.small_blind);
        assert!(table.player_by_id(a).is_some() && table.player_by_id(b).is_some());
    }

    #[test]
    fn insufficient_eligible_players_rejects_start() {
        let mut table = Table::new(ID::default(), TableConfig::default());
        table.add_player("solo".into(), 100, None, None, Some(0)).unwrap();
        assert!(table.start_new_hand().is_err());
    }

    #[test]
    fn short_all_in_does_not_reopen_action() {
        let mut table = Table::new(ID::default(), TableConfig::default());
        // a is under the gun with a stack too small for a full min-raise.
        let a = table.add_player("a".into(), 3, None, None, Some(0)).unwrap().id;
        table.add_player("b".into(), 1000, None, None, Some(1)).unwrap();
        let c = table.add_player("c".into(), 1000, None, None, Some(2)).unwrap().id;
        table.start_new_hand().unwrap();

        let bb_seat = table.players().iter().find(|p| p.id == c).unwrap().seat;
        assert_eq!(table.action_closing_seat(), Some(bb_seat));
        assert_eq!(table.next_to_act(), table.players().iter().find(|p| p.id == a).map(|p| p.seat));

        table.act(a, Action::RaiseTo(3)).unwrap();
        // A one-chip shove over the two-chip big blind is under the minimum
        // raise, so it must not move the closing seat off the big blind.
        assert_eq!(table.action_closing_seat(), Some(bb_seat));
        assert_eq!(table.current_bet(), 3);
    }

    #[test]
    fn all_fold_short_circuit_awards_pot_immediately() {
        let mut table = Table::new(ID::default(), TableConfig::default());
        let a = table.add_player("a".into(), 100, None, None, Some(0)).unwrap().id;
        let b = table.add_player("b".into(), 100, None, None, Some(1)).unwrap().id;
        table.start_new_hand().unwrap();
        let on_turn = table.next_to_act().unwrap();
        let folding = table.players().iter().find(|p| p.seat == on_turn).unwrap().id;
        table.act(folding, Action::Fold).unwrap();
        assert_eq!(table.street(), Street::Showdown);
        assert!(table.next_to_act().is_none());
        let _ = (a, b);
    }

    #[test]
    fn no_bet_street_requires_full_orbit() {
        let mut table = Table::new(ID::default(), TableConfig::default());
        table.add_player("a".into(), 100, None, None, Some(0)).unwrap();
        table.add_player("b".into(), 100, None, None, Some(1)).unwrap();
        table.start_new_hand().unwrap();
        loop {
            let Some(seat) = table.next_to_act() else { break };
            let pid = table.players().iter().find(|p| p.seat == seat).unwrap().id;
            let action = if table.current_bet() == table.players().iter().find(|p| p.id == pid).unwrap().committed {
                Action::Check
            } else {
                Action::Call
            };
            table.act(pid, action).unwrap();
        }
        table.deal_flop().unwrap();
        let closing = table.action_closing_seat().unwrap();
        let button = table.button().unwrap();
        // heads-up: first to act on the flop is the seat after the button,
        // and the orbit must return all the way to the button to close.
        assert_eq!(closing, button);
    }
}
