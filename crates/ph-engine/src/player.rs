use ph_core::{marker, Chips, Seat, ID};
use ph_cards::Card;

/// Table-local, monotonically increasing identifier for a seated player.
/// Stable across seat changes within the same sit; a re-sit gets a new one.
pub type PlayerId = u32;

/// A seated player and everything the engine tracks about their hand.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub user_id: Option<ID<marker::User>>,
    pub name: String,
    pub avatar: Option<String>,
    pub seat: Seat,
    pub stack: Chips,
    pub committed: Chips,
    /// Total chips put into the pot across every street of the current
    /// hand; unlike `committed` this does not reset at a street boundary,
    /// which is what lets showdown build side pots by contribution tier.
    pub total_committed: Chips,
    pub hole: Vec<Card>,
    pub in_hand: bool,
    pub folded: bool,
    pub all_in: bool,
    pub sitting_out: bool,
    pub sat_out_since: Option<tokio::time::Instant>,
}

impl Player {
    pub fn new(id: PlayerId, seat: Seat, name: String, stack: Chips, user_id: Option<ID<marker::User>>, avatar: Option<String>) -> Self {
        Self {
            id,
            user_id,
            name,
            avatar,
            seat,
            stack,
            committed: 0,
            total_committed: 0,
            hole: Vec::new(),
            in_hand: false,
            folded: false,
            all_in: false,
            sitting_out: false,
            sat_out_since: None,
        }
    }

    /// Still live in the current hand and able to be dealt into a pot.
    pub fn is_eligible_for_hand(&self) -> bool {
        !self.sitting_out && self.stack > 0
    }

    /// Still holding cards and not folded (may be all-in).
    pub fn is_live(&self) -> bool {
        self.in_hand && !self.folded
    }

    /// Live, not folded, not all-in: still capable of taking an action.
    pub fn can_act(&self) -> bool {
        self.is_live() && !self.all_in
    }

    pub fn reset_for_hand(&mut self, dealt_in: bool) {
        self.hole.clear();
        self.in_hand = dealt_in;
        self.folded = false;
        self.all_in = false;
        self.committed = 0;
        self.total_committed = 0;
    }

    pub fn commit(&mut self, amount: Chips) -> Chips {
        let put_in = amount.min(self.stack);
        self.stack -= put_in;
        self.committed += put_in;
        self.total_committed += put_in;
        if self.stack == 0 {
            self.all_in = true;
        }
        put_in
    }
}
