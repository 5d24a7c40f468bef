use ph_cards::GameKind;
use ph_core::{marker, Chips, Seat, ID};

/// Status of a table's metadata row. The engine instance is destroyed
/// when a table transitions to `Closed`; the row itself is never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableStatus {
    Active,
    Closed,
}

impl TableStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Closed => "closed",
        }
    }
    pub fn parse(s: &str) -> Self {
        match s {
            "closed" => Self::Closed,
            _ => Self::Active,
        }
    }
}

/// Immutable-except-status table configuration, the source of truth an
/// engine instance is rehydrated from on first access.
#[derive(Debug, Clone)]
pub struct TableMeta {
    pub id: ID<marker::Table>,
    pub club: ID<marker::Club>,
    pub creator: ID<marker::User>,
    pub name: Option<String>,
    pub max_seats: Seat,
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub game_kind: GameKind,
    pub bomb_pot_every_n_hands: Option<u64>,
    pub bomb_pot_amount: Chips,
    pub status: TableStatus,
    pub created_at: i64,
}

/// (table, user) -> seat/stack row. Rehydrating a table reads every
/// stack row for that table back into live `Player`s.
#[derive(Debug, Clone)]
pub struct TableStack {
    pub table: ID<marker::Table>,
    pub user: ID<marker::User>,
    pub seat: Seat,
    pub stack: Chips,
    pub name: String,
    pub avatar: Option<String>,
    pub updated_at: i64,
}

/// Ledger row for one buy-in/cash-out cycle. At most one per (table,
/// user) may have `cash_out: None` at a time.
#[derive(Debug, Clone)]
pub struct TableSession {
    pub id: ID<marker::Session>,
    pub table: ID<marker::Table>,
    pub user: ID<marker::User>,
    pub buy_in: Chips,
    pub cash_out: Option<Chips>,
    pub profit_loss: Option<Chips>,
    pub opened_at: i64,
    pub closed_at: Option<i64>,
}

/// One row of a closing-time report: a single user's buy-in, cash-out,
/// and net result for the table being closed.
#[derive(Debug, Clone)]
pub struct ReportEntry {
    pub user: ID<marker::User>,
    pub buy_in: Chips,
    pub cash_out: Chips,
    pub profit_loss: Chips,
}

/// Outcome of a single hand from one player's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandResult {
    Win,
    Loss,
    Even,
}

impl HandResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Win => "win",
            Self::Loss => "loss",
            Self::Even => "even",
        }
    }
    pub fn parse(s: &str) -> Self {
        match s {
            "win" => Self::Win,
            "loss" => Self::Loss,
            _ => Self::Even,
        }
    }
    pub fn from_net(net_change: Chips) -> Self {
        match net_change.cmp(&0) {
            std::cmp::Ordering::Greater => Self::Win,
            std::cmp::Ordering::Less => Self::Loss,
            std::cmp::Ordering::Equal => Self::Even,
        }
    }
}

/// Append-only per-user-per-hand row, retained without a bounded policy.
#[derive(Debug, Clone)]
pub struct HandHistoryEntry {
    pub user: ID<marker::User>,
    pub table_name: String,
    pub result: HandResult,
    pub net_change: Chips,
    pub summary: String,
    pub created_at: i64,
}
