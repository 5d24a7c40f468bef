use ph_cards::Card;
use ph_core::{marker, Chips, HandNumber, Seat, ID};
use ph_engine::{Street, Table};

/// Wire-agnostic masked snapshot of a table, computed fresh per viewer.
/// `ph-server` wraps this in its tagged `ServerMessage::TableState` frame;
/// this crate stops short of owning the wire format.
#[derive(Debug, Clone)]
pub struct TableView {
    pub table_id: ID<marker::Table>,
    pub hand_number: HandNumber,
    pub street: Street,
    pub board: Vec<Card>,
    pub pot: Chips,
    pub current_bet: Chips,
    pub button: Option<Seat>,
    pub next_to_act: Option<Seat>,
    pub action_closing_seat: Option<Seat>,
    pub action_deadline_millis_remaining: Option<u64>,
    pub seats: Vec<SeatView>,
}

#[derive(Debug, Clone)]
pub struct SeatView {
    pub seat: Seat,
    pub user_id: Option<ID<marker::User>>,
    pub name: String,
    pub avatar: Option<String>,
    pub stack: Chips,
    pub committed: Chips,
    pub in_hand: bool,
    pub folded: bool,
    pub all_in: bool,
    pub sitting_out: bool,
    /// `Some` only when the viewer is entitled to see these cards:
    /// their own hole cards, or a shared/bot seat's (`user_id.is_none()`).
    pub hole: Option<Vec<Card>>,
}

/// Typed payload handed to a subscriber's channel. `ph-server` owns the
/// wire encoding; this crate only ever produces these Rust values.
#[derive(Debug, Clone)]
pub enum Frame {
    TableState(TableView),
    ChatHistory(Vec<crate::chat::ChatMessage>),
    ChatMessage(crate::chat::ChatMessage),
}

/// Builds the frame a specific viewer is entitled to see. A seat's hole
/// cards are cleartext only when `viewer == seat.user_id` or the seat has
/// no owning user.
pub fn masked_view(table: &Table, viewer: Option<ID<marker::User>>) -> TableView {
    let seats = table
        .players()
        .iter()
        .map(|p| {
            let visible = p.user_id.is_none() || p.user_id == viewer;
            SeatView {
                seat: p.seat,
                user_id: p.user_id,
                name: p.name.clone(),
                avatar: p.avatar.clone(),
                stack: p.stack,
                committed: p.committed,
                in_hand: p.in_hand,
                folded: p.folded,
                all_in: p.all_in,
                sitting_out: p.sitting_out,
                hole: if visible && !p.hole.is_empty() {
                    Some(p.hole.clone())
                } else {
                    None
                },
            }
        })
        .collect();
    TableView {
        table_id: table.id,
        hand_number: table.hand_number(),
        street: table.street(),
        board: table.board().to_vec(),
        pot: table.pot(),
        current_bet: table.current_bet(),
        button: table.button(),
        next_to_act: table.next_to_act(),
        action_closing_seat: table.action_closing_seat(),
        action_deadline_millis_remaining: table
            .action_deadline()
            .map(|deadline| {
                deadline
                    .saturating_duration_since(tokio::time::Instant::now())
                    .as_millis() as u64
            }),
        seats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ph_core::Result;

    fn two_player_table() -> (Table, ID<marker::User>, ID<marker::User>) {
        let mut table = Table::new(ID::default(), ph_engine::TableConfig::default());
        let alice = ID::default();
        let bob = ID::default();
        table
            .add_player("Alice".into(), 200, Some(alice), None, Some(0))
            .unwrap();
        table
            .add_player("Bob".into(), 200, Some(bob), None, Some(1))
            .unwrap();
        table.start_new_hand().unwrap();
        (table, alice, bob)
    }

    #[test]
    fn viewer_sees_only_their_own_hole_cards() -> Result<()> {
        let (table, alice, bob) = two_player_table();
        let view = masked_view(&table, Some(alice));
        let alice_seat = view.seats.iter().find(|s| s.user_id == Some(alice)).unwrap();
        let bob_seat = view.seats.iter().find(|s| s.user_id == Some(bob)).unwrap();
        assert!(alice_seat.hole.is_some());
        assert!(bob_seat.hole.is_none());
        Ok(())
    }

    #[test]
    fn spectator_sees_no_hole_cards() {
        let (table, ..) = two_player_table();
        let view = masked_view(&table, None);
        assert!(view.seats.iter().all(|s| s.hole.is_none()));
    }
}
