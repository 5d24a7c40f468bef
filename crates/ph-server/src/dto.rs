//! Wire DTOs: request bodies for the HTTP command surface and the tagged
//! `ServerMessage` frames sent down the websocket channel.

use ph_cards::GameKind;
use ph_core::{marker, Chips, Seat, ID};
use ph_engine::{Action, Street};
use ph_session::{ChatMessage, Frame, SeatView, TableView};
use serde::{Deserialize, Serialize};

/// Placeholder sent in place of a card a viewer isn't entitled to see.
pub const MASKED_CARD: &str = "??";

#[derive(Debug, Deserialize)]
pub struct CreateTableRequest {
    pub club: ID<marker::Club>,
    pub max_seats: Seat,
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub game_kind: GameKind,
    pub name: Option<String>,
    pub bomb_pot_every_n_hands: Option<u64>,
    pub bomb_pot_amount: Option<Chips>,
}

#[derive(Debug, Serialize)]
pub struct CreateTableResponse {
    pub table_id: ID<marker::Table>,
}

#[derive(Debug, Deserialize)]
pub struct SitRequest {
    pub seat: Option<Seat>,
    pub buy_in: Chips,
}

#[derive(Debug, Serialize)]
pub struct SitResponse {
    pub player_id: u32,
    pub seat: Seat,
}

#[derive(Debug, Deserialize)]
pub struct ChangeSeatRequest {
    pub seat: Seat,
}

#[derive(Debug, Serialize)]
pub struct LeaveResponse {
    pub seat: Option<Seat>,
    pub returned_amount: Option<Chips>,
    pub pending: bool,
}

/// `action` is one of `fold`, `check`, `call`, `raise_to`; `amount` is
/// required only for `raise_to`.
#[derive(Debug, Deserialize)]
pub struct ActRequest {
    pub player_id: u32,
    pub action: String,
    pub amount: Option<Chips>,
}

impl ActRequest {
    pub fn to_action(&self) -> ph_core::Result<Action> {
        match self.action.as_str() {
            "fold" => Ok(Action::Fold),
            "check" => Ok(Action::Check),
            "call" => Ok(Action::Call),
            "raise_to" => {
                let amount = self
                    .amount
                    .ok_or_else(|| ph_core::Error::invalid("raise_to requires an amount"))?;
                Ok(Action::RaiseTo(amount))
            }
            other => Err(ph_core::Error::invalid(format!("unknown action '{other}'"))),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RunoutRequest {
    pub player_id: u32,
    pub count: u8,
}

#[derive(Debug, Deserialize)]
pub struct RunoutResponseRequest {
    pub player_id: u32,
    pub accept: bool,
}

#[derive(Debug, Serialize)]
pub struct OnlineCountResponse {
    pub n: usize,
}

// ---------------------------------------------------------------------
// Channel frames
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    TableState(TableStateDto),
    ChatHistory { messages: Vec<ChatMessageDto> },
    ChatMessage(ChatMessageDto),
}

impl ServerMessage {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("serialize server message")
    }
}

impl From<Frame> for ServerMessage {
    fn from(frame: Frame) -> Self {
        match frame {
            Frame::TableState(view) => ServerMessage::TableState(TableStateDto::from(view)),
            Frame::ChatHistory(messages) => ServerMessage::ChatHistory {
                messages: messages.into_iter().map(ChatMessageDto::from).collect(),
            },
            Frame::ChatMessage(message) => ServerMessage::ChatMessage(ChatMessageDto::from(message)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessageDto {
    pub id: u64,
    pub user_id: ID<marker::User>,
    pub username: String,
    pub message: String,
    pub timestamp: i64,
}

impl From<ChatMessage> for ChatMessageDto {
    fn from(m: ChatMessage) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            username: m.username,
            message: m.message,
            timestamp: m.timestamp,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    ChatMessage { message: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableStateDto {
    pub table_id: ID<marker::Table>,
    pub hand_number: u64,
    pub street: Street,
    pub board: Vec<String>,
    pub pot: Chips,
    pub current_bet: Chips,
    pub button: Option<Seat>,
    pub next_to_act: Option<Seat>,
    pub action_closing_seat: Option<Seat>,
    pub action_deadline_millis_remaining: Option<u64>,
    pub seats: Vec<SeatDto>,
}

impl From<TableView> for TableStateDto {
    fn from(view: TableView) -> Self {
        Self {
            table_id: view.table_id,
            hand_number: view.hand_number,
            street: view.street,
            board: view.board.iter().map(|c| c.to_string()).collect(),
            pot: view.pot,
            current_bet: view.current_bet,
            button: view.button,
            next_to_act: view.next_to_act,
            action_closing_seat: view.action_closing_seat,
            action_deadline_millis_remaining: view.action_deadline_millis_remaining,
            seats: view.seats.into_iter().map(SeatDto::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SeatDto {
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
    /// Cleartext two-character notation per visible card, or [`MASKED_CARD`]
    /// tokens of the same length when the viewer isn't entitled to see them.
    pub hole: Option<Vec<String>>,
}

impl From<SeatView> for SeatDto {
    fn from(seat: SeatView) -> Self {
        let hole = match seat.hole {
            Some(cards) => Some(cards.iter().map(|c| c.to_string()).collect()),
            None if seat.in_hand => Some(vec![MASKED_CARD.to_string(); 2]),
            None => None,
        };
        Self {
            seat: seat.seat,
            user_id: seat.user_id,
            name: seat.name,
            avatar: seat.avatar,
            stack: seat.stack,
            committed: seat.committed,
            in_hand: seat.in_hand,
            folded: seat.folded,
            all_in: seat.all_in,
            sitting_out: seat.sitting_out,
            hole,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ph_cards::Card;

    fn seat_view(hole: Option<Vec<Card>>, in_hand: bool) -> SeatView {
        SeatView {
            seat: 0,
            user_id: Some(ID::default()),
            name: "alice".into(),
            avatar: None,
            stack: 100,
            committed: 0,
            in_hand,
            folded: false,
            all_in: false,
            sitting_out: false,
            hole,
        }
    }

    #[test]
    fn own_seat_shows_cleartext_cards() {
        let hole = vec![Card::try_from("As").unwrap(), Card::try_from("Kd").unwrap()];
        let dto = SeatDto::from(seat_view(Some(hole), true));
        assert_eq!(dto.hole, Some(vec!["As".to_string(), "Kd".to_string()]));
    }

    #[test]
    fn others_seat_in_hand_shows_masked_placeholders() {
        let dto = SeatDto::from(seat_view(None, true));
        assert_eq!(dto.hole, Some(vec![MASKED_CARD.to_string(), MASKED_CARD.to_string()]));
    }

    #[test]
    fn seat_not_in_hand_shows_no_cards() {
        let dto = SeatDto::from(seat_view(None, false));
        assert_eq!(dto.hole, None);
    }

    #[test]
    fn act_request_rejects_raise_without_amount() {
        let req = ActRequest {
            player_id: 0,
            action: "raise_to".into(),
            amount: None,
        };
        assert!(req.to_action().is_err());
    }

    #[test]
    fn act_request_rejects_unknown_action() {
        let req = ActRequest {
            player_id: 0,
            action: "bluff".into(),
            amount: None,
        };
        assert!(req.to_action().is_err());
    }
}
