use ph_cards::{best_hand, Card, GameKind, Strength};
use ph_core::{Chips, Seat};

use crate::player::Player;

/// One layer of the pot, owed only to the players who contributed to it.
struct SidePot {
    amount: Chips,
    eligible: Vec<Seat>,
}

/// A single seat's share of the showdown, for reporting back to callers.
#[derive(Debug, Clone)]
pub struct Payout {
    pub seat: Seat,
    pub amount: Chips,
}

/// Splits `players`' total contributions into side pots by commitment tier,
/// then awards each pot to the best hand(s) among its eligible, non-folded
/// contributors. A remainder chip within a pot goes to the eligible winner
/// seated nearest the left of `button`.
///
/// `boards` lets run-it-twice pass more than one community-card sequence;
/// each pot is split evenly across boards, and re-evaluated independently
/// on each.
pub fn settle(
    players: &mut [Player],
    boards: &[Vec<Card>],
    kind: GameKind,
    button: Seat,
) -> Vec<Payout> {
    let pots = side_pots(players);
    let mut totals: std::collections::HashMap<Seat, Chips> = std::collections::HashMap::new();

    for pot in &pots {
        let per_board = pot.amount / boards.len() as Chips;
        let mut remainder = pot.amount - per_board * boards.len() as Chips;
        for board in boards {
            let share_pot = per_board + std::mem::take(&mut remainder);
            for (seat, amount) in award(players, &pot.eligible, board, kind, button, share_pot) {
                *totals.entry(seat).or_insert(0) += amount;
            }
        }
    }

    for (seat, amount) in &totals {
        if let Some(p) = players.iter_mut().find(|p| p.seat == *seat) {
            p.stack += amount;
        }
    }

    let mut payouts: Vec<Payout> = totals
        .into_iter()
        .map(|(seat, amount)| Payout { seat, amount })
        .collect();
    payouts.sort_by_key(|p| p.seat);
    payouts
}

fn award(
    players: &[Player],
    eligible: &[Seat],
    board: &[Card],
    kind: GameKind,
    button: Seat,
    pot: Chips,
) -> Vec<(Seat, Chips)> {
    let contenders: Vec<&Player> = players
        .iter()
        .filter(|p| !p.folded && eligible.contains(&p.seat))
        .collect();
    if contenders.is_empty() || pot == 0 {
        return Vec::new();
    }

    let ranked: Vec<(Seat, Strength)> = contenders
        .iter()
        .map(|p| (p.seat, best_hand(&p.hole, board, kind)))
        .collect();
    let best = ranked.iter().map(|(_, s)| *s).max().expect("non-empty contenders");
    let mut winners: Vec<Seat> = ranked
        .into_iter()
        .filter(|(_, s)| *s == best)
        .map(|(seat, _)| seat)
        .collect();
    winners.sort_by_key(|&seat| left_of_button_order(seat, button, max_seat(players)));

    let share = pot / winners.len() as Chips;
    let mut remainder = pot - share * winners.len() as Chips;
    winners
        .into_iter()
        .map(|seat| {
            let bonus = if remainder > 0 {
                remainder -= 1;
                1
            } else {
                0
            };
            (seat, share + bonus)
        })
        .collect()
}

fn max_seat(players: &[Player]) -> Seat {
    players.iter().map(|p| p.seat).max().unwrap_or(0) + 1
}

/// Distance travelling clockwise from `button`, used to find the seat
/// nearest the left of the button among tied winners.
fn left_of_button_order(seat: Seat, button: Seat, ring: Seat) -> Seat {
    (seat + ring - button - 1) % ring
}

fn side_pots(players: &[Player]) -> Vec<SidePot> {
    let mut tiers: Vec<Chips> = players
        .iter()
        .filter(|p| p.total_committed > 0)
        .map(|p| p.total_committed)
        .collect();
    tiers.sort_unstable();
    tiers.dedup();

    let mut pots = Vec::new();
    let mut floor = 0;
    for tier in tiers {
        let layer = tier - floor;
        let contributors: Vec<&Player> = players
            .iter()
            .filter(|p| p.total_committed >= tier)
            .collect();
        let amount = layer * contributors.len() as Chips;
        if amount > 0 {
            let eligible = contributors
                .iter()
                .filter(|p| !p.folded)
                .map(|p| p.seat)
                .collect();
            pots.push(SidePot { amount, eligible });
        }
        floor = tier;
    }
    pots
}

#[cfg(test)]
mod tests {
    use super::*;
    use ph_cards::{Card, Rank, Suit};

    fn player(seat: Seat, total_committed: Chips, folded: bool) -> Player {
        let mut p = Player::new(seat as u32, seat, format!("p{seat}"), 0, None, None);
        p.total_committed = total_committed;
        p.folded = folded;
        p.in_hand = true;
        p
    }

    #[test]
    fn single_pot_splits_evenly_with_remainder_left_of_button() {
        let mut players = vec![player(0, 10, false), player(1, 10, false), player(2, 10, false)];
        players[0].hole = vec![Card::from((Rank::Ace, Suit::Spade)), Card::from((Rank::Ace, Suit::Heart))];
        players[1].hole = vec![Card::from((Rank::Ace, Suit::Diamond)), Card::from((Rank::Ace, Suit::Club))];
        players[2].hole = vec![Card::from((Rank::Two, Suit::Spade)), Card::from((Rank::Three, Suit::Heart))];
        let board = vec![
            Card::from((Rank::King, Suit::Spade)),
            Card::from((Rank::Queen, Suit::Diamond)),
            Card::from((Rank::Jack, Suit::Club)),
            Card::from((Rank::Nine, Suit::Heart)),
            Card::from((Rank::Four, Suit::Club)),
        ];
        // Quad aces tie between seat 0 and seat 1; 30-chip pot splits 15/15.
        let payouts = settle(&mut players, &[board], GameKind::Holdem, 2);
        let total: Chips = payouts.iter().map(|p| p.amount).sum();
        assert_eq!(total, 30);
        assert_eq!(payouts.len(), 2);
    }

    #[test]
    fn side_pot_excludes_folded_contributions_from_eligibility() {
        let players = vec![player(0, 20, true), player(1, 10, false), player(2, 10, false)];
        let pots = side_pots(&players);
        let total: Chips = pots.iter().map(|p| p.amount).sum();
        assert_eq!(total, 40);
        for pot in &pots {
            assert!(!pot.eligible.contains(&0));
        }
    }
}
