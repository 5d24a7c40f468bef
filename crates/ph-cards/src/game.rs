use super::card::Card;
use super::strength::Strength;

/// Which showdown rule applies: Hold'em lets a hand use any mix of its
/// two hole cards and the board, Omaha requires exactly two hole cards and
/// three board cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    Holdem,
    Omaha,
}

impl GameKind {
    pub fn is_holdem(&self) -> bool {
        matches!(self, GameKind::Holdem)
    }
}

/// Finds the best five-card hand a player can make from their hole cards
/// and the board, under the rules of `kind`.
///
/// Hold'em needs no combinatorics: the bitwise evaluator already finds the
/// best five cards out of an arbitrary five-to-seven card set. Omaha's
/// "exactly two hole, exactly three board" constraint does need
/// enumeration, so every combination is evaluated and the best kept.
pub fn best_hand(hole: &[Card], board: &[Card], kind: GameKind) -> Strength {
    match kind {
        GameKind::Holdem => {
            let mut cards = hole.to_vec();
            cards.extend_from_slice(board);
            Strength::from(cards.as_slice())
        }
        GameKind::Omaha => combinations(hole, 2)
            .flat_map(|two| {
                combinations(board, 3).map(move |three| {
                    let mut five = two.clone();
                    five.extend_from_slice(&three);
                    Strength::from(five.as_slice())
                })
            })
            .max()
            .expect("omaha requires at least 2 hole cards and 3 board cards"),
    }
}

fn combinations(cards: &[Card], k: usize) -> impl Iterator<Item = Vec<Card>> + '_ {
    let n = cards.len();
    let mut indices: Vec<usize> = (0..k).collect();
    let mut done = k == 0 || k > n;
    std::iter::from_fn(move || {
        if done {
            return None;
        }
        let picked: Vec<Card> = indices.iter().map(|&i| cards[i]).collect();
        let mut i = k;
        loop {
            if i == 0 {
                done = true;
                break;
            }
            i -= 1;
            if indices[i] != i + n - k {
                indices[i] += 1;
                for j in i + 1..k {
                    indices[j] = indices[j - 1] + 1;
                }
                break;
            }
        }
        Some(picked)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rank::Rank;
    use crate::suit::Suit;

    #[test]
    fn combinations_counts_match_binomial() {
        let cards: Vec<Card> = (0..5).map(Card::from).collect();
        assert_eq!(combinations(&cards, 3).count(), 10);
        let cards: Vec<Card> = (0..4).map(Card::from).collect();
        assert_eq!(combinations(&cards, 2).count(), 6);
    }

    #[test]
    fn omaha_must_use_exactly_two_hole_cards() {
        // Four-flush in the hole with only one suited card on board: a
        // Hold'em evaluator fed the raw union would call this a flush, but
        // Omaha's 2-and-3 rule forbids it.
        let hole = vec![
            Card::from((Rank::Ace, Suit::Spade)),
            Card::from((Rank::King, Suit::Spade)),
            Card::from((Rank::Two, Suit::Heart)),
            Card::from((Rank::Three, Suit::Heart)),
        ];
        let board = vec![
            Card::from((Rank::Queen, Suit::Spade)),
            Card::from((Rank::Jack, Suit::Spade)),
            Card::from((Rank::Nine, Suit::Diamond)),
            Card::from((Rank::Four, Suit::Club)),
            Card::from((Rank::Five, Suit::Club)),
        ];
        let strength = best_hand(&hole, &board, GameKind::Omaha);
        assert!(!matches!(
            strength.category(),
            crate::category::Category::Flush(_)
        ));
    }

    #[test]
    fn holdem_uses_best_five_of_seven() {
        let hole = vec![
            Card::from((Rank::Ace, Suit::Spade)),
            Card::from((Rank::Ace, Suit::Heart)),
        ];
        let board = vec![
            Card::from((Rank::King, Suit::Diamond)),
            Card::from((Rank::King, Suit::Club)),
            Card::from((Rank::Queen, Suit::Spade)),
            Card::from((Rank::Jack, Suit::Heart)),
            Card::from((Rank::Nine, Suit::Diamond)),
        ];
        let strength = best_hand(&hole, &board, GameKind::Holdem);
        assert_eq!(
            strength.category(),
            crate::category::Category::TwoPair(Rank::Ace, Rank::King)
        );
    }
}
