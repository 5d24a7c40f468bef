use super::card::Card;
use ph_core::Error;
use rand::seq::SliceRandom;

/// A shuffled 52-card deck. Each draw removes the card permanently; call
/// [`Deck::reset`] to refill and reshuffle between hands.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn new() -> Self {
        let mut deck = Self {
            cards: (0..52).map(Card::from).collect(),
        };
        deck.shuffle();
        deck
    }

    /// Removes and returns the top card. Errors once the deck is exhausted,
    /// which should never happen inside a single hand of nine players.
    pub fn deal_one(&mut self) -> Result<Card, Error> {
        self.cards
            .pop()
            .ok_or_else(|| Error::illegal("deck is empty"))
    }

    /// Refills to a full 52-card deck and reshuffles.
    pub fn reset(&mut self) {
        self.cards = (0..52).map(Card::from).collect();
        self.shuffle();
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    fn shuffle(&mut self) {
        let mut rng = rand::rng();
        self.cards.shuffle(&mut rng);
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deals_all_fifty_two_before_failing() {
        let mut deck = Deck::new();
        for _ in 0..52 {
            assert!(deck.deal_one().is_ok());
        }
        assert!(deck.deal_one().is_err());
    }

    #[test]
    fn reset_refills_the_deck() {
        let mut deck = Deck::new();
        for _ in 0..52 {
            deck.deal_one().unwrap();
        }
        deck.reset();
        assert_eq!(deck.remaining(), 52);
    }
}
