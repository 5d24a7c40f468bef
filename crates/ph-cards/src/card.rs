use super::rank::Rank;
use super::suit::Suit;
use std::fmt::{Display, Formatter, Result};

/// A playing card packed into one byte: `rank * 4 + suit`.
///
/// The encoding sorts first by rank, then by suit within a rank, which is
/// exactly the order [`Deck::new`](super::deck::Deck::new) builds a fresh
/// deck in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct Card(u8);

impl Card {
    pub fn rank(&self) -> Rank {
        Rank::from(self.0 / 4)
    }
    pub fn suit(&self) -> Suit {
        Suit::from(self.0 % 4)
    }
}

impl From<(Rank, Suit)> for Card {
    fn from((r, s): (Rank, Suit)) -> Self {
        Self(u8::from(r) * 4 + u8::from(s))
    }
}

impl From<u8> for Card {
    fn from(n: u8) -> Self {
        Self(n)
    }
}
impl From<Card> for u8 {
    fn from(c: Card) -> u8 {
        c.0
    }
}

/// Single-bit isomorphism used by [`Hand`](super::hand::Hand).
impl From<Card> for u64 {
    fn from(c: Card) -> u64 {
        1 << u8::from(c)
    }
}

impl Display for Card {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "{}{}", self.rank(), self.suit())
    }
}

impl TryFrom<&str> for Card {
    type Error = String;
    fn try_from(s: &str) -> std::result::Result<Self, Self::Error> {
        let s = s.trim();
        if s.len() != 2 {
            return Err(format!("'{s}' is not a two-character card"));
        }
        let rank = Rank::try_from(&s[0..1])?;
        let suit = Suit::try_from(&s[1..2])?;
        Ok(Card::from((rank, suit)))
    }
}

impl Card {
    /// Parses whitespace-separated card notation like `"As Kd Tc"`.
    pub fn parse(s: &str) -> std::result::Result<Vec<Self>, String> {
        s.split_whitespace().map(Card::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_suit_roundtrip() {
        let card = Card::from((Rank::Jack, Suit::Spade));
        assert_eq!(card.rank(), Rank::Jack);
        assert_eq!(card.suit(), Suit::Spade);
    }

    #[test]
    fn parses_notation() {
        let cards = Card::parse("As Kd Tc").unwrap();
        assert_eq!(cards.len(), 3);
        assert_eq!(cards[0].to_string(), "As");
    }

    #[test]
    fn rejects_bad_notation() {
        assert!(Card::try_from("Zz").is_err());
        assert!(Card::try_from("A").is_err());
    }
}
