use super::rank::Rank;
use std::fmt::{Display, Formatter, Result};

/// A hand's category, independent of kickers. Declaration order is
/// ascending strength, so the derived `Ord` does the right thing; `RoyalFlush`
/// is its own variant rather than `StraightFlush(Ace)` so it prints and
/// matches distinctly at showdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Category {
    HighCard(Rank),
    OnePair(Rank),
    TwoPair(Rank, Rank),
    ThreeOfAKind(Rank),
    Straight(Rank),
    Flush(Rank),
    FullHouse(Rank, Rank),
    FourOfAKind(Rank),
    StraightFlush(Rank),
    RoyalFlush,
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            Category::HighCard(r) => write!(f, "high card, {r} high"),
            Category::OnePair(r) => write!(f, "pair of {r}s"),
            Category::TwoPair(hi, lo) => write!(f, "two pair, {hi}s and {lo}s"),
            Category::ThreeOfAKind(r) => write!(f, "three of a kind, {r}s"),
            Category::Straight(r) => write!(f, "straight, {r} high"),
            Category::Flush(r) => write!(f, "flush, {r} high"),
            Category::FullHouse(hi, lo) => write!(f, "full house, {hi}s full of {lo}s"),
            Category::FourOfAKind(r) => write!(f, "four of a kind, {r}s"),
            Category::StraightFlush(r) => write!(f, "straight flush, {r} high"),
            Category::RoyalFlush => write!(f, "royal flush"),
        }
    }
}
