use super::category::Category;
use super::evaluator::Evaluator;
use super::hand::Hand;
use super::kickers::Kickers;
use std::fmt::{Display, Formatter, Result};

/// The full comparable value of a hand: category first, kickers to break
/// ties within a category. Field order matters for the derived `Ord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Strength {
    category: Category,
    kickers: Kickers,
}

impl Strength {
    pub fn category(&self) -> Category {
        self.category
    }
}

impl From<Hand> for Strength {
    fn from(hand: Hand) -> Self {
        Self::from(Evaluator::from(hand))
    }
}
impl From<&[super::card::Card]> for Strength {
    fn from(cards: &[super::card::Card]) -> Self {
        Self::from(Evaluator::from(cards))
    }
}
impl From<Evaluator> for Strength {
    fn from(e: Evaluator) -> Self {
        let category = e.find_category();
        let kickers = e.find_kickers(category);
        Self { category, kickers }
    }
}

impl Display for Strength {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "{}", self.category)
    }
}
