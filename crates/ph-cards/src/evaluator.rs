use super::card::Card;
use super::category::Category;
use super::hand::Hand;
use super::kickers::Kickers;
use super::rank::Rank;
use super::suit::Suit;

/// Evaluates a hand of five to seven cards by bitwise search rather than
/// enumerating five-card subsets. Works equally well on a five-card Omaha
/// combination or a full seven-card Hold'em hand.
pub struct Evaluator(Hand);

impl From<Hand> for Evaluator {
    fn from(h: Hand) -> Self {
        Self(h)
    }
}
impl From<&[Card]> for Evaluator {
    fn from(cards: &[Card]) -> Self {
        Self(Hand::from(cards))
    }
}

/// Category detectors in strength order, highest first. A plain `find_map`
/// over this table replaces the old hand-written `or_else` chain, and lets
/// the four "N of a kind" cases share one parameterized entry point instead
/// of four near-identical methods.
const DETECTORS: [fn(&Evaluator) -> Option<Category>; 8] = [
    Evaluator::find_flush,
    |e| e.find_group(4),
    Evaluator::find_full_house,
    Evaluator::find_straight,
    |e| e.find_group(3),
    Evaluator::find_two_pair,
    |e| e.find_group(2),
    |e| e.find_group(1),
];

impl Evaluator {
    pub fn find_category(&self) -> Category {
        DETECTORS
            .iter()
            .find_map(|detect| detect(self))
            .expect("at least one card in hand")
    }

    pub fn find_kickers(&self, category: Category) -> Kickers {
        let (count, mask) = match category {
            Category::HighCard(hi) => (4, u16::from(hi)),
            Category::OnePair(hi) => (3, u16::from(hi)),
            Category::ThreeOfAKind(hi) => (2, u16::from(hi)),
            Category::FourOfAKind(hi) => (1, u16::from(hi)),
            Category::TwoPair(hi, lo) => (1, u16::from(hi) | u16::from(lo)),
            _ => return Kickers::from(0u16),
        };
        let mut bits = mask & self.rank_masks();
        while bits.count_ones() > count {
            bits &= !(1 << bits.trailing_zeros());
        }
        Kickers::from(bits)
    }

    /// `size` of the same rank, the best one present: pairs, trips, quads
    /// and (trivially) the single best card all go through here with the
    /// matching [`Category`] constructor.
    fn find_group(&self, size: usize) -> Option<Category> {
        let ctor = match size {
            1 => Category::HighCard,
            2 => Category::OnePair,
            3 => Category::ThreeOfAKind,
            4 => Category::FourOfAKind,
            _ => unreachable!("group size out of range"),
        };
        self.rank_of_group(size, None).map(ctor)
    }

    fn find_two_pair(&self) -> Option<Category> {
        let hi = self.rank_of_group(2, None)?;
        match self.rank_of_group(2, Some(hi)) {
            Some(lo) => Some(Category::TwoPair(hi, lo)),
            None => Some(Category::OnePair(hi)),
        }
    }

    fn find_full_house(&self) -> Option<Category> {
        let trips = self.rank_of_group(3, None)?;
        let pair = self.rank_of_group(2, Some(trips))?;
        Some(Category::FullHouse(trips, pair))
    }

    fn find_straight(&self) -> Option<Category> {
        self.rank_of_straight(self.rank_masks()).map(Category::Straight)
    }

    fn find_flush(&self) -> Option<Category> {
        let suit = self.suit_of_flush()?;
        let flushed = self.suit_masks()[suit as usize];
        match self.rank_of_straight(flushed) {
            Some(Rank::Ace) => Some(Category::RoyalFlush),
            Some(high) => Some(Category::StraightFlush(high)),
            None => Some(Category::Flush(Rank::from(flushed))),
        }
    }

    /// Highest rank that begins a run of five consecutive set bits,
    /// treating an ace as both high and low for the wheel (A-2-3-4-5).
    fn rank_of_straight(&self, ranks: u16) -> Option<Rank> {
        const WHEEL: u16 = 0b_1_0000_0000_1111;
        let mut bits = ranks;
        for _ in 0..4 {
            bits &= bits << 1;
        }
        if bits > 0 {
            Some(Rank::from(bits))
        } else if ranks & WHEEL == WHEEL {
            Some(Rank::Five)
        } else {
            None
        }
    }

    fn suit_of_flush(&self) -> Option<Suit> {
        self.suit_count().iter().position(|&n| n >= 5).map(|i| Suit::from(i as u8))
    }

    /// Best rank at which at least `size` cards of that rank are present,
    /// optionally restricted to ranks strictly below `ceiling`. Walks ranks
    /// from the ceiling down, pulling each rank's 4-bit nibble out of the
    /// packed hand and counting the bits set in it.
    fn rank_of_group(&self, size: usize, ceiling: Option<Rank>) -> Option<Rank> {
        let top = ceiling.map(u8::from).unwrap_or(13);
        let hand = u64::from(self.0);
        (0..top).rev().find_map(|rank| {
            let held = (hand >> (4 * rank as u64)) & 0b1111;
            (held.count_ones() as usize >= size).then(|| Rank::from(rank))
        })
    }

    /// Which ranks appear in the hand, irrespective of suit.
    fn rank_masks(&self) -> u16 {
        Vec::<Card>::from(self.0)
            .iter()
            .map(|c| u16::from(c.rank()))
            .fold(0, |acc, r| acc | r)
    }
    /// How many cards of each suit are present.
    fn suit_count(&self) -> [u8; 4] {
        Vec::<Card>::from(self.0)
            .iter()
            .map(|c| u8::from(c.suit()))
            .fold([0; 4], |mut counts, s| {
                counts[s as usize] += 1;
                counts
            })
    }
    /// Which ranks are present, grouped by suit.
    fn suit_masks(&self) -> [u16; 4] {
        Vec::<Card>::from(self.0)
            .iter()
            .map(|c| (u8::from(c.suit()), u16::from(c.rank())))
            .fold([0; 4], |mut suits, (s, r)| {
                suits[s as usize] |= r;
                suits
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suit::Suit;

    fn category(cards: Vec<(Rank, Suit)>) -> Category {
        let cards: Vec<Card> = cards.into_iter().map(Card::from).collect();
        Evaluator::from(cards.as_slice()).find_category()
    }

    #[test]
    fn high_card() {
        let hand = vec![
            (Rank::Ace, Suit::Spade),
            (Rank::King, Suit::Heart),
            (Rank::Queen, Suit::Diamond),
            (Rank::Jack, Suit::Club),
            (Rank::Nine, Suit::Spade),
        ];
        assert_eq!(category(hand), Category::HighCard(Rank::Ace));
    }

    #[test]
    fn two_pair_from_seven_cards() {
        let hand = vec![
            (Rank::Ace, Suit::Spade),
            (Rank::Ace, Suit::Heart),
            (Rank::King, Suit::Diamond),
            (Rank::King, Suit::Club),
            (Rank::Queen, Suit::Spade),
            (Rank::Jack, Suit::Heart),
            (Rank::Nine, Suit::Diamond),
        ];
        assert_eq!(category(hand), Category::TwoPair(Rank::Ace, Rank::King));
    }

    #[test]
    fn three_pair_keeps_only_the_best_two() {
        let hand = vec![
            (Rank::Ace, Suit::Spade),
            (Rank::Ace, Suit::Heart),
            (Rank::King, Suit::Diamond),
            (Rank::King, Suit::Club),
            (Rank::Queen, Suit::Spade),
            (Rank::Queen, Suit::Heart),
            (Rank::Jack, Suit::Diamond),
        ];
        assert_eq!(category(hand), Category::TwoPair(Rank::Ace, Rank::King));
    }

    #[test]
    fn wheel_straight_ranks_five_high() {
        let hand = vec![
            (Rank::Ace, Suit::Spade),
            (Rank::Two, Suit::Heart),
            (Rank::Three, Suit::Diamond),
            (Rank::Four, Suit::Club),
            (Rank::Five, Suit::Spade),
        ];
        assert_eq!(category(hand), Category::Straight(Rank::Five));
    }

    #[test]
    fn wheel_straight_flush_is_not_royal() {
        let hand = vec![
            (Rank::Ace, Suit::Spade),
            (Rank::Two, Suit::Spade),
            (Rank::Three, Suit::Spade),
            (Rank::Four, Suit::Spade),
            (Rank::Five, Suit::Spade),
        ];
        assert_eq!(category(hand), Category::StraightFlush(Rank::Five));
    }

    #[test]
    fn broadway_straight_flush_is_royal() {
        let hand = vec![
            (Rank::Ten, Suit::Spade),
            (Rank::Jack, Suit::Spade),
            (Rank::Queen, Suit::Spade),
            (Rank::King, Suit::Spade),
            (Rank::Ace, Suit::Spade),
        ];
        assert_eq!(category(hand), Category::RoyalFlush);
    }

    #[test]
    fn full_house_beats_flush() {
        let hand = vec![
            (Rank::Ace, Suit::Spade),
            (Rank::Ace, Suit::Heart),
            (Rank::Ace, Suit::Diamond),
            (Rank::King, Suit::Spade),
            (Rank::King, Suit::Heart),
            (Rank::Queen, Suit::Spade),
            (Rank::Jack, Suit::Spade),
        ];
        assert_eq!(category(hand), Category::FullHouse(Rank::Ace, Rank::King));
    }

    #[test]
    fn four_of_a_kind_beats_full_house() {
        let hand = vec![
            (Rank::Ace, Suit::Spade),
            (Rank::Ace, Suit::Heart),
            (Rank::Ace, Suit::Diamond),
            (Rank::Ace, Suit::Club),
            (Rank::King, Suit::Spade),
            (Rank::King, Suit::Heart),
            (Rank::Queen, Suit::Diamond),
        ];
        assert_eq!(category(hand), Category::FourOfAKind(Rank::Ace));
    }

    #[test]
    fn category_ordering_is_total() {
        assert!(Category::HighCard(Rank::Ace) < Category::OnePair(Rank::Two));
        assert!(Category::StraightFlush(Rank::King) < Category::RoyalFlush);
        assert!(Category::FourOfAKind(Rank::Two) < Category::StraightFlush(Rank::Two));
    }

    #[test]
    fn kickers_for_one_pair_keep_best_three_side_cards() {
        let hand = vec![
            (Rank::Ace, Suit::Spade),
            (Rank::Ace, Suit::Heart),
            (Rank::King, Suit::Diamond),
            (Rank::Queen, Suit::Club),
            (Rank::Jack, Suit::Spade),
            (Rank::Nine, Suit::Heart),
            (Rank::Two, Suit::Diamond),
        ];
        let cards: Vec<Card> = hand.into_iter().map(Card::from).collect();
        let evaluator = Evaluator::from(cards.as_slice());
        let category = evaluator.find_category();
        assert_eq!(category, Category::OnePair(Rank::Ace));
        let kickers = evaluator.find_kickers(category);
        let expect = u16::from(Rank::King) | u16::from(Rank::Queen) | u16::from(Rank::Jack);
        assert_eq!(kickers, Kickers::from(expect));
    }
}
