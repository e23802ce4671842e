// 9.0: price feed seam. the engine never polls for prices; something outside
// reads a feed and pushes quotes in through update_pair_price. This trait is
// the shape that something has to have, plus a programmable mock the sim
// binary and tests drive.

use crate::math::Fixed;
use crate::types::PairId;
use rust_decimal::Decimal;
use std::collections::HashMap;

pub trait PriceFeed {
    /// Latest validated price for a pair, if the feed knows it.
    fn current_price(&self, pair: PairId) -> Option<Fixed>;
}

#[derive(Debug, Default)]
pub struct MockPriceFeed {
    prices: HashMap<PairId, Fixed>,
}

impl MockPriceFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_price(&mut self, pair: PairId, price: Fixed) {
        self.prices.insert(pair, price);
    }

    /// Move a stored price by a signed percent, for scripted scenarios.
    pub fn drift(&mut self, pair: PairId, percent: Decimal) -> Option<Fixed> {
        let current = self.prices.get(&pair)?;
        let factor = Decimal::ONE + percent / Decimal::from(100u32);
        let moved = Fixed::new(current.value() * factor)?;
        self.prices.insert(pair, moved);
        Some(moved)
    }
}

impl PriceFeed for MockPriceFeed {
    fn current_price(&self, pair: PairId) -> Option<Fixed> {
        self.prices.get(&pair).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn mock_feed_serves_set_prices() {
        let mut feed = MockPriceFeed::new();
        assert!(feed.current_price(PairId(1)).is_none());

        feed.set_price(PairId(1), Fixed::new(dec!(50000)).unwrap());
        assert_eq!(
            feed.current_price(PairId(1)).unwrap().value(),
            dec!(50000)
        );
    }

    #[test]
    fn drift_moves_by_percent() {
        let mut feed = MockPriceFeed::new();
        feed.set_price(PairId(1), Fixed::new(dec!(200)).unwrap());

        let up = feed.drift(PairId(1), dec!(10)).unwrap();
        assert_eq!(up.value(), dec!(220));

        let down = feed.drift(PairId(1), dec!(-50)).unwrap();
        assert_eq!(down.value(), dec!(110));
    }

    #[test]
    fn drift_below_zero_is_refused() {
        let mut feed = MockPriceFeed::new();
        feed.set_price(PairId(1), Fixed::new(dec!(100)).unwrap());
        assert!(feed.drift(PairId(1), dec!(-150)).is_none());
    }
}
