//! Pair listing, price updates, and pause control.

use super::core::Engine;
use super::results::EngineError;
use crate::events::{EventPayload, PairPriceUpdatedEvent, PairStatusChangedEvent};
use crate::math::Fixed;
use crate::pair::TradingPair;
use crate::types::PairId;

impl Engine {
    /// List a new trading pair. The pair stays untradable until its first
    /// price update.
    pub fn add_pair(&mut self, pair: TradingPair) -> Result<PairId, EngineError> {
        self.guard.enter()?;
        let result = self.add_pair_inner(pair);
        self.guard.exit();
        result
    }

    fn add_pair_inner(&mut self, pair: TradingPair) -> Result<PairId, EngineError> {
        let pair_id = pair.id;
        if self.pairs.contains_key(&pair_id) {
            return Err(EngineError::PairAlreadyExists(pair_id));
        }
        self.pairs.insert(pair_id, pair);
        Ok(pair_id)
    }

    /// Post a new price for `pair_id`, as if from an oracle.
    pub fn update_pair_price(
        &mut self,
        pair_id: PairId,
        price: Fixed,
    ) -> Result<(), EngineError> {
        self.guard.enter()?;
        let result = self.update_pair_price_inner(pair_id, price);
        self.guard.exit();
        result
    }

    fn update_pair_price_inner(
        &mut self,
        pair_id: PairId,
        price: Fixed,
    ) -> Result<(), EngineError> {
        let pair = self
            .pairs
            .get_mut(&pair_id)
            .ok_or(EngineError::InvalidTradingPair(pair_id))?;
        if price.is_zero() {
            return Err(EngineError::InvalidPrice(pair_id));
        }

        let old_price = pair.current_price;
        pair.current_price = price;

        self.emit_event(EventPayload::PairPriceUpdated(PairPriceUpdatedEvent {
            pair_id,
            old_price,
            new_price: price,
        }));

        Ok(())
    }

    /// Pause or resume a pair. A paused pair rejects opens; closes still go
    /// through so nobody is trapped in a position.
    pub fn set_pair_active(&mut self, pair_id: PairId, active: bool) -> Result<(), EngineError> {
        self.guard.enter()?;
        let result = self.set_pair_active_inner(pair_id, active);
        self.guard.exit();
        result
    }

    fn set_pair_active_inner(&mut self, pair_id: PairId, active: bool) -> Result<(), EngineError> {
        let pair = self
            .pairs
            .get_mut(&pair_id)
            .ok_or(EngineError::InvalidTradingPair(pair_id))?;
        pair.is_active = active;

        self.emit_event(EventPayload::PairStatusChanged(PairStatusChangedEvent {
            pair_id,
            is_active: active,
        }));

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::EngineConfig;
    use super::*;
    use crate::events::EventPayload;

    fn engine_with_btc() -> Engine {
        let mut engine = Engine::new(EngineConfig::default());
        engine.add_pair(TradingPair::btc_usd()).unwrap();
        engine
    }

    #[test]
    fn listing_twice_rejected() {
        let mut engine = engine_with_btc();
        let err = engine.add_pair(TradingPair::btc_usd()).unwrap_err();
        assert!(matches!(err, EngineError::PairAlreadyExists(PairId(1))));
    }

    #[test]
    fn price_update_records_old_and_new() {
        let mut engine = engine_with_btc();
        engine
            .update_pair_price(PairId(1), Fixed::from_int(100))
            .unwrap();
        engine
            .update_pair_price(PairId(1), Fixed::from_int(105))
            .unwrap();

        let pair = engine.get_pair(PairId(1)).unwrap();
        assert_eq!(pair.current_price, Fixed::from_int(105));

        match &engine.events()[1].payload {
            EventPayload::PairPriceUpdated(e) => {
                assert_eq!(e.old_price, Fixed::from_int(100));
                assert_eq!(e.new_price, Fixed::from_int(105));
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn zero_price_rejected() {
        let mut engine = engine_with_btc();
        assert!(matches!(
            engine.update_pair_price(PairId(1), Fixed::ZERO),
            Err(EngineError::InvalidPrice(PairId(1)))
        ));
        // pair still has no usable price
        assert!(!engine.get_pair(PairId(1)).unwrap().has_price());
    }

    #[test]
    fn unknown_pair_rejected() {
        let mut engine = engine_with_btc();
        assert!(matches!(
            engine.update_pair_price(PairId(99), Fixed::from_int(1)),
            Err(EngineError::InvalidTradingPair(PairId(99)))
        ));
    }

    #[test]
    fn pause_flips_status_and_emits() {
        let mut engine = engine_with_btc();
        engine.set_pair_active(PairId(1), false).unwrap();
        assert!(!engine.get_pair(PairId(1)).unwrap().is_active);

        assert!(matches!(
            engine.events()[0].payload,
            EventPayload::PairStatusChanged(PairStatusChangedEvent {
                pair_id: PairId(1),
                is_active: false,
            })
        ));

        engine.set_pair_active(PairId(1), true).unwrap();
        assert!(engine.get_pair(PairId(1)).unwrap().is_active);
    }
}
