//! Trading pair registry entries.
//!
//! A pair is the tradable view of one market: the latest posted price, an
//! active flag, and the leverage ceiling the pair itself allows. Prices are
//! pushed in from the price feed; a pair whose price was never posted keeps
//! the zero sentinel and is not tradable.

use crate::math::Fixed;
use crate::types::{Leverage, PairId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingPair {
    pub id: PairId,
    /// Human-readable symbol (e.g., "BTC-USD")
    pub symbol: String,
    /// Latest posted price. Zero is the sentinel for "never priced".
    pub current_price: Fixed,
    /// Paused pairs reject new positions; existing ones can still close.
    pub is_active: bool,
    /// Leverage ceiling for this pair, independent of any user's own cap
    pub max_leverage: Leverage,
}

impl TradingPair {
    pub fn new(id: PairId, symbol: impl Into<String>, max_leverage: Leverage) -> Self {
        Self {
            id,
            symbol: symbol.into(),
            current_price: Fixed::ZERO,
            is_active: true,
            max_leverage,
        }
    }

    /// Default BTC-USD practice pair
    pub fn btc_usd() -> Self {
        Self::new(PairId(1), "BTC-USD", Leverage::new_unchecked(100))
    }

    /// Default ETH-USD practice pair with a tighter leverage ceiling
    pub fn eth_usd() -> Self {
        Self::new(PairId(2), "ETH-USD", Leverage::new_unchecked(50))
    }

    pub fn has_price(&self) -> bool {
        !self.current_price.is_zero()
    }

    /// Open-path check: priced and not paused
    pub fn is_tradable(&self) -> bool {
        self.has_price() && self.is_active
    }
}
