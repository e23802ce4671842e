//! Risk math: liquidation prices, PnL, fees, close settlement.
//!
//! Everything here is a pure function over already-validated inputs; the
//! engine calls them during the checks phase of open/close. All arithmetic
//! is checked, so an overflow or division by zero aborts the engine call
//! that asked instead of corrupting a balance.

use crate::math::{Fixed, MathError};
use crate::types::{Bps, Leverage, Side};
use serde::{Deserialize, Serialize};

// the liquidation move is quoted in bps-of-entry scaled by a further 100
const LIQ_SCALE: u64 = 1_000_000;
const BPS_SCALE: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskParams {
    pub maintenance_margin: Bps,
    /// close fee charged on collateral, profitable exits only
    pub trading_fee: Bps,
}

impl Default for RiskParams {
    fn default() -> Self {
        Self {
            maintenance_margin: Bps::new_unchecked(500),
            trading_fee: Bps::new_unchecked(50),
        }
    }
}

/// Price at which a position is force-closed.
///
/// `margin_factor = (10_000 − maintenance_margin_bps) / leverage`, and the
/// level sits `entry · margin_factor / 1_000_000` away from entry: below it
/// for longs, above it for shorts. Higher leverage divides the factor down,
/// so the level hugs the entry price tighter.
pub fn liquidation_price(
    entry_price: Fixed,
    side: Side,
    leverage: Leverage,
    maintenance_margin: Bps,
) -> Result<Fixed, MathError> {
    debug_assert!(!entry_price.is_zero(), "caller validates a posted price");

    let margin_factor = Fixed::from_int(u64::from(Bps::MAX - maintenance_margin.get()))
        .checked_div(leverage.as_fixed())?;
    let price_move = entry_price
        .checked_mul(margin_factor)?
        .checked_div(Fixed::from_int(LIQ_SCALE))?;

    match side {
        Side::Long => entry_price.checked_sub(price_move),
        Side::Short => entry_price.checked_add(price_move),
    }
}

/// Did the exit price reach the liquidation level? Touching it counts.
pub fn is_liquidated(side: Side, exit_price: Fixed, liquidation_price: Fixed) -> bool {
    match side {
        Side::Long => exit_price <= liquidation_price,
        Side::Short => exit_price >= liquidation_price,
    }
}

/// Magnitude-and-direction PnL, before fees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pnl {
    pub amount: Fixed,
    pub is_profit: bool,
}

/// PnL of a position marked at `exit_price`.
///
/// `size = collateral · leverage`; `amount = size · |exit − entry| / entry`.
/// Longs profit iff the price rose, shorts iff it fell; an unchanged price
/// is flat (zero amount, not a profit).
pub fn unrealized_pnl(
    collateral: Fixed,
    leverage: Leverage,
    side: Side,
    entry_price: Fixed,
    exit_price: Fixed,
) -> Result<Pnl, MathError> {
    let size = collateral.checked_mul(leverage.as_fixed())?;
    let diff = if exit_price >= entry_price {
        exit_price.checked_sub(entry_price)?
    } else {
        entry_price.checked_sub(exit_price)?
    };
    let amount = size.checked_mul(diff)?.checked_div(entry_price)?;

    let is_profit = match side {
        Side::Long => exit_price > entry_price,
        Side::Short => exit_price < entry_price,
    };

    Ok(Pnl { amount, is_profit })
}

/// Flat close fee on collateral, in basis points.
pub fn close_fee(collateral: Fixed, trading_fee: Bps) -> Result<Fixed, MathError> {
    collateral
        .checked_mul(Fixed::from_int(u64::from(trading_fee.get())))?
        .checked_div(Fixed::from_int(BPS_SCALE))
}

/// What a close pays back and how the books record it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// credited back to the practice balance
    pub payout: Fixed,
    /// realized magnitude: profit after fee, or loss after the collateral cap
    pub net_amount: Fixed,
    pub is_profit: bool,
    pub fee: Fixed,
}

/// Composes a voluntary close. Classification comes first; the fee then
/// reduces only the profit side, floored at zero, so a fee bigger than the
/// gain yields a zero-net profitable close rather than flipping the outcome.
/// Losses cap at collateral: practice balances never go negative.
pub fn settle_close(collateral: Fixed, pnl: Pnl, fee: Fixed) -> Result<Settlement, MathError> {
    if pnl.is_profit {
        let net = pnl.amount.saturating_sub(fee);
        return Ok(Settlement {
            payout: collateral.checked_add(net)?,
            net_amount: net,
            is_profit: true,
            fee,
        });
    }

    let loss = if pnl.amount > collateral {
        collateral
    } else {
        pnl.amount
    };
    Ok(Settlement {
        payout: collateral.checked_sub(loss)?,
        net_amount: loss,
        is_profit: false,
        fee: Fixed::ZERO,
    })
}

/// A liquidated close forfeits the whole collateral. No fee on top.
pub fn settle_liquidation(collateral: Fixed) -> Settlement {
    Settlement {
        payout: Fixed::ZERO,
        net_amount: collateral,
        is_profit: false,
        fee: Fixed::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn fx(v: rust_decimal::Decimal) -> Fixed {
        Fixed::new(v).unwrap()
    }

    #[test]
    fn liquidation_price_reference_case() {
        // entry 100.00, 10x, 5% maintenance margin:
        // margin_factor = 9500 / 10 = 950, move = 100 * 950 / 1_000_000 = 0.095
        let lp = liquidation_price(
            fx(dec!(100.00)),
            Side::Long,
            Leverage::new(10).unwrap(),
            Bps::new(500).unwrap(),
        )
        .unwrap();
        assert_eq!(lp.value(), dec!(99.905));

        let lp_short = liquidation_price(
            fx(dec!(100.00)),
            Side::Short,
            Leverage::new(10).unwrap(),
            Bps::new(500).unwrap(),
        )
        .unwrap();
        assert_eq!(lp_short.value(), dec!(100.095));
    }

    #[test]
    fn higher_leverage_sits_closer_to_entry() {
        let entry = fx(dec!(50000));
        let mm = Bps::new(500).unwrap();
        let lp10 = liquidation_price(entry, Side::Long, Leverage::new(10).unwrap(), mm).unwrap();
        let lp50 = liquidation_price(entry, Side::Long, Leverage::new(50).unwrap(), mm).unwrap();
        // both below entry, the 50x level strictly closer
        assert!(lp10 < entry && lp50 < entry);
        assert!(lp50 > lp10);
    }

    #[test]
    fn touching_the_level_liquidates() {
        let lp = fx(dec!(99.905));
        assert!(is_liquidated(Side::Long, fx(dec!(99.905)), lp));
        assert!(is_liquidated(Side::Long, fx(dec!(99)), lp));
        assert!(!is_liquidated(Side::Long, fx(dec!(99.91)), lp));

        let lp_short = fx(dec!(100.095));
        assert!(is_liquidated(Side::Short, fx(dec!(100.095)), lp_short));
        assert!(!is_liquidated(Side::Short, fx(dec!(100.09)), lp_short));
    }

    #[test]
    fn pnl_reference_case() {
        // size 5000 (500 collateral at 10x), entry 100 -> exit 110:
        // 5000 * 10 / 100 = 500 profit
        let pnl = unrealized_pnl(
            fx(dec!(500)),
            Leverage::new(10).unwrap(),
            Side::Long,
            fx(dec!(100)),
            fx(dec!(110)),
        )
        .unwrap();
        assert!(pnl.is_profit);
        assert_eq!(pnl.amount.value(), dec!(500));
    }

    #[test]
    fn short_profits_when_price_drops() {
        let pnl = unrealized_pnl(
            fx(dec!(1000)),
            Leverage::new(5).unwrap(),
            Side::Short,
            fx(dec!(200)),
            fx(dec!(180)),
        )
        .unwrap();
        assert!(pnl.is_profit);
        // 5000 * 20 / 200 = 500
        assert_eq!(pnl.amount.value(), dec!(500));

        let flipped = unrealized_pnl(
            fx(dec!(1000)),
            Leverage::new(5).unwrap(),
            Side::Long,
            fx(dec!(200)),
            fx(dec!(180)),
        )
        .unwrap();
        assert!(!flipped.is_profit);
        assert_eq!(flipped.amount.value(), dec!(500));
    }

    #[test]
    fn unchanged_price_is_flat_not_profit() {
        let pnl = unrealized_pnl(
            fx(dec!(1000)),
            Leverage::new(10).unwrap(),
            Side::Long,
            fx(dec!(100)),
            fx(dec!(100)),
        )
        .unwrap();
        assert!(!pnl.is_profit);
        assert!(pnl.amount.is_zero());
    }

    #[test]
    fn close_fee_is_bps_of_collateral() {
        let fee = close_fee(fx(dec!(1000)), Bps::new(50).unwrap()).unwrap();
        assert_eq!(fee.value(), dec!(5));
    }

    #[test]
    fn fee_comes_out_of_profit() {
        let pnl = Pnl {
            amount: fx(dec!(500)),
            is_profit: true,
        };
        let s = settle_close(fx(dec!(1000)), pnl, fx(dec!(5))).unwrap();
        assert!(s.is_profit);
        assert_eq!(s.net_amount.value(), dec!(495));
        assert_eq!(s.payout.value(), dec!(1495));
        assert_eq!(s.fee.value(), dec!(5));
    }

    #[test]
    fn fee_bigger_than_profit_floors_at_zero() {
        let pnl = Pnl {
            amount: fx(dec!(3)),
            is_profit: true,
        };
        let s = settle_close(fx(dec!(1000)), pnl, fx(dec!(5))).unwrap();
        // still classified as a profit, just a zero one
        assert!(s.is_profit);
        assert!(s.net_amount.is_zero());
        assert_eq!(s.payout.value(), dec!(1000));
    }

    #[test]
    fn loss_caps_at_collateral() {
        let pnl = Pnl {
            amount: fx(dec!(1500)),
            is_profit: false,
        };
        let s = settle_close(fx(dec!(1000)), pnl, fx(dec!(5))).unwrap();
        assert!(!s.is_profit);
        assert_eq!(s.net_amount.value(), dec!(1000));
        assert!(s.payout.is_zero());
        assert!(s.fee.is_zero());
    }

    #[test]
    fn partial_loss_returns_the_rest() {
        let pnl = Pnl {
            amount: fx(dec!(400)),
            is_profit: false,
        };
        let s = settle_close(fx(dec!(1000)), pnl, Fixed::ZERO).unwrap();
        assert_eq!(s.net_amount.value(), dec!(400));
        assert_eq!(s.payout.value(), dec!(600));
    }

    #[test]
    fn liquidation_forfeits_collateral() {
        let s = settle_liquidation(fx(dec!(1000)));
        assert!(s.payout.is_zero());
        assert_eq!(s.net_amount.value(), dec!(1000));
        assert!(!s.is_profit);
        assert!(s.fee.is_zero());
    }
}
