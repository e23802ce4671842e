// 4.0: position records and their lifecycle. a position is created Active and
// transitions exactly once, to Closed (owner exit) or Liquidated (exit price
// at or past the liquidation level). terminal states are absorbing: no
// resizing, no collateral edits, no reopening.

use crate::math::{Fixed, MathError};
use crate::types::{Leverage, PairId, PositionId, Side, Timestamp, UserId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionState {
    Active,
    Closed,
    Liquidated,
}

// recorded on the close event so the audit trail tells a voluntary exit from
// a forced one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloseReason {
    Owner,
    Liquidated,
}

impl CloseReason {
    pub fn terminal_state(&self) -> PositionState {
        match self {
            CloseReason::Owner => PositionState::Closed,
            CloseReason::Liquidated => PositionState::Liquidated,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub id: PositionId,
    pub owner: UserId,
    pub pair_id: PairId,
    pub side: Side,
    pub leverage: Leverage,
    pub collateral: Fixed,
    pub entry_price: Fixed,
    pub state: PositionState,
    pub opened_at: Timestamp,
    pub closed_at: Option<Timestamp>,
}

impl Position {
    #[allow(clippy::too_many_arguments)]
    pub fn open(
        id: PositionId,
        owner: UserId,
        pair_id: PairId,
        side: Side,
        leverage: Leverage,
        collateral: Fixed,
        entry_price: Fixed,
        timestamp: Timestamp,
    ) -> Self {
        debug_assert!(!collateral.is_zero(), "open validates collateral > 0");
        debug_assert!(!entry_price.is_zero(), "open validates a posted price");

        Self {
            id,
            owner,
            pair_id,
            side,
            leverage,
            collateral,
            entry_price,
            state: PositionState::Active,
            opened_at: timestamp,
            closed_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == PositionState::Active
    }

    // 4.1: position size in quote terms. collateral * leverage
    pub fn notional(&self) -> Result<Fixed, MathError> {
        self.collateral.checked_mul(self.leverage.as_fixed())
    }

    pub fn close(&mut self, reason: CloseReason, now: Timestamp) {
        debug_assert!(self.is_active(), "close is checked against active state first");
        self.state = reason.terminal_state();
        self.closed_at = Some(now);
    }
}
