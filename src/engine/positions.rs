//! Position open and close orchestration.
//!
//! Both operations run in three phases. Checks: every fallible step, from
//! validation through risk and progression math, happens against immutable
//! state and produces the complete set of new values. Effects: those values
//! are assigned, nothing can fail anymore. Interactions: audit events
//! append last. A call that returns an error leaves the engine exactly as
//! it found it.

use super::core::Engine;
use super::results::{CloseResult, EngineError, LeverageViolation, OpenResult};
use crate::events::{EventPayload, PositionClosedEvent, PositionOpenedEvent};
use crate::math::Fixed;
use crate::position::{CloseReason, Position};
use crate::progression::{self, ActivityKind};
use crate::risk;
use crate::types::{Leverage, PairId, PositionId, Side, UserId};

fn validate_leverage(
    requested: u32,
    user_cap: Leverage,
    pair_cap: Leverage,
) -> Result<Leverage, EngineError> {
    let leverage = Leverage::new(requested)
        .ok_or(EngineError::InvalidLeverage(LeverageViolation::Zero))?;
    if leverage > user_cap {
        return Err(EngineError::InvalidLeverage(
            LeverageViolation::ExceedsUserCap { cap: user_cap },
        ));
    }
    if leverage > pair_cap {
        return Err(EngineError::InvalidLeverage(
            LeverageViolation::ExceedsPairCap { cap: pair_cap },
        ));
    }
    let system_cap = Leverage::new_unchecked(progression::SYSTEM_MAX_LEVERAGE);
    if leverage > system_cap {
        return Err(EngineError::InvalidLeverage(
            LeverageViolation::ExceedsSystemCap { cap: system_cap },
        ));
    }
    Ok(leverage)
}

impl Engine {
    /// Open a leveraged position for `caller`, locking `collateral` out of
    /// the practice balance at the pair's current price.
    pub fn open_position(
        &mut self,
        caller: UserId,
        pair_id: PairId,
        side: Side,
        leverage: u32,
        collateral: Fixed,
    ) -> Result<OpenResult, EngineError> {
        self.guard.enter()?;
        let result = self.open_position_inner(caller, pair_id, side, leverage, collateral);
        self.guard.exit();
        result
    }

    fn open_position_inner(
        &mut self,
        caller: UserId,
        pair_id: PairId,
        side: Side,
        leverage: u32,
        collateral: Fixed,
    ) -> Result<OpenResult, EngineError> {
        let now = self.current_time;
        let maintenance_margin = self.config.risk.maintenance_margin;

        // -- checks --
        if !self.users.contains_key(&caller) {
            return Err(EngineError::UserNotRegistered(caller));
        }

        let pair = self
            .pairs
            .get(&pair_id)
            .ok_or(EngineError::InvalidTradingPair(pair_id))?;
        if !pair.has_price() {
            return Err(EngineError::InvalidTradingPair(pair_id));
        }
        if !pair.is_active {
            return Err(EngineError::PairNotActive(pair_id));
        }
        let entry_price = pair.current_price;
        let pair_cap = pair.max_leverage;

        let user = self
            .users
            .get_mut(&caller)
            .ok_or(EngineError::UserNotRegistered(caller))?;
        let leverage = validate_leverage(leverage, user.max_leverage, pair_cap)?;

        if collateral.is_zero() {
            return Err(EngineError::InvalidCollateral);
        }
        if collateral > user.practice_balance {
            return Err(EngineError::InsufficientBalance {
                requested: collateral,
                available: user.practice_balance,
            });
        }
        let new_balance = user.practice_balance.checked_sub(collateral)?;

        let liquidation_price =
            risk::liquidation_price(entry_price, side, leverage, maintenance_margin)?;
        let outcome = progression::award_activity(user, ActivityKind::PositionOpened, now)?;

        let position_id = PositionId(self.next_position_id);
        let position = Position::open(
            position_id,
            caller,
            pair_id,
            side,
            leverage,
            collateral,
            entry_price,
            now,
        );

        // -- effects --
        user.practice_balance = new_balance;
        super::progression::apply_outcome(user, &outcome, now);
        self.next_position_id += 1;
        self.positions.insert(position_id, position);

        // -- interactions --
        self.emit_event(EventPayload::PositionOpened(PositionOpenedEvent {
            owner: caller,
            position_id,
            pair_id,
            side,
            leverage,
            collateral,
            entry_price,
            liquidation_price,
        }));
        self.emit_award_events(caller, &outcome);

        Ok(OpenResult {
            position_id,
            entry_price,
            liquidation_price,
            award: outcome,
        })
    }

    /// Close `caller`'s position at the pair's current price. If that price
    /// has crossed the liquidation level the close settles as a liquidation
    /// and the collateral is forfeited.
    pub fn close_position(
        &mut self,
        caller: UserId,
        position_id: PositionId,
    ) -> Result<CloseResult, EngineError> {
        self.guard.enter()?;
        let result = self.close_position_inner(caller, position_id);
        self.guard.exit();
        result
    }

    fn close_position_inner(
        &mut self,
        caller: UserId,
        position_id: PositionId,
    ) -> Result<CloseResult, EngineError> {
        let now = self.current_time;
        let risk_params = self.config.risk;

        // -- checks --
        let position = self
            .positions
            .get(&position_id)
            .ok_or(EngineError::PositionNotFound(position_id))?;
        if position.owner != caller {
            return Err(EngineError::NotPositionOwner { position_id, caller });
        }
        if !position.is_active() {
            return Err(EngineError::PositionNotActive(position_id));
        }
        let pair_id = position.pair_id;
        let side = position.side;
        let leverage = position.leverage;
        let collateral = position.collateral;
        let entry_price = position.entry_price;

        // a paused pair still settles closes; a pair with no price cannot
        let pair = self
            .pairs
            .get(&pair_id)
            .ok_or(EngineError::InvalidTradingPair(pair_id))?;
        if !pair.has_price() {
            return Err(EngineError::InvalidTradingPair(pair_id));
        }
        let exit_price = pair.current_price;

        let liquidation_price = risk::liquidation_price(
            entry_price,
            side,
            leverage,
            risk_params.maintenance_margin,
        )?;
        let (settlement, reason) = if risk::is_liquidated(side, exit_price, liquidation_price) {
            (risk::settle_liquidation(collateral), CloseReason::Liquidated)
        } else {
            let pnl = risk::unrealized_pnl(collateral, leverage, side, entry_price, exit_price)?;
            let fee = risk::close_fee(collateral, risk_params.trading_fee)?;
            (
                risk::settle_close(collateral, pnl, fee)?,
                CloseReason::Owner,
            )
        };

        let kind = if settlement.is_profit {
            ActivityKind::ProfitableTrade
        } else {
            ActivityKind::PositionClosed
        };

        let user = self
            .users
            .get(&caller)
            .ok_or(EngineError::UserNotRegistered(caller))?;
        let new_balance = user.practice_balance.checked_add(settlement.payout)?;
        let outcome = progression::award_activity(user, kind, now)?;

        // -- effects --
        let user = self
            .users
            .get_mut(&caller)
            .ok_or(EngineError::UserNotRegistered(caller))?;
        user.practice_balance = new_balance;
        user.total_trades = user.total_trades.saturating_add(1);
        if settlement.is_profit {
            user.profitable_trades = user.profitable_trades.saturating_add(1);
        }
        super::progression::apply_outcome(user, &outcome, now);

        let position = self
            .positions
            .get_mut(&position_id)
            .ok_or(EngineError::PositionNotFound(position_id))?;
        position.close(reason, now);

        // -- interactions --
        self.emit_event(EventPayload::PositionClosed(PositionClosedEvent {
            owner: caller,
            position_id,
            pair_id,
            exit_price,
            net_amount: settlement.net_amount,
            is_profit: settlement.is_profit,
            fee: settlement.fee,
            reason,
        }));
        self.emit_award_events(caller, &outcome);

        Ok(CloseResult {
            position_id,
            exit_price,
            net_amount: settlement.net_amount,
            is_profit: settlement.is_profit,
            fee: settlement.fee,
            reason,
            award: outcome,
        })
    }

    /// Liquidation level of a stored position. Pure read, any caller.
    pub fn liquidation_price_of(&self, position_id: PositionId) -> Result<Fixed, EngineError> {
        let position = self
            .positions
            .get(&position_id)
            .ok_or(EngineError::PositionNotFound(position_id))?;
        let price = risk::liquidation_price(
            position.entry_price,
            position.side,
            position.leverage,
            self.config.risk.maintenance_margin,
        )?;
        Ok(price)
    }
}
