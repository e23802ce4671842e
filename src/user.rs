//! User records and practice balances.
//!
//! Every caller has exactly one User. Balance moves only through credit/debit
//! here; the progression fields (XP, level, streak, max leverage) are only
//! ever mutated by the engine applying an ActivityOutcome.

use crate::math::{Fixed, MathError};
use crate::progression;
use crate::types::{Leverage, Timestamp, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub total_xp: u128,
    pub level: u32,
    pub streak_days: u32,
    pub last_activity_time: Timestamp,
    pub max_leverage: Leverage,
    pub practice_balance: Fixed,
    pub total_trades: u32,
    pub profitable_trades: u32,
}

impl User {
    pub fn register(id: UserId, starting_balance: Fixed, now: Timestamp) -> Self {
        Self {
            id,
            total_xp: 0,
            level: 1,
            streak_days: 0,
            last_activity_time: now,
            max_leverage: progression::leverage_for_level(1),
            practice_balance: starting_balance,
            total_trades: 0,
            profitable_trades: 0,
        }
    }

    pub fn credit(&mut self, amount: Fixed) -> Result<(), UserError> {
        self.practice_balance = self.practice_balance.checked_add(amount)?;
        Ok(())
    }

    pub fn debit(&mut self, amount: Fixed) -> Result<(), UserError> {
        if amount > self.practice_balance {
            return Err(UserError::InsufficientBalance {
                requested: amount,
                available: self.practice_balance,
            });
        }
        self.practice_balance = self.practice_balance.checked_sub(amount)?;
        Ok(())
    }

    // None until the first position closes
    pub fn win_rate(&self) -> Option<Decimal> {
        if self.total_trades == 0 {
            return None;
        }
        Some(Decimal::from(self.profitable_trades) / Decimal::from(self.total_trades))
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum UserError {
    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: Fixed, available: Fixed },

    #[error(transparent)]
    Math(#[from] MathError),
}
