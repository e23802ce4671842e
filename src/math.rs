// 2.0: the numeric core. every financial quantity in the engine is a Fixed:
// a non-negative decimal with checked arithmetic only. nothing here wraps or
// silently drops below zero; failures surface as MathError and abort whatever
// engine call asked for the math.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    #[error("arithmetic overflow")]
    ArithmeticOverflow,

    // unsigned representation: subtracting more than you have is an error,
    // not a negative number
    #[error("arithmetic underflow")]
    ArithmeticUnderflow,

    #[error("division by zero")]
    DivisionByZero,
}

// 2.1: unsigned fixed-point amount. prices, collateral, balances, fees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fixed(Decimal);

impl Fixed {
    pub const ZERO: Fixed = Fixed(Decimal::ZERO);

    #[must_use]
    pub fn new(value: Decimal) -> Option<Self> {
        if value >= Decimal::ZERO {
            Some(Self(value))
        } else {
            None
        }
    }

    pub fn from_int(value: u64) -> Self {
        Self(Decimal::from(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn checked_add(self, rhs: Fixed) -> Result<Fixed, MathError> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or(MathError::ArithmeticOverflow)
    }

    pub fn checked_sub(self, rhs: Fixed) -> Result<Fixed, MathError> {
        if rhs.0 > self.0 {
            return Err(MathError::ArithmeticUnderflow);
        }
        Ok(Self(self.0 - rhs.0))
    }

    pub fn checked_mul(self, rhs: Fixed) -> Result<Fixed, MathError> {
        self.0
            .checked_mul(rhs.0)
            .map(Self)
            .ok_or(MathError::ArithmeticOverflow)
    }

    pub fn checked_div(self, rhs: Fixed) -> Result<Fixed, MathError> {
        if rhs.0.is_zero() {
            return Err(MathError::DivisionByZero);
        }
        self.0
            .checked_div(rhs.0)
            .map(Self)
            .ok_or(MathError::ArithmeticOverflow)
    }

    // floor-at-zero subtraction. fee clamps and loss caps use this on purpose;
    // everything else goes through checked_sub.
    pub fn saturating_sub(self, rhs: Fixed) -> Fixed {
        if rhs.0 >= self.0 {
            Fixed::ZERO
        } else {
            Self(self.0 - rhs.0)
        }
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
