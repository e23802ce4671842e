// 8.0.2: result types and errors for engine operations.

use std::fmt;

use crate::guard::GuardError;
use crate::math::{Fixed, MathError};
use crate::position::CloseReason;
use crate::progression::ActivityOutcome;
use crate::types::{Leverage, PairId, PositionId, UserId};
use crate::user::UserError;

#[derive(Debug, Clone)]
pub struct OpenResult {
    pub position_id: PositionId,
    pub entry_price: Fixed,
    pub liquidation_price: Fixed,
    pub award: ActivityOutcome,
}

#[derive(Debug, Clone)]
pub struct CloseResult {
    pub position_id: PositionId,
    pub exit_price: Fixed,
    pub net_amount: Fixed,
    pub is_profit: bool,
    pub fee: Fixed,
    pub reason: CloseReason,
    pub award: ActivityOutcome,
}

/// Which cap a leverage request tripped. Caps are checked tightest-first:
/// zero, then the user's unlocked cap, then the pair cap, then the system
/// ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeverageViolation {
    Zero,
    ExceedsUserCap { cap: Leverage },
    ExceedsPairCap { cap: Leverage },
    ExceedsSystemCap { cap: Leverage },
}

impl fmt::Display for LeverageViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeverageViolation::Zero => write!(f, "leverage must be at least 1x"),
            LeverageViolation::ExceedsUserCap { cap } => {
                write!(f, "exceeds the user's unlocked cap of {cap}")
            }
            LeverageViolation::ExceedsPairCap { cap } => {
                write!(f, "exceeds the pair cap of {cap}")
            }
            LeverageViolation::ExceedsSystemCap { cap } => {
                write!(f, "exceeds the system ceiling of {cap}")
            }
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    #[error("User {0:?} already registered")]
    UserAlreadyExists(UserId),

    #[error("User {0:?} is not registered")]
    UserNotRegistered(UserId),

    #[error("Pair {0:?} is unknown or has no posted price")]
    InvalidTradingPair(PairId),

    #[error("Pair {0:?} is paused")]
    PairNotActive(PairId),

    #[error("Pair {0:?} already listed")]
    PairAlreadyExists(PairId),

    #[error("Price for pair {0:?} must be positive")]
    InvalidPrice(PairId),

    #[error("Invalid leverage: {0}")]
    InvalidLeverage(LeverageViolation),

    #[error("Collateral must be positive")]
    InvalidCollateral,

    #[error("Amount must be positive")]
    InvalidAmount,

    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: Fixed, available: Fixed },

    #[error("Position {0:?} not found")]
    PositionNotFound(PositionId),

    #[error("Position {0:?} is already settled")]
    PositionNotActive(PositionId),

    #[error("Position {position_id:?} is not owned by {caller:?}")]
    NotPositionOwner {
        position_id: PositionId,
        caller: UserId,
    },

    #[error("Math error: {0}")]
    Math(#[from] MathError),

    #[error("Re-entrant engine call rejected")]
    ReentrantCall,
}

impl From<UserError> for EngineError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::InsufficientBalance {
                requested,
                available,
            } => EngineError::InsufficientBalance {
                requested,
                available,
            },
            UserError::Math(math) => EngineError::Math(math),
        }
    }
}

impl From<GuardError> for EngineError {
    fn from(_: GuardError) -> Self {
        EngineError::ReentrantCall
    }
}
