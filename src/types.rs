// 1.0: all the primitives live here. nothing in the engine works without these types.
// IDs, sides, leverage, rates, timestamps. each is a newtype so the compiler catches type mixups.

use crate::math::Fixed;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PositionId(pub u64);

// Long = profit when price goes up. Short = profit when price goes down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Long,
    Short,
}

impl Side {
    pub fn is_long(&self) -> bool {
        matches!(self, Side::Long)
    }

    pub fn opposite(&self) -> Self {
        match self {
            Side::Long => Side::Short,
            Side::Short => Side::Long,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => write!(f, "long"),
            Side::Short => write!(f, "short"),
        }
    }
}

// 1.1: leverage multiplier in whole units. must be >= 1x. caps live in the
// progression tables and on each pair, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Leverage(u32);

impl Leverage {
    #[must_use]
    pub fn new(value: u32) -> Option<Self> {
        if value >= 1 {
            Some(Self(value))
        } else {
            None
        }
    }

    // for table-driven values that are known >= 1
    pub fn new_unchecked(value: u32) -> Self {
        debug_assert!(value >= 1);
        Self(value)
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    pub fn as_fixed(&self) -> Fixed {
        Fixed::from_int(u64::from(self.0))
    }
}

impl fmt::Display for Leverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.0)
    }
}

// 1.2: basis points. 100 bps = 1%. rates never exceed 100%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Bps(u32);

impl Bps {
    pub const MAX: u32 = 10_000;

    #[must_use]
    pub fn new(bps: u32) -> Option<Self> {
        if bps <= Self::MAX {
            Some(Self(bps))
        } else {
            None
        }
    }

    // for built-in rates that are known in range
    pub fn new_unchecked(bps: u32) -> Self {
        debug_assert!(bps <= Self::MAX);
        Self(bps)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Bps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bps", self.0)
    }
}

// 1.3: millisecond timestamp. the engine never reads the wall clock on its own;
// callers inject time, sims seed it from now().
pub const HOUR_MS: i64 = 3_600_000;
pub const DAY_MS: i64 = 24 * HOUR_MS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(chrono::Utc::now().timestamp_millis())
    }

    pub fn from_millis(ms: i64) -> Self {
        Self(ms)
    }

    pub fn as_millis(&self) -> i64 {
        self.0
    }

    // ms since `earlier`, floored at zero so a clock that jumps backwards
    // reads as "no time passed" instead of wrapping.
    pub fn saturating_since(&self, earlier: Timestamp) -> i64 {
        (self.0 - earlier.0).max(0)
    }
}
