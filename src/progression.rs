//! XP, levels, streaks, and the leverage ladder.
//!
//! Progression is a pure transition function: given a user snapshot, an
//! activity kind, and the current time, `award_activity` produces an
//! ActivityOutcome the engine applies in one shot. Base XP per activity,
//! a daily-streak bonus, a cumulative-XP level curve, and a leverage cap
//! unlocked per level.

use crate::math::MathError;
use crate::types::{Leverage, Timestamp, DAY_MS};
use crate::user::User;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const SYSTEM_MAX_LEVERAGE: u32 = 100;
pub const STREAK_XP_RATE: u64 = 5;

// a trade 24-48h after the last one extends the streak; sooner leaves it
// alone; later (or a first-ever activity) restarts at 1.
const STREAK_EXTEND_MIN_MS: i64 = DAY_MS;
const STREAK_EXTEND_MAX_MS: i64 = 2 * DAY_MS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityKind {
    PositionOpened,
    PositionClosed,
    ProfitableTrade,
}

impl ActivityKind {
    // exhaustive on purpose: adding a kind forces choosing its XP here
    pub const fn base_xp(self) -> u64 {
        match self {
            ActivityKind::PositionOpened => 10,
            ActivityKind::PositionClosed => 20,
            ActivityKind::ProfitableTrade => 50,
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityKind::PositionOpened => write!(f, "position opened"),
            ActivityKind::PositionClosed => write!(f, "position closed"),
            ActivityKind::ProfitableTrade => write!(f, "profitable trade"),
        }
    }
}

// cumulative XP needed to sit at level index+1. level 1 is free; the curve
// roughly doubles so late levels are a real grind.
pub const LEVEL_XP_THRESHOLDS: &[u128] = &[
    0,         // 1
    100,       // 2
    250,       // 3
    500,       // 4
    1_000,     // 5
    2_000,     // 6
    3_500,     // 7
    6_000,     // 8
    10_000,    // 9
    16_000,    // 10
    25_000,    // 11
    40_000,    // 12
    60_000,    // 13
    90_000,    // 14
    135_000,   // 15
    200_000,   // 16
    300_000,   // 17
    450_000,   // 18
    675_000,   // 19
    1_000_000, // 20
    1_500_000, // 21
    2_250_000, // 22
    3_375_000, // 23
    5_000_000, // 24
    7_500_000, // 25
];

/// Level for a cumulative XP total. Monotone, deterministic, O(log n).
pub fn level_for_xp(total_xp: u128) -> u32 {
    LEVEL_XP_THRESHOLDS.partition_point(|&t| t <= total_xp) as u32
}

// leverage cap unlocked at each level step. later entries win.
pub const LEVERAGE_UNLOCKS: &[(u32, u32)] = &[
    (1, 10),
    (5, 20),
    (10, 40),
    (15, 60),
    (20, 80),
    (25, SYSTEM_MAX_LEVERAGE),
];

/// Max leverage a user of `level` may request. Non-decreasing in level,
/// never above SYSTEM_MAX_LEVERAGE.
pub fn leverage_for_level(level: u32) -> Leverage {
    let mut unlocked = LEVERAGE_UNLOCKS[0].1;
    for &(step, leverage) in LEVERAGE_UNLOCKS {
        if level >= step {
            unlocked = leverage;
        }
    }
    Leverage::new_unchecked(unlocked.min(SYSTEM_MAX_LEVERAGE))
}

/// Streak transition for an activity `elapsed_ms` after the previous one.
pub fn next_streak(streak_days: u32, elapsed_ms: i64) -> u32 {
    if streak_days == 0 {
        // first-ever activity starts the streak
        return 1;
    }
    if elapsed_ms < STREAK_EXTEND_MIN_MS {
        streak_days
    } else if elapsed_ms <= STREAK_EXTEND_MAX_MS {
        streak_days.saturating_add(1)
    } else {
        1
    }
}

/// Everything one activity changes about a user, computed up front so the
/// engine can apply it after all fallible work is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityOutcome {
    pub kind: ActivityKind,
    pub base_xp: u64,
    pub streak_bonus: u64,
    pub total_award: u64,
    pub new_total_xp: u128,
    pub new_streak: u32,
    pub old_level: u32,
    pub new_level: u32,
    pub new_max_leverage: Leverage,
}

impl ActivityOutcome {
    pub fn leveled_up(&self) -> bool {
        self.new_level > self.old_level
    }
}

/// The progression transition. Pure: reads the user, mutates nothing.
pub fn award_activity(
    user: &User,
    kind: ActivityKind,
    now: Timestamp,
) -> Result<ActivityOutcome, MathError> {
    let base_xp = kind.base_xp();
    let elapsed = now.saturating_since(user.last_activity_time);
    let new_streak = next_streak(user.streak_days, elapsed);
    // the bonus uses the already-updated streak: the trade that extends a
    // streak earns the extended rate
    let streak_bonus = u64::from(new_streak) * STREAK_XP_RATE;
    let total_award = base_xp + streak_bonus;

    let new_total_xp = user
        .total_xp
        .checked_add(u128::from(total_award))
        .ok_or(MathError::ArithmeticOverflow)?;

    let old_level = user.level;
    let new_level = level_for_xp(new_total_xp);
    debug_assert!(new_level >= old_level, "XP only grows, so levels never drop");

    let new_max_leverage = if new_level > old_level {
        leverage_for_level(new_level)
    } else {
        user.max_leverage
    };

    Ok(ActivityOutcome {
        kind,
        base_xp,
        streak_bonus,
        total_award,
        new_total_xp,
        new_streak,
        old_level,
        new_level,
        new_max_leverage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Fixed;
    use crate::types::{UserId, HOUR_MS};
    use rust_decimal_macros::dec;

    fn user_at(xp: u128, streak: u32, last_activity_ms: i64) -> User {
        let mut user = User::register(
            UserId(1),
            Fixed::new(dec!(10000)).unwrap(),
            Timestamp::from_millis(0),
        );
        user.total_xp = xp;
        user.level = level_for_xp(xp);
        user.max_leverage = leverage_for_level(user.level);
        user.streak_days = streak;
        user.last_activity_time = Timestamp::from_millis(last_activity_ms);
        user
    }

    #[test]
    fn base_xp_per_kind() {
        assert_eq!(ActivityKind::PositionOpened.base_xp(), 10);
        assert_eq!(ActivityKind::PositionClosed.base_xp(), 20);
        assert_eq!(ActivityKind::ProfitableTrade.base_xp(), 50);
    }

    #[test]
    fn level_curve_boundaries() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(99), 1);
        assert_eq!(level_for_xp(100), 2);
        assert_eq!(level_for_xp(249), 2);
        assert_eq!(level_for_xp(250), 3);
        assert_eq!(level_for_xp(7_500_000), 25);
        assert_eq!(level_for_xp(u128::MAX), 25);
    }

    #[test]
    fn level_curve_is_monotone() {
        let mut last = 0;
        for xp in (0..20_000).step_by(37) {
            let level = level_for_xp(xp);
            assert!(level >= last);
            last = level;
        }
    }

    #[test]
    fn leverage_ladder_steps() {
        assert_eq!(leverage_for_level(1).get(), 10);
        assert_eq!(leverage_for_level(4).get(), 10);
        assert_eq!(leverage_for_level(5).get(), 20);
        assert_eq!(leverage_for_level(9).get(), 20);
        assert_eq!(leverage_for_level(10).get(), 40);
        assert_eq!(leverage_for_level(15).get(), 60);
        assert_eq!(leverage_for_level(20).get(), 80);
        assert_eq!(leverage_for_level(25).get(), SYSTEM_MAX_LEVERAGE);
        assert_eq!(leverage_for_level(99).get(), SYSTEM_MAX_LEVERAGE);
    }

    #[test]
    fn streak_windows() {
        // first activity always starts at 1, whatever the gap
        assert_eq!(next_streak(0, 0), 1);
        assert_eq!(next_streak(0, 100 * DAY_MS), 1);

        // same-day trades keep the streak
        assert_eq!(next_streak(3, 0), 3);
        assert_eq!(next_streak(3, DAY_MS - 1), 3);

        // the extend window is inclusive on both ends
        assert_eq!(next_streak(3, DAY_MS), 4);
        assert_eq!(next_streak(3, 36 * HOUR_MS), 4);
        assert_eq!(next_streak(3, 2 * DAY_MS), 4);

        // one ms past two days resets
        assert_eq!(next_streak(3, 2 * DAY_MS + 1), 1);
    }

    #[test]
    fn first_award_starts_the_streak() {
        let user = user_at(0, 0, 0);
        let outcome = award_activity(
            &user,
            ActivityKind::PositionOpened,
            Timestamp::from_millis(HOUR_MS),
        )
        .unwrap();
        assert_eq!(outcome.new_streak, 1);
        assert_eq!(outcome.base_xp, 10);
        assert_eq!(outcome.streak_bonus, 5);
        assert_eq!(outcome.total_award, 15);
        assert_eq!(outcome.new_total_xp, 15);
        assert!(!outcome.leveled_up());
    }

    #[test]
    fn streak_bonus_scales_with_days() {
        let user = user_at(500, 6, 0);
        // 30h later: extend to 7, bonus 35
        let outcome = award_activity(
            &user,
            ActivityKind::PositionClosed,
            Timestamp::from_millis(30 * HOUR_MS),
        )
        .unwrap();
        assert_eq!(outcome.new_streak, 7);
        assert_eq!(outcome.streak_bonus, 35);
        assert_eq!(outcome.total_award, 55);
    }

    #[test]
    fn level_up_unlocks_leverage() {
        // 999 XP sits at level 4; +15 crosses the level-5 line at 1000
        let user = user_at(999, 1, 0);
        assert_eq!(user.level, 4);
        assert_eq!(user.max_leverage.get(), 10);

        let outcome = award_activity(
            &user,
            ActivityKind::PositionOpened,
            Timestamp::from_millis(HOUR_MS),
        )
        .unwrap();
        assert_eq!(outcome.total_award, 15);
        assert_eq!(outcome.new_total_xp, 1_014);
        assert_eq!(outcome.new_level, 5);
        assert!(outcome.leveled_up());
        assert_eq!(outcome.new_max_leverage.get(), 20);
    }

    #[test]
    fn no_level_up_keeps_the_cap() {
        let user = user_at(200, 2, 0);
        let outcome = award_activity(
            &user,
            ActivityKind::PositionOpened,
            Timestamp::from_millis(HOUR_MS),
        )
        .unwrap();
        assert!(!outcome.leveled_up());
        assert_eq!(outcome.new_max_leverage, user.max_leverage);
    }

    #[test]
    fn xp_overflow_is_surfaced() {
        let user = user_at(u128::MAX, 1, 0);
        let result = award_activity(
            &user,
            ActivityKind::ProfitableTrade,
            Timestamp::from_millis(HOUR_MS),
        );
        assert_eq!(result.unwrap_err(), MathError::ArithmeticOverflow);
    }
}
