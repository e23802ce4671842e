//! Applying progression outcomes to stored users.
//!
//! The math lives in [`crate::progression`] as pure functions; this module
//! is the write side. Splitting compute from apply keeps the position
//! operations atomic: an outcome is computed during the checks phase and
//! only assigned once nothing can fail anymore.

use super::core::Engine;
use crate::events::{EventPayload, LevelUpEvent, XpAwardedEvent};
use crate::progression::ActivityOutcome;
use crate::types::{Timestamp, UserId};
use crate::user::User;

/// Copy a computed outcome onto the stored user. Infallible on purpose.
pub(super) fn apply_outcome(user: &mut User, outcome: &ActivityOutcome, now: Timestamp) {
    user.total_xp = outcome.new_total_xp;
    user.streak_days = outcome.new_streak;
    user.last_activity_time = now;
    user.level = outcome.new_level;
    user.max_leverage = outcome.new_max_leverage;
}

impl Engine {
    pub(super) fn emit_award_events(&mut self, user: UserId, outcome: &ActivityOutcome) {
        self.emit_event(EventPayload::XpAwarded(XpAwardedEvent {
            user,
            kind: outcome.kind,
            amount: outcome.total_award,
            streak_days: outcome.new_streak,
            new_total_xp: outcome.new_total_xp,
        }));

        if outcome.leveled_up() {
            self.emit_event(EventPayload::LevelUp(LevelUpEvent {
                user,
                old_level: outcome.old_level,
                new_level: outcome.new_level,
                new_max_leverage: outcome.new_max_leverage,
            }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Fixed;
    use crate::progression::{self, ActivityKind};
    use crate::types::Leverage;

    #[test]
    fn apply_copies_every_field() {
        let now = Timestamp::from_millis(50 * 24 * 3_600_000);
        let mut user = User::register(UserId(1), Fixed::from_int(100), Timestamp::from_millis(0));
        user.total_xp = 999;
        user.level = 4;

        let outcome = progression::award_activity(&user, ActivityKind::PositionOpened, now)
            .expect("no overflow");
        apply_outcome(&mut user, &outcome, now);

        assert_eq!(user.total_xp, 1_014);
        assert_eq!(user.level, 5);
        assert_eq!(user.max_leverage, Leverage::new_unchecked(20));
        assert_eq!(user.streak_days, 1);
        assert_eq!(user.last_activity_time, now);
    }
}
