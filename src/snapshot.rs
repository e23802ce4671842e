// 10.0: versioned engine snapshots. the whole world serializes to one record
// tagged with an explicit schema_version; older records upgrade through pure
// migration steps before Engine::restore will take them. the event log is an
// audit trail, not state, so migrations never reinterpret events.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pair::TradingPair;
use crate::position::Position;
use crate::types::Timestamp;
use crate::user::User;

/// Current snapshot schema. Bump on any change to the persisted shape and
/// add a migration step from the previous version.
pub const SCHEMA_VERSION: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub schema_version: u32,
    pub users: Vec<User>,
    pub pairs: Vec<TradingPair>,
    pub positions: Vec<Position>,
    pub next_position_id: u64,
    pub next_event_id: u64,
    pub current_time: Timestamp,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("Snapshot schema {found} is newer than supported {supported}")]
    FutureVersion { found: u32, supported: u32 },

    #[error("Snapshot schema {found} predates the current version; migrate it first")]
    StaleVersion { found: u32 },
}

/// Schema 1, kept only so old records can be read and upgraded. v1 predates
/// per-user trade statistics.
pub mod v1 {
    use serde::{Deserialize, Serialize};

    use crate::math::Fixed;
    use crate::pair::TradingPair;
    use crate::position::Position;
    use crate::types::{Leverage, Timestamp, UserId};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct UserRecordV1 {
        pub id: UserId,
        pub total_xp: u128,
        pub level: u32,
        pub streak_days: u32,
        pub last_activity_time: Timestamp,
        pub max_leverage: Leverage,
        pub practice_balance: Fixed,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct EngineSnapshotV1 {
        pub schema_version: u32,
        pub users: Vec<UserRecordV1>,
        pub pairs: Vec<TradingPair>,
        pub positions: Vec<Position>,
        pub next_position_id: u64,
        pub next_event_id: u64,
        pub current_time: Timestamp,
    }
}

/// v1 -> v2: users gain trade counters, which a v1 record never tracked, so
/// both start at zero.
pub fn migrate_user_v1(old: v1::UserRecordV1) -> User {
    User {
        id: old.id,
        total_xp: old.total_xp,
        level: old.level,
        streak_days: old.streak_days,
        last_activity_time: old.last_activity_time,
        max_leverage: old.max_leverage,
        practice_balance: old.practice_balance,
        total_trades: 0,
        profitable_trades: 0,
    }
}

/// Upgrade a whole v1 record to the current schema.
pub fn migrate_v1(old: v1::EngineSnapshotV1) -> EngineSnapshot {
    debug_assert_eq!(old.schema_version, 1);
    EngineSnapshot {
        schema_version: SCHEMA_VERSION,
        users: old.users.into_iter().map(migrate_user_v1).collect(),
        pairs: old.pairs,
        positions: old.positions,
        next_position_id: old.next_position_id,
        next_event_id: old.next_event_id,
        current_time: old.current_time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Fixed;
    use crate::types::{Leverage, UserId};

    fn v1_record() -> v1::EngineSnapshotV1 {
        v1::EngineSnapshotV1 {
            schema_version: 1,
            users: vec![v1::UserRecordV1 {
                id: UserId(3),
                total_xp: 1_014,
                level: 5,
                streak_days: 4,
                last_activity_time: Timestamp::from_millis(86_400_000),
                max_leverage: Leverage::new_unchecked(20),
                practice_balance: Fixed::from_int(12_345),
            }],
            pairs: vec![TradingPair::btc_usd()],
            positions: vec![],
            next_position_id: 8,
            next_event_id: 41,
            current_time: Timestamp::from_millis(90_000_000),
        }
    }

    #[test]
    fn migration_fills_counters_and_keeps_the_rest() {
        let migrated = migrate_v1(v1_record());
        assert_eq!(migrated.schema_version, SCHEMA_VERSION);

        let user = &migrated.users[0];
        assert_eq!(user.id, UserId(3));
        assert_eq!(user.total_xp, 1_014);
        assert_eq!(user.level, 5);
        assert_eq!(user.streak_days, 4);
        assert_eq!(user.max_leverage, Leverage::new_unchecked(20));
        assert_eq!(user.practice_balance, Fixed::from_int(12_345));
        assert_eq!(user.total_trades, 0);
        assert_eq!(user.profitable_trades, 0);

        assert_eq!(migrated.next_position_id, 8);
        assert_eq!(migrated.next_event_id, 41);
        assert_eq!(migrated.current_time, Timestamp::from_millis(90_000_000));
    }

    #[test]
    fn v1_json_round_trips_through_migration() {
        let json = serde_json::to_string(&v1_record()).unwrap();
        let parsed: v1::EngineSnapshotV1 = serde_json::from_str(&json).unwrap();
        let migrated = migrate_v1(parsed);
        assert_eq!(migrated, migrate_v1(v1_record()));
    }

    #[test]
    fn current_snapshot_survives_serde() {
        let snapshot = migrate_v1(v1_record());
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: EngineSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}
