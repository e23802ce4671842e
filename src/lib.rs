// quest-core: gamified paper-trading engine.
// progression-first architecture: what a user may trade is earned, not
// configured. all computation is deterministic with no external I/O.
//
// file map (search X.0 for structs, X.1+ for logic):
//   1.x  types.rs: primitives: UserId, PairId, PositionId, Side, Leverage, Bps
//   2.x  math.rs: Fixed non-negative decimal and checked arithmetic
//   3.x  progression.rs: XP awards, level curve, streaks, leverage unlocks
//   4.x  position.rs: position record and lifecycle
//   5.x  risk.rs: liquidation price, PnL, fees, settlement
//   6.x  user.rs: user profile + practice balance
//   7.x  pair.rs: trading pair listing + price state
//   8.x  engine/: core engine: users, pairs, positions, progression
//   9.x  feed.rs: price feed abstraction (mocked)
//   10.x snapshot.rs: versioned state snapshots + migrations
//   11.x events.rs: state transition events for audit
//   12.x guard.rs: re-entrancy guard for engine operations

// core trading modules
pub mod engine;
pub mod events;
pub mod math;
pub mod pair;
pub mod position;
pub mod risk;
pub mod types;
pub mod user;

// progression and safety modules
pub mod guard;
pub mod progression;

// integration modules
pub mod feed;
pub mod snapshot;

// re exports for convenience
pub use engine::*;
pub use events::*;
pub use math::*;
pub use pair::*;
pub use position::*;
pub use risk::*;
pub use types::*;
pub use user::*;
pub use feed::{MockPriceFeed, PriceFeed};
pub use guard::{CallGuard, GuardError};
pub use progression::{
    ActivityKind, ActivityOutcome, LEVEL_XP_THRESHOLDS, LEVERAGE_UNLOCKS, SYSTEM_MAX_LEVERAGE,
};
pub use snapshot::{EngineSnapshot, SnapshotError, SCHEMA_VERSION};
