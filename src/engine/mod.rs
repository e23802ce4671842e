// 8.0: core engine. coordinates user registration, pair pricing, position
// open/close, and progression application. deterministic and event-driven
// with no external I/O; every state-mutating call is guarded against
// re-entry and commits atomically or not at all.

mod config;
mod core;
mod positions;
mod pricing;
mod progression;
mod results;
mod users;

pub use config::{ConfigError, EngineConfig};
pub use core::Engine;
pub use results::{CloseResult, EngineError, LeverageViolation, OpenResult};
