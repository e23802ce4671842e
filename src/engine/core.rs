// 8.1 engine/core.rs: main engine. holds all users, pairs, open positions.

use super::config::EngineConfig;
use crate::events::{Event, EventId, EventPayload};
use crate::guard::CallGuard;
use crate::math::{Fixed, MathError};
use crate::pair::TradingPair;
use crate::position::Position;
use crate::snapshot::{EngineSnapshot, SnapshotError, SCHEMA_VERSION};
use crate::types::{PairId, PositionId, Timestamp, UserId};
use crate::user::User;
use std::collections::HashMap;

/** 8.1: main engine struct. all state lives here */
#[derive(Debug)]
pub struct Engine {
    pub(super) config: EngineConfig,
    pub(super) users: HashMap<UserId, User>,
    pub(super) pairs: HashMap<PairId, TradingPair>,
    pub(super) positions: HashMap<PositionId, Position>,
    pub(super) guard: CallGuard,
    pub(super) events: Vec<Event>,
    pub(super) next_event_id: u64,
    pub(super) next_position_id: u64,
    pub(super) current_time: Timestamp,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        debug_assert!(config.validate().is_ok());
        Self {
            config,
            users: HashMap::new(),
            pairs: HashMap::new(),
            positions: HashMap::new(),
            guard: CallGuard::new(),
            events: Vec::new(),
            next_event_id: 1,
            next_position_id: 1,
            current_time: Timestamp::from_millis(0),
        }
    }

    pub fn set_time(&mut self, timestamp: Timestamp) {
        self.current_time = timestamp;
    }

    pub fn time(&self) -> Timestamp {
        self.current_time
    }

    pub fn advance_time(&mut self, millis: i64) {
        self.current_time = Timestamp::from_millis(self.current_time.as_millis() + millis);
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn get_user(&self, user_id: UserId) -> Option<&User> {
        self.users.get(&user_id)
    }

    pub fn users_iter(&self) -> impl Iterator<Item = (&UserId, &User)> {
        self.users.iter()
    }

    pub fn get_pair(&self, pair_id: PairId) -> Option<&TradingPair> {
        self.pairs.get(&pair_id)
    }

    pub fn get_position(&self, position_id: PositionId) -> Option<&Position> {
        self.positions.get(&position_id)
    }

    /// All positions ever opened by `owner`, settled ones included, in id
    /// order.
    pub fn positions_for(&self, owner: UserId) -> Vec<&Position> {
        let mut positions: Vec<&Position> = self
            .positions
            .values()
            .filter(|p| p.owner == owner)
            .collect();
        positions.sort_by_key(|p| p.id);
        positions
    }

    /// Sum of collateral locked in active positions. Conservation checks
    /// compare this against user balances.
    pub fn total_open_collateral(&self) -> Result<Fixed, MathError> {
        let mut total = Fixed::ZERO;
        for position in self.positions.values() {
            if position.is_active() {
                total = total.checked_add(position.collateral)?;
            }
        }
        Ok(total)
    }

    pub fn recent_events(&self, count: usize) -> &[Event] {
        let start = self.events.len().saturating_sub(count);
        &self.events[start..]
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Capture the full engine state as a versioned record. Collections are
    /// sorted by id so two identical engines snapshot byte-identically.
    pub fn snapshot(&self) -> EngineSnapshot {
        let mut users: Vec<User> = self.users.values().cloned().collect();
        users.sort_by_key(|u| u.id);
        let mut pairs: Vec<TradingPair> = self.pairs.values().cloned().collect();
        pairs.sort_by_key(|p| p.id);
        let mut positions: Vec<Position> = self.positions.values().cloned().collect();
        positions.sort_by_key(|p| p.id);

        EngineSnapshot {
            schema_version: SCHEMA_VERSION,
            users,
            pairs,
            positions,
            next_position_id: self.next_position_id,
            next_event_id: self.next_event_id,
            current_time: self.current_time,
        }
    }

    /// Rebuild an engine from a snapshot at the current schema version.
    /// Older records must pass through the migration chain first; the event
    /// log is an audit trail and does not survive a restore.
    pub fn restore(snapshot: EngineSnapshot, config: EngineConfig) -> Result<Self, SnapshotError> {
        debug_assert!(config.validate().is_ok());
        if snapshot.schema_version > SCHEMA_VERSION {
            return Err(SnapshotError::FutureVersion {
                found: snapshot.schema_version,
                supported: SCHEMA_VERSION,
            });
        }
        if snapshot.schema_version < SCHEMA_VERSION {
            return Err(SnapshotError::StaleVersion {
                found: snapshot.schema_version,
            });
        }

        Ok(Self {
            config,
            users: snapshot.users.into_iter().map(|u| (u.id, u)).collect(),
            pairs: snapshot.pairs.into_iter().map(|p| (p.id, p)).collect(),
            positions: snapshot
                .positions
                .into_iter()
                .map(|p| (p.id, p))
                .collect(),
            guard: CallGuard::new(),
            events: Vec::new(),
            next_event_id: snapshot.next_event_id,
            next_position_id: snapshot.next_position_id,
            current_time: snapshot.current_time,
        })
    }

    pub(super) fn emit_event(&mut self, payload: EventPayload) {
        let event = Event::new(EventId(self.next_event_id), self.current_time, payload);
        self.next_event_id += 1;

        if self.config.verbose {
            println!("[Event {}] {:?}", event.id.0, event.payload);
        }

        self.events.push(event);

        if self.events.len() > self.config.max_events {
            let drain_count = self.events.len() - self.config.max_events;
            self.events.drain(0..drain_count);
        }
    }
}
