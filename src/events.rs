// 11.0: every state change produces an event. used for audit trails, state
// reconstruction, and notifying external systems. events are staged inside an
// engine call and appended only after the whole call commits, so a failed
// call leaves no trace here.

use crate::math::Fixed;
use crate::position::CloseReason;
use crate::progression::ActivityKind;
use crate::types::{Leverage, PairId, PositionId, Side, Timestamp, UserId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub u64);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub timestamp: Timestamp,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(id: EventId, timestamp: Timestamp, payload: EventPayload) -> Self {
        Self {
            id,
            timestamp,
            payload,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventPayload {
    // registry events
    UserRegistered(UserRegisteredEvent),
    BalanceToppedUp(BalanceToppedUpEvent),

    // pair events
    PairPriceUpdated(PairPriceUpdatedEvent),
    PairStatusChanged(PairStatusChangedEvent),

    // position events
    PositionOpened(PositionOpenedEvent),
    PositionClosed(PositionClosedEvent),

    // progression events
    XpAwarded(XpAwardedEvent),
    LevelUp(LevelUpEvent),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRegisteredEvent {
    pub user: UserId,
    pub starting_balance: Fixed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceToppedUpEvent {
    pub user: UserId,
    pub amount: Fixed,
    pub new_balance: Fixed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairPriceUpdatedEvent {
    pub pair_id: PairId,
    /// zero when this is the first posted price
    pub old_price: Fixed,
    pub new_price: Fixed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairStatusChangedEvent {
    pub pair_id: PairId,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionOpenedEvent {
    pub owner: UserId,
    pub position_id: PositionId,
    pub pair_id: PairId,
    pub side: Side,
    pub leverage: Leverage,
    pub collateral: Fixed,
    pub entry_price: Fixed,
    pub liquidation_price: Fixed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionClosedEvent {
    pub owner: UserId,
    pub position_id: PositionId,
    pub pair_id: PairId,
    pub exit_price: Fixed,
    /// profit after fee, or realized loss capped at collateral
    pub net_amount: Fixed,
    pub is_profit: bool,
    pub fee: Fixed,
    pub reason: CloseReason,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XpAwardedEvent {
    pub user: UserId,
    pub kind: ActivityKind,
    pub amount: u64,
    pub streak_days: u32,
    pub new_total_xp: u128,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelUpEvent {
    pub user: UserId,
    pub old_level: u32,
    pub new_level: u32,
    pub new_max_leverage: Leverage,
}

pub trait EventEmitter {
    fn emit(&mut self, event: Event);
}

#[derive(Debug, Default)]
pub struct EventCollector {
    events: Vec<Event>,
    next_id: u64,
}

impl EventCollector {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            next_id: 1,
        }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn next_id(&mut self) -> EventId {
        let id = EventId(self.next_id);
        self.next_id += 1;
        id
    }
}

impl EventEmitter for EventCollector {
    fn emit(&mut self, event: Event) {
        self.events.push(event);
    }
}
