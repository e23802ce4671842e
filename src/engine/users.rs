//! User registration and the practice-balance faucet.

use super::core::Engine;
use super::results::EngineError;
use crate::events::{BalanceToppedUpEvent, EventPayload, UserRegisteredEvent};
use crate::math::Fixed;
use crate::types::UserId;
use crate::user::User;

impl Engine {
    /// Register `caller` with the configured starting balance at level 1.
    pub fn register_user(&mut self, caller: UserId) -> Result<(), EngineError> {
        self.guard.enter()?;
        let result = self.register_user_inner(caller);
        self.guard.exit();
        result
    }

    fn register_user_inner(&mut self, caller: UserId) -> Result<(), EngineError> {
        if self.users.contains_key(&caller) {
            return Err(EngineError::UserAlreadyExists(caller));
        }

        let starting_balance = self.config.starting_balance;
        let user = User::register(caller, starting_balance, self.current_time);
        self.users.insert(caller, user);

        self.emit_event(EventPayload::UserRegistered(UserRegisteredEvent {
            user: caller,
            starting_balance,
        }));

        Ok(())
    }

    /// Credit practice funds to `caller` and return the new balance. Practice
    /// currency is free, so this is a faucet rather than a deposit.
    pub fn top_up(&mut self, caller: UserId, amount: Fixed) -> Result<Fixed, EngineError> {
        self.guard.enter()?;
        let result = self.top_up_inner(caller, amount);
        self.guard.exit();
        result
    }

    fn top_up_inner(&mut self, caller: UserId, amount: Fixed) -> Result<Fixed, EngineError> {
        if amount.is_zero() {
            return Err(EngineError::InvalidAmount);
        }
        let user = self
            .users
            .get_mut(&caller)
            .ok_or(EngineError::UserNotRegistered(caller))?;

        user.credit(amount)?;
        let new_balance = user.practice_balance;

        self.emit_event(EventPayload::BalanceToppedUp(BalanceToppedUpEvent {
            user: caller,
            amount,
            new_balance,
        }));

        Ok(new_balance)
    }
}
