// 12.0: reentrancy latch. the engine wraps every state-mutating call with
// enter/exit so anything that tries to re-enter mid-operation fails fast
// instead of observing half-applied state. single-threaded by design; this
// guards logical re-entry, not threads.

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GuardError {
    #[error("reentrant call into a state-mutating operation")]
    ReentrantCall,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum GuardState {
    #[default]
    NotEntered,
    Entered,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CallGuard {
    state: GuardState,
}

impl CallGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&mut self) -> Result<(), GuardError> {
        match self.state {
            GuardState::NotEntered => {
                self.state = GuardState::Entered;
                Ok(())
            }
            GuardState::Entered => Err(GuardError::ReentrantCall),
        }
    }

    pub fn exit(&mut self) {
        debug_assert!(
            self.state == GuardState::Entered,
            "exit pairs with a successful enter"
        );
        self.state = GuardState::NotEntered;
    }

    pub fn is_entered(&self) -> bool {
        self.state == GuardState::Entered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enter_exit_flow() {
        let mut guard = CallGuard::new();
        assert!(!guard.is_entered());

        guard.enter().unwrap();
        assert!(guard.is_entered());

        guard.exit();
        assert!(!guard.is_entered());
    }

    #[test]
    fn double_enter_is_rejected() {
        let mut guard = CallGuard::new();
        guard.enter().unwrap();
        assert_eq!(guard.enter(), Err(GuardError::ReentrantCall));
        // the latch stays held by the original caller
        assert!(guard.is_entered());
    }

    #[test]
    fn exit_releases_for_the_next_call() {
        let mut guard = CallGuard::new();
        guard.enter().unwrap();
        guard.exit();
        assert!(guard.enter().is_ok());
    }
}
