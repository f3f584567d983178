use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle of the fixed-rate thread.
///
/// Transitions only move forward: `NotStarted -> Running -> Stopped`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoopState {
    NotStarted,
    Running,
    Stopped,
}

impl LoopState {
    fn to_u8(self) -> u8 {
        match self {
            LoopState::NotStarted => 0,
            LoopState::Running => 1,
            LoopState::Stopped => 2,
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            0 => LoopState::NotStarted,
            1 => LoopState::Running,
            _ => LoopState::Stopped,
        }
    }
}

/// Atomic cell holding a `LoopState`, shared with the worker thread.
#[derive(Debug)]
pub(crate) struct StateCell(AtomicU8);

impl StateCell {
    pub(crate) fn new() -> Self {
        Self(AtomicU8::new(LoopState::NotStarted.to_u8()))
    }

    pub(crate) fn get(&self) -> LoopState {
        LoopState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Moves forward to `next`. Backward moves are ignored and return `false`.
    pub(crate) fn advance(&self, next: LoopState) -> bool {
        let next = next.to_u8();
        self.0.fetch_max(next, Ordering::AcqRel) < next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_forward_only() {
        let cell = StateCell::new();
        assert_eq!(cell.get(), LoopState::NotStarted);

        assert!(cell.advance(LoopState::Running));
        assert!(cell.advance(LoopState::Stopped));
        assert!(!cell.advance(LoopState::Running));
        assert_eq!(cell.get(), LoopState::Stopped);
    }

    #[test]
    fn can_skip_straight_to_stopped() {
        let cell = StateCell::new();
        assert!(cell.advance(LoopState::Stopped));
        assert!(!cell.advance(LoopState::NotStarted));
        assert_eq!(cell.get(), LoopState::Stopped);
    }
}
