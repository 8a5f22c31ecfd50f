//! Current/max health bookkeeping shared by the authoritative server player and any
//! future client-side display of health. Kept deliberately small: damage sources and
//! healing triggers are out of scope here, only the arithmetic and its invariant are.

use serde::{Deserialize, Serialize};

/// `0 <= current <= max` always holds; `alive()` is `current > 0`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Life {
    current: i32,
    max: i32,
}

impl Life {
    pub fn new(max: i32) -> Self {
        assert!(max > 0, "max health must be positive");
        Self { current: max, max }
    }

    pub fn current(&self) -> i32 {
        self.current
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn alive(&self) -> bool {
        self.current > 0
    }

    /// Reduces current health by `amount`, clamped at zero. `amount` must be non-negative.
    pub fn lose(&mut self, amount: i32) {
        assert!(amount >= 0, "lose() amount must be non-negative");
        self.current = (self.current - amount).max(0);
    }

    /// Raises current health by `amount`, clamped at `max`. `amount` must be non-negative.
    pub fn heal(&mut self, amount: i32) {
        assert!(amount >= 0, "heal() amount must be non-negative");
        self.current = (self.current + amount).min(self.max);
    }

    /// Changes the maximum, preserving `current` where it still fits (never raises it).
    pub fn set_max(&mut self, new_max: i32) {
        assert!(new_max > 0, "max health must be positive");
        self.max = new_max;
        self.current = self.current.min(self.max);
    }
}
