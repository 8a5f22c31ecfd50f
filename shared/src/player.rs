//! The authoritative player record. Created on `join`, mutated only by the owning game
//! instance's tick loop, destroyed on disconnect or explicit leave — see the `server`
//! crate's `instance` module for the code that owns this lifecycle.

use crate::Life;

/// One player's simulated state.
///
/// `last_input_seq` starts at `-1` (no input processed yet) and only ever increases,
/// and only when a strictly greater sequence number is processed — replayed or
/// out-of-order duplicates never move it backwards.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub life: Life,
    pub last_input_seq: i64,
}

impl Player {
    /// Creates a newly joined player at `(x, y)` with full health and no processed input.
    pub fn new(id: impl Into<String>, x: f32, y: f32) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            life: Life::new(crate::DEFAULT_HEALTH),
            last_input_seq: -1,
        }
    }

    /// Axis-aligned bounding box `(left, top, right, bottom)` using [`crate::PLAYER_SIZE`].
    pub fn bounds(&self) -> (f32, f32, f32, f32) {
        let half = crate::PLAYER_SIZE / 2.0;
        (self.x - half, self.y - half, self.x + half, self.y + half)
    }

    /// Records a newly processed input sequence; a no-op if `seq` is not strictly
    /// greater than the current value, so out-of-order replays never regress it.
    pub fn observe_input_seq(&mut self, seq: i64) {
        if seq > self.last_input_seq {
            self.last_input_seq = seq;
        }
    }
}
