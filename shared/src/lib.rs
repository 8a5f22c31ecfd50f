//! # Shared Game Library
//!
//! This module contains all shared data structures, constants, and utilities used by both
//! the game client and server. It serves as the foundation for networked multiplayer
//! communication and ensures consistency across the distributed game architecture.
//!
//! ## Core Components
//!
//! ### Game Constants
//! Spatial and timing parameters that define the simulation:
//! - **Movement**: player speed, player size (collision half-extent source)
//! - **Ticking**: the fixed tick rate used by both the server's authoritative loop and
//!   the client's prediction step
//!
//! ### Network Protocol
//! The [`message::Message`] enum defines the complete wire format between client and
//! server. Every message is one line of JSON, tagged by a `t` field (see `message`).
//!
//! ### Game Entities
//! [`player::Player`] is the authoritative per-player state; [`map::MapDescriptor`]
//! describes a map's geometry; [`life::Life`] is the health model shared by both sides.
//!
//! ### Simulation
//! [`simulation::step`] is the single deterministic physics function used by the
//! server's authoritative tick and the client's local prediction. Calling it with the
//! same `(player, input, dt, map)` on both ends is what makes reconciliation converge.
//!
//! ## Design Philosophy
//!
//! ### Deterministic Simulation
//! All physics calculations use consistent floating-point operations and constants
//! so client prediction and server authority agree in the absence of packet loss.
//!
//! ### Serialization
//! Wire data structures implement `Serialize`/`Deserialize` and are encoded as
//! newline-delimited JSON (see `message`), not a binary format — this keeps the wire
//! human-inspectable and trivially line-buffered over a plain `TcpStream`.

pub mod life;
pub mod map;
pub mod message;
pub mod player;
pub mod simulation;

pub use life::Life;
pub use map::{MapDescriptor, Polygon};
pub use message::{InputMask, Message};
pub use player::Player;

/// Fixed simulation tick rate, in ticks per second.
///
/// Both the server's authoritative tick loop and the client's local prediction step
/// advance by `1.0 / TICK_RATE` seconds per input, never by measured wall-clock `dt`
/// — this is what keeps the two simulations bit-identical.
pub const TICK_RATE: u32 = 60;

/// Unit movement speed, in world units per second, applied along each held axis.
///
/// Diagonal movement (two axes held at once) is scaled by [`DIAGONAL_FACTOR`] so the
/// resultant speed still equals `PLAYER_SPEED`.
pub const PLAYER_SPEED: f32 = 200.0;

/// `1/sqrt(2)`, the scale factor applied to each axis when a diagonal input is held.
pub const DIAGONAL_FACTOR: f32 = 0.70710678;

/// Width and height of a player's square collision box, in world units.
///
/// Half of this is the half-extent used for both map-bounds clamping and the
/// player's AABB in collision tests against map geometry.
pub const PLAYER_SIZE: f32 = 32.0;

/// Default starting/maximum health for a newly created player.
pub const DEFAULT_HEALTH: i32 = 100;

/// Maximum newline-delimited message length, in bytes, before a connection is closed.
pub const MAX_LINE_BYTES: usize = 256 * 1024;

/// Returns the fixed per-tick integration step, `1.0 / TICK_RATE`, as an `f32` second count.
///
/// Exists so both `server` and `client` derive the same constant from [`TICK_RATE`]
/// rather than hand-copying the literal `1.0 / 60.0` in two crates.
pub fn tick_interval_secs() -> f32 {
    1.0 / TICK_RATE as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_interval_matches_tick_rate() {
        assert_eq!(TICK_RATE, 60);
        assert!((tick_interval_secs() - 1.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn diagonal_factor_is_inverse_sqrt_two() {
        assert!((DIAGONAL_FACTOR - 1.0 / std::f32::consts::SQRT_2).abs() < 1e-6);
    }
}
