//! The single deterministic physics step shared by server authority and client
//! prediction. Decodes an input mask into a velocity, integrates position by a fixed
//! `dt`, clamps to map bounds, and rejects movement on collision with map geometry.
//!
//! Calling this with identical `(player, input, dt, map)` on both ends of the wire is
//! what makes client-side prediction converge with the server's authoritative result.

use crate::map::MapDescriptor;
use crate::message::InputMask;
use crate::player::Player;
use crate::{DIAGONAL_FACTOR, PLAYER_SIZE, PLAYER_SPEED};

/// Decodes a held-input bitmask into a `(vx, vy)` velocity in world units/second at
/// the given `speed`. Server callers pass the configured `player_speed`; client
/// prediction passes [`PLAYER_SPEED`] directly, since no config channel exists to the
/// client in this protocol.
///
/// Opposing directions held simultaneously (e.g. `LEFT|RIGHT`) cancel to zero on that
/// axis. Diagonal movement (one held axis on each dimension) is scaled by
/// [`DIAGONAL_FACTOR`] so the resultant speed still equals `speed`.
pub fn decode_velocity(k: InputMask, speed: f32) -> (f32, f32) {
    let mut vx = 0.0;
    let mut vy = 0.0;
    if k.contains(InputMask::LEFT) {
        vx -= speed;
    }
    if k.contains(InputMask::RIGHT) {
        vx += speed;
    }
    if k.contains(InputMask::UP) {
        vy -= speed;
    }
    if k.contains(InputMask::DOWN) {
        vy += speed;
    }
    if vx != 0.0 && vy != 0.0 {
        vx *= DIAGONAL_FACTOR;
        vy *= DIAGONAL_FACTOR;
    }
    (vx, vy)
}

/// Tests whether an AABB centered at `(x, y)` with side `size` overlaps a polygon's
/// bounding rectangle. This is the only collision primitive the simulation uses —
/// polygons are treated as their AABB, never their true shape (see `shared::map`).
fn aabb_overlaps_polygon(x: f32, y: f32, size: f32, polygon: &crate::map::Polygon) -> bool {
    let half = size / 2.0;
    let (left, top, right, bottom) = (x - half, y - half, x + half, y + half);
    let (obj_left, obj_top, obj_right, obj_bottom) = polygon.bounds();
    !(right <= obj_left || obj_right <= left || bottom <= obj_top || obj_bottom <= top)
}

/// Advances `player` by one simulation step of length `dt`, given the currently held
/// input `k` and the map it occupies.
///
/// - Never touches `health`, `alive`, or `last_input_seq` — callers own that bookkeeping.
/// - Movement is clamped to the map bounds with a [`PLAYER_SIZE`]`/2` half-extent.
/// - If the resulting position's AABB overlaps any of the map's static polygons, the
///   movement is rejected outright: position is unchanged and velocity is zeroed,
///   rather than sliding or partially resolving the overlap.
pub fn step(player: &mut Player, k: InputMask, dt: f32, map: &MapDescriptor, speed: f32) {
    let (vx, vy) = decode_velocity(k, speed);

    let half = PLAYER_SIZE / 2.0;
    let new_x = (player.x + vx * dt).clamp(half, map.width - half);
    let new_y = (player.y + vy * dt).clamp(half, map.height - half);

    let collides = map
        .objects
        .iter()
        .any(|polygon| aabb_overlaps_polygon(new_x, new_y, PLAYER_SIZE, polygon));

    if collides {
        player.vx = 0.0;
        player.vy = 0.0;
        return;
    }

    player.x = new_x;
    player.y = new_y;
    player.vx = vx;
    player.vy = vy;
}
