//! Remote View: smooths another player's position between authoritative snapshots
//! (§4.6). Simpler than prediction — there are no local inputs to replay, only a
//! target to chase.

/// How fast `current` chases `target`, in world units/second. Deliberately faster
/// than the player's own movement speed so interpolation catches up rather than
/// permanently lagging behind a moving target.
const INTERPOLATION_SPEED: f32 = 700.0;
/// A jump larger than this is treated as a teleport (join, respawn) rather than
/// something to interpolate through.
const SNAP_THRESHOLD: f32 = 100.0;

/// Interpolated view of one remote player.
pub struct RemoteView {
    pub current: (f32, f32),
    pub target: (f32, f32),
    pub health: i32,
    pub max_health: i32,
    pub alive: bool,
}

impl RemoteView {
    pub fn new(x: f32, y: f32, health: i32, max_health: i32, alive: bool) -> Self {
        Self {
            current: (x, y),
            target: (x, y),
            health,
            max_health,
            alive,
        }
    }

    /// Updates from a fresh server snapshot. Health and `alive` are authoritative and
    /// always overwritten; position snaps outright if the new value is implausibly far
    /// from the current one, otherwise becomes the interpolation target.
    pub fn update_from_server(&mut self, x: f32, y: f32, health: i32, max_health: i32, alive: bool) {
        let dx = x - self.current.0;
        let dy = y - self.current.1;
        if dx.hypot(dy) > SNAP_THRESHOLD {
            self.current = (x, y);
        }
        self.target = (x, y);
        self.health = health;
        self.max_health = max_health;
        self.alive = alive;
    }

    /// Advances `current` toward `target` by at most `INTERPOLATION_SPEED * frame_dt`,
    /// clamped so it never overshoots.
    pub fn tick(&mut self, frame_dt: f32) {
        let dx = self.target.0 - self.current.0;
        let dy = self.target.1 - self.current.1;
        let distance = dx.hypot(dy);
        if distance <= f32::EPSILON {
            return;
        }
        let max_step = INTERPOLATION_SPEED * frame_dt;
        if max_step >= distance {
            self.current = self.target;
        } else {
            let ratio = max_step / distance;
            self.current.0 += dx * ratio;
            self.current.1 += dy * ratio;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_update_becomes_target_without_snapping() {
        let mut view = RemoteView::new(100.0, 100.0, 100, 100, true);
        view.update_from_server(110.0, 100.0, 100, 100, true);
        assert_eq!(view.current, (100.0, 100.0));
        assert_eq!(view.target, (110.0, 100.0));
    }

    #[test]
    fn large_update_snaps_current_and_target() {
        let mut view = RemoteView::new(100.0, 100.0, 100, 100, true);
        view.update_from_server(900.0, 900.0, 80, 100, true);
        assert_eq!(view.current, (900.0, 900.0));
        assert_eq!(view.target, (900.0, 900.0));
    }

    #[test]
    fn tick_moves_toward_target_without_overshoot() {
        let mut view = RemoteView::new(0.0, 0.0, 100, 100, true);
        view.update_from_server(10.0, 0.0, 100, 100, true);
        view.tick(1.0 / 60.0);
        assert!(view.current.0 > 0.0);
        assert!(view.current.0 <= 10.0);
    }

    #[test]
    fn tick_reaches_target_exactly_when_close_enough() {
        let mut view = RemoteView::new(0.0, 0.0, 100, 100, true);
        view.update_from_server(1.0, 0.0, 100, 100, true);
        view.tick(1.0); // max_step = 700, distance = 1
        assert_eq!(view.current, view.target);
    }

    #[test]
    fn health_and_alive_always_update_even_without_movement() {
        let mut view = RemoteView::new(0.0, 0.0, 100, 100, true);
        view.update_from_server(0.0, 0.0, 0, 100, false);
        assert_eq!(view.health, 0);
        assert!(!view.alive);
    }
}
