//! Local Controller: client-side prediction and reconciliation for the player this
//! client drives. Applies every input immediately to a predicted position, then
//! reconciles against authoritative snapshots by accumulating a correction and
//! draining it over several frames rather than snapping (§4.5).

use std::collections::VecDeque;

use shared::map::MapDescriptor;
use shared::message::InputMask;
use shared::Player;

/// Retained input history is capped so a long outage can't grow this unboundedly;
/// the oldest unacknowledged input is dropped first.
const MAX_PENDING_INPUTS: usize = 120;
const CORRECTION_RATE: f32 = 20.0;
const SMOOTHING_RATE: f32 = 20.0;
/// Divergence beyond this many world units on a full `game_state` is treated as a
/// resync rather than something to smooth away (e.g. first join, respawn).
const SNAP_THRESHOLD: f32 = 100.0;

struct PendingInput {
    seq: u32,
    k: InputMask,
}

/// Prediction + reconciliation state for the locally controlled player.
///
/// `pos` is the predicted authority-converging position; `render_pos` trails `pos`
/// under [`SMOOTHING_RATE`] so corrections never appear as a visible snap.
pub struct LocalController {
    pub pos: (f32, f32),
    pub render_pos: (f32, f32),
    pending_inputs: VecDeque<PendingInput>,
    last_processed_seq: i64,
    correction: (f32, f32),
    next_input_seq: u32,
    pub health: i32,
    pub max_health: i32,
    pub alive: bool,
}

impl LocalController {
    pub fn new(x: f32, y: f32, health: i32, max_health: i32) -> Self {
        Self {
            pos: (x, y),
            render_pos: (x, y),
            pending_inputs: VecDeque::new(),
            last_processed_seq: -1,
            correction: (0.0, 0.0),
            next_input_seq: 0,
            health,
            max_health,
            alive: health > 0,
        }
    }

    /// Applies one local input to the predicted position and enqueues it for later
    /// reconciliation. Returns the sequence number assigned to this input, to be sent
    /// to the server as `{t:"in", seq, ...}`.
    pub fn predict(&mut self, k: InputMask, map: &MapDescriptor) -> u32 {
        let seq = self.next_input_seq;
        self.next_input_seq = self.next_input_seq.wrapping_add(1);

        let mut scratch = Player::new("local", self.pos.0, self.pos.1);
        shared::simulation::step(&mut scratch, k, shared::tick_interval_secs(), map, shared::PLAYER_SPEED);
        self.pos = (scratch.x, scratch.y);

        self.pending_inputs.push_back(PendingInput { seq, k });
        if self.pending_inputs.len() > MAX_PENDING_INPUTS {
            self.pending_inputs.pop_front();
        }
        seq
    }

    /// Reconciles against one `game_update` entry for this player: `(server_x,
    /// server_y, server_last_input_seq)`. Stale snapshots (an already-seen or older
    /// `last_input_seq`) are discarded outright.
    pub fn reconcile(&mut self, server_x: f32, server_y: f32, server_last_seq: i64, map: &MapDescriptor) {
        if server_last_seq <= self.last_processed_seq {
            return;
        }
        self.last_processed_seq = server_last_seq;

        while matches!(self.pending_inputs.front(), Some(i) if i.seq as i64 <= self.last_processed_seq) {
            self.pending_inputs.pop_front();
        }

        let mut sim = Player::new("local", server_x, server_y);
        for input in &self.pending_inputs {
            shared::simulation::step(&mut sim, input.k, shared::tick_interval_secs(), map, shared::PLAYER_SPEED);
        }

        self.correction.0 += sim.x - self.pos.0;
        self.correction.1 += sim.y - self.pos.1;
    }

    /// Handles a full `game_state` snapshot: snaps outright if the server's position
    /// diverges from the predicted one by more than [`SNAP_THRESHOLD`], otherwise
    /// leaves prediction untouched (this message carries no `last_input_seq` delta to
    /// reconcile against beyond the initial join).
    pub fn apply_full_state(&mut self, server_x: f32, server_y: f32) {
        let dx = server_x - self.pos.0;
        let dy = server_y - self.pos.1;
        if dx.hypot(dy) > SNAP_THRESHOLD {
            self.pos = (server_x, server_y);
            self.render_pos = (server_x, server_y);
            self.correction = (0.0, 0.0);
        }
    }

    /// Drains the accumulated correction toward `pos` and smooths `render_pos` toward
    /// `pos`, both at a rate independent of network activity.
    pub fn smooth(&mut self, frame_dt: f32) {
        let cx = self.correction.0 * (CORRECTION_RATE * frame_dt).min(1.0);
        let cy = self.correction.1 * (CORRECTION_RATE * frame_dt).min(1.0);
        self.pos.0 += cx;
        self.pos.1 += cy;
        self.correction.0 -= cx;
        self.correction.1 -= cy;

        let rx = (self.pos.0 - self.render_pos.0) * (SMOOTHING_RATE * frame_dt).min(1.0);
        let ry = (self.pos.1 - self.render_pos.1) * (SMOOTHING_RATE * frame_dt).min(1.0);
        self.render_pos.0 += rx;
        self.render_pos.1 += ry;
    }

    pub fn set_health(&mut self, health: i32, max_health: i32, alive: bool) {
        self.health = health;
        self.max_health = max_health;
        self.alive = alive;
    }
}
