//! Input Source collaborator boundary (§6) and the send-rate gate from the prediction
//! core (§4.5 step 5). Capturing real keyboard/controller state is out of scope; this
//! module specifies the `{k: InputMask}` contract a real backend would implement and
//! ships headless/scripted stand-ins, plus the change-detection/keep-alive timing that
//! decides when a sampled input is worth sending.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use shared::message::InputMask;

/// External collaborator: returns the currently held input mask. The shipped backend
/// reads keyboard state when a windowing system is present; headless operation and
/// tests use [`NoInput`] or [`ScriptedInput`] instead.
pub trait InputSource {
    fn sample(&mut self) -> InputMask;
}

/// Always reports no input held. The default for headless operation.
#[derive(Default)]
pub struct NoInput;

impl InputSource for NoInput {
    fn sample(&mut self) -> InputMask {
        InputMask::empty()
    }
}

/// Replays a fixed, pre-recorded sequence of input masks, one per call; holds the last
/// entry once exhausted. Used in tests that need deterministic, repeatable input.
pub struct ScriptedInput {
    script: VecDeque<InputMask>,
    last: InputMask,
}

impl ScriptedInput {
    pub fn new(script: impl IntoIterator<Item = InputMask>) -> Self {
        Self {
            script: script.into_iter().collect(),
            last: InputMask::empty(),
        }
    }
}

impl InputSource for ScriptedInput {
    fn sample(&mut self) -> InputMask {
        if let Some(next) = self.script.pop_front() {
            self.last = next;
        }
        self.last
    }
}

/// Decides when a sampled input is worth transmitting: on a state change, or after
/// `1 / send_hz` seconds have elapsed since the last send, whichever comes first —
/// the keep-alive half of the rule keeps the server's `last_input_seq` advancing even
/// while the player holds still.
pub struct SendGate {
    send_hz: f32,
    last_sent: Option<InputMask>,
    last_send_at: Instant,
}

impl SendGate {
    pub fn new(send_hz: f32) -> Self {
        Self {
            send_hz,
            last_sent: None,
            last_send_at: Instant::now(),
        }
    }

    /// Returns `true` (and records the send) if `k` should be transmitted now.
    pub fn should_send(&mut self, k: InputMask, now: Instant) -> bool {
        let changed = self.last_sent != Some(k);
        let elapsed = now.duration_since(self.last_send_at);
        let timed_out = elapsed >= Duration::from_secs_f32(1.0 / self.send_hz);
        if changed || timed_out {
            self.last_sent = Some(k);
            self.last_send_at = now;
            true
        } else {
            false
        }
    }
}
