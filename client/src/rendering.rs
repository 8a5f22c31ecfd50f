//! Renderer collaborator boundary (§6). Rendering itself is out of scope — this module
//! specifies only the contract the core loop drives every frame, plus a logging
//! implementation sufficient to exercise that loop without a windowing backend.

use crate::remote_view::RemoteView;
use shared::map::MapDescriptor;

/// What the core loop hands to a renderer once per frame. Consumes `MapDescriptor`
/// objects, the local player's smoothed `render_pos`, and every remote player's
/// interpolated `current` position — never the raw predicted or authoritative values.
pub trait Renderer {
    fn draw_map(&mut self, map: &MapDescriptor);
    fn draw_local_player(&mut self, render_pos: (f32, f32), health: i32, max_health: i32);
    fn draw_remote_player(&mut self, player_id: &str, view: &RemoteView);
    fn present(&mut self);
}

/// Headless stand-in: logs what a real renderer would draw instead of drawing it.
/// Sufficient to drive the client loop in tests and in environments with no display.
#[derive(Default)]
pub struct LoggingRenderer {
    frame: u64,
}

impl Renderer for LoggingRenderer {
    fn draw_map(&mut self, map: &MapDescriptor) {
        log::trace!("frame {}: map {} ({}x{})", self.frame, map.name, map.width, map.height);
    }

    fn draw_local_player(&mut self, render_pos: (f32, f32), health: i32, max_health: i32) {
        log::trace!(
            "frame {}: local player at {:?}, {}/{} hp",
            self.frame,
            render_pos,
            health,
            max_health
        );
    }

    fn draw_remote_player(&mut self, player_id: &str, view: &RemoteView) {
        log::trace!(
            "frame {}: remote {player_id} at {:?}, {}/{} hp, alive={}",
            self.frame,
            view.current,
            view.health,
            view.max_health,
            view.alive
        );
    }

    fn present(&mut self) {
        self.frame += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn present_advances_frame_counter() {
        let mut renderer = LoggingRenderer::default();
        renderer.present();
        renderer.present();
        assert_eq!(renderer.frame, 2);
    }
}
