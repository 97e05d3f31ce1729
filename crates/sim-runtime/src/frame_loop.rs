//! Guarded frame stepping. A failing or panicking frame is logged and
//! skipped; the session carries on.

use std::panic::{self, AssertUnwindSafe};

use tracing::error;

use crate::game::TycoonGame;

/// Counters kept across guarded frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub frames: u64,
    pub failed: u64,
}

#[derive(Debug, Default)]
pub struct FrameLoop {
    stats: FrameStats,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one update. Returns false when the frame failed.
    pub fn step(&mut self, game: &mut TycoonGame, delta_time: f32) -> bool {
        self.stats.frames += 1;
        match panic::catch_unwind(AssertUnwindSafe(|| game.update(delta_time))) {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                self.stats.failed += 1;
                error!(frame = self.stats.frames, error = %e, "frame update failed");
                false
            }
            Err(payload) => {
                self.stats.failed += 1;
                let msg = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                error!(frame = self.stats.frames, panic = %msg, "frame update panicked");
                false
            }
        }
    }

    /// Step `frames` times at a fixed delta.
    pub fn run(&mut self, game: &mut TycoonGame, delta_time: f32, frames: u64) -> FrameStats {
        for _ in 0..frames {
            self.step(game, delta_time);
        }
        self.stats
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }
}
