//! Game time and the accumulators behind each fixed-cadence subsystem.

use serde::{Deserialize, Serialize};

/// Simulation clock. Saved alongside the player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SimClock {
    /// Unpaused seconds since the game began.
    pub game_time: f32,
    pub paused: bool,
    pub resource_timer: f32,
    pub economy_timer: f32,
    pub reputation_timer: f32,
    pub maintenance_timer: f32,
}

/// Accumulate `dt` into `timer`; true when it crosses `interval`.
///
/// The timer resets to zero on firing, so overshoot is dropped.
pub fn fire_timer(timer: &mut f32, dt: f32, interval: f32) -> bool {
    *timer += dt;
    if *timer >= interval {
        *timer = 0.0;
        true
    } else {
        false
    }
}
