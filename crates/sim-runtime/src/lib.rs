#![deny(warnings)]

//! Game orchestration: the per-frame update, player transactions and the
//! guarded frame loop the presentation layer drives.
//!
//! [`TycoonGame`] owns every piece of simulation state. Callers advance it
//! once per frame with [`TycoonGame::update`] (or through [`FrameLoop`],
//! which never lets a bad frame escape) and mutate it through the boolean
//! transaction methods.

mod frame_loop;
mod game;
mod snapshot;

pub use frame_loop::{FrameLoop, FrameStats};
pub use game::TycoonGame;
pub use snapshot::{BuildingView, GameSnapshot, ProductionView, ResourceView};

use thiserror::Error;
use tycoon_econ::EconError;

/// Failures inside a single frame update.
#[derive(Debug, Error, PartialEq)]
pub enum SimError {
    #[error("invalid delta time {0}")]
    InvalidDelta(f32),
    /// State left non-finite by a tick.
    #[error("non-finite {0} after update")]
    NonFinite(&'static str),
    #[error(transparent)]
    Econ(#[from] EconError),
}
