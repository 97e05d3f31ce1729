//! Timed investments: pay up front, collect a lump sum when the timer matures.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ValidationError;

/// Kinds of timed investments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum ProductionKind {
    Furniture = 0,
    Tools = 1,
    Railroads = 2,
    Jewelry = 3,
}

impl ProductionKind {
    pub const ALL: [ProductionKind; 4] = [
        ProductionKind::Furniture,
        ProductionKind::Tools,
        ProductionKind::Railroads,
        ProductionKind::Jewelry,
    ];

    pub fn id(self) -> i32 {
        self as i32
    }

    pub fn from_id(id: i32) -> Result<Self, ValidationError> {
        Self::ALL
            .into_iter()
            .find(|k| k.id() == id)
            .ok_or(ValidationError::UnknownProductionKind(id))
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ProductionKind::Furniture => "Furniture Hut",
            ProductionKind::Tools => "Tool Yard",
            ProductionKind::Railroads => "Railroad Station",
            ProductionKind::Jewelry => "Jewelry Manufacturing",
        }
    }
}

impl fmt::Display for ProductionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Production {
    pub kind: ProductionKind,
    pub name: String,
    pub cost: f32,
    /// Seconds accumulated since the investment was made.
    pub current_time: f32,
    /// Seconds until payout.
    pub completion_time: f32,
    pub completion_amount: f32,
    pub required_reputation: i32,
    pub invested: bool,
    pub owned: bool,
}

impl Production {
    /// Fraction of the timer elapsed, 0 while idle.
    pub fn progress(&self) -> f32 {
        if !self.invested || self.completion_time <= 0.0 {
            return 0.0;
        }
        (self.current_time / self.completion_time).clamp(0.0, 1.0)
    }

    pub fn remaining(&self) -> f32 {
        if !self.invested {
            return 0.0;
        }
        (self.completion_time - self.current_time).max(0.0)
    }

    /// Start the timer. Returns false if already invested.
    pub fn invest(&mut self) -> bool {
        if self.invested {
            return false;
        }
        self.invested = true;
        self.current_time = 0.0;
        true
    }

    /// Advance the timer. Returns the payout when it matures, resetting to idle.
    pub fn advance(&mut self, dt: f32) -> Option<f32> {
        if !self.invested {
            return None;
        }
        self.current_time += dt;
        if self.current_time >= self.completion_time {
            self.invested = false;
            self.current_time = 0.0;
            return Some(self.completion_amount);
        }
        None
    }
}
