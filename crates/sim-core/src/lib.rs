#![deny(warnings)]

//! Core domain models and invariants for the tycoon simulation.
//!
//! This crate defines the serializable economy types (resources, the ledger,
//! buildings, timed investments and the player) together with the tuning
//! they are built from, plus validation helpers for state that arrives from
//! outside the simulation, such as a loaded save.

pub mod building;
pub mod clock;
pub mod config;
pub mod factory;
pub mod ledger;
pub mod player;
pub mod production;
pub mod resource;

pub use building::{BonusRoll, Building, BuildingKind, TickOutcome, TierFactors};
pub use clock::{fire_timer, SimClock};
pub use config::{ConfigError, PriceModel, TuningConfig, DEFAULT_SAVE_PATH};
pub use factory::BuildingFactory;
pub use ledger::{LedgerError, ResourceLedger};
pub use player::Player;
pub use production::{Production, ProductionKind};
pub use resource::{Resource, ResourceKind, ResourceRequirement};

use thiserror::Error;

/// Validation errors for domain invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("unknown resource kind id {0}")]
    UnknownResourceKind(i32),
    #[error("unknown building kind id {0}")]
    UnknownBuildingKind(i32),
    #[error("unknown production kind id {0}")]
    UnknownProductionKind(i32),
    /// Numeric field must be finite.
    #[error("non-finite numeric value in {0}")]
    NonFinite(&'static str),
    /// Money, stock or reputation below zero, or a price not above it.
    #[error("negative value in {0}")]
    Negative(&'static str),
    /// Level outside [1, max level].
    #[error("building level {0} is out of range")]
    LevelOutOfRange(i32),
    #[error("efficiency must be within [0,1]")]
    InvalidEfficiency,
    /// Two entries of the same kind are owned.
    #[error("more than one owned {0}")]
    DuplicateOwned(BuildingKind),
}

/// Validate a building against the level cap.
pub fn validate_building(b: &Building, max_level: i32) -> Result<(), ValidationError> {
    if !(1..=max_level).contains(&b.level) {
        return Err(ValidationError::LevelOutOfRange(b.level));
    }
    if !b.efficiency.is_finite() || !(0.0..=1.0).contains(&b.efficiency) {
        return Err(ValidationError::InvalidEfficiency);
    }
    if !(b.base_production_rate.is_finite()
        && b.maintenance_cost.is_finite()
        && b.upgrade_cost.is_finite())
    {
        return Err(ValidationError::NonFinite("building"));
    }
    if b.base_production_rate < 0.0 || b.maintenance_cost < 0.0 || b.upgrade_cost < 0.0 {
        return Err(ValidationError::Negative("building"));
    }
    Ok(())
}

/// Validate a timed investment.
pub fn validate_production(p: &Production) -> Result<(), ValidationError> {
    if !(p.current_time.is_finite() && p.completion_time.is_finite() && p.completion_amount.is_finite())
    {
        return Err(ValidationError::NonFinite("production"));
    }
    if p.current_time < 0.0 || p.cost < 0.0 {
        return Err(ValidationError::Negative("production"));
    }
    Ok(())
}

/// Validate the whole player, including the one-owned-per-kind rule.
pub fn validate_player(player: &Player, max_level: i32) -> Result<(), ValidationError> {
    if !player.money.is_finite() {
        return Err(ValidationError::NonFinite("money"));
    }
    if player.money < 0.0 {
        return Err(ValidationError::Negative("money"));
    }
    if player.reputation < 0 {
        return Err(ValidationError::Negative("reputation"));
    }
    for r in player.resources.values() {
        if !(r.amount.is_finite() && r.base_price.is_finite()) {
            return Err(ValidationError::NonFinite("resource"));
        }
        if r.amount < 0.0 {
            return Err(ValidationError::Negative("resource"));
        }
        if r.base_price <= 0.0 {
            return Err(ValidationError::Negative("price"));
        }
    }
    let mut owned = Vec::new();
    for b in &player.buildings {
        validate_building(b, max_level)?;
        if b.owned {
            if owned.contains(&b.kind) {
                return Err(ValidationError::DuplicateOwned(b.kind));
            }
            owned.push(b.kind);
        }
    }
    for p in &player.productions {
        validate_production(p)?;
    }
    Ok(())
}
