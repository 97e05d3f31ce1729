//! Game-balance tuning: timer cadences, economy constants and market bands.
//!
//! Defaults reproduce the reference balance. A YAML file may override any
//! subset of fields.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::resource::ResourceKind;

/// Errors raised while loading or validating tuning.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// A field holds a value the simulation cannot run with.
    #[error("invalid tuning value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Price dynamics for one resource kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceModel {
    pub kind: ResourceKind,
    /// Price at the start of a new game.
    pub initial_price: f32,
    /// Lower bound of the per-tick relative change; `None` uses `-volatility`.
    #[serde(default)]
    pub min_change: Option<f32>,
    /// Upper bound of the per-tick relative change; `None` uses `+volatility`.
    #[serde(default)]
    pub max_change: Option<f32>,
    pub floor: f32,
    #[serde(default)]
    pub ceiling: Option<f32>,
}

impl PriceModel {
    fn banded(kind: ResourceKind, initial_price: f32, floor: f32, ceiling: f32) -> Self {
        Self {
            kind,
            initial_price,
            min_change: None,
            max_change: None,
            floor,
            ceiling: Some(ceiling),
        }
    }

    fn stable(kind: ResourceKind, initial_price: f32, change: f32, floor: f32, ceiling: f32) -> Self {
        Self {
            kind,
            initial_price,
            min_change: Some(-change),
            max_change: Some(change),
            floor,
            ceiling: Some(ceiling),
        }
    }

    /// Fallback for kinds without an explicit model.
    pub fn unbounded(kind: ResourceKind) -> Self {
        Self {
            kind,
            initial_price: 1.0,
            min_change: None,
            max_change: None,
            floor: 1.0,
            ceiling: None,
        }
    }

    /// Relative change range given the global volatility.
    pub fn change_range(&self, volatility: f32) -> (f32, f32) {
        (
            self.min_change.unwrap_or(-volatility),
            self.max_change.unwrap_or(volatility),
        )
    }

    /// Clamp a candidate price into the band.
    pub fn clamp(&self, price: f32) -> f32 {
        let p = price.max(self.floor);
        match self.ceiling {
            Some(c) => p.min(c),
            None => p,
        }
    }

    pub fn contains(&self, price: f32) -> bool {
        price >= self.floor && self.ceiling.map_or(true, |c| price <= c)
    }
}

/// Save file used when none is configured.
pub const DEFAULT_SAVE_PATH: &str = "savegame.dat";

/// Complete tuning for a simulation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningConfig {
    /// Seconds between building production ticks.
    pub resource_interval: f32,
    /// Seconds between market price updates.
    pub economy_interval: f32,
    /// Seconds between reputation grants.
    pub reputation_interval: f32,
    /// Seconds between maintenance charges.
    pub maintenance_interval: f32,
    pub fps_interval: f32,
    /// Frame deltas above this are clamped.
    pub max_delta_time: f32,

    pub player_name: String,
    pub starting_money: f32,
    pub starting_reputation: i32,

    pub reputation_bonus_per_point: f32,
    pub research_lab_bonus_per_level: f32,
    /// Factor applied to rate, maintenance and upgrade cost on each upgrade.
    pub upgrade_growth: f32,
    pub max_level: i32,
    /// Share of a building's cost refunded when it is sold.
    pub sell_refund_fraction: f32,

    pub price_volatility: f32,
    pub price_models: Vec<PriceModel>,

    /// Maximum efficiency loss per second when inputs run short.
    pub efficiency_decay_rate: f32,
    /// Global throttle on input consumption.
    pub fuel_consumption_factor: f32,
    /// Units of each input granted when a building is bought.
    pub starter_input_quantity: f32,
    /// Production never raises a stock above this.
    pub storage_capacity: f32,

    pub stock_unlock_price: f32,
    pub stock_unlock_reputation: i32,

    /// Seed for the market and bonus-roll RNG.
    pub rng_seed: u64,
    pub save_path: PathBuf,
}

impl Default for TuningConfig {
    fn default() -> Self {
        use ResourceKind::*;
        Self {
            resource_interval: 0.5,
            economy_interval: 1.0,
            reputation_interval: 10.0,
            maintenance_interval: 0.1,
            fps_interval: 1.0,
            max_delta_time: 0.1,
            player_name: "Player".to_string(),
            starting_money: 500.0,
            starting_reputation: 0,
            reputation_bonus_per_point: 0.01,
            research_lab_bonus_per_level: 0.05,
            upgrade_growth: 1.5,
            max_level: 5,
            sell_refund_fraction: 0.5,
            price_volatility: 0.1,
            price_models: vec![
                PriceModel::banded(Wood, 4.0, 1.0, 20.0),
                PriceModel::banded(Stone, 8.0, 2.0, 30.0),
                PriceModel::banded(Iron, 15.0, 5.0, 50.0),
                PriceModel::stable(Gold, 200.0, 0.05, 100.0, 500.0),
                PriceModel::banded(Crystal, 100.0, 50.0, 200.0),
                PriceModel::banded(Energy, 20.0, 10.0, 40.0),
                PriceModel::stable(Diamond, 500.0, 0.03, 400.0, 1000.0),
            ],
            efficiency_decay_rate: 0.03,
            fuel_consumption_factor: 0.1,
            starter_input_quantity: 20.0,
            storage_capacity: 100.0,
            stock_unlock_price: 1000.0,
            stock_unlock_reputation: 40,
            rng_seed: 42,
            save_path: PathBuf::from(DEFAULT_SAVE_PATH),
        }
    }
}

impl TuningConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: TuningConfig = serde_yaml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    /// Price model for `kind`, falling back to a floor-only model.
    pub fn price_model(&self, kind: ResourceKind) -> PriceModel {
        self.price_models
            .iter()
            .find(|m| m.kind == kind)
            .cloned()
            .unwrap_or_else(|| PriceModel::unbounded(kind))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let intervals = [
            ("resource_interval", self.resource_interval),
            ("economy_interval", self.economy_interval),
            ("reputation_interval", self.reputation_interval),
            ("maintenance_interval", self.maintenance_interval),
            ("fps_interval", self.fps_interval),
            ("max_delta_time", self.max_delta_time),
        ];
        for (field, value) in intervals {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(field, format!("must be > 0, got {value}")));
            }
        }
        if !(self.starting_money.is_finite() && self.starting_money >= 0.0) {
            return Err(invalid("starting_money", "must be >= 0"));
        }
        if self.starting_reputation < 0 {
            return Err(invalid("starting_reputation", "must be >= 0"));
        }
        if !(self.upgrade_growth.is_finite() && self.upgrade_growth >= 1.0) {
            return Err(invalid("upgrade_growth", "must be >= 1"));
        }
        if self.max_level < 1 {
            return Err(invalid("max_level", "must be >= 1"));
        }
        if !(0.0..=1.0).contains(&self.sell_refund_fraction) {
            return Err(invalid("sell_refund_fraction", "must be within [0,1]"));
        }
        if !(0.0..1.0).contains(&self.price_volatility) {
            return Err(invalid("price_volatility", "must be within [0,1)"));
        }
        if !(self.efficiency_decay_rate.is_finite() && self.efficiency_decay_rate >= 0.0) {
            return Err(invalid("efficiency_decay_rate", "must be >= 0"));
        }
        if !(self.fuel_consumption_factor.is_finite() && self.fuel_consumption_factor > 0.0) {
            return Err(invalid("fuel_consumption_factor", "must be > 0"));
        }
        if !(self.storage_capacity.is_finite() && self.storage_capacity > 0.0) {
            return Err(invalid("storage_capacity", "must be > 0"));
        }
        for m in &self.price_models {
            let (lo, hi) = m.change_range(self.price_volatility);
            if lo > hi || lo <= -1.0 {
                return Err(invalid("price_models", format!("bad change range for {}", m.kind)));
            }
            if m.floor <= 0.0 || m.ceiling.is_some_and(|c| c < m.floor) {
                return Err(invalid("price_models", format!("bad band for {}", m.kind)));
            }
            if !m.contains(m.initial_price) {
                return Err(invalid(
                    "price_models",
                    format!("initial price of {} outside its band", m.kind),
                ));
            }
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}
