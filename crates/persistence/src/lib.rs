#![deny(warnings)]

//! Binary save files for the tycoon simulation.
//!
//! A save captures the clock and the player. Loading rebuilds every
//! building and investment from its factory template and lays the saved
//! fields over it, so template data that never changes at runtime is not
//! trusted from disk.

pub mod records;

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};
use tycoon_core::{
    validate_player, BuildingFactory, Player, ResourceKind, SimClock, TuningConfig,
    ValidationError,
};

pub use records::{BuildingRecord, ProductionRecord, ResourceRecord, SaveFile, TimerRecord};

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Truncated or malformed bytes.
    #[error("malformed save data: {0}")]
    Codec(#[from] bincode::Error),
    #[error("invalid save contents: {0}")]
    Invalid(#[from] ValidationError),
    #[error("invalid stocks flag {0}")]
    InvalidFlag(u64),
}

impl SaveFile {
    /// Snapshot the clock and player into save records.
    pub fn capture(clock: &SimClock, player: &Player) -> Self {
        Self {
            game_time: clock.game_time,
            paused: clock.paused,
            timers: TimerRecord::from_clock(clock),
            player_name: player.name.clone(),
            money: player.money,
            reputation: player.reputation,
            total_earnings: player.total_earnings,
            total_spent: player.total_spent,
            achievements: player.achievements,
            resources: player.resources.values().map(ResourceRecord::from).collect(),
            buildings: player.buildings.iter().map(BuildingRecord::from).collect(),
            productions: player.productions.iter().map(ProductionRecord::from).collect(),
            stocks_unlocked: u64::from(player.stocks_unlocked),
        }
    }

    /// Rebuild the clock and player.
    ///
    /// Kinds missing from the file fall back to their new-game state.
    pub fn restore(self, cfg: &TuningConfig) -> Result<(SimClock, Player), PersistenceError> {
        let stocks_unlocked = match self.stocks_unlocked {
            0 => false,
            1 => true,
            other => return Err(PersistenceError::InvalidFlag(other)),
        };
        let clock = SimClock {
            game_time: self.game_time,
            paused: self.paused,
            resource_timer: self.timers.resource,
            economy_timer: self.timers.economy,
            reputation_timer: self.timers.reputation,
            maintenance_timer: self.timers.maintenance,
        };
        let clock_values = [
            clock.game_time,
            clock.resource_timer,
            clock.economy_timer,
            clock.reputation_timer,
            clock.maintenance_timer,
        ];
        if clock_values.iter().any(|v| !v.is_finite()) {
            return Err(ValidationError::NonFinite("clock").into());
        }
        if clock_values.iter().any(|v| *v < 0.0) {
            return Err(ValidationError::Negative("clock").into());
        }

        let mut player = Player::new_game(cfg);
        player.name = self.player_name;
        player.money = self.money;
        player.reputation = self.reputation;
        player.total_earnings = self.total_earnings;
        player.total_spent = self.total_spent;
        player.achievements = self.achievements;
        player.stocks_unlocked = stocks_unlocked;

        for rec in self.resources {
            let mut resource = rec.into_resource()?;
            if resource.kind != ResourceKind::Money && resource.base_price.is_finite() {
                let clamped = cfg.price_model(resource.kind).clamp(resource.base_price);
                if clamped != resource.base_price {
                    warn!(resource = %resource.kind, saved = resource.base_price, clamped, "saved price outside its band");
                    resource.base_price = clamped;
                }
            }
            player.resources.insert(resource.kind, resource);
        }
        if let Some(wallet) = player.resources.get_mut(&ResourceKind::Money) {
            wallet.amount = player.money;
        }

        let mut buildings = Vec::with_capacity(self.buildings.len());
        for rec in self.buildings {
            buildings.push(rec.into_building()?);
        }
        for kind in BuildingFactory::available_building_kinds() {
            if !buildings.iter().any(|b| b.kind == kind) {
                buildings.push(BuildingFactory::create_building(kind));
            }
        }
        player.seeded_kinds = buildings.iter().filter(|b| b.owned).map(|b| b.kind).collect();
        player.buildings = buildings;

        for rec in &self.productions {
            let kind = rec.kind()?;
            if let Some(p) = player.productions.iter_mut().find(|p| p.kind == kind) {
                rec.apply_to(p)?;
            }
        }

        validate_player(&player, cfg.max_level)?;
        Ok((clock, player))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, PersistenceError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PersistenceError> {
        Ok(bincode::deserialize(bytes)?)
    }
}

/// Write a save file, creating parent directories as needed.
pub fn save_to_path(
    path: &Path,
    clock: &SimClock,
    player: &Player,
) -> Result<(), PersistenceError> {
    let bytes = SaveFile::capture(clock, player).to_bytes()?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| PersistenceError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, &bytes).map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), bytes = bytes.len(), "game saved");
    Ok(())
}

/// Read and rebuild a save file.
pub fn load_from_path(
    path: &Path,
    cfg: &TuningConfig,
) -> Result<(SimClock, Player), PersistenceError> {
    let bytes = fs::read(path).map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = bytes.len(), "read save file");
    SaveFile::from_bytes(&bytes)?.restore(cfg)
}
