//! On-disk record layout.
//!
//! Field order is the byte order. bincode writes numbers little-endian at
//! fixed width, a bool as one byte and a string or sequence behind a u64
//! length, so these structs describe the file exactly.

use serde::{Deserialize, Serialize};
use tycoon_core::{
    Building, BuildingFactory, BuildingKind, Production, ProductionKind, Resource, ResourceKind,
    SimClock, ValidationError,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimerRecord {
    pub resource: f32,
    pub economy: f32,
    pub reputation: f32,
    pub maintenance: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub kind: i32,
    pub name: String,
    pub amount: f32,
    pub base_price: f32,
    pub owned: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuildingRecord {
    pub kind: i32,
    pub name: String,
    pub level: i32,
    pub owned: bool,
    pub operational: bool,
    pub efficiency: f32,
    pub maintenance_cost: f32,
    pub required_reputation: i32,
    pub base_production_rate: f32,
    pub upgrade_cost: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductionRecord {
    pub kind: i32,
    pub name: String,
    pub owned: bool,
    pub current_time: f32,
    pub invested: bool,
    pub cost: f32,
    /// Stored as a float on disk.
    pub required_reputation: f32,
    pub completion_time: f32,
    pub completion_amount: f32,
}

/// A whole save file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaveFile {
    pub game_time: f32,
    pub paused: bool,
    pub timers: TimerRecord,
    pub player_name: String,
    pub money: f32,
    pub reputation: i32,
    pub total_earnings: f32,
    pub total_spent: f32,
    pub achievements: i32,
    pub resources: Vec<ResourceRecord>,
    pub buildings: Vec<BuildingRecord>,
    pub productions: Vec<ProductionRecord>,
    /// 0 or 1.
    pub stocks_unlocked: u64,
}

impl TimerRecord {
    pub fn from_clock(clock: &SimClock) -> Self {
        Self {
            resource: clock.resource_timer,
            economy: clock.economy_timer,
            reputation: clock.reputation_timer,
            maintenance: clock.maintenance_timer,
        }
    }
}

impl From<&Resource> for ResourceRecord {
    fn from(r: &Resource) -> Self {
        Self {
            kind: r.kind.id(),
            name: r.name.clone(),
            amount: r.amount,
            base_price: r.base_price,
            owned: r.owned,
        }
    }
}

impl ResourceRecord {
    pub fn into_resource(self) -> Result<Resource, ValidationError> {
        Ok(Resource {
            kind: ResourceKind::from_id(self.kind)?,
            name: self.name,
            amount: self.amount,
            base_price: self.base_price,
            owned: self.owned,
        })
    }
}

impl From<&Building> for BuildingRecord {
    fn from(b: &Building) -> Self {
        Self {
            kind: b.kind.id(),
            name: b.name.clone(),
            level: b.level,
            owned: b.owned,
            operational: b.operational,
            efficiency: b.efficiency,
            maintenance_cost: b.maintenance_cost,
            required_reputation: b.required_reputation,
            base_production_rate: b.base_production_rate,
            upgrade_cost: b.upgrade_cost,
        }
    }
}

impl BuildingRecord {
    /// Fresh template for the kind with the saved fields laid over it.
    ///
    /// Cost, inputs and outputs always come from the template.
    pub fn into_building(self) -> Result<Building, ValidationError> {
        let mut b = BuildingFactory::create_building(BuildingKind::from_id(self.kind)?);
        b.level = self.level;
        b.owned = self.owned;
        b.operational = self.operational;
        b.efficiency = self.efficiency;
        b.maintenance_cost = self.maintenance_cost;
        b.required_reputation = self.required_reputation;
        b.base_production_rate = self.base_production_rate;
        b.upgrade_cost = self.upgrade_cost;
        Ok(b)
    }
}

impl From<&Production> for ProductionRecord {
    fn from(p: &Production) -> Self {
        Self {
            kind: p.kind.id(),
            name: p.name.clone(),
            owned: p.owned,
            current_time: p.current_time,
            invested: p.invested,
            cost: p.cost,
            required_reputation: p.required_reputation as f32,
            completion_time: p.completion_time,
            completion_amount: p.completion_amount,
        }
    }
}

impl ProductionRecord {
    pub fn kind(&self) -> Result<ProductionKind, ValidationError> {
        ProductionKind::from_id(self.kind)
    }

    /// Overlay the saved fields onto the catalog entry of the same kind.
    pub fn apply_to(&self, p: &mut Production) -> Result<(), ValidationError> {
        if !self.required_reputation.is_finite() {
            return Err(ValidationError::NonFinite("production"));
        }
        p.owned = self.owned;
        p.current_time = self.current_time;
        p.invested = self.invested;
        p.cost = self.cost;
        p.required_reputation = self.required_reputation.round() as i32;
        p.completion_time = self.completion_time;
        p.completion_amount = self.completion_amount;
        Ok(())
    }
}
