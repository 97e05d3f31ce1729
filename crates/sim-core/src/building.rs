//! Production buildings: efficiency model, production tick and leveling.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

use crate::config::TuningConfig;
use crate::ledger::ResourceLedger;
use crate::resource::ResourceRequirement;
use crate::ValidationError;

/// Kinds of production buildings.
///
/// The discriminants are the stable ids written to save files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum BuildingKind {
    Woodcutter = 0,
    Mine = 1,
    CrystalMine = 2,
    PowerPlant = 3,
    ResearchLab = 4,
    DiamondMine = 5,
}

/// Multipliers applied when some or all inputs are out of stock.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TierFactors {
    /// At least one input present, at least one missing.
    pub partial: f32,
    /// Every input missing.
    pub none: f32,
}

/// Level-scaled chance of a production bonus.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BonusRoll {
    pub chance_per_level: f32,
    pub factor: f32,
}

impl BuildingKind {
    pub const ALL: [BuildingKind; 6] = [
        BuildingKind::Woodcutter,
        BuildingKind::Mine,
        BuildingKind::CrystalMine,
        BuildingKind::PowerPlant,
        BuildingKind::ResearchLab,
        BuildingKind::DiamondMine,
    ];

    pub fn id(self) -> i32 {
        self as i32
    }

    pub fn from_id(id: i32) -> Result<Self, ValidationError> {
        Self::ALL
            .into_iter()
            .find(|k| k.id() == id)
            .ok_or(ValidationError::UnknownBuildingKind(id))
    }

    pub fn display_name(self) -> &'static str {
        match self {
            BuildingKind::Woodcutter => "Woodcutter's Hut",
            BuildingKind::Mine => "Mine",
            BuildingKind::CrystalMine => "Crystal Mine",
            BuildingKind::PowerPlant => "Power Plant",
            BuildingKind::ResearchLab => "Research Lab",
            BuildingKind::DiamondMine => "Diamond Mine",
        }
    }

    pub fn tier_factors(self) -> TierFactors {
        let (partial, none) = match self {
            BuildingKind::Woodcutter => (1.0, 1.0),
            BuildingKind::Mine => (0.2, 0.2),
            BuildingKind::PowerPlant => (0.4, 0.1),
            BuildingKind::CrystalMine => (0.3, 0.1),
            BuildingKind::ResearchLab => (0.3, 0.1),
            BuildingKind::DiamondMine => (0.02, 0.02),
        };
        TierFactors { partial, none }
    }

    pub fn bonus_roll(self) -> Option<BonusRoll> {
        let (chance_per_level, factor) = match self {
            BuildingKind::Woodcutter => (0.05, 1.5),
            BuildingKind::Mine => (0.03, 2.0),
            BuildingKind::PowerPlant => (0.04, 1.75),
            BuildingKind::CrystalMine => (0.02, 3.0),
            BuildingKind::ResearchLab | BuildingKind::DiamondMine => return None,
        };
        Some(BonusRoll {
            chance_per_level,
            factor,
        })
    }

    /// Research labs boost the global multiplier instead of producing.
    pub fn produces_directly(self) -> bool {
        self != BuildingKind::ResearchLab
    }
}

impl fmt::Display for BuildingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Result of one production tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickOutcome {
    /// Units of production after bonus and multiplier; 0 when starved.
    pub produced: f32,
    /// Inputs could not cover the tick.
    pub starved: bool,
    pub bonus: bool,
}

/// A production building, either an unowned catalog entry or the owned instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub kind: BuildingKind,
    pub name: String,
    /// Purchase price.
    pub cost: f32,
    /// Production units per second at full efficiency.
    pub base_production_rate: f32,
    pub inputs: Vec<ResourceRequirement>,
    pub outputs: Vec<ResourceRequirement>,
    /// Charged every maintenance tick while owned.
    pub maintenance_cost: f32,
    pub upgrade_cost: f32,
    pub required_reputation: i32,
    /// In [1, max level].
    pub level: i32,
    /// In [0, 1].
    pub efficiency: f32,
    pub operational: bool,
    pub owned: bool,
}

impl Building {
    pub fn is_active(&self) -> bool {
        self.owned && self.operational
    }

    /// Average over inputs of `min(stock / demand_per_second, 1)`.
    pub fn input_availability(&self, ledger: &ResourceLedger, fuel_factor: f32) -> f32 {
        if self.inputs.is_empty() {
            return 1.0;
        }
        let total: f32 = self
            .inputs
            .iter()
            .map(|req| {
                let needed = self.base_production_rate * req.rate * fuel_factor;
                if needed <= 0.0 {
                    1.0
                } else {
                    (ledger.get(req.kind) / needed).min(1.0)
                }
            })
            .sum();
        (total / self.inputs.len() as f32).clamp(0.0, 1.0)
    }

    /// Tier penalty from which inputs are entirely out of stock.
    pub fn tier_multiplier(&self, ledger: &ResourceLedger) -> f32 {
        if self.inputs.is_empty() {
            return 1.0;
        }
        let present = self
            .inputs
            .iter()
            .filter(|req| ledger.get(req.kind) > 0.0)
            .count();
        let tiers = self.kind.tier_factors();
        if present == self.inputs.len() {
            1.0
        } else if present == 0 {
            tiers.none
        } else {
            tiers.partial
        }
    }

    /// Recompute efficiency for a tick of `dt` seconds.
    ///
    /// Rises to the availability target at once, falls toward it no faster
    /// than the decay rate, then takes the tier penalty.
    pub fn update_efficiency(&mut self, ledger: &ResourceLedger, dt: f32, cfg: &TuningConfig) {
        let target = self.input_availability(ledger, cfg.fuel_consumption_factor);
        let smoothed = if target >= self.efficiency {
            target
        } else {
            (self.efficiency - cfg.efficiency_decay_rate * dt).max(target)
        };
        self.efficiency = (smoothed * self.tier_multiplier(ledger)).clamp(0.0, 1.0);
    }

    /// Production multiplier from the kind's bonus roll, 1.0 when it misses.
    pub fn roll_bonus<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        match self.kind.bonus_roll() {
            Some(roll) => {
                let chance = roll.chance_per_level * self.level as f32;
                if rng.gen::<f32>() < chance {
                    roll.factor
                } else {
                    1.0
                }
            }
            None => 1.0,
        }
    }

    /// Run one production tick against the shared ledger.
    ///
    /// Inputs are withdrawn all together or not at all; a shortfall zeroes
    /// the tick's production. Outputs stop at the storage capacity.
    pub fn produce<R: Rng + ?Sized>(
        &mut self,
        ledger: &mut ResourceLedger,
        dt: f32,
        multiplier: f32,
        cfg: &TuningConfig,
        rng: &mut R,
    ) -> TickOutcome {
        if !self.is_active() {
            return TickOutcome::default();
        }
        self.update_efficiency(ledger, dt, cfg);
        if !self.kind.produces_directly() {
            return TickOutcome::default();
        }

        let bonus = self.roll_bonus(rng);
        let production = self.base_production_rate * self.efficiency * dt * bonus * multiplier;
        if production <= 0.0 {
            return TickOutcome::default();
        }

        let requests: Vec<_> = self
            .inputs
            .iter()
            .map(|req| (req.kind, production * req.rate * cfg.fuel_consumption_factor))
            .collect();
        if let Err(e) = ledger.consume_all(&requests) {
            trace!(building = %self.kind, error = %e, "inputs short, tick skipped");
            return TickOutcome {
                produced: 0.0,
                starved: true,
                bonus: false,
            };
        }
        for out in &self.outputs {
            ledger.add_capped(out.kind, production * out.rate, cfg.storage_capacity);
        }
        TickOutcome {
            produced: production,
            starved: false,
            bonus: bonus > 1.0,
        }
    }

    /// Raise the level by one. Returns false at max level, leaving all fields unchanged.
    pub fn upgrade(&mut self, max_level: i32, growth: f32) -> bool {
        if self.level >= max_level {
            return false;
        }
        self.level += 1;
        self.base_production_rate *= growth;
        self.maintenance_cost *= growth;
        self.upgrade_cost *= growth;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::BuildingFactory;
    use crate::resource::ResourceKind;
    use proptest::prelude::*;
    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn owned(kind: BuildingKind) -> Building {
        let mut b = BuildingFactory::create_building(kind);
        b.owned = true;
        b
    }

    #[test]
    fn no_inputs_is_always_full_efficiency() {
        let cfg = TuningConfig::default();
        let mut b = owned(BuildingKind::Woodcutter);
        let ledger = ResourceLedger::new();
        for _ in 0..10 {
            b.update_efficiency(&ledger, 0.5, &cfg);
            assert_eq!(b.efficiency, 1.0);
        }
    }

    #[test]
    fn mine_without_energy_decays_not_snaps() {
        let cfg = TuningConfig::default();
        let mut mine = owned(BuildingKind::Mine);
        let ledger = ResourceLedger::new();
        let prior = mine.efficiency;
        mine.update_efficiency(&ledger, 0.5, &cfg);
        assert!(mine.efficiency > 0.0);
        let expected = (prior - cfg.efficiency_decay_rate * 0.5) * 0.2;
        assert!((mine.efficiency - expected).abs() < 1e-6);
        mine.update_efficiency(&ledger, 0.5, &cfg);
        assert!(mine.efficiency > 0.0);
        assert!(mine.efficiency <= 0.2 * prior);
    }

    #[test]
    fn efficiency_snaps_back_up() {
        let cfg = TuningConfig::default();
        let mut mine = owned(BuildingKind::Mine);
        let mut ledger = ResourceLedger::new();
        mine.update_efficiency(&ledger, 0.5, &cfg);
        assert!(mine.efficiency < 1.0);
        ledger.add(ResourceKind::Energy, 50.0);
        mine.update_efficiency(&ledger, 0.5, &cfg);
        assert_eq!(mine.efficiency, 1.0);
    }

    #[test]
    fn power_plant_tiers() {
        let cfg = TuningConfig::default();
        let plant = owned(BuildingKind::PowerPlant);
        let mut ledger = ResourceLedger::new();
        assert_eq!(plant.tier_multiplier(&ledger), 0.1);
        ledger.add(ResourceKind::Wood, 1.0);
        assert_eq!(plant.tier_multiplier(&ledger), 0.4);
        ledger.add(ResourceKind::Stone, 1.0);
        assert_eq!(plant.tier_multiplier(&ledger), 1.0);
        // rate 1.0 * fuel 0.1 => 0.1 needed per second, both covered
        assert_eq!(plant.input_availability(&ledger, cfg.fuel_consumption_factor), 1.0);
    }

    #[test]
    fn diamond_mine_needs_everything() {
        let dm = owned(BuildingKind::DiamondMine);
        let mut ledger = ResourceLedger::new();
        ledger.add(ResourceKind::Energy, 5.0);
        ledger.add(ResourceKind::Crystal, 5.0);
        assert_eq!(dm.tier_multiplier(&ledger), 0.02);
        ledger.add(ResourceKind::Gold, 5.0);
        assert_eq!(dm.tier_multiplier(&ledger), 1.0);
    }

    #[test]
    fn produce_consumes_and_deposits() {
        let cfg = TuningConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut plant = owned(BuildingKind::PowerPlant);
        let mut ledger = ResourceLedger::new();
        ledger.add(ResourceKind::Wood, 20.0);
        ledger.add(ResourceKind::Stone, 20.0);
        let out = plant.produce(&mut ledger, 0.5, 1.0, &cfg, &mut rng);
        assert!(!out.starved);
        assert!(out.produced >= 0.5);
        let used = out.produced * cfg.fuel_consumption_factor;
        assert!((ledger.get(ResourceKind::Wood) - (20.0 - used)).abs() < 1e-5);
        assert!((ledger.get(ResourceKind::Energy) - out.produced).abs() < 1e-5);
    }

    #[test]
    fn starved_tick_consumes_nothing() {
        let cfg = TuningConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut plant = owned(BuildingKind::PowerPlant);
        let mut ledger = ResourceLedger::new();
        ledger.add(ResourceKind::Wood, 20.0);
        let out = plant.produce(&mut ledger, 0.5, 1.0, &cfg, &mut rng);
        assert!(out.starved);
        assert_eq!(out.produced, 0.0);
        assert_eq!(ledger.get(ResourceKind::Wood), 20.0);
        assert_eq!(ledger.get(ResourceKind::Energy), 0.0);
    }

    #[test]
    fn research_lab_never_outputs() {
        let cfg = TuningConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut lab = owned(BuildingKind::ResearchLab);
        let mut ledger = ResourceLedger::new();
        ledger.add(ResourceKind::Energy, 10.0);
        ledger.add(ResourceKind::Crystal, 10.0);
        let out = lab.produce(&mut ledger, 0.5, 3.0, &cfg, &mut rng);
        assert_eq!(out.produced, 0.0);
        assert_eq!(ledger.get(ResourceKind::Energy), 10.0);
        assert_eq!(lab.efficiency, 1.0);
    }

    #[test]
    fn unowned_building_is_idle() {
        let cfg = TuningConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut wc = BuildingFactory::create_building(BuildingKind::Woodcutter);
        let mut ledger = ResourceLedger::new();
        assert_eq!(wc.produce(&mut ledger, 0.5, 1.0, &cfg, &mut rng), TickOutcome::default());
        assert_eq!(ledger.get(ResourceKind::Wood), 0.0);
    }

    #[test]
    fn output_respects_storage_capacity() {
        let cfg = TuningConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut wc = owned(BuildingKind::Woodcutter);
        let mut ledger = ResourceLedger::new();
        ledger.add(ResourceKind::Wood, 99.9);
        wc.produce(&mut ledger, 0.5, 1.0, &cfg, &mut rng);
        assert!(ledger.get(ResourceKind::Wood) <= cfg.storage_capacity);
    }

    #[test]
    fn upgrade_caps_at_max_level() {
        let mut b = owned(BuildingKind::Mine);
        for level in 2..=5 {
            assert!(b.upgrade(5, 1.5));
            assert_eq!(b.level, level);
        }
        let before = b.clone();
        assert!(!b.upgrade(5, 1.5));
        assert_eq!(b, before);
    }

    #[test]
    fn upgrade_scales_numbers() {
        let mut b = owned(BuildingKind::Woodcutter);
        assert!(b.upgrade(5, 1.5));
        assert_eq!(b.base_production_rate, 0.75);
        assert_eq!(b.upgrade_cost, 150.0);
        assert!((b.maintenance_cost - 0.015).abs() < 1e-7);
    }

    #[test]
    fn bonus_rolls_fire_sometimes() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut wc = owned(BuildingKind::Woodcutter);
        wc.level = 5;
        let hits = (0..2000).filter(|_| wc.roll_bonus(&mut rng) > 1.0).count();
        // 25% expected
        assert!(hits > 300 && hits < 700, "hits = {hits}");
        let dm = owned(BuildingKind::DiamondMine);
        assert!((0..200).all(|_| dm.roll_bonus(&mut rng) == 1.0));
    }

    fn run_in_order(order: [BuildingKind; 2]) -> (Vec<TickOutcome>, ResourceLedger) {
        let cfg = TuningConfig::default();
        // always rolls just under 1.0, so no bonus fires
        let mut rng = StepRng::new(u64::MAX, 0);
        let mut ledger = ResourceLedger::new();
        ledger.add(ResourceKind::Energy, 0.02);
        ledger.add(ResourceKind::Iron, 10.0);
        let outcomes = order
            .into_iter()
            .map(|kind| owned(kind).produce(&mut ledger, 0.5, 1.0, &cfg, &mut rng))
            .collect();
        (outcomes, ledger)
    }

    #[test]
    fn scarce_energy_goes_to_the_earlier_building() {
        let (out, ledger) = run_in_order([BuildingKind::Mine, BuildingKind::CrystalMine]);
        assert!(!out[0].starved && out[0].produced > 0.0);
        assert!(out[1].starved);
        assert_eq!(out[1].produced, 0.0);
        let left = 0.02 - out[0].produced * 0.1;
        assert!((ledger.get(ResourceKind::Energy) - left).abs() < 1e-6);
        assert_eq!(ledger.get(ResourceKind::Crystal), 0.0);

        let (out, ledger) = run_in_order([BuildingKind::CrystalMine, BuildingKind::Mine]);
        assert!(!out[0].starved && out[0].produced > 0.0);
        assert!(out[1].starved);
        assert!(ledger.get(ResourceKind::Crystal) > 0.0);
        assert!(ledger.get(ResourceKind::Energy) >= 0.0);
        assert_eq!(ledger.get(ResourceKind::Stone), 0.0);
    }

    proptest! {
        #[test]
        fn efficiency_stays_in_unit_range(
            kind_idx in 0usize..6,
            stocks in proptest::collection::vec(0.0f32..5.0, 3),
            dt in 0.01f32..2.0,
            start in 0.0f32..=1.0,
        ) {
            let cfg = TuningConfig::default();
            let mut b = owned(BuildingKind::ALL[kind_idx]);
            b.efficiency = start;
            let mut ledger = ResourceLedger::new();
            ledger.add(ResourceKind::Energy, stocks[0]);
            ledger.add(ResourceKind::Wood, stocks[1]);
            ledger.add(ResourceKind::Crystal, stocks[2]);
            for _ in 0..5 {
                b.update_efficiency(&ledger, dt, &cfg);
                prop_assert!((0.0..=1.0).contains(&b.efficiency));
            }
        }
    }
}
