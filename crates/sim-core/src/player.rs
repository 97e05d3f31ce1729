//! The single player: wallet, progression and holdings.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::building::{Building, BuildingKind};
use crate::config::TuningConfig;
use crate::factory::BuildingFactory;
use crate::ledger::ResourceLedger;
use crate::production::{Production, ProductionKind};
use crate::resource::{Resource, ResourceKind};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    /// Wallet.
    pub money: f32,
    pub reputation: i32,
    pub total_earnings: f32,
    pub total_spent: f32,
    pub achievements: i32,
    /// Display records, one per kind.
    pub resources: BTreeMap<ResourceKind, Resource>,
    /// One entry per building kind; owned entries are the player's buildings.
    pub buildings: Vec<Building>,
    pub productions: Vec<Production>,
    pub stocks_unlocked: bool,
    /// Kinds that already received their starter inputs.
    #[serde(default)]
    pub seeded_kinds: BTreeSet<BuildingKind>,
}

impl Player {
    /// A fresh player with the full catalog unowned and nothing in stock.
    pub fn new_game(cfg: &TuningConfig) -> Self {
        let mut resources = BTreeMap::new();
        resources.insert(
            ResourceKind::Money,
            Resource::new(ResourceKind::Money, cfg.starting_money, 1.0, true),
        );
        for kind in ResourceKind::commodities() {
            let price = cfg.price_model(kind).initial_price;
            resources.insert(kind, Resource::new(kind, 0.0, price, false));
        }
        Self {
            name: cfg.player_name.clone(),
            money: cfg.starting_money,
            reputation: cfg.starting_reputation,
            total_earnings: 0.0,
            total_spent: 0.0,
            achievements: 0,
            resources,
            buildings: BuildingFactory::building_catalog(),
            productions: BuildingFactory::production_catalog(),
            stocks_unlocked: false,
            seeded_kinds: BTreeSet::new(),
        }
    }

    pub fn building_index(&self, kind: BuildingKind) -> Option<usize> {
        self.buildings.iter().position(|b| b.kind == kind)
    }

    pub fn building(&self, kind: BuildingKind) -> Option<&Building> {
        self.buildings.iter().find(|b| b.kind == kind)
    }

    pub fn production(&self, kind: ProductionKind) -> Option<&Production> {
        self.productions.iter().find(|p| p.kind == kind)
    }

    pub fn owned_buildings(&self) -> impl Iterator<Item = &Building> {
        self.buildings.iter().filter(|b| b.owned)
    }

    /// Affordable, unlocked and not yet owned.
    pub fn can_build(&self, kind: BuildingKind) -> bool {
        self.building(kind).is_some_and(|b| {
            !b.owned && self.money >= b.cost && self.reputation >= b.required_reputation
        })
    }

    /// Affordable, unlocked and not already running.
    pub fn can_invest(&self, kind: ProductionKind) -> bool {
        self.production(kind).is_some_and(|p| {
            !p.invested && self.money >= p.cost && self.reputation >= p.required_reputation
        })
    }

    /// Record the first purchase of `kind`. True only the first time.
    pub fn mark_seeded(&mut self, kind: BuildingKind) -> bool {
        self.seeded_kinds.insert(kind)
    }

    /// Debit the wallet and record the spend.
    pub fn spend(&mut self, amount: f32) {
        self.money -= amount;
        self.total_spent += amount;
    }

    /// Credit the wallet and record the earnings.
    pub fn earn(&mut self, amount: f32) {
        self.money += amount;
        self.total_earnings += amount;
    }

    /// Mirror ledger stock and the wallet into the display records.
    ///
    /// The owned flag only ever turns on here.
    pub fn sync_resources(&mut self, ledger: &ResourceLedger) {
        for (kind, resource) in self.resources.iter_mut() {
            if *kind == ResourceKind::Money {
                resource.amount = self.money;
                continue;
            }
            resource.amount = ledger.get(*kind);
            if resource.amount > 0.0 {
                resource.owned = true;
            }
        }
    }

    /// Ledger holding the display amounts, used after loading a save.
    pub fn ledger_from_resources(&self) -> ResourceLedger {
        let mut ledger = ResourceLedger::new();
        for (kind, resource) in &self.resources {
            if *kind != ResourceKind::Money {
                ledger.set(*kind, resource.amount);
            }
        }
        ledger
    }

    /// Market value of every commodity held.
    pub fn net_worth(&self) -> f32 {
        self.money
            + self
                .resources
                .values()
                .filter(|r| r.kind != ResourceKind::Money)
                .map(Resource::holding_value)
                .sum::<f32>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_game_defaults() {
        let cfg = TuningConfig::default();
        let p = Player::new_game(&cfg);
        assert_eq!(p.money, 500.0);
        assert_eq!(p.reputation, 0);
        assert_eq!(p.resources.len(), 8);
        assert_eq!(p.resources[&ResourceKind::Wood].base_price, 4.0);
        assert!(p.resources[&ResourceKind::Money].owned);
        assert!(!p.resources[&ResourceKind::Gold].owned);
        assert_eq!(p.buildings.len(), 6);
        assert_eq!(p.productions.len(), 4);
        assert!(!p.stocks_unlocked);
    }

    #[test]
    fn can_build_checks_money_and_reputation() {
        let cfg = TuningConfig::default();
        let mut p = Player::new_game(&cfg);
        assert!(p.can_build(BuildingKind::Woodcutter));
        assert!(!p.can_build(BuildingKind::Mine));
        p.money = 600.0;
        assert!(!p.can_build(BuildingKind::Mine));
        p.reputation = 10;
        assert!(p.can_build(BuildingKind::Mine));
    }

    #[test]
    fn seeding_is_granted_once_per_kind() {
        let cfg = TuningConfig::default();
        let mut p = Player::new_game(&cfg);
        assert!(p.mark_seeded(BuildingKind::PowerPlant));
        assert!(!p.mark_seeded(BuildingKind::PowerPlant));
        assert!(p.mark_seeded(BuildingKind::Mine));
        assert_eq!(p.seeded_kinds.len(), 2);
    }

    #[test]
    fn sync_mirrors_ledger_and_wallet() {
        let cfg = TuningConfig::default();
        let mut p = Player::new_game(&cfg);
        let mut ledger = ResourceLedger::new();
        ledger.add(ResourceKind::Iron, 3.0);
        p.money = 42.0;
        p.sync_resources(&ledger);
        assert_eq!(p.resources[&ResourceKind::Iron].amount, 3.0);
        assert!(p.resources[&ResourceKind::Iron].owned);
        assert_eq!(p.resources[&ResourceKind::Money].amount, 42.0);

        ledger.consume(ResourceKind::Iron, 3.0).unwrap();
        p.sync_resources(&ledger);
        assert_eq!(p.resources[&ResourceKind::Iron].amount, 0.0);
        assert!(p.resources[&ResourceKind::Iron].owned);
    }

    #[test]
    fn ledger_rebuilds_from_records() {
        let cfg = TuningConfig::default();
        let mut p = Player::new_game(&cfg);
        p.resources.get_mut(&ResourceKind::Stone).unwrap().amount = 7.5;
        let ledger = p.ledger_from_resources();
        assert_eq!(ledger.get(ResourceKind::Stone), 7.5);
        assert_eq!(ledger.get(ResourceKind::Money), 0.0);
    }
}
