//! Catalog of building and investment templates.

use crate::building::{Building, BuildingKind};
use crate::production::{Production, ProductionKind};
use crate::resource::{ResourceKind, ResourceRequirement};

/// Stateless constructor of fresh, unowned, level-1 instances.
pub struct BuildingFactory;

struct BuildingTemplate {
    cost: f32,
    rate: f32,
    inputs: &'static [ResourceKind],
    outputs: &'static [ResourceKind],
    maintenance: f32,
    upgrade_cost: f32,
    reputation: i32,
}

struct ProductionTemplate {
    cost: f32,
    completion_time: f32,
    completion_amount: f32,
    reputation: i32,
}

fn building_template(kind: BuildingKind) -> BuildingTemplate {
    use ResourceKind::*;
    match kind {
        BuildingKind::Woodcutter => BuildingTemplate {
            cost: 200.0,
            rate: 0.5,
            inputs: &[],
            outputs: &[Wood],
            maintenance: 0.01,
            upgrade_cost: 100.0,
            reputation: 0,
        },
        BuildingKind::Mine => BuildingTemplate {
            cost: 500.0,
            rate: 0.3,
            inputs: &[Energy],
            outputs: &[Stone, Iron],
            maintenance: 0.02,
            upgrade_cost: 250.0,
            reputation: 10,
        },
        BuildingKind::CrystalMine => BuildingTemplate {
            cost: 1000.0,
            rate: 0.2,
            inputs: &[Energy, Iron],
            outputs: &[Crystal, Gold],
            maintenance: 0.05,
            upgrade_cost: 500.0,
            reputation: 25,
        },
        BuildingKind::PowerPlant => BuildingTemplate {
            cost: 800.0,
            rate: 1.0,
            inputs: &[Wood, Stone],
            outputs: &[Energy],
            maintenance: 0.03,
            upgrade_cost: 400.0,
            reputation: 15,
        },
        BuildingKind::ResearchLab => BuildingTemplate {
            cost: 2000.0,
            rate: 0.1,
            inputs: &[Energy, Crystal],
            outputs: &[],
            maintenance: 1.0,
            upgrade_cost: 1000.0,
            reputation: 50,
        },
        BuildingKind::DiamondMine => BuildingTemplate {
            cost: 5000.0,
            rate: 0.1,
            inputs: &[Energy, Crystal, Gold],
            outputs: &[Diamond],
            maintenance: 0.1,
            upgrade_cost: 2000.0,
            reputation: 50,
        },
    }
}

fn production_template(kind: ProductionKind) -> ProductionTemplate {
    match kind {
        ProductionKind::Furniture => ProductionTemplate {
            cost: 200.0,
            completion_time: 50.0,
            completion_amount: 250.0,
            reputation: 3,
        },
        ProductionKind::Tools => ProductionTemplate {
            cost: 380.0,
            completion_time: 490.0,
            completion_amount: 845.5,
            reputation: 11,
        },
        ProductionKind::Railroads => ProductionTemplate {
            cost: 980.6,
            completion_time: 910.0,
            completion_amount: 1870.0,
            reputation: 17,
        },
        ProductionKind::Jewelry => ProductionTemplate {
            cost: 1180.0,
            completion_time: 1000.0,
            completion_amount: 2000.0,
            reputation: 26,
        },
    }
}

impl BuildingFactory {
    pub fn create_building(kind: BuildingKind) -> Building {
        let t = building_template(kind);
        Building {
            kind,
            name: kind.display_name().to_string(),
            cost: t.cost,
            base_production_rate: t.rate,
            inputs: t.inputs.iter().copied().map(ResourceRequirement::new).collect(),
            outputs: t.outputs.iter().copied().map(ResourceRequirement::new).collect(),
            maintenance_cost: t.maintenance,
            upgrade_cost: t.upgrade_cost,
            required_reputation: t.reputation,
            level: 1,
            efficiency: 1.0,
            operational: true,
            owned: false,
        }
    }

    pub fn create_production(kind: ProductionKind) -> Production {
        let t = production_template(kind);
        Production {
            kind,
            name: kind.display_name().to_string(),
            cost: t.cost,
            current_time: 0.0,
            completion_time: t.completion_time,
            completion_amount: t.completion_amount,
            required_reputation: t.reputation,
            invested: false,
            owned: false,
        }
    }

    /// Building kinds in catalog order.
    pub fn available_building_kinds() -> Vec<BuildingKind> {
        BuildingKind::ALL.to_vec()
    }

    pub fn available_production_kinds() -> Vec<ProductionKind> {
        ProductionKind::ALL.to_vec()
    }

    /// One unowned template per building kind.
    pub fn building_catalog() -> Vec<Building> {
        Self::available_building_kinds()
            .into_iter()
            .map(Self::create_building)
            .collect()
    }

    pub fn production_catalog() -> Vec<Production> {
        Self::available_production_kinds()
            .into_iter()
            .map(Self::create_production)
            .collect()
    }
}
