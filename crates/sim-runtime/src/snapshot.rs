//! Read-only view of the game for display and JSON output.

use serde::{Deserialize, Serialize};
use tycoon_core::{BuildingKind, ProductionKind, ResourceKind};

use crate::game::TycoonGame;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceView {
    pub kind: ResourceKind,
    pub name: String,
    pub amount: f32,
    pub price: f32,
    pub owned: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuildingView {
    /// Slot in the building list, for upgrade and sell calls.
    pub index: usize,
    pub kind: BuildingKind,
    pub name: String,
    pub level: i32,
    pub owned: bool,
    pub operational: bool,
    pub efficiency: f32,
    pub upgrade_cost: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductionView {
    pub kind: ProductionKind,
    pub name: String,
    pub invested: bool,
    /// In [0, 1].
    pub progress: f32,
    pub remaining: f32,
}

/// Everything a frame of UI needs, detached from the live game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub game_time: f32,
    pub paused: bool,
    pub fps: f32,
    pub player_name: String,
    pub money: f32,
    pub reputation: i32,
    pub total_earnings: f32,
    pub total_spent: f32,
    pub net_worth: f32,
    pub production_multiplier: f32,
    pub stocks_unlocked: bool,
    pub resources: Vec<ResourceView>,
    pub buildings: Vec<BuildingView>,
    pub productions: Vec<ProductionView>,
}

impl GameSnapshot {
    pub(crate) fn capture(game: &TycoonGame) -> Self {
        let player = game.player();
        Self {
            game_time: game.game_time(),
            paused: game.is_paused(),
            fps: game.fps(),
            player_name: player.name.clone(),
            money: player.money,
            reputation: player.reputation,
            total_earnings: player.total_earnings,
            total_spent: player.total_spent,
            net_worth: player.net_worth(),
            production_multiplier: game.production_multiplier(),
            stocks_unlocked: player.stocks_unlocked,
            resources: player
                .resources
                .values()
                .map(|r| ResourceView {
                    kind: r.kind,
                    name: r.name.clone(),
                    amount: r.amount,
                    price: r.base_price,
                    owned: r.owned,
                })
                .collect(),
            buildings: player
                .buildings
                .iter()
                .enumerate()
                .map(|(index, b)| BuildingView {
                    index,
                    kind: b.kind,
                    name: b.name.clone(),
                    level: b.level,
                    owned: b.owned,
                    operational: b.operational,
                    efficiency: b.efficiency,
                    upgrade_cost: b.upgrade_cost,
                })
                .collect(),
            productions: player
                .productions
                .iter()
                .map(|p| ProductionView {
                    kind: p.kind,
                    name: p.name.clone(),
                    invested: p.invested,
                    progress: p.progress(),
                    remaining: p.remaining(),
                })
                .collect(),
        }
    }

    pub fn owned_buildings(&self) -> impl Iterator<Item = &BuildingView> {
        self.buildings.iter().filter(|b| b.owned)
    }
}
