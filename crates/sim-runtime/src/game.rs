use std::path::Path;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace, warn};
use tycoon_core::{
    fire_timer, BuildingFactory, BuildingKind, ConfigError, Player, ProductionKind,
    ResourceKind, ResourceLedger, SimClock, TuningConfig,
};
use tycoon_econ::{grow_reputation, production_multiplier, update_market, MarketHistory, PriceHistory};
use tycoon_persistence::{load_from_path, save_to_path, PersistenceError};

use crate::snapshot::GameSnapshot;
use crate::SimError;

/// The whole simulation: player, ledger, clock and market state.
#[derive(Clone, Debug)]
pub struct TycoonGame {
    cfg: TuningConfig,
    player: Player,
    ledger: ResourceLedger,
    clock: SimClock,
    rng: ChaCha8Rng,
    market: MarketHistory,
    fps: f32,
    frame_count: u32,
    fps_timer: f32,
}

impl Default for TycoonGame {
    fn default() -> Self {
        Self::fresh(TuningConfig::default())
    }
}

impl TycoonGame {
    /// A new game under validated tuning.
    pub fn new(cfg: TuningConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self::fresh(cfg))
    }

    /// Resume from an existing clock and player, e.g. a decoded save.
    ///
    /// The ledger is rebuilt from the player's resource records.
    pub fn from_state(cfg: TuningConfig, clock: SimClock, player: Player) -> Self {
        let mut game = Self::fresh(cfg);
        game.install(clock, player);
        game
    }

    fn fresh(cfg: TuningConfig) -> Self {
        let player = Player::new_game(&cfg);
        let rng = ChaCha8Rng::seed_from_u64(cfg.rng_seed);
        let market = MarketHistory::from_resources(&player.resources);
        Self {
            cfg,
            player,
            ledger: ResourceLedger::new(),
            clock: SimClock::default(),
            rng,
            market,
            fps: 0.0,
            frame_count: 0,
            fps_timer: 0.0,
        }
    }

    fn install(&mut self, clock: SimClock, player: Player) {
        self.ledger = player.ledger_from_resources();
        self.market = MarketHistory::from_resources(&player.resources);
        self.player = player;
        self.clock = clock;
        self.fps = 0.0;
        self.frame_count = 0;
        self.fps_timer = 0.0;
    }

    /// Load the save at `path`, or start over if it cannot be read.
    ///
    /// Returns true when the save was loaded.
    pub fn initialize(&mut self, path: &Path) -> bool {
        match load_from_path(path, &self.cfg) {
            Ok((clock, player)) => {
                info!(path = %path.display(), money = player.money, reputation = player.reputation, "save loaded");
                self.install(clock, player);
                true
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not load save, starting a new game");
                let player = Player::new_game(&self.cfg);
                self.install(SimClock::default(), player);
                info!(money = self.player.money, "new game");
                false
            }
        }
    }

    pub fn save_game(&self, path: &Path) -> Result<(), PersistenceError> {
        save_to_path(path, &self.clock, &self.player)
    }

    /// Advance one frame by `delta_time` seconds, clamped to the max delta.
    pub fn update(&mut self, delta_time: f32) -> Result<(), SimError> {
        if !delta_time.is_finite() || delta_time < 0.0 {
            return Err(SimError::InvalidDelta(delta_time));
        }
        let dt = delta_time.min(self.cfg.max_delta_time);

        self.frame_count += 1;
        self.fps_timer += dt;
        if self.fps_timer >= self.cfg.fps_interval {
            self.fps = self.frame_count as f32 / self.fps_timer;
            self.frame_count = 0;
            self.fps_timer = 0.0;
        }

        if self.clock.paused || dt == 0.0 {
            return Ok(());
        }
        self.clock.game_time += dt;

        if fire_timer(&mut self.clock.resource_timer, dt, self.cfg.resource_interval) {
            self.resource_tick(self.cfg.resource_interval);
        }
        let economy = if fire_timer(&mut self.clock.economy_timer, dt, self.cfg.economy_interval) {
            self.economy_tick()
        } else {
            Ok(())
        };
        if fire_timer(&mut self.clock.reputation_timer, dt, self.cfg.reputation_interval) {
            let gained = grow_reputation(&mut self.player);
            debug!(gained, reputation = self.player.reputation, "reputation tick");
        }
        if fire_timer(&mut self.clock.maintenance_timer, dt, self.cfg.maintenance_interval) {
            self.charge_maintenance();
        }

        for production in &mut self.player.productions {
            if let Some(payout) = production.advance(dt) {
                debug!(production = %production.kind, payout, "investment matured");
                self.player.money += payout;
                self.player.total_earnings += payout;
            }
        }

        self.player.sync_resources(&self.ledger);
        if !self.player.money.is_finite() {
            return Err(SimError::NonFinite("money"));
        }
        economy
    }

    fn resource_tick(&mut self, dt: f32) {
        let multiplier = production_multiplier(&self.player, &self.cfg);
        for building in &mut self.player.buildings {
            let outcome = building.produce(&mut self.ledger, dt, multiplier, &self.cfg, &mut self.rng);
            if outcome.bonus {
                trace!(building = %building.kind, produced = outcome.produced, "bonus roll hit");
            }
        }
        self.player.sync_resources(&self.ledger);
    }

    fn economy_tick(&mut self) -> Result<(), SimError> {
        let stepped = update_market(&mut self.player.resources, &self.cfg, &mut self.rng);
        self.market.record_all(&self.player.resources);
        Ok(stepped?)
    }

    fn charge_maintenance(&mut self) {
        let due: f32 = self
            .player
            .owned_buildings()
            .map(|b| b.maintenance_cost)
            .sum();
        if due <= 0.0 {
            return;
        }
        let paid = due.min(self.player.money);
        self.player.spend(paid);
        if paid < due {
            trace!(due, paid, "maintenance not fully covered");
        }
    }

    /// Buy a building of `kind`.
    ///
    /// The first purchase of each kind seeds its inputs so it starts fuelled.
    pub fn build_structure(&mut self, kind: BuildingKind) -> bool {
        let Some(idx) = self.player.building_index(kind) else {
            return false;
        };
        if !self.player.can_build(kind) {
            debug!(building = %kind, money = self.player.money, reputation = self.player.reputation, "build rejected");
            return false;
        }
        let cost = self.player.buildings[idx].cost;
        self.player.spend(cost);
        self.player.buildings[idx].owned = true;
        let seeded = self.player.mark_seeded(kind);
        if seeded {
            for input in &self.player.buildings[idx].inputs {
                self.ledger.add(input.kind, self.cfg.starter_input_quantity);
            }
        }
        self.player.sync_resources(&self.ledger);
        debug!(building = %kind, cost, seeded, "built");
        true
    }

    /// Upgrade the owned building at `index`.
    ///
    /// Max level is checked before any money moves.
    pub fn upgrade_building(&mut self, index: usize) -> bool {
        let Some(building) = self.player.buildings.get(index) else {
            return false;
        };
        if !building.owned || building.level >= self.cfg.max_level {
            return false;
        }
        let cost = building.upgrade_cost;
        if self.player.money < cost {
            debug!(building = %building.kind, cost, "upgrade rejected");
            return false;
        }
        let building = &mut self.player.buildings[index];
        if !building.upgrade(self.cfg.max_level, self.cfg.upgrade_growth) {
            return false;
        }
        debug!(building = %building.kind, level = building.level, cost, "upgraded");
        self.player.spend(cost);
        self.player.sync_resources(&self.ledger);
        true
    }

    /// Sell the owned building at `index` for part of its cost.
    ///
    /// The slot gets a fresh unowned template of the same kind.
    pub fn sell_structure(&mut self, index: usize) -> bool {
        let Some(building) = self.player.buildings.get(index) else {
            return false;
        };
        if !building.owned {
            return false;
        }
        let kind = building.kind;
        let refund = building.cost * self.cfg.sell_refund_fraction;
        self.player.earn(refund);
        self.player.buildings[index] = BuildingFactory::create_building(kind);
        self.player.sync_resources(&self.ledger);
        debug!(building = %kind, refund, "sold");
        true
    }

    pub fn begin_production(&mut self, kind: ProductionKind) -> bool {
        if !self.player.can_invest(kind) {
            debug!(production = %kind, money = self.player.money, "investment rejected");
            return false;
        }
        let Some(production) = self.player.productions.iter_mut().find(|p| p.kind == kind) else {
            return false;
        };
        let cost = production.cost;
        production.invest();
        self.player.spend(cost);
        self.player.sync_resources(&self.ledger);
        debug!(production = %kind, cost, "invested");
        true
    }

    /// Buy `amount` units at the current market price.
    pub fn buy_resource(&mut self, kind: ResourceKind, amount: f32) -> bool {
        if kind == ResourceKind::Money || !amount.is_finite() || amount <= 0.0 {
            return false;
        }
        let Some(resource) = self.player.resources.get(&kind) else {
            return false;
        };
        let total = resource.base_price * amount;
        if !(total.is_finite() && total > 0.0) || self.player.money < total {
            debug!(resource = %kind, amount, total, "purchase rejected");
            return false;
        }
        self.player.spend(total);
        self.ledger.add(kind, amount);
        self.player.sync_resources(&self.ledger);
        debug!(resource = %kind, amount, total, "bought");
        true
    }

    /// Sell `amount` owned units at the current market price.
    pub fn sell_resource(&mut self, kind: ResourceKind, amount: f32) -> bool {
        if kind == ResourceKind::Money || !amount.is_finite() || amount <= 0.0 {
            return false;
        }
        let Some(resource) = self.player.resources.get(&kind) else {
            return false;
        };
        if !resource.owned {
            return false;
        }
        let price = resource.base_price;
        if let Err(e) = self.ledger.consume(kind, amount) {
            debug!(resource = %kind, error = %e, "sale rejected");
            return false;
        }
        let total = price * amount;
        self.player.earn(total);
        self.player.sync_resources(&self.ledger);
        if self.ledger.get(kind) <= 0.0 {
            if let Some(resource) = self.player.resources.get_mut(&kind) {
                resource.owned = false;
            }
        }
        debug!(resource = %kind, amount, total, "sold");
        true
    }

    /// One-time purchase of stock market access.
    pub fn unlock_stocks(&mut self) -> bool {
        if self.player.stocks_unlocked
            || self.player.reputation < self.cfg.stock_unlock_reputation
            || self.player.money < self.cfg.stock_unlock_price
        {
            return false;
        }
        self.player.spend(self.cfg.stock_unlock_price);
        self.player.stocks_unlocked = true;
        self.player.sync_resources(&self.ledger);
        info!("stock market unlocked");
        true
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn ledger(&self) -> &ResourceLedger {
        &self.ledger
    }

    pub fn config(&self) -> &TuningConfig {
        &self.cfg
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// Frames per second over the last FPS window.
    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn game_time(&self) -> f32 {
        self.clock.game_time
    }

    pub fn is_paused(&self) -> bool {
        self.clock.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        if self.clock.paused != paused {
            debug!(paused, "pause toggled");
        }
        self.clock.paused = paused;
    }

    pub fn production_multiplier(&self) -> f32 {
        production_multiplier(&self.player, &self.cfg)
    }

    pub fn price_history(&self, kind: ResourceKind) -> Option<&PriceHistory> {
        self.market.get(kind)
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::capture(self)
    }
}
