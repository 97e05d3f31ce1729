#![deny(warnings)]

//! Economic models: market pricing, progression and global multipliers.
//!
//! This module provides validated utilities for:
//! - Stochastic resource price updates clamped into per-kind bands
//! - A fixed-size price history for charting
//! - The global production multiplier from reputation and research labs
//! - Reputation growth with diminishing returns

use rand::Rng;
use std::collections::{BTreeMap, VecDeque};
use thiserror::Error;
use tracing::trace;
use tycoon_core::{BuildingKind, Player, PriceModel, Resource, ResourceKind, TuningConfig};

/// Samples kept per resource in [`PriceHistory`].
pub const HISTORY_LEN: usize = 60;

/// Errors produced by economic helpers.
#[derive(Debug, Error, PartialEq)]
pub enum EconError {
    /// Volatility must be finite and within [0, 1).
    #[error("invalid volatility: {0}")]
    InvalidVolatility(f32),
    /// Price must be finite and strictly positive.
    #[error("invalid price {0}")]
    InvalidPrice(f32),
}

/// Apply one multiplicative random step to a resource's price.
///
/// Draws a uniform change in the model's range (defaulting to
/// `±volatility`), applies `price * (1 + change)` and clamps into the band.
/// Returns the new price.
///
/// Example:
/// let model = cfg.price_model(ResourceKind::Gold);
/// let p = update_price(&mut gold, &model, 0.1, &mut rng).unwrap();
/// assert!((100.0..=500.0).contains(&p));
pub fn update_price<R: Rng + ?Sized>(
    resource: &mut Resource,
    model: &PriceModel,
    volatility: f32,
    rng: &mut R,
) -> Result<f32, EconError> {
    if !volatility.is_finite() || !(0.0..1.0).contains(&volatility) {
        return Err(EconError::InvalidVolatility(volatility));
    }
    if !resource.base_price.is_finite() || resource.base_price <= 0.0 {
        return Err(EconError::InvalidPrice(resource.base_price));
    }
    let (lo, hi) = model.change_range(volatility);
    let change: f32 = if lo < hi { rng.gen_range(lo..=hi) } else { lo };
    let next = model.clamp(resource.base_price * (1.0 + change));
    resource.base_price = next;
    Ok(next)
}

/// Step every commodity price once. Money is never repriced.
///
/// A resource whose price cannot be stepped keeps its price; the others
/// still move. The first such error is returned afterwards.
pub fn update_market<R: Rng + ?Sized>(
    resources: &mut BTreeMap<ResourceKind, Resource>,
    cfg: &TuningConfig,
    rng: &mut R,
) -> Result<(), EconError> {
    let mut first_err = None;
    for (kind, resource) in resources.iter_mut() {
        if *kind == ResourceKind::Money {
            continue;
        }
        let model = cfg.price_model(*kind);
        match update_price(resource, &model, cfg.price_volatility, rng) {
            Ok(price) => trace!(%kind, price, "price updated"),
            Err(e) => {
                first_err.get_or_insert(e);
            }
        }
    }
    match first_err {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// `1 + reputation bonus + research lab bonus`, never below 1.
///
/// Only owned, operational research labs count, each by its level.
pub fn production_multiplier(player: &Player, cfg: &TuningConfig) -> f32 {
    let mut multiplier = 1.0 + player.reputation as f32 * cfg.reputation_bonus_per_point;
    for b in &player.buildings {
        if b.kind == BuildingKind::ResearchLab && b.is_active() {
            multiplier += cfg.research_lab_bonus_per_level * b.level as f32;
        }
    }
    if multiplier.is_finite() {
        multiplier.max(1.0)
    } else {
        1.0
    }
}

/// Raw reputation points for one grant: 1 per owned building, 1 more if efficient.
pub fn reputation_gain(player: &Player) -> i32 {
    player
        .owned_buildings()
        .map(|b| if b.efficiency > 0.8 { 2 } else { 1 })
        .sum()
}

/// Diminishing-returns scaling of a raw gain at the current reputation.
///
/// Example:
/// assert_eq!(scaled_reputation_gain(10, 0), 10);
/// assert_eq!(scaled_reputation_gain(10, 100), 5);
pub fn scaled_reputation_gain(raw: i32, reputation: i32) -> i32 {
    if raw <= 0 {
        return 0;
    }
    let factor = 100.0 / (100.0 + reputation.max(0) as f32);
    (raw as f32 * factor).floor() as i32
}

/// Grant one round of reputation. Returns the points added.
pub fn grow_reputation(player: &mut Player) -> i32 {
    let gained = scaled_reputation_gain(reputation_gain(player), player.reputation);
    player.reputation = player.reputation.saturating_add(gained);
    gained
}

/// Ring buffer of recent prices for one resource.
#[derive(Clone, Debug, PartialEq)]
pub struct PriceHistory {
    samples: VecDeque<f32>,
    capacity: usize,
}

impl PriceHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// A history seeded with one sample.
    pub fn starting_at(price: f32) -> Self {
        let mut h = Self::new(HISTORY_LEN);
        h.record(price);
        h
    }

    pub fn record(&mut self, price: f32) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(price);
    }

    /// Oldest first.
    pub fn samples(&self) -> Vec<f32> {
        self.samples.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn latest(&self) -> Option<f32> {
        self.samples.back().copied()
    }

    /// (min, max) over the window, for chart scaling.
    pub fn range(&self) -> Option<(f32, f32)> {
        let mut it = self.samples.iter().copied();
        let first = it.next()?;
        Some(it.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
    }
}

/// Price histories of every commodity.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MarketHistory {
    series: BTreeMap<ResourceKind, PriceHistory>,
}

impl MarketHistory {
    /// Seed each commodity with its current price.
    pub fn from_resources(resources: &BTreeMap<ResourceKind, Resource>) -> Self {
        let series = resources
            .iter()
            .filter(|(k, _)| **k != ResourceKind::Money)
            .map(|(k, r)| (*k, PriceHistory::starting_at(r.base_price)))
            .collect();
        Self { series }
    }

    pub fn record_all(&mut self, resources: &BTreeMap<ResourceKind, Resource>) {
        for (kind, resource) in resources {
            if *kind == ResourceKind::Money {
                continue;
            }
            self.series
                .entry(*kind)
                .or_insert_with(|| PriceHistory::new(HISTORY_LEN))
                .record(resource.base_price);
        }
    }

    pub fn get(&self, kind: ResourceKind) -> Option<&PriceHistory> {
        self.series.get(&kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn resource(kind: ResourceKind, price: f32) -> Resource {
        Resource::new(kind, 0.0, price, false)
    }

    #[test]
    fn price_is_seeded_and_reproducible() {
        let cfg = TuningConfig::default();
        let model = cfg.price_model(ResourceKind::Wood);
        let mut a = resource(ResourceKind::Wood, 4.0);
        let mut b = resource(ResourceKind::Wood, 4.0);
        let mut r1 = ChaCha8Rng::seed_from_u64(42);
        let mut r2 = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..20 {
            let pa = update_price(&mut a, &model, 0.1, &mut r1).unwrap();
            let pb = update_price(&mut b, &model, 0.1, &mut r2).unwrap();
            assert_eq!(pa, pb);
        }
    }

    #[test]
    fn single_step_is_bounded_by_change_range() {
        let cfg = TuningConfig::default();
        let model = cfg.price_model(ResourceKind::Crystal);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..200 {
            let mut r = resource(ResourceKind::Crystal, 100.0);
            let p = update_price(&mut r, &model, 0.1, &mut rng).unwrap();
            assert!((90.0 - 1e-3..=110.0 + 1e-3).contains(&p), "p = {p}");
        }
    }

    #[test]
    fn clamps_at_band_edges() {
        let cfg = TuningConfig::default();
        let model = cfg.price_model(ResourceKind::Diamond);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut r = resource(ResourceKind::Diamond, 1000.0);
        for _ in 0..500 {
            update_price(&mut r, &model, 0.1, &mut rng).unwrap();
            assert!((400.0..=1000.0).contains(&r.base_price));
        }
    }

    #[test]
    fn rejects_bad_inputs() {
        let cfg = TuningConfig::default();
        let model = cfg.price_model(ResourceKind::Wood);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut r = resource(ResourceKind::Wood, 4.0);
        assert!(update_price(&mut r, &model, f32::NAN, &mut rng).is_err());
        assert!(update_price(&mut r, &model, 1.5, &mut rng).is_err());
        r.base_price = 0.0;
        assert_eq!(
            update_price(&mut r, &model, 0.1, &mut rng),
            Err(EconError::InvalidPrice(0.0))
        );
    }

    #[test]
    fn market_update_skips_money() {
        let cfg = TuningConfig::default();
        let mut player = Player::new_game(&cfg);
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        update_market(&mut player.resources, &cfg, &mut rng).unwrap();
        assert_eq!(player.resources[&ResourceKind::Money].base_price, 1.0);
    }

    #[test]
    fn market_update_skips_only_the_broken_price() {
        let cfg = TuningConfig::default();
        let mut player = Player::new_game(&cfg);
        player.resources.get_mut(&ResourceKind::Wood).unwrap().base_price = -5.0;
        let before = player.resources.clone();
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        assert_eq!(
            update_market(&mut player.resources, &cfg, &mut rng),
            Err(EconError::InvalidPrice(-5.0))
        );
        assert_eq!(player.resources[&ResourceKind::Wood].base_price, -5.0);
        let moved = ResourceKind::commodities()
            .filter(|k| *k != ResourceKind::Wood)
            .filter(|k| player.resources[k].base_price != before[k].base_price)
            .count();
        assert!(moved > 0);
    }

    #[test]
    fn multiplier_counts_reputation_and_labs() {
        let cfg = TuningConfig::default();
        let mut player = Player::new_game(&cfg);
        assert_eq!(production_multiplier(&player, &cfg), 1.0);
        player.reputation = 50;
        assert!((production_multiplier(&player, &cfg) - 1.5).abs() < 1e-6);

        let idx = player.building_index(BuildingKind::ResearchLab).unwrap();
        player.buildings[idx].owned = true;
        player.buildings[idx].level = 3;
        assert!((production_multiplier(&player, &cfg) - 1.65).abs() < 1e-6);

        player.buildings[idx].operational = false;
        assert!((production_multiplier(&player, &cfg) - 1.5).abs() < 1e-6);
    }

    #[test]
    fn reputation_has_diminishing_returns() {
        assert_eq!(scaled_reputation_gain(10, 0), 10);
        assert_eq!(scaled_reputation_gain(10, 100), 5);
        assert_eq!(scaled_reputation_gain(3, 250), 0);
        assert_eq!(scaled_reputation_gain(0, 0), 0);
    }

    #[test]
    fn reputation_gain_rewards_efficiency() {
        let cfg = TuningConfig::default();
        let mut player = Player::new_game(&cfg);
        assert_eq!(grow_reputation(&mut player), 0);
        player.buildings[0].owned = true;
        player.buildings[1].owned = true;
        player.buildings[1].efficiency = 0.5;
        assert_eq!(reputation_gain(&player), 3);
        assert_eq!(grow_reputation(&mut player), 3);
        assert_eq!(player.reputation, 3);
    }

    #[test]
    fn history_keeps_last_samples_in_order() {
        let mut h = PriceHistory::new(3);
        assert!(h.range().is_none());
        for p in [1.0, 2.0, 3.0, 4.0] {
            h.record(p);
        }
        assert_eq!(h.samples(), vec![2.0, 3.0, 4.0]);
        assert_eq!(h.latest(), Some(4.0));
        assert_eq!(h.range(), Some((2.0, 4.0)));
    }

    #[test]
    fn market_history_tracks_commodities() {
        let cfg = TuningConfig::default();
        let player = Player::new_game(&cfg);
        let mut history = MarketHistory::from_resources(&player.resources);
        assert!(history.get(ResourceKind::Money).is_none());
        history.record_all(&player.resources);
        assert_eq!(history.get(ResourceKind::Gold).unwrap().len(), 2);
    }

    proptest! {
        #[test]
        fn price_never_leaves_band(
            kind_idx in 1usize..8,
            start_frac in 0.0f32..=1.0,
            seed in any::<u64>(),
            volatility in 0.0f32..0.9,
        ) {
            let cfg = TuningConfig::default();
            let kind = ResourceKind::ALL[kind_idx];
            let model = cfg.price_model(kind);
            let ceiling = model.ceiling.unwrap_or(model.floor * 100.0);
            let start = model.floor + (ceiling - model.floor) * start_frac;
            let mut r = resource(kind, start);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            for _ in 0..100 {
                update_price(&mut r, &model, volatility, &mut rng).unwrap();
                prop_assert!(model.contains(r.base_price), "{} at {}", kind, r.base_price);
            }
        }
    }
}
