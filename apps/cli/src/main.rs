#![deny(warnings)]

//! Headless driver: load or start a game, apply purchases, run frames, save.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;
use tycoon_core::{BuildingKind, ProductionKind, TuningConfig};
use tycoon_runtime::{FrameLoop, TycoonGame};

#[derive(Debug)]
struct Args {
    config: Option<PathBuf>,
    save: Option<PathBuf>,
    seconds: f32,
    fps: u32,
    builds: Vec<BuildingKind>,
    invests: Vec<ProductionKind>,
    json: bool,
}

fn parse_building(name: &str) -> Result<BuildingKind> {
    BuildingKind::ALL
        .into_iter()
        .find(|k| same_name(k.display_name(), name) || same_name(&format!("{k:?}"), name))
        .ok_or_else(|| anyhow!("unknown building {name:?}"))
}

fn parse_production(name: &str) -> Result<ProductionKind> {
    ProductionKind::ALL
        .into_iter()
        .find(|k| same_name(k.display_name(), name))
        .ok_or_else(|| anyhow!("unknown production {name:?}"))
}

/// Case-insensitive, ignoring spaces, dashes and underscores.
fn same_name(a: &str, b: &str) -> bool {
    let norm = |s: &str| {
        s.chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect::<String>()
    };
    norm(a) == norm(b)
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        config: None,
        save: None,
        seconds: 60.0,
        fps: 60,
        builds: Vec::new(),
        invests: Vec::new(),
        json: false,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        let mut value = || it.next().ok_or_else(|| anyhow!("{arg} needs a value"));
        match arg.as_str() {
            "--config" => args.config = Some(value()?.into()),
            "--save" => args.save = Some(value()?.into()),
            "--seconds" => args.seconds = value()?.parse().context("--seconds")?,
            "--fps" => args.fps = value()?.parse().context("--fps")?,
            "--build" => args.builds.push(parse_building(&value()?)?),
            "--invest" => args.invests.push(parse_production(&value()?)?),
            "--json" => args.json = true,
            other => bail!("unrecognized argument {other}"),
        }
    }
    if args.fps == 0 || !args.seconds.is_finite() || args.seconds < 0.0 {
        bail!("--fps must be positive and --seconds non-negative");
    }
    Ok(args)
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();

    let args = parse_args()?;
    info!(
        version = env!("GIT_SHA"),
        built = env!("BUILD_DATE"),
        ?args,
        "starting CLI"
    );

    let cfg = match &args.config {
        Some(path) => TuningConfig::from_path(path)?,
        None => TuningConfig::default(),
    };
    let save = args.save.clone().unwrap_or_else(|| cfg.save_path.clone());
    let mut game = TycoonGame::new(cfg)?;
    game.initialize(&save);

    for kind in &args.builds {
        if !game.build_structure(*kind) {
            warn!(building = %kind, "could not build");
        }
    }
    for kind in &args.invests {
        if !game.begin_production(*kind) {
            warn!(production = %kind, "could not invest");
        }
    }

    let frames = (args.seconds * args.fps as f32).round() as u64;
    let stats = FrameLoop::new().run(&mut game, 1.0 / args.fps as f32, frames);
    let snap = game.snapshot();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snap)?);
    } else {
        println!(
            "KPI | time: {:.1}s | money: ${:.2} | reputation: {} | multiplier: {:.2} | net worth: ${:.2} | buildings: {} | frames: {} ({} failed)",
            snap.game_time,
            snap.money,
            snap.reputation,
            snap.production_multiplier,
            snap.net_worth,
            snap.owned_buildings().count(),
            stats.frames,
            stats.failed
        );
    }

    game.save_game(&save)
        .with_context(|| format!("saving to {}", save.display()))?;
    Ok(())
}
