#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that starts the vent critters event on a station layout.

mod layout;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::LevelFilter;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use station_events_core::{Command, Event, RuleId, VentCrittersConfig};
use station_events_system_spawning::VentCritters;
use station_events_world::{self as world, query, World};

use crate::layout::StationLayout;

const RULE: RuleId = RuleId::new(0);

/// Starts the vent critters station event once and prints what spawned where.
#[derive(Debug, Parser)]
#[command(name = "station-events", version)]
struct Cli {
    /// Rule configuration (TOML) with entries, special entries and scaling knobs.
    #[arg(long, value_name = "PATH")]
    rule: PathBuf,
    /// Station layout (TOML) with stations, grids, markers and the player count.
    #[arg(long, value_name = "PATH")]
    layout: PathBuf,
    /// Overrides the player count stored in the layout.
    #[arg(long)]
    players: Option<u32>,
    /// Seed for the random source; a random seed is used when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Increases log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Entry point for the station events command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let config = load_rule(&cli.rule)?;
    let system = VentCritters::new(RULE, config)
        .with_context(|| format!("invalid rule configuration in {}", cli.rule.display()))?;

    let mut world = load_world(&cli.layout)?;
    let mut events = Vec::new();
    if let Some(players) = cli.players {
        world::apply(
            &mut world,
            Command::SetPlayerCount { count: players },
            &mut events,
        );
    }

    let seed = cli.seed.unwrap_or_else(rand::random);
    log::info!("starting rule {} with seed {seed}", RULE.get());
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    events.clear();
    world::apply(&mut world, Command::StartRule { rule: RULE }, &mut events);

    let stations = query::stations(&world);
    let markers = query::spawn_markers(&world);
    let mut commands = Vec::new();
    system.handle(&events, &stations, &markers, &world, &mut rng, &mut commands);

    let mut spawned = Vec::new();
    for command in commands {
        world::apply(&mut world, command, &mut spawned);
    }

    for event in &spawned {
        if let Event::EntitySpawned {
            entity,
            prototype,
            location,
        } = event
        {
            println!("#{:<4} {prototype:<28} {location}", entity.get());
        }
    }
    println!(
        "{} entities spawned for {} players (seed {seed})",
        query::spawned_entities(&world).len(),
        query::player_count(&world)
    );

    Ok(())
}

fn init_logging(verbosity: u8) -> Result<()> {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{level}][{target}] {message}",
                level = record.level(),
                target = record.target(),
                message = message,
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()
        .context("failed to install logger")
}

fn load_rule(path: &Path) -> Result<VentCrittersConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read rule configuration {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("failed to parse rule configuration {}", path.display()))
}

fn load_world(path: &Path) -> Result<World> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read station layout {}", path.display()))?;
    let layout = StationLayout::parse(&contents)
        .with_context(|| format!("failed to load station layout {}", path.display()))?;

    let mut world = World::new();
    let mut events = Vec::new();
    for command in layout.commands() {
        world::apply(&mut world, command, &mut events);
    }

    for event in &events {
        if let Event::RegistrationRejected { reason } = event {
            bail!("station layout {} is inconsistent: {reason}", path.display());
        }
    }

    for station in query::stations(&world) {
        if let Some(station) = query::station(&world, station) {
            log::info!("station {}: {}", station.id().get(), station.name());
        }
    }
    log::info!(
        "loaded {} markers from {}",
        query::marker_count(&world),
        path.display()
    );
    Ok(world)
}
