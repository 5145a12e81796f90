#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Vent critters station event: population-scaled spawning of critters at
//! vent markers.
//!
//! When its rule starts, the system picks a random station, collects the vent
//! markers on that station, derives the number of spawn attempts from the
//! player count, and responds with [`Command::SpawnEntity`] batches.

mod attempts;
mod collection;
mod locations;
mod spawner;

use rand::{seq::SliceRandom, Rng};
use station_events_core::{
    Command, ConfigError, Event, MarkerKind, PopulationSource, RuleId, SpawnMarkerRecord,
    StationId, VentCrittersConfig,
};

pub use attempts::compute_attempts;
pub use collection::draw;
pub use locations::resolve_locations;
pub use spawner::run;

/// Pure system that reacts to its rule starting by emitting critter spawns.
#[derive(Debug)]
pub struct VentCritters {
    rule: RuleId,
    config: VentCrittersConfig,
}

impl VentCritters {
    /// Creates the system for `rule`, rejecting configurations it cannot run.
    pub fn new(rule: RuleId, config: VentCrittersConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { rule, config })
    }

    /// Rule instance this system responds to.
    #[must_use]
    pub const fn rule(&self) -> RuleId {
        self.rule
    }

    /// Configuration the system was created with.
    #[must_use]
    pub fn config(&self) -> &VentCrittersConfig {
        &self.config
    }

    /// Consumes events and immutable views to emit spawn commands.
    ///
    /// Every [`Event::RuleStarted`] for this system's rule triggers one
    /// independent run. A run without stations or without vent markers on the
    /// chosen station emits nothing.
    pub fn handle<P, R>(
        &self,
        events: &[Event],
        stations: &[StationId],
        markers: &[SpawnMarkerRecord],
        population: &P,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) where
        P: PopulationSource + ?Sized,
        R: Rng + ?Sized,
    {
        for event in events {
            if let Event::RuleStarted { rule } = event {
                if *rule == self.rule {
                    self.start(stations, markers, population, rng, out);
                }
            }
        }
    }

    fn start<P, R>(
        &self,
        stations: &[StationId],
        markers: &[SpawnMarkerRecord],
        population: &P,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) where
        P: PopulationSource + ?Sized,
        R: Rng + ?Sized,
    {
        let Some(&station) = stations.choose(rng) else {
            log::debug!("rule {} started without any station", self.rule.get());
            return;
        };

        let locations =
            resolve_locations(station, MarkerKind::VentCritter, markers.iter().copied());
        if locations.is_empty() {
            log::debug!(
                "rule {} found no vents on station {}",
                self.rule.get(),
                station.get()
            );
            return;
        }

        let player_count = population.player_count();
        let attempts = compute_attempts(player_count, &self.config.scaling);
        log::debug!(
            "rule {}: {} players, {} attempts over {} vents on station {}",
            self.rule.get(),
            player_count,
            attempts,
            locations.len(),
            station.get()
        );

        let emitted_before = out.len();
        run(
            attempts,
            &locations,
            &self.config.entries,
            &self.config.special_entries,
            rng,
            out,
        );
        log::debug!(
            "rule {} emitted {} spawns",
            self.rule.get(),
            out.len() - emitted_before
        );
    }
}
