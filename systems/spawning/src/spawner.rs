use rand::{seq::SliceRandom, Rng};
use station_events_core::{Command, PrototypeId, SpawnLocation, SpawnTable};

use crate::collection;

/// Emits the spawn commands for `attempts` attempts plus the special spawn.
///
/// Every attempt picks a location with replacement and performs one collection
/// draw on `table`. When the draw comes up empty the first entry of `table`
/// naming a prototype is spawned instead, so a non-empty table yields at least
/// one spawn per attempt. Afterwards a single entry of `special` is spawned at
/// an independently chosen location. Nothing is emitted when `locations` is
/// empty.
pub fn run<R>(
    attempts: u32,
    locations: &[SpawnLocation],
    table: &SpawnTable,
    special: &SpawnTable,
    rng: &mut R,
    out: &mut Vec<Command>,
) where
    R: Rng + ?Sized,
{
    if locations.is_empty() {
        return;
    }

    let mut drawn: Vec<PrototypeId> = Vec::new();
    for _ in 0..attempts {
        let Some(&location) = locations.choose(rng) else {
            return;
        };

        drawn.clear();
        collection::draw(table, rng, &mut drawn);

        if drawn.is_empty() {
            if let Some(fallback) = table.first_spawnable() {
                log::trace!("draw came up empty, falling back to {fallback}");
                drawn.push(fallback.clone());
            }
        }

        for prototype in drawn.drain(..) {
            log::trace!("spawning {prototype} at {location}");
            out.push(Command::SpawnEntity {
                prototype,
                location,
            });
        }
    }

    let Some(entry) = special.entries().choose(rng) else {
        return;
    };
    let Some(&location) = locations.choose(rng) else {
        return;
    };
    match entry.prototype.as_ref() {
        Some(prototype) => {
            log::trace!("special spawn {prototype} at {location}");
            out.push(Command::SpawnEntity {
                prototype: prototype.clone(),
                location,
            });
        }
        None => log::warn!("special entry without prototype selected, skipping"),
    }
}
