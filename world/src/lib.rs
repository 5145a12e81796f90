#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative station state for the station events engine.

use std::collections::BTreeMap;

use station_events_core::{
    Command, EntityId, Event, GridId, MarkerId, MarkerKind, PopulationSource, PrototypeId,
    RegistrationError, SpawnLocation, StationId,
};

/// Station registered with the world.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Station {
    id: StationId,
    name: String,
}

impl Station {
    /// Identifier of the station.
    #[must_use]
    pub const fn id(&self) -> StationId {
        self.id
    }

    /// Human readable station name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Clone, Copy, Debug)]
struct SpawnMarker {
    id: MarkerId,
    kind: MarkerKind,
    location: SpawnLocation,
}

/// Entity created through [`Command::SpawnEntity`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpawnedEntity {
    /// Identifier assigned by the world.
    pub id: EntityId,
    /// Prototype the entity was created from.
    pub prototype: PrototypeId,
    /// Location the entity was created at.
    pub location: SpawnLocation,
}

/// Represents the authoritative station world state.
#[derive(Debug, Default)]
pub struct World {
    stations: BTreeMap<StationId, Station>,
    grids: BTreeMap<GridId, Option<StationId>>,
    markers: Vec<SpawnMarker>,
    entities: Vec<SpawnedEntity>,
    player_count: u32,
    next_marker: u32,
    next_entity: u32,
}

impl World {
    /// Creates an empty world without stations, grids, or players.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_marker_id(&mut self) -> MarkerId {
        let id = MarkerId::new(self.next_marker);
        self.next_marker = self.next_marker.saturating_add(1);
        id
    }

    fn allocate_entity_id(&mut self) -> EntityId {
        let id = EntityId::new(self.next_entity);
        self.next_entity = self.next_entity.saturating_add(1);
        id
    }
}

impl PopulationSource for World {
    fn player_count(&self) -> i64 {
        i64::from(self.player_count)
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::RegisterStation { station, name } => {
            if world.stations.contains_key(&station) {
                out_events.push(Event::RegistrationRejected {
                    reason: RegistrationError::DuplicateStation(station),
                });
                return;
            }

            let _ = world.stations.insert(station, Station { id: station, name });
            out_events.push(Event::StationRegistered { station });
        }
        Command::RegisterGrid { grid, station } => {
            if world.grids.contains_key(&grid) {
                out_events.push(Event::RegistrationRejected {
                    reason: RegistrationError::DuplicateGrid(grid),
                });
                return;
            }

            if let Some(owner) = station {
                if !world.stations.contains_key(&owner) {
                    out_events.push(Event::RegistrationRejected {
                        reason: RegistrationError::UnknownStation(owner),
                    });
                    return;
                }
            }

            let _ = world.grids.insert(grid, station);
            out_events.push(Event::GridRegistered { grid, station });
        }
        Command::PlaceSpawnMarker { kind, location } => {
            if !world.grids.contains_key(&location.grid()) {
                out_events.push(Event::RegistrationRejected {
                    reason: RegistrationError::UnknownGrid(location.grid()),
                });
                return;
            }

            let marker = world.allocate_marker_id();
            world.markers.push(SpawnMarker {
                id: marker,
                kind,
                location,
            });
            out_events.push(Event::SpawnMarkerPlaced {
                marker,
                kind,
                location,
            });
        }
        Command::SetPlayerCount { count } => {
            if world.player_count != count {
                world.player_count = count;
                out_events.push(Event::PlayerCountChanged { count });
            }
        }
        Command::StartRule { rule } => {
            out_events.push(Event::RuleStarted { rule });
        }
        Command::SpawnEntity {
            prototype,
            location,
        } => {
            let entity = world.allocate_entity_id();
            world.entities.push(SpawnedEntity {
                id: entity,
                prototype: prototype.clone(),
                location,
            });
            out_events.push(Event::EntitySpawned {
                entity,
                prototype,
                location,
            });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{SpawnedEntity, Station, World};
    use station_events_core::{SpawnMarkerRecord, StationId};

    /// Identifiers of every registered station in ascending order.
    #[must_use]
    pub fn stations(world: &World) -> Vec<StationId> {
        world.stations.keys().copied().collect()
    }

    /// Looks up a registered station.
    #[must_use]
    pub fn station(world: &World, station: StationId) -> Option<&Station> {
        world.stations.get(&station)
    }

    /// Enumerates every spawn marker together with the station owning its grid.
    ///
    /// Records are yielded in placement order.
    #[must_use]
    pub fn spawn_markers(world: &World) -> Vec<SpawnMarkerRecord> {
        world
            .markers
            .iter()
            .map(|marker| SpawnMarkerRecord {
                marker: marker.id,
                kind: marker.kind,
                station: world.grids.get(&marker.location.grid()).copied().flatten(),
                location: marker.location,
            })
            .collect()
    }

    /// Number of spawn markers placed in the world.
    #[must_use]
    pub fn marker_count(world: &World) -> usize {
        world.markers.len()
    }

    /// Number of players currently connected.
    #[must_use]
    pub fn player_count(world: &World) -> u32 {
        world.player_count
    }

    /// Entities spawned so far in creation order.
    #[must_use]
    pub fn spawned_entities(world: &World) -> &[SpawnedEntity] {
        &world.entities
    }
}
