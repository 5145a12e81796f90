#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the station events engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative station world, and pure rule systems. Adapters submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable snapshots, and respond exclusively with new command batches.
//!
//! The spawn table model ([`SpawnEntry`], [`SpawnTable`]) and the population
//! scaling knobs ([`ScalingConfig`]) also live here so that configuration
//! loading and the rule systems agree on a single definition.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Registers a new station with the world.
    RegisterStation {
        /// Identifier assigned to the station.
        station: StationId,
        /// Human readable station name.
        name: String,
    },
    /// Registers a grid and optionally attaches it to a station.
    RegisterGrid {
        /// Identifier assigned to the grid.
        grid: GridId,
        /// Station owning the grid, if any.
        station: Option<StationId>,
    },
    /// Places a spawn marker on a registered grid.
    PlaceSpawnMarker {
        /// Kind of marker being placed.
        kind: MarkerKind,
        /// Location the marker tags as a spawn site.
        location: SpawnLocation,
    },
    /// Replaces the number of connected players.
    SetPlayerCount {
        /// Number of players currently connected.
        count: u32,
    },
    /// Requests that a station event rule starts.
    StartRule {
        /// Rule that should start.
        rule: RuleId,
    },
    /// Requests that an entity prototype is spawned at a location.
    SpawnEntity {
        /// Prototype of the entity to create.
        prototype: PrototypeId,
        /// Location the entity is created at.
        location: SpawnLocation,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a station was registered.
    StationRegistered {
        /// Identifier of the new station.
        station: StationId,
    },
    /// Confirms that a grid was registered.
    GridRegistered {
        /// Identifier of the new grid.
        grid: GridId,
        /// Station owning the grid, if any.
        station: Option<StationId>,
    },
    /// Confirms that a spawn marker was placed.
    SpawnMarkerPlaced {
        /// Identifier assigned to the marker.
        marker: MarkerId,
        /// Kind of the placed marker.
        kind: MarkerKind,
        /// Location tagged by the marker.
        location: SpawnLocation,
    },
    /// Announces that the connected player count changed.
    PlayerCountChanged {
        /// Number of players now connected.
        count: u32,
    },
    /// Announces that a station event rule started.
    RuleStarted {
        /// Rule that started.
        rule: RuleId,
    },
    /// Confirms that an entity was spawned.
    EntitySpawned {
        /// Identifier assigned to the new entity.
        entity: EntityId,
        /// Prototype the entity was created from.
        prototype: PrototypeId,
        /// Location the entity was created at.
        location: SpawnLocation,
    },
    /// Reports that a registration or marker placement was rejected.
    RegistrationRejected {
        /// Specific reason the request failed.
        reason: RegistrationError,
    },
}

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Creates a new identifier with the provided numeric value.
            #[must_use]
            pub const fn new(value: u32) -> Self {
                Self(value)
            }

            /// Retrieves the numeric representation of the identifier.
            #[must_use]
            pub const fn get(&self) -> u32 {
                self.0
            }
        }
    };
}

numeric_id!(
    /// Unique identifier assigned to a station.
    StationId
);
numeric_id!(
    /// Unique identifier assigned to a grid.
    GridId
);
numeric_id!(
    /// Unique identifier assigned to a spawn marker.
    MarkerId
);
numeric_id!(
    /// Unique identifier assigned to a spawned entity.
    EntityId
);
numeric_id!(
    /// Identifier of a station event rule instance.
    RuleId
);

/// Opaque identifier of an entity prototype, e.g. `MobMouse`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrototypeId(String);

impl PrototypeId {
    /// Creates a prototype identifier from the provided name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Name of the prototype.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrototypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Coordinates of a spawn site relative to the grid it sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpawnLocation {
    grid: GridId,
    cell: CellCoord,
}

impl SpawnLocation {
    /// Creates a location anchored to the provided grid cell.
    #[must_use]
    pub const fn new(grid: GridId, cell: CellCoord) -> Self {
        Self { grid, cell }
    }

    /// Grid the location belongs to.
    #[must_use]
    pub const fn grid(&self) -> GridId {
        self.grid
    }

    /// Cell on the grid.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }
}

impl fmt::Display for SpawnLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "grid {} ({}, {})",
            self.grid.get(),
            self.cell.column(),
            self.cell.row()
        )
    }
}

/// Tag carried by a spawn marker describing what may spawn there.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    /// Vent openings that critters crawl out of.
    VentCritter,
    /// Spawn points reserved for ghost roles.
    GhostRole,
}

/// Result row of the spatial marker query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnMarkerRecord {
    /// Identifier of the marker.
    pub marker: MarkerId,
    /// Tag of the marker.
    pub kind: MarkerKind,
    /// Station owning the grid the marker sits on, if any.
    pub station: Option<StationId>,
    /// Location of the marker.
    pub location: SpawnLocation,
}

/// Reasons a registration request can be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum RegistrationError {
    /// A station with the same identifier already exists.
    #[error("station {} is already registered", .0.get())]
    DuplicateStation(StationId),
    /// A grid with the same identifier already exists.
    #[error("grid {} is already registered", .0.get())]
    DuplicateGrid(GridId),
    /// The grid references a station that was never registered.
    #[error("station {} is not registered", .0.get())]
    UnknownStation(StationId),
    /// The marker references a grid that was never registered.
    #[error("grid {} is not registered", .0.get())]
    UnknownGrid(GridId),
}

/// Read-only source of the current player population.
pub trait PopulationSource {
    /// Number of players currently connected.
    fn player_count(&self) -> i64;
}

impl<F> PopulationSource for F
where
    F: Fn() -> i64,
{
    fn player_count(&self) -> i64 {
        self()
    }
}

/// How likely an entry is to be selected during a collection draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SpawnChance {
    /// The entry is selected on every draw.
    Guaranteed,
    /// The entry is selected with the contained probability (or relative weight inside a group).
    Weighted(f32),
}

/// Single row of a spawn table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpawnEntry {
    /// Prototype to spawn. Entries without a prototype never produce a spawn.
    #[serde(default, rename = "id")]
    pub prototype: Option<PrototypeId>,
    /// Independent probability, or relative weight when the entry belongs to a group.
    #[serde(default = "default_probability", rename = "prob")]
    pub probability: f32,
    /// Or-group this entry belongs to. At most one entry per group is selected per draw.
    #[serde(default, rename = "orGroup", skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Number of copies spawned when the entry is selected.
    #[serde(default = "default_amount")]
    pub amount: u32,
    /// Upper bound on copies; a value above `amount` makes the count random.
    #[serde(default = "default_amount")]
    pub max_amount: u32,
}

fn default_probability() -> f32 {
    1.0
}

fn default_amount() -> u32 {
    1
}

impl SpawnEntry {
    /// Creates an entry that always spawns one copy of `prototype`.
    #[must_use]
    pub fn new(prototype: impl Into<String>) -> Self {
        Self {
            prototype: Some(PrototypeId::new(prototype)),
            probability: default_probability(),
            group: None,
            amount: default_amount(),
            max_amount: default_amount(),
        }
    }

    /// Overrides the probability of the entry.
    #[must_use]
    pub fn with_probability(mut self, probability: f32) -> Self {
        self.probability = probability;
        self
    }

    /// Places the entry into the named or-group.
    #[must_use]
    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Overrides the number of copies spawned when selected.
    #[must_use]
    pub fn with_amount(mut self, amount: u32, max_amount: u32) -> Self {
        self.amount = amount;
        self.max_amount = max_amount;
        self
    }

    /// Classifies the entry for the collection draw.
    #[must_use]
    pub fn chance(&self) -> SpawnChance {
        if self.probability >= 1.0 {
            SpawnChance::Guaranteed
        } else {
            SpawnChance::Weighted(self.probability)
        }
    }
}

/// Ordered sequence of spawn entries.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpawnTable {
    entries: Vec<SpawnEntry>,
}

impl SpawnTable {
    /// Creates a table from the provided entries, preserving order.
    #[must_use]
    pub fn new(entries: Vec<SpawnEntry>) -> Self {
        Self { entries }
    }

    /// Entries in declaration order.
    #[must_use]
    pub fn entries(&self) -> &[SpawnEntry] {
        &self.entries
    }

    /// Number of entries in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry that names a prototype, used when a draw comes up empty.
    #[must_use]
    pub fn first_spawnable(&self) -> Option<&PrototypeId> {
        self.entries
            .iter()
            .find_map(|entry| entry.prototype.as_ref())
    }
}

impl FromIterator<SpawnEntry> for SpawnTable {
    fn from_iter<I: IntoIterator<Item = SpawnEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Knobs that convert the player population into a number of spawn attempts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScalingConfig {
    /// Players required for each additional attempt; zero disables scaling.
    pub players_per_spawn: u32,
    /// Lower clamp applied to the attempt count.
    pub min_spawns: u32,
    /// Upper clamp applied to the attempt count.
    pub max_spawns: u32,
    /// Players at or below this count contribute no attempts.
    pub baseline_players: u32,
    /// Attempts granted regardless of population.
    pub base_spawns: u32,
}

impl Default for ScalingConfig {
    fn default() -> Self {
        Self {
            players_per_spawn: 12,
            min_spawns: 1,
            max_spawns: 3,
            baseline_players: 0,
            base_spawns: 0,
        }
    }
}

/// Full configuration of the vent critters station event.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VentCrittersConfig {
    /// Table drawn from on every spawn attempt.
    #[serde(default)]
    pub entries: SpawnTable,
    /// Table from which exactly one guaranteed spawn is taken per run.
    #[serde(default)]
    pub special_entries: SpawnTable,
    /// Population scaling applied to the attempt count.
    #[serde(flatten)]
    pub scaling: ScalingConfig,
}

/// Identifies one of the spawn tables of a rule configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableKind {
    /// The per-attempt table.
    Entries,
    /// The guaranteed special table.
    SpecialEntries,
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entries => f.write_str("entries"),
            Self::SpecialEntries => f.write_str("specialEntries"),
        }
    }
}

/// Largest number of copies a single entry may yield when selected.
pub const MAX_SPAWN_AMOUNT: u32 = 64;

/// Configuration violations detected when a rule configuration is loaded.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The attempt clamp is empty.
    #[error("maxSpawns ({max}) is lower than minSpawns ({min})")]
    SpawnRangeInverted {
        /// Configured lower clamp.
        min: u32,
        /// Configured upper clamp.
        max: u32,
    },
    /// An entry carries a negative or non-finite probability.
    #[error("{table}[{index}] has invalid probability {probability}")]
    InvalidProbability {
        /// Table containing the entry.
        table: TableKind,
        /// Position of the entry within the table.
        index: usize,
        /// Offending value.
        probability: f32,
    },
    /// An entry would spawn zero copies when selected.
    #[error("{table}[{index}] has an amount of zero")]
    ZeroAmount {
        /// Table containing the entry.
        table: TableKind,
        /// Position of the entry within the table.
        index: usize,
    },
    /// An entry may spawn more copies than a single draw allows.
    #[error("{table}[{index}] may spawn {amount} copies, the limit is {limit}", limit = MAX_SPAWN_AMOUNT)]
    AmountTooLarge {
        /// Table containing the entry.
        table: TableKind,
        /// Position of the entry within the table.
        index: usize,
        /// Largest configured copy count of the entry.
        amount: u32,
    },
    /// A special entry has no prototype and could never spawn.
    #[error("specialEntries[{index}] has no prototype id")]
    SpecialEntryWithoutPrototype {
        /// Position of the entry within the special table.
        index: usize,
    },
}

impl VentCrittersConfig {
    /// Rejects configurations the scheduler cannot run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scaling = &self.scaling;
        if scaling.max_spawns < scaling.min_spawns {
            return Err(ConfigError::SpawnRangeInverted {
                min: scaling.min_spawns,
                max: scaling.max_spawns,
            });
        }

        for (table, kind) in [
            (&self.entries, TableKind::Entries),
            (&self.special_entries, TableKind::SpecialEntries),
        ] {
            for (index, entry) in table.entries().iter().enumerate() {
                if !entry.probability.is_finite() || entry.probability < 0.0 {
                    return Err(ConfigError::InvalidProbability {
                        table: kind,
                        index,
                        probability: entry.probability,
                    });
                }
                if entry.amount == 0 {
                    return Err(ConfigError::ZeroAmount { table: kind, index });
                }
                let amount = entry.amount.max(entry.max_amount);
                if amount > MAX_SPAWN_AMOUNT {
                    return Err(ConfigError::AmountTooLarge {
                        table: kind,
                        index,
                        amount,
                    });
                }
            }
        }

        if let Some(index) = self
            .special_entries
            .entries()
            .iter()
            .position(|entry| entry.prototype.is_none())
        {
            return Err(ConfigError::SpecialEntryWithoutPrototype { index });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CellCoord, ConfigError, GridId, ScalingConfig, SpawnChance, SpawnEntry, SpawnLocation,
        SpawnTable, TableKind, VentCrittersConfig, MAX_SPAWN_AMOUNT,
    };

    #[test]
    fn spawn_location_round_trips_through_bincode() {
        let location = SpawnLocation::new(GridId::new(7), CellCoord::new(3, 9));
        let bytes = bincode::serialize(&location).expect("serialize");
        let restored: SpawnLocation = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, location);
    }

    #[test]
    fn missing_scaling_keys_use_defaults() {
        let config: VentCrittersConfig = toml::from_str(
            r#"
            entries = [{ id = "MobMouse", prob = 0.02 }]
            "#,
        )
        .expect("parse");

        assert_eq!(config.scaling, ScalingConfig::default());
        assert_eq!(config.scaling.players_per_spawn, 12);
        assert_eq!(config.scaling.min_spawns, 1);
        assert_eq!(config.scaling.max_spawns, 3);
        assert!(config.special_entries.is_empty());

        let entry = &config.entries.entries()[0];
        assert_eq!(entry.amount, 1);
        assert_eq!(entry.max_amount, 1);
        assert_eq!(entry.group, None);
    }

    #[test]
    fn camel_case_keys_are_recognised() {
        let config: VentCrittersConfig = toml::from_str(
            r#"
            playersPerSpawn = 3
            minSpawns = 1
            maxSpawns = 5
            baselinePlayers = 6
            baseSpawns = 2

            [[entries]]
            id = "MobCockroach"
            prob = 0.5
            orGroup = "roaches"
            amount = 1
            maxAmount = 3

            [[specialEntries]]
            id = "SpawnPointGhostRatKing"
            "#,
        )
        .expect("parse");

        assert_eq!(
            config.scaling,
            ScalingConfig {
                players_per_spawn: 3,
                min_spawns: 1,
                max_spawns: 5,
                baseline_players: 6,
                base_spawns: 2,
            }
        );
        let entry = &config.entries.entries()[0];
        assert_eq!(entry.group.as_deref(), Some("roaches"));
        assert_eq!(entry.max_amount, 3);
        assert_eq!(config.special_entries.len(), 1);
    }

    #[test]
    fn negative_players_per_spawn_is_rejected_by_the_parser() {
        let parsed: Result<VentCrittersConfig, _> = toml::from_str("playersPerSpawn = -1");
        assert!(parsed.is_err());
    }

    #[test]
    fn inverted_spawn_range_is_rejected() {
        let config = VentCrittersConfig {
            scaling: ScalingConfig {
                min_spawns: 4,
                max_spawns: 2,
                ..ScalingConfig::default()
            },
            ..VentCrittersConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::SpawnRangeInverted { min: 4, max: 2 })
        );
    }

    #[test]
    fn negative_probability_is_rejected() {
        let config = VentCrittersConfig {
            special_entries: SpawnTable::new(vec![
                SpawnEntry::new("MobRatKing"),
                SpawnEntry::new("MobRatServant").with_probability(-0.5),
            ]),
            ..VentCrittersConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidProbability {
                table: TableKind::SpecialEntries,
                index: 1,
                probability: -0.5,
            })
        );
    }

    #[test]
    fn zero_amount_is_rejected() {
        let config = VentCrittersConfig {
            entries: SpawnTable::new(vec![
                SpawnEntry::new("MobMouse"),
                SpawnEntry::new("MobMouse1").with_amount(0, 0),
            ]),
            ..VentCrittersConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroAmount {
                table: TableKind::Entries,
                index: 1,
            })
        );
    }

    #[test]
    fn oversized_amount_range_is_rejected() {
        let config: VentCrittersConfig = toml::from_str(
            r#"
            [[entries]]
            id = "MobCockroach"
            maxAmount = 4000000000
            "#,
        )
        .expect("parse");
        assert_eq!(
            config.validate(),
            Err(ConfigError::AmountTooLarge {
                table: TableKind::Entries,
                index: 0,
                amount: 4_000_000_000,
            })
        );

        let at_limit = VentCrittersConfig {
            entries: SpawnTable::new(vec![
                SpawnEntry::new("MobCockroach").with_amount(1, MAX_SPAWN_AMOUNT),
            ]),
            ..VentCrittersConfig::default()
        };
        assert_eq!(at_limit.validate(), Ok(()));
    }

    #[test]
    fn special_entries_require_a_prototype() {
        let mut blank = SpawnEntry::new("unused");
        blank.prototype = None;
        let config = VentCrittersConfig {
            special_entries: SpawnTable::new(vec![blank]),
            ..VentCrittersConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::SpecialEntryWithoutPrototype { index: 0 })
        );
    }

    #[test]
    fn probability_of_one_is_guaranteed() {
        assert_eq!(SpawnEntry::new("MobMouse").chance(), SpawnChance::Guaranteed);
        assert_eq!(
            SpawnEntry::new("MobMouse").with_probability(0.25).chance(),
            SpawnChance::Weighted(0.25)
        );
    }

    #[test]
    fn first_spawnable_skips_blank_entries() {
        let mut blank = SpawnEntry::new("unused");
        blank.prototype = None;
        let table = SpawnTable::new(vec![blank, SpawnEntry::new("MobMouse1")]);
        assert_eq!(
            table.first_spawnable().map(|prototype| prototype.as_str()),
            Some("MobMouse1")
        );
    }
}
