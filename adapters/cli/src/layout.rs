use serde::Deserialize;
use station_events_core::{CellCoord, Command, GridId, MarkerKind, SpawnLocation, StationId};
use thiserror::Error;

/// Station layout loaded from a TOML file and replayed into the world.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct StationLayout {
    /// Connected player count at the moment the rule starts.
    #[serde(default)]
    pub(crate) players: u32,
    /// Stations present in the round.
    #[serde(default)]
    pub(crate) stations: Vec<LayoutStation>,
    /// Grids and the station owning each of them.
    #[serde(default)]
    pub(crate) grids: Vec<LayoutGrid>,
    /// Spawn markers placed on the grids.
    #[serde(default)]
    pub(crate) markers: Vec<LayoutMarker>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct LayoutStation {
    pub(crate) id: StationId,
    pub(crate) name: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct LayoutGrid {
    pub(crate) id: GridId,
    #[serde(default)]
    pub(crate) station: Option<StationId>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct LayoutMarker {
    pub(crate) kind: MarkerKind,
    pub(crate) grid: GridId,
    pub(crate) column: u32,
    pub(crate) row: u32,
}

/// Errors that can occur while reading a station layout.
#[derive(Debug, Error)]
pub(crate) enum LayoutError {
    /// The layout contained only whitespace.
    #[error("station layout is empty")]
    Empty,
    /// The layout is not valid TOML or does not match the expected shape.
    #[error("could not parse station layout: {0}")]
    Parse(#[from] toml::de::Error),
}

impl StationLayout {
    /// Parses a layout from its TOML representation.
    pub(crate) fn parse(contents: &str) -> Result<Self, LayoutError> {
        if contents.trim().is_empty() {
            return Err(LayoutError::Empty);
        }
        Ok(toml::from_str(contents)?)
    }

    /// Commands that recreate the layout in an empty world.
    ///
    /// Stations come first, then grids, then markers, so that every reference
    /// resolves against an already registered object.
    #[must_use]
    pub(crate) fn commands(&self) -> Vec<Command> {
        let stations = self.stations.iter().map(|station| Command::RegisterStation {
            station: station.id,
            name: station.name.clone(),
        });
        let grids = self.grids.iter().map(|grid| Command::RegisterGrid {
            grid: grid.id,
            station: grid.station,
        });
        let markers = self.markers.iter().map(|marker| Command::PlaceSpawnMarker {
            kind: marker.kind,
            location: SpawnLocation::new(marker.grid, CellCoord::new(marker.column, marker.row)),
        });

        stations
            .chain(grids)
            .chain(markers)
            .chain(std::iter::once(Command::SetPlayerCount {
                count: self.players,
            }))
            .collect()
    }
}
