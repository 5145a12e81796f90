use station_events_core::{MarkerKind, SpawnLocation, SpawnMarkerRecord, StationId};

/// Collects the locations of `kind` markers sitting on grids owned by `station`.
///
/// Order follows the input records. An empty result means the rule has nowhere
/// to spawn and should do nothing.
#[must_use]
pub fn resolve_locations<I>(station: StationId, kind: MarkerKind, records: I) -> Vec<SpawnLocation>
where
    I: IntoIterator<Item = SpawnMarkerRecord>,
{
    records
        .into_iter()
        .filter(|record| record.kind == kind && record.station == Some(station))
        .map(|record| record.location)
        .collect()
}
