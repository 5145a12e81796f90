use rand::Rng;
use station_events_core::{PrototypeId, SpawnChance, SpawnEntry, SpawnTable};

/// Performs one collection draw over `table`, appending selected prototypes to `out`.
///
/// Ungrouped entries are rolled independently in table order. Entries sharing an
/// or-group are resolved afterwards, one roll per group in order of first
/// appearance, selecting at most one entry per group. Entries without a
/// prototype consume their rolls but never contribute to `out`.
pub fn draw<R>(table: &SpawnTable, rng: &mut R, out: &mut Vec<PrototypeId>)
where
    R: Rng + ?Sized,
{
    let mut groups: Vec<OrGroup<'_>> = Vec::new();

    for entry in table.entries() {
        if let Some(name) = entry.group.as_deref() {
            match groups.iter_mut().find(|group| group.name == name) {
                Some(group) => group.push(entry),
                None => groups.push(OrGroup::new(name, entry)),
            }
            continue;
        }

        let selected = match entry.chance() {
            SpawnChance::Guaranteed => true,
            SpawnChance::Weighted(probability) => rng.gen::<f32>() < probability,
        };
        if selected {
            emit(entry, rng, out);
        }
    }

    for group in &groups {
        if let Some(entry) = group.select(rng) {
            emit(entry, rng, out);
        }
    }
}

#[derive(Debug)]
struct OrGroup<'a> {
    name: &'a str,
    entries: Vec<&'a SpawnEntry>,
    cumulative: f64,
}

impl<'a> OrGroup<'a> {
    fn new(name: &'a str, entry: &'a SpawnEntry) -> Self {
        let mut group = Self {
            name,
            entries: Vec::new(),
            cumulative: 0.0,
        };
        group.push(entry);
        group
    }

    fn push(&mut self, entry: &'a SpawnEntry) {
        self.cumulative += f64::from(entry.probability);
        self.entries.push(entry);
    }

    fn select<R>(&self, rng: &mut R) -> Option<&'a SpawnEntry>
    where
        R: Rng + ?Sized,
    {
        if self.cumulative <= 0.0 {
            return None;
        }

        let roll = rng.gen::<f64>() * self.cumulative;
        let mut running = 0.0;
        for &entry in &self.entries {
            running += f64::from(entry.probability);
            if roll <= running {
                return Some(entry);
            }
        }
        None
    }
}

fn emit<R>(entry: &SpawnEntry, rng: &mut R, out: &mut Vec<PrototypeId>)
where
    R: Rng + ?Sized,
{
    let copies = if entry.max_amount <= entry.amount {
        entry.amount
    } else {
        rng.gen_range(entry.amount..=entry.max_amount)
    };

    if let Some(prototype) = entry.prototype.as_ref() {
        out.extend(std::iter::repeat(prototype).take(copies as usize).cloned());
    }
}
