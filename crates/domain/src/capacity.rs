//! Capacity planning: greedy grouping of areas into proposed bridges.
//!
//! Areas are grouped by floor. A floor that fits under the ceiling becomes a
//! single bridge; a larger floor is split first-fit-decreasing into
//! `"<floor> A"`, `"<floor> B"`, … An area is never split, so an area above
//! the ceiling ends up alone in an over-limit bridge.
//!
//! The heuristic is not an optimal packing: it can propose more bridges than
//! [`minimum_bridges`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::bridge::{CAPACITY_CEILING, is_over_limit};

/// Label used for areas that do not belong to a known floor.
pub const NO_FLOOR_LABEL: &str = "No Floor Assigned";

/// Eligible entity counts for one area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaLoad {
    pub name: String,
    pub floor: Option<String>,
    pub lights: usize,
    pub switches: usize,
}

impl AreaLoad {
    #[must_use]
    pub fn new(name: impl Into<String>, floor: Option<String>) -> Self {
        Self {
            name: name.into(),
            floor,
            lights: 0,
            switches: 0,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.lights + self.switches
    }
}

/// The areas of one floor, or of no floor when `name` is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorGroup {
    pub name: Option<String>,
    pub areas: Vec<AreaLoad>,
}

impl FloorGroup {
    #[must_use]
    pub fn total(&self) -> usize {
        self.areas.iter().map(AreaLoad::total).sum()
    }

    /// Floor name, or [`NO_FLOOR_LABEL`].
    #[must_use]
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(NO_FLOOR_LABEL)
    }

    /// Areas by total descending; equal totals keep their current order.
    #[must_use]
    pub fn areas_by_load(&self) -> Vec<&AreaLoad> {
        let mut areas: Vec<&AreaLoad> = self.areas.iter().collect();
        areas.sort_by(|a, b| b.total().cmp(&a.total()));
        areas
    }
}

/// A suggested bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedBridge {
    pub name: String,
    pub areas: Vec<String>,
    pub count: usize,
}

impl ProposedBridge {
    fn empty(name: String) -> Self {
        Self {
            name,
            areas: Vec::new(),
            count: 0,
        }
    }

    #[must_use]
    pub fn is_over_limit(&self) -> bool {
        is_over_limit(self.count)
    }
}

/// Full output of a planning run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacitySuggestion {
    /// Named floors ascending, then the no-floor group.
    pub floors: Vec<FloorGroup>,
    pub bridges: Vec<ProposedBridge>,
    pub total_entities: usize,
    /// Lower bound `ceil(total / ceiling)`; not a guarantee.
    pub minimum_bridges: usize,
}

/// Lower bound on the number of bridges needed for `total` entities.
#[must_use]
pub fn minimum_bridges(total: usize, ceiling: usize) -> usize {
    total.div_ceil(ceiling.max(1))
}

/// Group area loads by floor.
///
/// Named floors come out in ascending name order, followed by the no-floor
/// group if it has any area. Areas inside a group are in ascending name order.
#[must_use]
pub fn group_by_floor<I>(loads: I) -> Vec<FloorGroup>
where
    I: IntoIterator<Item = AreaLoad>,
{
    let mut floors: BTreeMap<String, Vec<AreaLoad>> = BTreeMap::new();
    let mut no_floor = Vec::new();

    for load in loads {
        match load.floor.clone() {
            Some(floor) => floors.entry(floor).or_default().push(load),
            None => no_floor.push(load),
        }
    }

    let mut groups: Vec<FloorGroup> = floors
        .into_iter()
        .map(|(name, areas)| FloorGroup {
            name: Some(name),
            areas,
        })
        .collect();
    if !no_floor.is_empty() {
        groups.push(FloorGroup {
            name: None,
            areas: no_floor,
        });
    }
    for group in &mut groups {
        group.areas.sort_by(|a, b| a.name.cmp(&b.name));
    }
    groups
}

/// Pack one floor group into bridges under `ceiling`.
#[must_use]
pub fn pack_floor(group: &FloorGroup, ceiling: usize) -> Vec<ProposedBridge> {
    let label = group.label();
    let total = group.total();

    if total <= ceiling {
        return vec![ProposedBridge {
            name: label.to_string(),
            areas: group.areas.iter().map(|area| area.name.clone()).collect(),
            count: total,
        }];
    }

    let mut proposed = Vec::new();
    let mut index = 0;
    let mut current = ProposedBridge::empty(format!("{label} {}", bridge_suffix(index)));

    for area in group.areas_by_load() {
        if current.count + area.total() > ceiling {
            index += 1;
            let next = ProposedBridge::empty(format!("{label} {}", bridge_suffix(index)));
            let closed = std::mem::replace(&mut current, next);
            if !closed.areas.is_empty() {
                proposed.push(closed);
            }
        }
        current.areas.push(area.name.clone());
        current.count += area.total();
    }

    if !current.areas.is_empty() {
        proposed.push(current);
    }
    proposed
}

/// Plan bridges for every floor under [`CAPACITY_CEILING`].
#[must_use]
pub fn plan<I>(loads: I) -> CapacitySuggestion
where
    I: IntoIterator<Item = AreaLoad>,
{
    plan_with_ceiling(loads, CAPACITY_CEILING)
}

/// Plan bridges for every floor under an explicit ceiling.
#[must_use]
pub fn plan_with_ceiling<I>(loads: I, ceiling: usize) -> CapacitySuggestion
where
    I: IntoIterator<Item = AreaLoad>,
{
    let floors = group_by_floor(loads);
    let total_entities = floors.iter().map(FloorGroup::total).sum();
    let bridges = floors
        .iter()
        .flat_map(|group| pack_floor(group, ceiling))
        .collect();

    CapacitySuggestion {
        floors,
        bridges,
        total_entities,
        minimum_bridges: minimum_bridges(total_entities, ceiling),
    }
}

/// Spreadsheet-style suffix: `A`..`Z`, then `AA`, `AB`, …
fn bridge_suffix(index: usize) -> String {
    const LETTERS: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    let mut n = index + 1;
    let mut suffix = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        suffix.push(LETTERS[rem]);
        n = (n - 1) / 26;
    }
    suffix.reverse();
    String::from_utf8_lossy(&suffix).into_owned()
}
