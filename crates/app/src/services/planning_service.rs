//! Planning service: suggest bridge groupings from area entity counts.
//!
//! Independent of the configured bridges: only the filter is applied.

use std::collections::BTreeMap;

use hkbridge_domain::capacity::{AreaLoad, CapacitySuggestion, plan};
use hkbridge_domain::entity::EntityDomain;

use crate::registry::RegistrySnapshot;
use crate::settings::BridgeSettings;

/// Application service computing [`CapacitySuggestion`]s.
pub struct PlanningService {
    settings: BridgeSettings,
}

impl PlanningService {
    pub fn new(settings: BridgeSettings) -> Self {
        Self { settings }
    }

    /// Count eligible lights and switches per area name.
    ///
    /// Entities without a resolvable area are not counted. Areas sharing a
    /// name are merged.
    #[must_use]
    pub fn area_loads(&self, snapshot: &RegistrySnapshot) -> Vec<AreaLoad> {
        let classified = snapshot.classify(self.settings.filter());
        let mut loads: BTreeMap<&str, AreaLoad> = BTreeMap::new();

        for item in &classified.eligible {
            let Some(area) = item.area else {
                continue;
            };
            let load = loads
                .entry(area.name.as_str())
                .or_insert_with(|| AreaLoad::new(area.name.clone(), None));
            if let Some(floor) = snapshot.floor_name(area) {
                load.floor = Some(floor.to_string());
            }
            match item.domain {
                EntityDomain::Light => load.lights += 1,
                EntityDomain::Switch => load.switches += 1,
            }
        }

        loads.into_values().collect()
    }

    /// Group areas by floor and pack them under the capacity ceiling.
    #[must_use]
    pub fn analyze(&self, snapshot: &RegistrySnapshot) -> CapacitySuggestion {
        let suggestion = plan(self.area_loads(snapshot));
        tracing::info!(
            total = suggestion.total_entities,
            minimum = suggestion.minimum_bridges,
            proposed = suggestion.bridges.len(),
            "capacity plan computed"
        );
        for bridge in suggestion.bridges.iter().filter(|b| b.is_over_limit()) {
            tracing::warn!(
                bridge = %bridge.name,
                count = bridge.count,
                "proposed bridge exceeds capacity ceiling"
            );
        }
        suggestion
    }
}
