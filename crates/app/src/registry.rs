//! Registry snapshot: the in-memory tables for one invocation.
//!
//! Loaded once from a [`RegistryReader`] and never mutated afterwards. Also
//! hosts the area resolver and the eligibility pipeline shared by the
//! assignment and planning use-cases.

use std::collections::{BTreeMap, HashMap};

use hkbridge_domain::area::{Area, Floor};
use hkbridge_domain::device::Device;
use hkbridge_domain::entity::{Entity, EntityDomain};
use hkbridge_domain::error::HkBridgeError;
use hkbridge_domain::filter::{EntityFilter, Exclusion};
use hkbridge_domain::id::{AreaId, DeviceId, FloorId};

use crate::ports::RegistryReader;

/// Immutable registry tables.
#[derive(Debug, Clone, Default)]
pub struct RegistrySnapshot {
    entities: Vec<Entity>,
    devices: HashMap<DeviceId, Device>,
    areas: HashMap<AreaId, Area>,
    floors: HashMap<FloorId, Floor>,
}

/// An entity that passed eligibility and filtering, with its resolved area.
#[derive(Debug, Clone, Copy)]
pub struct EligibleEntity<'a> {
    pub entity: &'a Entity,
    pub domain: EntityDomain,
    pub area: Option<&'a Area>,
}

/// Result of running every entity through eligibility and the filter.
#[derive(Debug, Clone, Default)]
pub struct Classified<'a> {
    /// Eligible entities in registry order.
    pub eligible: Vec<EligibleEntity<'a>>,
    /// Filtered-out candidates, counted per platform.
    pub excluded_by_platform: BTreeMap<String, usize>,
}

impl Classified<'_> {
    #[must_use]
    pub fn excluded_total(&self) -> usize {
        self.excluded_by_platform.values().sum()
    }
}

impl RegistrySnapshot {
    /// Read every registry through `reader`.
    ///
    /// # Errors
    ///
    /// Propagates the first reader error (a missing registry is fatal).
    pub fn load<R: RegistryReader>(reader: &R) -> Result<Self, HkBridgeError> {
        let entities = reader.load_entities()?;
        let devices = reader.load_devices()?;
        let areas = reader.load_areas()?;
        let floors = reader.load_floors()?.unwrap_or_default();
        tracing::debug!(
            entities = entities.len(),
            devices = devices.len(),
            areas = areas.len(),
            floors = floors.len(),
            "loaded registries"
        );
        Ok(Self::from_parts(entities, devices, areas, floors))
    }

    /// Build a snapshot from already-loaded tables.
    #[must_use]
    pub fn from_parts(
        entities: Vec<Entity>,
        devices: Vec<Device>,
        areas: Vec<Area>,
        floors: Vec<Floor>,
    ) -> Self {
        Self {
            entities,
            devices: devices.into_iter().map(|d| (d.id.clone(), d)).collect(),
            areas: areas.into_iter().map(|a| (a.id.clone(), a)).collect(),
            floors: floors.into_iter().map(|f| (f.floor_id.clone(), f)).collect(),
        }
    }

    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Effective area of `entity`.
    ///
    /// The entity's own area wins; otherwise the area of its device. A
    /// dangling id at either step yields `None`.
    #[must_use]
    pub fn resolve_area(&self, entity: &Entity) -> Option<&Area> {
        let area_id = match &entity.area_id {
            Some(area_id) => area_id,
            None => {
                let device = self.devices.get(entity.device_id.as_ref()?)?;
                device.area_id.as_ref()?
            }
        };
        self.areas.get(area_id)
    }

    /// Name of the floor `area` belongs to, if that floor is registered.
    #[must_use]
    pub fn floor_name(&self, area: &Area) -> Option<&str> {
        let floor_id = area.floor_id.as_ref()?;
        self.floors.get(floor_id).map(|floor| floor.name.as_str())
    }

    /// Run every entity through eligibility (enabled, light or switch) and
    /// `filter`, resolving the area of those that survive.
    #[must_use]
    pub fn classify(&self, filter: &EntityFilter) -> Classified<'_> {
        let mut classified = Classified::default();

        for entity in &self.entities {
            let Some(domain) = entity.domain().filter(|_| !entity.disabled) else {
                continue;
            };

            if let Some(reason) = filter.exclusion(entity) {
                log_exclusion(entity, reason);
                *classified
                    .excluded_by_platform
                    .entry(entity.platform.clone())
                    .or_default() += 1;
                continue;
            }

            classified.eligible.push(EligibleEntity {
                entity,
                domain,
                area: self.resolve_area(entity),
            });
        }

        classified
    }
}

fn log_exclusion(entity: &Entity, reason: Exclusion) {
    tracing::debug!(
        entity_id = %entity.entity_id,
        platform = %entity.platform,
        ?reason,
        "entity excluded"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area(id: &str, name: &str, floor: Option<&str>) -> Area {
        let builder = Area::builder().id(id).name(name);
        match floor {
            Some(floor) => builder.floor_id(floor).build().unwrap(),
            None => builder.build().unwrap(),
        }
    }

    fn snapshot() -> RegistrySnapshot {
        let entities = vec![
            Entity::builder()
                .entity_id("light.direct")
                .platform("hue")
                .area_id("kitchen")
                .device_id("dev_bedroom")
                .build()
                .unwrap(),
            Entity::builder()
                .entity_id("light.via_device")
                .platform("hue")
                .device_id("dev_bedroom")
                .build()
                .unwrap(),
            Entity::builder()
                .entity_id("switch.nowhere")
                .platform("tplink")
                .device_id("dev_unplaced")
                .build()
                .unwrap(),
            Entity::builder()
                .entity_id("switch.unifi_ap")
                .platform("unifi")
                .area_id("kitchen")
                .build()
                .unwrap(),
            Entity::builder()
                .entity_id("light.disabled")
                .platform("hue")
                .area_id("kitchen")
                .disabled(true)
                .build()
                .unwrap(),
            Entity::builder()
                .entity_id("sensor.temperature")
                .platform("hue")
                .area_id("kitchen")
                .build()
                .unwrap(),
        ];
        let devices = vec![
            Device::new("dev_bedroom", Some(AreaId::from("bedroom"))),
            Device::new("dev_unplaced", None),
        ];
        let areas = vec![
            area("kitchen", "Kitchen", Some("ground")),
            area("bedroom", "Bedroom", Some("attic")),
        ];
        let floors = vec![Floor::new("ground", "Ground Floor")];
        RegistrySnapshot::from_parts(entities, devices, areas, floors)
    }

    fn entity<'a>(snapshot: &'a RegistrySnapshot, id: &str) -> &'a Entity {
        snapshot
            .entities()
            .iter()
            .find(|e| e.entity_id.as_str() == id)
            .unwrap()
    }

    #[test]
    fn should_resolve_entity_area_before_device_area() {
        let snap = snapshot();
        let area = snap.resolve_area(entity(&snap, "light.direct")).unwrap();
        assert_eq!(area.name, "Kitchen");
    }

    #[test]
    fn should_fall_back_to_device_area_when_entity_has_none() {
        let snap = snapshot();
        let area = snap.resolve_area(entity(&snap, "light.via_device")).unwrap();
        assert_eq!(area.name, "Bedroom");
    }

    #[test]
    fn should_resolve_no_area_when_device_has_none() {
        let snap = snapshot();
        assert!(snap.resolve_area(entity(&snap, "switch.nowhere")).is_none());
    }

    #[test]
    fn should_resolve_no_area_when_area_id_dangles() {
        let e = Entity::builder()
            .entity_id("light.ghost")
            .area_id("demolished")
            .build()
            .unwrap();
        assert!(snapshot().resolve_area(&e).is_none());
    }

    #[test]
    fn should_resolve_floor_name_only_for_registered_floors() {
        let snap = snapshot();
        let kitchen = snap.resolve_area(entity(&snap, "light.direct")).unwrap();
        let bedroom = snap.resolve_area(entity(&snap, "light.via_device")).unwrap();
        assert_eq!(snap.floor_name(kitchen), Some("Ground Floor"));
        assert_eq!(snap.floor_name(bedroom), None);
    }

    #[test]
    fn should_classify_eligible_entities_and_count_exclusions() {
        let snap = snapshot();
        let filter = EntityFilter::new(Vec::<String>::new(), ["unifi"], Vec::<String>::new()).unwrap();

        let classified = snap.classify(&filter);

        let ids: Vec<_> = classified
            .eligible
            .iter()
            .map(|e| e.entity.entity_id.as_str())
            .collect();
        assert_eq!(ids, ["light.direct", "light.via_device", "switch.nowhere"]);
        assert_eq!(classified.excluded_by_platform.get("unifi"), Some(&1));
        assert_eq!(classified.excluded_total(), 1);
    }
}
