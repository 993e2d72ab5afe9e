//! Mapping: the persisted entity-to-bridge assignment.
//!
//! Produced by the assignment service, stored by the mapping store and
//! consumed when applying to the platform's config entries.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::entity::{Entity, EntityDomain};
use crate::id::EntityId;
use crate::time::Timestamp;

/// One assigned entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    pub id: EntityId,
    pub name: String,
}

impl From<&Entity> for MappingEntry {
    fn from(entity: &Entity) -> Self {
        Self {
            id: entity.entity_id.clone(),
            name: entity.display_name(),
        }
    }
}

/// Lights and switches assigned to one bridge (or left unassigned).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeBucket {
    #[serde(default)]
    pub lights: Vec<MappingEntry>,
    #[serde(default)]
    pub switches: Vec<MappingEntry>,
}

impl BridgeBucket {
    /// Append an entry to the list matching `domain`.
    pub fn push(&mut self, domain: EntityDomain, entry: MappingEntry) {
        match domain {
            EntityDomain::Light => self.lights.push(entry),
            EntityDomain::Switch => self.switches.push(entry),
        }
    }

    /// Sort both lists by entity id.
    pub fn sort(&mut self) {
        self.lights.sort_by(|a, b| a.id.cmp(&b.id));
        self.switches.sort_by(|a, b| a.id.cmp(&b.id));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lights.len() + self.switches.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every entity id in the bucket, sorted.
    #[must_use]
    pub fn entity_ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self
            .lights
            .iter()
            .chain(self.switches.iter())
            .map(|entry| entry.id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Whether `id` appears in either list.
    #[must_use]
    pub fn contains(&self, id: &EntityId) -> bool {
        self.lights
            .iter()
            .chain(self.switches.iter())
            .any(|entry| &entry.id == id)
    }
}

/// The full assignment: one bucket per configured bridge plus the
/// unassigned bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    /// Buckets in bridge declaration order, serialized as a JSON object.
    #[serde(with = "declared_order")]
    pub bridges: Vec<(String, BridgeBucket)>,
    pub no_area: BridgeBucket,
    pub generated_at: Timestamp,
}

impl Mapping {
    /// Create an empty mapping with a bucket for every known bridge name.
    #[must_use]
    pub fn with_bridges<I, S>(bridge_names: I, generated_at: Timestamp) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            bridges: bridge_names
                .into_iter()
                .map(|name| (name.into(), BridgeBucket::default()))
                .collect(),
            no_area: BridgeBucket::default(),
            generated_at,
        }
    }

    /// The bucket for `bridge_name`, if the bridge is known.
    #[must_use]
    pub fn bridge(&self, bridge_name: &str) -> Option<&BridgeBucket> {
        self.bridges
            .iter()
            .find(|(name, _)| name == bridge_name)
            .map(|(_, bucket)| bucket)
    }

    /// Mutable bucket for `bridge_name`, if the bridge is known.
    pub fn bridge_mut(&mut self, bridge_name: &str) -> Option<&mut BridgeBucket> {
        self.bridges
            .iter_mut()
            .find(|(name, _)| name == bridge_name)
            .map(|(_, bucket)| bucket)
    }

    /// Sort every bucket by entity id.
    pub fn sort(&mut self) {
        for (_, bucket) in &mut self.bridges {
            bucket.sort();
        }
        self.no_area.sort();
    }

    /// Number of entities assigned to some bridge.
    #[must_use]
    pub fn assigned_count(&self) -> usize {
        self.bridges.iter().map(|(_, bucket)| bucket.len()).sum()
    }

    /// Number of entities across every bucket, unassigned included.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.assigned_count() + self.no_area.len()
    }
}

mod declared_order {
    use super::{BridgeBucket, Deserializer, MapAccess, Serializer, Visitor, fmt};

    pub(super) fn serialize<S: Serializer>(
        buckets: &[(String, BridgeBucket)],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_map(buckets.iter().map(|(name, bucket)| (name, bucket)))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<(String, BridgeBucket)>, D::Error> {
        struct BucketsVisitor;

        impl<'de> Visitor<'de> for BucketsVisitor {
            type Value = Vec<(String, BridgeBucket)>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of bridge name to bucket")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut buckets = Vec::with_capacity(access.size_hint().unwrap_or_default());
                while let Some(entry) = access.next_entry::<String, BridgeBucket>()? {
                    buckets.push(entry);
                }
                Ok(buckets)
            }
        }

        deserializer.deserialize_map(BucketsVisitor)
    }
}
