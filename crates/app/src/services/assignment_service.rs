//! Assignment service: partition eligible entities into configured bridges.

use std::collections::BTreeMap;
use std::path::PathBuf;

use hkbridge_domain::bridge::{BridgeConfig, first_claiming, is_over_limit};
use hkbridge_domain::error::HkBridgeError;
use hkbridge_domain::mapping::{Mapping, MappingEntry};
use hkbridge_domain::time::{Timestamp, now};

use crate::ports::MappingStore;
use crate::registry::{EligibleEntity, RegistrySnapshot};
use crate::settings::BridgeSettings;

/// Assign every eligible entity to exactly one bucket.
///
/// The first bridge in declaration order that claims the entity's area wins;
/// entities without a claimed area land in `no_area`. Buckets are sorted by
/// entity id, so the result only depends on its inputs and `generated_at`.
#[must_use]
pub fn assign(
    eligible: &[EligibleEntity<'_>],
    bridges: &[BridgeConfig],
    generated_at: Timestamp,
) -> Mapping {
    let mut mapping = Mapping::with_bridges(bridges.iter().map(|b| b.name.clone()), generated_at);

    for item in eligible {
        let entry = MappingEntry::from(item.entity);
        let bridge = item
            .area
            .and_then(|area| first_claiming(bridges, &area.name));

        let claimed = bridge.and_then(|b| {
            mapping
                .bridges
                .iter_mut()
                .find(|(name, _)| *name == b.name)
                .map(|(_, bucket)| bucket)
        });
        let bucket = match claimed {
            Some(bucket) => bucket,
            None => &mut mapping.no_area,
        };
        bucket.push(item.domain, entry);
    }

    mapping.sort();
    mapping
}

/// Per-bridge totals for the console summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeSummary {
    pub name: String,
    pub lights: usize,
    pub switches: usize,
}

impl BridgeSummary {
    #[must_use]
    pub fn total(&self) -> usize {
        self.lights + self.switches
    }

    #[must_use]
    pub fn is_over_limit(&self) -> bool {
        is_over_limit(self.total())
    }
}

/// Outcome of a `generate` run.
#[derive(Debug, Clone)]
pub struct GenerateReport {
    pub mapping: Mapping,
    pub location: PathBuf,
    /// In bridge declaration order.
    pub bridges: Vec<BridgeSummary>,
    pub excluded_by_platform: BTreeMap<String, usize>,
}

impl GenerateReport {
    #[must_use]
    pub fn excluded_total(&self) -> usize {
        self.excluded_by_platform.values().sum()
    }

    #[must_use]
    pub fn unassigned(&self) -> usize {
        self.mapping.no_area.len()
    }
}

/// Application service producing and persisting the [`Mapping`].
pub struct AssignmentService<S> {
    store: S,
    settings: BridgeSettings,
}

impl<S: MappingStore> AssignmentService<S> {
    /// Create a new service persisting through `store`.
    pub fn new(store: S, settings: BridgeSettings) -> Self {
        Self { store, settings }
    }

    /// Build the mapping from `snapshot` and persist it.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the mapping cannot be saved.
    pub fn generate(&self, snapshot: &RegistrySnapshot) -> Result<GenerateReport, HkBridgeError> {
        let classified = snapshot.classify(self.settings.filter());
        let mapping = assign(&classified.eligible, self.settings.bridges(), now());
        let location = self.store.save(&mapping)?;
        tracing::info!(
            location = %location.display(),
            assigned = mapping.assigned_count(),
            unassigned = mapping.no_area.len(),
            "mapping saved"
        );

        let bridges = self
            .settings
            .bridges()
            .iter()
            .map(|bridge| {
                let bucket = mapping.bridge(&bridge.name).cloned().unwrap_or_default();
                BridgeSummary {
                    name: bridge.name.clone(),
                    lights: bucket.lights.len(),
                    switches: bucket.switches.len(),
                }
            })
            .collect::<Vec<_>>();

        for summary in bridges.iter().filter(|s| s.is_over_limit()) {
            tracing::warn!(
                bridge = %summary.name,
                total = summary.total(),
                "bridge exceeds capacity ceiling"
            );
        }

        Ok(GenerateReport {
            mapping,
            location,
            bridges,
            excluded_by_platform: classified.excluded_by_platform,
        })
    }
}
