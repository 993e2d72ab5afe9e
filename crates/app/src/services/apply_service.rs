//! Apply service: merge a persisted mapping into the HomeKit config entries.
//!
//! [`apply_mapping`] is the pure in-memory merge. [`ApplyService`] owns the
//! side-effecting sequence around it:
//!
//! 1. load the mapping (missing mapping aborts before anything else)
//! 2. load the config entries
//! 3. stop the service, then back up the file (skipped in dry-run)
//! 4. merge
//! 5. write the file, then start the service (skipped in dry-run)
//!
//! Each step fails fast. A failed stop leaves the file untouched; a failed
//! start happens after the write and must be recovered by the operator.

use std::path::PathBuf;

use hkbridge_domain::bridge::{BridgeConfig, is_over_limit};
use hkbridge_domain::config_entry::{ConfigEntriesDocument, HomekitFilter};
use hkbridge_domain::error::HkBridgeError;
use hkbridge_domain::mapping::Mapping;
use hkbridge_domain::service::ServiceAction;
use hkbridge_domain::time::{Timestamp, now};

use crate::ports::{ConfigEntriesStore, MappingStore, ServiceController};
use crate::settings::BridgeSettings;

/// A bridge whose include list was rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeUpdate {
    pub name: String,
    pub entities: usize,
}

impl BridgeUpdate {
    #[must_use]
    pub fn is_over_limit(&self) -> bool {
        is_over_limit(self.entities)
    }
}

/// Result of merging a mapping into a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// In bridge declaration order.
    pub updated: Vec<BridgeUpdate>,
    /// Configured bridges with no matching HomeKit entry.
    pub unmatched: Vec<String>,
}

/// Rewrite the entity filter of every configured bridge found in `document`.
///
/// The include list is the sorted union of the bridge's lights and switches;
/// domain lists and the exclude list are cleared. A bridge absent from the
/// mapping gets an empty include list. Bridges without a HomeKit entry are
/// skipped and reported.
pub fn apply_mapping(
    document: &mut ConfigEntriesDocument,
    mapping: &Mapping,
    bridges: &[BridgeConfig],
    modified_at: Timestamp,
) -> MergeOutcome {
    let mut outcome = MergeOutcome::default();

    for bridge in bridges {
        let Some(entry) = document.homekit_entry_mut(&bridge.name) else {
            tracing::warn!(bridge = %bridge.name, "no HomeKit entry with this title, skipping");
            outcome.unmatched.push(bridge.name.clone());
            continue;
        };

        let include = mapping
            .bridge(&bridge.name)
            .map(|bucket| bucket.entity_ids())
            .unwrap_or_default();
        entry.set_entity_filter(&HomekitFilter::include_only(&include));
        entry.touch(modified_at);

        let update = BridgeUpdate {
            name: bridge.name.clone(),
            entities: include.len(),
        };
        if update.is_over_limit() {
            tracing::warn!(bridge = %update.name, entities = update.entities, "bridge exceeds capacity ceiling");
        }
        outcome.updated.push(update);
    }

    outcome
}

/// Outcome of an `apply` run.
#[derive(Debug, Clone)]
pub struct ApplyReport {
    pub dry_run: bool,
    pub merge: MergeOutcome,
    pub backup: Option<PathBuf>,
    pub written: Option<PathBuf>,
    /// The merged document, written or not.
    pub document: ConfigEntriesDocument,
}

/// Application service applying the mapping to the platform.
pub struct ApplyService<M, C, S> {
    mappings: M,
    config_entries: C,
    controller: S,
    settings: BridgeSettings,
}

impl<M, C, S> ApplyService<M, C, S>
where
    M: MappingStore,
    C: ConfigEntriesStore,
    S: ServiceController,
{
    pub fn new(mappings: M, config_entries: C, controller: S, settings: BridgeSettings) -> Self {
        Self {
            mappings,
            config_entries,
            controller,
            settings,
        }
    }

    /// Run the apply sequence. With `dry_run` only the merge happens.
    ///
    /// # Errors
    ///
    /// - [`NotFoundError::Mapping`](hkbridge_domain::error::NotFoundError::Mapping)
    ///   when no mapping was generated; nothing else is touched.
    /// - [`HkBridgeError::ServiceControl`] when stopping or starting fails.
    /// - A storage error when loading, backing up or writing fails.
    pub fn apply(&self, dry_run: bool) -> Result<ApplyReport, HkBridgeError> {
        let mapping = self.mappings.load()?;
        let mut document = self.config_entries.load()?;

        let mut backup = None;
        if !dry_run {
            self.control(ServiceAction::Stop)?;
            let path = self.config_entries.backup(now())?;
            tracing::info!(backup = %path.display(), "config entries backed up");
            backup = Some(path);
        }

        let merge = apply_mapping(&mut document, &mapping, self.settings.bridges(), now());

        let mut written = None;
        if !dry_run {
            let path = self.config_entries.write(&document)?;
            tracing::info!(path = %path.display(), "config entries written");
            written = Some(path);
            self.control(ServiceAction::Start)?;
        }

        Ok(ApplyReport {
            dry_run,
            merge,
            backup,
            written,
            document,
        })
    }

    fn control(&self, action: ServiceAction) -> Result<(), HkBridgeError> {
        tracing::info!(service = self.controller.service_name(), %action, "controlling service");
        self.controller.control(action)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::TimeZone;
    use hkbridge_domain::config_entry::{ConfigEntry, FilterMode};
    use hkbridge_domain::entity::EntityDomain;
    use hkbridge_domain::error::{NotFoundError, ServiceControlError};
    use hkbridge_domain::filter::EntityFilter;
    use hkbridge_domain::id::EntityId;
    use hkbridge_domain::mapping::MappingEntry;
    use tracing_subscriber::layer::SubscriberExt;

    use super::*;

    #[derive(Default)]
    struct Journal(RefCell<Vec<String>>);

    impl Journal {
        fn record(&self, step: impl Into<String>) {
            self.0.borrow_mut().push(step.into());
        }

        fn steps(&self) -> Vec<String> {
            self.0.borrow().clone()
        }
    }

    struct FakeMappings<'a> {
        mapping: Option<Mapping>,
        journal: &'a Journal,
    }

    impl MappingStore for FakeMappings<'_> {
        fn save(&self, _mapping: &Mapping) -> Result<PathBuf, HkBridgeError> {
            self.journal.record("mapping.save");
            Ok(PathBuf::from("mapping.json"))
        }

        fn load(&self) -> Result<Mapping, HkBridgeError> {
            self.journal.record("mapping.load");
            self.mapping.clone().ok_or_else(|| {
                NotFoundError::Mapping {
                    path: PathBuf::from("mapping.json"),
                }
                .into()
            })
        }
    }

    struct FakeConfigEntries<'a> {
        document: ConfigEntriesDocument,
        written: RefCell<Option<ConfigEntriesDocument>>,
        journal: &'a Journal,
    }

    impl ConfigEntriesStore for FakeConfigEntries<'_> {
        fn load(&self) -> Result<ConfigEntriesDocument, HkBridgeError> {
            self.journal.record("config.load");
            Ok(self.document.clone())
        }

        fn backup(&self, _taken_at: Timestamp) -> Result<PathBuf, HkBridgeError> {
            self.journal.record("config.backup");
            Ok(PathBuf::from("core.config_entries.backup"))
        }

        fn write(&self, document: &ConfigEntriesDocument) -> Result<PathBuf, HkBridgeError> {
            self.journal.record("config.write");
            *self.written.borrow_mut() = Some(document.clone());
            Ok(PathBuf::from("core.config_entries"))
        }
    }

    struct FakeController<'a> {
        failing: Option<ServiceAction>,
        journal: &'a Journal,
    }

    impl ServiceController for FakeController<'_> {
        fn service_name(&self) -> &str {
            "home-assistant"
        }

        fn control(&self, action: ServiceAction) -> Result<(), HkBridgeError> {
            self.journal.record(format!("service.{action}"));
            if self.failing == Some(action) {
                return Err(ServiceControlError {
                    action,
                    service: "home-assistant".to_string(),
                    reason: "exit status 1".to_string(),
                }
                .into());
            }
            Ok(())
        }
    }

    fn homekit_entry(title: &str) -> ConfigEntry {
        let mut raw = serde_json::Map::new();
        raw.insert("domain".into(), "homekit".into());
        raw.insert("title".into(), title.into());
        raw.insert("entry_id".into(), format!("id-{title}").into());
        let mut entry = ConfigEntry::from_map(raw);
        entry.set_entity_filter(&HomekitFilter {
            include_domains: vec!["light".to_string()],
            ..HomekitFilter::default()
        });
        entry
    }

    fn baseline() -> ConfigEntriesDocument {
        ConfigEntriesDocument {
            header: serde_json::Map::new(),
            data: hkbridge_domain::config_entry::ConfigEntriesData {
                entries: vec![homekit_entry("First Floor"), homekit_entry("Second Floor")],
                extra: serde_json::Map::new(),
            },
        }
    }

    fn entry(id: &str) -> MappingEntry {
        MappingEntry {
            id: EntityId::from(id),
            name: id.to_string(),
        }
    }

    fn mapping() -> Mapping {
        let mut mapping = Mapping::with_bridges(["First Floor", "Second Floor"], now());
        let first = mapping.bridge_mut("First Floor").unwrap();
        first.push(EntityDomain::Switch, entry("switch.a"));
        first.push(EntityDomain::Light, entry("light.b"));
        mapping
    }

    fn bridges() -> Vec<BridgeConfig> {
        vec![
            BridgeConfig::new("First Floor", ["Kitchen"]),
            BridgeConfig::new("Second Floor", ["Bedroom"]),
            BridgeConfig::new("Garage", ["Garage"]),
        ]
    }

    fn settings() -> BridgeSettings {
        BridgeSettings::new(bridges(), EntityFilter::default()).unwrap()
    }

    fn include_entities(document: &ConfigEntriesDocument, title: &str) -> Vec<String> {
        document
            .homekit_entries()
            .find(|e| e.title() == Some(title))
            .unwrap()
            .entity_filter()
            .include_entities
    }

    #[test]
    fn should_replace_filters_with_sorted_include_list() {
        let mut doc = baseline();
        let outcome = apply_mapping(&mut doc, &mapping(), &bridges(), now());

        assert_eq!(include_entities(&doc, "First Floor"), ["light.b", "switch.a"]);
        let filter = doc.homekit_entries().next().unwrap().entity_filter();
        assert!(filter.include_domains.is_empty());
        assert!(filter.exclude_domains.is_empty());
        assert!(filter.exclude_entities.is_empty());
        assert_eq!(
            outcome.updated,
            [
                BridgeUpdate { name: "First Floor".into(), entities: 2 },
                BridgeUpdate { name: "Second Floor".into(), entities: 0 },
            ]
        );
    }

    #[test]
    fn should_skip_bridges_without_homekit_entry() {
        let mut doc = baseline();
        let outcome = apply_mapping(&mut doc, &mapping(), &bridges(), now());
        assert_eq!(outcome.unmatched, ["Garage"]);
        assert_eq!(doc.data.entries.len(), 2);
    }

    #[test]
    fn should_give_empty_include_list_to_bridge_missing_from_mapping() {
        let mut doc = baseline();
        let mapping = Mapping::with_bridges(["First Floor"], now());
        apply_mapping(&mut doc, &mapping, &bridges(), now());

        let second = doc.homekit_entries().nth(1).unwrap();
        assert_eq!(second.entity_filter().mode(), FilterMode::Unknown);
    }

    #[test]
    fn should_be_idempotent_on_same_baseline() {
        let ts = chrono::Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let mut once = baseline();
        apply_mapping(&mut once, &mapping(), &bridges(), ts);
        let mut twice = once.clone();
        apply_mapping(&mut twice, &mapping(), &bridges(), ts);

        assert_eq!(
            serde_json::to_string(&once).unwrap(),
            serde_json::to_string(&twice).unwrap()
        );
    }

    #[test]
    fn should_run_full_sequence_in_order() {
        let journal = Journal::default();
        let service = ApplyService::new(
            FakeMappings { mapping: Some(mapping()), journal: &journal },
            FakeConfigEntries { document: baseline(), written: RefCell::default(), journal: &journal },
            FakeController { failing: None, journal: &journal },
            settings(),
        );

        let report = service.apply(false).unwrap();

        assert_eq!(
            journal.steps(),
            [
                "mapping.load",
                "config.load",
                "service.stop",
                "config.backup",
                "config.write",
                "service.start",
            ]
        );
        assert!(report.backup.is_some());
        assert!(report.written.is_some());
        let written = service.config_entries.written.borrow().clone().unwrap();
        assert_eq!(include_entities(&written, "First Floor"), ["light.b", "switch.a"]);
    }

    #[test]
    fn should_only_merge_in_dry_run() {
        let journal = Journal::default();
        let service = ApplyService::new(
            FakeMappings { mapping: Some(mapping()), journal: &journal },
            FakeConfigEntries { document: baseline(), written: RefCell::default(), journal: &journal },
            FakeController { failing: None, journal: &journal },
            settings(),
        );

        let report = service.apply(true).unwrap();

        assert_eq!(journal.steps(), ["mapping.load", "config.load"]);
        assert!(report.dry_run);
        assert!(report.written.is_none());
        assert_eq!(include_entities(&report.document, "First Floor"), ["light.b", "switch.a"]);
    }

    #[test]
    fn should_fail_without_touching_anything_when_mapping_missing() {
        let journal = Journal::default();
        let service = ApplyService::new(
            FakeMappings { mapping: None, journal: &journal },
            FakeConfigEntries { document: baseline(), written: RefCell::default(), journal: &journal },
            FakeController { failing: None, journal: &journal },
            settings(),
        );

        let result = service.apply(true);

        assert!(matches!(
            result,
            Err(HkBridgeError::NotFound(NotFoundError::Mapping { .. }))
        ));
        assert_eq!(journal.steps(), ["mapping.load"]);
    }

    #[test]
    fn should_not_write_when_stop_fails() {
        let journal = Journal::default();
        let service = ApplyService::new(
            FakeMappings { mapping: Some(mapping()), journal: &journal },
            FakeConfigEntries { document: baseline(), written: RefCell::default(), journal: &journal },
            FakeController { failing: Some(ServiceAction::Stop), journal: &journal },
            settings(),
        );

        let result = service.apply(false);

        assert!(matches!(result, Err(HkBridgeError::ServiceControl(_))));
        assert_eq!(journal.steps(), ["mapping.load", "config.load", "service.stop"]);
        assert!(service.config_entries.written.borrow().is_none());
    }

    #[test]
    fn should_report_start_failure_after_write() {
        let journal = Journal::default();
        let service = ApplyService::new(
            FakeMappings { mapping: Some(mapping()), journal: &journal },
            FakeConfigEntries { document: baseline(), written: RefCell::default(), journal: &journal },
            FakeController { failing: Some(ServiceAction::Start), journal: &journal },
            settings(),
        );

        let result = service.apply(false);

        assert!(matches!(result, Err(HkBridgeError::ServiceControl(_))));
        assert!(service.config_entries.written.borrow().is_some());
    }

    struct MessageField(String);

    impl tracing::field::Visit for MessageField {
        fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
            if field.name() == "message" {
                self.0 = format!("{value:?}");
            }
        }
    }

    struct MessageCounter {
        message: &'static str,
        hits: Arc<AtomicUsize>,
    }

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for MessageCounter {
        fn on_event(
            &self,
            event: &tracing::Event<'_>,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            let mut field = MessageField(String::new());
            event.record(&mut field);
            if field.0 == self.message {
                self.hits.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[test]
    fn should_log_each_service_action_once() {
        let journal = Journal::default();
        let service = ApplyService::new(
            FakeMappings { mapping: Some(mapping()), journal: &journal },
            FakeConfigEntries { document: baseline(), written: RefCell::default(), journal: &journal },
            FakeController { failing: None, journal: &journal },
            settings(),
        );
        let hits = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(MessageCounter {
            message: "controlling service",
            hits: Arc::clone(&hits),
        });

        tracing::subscriber::with_default(subscriber, || service.apply(false)).unwrap();

        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}
