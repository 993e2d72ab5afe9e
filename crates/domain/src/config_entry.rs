//! Config entries: typed views over the platform's `core.config_entries`.
//!
//! Entries are kept as raw JSON objects so that fields this crate does not
//! know about survive a read-modify-write untouched, in their original order.
//! Only HomeKit entries (`domain == "homekit"`) are inspected or modified.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::id::EntityId;
use crate::time::{Timestamp, format_modified_at};

/// Integration domain of HomeKit bridge entries.
pub const HOMEKIT_DOMAIN: &str = "homekit";

/// The whole `core.config_entries` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigEntriesDocument {
    #[serde(flatten)]
    pub header: Map<String, Value>,
    pub data: ConfigEntriesData,
}

/// The `data` section of the document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigEntriesData {
    #[serde(default)]
    pub entries: Vec<ConfigEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ConfigEntriesDocument {
    /// HomeKit entries, in file order.
    pub fn homekit_entries(&self) -> impl Iterator<Item = &ConfigEntry> {
        self.data.entries.iter().filter(|entry| entry.is_homekit())
    }

    /// The HomeKit entry whose title equals `title` exactly.
    ///
    /// When several entries share the title the last one in the file wins.
    pub fn homekit_entry_mut(&mut self, title: &str) -> Option<&mut ConfigEntry> {
        self.data
            .entries
            .iter_mut()
            .rev()
            .find(|entry| entry.is_homekit() && entry.title() == Some(title))
    }
}

/// One integration instance, stored as its raw JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigEntry(Map<String, Value>);

impl ConfigEntry {
    #[must_use]
    pub fn from_map(raw: Map<String, Value>) -> Self {
        Self(raw)
    }

    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    #[must_use]
    pub fn domain(&self) -> Option<&str> {
        self.0.get("domain").and_then(Value::as_str)
    }

    #[must_use]
    pub fn is_homekit(&self) -> bool {
        self.domain() == Some(HOMEKIT_DOMAIN)
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.0.get("title").and_then(Value::as_str)
    }

    #[must_use]
    pub fn entry_id(&self) -> Option<&str> {
        self.0.get("entry_id").and_then(Value::as_str)
    }

    /// The bridge's HAP port (`data.port`), rendered as text.
    #[must_use]
    pub fn port(&self) -> Option<String> {
        match self.0.get("data")?.get("port")? {
            Value::Null => None,
            Value::String(port) => Some(port.clone()),
            other => Some(other.to_string()),
        }
    }

    #[must_use]
    pub fn modified_at(&self) -> Option<&str> {
        self.0.get("modified_at").and_then(Value::as_str)
    }

    /// The entity filter under `options.filter`.
    ///
    /// Missing or malformed lists read as empty.
    #[must_use]
    pub fn entity_filter(&self) -> HomekitFilter {
        let Some(Value::Object(filter)) = self.0.get("options").and_then(|o| o.get("filter"))
        else {
            return HomekitFilter::default();
        };
        HomekitFilter {
            include_domains: string_list(filter.get("include_domains")),
            exclude_domains: string_list(filter.get("exclude_domains")),
            include_entities: string_list(filter.get("include_entities")),
            exclude_entities: string_list(filter.get("exclude_entities")),
        }
    }

    /// Overwrite the four filter lists, creating `options.filter` if needed.
    ///
    /// Other keys under `options` and `options.filter` are left untouched.
    pub fn set_entity_filter(&mut self, filter: &HomekitFilter) {
        let Some(target) =
            object_entry(&mut self.0, "options").and_then(|options| object_entry(options, "filter"))
        else {
            return;
        };
        target.insert(
            "include_domains".to_string(),
            Value::from(filter.include_domains.clone()),
        );
        target.insert(
            "exclude_domains".to_string(),
            Value::from(filter.exclude_domains.clone()),
        );
        target.insert(
            "include_entities".to_string(),
            Value::from(filter.include_entities.clone()),
        );
        target.insert(
            "exclude_entities".to_string(),
            Value::from(filter.exclude_entities.clone()),
        );
    }

    /// Stamp `modified_at`.
    pub fn touch(&mut self, ts: Timestamp) {
        self.0
            .insert("modified_at".to_string(), Value::from(format_modified_at(ts)));
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn object_entry<'a>(
    map: &'a mut Map<String, Value>,
    key: &str,
) -> Option<&'a mut Map<String, Value>> {
    let slot = map
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    slot.as_object_mut()
}

/// The HomeKit entity filter lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomekitFilter {
    pub include_domains: Vec<String>,
    pub exclude_domains: Vec<String>,
    pub include_entities: Vec<String>,
    pub exclude_entities: Vec<String>,
}

impl HomekitFilter {
    /// An explicit include list and nothing else.
    #[must_use]
    pub fn include_only(entity_ids: &[EntityId]) -> Self {
        Self {
            include_entities: entity_ids.iter().map(ToString::to_string).collect(),
            ..Self::default()
        }
    }

    /// How this filter selects entities.
    #[must_use]
    pub fn mode(&self) -> FilterMode {
        if !self.include_entities.is_empty() {
            FilterMode::Include(self.include_entities.len())
        } else if !self.include_domains.is_empty() {
            FilterMode::Domain(self.include_domains.clone())
        } else {
            FilterMode::Unknown
        }
    }
}

/// Filter mode of an existing bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterMode {
    /// Explicit entity list with this many entries.
    Include(usize),
    /// Whole domains.
    Domain(Vec<String>),
    Unknown,
}
