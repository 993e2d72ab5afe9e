//! Entity filter: user-configured exclusions applied to candidate entities.

use std::collections::HashSet;

use regex::Regex;

use crate::entity::Entity;
use crate::error::{HkBridgeError, ValidationError};

/// Why an entity was filtered out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    /// Listed explicitly in `ignored_entities`.
    Ignored,
    /// Registered by an integration listed in `excluded_integrations`.
    Integration,
    /// Identifier matched one of `excluded_patterns`.
    Pattern,
}

/// Pure inclusion predicate over a single entity.
///
/// Disabled entities and unsupported domains are rejected upstream by
/// [`Entity::is_candidate`]; this filter only applies the user's exclusions.
#[derive(Debug, Clone, Default)]
pub struct EntityFilter {
    ignored_entities: HashSet<String>,
    excluded_integrations: HashSet<String>,
    excluded_patterns: Vec<Regex>,
}

impl EntityFilter {
    /// Build a filter, compiling every exclusion pattern up front.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPattern`] for the first pattern that
    /// is not a valid regular expression.
    pub fn new<I, J, K>(
        ignored_entities: I,
        excluded_integrations: J,
        excluded_patterns: K,
    ) -> Result<Self, HkBridgeError>
    where
        I: IntoIterator,
        I::Item: Into<String>,
        J: IntoIterator,
        J::Item: Into<String>,
        K: IntoIterator,
        K::Item: AsRef<str>,
    {
        let excluded_patterns = excluded_patterns
            .into_iter()
            .map(|pattern| {
                let pattern = pattern.as_ref();
                Regex::new(pattern).map_err(|source| ValidationError::InvalidPattern {
                    pattern: pattern.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            ignored_entities: ignored_entities.into_iter().map(Into::into).collect(),
            excluded_integrations: excluded_integrations.into_iter().map(Into::into).collect(),
            excluded_patterns,
        })
    }

    /// The first exclusion that applies to `entity`, checked in order:
    /// ignore list, integration, pattern.
    #[must_use]
    pub fn exclusion(&self, entity: &Entity) -> Option<Exclusion> {
        let id = entity.entity_id.as_str();
        if self.ignored_entities.contains(id) {
            return Some(Exclusion::Ignored);
        }
        if self.excluded_integrations.contains(&entity.platform) {
            return Some(Exclusion::Integration);
        }
        if self.excluded_patterns.iter().any(|re| re.is_match(id)) {
            return Some(Exclusion::Pattern);
        }
        None
    }

    /// Whether `entity` survives every exclusion.
    #[must_use]
    pub fn include(&self, entity: &Entity) -> bool {
        self.exclusion(entity).is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(id: &str, platform: &str) -> Entity {
        Entity::builder()
            .entity_id(id)
            .platform(platform)
            .build()
            .unwrap()
    }

    fn filter() -> EntityFilter {
        EntityFilter::new(
            ["switch.do_not_want"],
            ["unifi", "sonos"],
            [r"_segment_\d{3}"],
        )
        .unwrap()
    }

    #[test]
    fn should_include_entity_when_no_exclusion_applies() {
        assert!(filter().include(&entity("light.kitchen", "hue")));
    }

    #[test]
    fn should_exclude_entity_in_ignore_list() {
        assert_eq!(
            filter().exclusion(&entity("switch.do_not_want", "hue")),
            Some(Exclusion::Ignored)
        );
    }

    #[test]
    fn should_exclude_entity_from_excluded_integration() {
        assert_eq!(
            filter().exclusion(&entity("switch.unifi_ap", "unifi")),
            Some(Exclusion::Integration)
        );
    }

    #[test]
    fn should_exclude_entity_matching_pattern_anywhere_in_id() {
        let f = filter();
        assert_eq!(
            f.exclusion(&entity("light.strip_segment_001", "govee")),
            Some(Exclusion::Pattern)
        );
        assert!(f.include(&entity("light.strip_segment_1", "govee")));
    }

    #[test]
    fn should_report_ignore_list_before_integration() {
        let f = EntityFilter::new(["switch.unifi_ap"], ["unifi"], Vec::<String>::new()).unwrap();
        assert_eq!(
            f.exclusion(&entity("switch.unifi_ap", "unifi")),
            Some(Exclusion::Ignored)
        );
    }

    #[test]
    fn should_include_everything_with_default_filter() {
        assert!(EntityFilter::default().include(&entity("switch.anything", "unifi")));
    }

    #[test]
    fn should_reject_invalid_pattern() {
        let result = EntityFilter::new(
            Vec::<String>::new(),
            Vec::<String>::new(),
            ["(unclosed"],
        );
        assert!(matches!(
            result,
            Err(HkBridgeError::Validation(ValidationError::InvalidPattern { pattern, .. })) if pattern == "(unclosed"
        ));
    }
}
