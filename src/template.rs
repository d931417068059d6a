//! Creature templates and the template registry.
//!
//! A template is a creature archetype: descriptive data, locked stats that
//! hold at every CR, base attacks, and sparse per-CR samples ("keyframes")
//! that the resolver interpolates between.

use crate::challenge_rating::ChallengeRating;
use crate::error::ScaleError;
use crate::statblock::{AttackProfile, Statblock};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A creature archetype.
///
/// # Examples
///
/// ```rust
/// use crscale::{ChallengeRating, Template};
///
/// let wolf: Template = serde_json::from_str(r#"{
///     "slug": "wolf",
///     "type": "beast",
///     "alignment": "unaligned",
///     "stats": {"1/4": {"str": 12, "size": 2}}
/// }"#).unwrap();
///
/// assert_eq!(wolf.creature_type, "beast");
/// assert!(wolf.sample(ChallengeRating::Quarter).is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Template {
    pub slug: String,
    #[serde(rename = "type")]
    pub creature_type: String,
    pub alignment: String,
    /// Proficient skills, in display order.
    pub skills: Vec<String>,
    /// Trait identifiers into the reference text registry.
    pub traits: Vec<String>,
    /// Stats that hold at every CR and are never extrapolated.
    pub locked_stats: Statblock,
    /// Base attack definitions.
    pub attacks: BTreeMap<String, AttackProfile>,
    /// Samples keyed by the CR they describe.
    pub stats: BTreeMap<ChallengeRating, Statblock>,
}

impl Template {
    /// The sample exactly at `cr`, if any.
    pub fn sample(&self, cr: ChallengeRating) -> Option<&Statblock> {
        self.stats.get(&cr)
    }

    /// Find a descriptive value from the nearest sample at or below `target`.
    ///
    /// Used for stats that do not scale, such as the display name or speed:
    /// the value comes from the highest sample CR not above the target that
    /// carries it, or failing that from the lowest sample CR that does.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use crscale::{ChallengeRating, Template};
    ///
    /// let template: Template = serde_json::from_str(r#"{
    ///     "stats": {
    ///         "1": {"name": "Wolf"},
    ///         "3": {"name": "Dire Wolf"},
    ///         "5": {"name": "Winter Wolf"}
    ///     }
    /// }"#).unwrap();
    ///
    /// let name = |cr| template.nearest_lower(cr, |s| s.name.clone());
    /// assert_eq!(name(ChallengeRating::Whole(4)).as_deref(), Some("Dire Wolf"));
    /// assert_eq!(name(ChallengeRating::Half).as_deref(), Some("Wolf"));
    /// ```
    pub fn nearest_lower<T>(
        &self,
        target: ChallengeRating,
        pick: impl Fn(&Statblock) -> Option<T>,
    ) -> Option<T> {
        self.stats
            .range(..=target)
            .rev()
            .find_map(|(_, sample)| pick(sample))
            .or_else(|| self.stats.values().find_map(|sample| pick(sample)))
    }
}

/// Templates keyed by identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateRegistry {
    templates: BTreeMap<String, Template>,
}

impl TemplateRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a registry from a JSON object of id → template.
    ///
    /// Templates without a slug take their identifier as slug.
    pub fn from_json(json: &str) -> Result<Self, ScaleError> {
        let mut registry: TemplateRegistry = serde_json::from_str(json)?;
        for (id, template) in registry.templates.iter_mut() {
            if template.slug.is_empty() {
                template.slug = id.clone();
            }
        }
        Ok(registry)
    }

    /// Register a template, replacing any previous one under `id`.
    pub fn insert(&mut self, id: impl Into<String>, template: Template) {
        self.templates.insert(id.into(), template);
    }

    /// Look up a template.
    pub fn get(&self, id: &str) -> Result<&Template, ScaleError> {
        self.templates
            .get(id)
            .ok_or_else(|| ScaleError::UnknownTemplate(id.to_string()))
    }

    /// Iterate over `(id, template)` pairs in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Template)> {
        self.templates.iter().map(|(id, t)| (id.as_str(), t))
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_lower_falls_back_to_lowest() {
        let template: Template = serde_json::from_str(
            r#"{"stats": {"2": {"speed": 40}, "4": {"speed": 50}, "6": {}}}"#,
        )
        .unwrap();
        let speed = |cr| template.nearest_lower(cr, |s| s.speed);

        assert_eq!(speed(ChallengeRating::Zero), Some(40));
        assert_eq!(speed(ChallengeRating::Whole(2)), Some(40));
        assert_eq!(speed(ChallengeRating::Whole(7)), Some(50));
    }

    #[test]
    fn test_nearest_lower_without_any_value() {
        let template = Template::default();
        assert_eq!(
            template.nearest_lower(ChallengeRating::Whole(1), |s| s.speed),
            None
        );
    }

    #[test]
    fn test_registry_lookup() {
        let registry = TemplateRegistry::from_json(
            r#"{"wolf": {"type": "beast"}, "bandit": {"slug": "brigand", "type": "humanoid"}}"#,
        )
        .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("wolf").unwrap().slug, "wolf");
        assert_eq!(registry.get("bandit").unwrap().slug, "brigand");
        assert_eq!(
            registry.get("owlbear"),
            Err(ScaleError::UnknownTemplate("owlbear".to_string()))
        );
    }

    #[test]
    fn test_registry_rejects_bad_cr_keys() {
        let result = TemplateRegistry::from_json(r#"{"wolf": {"stats": {"1/3": {}}}}"#);
        assert!(matches!(result, Err(ScaleError::Parse(_))));
    }
}
