//! Benchmark locator.
//!
//! For a set of required stat paths, finds the nearest template sample at or
//! below the target CR and the nearest sample above it that carry every one
//! of those paths. A sample missing any required path is skipped entirely;
//! benchmarks are never assembled from several partial samples.

use crate::challenge_rating::ChallengeRating;
use crate::error::ScaleError;
use crate::extrapolate::{Anchor, Anchors};
use crate::path::StatPath;
use crate::statblock::Statblock;
use std::collections::BTreeMap;
use tracing::trace;

/// The required stat values of one qualifying sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Benchmark {
    /// CR of the sample the values came from.
    pub cr: ChallengeRating,
    values: BTreeMap<StatPath, f64>,
}

impl Benchmark {
    /// Value of a required path. Every path passed to the locator is present.
    pub fn value(&self, path: &StatPath) -> Option<f64> {
        self.values.get(path).copied()
    }

    /// All recorded values.
    pub fn values(&self) -> &BTreeMap<StatPath, f64> {
        &self.values
    }
}

/// The nearest qualifying samples on each side of a target CR.
///
/// At least one side is always set; the locator returns `None` instead of
/// an empty pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Benchmarks {
    /// Nearest sample with CR at or below the target.
    pub lower: Option<Benchmark>,
    /// Nearest sample with CR strictly above the target.
    pub upper: Option<Benchmark>,
}

impl Benchmarks {
    /// Anchors carrying one recorded path's value.
    pub fn anchors_for(&self, path: &StatPath) -> Anchors {
        let anchor = |benchmark: &Benchmark| {
            benchmark.value(path).map(|value| Anchor {
                cr: benchmark.cr,
                value,
            })
        };
        Anchors {
            lower: self.lower.as_ref().and_then(anchor),
            upper: self.upper.as_ref().and_then(anchor),
        }
    }

    /// Anchors carrying a value synthesized from each benchmark, such as an
    /// implied armor class or hit point total.
    pub fn synthesize<F>(&self, mut derive: F) -> Result<Anchors, ScaleError>
    where
        F: FnMut(&Benchmark) -> Result<f64, ScaleError>,
    {
        let mut anchor = |benchmark: &Option<Benchmark>| -> Result<Option<Anchor>, ScaleError> {
            match benchmark {
                Some(benchmark) => Ok(Some(Anchor {
                    cr: benchmark.cr,
                    value: derive(benchmark)?,
                })),
                None => Ok(None),
            }
        };
        Ok(Anchors {
            lower: anchor(&self.lower)?,
            upper: anchor(&self.upper)?,
        })
    }
}

/// Locate the nearest samples around `target` that carry every `required` path.
///
/// Returns `None` when no sample on either side qualifies.
///
/// # Examples
///
/// ```rust
/// use crscale::{Ability, ChallengeRating, Template};
/// use crscale::benchmark::locate_benchmarks;
/// use crscale::path::StatPath;
///
/// let template: Template = serde_json::from_str(r#"{
///     "stats": {
///         "1": {"str": 14},
///         "2": {"dex": 12},
///         "6": {"str": 20}
///     }
/// }"#).unwrap();
///
/// let strength = [StatPath::ability(Ability::Str)];
/// let found = locate_benchmarks(&template.stats, &strength, ChallengeRating::Whole(3)).unwrap();
/// assert_eq!(found.lower.unwrap().cr, ChallengeRating::Whole(1));
/// assert_eq!(found.upper.unwrap().cr, ChallengeRating::Whole(6));
///
/// let wisdom = [StatPath::ability(Ability::Wis)];
/// assert!(locate_benchmarks(&template.stats, &wisdom, ChallengeRating::Whole(3)).is_none());
/// ```
pub fn locate_benchmarks(
    samples: &BTreeMap<ChallengeRating, Statblock>,
    required: &[StatPath],
    target: ChallengeRating,
) -> Option<Benchmarks> {
    let mut lower: Option<Benchmark> = None;
    let mut upper: Option<Benchmark> = None;

    for (&cr, sample) in samples {
        let flat = sample.flatten();
        let values: Option<BTreeMap<StatPath, f64>> = required
            .iter()
            .map(|path| flat.get(path).map(|value| (path.clone(), *value)))
            .collect();
        let Some(values) = values else {
            trace!(%cr, "sample lacks a required stat");
            continue;
        };

        if cr > target {
            if upper.as_ref().map_or(true, |current| cr <= current.cr) {
                upper = Some(Benchmark { cr, values });
            }
        } else if lower.as_ref().map_or(true, |current| cr >= current.cr) {
            lower = Some(Benchmark { cr, values });
        }
    }

    if lower.is_none() && upper.is_none() {
        return None;
    }
    Some(Benchmarks { lower, upper })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::AttackField;
    use crate::statblock::Ability;

    fn samples(json: &str) -> BTreeMap<ChallengeRating, Statblock> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_sample_at_target_is_lower() {
        let samples = samples(r#"{"2": {"con": 14}, "4": {"con": 16}}"#);
        let con = [StatPath::ability(Ability::Con)];
        let found = locate_benchmarks(&samples, &con, ChallengeRating::Whole(2)).unwrap();

        let lower = found.lower.unwrap();
        assert_eq!(lower.cr, ChallengeRating::Whole(2));
        assert_eq!(lower.value(&con[0]), Some(14.0));
        assert_eq!(found.upper.unwrap().cr, ChallengeRating::Whole(4));
    }

    #[test]
    fn test_picks_closest_on_each_side() {
        let samples = samples(
            r#"{"1/8": {"str": 8}, "1/2": {"str": 10}, "3": {"str": 14}, "10": {"str": 20}}"#,
        );
        let strength = [StatPath::ability(Ability::Str)];
        let found = locate_benchmarks(&samples, &strength, ChallengeRating::Whole(2)).unwrap();

        assert_eq!(found.lower.unwrap().cr, ChallengeRating::Half);
        assert_eq!(found.upper.unwrap().cr, ChallengeRating::Whole(3));
    }

    #[test]
    fn test_requires_every_path() {
        let samples = samples(
            r#"{
                "1": {"naturalArmor": 1},
                "2": {"naturalArmor": 2, "dex": 12},
                "5": {"dex": 16}
            }"#,
        );
        let required = [StatPath::NATURAL_ARMOR, StatPath::ability(Ability::Dex)];
        let found = locate_benchmarks(&samples, &required, ChallengeRating::Whole(3)).unwrap();

        let lower = found.lower.unwrap();
        assert_eq!(lower.cr, ChallengeRating::Whole(2));
        assert_eq!(lower.values().len(), 2);
        assert!(found.upper.is_none());
    }

    #[test]
    fn test_zero_counts_as_present() {
        let samples = samples(r#"{"1": {"naturalArmor": 0, "dex": 14}}"#);
        let required = [StatPath::NATURAL_ARMOR, StatPath::ability(Ability::Dex)];
        let found = locate_benchmarks(&samples, &required, ChallengeRating::Whole(1)).unwrap();
        assert_eq!(
            found.lower.unwrap().value(&StatPath::NATURAL_ARMOR),
            Some(0.0)
        );
    }

    #[test]
    fn test_only_upper() {
        let samples = samples(r#"{"5": {"attacks": {"bite": {"damageDice": 2, "damageDieSize": 8}}}}"#);
        let required = [
            StatPath::attack("bite", AttackField::DamageDice),
            StatPath::attack("bite", AttackField::DamageDieSize),
        ];
        let found = locate_benchmarks(&samples, &required, ChallengeRating::Quarter).unwrap();
        assert!(found.lower.is_none());
        assert_eq!(found.upper.unwrap().cr, ChallengeRating::Whole(5));
    }

    #[test]
    fn test_no_samples() {
        let samples = BTreeMap::new();
        assert!(locate_benchmarks(&samples, &[StatPath::SIZE], ChallengeRating::Zero).is_none());
    }

    #[test]
    fn test_synthesize_propagates_errors() {
        let samples = samples(r#"{"1": {"size": 2}}"#);
        let found = locate_benchmarks(&samples, &[StatPath::SIZE], ChallengeRating::Whole(1)).unwrap();
        let result = found.synthesize(|_| Err(ScaleError::UnknownSize(2)));
        assert_eq!(result, Err(ScaleError::UnknownSize(2)));

        let anchors = found.synthesize(|b| Ok(b.value(&StatPath::SIZE).unwrap_or(0.0) * 2.0)).unwrap();
        assert_eq!(anchors.lower.unwrap().value, 4.0);
    }
}
