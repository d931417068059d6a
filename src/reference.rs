//! Static reference data for statblock scaling.
//!
//! `ReferenceData` bundles every read-only table the resolver consults: the
//! CR-indexed averages table, the size table, the skill-to-ability mapping
//! and the narrative trait/proc texts. It is loaded once by the caller and
//! passed into the resolver explicitly; the core never mutates it.

use crate::challenge_rating::ChallengeRating;
use crate::error::ScaleError;
use crate::numeric::ability_modifier;
use crate::statblock::{Ability, AbilityScores};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A quantity tracked by the averages table.
///
/// Extrapolation always scales one measure against its average.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Measure {
    Size,
    Ability(Ability),
    ArmorClass,
    HitPoints,
    DamagePerRound,
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Measure::Size => f.write_str("size"),
            Measure::Ability(ability) => f.write_str(ability.as_str()),
            Measure::ArmorClass => f.write_str("ac"),
            Measure::HitPoints => f.write_str("hp"),
            Measure::DamagePerRound => f.write_str("damagePerRound"),
        }
    }
}

/// The expected statblock of a typical creature at one CR.
///
/// Measures are optional so a row that omits one is told apart from a row
/// whose average is zero; [`ReferenceData::average`] reports the former as
/// [`ScaleError::ReferenceDefect`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AverageStats {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(flatten)]
    pub abilities: AbilityScores<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ac: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hp: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage_per_round: Option<f64>,
    pub proficiency: i32,
    pub xp: u32,
}

impl AverageStats {
    /// The average value of one measure, if the row carries it.
    pub fn measure(&self, measure: Measure) -> Option<f64> {
        match measure {
            Measure::Size => self.size,
            Measure::Ability(ability) => self.abilities.get(ability),
            Measure::ArmorClass => self.ac,
            Measure::HitPoints => self.hp,
            Measure::DamagePerRound => self.damage_per_round,
        }
    }
}

/// One row of the size table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeInfo {
    /// Display name, e.g. "Medium".
    pub name: String,
    /// Sides of the hit die a creature of this size rolls.
    pub hit_die: u32,
}

/// Narrative text for a trait.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraitText {
    pub name: String,
    /// May contain `{{token}}` placeholders.
    pub description: String,
}

/// Read-only reference tables.
///
/// # Examples
///
/// ```rust
/// use crscale::{ChallengeRating, ReferenceData};
/// use crscale::reference::Measure;
///
/// let reference = ReferenceData::from_json(r#"{
///     "averages": {"1": {"hp": 78, "proficiency": 2, "xp": 200}},
///     "sizes": {"2": {"name": "Medium", "hitDie": 8}},
///     "skills": {"stealth": "dex"}
/// }"#).unwrap();
///
/// let hp = reference.average(ChallengeRating::Whole(1), Measure::HitPoints).unwrap();
/// assert_eq!(hp, 78.0);
/// assert_eq!(reference.size(2).unwrap().name, "Medium");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceData {
    pub averages: BTreeMap<ChallengeRating, AverageStats>,
    pub sizes: BTreeMap<u8, SizeInfo>,
    pub skills: BTreeMap<String, Ability>,
    pub traits: BTreeMap<String, TraitText>,
    pub procs: BTreeMap<String, String>,
}

impl ReferenceData {
    /// Parse reference data from JSON.
    pub fn from_json(json: &str) -> Result<Self, ScaleError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The averages row for a CR.
    pub fn averages_at(&self, cr: ChallengeRating) -> Result<&AverageStats, ScaleError> {
        self.averages
            .get(&cr)
            .ok_or(ScaleError::UnknownChallengeRating(cr))
    }

    /// The average of one measure at a CR.
    ///
    /// A row that omits the measure, or holds a non-finite value, is a
    /// [`ScaleError::ReferenceDefect`].
    pub fn average(&self, cr: ChallengeRating, measure: Measure) -> Result<f64, ScaleError> {
        self.averages_at(cr)?
            .measure(measure)
            .filter(|value| value.is_finite())
            .ok_or(ScaleError::ReferenceDefect { cr, measure })
    }

    /// The size table row for an ordinal.
    pub fn size(&self, ordinal: u8) -> Result<&SizeInfo, ScaleError> {
        self.sizes.get(&ordinal).ok_or(ScaleError::UnknownSize(ordinal))
    }

    /// The ability a skill keys off.
    pub fn skill_ability(&self, skill: &str) -> Result<Ability, ScaleError> {
        self.skills
            .get(skill)
            .copied()
            .ok_or_else(|| ScaleError::UnknownSkill(skill.to_string()))
    }

    /// Narrative text for a trait.
    pub fn trait_text(&self, id: &str) -> Result<&TraitText, ScaleError> {
        self.traits
            .get(id)
            .ok_or_else(|| ScaleError::UnknownTrait(id.to_string()))
    }

    /// Narrative text for an attack proc.
    pub fn proc_text(&self, id: &str) -> Result<&str, ScaleError> {
        self.procs
            .get(id)
            .map(String::as_str)
            .ok_or_else(|| ScaleError::UnknownProc(id.to_string()))
    }

    /// Average hit points per hit die: `(hitDie + 1) / 2 + mod(con)`.
    pub fn hit_points_per_die(&self, size: u8, con: i32) -> Result<f64, ScaleError> {
        let hit_die = self.size(size)?.hit_die;
        Ok((f64::from(hit_die) + 1.0) / 2.0 + f64::from(ability_modifier(con)))
    }
}
