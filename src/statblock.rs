//! Partial statblock data model.
//!
//! A `Statblock` is the shape shared by a template's locked stats and each of
//! its per-CR samples. Every field is optional: presence is tracked with
//! `Option`, so a stored `0` (a tiny creature, no natural armor) is a real
//! value and never mistaken for "unset".

use crate::error::ScaleError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// One of the six ability scores.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ability {
    Str,
    Con,
    Dex,
    Int,
    Wis,
    Cha,
}

impl Ability {
    /// All abilities, in resolution order.
    pub const ALL: [Ability; 6] = [
        Ability::Str,
        Ability::Con,
        Ability::Dex,
        Ability::Int,
        Ability::Wis,
        Ability::Cha,
    ];

    /// The short lowercase key used in data files (`"str"`, `"dex"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Ability::Str => "str",
            Ability::Con => "con",
            Ability::Dex => "dex",
            Ability::Int => "int",
            Ability::Wis => "wis",
            Ability::Cha => "cha",
        }
    }
}

impl FromStr for Ability {
    type Err = ScaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ability::ALL
            .into_iter()
            .find(|ability| ability.as_str() == s)
            .ok_or_else(|| ScaleError::InvalidStatPath(s.to_string()))
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value per ability score.
///
/// Used as `AbilityScores<Option<i32>>` in partial statblocks,
/// `AbilityScores<i32>` in derived ones and `AbilityScores<f64>` in the
/// averages table. Serializes flat, with the short ability keys.
///
/// # Examples
///
/// ```rust
/// use crscale::{Ability, AbilityScores};
///
/// let mut scores: AbilityScores<i32> = AbilityScores::default();
/// scores.set(Ability::Dex, 14);
/// assert_eq!(scores.get(Ability::Dex), 14);
/// assert_eq!(scores.get(Ability::Str), 0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilityScores<T> {
    #[serde(rename = "str")]
    pub strength: T,
    #[serde(rename = "con")]
    pub constitution: T,
    #[serde(rename = "dex")]
    pub dexterity: T,
    #[serde(rename = "int")]
    pub intelligence: T,
    #[serde(rename = "wis")]
    pub wisdom: T,
    #[serde(rename = "cha")]
    pub charisma: T,
}

impl<T: Copy> AbilityScores<T> {
    /// Get the value for one ability.
    pub fn get(&self, ability: Ability) -> T {
        match ability {
            Ability::Str => self.strength,
            Ability::Con => self.constitution,
            Ability::Dex => self.dexterity,
            Ability::Int => self.intelligence,
            Ability::Wis => self.wisdom,
            Ability::Cha => self.charisma,
        }
    }

    /// Set the value for one ability.
    pub fn set(&mut self, ability: Ability, value: T) {
        let slot = match ability {
            Ability::Str => &mut self.strength,
            Ability::Con => &mut self.constitution,
            Ability::Dex => &mut self.dexterity,
            Ability::Int => &mut self.intelligence,
            Ability::Wis => &mut self.wisdom,
            Ability::Cha => &mut self.charisma,
        };
        *slot = value;
    }

    /// Apply `f` to every ability.
    pub fn map<U>(&self, mut f: impl FnMut(Ability, T) -> U) -> AbilityScores<U> {
        AbilityScores {
            strength: f(Ability::Str, self.strength),
            constitution: f(Ability::Con, self.constitution),
            dexterity: f(Ability::Dex, self.dexterity),
            intelligence: f(Ability::Int, self.intelligence),
            wisdom: f(Ability::Wis, self.wisdom),
            charisma: f(Ability::Cha, self.charisma),
        }
    }
}

/// A (possibly partial) attack definition.
///
/// The same shape is used for a template's base attack, a locked override
/// and a per-CR override; [`AttackProfile::overlay`] merges them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttackProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage_dice: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage_die_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finesse: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ranged: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reach: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage_type: Option<String>,
    /// Identifier of a proc text in the reference data.
    #[serde(rename = "proc", skip_serializing_if = "Option::is_none")]
    pub proc_id: Option<String>,
}

impl AttackProfile {
    /// Overwrite every field that `other` sets.
    pub fn overlay(&mut self, other: &AttackProfile) {
        overlay_field(&mut self.name, &other.name);
        overlay_field(&mut self.damage_dice, &other.damage_dice);
        overlay_field(&mut self.damage_die_size, &other.damage_die_size);
        overlay_field(&mut self.finesse, &other.finesse);
        overlay_field(&mut self.ranged, &other.ranged);
        overlay_field(&mut self.reach, &other.reach);
        overlay_field(&mut self.damage_type, &other.damage_type);
        overlay_field(&mut self.proc_id, &other.proc_id);
    }

    /// Whether the attack may use dexterity instead of strength.
    pub fn is_finesse(&self) -> bool {
        self.finesse.unwrap_or(false)
    }

    /// Whether the attack is ranged.
    pub fn is_ranged(&self) -> bool {
        self.ranged.unwrap_or(false)
    }
}

/// A partial statblock: locked stats, or a sample at one CR.
///
/// # Examples
///
/// ```rust
/// use crscale::{Ability, Statblock};
///
/// let sample: Statblock = serde_json::from_str(
///     r#"{"str": 15, "con": 13, "size": 2, "hitDice": 2}"#,
/// ).unwrap();
/// assert_eq!(sample.abilities.get(Ability::Str), Some(15));
/// assert_eq!(sample.size, Some(2));
/// assert_eq!(sample.natural_armor, None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Statblock {
    /// Display name at this CR (e.g. "Dire Wolf").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Walking speed in feet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<u32>,
    /// Size ordinal into the size table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u8>,
    #[serde(flatten)]
    pub abilities: AbilityScores<Option<i32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub natural_armor: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hit_dice: Option<u32>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attacks: BTreeMap<String, AttackProfile>,
}

impl Statblock {
    /// Overwrite every field that `other` sets.
    ///
    /// Attacks are merged per attack and per field.
    pub fn overlay(&mut self, other: &Statblock) {
        overlay_field(&mut self.name, &other.name);
        overlay_field(&mut self.speed, &other.speed);
        overlay_field(&mut self.size, &other.size);
        for ability in Ability::ALL {
            if let Some(score) = other.abilities.get(ability) {
                self.abilities.set(ability, Some(score));
            }
        }
        overlay_field(&mut self.natural_armor, &other.natural_armor);
        overlay_field(&mut self.hit_dice, &other.hit_dice);
        for (id, attack) in &other.attacks {
            self.attacks.entry(id.clone()).or_default().overlay(attack);
        }
    }
}

fn overlay_field<T: Clone>(target: &mut Option<T>, source: &Option<T>) {
    if let Some(value) = source {
        *target = Some(value.clone());
    }
}
