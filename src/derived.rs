//! Derived statblock results.
//!
//! A `DerivedStatblock` is the fully resolved output for one template at
//! one CR. It is created fresh by every resolution, owned by the caller and
//! never cached by the core. Numbers the display layer needs (armor class,
//! hit points, skill and attack bonuses) are computed here; turning them
//! into strings is left to the consumer.

use crate::challenge_rating::ChallengeRating;
use crate::error::ScaleError;
use crate::path::{StatKey, StatPath};
use crate::reference::ReferenceData;
use crate::statblock::{AbilityScores, AttackProfile};
use crate::text::render_text;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where a resolved stat came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum Provenance {
    /// Set by locked stats or the sample at the target CR.
    Seeded,
    /// Extrapolated from the benchmarks at these CRs.
    Extrapolated {
        lower: Option<ChallengeRating>,
        upper: Option<ChallengeRating>,
    },
    /// No benchmark carried the stat; it is absent from the result.
    Unresolved,
}

/// Total armor class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmorClass {
    /// `10 + naturalArmor + mod(dex)`.
    pub value: i32,
    /// Whether the creature has natural armor.
    pub natural: bool,
}

/// Average hit points and the dice expression behind them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HitPoints {
    /// `floor(hitPointsPerDie * hitDice)`.
    pub average: i32,
    pub hit_dice: u32,
    pub hit_die: u32,
    /// `mod(con) * hitDice`.
    pub constitution_bonus: i32,
}

/// A proficient skill and its total modifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillModifier {
    pub skill: String,
    pub modifier: i32,
}

/// A resolved attack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedAttack {
    /// Merged base, locked and per-CR definition with damage dice filled in.
    #[serde(flatten)]
    pub profile: AttackProfile,
    /// Strength modifier, or the better of strength and dexterity for finesse.
    pub ability_modifier: i32,
    /// Proficiency plus the ability modifier.
    pub attack_bonus: i32,
    /// Average dice roll plus the ability modifier, if the dice are known.
    pub average_damage: Option<i32>,
}

/// A trait with its narrative text rendered against the statblock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedTrait {
    pub name: String,
    pub text: String,
}

/// A fully resolved statblock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedStatblock {
    pub slug: String,
    pub challenge_rating: ChallengeRating,
    pub creature_type: String,
    pub alignment: String,
    /// Display name from the nearest sample at or below the CR.
    pub name: Option<String>,
    /// Speed from the nearest sample at or below the CR.
    pub speed: Option<u32>,
    /// Size ordinal in `[0, 6]`, if any sample or seed carries one.
    pub size: Option<u8>,
    pub abilities: AbilityScores<i32>,
    pub ability_modifiers: AbilityScores<i32>,
    /// Natural armor bonus, absent for creatures without any.
    pub natural_armor: Option<i32>,
    pub hit_dice: u32,
    pub armor_class: ArmorClass,
    /// Absent when the size is unknown.
    pub hit_points: Option<HitPoints>,
    pub proficiency: i32,
    pub xp: u32,
    pub skills: Vec<SkillModifier>,
    pub passive_perception: i32,
    /// Trait identifiers, in template order.
    pub traits: Vec<String>,
    pub attacks: BTreeMap<String, DerivedAttack>,
    /// Provenance of every stat the resolver had to decide on.
    pub breakdown: BTreeMap<StatPath, Provenance>,
}

impl DerivedStatblock {
    /// Read one numeric stat, if present.
    pub fn lookup(&self, path: &StatPath) -> Option<f64> {
        match path {
            StatPath::Stat(StatKey::Size) => self.size.map(f64::from),
            StatPath::Stat(StatKey::Ability(ability)) => {
                Some(f64::from(self.abilities.get(*ability)))
            }
            StatPath::Stat(StatKey::NaturalArmor) => self.natural_armor.map(f64::from),
            StatPath::Stat(StatKey::HitDice) => Some(f64::from(self.hit_dice)),
            StatPath::Stat(StatKey::Speed) => self.speed.map(f64::from),
            StatPath::Attack { attack, field } => self.attacks.get(attack)?.profile.field(*field),
        }
    }

    /// Provenance recorded for a stat.
    pub fn provenance(&self, path: &StatPath) -> Option<Provenance> {
        self.breakdown.get(path).copied()
    }

    /// Render every trait's narrative text, in template order.
    pub fn render_traits(
        &self,
        reference: &ReferenceData,
    ) -> Result<Vec<RenderedTrait>, ScaleError> {
        self.traits
            .iter()
            .map(|id| {
                let text = reference.trait_text(id)?;
                Ok(RenderedTrait {
                    name: text.name.clone(),
                    text: render_text(&text.description, self)?,
                })
            })
            .collect()
    }

    /// Render the proc text of an attack, if it has one.
    pub fn render_proc(
        &self,
        attack: &str,
        reference: &ReferenceData,
    ) -> Result<Option<String>, ScaleError> {
        let Some(proc_id) = self
            .attacks
            .get(attack)
            .and_then(|attack| attack.profile.proc_id.as_deref())
        else {
            return Ok(None);
        };
        render_text(reference.proc_text(proc_id)?, self).map(Some)
    }
}
