//! Statblock resolver module.
//!
//! Provides the `StatblockResolver` type, the entry point that derives a
//! complete statblock for a template at a target CR. Resolution runs once
//! per call through fixed stages:
//! 1. Seed from locked stats overlaid by the sample at the target CR
//! 2. Size (offset scaling, clamped)
//! 3. Ability scores (ratio scaling, each independently)
//! 4. Natural armor, reverse-derived from an extrapolated armor class
//! 5. Hit dice, reverse-derived from extrapolated hit points
//! 6. Attacks, with damage dice chosen from extrapolated damage per round
//!
//! Any stat already set by the seed is never extrapolated.

use crate::benchmark::{locate_benchmarks, Benchmark, Benchmarks};
use crate::challenge_rating::ChallengeRating;
use crate::derived::{
    ArmorClass, DerivedAttack, DerivedStatblock, HitPoints, Provenance, SkillModifier,
};
use crate::dice::find_damage_dice;
use crate::error::ScaleError;
use crate::extrapolate::{extrapolate, Anchors, ScalingMode};
use crate::numeric::{ability_modifier, average_roll, round_half_up};
use crate::path::{AttackField, StatPath};
use crate::reference::{Measure, ReferenceData};
use crate::statblock::{Ability, AbilityScores, AttackProfile, Statblock};
use crate::template::{Template, TemplateRegistry};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Largest valid size ordinal.
pub const MAX_SIZE: u8 = 6;

/// Base armor class before natural armor and dexterity.
const BASE_ARMOR_CLASS: i32 = 10;

/// Base passive Perception before wisdom and proficiency.
const BASE_PASSIVE_PERCEPTION: i32 = 10;

const PERCEPTION: &str = "perception";

/// Derives complete statblocks against a fixed set of reference data.
///
/// The resolver holds nothing but a borrow of the reference data, so
/// resolutions are pure: the same template and CR always produce the same
/// statblock, and callers may cache results keyed by `(template id, CR)`.
///
/// # Examples
///
/// ```rust
/// use crscale::*;
///
/// let reference = ReferenceData::from_json(r#"{
///     "averages": {
///         "1": {"size": 2, "str": 12, "con": 12, "dex": 12, "int": 6, "wis": 10, "cha": 6,
///               "hp": 20, "proficiency": 2, "xp": 200},
///         "3": {"size": 3, "str": 15, "con": 14, "dex": 13, "int": 7, "wis": 11, "cha": 7,
///               "hp": 40, "proficiency": 2, "xp": 700}
///     },
///     "sizes": {"2": {"name": "Medium", "hitDie": 8}, "3": {"name": "Large", "hitDie": 10}}
/// }"#).unwrap();
///
/// let wolf: Template = serde_json::from_str(r#"{
///     "slug": "wolf",
///     "type": "beast",
///     "stats": {"1": {"str": 12, "con": 12, "dex": 12, "int": 6, "wis": 10, "cha": 6,
///                     "size": 2, "hitDice": 4}}
/// }"#).unwrap();
///
/// let resolver = StatblockResolver::new(&reference);
/// let derived = resolver.resolve(&wolf, ChallengeRating::Whole(3)).unwrap();
/// assert_eq!(derived.abilities.get(Ability::Str), 15);
/// assert_eq!(derived.size, Some(3));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct StatblockResolver<'a> {
    reference: &'a ReferenceData,
}

impl<'a> StatblockResolver<'a> {
    /// Create a resolver over the given reference data.
    pub fn new(reference: &'a ReferenceData) -> Self {
        Self { reference }
    }

    /// The reference data this resolver reads.
    pub fn reference(&self) -> &'a ReferenceData {
        self.reference
    }

    /// Resolve a registered template by identifier.
    pub fn resolve_by_id(
        &self,
        registry: &TemplateRegistry,
        id: &str,
        target: ChallengeRating,
    ) -> Result<DerivedStatblock, ScaleError> {
        self.resolve(registry.get(id)?, target)
    }

    /// Derive the complete statblock of `template` at `target`.
    ///
    /// # Errors
    ///
    /// - [`ScaleError::UnknownChallengeRating`] if `target` (or a sample CR
    ///   used as a benchmark) has no averages row.
    /// - [`ScaleError::MissingBenchmark`] if an ability score or the hit dice
    ///   cannot be seeded or extrapolated.
    /// - [`ScaleError::ReferenceDefect`], [`ScaleError::UnknownSize`] or
    ///   [`ScaleError::UnknownSkill`] for incomplete reference data.
    #[instrument(skip_all, fields(template = %template.slug, cr = %target))]
    pub fn resolve(
        &self,
        template: &Template,
        target: ChallengeRating,
    ) -> Result<DerivedStatblock, ScaleError> {
        let averages = self.reference.averages_at(target)?;
        let mut resolution = Resolution {
            reference: self.reference,
            template,
            target,
            seed: seed(template, target),
            breakdown: BTreeMap::new(),
        };

        let size = resolution.size()?;
        let abilities = resolution.abilities()?;
        let modifiers = abilities.map(|_, score| ability_modifier(score));
        let natural_armor = resolution.natural_armor(modifiers.dexterity)?;
        let hit_dice = resolution.hit_dice(size, abilities.constitution)?;
        let attacks = resolution.attacks(&modifiers, averages.proficiency)?;

        let hit_points = match size {
            Some(size) => {
                let per_die = self.reference.hit_points_per_die(size, abilities.constitution)?;
                Some(HitPoints {
                    average: (per_die * f64::from(hit_dice)).floor() as i32,
                    hit_dice,
                    hit_die: self.reference.size(size)?.hit_die,
                    constitution_bonus: modifiers.constitution * hit_dice as i32,
                })
            }
            None => None,
        };

        let skills = template
            .skills
            .iter()
            .map(|skill| {
                let ability = self.reference.skill_ability(skill)?;
                Ok(SkillModifier {
                    skill: skill.clone(),
                    modifier: averages.proficiency + modifiers.get(ability),
                })
            })
            .collect::<Result<Vec<_>, ScaleError>>()?;
        let perception_bonus = if template.skills.iter().any(|skill| skill == PERCEPTION) {
            averages.proficiency
        } else {
            0
        };

        let derived = DerivedStatblock {
            slug: template.slug.clone(),
            challenge_rating: target,
            creature_type: template.creature_type.clone(),
            alignment: template.alignment.clone(),
            name: resolution.seed.name.clone().or_else(|| {
                template.nearest_lower(target, |sample| sample.name.clone())
            }),
            speed: resolution
                .seed
                .speed
                .or_else(|| template.nearest_lower(target, |sample| sample.speed)),
            size,
            abilities,
            ability_modifiers: modifiers,
            natural_armor,
            hit_dice,
            armor_class: ArmorClass {
                value: BASE_ARMOR_CLASS + natural_armor.unwrap_or(0) + modifiers.dexterity,
                natural: natural_armor.is_some(),
            },
            hit_points,
            proficiency: averages.proficiency,
            xp: averages.xp,
            skills,
            passive_perception: BASE_PASSIVE_PERCEPTION + modifiers.wisdom + perception_bonus,
            traits: template.traits.clone(),
            attacks,
            breakdown: resolution.breakdown,
        };
        debug!(hit_dice, size = ?derived.size, "resolved statblock");
        Ok(derived)
    }
}

/// Locked stats overlaid by the sample at the target CR.
fn seed(template: &Template, target: ChallengeRating) -> Statblock {
    let mut seed = template.locked_stats.clone();
    if let Some(sample) = template.sample(target) {
        seed.overlay(sample);
    }
    seed
}

/// Working state of one resolution.
struct Resolution<'r> {
    reference: &'r ReferenceData,
    template: &'r Template,
    target: ChallengeRating,
    seed: Statblock,
    breakdown: BTreeMap<StatPath, Provenance>,
}

impl Resolution<'_> {
    fn locate(&self, required: &[StatPath]) -> Option<Benchmarks> {
        locate_benchmarks(&self.template.stats, required, self.target)
    }

    /// Extrapolate a measure from anchors built out of `benchmarks`.
    fn extrapolate(
        &self,
        benchmarks: &Benchmarks,
        anchors: &Anchors,
        measure: Measure,
        mode: ScalingMode,
    ) -> Result<Option<(i64, Provenance)>, ScaleError> {
        let value = extrapolate(self.reference, measure, mode, self.target, anchors)?;
        Ok(value.map(|value| {
            let provenance = Provenance::Extrapolated {
                lower: benchmarks.lower.as_ref().map(|b| b.cr),
                upper: benchmarks.upper.as_ref().map(|b| b.cr),
            };
            (value, provenance)
        }))
    }

    fn missing(&self, stat: StatPath) -> ScaleError {
        ScaleError::MissingBenchmark {
            template: self.template.slug.clone(),
            stat,
        }
    }

    fn size(&mut self) -> Result<Option<u8>, ScaleError> {
        if let Some(size) = self.seed.size {
            self.breakdown.insert(StatPath::SIZE, Provenance::Seeded);
            return Ok(Some(size.min(MAX_SIZE)));
        }

        let required = [StatPath::SIZE];
        let extrapolated = match self.locate(&required) {
            Some(benchmarks) => {
                let anchors = benchmarks.anchors_for(&StatPath::SIZE);
                self.extrapolate(&benchmarks, &anchors, Measure::Size, ScalingMode::Offset)?
            }
            None => None,
        };

        match extrapolated {
            Some((size, provenance)) => {
                self.breakdown.insert(StatPath::SIZE, provenance);
                Ok(Some(size.clamp(0, i64::from(MAX_SIZE)) as u8))
            }
            None => {
                debug!("no size benchmark");
                self.breakdown.insert(StatPath::SIZE, Provenance::Unresolved);
                Ok(None)
            }
        }
    }

    fn abilities(&mut self) -> Result<AbilityScores<i32>, ScaleError> {
        let mut scores = AbilityScores::default();
        for ability in Ability::ALL {
            let path = StatPath::ability(ability);
            let score = match self.seed.abilities.get(ability) {
                Some(score) => {
                    self.breakdown.insert(path, Provenance::Seeded);
                    score
                }
                None => {
                    let benchmarks = self
                        .locate(std::slice::from_ref(&path))
                        .ok_or_else(|| self.missing(path.clone()))?;
                    let anchors = benchmarks.anchors_for(&path);
                    let (score, provenance) = self
                        .extrapolate(
                            &benchmarks,
                            &anchors,
                            Measure::Ability(ability),
                            ScalingMode::Ratio,
                        )?
                        .ok_or_else(|| self.missing(path.clone()))?;
                    self.breakdown.insert(path, provenance);
                    score as i32
                }
            };
            scores.set(ability, score);
        }
        Ok(scores)
    }

    /// Natural armor from an extrapolated total armor class.
    ///
    /// Armor class tracks CR more closely than natural armor does, and many
    /// creatures have none, so each benchmark's total is extrapolated and the
    /// bonus worked back out with the derived dexterity.
    fn natural_armor(&mut self, dex_modifier: i32) -> Result<Option<i32>, ScaleError> {
        if let Some(natural_armor) = self.seed.natural_armor {
            self.breakdown
                .insert(StatPath::NATURAL_ARMOR, Provenance::Seeded);
            return Ok(Some(natural_armor));
        }

        let dex = StatPath::ability(Ability::Dex);
        let required = [StatPath::NATURAL_ARMOR, dex.clone()];
        let extrapolated = match self.locate(&required) {
            Some(benchmarks) => {
                let anchors = benchmarks.synthesize(|benchmark| {
                    let natural_armor = required_value(benchmark, &StatPath::NATURAL_ARMOR);
                    let dex_score = required_value(benchmark, &dex) as i32;
                    Ok(f64::from(BASE_ARMOR_CLASS)
                        + natural_armor
                        + f64::from(ability_modifier(dex_score)))
                })?;
                self.extrapolate(&benchmarks, &anchors, Measure::ArmorClass, ScalingMode::Ratio)?
            }
            None => None,
        };

        match extrapolated {
            Some((armor_class, provenance)) => {
                self.breakdown.insert(StatPath::NATURAL_ARMOR, provenance);
                let natural_armor = armor_class as i32 - BASE_ARMOR_CLASS - dex_modifier;
                Ok(Some(natural_armor.max(0)))
            }
            None => {
                debug!("no natural armor benchmark; creature has none");
                self.breakdown
                    .insert(StatPath::NATURAL_ARMOR, Provenance::Unresolved);
                Ok(None)
            }
        }
    }

    /// Hit dice from extrapolated hit points.
    fn hit_dice(&mut self, size: Option<u8>, con: i32) -> Result<u32, ScaleError> {
        if let Some(hit_dice) = self.seed.hit_dice {
            self.breakdown.insert(StatPath::HIT_DICE, Provenance::Seeded);
            return Ok(hit_dice);
        }

        let con_path = StatPath::ability(Ability::Con);
        let required = [StatPath::SIZE, con_path.clone(), StatPath::HIT_DICE];
        let benchmarks = self
            .locate(&required)
            .ok_or_else(|| self.missing(StatPath::HIT_DICE))?;
        let reference = self.reference;
        let anchors = benchmarks.synthesize(|benchmark| {
            let size = required_value(benchmark, &StatPath::SIZE) as u8;
            let con = required_value(benchmark, &con_path) as i32;
            let hit_dice = required_value(benchmark, &StatPath::HIT_DICE);
            Ok((reference.hit_points_per_die(size, con)? * hit_dice).floor())
        })?;
        let (hit_points, provenance) = self
            .extrapolate(&benchmarks, &anchors, Measure::HitPoints, ScalingMode::Ratio)?
            .ok_or_else(|| self.missing(StatPath::HIT_DICE))?;

        let size = size.ok_or_else(|| self.missing(StatPath::SIZE))?;
        let per_die = self.reference.hit_points_per_die(size, con)?;
        let hit_dice = if per_die > 0.0 {
            round_half_up(hit_points as f64 / per_die).max(1.0) as u32
        } else {
            1
        };
        self.breakdown.insert(StatPath::HIT_DICE, provenance);
        Ok(hit_dice)
    }

    fn attacks(
        &mut self,
        modifiers: &AbilityScores<i32>,
        proficiency: i32,
    ) -> Result<BTreeMap<String, DerivedAttack>, ScaleError> {
        let template = self.template;
        let mut attacks = BTreeMap::new();
        for (id, base) in &template.attacks {
            let mut profile = base.clone();
            if let Some(locked) = template.locked_stats.attacks.get(id) {
                profile.overlay(locked);
            }
            if let Some(sample) = template
                .sample(self.target)
                .and_then(|sample| sample.attacks.get(id))
            {
                profile.overlay(sample);
            }

            let finesse = profile.is_finesse();
            let modifier = attack_modifier(finesse, modifiers.strength, modifiers.dexterity);
            let dice_path = StatPath::attack(id.as_str(), AttackField::DamageDice);
            if profile.damage_dice.is_some() {
                self.breakdown.insert(dice_path, Provenance::Seeded);
            } else {
                self.attack_damage(id, &mut profile, modifier)?;
            }

            let average_damage = profile
                .damage_dice
                .zip(profile.damage_die_size)
                .map(|(count, die_size)| average_roll(count, die_size) + modifier);
            attacks.insert(
                id.clone(),
                DerivedAttack {
                    profile,
                    ability_modifier: modifier,
                    attack_bonus: proficiency + modifier,
                    average_damage,
                },
            );
        }
        Ok(attacks)
    }

    /// Fill in damage dice from extrapolated damage per round.
    fn attack_damage(
        &mut self,
        id: &str,
        profile: &mut AttackProfile,
        modifier: i32,
    ) -> Result<(), ScaleError> {
        let finesse = profile.is_finesse();
        let strength = StatPath::ability(Ability::Str);
        let dexterity = StatPath::ability(Ability::Dex);
        let dice_path = StatPath::attack(id, AttackField::DamageDice);
        let die_path = StatPath::attack(id, AttackField::DamageDieSize);
        let mut required = vec![strength.clone(), dice_path.clone(), die_path.clone()];
        if finesse {
            required.push(dexterity.clone());
        }

        let extrapolated = match self.locate(&required) {
            Some(benchmarks) => {
                let anchors = benchmarks.synthesize(|benchmark| {
                    let count = required_value(benchmark, &dice_path) as u32;
                    let die_size = required_value(benchmark, &die_path) as u32;
                    let str_modifier = ability_modifier(required_value(benchmark, &strength) as i32);
                    let dex_modifier = if finesse {
                        ability_modifier(required_value(benchmark, &dexterity) as i32)
                    } else {
                        str_modifier
                    };
                    let modifier = attack_modifier(finesse, str_modifier, dex_modifier);
                    Ok(f64::from(average_roll(count, die_size) + modifier))
                })?;
                self.extrapolate(
                    &benchmarks,
                    &anchors,
                    Measure::DamagePerRound,
                    ScalingMode::Ratio,
                )?
            }
            None => None,
        };

        match extrapolated {
            Some((damage_per_round, provenance)) => {
                let dice = find_damage_dice((damage_per_round - i64::from(modifier)) as f64);
                debug!(attack = id, damage_per_round, %dice, "chose damage dice");
                profile.damage_dice = Some(dice.count);
                profile.damage_die_size = Some(dice.die_size);
                self.breakdown.insert(dice_path, provenance);
            }
            None => {
                debug!(attack = id, "no damage benchmark");
                self.breakdown.insert(dice_path, Provenance::Unresolved);
            }
        }
        Ok(())
    }
}

/// The modifier an attack adds to hit and damage.
fn attack_modifier(finesse: bool, str_modifier: i32, dex_modifier: i32) -> i32 {
    if finesse {
        str_modifier.max(dex_modifier)
    } else {
        str_modifier
    }
}

/// A benchmark value for a path passed to the locator, which guarantees it.
fn required_value(benchmark: &Benchmark, path: &StatPath) -> f64 {
    benchmark.value(path).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> ReferenceData {
        ReferenceData::from_json(
            r#"{
                "averages": {
                    "1": {"size": 2, "str": 12, "con": 12, "dex": 12, "int": 8, "wis": 10, "cha": 8,
                          "ac": 13, "hp": 24, "damagePerRound": 6, "proficiency": 2, "xp": 200},
                    "2": {"size": 2, "str": 14, "con": 13, "dex": 12, "int": 8, "wis": 10, "cha": 8,
                          "ac": 13, "hp": 36, "damagePerRound": 9, "proficiency": 2, "xp": 450},
                    "4": {"size": 3, "str": 16, "con": 14, "dex": 12, "int": 8, "wis": 10, "cha": 8,
                          "ac": 14, "hp": 60, "damagePerRound": 15, "proficiency": 2, "xp": 1100}
                },
                "sizes": {
                    "0": {"name": "Tiny", "hitDie": 4},
                    "2": {"name": "Medium", "hitDie": 8},
                    "3": {"name": "Large", "hitDie": 10}
                },
                "skills": {"perception": "wis", "stealth": "dex"}
            }"#,
        )
        .unwrap()
    }

    fn template(json: &str) -> Template {
        serde_json::from_str(json).unwrap()
    }

    const ABILITIES: &str = r#""str": 12, "con": 12, "dex": 12, "int": 8, "wis": 10, "cha": 8"#;

    #[test]
    fn test_seeded_stats_are_not_extrapolated() {
        let reference = reference();
        let template = template(&format!(
            r#"{{"lockedStats": {{"size": 0, "naturalArmor": 0, "hitDice": 3}},
                 "stats": {{"1": {{{ABILITIES}}}, "2": {{"str": 20}}}}}}"#
        ));
        let derived = StatblockResolver::new(&reference)
            .resolve(&template, ChallengeRating::Whole(2))
            .unwrap();

        // Locked zeros are values, not gaps.
        assert_eq!(derived.size, Some(0));
        assert_eq!(derived.natural_armor, Some(0));
        assert_eq!(derived.abilities.get(Ability::Str), 20);
        assert_eq!(derived.provenance(&StatPath::SIZE), Some(Provenance::Seeded));
        assert_eq!(
            derived.provenance(&StatPath::ability(Ability::Str)),
            Some(Provenance::Seeded)
        );
        assert_eq!(
            derived.provenance(&StatPath::ability(Ability::Con)),
            Some(Provenance::Extrapolated {
                lower: Some(ChallengeRating::Whole(1)),
                upper: None,
            })
        );
    }

    #[test]
    fn test_missing_ability_is_an_error() {
        let reference = reference();
        let template = template(
            r#"{"slug": "blob", "stats": {"1": {"str": 12, "con": 12, "dex": 12, "int": 8, "wis": 10}}}"#,
        );
        let result = StatblockResolver::new(&reference).resolve(&template, ChallengeRating::Whole(2));
        assert_eq!(
            result,
            Err(ScaleError::MissingBenchmark {
                template: "blob".to_string(),
                stat: StatPath::ability(Ability::Cha),
            })
        );
    }

    #[test]
    fn test_missing_hit_dice_is_an_error() {
        let reference = reference();
        let template = template(&format!(
            r#"{{"slug": "blob", "stats": {{"1": {{{ABILITIES}, "size": 2}}}}}}"#
        ));
        let result = StatblockResolver::new(&reference).resolve(&template, ChallengeRating::Whole(2));
        assert_eq!(
            result,
            Err(ScaleError::MissingBenchmark {
                template: "blob".to_string(),
                stat: StatPath::HIT_DICE,
            })
        );
    }

    #[test]
    fn test_unknown_target_cr() {
        let reference = reference();
        let template = template("{}");
        let result = StatblockResolver::new(&reference).resolve(&template, ChallengeRating::Whole(3));
        assert_eq!(
            result,
            Err(ScaleError::UnknownChallengeRating(ChallengeRating::Whole(3)))
        );
    }

    #[test]
    fn test_natural_armor_from_armor_class() {
        let reference = reference();
        // CR 1: AC 10 + 3 + mod(14) = 15, ratio 15 / 13.
        // CR 4: 15 / 13 * 14 = 16.15 -> 16. Dex stays 14 / 12 * 12 = 14,
        // so natural armor = 16 - 10 - 2 = 4.
        let template = template(
            r#"{"stats": {"1": {"str": 12, "con": 12, "dex": 14, "int": 8, "wis": 10, "cha": 8,
                                "size": 2, "hitDice": 4, "naturalArmor": 3}}}"#,
        );
        let derived = StatblockResolver::new(&reference)
            .resolve(&template, ChallengeRating::Whole(4))
            .unwrap();

        assert_eq!(derived.abilities.get(Ability::Dex), 14);
        assert_eq!(derived.natural_armor, Some(4));
        assert_eq!(
            derived.armor_class,
            ArmorClass {
                value: 16,
                natural: true
            }
        );
    }

    #[test]
    fn test_no_natural_armor_benchmark() {
        let reference = reference();
        let template = template(&format!(
            r#"{{"stats": {{"1": {{{ABILITIES}, "size": 2, "hitDice": 4}}}}}}"#
        ));
        let derived = StatblockResolver::new(&reference)
            .resolve(&template, ChallengeRating::Whole(2))
            .unwrap();

        assert_eq!(derived.natural_armor, None);
        assert_eq!(derived.armor_class.value, 11);
        assert!(!derived.armor_class.natural);
        assert_eq!(
            derived.provenance(&StatPath::NATURAL_ARMOR),
            Some(Provenance::Unresolved)
        );
    }

    #[test]
    fn test_hit_dice_from_hit_points() {
        let reference = reference();
        // CR 1 benchmark: d8, con 12 -> 5.5 per die * 4 = 22 hp; 22 / 24 * 60 = 55.
        // CR 4: size 3 (d10), con 12 / 12 * 14 = 14 -> 5.5 + 2 = 7.5 per die.
        // 55 / 7.5 = 7.33 -> 7 hit dice.
        let template = template(&format!(
            r#"{{"stats": {{"1": {{{ABILITIES}, "size": 2, "hitDice": 4}}}}}}"#
        ));
        let derived = StatblockResolver::new(&reference)
            .resolve(&template, ChallengeRating::Whole(4))
            .unwrap();

        assert_eq!(derived.size, Some(3));
        assert_eq!(derived.abilities.get(Ability::Con), 14);
        assert_eq!(derived.hit_dice, 7);
        assert_eq!(
            derived.hit_points,
            Some(HitPoints {
                average: 52,
                hit_dice: 7,
                hit_die: 10,
                constitution_bonus: 14,
            })
        );
    }

    #[test]
    fn test_attack_damage_dice() {
        let reference = reference();
        // CR 1: 1d8 + mod(12) = 4 + 1 = 5 per round; 5 / 6 * 15 = 12.5 -> 13.
        // CR 4: str 12 / 12 * 16 = 16 -> +3, so the dice average 10: exactly 4d4.
        let template = template(&format!(
            r#"{{"attacks": {{"bite": {{"name": "Bite", "reach": 5}}}},
                 "stats": {{"1": {{{ABILITIES}, "size": 2, "hitDice": 4,
                                   "attacks": {{"bite": {{"damageDice": 1, "damageDieSize": 8}}}}}}}}}}"#
        ));
        let derived = StatblockResolver::new(&reference)
            .resolve(&template, ChallengeRating::Whole(4))
            .unwrap();

        let bite = &derived.attacks["bite"];
        assert_eq!(bite.ability_modifier, 3);
        assert_eq!(bite.attack_bonus, 5);
        assert_eq!(bite.profile.damage_dice, Some(4));
        assert_eq!(bite.profile.damage_die_size, Some(4));
        assert_eq!(bite.average_damage, Some(13));
        assert_eq!(bite.profile.name.as_deref(), Some("Bite"));
    }

    #[test]
    fn test_finesse_attack_uses_better_modifier() {
        let reference = reference();
        // CR 1: 1d8 + max(mod(10), mod(16)) = 4 + 3 = 7; 7 / 6 * 15 = 17.5 -> 18.
        // CR 4: str 10 / 12 * 16 = 13 (+1), dex 16 / 12 * 12 = 16 (+3).
        // Dice average 18 - 3 = 15: 4d6 (14), since 6d4 is too many dice.
        let template = template(
            r#"{"attacks": {"rapier": {"name": "Rapier", "finesse": true}},
                "stats": {"1": {"str": 10, "con": 12, "dex": 16, "int": 8, "wis": 10, "cha": 8,
                                "size": 2, "hitDice": 4,
                                "attacks": {"rapier": {"damageDice": 1, "damageDieSize": 8}}}}}"#,
        );
        let derived = StatblockResolver::new(&reference)
            .resolve(&template, ChallengeRating::Whole(4))
            .unwrap();

        let rapier = &derived.attacks["rapier"];
        assert_eq!(derived.ability_modifiers.get(Ability::Str), 1);
        assert_eq!(rapier.ability_modifier, 3);
        assert_eq!(rapier.attack_bonus, 5);
        assert_eq!(rapier.profile.damage_dice, Some(4));
        assert_eq!(rapier.profile.damage_die_size, Some(6));
        assert_eq!(rapier.average_damage, Some(17));
        assert_eq!(
            derived.provenance(&StatPath::attack("rapier", AttackField::DamageDice)),
            Some(Provenance::Extrapolated {
                lower: Some(ChallengeRating::Whole(1)),
                upper: None,
            })
        );
    }

    #[test]
    fn test_finesse_attack_needs_dex_at_benchmark() {
        let reference = reference();
        // Dex is locked, so no sample carries it and the rapier has no benchmark.
        let template = template(
            r#"{"lockedStats": {"dex": 16},
                "attacks": {"rapier": {"finesse": true}},
                "stats": {"1": {"str": 10, "con": 12, "int": 8, "wis": 10, "cha": 8,
                                "size": 2, "hitDice": 4,
                                "attacks": {"rapier": {"damageDice": 1, "damageDieSize": 8}}}}}"#,
        );
        let derived = StatblockResolver::new(&reference)
            .resolve(&template, ChallengeRating::Whole(4))
            .unwrap();

        let rapier = &derived.attacks["rapier"];
        assert_eq!(rapier.ability_modifier, 3);
        assert_eq!(rapier.profile.damage_dice, None);
        assert_eq!(rapier.average_damage, None);
        assert_eq!(
            derived.provenance(&StatPath::attack("rapier", AttackField::DamageDice)),
            Some(Provenance::Unresolved)
        );
    }

    #[test]
    fn test_missing_average_is_reference_defect() {
        let reference = ReferenceData::from_json(
            r#"{
                "averages": {
                    "1": {"size": 2, "str": 12, "con": 12, "dex": 12, "int": 8, "wis": 10, "cha": 8,
                          "hp": 24, "proficiency": 2, "xp": 200},
                    "3": {"size": 3, "str": 15, "con": 14, "int": 8, "wis": 10, "cha": 8,
                          "hp": 40, "proficiency": 2, "xp": 700}
                },
                "sizes": {"2": {"name": "Medium", "hitDie": 8}, "3": {"name": "Large", "hitDie": 10}}
            }"#,
        )
        .unwrap();
        let template = template(
            r#"{"stats": {"1": {"str": 12, "con": 12, "dex": 14, "int": 8, "wis": 10, "cha": 8,
                                "size": 2, "hitDice": 4}}}"#,
        );
        let result = StatblockResolver::new(&reference).resolve(&template, ChallengeRating::Whole(3));
        assert_eq!(
            result,
            Err(ScaleError::ReferenceDefect {
                cr: ChallengeRating::Whole(3),
                measure: Measure::Ability(Ability::Dex),
            })
        );
    }

    #[test]
    fn test_attack_without_benchmark_keeps_no_dice() {
        let reference = reference();
        let template = template(&format!(
            r#"{{"attacks": {{"gore": {{"reach": 5}}}},
                 "stats": {{"1": {{{ABILITIES}, "size": 2, "hitDice": 4}}}}}}"#
        ));
        let derived = StatblockResolver::new(&reference)
            .resolve(&template, ChallengeRating::Whole(2))
            .unwrap();

        let gore = &derived.attacks["gore"];
        assert_eq!(gore.profile.damage_dice, None);
        assert_eq!(gore.average_damage, None);
        assert_eq!(
            derived.provenance(&StatPath::attack("gore", AttackField::DamageDice)),
            Some(Provenance::Unresolved)
        );
    }

    #[test]
    fn test_skills_and_passive_perception() {
        let reference = reference();
        let template = template(&format!(
            r#"{{"skills": ["perception", "stealth"],
                 "stats": {{"1": {{"str": 12, "con": 12, "dex": 15, "int": 8, "wis": 14, "cha": 8,
                                   "size": 2, "hitDice": 4}}}}}}"#
        ));
        let derived = StatblockResolver::new(&reference)
            .resolve(&template, ChallengeRating::Whole(1))
            .unwrap();

        assert_eq!(
            derived.skills,
            vec![
                SkillModifier {
                    skill: "perception".to_string(),
                    modifier: 4
                },
                SkillModifier {
                    skill: "stealth".to_string(),
                    modifier: 4
                },
            ]
        );
        assert_eq!(derived.passive_perception, 14);
    }

    #[test]
    fn test_unknown_skill() {
        let reference = reference();
        let template = template(&format!(
            r#"{{"skills": ["arcana"], "stats": {{"1": {{{ABILITIES}, "size": 2, "hitDice": 4}}}}}}"#
        ));
        let result = StatblockResolver::new(&reference).resolve(&template, ChallengeRating::Whole(1));
        assert_eq!(result, Err(ScaleError::UnknownSkill("arcana".to_string())));
    }
}
