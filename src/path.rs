//! Typed stat paths and statblock flattening.
//!
//! A `StatPath` names one numeric leaf of a statblock: either a top-level
//! stat or a field of one attack. Flattening a statblock yields every
//! present leaf keyed by its path, which is what the benchmark locator
//! probes. Paths render in the joined form used by data and narrative text,
//! e.g. `attacks__bite__damageDice`.

use crate::error::ScaleError;
use crate::statblock::{Ability, AttackProfile, Statblock};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

const SEPARATOR: &str = "__";
const ATTACKS: &str = "attacks";

/// A top-level numeric stat.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum StatKey {
    Size,
    Ability(Ability),
    NaturalArmor,
    HitDice,
    Speed,
}

impl StatKey {
    fn as_str(self) -> &'static str {
        match self {
            StatKey::Size => "size",
            StatKey::Ability(ability) => ability.as_str(),
            StatKey::NaturalArmor => "naturalArmor",
            StatKey::HitDice => "hitDice",
            StatKey::Speed => "speed",
        }
    }
}

impl FromStr for StatKey {
    type Err = ScaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "size" => Ok(StatKey::Size),
            "naturalArmor" => Ok(StatKey::NaturalArmor),
            "hitDice" => Ok(StatKey::HitDice),
            "speed" => Ok(StatKey::Speed),
            other => other
                .parse::<Ability>()
                .map(StatKey::Ability)
                .map_err(|_| ScaleError::InvalidStatPath(s.to_string())),
        }
    }
}

/// A numeric field of an attack.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum AttackField {
    DamageDice,
    DamageDieSize,
    Reach,
    Finesse,
    Ranged,
}

impl AttackField {
    const ALL: [AttackField; 5] = [
        AttackField::DamageDice,
        AttackField::DamageDieSize,
        AttackField::Reach,
        AttackField::Finesse,
        AttackField::Ranged,
    ];

    fn as_str(self) -> &'static str {
        match self {
            AttackField::DamageDice => "damageDice",
            AttackField::DamageDieSize => "damageDieSize",
            AttackField::Reach => "reach",
            AttackField::Finesse => "finesse",
            AttackField::Ranged => "ranged",
        }
    }
}

/// Path to one numeric leaf of a statblock.
///
/// # Examples
///
/// ```rust
/// use crscale::path::{AttackField, StatPath};
///
/// let path = StatPath::attack("bite", AttackField::DamageDice);
/// assert_eq!(path.to_string(), "attacks__bite__damageDice");
/// assert_eq!("attacks__bite__damageDice".parse::<StatPath>().unwrap(), path);
/// assert_eq!("hitDice".parse::<StatPath>().unwrap(), StatPath::HIT_DICE);
/// ```
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum StatPath {
    /// A top-level stat.
    Stat(StatKey),
    /// One field of a named attack.
    Attack { attack: String, field: AttackField },
}

impl StatPath {
    pub const SIZE: StatPath = StatPath::Stat(StatKey::Size);
    pub const NATURAL_ARMOR: StatPath = StatPath::Stat(StatKey::NaturalArmor);
    pub const HIT_DICE: StatPath = StatPath::Stat(StatKey::HitDice);
    pub const SPEED: StatPath = StatPath::Stat(StatKey::Speed);

    /// Path to an ability score.
    pub fn ability(ability: Ability) -> Self {
        StatPath::Stat(StatKey::Ability(ability))
    }

    /// Path to a field of an attack.
    pub fn attack(attack: impl Into<String>, field: AttackField) -> Self {
        StatPath::Attack {
            attack: attack.into(),
            field,
        }
    }
}

impl fmt::Display for StatPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatPath::Stat(key) => f.write_str(key.as_str()),
            StatPath::Attack { attack, field } => write!(
                f,
                "{ATTACKS}{SEPARATOR}{attack}{SEPARATOR}{}",
                field.as_str()
            ),
        }
    }
}

impl FromStr for StatPath {
    type Err = ScaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ScaleError::InvalidStatPath(s.to_string());
        match s.strip_prefix(ATTACKS).and_then(|rest| rest.strip_prefix(SEPARATOR)) {
            Some(rest) => {
                let (attack, field) = rest.rsplit_once(SEPARATOR).ok_or_else(invalid)?;
                let field = AttackField::ALL
                    .into_iter()
                    .find(|candidate| candidate.as_str() == field)
                    .ok_or_else(invalid)?;
                if attack.is_empty() {
                    return Err(invalid());
                }
                Ok(StatPath::attack(attack, field))
            }
            None => s.parse::<StatKey>().map(StatPath::Stat),
        }
    }
}

impl Serialize for StatPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for StatPath {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl AttackProfile {
    /// Read one numeric field, if present.
    pub fn field(&self, field: AttackField) -> Option<f64> {
        match field {
            AttackField::DamageDice => self.damage_dice.map(f64::from),
            AttackField::DamageDieSize => self.damage_die_size.map(f64::from),
            AttackField::Reach => self.reach.map(f64::from),
            AttackField::Finesse => self.finesse.map(flag),
            AttackField::Ranged => self.ranged.map(flag),
        }
    }
}

/// Every present numeric leaf of a statblock, keyed by path.
///
/// Booleans flatten to `1.0`/`0.0`; an explicit `false` is still present.
pub type FlatStatblock = BTreeMap<StatPath, f64>;

impl Statblock {
    /// Read one numeric leaf, if present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use crscale::{Ability, Statblock};
    /// use crscale::path::StatPath;
    ///
    /// let block: Statblock = serde_json::from_str(r#"{"dex": 14, "naturalArmor": 0}"#).unwrap();
    /// assert_eq!(block.lookup(&StatPath::ability(Ability::Dex)), Some(14.0));
    /// assert_eq!(block.lookup(&StatPath::NATURAL_ARMOR), Some(0.0));
    /// assert_eq!(block.lookup(&StatPath::HIT_DICE), None);
    /// ```
    pub fn lookup(&self, path: &StatPath) -> Option<f64> {
        match path {
            StatPath::Stat(StatKey::Size) => self.size.map(f64::from),
            StatPath::Stat(StatKey::Ability(ability)) => {
                self.abilities.get(*ability).map(f64::from)
            }
            StatPath::Stat(StatKey::NaturalArmor) => self.natural_armor.map(f64::from),
            StatPath::Stat(StatKey::HitDice) => self.hit_dice.map(f64::from),
            StatPath::Stat(StatKey::Speed) => self.speed.map(f64::from),
            StatPath::Attack { attack, field } => self.attacks.get(attack)?.field(*field),
        }
    }

    /// Flatten into every present numeric leaf.
    ///
    /// An empty statblock flattens to an empty map.
    pub fn flatten(&self) -> FlatStatblock {
        let mut paths = vec![
            StatPath::SIZE,
            StatPath::NATURAL_ARMOR,
            StatPath::HIT_DICE,
            StatPath::SPEED,
        ];
        paths.extend(Ability::ALL.into_iter().map(StatPath::ability));
        for attack in self.attacks.keys() {
            paths.extend(
                AttackField::ALL
                    .into_iter()
                    .map(|field| StatPath::attack(attack.clone(), field)),
            );
        }

        paths
            .into_iter()
            .filter_map(|path| self.lookup(&path).map(|value| (path, value)))
            .collect()
    }
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}
