//! Challenge rating module.
//!
//! Provides the `ChallengeRating` type and its linear "step" ordinal. The
//! sub-1 fractional ratings each count as a full step, so going from 1/8 to
//! 1/4 weighs as much in a blend as going from 1 to 2.

use crate::error::ScaleError;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A creature difficulty tier.
///
/// Ordering is numeric: `Zero < Eighth < Quarter < Half < Whole(1) < Whole(2)`.
/// `Whole` is meant to hold a value of at least 1. Build ratings from raw
/// data with [`ChallengeRating::from_value`] or parsing, which enforce that;
/// a hand-built `Whole(0)` shares the step of `Half`.
///
/// # Examples
///
/// ```rust
/// use crscale::ChallengeRating;
///
/// let cr: ChallengeRating = "1/4".parse().unwrap();
/// assert_eq!(cr, ChallengeRating::Quarter);
/// assert_eq!(cr.to_string(), "1/4");
///
/// let cr: ChallengeRating = "0.5".parse().unwrap();
/// assert_eq!(cr, ChallengeRating::Half);
///
/// assert!(ChallengeRating::Half < ChallengeRating::Whole(1));
/// ```
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum ChallengeRating {
    /// CR 0.
    Zero,
    /// CR 1/8.
    Eighth,
    /// CR 1/4.
    Quarter,
    /// CR 1/2.
    Half,
    /// An integer CR of 1 or more.
    Whole(u32),
}

impl ChallengeRating {
    /// Get the linear step for this rating.
    ///
    /// `0→0, 1/8→1, 1/4→2, 1/2→3`, and integer `N→N+3`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use crscale::ChallengeRating;
    ///
    /// assert_eq!(ChallengeRating::Zero.step(), 0);
    /// assert_eq!(ChallengeRating::Half.step(), 3);
    /// assert_eq!(ChallengeRating::Whole(5).step(), 8);
    /// ```
    pub fn step(self) -> u32 {
        match self {
            ChallengeRating::Zero => 0,
            ChallengeRating::Eighth => 1,
            ChallengeRating::Quarter => 2,
            ChallengeRating::Half => 3,
            ChallengeRating::Whole(n) => n.saturating_add(3),
        }
    }

    /// Get the numeric value of this rating (`1/8` is `0.125`).
    pub fn value(self) -> f64 {
        match self {
            ChallengeRating::Zero => 0.0,
            ChallengeRating::Eighth => 0.125,
            ChallengeRating::Quarter => 0.25,
            ChallengeRating::Half => 0.5,
            ChallengeRating::Whole(n) => f64::from(n),
        }
    }

    /// Build a rating from its numeric value.
    ///
    /// Accepts `0`, `0.125`, `0.25`, `0.5` and positive integers. Anything
    /// else is rejected rather than given an off-grid step.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use crscale::ChallengeRating;
    ///
    /// assert_eq!(ChallengeRating::from_value(0.125).unwrap(), ChallengeRating::Eighth);
    /// assert_eq!(ChallengeRating::from_value(12.0).unwrap(), ChallengeRating::Whole(12));
    /// assert!(ChallengeRating::from_value(0.3).is_err());
    /// ```
    pub fn from_value(value: f64) -> Result<Self, ScaleError> {
        if value == 0.0 {
            Ok(ChallengeRating::Zero)
        } else if value == 0.125 {
            Ok(ChallengeRating::Eighth)
        } else if value == 0.25 {
            Ok(ChallengeRating::Quarter)
        } else if value == 0.5 {
            Ok(ChallengeRating::Half)
        } else if value >= 1.0 && value.fract() == 0.0 && value <= f64::from(u32::MAX - 3) {
            Ok(ChallengeRating::Whole(value as u32))
        } else {
            Err(ScaleError::InvalidChallengeRating(value.to_string()))
        }
    }
}

impl FromStr for ChallengeRating {
    type Err = ScaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1/8" => Ok(ChallengeRating::Eighth),
            "1/4" => Ok(ChallengeRating::Quarter),
            "1/2" => Ok(ChallengeRating::Half),
            other => other
                .parse::<f64>()
                .map_err(|_| ScaleError::InvalidChallengeRating(s.to_string()))
                .and_then(ChallengeRating::from_value),
        }
    }
}

impl fmt::Display for ChallengeRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChallengeRating::Zero => write!(f, "0"),
            ChallengeRating::Eighth => write!(f, "1/8"),
            ChallengeRating::Quarter => write!(f, "1/4"),
            ChallengeRating::Half => write!(f, "1/2"),
            ChallengeRating::Whole(n) => write!(f, "{}", n),
        }
    }
}

impl Serialize for ChallengeRating {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

struct ChallengeRatingVisitor;

impl<'de> Visitor<'de> for ChallengeRatingVisitor {
    type Value = ChallengeRating;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a challenge rating such as 0, \"1/8\", 0.25 or 3")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        ChallengeRating::from_value(v as f64).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        ChallengeRating::from_value(v as f64).map_err(E::custom)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        ChallengeRating::from_value(v).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for ChallengeRating {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ChallengeRatingVisitor)
    }
}
