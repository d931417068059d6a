//! Damage dice selection.
//!
//! Converts a target average damage into a dice expression. Among the
//! standard damage dice the closest average wins, except that solutions
//! needing five or more dice must also use clearly fewer dice than the
//! current best, which keeps creatures off piles of d4s.

use crate::numeric::{average_roll, round_half_up};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Candidate die sizes with their single-die averages, largest first.
const CANDIDATES: [(u32, f64); 5] = [(12, 6.5), (10, 5.5), (8, 4.5), (6, 3.5), (4, 2.5)];

/// Deviation a candidate must beat to be considered at all.
const MAX_DEVIATION: f64 = 7.0;

/// A candidate with at least this many dice must be close in count to the best.
const MANY_DICE: u32 = 5;

/// How many times the current best's dice count a many-dice candidate may use.
const MANY_DICE_RATIO: f64 = 1.5;

/// A dice expression such as `2d6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageDice {
    pub count: u32,
    pub die_size: u32,
}

impl DamageDice {
    /// The average roll, rounded down.
    pub fn average(self) -> i32 {
        average_roll(self.count, self.die_size)
    }
}

impl fmt::Display for DamageDice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.die_size)
    }
}

/// Choose dice whose average approximates `target`.
///
/// Always returns at least one die. Targets at or below zero (and
/// non-finite targets) resolve to a single die of the smallest size.
///
/// # Examples
///
/// ```rust
/// use crscale::dice::{find_damage_dice, DamageDice};
///
/// assert_eq!(find_damage_dice(6.5), DamageDice { count: 1, die_size: 12 });
/// assert_eq!(find_damage_dice(13.0), DamageDice { count: 2, die_size: 12 });
/// assert_eq!(find_damage_dice(0.0), DamageDice { count: 1, die_size: 4 });
/// ```
pub fn find_damage_dice(target: f64) -> DamageDice {
    let target = if target.is_finite() { target } else { 0.0 };
    let mut best: Option<DamageDice> = None;
    let mut smallest_deviation = MAX_DEVIATION;

    for (die_size, per_die) in CANDIDATES {
        let count = round_half_up(target / per_die).max(1.0) as u32;
        let deviation = (target - per_die * f64::from(count)).abs();
        let few_enough = count < MANY_DICE
            || best.map_or(true, |best| {
                f64::from(count) / f64::from(best.count) < MANY_DICE_RATIO
            });
        if deviation < smallest_deviation && few_enough {
            smallest_deviation = deviation;
            best = Some(DamageDice { count, die_size });
        }
    }

    // Targets far enough below zero leave every candidate outside MAX_DEVIATION.
    best.unwrap_or(DamageDice {
        count: 1,
        die_size: 4,
    })
}
