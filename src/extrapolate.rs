//! Value extrapolator.
//!
//! Projects a benchmark value at one CR onto the target CR by comparing it
//! with the averages table, either as a ratio to the average or as an
//! offset from it. With benchmarks on both sides, both projections are
//! blended by CR step distance so the nearer benchmark dominates.

use crate::challenge_rating::ChallengeRating;
use crate::error::ScaleError;
use crate::numeric::round_half_up;
use crate::reference::{Measure, ReferenceData};
use tracing::debug;

/// How a benchmark value is carried to another CR.
///
/// # Examples
///
/// ```rust
/// use crscale::extrapolate::ScalingMode;
///
/// // A creature one size above average stays one size above average.
/// let offset = ScalingMode::Offset;
/// // A creature with 20% more hit points than average keeps that margin.
/// let ratio = ScalingMode::Ratio;
/// assert_ne!(offset, ratio);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalingMode {
    /// `value - average[cr] + average[target]`.
    Offset,
    /// `value / average[cr] * average[target]`.
    Ratio,
}

impl ScalingMode {
    fn project(
        self,
        reference: &ReferenceData,
        measure: Measure,
        anchor: Anchor,
        target_average: f64,
    ) -> Result<f64, ScaleError> {
        let anchor_average = reference.average(anchor.cr, measure)?;
        match self {
            ScalingMode::Offset => Ok(anchor.value - anchor_average + target_average),
            ScalingMode::Ratio => {
                if anchor_average == 0.0 || !anchor_average.is_finite() {
                    return Err(ScaleError::ReferenceDefect {
                        cr: anchor.cr,
                        measure,
                    });
                }
                Ok(anchor.value / anchor_average * target_average)
            }
        }
    }
}

/// A known value of a measure at a CR.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub cr: ChallengeRating,
    pub value: f64,
}

/// Known values below (or at) and above a target CR.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Anchors {
    pub lower: Option<Anchor>,
    pub upper: Option<Anchor>,
}

/// Extrapolate `measure` to `target` from the given anchors.
///
/// Returns `Ok(None)` when there are no anchors. A single anchor is
/// projected directly; two anchors are projected independently and blended
/// with weights `(targetStep - lowerStep) / range` for the upper value and
/// `(upperStep - targetStep) / range` for the lower value. The result is
/// rounded half up.
///
/// # Errors
///
/// - [`ScaleError::UnknownChallengeRating`] if the target or an anchor CR
///   has no averages row.
/// - [`ScaleError::ReferenceDefect`] if the target or an anchor row lacks
///   the measure, or if ratio mode would divide by or scale onto a zero
///   average.
///
/// # Examples
///
/// ```rust
/// use crscale::{ChallengeRating, ReferenceData};
/// use crscale::extrapolate::{extrapolate, Anchor, Anchors, ScalingMode};
/// use crscale::reference::Measure;
///
/// let reference = ReferenceData::from_json(r#"{
///     "averages": {"1": {"hp": 80}, "3": {"hp": 110}}
/// }"#).unwrap();
///
/// let anchors = Anchors {
///     lower: Some(Anchor { cr: ChallengeRating::Whole(1), value: 40.0 }),
///     upper: None,
/// };
/// let hp = extrapolate(&reference, Measure::HitPoints, ScalingMode::Ratio,
///                      ChallengeRating::Whole(3), &anchors).unwrap();
/// assert_eq!(hp, Some(55)); // half the average at CR 1, half the average at CR 3
/// ```
pub fn extrapolate(
    reference: &ReferenceData,
    measure: Measure,
    mode: ScalingMode,
    target: ChallengeRating,
    anchors: &Anchors,
) -> Result<Option<i64>, ScaleError> {
    reference.averages_at(target)?;
    if anchors.lower.is_none() && anchors.upper.is_none() {
        return Ok(None);
    }
    let target_average = reference.average(target, measure)?;
    if mode == ScalingMode::Ratio && target_average == 0.0 {
        return Err(ScaleError::ReferenceDefect { cr: target, measure });
    }
    let project = |anchor: Option<Anchor>| -> Result<Option<f64>, ScaleError> {
        anchor
            .map(|anchor| mode.project(reference, measure, anchor, target_average))
            .transpose()
    };
    let lower_value = project(anchors.lower)?;
    let upper_value = project(anchors.upper)?;

    let blended = match (anchors.lower.zip(lower_value), anchors.upper.zip(upper_value)) {
        (Some((lower, lower_value)), Some((upper, upper_value))) => {
            let lower_step = f64::from(lower.cr.step());
            let upper_step = f64::from(upper.cr.step());
            let target_step = f64::from(target.step());
            let range = upper_step - lower_step;
            if range <= 0.0 {
                lower_value
            } else {
                let upper_weight = (target_step - lower_step) / range;
                let lower_weight = (upper_step - target_step) / range;
                upper_weight * upper_value + lower_weight * lower_value
            }
        }
        (Some((_, value)), None) | (None, Some((_, value))) => value,
        (None, None) => return Ok(None),
    };

    let rounded = round_half_up(blended) as i64;
    debug!(%measure, %target, ?mode, lower = ?lower_value, upper = ?upper_value, rounded, "extrapolated");
    Ok(Some(rounded))
}
