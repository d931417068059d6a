//! Error types for statblock scaling.
//!
//! All errors that can occur while loading reference data or deriving a
//! statblock are represented by the `ScaleError` enum.

use crate::challenge_rating::ChallengeRating;
use crate::path::StatPath;
use crate::reference::Measure;
use thiserror::Error;

/// Errors that can occur during statblock derivation.
///
/// Missing benchmarks for optional stats (natural armor, attack damage) are
/// not errors; those stats are simply left unset. Only stats every creature
/// must have surface a `MissingBenchmark`.
///
/// # Examples
///
/// ```rust
/// use crscale::ScaleError;
///
/// let err = ScaleError::UnknownTemplate("owlbear".to_string());
/// assert_eq!(err.to_string(), "Unknown template: owlbear");
/// ```
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScaleError {
    /// No template is registered under the requested identifier.
    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    /// The target CR has no row in the averages table.
    ///
    /// Callers are expected to validate CRs against the table; the resolver
    /// rejects them up front rather than extrapolating against nothing.
    #[error("Challenge rating {0} is not in the averages table")]
    UnknownChallengeRating(ChallengeRating),

    /// A CR label could not be parsed.
    #[error("Invalid challenge rating label: {0}")]
    InvalidChallengeRating(String),

    /// No sample on either side of the target CR carries the stat.
    ///
    /// Only raised for ability scores, size-dependent hit dice and hit dice
    /// themselves, where absence means the template is malformed.
    #[error("No benchmark for {stat} in template {template}")]
    MissingBenchmark { template: String, stat: StatPath },

    /// An averages-table value is missing, or zero where a ratio is taken
    /// against it or scaled onto it.
    #[error("Reference data defect at CR {cr}: average {measure} is zero or missing")]
    ReferenceDefect {
        cr: ChallengeRating,
        measure: Measure,
    },

    /// A size ordinal has no entry in the size table.
    #[error("Unknown size ordinal: {0}")]
    UnknownSize(u8),

    /// A skill has no entry in the skill-to-ability table.
    #[error("Unknown skill: {0}")]
    UnknownSkill(String),

    /// A trait identifier has no narrative text.
    #[error("Unknown trait: {0}")]
    UnknownTrait(String),

    /// A proc identifier has no narrative text.
    #[error("Unknown proc: {0}")]
    UnknownProc(String),

    /// A joined stat key (e.g. `attacks__bite__reach`) could not be parsed.
    #[error("Invalid stat path: {0}")]
    InvalidStatPath(String),

    /// A `{{token}}` placeholder matches no stat key and no `DC:` form.
    #[error("Unknown token: {0}")]
    UnknownToken(String),

    /// A `{{token}}` placeholder names a stat the derived statblock lacks.
    #[error("Token {0} has no value in the derived statblock")]
    UnresolvedToken(String),

    /// Narrative text has an unterminated or empty placeholder.
    #[error("Malformed text at byte {position}: {reason}")]
    MalformedText { position: usize, reason: String },

    /// Static data failed to deserialize.
    #[error("Failed to parse data: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for ScaleError {
    fn from(err: serde_json::Error) -> Self {
        ScaleError::Parse(err.to_string())
    }
}
