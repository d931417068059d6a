//! # crscale - Deterministic Challenge-Rating Statblock Scaler
//!
//! Derives a complete creature statblock at any challenge rating (CR) from a
//! template that only carries a few hand-authored samples:
//! - **Deterministic** resolution (same template, CR and reference data → same statblock)
//! - **Sparse-input** design (a template may define stats at any subset of CRs)
//! - **Benchmark-based** extrapolation against a table of per-CR averages
//! - **Traceable** results (every derived stat records where it came from)
//!
//! ## Core Concepts
//!
//! ### Scaling Pipeline
//!
//! ```text
//! [Template samples] → [Benchmarks] → [Extrapolation] → [DerivedStatblock]
//! ```
//!
//! 1. **Seed**: locked stats overlaid by the sample at the target CR
//! 2. **Benchmarks**: the nearest samples around the target carrying the needed stats
//! 3. **Extrapolation**: each benchmark is carried to the target as a ratio to,
//!    or an offset from, the reference average, and the two sides are blended
//! 4. **Derivation**: natural armor, hit dice and damage dice are worked back
//!    from extrapolated armor class, hit points and damage per round
//!
//! ### Challenge Ratings
//!
//! CRs are `0`, `1/8`, `1/4`, `1/2` and the integers from `1` up. Distances
//! between CRs are measured in steps, so the fractional CRs are one step
//! apart just like `1` and `2`.
//!
//! ## Example
//!
//! ```rust
//! use crscale::*;
//!
//! let reference = ReferenceData::from_json(r#"{
//!     "averages": {
//!         "1": {"size": 2, "str": 12, "con": 12, "dex": 12, "int": 6, "wis": 10, "cha": 6,
//!               "hp": 20, "proficiency": 2, "xp": 200},
//!         "5": {"size": 3, "str": 18, "con": 16, "dex": 14, "int": 8, "wis": 12, "cha": 8,
//!               "hp": 100, "proficiency": 3, "xp": 1800}
//!     },
//!     "sizes": {"2": {"name": "Medium", "hitDie": 8}, "3": {"name": "Large", "hitDie": 10}}
//! }"#).unwrap();
//!
//! let templates = TemplateRegistry::from_json(r#"{
//!     "ogre": {
//!         "type": "giant",
//!         "stats": {"1": {"name": "Ogre Whelp", "str": 16, "con": 14, "dex": 10,
//!                         "int": 6, "wis": 8, "cha": 6, "size": 2, "hitDice": 4}}
//!     }
//! }"#).unwrap();
//!
//! let resolver = StatblockResolver::new(&reference);
//! let ogre = resolver.resolve_by_id(&templates, "ogre", "5".parse().unwrap()).unwrap();
//!
//! assert_eq!(ogre.abilities.get(Ability::Str), 24); // 16 / 12 * 18
//! assert_eq!(ogre.size, Some(3));
//! assert_eq!(ogre.proficiency, 3);
//! assert_eq!(ogre.name.as_deref(), Some("Ogre Whelp"));
//! ```
//!
//! ## Modules
//!
//! - [`challenge_rating`] - CR type and step mapping
//! - [`statblock`] - Ability scores, attacks and sparse statblocks
//! - [`path`] - Stat paths and statblock flattening
//! - [`reference`] - Per-CR averages and lookup tables
//! - [`template`] - Creature templates and the template registry
//! - [`benchmark`] - Benchmark locator
//! - [`extrapolate`] - Value extrapolator
//! - [`dice`] - Damage dice selection
//! - [`resolver`] - Main statblock resolver
//! - [`derived`] - Derived statblock results
//! - [`text`] - Narrative token substitution
//! - [`numeric`] - Rounding and dice arithmetic
//! - [`error`] - Error types

pub mod benchmark;
pub mod challenge_rating;
pub mod derived;
pub mod dice;
pub mod error;
pub mod extrapolate;
pub mod numeric;
pub mod path;
pub mod reference;
pub mod resolver;
pub mod statblock;
pub mod template;
pub mod text;

// Re-export main types for convenience
pub use challenge_rating::ChallengeRating;
pub use derived::{DerivedStatblock, Provenance};
pub use error::ScaleError;
pub use reference::ReferenceData;
pub use resolver::StatblockResolver;
pub use statblock::{Ability, AbilityScores, AttackProfile, Statblock};
pub use template::{Template, TemplateRegistry};

// Re-export stat paths
pub use path::{AttackField, StatPath};
