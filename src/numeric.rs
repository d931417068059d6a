//! Numeric helpers shared by the extrapolator and resolver.
//!
//! Every rounded value in the crate goes through [`round_half_up`] so that
//! halves always round toward positive infinity, including negative halves.

/// Round to the nearest integer, with halves rounding toward +∞.
///
/// Differs from [`f64::round`] on negative halves: `-2.5` becomes `-2`.
///
/// # Examples
///
/// ```rust
/// use crscale::numeric::round_half_up;
///
/// assert_eq!(round_half_up(2.5), 3.0);
/// assert_eq!(round_half_up(-2.5), -2.0);
/// assert_eq!(round_half_up(4.49), 4.0);
/// ```
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// The modifier for an ability score: `floor((score - 10) / 2)`.
///
/// # Examples
///
/// ```rust
/// use crscale::numeric::ability_modifier;
///
/// assert_eq!(ability_modifier(10), 0);
/// assert_eq!(ability_modifier(11), 0);
/// assert_eq!(ability_modifier(9), -1);
/// assert_eq!(ability_modifier(8), -1);
/// ```
pub fn ability_modifier(score: i32) -> i32 {
    (score - 10).div_euclid(2)
}

/// The average of rolling `dice_count` dice of `die_size` sides, rounded down.
///
/// # Examples
///
/// ```rust
/// use crscale::numeric::average_roll;
///
/// assert_eq!(average_roll(2, 6), 7);
/// assert_eq!(average_roll(1, 8), 4);
/// ```
pub fn average_roll(dice_count: u32, die_size: u32) -> i32 {
    let per_die = (1.0 + f64::from(die_size)) / 2.0;
    (f64::from(dice_count) * per_die).floor() as i32
}
