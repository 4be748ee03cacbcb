//! Clamping and logit transforms shared by the scorers.
use crate::constants::{PROBABILITY_CEILING, PROBABILITY_FLOOR};

/// Force a probability into `[0.0001, 0.9999]` so ratios and logs stay finite.
pub fn clamp_probability(p: f64) -> f64 {
    p.clamp(PROBABILITY_FLOOR, PROBABILITY_CEILING)
}

/// Force a signed ratio into `[-0.9999, 0.9999]`.
pub fn clamp_ratio(ratio: f64) -> f64 {
    ratio.clamp(-PROBABILITY_CEILING, PROBABILITY_CEILING)
}

/// Clamp to the unit interval.
pub fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

/// Log-odds of a probability, after clamping.
pub fn logit(p: f64) -> f64 {
    let p = clamp_probability(p);
    (p / (1.0 - p)).ln()
}

/// Map a value in `[-1, 1]` onto `[0, 1]`.
pub fn rescale_signed_unit(x: f64) -> f64 {
    (x + 1.0) / 2.0
}
