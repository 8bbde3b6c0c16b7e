//! Numeric helpers shared by the estimators, plus casting and image conversion.

pub mod image_conversion;
pub mod safe_cast;

/// Clamp `n` into `[smallest, largest]`
///
/// A NaN input resolves to `largest`.
#[must_use]
pub fn clamp(n: f64, smallest: f64, largest: f64) -> f64 {
    smallest.max(n.min(largest))
}

/// Position of `value` between `a` and `b`, clamped to `[0, 1]`
///
/// Returns 0.0 when `a == b`.
#[must_use]
#[allow(clippy::float_cmp)] // Exact coincidence is the degenerate case
pub fn inverse_lerp(a: f64, b: f64, value: f64) -> f64 {
    if a == b {
        return 0.0;
    }
    clamp((value - a) / (b - a), 0.0, 1.0)
}
