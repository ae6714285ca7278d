//! Angle wrapping into arbitrary half-open intervals.

/// One full turn in radians.
pub const TAU: f64 = std::f64::consts::TAU;

/// Wrap `angle` into `[lower, upper)`.
///
/// Values already inside the interval are returned untouched. Values outside
/// are reduced in a single modulo step relative to the interval width, so an
/// angle thousands of turns away costs the same as one just past the edge.
///
/// The interval must satisfy `upper > lower`; other inputs are undefined and
/// trip a debug assertion.
pub fn wrap_angle(angle: f64, lower: f64, upper: f64) -> f64 {
    debug_assert!(upper > lower, "wrap_angle requires upper > lower");

    if angle >= lower && angle < upper {
        return angle;
    }

    let width = upper - lower;
    let wrapped = lower + (angle - lower).rem_euclid(width);

    // rem_euclid can round up to exactly `width` for tiny negative offsets.
    if wrapped >= upper { lower } else { wrapped }
}
