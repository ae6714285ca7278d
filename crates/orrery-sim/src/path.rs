//! Polyline sampling of an orbit for drawing.

use glam::DVec3;
use orrery_kepler::KeplerError;

use crate::orbit::OrbitState;

/// Fewest segments a path is sampled with.
pub const MIN_SEGMENTS: usize = 3;
/// Most segments a path is sampled with.
pub const MAX_SEGMENTS: usize = 200;

/// Samples `segments + 1` parent-frame points spaced evenly in mean anomaly
/// from the lower limit to the upper limit, both included.
///
/// `segments` is clamped to `[MIN_SEGMENTS, MAX_SEGMENTS]`.
pub fn sample_path(orbit: &OrbitState, segments: usize) -> Result<Vec<DVec3>, KeplerError> {
    let segments = segments.clamp(MIN_SEGMENTS, MAX_SEGMENTS);
    let [low, high] = orbit.elements().limits;
    let lower = low.to_radians();
    let step = (high - low).to_radians() / segments as f64;

    (0..=segments)
        .map(|i| orbit.position_at(lower + step * i as f64))
        .collect()
}

/// Parent-frame position of the periapsis.
pub fn periapsis_point(orbit: &OrbitState) -> DVec3 {
    orbit.orientation() * DVec3::new(orbit.elements().periapsis, 0.0, 0.0)
}
