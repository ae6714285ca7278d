//! Eccentric anomaly to true anomaly, radius, and plane-local state vectors.
//!
//! Plane-local vectors live in the x–z plane: periapsis lies on +x and the
//! body moves from +x towards +z as the anomaly increases.

use glam::DVec3;

use crate::Conic;

/// True anomaly (radians) from the eccentric anomaly of the given regime.
pub fn true_anomaly(eccentric_anomaly: f64, conic: Conic) -> f64 {
    let ea = eccentric_anomaly;
    match conic {
        Conic::Circular => ea,
        Conic::Elliptic { eccentricity: e } => {
            2.0 * ((1.0 + e).sqrt() * (ea / 2.0).sin()).atan2((1.0 - e).sqrt() * (ea / 2.0).cos())
        }
        Conic::Parabolic => 2.0 * ea.atan(),
        Conic::Hyperbolic { eccentricity: e } => {
            2.0 * ((e + 1.0).sqrt() * (ea / 2.0).sinh())
                .atan2((e - 1.0).sqrt() * (ea / 2.0).cosh())
        }
    }
}

/// Focal distance at true anomaly `true_anomaly` for semi-latus rectum `semi_latus_rectum`.
pub fn radius(semi_latus_rectum: f64, eccentricity: f64, true_anomaly: f64) -> f64 {
    semi_latus_rectum / (1.0 + eccentricity * true_anomaly.cos())
}

/// Plane-local position at focal distance `radius` and true anomaly `true_anomaly`.
pub fn position(radius: f64, true_anomaly: f64) -> DVec3 {
    DVec3::new(
        radius * true_anomaly.cos(),
        0.0,
        radius * true_anomaly.sin(),
    )
}

/// Plane-local velocity when the mean anomaly advances at `rate` rad/s.
///
/// Each regime uses the time derivative of its own parameterisation of the
/// position, evaluated at eccentric anomaly `eccentric_anomaly` (Barker's
/// parameter for parabolas) and true anomaly `true_anomaly`.
pub fn velocity(
    conic: Conic,
    periapsis: f64,
    radius: f64,
    rate: f64,
    eccentric_anomaly: f64,
    true_anomaly: f64,
) -> DVec3 {
    let ea = eccentric_anomaly;
    match conic {
        Conic::Circular => DVec3::new(-ea.sin(), 0.0, ea.cos()) * (periapsis * rate),
        Conic::Elliptic { eccentricity: e } => {
            let a = conic.semi_major_axis(periapsis);
            DVec3::new(-ea.sin(), 0.0, (1.0 - e * e).sqrt() * ea.cos()) * (a * a * rate / radius)
        }
        Conic::Parabolic => {
            let direction =
                DVec3::new(-true_anomaly.sin() / (true_anomaly.cos() + 1.0), 0.0, 1.0).normalize();
            direction * (4.0 * rate * rate * periapsis.powi(3) / radius).sqrt() * rate.signum()
        }
        Conic::Hyperbolic { eccentricity: e } => {
            let a = conic.semi_major_axis(periapsis).abs();
            DVec3::new(-ea.sinh(), 0.0, (e * e - 1.0).sqrt() * ea.cosh()) * (a * a * rate / radius)
        }
    }
}
