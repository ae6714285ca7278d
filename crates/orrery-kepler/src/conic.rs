//! Conic regimes and the static geometry derived from orbital elements.
//!
//! Orbits are parameterised by periapsis distance `q` rather than semi-major
//! axis, so that every derived quantity stays finite and continuous as the
//! eccentricity crosses 1.

use crate::KeplerError;
use crate::angle::TAU;

/// Conic section regime, selected once from the eccentricity.
///
/// Hot per-frame code matches on this instead of re-comparing the
/// eccentricity against 0 and 1 on every call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Conic {
    /// `e == 0`.
    Circular,
    /// `0 < e < 1`.
    Elliptic {
        /// Eccentricity.
        eccentricity: f64,
    },
    /// `e == 1`.
    Parabolic,
    /// `e > 1`.
    Hyperbolic {
        /// Eccentricity.
        eccentricity: f64,
    },
}

impl Conic {
    /// Classify an eccentricity. Negative or NaN eccentricities are rejected.
    pub fn from_eccentricity(eccentricity: f64) -> Result<Self, KeplerError> {
        if eccentricity.is_nan() || eccentricity < 0.0 {
            return Err(KeplerError::InvalidEccentricity(eccentricity));
        }

        Ok(if eccentricity == 0.0 {
            Conic::Circular
        } else if eccentricity < 1.0 {
            Conic::Elliptic { eccentricity }
        } else if eccentricity == 1.0 {
            Conic::Parabolic
        } else {
            Conic::Hyperbolic { eccentricity }
        })
    }

    /// The eccentricity this regime was built from.
    pub fn eccentricity(&self) -> f64 {
        match *self {
            Conic::Circular => 0.0,
            Conic::Elliptic { eccentricity } | Conic::Hyperbolic { eccentricity } => eccentricity,
            Conic::Parabolic => 1.0,
        }
    }

    /// Returns `true` for circles and ellipses.
    pub fn is_closed(&self) -> bool {
        matches!(self, Conic::Circular | Conic::Elliptic { .. })
    }

    /// Semi-latus rectum for a conic with periapsis distance `periapsis`.
    pub fn semi_latus_rectum(&self, periapsis: f64) -> f64 {
        match *self {
            Conic::Circular => periapsis,
            Conic::Elliptic { eccentricity: e } => periapsis * (1.0 - e * e) / (1.0 - e),
            Conic::Parabolic => 2.0 * periapsis,
            Conic::Hyperbolic { eccentricity: e } => periapsis * (e * e - 1.0) / (e - 1.0),
        }
    }

    /// Semi-major axis for a conic with periapsis distance `periapsis`.
    ///
    /// Infinite for parabolas and negative for hyperbolas.
    pub fn semi_major_axis(&self, periapsis: f64) -> f64 {
        match *self {
            Conic::Circular => periapsis,
            Conic::Elliptic { eccentricity: e } => periapsis / (1.0 - e),
            Conic::Parabolic => f64::INFINITY,
            Conic::Hyperbolic { eccentricity: e } => -periapsis / (e - 1.0),
        }
    }
}

/// Semi-latus rectum from periapsis distance and eccentricity.
pub fn semi_latus_rectum(periapsis: f64, eccentricity: f64) -> Result<f64, KeplerError> {
    Ok(Conic::from_eccentricity(eccentricity)?.semi_latus_rectum(periapsis))
}

/// Semi-major axis from periapsis distance and eccentricity.
pub fn semi_major_axis(periapsis: f64, eccentricity: f64) -> Result<f64, KeplerError> {
    Ok(Conic::from_eccentricity(eccentricity)?.semi_major_axis(periapsis))
}

/// Periapsis distance from a semi-major axis, the inverse of [`semi_major_axis`].
///
/// For a parabola the semi-major axis carries no size information; the
/// magnitude of `semi_major_axis` is taken as the periapsis distance.
pub fn periapsis_from_semi_major_axis(
    semi_major_axis: f64,
    eccentricity: f64,
) -> Result<f64, KeplerError> {
    Ok(match Conic::from_eccentricity(eccentricity)? {
        Conic::Circular => semi_major_axis,
        Conic::Elliptic { eccentricity: e } => semi_major_axis * (1.0 - e),
        Conic::Parabolic => semi_major_axis.abs(),
        Conic::Hyperbolic { eccentricity: e } => semi_major_axis.abs() * (e - 1.0),
    })
}

/// Angular sweep rate in rad/s for covering `[from, to]` once per `period`.
pub fn rate(period: f64, from: f64, to: f64) -> Result<f64, KeplerError> {
    if period == 0.0 {
        return Err(KeplerError::ZeroPeriod);
    }
    Ok(((from - to) / period).abs())
}

/// Orbital period from Kepler's third law, `2π·√(a³/μ)`.
pub fn period_from_gravitational_parameter(semi_major_axis: f64, mu: f64) -> f64 {
    TAU * (semi_major_axis.powi(3) / mu).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_regime_classification() {
        assert_eq!(Conic::from_eccentricity(0.0), Ok(Conic::Circular));
        assert_eq!(
            Conic::from_eccentricity(0.3),
            Ok(Conic::Elliptic { eccentricity: 0.3 })
        );
        assert_eq!(Conic::from_eccentricity(1.0), Ok(Conic::Parabolic));
        assert_eq!(
            Conic::from_eccentricity(2.5),
            Ok(Conic::Hyperbolic { eccentricity: 2.5 })
        );
        assert_eq!(
            Conic::from_eccentricity(-0.1),
            Err(KeplerError::InvalidEccentricity(-0.1))
        );
        assert!(Conic::from_eccentricity(f64::NAN).is_err());
    }

    #[test]
    fn test_semi_latus_rectum_per_regime() {
        assert_eq!(semi_latus_rectum(2.0, 0.0).unwrap(), 2.0);
        assert_eq!(semi_latus_rectum(2.0, 1.0).unwrap(), 4.0);
        assert!((semi_latus_rectum(2.0, 0.5).unwrap() - 3.0).abs() < 1e-12);
        assert!((semi_latus_rectum(2.0, 3.0).unwrap() - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_semi_latus_rectum_continuous_through_parabola() {
        let q = 1.5;
        let below = semi_latus_rectum(q, 1.0 - 1e-9).unwrap();
        let at = semi_latus_rectum(q, 1.0).unwrap();
        let above = semi_latus_rectum(q, 1.0 + 1e-9).unwrap();
        assert!((below - at).abs() < 1e-6);
        assert!((above - at).abs() < 1e-6);
    }

    #[test]
    fn test_semi_major_axis_roundtrip() {
        for &e in &[0.0, 0.2, 0.9, 1.5, 4.0] {
            let a = semi_major_axis(3.0, e).unwrap();
            let q = periapsis_from_semi_major_axis(a, e).unwrap();
            assert!((q - 3.0).abs() < 1e-12, "e={e}: q={q}");
        }
        assert_eq!(semi_major_axis(3.0, 1.0).unwrap(), f64::INFINITY);
        assert!(semi_major_axis(3.0, 2.0).unwrap() < 0.0);
    }

    #[test]
    fn test_rate() {
        let r = rate(10.0, -PI, PI).unwrap();
        assert!((r - TAU / 10.0).abs() < 1e-15);
        // Argument order does not matter.
        assert_eq!(rate(10.0, PI, -PI).unwrap(), r);
        // Negative periods still yield a positive rate.
        assert_eq!(rate(-10.0, -PI, PI).unwrap(), r);
    }

    #[test]
    fn test_zero_period_reports_error() {
        assert_eq!(rate(0.0, -PI, PI), Err(KeplerError::ZeroPeriod));
    }

    #[test]
    fn test_period_from_gravitational_parameter() {
        // a = 1, mu = 4π² gives a period of exactly one unit.
        let t = period_from_gravitational_parameter(1.0, 4.0 * PI * PI);
        assert!((t - 1.0).abs() < 1e-12);
    }
}
