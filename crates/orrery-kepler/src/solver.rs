//! Newton–Raphson solution of Kepler's equation for every conic regime.
//!
//! | Regime     | Equation              | Seed                          |
//! |------------|-----------------------|-------------------------------|
//! | circular   | `E = M`               | none                          |
//! | elliptic   | `M = E − e·sin E`     | `E₀ = M`                      |
//! | parabolic  | `M = E + E³/3`        | `E₀ = M`                      |
//! | hyperbolic | `M = e·sinh E − E`    | `E₀ = ±ln(2|M|/e + 1.8)`      |
//!
//! Iteration stops once the residual of the regime's equation drops below the
//! tolerance, or fails with [`KeplerError::ConvergenceFailure`] at the cap.

use crate::{Conic, KeplerError};

/// Default residual tolerance, in radians of mean anomaly.
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Default iteration cap per solve.
pub const DEFAULT_MAX_ITERATIONS: u32 = 200;

/// Kepler equation solver with a tunable tolerance and iteration cap.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeplerSolver {
    /// Largest accepted `|residual|` of the regime equation.
    pub tolerance: f64,
    /// Maximum Newton steps before reporting a convergence failure.
    pub max_iterations: u32,
}

impl KeplerSolver {
    /// Creates a solver with the given tolerance and iteration cap.
    pub fn new(tolerance: f64, max_iterations: u32) -> Self {
        Self {
            tolerance,
            max_iterations,
        }
    }

    /// Eccentric anomaly (radians) for mean anomaly `mean_anomaly` (radians).
    ///
    /// For the parabolic regime the returned value is Barker's parameter
    /// `tan(v/2)`.
    pub fn eccentric_anomaly(&self, mean_anomaly: f64, conic: Conic) -> Result<f64, KeplerError> {
        let m = mean_anomaly;
        match conic {
            Conic::Circular => Ok(m),
            Conic::Elliptic { eccentricity: e } => self.newton(m, e, m, |ea| {
                (ea - e * ea.sin() - m, 1.0 - e * ea.cos())
            }),
            Conic::Parabolic => self.newton(m, 1.0, m, |ea| {
                (ea + ea.powi(3) / 3.0 - m, 1.0 + ea * ea)
            }),
            Conic::Hyperbolic { eccentricity: e } => {
                // `signum` maps 0 to 1; the root at M = 0 is exactly 0.
                let sign = if m == 0.0 { 0.0 } else { m.signum() };
                let seed = sign * (2.0 * m.abs() / e + 1.8).ln();
                self.newton(m, e, seed, |ea| {
                    (e * ea.sinh() - ea - m, e * ea.cosh() - 1.0)
                })
            }
        }
    }

    /// Runs Newton iteration from `seed`. `f` returns `(residual, derivative)`.
    fn newton(
        &self,
        mean_anomaly: f64,
        eccentricity: f64,
        seed: f64,
        f: impl Fn(f64) -> (f64, f64),
    ) -> Result<f64, KeplerError> {
        let mut e0 = seed;

        for _ in 0..self.max_iterations {
            let (residual, derivative) = f(e0);
            let ea = e0 - residual / derivative;
            if !ea.is_finite() {
                break;
            }

            if f(ea).0.abs() < self.tolerance {
                return Ok(ea);
            }
            e0 = ea;
        }

        Err(KeplerError::ConvergenceFailure {
            eccentricity,
            mean_anomaly,
            iterations: self.max_iterations,
        })
    }
}

impl Default for KeplerSolver {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE, DEFAULT_MAX_ITERATIONS)
    }
}

/// Eccentric anomaly with the default solver settings.
///
/// Negative eccentricities are rejected before any iteration is attempted.
pub fn eccentric_anomaly(mean_anomaly: f64, eccentricity: f64) -> Result<f64, KeplerError> {
    let conic = Conic::from_eccentricity(eccentricity)?;
    KeplerSolver::default().eccentric_anomaly(mean_anomaly, conic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    /// Mean anomaly for a given eccentric anomaly, Kepler's equation forwards.
    fn mean_from_eccentric(ea: f64, e: f64) -> f64 {
        if e == 0.0 {
            ea
        } else if e < 1.0 {
            ea - e * ea.sin()
        } else if e == 1.0 {
            ea + ea.powi(3) / 3.0
        } else {
            e * ea.sinh() - ea
        }
    }

    #[test]
    fn test_circular_is_identity() {
        for &m in &[-PI, -1.0, 0.0, 0.7, PI, 100.0] {
            assert_eq!(eccentric_anomaly(m, 0.0).unwrap(), m);
        }
    }

    #[test]
    fn test_zero_mean_anomaly_gives_zero() {
        for &e in &[0.0, 0.4, 0.99, 1.0] {
            let ea = eccentric_anomaly(0.0, e).unwrap();
            assert!(ea.abs() < 1e-12, "e={e}: E={ea}");
        }
        for &e in &[1.0 + 1e-9, 3.0] {
            assert_eq!(eccentric_anomaly(0.0, e).unwrap(), 0.0);
        }
    }

    #[test]
    fn test_roundtrip_elliptic() {
        for &e in &[0.01, 0.1, 0.4, 0.7, 0.9] {
            for i in -20..=20 {
                let ea = i as f64 * PI / 20.0;
                let m = mean_from_eccentric(ea, e);
                let solved = eccentric_anomaly(m, e).unwrap();
                assert!(
                    (solved - ea).abs() < 1e-7,
                    "e={e} E={ea} solved={solved}"
                );
            }
        }
    }

    #[test]
    fn test_roundtrip_parabolic() {
        for i in -20..=20 {
            let ea = i as f64 * 0.25;
            let m = mean_from_eccentric(ea, 1.0);
            let solved = eccentric_anomaly(m, 1.0).unwrap();
            assert!((solved - ea).abs() < 1e-8, "E={ea} solved={solved}");
        }
    }

    #[test]
    fn test_roundtrip_hyperbolic() {
        for &e in &[1.05, 1.5, 2.0, 5.0, 20.0] {
            for i in -12..=12 {
                let ea = i as f64 * 0.4;
                let m = mean_from_eccentric(ea, e);
                let solved = eccentric_anomaly(m, e).unwrap();
                assert!(
                    (solved - ea).abs() < 1e-7,
                    "e={e} E={ea} solved={solved}"
                );
            }
        }
    }

    #[test]
    fn test_negative_eccentricity_rejected() {
        assert_eq!(
            eccentric_anomaly(1.0, -0.5),
            Err(KeplerError::InvalidEccentricity(-0.5))
        );
    }

    #[test]
    fn test_residual_within_tolerance() {
        let solver = KeplerSolver::new(1e-12, 200);
        let e = 0.8;
        let m = 2.3;
        let ea = solver
            .eccentric_anomaly(m, Conic::Elliptic { eccentricity: e })
            .unwrap();
        assert!((ea - e * ea.sin() - m).abs() < 1e-12);
    }

    #[test]
    fn test_near_parabolic_never_silently_wrong() {
        let e = 0.999999;
        let conic = Conic::Elliptic { eccentricity: e };
        let solver = KeplerSolver::default();
        for &m in &[1e-9, 1e-6, 1e-4, 0.01, -0.003, 0.5, PI - 1e-6] {
            match solver.eccentric_anomaly(m, conic) {
                Ok(ea) => {
                    let residual = ea - e * ea.sin() - m;
                    assert!(
                        residual.abs() < solver.tolerance,
                        "M={m}: E={ea} residual={residual}"
                    );
                }
                Err(err) => assert!(matches!(
                    err,
                    KeplerError::ConvergenceFailure { eccentricity, mean_anomaly, .. }
                        if eccentricity == e && mean_anomaly == m
                )),
            }
        }
    }

    #[test]
    fn test_iteration_cap_reports_failure() {
        let solver = KeplerSolver::new(0.0, 3);
        let result = solver.eccentric_anomaly(2.0, Conic::Elliptic { eccentricity: 0.9 });
        assert_eq!(
            result,
            Err(KeplerError::ConvergenceFailure {
                eccentricity: 0.9,
                mean_anomaly: 2.0,
                iterations: 3,
            })
        );
    }
}
