//! Error types for orbit evaluation.

/// Errors reported by the Kepler solver and the conic helpers.
///
/// Every variant is a local, synchronous failure of a single call. None of
/// them is retried internally: the same inputs always produce the same error.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum KeplerError {
    /// Eccentricity was negative (or NaN).
    #[error("invalid eccentricity {0}: must be non-negative")]
    InvalidEccentricity(f64),

    /// A sweep rate was requested for a zero period.
    #[error("period is zero, rate is undefined")]
    ZeroPeriod,

    /// Newton iteration hit the iteration cap without meeting the tolerance.
    #[error(
        "no convergence after {iterations} iterations: e={eccentricity} M={mean_anomaly}"
    )]
    ConvergenceFailure {
        /// Eccentricity of the failing solve.
        eccentricity: f64,
        /// Mean anomaly of the failing solve, in radians.
        mean_anomaly: f64,
        /// Iterations performed before giving up.
        iterations: u32,
    },

    /// Anomaly limits do not describe a non-empty interval.
    #[error("invalid limits [{lower}, {upper}]: upper must exceed lower")]
    InvalidLimits {
        /// Lower limit.
        lower: f64,
        /// Upper limit.
        upper: f64,
    },
}
