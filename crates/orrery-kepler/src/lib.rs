//! Two-body Keplerian orbit evaluation for the Orrery engine.
//!
//! Pure, allocation-free functions that map classical orbital elements and a
//! mean anomaly to eccentric anomaly, true anomaly, radius, and plane-local
//! position/velocity for circular, elliptical, parabolic, and hyperbolic
//! conics. The orbital plane is the x–z plane with +y as the angular
//! momentum axis.

mod angle;
mod anomaly;
mod conic;
mod error;
mod orientation;
mod solver;

pub use angle::{TAU, wrap_angle};
pub use anomaly::{position, radius, true_anomaly, velocity};
pub use conic::{
    Conic, period_from_gravitational_parameter, periapsis_from_semi_major_axis, rate,
    semi_latus_rectum, semi_major_axis,
};
pub use error::KeplerError;
pub use orientation::{axis_orientation, orbital_orientation, spin};
pub use solver::{DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE, KeplerSolver, eccentric_anomaly};
