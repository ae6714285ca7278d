//! Common start/stop/reset/step contract for simulated bodies.

use orrery_kepler::KeplerError;

/// A time-stepped simulation driven by its owning loop.
///
/// `step` only has an effect while the simulation is running. Steps run to
/// completion; there is no suspension point inside one.
pub trait Simulation {
    /// Switch from stopped to running. Running simulations are left as is.
    fn start(&mut self);

    /// Switch from running to stopped. Stopped simulations are left as is.
    fn stop(&mut self);

    /// Recompute the state at the configured epoch. Valid in either state.
    fn reset(&mut self) -> Result<(), KeplerError>;

    /// Advance by `dt` seconds of simulation time.
    fn step(&mut self, dt: f64) -> Result<(), KeplerError>;

    /// Returns `true` while running.
    fn is_running(&self) -> bool;
}
