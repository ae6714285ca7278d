//! Secular perturbations layered on top of a closed [`OrbitState`].
//!
//! Each step shrinks (or grows) the semi-major axis and precesses the argument
//! of periapsis before the orbit itself is advanced. The period follows
//! Kepler's third law relative to the original orbit.

use orrery_kepler::{KeplerError, wrap_angle};
use tracing::{debug, info};

use crate::orbit::OrbitState;
use crate::simulation::Simulation;

/// Orbit with semi-major axis decay and apsidal precession.
#[derive(Debug)]
pub struct OrbitDecay {
    orbit: OrbitState,

    /// Change of the semi-major axis in length units per second.
    orbit_decay: f64,
    /// Change of the argument of periapsis in degrees per second.
    apsidal_precession: f64,

    semi_major_axis_original: f64,
    argument_original: f64,
    period_original: f64,

    semi_major_axis: f64,
    argument: f64,
    period: f64,
}

impl OrbitDecay {
    /// Wraps `orbit`, capturing its current elements as the originals.
    ///
    /// Open orbits have no finite semi-major axis to decay and are rejected.
    pub fn new(
        orbit: OrbitState,
        orbit_decay: f64,
        apsidal_precession: f64,
    ) -> Result<Self, KeplerError> {
        if !orbit.conic().is_closed() {
            return Err(KeplerError::InvalidEccentricity(
                orbit.elements().eccentricity,
            ));
        }

        let semi_major_axis = orbit.semi_major_axis();
        let argument = orbit.elements().argument;
        let period = orbit.elements().period;
        Ok(Self {
            orbit,
            orbit_decay,
            apsidal_precession,
            semi_major_axis_original: semi_major_axis,
            argument_original: argument,
            period_original: period,
            semi_major_axis,
            argument,
            period,
        })
    }

    /// The wrapped orbit.
    pub fn orbit(&self) -> &OrbitState {
        &self.orbit
    }

    /// Mutable access to the wrapped orbit. Element changes made here are
    /// overwritten by the next perturbation or reset.
    pub fn orbit_mut(&mut self) -> &mut OrbitState {
        &mut self.orbit
    }

    /// Semi-major axis change in length units per second.
    pub fn orbit_decay(&self) -> f64 {
        self.orbit_decay
    }

    /// Takes effect from the next step. Negative values shrink the orbit.
    pub fn set_orbit_decay(&mut self, orbit_decay: f64) {
        self.orbit_decay = orbit_decay;
    }

    /// Apsidal precession in degrees per second.
    pub fn apsidal_precession(&self) -> f64 {
        self.apsidal_precession
    }

    /// Takes effect from the next step.
    pub fn set_apsidal_precession(&mut self, apsidal_precession: f64) {
        self.apsidal_precession = apsidal_precession;
    }

    /// Current perturbed semi-major axis.
    pub fn semi_major_axis(&self) -> f64 {
        self.semi_major_axis
    }

    /// Current perturbed argument of periapsis, in degrees.
    pub fn argument(&self) -> f64 {
        self.argument
    }

    /// Current perturbed period, in seconds.
    pub fn period(&self) -> f64 {
        self.period
    }

    /// Semi-major axis, argument and period captured at construction.
    pub fn originals(&self) -> (f64, f64, f64) {
        (
            self.semi_major_axis_original,
            self.argument_original,
            self.period_original,
        )
    }

    fn restore(&mut self) -> Result<(), KeplerError> {
        self.semi_major_axis = self.semi_major_axis_original;
        self.argument = self.argument_original;
        self.period = self.period_original;

        self.orbit.set_semi_major_axis(self.semi_major_axis)?;
        self.orbit.set_argument(self.argument)?;
        self.orbit.set_period(self.period)
    }

    fn perturb(&mut self, dt: f64) -> Result<(), KeplerError> {
        let scaled = dt * self.orbit.elements().time_scale;

        if self.orbit_decay != 0.0 {
            let a = self.semi_major_axis + self.orbit_decay * scaled;
            if a <= 0.0 {
                info!(semi_major_axis = a, "orbit decayed to the focus, resetting");
                self.restore()?;
                self.orbit.stop();
                return Ok(());
            }

            let ratio = a / self.semi_major_axis_original;
            self.semi_major_axis = a;
            self.period = self.period_original * (ratio * ratio * ratio).sqrt();
            self.orbit.set_semi_major_axis(a)?;
            self.orbit.set_period(self.period)?;
        }

        if self.apsidal_precession != 0.0 {
            self.argument = wrap_angle(
                self.argument - self.apsidal_precession * scaled,
                -180.0,
                180.0,
            );
            self.orbit.set_argument(self.argument)?;
        }

        debug!(
            semi_major_axis = self.semi_major_axis,
            argument = self.argument,
            period = self.period,
            "orbit perturbed"
        );
        Ok(())
    }
}

impl Simulation for OrbitDecay {
    fn start(&mut self) {
        self.orbit.start();
    }

    fn stop(&mut self) {
        self.orbit.stop();
    }

    /// Restores the original elements and resets the orbit to its epoch.
    fn reset(&mut self) -> Result<(), KeplerError> {
        self.restore()?;
        self.orbit.reset()
    }

    fn step(&mut self, dt: f64) -> Result<(), KeplerError> {
        if !self.orbit.is_running() || !self.orbit.is_active() {
            return Ok(());
        }

        let previous = (self.semi_major_axis, self.argument, self.period);
        let snapshot = self.orbit.snapshot();
        let result = self.perturb(dt).and_then(|()| self.orbit.step(dt));
        if result.is_err() {
            (self.semi_major_axis, self.argument, self.period) = previous;
            self.orbit.restore(snapshot);
        }
        result
    }

    fn is_running(&self) -> bool {
        self.orbit.is_running()
    }
}
