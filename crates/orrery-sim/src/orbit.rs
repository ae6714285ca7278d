//! Keplerian orbit state machine.
//!
//! An [`OrbitState`] owns a body's [`OrbitElements`] and every quantity derived
//! from them. Derived fields are split in two groups:
//!
//! - static: regime, orientation, semi-latus rectum, rate. Re-derived by every
//!   element setter.
//! - dynamic: eccentric/true anomaly, radius, position, velocity. Re-derived
//!   for the current anomaly by every setter and every step.
//!
//! Both groups are recomputed eagerly so that callers can read derived values
//! straight after a write.

use glam::{DQuat, DVec3};
use orrery_kepler::{
    Conic, KeplerError, KeplerSolver, orbital_orientation, periapsis_from_semi_major_axis,
    position, radius, rate, true_anomaly, velocity, wrap_angle,
};
use tracing::{debug, warn};

use crate::events::{EndReason, Observers, OrbitEvent};
use crate::simulation::Simulation;

/// What happens when the anomaly leaves the configured limits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EndingPolicy {
    /// Wrap around to the opposite limit.
    #[default]
    Loop,
    /// Stop the simulation and pin the anomaly to the crossed limit.
    Clamp,
    /// Like [`Clamp`](Self::Clamp), and also deactivate the body.
    ClampAndDeactivate,
    /// Reflect off the crossed limit and reverse the time scale.
    PingPong,
}

/// Classical orbital elements plus simulation controls.
///
/// Angles are in degrees. Distances are in arbitrary length units.
#[derive(Clone, Debug, PartialEq)]
pub struct OrbitElements {
    /// Periapsis distance, closest approach to the focus.
    pub periapsis: f64,
    /// Eccentricity: 0 circle, (0, 1) ellipse, 1 parabola, > 1 hyperbola.
    pub eccentricity: f64,
    /// Argument of periapsis.
    pub argument: f64,
    /// Longitude of the ascending node.
    pub longitude: f64,
    /// Inclination of the orbital plane.
    pub inclination: f64,
    /// Seconds to sweep the anomaly from one limit to the other.
    pub period: f64,
    /// Anomaly domain `[low, high]`.
    pub limits: [f64; 2],
    /// Mean anomaly at the start epoch.
    pub mean_anomaly: f64,
    /// Seconds of simulated time already elapsed at reset.
    pub start_epoch: f64,
    /// Signed multiplier on step time. Negative values run the orbit backwards.
    pub time_scale: f64,
    /// Boundary behaviour at the limits.
    pub ending: EndingPolicy,
}

impl Default for OrbitElements {
    fn default() -> Self {
        Self {
            periapsis: 1.0,
            eccentricity: 0.4,
            argument: 0.0,
            longitude: 0.0,
            inclination: 0.0,
            period: 10.0,
            limits: [-180.0, 180.0],
            mean_anomaly: 0.0,
            start_epoch: 0.0,
            time_scale: 1.0,
            ending: EndingPolicy::Loop,
        }
    }
}

impl OrbitElements {
    /// Limits converted to radians.
    fn limits_radians(&self) -> (f64, f64) {
        (self.limits[0].to_radians(), self.limits[1].to_radians())
    }

    fn validate(&self) -> Result<Conic, KeplerError> {
        let [lower, upper] = self.limits;
        if !(upper > lower) {
            return Err(KeplerError::InvalidLimits { lower, upper });
        }
        Conic::from_eccentricity(self.eccentricity)
    }
}

/// Values that depend on the current anomaly.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Dynamics {
    eccentric_anomaly: f64,
    true_anomaly: f64,
    radius: f64,
    position: DVec3,
    velocity: DVec3,
}

/// Elements and every derived value, for rolling back a failed change.
#[derive(Clone, Debug)]
pub(crate) struct OrbitSnapshot {
    elements: OrbitElements,
    conic: Conic,
    orientation: DQuat,
    semi_latus_rectum: f64,
    rate: f64,
    anomaly: f64,
    dynamics: Dynamics,
}

/// A body on a fixed two-body orbit, advanced by [`Simulation::step`].
#[derive(Debug)]
pub struct OrbitState {
    elements: OrbitElements,
    solver: KeplerSolver,

    conic: Conic,
    orientation: DQuat,
    semi_latus_rectum: f64,
    rate: f64,

    anomaly: f64,
    dynamics: Dynamics,

    running: bool,
    active: bool,
    observers: Observers<OrbitEvent>,
}

impl OrbitState {
    /// Creates a stopped orbit at its start epoch using the default solver.
    pub fn new(elements: OrbitElements) -> Result<Self, KeplerError> {
        Self::with_solver(elements, KeplerSolver::default())
    }

    /// Creates a stopped orbit at its start epoch using `solver`.
    pub fn with_solver(elements: OrbitElements, solver: KeplerSolver) -> Result<Self, KeplerError> {
        let conic = elements.validate()?;
        let mut orbit = Self {
            elements,
            solver,
            conic,
            orientation: DQuat::IDENTITY,
            semi_latus_rectum: 0.0,
            rate: 0.0,
            anomaly: 0.0,
            dynamics: Dynamics::default(),
            running: false,
            active: true,
            observers: Observers::new(),
        };
        orbit.recompute_static()?;
        orbit.reset()?;
        Ok(orbit)
    }

    // --- Derived state ---

    /// Re-derives regime, orientation, semi-latus rectum, and rate.
    ///
    /// A zero period leaves the rate at zero and is reported after every other
    /// field has been updated.
    fn recompute_static(&mut self) -> Result<(), KeplerError> {
        let el = &self.elements;
        self.conic = Conic::from_eccentricity(el.eccentricity)?;
        self.orientation = orbital_orientation(el.argument, el.longitude, el.inclination);
        self.semi_latus_rectum = self.conic.semi_latus_rectum(el.periapsis);

        let (low, high) = el.limits_radians();
        match rate(el.period, low, high) {
            Ok(r) => {
                self.rate = r;
                Ok(())
            }
            Err(err) => {
                warn!(%err, "orbit rate defaults to zero");
                self.rate = 0.0;
                Err(err)
            }
        }
    }

    /// Evaluates the dynamic state at `anomaly` with the given time scale.
    fn evaluate(&self, anomaly: f64, time_scale: f64) -> Result<Dynamics, KeplerError> {
        let e = self.conic.eccentricity();
        let ea = self.solver.eccentric_anomaly(anomaly, self.conic)?;
        let v = true_anomaly(ea, self.conic);
        let r = radius(self.semi_latus_rectum, e, v);
        let local_velocity = velocity(
            self.conic,
            self.elements.periapsis,
            r,
            self.rate * time_scale,
            ea,
            v,
        );

        Ok(Dynamics {
            eccentric_anomaly: ea,
            true_anomaly: v,
            radius: r,
            position: self.orientation * position(r, v),
            velocity: self.orientation * local_velocity,
        })
    }

    fn recompute_dynamic(&mut self) -> Result<(), KeplerError> {
        self.dynamics = self.evaluate(self.anomaly, self.elements.time_scale)?;
        Ok(())
    }

    pub(crate) fn snapshot(&self) -> OrbitSnapshot {
        OrbitSnapshot {
            elements: self.elements.clone(),
            conic: self.conic,
            orientation: self.orientation,
            semi_latus_rectum: self.semi_latus_rectum,
            rate: self.rate,
            anomaly: self.anomaly,
            dynamics: self.dynamics,
        }
    }

    /// Puts elements and derived values back exactly as captured. Run state
    /// and observers are not part of a snapshot.
    pub(crate) fn restore(&mut self, snapshot: OrbitSnapshot) {
        self.elements = snapshot.elements;
        self.conic = snapshot.conic;
        self.orientation = snapshot.orientation;
        self.semi_latus_rectum = snapshot.semi_latus_rectum;
        self.rate = snapshot.rate;
        self.anomaly = snapshot.anomaly;
        self.dynamics = snapshot.dynamics;
    }

    /// Applies an element mutation, then re-derives everything.
    ///
    /// Invalid eccentricities or limits, and elements the solver cannot
    /// evaluate at the current anomaly, are rejected and leave the orbit
    /// untouched.
    fn update(&mut self, mutate: impl FnOnce(&mut OrbitElements)) -> Result<(), KeplerError> {
        let mut elements = self.elements.clone();
        mutate(&mut elements);
        elements.validate()?;

        let snapshot = self.snapshot();
        let limits_changed = elements.limits != self.elements.limits;
        self.elements = elements;

        let static_result = self.recompute_static();
        if limits_changed {
            let (low, high) = self.elements.limits_radians();
            self.anomaly = wrap_angle(self.anomaly, low, high);
        }
        if let Err(err) = self.recompute_dynamic() {
            self.restore(snapshot);
            return Err(err);
        }
        static_result
    }

    // --- Element mutators ---

    /// Replaces every element at once.
    pub fn set_elements(&mut self, elements: OrbitElements) -> Result<(), KeplerError> {
        self.update(|el| *el = elements)
    }

    /// Sets the periapsis distance.
    pub fn set_periapsis(&mut self, periapsis: f64) -> Result<(), KeplerError> {
        self.update(|el| el.periapsis = periapsis)
    }

    /// Sets the periapsis distance from a semi-major axis at the current eccentricity.
    pub fn set_semi_major_axis(&mut self, semi_major_axis: f64) -> Result<(), KeplerError> {
        let periapsis = periapsis_from_semi_major_axis(semi_major_axis, self.elements.eccentricity)?;
        self.set_periapsis(periapsis)
    }

    /// Sets the eccentricity. Negative values are rejected.
    pub fn set_eccentricity(&mut self, eccentricity: f64) -> Result<(), KeplerError> {
        self.update(|el| el.eccentricity = eccentricity)
    }

    /// Sets the argument of periapsis, in degrees.
    pub fn set_argument(&mut self, argument: f64) -> Result<(), KeplerError> {
        self.update(|el| el.argument = argument)
    }

    /// Sets the longitude of the ascending node, in degrees.
    pub fn set_longitude(&mut self, longitude: f64) -> Result<(), KeplerError> {
        self.update(|el| el.longitude = longitude)
    }

    /// Sets the inclination, in degrees.
    pub fn set_inclination(&mut self, inclination: f64) -> Result<(), KeplerError> {
        self.update(|el| el.inclination = inclination)
    }

    /// Sets the period. Zero is stored but reported, and the rate drops to zero.
    pub fn set_period(&mut self, period: f64) -> Result<(), KeplerError> {
        self.update(|el| el.period = period)
    }

    /// Sets the anomaly limits, in degrees. The current anomaly is wrapped into them.
    pub fn set_limits(&mut self, low: f64, high: f64) -> Result<(), KeplerError> {
        self.update(|el| el.limits = [low, high])
    }

    /// Sets the mean anomaly at epoch, in degrees. Takes effect on the next reset.
    pub fn set_mean_anomaly(&mut self, mean_anomaly: f64) -> Result<(), KeplerError> {
        self.update(|el| el.mean_anomaly = mean_anomaly)
    }

    /// Sets the start epoch, in seconds. Takes effect on the next reset.
    pub fn set_start_epoch(&mut self, start_epoch: f64) -> Result<(), KeplerError> {
        self.update(|el| el.start_epoch = start_epoch)
    }

    /// Sets the signed time scale.
    pub fn set_time_scale(&mut self, time_scale: f64) -> Result<(), KeplerError> {
        self.update(|el| el.time_scale = time_scale)
    }

    /// Sets the boundary policy.
    pub fn set_ending(&mut self, ending: EndingPolicy) {
        self.elements.ending = ending;
    }

    /// Replaces the solver and re-evaluates the current anomaly with it.
    ///
    /// The solver is kept even if that evaluation fails.
    pub fn set_solver(&mut self, solver: KeplerSolver) -> Result<(), KeplerError> {
        self.solver = solver;
        self.recompute_dynamic()
    }

    // --- Accessors ---

    /// Current elements.
    pub fn elements(&self) -> &OrbitElements {
        &self.elements
    }

    /// Solver used for every evaluation.
    pub fn solver(&self) -> &KeplerSolver {
        &self.solver
    }

    /// Conic regime selected from the eccentricity.
    pub fn conic(&self) -> Conic {
        self.conic
    }

    /// Rotation from the orbital plane into the parent frame.
    pub fn orientation(&self) -> DQuat {
        self.orientation
    }

    /// Semi-latus rectum.
    pub fn semi_latus_rectum(&self) -> f64 {
        self.semi_latus_rectum
    }

    /// Semi-major axis: infinite for parabolas, negative for hyperbolas.
    pub fn semi_major_axis(&self) -> f64 {
        self.conic.semi_major_axis(self.elements.periapsis)
    }

    /// Anomaly sweep rate in rad/s, before the time scale is applied.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Current mean anomaly in radians, within the limits.
    pub fn anomaly(&self) -> f64 {
        self.anomaly
    }

    /// Current eccentric anomaly in radians.
    pub fn eccentric_anomaly(&self) -> f64 {
        self.dynamics.eccentric_anomaly
    }

    /// Current true anomaly in radians.
    pub fn true_anomaly(&self) -> f64 {
        self.dynamics.true_anomaly
    }

    /// Current distance from the focus.
    pub fn radius(&self) -> f64 {
        self.dynamics.radius
    }

    /// Current position in the parent frame.
    pub fn position(&self) -> DVec3 {
        self.dynamics.position
    }

    /// Current velocity in the parent frame, including the time scale.
    pub fn velocity(&self) -> DVec3 {
        self.dynamics.velocity
    }

    /// Parent-frame position at an arbitrary anomaly, without changing state.
    pub fn position_at(&self, anomaly: f64) -> Result<DVec3, KeplerError> {
        Ok(self.evaluate(anomaly, self.elements.time_scale)?.position)
    }

    /// Returns `false` once a [`EndingPolicy::ClampAndDeactivate`] boundary was hit.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Reactivates a deactivated body. Does not start it.
    pub fn activate(&mut self) {
        self.active = true;
    }

    /// Registers an observer for start, step, and end notifications.
    pub fn subscribe(&mut self) -> crossbeam_channel::Receiver<OrbitEvent> {
        self.observers.subscribe()
    }

    fn end(&mut self, reason: EndReason) {
        self.running = false;
        self.observers.emit(OrbitEvent::Ended { reason });
    }
}

impl Simulation for OrbitState {
    fn start(&mut self) {
        if !self.running {
            self.running = true;
            self.observers.emit(OrbitEvent::Started);
        }
    }

    fn stop(&mut self) {
        if self.running {
            self.end(EndReason::Stopped);
        }
    }

    fn reset(&mut self) -> Result<(), KeplerError> {
        let (low, high) = self.elements.limits_radians();
        let anomaly = wrap_angle(
            self.elements.mean_anomaly.to_radians() + self.elements.start_epoch * self.rate,
            low,
            high,
        );
        self.dynamics = self.evaluate(anomaly, self.elements.time_scale)?;
        self.anomaly = anomaly;
        Ok(())
    }

    fn step(&mut self, dt: f64) -> Result<(), KeplerError> {
        if !self.running || !self.active {
            return Ok(());
        }

        let (low, high) = self.elements.limits_radians();
        let mut time_scale = self.elements.time_scale;
        let advanced = self.anomaly + dt * self.rate * time_scale;
        let inside = advanced >= low && advanced <= high;
        let boundary = if advanced > high { high } else { low };

        let mut ended = None;
        let anomaly = match self.elements.ending {
            EndingPolicy::Loop => wrap_angle(advanced, low, high),
            _ if inside => advanced,
            EndingPolicy::Clamp => {
                debug!(boundary, "orbit clamped at limit");
                ended = Some(EndReason::Clamped);
                boundary
            }
            EndingPolicy::ClampAndDeactivate => {
                debug!(boundary, "orbit clamped at limit, deactivating");
                ended = Some(EndReason::Deactivated);
                boundary
            }
            EndingPolicy::PingPong => {
                time_scale = -time_scale;
                let reflected = 2.0 * boundary - advanced;
                debug!(boundary, reflected, "orbit reflected at limit");
                if reflected < low || reflected > high {
                    // Overshoot wider than the whole domain.
                    wrap_angle(reflected, low, high)
                } else {
                    reflected
                }
            }
        };

        let dynamics = self.evaluate(anomaly, time_scale)?;
        self.anomaly = anomaly;
        self.elements.time_scale = time_scale;
        self.dynamics = dynamics;
        self.observers.emit(OrbitEvent::Stepped {
            true_anomaly: dynamics.true_anomaly,
        });

        if let Some(reason) = ended {
            if reason == EndReason::Deactivated {
                self.active = false;
            }
            self.end(reason);
        }
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running
    }
}
