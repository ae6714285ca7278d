//! Rigid spin of a body about a fixed axis.

use std::f64::consts::TAU;

use glam::{DQuat, DVec3};
use orrery_kepler::{KeplerError, axis_orientation, rate, spin, wrap_angle};
use tracing::warn;

use crate::events::{Observers, RotationEvent};
use crate::simulation::Simulation;

/// Spin elements. Angles are in degrees.
#[derive(Clone, Debug, PartialEq)]
pub struct RotationElements {
    /// Right ascension of the spin axis.
    pub right_ascension: f64,
    /// Declination of the spin axis.
    pub declination: f64,
    /// Spin angle at the start epoch.
    pub mean_angle: f64,
    /// Seconds per full turn.
    pub period: f64,
    /// Signed multiplier on step time.
    pub time_scale: f64,
    /// Seconds of simulated time already elapsed at reset.
    pub start_epoch: f64,
}

impl Default for RotationElements {
    fn default() -> Self {
        Self {
            right_ascension: 0.0,
            declination: 0.0,
            mean_angle: 0.0,
            period: 10.0,
            time_scale: 1.0,
            start_epoch: 0.0,
        }
    }
}

/// A body spinning at a constant rate, advanced by [`Simulation::step`].
#[derive(Debug)]
pub struct RotationState {
    elements: RotationElements,
    axis: DQuat,
    rate: f64,
    angle: f64,
    rotation: DQuat,
    running: bool,
    observers: Observers<RotationEvent>,
}

impl RotationState {
    /// Creates a stopped rotation at its start epoch.
    ///
    /// A zero period is reported; use [`RotationState::set_period`] to keep a
    /// non-spinning body around instead.
    pub fn new(elements: RotationElements) -> Result<Self, KeplerError> {
        let mut state = Self {
            elements,
            axis: DQuat::IDENTITY,
            rate: 0.0,
            angle: 0.0,
            rotation: DQuat::IDENTITY,
            running: false,
            observers: Observers::new(),
        };
        state.recompute_static()?;
        state.reset()?;
        Ok(state)
    }

    fn recompute_static(&mut self) -> Result<(), KeplerError> {
        self.axis = axis_orientation(self.elements.right_ascension, self.elements.declination);
        let result = rate(self.elements.period, 0.0, TAU);
        self.rate = match result {
            Ok(r) => r,
            Err(err) => {
                warn!(%err, "rotation rate defaults to zero");
                0.0
            }
        };
        self.rotation = spin(self.axis, self.angle);
        result.map(|_| ())
    }

    fn update(&mut self, mutate: impl FnOnce(&mut RotationElements)) -> Result<(), KeplerError> {
        mutate(&mut self.elements);
        self.recompute_static()
    }

    /// Sets the right ascension of the axis, in degrees.
    pub fn set_right_ascension(&mut self, right_ascension: f64) -> Result<(), KeplerError> {
        self.update(|el| el.right_ascension = right_ascension)
    }

    /// Sets the declination of the axis, in degrees.
    pub fn set_declination(&mut self, declination: f64) -> Result<(), KeplerError> {
        self.update(|el| el.declination = declination)
    }

    /// Sets the spin angle at epoch, in degrees. Takes effect on the next reset.
    pub fn set_mean_angle(&mut self, mean_angle: f64) -> Result<(), KeplerError> {
        self.update(|el| el.mean_angle = mean_angle)
    }

    /// Sets the period. Zero is stored but reported, and the rate drops to zero.
    pub fn set_period(&mut self, period: f64) -> Result<(), KeplerError> {
        self.update(|el| el.period = period)
    }

    /// Sets the signed time scale.
    pub fn set_time_scale(&mut self, time_scale: f64) -> Result<(), KeplerError> {
        self.update(|el| el.time_scale = time_scale)
    }

    /// Sets the start epoch, in seconds. Takes effect on the next reset.
    pub fn set_start_epoch(&mut self, start_epoch: f64) -> Result<(), KeplerError> {
        self.update(|el| el.start_epoch = start_epoch)
    }

    /// Current elements.
    pub fn elements(&self) -> &RotationElements {
        &self.elements
    }

    /// Orientation of the spin axis.
    pub fn axis(&self) -> DQuat {
        self.axis
    }

    /// Spin rate in rad/s, before the time scale is applied.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Current spin angle in radians, in `[0, 2π)`.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Current body orientation: the axis spun by the current angle.
    pub fn rotation(&self) -> DQuat {
        self.rotation
    }

    /// Angular velocity in rad/s in the parent frame.
    pub fn angular_velocity(&self) -> DVec3 {
        self.axis * DVec3::new(0.0, -self.rate * self.elements.time_scale, 0.0)
    }

    /// Registers an observer for start, step, and stop notifications.
    pub fn subscribe(&mut self) -> crossbeam_channel::Receiver<RotationEvent> {
        self.observers.subscribe()
    }

    fn set_angle(&mut self, angle: f64) {
        self.angle = wrap_angle(angle, 0.0, TAU);
        self.rotation = spin(self.axis, self.angle);
    }
}

impl Simulation for RotationState {
    fn start(&mut self) {
        if !self.running {
            self.running = true;
            self.observers.emit(RotationEvent::Started);
        }
    }

    fn stop(&mut self) {
        if self.running {
            self.running = false;
            self.observers.emit(RotationEvent::Ended);
        }
    }

    fn reset(&mut self) -> Result<(), KeplerError> {
        self.set_angle(self.elements.mean_angle.to_radians() + self.elements.start_epoch * self.rate);
        Ok(())
    }

    fn step(&mut self, dt: f64) -> Result<(), KeplerError> {
        if !self.running {
            return Ok(());
        }
        self.set_angle(self.angle + dt * self.rate * self.elements.time_scale);
        self.observers.emit(RotationEvent::Stepped { angle: self.angle });
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_rate_is_full_turn_per_period() {
        let state = RotationState::new(RotationElements::default()).unwrap();
        assert!((state.rate() - TAU / 10.0).abs() < 1e-15);
        assert_eq!(state.angle(), 0.0);
        assert!(state.rotation().abs_diff_eq(DQuat::IDENTITY, 1e-15));
    }

    #[test]
    fn test_step_wraps_into_full_turn() {
        let mut state = RotationState::new(RotationElements::default()).unwrap();
        state.start();
        state.step(12.5).unwrap();
        assert!((state.angle() - PI / 2.0).abs() < 1e-12);

        state.set_time_scale(-1.0).unwrap();
        state.step(5.0).unwrap();
        assert!((state.angle() - 1.5 * PI).abs() < 1e-12);
    }

    #[test]
    fn test_reset_uses_mean_angle_and_epoch() {
        let state = RotationState::new(RotationElements {
            mean_angle: 90.0,
            start_epoch: 2.5,
            ..Default::default()
        })
        .unwrap();
        assert!((state.angle() - PI).abs() < 1e-12);
    }

    #[test]
    fn test_rotation_keeps_axis() {
        let mut state = RotationState::new(RotationElements {
            right_ascension: 30.0,
            declination: 60.0,
            ..Default::default()
        })
        .unwrap();
        let up = state.axis() * DVec3::Y;
        state.start();
        state.step(3.3).unwrap();
        assert!((state.rotation() * DVec3::Y - up).length() < 1e-12);
    }

    #[test]
    fn test_angular_velocity_along_axis() {
        let state = RotationState::new(RotationElements {
            declination: 90.0,
            ..Default::default()
        })
        .unwrap();
        let w = state.angular_velocity();
        let up = state.axis() * DVec3::Y;
        assert!((w.length() - state.rate()).abs() < 1e-12);
        assert!((w.normalize() + up).length() < 1e-12);
    }

    #[test]
    fn test_zero_period_reported() {
        let result = RotationState::new(RotationElements {
            period: 0.0,
            ..Default::default()
        });
        assert!(matches!(result, Err(KeplerError::ZeroPeriod)));

        let mut state = RotationState::new(RotationElements::default()).unwrap();
        assert_eq!(state.set_period(0.0), Err(KeplerError::ZeroPeriod));
        assert_eq!(state.rate(), 0.0);
        state.start();
        state.step(1.0).unwrap();
        assert_eq!(state.angle(), 0.0);
    }

    #[test]
    fn test_notifications() {
        let mut state = RotationState::new(RotationElements::default()).unwrap();
        let events = state.subscribe();
        state.step(1.0).unwrap();
        state.start();
        state.step(1.0).unwrap();
        state.stop();

        let received: Vec<_> = events.try_iter().collect();
        assert_eq!(received.len(), 3);
        assert_eq!(received[0], RotationEvent::Started);
        assert_eq!(
            received[1],
            RotationEvent::Stepped {
                angle: state.angle()
            }
        );
        assert_eq!(received[2], RotationEvent::Ended);
    }
}
