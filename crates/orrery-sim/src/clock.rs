//! Fixed-timestep simulation clock ("Fix Your Timestep").
//!
//! Decouples simulation steps (fixed `dt`) from the driving loop's variable
//! frame rate using an accumulator, and reports the interpolation alpha
//! between the last two simulated states.

use std::time::Instant;

use tracing::warn;

/// Default fixed step: 60 Hz.
pub const DEFAULT_FIXED_DT: f64 = 1.0 / 60.0;

/// Default clamp on a single frame's duration, preventing a spiral of death.
pub const DEFAULT_MAX_FRAME_TIME: f64 = 0.25;

/// Fixed-timestep accumulator.
#[derive(Debug)]
pub struct SimClock {
    fixed_dt: f64,
    max_frame_time: f64,
    previous_time: Instant,
    accumulator: f64,
    sim_time: f64,
    frame_count: u64,
    update_count: u64,
}

impl SimClock {
    /// Creates a clock. Non-positive `fixed_dt` falls back to [`DEFAULT_FIXED_DT`].
    pub fn new(fixed_dt: f64, max_frame_time: f64) -> Self {
        let fixed_dt = if fixed_dt > 0.0 {
            fixed_dt
        } else {
            warn!(fixed_dt, "invalid fixed step, using default");
            DEFAULT_FIXED_DT
        };
        Self {
            fixed_dt,
            max_frame_time: max_frame_time.max(fixed_dt),
            previous_time: Instant::now(),
            accumulator: 0.0,
            sim_time: 0.0,
            frame_count: 0,
            update_count: 0,
        }
    }

    /// Advances by an explicit frame time in seconds.
    ///
    /// `update_fn(fixed_dt, sim_time)` runs zero or more times. Returns the
    /// interpolation alpha in `[0, 1)`.
    pub fn tick(&mut self, frame_time: f64, mut update_fn: impl FnMut(f64, f64)) -> f64 {
        let mut frame_time = frame_time.max(0.0);
        if frame_time > self.max_frame_time {
            warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                frame_time * 1000.0,
                self.max_frame_time * 1000.0
            );
            frame_time = self.max_frame_time;
        }

        self.accumulator += frame_time;
        while self.accumulator >= self.fixed_dt {
            update_fn(self.fixed_dt, self.sim_time);
            self.sim_time += self.fixed_dt;
            self.accumulator -= self.fixed_dt;
            self.update_count += 1;
        }

        self.frame_count += 1;
        self.alpha()
    }

    /// Advances by the wall-clock time elapsed since the previous call.
    pub fn tick_now(&mut self, update_fn: impl FnMut(f64, f64)) -> f64 {
        let now = Instant::now();
        let frame_time = now.duration_since(self.previous_time).as_secs_f64();
        self.previous_time = now;
        self.tick(frame_time, update_fn)
    }

    /// Interpolation alpha without advancing.
    pub fn alpha(&self) -> f64 {
        if self.accumulator > 0.0 {
            self.accumulator / self.fixed_dt
        } else {
            0.0
        }
    }

    /// Seconds advanced by every update.
    pub fn fixed_dt(&self) -> f64 {
        self.fixed_dt
    }

    /// Total simulated time in seconds.
    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    /// Number of `tick` calls so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Number of fixed updates run so far.
    pub fn update_count(&self) -> u64 {
        self.update_count
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new(DEFAULT_FIXED_DT, DEFAULT_MAX_FRAME_TIME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_now_uses_wall_clock() {
        let mut clock = SimClock::default();
        std::thread::sleep(std::time::Duration::from_millis(40));
        let mut updates = 0u64;
        let alpha = clock.tick_now(|dt, _| {
            assert_eq!(dt, DEFAULT_FIXED_DT);
            updates += 1;
        });
        // 40 ms of wall time covers at least two 60 Hz steps.
        assert!(updates >= 2, "updates {updates}");
        assert_eq!(clock.update_count(), updates);
        assert_eq!(clock.frame_count(), 1);
        assert!((0.0..1.0).contains(&alpha));
    }

    #[test]
    fn test_single_step() {
        let mut clock = SimClock::default();
        let mut updates = 0u32;
        clock.tick(DEFAULT_FIXED_DT, |_, _| updates += 1);
        assert_eq!(updates, 1);
        assert!(clock.alpha() < 1e-9);
    }

    #[test]
    fn test_multiple_steps_report_sim_time() {
        let mut clock = SimClock::new(0.1, 1.0);
        let mut times = Vec::new();
        clock.tick(0.35, |dt, t| {
            assert_eq!(dt, 0.1);
            times.push(t);
        });
        assert_eq!(times.len(), 3);
        assert!((times[2] - 0.2).abs() < 1e-12);
        assert!((clock.sim_time() - 0.3).abs() < 1e-12);
        assert!((clock.alpha() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_partial_frame_only_accumulates() {
        let mut clock = SimClock::default();
        let mut updates = 0u32;
        let alpha = clock.tick(0.25 * DEFAULT_FIXED_DT, |_, _| updates += 1);
        assert_eq!(updates, 0);
        assert!((alpha - 0.25).abs() < 1e-10);
        assert_eq!(clock.frame_count(), 1);
    }

    #[test]
    fn test_long_frame_is_clamped() {
        let mut clock = SimClock::default();
        let mut updates = 0u32;
        clock.tick(5.0, |_, _| updates += 1);
        let max_updates = (DEFAULT_MAX_FRAME_TIME / DEFAULT_FIXED_DT).ceil() as u32;
        assert!(updates > 0);
        assert!(updates <= max_updates, "got {updates}");
    }

    #[test]
    fn test_negative_frame_time_ignored() {
        let mut clock = SimClock::default();
        let mut updates = 0u32;
        let alpha = clock.tick(-1.0, |_, _| updates += 1);
        assert_eq!(updates, 0);
        assert_eq!(alpha, 0.0);
    }

    #[test]
    fn test_invalid_fixed_dt_falls_back() {
        let clock = SimClock::new(0.0, 0.25);
        assert_eq!(clock.fixed_dt(), DEFAULT_FIXED_DT);
    }

    #[test]
    fn test_deterministic_sequence() {
        let frame_times = [0.017, 0.015, 0.020, 0.016, 0.033, 0.008, 0.018];
        let mut a = SimClock::default();
        let mut b = SimClock::default();
        for &ft in &frame_times {
            let alpha_a = a.tick(ft, |_, _| {});
            let alpha_b = b.tick(ft, |_, _| {});
            assert_eq!(alpha_a, alpha_b);
        }
        assert_eq!(a.update_count(), b.update_count());
        assert_eq!(a.sim_time(), b.sim_time());
    }
}
