//! Stateful orbit and rotation simulation for the Orrery engine.
//!
//! [`OrbitState`] and [`RotationState`] hold a body's elements together with
//! every quantity derived from them, and keep the two consistent: each element
//! setter re-derives the static geometry and the current position before it
//! returns, and each [`step`](Simulation::step) advances the anomaly and
//! re-derives the dynamic state. Start, step, and end notifications are
//! delivered over channels obtained from `subscribe`.
//!
//! Bodies are independent. [`StepPool`] steps many of them on worker threads,
//! moving each body to exactly one worker for the duration of its step.

mod clock;
mod decay;
mod events;
mod orbit;
mod path;
mod pool;
mod rotation;
mod simulation;

pub use clock::{DEFAULT_FIXED_DT, DEFAULT_MAX_FRAME_TIME, SimClock};
pub use decay::OrbitDecay;
pub use events::{EndReason, Observers, OrbitEvent, RotationEvent};
pub use orbit::{EndingPolicy, OrbitElements, OrbitState};
pub use path::{MAX_SEGMENTS, MIN_SEGMENTS, periapsis_point, sample_path};
pub use pool::{Body, Motion, StepPool, StepResult};
pub use rotation::{RotationElements, RotationState};
pub use simulation::Simulation;

pub use orrery_kepler::{KeplerError, KeplerSolver};
