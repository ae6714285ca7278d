//! Thread pool stepping independent bodies in parallel.
//!
//! Bodies are moved into a bounded task channel, stepped by whichever worker
//! receives them, and moved back through a result channel. A worker owns a
//! body exclusively while stepping it, so bodies never share mutable state.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;

use orrery_kepler::KeplerError;
use tracing::{info, warn};

use crate::decay::OrbitDecay;
use crate::orbit::OrbitState;
use crate::rotation::RotationState;
use crate::simulation::Simulation;

/// How a body moves around its parent.
#[derive(Debug)]
pub enum Motion {
    /// Fixed Keplerian orbit.
    Orbit(OrbitState),
    /// Orbit with decay and apsidal precession.
    Decaying(OrbitDecay),
}

impl Motion {
    /// The underlying orbit state.
    pub fn orbit(&self) -> &OrbitState {
        match self {
            Motion::Orbit(orbit) => orbit,
            Motion::Decaying(decay) => decay.orbit(),
        }
    }

    pub fn orbit_mut(&mut self) -> &mut OrbitState {
        match self {
            Motion::Orbit(orbit) => orbit,
            Motion::Decaying(decay) => decay.orbit_mut(),
        }
    }

    fn simulation(&mut self) -> &mut dyn Simulation {
        match self {
            Motion::Orbit(orbit) => orbit,
            Motion::Decaying(decay) => decay,
        }
    }
}

/// A simulated body: an orbit plus an optional spin.
#[derive(Debug)]
pub struct Body {
    /// Caller-assigned identifier, used to match results.
    pub id: u64,
    /// Orbital motion, stepped first.
    pub motion: Motion,
    /// Spin about the body's own axis, if any.
    pub rotation: Option<RotationState>,
}

impl Body {
    /// Creates a body. Its simulations keep their current run state.
    pub fn new(id: u64, motion: Motion, rotation: Option<RotationState>) -> Self {
        Self {
            id,
            motion,
            rotation,
        }
    }

    /// The body's orbit, decaying or not.
    pub fn orbit(&self) -> &OrbitState {
        self.motion.orbit()
    }
}

impl Simulation for Body {
    fn start(&mut self) {
        self.motion.simulation().start();
        if let Some(rotation) = &mut self.rotation {
            rotation.start();
        }
    }

    fn stop(&mut self) {
        self.motion.simulation().stop();
        if let Some(rotation) = &mut self.rotation {
            rotation.stop();
        }
    }

    fn reset(&mut self) -> Result<(), KeplerError> {
        if let Some(rotation) = &mut self.rotation {
            rotation.reset()?;
        }
        self.motion.simulation().reset()
    }

    fn step(&mut self, dt: f64) -> Result<(), KeplerError> {
        self.motion.simulation().step(dt)?;
        if let Some(rotation) = &mut self.rotation {
            rotation.step(dt)?;
        }
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.orbit().is_running()
    }
}

/// A body handed to a worker together with its step.
struct StepTask {
    body: Body,
    dt: f64,
}

/// A body returned from a worker.
#[derive(Debug)]
pub struct StepResult {
    pub body: Body,
    /// Step outcome. On error the body keeps its state from before the step.
    pub result: Result<(), KeplerError>,
}

/// Worker pool for stepping bodies.
///
/// The owning loop moves bodies in with [`submit`](Self::submit) and collects
/// them each tick via [`drain_results`](Self::drain_results), or does both at
/// once with [`step_all`](Self::step_all).
pub struct StepPool {
    task_sender: Option<crossbeam_channel::Sender<StepTask>>,
    result_receiver: crossbeam_channel::Receiver<StepResult>,
    /// Results received by `step_all` that belong to earlier submissions.
    parked: Mutex<Vec<StepResult>>,
    worker_handles: Vec<JoinHandle<()>>,
    /// Maximum number of bodies queued or being stepped.
    budget: usize,
    in_flight: Arc<AtomicUsize>,
}

impl StepPool {
    /// Spawns `worker_count` workers, or one per CPU when zero.
    ///
    /// `budget` caps the number of bodies in flight and is raised to at least one.
    pub fn new(worker_count: usize, budget: usize) -> Self {
        let worker_count = if worker_count == 0 {
            num_cpus::get()
        } else {
            worker_count
        };
        let budget = budget.max(1);

        let (task_tx, task_rx) = crossbeam_channel::bounded::<StepTask>(budget);
        let (result_tx, result_rx) = crossbeam_channel::unbounded();
        let in_flight = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::with_capacity(worker_count);
        for _ in 0..worker_count {
            let rx = task_rx.clone();
            let tx = result_tx.clone();
            let flight = Arc::clone(&in_flight);

            handles.push(std::thread::spawn(move || {
                while let Ok(StepTask { mut body, dt }) = rx.recv() {
                    let result = body.step(dt);
                    if let Err(err) = &result {
                        warn!(body = body.id, %err, "body step failed");
                    }
                    // Release the slot before the result becomes visible.
                    flight.fetch_sub(1, Ordering::AcqRel);
                    let _ = tx.send(StepResult { body, result });
                }
            }));
        }

        info!(workers = worker_count, budget, "step pool started");
        Self {
            task_sender: Some(task_tx),
            result_receiver: result_rx,
            parked: Mutex::new(Vec::new()),
            worker_handles: handles,
            budget,
            in_flight,
        }
    }

    /// Queues `body` to be stepped by `dt`.
    ///
    /// Hands the body back when the budget is exhausted or the pool has been
    /// shut down.
    pub fn submit(&self, body: Body, dt: f64) -> Result<(), Body> {
        let Some(sender) = &self.task_sender else {
            return Err(body);
        };
        if self.in_flight.load(Ordering::Acquire) >= self.budget {
            return Err(body);
        }
        self.in_flight.fetch_add(1, Ordering::AcqRel);
        if let Err(err) = sender.send(StepTask { body, dt }) {
            self.in_flight.fetch_sub(1, Ordering::AcqRel);
            return Err(err.into_inner().body);
        }
        Ok(())
    }

    /// Collects every body that has finished stepping.
    pub fn drain_results(&self) -> Vec<StepResult> {
        let mut results = std::mem::take(&mut *self.parked_results());
        results.extend(self.result_receiver.try_iter());
        results
    }

    /// Steps every body by `dt` and blocks until all are back, sorted by id.
    ///
    /// Bodies beyond the budget wait for a free slot. Results are matched to
    /// `bodies` by id; bodies from earlier [`submit`](Self::submit) calls that
    /// finish meanwhile are kept for [`drain_results`](Self::drain_results).
    /// After shutdown bodies are stepped on the calling thread.
    pub fn step_all(&self, bodies: Vec<Body>, dt: f64) -> Vec<StepResult> {
        let total = bodies.len();
        let mut expected: HashMap<u64, usize> = HashMap::new();
        for body in &bodies {
            *expected.entry(body.id).or_default() += 1;
        }
        let mut queue = VecDeque::from(bodies);
        let mut results = Vec::with_capacity(total);

        while let Some(body) = queue.pop_front() {
            match self.submit(body, dt) {
                Ok(()) => continue,
                Err(body) if self.task_sender.is_none() => {
                    results.push(step_inline(body, dt));
                }
                Err(body) => {
                    queue.push_front(body);
                    if !self.receive_expected(&mut expected, &mut results) {
                        break;
                    }
                }
            }
        }
        while results.len() < total - queue.len() {
            if !self.receive_expected(&mut expected, &mut results) {
                break;
            }
        }
        // Workers gone mid-run: step what is left here.
        results.extend(queue.into_iter().map(|body| step_inline(body, dt)));

        results.sort_by_key(|r| r.body.id);
        results
    }

    /// Blocks for one result. Results whose id is not expected are parked.
    /// Returns `false` once every worker has exited.
    fn receive_expected(
        &self,
        expected: &mut HashMap<u64, usize>,
        results: &mut Vec<StepResult>,
    ) -> bool {
        let Ok(result) = self.result_receiver.recv() else {
            return false;
        };
        match expected.get_mut(&result.body.id) {
            Some(count) if *count > 0 => {
                *count -= 1;
                results.push(result);
            }
            _ => self.parked_results().push(result),
        }
        true
    }

    fn parked_results(&self) -> std::sync::MutexGuard<'_, Vec<StepResult>> {
        self.parked.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of bodies queued or being stepped.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Number of live workers. Zero after shutdown.
    pub fn worker_count(&self) -> usize {
        self.worker_handles.len()
    }

    /// Closes the task channel and joins every worker.
    pub fn shutdown(&mut self) {
        self.task_sender.take();
        for handle in self.worker_handles.drain(..) {
            let _ = handle.join();
        }
    }
}

impl Drop for StepPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn step_inline(mut body: Body, dt: f64) -> StepResult {
    let result = body.step(dt);
    StepResult { body, result }
}
