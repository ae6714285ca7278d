//! Start, step, and end notifications.
//!
//! Each simulated body owns an [`Observers`] list of channel senders. Consumers
//! call `subscribe` once and drain the returned receiver from their own loop,
//! so the numerical core never calls back into presentation code.

use crossbeam_channel::{Receiver, Sender, unbounded};

/// Why an orbit stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndReason {
    /// `stop` was called.
    Stopped,
    /// The anomaly reached a limit under [`EndingPolicy::Clamp`](crate::EndingPolicy::Clamp).
    Clamped,
    /// The anomaly reached a limit under
    /// [`EndingPolicy::ClampAndDeactivate`](crate::EndingPolicy::ClampAndDeactivate);
    /// the body is now inactive.
    Deactivated,
}

/// Notification emitted by an [`OrbitState`](crate::OrbitState).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OrbitEvent {
    /// The simulation went from stopped to running.
    Started,
    /// A step completed. Carries the new true anomaly in radians.
    Stepped {
        /// True anomaly after the step, in radians.
        true_anomaly: f64,
    },
    /// The simulation went from running to stopped.
    Ended {
        /// What ended it.
        reason: EndReason,
    },
}

/// Notification emitted by a [`RotationState`](crate::RotationState).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RotationEvent {
    /// The simulation went from stopped to running.
    Started,
    /// A step completed. Carries the new spin angle in radians.
    Stepped {
        /// Spin angle after the step, in radians, in `[0, 2π)`.
        angle: f64,
    },
    /// The simulation went from running to stopped.
    Ended,
}

/// Observer list backed by unbounded channels.
///
/// Receivers that have been dropped are pruned on the next emit.
#[derive(Debug)]
pub struct Observers<E> {
    senders: Vec<Sender<E>>,
}

impl<E: Clone> Observers<E> {
    /// Creates an empty observer list.
    pub fn new() -> Self {
        Self {
            senders: Vec::new(),
        }
    }

    /// Registers a new observer and returns its receiving end.
    pub fn subscribe(&mut self) -> Receiver<E> {
        let (tx, rx) = unbounded();
        self.senders.push(tx);
        rx
    }

    /// Sends `event` to every live observer.
    pub fn emit(&mut self, event: E) {
        self.senders.retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Number of registered observers.
    pub fn len(&self) -> usize {
        self.senders.len()
    }

    /// Returns `true` if nobody is listening.
    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }
}

impl<E: Clone> Default for Observers<E> {
    fn default() -> Self {
        Self::new()
    }
}
