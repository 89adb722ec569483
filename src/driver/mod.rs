//! Auto-run support for both engines.
//!
//! An engine is driven one step at a time. After each step the driver hands
//! the outcome and a fresh snapshot to an observer, pauses, and checks a
//! cancellation token before taking the next one.

pub mod runner;

pub use runner::*;

use parking_lot::Mutex;
use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::types::{DriverConfig, Result, SimError};

/// A step-at-a-time simulation the driver can run.
pub trait Simulation: Send {
    /// Result of one step, surfaced to the observer
    type Outcome: Clone + Debug + Send + 'static;

    /// Renderable state after a step
    type Snapshot: Clone + Debug + Send + 'static;

    /// Perform one step.
    ///
    /// `Ok(None)` means there is nothing left to do. An error ends the run
    /// without having changed the state.
    fn advance(&mut self) -> Result<Option<Self::Outcome>>;

    fn snapshot(&self) -> Self::Snapshot;
}

/// A simulation shared between its owner and a running driver
pub type Shared<S> = Arc<Mutex<S>>;

/// Wrap a simulation so it can be handed to an [`AutoRunner`]
pub fn shared<S: Simulation>(sim: S) -> Shared<S> {
    Arc::new(Mutex::new(sim))
}

/// Cooperative cancellation flag, checked before every step
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Why an auto-run stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The simulation had nothing left to do
    Completed,

    /// The cancellation token was triggered
    Cancelled,

    /// A step was refused (e.g. no block large enough)
    Exhausted(SimError),

    /// The simulation was dropped by its owner
    Detached,

    /// `DriverConfig::max_steps` was reached
    StepLimit,
}

/// Event published by a spawned run
#[derive(Debug, Clone)]
pub enum RunEvent<O, S> {
    Step { outcome: O, snapshot: S },
    Finished(StopReason),
}

/// Extension trait to start a background auto-run on a shared simulation.
pub trait AutoRunExt<S: Simulation> {
    /// Usage:
    /// ```rust
    /// use memory_policy_sim::driver::{shared, AutoRunExt, RunEvent};
    /// use memory_policy_sim::{DriverConfig, PagingConfig, PagingSimulator};
    ///
    /// let sim = PagingSimulator::new(&PagingConfig::default(), vec![1, 2, 3]).unwrap();
    /// let sim = shared(sim);
    /// let handle = sim.auto_run(DriverConfig::instant());
    /// let steps = handle
    ///     .events()
    ///     .iter()
    ///     .take_while(|e| matches!(e, RunEvent::Step { .. }))
    ///     .count();
    /// assert_eq!(steps, 3);
    /// ```
    fn auto_run(&self, config: DriverConfig) -> RunHandle<S::Outcome, S::Snapshot>;
}

impl<S: Simulation + 'static> AutoRunExt<S> for Shared<S> {
    fn auto_run(&self, config: DriverConfig) -> RunHandle<S::Outcome, S::Snapshot> {
        AutoRunner::new(self, config).spawn()
    }
}
