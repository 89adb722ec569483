use crossbeam_channel::Receiver;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use tracing::{debug, info};

use super::{CancellationToken, RunEvent, Simulation, StopReason};
use crate::types::DriverConfig;

/// Drives a shared simulation step by step.
///
/// Holds only a weak reference: dropping the simulation (e.g. on reset)
/// stops the run before its next step.
pub struct AutoRunner<S: Simulation> {
    sim: Weak<Mutex<S>>,
    config: DriverConfig,
    cancel: CancellationToken,
}

impl<S: Simulation> AutoRunner<S> {
    /// Create a runner for the given simulation
    pub fn new(sim: &Arc<Mutex<S>>, config: DriverConfig) -> Self {
        Self {
            sim: Arc::downgrade(sim),
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Use an existing token, e.g. one shared with a "stop" button
    pub fn with_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run on the current thread until the simulation stops.
    ///
    /// `observer` sees every successful step. The simulation is not locked
    /// while the observer runs.
    pub fn run_blocking<F>(&self, mut observer: F) -> StopReason
    where
        F: FnMut(&S::Outcome, &S::Snapshot),
    {
        info!(interval = ?self.config.step_interval, "auto-run started");
        let mut steps = 0usize;

        let reason = loop {
            if self.cancel.is_cancelled() {
                break StopReason::Cancelled;
            }
            if matches!(self.config.max_steps, Some(max) if steps >= max) {
                break StopReason::StepLimit;
            }

            // If the simulation has been dropped, stop
            let Some(sim) = self.sim.upgrade() else {
                break StopReason::Detached;
            };

            let (outcome, snapshot) = {
                let mut guard = sim.lock();
                match guard.advance() {
                    Ok(Some(outcome)) => (outcome, guard.snapshot()),
                    Ok(None) => break StopReason::Completed,
                    Err(e) => break StopReason::Exhausted(e),
                }
            };
            drop(sim);

            steps += 1;
            debug!(step = steps, ?outcome, "auto-run step");
            observer(&outcome, &snapshot);

            if !self.config.step_interval.is_zero() {
                thread::sleep(self.config.step_interval);
            }
        };

        info!(steps, ?reason, "auto-run finished");
        reason
    }

    /// Spawn a background thread running the same loop.
    ///
    /// Every step is published on the handle's channel, followed by exactly
    /// one `RunEvent::Finished`. Dropping the receiver cancels the run.
    pub fn spawn(self) -> RunHandle<S::Outcome, S::Snapshot>
    where
        S: 'static,
    {
        let (tx, rx) = crossbeam_channel::unbounded();
        let cancel = self.cancel.clone();

        let join = thread::spawn(move || {
            let token = self.cancel.clone();
            let reason = self.run_blocking(|outcome, snapshot| {
                let event = RunEvent::Step {
                    outcome: outcome.clone(),
                    snapshot: snapshot.clone(),
                };
                if tx.send(event).is_err() {
                    token.cancel();
                }
            });
            let _ = tx.send(RunEvent::Finished(reason.clone()));
            reason
        });

        RunHandle {
            events: rx,
            cancel,
            join,
        }
    }
}

/// Handle to a run started with [`AutoRunner::spawn`]
pub struct RunHandle<O, S> {
    events: Receiver<RunEvent<O, S>>,
    cancel: CancellationToken,
    join: JoinHandle<StopReason>,
}

impl<O, S> RunHandle<O, S> {
    /// Step and completion events, in order
    pub fn events(&self) -> &Receiver<RunEvent<O, S>> {
        &self.events
    }

    /// Ask the run to stop before its next step
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Wait for the background thread and return why it stopped
    pub fn join(self) -> thread::Result<StopReason> {
        self.join.join()
    }
}

impl<O, S> std::fmt::Debug for RunHandle<O, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunHandle")
            .field("pending_events", &self.events.len())
            .field("cancelled", &self.cancel.is_cancelled())
            .field("finished", &self.join.is_finished())
            .finish()
    }
}
