//! Timer-driven build progress.
//!
//! Runs a [`ProgressModel`] on a tokio interval. Progress values are
//! published on a watch channel and completion is signalled once on a
//! oneshot channel. Restarting or cancelling tears down the running timer,
//! in which case the completion sender is dropped without firing.

use std::time::Duration;

use build_core::{ProgressModel, Tick};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Snapshot of the simulated progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressUpdate {
    pub progress: f64,
    pub step_index: usize,
}

/// Receiving side of one progress run.
#[derive(Debug)]
pub struct ProgressHandle {
    /// Latest progress value.
    pub updates: watch::Receiver<ProgressUpdate>,
    /// Resolves once progress reaches 100. Errors if the run was cancelled.
    pub completion: oneshot::Receiver<()>,
}

impl ProgressHandle {
    pub fn current(&self) -> ProgressUpdate {
        *self.updates.borrow()
    }
}

struct Run {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Drives simulated progress over a fixed list of step labels.
pub struct ProgressDriver {
    steps: Vec<String>,
    tick: Duration,
    parent: CancellationToken,
    run: Option<Run>,
}

impl ProgressDriver {
    /// Create a driver for the given step labels and tick interval.
    ///
    /// Runs are children of `parent`, so cancelling it stops any run.
    pub fn new(steps: Vec<String>, tick: Duration, parent: CancellationToken) -> Self {
        Self {
            steps,
            tick,
            parent,
            run: None,
        }
    }

    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    /// Label for a step index, clamped to the last step.
    pub fn step_label(&self, index: usize) -> Option<&str> {
        let last = self.steps.len().checked_sub(1)?;
        self.steps.get(index.min(last)).map(String::as_str)
    }

    /// Whether a run is in progress.
    pub fn is_running(&self) -> bool {
        self.run.as_ref().is_some_and(|run| !run.task.is_finished())
    }

    /// Start a fresh run at zero, stopping any previous one.
    pub fn start(&mut self) -> ProgressHandle {
        self.cancel();

        let mut model = ProgressModel::new(self.steps.len());
        let (updates_tx, updates_rx) = watch::channel(ProgressUpdate {
            progress: 0.0,
            step_index: 0,
        });
        let (done_tx, done_rx) = oneshot::channel();
        let cancel = self.parent.child_token();
        let token = cancel.clone();
        let period = self.tick;

        debug!(steps = model.step_count(), ?period, "starting build progress");

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick of a tokio interval fires immediately.
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        debug!(progress = model.progress(), "build progress cancelled");
                        return;
                    }
                    _ = interval.tick() => match model.tick() {
                        Tick::Advanced(progress) => {
                            let _ = updates_tx.send(ProgressUpdate {
                                progress,
                                step_index: model.step_index(),
                            });
                        }
                        Tick::Completed => {
                            let _ = updates_tx.send(ProgressUpdate {
                                progress: model.progress(),
                                step_index: model.step_index(),
                            });
                            let _ = done_tx.send(());
                            debug!("build progress complete");
                            return;
                        }
                        Tick::Idle => return,
                    },
                }
            }
        });

        self.run = Some(Run { cancel, task });
        ProgressHandle {
            updates: updates_rx,
            completion: done_rx,
        }
    }

    /// Stop the running timer, if any.
    pub fn cancel(&mut self) {
        if let Some(run) = self.run.take() {
            run.cancel.cancel();
        }
    }
}

impl Drop for ProgressDriver {
    fn drop(&mut self) {
        self.cancel();
    }
}
