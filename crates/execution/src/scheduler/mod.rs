//! Cancellable polling for the dashboard reconcilers.
//!
//! A poller runs its task once immediately, then on a fixed period. It also
//! runs immediately (and restarts the period) when its trigger fires, which is
//! how session changes and manual refreshes are wired in. Cycles never
//! overlap: the loop awaits each cycle before looking at the clock again, and
//! ticks missed while a cycle was running are skipped.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info};

/// Default period of the balance cycle.
pub const BALANCE_POLL_INTERVAL: Duration = Duration::from_secs(10);
/// Default period of the activity cycle.
pub const ACTIVITY_POLL_INTERVAL: Duration = Duration::from_secs(15);

/// Work driven by a [`Poller`].
#[async_trait]
pub trait PollTask: Send + Sync + 'static {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Runs one cycle. Failures are handled inside the task.
    async fn run_cycle(&self);
}

/// Builder for a polling loop.
pub struct Poller<T: PollTask> {
    task: Arc<T>,
    period: Duration,
}

impl<T: PollTask> Poller<T> {
    /// Creates a poller running `task` every `period`.
    pub fn new(task: Arc<T>, period: Duration) -> Self {
        Self { task, period }
    }

    /// Starts the loop without an external trigger.
    pub fn spawn(self) -> PollHandle {
        self.spawn_inner::<()>(None)
    }

    /// Starts the loop, re-running whenever `trigger` observes a change.
    pub fn spawn_with_trigger<S>(self, trigger: watch::Receiver<S>) -> PollHandle
    where
        S: Send + Sync + 'static,
    {
        self.spawn_inner(Some(trigger))
    }

    fn spawn_inner<S>(self, mut trigger: Option<watch::Receiver<S>>) -> PollHandle
    where
        S: Send + Sync + 'static,
    {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let wake = Arc::new(Notify::new());
        let wake_rx = wake.clone();
        let Poller { task, period } = self;

        info!(task = task.name(), period_ms = period.as_millis() as u64, "Starting poller");

        let join = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    _ = &mut stop_rx => break,
                    changed = next_change(&mut trigger) => {
                        if !changed {
                            trigger = None;
                            continue;
                        }
                        debug!(task = task.name(), "Dependency changed, running now");
                        ticker.reset();
                    }
                    _ = wake_rx.notified() => {
                        debug!(task = task.name(), "Manual refresh requested");
                        ticker.reset();
                    }
                    _ = ticker.tick() => {}
                }

                task.run_cycle().await;
            }

            info!(task = task.name(), "Poller stopped");
        });

        PollHandle {
            stop: Some(stop_tx),
            wake,
            join: Some(join),
        }
    }
}

async fn next_change<S>(trigger: &mut Option<watch::Receiver<S>>) -> bool {
    match trigger {
        Some(rx) => rx.changed().await.is_ok(),
        None => std::future::pending().await,
    }
}

/// Disposer for a running poller. Dropping it aborts the loop.
pub struct PollHandle {
    stop: Option<oneshot::Sender<()>>,
    wake: Arc<Notify>,
    join: Option<JoinHandle<()>>,
}

impl PollHandle {
    /// Requests an immediate cycle.
    pub fn refresh_now(&self) {
        self.wake.notify_one();
    }

    /// True while the loop is alive.
    pub fn is_running(&self) -> bool {
        self.join.as_ref().is_some_and(|j| !j.is_finished())
    }

    /// Lets the in-flight cycle finish, then stops the loop.
    pub async fn stop(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(join) = self.join.take() {
            let _ = join.await;
        }
    }

    /// Stops the loop at once, abandoning any in-flight cycle. No cycle runs
    /// after this returns.
    pub async fn cancel(mut self) {
        if let Some(join) = self.join.take() {
            join.abort();
            let _ = join.await;
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        if let Some(join) = self.join.take() {
            join.abort();
        }
    }
}
