//! The engine: drives the schedule on a Tokio loop with blocking workers.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info};

use signerd_core::config::SchedulerConfig;

use crate::error::{Result, SchedulerError};
use crate::schedule::Schedule;
use crate::task::{self, Task, TaskRun, WorkLock};

/// Pops due tasks every tick and executes them on blocking workers,
/// re-inserting each per its callback's returned next run.
///
/// Callbacks block by contract (the work lock is a plain mutex wait), so
/// they run on `spawn_blocking` threads, up to the configured worker cap.
pub struct SchedulerEngine<C> {
    schedule: Schedule<C>,
    context: Arc<C>,
    worklock: WorkLock,
    workers: usize,
    tick_interval_secs: u64,
}

impl<C: Send + Sync + 'static> SchedulerEngine<C> {
    pub fn new(config: &SchedulerConfig, context: Arc<C>) -> Result<Self> {
        if config.workers == 0 {
            return Err(SchedulerError::InvalidConfig(
                "workers must be at least 1".into(),
            ));
        }
        Ok(Self {
            schedule: Schedule::new(),
            context,
            worklock: Arc::new(Mutex::new(())),
            workers: config.workers,
            tick_interval_secs: config.tick_interval_secs.max(1),
        })
    }

    /// The process-wide work lock. Producers attach it to every task
    /// whose callback touches the shared backing store.
    pub fn worklock(&self) -> WorkLock {
        Arc::clone(&self.worklock)
    }

    /// Schedule a task for execution.
    pub fn schedule_task(&mut self, task: Task<C>) {
        debug!(zone = %task.owner(), stage = task.kind(), due = %task.due_date, "task scheduled");
        self.schedule.push(task);
    }

    /// Number of tasks currently waiting in the schedule.
    pub fn pending(&self) -> usize {
        self.schedule.len()
    }

    /// Request an immediate run of everything scheduled.
    pub fn flush(&mut self) {
        info!(tasks = self.schedule.len(), "flushing schedule");
        self.schedule.flush_all();
    }

    /// Main loop. Ticks until `shutdown` broadcasts `true`; in-flight
    /// callbacks finish on their blocking workers.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(workers = self.workers, "scheduler engine started");

        let (done_tx, mut done_rx) = mpsc::channel::<(Task<C>, TaskRun)>(self.workers);
        let mut in_flight = 0usize;
        let mut interval =
            tokio::time::interval(std::time::Duration::from_secs(self.tick_interval_secs));

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    in_flight += self.dispatch_due(&done_tx, self.workers - in_flight);
                }
                Some((task, run)) = done_rx.recv() => {
                    in_flight = in_flight.saturating_sub(1);
                    self.settle(task, run);
                    // A freed slot may unblock a task that was due but
                    // capped; don't wait for the next tick.
                    in_flight += self.dispatch_due(&done_tx, self.workers - in_flight);
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!(pending = self.schedule.len(), in_flight, "scheduler engine shutting down");
                        break;
                    }
                }
            }
        }
    }

    /// Hand up to `slots` due tasks to blocking workers; returns how many
    /// were dispatched.
    fn dispatch_due(
        &mut self,
        done_tx: &mpsc::Sender<(Task<C>, TaskRun)>,
        slots: usize,
    ) -> usize {
        let now = Utc::now();
        let mut dispatched = 0;
        while dispatched < slots {
            let Some(mut task) = self.schedule.pop_due(now) else {
                break;
            };
            task::log(Some(&task));
            let context = Arc::clone(&self.context);
            let tx = done_tx.clone();
            tokio::task::spawn_blocking(move || {
                let run = task.execute(context.as_ref());
                if tx.blocking_send((task, run)).is_err() {
                    error!("scheduler completion channel closed; task dropped");
                }
            });
            dispatched += 1;
        }
        dispatched
    }

    /// Apply an execution result: re-insert at the returned time or drop.
    fn settle(&mut self, mut task: Task<C>, run: TaskRun) {
        match run {
            TaskRun::At(due) => {
                task.due_date = due;
                // An immediate run satisfies any pending flush request.
                task.flush = false;
                self.schedule.push(task);
            }
            TaskRun::Done => {
                debug!(zone = %task.owner(), stage = task.kind(), "task finished, not rescheduled");
            }
        }
    }
}
