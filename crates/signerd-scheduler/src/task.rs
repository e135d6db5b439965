//! Tasks: the unit of deferred, zone-scoped work.

use std::any::Any;
use std::cmp::Ordering;
use std::fmt::{self, Write as _};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tracing::debug;

/// Subsystem issuing signer pipeline tasks.
pub const TASK_CLASS_SIGNER: &str = "signer";

/// Pipeline stage names. Process-wide constants; the comparator
/// tie-breaks on them lexicographically, so renaming one reorders
/// equally-due tasks.
pub const TASK_NONE: &str = "[ignore]";
pub const TASK_SIGNCONF: &str = "[configure]";
pub const TASK_READ: &str = "[read]";
pub const TASK_NSECIFY: &str = "[???]";
pub const TASK_SIGN: &str = "[sign]";
pub const TASK_WRITE: &str = "[write]";

/// Shared mutual-exclusion handle serializing access to the backing store.
///
/// Shared across every task that touches the same store; no task owns the
/// primitive, and the `Arc` keeps it alive for as long as any task
/// references it. The store cannot tell an empty result from an error
/// under concurrent access, so all callbacks touching it run under this
/// lock. Once the store backend is fixed the lock can go.
pub type WorkLock = Arc<Mutex<()>>;

/// Opaque per-task payload. Its drop logic travels with the box, so
/// release happens exactly once, when the owning task is dropped.
pub type TaskPayload = Box<dyn Any + Send>;

/// Stage callback: receives the owner name, the task's payload, and the
/// execution context, and reports when the task should run next.
pub type TaskCallback<C> =
    Box<dyn FnMut(&str, Option<&mut (dyn Any + Send)>, &C) -> TaskRun + Send>;

/// What a finished execution means for the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskRun {
    /// Run this task again at the given instant. Failure reports travel
    /// this same path: a retry-after-backoff is just a later due date.
    At(DateTime<Utc>),
    /// Finished; remove from the schedule and drop.
    Done,
}

/// A unit of deferred work bound to one zone and one pipeline stage.
///
/// Identity is owner + class + kind, not an address. `C` is the execution
/// context type; the task hands it through to the callback untouched.
///
/// `due_date`, `backoff` and `flush` belong to whichever schedule holds
/// the task; they must not be mutated concurrently with the task's own
/// execution.
pub struct Task<C> {
    owner: String,
    class: &'static str,
    kind: &'static str,
    /// Absolute time at which the task becomes eligible to run.
    pub due_date: DateTime<Utc>,
    /// Consecutive failed or deferred attempts; advanced by the callback,
    /// never by the executor.
    pub backoff: u32,
    /// Run immediately regardless of `due_date`. Advisory: consulted by
    /// the schedule and by diagnostics, never by the comparator.
    pub flush: bool,
    callback: Option<TaskCallback<C>>,
    userdata: Option<TaskPayload>,
    lock: Option<WorkLock>,
}

impl<C> Task<C> {
    /// Construct a task. The task exclusively owns `owner` after this
    /// call; `class` and `kind` must be process-lifetime constants. A
    /// task without a callback is valid but inert: it executes trivially
    /// and is never rescheduled.
    pub fn new(
        owner: impl Into<String>,
        class: &'static str,
        kind: &'static str,
        callback: Option<TaskCallback<C>>,
        userdata: Option<TaskPayload>,
        due_date: DateTime<Utc>,
    ) -> Self {
        Self {
            owner: owner.into(),
            class,
            kind,
            due_date,
            backoff: 0,
            flush: false,
            callback,
            userdata,
            lock: None,
        }
    }

    /// Attach the shared work lock; executions then serialize against
    /// every other task holding the same lock.
    pub fn with_lock(mut self, lock: WorkLock) -> Self {
        self.lock = Some(lock);
        self
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn class(&self) -> &'static str {
        self.class
    }

    /// Pipeline stage name, e.g. [`TASK_SIGN`].
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Execute the task's callback, serialized through the work lock when
    /// one is attached.
    ///
    /// The lock is held for exactly the duration of the callback call and
    /// released on every exit path, including unwinds. The executor never
    /// touches `backoff` or `flush`; advancing retry counters and
    /// clearing flush requests is the callback's and the schedule's
    /// business, which keeps this path policy-free across all stages.
    pub fn execute(&mut self, context: &C) -> TaskRun {
        let Some(callback) = self.callback.as_mut() else {
            return TaskRun::Done;
        };
        // A poisoned lock still excludes; take it over rather than wedge
        // every task sharing it behind one panicked callback.
        let _guard = self
            .lock
            .as_ref()
            .map(|lock| lock.lock().unwrap_or_else(|e| e.into_inner()));
        callback(&self.owner, self.userdata.as_deref_mut(), context)
    }

    /// One-line operator-facing description: flush state, due date,
    /// stage, owner.
    pub fn describe(&self) -> String {
        format!(
            "{} {} I will {} zone {}",
            if self.flush { "Flush" } else { "On" },
            format_due(&self.due_date, DUE_FORMAT),
            self.kind,
            self.owner
        )
    }
}

/// Log one debug line for a task, if there is one. Diagnostics never
/// fail: an absent task logs nothing, a bad due date renders as "(null)".
pub fn log<C>(task: Option<&Task<C>>) {
    if let Some(task) = task {
        debug!(target: "task", "{}", task.describe());
    }
}

/// ctime(3)-style layout, minus the trailing newline.
const DUE_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

fn format_due(due: &DateTime<Utc>, layout: &str) -> String {
    let mut out = String::new();
    match write!(out, "{}", due.format(layout)) {
        Ok(()) => out,
        // chrono reports unformattable items through fmt::Error; the
        // scheduler keeps running and logs a placeholder instead.
        Err(_) => "(null)".to_string(),
    }
}

/// Execution order: due date, then stage name, then owner, all ascending.
/// Instants are compared directly, never subtracted, keeping the order
/// total across the whole time range.
///
/// At equal due date and stage the owner tie-break systematically favours
/// zones whose names sort earlier. That bias is deliberate: external
/// tooling relies on the deterministic order, so it stays.
impl<C> Ord for Task<C> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due_date
            .cmp(&other.due_date)
            .then_with(|| self.kind.cmp(other.kind))
            .then_with(|| self.owner.cmp(&other.owner))
    }
}

impl<C> PartialOrd for Task<C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<C> PartialEq for Task<C> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<C> Eq for Task<C> {}

impl<C> fmt::Debug for Task<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("owner", &self.owner)
            .field("class", &self.class)
            .field("kind", &self.kind)
            .field("due_date", &self.due_date)
            .field("backoff", &self.backoff)
            .field("flush", &self.flush)
            .field("has_callback", &self.callback.is_some())
            .field("has_lock", &self.lock.is_some())
            .finish()
    }
}
