//! The schedule: a priority container deciding which task runs next.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::task::Task;

/// Min-heap of tasks in execution order (due date, stage, owner).
///
/// Flushed tasks become eligible immediately but keep their heap
/// position: flush is advisory readiness, not an ordering key.
pub struct Schedule<C> {
    heap: BinaryHeap<Reverse<Task<C>>>,
}

impl<C> Schedule<C> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Insert a task, or re-insert one after execution.
    pub fn push(&mut self, task: Task<C>) {
        self.heap.push(Reverse(task));
    }

    /// Earliest due date currently scheduled.
    pub fn first_due(&self) -> Option<DateTime<Utc>> {
        self.heap.peek().map(|Reverse(task)| task.due_date)
    }

    /// Remove and return the head task if it is ready at `now`: due, or
    /// flagged for flush.
    pub fn pop_due(&mut self, now: DateTime<Utc>) -> Option<Task<C>> {
        let ready = self
            .heap
            .peek()
            .map(|Reverse(task)| task.flush || task.due_date <= now)
            .unwrap_or(false);
        if ready {
            self.heap.pop().map(|Reverse(task)| task)
        } else {
            None
        }
    }

    /// Mark every scheduled task for immediate execution.
    pub fn flush_all(&mut self) {
        // Heap elements are immutable in place, so rebuild. The flush
        // flag is not part of the order; the shape is preserved.
        self.heap = self
            .heap
            .drain()
            .map(|Reverse(mut task)| {
                task.flush = true;
                Reverse(task)
            })
            .collect();
    }

    /// Remove and return the task with the given identity, if scheduled.
    pub fn unschedule(&mut self, class: &str, kind: &str, owner: &str) -> Option<Task<C>> {
        let mut found = None;
        self.heap = self
            .heap
            .drain()
            .filter_map(|Reverse(task)| {
                if found.is_none()
                    && task.class() == class
                    && task.kind() == kind
                    && task.owner() == owner
                {
                    found = Some(task);
                    None
                } else {
                    Some(Reverse(task))
                }
            })
            .collect();
        if found.is_some() {
            debug!(zone = %owner, stage = kind, "task unscheduled");
        }
        found
    }
}

impl<C> Default for Schedule<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{TASK_CLASS_SIGNER, TASK_READ, TASK_SIGN, TASK_SIGNCONF, TASK_WRITE};
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn task(due: i64, kind: &'static str, owner: &str) -> Task<()> {
        Task::new(owner, TASK_CLASS_SIGNER, kind, None, None, at(due))
    }

    #[test]
    fn pops_in_comparator_order() {
        let mut schedule = Schedule::new();
        schedule.push(task(300, TASK_WRITE, "example.com"));
        schedule.push(task(100, TASK_SIGN, "zone-b"));
        schedule.push(task(100, TASK_READ, "zone-z"));
        schedule.push(task(100, TASK_SIGN, "zone-a"));

        let far = at(1_000);
        let order: Vec<_> = std::iter::from_fn(|| {
            schedule
                .pop_due(far)
                .map(|t| (t.kind(), t.owner().to_string()))
        })
        .collect();

        assert_eq!(
            order,
            vec![
                (TASK_READ, "zone-z".to_string()),
                (TASK_SIGN, "zone-a".to_string()),
                (TASK_SIGN, "zone-b".to_string()),
                (TASK_WRITE, "example.com".to_string()),
            ]
        );
    }

    #[test]
    fn not_yet_due_stays_scheduled() {
        let mut schedule = Schedule::new();
        schedule.push(task(500, TASK_SIGNCONF, "example.com"));

        assert!(schedule.pop_due(at(499)).is_none());
        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule.first_due(), Some(at(500)));
        assert!(schedule.pop_due(at(500)).is_some());
    }

    #[test]
    fn flush_makes_everything_ready() {
        let mut schedule = Schedule::new();
        schedule.push(task(500, TASK_READ, "zone-a"));
        schedule.push(task(900, TASK_READ, "zone-b"));

        assert!(schedule.pop_due(at(0)).is_none());
        schedule.flush_all();

        let first = schedule.pop_due(at(0)).unwrap();
        assert!(first.flush);
        assert_eq!(first.owner(), "zone-a");
        assert!(schedule.pop_due(at(0)).is_some());
        assert!(schedule.is_empty());
    }

    #[test]
    fn unschedule_by_identity() {
        let mut schedule = Schedule::new();
        schedule.push(task(100, TASK_READ, "zone-a"));
        schedule.push(task(100, TASK_SIGN, "zone-a"));
        schedule.push(task(100, TASK_READ, "zone-b"));

        let removed = schedule
            .unschedule(TASK_CLASS_SIGNER, TASK_SIGN, "zone-a")
            .unwrap();
        assert_eq!(removed.kind(), TASK_SIGN);
        assert_eq!(schedule.len(), 2);

        assert!(schedule
            .unschedule(TASK_CLASS_SIGNER, TASK_SIGN, "zone-a")
            .is_none());
    }
}
