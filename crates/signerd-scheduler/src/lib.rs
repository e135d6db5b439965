//! `signerd-scheduler` — task scheduling core of the zone-signing daemon.
//!
//! # Overview
//!
//! Every zone advances independently through a pipeline of named stages
//! (`[configure]`, `[read]`, `[sign]`, `[write]`); each pending stage is a
//! [`Task`] with an absolute due date. The [`Schedule`] orders tasks by
//! due date, then stage name, then owner; the [`engine::SchedulerEngine`]
//! pops due tasks every tick and executes them on blocking workers,
//! re-inserting each task at whatever time its callback reports next.
//!
//! # The work lock
//!
//! Tasks whose callbacks touch the shared backing store carry a handle to
//! one shared [`WorkLock`]; any two such tasks execute with mutual
//! exclusion. The wait is a plain blocking acquisition with no timeout: a
//! callback that never returns blocks its worker and, while it holds the
//! lock, every other task sharing it. That matches the store's contract
//! (it cannot tell an empty result from an error under concurrent access)
//! and is a known operational risk.

pub mod engine;
pub mod error;
pub mod schedule;
pub mod task;

pub use engine::SchedulerEngine;
pub use error::{Result, SchedulerError};
pub use schedule::Schedule;
pub use task::{Task, TaskRun, WorkLock};
