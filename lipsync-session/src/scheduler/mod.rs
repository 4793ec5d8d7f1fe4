//! Scheduler layer for the session controller
//!
//! This layer owns the repeating timers that drive status polling. The
//! controller holds at most one [`TimerHandle`] at a time and is the only
//! caller of `start`/`cancel`.

pub mod poller;

pub use poller::{PollScheduler, SchedulerError, TimerHandle};
