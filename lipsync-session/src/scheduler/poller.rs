//! Poll scheduler
//!
//! Runs an async callback on a fixed interval. Each `start` spawns one tokio
//! task driving one `tokio::time::Interval`; the returned [`TimerHandle`] is
//! the only way to stop it.
//!
//! Ticks never overlap: the next tick is only awaited once the previous
//! callback future has completed, and missed ticks are delayed rather than
//! replayed in a burst.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::time::{self, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Handle ids are unique across every scheduler in the process
static NEXT_TIMER_ID: AtomicU64 = AtomicU64::new(1);

/// Errors returned when a timer cannot be started
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    #[error("poll interval must be greater than zero")]
    InvalidInterval,

    #[error("poll timers require a running tokio runtime")]
    NoRuntime,
}

/// Identifies one running timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle {
    id: u64,
}

impl TimerHandle {
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Owner of repeating poll timers
///
/// Dropping the scheduler cancels every timer it started.
#[derive(Debug, Default)]
pub struct PollScheduler {
    timers: Mutex<HashMap<u64, CancellationToken>>,
}

impl PollScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a repeating timer
    ///
    /// `callback` runs once as soon as the spawned task is polled, then every
    /// `interval`. The caller must cancel any handle it already holds before
    /// starting another one; the scheduler does not do it on its behalf.
    ///
    /// # Errors
    /// * [`SchedulerError::InvalidInterval`] if `interval` is zero
    /// * [`SchedulerError::NoRuntime`] if called outside a tokio runtime
    pub fn start<F, Fut>(
        &self,
        interval: Duration,
        callback: F,
    ) -> Result<TimerHandle, SchedulerError>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if interval.is_zero() {
            return Err(SchedulerError::InvalidInterval);
        }

        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| SchedulerError::NoRuntime)?;

        let handle = TimerHandle {
            id: NEXT_TIMER_ID.fetch_add(1, Ordering::Relaxed),
        };
        let token = CancellationToken::new();
        self.timers().insert(handle.id, token.clone());

        debug!("Starting poll timer {} (interval: {:?})", handle.id, interval);
        runtime.spawn(run_timer(handle, interval, token, callback));

        Ok(handle)
    }

    /// Cancels a timer
    ///
    /// Returns `true` if the handle was live. Unknown or already cancelled
    /// handles are ignored. A tick that is already running finishes, but no
    /// further tick is dispatched.
    pub fn cancel(&self, handle: &TimerHandle) -> bool {
        match self.timers().remove(&handle.id) {
            Some(token) => {
                token.cancel();
                debug!("Cancelled poll timer {}", handle.id);
                true
            }
            None => false,
        }
    }

    /// Cancels every live timer, returning how many were stopped
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<(u64, CancellationToken)> = self.timers().drain().collect();
        for (id, token) in &drained {
            token.cancel();
            debug!("Cancelled poll timer {}", id);
        }
        drained.len()
    }

    /// Number of timers that have been started and not cancelled
    pub fn active_count(&self) -> usize {
        self.timers().len()
    }

    pub fn is_active(&self, handle: &TimerHandle) -> bool {
        self.timers().contains_key(&handle.id)
    }

    fn timers(&self) -> MutexGuard<'_, HashMap<u64, CancellationToken>> {
        self.timers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for PollScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

async fn run_timer<F, Fut>(
    handle: TimerHandle,
    interval: Duration,
    token: CancellationToken,
    callback: F,
) where
    F: Fn() -> Fut,
    Fut: Future<Output = ()>,
{
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        callback().await;
    }

    debug!("Poll timer {} stopped", handle.id);
}
