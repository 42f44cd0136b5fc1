//! Search options and cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::board::Axis;
use super::SearchError;

/// Options for one search.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use dawgplay::search::board::Axis;
/// use dawgplay::search::config::SearchConfig;
///
/// let config = SearchConfig::new()
///     .with_time_limit(Duration::from_secs(2))
///     .with_opening_axis(Axis::Down)
///     .record_improvements(true);
/// assert!(config.records_improvements());
/// ```
#[derive(Clone, Debug, Default)]
pub struct SearchConfig {
    time_limit: Option<Duration>,
    cancel: Option<Arc<AtomicBool>>,
    record_improvements: bool,
    opening_axis: Option<Axis>,
    seed: Option<u64>,
}

impl SearchConfig {
    /// Unlimited search, no improvement log, random opening axis.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gives up once `limit` has passed since the search started.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Gives up once `flag` is set, which may happen from another thread.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Keeps every strict improvement in [`SearchOutcome::improvements`](super::moves::SearchOutcome::improvements).
    pub fn record_improvements(mut self, record: bool) -> Self {
        self.record_improvements = record;
        self
    }

    /// Plays opening moves along `axis` instead of a random one.
    pub fn with_opening_axis(mut self, axis: Axis) -> Self {
        self.opening_axis = Some(axis);
        self
    }

    /// Seeds the random opening axis choice.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// The time limit, if any.
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit
    }

    /// True if improvements are logged.
    pub fn records_improvements(&self) -> bool {
        self.record_improvements
    }

    /// The fixed opening axis, if any.
    pub fn opening_axis(&self) -> Option<Axis> {
        self.opening_axis
    }

    /// The seed for the opening axis choice, if any.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub(crate) fn stop_check(&self) -> StopCheck {
        StopCheck {
            deadline: self.time_limit.map(|limit| Instant::now() + limit),
            cancel: self.cancel.clone(),
        }
    }
}

/// Deadline and cancel flag of a running search.
#[derive(Clone, Debug)]
pub(crate) struct StopCheck {
    deadline: Option<Instant>,
    cancel: Option<Arc<AtomicBool>>,
}

impl StopCheck {
    /// Fails with `Cancelled` once the deadline passed or the flag is set.
    #[inline]
    pub(crate) fn check(&self) -> Result<(), SearchError> {
        let cancelled = self
            .cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed));
        if cancelled || self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Err(SearchError::Cancelled);
        }
        Ok(())
    }
}
