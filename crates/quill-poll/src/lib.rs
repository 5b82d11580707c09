//! Fixed-interval poll scheduler for quill.
//!
//! Drives the background inbox poll: fire roughly every `interval`,
//! detect when a poll ran long, and skip ahead rather than pile up
//! catch-up polls. The cadence is a lower bound — after a slow poll the
//! next one is scheduled a full interval from *now*, so a slow server
//! degrades freshness, never floods itself with back-to-back fetches.
//!
//! # Disabled mode
//!
//! With `interval` set to [`Duration::ZERO`] the scheduler is disabled
//! and [`PollScheduler::wait_for_poll`] pends forever. This lets a
//! caller keep the same `tokio::select!` shape whether polling is on or
//! off.
//!
//! # Integration
//!
//! The scheduler sits inside the poller task's `tokio::select!` loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         _ = stop_rx.changed() => break,
//!         info = scheduler.wait_for_poll() => {
//!             let messages = messenger.fetch_new().await;
//!             scheduler.record_poll_end();
//!         }
//!     }
//! }
//! ```

use std::time::{Duration, Instant};

use rand::Rng;
use tokio::time::{self, Instant as TokioInstant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for the poll scheduler.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Time between polls. [`Duration::ZERO`] disables polling
    /// entirely. Default: [`PollConfig::DEFAULT_INTERVAL`].
    pub interval: Duration,
    /// Random jitter (0–max µs) added to the *first* poll so that many
    /// clients started at the same instant don't all hit the server in
    /// lockstep.
    pub initial_jitter_us: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Self::DEFAULT_INTERVAL,
            initial_jitter_us: 50_000, // 0–50 ms default jitter
        }
    }
}

impl PollConfig {
    /// The default poll cadence: frequent enough to feel live, light
    /// enough to leave the server alone.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(2);

    /// Create a config for a specific interval with default jitter.
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            ..Default::default()
        }
    }

    /// The poll interval, or `None` when polling is disabled.
    pub fn poll_interval(&self) -> Option<Duration> {
        if self.interval.is_zero() {
            None
        } else {
            Some(self.interval)
        }
    }
}

// ---------------------------------------------------------------------------
// Poll info (returned to caller each poll)
// ---------------------------------------------------------------------------

/// Information about a due poll, returned by
/// [`PollScheduler::wait_for_poll`].
#[derive(Debug, Clone)]
pub struct PollInfo {
    /// Monotonically increasing poll number (starts at 1).
    pub poll: u64,
    /// `true` if this poll fired late (the previous one overran).
    pub overrun: bool,
    /// How many scheduled polls were skipped due to overrun (0 in
    /// normal operation).
    pub polls_skipped: u64,
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Runtime metrics for the poll scheduler.
///
/// Timing values refer to the poll work reported via
/// [`PollScheduler::record_poll_end`].
#[derive(Debug, Clone, Default)]
pub struct PollMetrics {
    /// Total polls fired.
    pub total_polls: u64,
    /// Total overruns detected.
    pub total_overruns: u64,
    /// Total scheduled polls skipped.
    pub total_skipped: u64,
    /// Smoothed average of poll execution time. Weighted toward recent
    /// polls so a single slow fetch fades out quickly.
    pub avg_poll_time: Duration,
    /// Maximum poll execution time observed.
    pub max_poll_time: Duration,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Fixed-interval poll scheduler.
///
/// One `PollScheduler` per poller task. Not a timer wheel: the caller
/// awaits [`wait_for_poll`], does the work, and calls
/// [`record_poll_end`]; the scheduler owns only the cadence.
///
/// [`wait_for_poll`]: PollScheduler::wait_for_poll
/// [`record_poll_end`]: PollScheduler::record_poll_end
pub struct PollScheduler {
    config: PollConfig,
    interval: Option<Duration>,
    poll_count: u64,
    /// When the next poll should fire (Tokio instant for `sleep_until`).
    next_poll: Option<TokioInstant>,
    /// Wall-clock instant when the last poll's work started.
    /// Set by `wait_for_poll`, consumed by `record_poll_end`.
    poll_start: Option<Instant>,
    paused: bool,
    metrics: PollMetrics,
}

impl PollScheduler {
    /// Create a new scheduler from config.
    ///
    /// The first poll is scheduled with optional jitter to spread out
    /// clients started at the same moment.
    pub fn new(config: PollConfig) -> Self {
        let interval = config.poll_interval();

        let next_poll = interval.map(|d| {
            let jitter = if config.initial_jitter_us > 0 {
                let us = rand::rng().random_range(0..config.initial_jitter_us);
                Duration::from_micros(us)
            } else {
                Duration::ZERO
            };
            TokioInstant::now() + d + jitter
        });

        if interval.is_none() {
            debug!("poll scheduler created in disabled mode (no poll loop)");
        } else {
            debug!(interval_ms = ?interval.map(|d| d.as_millis()), "poll scheduler created");
        }

        Self {
            config,
            interval,
            poll_count: 0,
            next_poll,
            poll_start: None,
            paused: false,
            metrics: PollMetrics::default(),
        }
    }

    /// Create a scheduler for a specific interval with default settings.
    pub fn with_interval(interval: Duration) -> Self {
        Self::new(PollConfig::with_interval(interval))
    }

    /// Wait until the next poll is due. Returns [`PollInfo`] for the
    /// poll.
    ///
    /// In disabled mode (`interval == ZERO`) or when paused, this
    /// future pends forever — it will never resolve on its own, but
    /// `tokio::select!` will still process other branches.
    pub async fn wait_for_poll(&mut self) -> PollInfo {
        // Disabled or paused: pend forever.
        let (next, interval) = match (self.next_poll, self.interval) {
            (Some(next), Some(interval)) if !self.paused => (next, interval),
            _ => {
                // Park here; the surrounding select! still serves its
                // other branches.
                std::future::pending::<()>().await;
                unreachable!()
            }
        };

        time::sleep_until(next).await;

        let now = TokioInstant::now();
        self.poll_count += 1;
        self.poll_start = Some(Instant::now());

        // Late by more than a tenth of the interval counts as an
        // overrun; small scheduler wobble does not.
        let late_by = now.saturating_duration_since(next);
        let overrun = late_by > interval / 10;
        let mut polls_skipped = 0u64;

        if overrun {
            polls_skipped = late_by.as_nanos() as u64 / interval.as_nanos() as u64;
            if polls_skipped > 0 {
                warn!(
                    poll = self.poll_count,
                    skipped = polls_skipped,
                    late_ms = late_by.as_secs_f64() * 1000.0,
                    "poll overrun — skipping ahead"
                );
            }
            self.metrics.total_overruns += 1;
        }

        // Always schedule from now, not from the missed deadline: one
        // fetch in flight at a time, never a catch-up burst.
        self.next_poll = Some(now + interval);

        self.metrics.total_skipped += polls_skipped;
        self.metrics.total_polls += 1;

        trace!(poll = self.poll_count, overrun, "poll due");

        PollInfo {
            poll: self.poll_count,
            overrun,
            polls_skipped,
        }
    }

    /// Record that the work for the current poll has finished.
    ///
    /// Call this after the fetch completes to feed the timing metrics.
    /// Skipping it loses the timing sample but nothing else.
    pub fn record_poll_end(&mut self) {
        let Some(start) = self.poll_start.take() else {
            return;
        };
        let elapsed = start.elapsed();

        if let Some(interval) = self.interval {
            if elapsed > interval {
                warn!(
                    poll = self.poll_count,
                    elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                    interval_ms = interval.as_secs_f64() * 1000.0,
                    "poll took longer than the interval"
                );
            }
        }

        if elapsed > self.metrics.max_poll_time {
            self.metrics.max_poll_time = elapsed;
        }
        // Smooth the average so one slow fetch doesn't dominate it.
        let alpha = 0.1;
        let prev = self.metrics.avg_poll_time.as_secs_f64();
        let curr = elapsed.as_secs_f64();
        self.metrics.avg_poll_time =
            Duration::from_secs_f64(prev * (1.0 - alpha) + curr * alpha);
    }

    /// Pause the poll loop. `wait_for_poll` pends until
    /// [`resume`](Self::resume) is called.
    ///
    /// Safe to call multiple times (idempotent).
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            debug!(poll = self.poll_count, "poll scheduler paused");
        }
    }

    /// Resume the poll loop after a pause.
    ///
    /// Resets the next-poll deadline to `now + interval` so time spent
    /// paused doesn't turn into an immediate burst of polls.
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            if let Some(interval) = self.interval {
                self.next_poll = Some(TokioInstant::now() + interval);
            }
            debug!(poll = self.poll_count, "poll scheduler resumed");
        }
    }

    /// Whether the scheduler is currently paused.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether this scheduler is disabled (interval = zero).
    pub fn is_disabled(&self) -> bool {
        self.interval.is_none()
    }

    /// Current poll count.
    pub fn poll_count(&self) -> u64 {
        self.poll_count
    }

    /// Snapshot of current metrics.
    pub fn metrics(&self) -> &PollMetrics {
        &self.metrics
    }

    /// The configured poll interval, or `None` when disabled.
    pub fn poll_interval(&self) -> Option<Duration> {
        self.interval
    }

    /// The configuration this scheduler was built from.
    pub fn config(&self) -> &PollConfig {
        &self.config
    }
}
