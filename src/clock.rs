/// Timing primitives: a `Clock` that reads the time and a `Ticker` that
/// turns it into fixed-rate simulation ticks.
///
/// The ticker knows nothing about rendering; the host asks it whether a tick
/// is due, runs the tick, and presents a snapshot afterwards.

use std::cell::Cell;
use std::time::{Duration, Instant};

use crate::entities::Timestamp;

pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Wall clock measured from the moment it was created.
#[derive(Clone, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let ms = self.origin.elapsed().as_millis();
        Timestamp::from_millis(u64::try_from(ms).unwrap_or(u64::MAX))
    }
}

/// Clock that only moves when told to.  Used for scripted runs and tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self { now: Cell::new(start.as_millis()) }
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get().saturating_add(ms));
    }

    pub fn set(&self, at: Timestamp) {
        self.now.set(at.as_millis());
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_millis(self.now.get())
    }
}

// ── Ticker ────────────────────────────────────────────────────────────────────

/// Fixed-rate tick scheduler.
///
/// At most one tick is reported per `poll`.  If the caller fell behind by
/// more than one interval, the missed ticks are dropped and the schedule
/// restarts from `now`; ticks are never replayed back-to-back.
#[derive(Clone, Debug)]
pub struct Ticker {
    interval_ms: u64,
    next_due: Option<Timestamp>,
    skipped: u64,
}

impl Ticker {
    pub fn new(interval: Duration) -> Self {
        let interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX).max(1);
        Self {
            interval_ms,
            next_due: None,
            skipped: 0,
        }
    }

    /// Begin ticking; the first tick is due one interval after `now`.
    pub fn start(&mut self, now: Timestamp) {
        self.next_due = Some(now.plus_millis(self.interval_ms));
    }

    /// Cancel the schedule.  `poll` returns false until `start` is called.
    pub fn stop(&mut self) {
        self.next_due = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// Whether a tick should run at `now`.  Consumes the due tick.
    pub fn poll(&mut self, now: Timestamp) -> bool {
        let Some(due) = self.next_due else {
            return false;
        };
        if now < due {
            return false;
        }

        let next = due.plus_millis(self.interval_ms);
        if now >= next {
            // Behind by at least a whole interval: coalesce.
            let missed = now.millis_since(due) / self.interval_ms;
            self.skipped += missed;
            log::debug!("ticker behind schedule, coalescing {missed} tick(s)");
            self.next_due = Some(now.plus_millis(self.interval_ms));
        } else {
            self.next_due = Some(next);
        }
        true
    }

    /// Time left until the next tick, zero if one is due or the ticker is
    /// stopped.
    pub fn until_next(&self, now: Timestamp) -> Duration {
        self.next_due
            .map(|due| Duration::from_millis(due.millis_since(now)))
            .unwrap_or(Duration::ZERO)
    }

    /// Total ticks dropped by coalescing since creation.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}
