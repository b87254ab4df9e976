use std::cell::Cell;
use std::time::{Duration, Instant};

/// Monotonic time source for the engine.
///
/// Production code uses [`SystemClock`]; tests drive [`ManualClock`] to get
/// deterministic timing without sleeping.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Production clock backed by `Instant::now`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced clock for unit and integration tests.
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<Instant>,
}

impl ManualClock {
    pub fn new(start: Instant) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Instant::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

impl Clock for &ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// A repeating deadline with an adjustable period.
///
/// This is the one periodic-task primitive in the crate: callers poll it from
/// their tick loop and it reports how many firings have come due. Changing
/// the period re-arms the same value in place, so there is never a window
/// with zero or two live timers.
#[derive(Clone, Copy, Debug)]
pub struct PeriodicTimer {
    period: Duration,
    next_fire: Instant,
}

impl PeriodicTimer {
    pub fn new(period: Duration, now: Instant) -> Self {
        Self {
            period,
            next_fire: now + period,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Re-arm with a new period; the next deadline restarts from `now`.
    pub fn set_period(&mut self, period: Duration, now: Instant) {
        self.period = period;
        self.next_fire = now + period;
    }

    /// Count how many firings have come due up to `now` and advance past them.
    pub fn poll(&mut self, now: Instant) -> u32 {
        let mut fired = 0;
        while self.next_fire <= now {
            fired += 1;
            self.next_fire += self.period;
        }
        fired
    }
}

/// Build a timer period from a rate, guarding against a degenerate rate.
pub fn period_from_rate(factor_ms: f64, rate: u32) -> Duration {
    let rate = rate.max(1);
    Duration::from_secs_f64(factor_ms / rate as f64 / 1000.0)
}
