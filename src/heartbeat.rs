use crate::clock::{period_from_rate, PeriodicTimer};
use crate::document::Document;
use std::time::{Duration, Instant};

/// Triangle wave the heartbeat walks the grade parameter along.
///
/// One shared phase for the whole document: every beat advances the phase by
/// `step` and bounces at the bounds, and the current value is assigned to
/// every character. Characters typed mid-wave join the phase on the next
/// beat instead of drifting on their own.
#[derive(Clone, Copy, Debug)]
pub struct GradeWave {
    value: f64,
    rising: bool,
    min: f64,
    max: f64,
    step: f64,
}

impl GradeWave {
    pub fn new(min: f64, max: f64, step: f64) -> Self {
        Self {
            value: 0.0,
            rising: false,
            min,
            max,
            step,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Step the phase once, reversing direction at either bound.
    pub fn advance(&mut self) -> f64 {
        if self.rising {
            self.value = (self.value + self.step).min(self.max);
            if self.value >= self.max {
                self.rising = false;
            }
        } else {
            self.value = (self.value - self.step).max(self.min);
            if self.value <= self.min {
                self.rising = true;
            }
        }
        self.value
    }
}

impl Default for GradeWave {
    fn default() -> Self {
        Self::new(-200.0, 150.0, 10.0)
    }
}

/// Periodic heartbeat whose cadence tracks the derived heart rate.
///
/// Two states: Idle (no timer) and Armed (timer at `factor_ms / heart_rate`).
/// `reconcile` must run every frame; heart rate is re-derived each frame, so
/// a change can appear without any anxiety event in between. Re-arming
/// adjusts the single timer in place, so there is never a window with zero
/// or two live timers.
#[derive(Debug)]
pub struct HeartbeatScheduler {
    factor_ms: f64,
    timer: Option<PeriodicTimer>,
    armed_rate: u32,
    wave: GradeWave,
}

impl HeartbeatScheduler {
    pub fn new(factor_ms: f64, wave: GradeWave) -> Self {
        Self {
            factor_ms,
            timer: None,
            armed_rate: 0,
            wave,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.timer.is_some()
    }

    pub fn armed_rate(&self) -> Option<u32> {
        self.timer.map(|_| self.armed_rate)
    }

    pub fn period(&self) -> Option<Duration> {
        self.timer.map(|t| t.period())
    }

    /// Arm on first sight of a heart rate, re-arm when the observed rate
    /// differs from the armed one. Returns true when an arm happened.
    pub fn reconcile(&mut self, heart_rate: u32, now: Instant) -> bool {
        match &mut self.timer {
            None => {
                let period = period_from_rate(self.factor_ms, heart_rate);
                self.timer = Some(PeriodicTimer::new(period, now));
                self.armed_rate = heart_rate;
                true
            }
            Some(timer) if self.armed_rate != heart_rate => {
                timer.set_period(period_from_rate(self.factor_ms, heart_rate), now);
                self.armed_rate = heart_rate;
                true
            }
            Some(_) => false,
        }
    }

    /// Number of beats due since the last poll. Idle schedulers never beat.
    pub fn poll(&mut self, now: Instant) -> u32 {
        self.timer.as_mut().map_or(0, |t| t.poll(now))
    }

    /// One heartbeat: advance the wave and push the new grade into every
    /// character. Returns the grade applied.
    pub fn beat(&mut self, doc: &mut Document) -> f64 {
        let grade = self.wave.advance();
        doc.set_all_grades(grade);
        grade
    }

    /// Tear the timer down (program shutdown).
    pub fn disarm(&mut self) {
        self.timer = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn scheduler() -> HeartbeatScheduler {
        HeartbeatScheduler::new(50_000.0, GradeWave::default())
    }

    #[test]
    fn test_starts_idle() {
        let s = scheduler();
        assert!(!s.is_armed());
        assert_eq!(s.armed_rate(), None);
    }

    #[test]
    fn test_first_reconcile_arms() {
        let mut s = scheduler();
        let now = Instant::now();
        assert!(s.reconcile(100, now));
        assert!(s.is_armed());
        assert_eq!(s.armed_rate(), Some(100));
        assert_eq!(s.period(), Some(Duration::from_millis(500)));
    }

    #[test]
    fn test_rearm_once_per_rate_change() {
        let mut s = scheduler();
        let now = Instant::now();

        // rate sequence [100, 110, 100] across frames: arm + 2 re-arms
        assert!(s.reconcile(100, now));
        assert!(!s.reconcile(100, now));
        assert!(s.reconcile(110, now));
        assert!(!s.reconcile(110, now));
        assert!(s.reconcile(100, now));

        // a single timer throughout
        assert!(s.is_armed());
        assert_eq!(s.armed_rate(), Some(100));
    }

    #[test]
    fn test_rearm_updates_period() {
        let mut s = scheduler();
        let now = Instant::now();
        s.reconcile(100, now);
        s.reconcile(125, now);
        assert_eq!(s.period(), Some(Duration::from_millis(400)));
    }

    #[test]
    fn test_idle_scheduler_never_beats() {
        let mut s = scheduler();
        assert_eq!(s.poll(Instant::now() + Duration::from_secs(60)), 0);
    }

    #[test]
    fn test_poll_counts_due_beats() {
        let mut s = scheduler();
        let now = Instant::now();
        s.reconcile(100, now); // 500ms period
        assert_eq!(s.poll(now + Duration::from_millis(499)), 0);
        assert_eq!(s.poll(now + Duration::from_millis(1000)), 2);
    }

    #[test]
    fn test_disarm_returns_to_idle() {
        let mut s = scheduler();
        let now = Instant::now();
        s.reconcile(100, now);
        s.disarm();
        assert!(!s.is_armed());
        assert_eq!(s.poll(now + Duration::from_secs(10)), 0);
    }

    #[test]
    fn test_wave_descends_first_and_bounces() {
        let mut wave = GradeWave::default();
        assert_eq!(wave.advance(), -10.0);
        assert_eq!(wave.advance(), -20.0);

        // walk to the lower bound
        let mut last = wave.value();
        for _ in 0..18 {
            last = wave.advance();
        }
        assert_eq!(last, -200.0);

        // bounces upward
        assert_eq!(wave.advance(), -190.0);
    }

    #[test]
    fn test_wave_bounces_at_upper_bound() {
        let mut wave = GradeWave::default();
        // full descent (20 steps) then full ascent (35 steps) reaches the top
        for _ in 0..55 {
            wave.advance();
        }
        assert_eq!(wave.value(), 150.0);
        assert_eq!(wave.advance(), 140.0);
    }

    #[test]
    fn test_wave_stays_within_bounds() {
        let mut wave = GradeWave::default();
        for _ in 0..1000 {
            let v = wave.advance();
            assert!((-200.0..=150.0).contains(&v));
        }
    }

    #[test]
    fn test_beat_applies_wave_to_document() {
        let mut s = scheduler();
        let mut doc = Document::new();
        let mut rng = rand::thread_rng();
        let ctx = crate::document::StyleContext {
            secs_since_activity: 0.0,
            anxiety_level: 10.0,
        };
        doc.on_key(crate::document::Key::Char('a'), &ctx, &mut rng);

        let grade = s.beat(&mut doc);
        assert_eq!(grade, -10.0);
        assert_eq!(doc.heading().chars[0].grade, -10.0);
    }
}
