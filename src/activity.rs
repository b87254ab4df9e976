use itertools::Itertools;
use std::collections::VecDeque;
use std::time::Instant;

/// Sliding window over recent key-press timestamps with fidgeting detection.
///
/// Fidgeting is rhythmic, low-jitter pressing: the spread between
/// consecutive inter-press intervals stays under a threshold. It is not a
/// speed measure; slow but perfectly even pressing still counts.
#[derive(Debug)]
pub struct ActivityTracker {
    history: VecDeque<Instant>,
    window: usize,
    max_jitter_ms: u64,
}

impl ActivityTracker {
    pub fn new(window: usize, max_jitter_ms: u64) -> Self {
        Self {
            history: VecDeque::with_capacity(window),
            window: window.max(1),
            max_jitter_ms,
        }
    }

    /// Append a press timestamp, evicting the oldest beyond the window.
    pub fn record_key_press(&mut self, at: Instant) {
        if self.history.len() == self.window {
            self.history.pop_front();
        }
        self.history.push_back(at);
    }

    pub fn presses(&self) -> usize {
        self.history.len()
    }

    /// Max absolute difference between consecutive inter-press intervals,
    /// in milliseconds. None with fewer than 3 presses in the window.
    fn max_interval_jitter_ms(&self) -> Option<f64> {
        self.history
            .iter()
            .tuple_windows()
            .map(|(a, b)| b.duration_since(*a).as_secs_f64() * 1000.0)
            .tuple_windows()
            .map(|(d1, d2)| (d2 - d1).abs())
            .fold(None, |acc: Option<f64>, diff| {
                Some(acc.map_or(diff, |m| m.max(diff)))
            })
    }

    /// True when the recent press rhythm is steady enough to read as
    /// fidgeting. Too few samples reads as not fidgeting.
    pub fn is_fidgeting(&self) -> bool {
        match self.max_interval_jitter_ms() {
            Some(max_diff) => max_diff <= self.max_jitter_ms as f64,
            None => false,
        }
    }
}

impl Default for ActivityTracker {
    fn default() -> Self {
        Self::new(5, 200)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn tracker_with_deltas_ms(deltas: &[u64]) -> ActivityTracker {
        let mut tracker = ActivityTracker::default();
        let mut t = Instant::now();
        tracker.record_key_press(t);
        for &d in deltas {
            t += Duration::from_millis(d);
            tracker.record_key_press(t);
        }
        tracker
    }

    #[test]
    fn test_empty_history_is_not_fidgeting() {
        let tracker = ActivityTracker::default();
        assert!(!tracker.is_fidgeting());
    }

    #[test]
    fn test_two_presses_is_not_fidgeting() {
        let tracker = tracker_with_deltas_ms(&[100]);
        assert!(!tracker.is_fidgeting());
    }

    #[test]
    fn test_uniform_rhythm_is_fidgeting() {
        // deltas [100, 100, 100, 100] -> all interval jitter is 0
        let tracker = tracker_with_deltas_ms(&[100, 100, 100, 100]);
        assert!(tracker.is_fidgeting());
    }

    #[test]
    fn test_erratic_rhythm_is_not_fidgeting() {
        let tracker = tracker_with_deltas_ms(&[50, 900, 20, 1000]);
        assert!(!tracker.is_fidgeting());
    }

    #[test]
    fn test_slow_but_even_rhythm_is_fidgeting() {
        // fidgeting tracks rhythm, not speed
        let tracker = tracker_with_deltas_ms(&[600, 600, 600, 600]);
        assert!(tracker.is_fidgeting());
    }

    #[test]
    fn test_jitter_exactly_at_threshold_counts() {
        let tracker = tracker_with_deltas_ms(&[100, 300, 100, 300]);
        assert!(tracker.is_fidgeting());
    }

    #[test]
    fn test_jitter_just_over_threshold_does_not_count() {
        let tracker = tracker_with_deltas_ms(&[100, 301, 100, 301]);
        assert!(!tracker.is_fidgeting());
    }

    #[test]
    fn test_window_evicts_oldest() {
        // five erratic presses followed by five even ones: the erratic
        // prefix must fall out of the window
        let tracker = tracker_with_deltas_ms(&[50, 900, 20, 1000, 150, 150, 150, 150, 150]);
        assert_eq!(tracker.presses(), 5);
        assert!(tracker.is_fidgeting());
    }
}
