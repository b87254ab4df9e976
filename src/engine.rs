use crate::activity::ActivityTracker;
use crate::anxiety::AnxietyModel;
use crate::clock::{period_from_rate, Clock, PeriodicTimer, SystemClock};
use crate::config::Tuning;
use crate::document::{Document, Key, Sentence, StyleContext, Word};
use crate::heartbeat::{GradeWave, HeartbeatScheduler};
use crate::util::pick;
use rand::Rng;
use std::time::Instant;

/// Immutable view of the engine handed to the renderer once per frame.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub heading: Word,
    pub sentences: Vec<Sentence>,
    pub font_size: f64,
    pub heart_rate: u32,
    pub chars_per_second: f64,
    pub anxiety_level: f64,
}

/// One heartbeat's background text: a sampled sentence with one word flagged
/// as the visually distinct "mistake".
#[derive(Clone, Debug)]
pub struct BackgroundEmission {
    pub sentence: Sentence,
    pub mistake_index: Option<usize>,
}

/// Composition root: owns the document, the trackers and both timers.
///
/// Hosts feed it `on_key_down`/`on_key_up` in arrival order and call `tick`
/// once per frame; each call runs to completion before the next, so no
/// locking is needed. Consumers only ever get copies via [`Snapshot`] and
/// [`BackgroundEmission`].
pub struct Engine<C: Clock = SystemClock> {
    clock: C,
    tuning: Tuning,
    doc: Document,
    activity: ActivityTracker,
    anxiety: AnxietyModel,
    heartbeat: HeartbeatScheduler,
    growth: Option<PeriodicTimer>,
    latest_activity: Instant,
    session_start: Instant,
    font_size: f64,
    chars_per_second: f64,
    emissions: Vec<BackgroundEmission>,
}

impl Engine<SystemClock> {
    pub fn with_defaults() -> Self {
        Self::new(Tuning::default(), SystemClock)
    }
}

impl<C: Clock> Engine<C> {
    pub fn new(tuning: Tuning, clock: C) -> Self {
        let now = clock.now();
        let anxiety = AnxietyModel::new(
            tuning.initial_anxiety,
            tuning.baseline_heart_rate,
            tuning.soothe_step,
            tuning.growth_soft_ceiling,
            tuning.growth_step_below,
            tuning.growth_step_above,
        );
        let heartbeat = HeartbeatScheduler::new(
            tuning.heartbeat_factor_ms,
            GradeWave::new(tuning.grade_min, tuning.grade_max, tuning.grade_step),
        );
        let activity = ActivityTracker::new(tuning.fidget_window, tuning.max_fidget_jitter_ms);

        Self {
            doc: Document::new(),
            activity,
            anxiety,
            heartbeat,
            growth: None,
            latest_activity: now,
            session_start: now,
            font_size: tuning.initial_font_size,
            chars_per_second: 0.0,
            emissions: Vec::new(),
            tuning,
            clock,
        }
    }

    /// Key pressed: mutate the document, record activity, soothe on
    /// fidgeting, and suppress background growth while the key is held.
    pub fn on_key_down(&mut self, key: Key) {
        let now = self.clock.now();
        let ctx = StyleContext {
            secs_since_activity: now
                .saturating_duration_since(self.latest_activity)
                .as_secs_f64(),
            anxiety_level: self.anxiety.level(),
        };

        let mut rng = rand::thread_rng();
        self.doc.on_key(key, &ctx, &mut rng);

        self.activity.record_key_press(now);
        if self.activity.is_fidgeting() {
            self.anxiety.soothe();
        }

        // typing interrupts anxiety accumulation
        self.growth = None;
    }

    /// Key released: stamp the activity time and resume background growth.
    pub fn on_key_up(&mut self) {
        let now = self.clock.now();
        self.latest_activity = now;
        let period = period_from_rate(self.tuning.growth_factor_ms, self.anxiety.heart_rate());
        self.growth = Some(PeriodicTimer::new(period, now));
    }

    /// Per-frame update: derived metrics, growth ticks, heartbeat
    /// reconciliation and any due beats.
    pub fn tick(&mut self) {
        let now = self.clock.now();

        self.chars_per_second = self.compute_chars_per_second(now);

        if let Some(growth) = &mut self.growth {
            for _ in 0..growth.poll(now) {
                self.anxiety.grow();
            }
        }

        // heart rate is re-derived every frame; the scheduler has to see it
        // even when no anxiety event fired this frame
        let heart_rate = self.anxiety.heart_rate();
        self.heartbeat.reconcile(heart_rate, now);

        for _ in 0..self.heartbeat.poll(now) {
            self.heartbeat.beat(&mut self.doc);
            self.emit_background();
        }
    }

    fn compute_chars_per_second(&self, now: Instant) -> f64 {
        let elapsed = now
            .saturating_duration_since(self.session_start)
            .as_secs_f64();
        if elapsed <= f64::EPSILON {
            return 0.0;
        }
        self.doc.char_counter as f64 / elapsed
    }

    /// Sample a random non-empty sentence with a random "mistake" word.
    /// With nothing to sample this is a no-op.
    fn emit_background(&mut self) {
        let mut rng = rand::thread_rng();
        let sentence = {
            let candidates = self.doc.emittable_sentences();
            match pick(&mut rng, &candidates) {
                Some(s) => (*s).clone(),
                None => return,
            }
        };
        let mistake_index = Some(rng.gen_range(0..sentence.words.len()));

        self.emissions.push(BackgroundEmission {
            sentence,
            mistake_index,
        });
    }

    /// Deep copy of everything the renderer needs this frame.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            heading: self.doc.heading().clone(),
            sentences: self.doc.sentences.clone(),
            font_size: self.font_size,
            heart_rate: self.anxiety.heart_rate(),
            chars_per_second: self.chars_per_second,
            anxiety_level: self.anxiety.level(),
        }
    }

    /// Take the emissions queued since the last drain.
    pub fn drain_emissions(&mut self) -> Vec<BackgroundEmission> {
        std::mem::take(&mut self.emissions)
    }

    /// The renderer reports that the heading no longer fits; shrink one step
    /// per frame, never below 1.
    pub fn on_heading_overflow(&mut self) {
        if self.font_size > 1.0 {
            self.font_size -= 1.0;
        }
    }

    /// Cancel both periodic tasks; nothing fires after this.
    pub fn shutdown(&mut self) {
        self.heartbeat.disarm();
        self.growth = None;
    }

    pub fn heart_rate(&self) -> u32 {
        self.anxiety.heart_rate()
    }

    pub fn anxiety_level(&self) -> f64 {
        self.anxiety.level()
    }

    pub fn heartbeat_armed_rate(&self) -> Option<u32> {
        self.heartbeat.armed_rate()
    }

    pub fn growth_armed(&self) -> bool {
        self.growth.is_some()
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }
}
