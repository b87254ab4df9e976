/// The anxiety scalar and its derived heart rate.
///
/// Only fidgeting lowers the level; idling between key-up and the next
/// key-down raises it through the engine's growth timer. Growth slows past
/// a soft ceiling rather than stopping, so the level can creep above it.
#[derive(Clone, Copy, Debug)]
pub struct AnxietyModel {
    level: f64,
    baseline_heart_rate: u32,
    soothe_step: f64,
    soft_ceiling: f64,
    growth_below: f64,
    growth_above: f64,
}

impl AnxietyModel {
    pub fn new(
        initial_level: f64,
        baseline_heart_rate: u32,
        soothe_step: f64,
        soft_ceiling: f64,
        growth_below: f64,
        growth_above: f64,
    ) -> Self {
        Self {
            level: initial_level,
            baseline_heart_rate,
            soothe_step,
            soft_ceiling,
            growth_below,
            growth_above,
        }
    }

    pub fn level(&self) -> f64 {
        self.level
    }

    /// Heart rate derived from the current level; never below 1 since it is
    /// used as a timer-period divisor.
    pub fn heart_rate(&self) -> u32 {
        let rate = self.baseline_heart_rate as i64 + self.level.floor() as i64;
        rate.max(1) as u32
    }

    /// Fidgeting detected on a key-down: the single decrease path.
    pub fn soothe(&mut self) {
        self.level = (self.level - self.soothe_step).max(0.0);
    }

    /// One background growth tick. Full step up to the soft ceiling,
    /// diminished step above it.
    pub fn grow(&mut self) {
        self.level += if self.level > self.soft_ceiling {
            self.growth_above
        } else {
            self.growth_below
        };
    }
}

impl Default for AnxietyModel {
    fn default() -> Self {
        Self::new(10.0, 100, 0.5, 30.0, 0.5, 0.1)
    }
}
