use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Every tuning knob of the engine in one place.
///
/// Defaults reproduce the original piece; hosts can load overrides from the
/// config file or the CLI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tuning {
    /// Anxiety level at session start.
    pub initial_anxiety: f64,
    /// Heart rate at zero anxiety; `heart_rate = baseline + floor(anxiety)`.
    pub baseline_heart_rate: u32,
    /// Anxiety decrease per fidgeting key-down.
    pub soothe_step: f64,
    /// Above this level the growth tick uses the diminished step.
    pub growth_soft_ceiling: f64,
    pub growth_step_below: f64,
    pub growth_step_above: f64,
    /// Growth timer period is `growth_factor_ms / heart_rate`.
    pub growth_factor_ms: f64,
    /// Heartbeat period is `heartbeat_factor_ms / heart_rate`.
    pub heartbeat_factor_ms: f64,
    /// Key presses kept for fidgeting analysis.
    pub fidget_window: usize,
    /// Fidgeting flags when the max inter-press interval spread stays at or
    /// under this.
    pub max_fidget_jitter_ms: u64,
    pub grade_min: f64,
    pub grade_max: f64,
    pub grade_step: f64,
    pub initial_font_size: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            initial_anxiety: 10.0,
            baseline_heart_rate: 100,
            soothe_step: 0.5,
            growth_soft_ceiling: 30.0,
            growth_step_below: 0.5,
            growth_step_above: 0.1,
            growth_factor_ms: 25_000.0,
            heartbeat_factor_ms: 50_000.0,
            fidget_window: 5,
            max_fidget_jitter_ms: 200,
            grade_min: -200.0,
            grade_max: 150.0,
            grade_step: 10.0,
            initial_font_size: 160.0,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Tuning;
    fn save(&self, tuning: &Tuning) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "spiraling") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("spiraling_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Tuning {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(tuning) = serde_json::from_slice::<Tuning>(&bytes) {
                return tuning;
            }
        }
        Tuning::default()
    }

    fn save(&self, tuning: &Tuning) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(tuning).unwrap_or_default();
        fs::write(&self.path, data)
    }
}
