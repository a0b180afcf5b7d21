//! Application configuration, loadable from a JSON file.
//!
//! Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```json
//! { "gesture": { "toggle_cooldown_ms": 750 }, "frame_interval_ms": 33 }
//! ```

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use training_sim::{ClockConfig, TrainingState, MAX_LEARNING_RATE, MIN_LEARNING_RATE};

/// Highest accuracy a simulated run may report.
const MAX_ACCURACY: f64 = 0.99;

use crate::gesture::GestureConfig;

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub gesture:           GestureConfig,
    pub clock:             ClockConfig,
    /// State the session starts in.
    pub training:          TrainingState,
    /// Target frame period of the host loop (ms); 16 ≈ 60 fps.
    pub frame_interval_ms: u64,
    /// Log a metrics line every this many frames (0 disables).
    pub report_every:      u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            gesture:           GestureConfig::default(),
            clock:             ClockConfig::default(),
            training:          TrainingState::default(),
            frame_interval_ms: 16,
            report_every:      120,
        }
    }
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let cfg: AppConfig = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.gesture.pinch_threshold > 0.0) {
            return Err(ConfigError::Invalid("gesture.pinch_threshold must be positive".into()));
        }
        if self.frame_interval_ms == 0 {
            return Err(ConfigError::Invalid("frame_interval_ms must be at least 1".into()));
        }
        let cooldown = self.gesture.toggle_cooldown_ms;
        if !cooldown.is_finite() || cooldown < 0.0 {
            return Err(ConfigError::Invalid(
                "gesture.toggle_cooldown_ms must be finite and non-negative".into(),
            ));
        }

        let c = &self.clock;
        if !(0.0..=1.0).contains(&c.accuracy_rate) || !(0.0..=1.0).contains(&c.loss_decay) {
            return Err(ConfigError::Invalid("clock rates must lie in [0, 1]".into()));
        }
        if !(0.0..=MAX_ACCURACY).contains(&c.accuracy_ceiling) {
            return Err(ConfigError::Invalid(format!(
                "clock.accuracy_ceiling must lie in [0, {}]", MAX_ACCURACY
            )));
        }
        if !(c.loss_floor >= 0.0) || !c.loss_floor.is_finite() {
            return Err(ConfigError::Invalid("clock.loss_floor must be non-negative".into()));
        }

        // The session must start inside the region the clock moves through.
        let t = &self.training;
        if !(MIN_LEARNING_RATE..=MAX_LEARNING_RATE).contains(&t.learning_rate) {
            return Err(ConfigError::Invalid(format!(
                "training.learning_rate must lie in [{}, {}]",
                MIN_LEARNING_RATE, MAX_LEARNING_RATE
            )));
        }
        if !(0.0..=c.accuracy_ceiling).contains(&t.accuracy) {
            return Err(ConfigError::Invalid(
                "training.accuracy must lie in [0, clock.accuracy_ceiling]".into(),
            ));
        }
        if !(t.loss >= c.loss_floor) || !t.loss.is_finite() {
            return Err(ConfigError::Invalid(
                "training.loss must be finite and at least clock.loss_floor".into(),
            ));
        }
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ConfigError
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Parse(serde_json::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e)      => write!(f, "cannot read config: {}", e),
            ConfigError::Parse(e)   => write!(f, "cannot parse config: {}", e),
            ConfigError::Invalid(m) => write!(f, "invalid config: {}", m),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e)    => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<io::Error> for ConfigError {
    fn from(e: io::Error) -> Self { ConfigError::Io(e) }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self { ConfigError::Parse(e) }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
