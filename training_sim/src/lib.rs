//! # training_sim
//!
//! A fake training run for the visualiser: nothing is learned, the numbers
//! just drift the way a healthy run's numbers would.
//!
//! * [`TrainingState`]: the observable fields (epoch, accuracy, loss,
//!   learning rate, running flag).
//! * [`SimulationClock`]: advances the state one step per host tick while
//!   training is active.  It owns no timer; the host's frame loop calls
//!   [`SimulationClock::tick`].
//!
//! While active, accuracy closes 0.1 % of its gap to the ceiling and loss
//! decays 0.5 % per tick, so after `T` ticks from `(a₀, l₀)`:
//!
//! ```text
//! accuracy = 0.99 − (0.99 − a₀)·0.999^T
//! loss     = max(0.01, l₀·0.995^T)
//! ```
//!
//! The learning rate is never touched by the clock; callers override it
//! with [`TrainingState::set_learning_rate`].

use serde::{Deserialize, Serialize};
use tracing::debug;

// ════════════════════════════════════════════════════════════════════════════
// Learning-rate bounds
// ════════════════════════════════════════════════════════════════════════════

pub const MIN_LEARNING_RATE: f64 = 0.0001;
pub const MAX_LEARNING_RATE: f64 = 0.1;

/// Map a pinch distance onto the learning-rate range.
///
/// Linear in `distance / threshold`: a closed pinch gives the minimum rate,
/// fingers just inside the threshold give nearly the maximum.
pub fn learning_rate_for_pinch(distance: f32, threshold: f32) -> f64 {
    if threshold <= 0.0 {
        return MIN_LEARNING_RATE;
    }
    let fraction = (distance / threshold) as f64;
    (fraction * MAX_LEARNING_RATE).clamp(MIN_LEARNING_RATE, MAX_LEARNING_RATE)
}

// ════════════════════════════════════════════════════════════════════════════
// TrainingState
// ════════════════════════════════════════════════════════════════════════════

/// The simulated run as a presentation layer sees it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingState {
    pub epoch:         u64,
    pub accuracy:      f64,
    pub loss:          f64,
    pub learning_rate: f64,
    pub is_training:   bool,
}

impl Default for TrainingState {
    fn default() -> Self {
        TrainingState {
            epoch:         0,
            accuracy:      0.1,
            loss:          0.9,
            learning_rate: 0.01,
            is_training:   false,
        }
    }
}

impl TrainingState {
    /// Override the learning rate; clamped into
    /// [`MIN_LEARNING_RATE`]..=[`MAX_LEARNING_RATE`].
    pub fn set_learning_rate(&mut self, rate: f64) {
        let clamped = if rate.is_nan() {
            self.learning_rate
        } else {
            rate.clamp(MIN_LEARNING_RATE, MAX_LEARNING_RATE)
        };
        self.learning_rate = clamped;
    }

    /// Flip the running flag; returns the new value.
    pub fn toggle_training(&mut self) -> bool {
        self.is_training = !self.is_training;
        debug!(is_training = self.is_training, "training toggled");
        self.is_training
    }

    pub fn set_training(&mut self, on: bool) {
        self.is_training = on;
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ClockConfig
// ════════════════════════════════════════════════════════════════════════════

/// Asymptotes and per-tick rates of the simulated curves.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Accuracy approaches this value and never exceeds it.
    pub accuracy_ceiling: f64,
    /// Fraction of the remaining accuracy gap closed per tick.
    pub accuracy_rate:    f64,
    /// Multiplicative loss decay per tick.
    pub loss_decay:       f64,
    /// Loss never drops below this.
    pub loss_floor:       f64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        ClockConfig {
            accuracy_ceiling: 0.99,
            accuracy_rate:    0.001,
            loss_decay:       0.995,
            loss_floor:       0.01,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimulationClock
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default)]
pub struct SimulationClock {
    config: ClockConfig,
}

impl SimulationClock {
    pub fn new(config: ClockConfig) -> Self {
        SimulationClock { config }
    }

    pub fn config(&self) -> &ClockConfig { &self.config }

    /// Advance `state` by one tick.  Returns false (and changes nothing)
    /// when training is paused.
    pub fn tick(&self, state: &mut TrainingState) -> bool {
        if !state.is_training {
            return false;
        }
        let c = &self.config;
        state.epoch += 1;
        state.accuracy += (c.accuracy_ceiling - state.accuracy) * c.accuracy_rate;
        state.loss = (state.loss * c.loss_decay).max(c.loss_floor);
        true
    }

    /// Advance `ticks` times; returns how many ticks actually ran.
    pub fn advance(&self, state: &mut TrainingState, ticks: u64) -> u64 {
        let mut ran = 0;
        for _ in 0..ticks {
            if !self.tick(state) {
                break;
            }
            ran += 1;
        }
        ran
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn running() -> TrainingState {
        TrainingState { is_training: true, ..TrainingState::default() }
    }

    #[test]
    fn paused_tick_changes_nothing() {
        let clock = SimulationClock::default();
        let mut s = TrainingState::default();
        let before = s.clone();
        assert!(!clock.tick(&mut s));
        assert_eq!(s, before);
    }

    #[test]
    fn first_tick_after_toggle() {
        let clock = SimulationClock::default();
        let mut s = TrainingState::default();
        assert!(s.toggle_training());
        clock.tick(&mut s);
        assert_eq!(s.epoch, 1);
        assert!((s.accuracy - 0.10089).abs() < 1e-9);
        assert!((s.loss - 0.8955).abs() < 1e-9);
    }

    #[test]
    fn matches_closed_form() {
        let clock = SimulationClock::default();
        for t in [1u64, 10, 250, 1000, 5000] {
            let mut s = running();
            assert_eq!(clock.advance(&mut s, t), t);
            let acc = 0.99 - (0.99 - 0.1) * 0.999f64.powi(t as i32);
            let loss = (0.9 * 0.995f64.powi(t as i32)).max(0.01);
            assert!((s.accuracy - acc).abs() < 1e-9, "t={} acc={}", t, s.accuracy);
            assert!((s.loss - loss).abs() < 1e-9, "t={} loss={}", t, s.loss);
            assert_eq!(s.epoch, t);
        }
    }

    #[test]
    fn curves_are_monotonic_and_bounded() {
        let clock = SimulationClock::default();
        let mut s = running();
        let (mut acc, mut loss) = (s.accuracy, s.loss);
        for _ in 0..20_000 {
            clock.tick(&mut s);
            assert!(s.accuracy >= acc && s.accuracy <= 0.99);
            assert!(s.loss <= loss && s.loss >= 0.01);
            acc = s.accuracy;
            loss = s.loss;
        }
        assert_eq!(s.loss, 0.01);
    }

    #[test]
    fn clock_leaves_learning_rate_alone() {
        let clock = SimulationClock::default();
        let mut s = running();
        s.set_learning_rate(0.042);
        clock.advance(&mut s, 100);
        assert_eq!(s.learning_rate, 0.042);
    }

    #[test]
    fn advance_stops_when_paused() {
        let clock = SimulationClock::default();
        let mut s = TrainingState::default();
        assert_eq!(clock.advance(&mut s, 10), 0);
        assert_eq!(s.epoch, 0);
    }

    #[test]
    fn learning_rate_is_clamped() {
        let mut s = TrainingState::default();
        s.set_learning_rate(5.0);
        assert_eq!(s.learning_rate, MAX_LEARNING_RATE);
        s.set_learning_rate(0.0);
        assert_eq!(s.learning_rate, MIN_LEARNING_RATE);
        s.set_learning_rate(f64::NAN);
        assert_eq!(s.learning_rate, MIN_LEARNING_RATE);
    }

    #[test]
    fn pinch_maps_onto_learning_rate_range() {
        assert_eq!(learning_rate_for_pinch(0.0, 0.05), MIN_LEARNING_RATE);
        assert!((learning_rate_for_pinch(0.02, 0.05) - 0.04).abs() < 1e-6);
        assert!(learning_rate_for_pinch(0.0499, 0.05) < MAX_LEARNING_RATE);
        assert_eq!(learning_rate_for_pinch(0.2, 0.05), MAX_LEARNING_RATE);
    }

    #[test]
    fn partial_config_takes_defaults() {
        let c: ClockConfig = serde_json::from_str(r#"{"loss_floor": 0.05}"#).unwrap();
        assert_eq!(c.loss_floor, 0.05);
        assert_eq!(c.accuracy_ceiling, 0.99);
    }
}
