//! Control-panel snapshot: the fields a renderer reads each frame, already
//! formatted the way the panel displays them.

use serde::Serialize;
use training_sim::TrainingState;

use crate::gesture::{GestureReading, GestureStatus};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PanelSnapshot {
    pub headline:       &'static str,
    pub button:         &'static str,
    pub is_training:    bool,
    pub epoch:          u64,
    pub learning_rate:  String,
    pub accuracy:       String,
    pub loss:           String,
    /// Learning-rate modulation bar label, `lr × 100` as a percentage.
    pub modulation:     String,
    /// Bar fill, `lr × 1000` percent, clamped to 100.
    pub modulation_fill: f64,
    pub gesture:        GestureStatus,
    pub gesture_label:  &'static str,
    pub gesture_active: bool,
}

impl PanelSnapshot {
    pub fn new(training: &TrainingState, reading: &GestureReading) -> Self {
        let (headline, button) = if training.is_training {
            ("Training Active", "Pause Simulation")
        } else {
            ("System Standby", "Resume Training")
        };
        PanelSnapshot {
            headline,
            button,
            is_training:     training.is_training,
            epoch:           training.epoch,
            learning_rate:   format!("{:.4}", training.learning_rate),
            accuracy:        format!("{:.1}%", training.accuracy * 100.0),
            loss:            format!("{:.4}", training.loss),
            modulation:      format!("{:.0}%", training.learning_rate * 100.0),
            modulation_fill: (training.learning_rate * 1000.0).min(100.0),
            gesture:         reading.status,
            gesture_label:   reading.status.label(),
            gesture_active:  reading.status.is_active(),
        }
    }

    /// One-line rendering for terminals and logs.
    pub fn line(&self) -> String {
        format!(
            "{:<15} | epoch {:>6} | lr {} | acc {:>6} | loss {} | {}",
            self.headline, self.epoch, self.learning_rate,
            self.accuracy, self.loss, self.gesture_label,
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standby_panel() {
        let p = PanelSnapshot::new(&TrainingState::default(), &GestureReading::scanning());
        assert_eq!(p.headline, "System Standby");
        assert_eq!(p.button, "Resume Training");
        assert_eq!(p.learning_rate, "0.0100");
        assert_eq!(p.accuracy, "10.0%");
        assert_eq!(p.loss, "0.9000");
        assert_eq!(p.modulation, "1%");
        assert_eq!(p.modulation_fill, 10.0);
        assert_eq!(p.gesture_label, "Scanning...");
        assert!(!p.gesture_active);
    }

    #[test]
    fn active_panel_formats_metrics() {
        let t = TrainingState {
            epoch: 412, accuracy: 0.87654, loss: 0.012345,
            learning_rate: 0.1, is_training: true,
        };
        let p = PanelSnapshot::new(&t, &GestureReading::no_hand());
        assert_eq!(p.headline, "Training Active");
        assert_eq!(p.button, "Pause Simulation");
        assert_eq!(p.accuracy, "87.7%");
        assert_eq!(p.loss, "0.0123");
        assert_eq!(p.modulation, "10%");
        assert_eq!(p.modulation_fill, 100.0);
        assert!(p.line().contains("epoch    412"));
    }

    #[test]
    fn serialises_for_a_renderer() {
        let p = PanelSnapshot::new(&TrainingState::default(), &GestureReading::no_hand());
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["gesture"], "no_hand");
        assert_eq!(v["gesture_label"], "No Hand Detected");
        assert_eq!(v["epoch"], 0);
    }
}
