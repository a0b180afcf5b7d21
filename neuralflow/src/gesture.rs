//! Gesture interpretation: landmark frames in, gesture signals out.
//!
//! Two heuristics run on the first detected hand of every frame:
//!
//! * **Pinch**: thumb tip (4) and index tip (8) closer than
//!   `pinch_threshold` in the image plane.  The raw distance is emitted on
//!   every pinching frame as a continuous control signal; it is never
//!   debounced.
//! * **Fist**: index, middle and ring tips (8, 12, 16) all lower in the
//!   image than their PIP joints (6, 10, 14).  Thumb and pinky are not
//!   checked, so a hand with those three curled registers as a fist even
//!   with the thumb out.
//!
//! A fist emits [`GestureEvent::ToggleTraining`] when at least
//! `toggle_cooldown_ms` has passed since the last toggle.  The debounce is a
//! single timestamp with no release requirement: a fist held across the
//! cooldown boundary fires again, once per window.  Holding a fist for
//! `N` ms therefore toggles `floor(N / cooldown) + 1` times.
//!
//! No state besides the last toggle time survives between frames.  A frame
//! without a usable hand (none detected, too few landmarks, non-finite
//! coordinates) reports nothing at all.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use hand_landmarks::{HandLandmarks, LandmarkFrame};
use hand_landmarks::{INDEX_PIP, INDEX_TIP, MIDDLE_PIP, MIDDLE_TIP, RING_PIP, RING_TIP, THUMB_TIP};

// ════════════════════════════════════════════════════════════════════════════
// GestureConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Thumb–index distance (normalised) below which the hand is pinching.
    pub pinch_threshold:    f32,
    /// Minimum time between two toggle events (ms).
    pub toggle_cooldown_ms: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        GestureConfig {
            pinch_threshold:    0.05,
            toggle_cooldown_ms: 1000.0,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureEvent / GestureStatus / GestureReading
// ════════════════════════════════════════════════════════════════════════════

/// A gesture-derived signal for the application.
#[derive(Clone, Debug, PartialEq)]
pub enum GestureEvent {
    /// Hand is pinching; `distance` is the raw thumb–index distance.
    Pinch { distance: f32 },
    /// Fist made outside the cooldown window: flip training on/off.
    ToggleTraining,
}

/// What the vision HUD shows for the current frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureStatus {
    /// Detector still loading (or failed to load).
    Scanning,
    NoHand,
    Tracking,
    Pinching,
    Fist,
}

impl GestureStatus {
    pub fn label(&self) -> &'static str {
        match self {
            GestureStatus::Scanning => "Scanning...",
            GestureStatus::NoHand   => "No Hand Detected",
            GestureStatus::Tracking => "Tracking Hand...",
            GestureStatus::Pinching => "PINCH: Active",
            GestureStatus::Fist     => "GESTURE: Fist (Toggle)",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, GestureStatus::Pinching)
    }
}

/// Everything derived from one frame.  Rebuilt from scratch every frame.
#[derive(Clone, Debug, PartialEq)]
pub struct GestureReading {
    /// Thumb–index distance, present only while pinching.
    pub pinch_distance: Option<f32>,
    pub is_fist:        bool,
    /// True if this frame emitted a toggle.
    pub toggled:        bool,
    pub status:         GestureStatus,
}

impl GestureReading {
    fn idle(status: GestureStatus) -> Self {
        GestureReading { pinch_distance: None, is_fist: false, toggled: false, status }
    }

    /// Reading for a frame taken while the detector is unavailable.
    pub fn scanning() -> Self { Self::idle(GestureStatus::Scanning) }

    pub fn no_hand() -> Self { Self::idle(GestureStatus::NoHand) }

    /// The discrete and continuous signals this reading carries.
    pub fn events(&self) -> Vec<GestureEvent> {
        let mut events = Vec::with_capacity(2);
        if let Some(distance) = self.pinch_distance {
            events.push(GestureEvent::Pinch { distance });
        }
        if self.toggled {
            events.push(GestureEvent::ToggleTraining);
        }
        events
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Heuristics
// ════════════════════════════════════════════════════════════════════════════

/// Thumb-tip to index-tip distance in the image plane.
pub fn pinch_distance(hand: &HandLandmarks) -> Option<f32> {
    let thumb = hand.get(THUMB_TIP)?;
    let index = hand.get(INDEX_TIP)?;
    Some(thumb.planar_distance(index))
}

/// True when index, middle and ring tips all sit below their PIP joints.
pub fn is_fist(hand: &HandLandmarks) -> Option<bool> {
    let curled = |tip: usize, joint: usize| -> Option<bool> {
        Some(hand.get(tip)?.y > hand.get(joint)?.y)
    };
    Some(
        curled(INDEX_TIP, INDEX_PIP)?
            && curled(MIDDLE_TIP, MIDDLE_PIP)?
            && curled(RING_TIP, RING_PIP)?,
    )
}

// ════════════════════════════════════════════════════════════════════════════
// GestureInterpreter
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default)]
pub struct GestureInterpreter {
    config:      GestureConfig,
    /// Monotonic time (ms) of the last emitted toggle.
    last_toggle: Option<f64>,
}

impl GestureInterpreter {
    pub fn new(config: GestureConfig) -> Self {
        GestureInterpreter { config, last_toggle: None }
    }

    pub fn config(&self) -> &GestureConfig { &self.config }

    pub fn last_toggle_ms(&self) -> Option<f64> { self.last_toggle }

    /// Interpret one frame observed at monotonic time `now_ms`.
    pub fn interpret(&mut self, frame: &LandmarkFrame, now_ms: f64) -> GestureReading {
        let hand = match frame.primary_hand() {
            Some(hand) if hand.is_complete() => hand,
            Some(hand) => {
                debug!(points = hand.len(), "ignoring malformed hand");
                return GestureReading::no_hand();
            }
            None => return GestureReading::no_hand(),
        };

        // Completeness was checked above, so both heuristics resolve.
        let distance = pinch_distance(hand).unwrap_or(f32::INFINITY);
        let fist = is_fist(hand).unwrap_or(false);

        let pinch_distance = (distance < self.config.pinch_threshold).then_some(distance);
        let toggled = fist && self.try_toggle(now_ms);

        let status = if fist {
            GestureStatus::Fist
        } else if pinch_distance.is_some() {
            GestureStatus::Pinching
        } else {
            GestureStatus::Tracking
        };

        trace!(distance, fist, toggled, "interpreted frame");
        GestureReading { pinch_distance, is_fist: fist, toggled, status }
    }

    fn try_toggle(&mut self, now_ms: f64) -> bool {
        let due = match self.last_toggle {
            None       => true,
            Some(last) => now_ms - last >= self.config.toggle_cooldown_ms,
        };
        if due {
            self.last_toggle = Some(now_ms);
        }
        due
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hand_landmarks::{Landmark, SimHandSource, SimPose, LANDMARK_COUNT, INDEX_MCP};

    /// Open hand with every point at (0.5, 0.5) except what the test sets.
    fn blank_hand() -> Vec<Landmark> {
        let mut pts = vec![Landmark::new(0.5, 0.5, 0.0); LANDMARK_COUNT];
        pts[THUMB_TIP] = Landmark::new(0.2, 0.5, 0.0);
        pts[INDEX_TIP] = Landmark::new(0.5, 0.3, 0.0);
        pts[MIDDLE_TIP] = Landmark::new(0.55, 0.3, 0.0);
        pts[RING_TIP] = Landmark::new(0.6, 0.3, 0.0);
        pts
    }

    fn frame(pts: Vec<Landmark>) -> LandmarkFrame {
        LandmarkFrame::with_hand(0.0, HandLandmarks::new(pts))
    }

    fn sim(pose: SimPose) -> LandmarkFrame {
        SimHandSource::new(pose).frame_at(0.0)
    }

    fn interp() -> GestureInterpreter {
        GestureInterpreter::new(GestureConfig::default())
    }

    #[test]
    fn empty_frame_reports_nothing() {
        let r = interp().interpret(&LandmarkFrame::empty(0.0), 0.0);
        assert_eq!(r, GestureReading::no_hand());
        assert!(r.events().is_empty());
        assert_eq!(r.status.label(), "No Hand Detected");
    }

    #[test]
    fn pinch_emits_raw_distance() {
        let mut pts = blank_hand();
        pts[THUMB_TIP] = Landmark::new(0.5, 0.5, 0.0);
        pts[INDEX_TIP] = Landmark::new(0.52, 0.5, 0.0);
        let r = interp().interpret(&frame(pts), 0.0);
        let d = r.pinch_distance.expect("pinching");
        assert!((d - 0.02).abs() < 1e-6);
        assert_eq!(r.status, GestureStatus::Pinching);
        assert_eq!(r.events(), vec![GestureEvent::Pinch { distance: d }]);
    }

    #[test]
    fn pinch_switches_at_threshold() {
        let mut i = interp();
        let mut pts = blank_hand();
        pts[THUMB_TIP] = Landmark::new(0.25, 0.5, 0.0);

        pts[INDEX_TIP] = Landmark::new(0.31, 0.5, 0.0);
        assert!(i.interpret(&frame(pts.clone()), 0.0).pinch_distance.is_none());

        pts[INDEX_TIP] = Landmark::new(0.2999, 0.5, 0.0);
        assert!(i.interpret(&frame(pts), 0.0).pinch_distance.is_some());
    }

    #[test]
    fn exactly_threshold_is_idle() {
        // A 3-4-5 triangle lands on the threshold without rounding below it.
        let cfg = GestureConfig { pinch_threshold: 0.5, ..GestureConfig::default() };
        let mut i = GestureInterpreter::new(cfg);
        let mut pts = blank_hand();
        pts[THUMB_TIP] = Landmark::new(0.0, 0.0, 0.0);
        pts[INDEX_TIP] = Landmark::new(0.3, 0.4, 0.0);
        let r = i.interpret(&frame(pts), 0.0);
        assert!(r.pinch_distance.is_none());
        assert_eq!(r.status, GestureStatus::Tracking);
    }

    #[test]
    fn pinch_is_not_debounced() {
        let mut i = interp();
        let f = sim(SimPose::Pinch { distance: 0.01 });
        for t in 0..5 {
            assert!(i.interpret(&f, t as f64).pinch_distance.is_some());
        }
    }

    #[test]
    fn fist_needs_all_three_fingers() {
        let curled = |pts: &mut Vec<Landmark>, tip: usize, joint: usize| {
            pts[joint] = Landmark::new(pts[tip].x, 0.4, 0.0);
            pts[tip].y = 0.45;
        };
        let mut all = blank_hand();
        curled(&mut all, INDEX_TIP, INDEX_PIP);
        curled(&mut all, MIDDLE_TIP, MIDDLE_PIP);
        curled(&mut all, RING_TIP, RING_PIP);
        let hand = HandLandmarks::new(all.clone());
        assert_eq!(is_fist(&hand), Some(true));

        for (tip, joint) in [(INDEX_TIP, INDEX_PIP), (MIDDLE_TIP, MIDDLE_PIP), (RING_TIP, RING_PIP)] {
            let mut pts = all.clone();
            pts[tip].y = pts[joint].y - 0.05;
            assert_eq!(is_fist(&HandLandmarks::new(pts)), Some(false), "tip {}", tip);
        }
    }

    #[test]
    fn tip_level_with_joint_is_not_curled() {
        let mut pts = blank_hand();
        for (tip, joint) in [(INDEX_TIP, INDEX_PIP), (MIDDLE_TIP, MIDDLE_PIP), (RING_TIP, RING_PIP)] {
            pts[tip].y = pts[joint].y;
        }
        assert_eq!(is_fist(&HandLandmarks::new(pts)), Some(false));
    }

    #[test]
    fn thumb_is_ignored_by_fist_heuristic() {
        let mut f = sim(SimPose::Fist);
        let pts = f.hands[0].points().to_vec();
        let mut extended = pts.clone();
        extended[THUMB_TIP] = Landmark::new(0.2, 0.2, 0.0);
        f.hands[0] = HandLandmarks::new(extended);
        assert!(interp().interpret(&f, 0.0).is_fist);
    }

    #[test]
    fn fist_toggles_immediately_then_per_cooldown() {
        let mut i = interp();
        let f = sim(SimPose::Fist);
        assert!(i.interpret(&f, 5_000.0).toggled);
        assert!(!i.interpret(&f, 5_500.0).toggled);
        assert!(!i.interpret(&f, 5_999.0).toggled);
        assert!(i.interpret(&f, 6_000.0).toggled);
        assert_eq!(i.last_toggle_ms(), Some(6_000.0));
    }

    #[test]
    fn held_fist_toggle_count() {
        // One frame per millisecond over an N ms hold.
        for n in [0u32, 999, 1000, 2500, 4000] {
            let mut i = interp();
            let f = sim(SimPose::Fist);
            let count = (0..=n).filter(|&t| i.interpret(&f, t as f64).toggled).count();
            assert_eq!(count as u32, n / 1000 + 1, "hold of {} ms", n);
        }
    }

    #[test]
    fn fist_status_wins_over_pinch() {
        let mut f = sim(SimPose::Fist);
        let mut pts = f.hands[0].points().to_vec();
        pts[THUMB_TIP] = Landmark::new(pts[INDEX_TIP].x + 0.01, pts[INDEX_TIP].y, 0.0);
        f.hands[0] = HandLandmarks::new(pts);
        let r = interp().interpret(&f, 0.0);
        assert_eq!(r.status, GestureStatus::Fist);
        assert!(r.pinch_distance.is_some());
        assert_eq!(r.events().len(), 2);
    }

    #[test]
    fn nothing_carries_over_to_empty_frame() {
        let mut i = interp();
        let r = i.interpret(&sim(SimPose::Fist), 0.0);
        assert!(r.is_fist && r.toggled);
        let r = i.interpret(&sim(SimPose::Absent), 16.0);
        assert_eq!(r, GestureReading::no_hand());
    }

    #[test]
    fn malformed_hand_is_treated_as_absent() {
        let mut short = blank_hand();
        short.truncate(INDEX_MCP);
        let r = interp().interpret(&frame(short), 0.0);
        assert_eq!(r, GestureReading::no_hand());

        let mut nan = blank_hand();
        nan[RING_PIP].y = f32::NAN;
        assert_eq!(interp().interpret(&frame(nan), 0.0), GestureReading::no_hand());
    }

    #[test]
    fn only_first_hand_is_read() {
        let mut f = sim(SimPose::Open);
        f.hands.push(sim(SimPose::Fist).hands.remove(0));
        let r = interp().interpret(&f, 0.0);
        assert!(!r.is_fist);
        assert_eq!(r.status, GestureStatus::Tracking);
    }
}
