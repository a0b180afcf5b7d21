//! Simulated hand: a landmark source that needs no camera.
//!
//! [`SimHandSource`] lays out a plausible right hand around a palm centre in
//! one of a few fixed poses.  The host switches poses from keyboard input,
//! which makes every gesture reachable without hardware.

use serde::{Deserialize, Serialize};

use crate::source::{LandmarkSource, Readiness, SourceError};
use crate::{HandLandmarks, Landmark, LandmarkFrame, LANDMARK_COUNT};
use crate::{INDEX_TIP, THUMB_CMC, THUMB_IP, THUMB_MCP, THUMB_TIP, WRIST};

// ════════════════════════════════════════════════════════════════════════════
// SimPose
// ════════════════════════════════════════════════════════════════════════════

/// The hand shapes the simulator can produce.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "pose", rename_all = "snake_case")]
pub enum SimPose {
    /// No hand in view.
    Absent,
    /// All fingers extended, thumb out to the side.
    Open,
    /// Open hand with the thumb tip `distance` from the index tip.
    Pinch { distance: f32 },
    /// Index, middle, ring and pinky curled, thumb folded across.
    Fist,
}

impl SimPose {
    pub fn name(&self) -> &'static str {
        match self {
            SimPose::Absent       => "absent",
            SimPose::Open         => "open",
            SimPose::Pinch { .. } => "pinch",
            SimPose::Fist         => "fist",
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Hand geometry
// ════════════════════════════════════════════════════════════════════════════

// Finger columns relative to the palm centre (index, middle, ring, pinky).
const FINGER_X: [f32; 4] = [-0.06, -0.02, 0.02, 0.06];

// Joint heights (MCP, PIP, DIP, tip) relative to the palm centre.
// Negative is up in image space.
const EXTENDED_Y: [f32; 4] = [0.0, -0.05, -0.09, -0.12];
const CURLED_Y:   [f32; 4] = [0.0, -0.03, -0.01,  0.01];

// Curled tips tuck back toward the palm.
const CURLED_Z:   [f32; 4] = [0.0, -0.01, -0.02, -0.02];

fn hand_for(pose: SimPose, cx: f32, cy: f32) -> Option<HandLandmarks> {
    let curled = match pose {
        SimPose::Absent => return None,
        SimPose::Fist   => true,
        SimPose::Open | SimPose::Pinch { .. } => false,
    };

    let mut pts = vec![Landmark::default(); LANDMARK_COUNT];
    pts[WRIST] = Landmark::new(cx, cy + 0.15, 0.0);

    for (finger, dx) in FINGER_X.iter().enumerate() {
        let base = 5 + finger * 4;
        for joint in 0..4 {
            let (dy, dz) = if curled {
                (CURLED_Y[joint], CURLED_Z[joint])
            } else {
                (EXTENDED_Y[joint], 0.0)
            };
            pts[base + joint] = Landmark::new(cx + dx, cy + dy, dz);
        }
    }

    if curled {
        // Thumb folds across the curled fingers, clear of the index tip.
        pts[THUMB_CMC] = Landmark::new(cx - 0.07, cy + 0.10, 0.0);
        pts[THUMB_MCP] = Landmark::new(cx - 0.05, cy + 0.08, -0.01);
        pts[THUMB_IP]  = Landmark::new(cx - 0.02, cy + 0.07, -0.02);
        pts[THUMB_TIP] = Landmark::new(cx,        cy + 0.06, -0.02);
    } else {
        pts[THUMB_CMC] = Landmark::new(cx - 0.08, cy + 0.10, 0.0);
        pts[THUMB_MCP] = Landmark::new(cx - 0.11, cy + 0.06, 0.0);
        pts[THUMB_IP]  = Landmark::new(cx - 0.13, cy + 0.03, 0.0);
        pts[THUMB_TIP] = Landmark::new(cx - 0.15, cy,        0.0);
    }

    if let SimPose::Pinch { distance } = pose {
        // Bring the thumb tip in horizontally beside the index tip.
        let tip = pts[INDEX_TIP];
        pts[THUMB_IP]  = Landmark::new(tip.x - distance - 0.03, tip.y + 0.04, 0.0);
        pts[THUMB_TIP] = Landmark::new(tip.x - distance, tip.y, 0.0);
    }

    Some(HandLandmarks::new(pts))
}

// ════════════════════════════════════════════════════════════════════════════
// SimHandSource
// ════════════════════════════════════════════════════════════════════════════

/// Landmark source producing a synthetic hand in the current [`SimPose`].
#[derive(Clone, Debug)]
pub struct SimHandSource {
    pose:  SimPose,
    /// Palm centre in normalised coordinates.
    palm:  (f32, f32),
    ready: bool,
}

impl Default for SimHandSource {
    fn default() -> Self {
        SimHandSource::new(SimPose::Absent)
    }
}

impl SimHandSource {
    pub fn new(pose: SimPose) -> Self {
        SimHandSource { pose, palm: (0.5, 0.5), ready: false }
    }

    pub fn pose(&self) -> SimPose { self.pose }

    pub fn set_pose(&mut self, pose: SimPose) {
        self.pose = pose;
    }

    /// Move the palm centre; clamped so every landmark stays in frame.
    pub fn set_palm(&mut self, x: f32, y: f32) {
        self.palm = (x.clamp(0.15, 0.85), y.clamp(0.15, 0.8));
    }

    /// The frame this source would report right now.
    pub fn frame_at(&self, timestamp_ms: f64) -> LandmarkFrame {
        match hand_for(self.pose, self.palm.0, self.palm.1) {
            Some(hand) => LandmarkFrame::with_hand(timestamp_ms, hand),
            None       => LandmarkFrame::empty(timestamp_ms),
        }
    }
}

impl LandmarkSource for SimHandSource {
    fn name(&self) -> &str { "simulated hand" }

    fn initialize(&mut self) -> Result<Readiness, SourceError> {
        self.ready = true;
        Ok(Readiness::Ready)
    }

    fn is_ready(&self) -> bool { self.ready }

    fn detect(&mut self, timestamp_ms: f64) -> Result<LandmarkFrame, SourceError> {
        if !self.ready {
            return Err(SourceError::NotReady);
        }
        Ok(self.frame_at(timestamp_ms))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{INDEX_PIP, MIDDLE_PIP, MIDDLE_TIP, RING_PIP, RING_TIP};

    fn hand(pose: SimPose) -> HandLandmarks {
        SimHandSource::new(pose).frame_at(0.0).hands.remove(0)
    }

    fn tip(h: &HandLandmarks, i: usize) -> Landmark { *h.get(i).unwrap() }

    #[test]
    fn absent_pose_has_no_hands() {
        assert!(SimHandSource::new(SimPose::Absent).frame_at(1.0).is_empty());
    }

    #[test]
    fn poses_are_complete_and_in_frame() {
        for pose in [SimPose::Open, SimPose::Fist, SimPose::Pinch { distance: 0.02 }] {
            let h = hand(pose);
            assert!(h.is_complete(), "{:?}", pose);
            for p in h.points() {
                assert!((0.0..=1.0).contains(&p.x) && (0.0..=1.0).contains(&p.y), "{:?}", pose);
            }
        }
    }

    #[test]
    fn open_hand_tips_above_joints() {
        let h = hand(SimPose::Open);
        assert!(tip(&h, INDEX_TIP).y < tip(&h, INDEX_PIP).y);
        assert!(tip(&h, MIDDLE_TIP).y < tip(&h, MIDDLE_PIP).y);
        assert!(tip(&h, RING_TIP).y < tip(&h, RING_PIP).y);
        assert!(tip(&h, THUMB_TIP).planar_distance(&tip(&h, INDEX_TIP)) > 0.1);
    }

    #[test]
    fn fist_tips_below_joints_with_thumb_clear() {
        let h = hand(SimPose::Fist);
        assert!(tip(&h, INDEX_TIP).y > tip(&h, INDEX_PIP).y);
        assert!(tip(&h, MIDDLE_TIP).y > tip(&h, MIDDLE_PIP).y);
        assert!(tip(&h, RING_TIP).y > tip(&h, RING_PIP).y);
        assert!(tip(&h, THUMB_TIP).planar_distance(&tip(&h, INDEX_TIP)) > 0.05);
    }

    #[test]
    fn pinch_places_thumb_at_requested_distance() {
        let h = hand(SimPose::Pinch { distance: 0.03 });
        let d = tip(&h, THUMB_TIP).planar_distance(&tip(&h, INDEX_TIP));
        assert!((d - 0.03).abs() < 1e-5);
    }

    #[test]
    fn detect_requires_initialisation() {
        let mut src = SimHandSource::new(SimPose::Open);
        assert!(matches!(src.detect(0.0), Err(SourceError::NotReady)));
        src.initialize().unwrap();
        assert_eq!(src.detect(0.0).unwrap().hands.len(), 1);
    }

    #[test]
    fn palm_is_clamped_into_frame() {
        let mut src = SimHandSource::new(SimPose::Open);
        src.set_palm(-3.0, 4.0);
        let f = src.frame_at(0.0);
        for p in f.hands[0].points() {
            assert!(p.x >= 0.0 && p.y <= 1.0);
        }
    }
}
