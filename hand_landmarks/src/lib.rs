//! # hand_landmarks
//!
//! The 21-point hand landmark model produced by webcam hand trackers, plus
//! the [`LandmarkSource`] capability that delivers one [`LandmarkFrame`] per
//! video frame.
//!
//! Coordinates are normalised to the source frame: `x` and `y` lie in
//! `[0, 1]`, origin top-left, **Y increasing downward**.  `z` is relative
//! depth and is carried but never interpreted here.
//!
//! ## Landmark layout
//!
//! | Index | Point | Index | Point |
//! |---|---|---|---|
//! | 0 | wrist | 9–12 | middle MCP, PIP, DIP, tip |
//! | 1–4 | thumb CMC, MCP, IP, tip | 13–16 | ring MCP, PIP, DIP, tip |
//! | 5–8 | index MCP, PIP, DIP, tip | 17–20 | pinky MCP, PIP, DIP, tip |
//!
//! ## Sources
//!
//! * [`SimHandSource`]: synthesises a hand in a chosen [`SimPose`].
//! * [`ReplaySource`]: replays recorded frames from a JSON-lines file.
//! * `LeapSource`: LeapMotion hardware (feature `leap`).
//!
//! Sources are wrapped in a [`LandmarkProvider`], which owns initialisation
//! and degrades every failure to an empty frame.

use serde::{Deserialize, Serialize};

pub mod source;
pub mod sim;
pub mod replay;
#[cfg(feature = "leap")]
pub mod leap;

pub use source::{LandmarkProvider, LandmarkSource, ProviderState, Readiness, SourceError};
pub use sim::{SimHandSource, SimPose};
pub use replay::ReplaySource;
#[cfg(feature = "leap")]
pub use leap::LeapSource;

// ════════════════════════════════════════════════════════════════════════════
// Landmark indices
// ════════════════════════════════════════════════════════════════════════════

/// Number of landmarks in a complete hand.
pub const LANDMARK_COUNT: usize = 21;

pub const WRIST:      usize = 0;
pub const THUMB_CMC:  usize = 1;
pub const THUMB_MCP:  usize = 2;
pub const THUMB_IP:   usize = 3;
pub const THUMB_TIP:  usize = 4;
pub const INDEX_MCP:  usize = 5;
pub const INDEX_PIP:  usize = 6;
pub const INDEX_DIP:  usize = 7;
pub const INDEX_TIP:  usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP:   usize = 13;
pub const RING_PIP:   usize = 14;
pub const RING_DIP:   usize = 15;
pub const RING_TIP:   usize = 16;
pub const PINKY_MCP:  usize = 17;
pub const PINKY_PIP:  usize = 18;
pub const PINKY_DIP:  usize = 19;
pub const PINKY_TIP:  usize = 20;

// ════════════════════════════════════════════════════════════════════════════
// Landmark
// ════════════════════════════════════════════════════════════════════════════

/// One detected keypoint in normalised frame coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Landmark { x, y, z }
    }

    /// Distance to `other` in the image plane, ignoring depth.
    pub fn planar_distance(&self, other: &Landmark) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandLandmarks
// ════════════════════════════════════════════════════════════════════════════

/// The ordered landmarks of one detected hand.
///
/// Serialises as a bare JSON array of points.  Nothing here enforces the
/// point count: detectors hand over whatever they produced, and consumers
/// check [`HandLandmarks::is_complete`] before indexing anatomy.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandLandmarks {
    points: Vec<Landmark>,
}

impl HandLandmarks {
    pub fn new(points: Vec<Landmark>) -> Self {
        HandLandmarks { points }
    }

    pub fn points(&self) -> &[Landmark] { &self.points }
    pub fn len(&self)    -> usize       { self.points.len() }
    pub fn is_empty(&self) -> bool      { self.points.is_empty() }

    pub fn get(&self, index: usize) -> Option<&Landmark> {
        self.points.get(index)
    }

    /// True when every anatomical index is present and every coordinate
    /// is a finite number.
    pub fn is_complete(&self) -> bool {
        self.points.len() >= LANDMARK_COUNT
            && self.points[..LANDMARK_COUNT].iter().all(Landmark::is_finite)
    }
}

impl From<Vec<Landmark>> for HandLandmarks {
    fn from(points: Vec<Landmark>) -> Self {
        HandLandmarks::new(points)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LandmarkFrame
// ════════════════════════════════════════════════════════════════════════════

/// The detector's result for one video frame: zero or more hands.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    /// Monotonic time the frame was captured, in milliseconds.
    pub timestamp_ms: f64,
    #[serde(default)]
    pub hands: Vec<HandLandmarks>,
}

impl LandmarkFrame {
    /// A frame in which nothing was detected.
    pub fn empty(timestamp_ms: f64) -> Self {
        LandmarkFrame { timestamp_ms, hands: Vec::new() }
    }

    pub fn with_hand(timestamp_ms: f64, hand: HandLandmarks) -> Self {
        LandmarkFrame { timestamp_ms, hands: vec![hand] }
    }

    pub fn is_empty(&self) -> bool { self.hands.is_empty() }

    /// The first detected hand, which is the only one gestures read.
    pub fn primary_hand(&self) -> Option<&HandLandmarks> {
        self.hands.first()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
