//! LeapMotion hardware source (feature = "leap").
//!
//! Requires the LeapC shared library installed on the system.
//!
//! LeapC reports bone joints in millimetres, Y up, centred over the device.
//! We project them onto the 21-point webcam layout by dropping depth into
//! `z` and mapping a 400 mm × 400 mm interaction box onto the unit square
//! with Y flipped, so downstream gesture code cannot tell the difference.

use leaprs::*;
use tracing::debug;

use crate::source::{LandmarkSource, Readiness, SourceError};
use crate::{HandLandmarks, Landmark, LandmarkFrame, LANDMARK_COUNT, WRIST};

// Interaction box (mm) projected onto [0,1]².
const BOX_HALF_WIDTH: f32 = 200.0;
const BOX_FLOOR:      f32 = 50.0;
const BOX_HEIGHT:     f32 = 400.0;

/// Poll timeout per detection call (ms).
const POLL_MS: u32 = 10;

#[derive(Default)]
pub struct LeapSource {
    connection: Option<Connection>,
    ready:      bool,
}

impl LeapSource {
    pub fn new() -> Self {
        LeapSource::default()
    }
}

fn project(x: f32, y: f32, z: f32) -> Landmark {
    Landmark::new(
        (x + BOX_HALF_WIDTH) / (2.0 * BOX_HALF_WIDTH),
        1.0 - (y - BOX_FLOOR) / BOX_HEIGHT,
        z / BOX_HEIGHT,
    )
}

/// Map one tracked hand to the 21-point layout.
///
/// Wrist is taken as the base of the middle metacarpal.  Each finger
/// contributes MCP, PIP, DIP, tip from its proximal, intermediate and
/// distal bones; the thumb's zero-length metacarpal gives its CMC.
fn landmarks_for(hand: &Hand) -> Option<HandLandmarks> {
    let digits: Vec<_> = hand.digits().collect();
    if digits.len() < 5 {
        return None;
    }

    let mut pts = vec![Landmark::default(); LANDMARK_COUNT];
    let w = digits[2].metacarpal().prev_joint();
    pts[WRIST] = project(w.x, w.y, w.z);

    for (finger, digit) in digits.iter().enumerate().take(5) {
        let base = 1 + finger * 4;
        let joints = [
            digit.proximal().prev_joint(),
            digit.intermediate().prev_joint(),
            digit.distal().prev_joint(),
            digit.distal().next_joint(),
        ];
        for (k, j) in joints.iter().enumerate() {
            pts[base + k] = project(j.x, j.y, j.z);
        }
    }
    Some(HandLandmarks::new(pts))
}

impl LandmarkSource for LeapSource {
    fn name(&self) -> &str { "leapmotion" }

    fn initialize(&mut self) -> Result<Readiness, SourceError> {
        let mut connection = Connection::create(ConnectionConfig::default())
            .map_err(|e| SourceError::Init(format!("LeapC connection: {:?}", e)))?;
        connection.open()
            .map_err(|e| SourceError::Init(format!("LeapMotion device: {:?}", e)))?;
        self.connection = Some(connection);
        Ok(Readiness::Pending)
    }

    /// The device is ready once the service answers a poll.
    fn poll_init(&mut self) -> Result<Readiness, SourceError> {
        let connection = self.connection.as_mut().ok_or(SourceError::NotReady)?;
        if connection.poll(POLL_MS).is_ok() {
            self.ready = true;
            return Ok(Readiness::Ready);
        }
        Ok(Readiness::Pending)
    }

    fn is_ready(&self) -> bool { self.ready }

    fn detect(&mut self, timestamp_ms: f64) -> Result<LandmarkFrame, SourceError> {
        let connection = self.connection.as_mut().ok_or(SourceError::NotReady)?;
        let msg = connection.poll(POLL_MS)
            .map_err(|e| SourceError::Detect(format!("{:?}", e)))?;

        let mut frame = LandmarkFrame::empty(timestamp_ms);
        if let Event::Tracking(tracking) = msg.event() {
            frame.hands = tracking.hands().filter_map(|h| landmarks_for(&h)).collect();
            debug!(hands = frame.hands.len(), "leap tracking frame");
        }
        Ok(frame)
    }
}
