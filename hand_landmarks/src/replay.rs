//! Replay recorded detections from a JSON-lines file.
//!
//! Each line is one [`LandmarkFrame`]:
//!
//! ```text
//! {"timestamp_ms": 0.0, "hands": [[{"x":0.41,"y":0.62,"z":0.0}, ...]]}
//! ```
//!
//! Recorded timestamps are ignored on playback; each `detect` call returns
//! the next recorded frame stamped with the caller's time.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::source::{LandmarkSource, Readiness, SourceError};
use crate::LandmarkFrame;

pub struct ReplaySource {
    path:    Option<PathBuf>,
    frames:  Vec<LandmarkFrame>,
    cursor:  usize,
    looping: bool,
    ready:   bool,
}

impl ReplaySource {
    /// A source that loads `path` when initialised.
    pub fn open(path: impl AsRef<Path>) -> Self {
        ReplaySource {
            path:    Some(path.as_ref().to_path_buf()),
            frames:  Vec::new(),
            cursor:  0,
            looping: false,
            ready:   false,
        }
    }

    /// A source over frames parsed from an in-memory reader.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, SourceError> {
        let frames = parse_frames(reader)?;
        Ok(ReplaySource { path: None, frames, cursor: 0, looping: false, ready: false })
    }

    /// Restart from the first frame once the recording runs out.
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn len(&self)      -> usize { self.frames.len() }
    pub fn is_empty(&self) -> bool  { self.frames.is_empty() }
    pub fn position(&self) -> usize { self.cursor }

    pub fn is_exhausted(&self) -> bool {
        !self.looping && self.cursor >= self.frames.len()
    }
}

/// Parse one frame per non-blank line, skipping lines that do not parse.
fn parse_frames<R: BufRead>(reader: R) -> Result<Vec<LandmarkFrame>, SourceError> {
    let mut frames = Vec::new();
    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<LandmarkFrame>(trimmed) {
            Ok(frame) => frames.push(frame),
            Err(e)    => warn!(line = n + 1, "skipping unreadable frame: {}", e),
        }
    }
    Ok(frames)
}

impl LandmarkSource for ReplaySource {
    fn name(&self) -> &str { "replay" }

    fn initialize(&mut self) -> Result<Readiness, SourceError> {
        if let Some(path) = &self.path {
            let file = File::open(path)?;
            self.frames = parse_frames(BufReader::new(file))?;
            info!(path = %path.display(), frames = self.frames.len(), "loaded recording");
        }
        if self.frames.is_empty() {
            return Err(SourceError::Init("recording contains no frames".into()));
        }
        self.cursor = 0;
        self.ready = true;
        Ok(Readiness::Ready)
    }

    fn is_ready(&self) -> bool { self.ready }

    fn detect(&mut self, timestamp_ms: f64) -> Result<LandmarkFrame, SourceError> {
        if !self.ready {
            return Err(SourceError::NotReady);
        }
        if self.cursor >= self.frames.len() {
            if !self.looping {
                return Ok(LandmarkFrame::empty(timestamp_ms));
            }
            self.cursor = 0;
        }
        let mut frame = self.frames[self.cursor].clone();
        self.cursor += 1;
        frame.timestamp_ms = timestamp_ms;
        Ok(frame)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const RECORDING: &str = r#"
{"timestamp_ms": 0.0, "hands": []}
{"timestamp_ms": 16.0, "hands": [[{"x":0.5,"y":0.5}]]}
not json at all
{"timestamp_ms": 32.0, "hands": [[{"x":0.1,"y":0.1}],[{"x":0.9,"y":0.9}]]}
"#;

    fn ready(src: ReplaySource) -> ReplaySource {
        let mut src = src;
        src.initialize().unwrap();
        src
    }

    #[test]
    fn bad_lines_are_skipped() {
        let src = ReplaySource::from_reader(Cursor::new(RECORDING)).unwrap();
        assert_eq!(src.len(), 3);
    }

    #[test]
    fn frames_play_in_order_with_caller_time() {
        let mut src = ready(ReplaySource::from_reader(Cursor::new(RECORDING)).unwrap());
        assert_eq!(src.detect(100.0).unwrap().hands.len(), 0);
        let f = src.detect(116.0).unwrap();
        assert_eq!(f.hands.len(), 1);
        assert_eq!(f.timestamp_ms, 116.0);
        assert_eq!(src.detect(132.0).unwrap().hands.len(), 2);
    }

    #[test]
    fn exhausted_recording_reports_no_hands() {
        let mut src = ready(ReplaySource::from_reader(Cursor::new(RECORDING)).unwrap());
        for t in 0..3 { src.detect(t as f64).unwrap(); }
        assert!(src.is_exhausted());
        assert!(src.detect(99.0).unwrap().is_empty());
    }

    #[test]
    fn looping_recording_wraps() {
        let src = ReplaySource::from_reader(Cursor::new(RECORDING)).unwrap().looping(true);
        let mut src = ready(src);
        for t in 0..3 { src.detect(t as f64).unwrap(); }
        assert!(!src.is_exhausted());
        assert_eq!(src.detect(3.0).unwrap().hands.len(), 0);
        assert_eq!(src.detect(4.0).unwrap().hands.len(), 1);
    }

    #[test]
    fn empty_recording_fails_to_initialise() {
        let mut src = ReplaySource::from_reader(Cursor::new("\n\n")).unwrap();
        assert!(matches!(src.initialize(), Err(SourceError::Init(_))));
        assert!(!src.is_ready());
    }

    #[test]
    fn missing_file_fails_with_io_error() {
        let mut src = ReplaySource::open("/definitely/not/here.jsonl");
        assert!(matches!(src.initialize(), Err(SourceError::Io(_))));
    }
}
