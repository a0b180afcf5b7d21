//! The landmark-source capability and the provider that owns it.
//!
//! A [`LandmarkSource`] is anything that can turn "the current video frame"
//! into a [`LandmarkFrame`].  The host never talks to a source directly; it
//! constructs one [`LandmarkProvider`] at session start and passes it by
//! reference.  The provider guards initialisation and turns every failure
//! into an empty frame, because a missed detection is a normal per-frame
//! outcome, not an exceptional one.

use std::fmt;
use std::io;

use tracing::{debug, error, info};

use crate::LandmarkFrame;

// ════════════════════════════════════════════════════════════════════════════
// SourceError
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
pub enum SourceError {
    /// The detector or capture device could not be brought up.
    Init(String),
    /// `detect` was called before initialisation completed.
    NotReady,
    /// A single detection call failed.
    Detect(String),
    /// Reading a recording or device file failed.
    Io(io::Error),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Init(msg)   => write!(f, "initialisation failed: {}", msg),
            SourceError::NotReady    => write!(f, "source is not ready"),
            SourceError::Detect(msg) => write!(f, "detection failed: {}", msg),
            SourceError::Io(e)       => write!(f, "i/o error: {}", e),
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SourceError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for SourceError {
    fn from(e: io::Error) -> Self {
        SourceError::Io(e)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LandmarkSource trait
// ════════════════════════════════════════════════════════════════════════════

/// Outcome of starting (or polling) a source's initialisation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    /// Still loading (model download, device handshake); poll again later.
    Pending,
}

/// A hand-landmark detector.
pub trait LandmarkSource {
    /// Short human-readable name used in logs.
    fn name(&self) -> &str;

    /// Begin initialisation.  Called at most once per attempt.
    fn initialize(&mut self) -> Result<Readiness, SourceError>;

    /// Check on an initialisation that returned [`Readiness::Pending`].
    fn poll_init(&mut self) -> Result<Readiness, SourceError> {
        Ok(if self.is_ready() { Readiness::Ready } else { Readiness::Pending })
    }

    fn is_ready(&self) -> bool;

    /// Run detection on the current frame.  Blocks the caller for as long
    /// as the detector takes; there is no timeout.
    fn detect(&mut self, timestamp_ms: f64) -> Result<LandmarkFrame, SourceError>;
}

impl<S: LandmarkSource + ?Sized> LandmarkSource for Box<S> {
    fn name(&self) -> &str { (**self).name() }
    fn initialize(&mut self) -> Result<Readiness, SourceError> { (**self).initialize() }
    fn poll_init(&mut self) -> Result<Readiness, SourceError> { (**self).poll_init() }
    fn is_ready(&self) -> bool { (**self).is_ready() }
    fn detect(&mut self, timestamp_ms: f64) -> Result<LandmarkFrame, SourceError> {
        (**self).detect(timestamp_ms)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LandmarkProvider
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderState {
    Uninitialized,
    /// `initialize` has been issued and has not finished; it is not issued
    /// again until this attempt resolves.
    Initializing,
    Ready,
    /// The last attempt failed.  Stays here until the caller retries.
    Failed,
}

/// Owns a [`LandmarkSource`] for the lifetime of a session.
pub struct LandmarkProvider<S> {
    source:   S,
    state:    ProviderState,
    failures: u32,
}

impl<S: LandmarkSource> LandmarkProvider<S> {
    pub fn new(source: S) -> Self {
        LandmarkProvider { source, state: ProviderState::Uninitialized, failures: 0 }
    }

    /// Drive initialisation forward; returns whether the source is ready.
    ///
    /// Idempotent: a ready provider returns immediately, and an attempt in
    /// progress is polled rather than restarted.  A failed provider starts
    /// a fresh attempt, so calling this again is how callers retry.
    pub fn ensure_initialized(&mut self) -> bool {
        let result = match self.state {
            ProviderState::Ready => return true,
            ProviderState::Initializing => self.source.poll_init(),
            ProviderState::Uninitialized | ProviderState::Failed => {
                self.state = ProviderState::Initializing;
                self.source.initialize()
            }
        };

        match result {
            Ok(Readiness::Ready) => {
                self.state = ProviderState::Ready;
                info!(source = self.source.name(), "landmark source ready");
            }
            Ok(Readiness::Pending) => {
                debug!(source = self.source.name(), "landmark source still initialising");
            }
            Err(e) => {
                self.state = ProviderState::Failed;
                self.failures += 1;
                error!(
                    source = self.source.name(),
                    attempts = self.failures,
                    "failed to initialise landmark source: {}", e
                );
            }
        }
        self.state == ProviderState::Ready
    }

    /// Detect hands in the current frame.
    ///
    /// Never fails: an unready source or a failed detection yields an
    /// empty frame.
    pub fn detect(&mut self, timestamp_ms: f64) -> LandmarkFrame {
        if self.state != ProviderState::Ready {
            return LandmarkFrame::empty(timestamp_ms);
        }
        match self.source.detect(timestamp_ms) {
            Ok(frame) => frame,
            Err(e) => {
                debug!(source = self.source.name(), "detection dropped: {}", e);
                LandmarkFrame::empty(timestamp_ms)
            }
        }
    }

    pub fn state(&self)    -> ProviderState { self.state }
    pub fn is_ready(&self) -> bool          { self.state == ProviderState::Ready }
    pub fn failures(&self) -> u32           { self.failures }
    pub fn source(&self)   -> &S            { &self.source }
    pub fn source_mut(&mut self) -> &mut S  { &mut self.source }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
