//! Top-level application state machine.
//!
//! `AppState` owns the `TrainingState`, the `SimulationClock` and the
//! `GestureInterpreter`.  It turns each landmark frame into gesture events,
//! applies them, and advances the clock once per frame.

use std::sync::mpsc::{Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use tracing::{debug, info, warn};

use hand_landmarks::{
    LandmarkFrame, LandmarkProvider, LandmarkSource, ProviderState, Readiness,
    ReplaySource, SimHandSource, SimPose, SourceError,
};
#[cfg(feature = "leap")]
use hand_landmarks::LeapSource;
use training_sim::{learning_rate_for_pinch, SimulationClock, TrainingState};

use crate::config::AppConfig;
use crate::gesture::{GestureEvent, GestureInterpreter, GestureReading};
use crate::input::SimInput;
use crate::panel::PanelSnapshot;

// ════════════════════════════════════════════════════════════════════════════
// AppEvent
// ════════════════════════════════════════════════════════════════════════════

/// Anything that mutates the training state.
#[derive(Clone, Debug, PartialEq)]
pub enum AppEvent {
    Gesture(GestureEvent),
    /// The panel's pause / resume button.
    ToggleButton,
    SetLearningRate(f64),
    NudgeLearningRate(f64),
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    training:    TrainingState,
    clock:       SimulationClock,
    interpreter: GestureInterpreter,
    reading:     GestureReading,

    /// Upper bound of the pinch distance, for mapping onto learning rate.
    pinch_threshold: f32,

    /// Last thing the user changed, for the status line.
    status: String,
}

impl AppState {
    pub fn new(cfg: &AppConfig) -> Self {
        AppState {
            training:        cfg.training.clone(),
            clock:           SimulationClock::new(cfg.clock.clone()),
            interpreter:     GestureInterpreter::new(cfg.gesture.clone()),
            reading:         GestureReading::scanning(),
            pinch_threshold: cfg.gesture.pinch_threshold,
            status:          "System Initialized...".to_string(),
        }
    }

    // ── process one AppEvent ──────────────────────────────────────────────

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Gesture(GestureEvent::Pinch { distance }) => {
                let rate = learning_rate_for_pinch(distance, self.pinch_threshold);
                self.training.set_learning_rate(rate);
                self.status = format!(
                    "PINCH d={:.3}, learning rate {:.4}",
                    distance, self.training.learning_rate
                );
            }

            AppEvent::Gesture(GestureEvent::ToggleTraining) | AppEvent::ToggleButton => {
                let on = self.training.toggle_training();
                self.status = if on {
                    format!("Training resumed at epoch {}", self.training.epoch)
                } else {
                    format!("Training paused at epoch {}", self.training.epoch)
                };
                info!(is_training = on, epoch = self.training.epoch, "training toggled");
            }

            AppEvent::SetLearningRate(rate) => {
                self.training.set_learning_rate(rate);
                self.status = format!("Learning rate set to {:.4}", self.training.learning_rate);
            }

            AppEvent::NudgeLearningRate(delta) => {
                let rate = self.training.learning_rate + delta;
                self.training.set_learning_rate(rate);
                self.status = format!("Learning rate {:.4}", self.training.learning_rate);
            }
        }
    }

    /// Interpret one detection result and apply what it signals.
    ///
    /// `source_ready` is false while the detector is still loading; such
    /// frames read as "Scanning" and carry no gestures.
    pub fn frame(&mut self, frame: &LandmarkFrame, now_ms: f64, source_ready: bool) -> &GestureReading {
        self.reading = if source_ready {
            self.interpreter.interpret(frame, now_ms)
        } else {
            GestureReading::scanning()
        };
        for event in self.reading.events() {
            self.handle_event(AppEvent::Gesture(event));
        }
        &self.reading
    }

    // ── Per-frame tick ────────────────────────────────────────────────────

    pub fn tick(&mut self) -> bool {
        self.clock.tick(&mut self.training)
    }

    // ── Accessors for the render loop ─────────────────────────────────────

    pub fn training(&self) -> &TrainingState   { &self.training }
    pub fn reading(&self)  -> &GestureReading  { &self.reading }
    pub fn is_training(&self) -> bool          { self.training.is_training }
    pub fn status(&self)   -> &str             { &self.status }

    pub fn snapshot(&self) -> PanelSnapshot {
        PanelSnapshot::new(&self.training, &self.reading)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HostSource: the landmark sources the binary can run with
// ════════════════════════════════════════════════════════════════════════════

pub enum HostSource {
    Sim(SimHandSource),
    Replay(ReplaySource),
    #[cfg(feature = "leap")]
    Leap(LeapSource),
}

impl HostSource {
    /// Apply a keyboard pose; only the simulated hand can take one.
    pub fn set_pose(&mut self, pose: SimPose) -> bool {
        match self {
            HostSource::Sim(sim) => {
                sim.set_pose(pose);
                true
            }
            _ => false,
        }
    }

    fn is_exhausted(&self) -> bool {
        matches!(self, HostSource::Replay(r) if r.is_exhausted())
    }

    fn inner(&self) -> &dyn LandmarkSource {
        match self {
            HostSource::Sim(s)    => s,
            HostSource::Replay(s) => s,
            #[cfg(feature = "leap")]
            HostSource::Leap(s)   => s,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn LandmarkSource {
        match self {
            HostSource::Sim(s)    => s,
            HostSource::Replay(s) => s,
            #[cfg(feature = "leap")]
            HostSource::Leap(s)   => s,
        }
    }
}

impl LandmarkSource for HostSource {
    fn name(&self) -> &str { self.inner().name() }
    fn initialize(&mut self) -> Result<Readiness, SourceError> { self.inner_mut().initialize() }
    fn poll_init(&mut self) -> Result<Readiness, SourceError> { self.inner_mut().poll_init() }
    fn is_ready(&self) -> bool { self.inner().is_ready() }
    fn detect(&mut self, timestamp_ms: f64) -> Result<LandmarkFrame, SourceError> {
        self.inner_mut().detect(timestamp_ms)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run(): the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Options for one run of the frame loop.
#[derive(Debug, Default)]
pub struct RunOptions {
    /// Stop after this many frames.
    pub max_frames: Option<u64>,
    /// Stop once a replayed recording has been played through.  A source
    /// that fails to start is then an error rather than an idle session.
    pub stop_when_exhausted: bool,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub frames:   u64,
    pub toggles:  u64,
    pub training: TrainingState,
}

/// Run the cooperative frame loop.
///
/// Each frame: drain keyboard input, detect, interpret, apply, tick, then
/// sleep out the rest of the frame interval.  Detection is synchronous; a
/// slow detector simply stretches the frame.
pub fn run(
    cfg:    AppConfig,
    source: HostSource,
    input:  Option<Receiver<SimInput>>,
    opts:   RunOptions,
) -> Result<RunSummary> {
    let mut provider = LandmarkProvider::new(source);
    if !provider.ensure_initialized() {
        // A recording that cannot load would otherwise read as played through.
        if opts.stop_when_exhausted && provider.state() == ProviderState::Failed {
            bail!("landmark source {} failed to initialise", provider.source().name());
        }
        warn!(
            source = provider.source().name(),
            "landmark source unavailable; gestures disabled until retried (r)"
        );
    }

    let mut app = AppState::new(&cfg);
    let mut input = input;
    let interval = Duration::from_millis(cfg.frame_interval_ms);
    let started = Instant::now();
    let mut frames = 0u64;
    let mut toggles = 0u64;
    let mut last_shown: Option<(&'static str, &'static str)> = None;
    let mut last_status = app.status().to_string();

    info!(source = provider.source().name(), "{}", app.snapshot().line());

    'frames: loop {
        let frame_start = Instant::now();

        // 1. Drain keyboard input
        if let Some(rx) = &input {
            loop {
                match rx.try_recv() {
                    Ok(SimInput::Quit) => break 'frames,
                    Ok(SimInput::Pose(pose)) => {
                        if !provider.source_mut().set_pose(pose) {
                            debug!(pose = pose.name(), "pose ignored: source is not simulated");
                        }
                    }
                    Ok(SimInput::RetrySource) => {
                        provider.ensure_initialized();
                    }
                    Ok(SimInput::ToggleTraining) => app.handle_event(AppEvent::ToggleButton),
                    Ok(SimInput::NudgeLearningRate(d)) => app.handle_event(AppEvent::NudgeLearningRate(d)),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        debug!("keyboard input closed");
                        input = None;
                        break;
                    }
                }
            }
        }

        // 2. Detect + interpret
        // Finish an initialisation still in flight; failed ones wait for `r`.
        if provider.state() == ProviderState::Initializing {
            provider.ensure_initialized();
        }
        let now_ms = started.elapsed().as_secs_f64() * 1000.0;
        let frame = provider.detect(now_ms);
        let ready = provider.is_ready();
        if app.frame(&frame, now_ms, ready).toggled {
            toggles += 1;
        }

        // 3. Per-frame logic
        app.tick();
        frames += 1;

        // 4. Publish
        if app.status() != last_status {
            debug!(status = app.status(), "status changed");
            last_status = app.status().to_string();
        }
        let snap = app.snapshot();
        let shown = (snap.headline, snap.gesture_label);
        if last_shown != Some(shown) {
            info!("{}", snap.line());
            last_shown = Some(shown);
        } else if cfg.report_every > 0 && frames % cfg.report_every == 0 {
            info!("{}", snap.line());
        }

        if opts.max_frames.map_or(false, |max| frames >= max) {
            break;
        }
        if opts.stop_when_exhausted && provider.source().is_exhausted() {
            break;
        }

        if let Some(rest) = interval.checked_sub(frame_start.elapsed()) {
            thread::sleep(rest);
        }
    }

    info!(frames, toggles, "stopped: {}", app.snapshot().line());
    Ok(RunSummary { frames, toggles, training: app.training().clone() })
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
