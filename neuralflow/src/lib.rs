//! # neuralflow
//!
//! Hand-gesture controller for a simulated neural-network training run.
//! A hand-landmark detector watches the user's hand; two gestures steer the
//! run while the numbers drift toward convergence.
//!
//! ## Gesture → Action mapping
//!
//! | Gesture | Landmarks | Action |
//! |---|---|---|
//! | Pinch (thumb tip near index tip) | 4, 8 | Set learning rate ∝ pinch distance, every frame |
//! | Fist (index, middle, ring curled) | 6/8, 10/12, 14/16 | Pause / resume training, at most once per second |
//!
//! ## Frame loop
//!
//! ```text
//! landmark source → GestureInterpreter → AppEvent → TrainingState → PanelSnapshot
//!                                                  ↑
//!                              SimulationClock::tick (while training)
//! ```
//!
//! ## Feature flags
//!
//! * (default): **Simulation mode**: keyboard commands pose a synthetic
//!   hand, or `--replay` plays back a recorded session.
//! * `leap`: **Hardware mode**: a LeapMotion controller via LeapC.
//!
//! ### Simulation keyboard commands
//!
//! See [`input`] for the full table: `o` open, `p` pinch, `f` fist,
//! `n` no hand, `t` pause / resume, `+`/`-` learning rate, `q` quit.

pub mod gesture;
pub mod config;
pub mod panel;
pub mod input;
pub mod app;
