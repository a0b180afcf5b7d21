//! Keyboard input for simulation mode.
//!
//! Input sources run on their own thread and deliver [`SimInput`] over an
//! `mpsc` channel; the frame loop drains the channel without blocking.
//! This is the only thread besides the frame loop, and it never touches
//! application state.
//!
//! | Key | Input |
//! |---|---|
//! | `o` | Open hand in view |
//! | `p` | Pinch (optional distance, e.g. `p 0.02`) |
//! | `f` | Fist |
//! | `n` | No hand in view |
//! | `t` | Training button (pause / resume) |
//! | `+` / `-` | Nudge learning rate up / down |
//! | `r` | Retry landmark-source initialisation |
//! | `q` | Quit |

use std::io::{self, BufRead};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use hand_landmarks::SimPose;
use tracing::{debug, warn};

/// Pinch distance used when `p` is given without one.
pub const DEFAULT_PINCH: f32 = 0.02;

/// Learning-rate step for `+` / `-`.
pub const NUDGE_STEP: f64 = 0.005;

// ════════════════════════════════════════════════════════════════════════════
// SimInput
// ════════════════════════════════════════════════════════════════════════════

/// A command from the keyboard.
#[derive(Clone, Debug, PartialEq)]
pub enum SimInput {
    /// Put the simulated hand in this pose.
    Pose(SimPose),
    /// The panel's pause / resume button.
    ToggleTraining,
    /// Add this delta to the learning rate.
    NudgeLearningRate(f64),
    RetrySource,
    Quit,
}

/// Parse one line of keyboard input.
pub fn parse_command(line: &str) -> Option<SimInput> {
    let mut words = line.split_whitespace();
    let input = match words.next()? {
        "o" | "open"  => SimInput::Pose(SimPose::Open),
        "f" | "fist"  => SimInput::Pose(SimPose::Fist),
        "n" | "none"  => SimInput::Pose(SimPose::Absent),
        "p" | "pinch" => {
            let distance = match words.next() {
                Some(d) => d.parse::<f32>().ok().filter(|d| d.is_finite() && *d >= 0.0)?,
                None    => DEFAULT_PINCH,
            };
            SimInput::Pose(SimPose::Pinch { distance })
        }
        "t" | "toggle" => SimInput::ToggleTraining,
        "+"            => SimInput::NudgeLearningRate(NUDGE_STEP),
        "-"            => SimInput::NudgeLearningRate(-NUDGE_STEP),
        "r" | "retry"  => SimInput::RetrySource,
        "q" | "quit"   => SimInput::Quit,
        _ => return None,
    };
    Some(input)
}

// ════════════════════════════════════════════════════════════════════════════
// InputSource trait
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`SimInput`]s over a channel.
pub trait InputSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<SimInput>);
}

/// Spawn an input source on its own thread and return the receiving end.
pub fn spawn_input_source<I: InputSource>(source: I) -> Receiver<SimInput> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// LineInput: one command per line from any reader
// ════════════════════════════════════════════════════════════════════════════

/// Reads commands line by line until EOF, `q`, or the receiver goes away.
pub struct LineInput<R> {
    reader: R,
}

impl<R: BufRead + Send + 'static> LineInput<R> {
    pub fn new(reader: R) -> Self {
        LineInput { reader }
    }
}

/// Keyboard commands typed on the terminal.
pub fn stdin_input() -> LineInput<io::BufReader<io::Stdin>> {
    LineInput::new(io::BufReader::new(io::stdin()))
}

impl<R: BufRead + Send + 'static> InputSource for LineInput<R> {
    fn run(self: Box<Self>, tx: Sender<SimInput>) {
        for line in self.reader.lines() {
            let line = match line {
                Ok(l)  => l,
                Err(e) => {
                    warn!("keyboard input closed: {}", e);
                    return;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            let Some(input) = parse_command(&line) else {
                warn!(command = line.trim(), "unknown command (o p f n t + - r q)");
                continue;
            };
            debug!(?input, "keyboard input");
            let quit = input == SimInput::Quit;
            if tx.send(input).is_err() || quit {
                return;
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
