//! neuralflow: interactive entry point.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::info;

use hand_landmarks::{ReplaySource, SimHandSource, SimPose};
use neuralflow::app::{run, HostSource, RunOptions};
use neuralflow::config::AppConfig;
use neuralflow::input::{spawn_input_source, stdin_input};

#[derive(Parser, Debug)]
#[command(name = "neuralflow", about = "Gesture-controlled neural network training simulation")]
struct Cli {
    /// Landmark source: sim, replay, or leap
    #[arg(long, default_value = "sim")]
    source: String,

    /// JSON-lines recording to play back (implies --source replay)
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Restart the recording when it runs out
    #[arg(long)]
    loop_replay: bool,

    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stop after N frames
    #[arg(long)]
    frames: Option<u64>,

    /// Start with training already running
    #[arg(long)]
    quick: bool,

    /// Do not read keyboard commands from stdin
    #[arg(long)]
    no_keyboard: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "neuralflow=info,hand_landmarks=info,training_sim=warn".into()),
        )
        .init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║          NeuralFlow — Gesture Training Controller            ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    let mut cfg = match &cli.config {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => AppConfig::default(),
    };
    if cli.quick {
        cfg.training.is_training = true;
    }

    let source_name = if cli.replay.is_some() { "replay" } else { cli.source.as_str() };
    let source = match source_name {
        "sim" => {
            println!("  Mode: Keyboard simulation  (o open, p pinch, f fist, n none, t toggle, q quit)");
            HostSource::Sim(SimHandSource::new(SimPose::Open))
        }
        "replay" => {
            let Some(path) = &cli.replay else {
                bail!("--source replay needs --replay <FILE>");
            };
            if !path.exists() {
                bail!("recording {} does not exist", path.display());
            }
            println!("  Mode: Replay of {}", path.display());
            HostSource::Replay(ReplaySource::open(path).looping(cli.loop_replay))
        }
        #[cfg(feature = "leap")]
        "leap" => {
            println!("  Mode: LeapMotion hardware");
            HostSource::Leap(hand_landmarks::LeapSource::new())
        }
        #[cfg(not(feature = "leap"))]
        "leap" => bail!("built without LeapMotion support (rebuild with --features leap)"),
        other => bail!("unknown source {:?}; use sim, replay, or leap", other),
    };
    println!();

    let input = (!cli.no_keyboard).then(|| spawn_input_source(stdin_input()));
    let opts = RunOptions {
        max_frames:          cli.frames,
        stop_when_exhausted: source_name == "replay" && !cli.loop_replay,
    };

    let summary = run(cfg, source, input, opts)?;
    info!(
        frames = summary.frames,
        toggles = summary.toggles,
        epoch = summary.training.epoch,
        "session finished"
    );
    Ok(())
}
