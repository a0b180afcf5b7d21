//! landmark_dump: write a scripted sequence of simulated hand poses as a
//! JSON-lines recording that `neuralflow --replay` can play back.
//!
//! ```text
//! landmark_dump --step open:30 --step pinch=0.02:60 --step fist:90 > session.jsonl
//! ```

use std::io::{self, BufWriter, Write};

use clap::Parser;
use hand_landmarks::{SimHandSource, SimPose};

#[derive(Parser, Debug)]
#[command(name = "landmark_dump", about = "Emit simulated hand-landmark frames as JSON lines")]
struct Cli {
    /// Pose step as `POSE:FRAMES`; POSE is absent, open, fist or pinch=DIST
    #[arg(long = "step", value_parser = parse_step, required = true)]
    steps: Vec<(SimPose, u32)>,

    /// Frame spacing in milliseconds
    #[arg(long, default_value_t = 16.0)]
    interval_ms: f64,

    /// Palm centre as `X,Y` in normalised coordinates
    #[arg(long, value_parser = parse_palm, default_value = "0.5,0.5")]
    palm: (f32, f32),
}

fn parse_step(s: &str) -> Result<(SimPose, u32), String> {
    let (pose, frames) = s.split_once(':')
        .ok_or_else(|| format!("expected POSE:FRAMES, got {:?}", s))?;
    let frames = frames.trim().parse::<u32>()
        .map_err(|e| format!("bad frame count {:?}: {}", frames, e))?;
    let pose = match pose.trim() {
        "absent" => SimPose::Absent,
        "open"   => SimPose::Open,
        "fist"   => SimPose::Fist,
        p => match p.strip_prefix("pinch=") {
            Some(d) => SimPose::Pinch {
                distance: d.parse().map_err(|e| format!("bad pinch distance {:?}: {}", d, e))?,
            },
            None => return Err(format!("unknown pose {:?}", p)),
        },
    };
    Ok((pose, frames))
}

fn parse_palm(s: &str) -> Result<(f32, f32), String> {
    let (x, y) = s.split_once(',')
        .ok_or_else(|| format!("expected X,Y, got {:?}", s))?;
    let coord = |v: &str| -> Result<f32, String> {
        let v = v.trim();
        match v.parse::<f32>() {
            Ok(c) if (0.0..=1.0).contains(&c) => Ok(c),
            Ok(c) => Err(format!("palm coordinate {} outside [0, 1]", c)),
            Err(e) => Err(format!("bad palm coordinate {:?}: {}", v, e)),
        }
    };
    Ok((coord(x)?, coord(y)?))
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    let (px, py) = cli.palm;

    let mut sim = SimHandSource::default();
    sim.set_palm(px, py);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut t = 0.0;
    for (pose, frames) in cli.steps {
        sim.set_pose(pose);
        for _ in 0..frames {
            serde_json::to_writer(&mut out, &sim.frame_at(t))?;
            out.write_all(b"\n")?;
            t += cli.interval_ms;
        }
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palm_parses_or_reports() {
        assert_eq!(parse_palm("0.3, 0.6"), Ok((0.3, 0.6)));
        assert!(parse_palm("0.3").is_err());
        assert!(parse_palm("left,0.5").is_err());
        assert!(parse_palm("1.5,0.5").is_err());
    }

    #[test]
    fn malformed_palm_is_rejected_by_cli() {
        let args = ["landmark_dump", "--step", "open:1", "--palm", "oops"];
        assert!(Cli::try_parse_from(args).is_err());
        let cli = Cli::try_parse_from(["landmark_dump", "--step", "open:1"]).unwrap();
        assert_eq!(cli.palm, (0.5, 0.5));
    }

    #[test]
    fn steps_parse() {
        assert_eq!(parse_step("pinch=0.02:60"), Ok((SimPose::Pinch { distance: 0.02 }, 60)));
        assert!(parse_step("wave:3").is_err());
    }
}
