//! Replays a recorded session through the gaze tracker and prints the metrics.

use anyhow::{Context, Result};
use clap::Parser;
use gaze_tracking::{
    config::{Config, EXAMPLE_CONFIG},
    gaze::GazeTracker,
    replay::{RecordedFace, Session},
};
use log::info;
use ndarray::Array2;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Session file (YAML) with recorded landmarks and eye crops
    #[arg(short, long, required_unless_present = "print_config")]
    session: Option<String>,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<String>,

    /// Override the expected iris fraction of the eye crop
    #[arg(short, long)]
    target_iris: Option<f64>,

    /// Print an example configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logger
    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    if args.print_config {
        print!("{EXAMPLE_CONFIG}");
        return Ok(());
    }

    // Load configuration if provided
    let mut config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {}", config_path);
        match Config::from_file(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!("Failed to load config file: {}. Using defaults.", e);
                Config::default()
            }
        }
    } else {
        Config::default()
    };
    if let Some(target) = args.target_iris {
        config.calibration.target_iris_fraction = target;
    }

    let mut tracker = GazeTracker::from_config(&config).context("Invalid configuration")?;

    let session_path = args.session.context("No session file given")?;
    let session = Session::from_file(&session_path).with_context(|| format!("Loading session {session_path}"))?;
    info!(
        "Replaying {} frames from {} (pupil preprocessing: {})",
        session.frames.len(),
        session_path,
        tracker.preprocessor_name()
    );

    let frame = Array2::<u8>::zeros((0, 0));
    for (index, recorded) in session.frames.iter().enumerate() {
        let mut face = RecordedFace::new(recorded.landmarks().with_context(|| format!("Frame {index}"))?);
        let mut eyes = recorded.load_eyes().with_context(|| format!("Frame {index}"))?;
        tracker.refresh(&frame.view(), &mut face, &mut eyes)?;

        print_frame(index, &tracker);
    }

    info!(
        "Calibration {} (left window {}, right window {})",
        if tracker.is_calibrated() { "complete" } else { "incomplete" },
        tracker.calibration().left.history().len(),
        tracker.calibration().right.history().len()
    );

    Ok(())
}

fn print_frame(index: usize, tracker: &GazeTracker) {
    let head = match tracker.head().angles() {
        Some(angles) => format!(
            "tilt {:6.1} pitch {:6.1} twist {:6.1}",
            angles.tilt, angles.pitch, angles.twist
        ),
        None => "head unknown".to_string(),
    };

    let gaze = match (
        tracker.pupil_left_coords(),
        tracker.pupil_right_coords(),
        tracker.horizontal_ratio(0.0),
        tracker.vertical_ratio(0.0),
    ) {
        (Some(left), Some(right), Some(horizontal), Some(vertical)) => format!(
            "pupils {:?} {:?} gaze h {:.2} v {:.2}{}",
            left,
            right,
            horizontal,
            vertical,
            if tracker.is_blinking() == Some(true) { " blinking" } else { "" }
        ),
        _ => "pupils not located".to_string(),
    };

    println!("frame {index:5}: {head} | {gaze}");
}
