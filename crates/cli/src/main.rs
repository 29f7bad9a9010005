use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::thread::JoinHandle;

use clap::{Parser, Subcommand};

use eyeguard_core::alerting::domain::alert_sink::AlertDelivery;
use eyeguard_core::alerting::infrastructure::background_watcher_sink::WatcherCommand;
use eyeguard_core::alerting::infrastructure::sink_factory::{create_sink, AlertReceiver};
use eyeguard_core::capture::infrastructure::trace_frame_source::Trace;
use eyeguard_core::detection::infrastructure::replay_face_detector::ReplayFaceDetector;
use eyeguard_core::estimation::domain::distance_estimator::DistanceEstimator;
use eyeguard_core::monitoring::monitoring_session::{FrameReport, MonitoringSession, SessionSummary};
use eyeguard_core::monitoring::permission_gate::{ensure_camera_access, StaticPermissionGate};
use eyeguard_core::monitoring::session_logger::StdoutSessionLogger;
use eyeguard_core::shared::clock::MonotonicClock;
use eyeguard_core::shared::settings::Settings;

/// Face-to-screen distance estimation and close-face alerting.
#[derive(Parser)]
#[command(name = "eyeguard")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Estimate viewing distance from a face bounding-box width.
    Estimate {
        /// Face bounding-box width in pixels.
        #[arg(allow_negative_numbers = true)]
        width_px: i32,

        /// Frame width in pixels (defaults to the calibrated reference width).
        #[arg(long)]
        frame_width: Option<u32>,
    },

    /// Replay a recorded session through the estimator and alert policy.
    Replay {
        /// JSON-lines trace file.
        trace: PathBuf,

        /// Alert delivery: watcher or dialog.
        #[arg(long)]
        delivery: Option<String>,

        /// Close-face threshold in centimeters.
        #[arg(long)]
        threshold: Option<f64>,

        /// Minimum time between alerts in milliseconds.
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Re-arm alerts as soon as no face is close.
        #[arg(long)]
        reset_on_far: bool,

        /// Replay at recorded pace through the latest-only capture thread.
        #[arg(long)]
        realtime: bool,
    },

    /// Show the persisted settings.
    Settings {
        /// Overwrite the settings file with defaults.
        #[arg(long)]
        reset: bool,
    },
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    match cli.command {
        Command::Estimate {
            width_px,
            frame_width,
        } => run_estimate(width_px, frame_width),
        Command::Replay {
            trace,
            delivery,
            threshold,
            interval_ms,
            reset_on_far,
            realtime,
        } => {
            let mut settings = Settings::load();
            if let Some(delivery) = delivery {
                settings.delivery = delivery.parse()?;
            }
            if let Some(threshold) = threshold {
                settings.policy.close_threshold_cm = threshold;
            }
            if let Some(interval_ms) = interval_ms {
                settings.policy.alert_interval_ms = interval_ms;
            }
            if reset_on_far {
                settings.policy.reset_on_far = true;
            }
            run_replay(&trace, settings, realtime)
        }
        Command::Settings { reset } => run_settings(reset),
    }
}

fn run_estimate(width_px: i32, frame_width: Option<u32>) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load();
    settings.calibration.validate()?;
    settings.policy.validate()?;
    let estimator = DistanceEstimator::new(settings.calibration);
    let frame_width = frame_width.unwrap_or(settings.calibration.reference_frame_width_px);

    let estimate = estimator.estimate_width(width_px, frame_width)?;
    let label = if estimate.is_closer_than(settings.policy.close_threshold_cm) {
        "close"
    } else {
        "far"
    };
    println!(
        "{:.2} cm ({label}, threshold {:.1} cm)",
        estimate.centimeters, settings.policy.close_threshold_cm
    );
    Ok(())
}

fn run_replay(
    trace_path: &Path,
    settings: Settings,
    realtime: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let trace = Trace::open(trace_path)?;
    log::info!(
        "Loaded {} frames spanning {}ms from {}",
        trace.len(),
        trace.span_ms(),
        trace_path.display()
    );

    ensure_camera_access(&mut StaticPermissionGate::granted())?;

    let detector = Box::new(ReplayFaceDetector::new(Arc::new(trace.detections())));
    let (sink, receiver) = create_sink(settings.delivery);
    let host = spawn_alert_host(receiver);

    let mut session = MonitoringSession::new(
        detector,
        settings.calibration,
        settings.policy,
        sink,
        Box::new(StdoutSessionLogger::default()),
        None,
    )?;

    let print_alert = |report: &FrameReport| {
        if let Some(alert) = report.decision.fired() {
            println!(
                "frame {:>5} at {}: alert, face at {:.1} cm",
                report.index, alert.timestamp, alert.distance_cm
            );
        }
    };
    if realtime {
        session = session.with_clock(Box::new(MonotonicClock::new()));
        session.run_threaded(Box::new(trace.frame_source(true)), print_alert)?;
    } else {
        session.run(&mut trace.frame_source(false), print_alert)?;
    }

    let summary = session.finish();
    host.join().map_err(|_| "alert host thread panicked")?;
    print_summary(&summary);
    Ok(())
}

/// Services the host side of the alert sink until the sink is dropped.
fn spawn_alert_host(receiver: AlertReceiver) -> JoinHandle<()> {
    std::thread::spawn(move || match receiver {
        AlertReceiver::Watcher(commands) => {
            for command in commands {
                match command {
                    WatcherCommand::Start { notification, .. } => {
                        eprintln!("[watcher] {}: {}", notification.title, notification.text);
                    }
                    WatcherCommand::Stop { notification_id } => {
                        eprintln!("[watcher] stopped (notification {notification_id})");
                    }
                }
            }
        }
        AlertReceiver::Dialog(presenter) => {
            while let Some(shown) = presenter.show() {
                let dialog = shown.dialog();
                eprintln!(
                    "[dialog] {}: {} [{}]",
                    dialog.title, dialog.message, dialog.action_label
                );
                shown.acknowledge();
            }
        }
    })
}

fn print_summary(summary: &SessionSummary) {
    println!("frames processed:  {}", summary.frames_processed);
    if summary.frames_dropped > 0 {
        println!("frames dropped:    {}", summary.frames_dropped);
    }
    println!("faces detected:    {}", summary.faces_detected);
    if summary.invalid_faces > 0 {
        println!("invalid faces:     {}", summary.invalid_faces);
    }
    if summary.detector_failures > 0 {
        println!("detector failures: {}", summary.detector_failures);
    }
    println!("close frames:      {}", summary.alerts.close_frames);
    println!("alerts fired:      {}", summary.alerts.alerts_fired);
    println!("alerts suppressed: {}", summary.alerts.alerts_suppressed);
    if summary.sink_failures > 0 {
        println!("delivery failures: {}", summary.sink_failures);
    }
}

fn run_settings(reset: bool) -> Result<(), Box<dyn std::error::Error>> {
    let settings = if reset {
        let defaults = Settings::default();
        let path = defaults.save()?;
        log::info!("Settings reset at {}", path.display());
        defaults
    } else {
        Settings::load()
    };

    if let Some(path) = Settings::config_path() {
        println!("# {}", path.display());
    }
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    match &cli.command {
        Command::Estimate { frame_width, .. } => {
            if *frame_width == Some(0) {
                return Err("Frame width must be positive".into());
            }
        }
        Command::Replay {
            trace,
            delivery,
            threshold,
            ..
        } => {
            if !trace.exists() {
                return Err(format!("Trace file not found: {}", trace.display()).into());
            }
            if let Some(delivery) = delivery {
                delivery.parse::<AlertDelivery>()?;
            }
            if let Some(threshold) = threshold {
                if !threshold.is_finite() || *threshold <= 0.0 {
                    return Err(
                        format!("Threshold must be a positive number, got {threshold}").into(),
                    );
                }
            }
        }
        Command::Settings { .. } => {}
    }
    Ok(())
}
