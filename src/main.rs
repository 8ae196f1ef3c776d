//! kinetic-stage - headless runner
//!
//! Drives the default graph from synthetic camera and landmark sources at
//! the configured refresh rate and logs the resulting controls.
//!
//! Usage: `kinetic-stage [CONFIG]`. The tick count comes from
//! `KINETIC_STAGE_TICKS` (default 600).

use anyhow::Context;
use kinetic_stage::{
    build_default_graph,
    config::{self, SchedulerConfig, StageConfig},
    runtime::{FrameClock, FrameScheduler, RuntimeBridge, RuntimeContext, RuntimeMessage, TickOutcome},
    tracking::{HandPattern, MotionPattern, SyntheticFrameSource, SyntheticLandmarkSource},
    ReactiveStage,
};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_TICKS: u64 = 600;

fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| StageConfig::default_path().ok());
    let (config, load_error) = match &config_path {
        Some(path) if path.exists() => match StageConfig::load(path) {
            Ok(config) => (config, None),
            Err(e) => (StageConfig::default(), Some(e)),
        },
        _ => (StageConfig::default(), None),
    };

    // Keep the guard alive so the file writer flushes on exit
    let _log_guard = init_logging(&config.scheduler)?;

    tracing::info!("Starting kinetic-stage");
    match (&config_path, load_error) {
        (Some(path), Some(e)) => tracing::warn!("Failed to load {:?}, using defaults: {}", path, e),
        (Some(path), None) if path.exists() => tracing::info!("Loaded config from {:?}", path),
        _ => tracing::info!("Using default config"),
    }

    let ticks = std::env::var("KINETIC_STAGE_TICKS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_TICKS);

    let camera = SyntheticFrameSource::new(config.stage.width, config.stage.height);
    let detector = SyntheticLandmarkSource::new()
        .with_face(MotionPattern::Sway {
            center: (0.5, 0.45),
            amplitude: 0.15,
            period_ms: 4000,
        })
        .with_mouth_open(0.04)
        .with_hand(HandPattern::Pinching {
            wrist: (0.62, 0.4),
            period_ms: 1500,
        });

    let (graph, ids) = build_default_graph().context("building default graph")?;
    let (bridge, link) = RuntimeBridge::new();
    let stage = ReactiveStage::new(config.stage, config.calibration.jaw_max);
    let mut scheduler = FrameScheduler::new(
        &config,
        RuntimeContext::create(Box::new(camera), Box::new(detector)),
        graph,
        Box::new(stage),
        FrameClock::new(config.scheduler.refresh_hz),
    )
    .with_link(link);

    bridge.set_observed(ids.mapper, true);
    bridge.start();
    scheduler.process_commands();

    let report_every = u64::from(config.scheduler.refresh_hz.max(1));
    let mut completed = 0u64;
    for _ in 0..ticks {
        match scheduler.pump_paced() {
            Some(TickOutcome::Completed(report)) => {
                completed += 1;
                if report.tick % report_every == 0 {
                    let c = report.controls;
                    tracing::info!(
                        "tick {:>5}  tilt {:+.3}  lift {:.3}  pinch {:.3}  jaw {:.3}  presence {:.3}",
                        report.tick,
                        c.tilt,
                        c.lift,
                        c.pinch,
                        c.jaw,
                        c.presence
                    );
                }
            }
            Some(TickOutcome::Failed(e)) => {
                tracing::error!("Live session failed: {}", e);
                break;
            }
            Some(_) => {}
            None => break,
        }
    }

    bridge.request_stats();
    scheduler.process_commands();
    for msg in bridge.drain() {
        match msg {
            RuntimeMessage::Stats(stats) => tracing::info!(
                "{} ticks ({} skipped), {} previews, avg {:.0} us, max {} us",
                stats.ticks,
                stats.skipped_ticks,
                stats.previews_rendered,
                stats.avg_tick_us,
                stats.max_tick_us
            ),
            RuntimeMessage::StateChanged(status) => tracing::debug!("{}", status),
            other => tracing::debug!("{:?}", other),
        }
    }

    scheduler.dispose();
    tracing::info!("Finished after {} completed ticks", completed);
    Ok(())
}

fn init_logging(scheduler: &SchedulerConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,kinetic_stage=debug"));

    let (file_layer, guard) = if scheduler.log_to_file {
        let dir = scheduler
            .log_dir
            .clone()
            .or_else(|| config::data_dir().map(|d| d.join("logs")))
            .context("no log directory available")?;
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("creating log directory {:?}", dir))?;
        let appender = tracing_appender::rolling::daily(dir, "kinetic-stage.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        (
            Some(fmt::layer().with_writer(writer).with_ansi(false)),
            Some(guard),
        )
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();
    Ok(guard)
}
