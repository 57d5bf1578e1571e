//! Segue player (segue-player) - Main entry point
//!
//! Drives the playback engine over simulated backend slots, either in real
//! time from a tokio interval or offline as fast as possible, and reports
//! engine events as log lines or JSON.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use segue_common::config::ConfigSource;
use segue_common::PlayerEvent;
use segue_player::playback::SimulatedHandle;
use segue_player::{PlaybackEngine, PlayerConfig};
use tokio::signal;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Simulated length of an offline run when `--seconds` is not given
const DEFAULT_OFFLINE_SECONDS: f64 = 60.0;

/// Command-line arguments for segue-player
#[derive(Parser, Debug)]
#[command(name = "segue-player")]
#[command(about = "Continuous playlist player with crossfading")]
#[command(version)]
struct Args {
    /// Configuration file (overrides SEGUE_CONFIG and the platform default)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Engine tick interval in milliseconds
    #[arg(short, long, default_value = "20", env = "SEGUE_TICK_MS")]
    tick_ms: u64,

    /// Stop after this many seconds of engine time
    #[arg(short, long)]
    seconds: Option<f64>,

    /// Run as fast as possible with a fixed simulated tick
    #[arg(long)]
    offline: bool,

    /// Print every engine event to stdout as one JSON object per line
    #[arg(long)]
    json_events: bool,

    /// Start playing immediately, regardless of `play_on_start`
    #[arg(long)]
    play: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config first so its log level can seed the filter
    let mut config =
        PlayerConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(&config.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Segue player v{}", env!("CARGO_PKG_VERSION"));

    // Anything logged while loading went nowhere, so report the source now
    match &config.source {
        ConfigSource::Missing(_) => warn!("Configuration: {}", config.source),
        source => info!("Configuration: {}", source),
    }

    for advice in &config.advice {
        warn!("{}", advice);
    }

    if config.tracks.is_empty() {
        warn!("No tracks configured, nothing to play");
        return Ok(());
    }

    if args.play {
        config.settings.play_on_start = true;
    }

    let (tx, rx) = mpsc::unbounded_channel();
    let mut engine = PlaybackEngine::simulated(config.settings, config.tracks);
    engine.set_event_channel(tx);
    engine.start();

    let tick = Duration::from_millis(args.tick_ms.max(1));
    let mut reporter = EventReporter::new(rx, args.json_events);

    if args.offline {
        let seconds = args.seconds.unwrap_or(DEFAULT_OFFLINE_SECONDS);
        run_offline(&mut engine, &mut reporter, tick, seconds);
    } else {
        run_realtime(&mut engine, &mut reporter, tick, args.seconds).await;
    }

    engine.stop();
    reporter.drain();

    info!(
        "Shutdown complete after {:.2}s of engine time ({} events)",
        engine.engine_time(),
        reporter.count
    );
    Ok(())
}

fn default_filter(level: &str) -> String {
    format!("segue_player={},segue_common={}", level, level)
}

/// Tick the engine as fast as possible until `seconds` of engine time pass
fn run_offline(
    engine: &mut PlaybackEngine<SimulatedHandle>,
    reporter: &mut EventReporter,
    tick: Duration,
    seconds: f64,
) {
    let delta = tick.as_secs_f64();
    info!(
        "Offline run: {:.1}s in {:.0}ms ticks",
        seconds,
        delta * 1000.0
    );

    while engine.engine_time() < seconds {
        engine.update(delta);
        reporter.drain();
    }
}

/// Tick the engine from a tokio interval until shutdown or the time limit
async fn run_realtime(
    engine: &mut PlaybackEngine<SimulatedHandle>,
    reporter: &mut EventReporter,
    tick: Duration,
    limit: Option<f64>,
) {
    let mut interval = tokio::time::interval(tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last = Instant::now();

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    info!("Real-time run: {}ms ticks", tick.as_millis());

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            now = interval.tick() => {
                let delta = now.duration_since(last).as_secs_f64();
                last = now;

                engine.update(delta);
                reporter.drain();

                if limit.is_some_and(|limit| engine.engine_time() >= limit) {
                    info!("Time limit reached");
                    break;
                }
            }
        }
    }
}

/// Consumes engine events after each tick
struct EventReporter {
    rx: mpsc::UnboundedReceiver<PlayerEvent>,
    json: bool,
    count: u64,
}

impl EventReporter {
    fn new(rx: mpsc::UnboundedReceiver<PlayerEvent>, json: bool) -> Self {
        Self { rx, json, count: 0 }
    }

    fn drain(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            self.count += 1;
            self.report(&event);
        }
    }

    fn report(&self, event: &PlayerEvent) {
        if self.json {
            match serde_json::to_string(event) {
                Ok(line) => println!("{}", line),
                Err(e) => warn!("Failed to serialize {} event: {}", event.event_type(), e),
            }
            return;
        }

        match event {
            PlayerEvent::Warning { warning, .. } => warn!("Player warning: {:?}", warning),
            PlayerEvent::LoopRewound { .. } => debug!("{:?}", event),
            _ => info!("{:?}", event),
        }
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
