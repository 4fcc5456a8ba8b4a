//! pulse: HID polling with timestamped histories and gesture detection.
//!
//! Run with:  `RUST_LOG=info pulse`
//!
//! Without an OS backend the poller replays a built-in demo script; edit
//! `pulse.toml` while it runs to retune the gesture windows live.

mod demo;

use anyhow::Result;
use pulse_config::ConfigWatcher;
use pulse_core::{InputEvent, ManualClock};
use pulse_devices::{InputHub, Sampling};
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Script passes replayed before the demo exits.
const DEMO_PASSES: usize = 5;

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG controls verbosity (default: info).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("pulse v{} starting", env!("CARGO_PKG_VERSION"));

    let path = pulse_config::default_path();
    let config = pulse_config::load(&path)?;

    let clock = ManualClock::shared();
    let sampling = Sampling {
        clock: clock.clone(),
        capacity: config.poll.history_capacity,
        button_threshold: config.thresholds.button,
        axis_threshold: config.thresholds.axis,
    };
    let mut hub = InputHub::new(sampling)
        .with_windows(config.gestures)
        .clear_on_focus_loss(config.poll.clear_on_focus_loss);

    let handles = config
        .devices
        .ids()
        .into_iter()
        .map(|id| hub.acquire(id))
        .collect::<pulse_core::Result<Vec<_>>>()?;

    let interval = Duration::from_millis(config.poll.interval_ms);
    let backend = demo::backend(clock, interval, DEMO_PASSES);
    let (poller, mut events) = pulse_devices::spawn_poller(hub, backend, interval);
    let (_watcher, mut changes) = ConfigWatcher::spawn(&path);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => log_event(&event),
                None => break,
            },
            Some(()) = changes.recv() => match pulse_config::load(&path) {
                Ok(config) => poller.set_windows(config.gestures),
                Err(e) => warn!("Config reload failed, keeping current windows: {e}"),
            },
            _ = &mut ctrl_c => {
                info!("interrupted, shutting down");
                poller.abort();
                return Ok(());
            }
        }
    }

    let mut hub = poller.join().await?;
    for handle in handles {
        hub.release(handle)?;
    }
    info!("demo script finished");
    Ok(())
}

fn log_event(event: &InputEvent) {
    match event {
        InputEvent::Gesture {
            device,
            control,
            gesture,
            at,
        } => info!("{at:>8.3}s  {device} {control} {gesture}"),
        other => debug!("{other:?}"),
    }
}
