//! Keyboard, mouse and gamepad polling on top of `pulse-core` histories.
//!
//! An [`InputHub`] owns the devices; [`spawn_poller`] drives it from a Tokio
//! task at a fixed rate and streams [`InputEvent`]s to the caller.

pub mod backend;
pub mod device;
pub mod gamepad;
pub mod hub;
pub mod keyboard;
pub mod keycode;
pub mod mouse;
pub mod registry;

pub use backend::{Backend, Frame, NullBackend, ScriptedBackend};
pub use device::{Device, InputDevice, Sampling};
pub use hub::{Handle, InputHub};
pub use keycode::Keycode;
pub use registry::{DeviceRegistry, Lease};

use pulse_core::{GestureWindows, InputEvent, PulseError, Result};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

/// Control side of a running poller.
#[derive(Debug)]
pub struct Poller {
    windows: watch::Sender<GestureWindows>,
    task: JoinHandle<InputHub>,
}

impl Poller {
    /// Apply new gesture windows from the next tick on.
    pub fn set_windows(&self, windows: GestureWindows) {
        self.windows.send_replace(windows);
    }

    /// Wait for the poller to stop and take the hub back.
    pub async fn join(self) -> Result<InputHub> {
        self.task
            .await
            .map_err(|e| PulseError::Backend(format!("poller task failed: {e}")))
    }

    pub fn abort(&self) {
        self.task.abort();
    }
}

/// Spawn a background Tokio task that ticks `hub` against `backend` every
/// `interval` and forwards the resulting [`InputEvent`]s through the
/// returned channel.
///
/// The task stops when the receiver is dropped or the backend reports it
/// has no more input.
pub fn spawn_poller<B>(
    mut hub: InputHub,
    mut backend: B,
    interval: Duration,
) -> (Poller, mpsc::Receiver<InputEvent>)
where
    B: Backend + 'static,
{
    let (tx, rx) = mpsc::channel(64);
    let (windows_tx, mut windows_rx) = watch::channel(*hub.windows());

    let task = tokio::spawn(async move {
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!("polling every {interval:?}");

        loop {
            ticker.tick().await;

            if windows_rx.has_changed().unwrap_or(false) {
                let windows = *windows_rx.borrow_and_update();
                hub.set_windows(windows);
            }

            if !backend.begin_tick() {
                info!("backend exhausted, poller stopping");
                break;
            }

            for event in hub.tick(&mut backend) {
                if tx.send(event).await.is_err() {
                    debug!("event receiver dropped, poller stopping");
                    return hub;
                }
            }
        }
        hub
    });

    (
        Poller {
            windows: windows_tx,
            task,
        },
        rx,
    )
}
