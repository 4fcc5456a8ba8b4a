//! Built-in input script for running `pulse` without an OS backend.
//!
//! Each pass lasts [`PASS_SECONDS`] and plays, in order: a space click, a
//! gamepad A tap, a W double click, a left mouse click, a long shift hold
//! and a short focus loss.  The cursor circles the window the whole time.

use pulse_core::ManualClock;
use pulse_devices::backend::{GamepadSnapshot, MouseSnapshot, Rect};
use pulse_devices::gamepad::bits;
use pulse_devices::{Frame, Keycode, ScriptedBackend};
use std::f64::consts::TAU;
use std::sync::Arc;
use std::time::Duration;

pub const PASS_SECONDS: f64 = 2.0;

const DESKTOP: Rect = Rect::new(0.0, 0.0, 1920.0, 1080.0);
const WINDOW: Rect = Rect::new(480.0, 270.0, 1440.0, 810.0);

fn within(t: f64, from: f64, to: f64) -> bool {
    t >= from && t < to
}

fn keys(t: f64) -> Vec<Keycode> {
    let mut down = Vec::new();
    if within(t, 0.20, 0.30) {
        down.push(Keycode::Space);
    }
    if within(t, 0.60, 0.70) || within(t, 0.80, 0.90) {
        down.push(Keycode::W);
    }
    if within(t, 1.20, 1.80) {
        down.push(Keycode::Shift);
    }
    down
}

fn mouse(t: f64) -> MouseSnapshot {
    let angle = TAU * t / PASS_SECONDS;
    let x = 960.0 + 600.0 * angle.cos();
    let y = 540.0 + 300.0 * angle.sin();
    MouseSnapshot {
        buttons: [within(t, 1.00, 1.10), false, false],
        cursor: (x as f32, y as f32),
        desktop: DESKTOP,
        client: Some(WINDOW),
        wheel: (0.0, 0.0),
    }
}

fn gamepad(t: f64) -> GamepadSnapshot {
    let angle = TAU * t / PASS_SECONDS;
    GamepadSnapshot {
        buttons: if within(t, 0.40, 0.45) { bits::A } else { 0 },
        right_trigger: (255.0 * t / PASS_SECONDS) as u8,
        thumb_lx: (f64::from(i16::MAX) * angle.sin()) as i16,
        ..GamepadSnapshot::default()
    }
}

fn frame(at: f64, t: f64) -> Frame {
    let frame = Frame::at(at)
        .keys(&keys(t))
        .mouse(mouse(t))
        .gamepad(0, gamepad(t));
    if within(t, 1.85, 1.95) {
        frame.unfocused()
    } else {
        frame
    }
}

/// Backend replaying `passes` copies of the script, one frame per `tick`.
pub fn backend(clock: Arc<ManualClock>, tick: Duration, passes: usize) -> ScriptedBackend {
    let dt = tick.as_secs_f64().max(1e-3);
    let per_pass = (PASS_SECONDS / dt).round() as usize;

    let frames = (0..passes)
        .flat_map(|pass| (0..per_pass).map(move |i| (pass, i)))
        .map(|(pass, i)| {
            let t = i as f64 * dt;
            frame(pass as f64 * PASS_SECONDS + t, t)
        })
        .collect();

    ScriptedBackend::new(clock, frames)
}
