//! The seam between pulse and the operating system.
//!
//! A [`Backend`] answers one poll per tick with plain snapshots; the device
//! types turn those into normalized histories.  Real OS backends live outside
//! this crate; [`NullBackend`] and [`ScriptedBackend`] cover tests and demos.

use crate::keycode::Keycode;
use pulse_core::ManualClock;
use std::collections::VecDeque;
use std::sync::Arc;

/// Keys held down during one poll.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyboardSnapshot {
    pub pressed: Vec<Keycode>,
}

impl KeyboardSnapshot {
    pub fn with_pressed(keys: &[Keycode]) -> Self {
        Self {
            pressed: keys.to_vec(),
        }
    }

    #[must_use]
    pub fn is_down(&self, key: Keycode) -> bool {
        self.pressed.contains(&key)
    }
}

/// Axis-aligned rectangle in desktop pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    #[must_use]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    #[must_use]
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    #[must_use]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }
}

/// Mouse state during one poll.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MouseSnapshot {
    /// Left, middle, right.
    pub buttons: [bool; 3],
    /// Cursor position in desktop pixels.
    pub cursor: (f32, f32),
    /// Virtual desktop bounds.
    pub desktop: Rect,
    /// Client area of the application window, if it is under the cursor.
    pub client: Option<Rect>,
    /// Accumulated wheel position (horizontal, vertical).
    pub wheel: (f32, f32),
}

/// Raw XInput-style gamepad report.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GamepadSnapshot {
    /// Bitmask of [`GamepadButton`](crate::gamepad::GamepadButton) bits.
    pub buttons: u16,
    pub left_trigger: u8,
    pub right_trigger: u8,
    pub thumb_lx: i16,
    pub thumb_ly: i16,
    pub thumb_rx: i16,
    pub thumb_ry: i16,
}

/// Cursor behaviour requested by the application through the mouse flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CursorRequests {
    pub hidden: bool,
    pub clipped: bool,
    pub centered: bool,
}

/// Per-tick device access.
///
/// `None` from a `poll_*` method means the device is not present.
pub trait Backend: Send {
    /// Whether the application currently owns input focus.
    fn has_focus(&mut self) -> bool;

    fn poll_keyboard(&mut self) -> Option<KeyboardSnapshot>;

    fn poll_mouse(&mut self) -> Option<MouseSnapshot>;

    fn poll_gamepad(&mut self, slot: usize) -> Option<GamepadSnapshot>;

    /// Drive the two rumble motors of a gamepad, each in `[0, 1]`.
    fn set_rumble(&mut self, _slot: usize, _left: f32, _right: f32) {}

    fn apply_cursor(&mut self, _requests: CursorRequests) {}

    /// Called once at the start of every tick.  Returning `false` stops
    /// the poller (scripted input ran out).
    fn begin_tick(&mut self) -> bool {
        true
    }
}

/// Focused backend with no devices attached.
#[derive(Debug, Default)]
pub struct NullBackend;

impl Backend for NullBackend {
    fn has_focus(&mut self) -> bool {
        true
    }

    fn poll_keyboard(&mut self) -> Option<KeyboardSnapshot> {
        None
    }

    fn poll_mouse(&mut self) -> Option<MouseSnapshot> {
        None
    }

    fn poll_gamepad(&mut self, _slot: usize) -> Option<GamepadSnapshot> {
        None
    }
}

/// One scripted tick.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    /// Clock time of this tick, in seconds.
    pub at: f64,
    pub focus: bool,
    pub keyboard: Option<KeyboardSnapshot>,
    pub mouse: Option<MouseSnapshot>,
    pub gamepads: [Option<GamepadSnapshot>; 4],
}

impl Frame {
    pub fn at(at: f64) -> Self {
        Self {
            at,
            focus: true,
            ..Self::default()
        }
    }

    pub fn keys(mut self, keys: &[Keycode]) -> Self {
        self.keyboard = Some(KeyboardSnapshot::with_pressed(keys));
        self
    }

    pub fn mouse(mut self, mouse: MouseSnapshot) -> Self {
        self.mouse = Some(mouse);
        self
    }

    pub fn gamepad(mut self, slot: usize, pad: GamepadSnapshot) -> Self {
        if let Some(entry) = self.gamepads.get_mut(slot) {
            *entry = Some(pad);
        }
        self
    }

    pub fn unfocused(mut self) -> Self {
        self.focus = false;
        self
    }
}

/// Replays a list of frames, moving a [`ManualClock`] to each frame's time.
///
/// Outputs (rumble, cursor requests) are recorded for inspection.
#[derive(Debug)]
pub struct ScriptedBackend {
    clock: Arc<ManualClock>,
    frames: VecDeque<Frame>,
    current: Frame,
    looping: Option<(Vec<Frame>, f64)>,
    pub rumble: [(f32, f32); 4],
    pub cursor: CursorRequests,
}

impl ScriptedBackend {
    pub fn new(clock: Arc<ManualClock>, frames: Vec<Frame>) -> Self {
        Self {
            clock,
            frames: frames.into(),
            current: Frame::default(),
            looping: None,
            rumble: [(0.0, 0.0); 4],
            cursor: CursorRequests::default(),
        }
    }

    /// Replay `frames` forever, shifting each pass by `period` seconds.
    pub fn looping(clock: Arc<ManualClock>, frames: Vec<Frame>, period: f64) -> Self {
        let mut backend = Self::new(clock, frames.clone());
        backend.looping = Some((frames, period));
        backend
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }

    fn refill(&mut self) {
        let Some((frames, period)) = &mut self.looping else {
            return;
        };
        if frames.is_empty() {
            return;
        }
        for frame in frames.iter_mut() {
            frame.at += *period;
        }
        self.frames.extend(frames.iter().cloned());
    }
}

impl Backend for ScriptedBackend {
    fn begin_tick(&mut self) -> bool {
        if self.frames.is_empty() {
            self.refill();
        }
        match self.frames.pop_front() {
            Some(frame) => {
                self.clock.set(frame.at);
                self.current = frame;
                true
            }
            None => false,
        }
    }

    fn has_focus(&mut self) -> bool {
        self.current.focus
    }

    fn poll_keyboard(&mut self) -> Option<KeyboardSnapshot> {
        self.current.keyboard.clone()
    }

    fn poll_mouse(&mut self) -> Option<MouseSnapshot> {
        self.current.mouse.clone()
    }

    fn poll_gamepad(&mut self, slot: usize) -> Option<GamepadSnapshot> {
        self.current.gamepads.get(slot).copied().flatten()
    }

    fn set_rumble(&mut self, slot: usize, left: f32, right: f32) {
        if let Some(entry) = self.rumble.get_mut(slot) {
            *entry = (left, right);
        }
    }

    fn apply_cursor(&mut self, requests: CursorRequests) {
        self.cursor = requests;
    }
}
