//! Timestamped sample histories with temporal gesture recognition.
//!
//! A [`History`] keeps the last N distinct readings of one device control,
//! newest first, and answers both "what is the value now" and "what shape
//! did the signal have recently" (trigger, release, click, double click).

pub mod clock;
pub mod error;
pub mod event;
pub mod gesture;
pub mod history;
pub mod sample;

pub use clock::{Clock, ManualClock, MonotonicClock, SharedClock};
pub use error::{PulseError, Result};
pub use event::{DeviceId, DeviceKind, InputEvent};
pub use gesture::{Gesture, GestureWindows};
pub use history::{Axis, Button, Coordinate, Flag, History, DEFAULT_CAPACITY};
pub use sample::{Sample, Value, Vec1, Vec2, Vec3};
