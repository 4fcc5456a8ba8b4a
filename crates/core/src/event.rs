use crate::gesture::Gesture;
use serde::{Deserialize, Serialize};

/// Family of physical device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Keyboard,
    Mouse,
    Gamepad,
}

impl DeviceKind {
    /// How many physical devices of this kind can be polled at once.
    pub const fn max_devices(self) -> usize {
        match self {
            Self::Keyboard | Self::Mouse => 1,
            Self::Gamepad => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Keyboard => "keyboard",
            Self::Mouse => "mouse",
            Self::Gamepad => "gamepad",
        }
    }
}

/// One physical device: its kind plus a slot number within that kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DeviceId {
    pub kind: DeviceKind,
    pub slot: usize,
}

impl DeviceId {
    pub const fn new(kind: DeviceKind, slot: usize) -> Self {
        Self { kind, slot }
    }

    pub const fn keyboard() -> Self {
        Self::new(DeviceKind::Keyboard, 0)
    }

    pub const fn mouse() -> Self {
        Self::new(DeviceKind::Mouse, 0)
    }

    pub const fn gamepad(slot: usize) -> Self {
        Self::new(DeviceKind::Gamepad, slot)
    }
}

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.kind.as_str(), self.slot)
    }
}

/// Everything a poller reports to its consumers.
///
/// Sources:
/// - Device histories      → `Gesture`
/// - `is_ready` flags      → `Connected`, `Disconnected`
/// - Backend focus query   → `FocusLost`, `FocusGained`
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// An edge gesture completed on one control.
    Gesture {
        device: DeviceId,
        /// Control name, e.g. `"space"` or `"a"`.
        control: &'static str,
        gesture: Gesture,
        /// Clock time of the transition that completed the gesture.
        at: f64,
    },
    /// Device started answering polls.
    Connected(DeviceId),
    /// Device stopped answering polls; its histories are frozen.
    Disconnected(DeviceId),
    /// Application lost input focus; all histories were cleared.
    FocusLost,
    FocusGained,
}
