use crate::backend::Backend;
use crate::gamepad::Gamepad;
use crate::keyboard::Keyboard;
use crate::mouse::Mouse;
use pulse_core::{
    Button, Coordinate, DeviceId, DeviceKind, Flag, GestureWindows, History, InputEvent,
    SharedClock, DEFAULT_CAPACITY,
};
use tracing::{debug, info};

/// Every device type implements this trait.
///
/// Devices are passive: the hub calls [`update`](Self::update) once per tick
/// on the owning instance, and the device reads the backend and feeds its
/// histories.  Mirrors are never updated, only copied from their owner.
pub trait InputDevice: Send + std::fmt::Debug {
    fn id(&self) -> DeviceId;

    /// Poll the backend and ingest one tick of readings.
    fn update(&mut self, backend: &mut dyn Backend, ingest: &mut Ingest<'_>);

    /// Push output histories (rumble, cursor requests) to the backend.
    fn flush(&self, _backend: &mut dyn Backend) {}

    /// Mark every history stale, keeping the last known values.
    fn clear(&mut self);

    /// `1.0` while the device answers polls.
    fn is_ready(&self) -> &Flag;
}

/// How new histories are built: shared clock, depth and deduplication
/// tolerances.
#[derive(Debug, Clone)]
pub struct Sampling {
    pub clock: SharedClock,
    pub capacity: usize,
    /// Tolerance for buttons, keys and triggers.
    pub button_threshold: f32,
    /// Tolerance for sticks, cursor positions and wheels.
    pub axis_threshold: f32,
}

impl Sampling {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            clock,
            capacity: DEFAULT_CAPACITY,
            button_threshold: 0.0,
            axis_threshold: 0.0,
        }
    }

    pub fn button(&self) -> Button {
        let mut history = History::new(self.capacity, self.clock.clone());
        history.set_threshold(self.button_threshold);
        history
    }

    /// Status flags always use exact comparison.
    pub fn flag(&self) -> Flag {
        History::new(self.capacity, self.clock.clone())
    }

    pub fn coordinate(&self) -> Coordinate {
        let mut history = History::new(self.capacity, self.clock.clone());
        history.set_threshold(self.axis_threshold);
        history
    }
}

/// Per-device ingestion context handed to [`InputDevice::update`].
///
/// Turns fresh transitions into [`InputEvent`]s.
#[derive(Debug)]
pub struct Ingest<'a> {
    device: DeviceId,
    windows: &'a GestureWindows,
    events: &'a mut Vec<InputEvent>,
}

impl<'a> Ingest<'a> {
    pub fn new(
        device: DeviceId,
        windows: &'a GestureWindows,
        events: &'a mut Vec<InputEvent>,
    ) -> Self {
        Self {
            device,
            windows,
            events,
        }
    }

    /// Record a button reading and report any edge gesture it completes.
    pub fn button(&mut self, control: &'static str, button: &mut Button, value: f32) {
        if !button.set(value) {
            return;
        }
        let at = button.newest().t;
        for gesture in self.windows.fired(button) {
            debug!("{} {control}: {gesture}", self.device);
            self.events.push(InputEvent::Gesture {
                device: self.device,
                control,
                gesture,
                at,
            });
        }
    }

    /// Record device presence, reporting connects and disconnects.
    pub fn ready(&mut self, flag: &mut Flag, present: bool) {
        if !flag.set(present) {
            return;
        }
        if present {
            info!("{} connected", self.device);
            self.events.push(InputEvent::Connected(self.device));
        } else {
            info!("{} disconnected", self.device);
            self.events.push(InputEvent::Disconnected(self.device));
        }
    }
}

/// Any supported device.
#[derive(Debug, Clone)]
pub enum Device {
    Keyboard(Keyboard),
    Mouse(Mouse),
    Gamepad(Gamepad),
}

impl Device {
    /// Build the device type matching `id.kind`.
    pub fn new(id: DeviceId, sampling: &Sampling) -> Self {
        match id.kind {
            DeviceKind::Keyboard => Self::Keyboard(Keyboard::new(sampling)),
            DeviceKind::Mouse => Self::Mouse(Mouse::new(sampling)),
            DeviceKind::Gamepad => Self::Gamepad(Gamepad::new(id.slot, sampling)),
        }
    }

    pub fn as_keyboard(&self) -> Option<&Keyboard> {
        match self {
            Self::Keyboard(k) => Some(k),
            _ => None,
        }
    }

    pub fn as_mouse(&self) -> Option<&Mouse> {
        match self {
            Self::Mouse(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_mouse_mut(&mut self) -> Option<&mut Mouse> {
        match self {
            Self::Mouse(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_gamepad(&self) -> Option<&Gamepad> {
        match self {
            Self::Gamepad(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_gamepad_mut(&mut self) -> Option<&mut Gamepad> {
        match self {
            Self::Gamepad(g) => Some(g),
            _ => None,
        }
    }

    fn inner(&self) -> &dyn InputDevice {
        match self {
            Self::Keyboard(k) => k,
            Self::Mouse(m) => m,
            Self::Gamepad(g) => g,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn InputDevice {
        match self {
            Self::Keyboard(k) => k,
            Self::Mouse(m) => m,
            Self::Gamepad(g) => g,
        }
    }
}

impl InputDevice for Device {
    fn id(&self) -> DeviceId {
        self.inner().id()
    }

    fn update(&mut self, backend: &mut dyn Backend, ingest: &mut Ingest<'_>) {
        self.inner_mut().update(backend, ingest);
    }

    fn flush(&self, backend: &mut dyn Backend) {
        self.inner().flush(backend);
    }

    fn clear(&mut self) {
        self.inner_mut().clear();
    }

    fn is_ready(&self) -> &Flag {
        self.inner().is_ready()
    }
}
