use crate::backend::{Backend, GamepadSnapshot};
use crate::device::{Ingest, InputDevice, Sampling};
use pulse_core::{Button, Coordinate, DeviceId, Flag};

/// Button bits of [`GamepadSnapshot::buttons`].
pub mod bits {
    pub const DPAD_UP: u16 = 0x0001;
    pub const DPAD_DOWN: u16 = 0x0002;
    pub const DPAD_LEFT: u16 = 0x0004;
    pub const DPAD_RIGHT: u16 = 0x0008;
    pub const START: u16 = 0x0010;
    pub const BACK: u16 = 0x0020;
    pub const LEFT_THUMB: u16 = 0x0040;
    pub const RIGHT_THUMB: u16 = 0x0080;
    pub const LEFT_SHOULDER: u16 = 0x0100;
    pub const RIGHT_SHOULDER: u16 = 0x0200;
    pub const A: u16 = 0x1000;
    pub const B: u16 = 0x2000;
    pub const X: u16 = 0x4000;
    pub const Y: u16 = 0x8000;
}

/// Digital buttons plus the two analog triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GamepadButton {
    A,
    B,
    X,
    Y,
    Back,
    Start,
    LeftShoulder,
    RightShoulder,
    LeftThumb,
    RightThumb,
    /// Analog, `[0, 1]`.
    LeftTrigger,
    /// Analog, `[0, 1]`.
    RightTrigger,
}

impl GamepadButton {
    pub const ALL: [GamepadButton; 12] = [
        Self::A,
        Self::B,
        Self::X,
        Self::Y,
        Self::Back,
        Self::Start,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftThumb,
        Self::RightThumb,
        Self::LeftTrigger,
        Self::RightTrigger,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::A => "a",
            Self::B => "b",
            Self::X => "x",
            Self::Y => "y",
            Self::Back => "back",
            Self::Start => "start",
            Self::LeftShoulder => "lb",
            Self::RightShoulder => "rb",
            Self::LeftThumb => "lthumb",
            Self::RightThumb => "rthumb",
            Self::LeftTrigger => "lt",
            Self::RightTrigger => "rt",
        }
    }

    /// Bit in the button mask, `None` for the analog triggers.
    pub const fn bit(self) -> Option<u16> {
        match self {
            Self::A => Some(bits::A),
            Self::B => Some(bits::B),
            Self::X => Some(bits::X),
            Self::Y => Some(bits::Y),
            Self::Back => Some(bits::BACK),
            Self::Start => Some(bits::START),
            Self::LeftShoulder => Some(bits::LEFT_SHOULDER),
            Self::RightShoulder => Some(bits::RIGHT_SHOULDER),
            Self::LeftThumb => Some(bits::LEFT_THUMB),
            Self::RightThumb => Some(bits::RIGHT_THUMB),
            Self::LeftTrigger | Self::RightTrigger => None,
        }
    }

    fn level(self, snapshot: &GamepadSnapshot) -> f32 {
        match self {
            Self::LeftTrigger => trigger(snapshot.left_trigger),
            Self::RightTrigger => trigger(snapshot.right_trigger),
            _ => match self.bit() {
                Some(bit) if snapshot.buttons & bit != 0 => 1.0,
                _ => 0.0,
            },
        }
    }
}

/// Planar gamepad controls, each in `[-1, 1]` with y up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stick {
    /// D-pad folded into a coordinate.
    Pad,
    Left,
    Right,
}

impl Stick {
    pub const ALL: [Stick; 3] = [Self::Pad, Self::Left, Self::Right];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Motor {
    Left,
    Right,
}

fn trigger(raw: u8) -> f32 {
    f32::from(raw) / 255.0
}

/// Asymmetric so both extremes reach exactly ±1.
fn thumb(raw: i16) -> f32 {
    if raw >= 0 {
        f32::from(raw) / 32767.0
    } else {
        f32::from(raw) / 32768.0
    }
}

fn dpad(buttons: u16) -> (f32, f32) {
    let axis = |pos: u16, neg: u16| {
        let pos = f32::from(u8::from(buttons & pos != 0));
        let neg = f32::from(u8::from(buttons & neg != 0));
        pos - neg
    };
    (
        axis(bits::DPAD_RIGHT, bits::DPAD_LEFT),
        axis(bits::DPAD_UP, bits::DPAD_DOWN),
    )
}

/// One controller slot.  Rumble motors are outputs: the application writes
/// them and the poller forwards them to the backend every tick.
#[derive(Debug, Clone)]
pub struct Gamepad {
    slot: usize,
    buttons: Vec<Button>,
    sticks: [Coordinate; 3],
    rumble: [Button; 2],
    is_ready: Flag,
}

impl Gamepad {
    pub fn new(slot: usize, sampling: &Sampling) -> Self {
        Self {
            slot,
            buttons: GamepadButton::ALL.iter().map(|_| sampling.button()).collect(),
            sticks: [
                sampling.coordinate(),
                sampling.coordinate(),
                sampling.coordinate(),
            ],
            rumble: [sampling.flag(), sampling.flag()],
            is_ready: sampling.flag(),
        }
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn button(&self, button: GamepadButton) -> &Button {
        &self.buttons[button as usize]
    }

    pub fn stick(&self, stick: Stick) -> &Coordinate {
        &self.sticks[stick as usize]
    }

    pub fn rumble(&self, motor: Motor) -> &Button {
        &self.rumble[motor as usize]
    }

    /// Request a motor speed; clamped to `[0, 1]`.
    pub fn set_rumble(&mut self, motor: Motor, speed: f32) {
        self.rumble[motor as usize].set(speed.clamp(0.0, 1.0));
    }
}

impl InputDevice for Gamepad {
    fn id(&self) -> DeviceId {
        DeviceId::gamepad(self.slot)
    }

    fn update(&mut self, backend: &mut dyn Backend, ingest: &mut Ingest<'_>) {
        let snapshot = backend.poll_gamepad(self.slot);
        ingest.ready(&mut self.is_ready, snapshot.is_some());
        let Some(snapshot) = snapshot else {
            return;
        };

        for button in GamepadButton::ALL {
            let level = button.level(&snapshot);
            ingest.button(button.name(), &mut self.buttons[button as usize], level);
        }

        self.sticks[Stick::Pad as usize].set(dpad(snapshot.buttons));
        self.sticks[Stick::Left as usize].set((thumb(snapshot.thumb_lx), thumb(snapshot.thumb_ly)));
        self.sticks[Stick::Right as usize].set((thumb(snapshot.thumb_rx), thumb(snapshot.thumb_ry)));
    }

    fn flush(&self, backend: &mut dyn Backend) {
        backend.set_rumble(
            self.slot,
            self.rumble(Motor::Left).newest().x(),
            self.rumble(Motor::Right).newest().x(),
        );
    }

    fn clear(&mut self) {
        for button in self.buttons.iter_mut().chain(&mut self.rumble) {
            button.clear();
        }
        for stick in &mut self.sticks {
            stick.clear();
        }
        self.is_ready.clear();
    }

    fn is_ready(&self) -> &Flag {
        &self.is_ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Frame, ScriptedBackend};
    use pulse_core::{Gesture, GestureWindows, InputEvent, ManualClock, Vec2};

    #[test]
    fn axis_normalization() {
        assert_eq!(thumb(i16::MAX), 1.0);
        assert_eq!(thumb(i16::MIN), -1.0);
        assert_eq!(thumb(0), 0.0);
        assert_eq!(trigger(255), 1.0);
        assert_eq!(trigger(0), 0.0);
        assert_eq!(dpad(bits::DPAD_UP | bits::DPAD_LEFT), (-1.0, 1.0));
        assert_eq!(dpad(bits::DPAD_UP | bits::DPAD_DOWN), (0.0, 0.0));
    }

    #[test]
    fn snapshot_feeds_buttons_and_sticks() {
        let clock = ManualClock::shared();
        let mut pad = Gamepad::new(1, &Sampling::new(clock.clone()));
        let mut backend = ScriptedBackend::new(
            clock,
            vec![Frame::at(0.0).gamepad(
                1,
                GamepadSnapshot {
                    buttons: bits::A | bits::DPAD_RIGHT,
                    left_trigger: 255,
                    thumb_lx: i16::MIN,
                    thumb_ry: i16::MAX,
                    ..GamepadSnapshot::default()
                },
            )],
        );
        let windows = GestureWindows::default();
        let mut events = Vec::new();

        assert!(backend.begin_tick());
        pad.update(&mut backend, &mut Ingest::new(pad.id(), &windows, &mut events));

        assert!(pad.button(GamepadButton::A).hold());
        assert!(!pad.button(GamepadButton::B).hold());
        assert_eq!(pad.button(GamepadButton::LeftTrigger).newest().x(), 1.0);
        assert_eq!(pad.stick(Stick::Pad).newest().value, Vec2::new(1.0, 0.0));
        assert_eq!(pad.stick(Stick::Left).newest().value, Vec2::new(-1.0, 0.0));
        assert_eq!(pad.stick(Stick::Right).newest().value, Vec2::new(0.0, 1.0));

        let triggered: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                InputEvent::Gesture {
                    device,
                    control,
                    gesture: Gesture::Trigger,
                    ..
                } => {
                    assert_eq!(*device, DeviceId::gamepad(1));
                    Some(*control)
                }
                _ => None,
            })
            .collect();
        assert_eq!(triggered, ["a", "lt"]);
    }

    #[test]
    fn other_slots_are_not_ready() {
        let clock = ManualClock::shared();
        let mut pad = Gamepad::new(0, &Sampling::new(clock.clone()));
        let mut backend = ScriptedBackend::new(
            clock,
            vec![Frame::at(0.0).gamepad(3, GamepadSnapshot::default())],
        );
        let windows = GestureWindows::default();
        let mut events = Vec::new();

        assert!(backend.begin_tick());
        pad.update(&mut backend, &mut Ingest::new(pad.id(), &windows, &mut events));
        assert!(!pad.is_ready().hold());
        assert!(events.is_empty());
    }

    #[test]
    fn rumble_is_clamped_and_forwarded() {
        let clock = ManualClock::shared();
        let mut pad = Gamepad::new(2, &Sampling::new(clock.clone()));
        let mut backend = ScriptedBackend::new(clock, Vec::new());

        pad.set_rumble(Motor::Left, 1.5);
        pad.set_rumble(Motor::Right, 0.25);
        pad.flush(&mut backend);
        assert_eq!(backend.rumble[2], (1.0, 0.25));

        pad.set_rumble(Motor::Left, -3.0);
        pad.flush(&mut backend);
        assert_eq!(backend.rumble[2], (0.0, 0.25));
    }
}
