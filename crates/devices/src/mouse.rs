use crate::backend::{Backend, CursorRequests, MouseSnapshot, Rect};
use crate::device::{Ingest, InputDevice, Sampling};
use pulse_core::{Button, Coordinate, DeviceId, Flag};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

impl MouseButton {
    pub const ALL: [MouseButton; 3] = [Self::Left, Self::Middle, Self::Right];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Middle => "middle",
            Self::Right => "right",
        }
    }
}

/// Planar mouse readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseAxis {
    /// Accumulated wheel position.
    Wheel,
    /// Cursor in `[-1, 1]` over the client area, y up.
    Local,
    /// Cursor in `[-1, 1]` over the whole desktop, y up.
    Global,
    /// Cursor in client pixels from the top-left corner.
    Client,
    /// Cursor in desktop pixels.
    Desktop,
}

impl MouseAxis {
    const COUNT: usize = 5;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseFlag {
    /// Cursor is over the client area.
    Hover,
    Connected,
    /// Requested by the application: hide the cursor.
    Hidden,
    /// Requested by the application: confine the cursor to the client area.
    Clipped,
    /// Requested by the application: re-center the cursor every tick.
    Centered,
}

impl MouseFlag {
    const COUNT: usize = 5;
}

/// Map `v` from `[lo, lo + span)` to `[-1, 1)`.
fn normalize(v: f32, lo: f32, span: f32) -> f32 {
    if span <= 0.0 {
        return 0.0;
    }
    -1.0 + 2.0 * (v - lo) / span
}

/// Normalized position of `(x, y)` inside `rect`, y pointing up.
fn unit_position(rect: &Rect, x: f32, y: f32) -> (f32, f32) {
    (
        normalize(x, rect.left, rect.width()),
        -normalize(y, rect.top, rect.height()),
    )
}

#[derive(Debug, Clone)]
pub struct Mouse {
    buttons: [Button; 3],
    axes: Vec<Coordinate>,
    flags: Vec<Flag>,
}

impl Mouse {
    pub fn new(sampling: &Sampling) -> Self {
        Self {
            buttons: [sampling.button(), sampling.button(), sampling.button()],
            axes: (0..MouseAxis::COUNT).map(|_| sampling.coordinate()).collect(),
            flags: (0..MouseFlag::COUNT).map(|_| sampling.flag()).collect(),
        }
    }

    pub fn button(&self, button: MouseButton) -> &Button {
        &self.buttons[button as usize]
    }

    pub fn axis(&self, axis: MouseAxis) -> &Coordinate {
        &self.axes[axis as usize]
    }

    pub fn flag(&self, flag: MouseFlag) -> &Flag {
        &self.flags[flag as usize]
    }

    /// Ask for a cursor behaviour; forwarded to the backend after the next
    /// update.  Only the request flags (`Hidden`, `Clipped`, `Centered`) are
    /// writable, the others are ignored.
    pub fn request(&mut self, flag: MouseFlag, on: bool) {
        if matches!(
            flag,
            MouseFlag::Hidden | MouseFlag::Clipped | MouseFlag::Centered
        ) {
            self.flags[flag as usize].set(on);
        }
    }

    pub fn cursor_requests(&self) -> CursorRequests {
        CursorRequests {
            hidden: self.flag(MouseFlag::Hidden).hold(),
            clipped: self.flag(MouseFlag::Clipped).hold(),
            centered: self.flag(MouseFlag::Centered).hold(),
        }
    }

    fn ingest_position(&mut self, snapshot: &MouseSnapshot) {
        let (x, y) = snapshot.cursor;
        self.axes[MouseAxis::Desktop as usize].set((x, y));
        self.axes[MouseAxis::Global as usize].set(unit_position(&snapshot.desktop, x, y));

        let client = snapshot.client.filter(|rect| rect.contains(x, y));
        self.flags[MouseFlag::Hover as usize].set(client.is_some());
        if let Some(rect) = client {
            self.axes[MouseAxis::Client as usize].set((x - rect.left, y - rect.top));
            self.axes[MouseAxis::Local as usize].set(unit_position(&rect, x, y));
        }
    }
}

impl InputDevice for Mouse {
    fn id(&self) -> DeviceId {
        DeviceId::mouse()
    }

    fn update(&mut self, backend: &mut dyn Backend, ingest: &mut Ingest<'_>) {
        let snapshot = backend.poll_mouse();
        ingest.ready(
            &mut self.flags[MouseFlag::Connected as usize],
            snapshot.is_some(),
        );
        let Some(snapshot) = snapshot else {
            return;
        };

        for button in MouseButton::ALL {
            let level = if snapshot.buttons[button as usize] { 1.0 } else { 0.0 };
            ingest.button(button.name(), &mut self.buttons[button as usize], level);
        }
        self.axes[MouseAxis::Wheel as usize].set(snapshot.wheel);
        self.ingest_position(&snapshot);
    }

    fn flush(&self, backend: &mut dyn Backend) {
        backend.apply_cursor(self.cursor_requests());
    }

    fn clear(&mut self) {
        for button in self.buttons.iter_mut().chain(&mut self.flags) {
            button.clear();
        }
        for axis in &mut self.axes {
            axis.clear();
        }
    }

    fn is_ready(&self) -> &Flag {
        self.flag(MouseFlag::Connected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Frame, ScriptedBackend};
    use pulse_core::{GestureWindows, InputEvent, ManualClock, Vec2};

    const DESKTOP: Rect = Rect::new(0.0, 0.0, 200.0, 100.0);
    const CLIENT: Rect = Rect::new(50.0, 0.0, 150.0, 50.0);

    fn at(x: f32, y: f32) -> MouseSnapshot {
        MouseSnapshot {
            cursor: (x, y),
            desktop: DESKTOP,
            client: Some(CLIENT),
            ..MouseSnapshot::default()
        }
    }

    fn run(frames: Vec<Frame>) -> (Mouse, ScriptedBackend, Vec<InputEvent>) {
        let clock = ManualClock::shared();
        let mut mouse = Mouse::new(&Sampling::new(clock.clone()));
        let mut backend = ScriptedBackend::new(clock, frames);
        let windows = GestureWindows::default();
        let mut events = Vec::new();
        while backend.begin_tick() {
            mouse.update(
                &mut backend,
                &mut Ingest::new(DeviceId::mouse(), &windows, &mut events),
            );
            mouse.flush(&mut backend);
        }
        (mouse, backend, events)
    }

    #[test]
    fn global_and_local_positions_are_normalized() {
        let (mouse, _, _) = run(vec![Frame::at(0.0).mouse(at(100.0, 25.0))]);

        assert_eq!(mouse.axis(MouseAxis::Desktop).newest().value, Vec2::new(100.0, 25.0));
        assert_eq!(mouse.axis(MouseAxis::Global).newest().value, Vec2::new(0.0, 0.5));
        assert_eq!(mouse.axis(MouseAxis::Client).newest().value, Vec2::new(50.0, 25.0));
        assert_eq!(mouse.axis(MouseAxis::Local).newest().value, Vec2::new(0.0, 0.0));
        assert!(mouse.flag(MouseFlag::Hover).hold());
    }

    #[test]
    fn hover_drops_outside_the_client_area() {
        let (mouse, _, _) = run(vec![
            Frame::at(0.0).mouse(at(60.0, 30.0)),
            Frame::at(0.1).mouse(at(0.0, 0.0)),
        ]);

        assert!(!mouse.flag(MouseFlag::Hover).hold());
        // Client coordinates keep the last position inside the window.
        assert_eq!(mouse.axis(MouseAxis::Client).newest().value, Vec2::new(10.0, 30.0));
        assert_eq!(mouse.axis(MouseAxis::Global).newest().value, Vec2::new(-1.0, 1.0));
    }

    #[test]
    fn buttons_report_gestures() {
        let mut down = at(60.0, 30.0);
        down.buttons = [true, false, false];
        let (mouse, _, events) = run(vec![
            Frame::at(0.0).mouse(at(60.0, 30.0)),
            Frame::at(0.016).mouse(down),
            Frame::at(0.1).mouse(at(60.0, 30.0)),
        ]);

        let controls: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                InputEvent::Gesture { control, gesture, .. } => Some((*control, gesture.as_str())),
                _ => None,
            })
            .collect();
        assert_eq!(
            controls,
            [("left", "trigger"), ("left", "release"), ("left", "click")]
        );
        assert!(mouse.button(MouseButton::Left).click());
        assert!(mouse.is_ready().hold());
    }

    #[test]
    fn cursor_requests_reach_the_backend() {
        let clock = ManualClock::shared();
        let mut mouse = Mouse::new(&Sampling::new(clock.clone()));
        let mut backend = ScriptedBackend::new(clock, vec![Frame::at(0.0).mouse(at(0.0, 0.0))]);

        mouse.request(MouseFlag::Hidden, true);
        mouse.request(MouseFlag::Hover, true);
        assert!(!mouse.flag(MouseFlag::Hover).hold());

        assert!(backend.begin_tick());
        mouse.flush(&mut backend);
        assert_eq!(
            backend.cursor,
            CursorRequests {
                hidden: true,
                clipped: false,
                centered: false,
            }
        );
    }

    #[test]
    fn normalize_handles_degenerate_rects() {
        assert_eq!(normalize(5.0, 0.0, 0.0), 0.0);
        assert_eq!(normalize(0.0, 0.0, 10.0), -1.0);
        assert_eq!(normalize(5.0, 0.0, 10.0), 0.0);
    }
}
