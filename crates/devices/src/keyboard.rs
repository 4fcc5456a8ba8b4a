use crate::backend::Backend;
use crate::device::{Ingest, InputDevice, Sampling};
use crate::keycode::Keycode;
use pulse_core::{Button, DeviceId, Flag};

/// One history per [`Keycode`]; pressed keys read `1.0`.
#[derive(Debug, Clone)]
pub struct Keyboard {
    keys: Vec<Button>,
    is_ready: Flag,
}

impl Keyboard {
    pub fn new(sampling: &Sampling) -> Self {
        Self {
            keys: (0..Keycode::COUNT).map(|_| sampling.button()).collect(),
            is_ready: sampling.flag(),
        }
    }

    pub fn key(&self, key: Keycode) -> &Button {
        &self.keys[key.index()]
    }

    pub fn key_mut(&mut self, key: Keycode) -> &mut Button {
        &mut self.keys[key.index()]
    }

    pub fn keys(&self) -> impl Iterator<Item = (Keycode, &Button)> {
        Keycode::ALL.iter().copied().zip(self.keys.iter())
    }
}

impl InputDevice for Keyboard {
    fn id(&self) -> DeviceId {
        DeviceId::keyboard()
    }

    fn update(&mut self, backend: &mut dyn Backend, ingest: &mut Ingest<'_>) {
        let snapshot = backend.poll_keyboard();
        ingest.ready(&mut self.is_ready, snapshot.is_some());
        let Some(snapshot) = snapshot else {
            return;
        };

        for &key in Keycode::ALL {
            let level = if snapshot.is_down(key) { 1.0 } else { 0.0 };
            ingest.button(key.name(), &mut self.keys[key.index()], level);
        }
    }

    fn clear(&mut self) {
        for key in &mut self.keys {
            key.clear();
        }
        self.is_ready.clear();
    }

    fn is_ready(&self) -> &Flag {
        &self.is_ready
    }
}
