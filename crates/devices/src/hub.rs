use crate::backend::Backend;
use crate::device::{Device, Ingest, InputDevice, Sampling};
use crate::registry::{DeviceRegistry, Lease};
use pulse_core::{DeviceId, GestureWindows, InputEvent, PulseError, Result, SharedClock};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// A caller's claim on one device instance.
///
/// Handles are not `Clone`: releasing consumes the handle.
#[derive(Debug, PartialEq, Eq)]
pub struct Handle {
    id: DeviceId,
    token: u64,
}

impl Handle {
    pub fn id(&self) -> DeviceId {
        self.id
    }
}

#[derive(Debug)]
struct Owned {
    token: u64,
    device: Device,
}

/// Owns every polled device and the mirrors handed out to extra callers.
///
/// One tick:
/// 1. Query focus; on loss with `clear_on_focus_loss` set, clear every owner
///    and stop there.  Otherwise keep polling while unfocused.
/// 2. Update each owner from the backend, then flush its outputs.
/// 3. Copy each owner's state into its mirrors.
#[derive(Debug)]
pub struct InputHub {
    sampling: Sampling,
    windows: GestureWindows,
    clear_on_focus_loss: bool,
    focused: bool,
    registry: DeviceRegistry,
    owners: BTreeMap<DeviceId, Owned>,
    /// Keyed by token, so iteration follows acquisition order.
    mirrors: BTreeMap<u64, (DeviceId, Device)>,
    next_token: u64,
}

impl InputHub {
    pub fn new(sampling: Sampling) -> Self {
        Self {
            sampling,
            windows: GestureWindows::default(),
            clear_on_focus_loss: true,
            focused: true,
            registry: DeviceRegistry::new(),
            owners: BTreeMap::new(),
            mirrors: BTreeMap::new(),
            next_token: 0,
        }
    }

    pub fn with_windows(mut self, windows: GestureWindows) -> Self {
        self.windows = windows;
        self
    }

    pub fn clear_on_focus_loss(mut self, clear: bool) -> Self {
        self.clear_on_focus_loss = clear;
        self
    }

    pub fn clock(&self) -> &SharedClock {
        &self.sampling.clock
    }

    pub fn windows(&self) -> &GestureWindows {
        &self.windows
    }

    pub fn set_windows(&mut self, windows: GestureWindows) {
        if windows != self.windows {
            info!(
                "gesture windows: edge {}s, click {}s",
                windows.edge_interval, windows.click_interval
            );
            self.windows = windows;
        }
    }

    // ── Leasing ───────────────────────────────────────────────────────────────

    pub fn acquire(&mut self, id: DeviceId) -> Result<Handle> {
        let lease = self.registry.acquire(id)?;
        let token = self.next_token;
        self.next_token += 1;

        match lease {
            Lease::Owner => {
                debug!("{id}: new owner");
                let device = Device::new(id, &self.sampling);
                self.owners.insert(id, Owned { token, device });
            }
            Lease::Mirror => {
                let owner = self.owners.get(&id).ok_or_else(|| {
                    PulseError::Device(format!("{id} has instances but no owner"))
                })?;
                debug!("{id}: new mirror");
                self.mirrors.insert(token, (id, owner.device.clone()));
            }
        }
        Ok(Handle { id, token })
    }

    /// Drop a handle.  Releasing an owner promotes the oldest mirror, which
    /// keeps the state it last copied.
    pub fn release(&mut self, handle: Handle) -> Result<()> {
        self.registry.release(handle.id)?;

        if self.mirrors.remove(&handle.token).is_some() {
            return Ok(());
        }

        self.owners.remove(&handle.id);
        let heir = self
            .mirrors
            .iter()
            .find(|(_, (id, _))| *id == handle.id)
            .map(|(token, _)| *token);
        if let Some(token) = heir {
            if let Some((id, device)) = self.mirrors.remove(&token) {
                info!("{id}: mirror promoted to owner");
                self.owners.insert(id, Owned { token, device });
            }
        }
        Ok(())
    }

    /// Role currently held by `handle`, `None` once released.
    pub fn lease(&self, handle: &Handle) -> Option<Lease> {
        match self.owners.get(&handle.id) {
            Some(owned) if owned.token == handle.token => Some(Lease::Owner),
            _ if self.mirrors.contains_key(&handle.token) => Some(Lease::Mirror),
            _ => None,
        }
    }

    pub fn device(&self, handle: &Handle) -> Option<&Device> {
        match self.owners.get(&handle.id) {
            Some(owned) if owned.token == handle.token => Some(&owned.device),
            _ => self.mirrors.get(&handle.token).map(|(_, device)| device),
        }
    }

    /// Mutable access for outputs (rumble, cursor requests).  Only the owner
    /// is writable; mirrors are overwritten every tick.
    pub fn device_mut(&mut self, handle: &Handle) -> Option<&mut Device> {
        self.owners
            .get_mut(&handle.id)
            .filter(|owned| owned.token == handle.token)
            .map(|owned| &mut owned.device)
    }

    /// Devices with a live owner, in id order.
    pub fn devices(&self) -> impl Iterator<Item = DeviceId> + '_ {
        self.owners.keys().copied()
    }

    // ── Polling ───────────────────────────────────────────────────────────────

    /// Poll every owned device once and return the events it produced.
    pub fn tick(&mut self, backend: &mut dyn Backend) -> Vec<InputEvent> {
        let mut events = Vec::new();

        if !backend.has_focus() {
            if self.focused {
                info!("input focus lost");
                events.push(InputEvent::FocusLost);
                self.focused = false;
            }
            if self.clear_on_focus_loss {
                for owned in self.owners.values_mut() {
                    owned.device.clear();
                }
                self.refresh_mirrors();
                return events;
            }
        } else if !self.focused {
            info!("input focus gained");
            events.push(InputEvent::FocusGained);
            self.focused = true;
        }

        for (id, owned) in &mut self.owners {
            let mut ingest = Ingest::new(*id, &self.windows, &mut events);
            owned.device.update(backend, &mut ingest);
            owned.device.flush(backend);
        }

        self.refresh_mirrors();
        events
    }

    fn refresh_mirrors(&mut self) {
        for (id, mirror) in self.mirrors.values_mut() {
            if let Some(owned) = self.owners.get(id) {
                mirror.clone_from(&owned.device);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Frame, GamepadSnapshot, ScriptedBackend};
    use crate::gamepad::{bits, GamepadButton, Motor};
    use crate::keycode::Keycode;
    use pulse_core::{Gesture, ManualClock};
    use std::sync::Arc;

    fn hub() -> (Arc<ManualClock>, InputHub) {
        let clock = ManualClock::shared();
        let hub = InputHub::new(Sampling::new(clock.clone()));
        (clock, hub)
    }

    fn drain(hub: &mut InputHub, backend: &mut ScriptedBackend) -> Vec<InputEvent> {
        let mut events = Vec::new();
        while backend.begin_tick() {
            events.extend(hub.tick(backend));
        }
        events
    }

    #[test]
    fn second_acquire_mirrors_the_owner() {
        let (clock, mut hub) = hub();
        let owner = hub.acquire(DeviceId::keyboard()).unwrap();
        let mirror = hub.acquire(DeviceId::keyboard()).unwrap();
        assert_eq!(hub.lease(&owner), Some(Lease::Owner));
        assert_eq!(hub.lease(&mirror), Some(Lease::Mirror));

        let mut backend = ScriptedBackend::new(
            clock,
            vec![Frame::at(0.0).keys(&[]), Frame::at(0.016).keys(&[Keycode::Space])],
        );
        let events = drain(&mut hub, &mut backend);

        // Only the owner produces events.
        let triggers = events
            .iter()
            .filter(|e| matches!(e, InputEvent::Gesture { gesture: Gesture::Trigger, .. }))
            .count();
        assert_eq!(triggers, 1);

        let kb = hub.device(&mirror).and_then(Device::as_keyboard).unwrap();
        assert!(kb.key(Keycode::Space).trigger());
        assert!(hub.device_mut(&mirror).is_none());
        assert!(hub.device_mut(&owner).is_some());
    }

    #[test]
    fn releasing_the_owner_promotes_the_oldest_mirror() {
        let (_, mut hub) = hub();
        let owner = hub.acquire(DeviceId::mouse()).unwrap();
        let first = hub.acquire(DeviceId::mouse()).unwrap();
        let second = hub.acquire(DeviceId::mouse()).unwrap();

        hub.release(owner).unwrap();
        assert_eq!(hub.lease(&first), Some(Lease::Owner));
        assert_eq!(hub.lease(&second), Some(Lease::Mirror));

        hub.release(first).unwrap();
        hub.release(second).unwrap();
        assert_eq!(hub.devices().count(), 0);
        assert!(hub.acquire(DeviceId::gamepad(7)).is_err());
    }

    #[test]
    fn focus_loss_clears_and_reports_once() {
        let (clock, mut hub) = hub();
        let kb = hub.acquire(DeviceId::keyboard()).unwrap();
        let mut backend = ScriptedBackend::new(
            clock,
            vec![
                Frame::at(0.0).keys(&[]),
                Frame::at(0.016).keys(&[Keycode::Enter]),
                Frame::at(0.032).keys(&[]).unfocused(),
                Frame::at(0.048).keys(&[]).unfocused(),
                Frame::at(0.064).keys(&[Keycode::Enter]),
            ],
        );
        let events = drain(&mut hub, &mut backend);

        let focus: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, InputEvent::FocusLost | InputEvent::FocusGained))
            .collect();
        assert_eq!(focus, [&InputEvent::FocusLost, &InputEvent::FocusGained]);

        // Unfocused readings are ignored, so Enter never looked released.
        let triggers = events
            .iter()
            .filter(|e| matches!(e, InputEvent::Gesture { control: "enter", .. }))
            .count();
        assert_eq!(triggers, 1);

        let keyboard = hub.device(&kb).and_then(Device::as_keyboard).unwrap();
        let enter = keyboard.key(Keycode::Enter);
        assert!(enter.hold());
        assert_eq!(enter.oldest().t, 0.048);
    }

    #[test]
    fn unfocused_input_is_kept_without_clearing() {
        let clock = ManualClock::shared();
        let mut hub = InputHub::new(Sampling::new(clock.clone())).clear_on_focus_loss(false);
        let kb = hub.acquire(DeviceId::keyboard()).unwrap();
        let mut backend = ScriptedBackend::new(
            clock,
            vec![
                Frame::at(0.0).keys(&[]),
                Frame::at(0.016).keys(&[Keycode::Space]).unfocused(),
                Frame::at(0.032).keys(&[Keycode::Space]),
            ],
        );
        let events = drain(&mut hub, &mut backend);

        assert!(events.contains(&InputEvent::FocusLost));
        assert!(events.contains(&InputEvent::FocusGained));
        assert!(events.iter().any(|e| matches!(
            e,
            InputEvent::Gesture { control: "space", gesture: Gesture::Trigger, at, .. } if *at == 0.016
        )));

        let keyboard = hub.device(&kb).and_then(Device::as_keyboard).unwrap();
        assert!(keyboard.key(Keycode::Space).hold());
        // Never cleared: the primed slots keep their construction time.
        assert_eq!(keyboard.key(Keycode::Space).oldest().t, 0.0);
    }

    #[test]
    fn rumble_requests_reach_the_backend() {
        let (clock, mut hub) = hub();
        let pad = hub.acquire(DeviceId::gamepad(1)).unwrap();
        hub.device_mut(&pad)
            .and_then(Device::as_gamepad_mut)
            .unwrap()
            .set_rumble(Motor::Right, 0.5);

        let snapshot = GamepadSnapshot {
            buttons: bits::B,
            ..GamepadSnapshot::default()
        };
        let mut backend = ScriptedBackend::new(clock, vec![Frame::at(0.0).gamepad(1, snapshot)]);
        let events = drain(&mut hub, &mut backend);

        assert_eq!(backend.rumble[1], (0.0, 0.5));
        assert!(events.contains(&InputEvent::Connected(DeviceId::gamepad(1))));
        let pad = hub.device(&pad).and_then(Device::as_gamepad).unwrap();
        assert!(pad.button(GamepadButton::B).hold());
    }
}
