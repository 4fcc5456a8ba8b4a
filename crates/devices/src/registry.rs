use pulse_core::{DeviceId, PulseError, Result};
use std::collections::BTreeMap;

/// Role granted by [`DeviceRegistry::acquire`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lease {
    /// Polls the backend and owns the histories.
    Owner,
    /// Receives a copy of the owner's state after every tick.
    Mirror,
}

/// Counts live instances per device.
///
/// The first instance of a device becomes its owner, later ones mirror it.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    instances: BTreeMap<DeviceId, usize>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&mut self, id: DeviceId) -> Result<Lease> {
        let max = id.kind.max_devices();
        if id.slot >= max {
            return Err(PulseError::Device(format!(
                "{id}: only {max} {} slot(s) available",
                id.kind.as_str()
            )));
        }

        let count = self.instances.entry(id).or_insert(0);
        *count += 1;
        Ok(if *count == 1 {
            Lease::Owner
        } else {
            Lease::Mirror
        })
    }

    /// Drop one instance; returns how many remain.
    pub fn release(&mut self, id: DeviceId) -> Result<usize> {
        let Some(count) = self.instances.get_mut(&id) else {
            return Err(PulseError::Device(format!("{id} was never acquired")));
        };
        *count -= 1;
        let remaining = *count;
        if remaining == 0 {
            self.instances.remove(&id);
        }
        Ok(remaining)
    }

    #[must_use]
    pub fn instances(&self, id: DeviceId) -> usize {
        self.instances.get(&id).copied().unwrap_or(0)
    }

    /// Devices with at least one live instance, in id order.
    pub fn devices(&self) -> impl Iterator<Item = DeviceId> + '_ {
        self.instances.keys().copied()
    }
}
