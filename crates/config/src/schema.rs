use pulse_core::{DeviceId, DeviceKind, GestureWindows, PulseError, Result, DEFAULT_CAPACITY};
use serde::{Deserialize, Serialize};

/// Smallest history that still holds a full double click.
pub const MIN_CAPACITY: usize = 5;

/// Root configuration structure parsed from `pulse.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseConfig {
    pub poll: PollConfig,
    /// Time windows for edge and click gestures.
    pub gestures: GestureWindows,
    pub thresholds: ThresholdConfig,
    pub devices: DeviceConfig,
}

/// Polling loop settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Milliseconds between ticks.
    pub interval_ms: u64,
    /// Samples kept per control.
    pub history_capacity: usize,
    /// Mark every history stale while the application is unfocused.
    pub clear_on_focus_loss: bool,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: 16,
            history_capacity: DEFAULT_CAPACITY,
            clear_on_focus_loss: true,
        }
    }
}

/// Deduplication tolerances; readings closer than this to the newest
/// sample are coalesced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub button: f32,
    pub axis: f32,
}

/// Which devices to poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub keyboard: bool,
    pub mouse: bool,
    /// Gamepad slots, `0..4`.
    pub gamepads: Vec<usize>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            keyboard: true,
            mouse: true,
            gamepads: vec![0],
        }
    }
}

impl DeviceConfig {
    /// Enabled devices in acquisition order.
    pub fn ids(&self) -> Vec<DeviceId> {
        let mut ids = Vec::new();
        if self.keyboard {
            ids.push(DeviceId::keyboard());
        }
        if self.mouse {
            ids.push(DeviceId::mouse());
        }
        ids.extend(self.gamepads.iter().map(|&slot| DeviceId::gamepad(slot)));
        ids
    }
}

impl PulseConfig {
    /// Reject settings the poller cannot honour.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(PulseError::Config(msg));

        if self.poll.interval_ms == 0 {
            return fail("poll.interval_ms must be positive".into());
        }
        if self.poll.history_capacity < MIN_CAPACITY {
            return fail(format!(
                "poll.history_capacity must be at least {MIN_CAPACITY}, got {}",
                self.poll.history_capacity
            ));
        }
        // `!(x >= 0.0)` also catches NaN.
        if !(self.gestures.edge_interval >= 0.0) || !(self.gestures.click_interval >= 0.0) {
            return fail("gesture windows must be non-negative".into());
        }
        if !(self.thresholds.button >= 0.0) || !(self.thresholds.axis >= 0.0) {
            return fail("thresholds must be non-negative".into());
        }

        let max = DeviceKind::Gamepad.max_devices();
        if let Some(slot) = self.devices.gamepads.iter().find(|&&slot| slot >= max) {
            return fail(format!("gamepad slot {slot} out of range 0..{max}"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = PulseConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.poll.interval_ms, 16);
        assert_eq!(config.gestures.edge_interval, 0.0125);
        assert_eq!(
            config.devices.ids(),
            [DeviceId::keyboard(), DeviceId::mouse(), DeviceId::gamepad(0)]
        );
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config: PulseConfig = toml::from_str(
            r#"
            [gestures]
            click_interval = 0.3

            [devices]
            mouse = false
            gamepads = [1, 2]
            "#,
        )
        .unwrap();

        assert_eq!(config.gestures.click_interval, 0.3);
        assert_eq!(config.gestures.edge_interval, 0.0125);
        assert_eq!(config.poll.history_capacity, 120);
        assert_eq!(
            config.devices.ids(),
            [DeviceId::keyboard(), DeviceId::gamepad(1), DeviceId::gamepad(2)]
        );
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = PulseConfig::default();
        config.poll.history_capacity = 4;
        assert!(config.validate().is_err());

        let mut config = PulseConfig::default();
        config.poll.interval_ms = 0;
        assert!(config.validate().is_err());

        let mut config = PulseConfig::default();
        config.gestures.click_interval = -1.0;
        assert!(config.validate().is_err());

        let mut config = PulseConfig::default();
        config.thresholds.axis = f32::NAN;
        assert!(config.validate().is_err());

        let mut config = PulseConfig::default();
        config.devices.gamepads = vec![0, 4];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("gamepad slot 4"));
    }
}
