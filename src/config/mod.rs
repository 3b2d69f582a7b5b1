use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bluetooth::{DeviceAddress, HardwareId};

#[cfg(test)]
pub mod config_test;

/// Default size of the ring buffer arena in bytes
pub const DEFAULT_BUFFER_SIZE: usize = 0x8000;

/// Represents all possible errors loading a [Config] or [ControllerProfile]
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Could not read: {0}")]
    IoError(#[from] io::Error),
    #[error("Unable to deserialize: {0}")]
    DeserializeError(#[from] serde_yaml::Error),
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// How generic controllers report their face buttons
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum GenericLayout {
    /// Buttons are reported by position (south, east, west, north) and
    /// mapped to the button in the same position.
    #[default]
    Positional,
    /// Buttons are reported by their printed label (A, B, X, Y) and mapped to
    /// the button with the same label.
    Labelled,
}

/// RGB colours stored in the virtual flash of the emulated controller
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ControllerColours {
    pub body: [u8; 3],
    pub buttons: [u8; 3],
    pub left_grip: [u8; 3],
    pub right_grip: [u8; 3],
}

impl Default for ControllerColours {
    fn default() -> Self {
        Self {
            body: [0x32, 0x32, 0x32],
            buttons: [0xff, 0xff, 0xff],
            left_grip: [0x32, 0x32, 0x32],
            right_grip: [0x32, 0x32, 0x32],
        }
    }
}

impl ControllerColours {
    /// Colours in the order they are stored in flash
    pub fn to_bytes(&self) -> [u8; 12] {
        let mut bytes = [0; 12];
        bytes[0..3].copy_from_slice(&self.body);
        bytes[3..6].copy_from_slice(&self.buttons);
        bytes[6..9].copy_from_slice(&self.left_grip);
        bytes[9..12].copy_from_slice(&self.right_grip);
        bytes
    }
}

/// Per-controller behavior of the translation
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "snake_case", default)]
pub struct ControllerProfile {
    pub enable_rumble: bool,
    pub enable_motion: bool,
    pub swap_dpad_lstick: bool,
    pub invert_lstick_xaxis: bool,
    pub invert_lstick_yaxis: bool,
    pub invert_rstick_xaxis: bool,
    pub invert_rstick_yaxis: bool,
    pub generic_layout: GenericLayout,
    pub colours: ControllerColours,
}

impl Default for ControllerProfile {
    fn default() -> Self {
        Self {
            enable_rumble: true,
            enable_motion: true,
            swap_dpad_lstick: false,
            invert_lstick_xaxis: false,
            invert_lstick_yaxis: false,
            invert_rstick_xaxis: false,
            invert_rstick_yaxis: false,
            generic_layout: GenericLayout::default(),
            colours: ControllerColours::default(),
        }
    }
}

impl ControllerProfile {
    /// Load a [ControllerProfile] from the given YAML string
    pub fn from_yaml(content: String) -> Result<ControllerProfile, LoadError> {
        let profile: ControllerProfile = serde_yaml::from_str(content.as_str())?;
        Ok(profile)
    }

    /// Load a [ControllerProfile] from the given YAML file
    pub fn from_yaml_file(path: String) -> Result<ControllerProfile, LoadError> {
        let file = std::fs::File::open(path)?;
        let profile: ControllerProfile = serde_yaml::from_reader(file)?;
        Ok(profile)
    }
}

/// Profile override for a single controller
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct DeviceProfileOverride {
    /// Device address in `AA:BB:CC:DD:EE:FF` form
    pub address: String,
    pub profile: ControllerProfile,
}

/// Vendor/product pair that should be handled by the generic decoder
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GenericDeviceId {
    pub vendor_id: u16,
    pub product_id: u16,
}

/// Service configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "snake_case", default)]
pub struct Config {
    pub version: u32,
    /// Size of the ring buffer arena in bytes
    pub buffer_size: usize,
    /// Profile used by every controller without an override
    pub default_profile: ControllerProfile,
    pub devices: Vec<DeviceProfileOverride>,
    pub generic_devices: Vec<GenericDeviceId>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: 1,
            buffer_size: DEFAULT_BUFFER_SIZE,
            default_profile: ControllerProfile::default(),
            devices: Vec::new(),
            generic_devices: Vec::new(),
        }
    }
}

impl Config {
    /// Load a [Config] from the given YAML string
    pub fn from_yaml(content: String) -> Result<Config, LoadError> {
        let config: Config = serde_yaml::from_str(content.as_str())?;
        config.validate()?;
        Ok(config)
    }

    /// Load a [Config] from the given YAML file
    pub fn from_yaml_file(path: String) -> Result<Config, LoadError> {
        let file = std::fs::File::open(path)?;
        let config: Config = serde_yaml::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot check for us
    pub fn validate(&self) -> Result<(), LoadError> {
        if self.buffer_size == 0 {
            return Err(LoadError::InvalidValue {
                field: "buffer_size".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        for device in self.devices.iter() {
            if let Err(e) = device.address.parse::<DeviceAddress>() {
                return Err(LoadError::InvalidValue {
                    field: "devices.address".to_string(),
                    reason: format!("{}: {e}", device.address),
                });
            }
        }
        Ok(())
    }

    /// Returns the profile that applies to the given controller
    pub fn profile_for(&self, address: &DeviceAddress) -> ControllerProfile {
        let device = self.devices.iter().find(|device| {
            device
                .address
                .parse::<DeviceAddress>()
                .is_ok_and(|a| a == *address)
        });
        match device {
            Some(device) => {
                log::debug!("Using profile override for {address}");
                device.profile.clone()
            }
            None => self.default_profile.clone(),
        }
    }

    /// Returns true if the given hardware id was configured to use the
    /// generic decoder
    pub fn is_generic_device(&self, hardware_id: &HardwareId) -> bool {
        self.generic_devices
            .iter()
            .any(|id| id.vendor_id == hardware_id.vid && id.product_id == hardware_id.pid)
    }
}
