//! Decoders for the supported device families.
//!
//! Each family lives in its own module with a `driver` that updates a
//! [ControllerState] from raw input reports and writes output reports back
//! to the physical device. [ControllerDriver] wraps them in a closed enum
//! so a handler can own any of them.
pub mod dualsense;
pub mod dualshock4;
pub mod generic;
pub mod switch;
pub mod wii;
pub mod xbox_one;

#[cfg(test)]
pub mod mod_test;

use crate::{
    bluetooth::{is_gamepad_class, DeviceWriter, HardwareId, HidReport},
    config::{Config, ControllerProfile},
    controller::state::ControllerState,
};

/// Supported device families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceFamily {
    DualShock4,
    DualSense,
    XboxOne,
    Wii,
    Generic,
}

impl DeviceFamily {
    /// Returns the family with a dedicated decoder for the given hardware id
    pub fn from_hardware_id(id: &HardwareId) -> Option<Self> {
        let family = match id.vid {
            dualshock4::VID if dualshock4::PIDS.contains(&id.pid) => Self::DualShock4,
            dualsense::VID if dualsense::PIDS.contains(&id.pid) => Self::DualSense,
            xbox_one::VID if xbox_one::PIDS.contains(&id.pid) => Self::XboxOne,
            wii::VID if wii::PIDS.contains(&id.pid) => Self::Wii,
            _ => return None,
        };
        Some(family)
    }

    /// Identify a newly connected device. Known hardware ids win, then the
    /// configured generic device list, then the class of device.
    pub fn identify(config: &Config, id: &HardwareId, class_of_device: u32) -> Option<Self> {
        if let Some(family) = Self::from_hardware_id(id) {
            return Some(family);
        }
        if config.is_generic_device(id) || is_gamepad_class(class_of_device) {
            return Some(Self::Generic);
        }
        None
    }

    /// Parse a family name as used on the command line
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "dualshock4" | "ds4" => Some(Self::DualShock4),
            "dualsense" | "ds5" => Some(Self::DualSense),
            "xbox_one" | "xbox" => Some(Self::XboxOne),
            "wii" => Some(Self::Wii),
            "generic" => Some(Self::Generic),
            _ => None,
        }
    }
}

/// Decoder for one physical controller
#[derive(Debug)]
pub enum ControllerDriver {
    DualShock4(dualshock4::driver::Driver),
    DualSense(dualsense::driver::Driver),
    XboxOne(xbox_one::driver::Driver),
    Wii(wii::driver::Driver),
    Generic(generic::driver::Driver),
}

impl ControllerDriver {
    pub fn new(family: DeviceFamily, writer: DeviceWriter, profile: &ControllerProfile) -> Self {
        match family {
            DeviceFamily::DualShock4 => Self::DualShock4(dualshock4::driver::Driver::new(writer)),
            DeviceFamily::DualSense => Self::DualSense(dualsense::driver::Driver::new(writer)),
            DeviceFamily::XboxOne => Self::XboxOne(xbox_one::driver::Driver::new(writer)),
            DeviceFamily::Wii => Self::Wii(wii::driver::Driver::new(writer)),
            DeviceFamily::Generic => Self::Generic(generic::driver::Driver::new(
                writer,
                profile.generic_layout,
            )),
        }
    }

    pub fn family(&self) -> DeviceFamily {
        match self {
            Self::DualShock4(_) => DeviceFamily::DualShock4,
            Self::DualSense(_) => DeviceFamily::DualSense,
            Self::XboxOne(_) => DeviceFamily::XboxOne,
            Self::Wii(_) => DeviceFamily::Wii,
            Self::Generic(_) => DeviceFamily::Generic,
        }
    }

    /// Update the controller state from the given input report. Unknown
    /// and malformed reports leave the state untouched.
    pub fn update(&mut self, report: &HidReport, state: &mut ControllerState) {
        match self {
            Self::DualShock4(driver) => driver.update(report, state),
            Self::DualSense(driver) => driver.update(report, state),
            Self::XboxOne(driver) => driver.update(report, state),
            Self::Wii(driver) => driver.update(report, state),
            Self::Generic(driver) => driver.update(report, state),
        }
    }

    /// Show the player indicator set by the console
    pub fn set_player_leds(&mut self, leds: u8) {
        match self {
            Self::DualShock4(driver) => driver.set_player_leds(leds),
            Self::DualSense(driver) => driver.set_player_leds(leds),
            Self::XboxOne(driver) => driver.set_player_leds(leds),
            Self::Wii(driver) => driver.set_player_leds(leds),
            Self::Generic(driver) => driver.set_player_leds(leds),
        }
    }

    /// Drive the strong (left) and weak (right) motors
    pub fn rumble(&mut self, left: u8, right: u8) {
        match self {
            Self::DualShock4(driver) => driver.rumble(left, right),
            Self::DualSense(driver) => driver.rumble(left, right),
            Self::XboxOne(driver) => driver.rumble(left, right),
            Self::Wii(driver) => driver.rumble(left, right),
            Self::Generic(driver) => driver.rumble(left, right),
        }
    }

    /// Send whatever the device needs right after it connects
    pub fn initialize(&mut self) {
        match self {
            Self::DualShock4(driver) => driver.initialize(),
            Self::DualSense(driver) => driver.initialize(),
            Self::XboxOne(driver) => driver.initialize(),
            Self::Wii(driver) => driver.initialize(),
            Self::Generic(driver) => driver.initialize(),
        }
    }
}
