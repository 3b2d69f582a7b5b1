//! Virtual copy of the Pro Controller SPI flash.
//!
//! Only the factory configuration page is backed by data. Everything else
//! reads as erased flash (`0xFF`), which makes the console fall back to the
//! factory calibration.
use crate::bluetooth::DeviceAddress;

use super::analog::AnalogStick;

/// Value of erased or unmapped flash
pub const FILL_BYTE: u8 = 0xff;

/// Largest read the console may request in a single subcommand
pub const MAX_READ_SIZE: usize = 0x1d;

/// Factory configuration and calibration page
pub const FACTORY_PAGE_ADDRESS: u32 = 0x6000;
const FACTORY_PAGE_SIZE: usize = 0x100;

pub const SERIAL_NUMBER_ADDRESS: u32 = 0x6000;
pub const DEVICE_TYPE_ADDRESS: u32 = 0x6012;
pub const COLOUR_INFO_ADDRESS: u32 = 0x601b;
pub const IMU_CALIBRATION_ADDRESS: u32 = 0x6020;
pub const LEFT_STICK_CALIBRATION_ADDRESS: u32 = 0x603d;
pub const RIGHT_STICK_CALIBRATION_ADDRESS: u32 = 0x6046;
pub const COLOURS_ADDRESS: u32 = 0x6050;
pub const SENSOR_PARAMETERS_ADDRESS: u32 = 0x6080;
pub const LEFT_STICK_PARAMETERS_ADDRESS: u32 = 0x6086;
pub const RIGHT_STICK_PARAMETERS_ADDRESS: u32 = 0x6098;

/// User calibration area. The only range the console is allowed to write.
pub const USER_CALIBRATION_ADDRESS: u32 = 0x8010;
const USER_CALIBRATION_END: u32 = 0x8040;
const SECTOR_SIZE: u32 = 0x1000;

const SERIAL_NUMBER_SIZE: usize = 16;

/// Accelerometer origin, sensitivity, then gyroscope origin, sensitivity
const IMU_CALIBRATION: [u8; 24] = [
    0x23, 0x00, 0xb9, 0xff, 0x1a, 0x01, 0x00, 0x40, 0x00, 0x40, 0x00, 0x40, 0x01, 0x00, 0x01,
    0x00, 0x01, 0x00, 0x3b, 0x34, 0x3b, 0x34, 0x3b, 0x34,
];

/// Accelerometer horizontal offset
const SENSOR_PARAMETERS: [u8; 6] = [0x50, 0xfd, 0x00, 0x00, 0xc6, 0x0f];

/// Dead zone and range ratios shared by both sticks
const STICK_PARAMETERS: [u8; 18] = [
    0x0f, 0x30, 0x61, 0xae, 0x90, 0xd9, 0xd4, 0x14, 0x54, 0x41, 0x15, 0x54, 0xc7, 0x79, 0x9c,
    0x33, 0x36, 0x63,
];

/// Distance from the center to either end of the calibrated stick range
const STICK_CALIBRATION_RANGE: u16 = 0x7ff;

/// Result of a write or erase request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    Success = 0x00,
    WriteProtected = 0x01,
}

/// Flash contents seen by the console
#[derive(Debug, Clone)]
pub struct VirtualSpiFlash {
    factory: [u8; FACTORY_PAGE_SIZE],
}

impl VirtualSpiFlash {
    /// Build the flash for a controller with the given address and body,
    /// button, left grip and right grip colours.
    pub fn new(address: DeviceAddress, colours: [u8; 12]) -> Self {
        let mut flash = Self {
            factory: [FILL_BYTE; FACTORY_PAGE_SIZE],
        };

        flash.set(SERIAL_NUMBER_ADDRESS, &serial_number(address));
        flash.set(DEVICE_TYPE_ADDRESS, &[0x03, 0x02]);
        // Colours and grip colours are valid
        flash.set(COLOUR_INFO_ADDRESS, &[0x01]);
        flash.set(IMU_CALIBRATION_ADDRESS, &IMU_CALIBRATION);

        let center = AnalogStick::centered().as_bytes();
        // Same distance above and below the center on both axes
        let range = AnalogStick::new(STICK_CALIBRATION_RANGE, STICK_CALIBRATION_RANGE).as_bytes();
        // Left stick: above center, center, below center
        let mut left = [0; 9];
        left[0..3].copy_from_slice(&range);
        left[3..6].copy_from_slice(&center);
        left[6..9].copy_from_slice(&range);
        flash.set(LEFT_STICK_CALIBRATION_ADDRESS, &left);
        // Right stick: center, below center, above center
        let mut right = [0; 9];
        right[0..3].copy_from_slice(&center);
        right[3..6].copy_from_slice(&range);
        right[6..9].copy_from_slice(&range);
        flash.set(RIGHT_STICK_CALIBRATION_ADDRESS, &right);

        flash.set(COLOURS_ADDRESS, &colours);
        flash.set(SENSOR_PARAMETERS_ADDRESS, &SENSOR_PARAMETERS);
        flash.set(LEFT_STICK_PARAMETERS_ADDRESS, &STICK_PARAMETERS);
        flash.set(RIGHT_STICK_PARAMETERS_ADDRESS, &STICK_PARAMETERS);

        flash
    }

    fn set(&mut self, address: u32, data: &[u8]) {
        let start = (address - FACTORY_PAGE_ADDRESS) as usize;
        self.factory[start..start + data.len()].copy_from_slice(data);
    }

    /// Read a single byte. Unmapped addresses read as [FILL_BYTE].
    pub fn read_byte(&self, address: u32) -> u8 {
        address
            .checked_sub(FACTORY_PAGE_ADDRESS)
            .and_then(|offset| self.factory.get(offset as usize))
            .copied()
            .unwrap_or(FILL_BYTE)
    }

    /// Fill `buf` with the bytes starting at `address`
    pub fn read(&self, address: u32, buf: &mut [u8]) {
        for (i, byte) in buf.iter_mut().enumerate() {
            *byte = self.read_byte(address.wrapping_add(i as u32));
        }
    }

    /// Acknowledge a write. Data is never stored.
    pub fn write(&self, address: u32, size: usize) -> WriteStatus {
        let end = address as u64 + size as u64;
        if address >= USER_CALIBRATION_ADDRESS && end <= USER_CALIBRATION_END as u64 {
            log::debug!("Discarding write of {size} bytes to {address:#06x}");
            WriteStatus::Success
        } else {
            log::debug!("Rejecting write of {size} bytes to {address:#06x}");
            WriteStatus::WriteProtected
        }
    }

    /// Acknowledge a sector erase. Nothing is erased.
    pub fn erase(&self, address: u32) -> WriteStatus {
        if address / SECTOR_SIZE == USER_CALIBRATION_ADDRESS / SECTOR_SIZE {
            log::debug!("Discarding erase of sector {address:#06x}");
            WriteStatus::Success
        } else {
            log::debug!("Rejecting erase of sector {address:#06x}");
            WriteStatus::WriteProtected
        }
    }
}

/// Serial number reported for a bridged controller: "HB" followed by the
/// device address in hex, zero padded.
fn serial_number(address: DeviceAddress) -> [u8; SERIAL_NUMBER_SIZE] {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut serial = [0; SERIAL_NUMBER_SIZE];
    serial[0] = b'H';
    serial[1] = b'B';
    for (i, octet) in address.as_bytes().iter().enumerate() {
        serial[2 + i * 2] = HEX[(octet >> 4) as usize];
        serial[3 + i * 2] = HEX[(octet & 0x0f) as usize];
    }
    serial
}
