//! DualShock4 Bluetooth report layouts.
//! Source: https://controllers.fandom.com/wiki/Sony_DualShock_4
//! Source: https://github.com/torvalds/linux/blob/master/drivers/hid/hid-playstation.c
use packed_struct::prelude::*;

use super::{OUTPUT_REPORT_BT, OUTPUT_REPORT_BT_SIZE};

/// Offset of the CRC at the end of a Bluetooth output report
pub const OUTPUT_CRC_OFFSET: usize = OUTPUT_REPORT_BT_SIZE - 4;
/// Prefix hashed in front of Bluetooth output reports
pub const OUTPUT_CRC_SEED: u8 = 0xa2;

/// Offset of the [FullInputData] block in a 0x11 report
pub const FULL_REPORT_DATA_OFFSET: usize = 3;

/// Bits of the output `valid_flag0` byte
pub const VALID_FLAG_MOTOR: u8 = 0x01;
pub const VALID_FLAG_LED: u8 = 0x02;
pub const VALID_FLAG_LED_BLINK: u8 = 0x04;

/// Bits of the output `hw_control` byte
pub const HW_CONTROL_HID: u8 = 0x80;
pub const HW_CONTROL_CRC32: u8 = 0x40;

/// Sticks, buttons and triggers. Shared by the basic and the full report.
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq, Default)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "9")]
pub struct InputState {
    // byte 0-3
    #[packed_field(bytes = "0")]
    pub joystick_l_x: u8,
    #[packed_field(bytes = "1")]
    pub joystick_l_y: u8,
    #[packed_field(bytes = "2")]
    pub joystick_r_x: u8,
    #[packed_field(bytes = "3")]
    pub joystick_r_y: u8,

    // byte 4
    #[packed_field(bits = "32")]
    pub triangle: bool,
    #[packed_field(bits = "33")]
    pub circle: bool,
    #[packed_field(bits = "34")]
    pub cross: bool,
    #[packed_field(bits = "35")]
    pub square: bool,
    /// Hat switch, 0 is up and 8 is released
    #[packed_field(bits = "36..=39")]
    pub dpad: Integer<u8, packed_bits::Bits<4>>,

    // byte 5
    #[packed_field(bits = "40")]
    pub r3: bool,
    #[packed_field(bits = "41")]
    pub l3: bool,
    #[packed_field(bits = "42")]
    pub options: bool,
    #[packed_field(bits = "43")]
    pub share: bool,
    #[packed_field(bits = "44")]
    pub r2: bool,
    #[packed_field(bits = "45")]
    pub l2: bool,
    #[packed_field(bits = "46")]
    pub r1: bool,
    #[packed_field(bits = "47")]
    pub l1: bool,

    // byte 6
    #[packed_field(bits = "48..=53")]
    pub counter: Integer<u8, packed_bits::Bits<6>>,
    #[packed_field(bits = "54")]
    pub touchpad: bool,
    #[packed_field(bits = "55")]
    pub ps: bool,

    // byte 7-8
    #[packed_field(bytes = "7")]
    pub l2_trigger: u8,
    #[packed_field(bytes = "8")]
    pub r2_trigger: u8,
}

/// Basic report (0x01) sent until the host requests full reports
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq, Default)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "10")]
pub struct BasicInputReport {
    #[packed_field(bytes = "0")]
    pub report_id: u8,
    #[packed_field(bytes = "1..=9")]
    pub state: InputState,
}

/// Data block of the full report. Carried at offset 3 of a Bluetooth 0x11
/// report.
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq, Default)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "30")]
pub struct FullInputData {
    #[packed_field(bytes = "0..=8")]
    pub state: InputState,
    #[packed_field(bytes = "9..=10", endian = "lsb")]
    pub timestamp: Integer<u16, packed_bits::Bits<16>>,
    #[packed_field(bytes = "11")]
    pub temperature: u8,

    // Motion
    #[packed_field(bytes = "12..=13", endian = "lsb")]
    pub gyro_x: Integer<i16, packed_bits::Bits<16>>,
    #[packed_field(bytes = "14..=15", endian = "lsb")]
    pub gyro_y: Integer<i16, packed_bits::Bits<16>>,
    #[packed_field(bytes = "16..=17", endian = "lsb")]
    pub gyro_z: Integer<i16, packed_bits::Bits<16>>,
    #[packed_field(bytes = "18..=19", endian = "lsb")]
    pub accel_x: Integer<i16, packed_bits::Bits<16>>,
    #[packed_field(bytes = "20..=21", endian = "lsb")]
    pub accel_y: Integer<i16, packed_bits::Bits<16>>,
    #[packed_field(bytes = "22..=23", endian = "lsb")]
    pub accel_z: Integer<i16, packed_bits::Bits<16>>,

    #[packed_field(bytes = "24..=28")]
    pub _reserved: [u8; 5],

    // byte 29
    #[packed_field(bits = "232..=234")]
    pub _unused: Integer<u8, packed_bits::Bits<3>>,
    #[packed_field(bits = "235")]
    pub cable_connected: bool,
    /// 0-10 on battery, 0-11 while charging where 11 is full
    #[packed_field(bits = "236..=239")]
    pub battery_level: Integer<u8, packed_bits::Bits<4>>,
}

impl FullInputData {
    /// Returns the battery charge as a percentage
    pub fn battery_percent(&self) -> u8 {
        let level: u8 = self.battery_level.into();
        (level.min(10) * 10 + 5).min(100)
    }

    /// Returns true if the controller is plugged in and not yet full
    pub fn is_charging(&self) -> bool {
        let level: u8 = self.battery_level.into();
        self.cable_connected && level <= 10
    }
}

/// Bluetooth output report (0x11)
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "78")]
pub struct BluetoothOutputReport {
    #[packed_field(bytes = "0")]
    pub report_id: u8,
    #[packed_field(bytes = "1")]
    pub hw_control: u8,
    #[packed_field(bytes = "2")]
    pub audio_control: u8,
    #[packed_field(bytes = "3")]
    pub valid_flag0: u8,
    #[packed_field(bytes = "4")]
    pub valid_flag1: u8,
    #[packed_field(bytes = "5")]
    pub _reserved: u8,
    /// Weak motor
    #[packed_field(bytes = "6")]
    pub motor_right: u8,
    /// Strong motor
    #[packed_field(bytes = "7")]
    pub motor_left: u8,
    #[packed_field(bytes = "8")]
    pub led_red: u8,
    #[packed_field(bytes = "9")]
    pub led_green: u8,
    #[packed_field(bytes = "10")]
    pub led_blue: u8,
    #[packed_field(bytes = "11")]
    pub led_blink_on: u8,
    #[packed_field(bytes = "12")]
    pub led_blink_off: u8,
    #[packed_field(bytes = "13..=73")]
    pub _padding: [u8; 61],
    #[packed_field(bytes = "74..=77", endian = "lsb")]
    pub crc: Integer<u32, packed_bits::Bits<32>>,
}

impl Default for BluetoothOutputReport {
    fn default() -> Self {
        Self {
            report_id: OUTPUT_REPORT_BT,
            hw_control: HW_CONTROL_HID | HW_CONTROL_CRC32,
            audio_control: 0,
            valid_flag0: VALID_FLAG_MOTOR | VALID_FLAG_LED | VALID_FLAG_LED_BLINK,
            valid_flag1: 0,
            _reserved: 0,
            motor_right: 0,
            motor_left: 0,
            led_red: 0,
            led_green: 0,
            led_blue: 0,
            led_blink_on: 0,
            led_blink_off: 0,
            _padding: [0; 61],
            crc: Integer::from_primitive(0),
        }
    }
}

/// CRC32 of a Sony Bluetooth output report. The checksum covers a one byte
/// seed followed by everything in front of the CRC field.
pub fn output_crc(seed: u8, buf: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&[seed]);
    hasher.update(buf);
    hasher.finalize()
}

/// Pack an output report and fill in its trailing CRC
pub fn pack_output_report(
    report: &BluetoothOutputReport,
) -> Result<[u8; OUTPUT_REPORT_BT_SIZE], PackingError> {
    let mut buf = report.pack()?;
    let crc = output_crc(OUTPUT_CRC_SEED, &buf[..OUTPUT_CRC_OFFSET]);
    buf[OUTPUT_CRC_OFFSET..].copy_from_slice(&crc.to_le_bytes());
    Ok(buf)
}
