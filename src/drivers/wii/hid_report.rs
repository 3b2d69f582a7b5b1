//! Wii Remote report layouts.
//! Source: https://wiibrew.org/wiki/Wiimote
//! Source: https://wiibrew.org/wiki/Wiimote/Extension_Controllers
use packed_struct::prelude::*;

use super::{
    INPUT_REPORT_CORE_ACCEL_EXT16, INPUT_REPORT_CORE_ACCEL_IR10_EXT6,
    INPUT_REPORT_CORE_EXT19, INPUT_REPORT_CORE_EXT8, INPUT_REPORT_CORE_IR10_EXT9,
    INPUT_REPORT_EXT21, OUTPUT_REPORT_READ_MEMORY, OUTPUT_REPORT_WRITE_MEMORY,
};

/// Memory access flag selecting the control registers instead of EEPROM
pub const MEMORY_REGISTERS: u8 = 0x04;
/// Rumble flag carried in the first byte of every output report
pub const RUMBLE_FLAG: u8 = 0x01;

/// Status report flags
pub const STATUS_FLAG_BATTERY_LOW: u8 = 0x01;
pub const STATUS_FLAG_EXTENSION: u8 = 0x02;

/// Core buttons present at the start of nearly every input report
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq, Default)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "2")]
pub struct CoreButtons {
    // byte 0
    #[packed_field(bits = "3")]
    pub plus: bool,
    #[packed_field(bits = "4")]
    pub up: bool,
    #[packed_field(bits = "5")]
    pub down: bool,
    #[packed_field(bits = "6")]
    pub right: bool,
    #[packed_field(bits = "7")]
    pub left: bool,

    // byte 1
    #[packed_field(bits = "8")]
    pub home: bool,
    #[packed_field(bits = "11")]
    pub minus: bool,
    #[packed_field(bits = "12")]
    pub a: bool,
    #[packed_field(bits = "13")]
    pub b: bool,
    #[packed_field(bits = "14")]
    pub one: bool,
    #[packed_field(bits = "15")]
    pub two: bool,
}

/// Status report (0x20)
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq, Default)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "7")]
pub struct StatusReport {
    #[packed_field(bytes = "0")]
    pub report_id: u8,
    #[packed_field(bytes = "1..=2")]
    pub buttons: CoreButtons,
    #[packed_field(bits = "24..=27")]
    pub leds: Integer<u8, packed_bits::Bits<4>>,
    #[packed_field(bits = "28")]
    pub ir_enabled: bool,
    #[packed_field(bits = "29")]
    pub speaker_enabled: bool,
    #[packed_field(bits = "30")]
    pub extension_connected: bool,
    #[packed_field(bits = "31")]
    pub battery_low: bool,
    #[packed_field(bytes = "4..=5")]
    pub _reserved: [u8; 2],
    #[packed_field(bytes = "6")]
    pub battery: u8,
}

/// Memory read reply (0x21)
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq, Default)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "22")]
pub struct ReadMemoryReply {
    #[packed_field(bytes = "0")]
    pub report_id: u8,
    #[packed_field(bytes = "1..=2")]
    pub buttons: CoreButtons,
    /// Number of bytes returned minus one
    #[packed_field(bits = "24..=27")]
    pub size: Integer<u8, packed_bits::Bits<4>>,
    #[packed_field(bits = "28..=31")]
    pub error: Integer<u8, packed_bits::Bits<4>>,
    /// Low 16 bits of the address of the first byte
    #[packed_field(bytes = "4..=5", endian = "msb")]
    pub address: u16,
    #[packed_field(bytes = "6..=21")]
    pub data: [u8; 16],
}

impl ReadMemoryReply {
    /// Returns the bytes that were read
    pub fn bytes(&self) -> &[u8] {
        let size = u8::from(self.size) as usize + 1;
        &self.data[..size]
    }
}

/// Write memory request (0x16)
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "22")]
pub struct WriteMemoryRequest {
    #[packed_field(bytes = "0")]
    pub report_id: u8,
    #[packed_field(bytes = "1")]
    pub flags: u8,
    #[packed_field(bytes = "2..=4", endian = "msb")]
    pub address: Integer<u32, packed_bits::Bits<24>>,
    #[packed_field(bytes = "5")]
    pub size: u8,
    #[packed_field(bytes = "6..=21")]
    pub data: [u8; 16],
}

impl WriteMemoryRequest {
    /// Returns a request writing a single register byte
    pub fn register_byte(address: u32, value: u8, rumble: bool) -> Self {
        let mut data = [0; 16];
        data[0] = value;
        Self {
            report_id: OUTPUT_REPORT_WRITE_MEMORY,
            flags: MEMORY_REGISTERS | rumble as u8,
            address: Integer::from_primitive(address),
            size: 1,
            data,
        }
    }
}

/// Read memory request (0x17)
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "7")]
pub struct ReadMemoryRequest {
    #[packed_field(bytes = "0")]
    pub report_id: u8,
    #[packed_field(bytes = "1")]
    pub flags: u8,
    #[packed_field(bytes = "2..=4", endian = "msb")]
    pub address: Integer<u32, packed_bits::Bits<24>>,
    #[packed_field(bytes = "5..=6", endian = "msb")]
    pub size: u16,
}

impl ReadMemoryRequest {
    /// Returns a request reading control registers
    pub fn registers(address: u32, size: u16, rumble: bool) -> Self {
        Self {
            report_id: OUTPUT_REPORT_READ_MEMORY,
            flags: MEMORY_REGISTERS | rumble as u8,
            address: Integer::from_primitive(address),
            size,
        }
    }
}

/// Nunchuk extension data
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq, Default)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "6")]
pub struct NunchukData {
    #[packed_field(bytes = "0")]
    pub stick_x: u8,
    #[packed_field(bytes = "1")]
    pub stick_y: u8,
    #[packed_field(bytes = "2..=4")]
    pub accel: [u8; 3],
    #[packed_field(bits = "40..=45")]
    pub accel_low: Integer<u8, packed_bits::Bits<6>>,
    /// Active low
    #[packed_field(bits = "46")]
    pub c_released: bool,
    /// Active low
    #[packed_field(bits = "47")]
    pub z_released: bool,
}

/// Classic Controller extension data. Buttons are active low.
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq, Default)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "6")]
pub struct ClassicData {
    // byte 0
    #[packed_field(bits = "0..=1")]
    pub right_x_hi: Integer<u8, packed_bits::Bits<2>>,
    #[packed_field(bits = "2..=7")]
    pub left_x: Integer<u8, packed_bits::Bits<6>>,
    // byte 1
    #[packed_field(bits = "8..=9")]
    pub right_x_mid: Integer<u8, packed_bits::Bits<2>>,
    #[packed_field(bits = "10..=15")]
    pub left_y: Integer<u8, packed_bits::Bits<6>>,
    // byte 2
    #[packed_field(bits = "16")]
    pub right_x_lo: bool,
    #[packed_field(bits = "17..=18")]
    pub left_trigger_hi: Integer<u8, packed_bits::Bits<2>>,
    #[packed_field(bits = "19..=23")]
    pub right_y: Integer<u8, packed_bits::Bits<5>>,
    // byte 3
    #[packed_field(bits = "24..=26")]
    pub left_trigger_lo: Integer<u8, packed_bits::Bits<3>>,
    #[packed_field(bits = "27..=31")]
    pub right_trigger: Integer<u8, packed_bits::Bits<5>>,

    // byte 4
    #[packed_field(bits = "32")]
    pub dpad_right: bool,
    #[packed_field(bits = "33")]
    pub dpad_down: bool,
    #[packed_field(bits = "34")]
    pub l: bool,
    #[packed_field(bits = "35")]
    pub minus: bool,
    #[packed_field(bits = "36")]
    pub home: bool,
    #[packed_field(bits = "37")]
    pub plus: bool,
    #[packed_field(bits = "38")]
    pub r: bool,
    #[packed_field(bits = "39")]
    pub _unused: bool,

    // byte 5
    #[packed_field(bits = "40")]
    pub zl: bool,
    #[packed_field(bits = "41")]
    pub b: bool,
    #[packed_field(bits = "42")]
    pub y: bool,
    #[packed_field(bits = "43")]
    pub a: bool,
    #[packed_field(bits = "44")]
    pub x: bool,
    #[packed_field(bits = "45")]
    pub zr: bool,
    #[packed_field(bits = "46")]
    pub dpad_left: bool,
    #[packed_field(bits = "47")]
    pub dpad_up: bool,
}

impl ClassicData {
    /// Right stick X axis, 5 bits split over three bytes
    pub fn right_x(&self) -> u8 {
        let hi: u8 = self.right_x_hi.into();
        let mid: u8 = self.right_x_mid.into();
        hi << 3 | mid << 1 | self.right_x_lo as u8
    }
}

/// Returns the offset of the extension bytes inside the given input report,
/// or None if the report carries no extension data
pub fn extension_offset(report_id: u8) -> Option<usize> {
    match report_id {
        INPUT_REPORT_CORE_EXT8 | INPUT_REPORT_CORE_EXT19 => Some(3),
        INPUT_REPORT_CORE_ACCEL_EXT16 => Some(6),
        INPUT_REPORT_CORE_IR10_EXT9 => Some(13),
        INPUT_REPORT_CORE_ACCEL_IR10_EXT6 => Some(16),
        INPUT_REPORT_EXT21 => Some(1),
        _ => None,
    }
}
