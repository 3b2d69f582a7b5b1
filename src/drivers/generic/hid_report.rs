//! DirectInput style gamepad report used by most generic Bluetooth gamepads
use packed_struct::prelude::*;

use super::INPUT_REPORT_DATA;

/// Gamepad state report (0x01). Face buttons are named after the first four
/// buttons of the report; whether they describe positions or labels depends
/// on the device.
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "10")]
pub struct InputDataReport {
    // byte 0
    #[packed_field(bytes = "0")]
    pub report_id: u8,

    // byte 1
    #[packed_field(bits = "8")]
    pub r1: bool,
    #[packed_field(bits = "9")]
    pub l1: bool,
    #[packed_field(bits = "11")]
    pub y: bool,
    #[packed_field(bits = "12")]
    pub x: bool,
    #[packed_field(bits = "14")]
    pub b: bool,
    #[packed_field(bits = "15")]
    pub a: bool,

    // byte 2
    #[packed_field(bits = "17")]
    pub r3: bool,
    #[packed_field(bits = "18")]
    pub l3: bool,
    #[packed_field(bits = "19")]
    pub home: bool,
    #[packed_field(bits = "20")]
    pub start: bool,
    #[packed_field(bits = "21")]
    pub select: bool,
    #[packed_field(bits = "22")]
    pub r2: bool,
    #[packed_field(bits = "23")]
    pub l2: bool,

    /// Hat switch, 0 is up and values above 7 are released
    #[packed_field(bytes = "3")]
    pub hat: u8,

    // bytes 4-7, two's complement and centered at zero
    #[packed_field(bytes = "4")]
    pub l_stick_x: u8,
    #[packed_field(bytes = "5")]
    pub l_stick_y: u8,
    #[packed_field(bytes = "6")]
    pub r_stick_x: u8,
    #[packed_field(bytes = "7")]
    pub r_stick_y: u8,

    // bytes 8-9
    #[packed_field(bytes = "8")]
    pub l2_trigger: u8,
    #[packed_field(bytes = "9")]
    pub r2_trigger: u8,
}

impl Default for InputDataReport {
    fn default() -> Self {
        Self {
            report_id: INPUT_REPORT_DATA,
            r1: false,
            l1: false,
            y: false,
            x: false,
            b: false,
            a: false,
            r3: false,
            l3: false,
            home: false,
            start: false,
            select: false,
            r2: false,
            l2: false,
            hat: 0x0f,
            l_stick_x: 0,
            l_stick_y: 0,
            r_stick_x: 0,
            r_stick_y: 0,
            l2_trigger: 0,
            r2_trigger: 0,
        }
    }
}
