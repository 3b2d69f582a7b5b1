//! Reference: https://github.com/torvalds/linux/blob/master/drivers/hid/hid-microsoft.c
//! Reference: https://github.com/atar-axis/xpadneo/blob/master/hid-xpadneo/src/hid-xpadneo.c
use packed_struct::prelude::*;

use super::{INPUT_REPORT_DATA, OUTPUT_REPORT_RUMBLE};

#[derive(PackedStruct, Debug, Copy, Clone, PartialEq, Default)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "3")]
pub struct ButtonState {
    // byte 1
    #[packed_field(bits = "0")]
    pub rb: bool,
    #[packed_field(bits = "1")]
    pub lb: bool,
    #[packed_field(bits = "2")]
    pub _unkn2: bool,
    #[packed_field(bits = "3")]
    pub y: bool,
    #[packed_field(bits = "4")]
    pub x: bool,
    #[packed_field(bits = "5")]
    pub _unkn5: bool,
    #[packed_field(bits = "6")]
    pub b: bool,
    #[packed_field(bits = "7")]
    pub a: bool,

    // byte 2
    #[packed_field(bits = "9")]
    pub thumb_r: bool,
    #[packed_field(bits = "10")]
    pub thumb_l: bool,
    #[packed_field(bits = "11")]
    pub guide: bool,
    #[packed_field(bits = "12")]
    pub menu: bool,
    #[packed_field(bits = "13")]
    pub view: bool,

    // byte 3
    #[packed_field(bits = "23")]
    pub share: bool,
}

/// Gamepad state report (0x01)
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "17")]
pub struct InputDataReport {
    // BYTE 0
    #[packed_field(bytes = "0")]
    pub report_id: u8,

    // Axes
    // BYTES 1-8
    #[packed_field(bytes = "1..=2", endian = "lsb")]
    pub l_stick_x: u16,
    #[packed_field(bytes = "3..=4", endian = "lsb")]
    pub l_stick_y: u16,
    #[packed_field(bytes = "5..=6", endian = "lsb")]
    pub r_stick_x: u16,
    #[packed_field(bytes = "7..=8", endian = "lsb")]
    pub r_stick_y: u16,
    // BYTES 9-12, 10 bits of travel each
    #[packed_field(bytes = "9..=10", endian = "lsb")]
    pub trigger_l: u16,
    #[packed_field(bytes = "11..=12", endian = "lsb")]
    pub trigger_r: u16,

    /// Hat switch, 1 is up, values increase clockwise and 0 is released
    #[packed_field(bytes = "13")]
    pub dpad_state: u8,

    #[packed_field(bytes = "14..=16")]
    pub button_state: ButtonState,
}

impl Default for InputDataReport {
    fn default() -> Self {
        Self {
            report_id: INPUT_REPORT_DATA,
            l_stick_x: 0x8000,
            l_stick_y: 0x8000,
            r_stick_x: 0x8000,
            r_stick_y: 0x8000,
            trigger_l: 0,
            trigger_r: 0,
            dpad_state: 0,
            button_state: Default::default(),
        }
    }
}

/// Battery report (0x04)
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq, Default)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "2")]
pub struct BatteryReport {
    #[packed_field(bytes = "0")]
    pub report_id: u8,
    #[packed_field(bits = "8")]
    pub online: bool,
    #[packed_field(bits = "9..=10")]
    pub _unkn: Integer<u8, packed_bits::Bits<2>>,
    #[packed_field(bits = "11")]
    pub charging: bool,
    #[packed_field(bits = "12..=13")]
    pub mode: Integer<u8, packed_bits::Bits<2>>,
    /// 0 is critical and 3 is full
    #[packed_field(bits = "14..=15")]
    pub capacity: Integer<u8, packed_bits::Bits<2>>,
}

/// Rumble output report for Bluetooth Xbox One gamepads. Forces are
/// percentages.
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "9")]
pub struct RumbleOutputReport {
    #[packed_field(bytes = "0")]
    pub report_id: u8,
    /// Motors to activate for rumble
    #[packed_field(bits = "12")]
    pub motor_left_trigger_enabled: bool,
    #[packed_field(bits = "13")]
    pub motor_right_trigger_enabled: bool,
    #[packed_field(bits = "14")]
    pub motor_left_enabled: bool,
    #[packed_field(bits = "15")]
    pub motor_right_enabled: bool,
    /// Left trigger actuator force
    #[packed_field(bytes = "2")]
    pub left_trigger_force: u8,
    /// Right trigger actuator force
    #[packed_field(bytes = "3")]
    pub right_trigger_force: u8,
    /// Left actuator force
    #[packed_field(bytes = "4")]
    pub left_force: u8,
    /// Right actuator force
    #[packed_field(bytes = "5")]
    pub right_force: u8,
    /// On period duration in 10ms steps
    #[packed_field(bytes = "6")]
    pub duration: u8,
    /// Start delay duration
    #[packed_field(bytes = "7")]
    pub start_delay: u8,
    /// Repeat count
    #[packed_field(bytes = "8")]
    pub loop_count: u8,
}

impl RumbleOutputReport {
    /// Returns a report driving the two main motors at the given speeds
    pub fn new(left_speed: u8, right_speed: u8) -> Self {
        let percent = |speed: u8| ((speed as u16 * 100 + 127) / u8::MAX as u16) as u8;
        Self {
            left_force: percent(left_speed),
            right_force: percent(right_speed),
            ..Default::default()
        }
    }
}

impl Default for RumbleOutputReport {
    fn default() -> Self {
        Self {
            report_id: OUTPUT_REPORT_RUMBLE,
            motor_left_trigger_enabled: true,
            motor_right_trigger_enabled: true,
            motor_left_enabled: true,
            motor_right_enabled: true,
            left_trigger_force: 0,
            right_trigger_force: 0,
            left_force: 0,
            right_force: 0,
            duration: u8::MAX,
            start_delay: 0,
            loop_count: 0,
        }
    }
}
