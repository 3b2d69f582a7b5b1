//! Structures derived from the great work of the community of the Game Controller
//! Collective Wiki.
//! Source: https://controllers.fandom.com/wiki/Sony_DualSense
use packed_struct::prelude::*;

use crate::drivers::dualshock4::hid_report::output_crc;

use super::{OUTPUT_REPORT_BT, OUTPUT_REPORT_BT_SIZE};

/// Offset of the CRC at the end of a Bluetooth output report
pub const OUTPUT_CRC_OFFSET: usize = OUTPUT_REPORT_BT_SIZE - 4;
/// Prefix hashed in front of Bluetooth output reports
pub const OUTPUT_CRC_SEED: u8 = 0xa2;
/// Tag byte following the sequence number of a Bluetooth output report
pub const OUTPUT_TAG: u8 = 0x10;

/// Values of [InputState::power_state]
pub const POWER_STATE_DISCHARGING: u8 = 0x00;
pub const POWER_STATE_CHARGING: u8 = 0x01;
pub const POWER_STATE_COMPLETE: u8 = 0x02;

/// Player indicator patterns for players 1 to 5, centered on the touchpad
pub const PLAYER_LIGHTS: [u8; 5] = [0x04, 0x0a, 0x15, 0x1b, 0x1f];

/// Input state of the full report. The Bluetooth report carries this at
/// offset 2, after the report id and a sequence byte.
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq, Default)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "53")]
pub struct InputState {
    // byte 0-6
    #[packed_field(bytes = "0")]
    pub joystick_l_x: u8, // left stick X axis
    #[packed_field(bytes = "1")]
    pub joystick_l_y: u8, // left stick Y axis
    #[packed_field(bytes = "2")]
    pub joystick_r_x: u8, // right stick X axis
    #[packed_field(bytes = "3")]
    pub joystick_r_y: u8, // right stick Y axis
    #[packed_field(bytes = "4")]
    pub l2_trigger: u8, // L2 trigger axis
    #[packed_field(bytes = "5")]
    pub r2_trigger: u8, // R2 trigger axis
    #[packed_field(bytes = "6")]
    pub seq_number: u8,

    // byte 7
    #[packed_field(bits = "56")]
    pub triangle: bool,
    #[packed_field(bits = "57")]
    pub circle: bool,
    #[packed_field(bits = "58")]
    pub cross: bool,
    #[packed_field(bits = "59")]
    pub square: bool,
    /// Hat switch, 0 is up and 8 is released
    #[packed_field(bits = "60..=63")]
    pub dpad: Integer<u8, packed_bits::Bits<4>>,

    // byte 8
    #[packed_field(bits = "64")]
    pub r3: bool,
    #[packed_field(bits = "65")]
    pub l3: bool,
    #[packed_field(bits = "66")]
    pub options: bool,
    #[packed_field(bits = "67")]
    pub create: bool,
    #[packed_field(bits = "68")]
    pub r2: bool,
    #[packed_field(bits = "69")]
    pub l2: bool,
    #[packed_field(bits = "70")]
    pub r1: bool,
    #[packed_field(bits = "71")]
    pub l1: bool,

    // byte 9
    #[packed_field(bits = "72")]
    pub right_paddle: bool, // DualSense Edge
    #[packed_field(bits = "73")]
    pub left_paddle: bool, // DualSense Edge
    #[packed_field(bits = "74")]
    pub right_fn: bool, // DualSense Edge
    #[packed_field(bits = "75")]
    pub left_fn: bool, // DualSense Edge
    #[packed_field(bits = "76")]
    pub _unkn_0: bool,
    #[packed_field(bits = "77")]
    pub mute: bool,
    #[packed_field(bits = "78")]
    pub touchpad: bool,
    #[packed_field(bits = "79")]
    pub ps: bool,

    // byte 10-14
    #[packed_field(bytes = "10..=14")]
    pub _reserved: [u8; 5],

    // byte 15-26
    #[packed_field(bytes = "15..=16", endian = "lsb")]
    pub gyro_x: Integer<i16, packed_bits::Bits<16>>,
    #[packed_field(bytes = "17..=18", endian = "lsb")]
    pub gyro_y: Integer<i16, packed_bits::Bits<16>>,
    #[packed_field(bytes = "19..=20", endian = "lsb")]
    pub gyro_z: Integer<i16, packed_bits::Bits<16>>,
    #[packed_field(bytes = "21..=22", endian = "lsb")]
    pub accel_x: Integer<i16, packed_bits::Bits<16>>,
    #[packed_field(bytes = "23..=24", endian = "lsb")]
    pub accel_y: Integer<i16, packed_bits::Bits<16>>,
    #[packed_field(bytes = "25..=26", endian = "lsb")]
    pub accel_z: Integer<i16, packed_bits::Bits<16>>,

    // byte 27-51
    #[packed_field(bytes = "27..=30", endian = "lsb")]
    pub sensor_timestamp: Integer<u32, packed_bits::Bits<32>>,
    #[packed_field(bytes = "31..=51")]
    pub _touch_and_triggers: [u8; 21],

    // byte 52
    #[packed_field(bits = "416..=419")]
    pub power_state: Integer<u8, packed_bits::Bits<4>>,
    #[packed_field(bits = "420..=423")]
    pub power_percent: Integer<u8, packed_bits::Bits<4>>, // 0x00 - 0x0A
}

impl InputState {
    /// Returns the battery charge as a percentage
    pub fn battery_percent(&self) -> u8 {
        if u8::from(self.power_state) == POWER_STATE_COMPLETE {
            return 100;
        }
        let level: u8 = self.power_percent.into();
        (level.min(10) * 10 + 5).min(100)
    }

    pub fn is_charging(&self) -> bool {
        u8::from(self.power_state) == POWER_STATE_CHARGING
    }
}

/// State data written to the controller to change LEDs and rumble
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq, Default)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "47")]
pub struct SetStatePackedOutputData {
    // byte 0
    #[packed_field(bits = "0..=5")]
    pub _unused_flags0: Integer<u8, packed_bits::Bits<6>>,
    #[packed_field(bits = "6")]
    pub use_rumble_not_haptics: bool,
    #[packed_field(bits = "7")]
    pub enable_rumble_emulation: bool,

    // byte 1
    #[packed_field(bits = "8..=10")]
    pub _unused_flags1: Integer<u8, packed_bits::Bits<3>>,
    #[packed_field(bits = "11")]
    pub allow_player_indicators: bool,
    #[packed_field(bits = "12")]
    pub reset_lights: bool,
    #[packed_field(bits = "13")]
    pub allow_led_color: bool, // Enable RGB LED section
    #[packed_field(bits = "14..=15")]
    pub _unused_flags2: Integer<u8, packed_bits::Bits<2>>,

    // byte 2-3
    #[packed_field(bytes = "2")]
    pub rumble_emulation_right: u8,
    #[packed_field(bytes = "3")]
    pub rumble_emulation_left: u8,

    // byte 4-42
    #[packed_field(bytes = "4..=9")]
    pub _audio: [u8; 6],
    #[packed_field(bytes = "10..=31")]
    pub _trigger_ffb: [u8; 22],
    #[packed_field(bytes = "32..=42")]
    pub _lights_setup: [u8; 11],

    // byte 43
    #[packed_field(bits = "344..=345")]
    pub _player_light_unkn: Integer<u8, packed_bits::Bits<2>>,
    #[packed_field(bits = "346")]
    pub player_light_fade: bool,
    /// Five player LEDs, leftmost in the highest bit
    #[packed_field(bits = "347..=351")]
    pub player_lights: Integer<u8, packed_bits::Bits<5>>,

    // byte 44-46
    #[packed_field(bytes = "44")]
    pub led_red: u8,
    #[packed_field(bytes = "45")]
    pub led_green: u8,
    #[packed_field(bytes = "46")]
    pub led_blue: u8,
}

/// Bluetooth output report (0x31)
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "78")]
pub struct BluetoothPackedOutputReport {
    #[packed_field(bytes = "0")]
    pub report_id: u8,
    #[packed_field(bits = "8..=11")]
    pub seq_number: Integer<u8, packed_bits::Bits<4>>,
    #[packed_field(bits = "12..=15")]
    pub _unused: Integer<u8, packed_bits::Bits<4>>,
    #[packed_field(bytes = "2")]
    pub tag: u8,
    #[packed_field(bytes = "3..=49")]
    pub state: SetStatePackedOutputData,
    #[packed_field(bytes = "50..=73")]
    pub _padding: [u8; 24],
    #[packed_field(bytes = "74..=77", endian = "lsb")]
    pub crc: Integer<u32, packed_bits::Bits<32>>,
}

impl Default for BluetoothPackedOutputReport {
    fn default() -> Self {
        Self {
            report_id: OUTPUT_REPORT_BT,
            seq_number: Integer::from_primitive(0),
            _unused: Integer::from_primitive(0),
            tag: OUTPUT_TAG,
            state: Default::default(),
            _padding: [0; 24],
            crc: Integer::from_primitive(0),
        }
    }
}

impl BluetoothPackedOutputReport {
    /// Pack the report and fill in its trailing CRC
    pub fn pack_with_crc(&self) -> Result<[u8; OUTPUT_REPORT_BT_SIZE], PackingError> {
        let mut buf = self.pack()?;
        let crc = output_crc(OUTPUT_CRC_SEED, &buf[..OUTPUT_CRC_OFFSET]);
        buf[OUTPUT_CRC_OFFSET..].copy_from_slice(&crc.to_le_bytes());
        Ok(buf)
    }
}
