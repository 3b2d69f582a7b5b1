//! Sources:
//! - https://github.com/dekuNukem/Nintendo_Switch_Reverse_Engineering/blob/master/bluetooth_hid_notes.md
//! - https://github.com/torvalds/linux/blob/master/drivers/hid/hid-nintendo.c
//! - https://switchbrew.org/w/index.php?title=Joy-Con
use packed_struct::prelude::*;

/// Report ids used by the Pro Controller over Bluetooth
#[derive(PrimitiveEnum_u8, Clone, Copy, PartialEq, Debug)]
pub enum ReportType {
    /// Rumble plus subcommand
    CommandOutputReport = 0x01,
    /// Rumble only
    RumbleOutputReport = 0x10,
    /// Subcommand reply
    CommandInputReport = 0x21,
    /// Full report with motion data
    StandardInputReport = 0x30,
}

impl TryFrom<u8> for ReportType {
    type Error = &'static str;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(Self::CommandOutputReport),
            0x10 => Ok(Self::RumbleOutputReport),
            0x21 => Ok(Self::CommandInputReport),
            0x30 => Ok(Self::StandardInputReport),
            _ => Err("Invalid report type"),
        }
    }
}

/// Subcommands carried in output report 0x01
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Subcommand {
    RequestDeviceInfo = 0x02,
    SetInputReportMode = 0x03,
    TriggerButtonsElapsedTime = 0x04,
    SetShipmentLowPowerState = 0x08,
    SpiFlashRead = 0x10,
    SpiFlashWrite = 0x11,
    SpiSectorErase = 0x12,
    SetNfcIrMcuConfig = 0x21,
    SetNfcIrMcuState = 0x22,
    SetPlayerLights = 0x30,
    GetPlayerLights = 0x31,
    SetHomeLight = 0x38,
    EnableImu = 0x40,
    SetImuSensitivity = 0x41,
    EnableVibration = 0x48,
    GetRegulatedVoltage = 0x50,
}

impl TryFrom<u8> for Subcommand {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x02 => Ok(Self::RequestDeviceInfo),
            0x03 => Ok(Self::SetInputReportMode),
            0x04 => Ok(Self::TriggerButtonsElapsedTime),
            0x08 => Ok(Self::SetShipmentLowPowerState),
            0x10 => Ok(Self::SpiFlashRead),
            0x11 => Ok(Self::SpiFlashWrite),
            0x12 => Ok(Self::SpiSectorErase),
            0x21 => Ok(Self::SetNfcIrMcuConfig),
            0x22 => Ok(Self::SetNfcIrMcuState),
            0x30 => Ok(Self::SetPlayerLights),
            0x31 => Ok(Self::GetPlayerLights),
            0x38 => Ok(Self::SetHomeLight),
            0x40 => Ok(Self::EnableImu),
            0x41 => Ok(Self::SetImuSensitivity),
            0x48 => Ok(Self::EnableVibration),
            0x50 => Ok(Self::GetRegulatedVoltage),
            v => Err(v),
        }
    }
}

#[derive(PrimitiveEnum_u8, Clone, Copy, PartialEq, Debug, Default)]
pub enum BatteryLevel {
    Empty = 0,
    Critical = 1,
    Low = 2,
    Medium = 3,
    #[default]
    Full = 4,
}

impl BatteryLevel {
    /// Build a level from a 0-4 value, saturating at [BatteryLevel::Full]
    pub fn from_level(level: u8) -> Self {
        match level {
            0 => Self::Empty,
            1 => Self::Critical,
            2 => Self::Low,
            3 => Self::Medium,
            _ => Self::Full,
        }
    }

    /// Build a level from a percentage
    pub fn from_percent(percent: u8) -> Self {
        match percent {
            0..=5 => Self::Empty,
            6..=25 => Self::Critical,
            26..=50 => Self::Low,
            51..=75 => Self::Medium,
            _ => Self::Full,
        }
    }
}

#[derive(PackedStruct, Debug, Copy, Clone, PartialEq, Default)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "1")]
pub struct BatteryConnection {
    /// Battery level. 8=full, 6=medium, 4=low, 2=critical, 0=empty. LSB=Charging.
    #[packed_field(bits = "0..=2", ty = "enum")]
    pub battery_level: BatteryLevel,
    #[packed_field(bits = "3")]
    pub charging: bool,
    /// Connection info. (con_info >> 1) & 3 - 3=JC, 0=Pro/ChrGrip. con_info & 1 - 1=Switch/USB powered.
    #[packed_field(bits = "4..=7")]
    pub conn_info: u8,
}

#[derive(PackedStruct, Debug, Copy, Clone, PartialEq, Eq, Default)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "3")]
pub struct ButtonStatus {
    // byte 0 (Right)
    #[packed_field(bits = "7")]
    pub y: bool,
    #[packed_field(bits = "6")]
    pub x: bool,
    #[packed_field(bits = "5")]
    pub b: bool,
    #[packed_field(bits = "4")]
    pub a: bool,
    #[packed_field(bits = "3")]
    pub sr_right: bool,
    #[packed_field(bits = "2")]
    pub sl_right: bool,
    #[packed_field(bits = "1")]
    pub r: bool,
    #[packed_field(bits = "0")]
    pub zr: bool,

    // byte 1 (Shared)
    #[packed_field(bits = "15")]
    pub minus: bool,
    #[packed_field(bits = "14")]
    pub plus: bool,
    #[packed_field(bits = "13")]
    pub r_stick: bool,
    #[packed_field(bits = "12")]
    pub l_stick: bool,
    #[packed_field(bits = "11")]
    pub home: bool,
    #[packed_field(bits = "10")]
    pub capture: bool,
    #[packed_field(bits = "9")]
    pub _unused: bool,
    #[packed_field(bits = "8")]
    pub charging_grip: bool,

    // byte 2 (Left)
    #[packed_field(bits = "23")]
    pub down: bool,
    #[packed_field(bits = "22")]
    pub up: bool,
    #[packed_field(bits = "21")]
    pub right: bool,
    #[packed_field(bits = "20")]
    pub left: bool,
    #[packed_field(bits = "19")]
    pub sr_left: bool,
    #[packed_field(bits = "18")]
    pub sl_left: bool,
    #[packed_field(bits = "17")]
    pub l: bool,
    #[packed_field(bits = "16")]
    pub zl: bool,
}

/// Size of the common input report header
pub const INPUT_HEADER_SIZE: usize = 13;
/// Size of the motion block following the header of a 0x30 report
pub const MOTION_DATA_SIZE: usize = 36;
/// Total size of a 0x30 report
pub const STANDARD_REPORT_SIZE: usize = INPUT_HEADER_SIZE + MOTION_DATA_SIZE;
/// Subcommand reply data following the ack and subcommand id
pub const SUBCOMMAND_REPLY_DATA_SIZE: usize = 35;
/// Total size of a 0x21 report
pub const SUBCOMMAND_REPORT_SIZE: usize = INPUT_HEADER_SIZE + 2 + SUBCOMMAND_REPLY_DATA_SIZE;

/// Common header shared by the 0x21 and 0x30 input reports
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq, Default)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "13")]
pub struct InputReportHeader {
    // byte 0-2
    /// Input report ID
    #[packed_field(bytes = "0")]
    pub id: u8,
    /// Timer. Increments very fast. Can be used to estimate excess Bluetooth latency.
    #[packed_field(bytes = "1")]
    pub timer: u8,
    /// Battery and connection information
    #[packed_field(bytes = "2")]
    pub info: BatteryConnection,

    // byte 3-5
    /// Button status
    #[packed_field(bytes = "3..=5")]
    pub buttons: ButtonStatus,

    // byte 6-11
    /// Left analog stick, see [super::analog::AnalogStick]
    #[packed_field(bytes = "6..=8")]
    pub left_stick: [u8; 3],
    /// Right analog stick
    #[packed_field(bytes = "9..=11")]
    pub right_stick: [u8; 3],

    // byte 12
    /// Vibrator input report. Decides if next vibration pattern should be sent.
    #[packed_field(bytes = "12")]
    pub vibrator_report: u8,
}

/// Leading bytes of output reports 0x01 and 0x10
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq, Default)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "10")]
pub struct RumbleOutputData {
    #[packed_field(bytes = "0")]
    pub id: u8,
    /// Global packet counter, 0x0-0xf
    #[packed_field(bytes = "1")]
    pub packet_counter: u8,
    /// Left motor sample, little endian
    #[packed_field(bytes = "2..=5")]
    pub left_rumble: [u8; 4],
    /// Right motor sample, little endian
    #[packed_field(bytes = "6..=9")]
    pub right_rumble: [u8; 4],
}

impl RumbleOutputData {
    pub fn left_sample(&self) -> u32 {
        u32::from_le_bytes(self.left_rumble)
    }

    pub fn right_sample(&self) -> u32 {
        u32::from_le_bytes(self.right_rumble)
    }
}

/// Offset of the subcommand id in output report 0x01
pub const SUBCOMMAND_OFFSET: usize = 10;

/// The 6-Axis data is repeated 3 times. On Joy-con with a 15ms packet push,
/// this is translated to 5ms difference sampling. E.g. 1st sample 0ms, 2nd 5ms,
/// 3rd 10ms. Using all 3 samples let you have a 5ms precision instead of 15ms.
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq, Default)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "12")]
pub struct ImuData {
    #[packed_field(bytes = "0..=1", endian = "lsb")]
    pub accel_x: Integer<i16, packed_bits::Bits<16>>,
    #[packed_field(bytes = "2..=3", endian = "lsb")]
    pub accel_y: Integer<i16, packed_bits::Bits<16>>,
    #[packed_field(bytes = "4..=5", endian = "lsb")]
    pub accel_z: Integer<i16, packed_bits::Bits<16>>,
    #[packed_field(bytes = "6..=7", endian = "lsb")]
    pub gyro_x: Integer<i16, packed_bits::Bits<16>>,
    #[packed_field(bytes = "8..=9", endian = "lsb")]
    pub gyro_y: Integer<i16, packed_bits::Bits<16>>,
    #[packed_field(bytes = "10..=11", endian = "lsb")]
    pub gyro_z: Integer<i16, packed_bits::Bits<16>>,
}

impl ImuData {
    pub fn new(accel: [i16; 3], gyro: [i16; 3]) -> Self {
        Self {
            accel_x: accel[0].into(),
            accel_y: accel[1].into(),
            accel_z: accel[2].into(),
            gyro_x: gyro[0].into(),
            gyro_y: gyro[1].into(),
            gyro_z: gyro[2].into(),
        }
    }
}
