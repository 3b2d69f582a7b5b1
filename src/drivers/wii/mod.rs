pub mod driver;
pub mod extension;
pub mod hid_report;

// Hardware ID's
pub const VID: u16 = 0x057e;
pub const WIIMOTE_PID: u16 = 0x0306;
pub const WIIMOTE_PLUS_PID: u16 = 0x0330;
pub const PIDS: [u16; 2] = [WIIMOTE_PID, WIIMOTE_PLUS_PID];

// Input report ID's
pub const INPUT_REPORT_STATUS: u8 = 0x20;
pub const INPUT_REPORT_READ_DATA: u8 = 0x21;
pub const INPUT_REPORT_ACK: u8 = 0x22;
pub const INPUT_REPORT_CORE: u8 = 0x30;
pub const INPUT_REPORT_CORE_ACCEL: u8 = 0x31;
pub const INPUT_REPORT_CORE_EXT8: u8 = 0x32;
pub const INPUT_REPORT_CORE_ACCEL_IR12: u8 = 0x33;
pub const INPUT_REPORT_CORE_EXT19: u8 = 0x34;
pub const INPUT_REPORT_CORE_ACCEL_EXT16: u8 = 0x35;
pub const INPUT_REPORT_CORE_IR10_EXT9: u8 = 0x36;
pub const INPUT_REPORT_CORE_ACCEL_IR10_EXT6: u8 = 0x37;
pub const INPUT_REPORT_EXT21: u8 = 0x3d;

// Output report ID's
pub const OUTPUT_REPORT_LEDS: u8 = 0x11;
pub const OUTPUT_REPORT_MODE: u8 = 0x12;
pub const OUTPUT_REPORT_STATUS_REQUEST: u8 = 0x15;
pub const OUTPUT_REPORT_WRITE_MEMORY: u8 = 0x16;
pub const OUTPUT_REPORT_READ_MEMORY: u8 = 0x17;

/// Extension registers
pub const EXTENSION_INIT1_ADDRESS: u32 = 0xa400f0;
pub const EXTENSION_INIT1_VALUE: u8 = 0x55;
pub const EXTENSION_INIT2_ADDRESS: u32 = 0xa400fb;
pub const EXTENSION_INIT2_VALUE: u8 = 0x00;
pub const EXTENSION_ID_ADDRESS: u32 = 0xa400fa;
pub const EXTENSION_ID_SIZE: u16 = 6;

/// Full battery reading in the status report
pub const BATTERY_MAX: u8 = 0xc8;
