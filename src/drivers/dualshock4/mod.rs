pub mod driver;
pub mod hid_report;
#[cfg(test)]
pub mod hid_report_test;

// Hardware ID's
pub const VID: u16 = 0x054c;
pub const DS4_V1_PID: u16 = 0x05c4;
pub const DS4_V2_PID: u16 = 0x09cc;
pub const DS4_DONGLE_PID: u16 = 0x0ba0;
pub const PIDS: [u16; 3] = [DS4_V1_PID, DS4_V2_PID, DS4_DONGLE_PID];

// Report ID's
pub const INPUT_REPORT_BASIC: u8 = 0x01;
pub const INPUT_REPORT_BT: u8 = 0x11;
pub const OUTPUT_REPORT_BT: u8 = 0x11;

// Report sizes
pub const INPUT_REPORT_BASIC_SIZE: usize = 10;
pub const OUTPUT_REPORT_BT_SIZE: usize = 78;
