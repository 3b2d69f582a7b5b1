pub mod driver;
pub mod hid_report;

// Hardware ID's
// Source: https://github.com/torvalds/linux/blob/master/drivers/hid/hid-playstation.c
pub const VID: u16 = 0x054c;
pub const DS5_PID: u16 = 0x0ce6;
pub const DS5_EDGE_PID: u16 = 0x0df2;
pub const PIDS: [u16; 2] = [DS5_PID, DS5_EDGE_PID];

// Report ID's
pub const INPUT_REPORT_SIMPLE: u8 = 0x01;
pub const INPUT_REPORT_BT: u8 = 0x31;
pub const OUTPUT_REPORT_BT: u8 = 0x31;

// Report sizes
pub const INPUT_REPORT_BT_SIZE: usize = 78;
pub const OUTPUT_REPORT_BT_SIZE: usize = 78;

/// Offset of the input state in a Bluetooth 0x31 report
pub const INPUT_STATE_OFFSET: usize = 2;
