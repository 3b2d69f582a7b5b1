pub mod driver;
#[cfg(test)]
pub mod driver_test;
pub mod hid_report;

// Report ID's
pub const INPUT_REPORT_DATA: u8 = 0x01;

/// Analog trigger travel past which the digital ZL/ZR buttons are pressed
pub const TRIGGER_THRESHOLD: u8 = 0x40;
