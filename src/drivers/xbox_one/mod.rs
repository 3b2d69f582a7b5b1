pub mod driver;
pub mod hid_report;

// Hardware ID's
pub const VID: u16 = 0x045e;
pub const XBOX_ONE_S_PID: u16 = 0x02e0;
pub const XBOX_ONE_S_1708_PID: u16 = 0x02fd;
pub const XBOX_ELITE_2_PID: u16 = 0x0b05;
pub const XBOX_SERIES_PID: u16 = 0x0b13;
pub const XBOX_ONE_S_FW5_PID: u16 = 0x0b20;
pub const XBOX_ELITE_2_FW5_PID: u16 = 0x0b22;
pub const PIDS: [u16; 6] = [
    XBOX_ONE_S_PID,
    XBOX_ONE_S_1708_PID,
    XBOX_ELITE_2_PID,
    XBOX_SERIES_PID,
    XBOX_ONE_S_FW5_PID,
    XBOX_ELITE_2_FW5_PID,
];

// Report ID's
pub const INPUT_REPORT_DATA: u8 = 0x01;
pub const INPUT_REPORT_GUIDE: u8 = 0x02;
pub const INPUT_REPORT_BATTERY: u8 = 0x04;
pub const OUTPUT_REPORT_RUMBLE: u8 = 0x03;

// Input report axis ranges
pub const TRIGGER_MAX: u16 = 1023;
/// Trigger travel past which the digital ZL/ZR buttons are pressed
pub const TRIGGER_THRESHOLD: u16 = TRIGGER_MAX / 4;
