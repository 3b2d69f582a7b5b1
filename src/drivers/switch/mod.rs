pub mod analog;
pub mod emulator;
pub mod hid_report;
#[cfg(test)]
pub mod hid_report_test;
pub mod motion;
pub mod rumble;
#[cfg(test)]
pub mod rumble_test;
pub mod spi_flash;
