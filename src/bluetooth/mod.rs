//! Types shared with the host Bluetooth driver.
//!
//! The host driver owns the actual Bluetooth stack. It hands us raw HID
//! frames keyed by device address and accepts outgoing frames through the
//! [BluetoothHost] trait.
use std::{fmt::Display, str::FromStr, sync::Arc};

use thiserror::Error;

#[cfg(test)]
pub mod testing;
#[cfg(test)]
pub mod mod_test;

/// Largest HID frame (report id included) the host driver will deliver
pub const HID_REPORT_MAX_SIZE: usize = 362;

/// Possible errors building a [HidReport]
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ReportError {
    #[error("report contains no report id")]
    Empty,
    #[error("report of {size} bytes exceeds the maximum of {max} bytes")]
    TooLarge { size: usize, max: usize },
}

/// Possible errors returned by the host driver
#[derive(Error, Debug, PartialEq, Eq)]
pub enum HostError {
    #[error("device {0} is not connected")]
    Disconnected(DeviceAddress),
    #[error("host rejected the report: {0}")]
    Rejected(String),
}

/// Possible errors parsing a [DeviceAddress]
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AddressParseError {
    #[error("expected 6 colon separated octets, got {0}")]
    InvalidLength(usize),
    #[error("invalid octet `{0}`")]
    InvalidOctet(String),
}

/// Bluetooth device address. Stored in the order it is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct DeviceAddress(pub [u8; 6]);

impl DeviceAddress {
    pub fn new(address: [u8; 6]) -> Self {
        Self(address)
    }

    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }
}

impl Display for DeviceAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let a = self.0;
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            a[0], a[1], a[2], a[3], a[4], a[5]
        )
    }
}

impl FromStr for DeviceAddress {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 6 {
            return Err(AddressParseError::InvalidLength(parts.len()));
        }
        let mut address = [0; 6];
        for (octet, part) in address.iter_mut().zip(parts) {
            *octet = u8::from_str_radix(part, 16)
                .map_err(|_| AddressParseError::InvalidOctet(part.to_string()))?;
        }
        Ok(Self(address))
    }
}

/// Vendor and product id reported for a connected device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct HardwareId {
    pub vid: u16,
    pub pid: u16,
}

impl HardwareId {
    pub fn new(vid: u16, pid: u16) -> Self {
        Self { vid, pid }
    }
}

impl Display for HardwareId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04x}:{:04x}", self.vid, self.pid)
    }
}

/// A single Bluetooth HID frame. The first byte is the report id.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct HidReport {
    size: u16,
    data: [u8; HID_REPORT_MAX_SIZE],
}

impl HidReport {
    /// Returns a report with the given id and an empty payload
    pub fn new(id: u8) -> Self {
        let mut data = [0; HID_REPORT_MAX_SIZE];
        data[0] = id;
        Self { size: 1, data }
    }

    /// Returns a report with the given id and payload
    pub fn with_payload(id: u8, payload: &[u8]) -> Result<Self, ReportError> {
        let size = payload.len() + 1;
        if size > HID_REPORT_MAX_SIZE {
            return Err(ReportError::TooLarge {
                size,
                max: HID_REPORT_MAX_SIZE,
            });
        }
        let mut report = Self::new(id);
        report.data[1..size].copy_from_slice(payload);
        report.size = size as u16;
        Ok(report)
    }

    /// Copies a raw frame (report id included) into a new report
    pub fn from_slice(buf: &[u8]) -> Result<Self, ReportError> {
        let Some((&id, payload)) = buf.split_first() else {
            return Err(ReportError::Empty);
        };
        Self::with_payload(id, payload)
    }

    pub fn id(&self) -> u8 {
        self.data[0]
    }

    /// Total size of the frame including the report id
    pub fn len(&self) -> usize {
        self.size as usize
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// The whole frame including the report id
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len()]
    }

    /// Everything after the report id
    pub fn payload(&self) -> &[u8] {
        &self.data[1..self.len()]
    }

    /// Resize the frame to `size` bytes (report id included), zero filling
    /// any newly exposed bytes, and return the writable frame.
    pub fn resize(&mut self, size: usize) -> &mut [u8] {
        let size = size.clamp(1, HID_REPORT_MAX_SIZE);
        let len = self.len();
        if size > len {
            self.data[len..size].fill(0);
        }
        self.size = size as u16;
        &mut self.data[..size]
    }
}

impl std::fmt::Debug for HidReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HidReport[{:#04x}](", self.id())?;
        for (i, byte) in self.payload().iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{byte:02x}")?;
        }
        write!(f, ")")
    }
}

/// Core Bluetooth status events. These are not translated; they are only
/// observed so the service can log discovery and pairing activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreEvent {
    DiscoveryStateChanged { active: bool },
    DeviceFound {
        address: DeviceAddress,
        class_of_device: u32,
    },
    PairingRequest { address: DeviceAddress },
}

/// Connection state changes for HID devices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HidConnectionState {
    Connected {
        hardware_id: HardwareId,
        class_of_device: u32,
    },
    Disconnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HidConnectionEvent {
    pub address: DeviceAddress,
    pub state: HidConnectionState,
}

/// Direction of a HID frame relative to the physical device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportDirection {
    /// Device to host (input reports)
    Input,
    /// Host to device (output reports written by the console's driver)
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HidReportEvent {
    pub address: DeviceAddress,
    pub direction: ReportDirection,
    pub report: HidReport,
}

/// Class of device major class for peripherals and the gamepad minor class
const COD_MAJOR_PERIPHERAL: u32 = 0x05;
const COD_MINOR_GAMEPAD: u32 = 0x02;

/// Returns true if the given class of device describes a gamepad
pub fn is_gamepad_class(class_of_device: u32) -> bool {
    let major = (class_of_device >> 8) & 0x1f;
    let minor = (class_of_device >> 2) & 0x0f;
    major == COD_MAJOR_PERIPHERAL && minor == COD_MINOR_GAMEPAD
}

/// Interface to the host Bluetooth driver used to send frames to a device
pub trait BluetoothHost: Send + Sync {
    fn write_hid_report(&self, address: DeviceAddress, report: &HidReport)
        -> Result<(), HostError>;
}

/// Writes output reports to a single physical device. Failures are logged
/// and otherwise ignored since decoders never fail.
#[derive(Clone)]
pub struct DeviceWriter {
    address: DeviceAddress,
    host: Arc<dyn BluetoothHost>,
}

impl DeviceWriter {
    pub fn new(address: DeviceAddress, host: Arc<dyn BluetoothHost>) -> Self {
        Self { address, host }
    }

    pub fn address(&self) -> DeviceAddress {
        self.address
    }

    pub fn write(&self, report: &HidReport) {
        log::trace!("Writing to {}: {:?}", self.address, report);
        if let Err(e) = self.host.write_hid_report(self.address, report) {
            log::warn!("Failed to write output report to {}: {e}", self.address);
        }
    }

    /// Build a report from a raw frame and write it
    pub fn write_bytes(&self, buf: &[u8]) {
        match HidReport::from_slice(buf) {
            Ok(report) => self.write(&report),
            Err(e) => log::warn!("Unable to build output report for {}: {e}", self.address),
        }
    }
}

impl std::fmt::Debug for DeviceWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceWriter")
            .field("address", &self.address)
            .finish()
    }
}
