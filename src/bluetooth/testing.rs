use std::sync::{Arc, Mutex};

use super::{BluetoothHost, DeviceAddress, DeviceWriter, HidReport, HostError};

/// Host driver double that records every frame written to it
#[derive(Debug, Default)]
pub struct RecordingHost {
    written: Mutex<Vec<(DeviceAddress, HidReport)>>,
}

impl RecordingHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Returns a writer for the given address backed by this host
    pub fn writer(self: &Arc<Self>, address: DeviceAddress) -> DeviceWriter {
        DeviceWriter::new(address, self.clone())
    }

    /// Removes and returns all recorded frames
    pub fn take(&self) -> Vec<(DeviceAddress, HidReport)> {
        let mut written = self.written.lock().unwrap();
        std::mem::take(&mut *written)
    }

    /// Removes and returns the raw bytes of all recorded frames
    pub fn take_bytes(&self) -> Vec<Vec<u8>> {
        self.take()
            .into_iter()
            .map(|(_, report)| report.as_bytes().to_vec())
            .collect()
    }
}

impl BluetoothHost for RecordingHost {
    fn write_hid_report(
        &self,
        address: DeviceAddress,
        report: &HidReport,
    ) -> Result<(), HostError> {
        self.written.lock().unwrap().push((address, *report));
        Ok(())
    }
}

pub const TEST_ADDRESS: DeviceAddress = DeviceAddress([0x11, 0x22, 0x33, 0x44, 0x55, 0x66]);
